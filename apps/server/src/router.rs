use axum::Router;
use axum::response::Redirect;
use axum::routing::get;
use quarry_kernel::server::ApiState;
use quarry_kernel::server::router::system_router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(info(title = "Quarry", description = "Setup and user preference forms"))]
struct ApiDoc;

/// Full application router: system and forms routes, the API reference at
/// `/api`, and `/` redirecting to the setup overview.
pub(crate) fn init(state: ApiState) -> Router {
    let (openapi_routes, api_doc) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(system_router())
        .merge(quarry_forms::server::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .split_for_parts();

    Router::new()
        .route("/", get(|| async { Redirect::to("/setup") }))
        .merge(openapi_routes)
        .merge(Scalar::with_url("/api", api_doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use quarry_storage::Storage;
    use tower::ServiceExt;

    async fn app(dir: &tempfile::TempDir) -> Router {
        let storage = Storage::builder().root(dir.path()).connect().await.unwrap();
        let forms = quarry_forms::server::init(&Default::default(), storage.clone()).await.unwrap();
        let state = ApiState::builder().storage(storage).register_slice(forms).build().unwrap();
        init(state)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn root_redirects_to_setup() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(&dir).await.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/setup");
    }

    #[tokio::test]
    async fn serves_system_and_forms_routes() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir).await;

        let response = app.clone().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.clone().oneshot(get("/setup/forms/Features")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get("/api")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8_lossy(&body).contains("/setup/forms/{group}"));
    }
}
