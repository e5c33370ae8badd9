use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use quarry_kernel::server::router::system_router;
use tower::ServiceExt;

#[tokio::test]
async fn health_reports_up() {
    let (router, api) = system_router::<()>().split_for_parts();
    assert!(api.paths.paths.contains_key("/health"));

    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "up");
    assert!(body["uptime"].is_u64());
}
