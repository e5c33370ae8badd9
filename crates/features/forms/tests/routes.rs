use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use quarry_forms::server::{self, Forms};
use quarry_forms::{ConfigFile, DisplaySettings, FormDisplay, OptionType, Schema};
use quarry_kernel::domain::config::FormsConfig;
use quarry_kernel::domain::path;
use quarry_kernel::server::ApiState;
use quarry_storage::Storage;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tempfile::TempDir;
use tower::ServiceExt;

async fn storage(dir: &TempDir) -> Storage {
    Storage::builder().root(dir.path()).connect().await.unwrap()
}

async fn app(storage: Storage) -> (Router, ApiState) {
    let slice = server::init(&FormsConfig::default(), storage.clone()).await.unwrap();
    let state = ApiState::builder().storage(storage).register_slice(slice).build().unwrap();
    let (router, _) = server::router().with_state(state.clone()).split_for_parts();
    (router, state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(uri: &str, pairs: &[(&str, &str)]) -> Request<Body> {
    let body = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn encode(text: &str) -> String {
    text.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' => (b as char).to_string(),
            _ => format!("%{b:02X}"),
        })
        .collect()
}

async fn text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Form fields of an untouched `group` page, as a browser would post them,
/// with `overrides` applied.
fn untouched(group: &str, server: Option<u32>, overrides: &[(&str, &str)]) -> Vec<(String, String)> {
    let schema = Schema::global();
    let mut display = FormDisplay::new(ConfigFile::setup(schema), DisplaySettings::default());
    display.register_group(group, server).unwrap();

    let mut fields: BTreeMap<String, String> = BTreeMap::new();
    for form in display.forms() {
        for field in form.fields() {
            let key = path::translated_path(&path::work_path(&field.system_path, form.index));
            let default = schema.default_value(&field.system_path).cloned().unwrap_or_default();
            match field.option_type {
                OptionType::Boolean if default.is_empty() => {},
                OptionType::Boolean => {
                    fields.insert(key, "on".to_owned());
                },
                _ => {
                    fields.insert(key, default.as_display_string());
                },
            }
        }
    }
    for (key, value) in overrides {
        fields.insert((*key).to_owned(), (*value).to_owned());
    }
    fields.insert("submit_save".to_owned(), "Apply".to_owned());
    fields.into_iter().collect()
}

fn pairs(fields: &[(String, String)]) -> Vec<(&str, &str)> {
    fields.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
}

#[tokio::test]
async fn registers_the_slice_and_documents_routes() {
    let dir = tempfile::tempdir().unwrap();
    let (_, state) = app(storage(&dir).await).await;
    assert!(state.get_slice::<Forms>().is_some());

    let (_, api) = server::router().with_state::<()>(state).split_for_parts();
    assert!(api.paths.paths.contains_key("/setup/forms/{group}"));
    assert!(api.paths.paths.contains_key("/setup/validate"));
    assert!(api.paths.paths.contains_key("/prefs/{user}/forms/{group}"));
}

#[tokio::test]
async fn renders_setup_pages() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app(storage(&dir).await).await;

    let response = app.clone().oneshot(get("/setup")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains("There are no configured servers"));

    let response = app.clone().oneshot(get("/setup/forms/Main_panel")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = text(response).await;
    assert!(html.contains("action=\"/setup/forms/Main_panel\""));
    assert!(html.contains("name=\"MaxRows\""));

    let response = app.clone().oneshot(get("/setup/forms/Nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(json_body(response).await["message"].as_str().unwrap().contains("Nope"));

    let response = app.oneshot(get("/setup/forms/Servers?server=3")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn adding_a_server_persists_and_redirects() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage(&dir).await;
    let (app, _) = app(storage.clone()).await;

    let fields = untouched("Servers", Some(0), &[("Servers-0-host", "db.example.org")]);
    let response =
        app.clone().oneshot(post_form("/setup/forms/Servers?server=0", &pairs(&fields))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/setup/forms/Servers?server=1");

    let stored: Value = storage.namespace("setup").unwrap().read_json("config.json").await.unwrap();
    assert_eq!(stored["Servers/1/host"], "db.example.org");

    let response = app.clone().oneshot(get("/setup")).await.unwrap();
    let html = text(response).await;
    assert!(html.contains("db.example.org"));
    assert!(html.contains("/setup/servers/1/delete"));

    let response = app.oneshot(get("/setup/config")).await.unwrap();
    assert_eq!(json_body(response).await["Servers"]["1"]["host"], "db.example.org");

    // A fresh slice picks the stored document up again.
    let (app, _) = self::app(storage).await;
    let response = app.oneshot(get("/setup/forms/Servers?server=1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains("name=\"Servers-1-host\" value=\"db.example.org\""));
}

#[tokio::test]
async fn concurrent_submissions_store_the_latest_document() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage(&dir).await;
    let (app, state) = app(storage.clone()).await;

    let navi = untouched("Navi_panel", None, &[("MaxTableList", "50")]);
    let main = untouched("Main_panel", None, &[("MaxRows", "100")]);
    let (first, second) = tokio::join!(
        app.clone().oneshot(post_form("/setup/forms/Navi_panel", &pairs(&navi))),
        app.clone().oneshot(post_form("/setup/forms/Main_panel", &pairs(&main))),
    );
    assert_eq!(first.unwrap().status(), StatusCode::SEE_OTHER);
    assert_eq!(second.unwrap().status(), StatusCode::SEE_OTHER);

    let stored: Value = storage.namespace("setup").unwrap().read_json("config.json").await.unwrap();
    let current = serde_json::to_value(state.get_slice::<Forms>().unwrap().setup_values()).unwrap();
    assert_eq!(stored, current);
    assert_eq!(stored["MaxTableList"], 50);
    assert_eq!(stored["MaxRows"], 100);
}

#[tokio::test]
async fn new_server_errors_point_at_the_created_server() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app(storage(&dir).await).await;

    let fields = untouched(
        "Servers",
        Some(0),
        &[("Servers-0-auth_type", "config"), ("Servers-0-user", "")],
    );
    let response =
        app.clone().oneshot(post_form("/setup/forms/Servers?server=0", &pairs(&fields))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = text(response).await;
    assert!(html.contains("Empty username while using config authentication method!"));
    assert!(html.contains("action=\"/setup/forms/Servers?server=1\""));

    let response = app.oneshot(get("/setup/config")).await.unwrap();
    assert_eq!(json_body(response).await["Servers"]["1"]["auth_type"], "config");
}

#[tokio::test]
async fn deleting_servers_shifts_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app(storage(&dir).await).await;

    for host in ["first.example.org", "second.example.org"] {
        let fields = untouched("Servers", Some(0), &[("Servers-0-host", host)]);
        let response =
            app.clone().oneshot(post_form("/setup/forms/Servers", &pairs(&fields))).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    let response = app.clone().oneshot(post_form("/setup/servers/1/delete", &[])).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/setup");

    let response = app.clone().oneshot(get("/setup/config")).await.unwrap();
    let config = json_body(response).await;
    assert_eq!(config["Servers"]["1"]["host"], "second.example.org");
    assert!(config["Servers"].get("2").is_none());

    let response = app.oneshot(post_form("/setup/servers/5/delete", &[])).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_submissions_render_the_errors() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app(storage(&dir).await).await;

    let fields = untouched("Navi_panel", None, &[("MaxTableList", "lots")]);
    let response = app.oneshot(post_form("/setup/forms/Navi_panel", &pairs(&fields))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains("Not a valid number!"));
}

#[tokio::test]
async fn validates_posted_fields() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app(storage(&dir).await).await;

    let body = json!({
        "ids": ["Servers-1-port", "LimitChars"],
        "values": { "Servers-1-port": 70000, "LimitChars": 10 },
    });
    let response = app.clone().oneshot(post_json("/setup/validate", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let result = json_body(response).await;
    assert_eq!(result["Servers-1-port"], json!(["Not a valid port number!"]));
    assert_eq!(result["LimitChars"], json!([]));

    let body = json!({ "ids": ["LimitChars"], "values": { "LimitChars": 10 } });
    let response = app.clone().oneshot(post_json("/setup/validate", &body)).await.unwrap();
    assert_eq!(json_body(response).await, json!(true));

    let body = json!({ "ids": ["ShowHint"], "values": {} });
    let response = app.oneshot(post_json("/setup/validate", &body)).await.unwrap();
    assert_eq!(json_body(response).await, json!(true));
}

#[tokio::test]
async fn user_preferences_are_kept_per_user() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage(&dir).await;
    let (app, _) = app(storage.clone()).await;

    let response = app.clone().oneshot(get("/prefs/alice/forms/Navi_panel")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains("maximum 100"));

    let fields = untouched("Navi_panel", None, &[("MaxTableList", "50")]);
    let response =
        app.clone().oneshot(post_form("/prefs/alice/forms/Navi_panel", &pairs(&fields))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/prefs/alice/forms/Navi_panel");

    let stored: Value =
        storage.namespace("prefs_alice").unwrap().read_json("preferences.json").await.unwrap();
    assert_eq!(stored, json!({ "MaxTableList": 50 }));

    let response = app.clone().oneshot(get("/prefs/bob/forms/Navi_panel")).await.unwrap();
    assert!(text(response).await.contains("name=\"MaxTableList\" value=\"250\""));

    let response = app.clone().oneshot(get("/prefs/alice/forms/Servers")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get("/prefs/Not%20Valid/forms/Navi_panel")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
