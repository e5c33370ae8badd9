use super::error::ErrorBody;
use super::{FORMS_TAG, Forms, Submitted, pages};
use crate::display::Submission;
use crate::error::FormError;
use crate::validator::{self, ValidationErrors};
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form as UrlForm, Json};
use quarry_derive::{api_handler, api_model};
use quarry_kernel::domain::{ConfigValue, path};
use quarry_kernel::server::ApiState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(super) struct ServerQuery {
    /// Server being edited; `0` adds a new one.
    server: Option<u32>,
}

#[api_model]
/// Fields to validate, as posted by the form page.
pub(super) struct ValidateRequest {
    /// Form names and field paths (translated or not) whose validators should run.
    #[serde(default)]
    ids: Vec<String>,
    /// Current field values keyed by translated path.
    #[serde(default)]
    #[schema(value_type = Object)]
    values: BTreeMap<String, ConfigValue>,
}

/// `true`, or messages per translated path (valid fields map to `[]`).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(super) enum ValidateResponse {
    Valid(bool),
    Errors(ValidationErrors),
}

impl IntoResponse for Submitted {
    fn into_response(self) -> Response {
        match self {
            Self::Saved { location } => Redirect::to(&location).into_response(),
            Self::Rejected { html } => Html(html).into_response(),
        }
    }
}

fn forms(state: &ApiState) -> Result<&Forms, FormError> {
    Ok(state.try_get_slice::<Forms>()?)
}

#[api_handler(
    get,
    path = "/setup",
    responses((status = OK, description = "Form groups and configured servers", body = String, content_type = "text/html")),
    tag = FORMS_TAG,
)]
pub(super) async fn setup_overview(State(state): State<ApiState>) -> Result<Html<String>, FormError> {
    let forms = forms(&state)?;
    Ok(Html(pages::overview(&forms.setup_servers())))
}

#[api_handler(
    get,
    path = "/setup/forms/{group}",
    params(("group" = String, Path, description = "Form group name"), ServerQuery),
    responses(
        (status = OK, description = "Rendered form group", body = String, content_type = "text/html"),
        (status = NOT_FOUND, description = "Unknown group or server", body = ErrorBody),
    ),
    tag = FORMS_TAG,
)]
pub(super) async fn show_setup_form(
    State(state): State<ApiState>,
    Path(group): Path<String>,
    Query(query): Query<ServerQuery>,
) -> Result<Html<String>, FormError> {
    let forms = forms(&state)?;
    Ok(Html(forms.render_setup(&group, query.server)?))
}

#[api_handler(
    post,
    path = "/setup/forms/{group}",
    params(("group" = String, Path, description = "Form group name"), ServerQuery),
    request_body(content = BTreeMap<String, String>, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = SEE_OTHER, description = "Saved, redirects back to the page"),
        (status = OK, description = "Page rendered again with errors", body = String, content_type = "text/html"),
        (status = NOT_FOUND, description = "Unknown group or server", body = ErrorBody),
    ),
    tag = FORMS_TAG,
)]
pub(super) async fn submit_setup_form(
    State(state): State<ApiState>,
    Path(group): Path<String>,
    Query(query): Query<ServerQuery>,
    UrlForm(submission): UrlForm<Submission>,
) -> Result<Response, FormError> {
    let forms = forms(&state)?;
    let outcome = forms.save_setup(&group, query.server, &submission).await?;
    Ok(outcome.into_response())
}

#[api_handler(
    post,
    path = "/setup/servers/{server}/delete",
    params(("server" = u32, Path, description = "Server index, starting at 1")),
    responses(
        (status = SEE_OTHER, description = "Removed, redirects to the overview"),
        (status = NOT_FOUND, description = "No such server", body = ErrorBody),
    ),
    tag = FORMS_TAG,
)]
pub(super) async fn delete_server(
    State(state): State<ApiState>,
    Path(server): Path<u32>,
) -> Result<Redirect, FormError> {
    let forms = forms(&state)?;
    forms.delete_setup_server(server).await?;
    Ok(Redirect::to("/setup"))
}

#[api_handler(
    get,
    path = "/setup/config",
    responses((status = OK, description = "Setup configuration, nested by path segment")),
    tag = FORMS_TAG,
)]
pub(super) async fn export_config(State(state): State<ApiState>) -> Result<Json<ConfigValue>, FormError> {
    let forms = forms(&state)?;
    Ok(Json(forms.setup_export()))
}

#[api_handler(
    post,
    path = "/setup/validate",
    request_body = ValidateRequest,
    responses((status = OK, description = "`true` or messages per translated path")),
    tag = FORMS_TAG,
)]
pub(super) async fn validate_fields(
    State(state): State<ApiState>,
    Json(request): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>, FormError> {
    let forms = forms(&state)?;
    let tester = forms.settings().tester.clone();
    let ids: Vec<String> = request.ids.iter().map(|id| path::untranslate(id)).collect();
    let result = forms.with_setup(|setup| {
        validator::validate(setup, &ids, &request.values, true, tester.as_deref())
    });

    let response = match result {
        Some(errors) if errors.values().any(|messages| !messages.is_empty()) => {
            ValidateResponse::Errors(errors)
        },
        _ => ValidateResponse::Valid(true),
    };
    Ok(Json(response))
}

#[api_handler(
    get,
    path = "/prefs/{user}/forms/{group}",
    params(
        ("user" = String, Path, description = "User name (a-z, 0-9, _)"),
        ("group" = String, Path, description = "Form group name"),
    ),
    responses(
        (status = OK, description = "Rendered preference forms", body = String, content_type = "text/html"),
        (status = NOT_FOUND, description = "Unknown or setup-only group", body = ErrorBody),
    ),
    tag = FORMS_TAG,
)]
pub(super) async fn show_prefs_form(
    State(state): State<ApiState>,
    Path((user, group)): Path<(String, String)>,
) -> Result<Html<String>, FormError> {
    let forms = forms(&state)?;
    let values = forms.user_values(&user).await?;
    Ok(Html(forms.render_prefs(&user, &group, values)?))
}

#[api_handler(
    post,
    path = "/prefs/{user}/forms/{group}",
    params(
        ("user" = String, Path, description = "User name (a-z, 0-9, _)"),
        ("group" = String, Path, description = "Form group name"),
    ),
    request_body(content = BTreeMap<String, String>, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = SEE_OTHER, description = "Saved, redirects back to the page"),
        (status = OK, description = "Page rendered again with errors", body = String, content_type = "text/html"),
        (status = NOT_FOUND, description = "Unknown or setup-only group", body = ErrorBody),
    ),
    tag = FORMS_TAG,
)]
pub(super) async fn submit_prefs_form(
    State(state): State<ApiState>,
    Path((user, group)): Path<(String, String)>,
    UrlForm(submission): UrlForm<Submission>,
) -> Result<Response, FormError> {
    let forms = forms(&state)?;
    let outcome = forms.save_prefs(&user, &group, &submission).await?;
    Ok(outcome.into_response())
}
