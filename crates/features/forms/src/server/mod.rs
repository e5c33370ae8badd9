//! HTTP surface of the forms feature: the slice holding the setup and
//! preference documents, and the axum routes serving them.

mod error;
mod handlers;
mod pages;

use crate::display::{DisplaySettings, FormDisplay, Submission};
use crate::error::FormError;
use crate::form::{FormGroup, FormSpec};
use crate::schema::Schema;
use crate::store::{ConfigFile, ConfigStore};
use fxhash::FxHashMap;
use parking_lot::RwLock;
use quarry_kernel::domain::ConfigValue;
use quarry_kernel::domain::config::FormsConfig;
use quarry_kernel::domain::path;
use quarry_kernel::domain::registry::InitializedSlice;
use quarry_kernel::server::ApiState;
use quarry_storage::{NamespacedStorage, Storage};
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use tracing::{debug, info};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// OpenAPI tag of the forms routes.
pub const FORMS_TAG: &str = "Forms";

const SETUP_NAMESPACE: &str = "setup";
const SETUP_DOCUMENT: &str = "config.json";
const PREFS_PREFIX: &str = "prefs_";
const PREFS_DOCUMENT: &str = "preferences.json";

type Values = BTreeMap<String, ConfigValue>;

/// Forms feature state.
#[quarry_derive::quarry_slice]
pub struct Forms {
    storage: Storage,
    settings: DisplaySettings,
    allow_partial_save: bool,
    setup: RwLock<ConfigFile>,
    /// Held from a setup change until its document is written.
    setup_writes: Mutex<()>,
    /// Stored preferences per user, loaded on first use.
    prefs: RwLock<FxHashMap<String, Values>>,
    /// Held from a preference change until its document is written.
    prefs_writes: Mutex<()>,
}

/// Loads the setup document and builds the forms slice.
///
/// # Errors
/// [`FormError::Storage`] when the stored document cannot be read or parsed.
pub async fn init(config: &FormsConfig, storage: Storage) -> Result<InitializedSlice, FormError> {
    let settings = DisplaySettings {
        doc_base: config.doc_base.clone(),
        capabilities: config.capabilities,
        tester: None,
    };
    let slice = build(settings, config.allow_partial_save, storage).await?;
    Ok(InitializedSlice::new(slice))
}

/// Like [`init`] but with explicit display settings, e.g. to install a
/// connection tester.
///
/// # Errors
/// [`FormError::Storage`] when the stored document cannot be read or parsed.
pub async fn build(
    settings: DisplaySettings,
    allow_partial_save: bool,
    storage: Storage,
) -> Result<Forms, FormError> {
    let values: Values =
        storage.namespace(SETUP_NAMESPACE)?.load_json(SETUP_DOCUMENT).await?.unwrap_or_default();

    let mut setup = ConfigFile::setup(Schema::global());
    setup.set_user_values(values);
    info!(
        values = setup.user_values().len(),
        servers = setup.server_count(),
        "Forms server slice initialized"
    );

    Ok(Forms::new(FormsInner {
        storage,
        settings,
        allow_partial_save,
        setup: RwLock::new(setup),
        setup_writes: Mutex::new(()),
        prefs: RwLock::new(FxHashMap::default()),
        prefs_writes: Mutex::new(()),
    }))
}

/// Routes of the setup and preference pages.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::setup_overview))
        .routes(routes!(handlers::show_setup_form, handlers::submit_setup_form))
        .routes(routes!(handlers::delete_server))
        .routes(routes!(handlers::export_config))
        .routes(routes!(handlers::validate_fields))
        .routes(routes!(handlers::show_prefs_form, handlers::submit_prefs_form))
}

/// Result of a form submission.
#[derive(Debug)]
pub(crate) enum Submitted {
    /// Saved without errors; redirect to the page.
    Saved { location: String },
    /// The page again, with the errors shown.
    Rejected { html: String },
}

impl Forms {
    /// Current setup values, flat.
    #[must_use]
    pub fn setup_values(&self) -> Values {
        self.setup.read().user_values().clone()
    }

    /// Setup values nested by path segment.
    #[must_use]
    pub fn setup_export(&self) -> ConfigValue {
        self.setup.read().to_nested()
    }

    fn setup_server_count(&self) -> u32 {
        self.setup.read().server_count()
    }

    /// Server selection for a page of `group`. Groups editing server options
    /// default to a new server (`0`); others ignore the selection.
    fn resolve_server(&self, group: &str, server: Option<u32>) -> Result<Option<u32>, FormError> {
        let schema = Schema::global();
        let Some(spec) = schema.group(group) else {
            return Ok(None);
        };
        if !edits_servers(spec) {
            return Ok(None);
        }

        let server = server.unwrap_or(0);
        let count = self.setup_server_count();
        if server > count {
            return Err(FormError::UnknownServer {
                message: server.to_string().into(),
                context: Some(format!("{count} server(s) configured").into()),
            });
        }
        Ok(Some(server))
    }

    /// Renders the setup page of `group`.
    ///
    /// # Errors
    /// [`FormError::UnknownGroup`] or [`FormError::UnknownServer`].
    pub fn render_setup(&self, group: &str, server: Option<u32>) -> Result<String, FormError> {
        let server = self.resolve_server(group, server)?;
        let setup = self.setup.read().clone();
        let mut display = FormDisplay::new(setup, self.settings.clone());
        display.register_group(group, server)?;
        Ok(display.display(true, &setup_action(group, server), &[]))
    }

    /// Applies a setup submission and stores the document when it changed.
    /// Submissions are applied and written one at a time, so the stored
    /// document always matches the latest change.
    ///
    /// # Errors
    /// [`FormError::UnknownGroup`], [`FormError::UnknownServer`] or
    /// [`FormError::Storage`] when the document cannot be written.
    pub(crate) async fn save_setup(
        &self,
        group: &str,
        server: Option<u32>,
        submission: &Submission,
    ) -> Result<Submitted, FormError> {
        let _write = self.setup_writes.lock().await;
        let (outcome, changed) = self.submit_setup(group, server, submission)?;
        if let Some(values) = changed {
            self.persist_setup(&values).await?;
        }
        Ok(outcome)
    }

    /// Applies a setup submission in place. Returns the outcome and, when the
    /// store changed, the values to persist.
    fn submit_setup(
        &self,
        group: &str,
        server: Option<u32>,
        submission: &Submission,
    ) -> Result<(Submitted, Option<Values>), FormError> {
        let server = self.resolve_server(group, server)?;
        let mut setup = self.setup.write();
        let before = setup.user_values().clone();

        let mut display = FormDisplay::new(&mut *setup, self.settings.clone());
        display.register_group(group, server)?;
        let accepted = display.process(submission, self.allow_partial_save, true);
        // A saved new server form is bound to the server it created.
        let server = display.forms().first().map_or(server, |form| form.index);
        let outcome = if accepted && !display.has_errors() {
            Submitted::Saved { location: setup_action(group, server) }
        } else {
            Submitted::Rejected { html: display.display(true, &setup_action(group, server), &[]) }
        };
        drop(display);

        let changed = (*setup.user_values() != before).then(|| setup.user_values().clone());
        debug!(group, ?server, accepted, changed = changed.is_some(), "Setup form submitted");
        Ok((outcome, changed))
    }

    /// Removes server `n` and stores the shifted document.
    ///
    /// # Errors
    /// [`FormError::UnknownServer`] or [`FormError::Storage`].
    pub(crate) async fn delete_setup_server(&self, server: u32) -> Result<(), FormError> {
        let _write = self.setup_writes.lock().await;
        let values = self.remove_setup_server(server)?;
        self.persist_setup(&values).await
    }

    /// Removes server `n` and returns the values to persist.
    fn remove_setup_server(&self, server: u32) -> Result<Values, FormError> {
        let mut setup = self.setup.write();
        let count = setup.server_count();
        if server == 0 || server > count {
            return Err(FormError::UnknownServer { message: server.to_string().into(), context: None });
        }
        setup.remove_server(server);
        Ok(setup.user_values().clone())
    }

    /// Preference store of `user` over the current setup values.
    fn prefs_store(&self, user: &str, values: Values) -> ConfigFile {
        let mut store = ConfigFile::user_preferences(Schema::global(), self.setup_values());
        store.set_user_values(values);
        debug!(user, values = store.user_values().len(), "Preference store prepared");
        store
    }

    /// Stored preferences of `user`, read from storage on first use.
    ///
    /// # Errors
    /// [`FormError::BadRequest`] for user names that cannot name a namespace,
    /// [`FormError::Storage`] when the document cannot be read.
    pub async fn user_values(&self, user: &str) -> Result<Values, FormError> {
        let cached = self.prefs.read().get(user).cloned();
        if let Some(values) = cached {
            return Ok(values);
        }

        let values: Values =
            self.prefs_namespace(user)?.load_json(PREFS_DOCUMENT).await?.unwrap_or_default();
        Ok(self.prefs.write().entry(user.to_owned()).or_insert(values).clone())
    }

    /// Renders the preference page of `group` for `user`.
    ///
    /// # Errors
    /// [`FormError::UnknownGroup`] for unknown or setup-only groups.
    pub fn render_prefs(&self, user: &str, group: &str, values: Values) -> Result<String, FormError> {
        let store = self.prefs_store(user, values);
        let mut display = FormDisplay::new(store, self.settings.clone());
        display.register_group(group, None)?;
        Ok(display.display(true, &prefs_action(user, group), &[]))
    }

    /// Applies a preference submission of `user` and stores the document when
    /// it changed. Like [`save_setup`](Self::save_setup), one change at a time.
    ///
    /// # Errors
    /// [`FormError::BadRequest`] for illegal user names,
    /// [`FormError::UnknownGroup`] or [`FormError::Storage`].
    pub(crate) async fn save_prefs(
        &self,
        user: &str,
        group: &str,
        submission: &Submission,
    ) -> Result<Submitted, FormError> {
        let _write = self.prefs_writes.lock().await;
        let values = self.user_values(user).await?;
        let (outcome, changed) = self.submit_prefs(user, group, values, submission)?;
        if let Some(values) = changed {
            self.persist_prefs(user, &values).await?;
        }
        Ok(outcome)
    }

    fn submit_prefs(
        &self,
        user: &str,
        group: &str,
        values: Values,
        submission: &Submission,
    ) -> Result<(Submitted, Option<Values>), FormError> {
        let mut store = self.prefs_store(user, values);
        let before = store.user_values().clone();

        let mut display = FormDisplay::new(&mut store, self.settings.clone());
        display.register_group(group, None)?;
        let accepted = display.process(submission, self.allow_partial_save, true);
        let outcome = if accepted && !display.has_errors() {
            Submitted::Saved { location: prefs_action(user, group) }
        } else {
            Submitted::Rejected { html: display.display(true, &prefs_action(user, group), &[]) }
        };
        drop(display);

        let changed = (*store.user_values() != before).then(|| store.user_values().clone());
        if let Some(values) = &changed {
            self.prefs.write().insert(user.to_owned(), values.clone());
        }
        debug!(user, group, accepted, changed = changed.is_some(), "Preference form submitted");
        Ok((outcome, changed))
    }

    async fn persist_setup(&self, values: &Values) -> Result<(), FormError> {
        self.storage.namespace(SETUP_NAMESPACE)?.write_json(SETUP_DOCUMENT, values).await?;
        info!(values = values.len(), "Setup configuration stored");
        Ok(())
    }

    async fn persist_prefs(&self, user: &str, values: &Values) -> Result<(), FormError> {
        self.prefs_namespace(user)?.write_json(PREFS_DOCUMENT, values).await?;
        info!(user, values = values.len(), "User preferences stored");
        Ok(())
    }

    fn prefs_namespace(&self, user: &str) -> Result<NamespacedStorage, FormError> {
        let legal = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_';
        if user.is_empty() || !user.chars().all(legal) {
            return Err(FormError::BadRequest {
                message: user.to_owned().into(),
                context: Some("user names may only hold a-z, 0-9 and '_'".into()),
            });
        }
        Ok(self.storage.namespace(format!("{PREFS_PREFIX}{user}"))?)
    }

    pub(crate) fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    pub(crate) fn setup_servers(&self) -> Vec<(u32, String, String)> {
        let setup = self.setup.read();
        (1..=setup.server_count())
            .map(|n| (n, setup.server_name(n), setup.server_dsn(n)))
            .collect()
    }

    pub(crate) fn with_setup<R>(&self, f: impl FnOnce(&ConfigFile) -> R) -> R {
        f(&self.setup.read())
    }
}

/// Whether any form of the group edits per-server options.
fn edits_servers(group: &FormGroup) -> bool {
    group.forms.iter().flat_map(FormSpec::field_paths).any(|p| path::server_index(&p).is_some())
}

fn setup_action(group: &str, server: Option<u32>) -> String {
    match server {
        Some(n) => format!("/setup/forms/{group}?server={n}"),
        None => format!("/setup/forms/{group}"),
    }
}

fn prefs_action(user: &str, group: &str) -> String {
    format!("/prefs/{user}/forms/{group}")
}
