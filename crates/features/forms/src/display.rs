//! The form display service: registers forms, renders them, and processes
//! submissions into a [`ConfigStore`].

use crate::error::FormError;
use crate::form::{Form, FormEntry, FormField};
use crate::intake::{self, IntakeError};
use crate::schema::{DescriptionKind, OptionType, SelectOption};
use crate::store::{ConfigStore, Mode};
use crate::template::{FormTemplate, InputField, InputKind};
use crate::validator::{self, ConnectionTester, ValidationErrors};
use quarry_kernel::domain::ConfigValue;
use quarry_kernel::domain::flags::{Capabilities, OptionFlags};
use quarry_kernel::domain::path;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Submitted form fields keyed by translated path.
pub type Submission = BTreeMap<String, String>;

const USERPREFS_DISALLOW: &str = "UserprefsDisallow";
const TRUSTED_PROXIES: &str = "TrustedProxies";

/// Rendering settings shared by every display.
#[derive(Clone)]
pub struct DisplaySettings {
    /// Prefix of documentation links.
    pub doc_base: String,
    pub capabilities: Capabilities,
    pub tester: Option<Arc<dyn ConnectionTester>>,
}

impl fmt::Debug for DisplaySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplaySettings")
            .field("doc_base", &self.doc_base)
            .field("capabilities", &self.capabilities)
            .field("tester", &self.tester.is_some())
            .finish()
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self { doc_base: "./doc/html/".to_owned(), capabilities: Capabilities::ALL, tester: None }
    }
}

/// Renders registered forms and saves submissions into the store.
#[derive(Debug)]
pub struct FormDisplay<S> {
    store: S,
    settings: DisplaySettings,
    forms: Vec<Form>,
    /// Work path -> system path of every registered field.
    system_paths: BTreeMap<String, String>,
    /// Work path -> HTML id.
    translated_paths: BTreeMap<String, String>,
    /// Work path or form name -> messages.
    errors: ValidationErrors,
    /// Errors of the last save's intake, kept across validator runs.
    intake_errors: ValidationErrors,
    validated: bool,
    userprefs_disallow: BTreeSet<String>,
}

impl<S: ConfigStore> FormDisplay<S> {
    pub fn new(store: S, settings: DisplaySettings) -> Self {
        Self {
            store,
            settings,
            forms: Vec::new(),
            system_paths: BTreeMap::new(),
            translated_paths: BTreeMap::new(),
            errors: ValidationErrors::new(),
            intake_errors: ValidationErrors::new(),
            validated: true,
            userprefs_disallow: BTreeSet::new(),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn mode(&self) -> Mode {
        self.store.mode()
    }

    /// Registers form `name` for `server` (`Some(0)` creates a new server).
    ///
    /// # Errors
    /// [`FormError::UnknownForm`] when no such form exists, or when it is a
    /// setup-only form and the store holds user preferences.
    pub fn register_form(&mut self, name: &str, server: Option<u32>) -> Result<(), FormError> {
        let schema = self.store.schema();
        let (group, spec) = schema.form(name).ok_or_else(|| FormError::UnknownForm {
            message: name.to_owned().into(),
            context: None,
        })?;

        let user_mode = self.mode().is_user_preferences();
        if user_mode && (group.setup_only || spec.setup_only) {
            return Err(FormError::UnknownForm {
                message: name.to_owned().into(),
                context: Some("not available in user preferences".into()),
            });
        }

        let store = &self.store;
        let form = Form::new(spec, server, schema, |system| !user_mode || store.is_allowed(system));
        for field in form.fields() {
            let work = path::work_path(&field.system_path, server).into_owned();
            self.translated_paths.insert(work.clone(), path::translated_path(&work));
            self.system_paths.insert(work, field.system_path.clone());
        }
        debug!(form = name, ?server, fields = form.fields().count(), "Form registered");

        self.forms.push(form);
        self.validated = false;
        Ok(())
    }

    /// Registers every form of group `name` available in the current mode.
    ///
    /// # Errors
    /// [`FormError::UnknownGroup`] when no such group exists or it is not
    /// available in the current mode.
    pub fn register_group(&mut self, name: &str, server: Option<u32>) -> Result<(), FormError> {
        let user_mode = self.mode().is_user_preferences();
        let group = self
            .store
            .schema()
            .group(name)
            .filter(|g| !(user_mode && g.setup_only))
            .ok_or_else(|| FormError::UnknownGroup {
                message: name.to_owned().into(),
                context: None,
            })?;

        for spec in group.forms.iter().filter(|f| !(user_mode && f.setup_only)) {
            self.register_form(spec.name, server)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn forms(&self) -> &[Form] {
        &self.forms
    }

    /// Saves a submission when it was made with the save button.
    pub fn process(
        &mut self,
        submission: &Submission,
        allow_partial_save: bool,
        check_form_submit: bool,
    ) -> bool {
        if check_form_submit && !submission.contains_key("submit_save") {
            return false;
        }
        if self.forms.is_empty() {
            return false;
        }
        self.save(submission, allow_partial_save)
    }

    /// Coerces and stores every registered field.
    ///
    /// Returns `true` when every field was accepted. Fields that fail intake
    /// are skipped; with `allow_partial_save` the others are still stored.
    /// Validator errors are reported through [`errors`](Self::errors) and do
    /// not undo the save. Forms of a new server are rebound to the server they
    /// were written to.
    pub fn save(&mut self, submission: &Submission, allow_partial_save: bool) -> bool {
        self.errors.clear();
        self.intake_errors.clear();
        self.validated = false;
        let setup = self.mode().is_setup();
        if setup {
            self.load_userprefs_disallow();
        }

        let mut accepted: Vec<(String, String, ConfigValue)> = Vec::new();
        let forms = std::mem::take(&mut self.forms);
        let mut targets = Vec::with_capacity(forms.len());
        for form in &forms {
            let target = form.is_new_server().then(|| self.store.server_count() + 1);
            targets.push(target);
            for field in form.fields() {
                if let Some((work, value)) = self.intake_field(form, field, submission, setup) {
                    let work = match target {
                        Some(n) => path::reindex(&work, 0, n).into_owned(),
                        None => work,
                    };
                    accepted.push((work, field.system_path.clone(), value));
                }
            }
        }
        self.forms = forms;

        let intake_ok = self.intake_errors.is_empty();
        if !intake_ok && !allow_partial_save {
            debug!(errors = self.intake_errors.len(), "Submission rejected");
            self.validate();
            return false;
        }

        let saved = accepted.len();
        for (work, system, value) in accepted {
            self.store.set(&work, value, Some(&system));
        }
        if setup {
            let disallow =
                self.userprefs_disallow.iter().map(|p| ConfigValue::from(p.as_str())).collect();
            self.store.set(USERPREFS_DISALLOW, ConfigValue::List(disallow), None);
        }
        debug!(saved, errors = self.intake_errors.len(), "Submission saved");

        for (i, target) in targets.into_iter().enumerate() {
            if let Some(server) = target {
                self.rebind_new_server(i, server);
            }
        }
        self.validate();
        intake_ok
    }

    /// Points the new-server form at `forms[i]` to `server`, moving its paths
    /// and intake errors from index 0.
    fn rebind_new_server(&mut self, i: usize, server: u32) {
        if self.store.server_count() < server {
            return;
        }
        let Some(form) = self.forms.get_mut(i) else {
            return;
        };
        form.index = Some(server);
        for field in form.fields() {
            let old = path::work_path(&field.system_path, Some(0)).into_owned();
            self.translated_paths.remove(&old);
            self.system_paths.remove(&old);

            let work = path::work_path(&field.system_path, Some(server)).into_owned();
            if let Some(messages) = self.intake_errors.remove(&old) {
                self.intake_errors.insert(work.clone(), messages);
            }
            self.translated_paths.insert(work.clone(), path::translated_path(&work));
            self.system_paths.insert(work, field.system_path.clone());
        }
        debug!(form = form.name, server, "New server form rebound");
    }

    /// One field of a submission: the work path and coerced value, or `None`
    /// when the field is skipped (errors are recorded).
    fn intake_field(
        &mut self,
        form: &Form,
        field: &FormField,
        submission: &Submission,
        setup: bool,
    ) -> Option<(String, ConfigValue)> {
        let work = path::work_path(&field.system_path, form.index).into_owned();
        let key = path::translated_path(&work);
        let raw = submission.get(&key).map(String::as_str);

        if raw.is_none() && field.option_type != OptionType::Boolean {
            let name = self.store.schema().description(&field.system_path, DescriptionKind::Name);
            self.intake_errors
                .entry(form.name.to_owned())
                .or_default()
                .push(format!("Missing data for {name}"));
            return None;
        }

        if setup && self.store.schema().flags(&field.system_path).contains(OptionFlags::USER_PREFS) {
            if submission.contains_key(&format!("{key}-userprefs-allow")) {
                self.userprefs_disallow.remove(&field.system_path);
            } else {
                self.userprefs_disallow.insert(field.system_path.clone());
            }
        }

        let choices = if field.option_type == OptionType::Select {
            match form.option_value_list(&field.system_path) {
                Ok(choices) => choices,
                Err(e) => {
                    warn!(path = %field.system_path, error = %e, "Select field without choices");
                    return None;
                },
            }
        } else {
            Vec::new()
        };

        match intake::coerce(field.option_type, raw, &choices) {
            Ok(value) if field.system_path == TRUSTED_PROXIES => {
                Some((work, intake::parse_trusted_proxies(value)))
            },
            Ok(value) => Some((work, value)),
            Err(e) => {
                self.record_intake_error(&work, e);
                None
            },
        }
    }

    fn record_intake_error(&mut self, work_path: &str, error: IntakeError) {
        self.intake_errors.entry(work_path.to_owned()).or_default().push(error.to_string());
    }

    fn load_userprefs_disallow(&mut self) {
        self.userprefs_disallow = self
            .store
            .get_value(USERPREFS_DISALLOW)
            .map(ConfigValue::into_list)
            .unwrap_or_default()
            .iter()
            .map(ConfigValue::as_display_string)
            .collect();
    }

    /// Runs the validators over the current values of every registered form.
    /// Results are merged with the intake errors of the last save, keyed by
    /// work path or form name. Repeated calls are no-ops until the next
    /// registration or save.
    pub fn validate(&mut self) {
        if self.validated {
            return;
        }

        let mut ids: Vec<String> = Vec::new();
        let mut values: BTreeMap<String, ConfigValue> = BTreeMap::new();
        for form in &self.forms {
            ids.push(form.name.to_owned());
            for field in form.fields() {
                let work = path::work_path(&field.system_path, form.index);
                ids.push(work.to_string());
                values.insert(
                    field.system_path.clone(),
                    self.store.get_value(&work).unwrap_or_default(),
                );
            }
        }

        let mut errors = self.intake_errors.clone();
        let tester = self.settings.tester.as_deref();
        if let Some(result) = validator::validate(&self.store, &ids, &values, false, tester) {
            for (key, messages) in result {
                let key = self
                    .system_paths
                    .iter()
                    .find(|(_, system)| **system == key)
                    .map_or(key, |(work, _)| work.clone());
                errors.entry(key).or_default().extend(messages);
            }
        }
        self.errors = errors;
        self.validated = true;
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[must_use]
    pub const fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Error summary: one list per field or form.
    #[must_use]
    pub fn display_errors(&self) -> String {
        let schema = self.store.schema();
        self.errors
            .iter()
            .map(|(key, messages)| {
                let name = match self.system_paths.get(key) {
                    Some(system) => schema.description(system, DescriptionKind::Name),
                    None => schema.description(&format!("Form_{key}"), DescriptionKind::Name),
                };
                FormTemplate::errors(&name, messages)
            })
            .collect()
    }

    /// Resets every field with errors to its default.
    pub fn fix_errors(&mut self) {
        self.intake_errors.clear();
        let errors = std::mem::take(&mut self.errors);
        for work in errors.keys() {
            let Some(system) = self.system_paths.get(work) else {
                continue;
            };
            match self.store.get_default(system) {
                Some(default) => self.store.set(work, default, Some(system)),
                None => self.store.remove(work),
            }
        }
        self.validated = false;
    }

    /// Documentation link of an option; import and export options have none.
    #[must_use]
    pub fn get_doc_link(&self, system_path: &str) -> String {
        if system_path.starts_with("Import") || system_path.starts_with("Export") {
            return String::new();
        }
        format!("{}config.html#cfg_{}", self.settings.doc_base, path::option_name(system_path))
    }

    /// Renders every registered form inside one HTML form.
    pub fn display(
        &mut self,
        show_buttons: bool,
        form_action: &str,
        hidden_fields: &[(&str, &str)],
    ) -> String {
        if !self.forms.iter().any(Form::is_new_server) {
            self.validate();
        }
        if self.mode().is_setup() {
            self.load_userprefs_disallow();
        }

        let schema = self.store.schema();
        let mut body = String::new();
        if self.forms.len() > 1 {
            let tabs: Vec<(&str, String)> = self
                .forms
                .iter()
                .map(|f| {
                    let title = schema.description(&format!("Form_{}", f.name), DescriptionKind::Name);
                    (f.name, title.into_owned())
                })
                .collect();
            body.push_str(&FormTemplate::tabs(&tabs));
        }

        let mut tpl = FormTemplate::new();
        for form in &self.forms {
            let key = format!("Form_{}", form.name);
            let no_errors = Vec::new();
            let form_errors = self.errors.get(form.name).unwrap_or(&no_errors);
            body.push_str(&tpl.fieldset_top(
                form.name,
                &schema.description(&key, DescriptionKind::Name),
                &schema.description(&key, DescriptionKind::Description),
                form_errors,
            ));
            for entry in form.entries() {
                match entry {
                    FormEntry::Field(field) => body.push_str(&self.render_field(&tpl, form, field)),
                    FormEntry::GroupStart(title) => body.push_str(&tpl.group_header(title)),
                    FormEntry::GroupEnd => body.push_str(&tpl.group_footer()),
                }
            }
            body.push_str(&tpl.fieldset_bottom(show_buttons));
        }

        FormTemplate::page(form_action, hidden_fields, &body)
    }

    fn render_field(&self, tpl: &FormTemplate, form: &Form, field: &FormField) -> String {
        let schema = self.store.schema();
        let system = field.system_path.as_str();
        let work = path::work_path(system, form.index);
        let id = path::translated_path(&work);

        let default = self.store.get_default(system);
        let stored = self.store.get_value(&work);
        let is_default = stored.is_none() || stored == default;
        let value = stored.or_else(|| default.clone()).unwrap_or_default();

        let mut choices = Vec::new();
        let kind = match field.option_type {
            OptionType::String if is_password(&id) => InputKind::Password,
            OptionType::String => InputKind::Text,
            OptionType::ShortString => InputKind::ShortText,
            OptionType::Integer | OptionType::Double => InputKind::Number,
            OptionType::Boolean => InputKind::Checkbox,
            OptionType::Array => InputKind::List,
            OptionType::Select => {
                choices = form.option_value_list(system).unwrap_or_else(|e| {
                    warn!(path = system, error = %e, "Select field without choices");
                    Vec::new()
                });
                InputKind::Select(&[])
            },
        };

        let (comment, comment_warning) = self.comment(system, &mut choices);
        let kind = match kind {
            InputKind::Select(_) => InputKind::Select(&choices),
            other => other,
        };
        let text = match field.option_type {
            OptionType::Array if system == TRUSTED_PROXIES => {
                Some(intake::format_trusted_proxies(&value))
            },
            _ => None,
        };

        let no_errors = Vec::new();
        let userprefs_allow = (self.mode().is_setup()
            && schema.flags(system).contains(OptionFlags::USER_PREFS))
        .then(|| !self.userprefs_disallow.contains(system));

        tpl.input(&InputField {
            id: &id,
            name: &schema.description(system, DescriptionKind::Name),
            description: &schema.description(system, DescriptionKind::Description),
            doc_link: &self.get_doc_link(system),
            kind,
            value: &value,
            text: text.as_deref(),
            is_default,
            default: default.as_ref(),
            preset: field.preset.as_ref(),
            comment: Some(comment.as_str()),
            comment_warning,
            userprefs_allow,
            errors: self.errors.get(&*work).unwrap_or(&no_errors),
        })
    }

    /// Field comment and whether it is a warning. Unavailable choices are
    /// marked in `choices`.
    fn comment(&self, system_path: &str, choices: &mut [SelectOption]) -> (String, bool) {
        let caps = self.settings.capabilities;
        match system_path {
            "RecodingEngine" => {
                let mut missing = Vec::new();
                for (engine, extension, capability) in [
                    ("iconv", "iconv", Capabilities::ICONV),
                    ("recode", "recode", Capabilities::RECODE),
                    ("mb", "mbstring", Capabilities::MBSTRING),
                ] {
                    if caps.contains(capability) {
                        continue;
                    }
                    if let Some(choice) =
                        choices.iter_mut().find(|c| c.key.as_str() == Some(engine))
                    {
                        choice.label.push_str(" (unavailable)");
                    }
                    missing.push(format!("\"{engine}\" requires {extension} extension"));
                }
                (missing.join(", "), true)
            },
            "ZipDump" | "GZipDump" | "BZipDump" => {
                let (name, capability) = match system_path {
                    "ZipDump" => ("zip", Capabilities::ZIP),
                    "GZipDump" => ("gzip", Capabilities::GZIP),
                    _ => ("bzip2", Capabilities::BZIP2),
                };
                let comment = if caps.contains(capability) {
                    String::new()
                } else {
                    format!(
                        "Compressed import and export will not work due to missing {name} support."
                    )
                };
                (comment, true)
            },
            "MaxDbList" | "MaxTableList" | "QueryHistoryMax" if self.mode().is_user_preferences() => {
                let max = self.store.base_value(system_path).unwrap_or_default();
                (format!("maximum {max}"), false)
            },
            _ => (
                self.store
                    .schema()
                    .description(system_path, DescriptionKind::Comment)
                    .into_owned(),
                false,
            ),
        }
    }
}

/// Password inputs are used for ids ending in `-password`, `pass` or `Pass`.
fn is_password(translated_path: &str) -> bool {
    translated_path.ends_with("-password")
        || translated_path.ends_with("pass")
        || translated_path.ends_with("Pass")
}
