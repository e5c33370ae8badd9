//! The option registry: defaults, input types, flags, validators, descriptions
//! and form layouts, assembled once from the static tables in `definitions`.

use crate::definitions;
use crate::descriptions;
use crate::error::FormError;
use crate::form::{FieldSpec, FormGroup, FormSpec};
use crate::validator::ValidatorSpec;
use fxhash::FxHashMap;
use quarry_kernel::domain::ConfigValue;
use quarry_kernel::domain::ValueKind;
use quarry_kernel::domain::flags::OptionFlags;
use quarry_kernel::domain::path;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::debug;

/// A constant usable in static tables; converts to [`ConfigValue`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(&'static str),
    EmptyList,
    EmptyMap,
}

impl Literal {
    #[must_use]
    pub fn to_value(self) -> ConfigValue {
        match self {
            Self::Bool(b) => ConfigValue::Bool(b),
            Self::Int(i) => ConfigValue::Int(i),
            Self::Double(d) => ConfigValue::Double(d),
            Self::Str(s) => ConfigValue::from(s),
            Self::EmptyList => ConfigValue::List(Vec::new()),
            Self::EmptyMap => ConfigValue::Map(BTreeMap::new()),
        }
    }
}

/// How an option is edited and coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    Boolean,
    Integer,
    Double,
    String,
    ShortString,
    Select,
    Array,
}

impl OptionType {
    /// Input type implied by a default value, if any.
    #[must_use]
    pub const fn from_kind(kind: ValueKind) -> Option<Self> {
        match kind {
            ValueKind::Boolean => Some(Self::Boolean),
            ValueKind::Integer => Some(Self::Integer),
            ValueKind::Double => Some(Self::Double),
            ValueKind::String => Some(Self::String),
            ValueKind::Array => Some(Self::Array),
            ValueKind::Null => None,
        }
    }
}

/// Allowed values of a select option.
#[derive(Debug, Clone, Copy)]
pub enum ValueList {
    /// Keys equal the values; boolean values become integer keys.
    Plain(&'static [Literal]),
    /// Explicit key/label pairs.
    Labeled(&'static [(Literal, &'static str)]),
}

/// Type override for an option.
#[derive(Debug, Clone, Copy)]
pub enum DbEntry {
    Type(OptionType),
    Values(ValueList),
}

/// One `<option>` of a select field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub key: ConfigValue,
    pub label: String,
    /// The key stands for a boolean and is stored as one.
    pub boolean: bool,
}

impl SelectOption {
    fn from_literal(literal: Literal, label: String) -> Self {
        Self { key: select_key(literal), label, boolean: matches!(literal, Literal::Bool(_)) }
    }

    /// Value written to the store when this option is chosen.
    #[must_use]
    pub fn stored_value(&self) -> ConfigValue {
        match (&self.key, self.boolean) {
            (ConfigValue::Int(i), true) => ConfigValue::Bool(*i != 0),
            (key, _) => key.clone(),
        }
    }
}

/// Which text of a description entry to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionKind {
    Name,
    Description,
    Comment,
}

#[derive(Debug, Clone, Copy)]
pub struct Description {
    pub name: &'static str,
    pub desc: &'static str,
    pub cmt: &'static str,
}

#[derive(Debug)]
pub struct Schema {
    defaults: FxHashMap<&'static str, ConfigValue>,
    db: FxHashMap<&'static str, DbEntry>,
    flags: FxHashMap<String, OptionFlags>,
    validators: FxHashMap<&'static str, &'static [ValidatorSpec]>,
    user_validators: FxHashMap<&'static str, &'static [ValidatorSpec]>,
    descriptions: FxHashMap<&'static str, Description>,
    groups: &'static [FormGroup],
}

static GLOBAL: LazyLock<Schema> = LazyLock::new(Schema::build);

impl Schema {
    /// The process-wide registry.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    fn build() -> Self {
        let mut flags: FxHashMap<String, OptionFlags> = FxHashMap::default();
        for &path in definitions::PERSIST {
            flags.entry(path.to_owned()).or_default().insert(OptionFlags::PERSIST);
        }
        for group in definitions::GROUPS.iter().filter(|g| !g.setup_only) {
            for form in group.forms.iter().filter(|f| !f.setup_only) {
                for field in form.field_paths() {
                    flags.entry(field).or_default().insert(OptionFlags::USER_PREFS);
                }
            }
        }

        let schema = Self {
            defaults: definitions::DEFAULTS.iter().map(|(p, v)| (*p, v.to_value())).collect(),
            db: definitions::DB_ENTRIES.iter().copied().collect(),
            flags,
            validators: definitions::VALIDATORS.iter().copied().collect(),
            user_validators: definitions::USER_VALIDATORS.iter().copied().collect(),
            descriptions: descriptions::TABLE.iter().map(|(k, d)| (*k, *d)).collect(),
            groups: definitions::GROUPS,
        };
        debug!(
            options = schema.defaults.len(),
            groups = schema.groups.len(),
            "Option schema assembled"
        );
        schema
    }

    /// Schema default of a system path.
    #[must_use]
    pub fn default_value(&self, system_path: &str) -> Option<&ConfigValue> {
        self.defaults.get(system_path)
    }

    #[must_use]
    pub fn db_entry(&self, system_path: &str) -> Option<DbEntry> {
        self.db.get(system_path).copied()
    }

    /// The db entry when present, else the type of the default value.
    #[must_use]
    pub fn option_type(&self, system_path: &str) -> Option<OptionType> {
        match self.db_entry(system_path) {
            Some(DbEntry::Type(ty)) => Some(ty),
            Some(DbEntry::Values(_)) => Some(OptionType::Select),
            None => self.default_value(system_path).and_then(|v| OptionType::from_kind(v.kind())),
        }
    }

    /// Ordered choices of a select option.
    ///
    /// # Errors
    /// [`FormError::Schema`] when the path has no value list.
    pub fn option_value_list(&self, system_path: &str) -> Result<Vec<SelectOption>, FormError> {
        let list = match self.db_entry(system_path) {
            Some(DbEntry::Values(list)) => list,
            Some(DbEntry::Type(_)) => {
                return Err(FormError::Schema {
                    message: format!("{system_path} - not a static value list").into(),
                    context: None,
                });
            },
            None => {
                return Err(FormError::Schema {
                    message: format!("{system_path} - select options not defined").into(),
                    context: None,
                });
            },
        };

        Ok(match list {
            ValueList::Plain(values) => values
                .iter()
                .map(|v| SelectOption::from_literal(*v, select_label(*v)))
                .collect(),
            ValueList::Labeled(pairs) => pairs
                .iter()
                .map(|(k, label)| SelectOption::from_literal(*k, (*label).to_owned()))
                .collect(),
        })
    }

    #[must_use]
    pub fn flags(&self, system_path: &str) -> OptionFlags {
        self.flags.get(system_path).copied().unwrap_or_default()
    }

    /// System paths that may be changed in user preferences.
    pub fn user_pref_paths(&self) -> impl Iterator<Item = &str> {
        self.flags
            .iter()
            .filter(|(_, f)| f.contains(OptionFlags::USER_PREFS))
            .map(|(p, _)| p.as_str())
    }

    /// Validators registered for an option path or form name. User-preference
    /// mode adds the user validators after the common ones.
    pub fn validators(
        &self,
        id: &str,
        user_mode: bool,
    ) -> impl Iterator<Item = &'static ValidatorSpec> + use<'_> {
        let common = self.validators.get(id).copied().unwrap_or_default();
        let extra =
            if user_mode { self.user_validators.get(id).copied().unwrap_or_default() } else { &[] };
        common.iter().chain(extra)
    }

    #[must_use]
    pub fn has_validators(&self, id: &str, user_mode: bool) -> bool {
        self.validators(id, user_mode).next().is_some()
    }

    /// Human text for a path or `Form_<name>` key. Names fall back to the last
    /// path segment; descriptions and comments fall back to empty.
    #[must_use]
    pub fn description(&self, path: &str, kind: DescriptionKind) -> Cow<'static, str> {
        let key = path::option_name(&path::canonical_path(path));
        match (self.descriptions.get(key.as_str()), kind) {
            (Some(d), DescriptionKind::Name) => Cow::Borrowed(d.name),
            (Some(d), DescriptionKind::Description) => Cow::Borrowed(d.desc),
            (Some(d), DescriptionKind::Comment) => Cow::Borrowed(d.cmt),
            (None, DescriptionKind::Name) => {
                let name = path.strip_prefix("Form_").unwrap_or_else(|| path::field_name(path));
                Cow::Owned(name.replace('_', " "))
            },
            (None, _) => Cow::Borrowed(""),
        }
    }

    #[must_use]
    pub const fn groups(&self) -> &'static [FormGroup] {
        self.groups
    }

    #[must_use]
    pub fn group(&self, name: &str) -> Option<&'static FormGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// A form definition by name, with its group.
    #[must_use]
    pub fn form(&self, name: &str) -> Option<(&'static FormGroup, &'static FormSpec)> {
        self.groups
            .iter()
            .find_map(|g| g.forms.iter().find(|f| f.name == name).map(|f| (g, f)))
    }

    /// Every option path referenced by any form.
    pub fn form_paths(&self) -> impl Iterator<Item = String> + '_ {
        self.groups.iter().flat_map(|g| g.forms.iter()).flat_map(FormSpec::field_paths)
    }
}

/// Boolean values are keyed as 0/1.
fn select_key(literal: Literal) -> ConfigValue {
    match literal {
        Literal::Bool(b) => ConfigValue::Int(i64::from(b)),
        other => other.to_value(),
    }
}

fn select_label(literal: Literal) -> String {
    match literal {
        Literal::Bool(true) => "yes".to_owned(),
        Literal::Bool(false) => "no".to_owned(),
        other => other.to_value().as_display_string(),
    }
}

impl FormSpec {
    /// System paths of all fields, in order.
    pub fn field_paths(&self) -> impl Iterator<Item = String> + '_ {
        let mut out = Vec::new();
        collect_paths(self.fields, "", &mut out);
        out.into_iter()
    }
}

fn collect_paths(specs: &[FieldSpec], prefix: &str, out: &mut Vec<String>) {
    for spec in specs {
        match spec {
            FieldSpec::Option(p) | FieldSpec::Preset(p, _) => out.push(join(prefix, p)),
            FieldSpec::Nested(p, children) => collect_paths(children, &join(prefix, p), out),
            FieldSpec::Group(_) | FieldSpec::GroupEnd => {},
        }
    }
}

pub(crate) fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() { segment.to_owned() } else { format!("{prefix}/{segment}") }
}
