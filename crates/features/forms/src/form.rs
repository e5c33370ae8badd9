//! Form definitions and their flattened, typed field lists.

use crate::error::FormError;
use crate::schema::{Literal, OptionType, Schema, SelectOption, join};
use quarry_kernel::domain::ConfigValue;
use quarry_kernel::domain::path;
use tracing::warn;

/// One node of a static form layout.
#[derive(Debug, Clone, Copy)]
pub enum FieldSpec {
    Option(&'static str),
    /// Option with a suggested value offered as a "set value" button.
    Preset(&'static str, Literal),
    /// Children are prefixed with `prefix/`.
    Nested(&'static str, &'static [FieldSpec]),
    Group(&'static str),
    GroupEnd,
}

#[derive(Debug)]
pub struct FormSpec {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
    /// Only available in setup.
    pub setup_only: bool,
}

/// A named set of forms shown as tabs on one page.
#[derive(Debug)]
pub struct FormGroup {
    pub name: &'static str,
    pub forms: &'static [FormSpec],
    pub setup_only: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    /// Last path segment.
    pub name: String,
    pub system_path: String,
    pub option_type: OptionType,
    pub preset: Option<ConfigValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormEntry {
    Field(FormField),
    GroupStart(&'static str),
    GroupEnd,
}

/// A form bound to a server index.
#[derive(Debug, Clone)]
pub struct Form {
    pub name: &'static str,
    /// `None` for global forms, `Some(0)` while creating a server.
    pub index: Option<u32>,
    entries: Vec<FormEntry>,
    schema: &'static Schema,
}

impl Form {
    /// Flattens `spec`. Fields rejected by `allow` or without a resolvable
    /// type are dropped, and so are groups left without fields.
    pub fn new(
        spec: &FormSpec,
        index: Option<u32>,
        schema: &'static Schema,
        allow: impl Fn(&str) -> bool,
    ) -> Self {
        let mut flat = Vec::new();
        flatten(spec.fields, "", schema, &allow, &mut flat);

        let mut entries: Vec<FormEntry> = Vec::with_capacity(flat.len());
        for entry in flat {
            if entry == FormEntry::GroupEnd
                && matches!(entries.last(), Some(FormEntry::GroupStart(_)))
            {
                entries.pop();
                continue;
            }
            entries.push(entry);
        }
        if matches!(entries.last(), Some(FormEntry::GroupStart(_))) {
            entries.pop();
        }

        Self { name: spec.name, index, entries, schema }
    }

    #[must_use]
    pub fn entries(&self) -> &[FormEntry] {
        &self.entries
    }

    pub fn fields(&self) -> impl Iterator<Item = &FormField> {
        self.entries.iter().filter_map(|e| match e {
            FormEntry::Field(field) => Some(field),
            _ => None,
        })
    }

    /// Type of a field, looked up by its last path segment.
    #[must_use]
    pub fn option_type(&self, name: &str) -> Option<OptionType> {
        let name = path::field_name(name);
        self.fields().find(|f| f.name == name).map(|f| f.option_type)
    }

    /// # Errors
    /// [`FormError::Schema`] when `system_path` is not a select option.
    pub fn option_value_list(&self, system_path: &str) -> Result<Vec<SelectOption>, FormError> {
        self.schema.option_value_list(system_path)
    }

    /// The server values are written to; a new-server form has no target yet.
    #[must_use]
    pub const fn is_new_server(&self) -> bool {
        matches!(self.index, Some(0))
    }
}

fn flatten(
    specs: &[FieldSpec],
    prefix: &str,
    schema: &Schema,
    allow: &impl Fn(&str) -> bool,
    out: &mut Vec<FormEntry>,
) {
    for spec in specs {
        let (path, preset) = match *spec {
            FieldSpec::Option(p) => (join(prefix, p), None),
            FieldSpec::Preset(p, value) => (join(prefix, p), Some(value.to_value())),
            FieldSpec::Nested(p, children) => {
                flatten(children, &join(prefix, p), schema, allow, out);
                continue;
            },
            FieldSpec::Group(title) => {
                out.push(FormEntry::GroupStart(title));
                continue;
            },
            FieldSpec::GroupEnd => {
                out.push(FormEntry::GroupEnd);
                continue;
            },
        };

        if !allow(&path) {
            continue;
        }
        let Some(option_type) = schema.option_type(&path) else {
            warn!(path = %path, "Form field has no type, skipping");
            continue;
        };
        out.push(FormEntry::Field(FormField {
            name: path::field_name(&path).to_owned(),
            system_path: path,
            option_type,
            preset,
        }));
    }
}
