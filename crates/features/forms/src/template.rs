//! HTML fragments of the form pages.

use crate::intake::select_matches;
use crate::schema::SelectOption;
use quarry_kernel::domain::ConfigValue;
use std::fmt::Write;

/// Escapes text for element content and quoted attributes.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Widget used for a field.
#[derive(Debug, Clone, Copy)]
pub enum InputKind<'a> {
    Text,
    Password,
    ShortText,
    Number,
    Checkbox,
    Select(&'a [SelectOption]),
    /// Textarea, one item per line.
    List,
}

/// Everything needed to render one field row.
#[derive(Debug, Clone)]
pub struct InputField<'a> {
    /// Translated path, used as id and name.
    pub id: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub doc_link: &'a str,
    pub kind: InputKind<'a>,
    pub value: &'a ConfigValue,
    /// Textarea text, when it differs from the value's display text.
    pub text: Option<&'a str>,
    pub is_default: bool,
    pub default: Option<&'a ConfigValue>,
    pub preset: Option<&'a ConfigValue>,
    pub comment: Option<&'a str>,
    pub comment_warning: bool,
    /// `Some(checked)` renders the user-preference allow checkbox.
    pub userprefs_allow: Option<bool>,
    pub errors: &'a [String],
}

/// Tracks open groups so the fieldset can close them.
#[derive(Debug, Default)]
pub struct FormTemplate {
    group_depth: usize,
}

impl FormTemplate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fieldset_top(
        &mut self,
        id: &str,
        title: &str,
        description: &str,
        errors: &[String],
    ) -> String {
        self.group_depth = 0;
        let mut html = format!(
            "<fieldset class=\"optbox\" id=\"{}\">\n<legend>{}</legend>\n",
            escape(id),
            escape(title)
        );
        if !description.is_empty() {
            let _ = writeln!(html, "<p>{}</p>", escape(description));
        }
        if !errors.is_empty() {
            html.push_str("<div class=\"errors\">\n");
            for error in errors {
                let _ = writeln!(html, "<span>{}</span>", escape(error));
            }
            html.push_str("</div>\n");
        }
        html.push_str("<table class=\"config-form\">\n");
        html
    }

    /// Closes any open group, the table and the fieldset.
    pub fn fieldset_bottom(&mut self, show_buttons: bool) -> String {
        let mut html = String::new();
        while self.group_depth > 0 {
            html.push_str(&self.group_footer());
        }
        if show_buttons {
            html.push_str(
                "<tr><td colspan=\"2\" class=\"lastrow\">\
                 <input type=\"submit\" name=\"submit_save\" value=\"Apply\">\
                 <input type=\"reset\" name=\"submit_reset\" value=\"Reset\">\
                 </td></tr>\n",
            );
        }
        html.push_str("</table>\n</fieldset>\n");
        html
    }

    pub fn group_header(&mut self, title: &str) -> String {
        self.group_depth += 1;
        format!(
            "<tr class=\"group-header group-header-{}\"><th colspan=\"2\">{}</th></tr>\n",
            self.group_depth,
            escape(title)
        )
    }

    pub fn group_footer(&mut self) -> String {
        if self.group_depth == 0 {
            return String::new();
        }
        let html = format!(
            "<tr class=\"group-footer group-footer-{}\"><td colspan=\"2\"></td></tr>\n",
            self.group_depth
        );
        self.group_depth -= 1;
        html
    }

    /// One field row: label, widget, helpers and inline errors.
    #[must_use]
    pub fn input(&self, field: &InputField<'_>) -> String {
        let id = escape(field.id);
        let row_class = if self.group_depth > 0 {
            format!(" class=\"group-field group-field-{}\"", self.group_depth)
        } else {
            String::new()
        };

        let mut html = format!("<tr{row_class}>\n<th><label for=\"{id}\">{}</label>", escape(field.name));
        if !field.doc_link.is_empty() {
            let _ = write!(
                html,
                " <a class=\"doc\" href=\"{}\" target=\"documentation\">?</a>",
                escape(field.doc_link)
            );
        }
        if !field.description.is_empty() {
            let _ = write!(html, "<small>{}</small>", escape(field.description));
        }
        html.push_str("</th>\n<td>");

        let changed = if field.is_default { "" } else { " class=\"custom\"" };
        let text = field.text.map_or_else(|| field.value.as_display_string(), str::to_owned);
        match field.kind {
            InputKind::Text | InputKind::Password | InputKind::ShortText | InputKind::Number => {
                let (ty, size) = match field.kind {
                    InputKind::Password => ("password", " size=\"25\""),
                    InputKind::ShortText => ("text", " size=\"25\""),
                    InputKind::Number => ("number", ""),
                    _ => ("text", " size=\"40\""),
                };
                let _ = write!(
                    html,
                    "<input type=\"{ty}\"{size}{changed} id=\"{id}\" name=\"{id}\" value=\"{}\">",
                    escape(&text)
                );
            },
            InputKind::Checkbox => {
                let checked = if field.value.is_empty() { "" } else { " checked" };
                let _ = write!(
                    html,
                    "<span class=\"checkbox{}\"><input type=\"checkbox\" id=\"{id}\" name=\"{id}\"{checked}></span>",
                    if field.is_default { "" } else { " custom" }
                );
            },
            InputKind::Select(choices) => {
                let _ = write!(html, "<select{changed} id=\"{id}\" name=\"{id}\">");
                for choice in choices {
                    let key = match &choice.key {
                        ConfigValue::Bool(b) => i64::from(*b).to_string(),
                        other => other.as_display_string(),
                    };
                    let selected =
                        if select_matches(&choice.key, field.value) { " selected" } else { "" };
                    let _ = write!(
                        html,
                        "<option value=\"{}\"{selected}>{}</option>",
                        escape(&key),
                        escape(&choice.label)
                    );
                }
                html.push_str("</select>");
            },
            InputKind::List => {
                let _ = write!(
                    html,
                    "<textarea cols=\"35\" rows=\"5\"{changed} id=\"{id}\" name=\"{id}\">{}</textarea>",
                    escape(&text)
                );
            },
        }

        if let Some(preset) = field.preset {
            let _ = write!(
                html,
                " <a class=\"set-value\" href=\"#{id}={}\" title=\"Set value: {}\">set value</a>",
                escape(&preset.as_display_string()),
                escape(&preset.as_display_string())
            );
        }
        if let (Some(default), false) = (field.default, field.is_default) {
            let _ = write!(
                html,
                " <a class=\"restore-default\" href=\"#{id}\" data-default=\"{}\">Restore default value</a>",
                escape(&default.as_display_string())
            );
        }
        if let Some(allowed) = field.userprefs_allow {
            let checked = if allowed { " checked" } else { "" };
            let _ = write!(
                html,
                " <span class=\"userprefs-allow\" title=\"Allow users to customize this value\">\
                 <input type=\"checkbox\" id=\"{id}-userprefs-allow\" name=\"{id}-userprefs-allow\"{checked}></span>"
            );
        }
        if let Some(comment) = field.comment.filter(|c| !c.is_empty()) {
            let class = if field.comment_warning { "field-comment-warning" } else { "field-comment" };
            let _ = write!(html, " <span class=\"{class}\">{}</span>", escape(comment));
        }
        if !field.errors.is_empty() {
            html.push_str("<dl class=\"inline_errors\">");
            for error in field.errors {
                let _ = write!(html, "<dd>{}</dd>", escape(error));
            }
            html.push_str("</dl>");
        }
        html.push_str("</td>\n</tr>\n");
        html
    }

    /// Error list for one field or form.
    #[must_use]
    pub fn errors(name: &str, messages: &[String]) -> String {
        let mut html = format!("<dl>\n<dt>{}</dt>\n", escape(name));
        for message in messages {
            let _ = writeln!(html, "<dd>{}</dd>", escape(message));
        }
        html.push_str("</dl>\n");
        html
    }

    /// Tab strip; each tab links to the fieldset with the same id.
    #[must_use]
    pub fn tabs(tabs: &[(&str, String)]) -> String {
        let mut html = String::from("<ul class=\"tabs\">\n");
        for (id, title) in tabs {
            let _ = writeln!(html, "<li><a href=\"#{}\">{}</a></li>", escape(id), escape(title));
        }
        html.push_str("</ul>\n");
        html
    }

    /// Wraps `body` in a POST form with the hidden fields.
    #[must_use]
    pub fn page(action: &str, hidden_fields: &[(&str, &str)], body: &str) -> String {
        let mut html = format!(
            "<form method=\"post\" action=\"{}\" class=\"config-form disableAjax\">\n",
            escape(action)
        );
        for (name, value) in hidden_fields {
            let _ = writeln!(
                html,
                "<input type=\"hidden\" name=\"{}\" value=\"{}\">",
                escape(name),
                escape(value)
            );
        }
        html.push_str(body);
        html.push_str("</form>\n");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field<'a>(value: &'a ConfigValue, kind: InputKind<'a>) -> InputField<'a> {
        InputField {
            id: "Servers-1-host",
            name: "Server hostname",
            description: "",
            doc_link: "",
            kind,
            value,
            text: None,
            is_default: true,
            default: None,
            preset: None,
            comment: None,
            comment_warning: false,
            userprefs_allow: None,
            errors: &[],
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn fieldset_bottom_closes_open_groups() {
        let mut tpl = FormTemplate::new();
        let _ = tpl.fieldset_top("Server", "Basic settings", "", &[]);
        let _ = tpl.group_header("Config authentication");
        let bottom = tpl.fieldset_bottom(true);
        assert!(bottom.starts_with("<tr class=\"group-footer group-footer-1\">"));
        assert!(bottom.contains("name=\"submit_save\""));
        assert!(tpl.group_footer().is_empty());
    }

    #[test]
    fn text_inputs_escape_values() {
        let value = ConfigValue::from("\"db\"");
        let html = FormTemplate::new().input(&field(&value, InputKind::Text));
        assert!(html.contains("value=\"&quot;db&quot;\""));
        assert!(html.contains("id=\"Servers-1-host\""));
        assert!(!html.contains("restore-default"));
    }

    #[test]
    fn selects_mark_the_current_choice() {
        let choices = [
            SelectOption { key: ConfigValue::Int(0), label: "no".into(), boolean: true },
            SelectOption { key: ConfigValue::from("blob"), label: "blob".into(), boolean: false },
        ];
        let value = ConfigValue::Bool(false);
        let html = FormTemplate::new().input(&field(&value, InputKind::Select(&choices)));
        assert!(html.contains("<option value=\"0\" selected>no</option>"));
        assert!(html.contains("<option value=\"blob\">blob</option>"));
    }

    #[test]
    fn helpers_render_when_requested() {
        let value = ConfigValue::from("db1");
        let default = ConfigValue::from("localhost");
        let errors = vec!["Incorrect value!".to_owned()];
        let mut input = field(&value, InputKind::Text);
        input.is_default = false;
        input.default = Some(&default);
        input.userprefs_allow = Some(false);
        input.comment = Some("note");
        input.errors = &errors;

        let html = FormTemplate::new().input(&input);
        assert!(html.contains("data-default=\"localhost\""));
        assert!(html.contains("name=\"Servers-1-host-userprefs-allow\">"));
        assert!(html.contains("<span class=\"field-comment\">note</span>"));
        assert!(html.contains("<dd>Incorrect value!</dd>"));
    }

    #[test]
    fn page_wraps_hidden_fields() {
        let html = FormTemplate::page("/setup?a=1&b=2", &[("token", "x<y")], "BODY");
        assert!(html.contains("action=\"/setup?a=1&amp;b=2\""));
        assert!(html.contains("value=\"x&lt;y\""));
        assert!(html.ends_with("BODY</form>\n"));
    }
}
