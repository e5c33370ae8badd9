//! Setup overview page.

use super::edits_servers;
use crate::schema::{DescriptionKind, Schema};
use crate::template::escape;
use std::fmt::Write;

/// Lists every form group and the configured servers with edit and delete
/// actions. `servers` holds `(index, name, dsn)`.
pub(super) fn overview(servers: &[(u32, String, String)]) -> String {
    let schema = Schema::global();
    let mut html = String::from("<h2>Settings</h2>\n<ul class=\"groups\">\n");
    for group in schema.groups() {
        let _ = writeln!(
            html,
            "<li><a href=\"/setup/forms/{}\">{}</a></li>",
            escape(group.name),
            escape(&schema.description(group.name, DescriptionKind::Name))
        );
    }
    html.push_str("</ul>\n");

    let Some(server_group) = schema.groups().iter().find(|g| edits_servers(g)) else {
        return html;
    };
    let edit = format!("/setup/forms/{}", escape(server_group.name));

    html.push_str("<h2>Servers</h2>\n");
    if servers.is_empty() {
        html.push_str("<p>There are no configured servers</p>\n");
    } else {
        html.push_str("<table class=\"servers\">\n<tr><th>#</th><th>Name</th><th>DSN</th><th></th></tr>\n");
        for (index, name, dsn) in servers {
            let _ = writeln!(
                html,
                "<tr><td>{index}</td><td>{}</td><td><code>{}</code></td><td>\
                 <a href=\"{edit}?server={index}\">Edit</a> \
                 <form method=\"post\" action=\"/setup/servers/{index}/delete\">\
                 <input type=\"submit\" value=\"Delete\"></form></td></tr>",
                escape(name),
                escape(dsn)
            );
        }
        html.push_str("</table>\n");
    }
    let _ = writeln!(html, "<p><a href=\"{edit}?server=0\">New server</a></p>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_groups_and_servers() {
        let html = overview(&[(1, "db <main>".to_owned(), "mysql://localhost".to_owned())]);
        assert!(html.contains("href=\"/setup/forms/Main_panel\">Main panel</a>"));
        assert!(html.contains("db &lt;main&gt;"));
        assert!(html.contains("action=\"/setup/servers/1/delete\""));
        assert!(html.contains("/setup/forms/Servers?server=0"));
    }

    #[test]
    fn empty_server_list() {
        let html = overview(&[]);
        assert!(html.contains("There are no configured servers"));
    }
}
