//! Option path helpers.
//!
//! Paths are `/`-separated (`Servers/2/host`, `Import/format`). Per-server
//! options are declared once under server 1 (the *system path*) and rendered
//! for a concrete server (the *work path*). HTML ids use the *translated path*
//! where `/` becomes `-`.

use std::borrow::Cow;

const SERVERS: &str = "Servers/";
const TEMPLATE_PREFIX: &str = "Servers/1/";

/// The `n` of a leading `Servers/n/`, if the path has one.
#[must_use]
pub fn server_index(path: &str) -> Option<u32> {
    let (digits, _) = split_server(path)?;
    digits.parse().ok()
}

/// Normalises `Servers/<n>/...` to `Servers/1/...`.
#[must_use]
pub fn canonical_path(path: &str) -> Cow<'_, str> {
    match split_server(path) {
        Some((digits, rest)) if digits != "1" => Cow::Owned(format!("{TEMPLATE_PREFIX}{rest}")),
        _ => Cow::Borrowed(path),
    }
}

/// Renders a system path for `server`. `None` leaves the path untouched.
#[must_use]
pub fn work_path(system_path: &str, server: Option<u32>) -> Cow<'_, str> {
    match server {
        Some(n) => reindex(system_path, 1, n),
        None => Cow::Borrowed(system_path),
    }
}

/// Moves a path from server `from` to server `to`.
#[must_use]
pub fn reindex(path: &str, from: u32, to: u32) -> Cow<'_, str> {
    match split_server(path) {
        Some((digits, rest)) if from != to && digits.parse() == Ok(from) => {
            Cow::Owned(format!("{SERVERS}{to}/{rest}"))
        },
        _ => Cow::Borrowed(path),
    }
}

/// HTML id form of a path.
#[must_use]
pub fn translated_path(path: &str) -> String {
    path.replace('/', "-")
}

/// Inverse of [`translated_path`] for ids coming back from the browser.
#[must_use]
pub fn untranslate(translated: &str) -> String {
    translated.replace('-', "/")
}

/// Documentation anchor name: `Servers/1/host` -> `Servers_host`.
#[must_use]
pub fn option_name(system_path: &str) -> String {
    let path = match system_path.strip_prefix(TEMPLATE_PREFIX) {
        Some(rest) => Cow::Owned(format!("{SERVERS}{rest}")),
        None => Cow::Borrowed(system_path),
    };
    path.replace('/', "_")
}

/// Last segment of a path.
#[must_use]
pub fn field_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Splits `Servers/<digits>/<rest>` into `(digits, rest)`.
fn split_server(path: &str) -> Option<(&str, &str)> {
    let tail = path.strip_prefix(SERVERS)?;
    let (digits, rest) = tail.split_once('/')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((digits, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalises_any_server_index() {
        assert_eq!(canonical_path("Servers/4/verbose"), "Servers/1/verbose");
        assert_eq!(canonical_path("Servers/1/AllowDeny/order"), "Servers/1/AllowDeny/order");
        assert_eq!(canonical_path("Servers/x/host"), "Servers/x/host");
        assert_eq!(canonical_path("MaxRows"), "MaxRows");
    }

    #[test]
    fn work_paths_follow_the_server() {
        assert_eq!(work_path("Servers/1/host", Some(3)), "Servers/3/host");
        assert_eq!(work_path("Servers/1/host", Some(0)), "Servers/0/host");
        assert_eq!(work_path("Servers/1/host", None), "Servers/1/host");
        assert_eq!(work_path("Export/format", Some(3)), "Export/format");
    }

    #[test]
    fn reindex_only_touches_the_source_server() {
        assert_eq!(reindex("Servers/0/host", 0, 5), "Servers/5/host");
        assert_eq!(reindex("Servers/2/host", 0, 5), "Servers/2/host");
    }

    #[test]
    fn names_and_indexes() {
        assert_eq!(translated_path("Servers/4/verbose"), "Servers-4-verbose");
        assert_eq!(untranslate("Import-csv_terminated"), "Import/csv_terminated");
        assert_eq!(option_name("Servers/1/host"), "Servers_host");
        assert_eq!(option_name("Import/format"), "Import_format");
        assert_eq!(field_name("Servers/1/AllowDeny/order"), "order");
        assert_eq!(field_name("MaxRows"), "MaxRows");
        assert_eq!(server_index("Servers/12/host"), Some(12));
        assert_eq!(server_index("Console/Mode"), None);
    }
}
