//! Validator registry.
//!
//! Validators receive a map of canonical path -> value and report
//! `path -> messages`. An empty message list means the path is valid and any
//! previous error for it should be cleared.

use crate::intake::TRUSTED_PROXY_PATTERN;
use crate::store::ConfigStore;
use fxhash::FxHashMap;
use parking_lot::Mutex;
use quarry_kernel::domain::ConfigValue;
use quarry_kernel::domain::path;
use regex::Regex;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::net::IpAddr;
use std::sync::LazyLock;
use tracing::{debug, warn};

pub type ValidationErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorSpec {
    PositiveNumber,
    NonNegativeNumber,
    PortNumber,
    /// The value must match the pattern.
    ByRegex(&'static str),
    /// The value must not exceed the base configuration value of the path.
    UpperBound(&'static str),
    /// The value must itself be a valid regular expression.
    Regex,
    TrustedProxies,
    Server,
    PmaStorage,
}

/// Connection settings handed to a [`ConnectionTester`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub host: String,
    pub port: String,
    pub socket: String,
    pub user: String,
    pub password: String,
}

/// Failure reported by a [`ConnectionTester`]. The display text is shown next
/// to the server form.
#[quarry_derive::quarry_error]
pub enum ConnectionError {
    /// The server rejected the connection or the credentials.
    #[error("{message}{}", format_context(.context))]
    Refused { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Connection test failed{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Live connection test used by the `Server` and `PmaStorage` validators.
pub trait ConnectionTester: Debug + Send + Sync {
    /// # Errors
    /// [`ConnectionError`] describing why the connection failed.
    fn test(&self, params: &ConnectionParams) -> Result<(), ConnectionError>;
}

static PATTERNS: LazyLock<Mutex<FxHashMap<&'static str, Regex>>> =
    LazyLock::new(|| Mutex::new(FxHashMap::default()));

/// Compiled pattern, cached by its text.
pub(crate) fn cached_pattern(pattern: &'static str) -> Option<Regex> {
    let mut cache = PATTERNS.lock();
    if let Some(re) = cache.get(pattern) {
        return Some(re.clone());
    }
    match Regex::new(pattern) {
        Ok(re) => {
            cache.insert(pattern, re.clone());
            Some(re)
        },
        Err(e) => {
            warn!(pattern, error = %e, "Invalid validator pattern");
            None
        },
    }
}

/// Per-path outcome: an empty string means valid.
type Outcome = Vec<(String, String)>;

struct Context<'a, S: ?Sized> {
    store: &'a S,
    tester: Option<&'a dyn ConnectionTester>,
}

/// Runs the validators registered for `ids` over `values`.
///
/// With `is_post_source` the keys of `values` are translated paths (as sent by
/// the browser) and valid paths are reported with an empty list; otherwise
/// only failing paths are reported. Returns `None` when none of the ids has a
/// validator.
pub fn validate<S, I, T>(
    store: &S,
    ids: I,
    values: &BTreeMap<String, ConfigValue>,
    is_post_source: bool,
    tester: Option<&dyn ConnectionTester>,
) -> Option<ValidationErrors>
where
    S: ConfigStore + ?Sized,
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let schema = store.schema();
    let user_mode = store.mode().is_user_preferences();

    let mut vids: Vec<String> = Vec::new();
    for id in ids {
        let id = path::canonical_path(id.as_ref()).into_owned();
        if schema.has_validators(&id, user_mode) && !vids.contains(&id) {
            vids.push(id);
        }
    }
    if vids.is_empty() {
        return None;
    }

    let mut arguments: BTreeMap<String, ConfigValue> = BTreeMap::new();
    let mut key_map: BTreeMap<String, String> = BTreeMap::new();
    for (key, value) in values {
        let untranslated = if is_post_source { path::untranslate(key) } else { key.clone() };
        let canonical = if untranslated.contains('/') {
            path::canonical_path(&untranslated).into_owned()
        } else {
            untranslated
        };
        key_map.insert(canonical.clone(), key.clone());
        arguments.insert(canonical, value.clone());
    }

    let ctx = Context { store, tester };
    let mut result = ValidationErrors::new();
    for vid in &vids {
        for validator in schema.validators(vid, user_mode) {
            for (key, message) in validator.run(vid, &arguments, &ctx) {
                if !is_post_source && message.is_empty() {
                    continue;
                }
                let messages = result.entry(key).or_default();
                if !message.is_empty() {
                    messages.push(message);
                }
            }
        }
    }
    debug!(
        validated = vids.len(),
        failed = result.values().filter(|m| !m.is_empty()).count(),
        "Validation finished"
    );

    Some(
        result
            .into_iter()
            .map(|(key, messages)| (key_map.get(&key).cloned().unwrap_or(key), messages))
            .collect(),
    )
}

impl ValidatorSpec {
    fn run<S: ConfigStore + ?Sized>(
        self,
        id: &str,
        values: &BTreeMap<String, ConfigValue>,
        ctx: &Context<'_, S>,
    ) -> Outcome {
        match self {
            Self::Server => validate_server(values, ctx.tester),
            Self::PmaStorage => validate_pma_storage(values, ctx.tester),
            _ => {
                let Some(value) = values.get(id) else {
                    return Vec::new();
                };
                let message = match self {
                    Self::PositiveNumber => {
                        check_number(value, false, i64::MAX, "Not a positive number!")
                    },
                    Self::NonNegativeNumber => {
                        check_number(value, true, i64::MAX, "Not a non-negative number!")
                    },
                    Self::PortNumber => {
                        check_number(value, true, 65535, "Not a valid port number!")
                    },
                    Self::ByRegex(pattern) => check_pattern(value, pattern),
                    Self::UpperBound(bound_path) => {
                        check_upper_bound(value, ctx.store.base_value(bound_path).as_ref())
                    },
                    Self::Regex => check_regex(value),
                    Self::TrustedProxies => check_trusted_proxies(value),
                    Self::Server | Self::PmaStorage => String::new(),
                };
                vec![(id.to_owned(), message)]
            },
        }
    }
}

fn check_number(value: &ConfigValue, allow_zero: bool, max: i64, message: &str) -> String {
    if matches!(value, ConfigValue::Null) || value.as_str() == Some("") {
        return String::new();
    }
    let valid = value.as_i64().is_some_and(|n| n >= 0 && (allow_zero || n != 0) && n <= max);
    if valid { String::new() } else { message.to_owned() }
}

fn check_pattern(value: &ConfigValue, pattern: &'static str) -> String {
    match cached_pattern(pattern) {
        Some(re) if !re.is_match(&value.as_display_string()) => "Incorrect value!".to_owned(),
        _ => String::new(),
    }
}

fn check_upper_bound(value: &ConfigValue, bound: Option<&ConfigValue>) -> String {
    let Some(bound) = bound else {
        return String::new();
    };
    match (value.as_f64(), bound.as_f64()) {
        (Some(v), Some(max)) if v > max => format!("Value must be less than or equal to {bound}!"),
        _ => String::new(),
    }
}

fn check_regex(value: &ConfigValue) -> String {
    let pattern = value.as_display_string();
    if pattern.is_empty() {
        return String::new();
    }
    match Regex::new(&pattern) {
        Ok(_) => String::new(),
        Err(e) => {
            let text = e.to_string();
            let reason = text.lines().last().map_or(text.as_str(), |l| l.trim_start_matches("error: "));
            format!("Incorrect value: {reason}")
        },
    }
}

fn check_trusted_proxies(value: &ConfigValue) -> String {
    if value.is_empty() {
        return String::new();
    }
    let lines: Vec<String> = match value {
        ConfigValue::Map(map) => map
            .iter()
            .map(|(ip, header)| {
                let header = header.as_display_string();
                if is_unparsed_key(ip) { header } else { format!("{ip}: {header}") }
            })
            .collect(),
        ConfigValue::List(items) => items.iter().map(ConfigValue::as_display_string).collect(),
        other => other.as_display_string().lines().map(str::to_owned).collect(),
    };

    let Some(line_pattern) = cached_pattern(TRUSTED_PROXY_PATTERN) else {
        return String::new();
    };
    for line in lines.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
        let Some(captures) = line_pattern.captures(line) else {
            return format!("Incorrect value: {line}");
        };
        let ip = captures.get(1).map_or("", |m| m.as_str()).trim();
        if ip.parse::<IpAddr>().is_err() {
            return format!("Incorrect IP address: {ip}");
        }
    }
    String::new()
}

/// Keys `-0`, `-1`, ... hold lines that did not parse as `ip: header`.
pub(crate) fn is_unparsed_key(key: &str) -> bool {
    key.strip_prefix('-').is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

fn is_unset(values: &BTreeMap<String, ConfigValue>, path: &str) -> bool {
    values.get(path).is_none_or(ConfigValue::is_empty)
}

fn string_of(values: &BTreeMap<String, ConfigValue>, path: &str) -> String {
    values.get(path).map(ConfigValue::as_display_string).unwrap_or_default()
}

fn validate_server(
    values: &BTreeMap<String, ConfigValue>,
    tester: Option<&dyn ConnectionTester>,
) -> Outcome {
    let mut result: BTreeMap<&str, String> = [
        ("Server", String::new()),
        ("Servers/1/user", String::new()),
        ("Servers/1/SignonSession", String::new()),
        ("Servers/1/SignonURL", String::new()),
    ]
    .into_iter()
    .collect();

    let mut failed = false;
    let auth_type = if is_unset(values, "Servers/1/auth_type") {
        result.insert("Servers/1/auth_type", "Invalid authentication type!".to_owned());
        failed = true;
        String::new()
    } else {
        string_of(values, "Servers/1/auth_type")
    };

    if auth_type == "config" && is_unset(values, "Servers/1/user") {
        result.insert(
            "Servers/1/user",
            "Empty username while using config authentication method!".to_owned(),
        );
        failed = true;
    }
    if auth_type == "signon" && is_unset(values, "Servers/1/SignonSession") {
        result.insert(
            "Servers/1/SignonSession",
            "Empty signon session name while using signon authentication method!".to_owned(),
        );
        failed = true;
    }
    if auth_type == "signon" && is_unset(values, "Servers/1/SignonURL") {
        result.insert(
            "Servers/1/SignonURL",
            "Empty signon URL while using signon authentication method!".to_owned(),
        );
        failed = true;
    }

    if !failed && auth_type == "config" {
        if let Some(tester) = tester {
            let params = ConnectionParams {
                host: string_of(values, "Servers/1/host"),
                port: string_of(values, "Servers/1/port"),
                socket: string_of(values, "Servers/1/socket"),
                user: string_of(values, "Servers/1/user"),
                password: string_of(values, "Servers/1/password"),
            };
            if let Err(e) = tester.test(&params) {
                debug!(error = %e, "Server connection test failed");
                result.insert("Server", e.to_string());
            }
        }
    }

    result.into_iter().map(|(k, v)| (k.to_owned(), v)).collect()
}

fn validate_pma_storage(
    values: &BTreeMap<String, ConfigValue>,
    tester: Option<&dyn ConnectionTester>,
) -> Outcome {
    if is_unset(values, "Servers/1/pmadb") {
        return ["Server_pmadb", "Servers/1/controluser", "Servers/1/controlpass"]
            .into_iter()
            .map(|k| (k.to_owned(), String::new()))
            .collect();
    }

    let mut result = Outcome::new();
    if is_unset(values, "Servers/1/controluser") {
        result.push((
            "Servers/1/controluser".to_owned(),
            "Empty phpMyAdmin control user while using phpMyAdmin configuration storage!"
                .to_owned(),
        ));
    }
    if is_unset(values, "Servers/1/controlpass") {
        result.push((
            "Servers/1/controlpass".to_owned(),
            "Empty phpMyAdmin control user password while using phpMyAdmin configuration storage!"
                .to_owned(),
        ));
    }

    if result.is_empty() {
        if let Some(tester) = tester {
            let params = ConnectionParams {
                host: string_of(values, "Servers/1/host"),
                port: string_of(values, "Servers/1/port"),
                socket: string_of(values, "Servers/1/socket"),
                user: string_of(values, "Servers/1/controluser"),
                password: string_of(values, "Servers/1/controlpass"),
            };
            if let Err(e) = tester.test(&params) {
                debug!(error = %e, "Control user connection test failed");
                result.push(("Server_pmadb".to_owned(), e.to_string()));
            }
        }
    }
    result
}
