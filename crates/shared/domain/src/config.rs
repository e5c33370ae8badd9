use crate::flags::Capabilities;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Application settings read by the server at startup.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfigInner {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub forms: FormsConfig,
}

/// Arc-wrapped so handlers and slices can hold a copy for free.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(flatten, default)]
    inner: Arc<AppConfigInner>,
}

impl Deref for AppConfig {
    type Target = AppConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for AppConfig {
    fn deref_mut(&mut self) -> &mut AppConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// TLS certificate and key (PEM).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Where setup and user-preference documents are kept.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    /// Indent stored JSON documents.
    pub pretty: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub name: String,
    /// `trace`, `debug`, `info`, `warn`, `error` or `off`.
    pub level: String,
    /// Extra filter directives, e.g. `quarry_forms=debug`.
    pub filter: Option<String>,
    pub console: bool,
    /// Enables rolling files in this directory.
    pub directory: Option<PathBuf>,
    pub json: bool,
    pub max_files: usize,
}

/// Settings of the configuration forms feature.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    /// Prefix of documentation links, e.g. `https://docs.example.org/`.
    pub doc_base: String,
    /// Server features shown as available in option comments.
    pub capabilities: Capabilities,
    /// Save valid fields even when other fields of the same submission fail.
    pub allow_partial_save: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::LOCALHOST), port: 4680, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("data"), pretty: true }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            name: "quarry".to_owned(),
            level: "info".to_owned(),
            filter: None,
            console: true,
            directory: None,
            json: false,
            max_files: 7,
        }
    }
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            doc_base: "./doc/html/".to_owned(),
            capabilities: Capabilities::default(),
            allow_partial_save: true,
        }
    }
}
