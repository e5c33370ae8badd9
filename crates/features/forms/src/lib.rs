//! Configuration forms feature slice.
//!
//! Declarative form layouts over a typed option schema: forms are registered
//! into a [`FormDisplay`], rendered to HTML, and submissions are coerced,
//! validated and written into a [`ConfigStore`]. The same forms serve the
//! setup pages (server configuration) and per-user preferences.
//!
//! ```rust
//! use quarry_forms::{ConfigFile, DisplaySettings, FormDisplay, Schema, Submission};
//!
//! let store = ConfigFile::setup(Schema::global());
//! let mut display = FormDisplay::new(store, DisplaySettings::default());
//! display.register_form("Browse", None).unwrap();
//!
//! let mut submission = Submission::new();
//! submission.insert("MaxRows".into(), "50".into());
//! submission.insert("Order".into(), "ASC".into());
//! submission.insert("RepeatCells".into(), "100".into());
//! submission.insert("submit_save".into(), "Apply".into());
//!
//! assert!(display.process(&submission, false, true));
//! assert_eq!(display.store().user_values()["MaxRows"], 50.into());
//! ```
//!
//! With the `server` feature the crate also provides the axum routes and the
//! feature slice that keeps setup and preference documents in storage.

mod definitions;
mod descriptions;
pub mod display;
pub mod error;
pub mod form;
pub mod intake;
pub mod schema;
#[cfg(feature = "server")]
pub mod server;
pub mod store;
pub mod template;
pub mod validator;

pub use display::{DisplaySettings, FormDisplay, Submission};
pub use error::{FormError, FormErrorExt};
pub use form::{Form, FormEntry, FormField};
pub use schema::{DescriptionKind, OptionType, Schema, SelectOption};
pub use store::{ConfigFile, ConfigStore, Mode};
pub use validator::{
    ConnectionError, ConnectionErrorExt, ConnectionParams, ConnectionTester, ValidationErrors,
    validate,
};
