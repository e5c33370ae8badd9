#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros used across the Quarry workspace.
//! They remove the boilerplate around error enums, HTTP data models and
//! feature slices so that every crate wires those pieces the same way.
//!
//! ## Usage
//! Depend on the crate through the workspace:
//! ```toml
//! [dependencies]
//! quarry-derive.workspace = true
//! ```
//!
//! The examples below are `ignore`d because they need the consuming crates
//! (`thiserror`, `utoipa`, `quarry-kernel`) to compile.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Attribute macro to define a JSON data model served over HTTP.
///
/// # Injected Behaviors
///
/// * **Derives**: Adds `Debug`, `Serialize`, and `Deserialize` if missing.
/// * **`OpenAPI`**: Adds `utoipa::ToSchema` when the consuming crate enables `server`.
/// * **Serde Policy**:
///     * `rename_all = "camelCase"` by default (can be overridden).
///     * `deny_unknown_fields` by default (can be disabled).
///
/// # Example
///
/// ```rust,ignore
/// use quarry_derive::api_model;
///
/// #[api_model(rename_all = "snake_case", deny_unknown_fields = false)]
/// pub struct ServerSummary {
///     pub index: u32,
///     pub name: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Attribute macro to document an Axum handler with `OpenAPI`.
///
/// Accepts the usual `utoipa::path` arguments (`get`, `post`, `path = "..."`,
/// `responses(...)`, `tag = "..."`). The path attribute is only emitted when the
/// consuming crate enables its `server` feature.
///
/// # Example
///
/// ```rust,ignore
/// use quarry_derive::api_handler;
///
/// #[api_handler(
///     get,
///     path = "/setup/config",
///     responses((status = OK, body = serde_json::Value)),
///     tag = "Setup"
/// )]
/// pub async fn export_config() -> Json<serde_json::Value> {
///     // ...
/// }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Attribute macro for domain error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` when missing.
/// * **Type Alias**: Emits `Result<T, E = ErrorName>` in the same module.
/// * **Context Support**: Generates an `ErrorNameExt` trait that adds `.context()`
///   to `Result<T, ErrorName>` and to `Result<T, Source>` for every wrapped source.
/// * **Standard Conversions**: `From<Source>` for variants with a `source` field
///   (or a field marked `#[source]`/`#[from]`).
/// * **Internal Fallback**: `From<&'static str>` and `From<String>` when an
///   `Internal { message, context }` variant exists.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with named-field variants.
/// 2. Variants with a source must also carry `context: Option<Cow<'static, str>>`.
/// 3. Only one annotated enum per module (the alias and `format_context` helper are module items).
///
/// # Example
///
/// ```rust,ignore
/// use quarry_derive::quarry_error;
/// use std::borrow::Cow;
///
/// #[quarry_error]
/// pub enum StoreError {
///     #[error("IO error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load() -> Result<Vec<u8>> {
///     std::fs::read("config.json").context("Reading setup configuration")
/// }
/// ```
#[proc_macro_attribute]
pub fn quarry_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Attribute macro to define a vertical slice handle.
///
/// The annotated struct becomes `<Name>Inner`; `<Name>` is generated as a cheap
/// `Arc` wrapper that derefs to the inner state and implements
/// `quarry_kernel::domain::registry::FeatureSlice` so it can be registered in the
/// server state.
///
/// # Example
/// ```rust,ignore
/// #[quarry_derive::quarry_slice]
/// pub struct Setup {
///     pub doc_base: String,
/// }
///
/// let slice = Setup::new(SetupInner { doc_base: "./doc/html/".to_owned() });
/// ```
#[proc_macro_attribute]
pub fn quarry_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
