use std::borrow::Cow;

/// Errors of the configuration forms feature.
#[quarry_derive::quarry_error]
pub enum FormError {
    #[error("Unknown form{}: {message}", format_context(.context))]
    UnknownForm { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unknown form group{}: {message}", format_context(.context))]
    UnknownGroup { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unknown server{}: {message}", format_context(.context))]
    UnknownServer { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The option schema has no usable entry for a path.
    #[error("Schema error{}: {message}", format_context(.context))]
    Schema { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid request{}: {message}", format_context(.context))]
    BadRequest { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[cfg(feature = "server")]
    #[error("Storage error{}: {source}", format_context(.context))]
    Storage { source: quarry_storage::StorageError, context: Option<Cow<'static, str>> },

    #[cfg(feature = "server")]
    #[error("Forms state error{}: {source}", format_context(.context))]
    State { source: quarry_kernel::server::ApiStateError, context: Option<Cow<'static, str>> },

    #[error("Internal forms error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
