use std::io;

mod demo {
    use quarry_derive::quarry_error;
    use std::borrow::Cow;

    #[quarry_error]
    pub enum DemoError {
        #[error("IO error{}: {source}", format_context(.context))]
        Io { source: std::io::Error, context: Option<Cow<'static, str>> },

        #[error("Invalid value{}: {message}", format_context(.context))]
        Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

        #[error("Internal error{}: {message}", format_context(.context))]
        Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    }

    pub fn open(kind: io::ErrorKind) -> Result<()> {
        Err::<(), _>(io::Error::new(kind, "gone"))?;
        Ok(())
    }

    use std::io;
}

use demo::{DemoError, DemoErrorExt};

#[test]
fn quarry_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/quarry_error_pass.rs");
}

#[test]
fn internal_variant_accepts_strings() {
    let err: DemoError = "boom".into();
    assert_eq!(err.to_string(), "Internal error: boom");

    let err: DemoError = format!("code {}", 7).into();
    assert_eq!(err.to_string(), "Internal error: code 7");
}

#[test]
fn context_wraps_source_errors() {
    let raw: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
    let err = raw.context("loading setup").unwrap_err();

    assert!(matches!(err, DemoError::Io { .. }));
    assert_eq!(err.to_string(), "IO error (loading setup): gone");
}

#[test]
fn context_overrides_existing_errors() {
    let raw: demo::Result<()> =
        Err(DemoError::Invalid { message: "port".into(), context: None });
    let err = raw.context("saving form").unwrap_err();

    assert_eq!(err.to_string(), "Invalid value (saving form): port");
}

#[test]
fn question_mark_converts_sources() {
    let err = demo::open(io::ErrorKind::PermissionDenied).unwrap_err();
    assert!(matches!(err, DemoError::Io { context: None, .. }));
}
