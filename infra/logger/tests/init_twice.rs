use quarry_logger::{LevelFilter, Logger, LoggerError};

#[test]
fn second_init_reports_subscriber_error() {
    let _logger = Logger::builder()
        .name("quarry-first")
        .level(LevelFilter::WARN)
        .init()
        .expect("first init should succeed");

    let err = Logger::builder().name("quarry-second").init().expect_err("second init should fail");

    assert!(matches!(err, LoggerError::Subscriber { .. }), "unexpected error: {err}");
}

#[test]
fn logger_without_outputs_is_rejected() {
    let err = Logger::builder().name("quarry-silent").console(false).init().unwrap_err();
    assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
}
