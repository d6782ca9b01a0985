//! Global subscriber installation. Kept in its own test binary because the
//! subscriber can only be installed once per process.

use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_runtime::Error;

#[test]
fn test_init_logging_installs_once() {
    let invalid = LoggingConfig::default().with_filter("core_request=notalevel");
    assert!(matches!(init_logging(invalid), Err(Error::Config(_))));

    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_filter("core_request=debug");
    init_logging(config).unwrap();
    tracing::info!(target: "core_request", "logging installed");

    let again = init_logging(LoggingConfig::default().with_format(LogFormat::Json));
    match again {
        Err(Error::Config(message)) => assert!(message.contains("Failed to initialize logging")),
        other => panic!("expected a config error, got {other:?}"),
    }
}
