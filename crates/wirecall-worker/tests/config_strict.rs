#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use wirecall_worker::config::{self, DecodeErrorPolicy};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
worker:
  channel_capacity: 16
  on_decode_eror: fail # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.worker.channel_capacity, 1024);
    assert_eq!(cfg.worker.on_decode_error, DecodeErrorPolicy::Drop);
    assert_eq!(cfg.log.filter, "info");
}

#[test]
fn full_config() {
    let ok = r#"
version: 1
worker:
  channel_capacity: 8
  on_decode_error: fail
log:
  filter: "wirecall_worker=debug"
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.worker.channel_capacity, 8);
    assert_eq!(cfg.worker.on_decode_error, DecodeErrorPolicy::Fail);
    assert_eq!(cfg.log.filter, "wirecall_worker=debug");
}

#[test]
fn rejects_unknown_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn rejects_out_of_range_capacity() {
    let bad = "version: 1\nworker:\n  channel_capacity: 0\n";
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
}

#[test]
fn rejects_unknown_decode_policy() {
    let bad = "version: 1\nworker:\n  on_decode_error: retry\n";
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let cfg = config::load_or_default("does/not/exist.yaml").expect("defaults");
    assert_eq!(cfg.version, 1);
}
