mod common;

use std::io;
use std::sync::Arc;

use logerr::{kv, kverrors, Fields, JsonEncoder, KvError, LogSink, Logger, SharedWriter, BufferWriter};
use serde_json::json;

use common::json_lines;

fn logger() -> (Logger, BufferWriter) {
    let buf = BufferWriter::new();
    let sink = LogSink::new("store", buf.shared(), 0, Arc::new(JsonEncoder), kv! { "node" => "n1" });
    (Logger::new(sink), buf)
}

fn load(path: &str) -> Result<String, KvError> {
    let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
    Err(kverrors::wrap(io_err, "open file", kv! { "path" => path }))
}

fn handle(path: &str) -> Result<String, KvError> {
    load(path).map_err(|e| kverrors::wrap(e, "load snapshot", kv! { "snapshot" => 3 }))
}

#[test]
fn error_chain_context_reaches_the_log_line() {
    let (log, buf) = logger();
    let err = handle("/data/snap-3").unwrap_err();
    log.error(&err, "restore failed", kv! { "attempt" => 2 });

    let line = &json_lines(&buf)[0];
    assert_eq!(line["msg"], "restore failed");
    assert_eq!(line["level"], 0);
    assert_eq!(line["causes"], json!(["load snapshot", "open file", "permission denied"]));
    assert_eq!(
        line["fields"],
        json!({
            "node": "n1",
            "attempt": 2,
            "path": "/data/snap-3",
            "snapshot": 3,
            "error": "permission denied"
        })
    );
}

#[test]
fn root_of_wrapped_io_error_is_the_io_error() {
    let err = handle("/x").unwrap_err();
    let root = kverrors::root(&err);
    let io_err = root.downcast_ref::<io::Error>().expect("io root");
    assert_eq!(io_err.kind(), io::ErrorKind::PermissionDenied);
}

#[test]
fn plain_std_errors_are_logged_too() {
    let (log, buf) = logger();
    let err = "abc".parse::<u32>().unwrap_err();
    log.error(&err, "bad input", Fields::new());

    let line = &json_lines(&buf)[0];
    assert_eq!(line["causes"], json!(["invalid digit found in string"]));
    assert_eq!(line["fields"]["error"], "invalid digit found in string");
}

#[test]
fn try_variants_surface_write_failures() {
    struct Broken;
    impl io::Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let sink = LogSink::new("", SharedWriter::new(Broken), 0, Arc::new(JsonEncoder), Fields::new());
    let log = Logger::new(sink);
    assert!(log.try_info("m", Fields::new()).is_err());
    assert!(log.try_error(&KvError::new("e"), "m", Fields::new()).is_err());

    // the infallible forms degrade to a stderr diagnostic
    log.info("m", Fields::new());
    log.error(&KvError::new("e"), "m", Fields::new());
}
