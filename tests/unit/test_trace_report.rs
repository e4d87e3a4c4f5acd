//! Unit Tests for Trace Reporting
//!
//! Covers which captured lines get printed for each trace mode.

use procwatch::{render_traces, write_traces, Error, TraceMode};

fn lines() -> Vec<String> {
    vec!["first".to_string(), "second".to_string()]
}

#[test]
fn test_all_returns_everything() {
    assert_eq!(render_traces(TraceMode::All, &lines()).unwrap(), lines());
}

#[test]
fn test_none_returns_nothing() {
    assert!(render_traces(TraceMode::None, &lines()).unwrap().is_empty());
}

#[test]
fn test_target_is_unsupported() {
    let result = render_traces(TraceMode::Target, &lines());
    assert!(matches!(result, Err(Error::TraceModeUnsupported(TraceMode::Target))));
}

#[test]
fn test_write_all_has_leading_blank_line() {
    let mut out = Vec::new();
    write_traces(&mut out, TraceMode::All, &lines()).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "\nfirst\nsecond\n");
}

#[test]
fn test_write_nothing_captured_is_silent() {
    let mut out = Vec::new();
    write_traces(&mut out, TraceMode::All, &[]).unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_invalid_mode_string() {
    let err = "verbose".parse::<TraceMode>().unwrap_err();
    assert!(err.to_string().contains("verbose"));
}
