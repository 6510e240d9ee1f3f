use multialign_extract::{ExtractError, QueryMode, ScanConfig, SingleQuery, SingleQueryDriver};
use tempfile::tempdir;
use test_case::test_case;

mod common;
use common::write_aligned;

const REFERENCE: &[u8] = b"AC--GT-A";

fn query_file(data: &[u8], offset: u64, length: u64, mode: QueryMode) -> (Vec<u8>, Option<u64>) {
    let dir = tempdir().unwrap();
    let path = write_aligned(dir.path(), "input.txt", data);
    let query = SingleQuery::new(offset, length, mode).unwrap();
    let mut out = Vec::new();
    let outcome = SingleQueryDriver::new(ScanConfig::default())
        .run_path(&path, &query, &mut out)
        .expect("query succeeds");
    (out, outcome.raw_offset)
}

#[test_case(0, 2, b"AC", 0 ; "from start")]
#[test_case(2, 2, b"GT", 4 ; "after gap run")]
#[test_case(1, 3, b"CGT", 1 ; "across gap run")]
#[test_case(4, 1, b"A", 7 ; "last base")]
fn reference_mode(offset: u64, length: u64, expected: &[u8], raw: u64) {
    let (out, raw_offset) = query_file(REFERENCE, offset, length, QueryMode::Reference);
    assert_eq!(out, expected);
    assert_eq!(raw_offset, Some(raw));
}

#[test_case(0, 4, b"AC--" ; "leading window")]
#[test_case(2, 3, b"--G" ; "gaps kept")]
#[test_case(6, 5, b"-A" ; "short at end")]
fn raw_mode(offset: u64, length: u64, expected: &[u8]) {
    let (out, raw_offset) = query_file(REFERENCE, offset, length, QueryMode::Raw);
    assert_eq!(out, expected);
    assert_eq!(raw_offset, None);
}

#[test]
fn reference_mode_out_of_range() {
    let dir = tempdir().unwrap();
    let path = write_aligned(dir.path(), "input.txt", REFERENCE);
    let query = SingleQuery::new(5, 1, QueryMode::Reference).unwrap();
    let err = SingleQueryDriver::new(ScanConfig::default())
        .run_path(&path, &query, &mut Vec::new())
        .unwrap_err();
    assert!(matches!(err, ExtractError::OutOfRange { target: 5, available: 5 }));
}

#[test]
fn usage_errors_precede_io() {
    // No file is touched: validation fails before a path is ever opened.
    assert!(matches!(
        SingleQuery::from_signed(-4, 2, QueryMode::Reference),
        Err(ExtractError::Usage(_))
    ));
    assert!(matches!(
        SingleQuery::new(0, 0, QueryMode::Raw),
        Err(ExtractError::Usage(_))
    ));
}

#[test]
fn missing_input_is_io_error() {
    let dir = tempdir().unwrap();
    let query = SingleQuery::new(0, 1, QueryMode::Raw).unwrap();
    let err = SingleQueryDriver::new(ScanConfig::default())
        .run_path(dir.path().join("absent.txt"), &query, &mut Vec::new())
        .unwrap_err();
    assert!(matches!(err, ExtractError::Io(_)));
}
