//! Tests for the streaming row reader

use super::*;
use crate::app::models::SchemaDefinition;
use crate::app::services::record_parser::{ParseOptions, ParsedRow, RecordParser};
use std::io::{self, Cursor, Read};
use std::sync::Arc;

fn collect(parser: &RecordParser, input: &[u8], schema: Arc<SchemaDefinition>) -> Vec<ParsedRow> {
    parser
        .from_reader(Cursor::new(input.to_vec()), "test.txt", schema)
        .unwrap()
        .map(|row| row.unwrap())
        .collect()
}

fn records(rows: &[ParsedRow]) -> Vec<Vec<String>> {
    rows.iter()
        .filter_map(|row| match row {
            ParsedRow::Record(record) => Some(record.fields().to_vec()),
            ParsedRow::Malformed(_) => None,
        })
        .collect()
}

#[test]
fn test_header_is_skipped_and_rows_indexed() {
    let parser = RecordParser::default();
    let rows = collect(&parser, b"A|B|C\n1|2|3\n4|5|6\n", abc_schema());

    assert_eq!(records(&rows), vec![vec!["1", "2", "3"], vec!["4", "5", "6"]]);
    match &rows[1] {
        ParsedRow::Record(record) => {
            assert_eq!(record.row_index(), 1);
            assert_eq!(record.source_file().as_ref(), "test.txt");
            assert_eq!(record.get_named("C"), Some("6"));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_headerless_schema_yields_first_line() {
    let parser = RecordParser::default();
    let rows = collect(&parser, b"1|2|3\n", headerless_schema());
    assert_eq!(records(&rows), vec![vec!["1", "2", "3"]]);
}

/// Test that short rows are reported, not dropped or fatal
#[test]
fn test_short_row_is_malformed() {
    let parser = RecordParser::default();
    let mut stream = parser
        .from_reader(Cursor::new(b"A|B|C\n1|2\n4|5|6\n".to_vec()), "short.txt", abc_schema())
        .unwrap();

    let first = stream.next().unwrap().unwrap();
    match first {
        ParsedRow::Malformed(row) => {
            assert_eq!(row.row_index, 0);
            assert_eq!(row.field_count, 2);
            assert_eq!(row.expected, 3);
            assert_eq!(row.preview, "1|2");
            assert_eq!(row.reason(), "expected 3 fields, found 2");
        }
        other => panic!("expected malformed row, got {:?}", other),
    }
    assert!(matches!(stream.next(), Some(Ok(ParsedRow::Record(_)))));
    assert!(stream.next().is_none());

    assert_eq!(stream.stats().rows_seen, 2);
    assert_eq!(stream.stats().rows_malformed, 1);
    assert_eq!(stream.stats().rows_yielded, 1);
}

#[test]
fn test_overflow_fields_fold_into_last_column() {
    let parser = RecordParser::default();
    let mut stream = parser
        .from_reader(
            Cursor::new(b"A|B|C\n1|2|pump|failed|again\n".to_vec()),
            "wide.txt",
            abc_schema(),
        )
        .unwrap();

    let rows: Vec<ParsedRow> = stream.by_ref().map(|r| r.unwrap()).collect();
    assert_eq!(records(&rows), vec![vec!["1", "2", "pump|failed|again"]]);
    assert_eq!(stream.stats().rows_rejoined, 1);
}

#[test]
fn test_quotes_are_literal() {
    let parser = RecordParser::default();
    let rows = collect(&parser, b"A|B|C\n\"x|y\"|z\n", abc_schema());
    assert_eq!(records(&rows), vec![vec!["\"x", "y\"", "z"]]);
}

#[test]
fn test_single_byte_decoding() {
    let parser = RecordParser::default();
    // 0xE9 is e-acute and 0x99 is the trade mark sign in windows-1252
    let rows = collect(&parser, b"A|B|C\n1|caf\xe9|ACME\x99\n", abc_schema());
    assert_eq!(records(&rows), vec![vec!["1", "caf\u{e9}", "ACME\u{2122}"]]);
}

#[test]
fn test_long_fields_truncated_on_char_boundary() {
    let parser = RecordParser::new(ParseOptions::default().with_max_field_length(4));
    let mut stream = parser
        .from_reader(
            Cursor::new(b"A|B|C\n1|\xe9\xe9\xe9\xe9\xe9\xe9|abcd\n".to_vec()),
            "long.txt",
            abc_schema(),
        )
        .unwrap();

    let rows: Vec<ParsedRow> = stream.by_ref().map(|r| r.unwrap()).collect();
    assert_eq!(records(&rows), vec![vec!["1", "\u{e9}\u{e9}\u{e9}\u{e9}", "abcd"]]);
    assert_eq!(stream.stats().fields_truncated, 1);
}

#[test]
fn test_start_row_skips_without_reporting() {
    let parser = RecordParser::new(ParseOptions::default().with_start_row(2));
    let mut stream = parser
        .from_reader(
            Cursor::new(b"A|B|C\n1|2|3\nbad\n7|8|9\n".to_vec()),
            "resume.txt",
            abc_schema(),
        )
        .unwrap();

    let rows: Vec<ParsedRow> = stream.by_ref().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    match &rows[0] {
        ParsedRow::Record(record) => assert_eq!(record.row_index(), 2),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(stream.stats().rows_skipped, 2);
    assert_eq!(stream.stats().rows_malformed, 0);
}

#[test]
fn test_stream_restarts_from_beginning() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("foitext2020.txt");
    std::fs::write(&path, "A|B|C\n1|2|3\n").unwrap();

    let parser = RecordParser::default();
    for _ in 0..2 {
        let stream = parser.open(&path, abc_schema()).unwrap();
        assert_eq!(stream.source().as_ref(), "foitext2020.txt");
        assert_eq!(stream.count(), 1);
    }
}

#[test]
fn test_open_missing_file() {
    let result = RecordParser::default().open(std::path::Path::new("/nonexistent/x.txt"), abc_schema());
    assert!(matches!(result, Err(crate::Error::FileNotFound { .. })));
}

struct FailingReader {
    served: bool,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.served {
            return Err(io::Error::other("device unplugged"));
        }
        self.served = true;
        let data = b"A|B|C\n1|2|3\n";
        buf[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }
}

/// Test that a read failure surfaces once and ends the stream
#[test]
fn test_io_error_yielded_once_then_fused() {
    let parser = RecordParser::default();
    let stream = parser
        .from_reader(FailingReader { served: false }, "flaky.txt", abc_schema())
        .unwrap();

    let items: Vec<_> = stream.collect();
    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    assert!(matches!(items[1], Err(crate::Error::Csv { .. })));
}
