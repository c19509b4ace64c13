//! Tests for schema detection and year hints

use super::*;
use crate::Error;
use crate::app::models::FileType;
use crate::app::services::schema_registry::{SchemaRegistry, year_hint_from_path};
use std::path::Path;

fn two_era_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry
        .register(FileType::Device, schema("device-old", 4).with_years(None, Some(2019)))
        .unwrap();
    registry
        .register(FileType::Device, schema("device-new", 5).with_years(Some(2020), None))
        .unwrap();
    registry
}

#[test]
fn test_detect_by_column_count() {
    let registry = two_era_registry();

    let detection = registry
        .detect(FileType::Device, &header(5), None, "foidev2021.txt")
        .unwrap();
    assert_eq!(detection.schema.name, "device-new");
    assert_eq!(detection.candidates, 1);
    assert!(!detection.resolved_by_year);
}

/// Test that a single count match wins even when the year hint disagrees
#[test]
fn test_single_match_ignores_year_hint() {
    let registry = two_era_registry();

    let detection = registry
        .detect(FileType::Device, &header(4), Some(2023), "foidev2023.txt")
        .unwrap();
    assert_eq!(detection.schema.name, "device-old");
}

#[test]
fn test_unknown_count_is_unrecognized() {
    let registry = two_era_registry();

    let error = registry
        .detect(FileType::Device, &header(31), Some(2015), "foidev2015.txt")
        .unwrap_err();

    match error {
        Error::SchemaUnrecognized {
            file,
            column_count,
            reason,
        } => {
            assert_eq!(file, "foidev2015.txt");
            assert_eq!(column_count, 31);
            assert!(reason.contains("4 or 5"), "reason was {}", reason);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_file_type_without_schemas_is_unrecognized() {
    let registry = two_era_registry();
    let error = registry
        .detect(FileType::Text, &header(6), None, "foitext.txt")
        .unwrap_err();
    assert!(error.is_schema_error());
}

/// Test that eras sharing a column count are told apart by the year hint
#[test]
fn test_shared_count_resolved_by_year() {
    let mut registry = SchemaRegistry::new();
    registry
        .register(FileType::Master, schema("early", 3).with_years(None, Some(2008)))
        .unwrap();
    registry
        .register(FileType::Master, schema("late", 3).with_years(Some(2009), None))
        .unwrap();

    let early = registry
        .detect(FileType::Master, &header(3), Some(2001), "mdrfoi2001.txt")
        .unwrap();
    assert_eq!(early.schema.name, "early");
    assert!(early.resolved_by_year);

    let late = registry
        .detect(FileType::Master, &header(3), Some(2015), "mdrfoi2015.txt")
        .unwrap();
    assert_eq!(late.schema.name, "late");

    let ambiguous = registry.detect(FileType::Master, &header(3), None, "mdrfoi.txt");
    match ambiguous {
        Err(Error::SchemaUnrecognized { reason, .. }) => assert!(reason.contains("ambiguous")),
        other => panic!("expected ambiguity, got {:?}", other),
    }
}

#[test]
fn test_shared_count_with_uncovered_year_fails() {
    let mut registry = SchemaRegistry::new();
    registry
        .register(FileType::Master, schema("a", 3).with_years(Some(2000), Some(2004)))
        .unwrap();
    registry
        .register(FileType::Master, schema("b", 3).with_years(Some(2010), Some(2014)))
        .unwrap();

    let result = registry.detect(FileType::Master, &header(3), Some(2007), "mdrfoi2007.txt");
    assert!(matches!(result, Err(Error::SchemaUnrecognized { .. })));
}

#[test]
fn test_detection_reports_renamed_columns() {
    let mut registry = SchemaRegistry::new();
    registry
        .register(
            FileType::ProblemCode,
            crate::app::models::SchemaDefinition::new("p", ["MDR_REPORT_KEY", "DEVICE_PROBLEM_CODE"]),
        )
        .unwrap();

    let observed = vec!["mdr_report_key".to_string(), "PROBLEM".to_string()];
    let detection = registry
        .detect(FileType::ProblemCode, &observed, None, "foidevproblem.txt")
        .unwrap();
    assert_eq!(detection.renamed_columns, vec![(1, "PROBLEM".to_string())]);
}

#[test]
fn test_builtin_device_eras() {
    let registry = SchemaRegistry::with_builtin().unwrap();

    let legacy = registry
        .detect(FileType::Device, &header(28), Some(2015), "foidev2015.txt")
        .unwrap();
    assert_eq!(legacy.schema.name, "device-28");

    let current = registry
        .detect(FileType::Device, &header(34), Some(2021), "foidev2021.txt")
        .unwrap();
    assert_eq!(current.schema.name, "device-34");
}

#[test]
fn test_year_hint_from_path() {
    let cases = [
        ("mdrfoiThru2023.txt", Some(2023)),
        ("foidev2015.txt", Some(2015)),
        ("/data/2019/foitext2020.txt", Some(2020)),
        ("device2019_2020.txt", Some(2020)),
        ("foidevproblem.txt", None),
        ("patient12345.txt", None),
        ("mdrfoi0042.txt", None),
    ];

    for (name, expected) in cases {
        assert_eq!(year_hint_from_path(Path::new(name)), expected, "path {}", name);
    }
}
