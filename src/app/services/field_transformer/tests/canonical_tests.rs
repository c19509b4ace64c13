//! Tests for canonical record assembly

use super::*;
use crate::app::models::{CanonicalRecord, FieldValue, FileType, SchemaDefinition};
use crate::app::services::field_transformer::{
    CanonicalBuilder, ColumnType, canonical_columns, field_rules, transform_record,
};
use crate::app::services::schema_registry::SchemaRegistry;
use chrono::NaiveDate;
use std::sync::Arc;

fn builtin(file_type: FileType, name: &str) -> Arc<SchemaDefinition> {
    SchemaRegistry::with_builtin()
        .unwrap()
        .get(file_type, name)
        .cloned()
        .unwrap()
}

#[test]
fn test_device_record_fields() {
    let schema = builtin(FileType::Device, "device-34");
    let raw = raw_record(
        &schema,
        7,
        &[
            ("MDR_REPORT_KEY", "1234567"),
            ("DEVICE_SEQUENCE_NO", "1.0"),
            ("DATE_RECEIVED", "01/15/2024"),
            ("BRAND_NAME", "  MINIMED 780G "),
            ("MANUFACTURER_D_NAME", "MEDTRONIC MINIMED"),
            ("IMPLANT_FLAG", "N"),
            ("DEVICE_REPORT_PRODUCT_CODE", "ozo"),
            ("UDI-DI", "00763000000000"),
            ("DEVICE_AGE_TEXT", "DA"),
        ],
    );

    let record = CanonicalBuilder::new(FileType::Device, &schema)
        .build(&raw)
        .unwrap();

    assert!(matches!(record, CanonicalRecord::Device(_)));
    assert_eq!(record.report_key(), "1234567");
    assert_eq!(record.source_file(), "fixture.txt");
    assert_eq!(record.get("device_sequence_number"), Some(&FieldValue::Integer(1)));
    assert_eq!(
        record.get("date_received"),
        Some(&FieldValue::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()))
    );
    assert_eq!(record.get("brand_name").and_then(FieldValue::as_text), Some("MINIMED 780G"));
    assert_eq!(record.get("manufacturer_name").and_then(FieldValue::as_text), Some("Medtronic"));
    assert_eq!(record.get("implant_flag"), Some(&FieldValue::Boolean(false)));
    assert_eq!(record.get("product_code").and_then(FieldValue::as_text), Some("OZO"));
    assert_eq!(record.get("udi_di").and_then(FieldValue::as_text), Some("00763000000000"));

    // Unparseable and empty values are null, not errors
    assert_eq!(record.get("expiration_date"), Some(&FieldValue::Null));
    assert_eq!(record.get("lot_number"), Some(&FieldValue::Null));

    // Unclaimed columns pass through untouched
    assert_eq!(record.get_extra("DEVICE_AGE_TEXT"), Some("DA"));
    assert!(record.get_extra("MDR_REPORT_KEY").is_none());
    assert!(record.get_extra("BRAND_NAME").is_none());
}

/// Test that columns an older era lacks come out null
#[test]
fn test_legacy_era_missing_columns_are_null() {
    let schema = builtin(FileType::Device, "device-28");
    let raw = raw_record(&schema, 0, &[("MDR_REPORT_KEY", "99"), ("BRAND_NAME", "X")]);

    let record = transform_record(FileType::Device, &raw).unwrap();
    assert_eq!(record.get("udi_di"), Some(&FieldValue::Null));
    assert_eq!(record.get("combination_product_flag"), Some(&FieldValue::Null));

    let modern = builtin(FileType::Device, "device-34");
    let modern_record = transform_record(FileType::Device, &raw_record(&modern, 0, &[("MDR_REPORT_KEY", "99")])).unwrap();
    assert_eq!(record.fields().len(), modern_record.fields().len());
}

#[test]
fn test_patient_outcomes_expand_to_flags() {
    let schema = builtin(FileType::Patient, "patient-10");
    let raw = raw_record(
        &schema,
        3,
        &[
            ("MDR_REPORT_KEY", "42"),
            ("SEQUENCE_NUMBER_OUTCOME", "1. H; 2. DS"),
            ("PATIENT_SEX", "f"),
        ],
    );

    let record = transform_record(FileType::Patient, &raw).unwrap();
    assert_eq!(record.get("outcome_hospitalization"), Some(&FieldValue::Boolean(true)));
    assert_eq!(record.get("outcome_disability"), Some(&FieldValue::Boolean(true)));
    assert_eq!(record.get("outcome_death"), Some(&FieldValue::Boolean(false)));
    assert_eq!(record.get("patient_sex").and_then(FieldValue::as_text), Some("F"));
    assert!(record.get("outcomes").is_none());
}

#[test]
fn test_narrative_is_sanitized() {
    let schema = builtin(FileType::Text, "text-6");
    let raw = raw_record(
        &schema,
        0,
        &[
            ("MDR_REPORT_KEY", "5"),
            ("FOI_TEXT", "  IT WAS REPORTED   THAT\u{1}\n\n\n THE PUMP ALARMED. "),
            ("DATE_REPORT", "20230102"),
        ],
    );

    let record = transform_record(FileType::Text, &raw).unwrap();
    assert!(matches!(record, CanonicalRecord::Text(_)));
    assert_eq!(
        record.get("text").and_then(FieldValue::as_text),
        Some("IT WAS REPORTED THAT\n\nTHE PUMP ALARMED.")
    );
}

#[test]
fn test_missing_report_key_is_rejected() {
    let schema = builtin(FileType::ProblemCode, "problem-2");
    let raw = raw_record(&schema, 11, &[("MDR_REPORT_KEY", "  "), ("DEVICE_PROBLEM_CODE", "2993")]);

    let rejected = transform_record(FileType::ProblemCode, &raw).unwrap_err();
    assert_eq!(rejected.row_index, 11);
    assert!(rejected.reason.contains("MDR_REPORT_KEY"));
    assert!(rejected.preview.contains("2993"));
}

#[test]
fn test_wrong_width_record_is_rejected() {
    let schema = Arc::new(SchemaDefinition::new("p", ["MDR_REPORT_KEY", "DEVICE_PROBLEM_CODE"]));
    let raw = crate::app::models::RawRecord::new(
        Arc::clone(&schema),
        Arc::from("short.txt"),
        0,
        vec!["1".to_string()],
    );
    assert!(transform_record(FileType::ProblemCode, &raw).is_err());
}

#[test]
fn test_canonical_columns_cover_built_fields() {
    for file_type in FileType::ALL {
        let columns = canonical_columns(file_type);
        assert!(!field_rules(file_type).is_empty());

        let schema = Arc::new(SchemaDefinition::new("any", ["MDR_REPORT_KEY"]));
        let raw = raw_record(&schema, 0, &[("MDR_REPORT_KEY", "1")]);
        let record = transform_record(file_type, &raw).unwrap();

        let built: Vec<&str> = record.fields().iter().map(|(name, _)| *name).collect();
        let declared: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
        assert_eq!(built, declared, "{}", file_type);
    }

    assert!(canonical_columns(FileType::Patient).contains(&("outcome_other", ColumnType::Boolean)));
}
