//! Shared fixtures for storage tests

use crate::app::models::{CanonicalRecord, FieldValue, FileType, RecordBody};
use chrono::NaiveDate;
use std::sync::Arc;


/// Device record with a handful of typed fields
pub fn device_record(report_key: &str, source_file: &str) -> CanonicalRecord {
    let body = RecordBody::new(
        report_key.to_string(),
        Arc::from(source_file),
        vec![
            ("device_sequence_number", FieldValue::Integer(1)),
            (
                "date_received",
                FieldValue::Date(NaiveDate::from_ymd_opt(2021, 3, 4).unwrap()),
            ),
            ("brand_name", FieldValue::Text("MINIMED 780G".to_string())),
            ("implant_flag", FieldValue::Boolean(false)),
            ("lot_number", FieldValue::Null),
        ],
        vec![("DEVICE_AGE_TEXT".to_string(), "DA".to_string())],
    );
    CanonicalRecord::from_body(FileType::Device, body)
}

pub fn patient_record(report_key: &str, source_file: &str) -> CanonicalRecord {
    let body = RecordBody::new(report_key.to_string(), Arc::from(source_file), Vec::new(), Vec::new());
    CanonicalRecord::from_body(FileType::Patient, body)
}
