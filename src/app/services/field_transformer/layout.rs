//! Canonical field layout per file type
//!
//! Each rule names a raw column, the canonical field it feeds and how the
//! value is converted. Rules whose column is missing from an era's schema
//! produce null. Raw columns no rule claims are kept as passthrough fields.

use super::outcomes::OutcomeFlags;
use crate::app::models::FileType;

/// Conversion applied to a raw column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Trimmed text, empty as null
    Text,
    /// Narrative cleanup via `sanitize_text`
    Sanitized,
    Date,
    Integer,
    /// `Y`/`N` flag
    Flag,
    /// Canonical manufacturer name
    Manufacturer,
    /// Outcome code list expanded to the seven outcome flags
    Outcomes,
    /// Trimmed upper-case code
    Code,
}

/// Storage affinity of a canonical column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    Date,
    Boolean,
}

impl FieldKind {
    pub fn column_type(&self) -> ColumnType {
        match self {
            FieldKind::Text | FieldKind::Sanitized | FieldKind::Manufacturer | FieldKind::Code => {
                ColumnType::Text
            }
            FieldKind::Date => ColumnType::Date,
            FieldKind::Integer => ColumnType::Integer,
            FieldKind::Flag | FieldKind::Outcomes => ColumnType::Boolean,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub source_column: &'static str,
    pub target: &'static str,
    pub kind: FieldKind,
}

const fn rule(source_column: &'static str, target: &'static str, kind: FieldKind) -> FieldRule {
    FieldRule {
        source_column,
        target,
        kind,
    }
}

use FieldKind::*;

const MASTER_RULES: &[FieldRule] = &[
    rule("EVENT_KEY", "event_key", Text),
    rule("REPORT_NUMBER", "report_number", Text),
    rule("REPORT_SOURCE_CODE", "report_source_code", Code),
    rule("NUMBER_DEVICES_IN_EVENT", "number_devices_in_event", Integer),
    rule("NUMBER_PATIENTS_IN_EVENT", "number_patients_in_event", Integer),
    rule("DATE_RECEIVED", "date_received", Date),
    rule("ADVERSE_EVENT_FLAG", "adverse_event_flag", Flag),
    rule("PRODUCT_PROBLEM_FLAG", "product_problem_flag", Flag),
    rule("DATE_REPORT", "date_report", Date),
    rule("DATE_OF_EVENT", "date_of_event", Date),
    rule("REPORTER_OCCUPATION_CODE", "reporter_occupation_code", Code),
    rule("DATE_FACILITY_AWARE", "date_facility_aware", Date),
    rule("EVENT_LOCATION", "event_location", Text),
    rule("DATE_MANUFACTURER_RECEIVED", "date_manufacturer_received", Date),
    rule("DEVICE_DATE_OF_MANUFACTURE", "device_date_of_manufacture", Date),
    rule("SINGLE_USE_FLAG", "single_use_flag", Flag),
    rule("EVENT_TYPE", "event_type", Code),
    rule("MANUFACTURER_NAME", "manufacturer_name", Manufacturer),
    rule("MANUFACTURER_COUNTRY_CODE", "manufacturer_country_code", Code),
    rule("TYPE_OF_REPORT", "type_of_report", Text),
    rule("DATE_ADDED", "date_added", Date),
    rule("DATE_CHANGED", "date_changed", Date),
    rule("PMA_PMN_NUM", "pma_pmn_number", Code),
    rule("REPORTER_STATE_CODE", "reporter_state_code", Code),
    rule("MANUFACTURER_AWARE_DATE", "manufacturer_aware_date", Date),
];

const DEVICE_RULES: &[FieldRule] = &[
    rule("DEVICE_EVENT_KEY", "device_event_key", Text),
    rule("IMPLANT_FLAG", "implant_flag", Flag),
    rule("DATE_REMOVED_FLAG", "date_removed_flag", Code),
    rule("DEVICE_SEQUENCE_NO", "device_sequence_number", Integer),
    rule("DATE_RECEIVED", "date_received", Date),
    rule("BRAND_NAME", "brand_name", Text),
    rule("GENERIC_NAME", "generic_name", Text),
    rule("MANUFACTURER_D_NAME", "manufacturer_name", Manufacturer),
    rule("MANUFACTURER_D_COUNTRY_CODE", "manufacturer_country_code", Code),
    rule("DEVICE_OPERATOR", "device_operator", Code),
    rule("EXPIRATION_DATE_OF_DEVICE", "expiration_date", Date),
    rule("MODEL_NUMBER", "model_number", Text),
    rule("CATALOG_NUMBER", "catalog_number", Text),
    rule("LOT_NUMBER", "lot_number", Text),
    rule("DEVICE_AVAILABILITY", "device_availability", Code),
    rule("DATE_RETURNED_TO_MANUFACTURER", "date_returned_to_manufacturer", Date),
    rule("DEVICE_REPORT_PRODUCT_CODE", "product_code", Code),
    rule("DEVICE_EVALUATED_BY_MANUFACTUR", "evaluated_by_manufacturer", Code),
    rule("COMBINATION_PRODUCT_FLAG", "combination_product_flag", Flag),
    rule("UDI-DI", "udi_di", Text),
    rule("UDI-PUBLIC", "udi_public", Text),
];

const PATIENT_RULES: &[FieldRule] = &[
    rule("PATIENT_SEQUENCE_NUMBER", "patient_sequence_number", Integer),
    rule("DATE_RECEIVED", "date_received", Date),
    rule("SEQUENCE_NUMBER_TREATMENT", "treatment", Sanitized),
    rule("SEQUENCE_NUMBER_OUTCOME", "outcomes", Outcomes),
    rule("PATIENT_AGE", "patient_age", Text),
    rule("PATIENT_SEX", "patient_sex", Code),
    rule("PATIENT_WEIGHT", "patient_weight", Text),
    rule("PATIENT_ETHNICITY", "patient_ethnicity", Text),
    rule("PATIENT_RACE", "patient_race", Text),
];

const TEXT_RULES: &[FieldRule] = &[
    rule("MDR_TEXT_KEY", "mdr_text_key", Text),
    rule("TEXT_TYPE_CODE", "text_type_code", Code),
    rule("PATIENT_SEQUENCE_NUMBER", "patient_sequence_number", Integer),
    rule("DATE_REPORT", "date_report", Date),
    rule("FOI_TEXT", "text", Sanitized),
];

const PROBLEM_CODE_RULES: &[FieldRule] = &[rule("DEVICE_PROBLEM_CODE", "problem_code", Code)];

/// Conversion rules for a file type, in canonical field order
pub fn field_rules(file_type: FileType) -> &'static [FieldRule] {
    match file_type {
        FileType::Master => MASTER_RULES,
        FileType::Device => DEVICE_RULES,
        FileType::Patient => PATIENT_RULES,
        FileType::Text => TEXT_RULES,
        FileType::ProblemCode => PROBLEM_CODE_RULES,
    }
}

/// Canonical columns a file type produces, with outcome rules expanded
pub fn canonical_columns(file_type: FileType) -> Vec<(&'static str, ColumnType)> {
    let mut columns = Vec::new();
    for rule in field_rules(file_type) {
        match rule.kind {
            FieldKind::Outcomes => {
                for (name, _) in OutcomeFlags::default().named() {
                    columns.push((name, ColumnType::Boolean));
                }
            }
            kind => columns.push((rule.target, kind.column_type())),
        }
    }
    columns
}
