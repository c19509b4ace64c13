//! Historical MAUDE column layouts
//!
//! Each era is plain data. Supporting a new era means adding an entry here
//! (or in a contracts file), not writing new parsing code.

use crate::app::models::{FileType, SchemaDefinition};

const MASTER_84_COLUMNS: &[&str] = &[
    "MDR_REPORT_KEY",
    "EVENT_KEY",
    "REPORT_NUMBER",
    "REPORT_SOURCE_CODE",
    "MANUFACTURER_LINK_FLAG_",
    "NUMBER_DEVICES_IN_EVENT",
    "NUMBER_PATIENTS_IN_EVENT",
    "DATE_RECEIVED",
    "ADVERSE_EVENT_FLAG",
    "PRODUCT_PROBLEM_FLAG",
    "DATE_REPORT",
    "DATE_OF_EVENT",
    "REPROCESSED_AND_REUSED_FLAG",
    "REPORTER_OCCUPATION_CODE",
    "HEALTH_PROFESSIONAL",
    "INITIAL_REPORT_TO_FDA",
    "DATE_FACILITY_AWARE",
    "REPORT_DATE",
    "REPORT_TO_FDA",
    "DATE_REPORT_TO_FDA",
    "EVENT_LOCATION",
    "DATE_REPORT_TO_MANUFACTURER",
    "MANUFACTURER_CONTACT_T_NAME",
    "MANUFACTURER_CONTACT_F_NAME",
    "MANUFACTURER_CONTACT_L_NAME",
    "MANUFACTURER_CONTACT_STREET_1",
    "MANUFACTURER_CONTACT_STREET_2",
    "MANUFACTURER_CONTACT_CITY",
    "MANUFACTURER_CONTACT_STATE",
    "MANUFACTURER_CONTACT_ZIP_CODE",
    "MANUFACTURER_CONTACT_ZIP_EXT",
    "MANUFACTURER_CONTACT_COUNTRY",
    "MANUFACTURER_CONTACT_POSTAL",
    "MANUFACTURER_CONTACT_AREA_CODE",
    "MANUFACTURER_CONTACT_EXCHANGE",
    "MANUFACTURER_CONTACT_PHONE_NO",
    "MANUFACTURER_CONTACT_EXTENSION",
    "MANUFACTURER_CONTACT_PCOUNTRY",
    "MANUFACTURER_CONTACT_PCITY",
    "MANUFACTURER_CONTACT_PLOCAL",
    "MANUFACTURER_G1_NAME",
    "MANUFACTURER_G1_STREET_1",
    "MANUFACTURER_G1_STREET_2",
    "MANUFACTURER_G1_CITY",
    "MANUFACTURER_G1_STATE_CODE",
    "MANUFACTURER_G1_ZIP_CODE",
    "MANUFACTURER_G1_ZIP_CODE_EXT",
    "MANUFACTURER_G1_COUNTRY_CODE",
    "MANUFACTURER_G1_POSTAL_CODE",
    "DATE_MANUFACTURER_RECEIVED",
    "DEVICE_DATE_OF_MANUFACTURE",
    "SINGLE_USE_FLAG",
    "REMEDIAL_ACTION",
    "PREVIOUS_USE_CODE",
    "REMOVAL_CORRECTION_NUMBER",
    "EVENT_TYPE",
    "DISTRIBUTOR_NAME",
    "DISTRIBUTOR_ADDRESS_1",
    "DISTRIBUTOR_ADDRESS_2",
    "DISTRIBUTOR_CITY",
    "DISTRIBUTOR_STATE_CODE",
    "DISTRIBUTOR_ZIP_CODE",
    "DISTRIBUTOR_ZIP_CODE_EXT",
    "REPORT_TO_MANUFACTURER",
    "MANUFACTURER_NAME",
    "MANUFACTURER_ADDRESS_1",
    "MANUFACTURER_ADDRESS_2",
    "MANUFACTURER_CITY",
    "MANUFACTURER_STATE_CODE",
    "MANUFACTURER_ZIP_CODE",
    "MANUFACTURER_ZIP_CODE_EXT",
    "MANUFACTURER_COUNTRY_CODE",
    "MANUFACTURER_POSTAL_CODE",
    "TYPE_OF_REPORT",
    "SOURCE_TYPE",
    "DATE_ADDED",
    "DATE_CHANGED",
    "REPORTER_COUNTRY_CODE",
    "PMA_PMN_NUM",
    "EXEMPTION_NUMBER",
    "SUMMARY_REPORT",
    "NOE_SUMMARIZED",
    "SUPPL_DATES_FDA_RECEIVED",
    "SUPPL_DATES_MFR_RECEIVED",
];

/// Columns appended to the master layout from 2009
const MASTER_86_ADDITIONS: &[&str] = &["REPORTER_STATE_CODE", "MANUFACTURER_AWARE_DATE"];

const DEVICE_28_COLUMNS: &[&str] = &[
    "MDR_REPORT_KEY",
    "DEVICE_EVENT_KEY",
    "IMPLANT_FLAG",
    "DATE_REMOVED_FLAG",
    "DEVICE_SEQUENCE_NO",
    "DATE_RECEIVED",
    "BRAND_NAME",
    "GENERIC_NAME",
    "MANUFACTURER_D_NAME",
    "MANUFACTURER_D_ADDRESS_1",
    "MANUFACTURER_D_ADDRESS_2",
    "MANUFACTURER_D_CITY",
    "MANUFACTURER_D_STATE_CODE",
    "MANUFACTURER_D_ZIP_CODE",
    "MANUFACTURER_D_ZIP_CODE_EXT",
    "MANUFACTURER_D_COUNTRY_CODE",
    "MANUFACTURER_D_POSTAL_CODE",
    "DEVICE_OPERATOR",
    "EXPIRATION_DATE_OF_DEVICE",
    "MODEL_NUMBER",
    "CATALOG_NUMBER",
    "LOT_NUMBER",
    "OTHER_ID_NUMBER",
    "DEVICE_AVAILABILITY",
    "DATE_RETURNED_TO_MANUFACTURER",
    "DEVICE_REPORT_PRODUCT_CODE",
    "DEVICE_AGE_TEXT",
    "DEVICE_EVALUATED_BY_MANUFACTUR",
];

/// Columns appended to the device layout from 2020
const DEVICE_34_ADDITIONS: &[&str] = &[
    "COMBINATION_PRODUCT_FLAG",
    "UDI-DI",
    "UDI-PUBLIC",
    "IMPLANT_DATE_YEAR",
    "DATE_REMOVED_YEAR",
    "SERVICED_BY_3RD_PARTY_FLAG",
];

const PATIENT_5_COLUMNS: &[&str] = &[
    "MDR_REPORT_KEY",
    "PATIENT_SEQUENCE_NUMBER",
    "DATE_RECEIVED",
    "SEQUENCE_NUMBER_TREATMENT",
    "SEQUENCE_NUMBER_OUTCOME",
];

/// Demographic columns appended to the patient layout from 2020
const PATIENT_10_ADDITIONS: &[&str] = &[
    "PATIENT_AGE",
    "PATIENT_SEX",
    "PATIENT_WEIGHT",
    "PATIENT_ETHNICITY",
    "PATIENT_RACE",
];

const TEXT_6_COLUMNS: &[&str] = &[
    "MDR_REPORT_KEY",
    "MDR_TEXT_KEY",
    "TEXT_TYPE_CODE",
    "PATIENT_SEQUENCE_NUMBER",
    "DATE_REPORT",
    "FOI_TEXT",
];

const PROBLEM_2_COLUMNS: &[&str] = &["MDR_REPORT_KEY", "DEVICE_PROBLEM_CODE"];

fn extended(base: &[&str], additions: &[&str]) -> Vec<String> {
    base.iter()
        .chain(additions.iter())
        .map(|c| c.to_string())
        .collect()
}

/// All built-in eras in registration order
pub fn builtin_schemas() -> Vec<(FileType, SchemaDefinition)> {
    vec![
        (
            FileType::Master,
            SchemaDefinition::new("master-84", MASTER_84_COLUMNS).with_years(None, Some(2008)),
        ),
        (
            FileType::Master,
            SchemaDefinition::new("master-86", extended(MASTER_84_COLUMNS, MASTER_86_ADDITIONS))
                .with_years(Some(2009), None),
        ),
        (
            FileType::Device,
            SchemaDefinition::new("device-28", DEVICE_28_COLUMNS).with_years(None, Some(2019)),
        ),
        (
            FileType::Device,
            SchemaDefinition::new("device-34", extended(DEVICE_28_COLUMNS, DEVICE_34_ADDITIONS))
                .with_years(Some(2020), None),
        ),
        (
            FileType::Patient,
            SchemaDefinition::new("patient-5", PATIENT_5_COLUMNS).with_years(None, Some(2019)),
        ),
        (
            FileType::Patient,
            SchemaDefinition::new(
                "patient-10",
                extended(PATIENT_5_COLUMNS, PATIENT_10_ADDITIONS),
            )
            .with_years(Some(2020), None),
        ),
        (
            FileType::Text,
            SchemaDefinition::new("text-6", TEXT_6_COLUMNS),
        ),
        (
            FileType::ProblemCode,
            SchemaDefinition::new("problem-2", PROBLEM_2_COLUMNS),
        ),
    ]
}
