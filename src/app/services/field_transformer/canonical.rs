//! Raw record to canonical record conversion

use super::layout::{FieldKind, FieldRule, field_rules};
use super::{
    decode_outcome_codes, non_empty, normalize_code, parse_date, parse_flag, parse_int,
    sanitize_text, standardize_manufacturer,
};
use crate::app::models::{
    CanonicalRecord, FieldValue, FileType, RawRecord, RecordBody, RejectedRow, SchemaDefinition,
};
use crate::constants::{REJECTED_ROW_PREVIEW_CHARS, REPORT_KEY_COLUMN};

/// Applies a file type's layout to records of one schema
///
/// Column positions are resolved once per schema, so a builder is created
/// per file and reused for every row.
#[derive(Debug, Clone)]
pub struct CanonicalBuilder {
    file_type: FileType,
    schema_name: String,
    column_count: usize,
    key_index: Option<usize>,
    rules: Vec<(FieldRule, Option<usize>)>,
    passthrough: Vec<(usize, String)>,
}

impl CanonicalBuilder {
    pub fn new(file_type: FileType, schema: &SchemaDefinition) -> Self {
        let rules: Vec<(FieldRule, Option<usize>)> = field_rules(file_type)
            .iter()
            .map(|rule| (*rule, schema.index_of(rule.source_column)))
            .collect();

        let passthrough = schema
            .columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column.as_str() != REPORT_KEY_COLUMN)
            .filter(|(_, column)| !rules.iter().any(|(rule, _)| rule.source_column == column.as_str()))
            .map(|(index, column)| (index, column.clone()))
            .collect();

        Self {
            file_type,
            schema_name: schema.name.clone(),
            column_count: schema.column_count,
            key_index: schema.index_of(REPORT_KEY_COLUMN),
            rules,
            passthrough,
        }
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// Raw columns copied through unchanged
    pub fn passthrough_columns(&self) -> impl Iterator<Item = &str> {
        self.passthrough.iter().map(|(_, column)| column.as_str())
    }

    /// Convert one raw record
    ///
    /// The record is refused when its width differs from the schema or it has
    /// no report key. Unparseable field values become null instead.
    pub fn build(&self, raw: &RawRecord) -> Result<CanonicalRecord, RejectedRow> {
        let fields = raw.fields();

        if fields.len() != self.column_count {
            return Err(self.reject(
                raw,
                format!(
                    "schema {} expects {} fields, record has {}",
                    self.schema_name,
                    self.column_count,
                    fields.len()
                ),
            ));
        }

        let report_key = self
            .key_index
            .and_then(|index| fields.get(index))
            .and_then(|value| non_empty(value));
        let Some(report_key) = report_key else {
            return Err(self.reject(raw, format!("missing {}", REPORT_KEY_COLUMN)));
        };

        let mut values: Vec<(&'static str, FieldValue)> = Vec::with_capacity(self.rules.len() + 6);
        for (rule, index) in &self.rules {
            let raw_value = index.and_then(|i| fields.get(i)).map(String::as_str);
            convert(rule, raw_value, &mut values);
        }

        let extra = self
            .passthrough
            .iter()
            .filter_map(|(index, column)| fields.get(*index).map(|v| (column.clone(), v.clone())))
            .collect();

        let body = RecordBody::new(report_key, raw.source_file().clone(), values, extra);
        Ok(CanonicalRecord::from_body(self.file_type, body))
    }

    fn reject(&self, raw: &RawRecord, reason: String) -> RejectedRow {
        let preview: String = raw
            .fields()
            .join("|")
            .chars()
            .take(REJECTED_ROW_PREVIEW_CHARS)
            .collect();
        RejectedRow::new(raw.row_index(), reason, preview)
    }
}

fn convert(rule: &FieldRule, raw: Option<&str>, out: &mut Vec<(&'static str, FieldValue)>) {
    let target = rule.target;

    match rule.kind {
        FieldKind::Outcomes => {
            let flags = decode_outcome_codes(raw.unwrap_or(""));
            out.extend(
                flags
                    .named()
                    .into_iter()
                    .map(|(name, set)| (name, FieldValue::Boolean(set))),
            );
        }
        kind => {
            let value = match raw {
                None => FieldValue::Null,
                Some(raw) => match kind {
                    FieldKind::Text => non_empty(raw).into(),
                    FieldKind::Sanitized => non_empty(&sanitize_text(raw)).into(),
                    FieldKind::Date => parse_date(raw).into(),
                    FieldKind::Integer => parse_int(raw).into(),
                    FieldKind::Flag => parse_flag(raw).into(),
                    FieldKind::Code => normalize_code(raw).into(),
                    FieldKind::Manufacturer => FieldValue::Text(standardize_manufacturer(raw)),
                    FieldKind::Outcomes => FieldValue::Null,
                },
            };
            out.push((target, value));
        }
    }
}

/// Convert a single record without reusing a builder
pub fn transform_record(file_type: FileType, raw: &RawRecord) -> Result<CanonicalRecord, RejectedRow> {
    CanonicalBuilder::new(file_type, raw.schema()).build(raw)
}
