//! Field-level normalization of raw MAUDE records
//!
//! Every function here is total and deterministic: malformed input becomes
//! `None` (stored as null) and never an error. [`CanonicalBuilder`] applies
//! the per-file-type [`layout`] to turn a [`RawRecord`] into a
//! [`CanonicalRecord`].
//!
//! - [`dates`] - Multi-format date parsing
//! - [`numbers`] - Integer and `Y`/`N` flag parsing
//! - [`manufacturer`] - Alias-table manufacturer canonicalization
//! - [`outcomes`] - Patient outcome code decoding
//! - [`text`] - Narrative sanitization
//! - [`layout`] - Canonical field rules per file type
//! - [`canonical`] - Record assembly
//!
//! [`RawRecord`]: crate::app::models::RawRecord
//! [`CanonicalRecord`]: crate::app::models::CanonicalRecord

pub mod canonical;
pub mod dates;
pub mod layout;
pub mod manufacturer;
pub mod numbers;
pub mod outcomes;
pub mod text;

#[cfg(test)]
pub mod tests;

pub use canonical::{CanonicalBuilder, transform_record};
pub use dates::parse_date;
pub use layout::{ColumnType, FieldKind, FieldRule, canonical_columns, field_rules};
pub use manufacturer::{MANUFACTURER_ALIASES, normalize_manufacturer, standardize_manufacturer};
pub use numbers::{parse_flag, parse_int};
pub use outcomes::{OutcomeFlags, decode_outcome_codes};
pub use text::{non_empty, normalize_code, sanitize_text};
