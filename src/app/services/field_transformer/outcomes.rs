//! Patient outcome code decoding

use crate::constants::{OUTCOME_SEPARATORS, outcome_codes};
use serde::{Deserialize, Serialize};

/// Boolean outcome flags decoded from a code list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutcomeFlags {
    pub death: bool,
    pub life_threatening: bool,
    pub hospitalization: bool,
    pub disability: bool,
    pub congenital_anomaly: bool,
    pub required_intervention: bool,
    pub other: bool,
}

impl OutcomeFlags {
    /// Canonical field names paired with their values, in a fixed order
    pub fn named(&self) -> [(&'static str, bool); 7] {
        [
            ("outcome_death", self.death),
            ("outcome_life_threatening", self.life_threatening),
            ("outcome_hospitalization", self.hospitalization),
            ("outcome_disability", self.disability),
            ("outcome_congenital_anomaly", self.congenital_anomaly),
            ("outcome_required_intervention", self.required_intervention),
            ("outcome_other", self.other),
        ]
    }

    pub fn any(&self) -> bool {
        self.named().iter().any(|(_, set)| *set)
    }

    fn apply(&mut self, code: &str) {
        let matches = |codes: &[&str]| codes.contains(&code);

        if matches(outcome_codes::DEATH) {
            self.death = true;
        } else if matches(outcome_codes::LIFE_THREATENING) {
            self.life_threatening = true;
        } else if matches(outcome_codes::HOSPITALIZATION) {
            self.hospitalization = true;
        } else if matches(outcome_codes::DISABILITY) {
            self.disability = true;
        } else if matches(outcome_codes::CONGENITAL_ANOMALY) {
            self.congenital_anomaly = true;
        } else if matches(outcome_codes::REQUIRED_INTERVENTION) {
            self.required_intervention = true;
        } else if matches(outcome_codes::OTHER) {
            self.other = true;
        }
    }
}

/// Decode a separated outcome code list such as `"1. D; 2. H"`
///
/// Unknown codes are ignored and empty input sets no flags.
pub fn decode_outcome_codes(value: &str) -> OutcomeFlags {
    let mut flags = OutcomeFlags::default();

    for token in value.split(OUTCOME_SEPARATORS) {
        let code = strip_enumeration(token.trim()).trim().to_ascii_uppercase();
        if !code.is_empty() {
            flags.apply(&code);
        }
    }

    flags
}

/// Remove a leading list number such as `"2. "` or `"3)"`
fn strip_enumeration(token: &str) -> &str {
    let rest = token.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == token.len() {
        return token;
    }
    match rest.strip_prefix(['.', ')']) {
        Some(stripped) => stripped,
        None if rest.starts_with(char::is_whitespace) => rest,
        None => token,
    }
}
