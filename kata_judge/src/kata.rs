//! Kata technique table and judge score sheets.
//!
//! A judge scores every technique of the kata separately. Each technique
//! starts at [`DEFAULT_SCORE_VALUE`] with an empty deduction record; the
//! record is a fixed-width list of [`DEDUCTION_FIELDS`] colon-separated mark
//! fields, so the empty record is `":::::"`.

use serde::{Deserialize, Serialize};

/// Starting value of every technique score
pub const DEFAULT_SCORE_VALUE: f64 = 10.0;

/// Number of mark fields in a deduction record
pub const DEDUCTION_FIELDS: usize = 6;

/// Deduction record without any marks
pub const EMPTY_DEDUCTIONS: &str = ":::::";

/// Techniques per kata, keyed by normalized name
const TECHNIQUE_COUNTS: &[(&str, usize)] = &[
    ("nage-no-kata", 15),
    ("katame-no-kata", 15),
    ("kime-no-kata", 20),
    ("ju-no-kata", 15),
    ("kodokan-goshin-jutsu", 21),
    ("itsutsu-no-kata", 5),
    ("koshiki-no-kata", 21),
];

/// One technique score given by one judge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub value: f64,
    pub deductions: String,
}

impl Score {
    /// Whether the deduction record has the expected width
    pub fn has_valid_deductions(&self) -> bool {
        is_valid_deductions(&self.deductions)
    }
}

impl Default for Score {
    fn default() -> Self {
        Self {
            value: DEFAULT_SCORE_VALUE,
            deductions: EMPTY_DEDUCTIONS.to_string(),
        }
    }
}

/// All technique scores of one judge for one match
pub type ScoreSheet = Vec<Score>;

fn normalize(kata: &str) -> String {
    kata.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '_' { '-' } else { c })
        .collect()
}

/// Number of scored techniques in `kata`; unknown katas have none
pub fn number_of_techniques(kata: &str) -> usize {
    let name = normalize(kata);
    TECHNIQUE_COUNTS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, count)| *count)
        .unwrap_or(0)
}

/// Default sheet for `kata`: one default score per technique
pub fn score_sheet(kata: &str) -> ScoreSheet {
    vec![Score::default(); number_of_techniques(kata)]
}

/// Whether `deductions` has exactly [`DEDUCTION_FIELDS`] fields
pub fn is_valid_deductions(deductions: &str) -> bool {
    deductions.split(':').count() == DEDUCTION_FIELDS
}

/// Sum of the technique values on a sheet
pub fn sheet_total(sheet: &[Score]) -> f64 {
    sheet.iter().map(|score| score.value).sum()
}
