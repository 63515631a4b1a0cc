//! Tournament document model and projections.
//!
//! The stored document uses camelCase field names so documents written by
//! earlier deployments (`showJudgeTotals`, `numberOfJudges`, `judgeCodes`)
//! load unchanged. Fields added later carry serde defaults for the same
//! reason.

use crate::kata::{Score, ScoreSheet, sheet_total};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tournament ID type
pub type TournamentId = String;

/// Name used when a tournament is created without one
pub const DEFAULT_TOURNAMENT_NAME: &str = "Tournament 1";

/// Judges seated on a freshly created mat
pub const JUDGES_PER_MAT: usize = 5;

/// Stored tournament document (everything except the id, which is the key)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    #[serde(default)]
    pub show_judge_totals: bool,
    #[serde(default)]
    pub mats: Vec<Mat>,
    /// Incremented on every successful save
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

/// Full tournament projection: the document plus its id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentData {
    pub id: TournamentId,
    #[serde(flatten)]
    pub document: TournamentDocument,
}

/// Tournament list entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSummary {
    pub id: TournamentId,
    pub name: String,
    pub show_judge_totals: bool,
}

/// Fields accepted when creating a tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTournament {
    #[serde(default = "default_tournament_name")]
    pub name: String,
    #[serde(default)]
    pub org: Option<String>,
    #[serde(default = "default_show_judge_totals")]
    pub show_judge_totals: bool,
}

fn default_tournament_name() -> String {
    DEFAULT_TOURNAMENT_NAME.to_string()
}

fn default_show_judge_totals() -> bool {
    true
}

impl Default for NewTournament {
    fn default() -> Self {
        Self {
            name: default_tournament_name(),
            org: None,
            show_judge_totals: default_show_judge_totals(),
        }
    }
}

/// Top-level fields overwritten by [`Tournament::replace`](super::Tournament::replace)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentFields {
    pub name: String,
    pub show_judge_totals: bool,
}

/// A competition area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mat {
    #[serde(default = "default_judges_per_mat")]
    pub number_of_judges: usize,
    /// Display names of the seated judges, by slot
    #[serde(default)]
    pub judges: Vec<String>,
    /// Access codes handed out to judges, by slot
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub judge_codes: Vec<String>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

fn default_judges_per_mat() -> usize {
    JUDGES_PER_MAT
}

/// A scheduled block of matches on a mat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kata: String,
    #[serde(default)]
    pub number_of_judges: usize,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub disable_divide_by_half: bool,
    #[serde(default)]
    pub disable_forgotten: bool,
    #[serde(default)]
    pub disable_major: bool,
    #[serde(default)]
    pub matches: Vec<Match>,
}

/// Group fields; used both to create a group and to replace its fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kata: String,
    #[serde(default)]
    pub number_of_judges: usize,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub disable_divide_by_half: bool,
    #[serde(default)]
    pub disable_forgotten: bool,
    #[serde(default)]
    pub disable_major: bool,
}

impl Group {
    pub(crate) fn from_fields(fields: GroupFields) -> Self {
        let mut group = Self {
            name: String::new(),
            kata: String::new(),
            number_of_judges: 0,
            start_time: None,
            disable_divide_by_half: false,
            disable_forgotten: false,
            disable_major: false,
            matches: Vec::new(),
        };
        group.apply(fields);
        group
    }

    /// Overwrite every field, leaving the matches alone
    pub(crate) fn apply(&mut self, fields: GroupFields) {
        self.name = fields.name;
        self.kata = fields.kata;
        self.number_of_judges = fields.number_of_judges;
        self.start_time = fields.start_time;
        self.disable_divide_by_half = fields.disable_divide_by_half;
        self.disable_forgotten = fields.disable_forgotten;
        self.disable_major = fields.disable_major;
    }
}

/// One performance by a tori/uke pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    /// Overrides the group's kata when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kata: Option<String>,
    #[serde(default)]
    pub tori: String,
    #[serde(default)]
    pub uke: String,
    /// Overrides the group's judge count when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_judges: Option<usize>,
    /// Score sheets by judge slot
    #[serde(default)]
    pub scores: Vec<ScoreSheet>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Value>,
}

impl Match {
    /// Kata performed, falling back to the group's
    pub fn effective_kata<'a>(&'a self, group: &'a Group) -> &'a str {
        self.kata.as_deref().unwrap_or(&group.kata)
    }

    /// Judge count, falling back to the group's
    pub fn effective_judges(&self, group: &Group) -> usize {
        self.number_of_judges.unwrap_or(group.number_of_judges)
    }

    /// Per-judge sum of technique values
    pub fn judge_totals(&self) -> Vec<f64> {
        self.scores.iter().map(|sheet| sheet_total(sheet)).collect()
    }
}

/// Fields accepted when creating a match
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchFields {
    #[serde(default)]
    pub kata: Option<String>,
    #[serde(default)]
    pub tori: String,
    #[serde(default)]
    pub uke: String,
    #[serde(default)]
    pub number_of_judges: Option<usize>,
    /// Seeded with default sheets when empty
    #[serde(default)]
    pub scores: Vec<ScoreSheet>,
}

/// Partial match update; only `Some` fields are written
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchUpdate {
    #[serde(default)]
    pub tori: Option<String>,
    #[serde(default)]
    pub uke: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub scores: Option<Vec<ScoreSheet>>,
    #[serde(default)]
    pub results: Option<Value>,
}

/// Match as shown to judging clients, with group defaults resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    pub kata: String,
    pub number_of_judges: usize,
    pub tori: String,
    pub uke: String,
    pub scores: Vec<ScoreSheet>,
}

/// Next match to judge on a mat and where it lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingMatch {
    #[serde(rename = "match")]
    pub match_view: MatchView,
    pub index: usize,
    pub group_index: usize,
}

/// Pending match entry on the mat display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatMatchView {
    /// 1-based position of the match on the mat, across groups
    pub number: usize,
    pub kata: String,
    pub tori: String,
    pub uke: String,
    /// Present only when the tournament shows judge totals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judge_totals: Option<Vec<f64>>,
}

/// What a single judge sees for the match they are scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeMatchView {
    pub kata: String,
    pub number_of_judges: usize,
    pub tori: String,
    pub uke: String,
    /// This judge's sheet only
    pub scores: Vec<Score>,
}
