//! Judge and athlete records.

use serde::{Deserialize, Serialize};

/// Judge registry id
pub type JudgeId = String;

/// Athlete registry id
pub type AthleteId = String;

/// Judge record as stored (the id is the storage key)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub rank: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Judge record with its id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Judge {
    pub id: JudgeId,
    #[serde(flatten)]
    pub data: JudgeData,
}

/// Judge list entry; contact details are left out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeSummary {
    pub id: JudgeId,
    pub name: String,
    pub region: String,
    pub rank: String,
}

impl From<&Judge> for JudgeSummary {
    fn from(judge: &Judge) -> Self {
        Self {
            id: judge.id.clone(),
            name: judge.data.name.clone(),
            region: judge.data.region.clone(),
            rank: judge.data.rank.clone(),
        }
    }
}

/// Athlete record as stored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AthleteData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rank: String,
    #[serde(default)]
    pub region: String,
}

/// Athlete record with its id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Athlete {
    pub id: AthleteId,
    #[serde(flatten)]
    pub data: AthleteData,
}
