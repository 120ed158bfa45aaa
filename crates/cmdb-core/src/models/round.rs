//! Rounds and the ahelp tickets filed during them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: i64,
    pub ticket: i64,
    pub action: String,
    pub message: String,
    pub recipient: Option<String>,
    pub sender: Option<String>,
    #[serde(default)]
    pub round_id: Option<i64>,
    pub time: String,
    #[serde(default)]
    pub urgent: bool,
}

/// A round as listed by `/Round/Recent`. Only the id is relied upon; the
/// remaining fields are kept as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub id: i64,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// Live status of the current round, as reported by the game server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundData {
    pub mode: String,
    pub vote: i64,
    pub ai: bool,
    #[serde(default)]
    pub host: Option<String>,
    pub round_id: i64,
    pub players: i64,
    pub revision: String,
    pub admins: i64,
    pub gamestate: i64,
    pub map_name: String,
    pub security_level: String,
    /// Deciseconds since round start.
    pub round_duration: f64,
    pub time_dilation_current: f64,
    pub time_dilation_avg: f64,
    pub time_dilation_avg_slow: f64,
    pub time_dilation_avg_fast: f64,
    pub mcpu: f64,
    pub cpu: f64,
}

/// `/Round` wraps the status in a `data` field.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RoundDataEnvelope {
    pub data: RoundData,
}
