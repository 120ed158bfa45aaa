//! Stickybans and the identifiers matched against them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stickyban {
    pub id: i64,
    pub identifier: String,
    pub reason: String,
    pub message: String,
    pub date: String,
    pub active: bool,
    #[serde(default)]
    pub admin_id: Option<i64>,
    #[serde(default)]
    pub admin_ckey: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickybanMatchedCid {
    pub id: i64,
    pub cid: String,
    pub linked_stickyban: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickybanMatchedCkey {
    pub id: i64,
    pub ckey: String,
    pub linked_stickyban: i64,
    #[serde(default)]
    pub whitelisted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickybanMatchedIp {
    pub id: i64,
    pub ip: String,
    pub linked_stickyban: i64,
}
