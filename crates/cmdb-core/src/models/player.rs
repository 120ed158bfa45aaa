//! Player records as returned by the `/User` endpoints.

use serde::{Deserialize, Serialize};

/// Note category the dashboard files new notes under.
const ADMIN_NOTE_CATEGORY: &str = "1";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: i64,
    pub ckey: String,
    #[serde(default)]
    pub last_login: Option<String>,
    #[serde(default)]
    pub is_permabanned: bool,
    #[serde(default)]
    pub permaban_reason: Option<String>,
    #[serde(default)]
    pub permaban_date: Option<String>,
    #[serde(default)]
    pub permaban_admin_id: Option<i64>,
    #[serde(default)]
    pub permaban_admin_ckey: Option<String>,
    #[serde(default)]
    pub is_time_banned: bool,
    #[serde(default)]
    pub time_ban_reason: Option<String>,
    #[serde(default)]
    pub time_ban_admin_id: Option<i64>,
    #[serde(default)]
    pub time_ban_admin_ckey: Option<String>,
    #[serde(default)]
    pub time_ban_date: Option<String>,
    /// Minutes of ban time left.
    #[serde(default)]
    pub time_ban_expiration: Option<i64>,
    #[serde(default)]
    pub last_known_ip: Option<String>,
    #[serde(default)]
    pub last_known_cid: Option<String>,
    #[serde(default)]
    pub migrated_notes: bool,
    #[serde(default)]
    pub migrated_bans: bool,
    #[serde(default)]
    pub stickyban_whitelisted: Option<bool>,
    #[serde(default)]
    pub discord_link_id: Option<i64>,
    #[serde(default)]
    pub discord_id: Option<i64>,
    /// `|`-separated whitelist flags.
    #[serde(default)]
    pub whitelist_status: Option<String>,
    #[serde(default)]
    pub byond_account_age: Option<String>,
    #[serde(default)]
    pub first_join_date: Option<String>,
    #[serde(default)]
    pub notes: Vec<PlayerNote>,
    #[serde(default)]
    pub job_bans: Vec<PlayerJobBan>,
}

impl Player {
    pub fn is_banned(&self) -> bool {
        self.is_permabanned || self.is_time_banned
    }

    pub fn whitelists(&self) -> Vec<&str> {
        split_statuses(self.whitelist_status.as_deref().unwrap_or(""))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerNote {
    pub id: i64,
    pub player_id: i64,
    pub admin_id: i64,
    #[serde(default)]
    pub text: Option<String>,
    pub date: String,
    #[serde(default)]
    pub is_ban: bool,
    #[serde(default)]
    pub ban_time: Option<i64>,
    #[serde(default)]
    pub is_confidential: bool,
    #[serde(default)]
    pub admin_rank: String,
    #[serde(default)]
    pub note_category: Option<i64>,
    #[serde(default)]
    pub round_id: Option<i64>,
    #[serde(default)]
    pub noted_player_ckey: Option<String>,
    #[serde(default)]
    pub noting_admin_ckey: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerJobBan {
    pub id: i64,
    pub player_id: i64,
    pub admin_id: i64,
    #[serde(default)]
    pub text: String,
    pub date: String,
    #[serde(default)]
    pub ban_time: Option<i64>,
    #[serde(default)]
    pub expiration: Option<i64>,
    pub role: String,
    #[serde(default)]
    pub banning_admin_ckey: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playtime {
    pub id: i64,
    pub player_id: i64,
    pub role_id: String,
    pub total_minutes: i64,
}

impl Playtime {
    pub fn total(entries: &[Playtime]) -> i64 {
        entries.iter().map(|p| p.total_minutes).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VpnWhitelist {
    pub ckey: String,
    pub admin_ckey: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistPlayer {
    pub id: i64,
    pub ckey: String,
    pub whitelist_status: String,
}

impl WhitelistPlayer {
    pub fn statuses(&self) -> Vec<&str> {
        split_statuses(&self.whitelist_status)
    }
}

/// A note to attach to a player.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub message: String,
    pub confidential: bool,
}

impl NewNote {
    /// Form fields for `POST /User/{id}/Note`.
    pub fn form_fields(&self) -> [(&str, &str); 3] {
        [
            ("message", self.message.as_str()),
            ("category", ADMIN_NOTE_CATEGORY),
            ("confidential", if self.confidential { "true" } else { "false" }),
        ]
    }
}

fn split_statuses(raw: &str) -> Vec<&str> {
    raw.split('|').filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_player() {
        let json = r#"{
            "id": 42,
            "ckey": "foo",
            "lastLogin": "2024-05-01T10:00:00",
            "isPermabanned": false,
            "isTimeBanned": true,
            "timeBanReason": "griefing",
            "timeBanExpiration": 1440,
            "lastKnownIp": "10.0.0.1",
            "lastKnownCid": "123456",
            "migratedNotes": true,
            "migratedBans": true,
            "whitelistStatus": "WHITELIST_COMMANDER|WHITELIST_SYNTHETIC",
            "notes": [{
                "id": 1, "playerId": 42, "adminId": 7, "text": "warned",
                "date": "2024-04-01", "isBan": false, "isConfidential": false,
                "adminRank": "Moderator"
            }]
        }"#;

        let player: Player = serde_json::from_str(json).unwrap();
        assert_eq!(player.ckey, "foo");
        assert!(player.is_banned());
        assert_eq!(player.time_ban_expiration, Some(1440));
        assert_eq!(player.whitelists(), vec!["WHITELIST_COMMANDER", "WHITELIST_SYNTHETIC"]);
        assert_eq!(player.notes.len(), 1);
        assert_eq!(player.notes[0].text.as_deref(), Some("warned"));
        assert!(player.job_bans.is_empty());
    }

    #[test]
    fn test_player_discord_ids() {
        let json = r#"{"id": 7, "ckey": "bar", "discordLinkId": 3, "discordId": 123456789012345678}"#;
        let player: Player = serde_json::from_str(json).unwrap();
        assert_eq!(player.discord_link_id, Some(3));
        assert_eq!(player.discord_id, Some(123456789012345678));

        let player: Player = serde_json::from_str(r#"{"id": 7, "ckey": "bar"}"#).unwrap();
        assert_eq!(player.discord_id, None);
    }

    #[test]
    fn test_whitelist_statuses_skip_empty() {
        let entry = WhitelistPlayer {
            id: 1,
            ckey: "bar".to_string(),
            whitelist_status: "A||B|".to_string(),
        };
        assert_eq!(entry.statuses(), vec!["A", "B"]);
    }

    #[test]
    fn test_playtime_total() {
        let entries = vec![
            Playtime { id: 1, player_id: 2, role_id: "Marine".into(), total_minutes: 90 },
            Playtime { id: 2, player_id: 2, role_id: "Medic".into(), total_minutes: 30 },
        ];
        assert_eq!(Playtime::total(&entries), 120);
        assert_eq!(Playtime::total(&[]), 0);
    }

    #[test]
    fn test_note_form_fields() {
        let note = NewNote {
            message: "test".to_string(),
            confidential: true,
        };
        assert_eq!(
            note.form_fields(),
            [("message", "test"), ("category", "1"), ("confidential", "true")]
        );
    }
}
