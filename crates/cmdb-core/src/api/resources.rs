//! Typed wrappers over the backend's feature endpoints.
//!
//! All of these go through `ApiClient::call_api`, so session refresh and the
//! login redirect apply to them. Outcomes are decided on the HTTP status
//! only; the body is parsed once the status says it holds data.

use chrono::{NaiveDate, NaiveDateTime};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::models::round::RoundDataEnvelope;
use crate::models::{
    AuthentikError, AuthentikSuccess, ConnectionHistory, GroupMembersResponse, NewNote, Player,
    PlayerNote, Playtime, Round, RoundData, Stickyban, StickybanMatchedCid, StickybanMatchedCkey,
    StickybanMatchedIp, Ticket, UserGroupRequest, VpnWhitelist, WhitelistPlayer,
};

use super::{ApiClient, ApiError, RequestOptions};

/// Format of the ticket date filter, e.g. `2024-05-01 23:59:59`.
const TICKET_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How to find a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserQuery {
    Ckey(String),
    DiscordId(String),
}

impl UserQuery {
    fn path(&self) -> String {
        match self {
            UserQuery::Ckey(ckey) => format!("/User?ckey={}", urlencoding::encode(ckey)),
            UserQuery::DiscordId(id) => format!("/User?discord_id={}", urlencoding::encode(id)),
        }
    }
}

/// Which connection history to look up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionLookup {
    Ip(String),
    Cid(String),
    Ckey(String),
    /// Every connection from any CID the ckey has used.
    FullByAllCid(String),
    /// Every connection from any IP the ckey has used.
    FullByAllIps(String),
}

impl ConnectionLookup {
    fn path(&self) -> String {
        let (endpoint, param, value) = match self {
            ConnectionLookup::Ip(v) => ("Ip", "ip", v),
            ConnectionLookup::Cid(v) => ("Cid", "cid", v),
            ConnectionLookup::Ckey(v) => ("Ckey", "ckey", v),
            ConnectionLookup::FullByAllCid(v) => ("FullByAllCid", "ckey", v),
            ConnectionLookup::FullByAllIps(v) => ("FullByAllIps", "ckey", v),
        };
        format!("/Connections/{}?{}={}", endpoint, param, urlencoding::encode(value))
    }
}

/// Which identifier to match stickybans against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StickybanLookup {
    Ip(String),
    Ckey(String),
    Cid(String),
}

impl StickybanLookup {
    fn path(&self) -> String {
        let (endpoint, param, value) = match self {
            StickybanLookup::Ip(v) => ("Ip", "ip", v),
            StickybanLookup::Ckey(v) => ("Ckey", "ckey", v),
            StickybanLookup::Cid(v) => ("Cid", "cid", v),
        };
        format!("/Stickyban/{}?{}={}", endpoint, param, urlencoding::encode(value))
    }
}

/// Everything a stickyban has caught.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StickybanMatches {
    pub cids: Vec<StickybanMatchedCid>,
    pub ckeys: Vec<StickybanMatchedCkey>,
    pub ips: Vec<StickybanMatchedIp>,
}

/// Inclusive date filter for a player's tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketRange {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl TicketRange {
    /// From the start of `from` to the last second of `to`.
    pub fn days(from: NaiveDate, to: NaiveDate) -> Option<Self> {
        Some(Self {
            from: from.and_hms_opt(0, 0, 0)?,
            to: to.and_hms_opt(23, 59, 59)?,
        })
    }

    fn query(&self) -> String {
        format!(
            "&from={}&to={}",
            urlencoding::encode(&self.from.format(TICKET_DATE_FORMAT).to_string()),
            urlencoding::encode(&self.to.format(TICKET_DATE_FORMAT).to_string())
        )
    }
}

impl ApiClient {
    // ===== Helpers =====

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.call_api(path, &RequestOptions::get()).await?;
        Self::read_json(response).await
    }

    /// Like `get_json`, but a 404 means "nothing there".
    async fn get_json_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ApiError> {
        let response = self.call_api(path, &RequestOptions::get()).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(path, "Not found");
            return Ok(None);
        }
        Self::read_json(response).await.map(Some)
    }

    /// Parse a successful JSON body, or turn the status into an error.
    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        let url = response.url().path().to_string();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_status(status, &text));
        }
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", url, e)))
    }

    /// Read an `{error, message}` body from a failed group management call.
    async fn authentik_failure(response: Response, fallback: &str) -> ApiError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<AuthentikError>(&text) {
            Ok(err) if !err.message.is_empty() => ApiError::Rejected(err.message),
            _ => {
                debug!(status = %status, "Group management call failed without a message");
                ApiError::Rejected(fallback.to_string())
            }
        }
    }

    // ===== Players =====

    /// Look up a player; `None` when the backend has no such player.
    pub async fn find_user(&self, query: &UserQuery) -> Result<Option<Player>, ApiError> {
        self.get_json_optional(&query.path()).await
    }

    /// Playtime per role, all time or for the last `days` days.
    pub async fn user_playtime(&self, player_id: i64, days: Option<u32>) -> Result<Vec<Playtime>, ApiError> {
        let path = match days {
            Some(days) => format!("/User/{}/Playtime/{}", player_id, days),
            None => format!("/User/{}/Playtime", player_id),
        };
        self.get_json(&path).await
    }

    /// Notes this player has written about others.
    pub async fn applied_notes(&self, player_id: i64) -> Result<Vec<PlayerNote>, ApiError> {
        self.get_json(&format!("/User/{}/AppliedNotes", player_id)).await
    }

    pub async fn add_note(&self, player_id: i64, note: &NewNote) -> Result<bool, ApiError> {
        let options = RequestOptions::post().with_form(note.form_fields());
        let response = self
            .call_api(&format!("/User/{}/Note", player_id), &options)
            .await?;
        Ok(response.status().is_success())
    }

    pub async fn vpn_whitelist(&self, ckey: &str) -> Result<Option<VpnWhitelist>, ApiError> {
        let response = self
            .call_api(&Self::vpn_path(ckey), &RequestOptions::get())
            .await?;
        if response.status() != StatusCode::OK {
            return Ok(None);
        }
        Self::read_json(response).await.map(Some)
    }

    /// `true` when the whitelist entry was created.
    pub async fn add_vpn_whitelist(&self, ckey: &str) -> Result<bool, ApiError> {
        let response = self
            .call_api(&Self::vpn_path(ckey), &RequestOptions::post())
            .await?;
        Ok(response.status() == StatusCode::CREATED)
    }

    /// `true` when the whitelist entry was removed.
    pub async fn remove_vpn_whitelist(&self, ckey: &str) -> Result<bool, ApiError> {
        let response = self
            .call_api(&Self::vpn_path(ckey), &RequestOptions::delete())
            .await?;
        Ok(response.status() == StatusCode::OK)
    }

    fn vpn_path(ckey: &str) -> String {
        format!("/User/VpnWhitelist?ckey={}", urlencoding::encode(ckey))
    }

    /// Players who first joined within the last `minutes` minutes.
    pub async fn new_players(&self, minutes: u32) -> Result<Vec<Player>, ApiError> {
        self.get_json(&format!("/NewPlayers/{}", minutes)).await
    }

    pub async fn whitelisted_players(&self) -> Result<Vec<WhitelistPlayer>, ApiError> {
        self.get_json("/Whitelist").await
    }

    // ===== Tickets & rounds =====

    /// One page of tickets involving `ckey`. Pages start at 1; a non-200
    /// status means there are no more pages and yields an empty list.
    pub async fn user_tickets(
        &self,
        ckey: &str,
        page: u32,
        range: Option<&TicketRange>,
    ) -> Result<Vec<Ticket>, ApiError> {
        let mut path = format!("/Ticket/User/{}/?page={}", urlencoding::encode(ckey), page);
        if let Some(range) = range {
            path.push_str(&range.query());
        }

        let response = self.call_api(&path, &RequestOptions::get()).await?;
        if response.status() != StatusCode::OK {
            debug!(ckey, page, status = %response.status(), "No more tickets");
            return Ok(Vec::new());
        }
        Self::read_json(response).await
    }

    /// All tickets of a round; `None` for an unknown round.
    pub async fn round_tickets(&self, round_id: i64) -> Result<Option<Vec<Ticket>>, ApiError> {
        self.get_json_optional(&format!("/Ticket/{}", round_id)).await
    }

    pub async fn recent_rounds(&self) -> Result<Vec<Round>, ApiError> {
        self.get_json("/Round/Recent").await
    }

    pub async fn current_round(&self) -> Result<RoundData, ApiError> {
        let envelope: RoundDataEnvelope = self.get_json("/Round").await?;
        Ok(envelope.data)
    }

    // ===== Connections =====

    /// Connection history; `None` when nothing is recorded.
    pub async fn connections(&self, lookup: &ConnectionLookup) -> Result<Option<ConnectionHistory>, ApiError> {
        self.get_json_optional(&lookup.path()).await
    }

    // ===== Stickybans =====

    pub async fn stickybans(&self) -> Result<Vec<Stickyban>, ApiError> {
        self.get_json("/Stickyban").await
    }

    /// Stickybans matching an IP, ckey or CID.
    pub async fn stickybans_for(&self, lookup: &StickybanLookup) -> Result<Vec<Stickyban>, ApiError> {
        self.get_json(&lookup.path()).await
    }

    /// The CIDs, ckeys and IPs caught by a stickyban, fetched concurrently.
    pub async fn stickyban_matches(&self, stickyban_id: i64) -> Result<StickybanMatches, ApiError> {
        let cid_path = format!("/Stickyban/{}/Match/Cid", stickyban_id);
        let ckey_path = format!("/Stickyban/{}/Match/Ckey", stickyban_id);
        let ip_path = format!("/Stickyban/{}/Match/Ip", stickyban_id);

        let (cids, ckeys, ips) = futures::try_join!(
            self.get_json::<Vec<StickybanMatchedCid>>(&cid_path),
            self.get_json::<Vec<StickybanMatchedCkey>>(&ckey_path),
            self.get_json::<Vec<StickybanMatchedIp>>(&ip_path),
        )?;

        Ok(StickybanMatches { cids, ckeys, ips })
    }

    /// Exempt a ckey from the stickybans it matches. `false` when no
    /// stickyban was lifted.
    pub async fn whitelist_stickyban(&self, ckey: &str) -> Result<bool, ApiError> {
        let path = format!("/Stickyban/Whitelist?ckey={}", urlencoding::encode(ckey));
        let response = self.call_api(&path, &RequestOptions::post()).await?;
        Ok(response.status() == StatusCode::ACCEPTED)
    }

    // ===== Group management =====

    pub async fn allowed_groups(&self) -> Result<Vec<String>, ApiError> {
        let response = self
            .call_api("/Authentik/AllowedGroups", &RequestOptions::get())
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::Rejected("Failed to fetch allowed groups".to_string()));
        }
        Self::read_json(response).await
    }

    pub async fn group_members(&self, group_name: &str) -> Result<GroupMembersResponse, ApiError> {
        let path = format!("/Authentik/GroupMembers/{}", urlencoding::encode(group_name));
        let response = self.call_api(&path, &RequestOptions::get()).await?;
        if !response.status().is_success() {
            return Err(Self::authentik_failure(response, "Failed to fetch group members").await);
        }
        Self::read_json(response).await
    }

    pub async fn add_user_to_group(&self, ckey: &str, group_name: &str) -> Result<AuthentikSuccess, ApiError> {
        self.change_group_membership("/Authentik/AddUserToGroup", ckey, group_name, "Failed to add user")
            .await
    }

    pub async fn remove_user_from_group(
        &self,
        ckey: &str,
        group_name: &str,
    ) -> Result<AuthentikSuccess, ApiError> {
        self.change_group_membership(
            "/Authentik/RemoveUserFromGroup",
            ckey,
            group_name,
            "Failed to remove user",
        )
        .await
    }

    async fn change_group_membership(
        &self,
        path: &str,
        ckey: &str,
        group_name: &str,
        fallback: &str,
    ) -> Result<AuthentikSuccess, ApiError> {
        let body = UserGroupRequest {
            ckey: ckey.trim().to_string(),
            group_name: group_name.to_string(),
        };
        let options = RequestOptions::post().with_json(&body)?;
        let response = self.call_api(path, &options).await?;
        if !response.status().is_success() {
            return Err(Self::authentik_failure(response, fallback).await);
        }
        Self::read_json(response).await
    }

    // ===== Two-factor =====

    /// Approve a pending two-factor login; returns the backend's message.
    pub async fn approve_two_factor(&self, cid: &str, ip: &str) -> Result<String, ApiError> {
        let path = format!(
            "/TwoFactor?cid={}&ip={}",
            urlencoding::encode(cid),
            urlencoding::encode(ip)
        );
        let response = self.call_api(&path, &RequestOptions::get()).await?;
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_query_path() {
        assert_eq!(UserQuery::Ckey("foo".into()).path(), "/User?ckey=foo");
        assert_eq!(
            UserQuery::DiscordId("1234567890".into()).path(),
            "/User?discord_id=1234567890"
        );
        // Values are encoded
        assert_eq!(UserQuery::Ckey("a b&c".into()).path(), "/User?ckey=a%20b%26c");
    }

    #[test]
    fn test_connection_lookup_path() {
        assert_eq!(
            ConnectionLookup::Ip("10.0.0.1".into()).path(),
            "/Connections/Ip?ip=10.0.0.1"
        );
        assert_eq!(
            ConnectionLookup::Cid("123".into()).path(),
            "/Connections/Cid?cid=123"
        );
        assert_eq!(
            ConnectionLookup::FullByAllCid("foo".into()).path(),
            "/Connections/FullByAllCid?ckey=foo"
        );
        assert_eq!(
            ConnectionLookup::FullByAllIps("foo".into()).path(),
            "/Connections/FullByAllIps?ckey=foo"
        );
    }

    #[test]
    fn test_stickyban_lookup_path() {
        assert_eq!(StickybanLookup::Ckey("foo".into()).path(), "/Stickyban/Ckey?ckey=foo");
        assert_eq!(StickybanLookup::Ip("1.2.3.4".into()).path(), "/Stickyban/Ip?ip=1.2.3.4");
        assert_eq!(StickybanLookup::Cid("55".into()).path(), "/Stickyban/Cid?cid=55");
    }

    #[test]
    fn test_ticket_range_query() {
        let range = TicketRange::days(
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
        )
        .unwrap();
        assert_eq!(
            range.query(),
            "&from=2024-05-01%2000%3A00%3A00&to=2024-05-03%2023%3A59%3A59"
        );
    }
}
