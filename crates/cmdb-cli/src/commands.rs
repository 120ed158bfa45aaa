//! Command-line surface: one subcommand per dashboard screen.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use cmdb_core::api::{ConnectionLookup, StickybanLookup, TicketRange, UserQuery};
use cmdb_core::models::{NewNote, Player};
use cmdb_core::{ApiClient, AppContext, Location};

use crate::output::{self, Output};

/// Default look-back window for new players, in minutes.
const DEFAULT_NEW_PLAYER_MINUTES: u32 = 240;

#[derive(Debug, Parser)]
#[command(name = "cmdb", version, about = "Moderation console for the cmdb backend")]
pub struct Cli {
    /// Print raw JSON instead of formatted output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up a player by ckey or Discord ID
    User {
        #[arg(required_unless_present = "discord_id")]
        ckey: Option<String>,
        #[arg(long, conflicts_with = "ckey")]
        discord_id: Option<String>,
    },
    /// Show a player's playtime per role
    Playtime {
        ckey: String,
        /// Only count the last N days
        #[arg(long)]
        days: Option<u32>,
    },
    /// List notes on a player, or notes the player has written
    Notes {
        ckey: String,
        #[arg(long)]
        applied: bool,
    },
    /// Add a note to a player
    Note {
        ckey: String,
        message: String,
        #[arg(long)]
        confidential: bool,
    },
    /// Manage a player's VPN whitelist entry
    Vpn {
        #[command(subcommand)]
        action: VpnAction,
    },
    /// List tickets involving a player
    Tickets {
        ckey: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[command(flatten)]
        range: DateRange,
    },
    /// Show the current round, or the tickets of a past round
    Round { id: Option<i64> },
    /// Look up connection history
    Connections {
        #[command(subcommand)]
        by: ConnectionsBy,
    },
    /// Stickyban block-lists
    Sticky {
        #[command(subcommand)]
        action: StickyAction,
    },
    /// List whitelisted players
    Whitelists {
        /// Only show players holding this whitelist
        #[arg(long)]
        status: Option<String>,
    },
    /// List recently joined players
    NewPlayers {
        #[arg(long, default_value_t = DEFAULT_NEW_PLAYER_MINUTES)]
        minutes: u32,
    },
    /// Manage identity-provider group membership
    Groups {
        #[command(subcommand)]
        action: GroupAction,
    },
    /// Approve a pending two-factor login
    TwoFactor {
        #[arg(long)]
        cid: String,
        #[arg(long)]
        ip: String,
    },
    /// Show the signed-in staff member
    Whoami,
}

#[derive(Debug, Args)]
pub struct DateRange {
    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Subcommand)]
pub enum VpnAction {
    Show { ckey: String },
    Add { ckey: String },
    Remove { ckey: String },
}

#[derive(Debug, Subcommand)]
pub enum ConnectionsBy {
    Ip { ip: String },
    Cid { cid: String },
    Ckey {
        ckey: String,
        /// Every connection from any CID the player has used
        #[arg(long, conflicts_with = "all_ips")]
        all_cids: bool,
        /// Every connection from any IP the player has used
        #[arg(long)]
        all_ips: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum StickyAction {
    /// List all stickybans
    List,
    /// Show what a stickyban has matched
    Show { id: i64 },
    /// Find stickybans matching an identifier
    Match {
        #[arg(long, group = "identifier")]
        ip: Option<String>,
        #[arg(long, group = "identifier")]
        ckey: Option<String>,
        #[arg(long, group = "identifier")]
        cid: Option<String>,
    },
    /// Exempt a ckey from the stickybans it matches
    Whitelist { ckey: String },
}

#[derive(Debug, Subcommand)]
pub enum GroupAction {
    List,
    Members { group: String },
    Add { group: String, ckey: String },
    Remove { group: String, ckey: String },
}

impl Command {
    /// The dashboard page this command corresponds to; a login started from
    /// here returns to it.
    pub fn location(&self) -> Location {
        match self {
            Command::User { ckey: Some(ckey), .. }
            | Command::Playtime { ckey, .. }
            | Command::Notes { ckey, .. }
            | Command::Note { ckey, .. }
            | Command::Tickets { ckey, .. } => Location::new(format!("/user/{}", ckey)),
            Command::Vpn { action } => match action {
                VpnAction::Show { ckey } | VpnAction::Add { ckey } | VpnAction::Remove { ckey } => {
                    Location::new(format!("/user/{}", ckey))
                }
            },
            Command::User { ckey: None, .. } => Location::new("/user"),
            Command::Round { id: Some(id) } => Location::new(format!("/ticket/{}", id)),
            Command::Round { id: None } => Location::new("/ticket"),
            Command::Sticky { .. } => Location::new("/sticky"),
            Command::Whitelists { .. } => Location::new("/whitelists"),
            Command::NewPlayers { .. } => Location::new("/new_players"),
            Command::Groups { .. } => Location::new("/user_manager"),
            Command::TwoFactor { cid, ip } => Location::new("/2fa").with_query(format!(
                "cid={}&ip={}",
                url::form_urlencoded::byte_serialize(cid.as_bytes()).collect::<String>(),
                url::form_urlencoded::byte_serialize(ip.as_bytes()).collect::<String>()
            )),
            Command::Connections { .. } | Command::Whoami => Location::new("/"),
        }
    }
}

/// Run one command. Messages for the operator go through the context's toast.
pub async fn run(command: Command, client: &ApiClient, ctx: &AppContext, out: &Output) -> Result<()> {
    match command {
        Command::User { ckey, discord_id } => {
            let query = match (ckey, discord_id) {
                (Some(ckey), _) => UserQuery::Ckey(ckey),
                (None, Some(id)) => UserQuery::DiscordId(id),
                (None, None) => anyhow::bail!("Provide a ckey or --discord-id"),
            };
            match client.find_user(&query).await? {
                Some(player) => out.emit(&player, output::print_player),
                None => ctx.show_toast("Failed to find user."),
            }
        }
        Command::Playtime { ckey, days } => {
            if let Some(player) = find_player(client, ctx, &ckey).await? {
                let playtime = client.user_playtime(player.id, days).await?;
                out.emit(&playtime, |p| output::print_playtime(p));
            }
        }
        Command::Notes { ckey, applied } => {
            if let Some(player) = find_player(client, ctx, &ckey).await? {
                if applied {
                    let notes = client.applied_notes(player.id).await?;
                    out.emit(&notes, |n| output::print_notes(n, true));
                } else {
                    out.emit(&player.notes, |n| output::print_notes(n, false));
                }
            }
        }
        Command::Note {
            ckey,
            message,
            confidential,
        } => {
            if let Some(player) = find_player(client, ctx, &ckey).await? {
                let note = NewNote {
                    message,
                    confidential,
                };
                if client.add_note(player.id, &note).await? {
                    ctx.show_toast(format!("Added note to {}.", ckey));
                } else {
                    ctx.show_toast("Failed to add note.");
                }
            }
        }
        Command::Vpn { action } => run_vpn(action, client, ctx, out).await?,
        Command::Tickets { ckey, page, range } => {
            let range = match (range.from, range.to) {
                (Some(from), Some(to)) => TicketRange::days(from, to),
                _ => None,
            };
            let tickets = client.user_tickets(&ckey, page, range.as_ref()).await?;
            if tickets.is_empty() {
                ctx.show_toast("No more tickets.");
            } else {
                out.emit(&tickets, |t| output::print_tickets(t));
            }
        }
        Command::Round { id: Some(id) } => match client.round_tickets(id).await? {
            Some(tickets) => out.emit(&tickets, |t| output::print_tickets(t)),
            None => ctx.show_toast("No tickets found or the provided round ID."),
        },
        Command::Round { id: None } => {
            // Sequential: an expired session must redirect only once
            let current = client.current_round().await?;
            out.emit(&current, output::print_round);
            let recent = client.recent_rounds().await?;
            out.emit(&recent, |r| output::print_recent_rounds(r));
        }
        Command::Connections { by } => {
            let (lookup, what) = match by {
                ConnectionsBy::Ip { ip } => (ConnectionLookup::Ip(ip), "IP"),
                ConnectionsBy::Cid { cid } => (ConnectionLookup::Cid(cid), "CID"),
                ConnectionsBy::Ckey { ckey, all_cids: true, .. } => {
                    (ConnectionLookup::FullByAllCid(ckey), "ckey")
                }
                ConnectionsBy::Ckey { ckey, all_ips: true, .. } => {
                    (ConnectionLookup::FullByAllIps(ckey), "ckey")
                }
                ConnectionsBy::Ckey { ckey, .. } => (ConnectionLookup::Ckey(ckey), "ckey"),
            };
            match client.connections(&lookup).await? {
                Some(history) => out.emit(&history, output::print_connections),
                None => ctx.show_toast(format!("No connections by {}.", what)),
            }
        }
        Command::Sticky { action } => run_sticky(action, client, ctx, out).await?,
        Command::Whitelists { status } => {
            let mut players = client.whitelisted_players().await?;
            if let Some(ref status) = status {
                players.retain(|p| p.statuses().iter().any(|s| s.eq_ignore_ascii_case(status)));
            }
            out.emit(&players, |p| output::print_whitelists(p));
        }
        Command::NewPlayers { minutes } => {
            let players = client.new_players(minutes).await?;
            out.emit(&players, |p| output::print_new_players(p));
        }
        Command::Groups { action } => run_groups(action, client, ctx, out).await?,
        Command::TwoFactor { cid, ip } => {
            let message = client.approve_two_factor(&cid, &ip).await?;
            ctx.show_toast(message);
        }
        Command::Whoami => {
            let user = client.fetch_user_info().await?;
            ctx.set_user(user);
            if let Some(ref user) = ctx.user() {
                out.emit(user, output::print_user);
            }
        }
    }
    Ok(())
}

async fn find_player(client: &ApiClient, ctx: &AppContext, ckey: &str) -> Result<Option<Player>> {
    let player = client.find_user(&UserQuery::Ckey(ckey.to_string())).await?;
    if player.is_none() {
        ctx.show_toast("Failed to find user.");
    }
    Ok(player)
}

async fn run_vpn(action: VpnAction, client: &ApiClient, ctx: &AppContext, out: &Output) -> Result<()> {
    match action {
        VpnAction::Show { ckey } => match client.vpn_whitelist(&ckey).await? {
            Some(entry) => out.emit(&entry, output::print_vpn_whitelist),
            None => ctx.show_toast(format!("{} is not VPN whitelisted.", ckey)),
        },
        VpnAction::Add { ckey } => {
            if client.add_vpn_whitelist(&ckey).await? {
                ctx.show_toast(format!("Added VPN whitelist for {}.", ckey));
            } else {
                ctx.show_toast("Failed to add VPN whitelist.");
            }
        }
        VpnAction::Remove { ckey } => {
            if client.remove_vpn_whitelist(&ckey).await? {
                ctx.show_toast(format!("Removed VPN whitelist for {}.", ckey));
            } else {
                ctx.show_toast("Failed to remove VPN whitelist.");
            }
        }
    }
    Ok(())
}

async fn run_sticky(action: StickyAction, client: &ApiClient, ctx: &AppContext, out: &Output) -> Result<()> {
    match action {
        StickyAction::List => {
            let bans = client.stickybans().await?;
            out.emit(&bans, |b| output::print_stickybans(b));
        }
        StickyAction::Show { id } => {
            let matches = client.stickyban_matches(id).await?;
            out.emit(&matches, output::print_stickyban_matches);
        }
        StickyAction::Match { ip, ckey, cid } => {
            let lookup = match (ip, ckey, cid) {
                (Some(ip), _, _) => StickybanLookup::Ip(ip),
                (None, Some(ckey), _) => StickybanLookup::Ckey(ckey),
                (None, None, Some(cid)) => StickybanLookup::Cid(cid),
                (None, None, None) => anyhow::bail!("Provide --ip, --ckey or --cid"),
            };
            let bans = client.stickybans_for(&lookup).await?;
            if bans.is_empty() {
                ctx.show_toast("No matching stickybans.");
            } else {
                out.emit(&bans, |b| output::print_stickybans(b));
            }
        }
        StickyAction::Whitelist { ckey } => {
            if client.whitelist_stickyban(&ckey).await? {
                ctx.show_toast(format!("Whitelisted {}.", ckey));
            } else {
                ctx.show_toast(format!("No stickybans lifted for {}.", ckey));
            }
        }
    }
    Ok(())
}

async fn run_groups(action: GroupAction, client: &ApiClient, ctx: &AppContext, out: &Output) -> Result<()> {
    match action {
        GroupAction::List => {
            let groups = client.allowed_groups().await?;
            out.emit(&groups, |g| output::print_lines(g));
        }
        GroupAction::Members { group } => {
            let members = client.group_members(&group).await?;
            out.emit(&members, output::print_group_members);
        }
        GroupAction::Add { group, ckey } => {
            let result = client.add_user_to_group(&ckey, &group).await?;
            ctx.show_toast(result.message);
        }
        GroupAction::Remove { group, ckey } => {
            let result = client.remove_user_from_group(&ckey, &group).await?;
            ctx.show_toast(result.message);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Command {
        let mut full = vec!["cmdb"];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).expect("arguments should parse").command
    }

    #[test]
    fn test_user_location() {
        assert_eq!(parse(&["user", "foo"]).location().as_relative(), "/user/foo");
        assert_eq!(
            parse(&["user", "--discord-id", "123"]).location().as_relative(),
            "/user"
        );
        assert_eq!(
            parse(&["vpn", "add", "foo"]).location().as_relative(),
            "/user/foo"
        );
    }

    #[test]
    fn test_page_locations() {
        assert_eq!(parse(&["round", "20001"]).location().as_relative(), "/ticket/20001");
        assert_eq!(parse(&["round"]).location().as_relative(), "/ticket");
        assert_eq!(parse(&["sticky", "list"]).location().as_relative(), "/sticky");
        assert_eq!(parse(&["new-players"]).location().as_relative(), "/new_players");
        assert_eq!(parse(&["groups", "list"]).location().as_relative(), "/user_manager");
        assert_eq!(
            parse(&["two-factor", "--cid", "123", "--ip", "1.2.3.4"])
                .location()
                .as_relative(),
            "/2fa?cid=123&ip=1.2.3.4"
        );
    }

    #[test]
    fn test_user_requires_identifier() {
        assert!(Cli::try_parse_from(["cmdb", "user"]).is_err());
        assert!(Cli::try_parse_from(["cmdb", "user", "foo", "--discord-id", "1"]).is_err());
    }

    #[test]
    fn test_ticket_range_needs_both_ends() {
        assert!(Cli::try_parse_from(["cmdb", "tickets", "foo", "--from", "2024-05-01"]).is_err());
        let cmd = parse(&["tickets", "foo", "--from", "2024-05-01", "--to", "2024-05-02"]);
        match cmd {
            Command::Tickets { range, page, .. } => {
                assert_eq!(page, 1);
                assert_eq!(range.from, NaiveDate::from_ymd_opt(2024, 5, 1));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_round_overview_redirects_to_login_once() {
        use std::sync::Arc;

        use cmdb_core::{ApiError, Config, FixedNavigator};
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Round"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(path("/api/Round/Recent"))
            .respond_with(ResponseTemplate::new(401))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let config = Config {
            server_url: server.uri(),
            ..Config::default()
        };
        let navigator = Arc::new(FixedNavigator::new(Location::new("/ticket")));
        let client = ApiClient::new(&config, navigator.clone()).unwrap();
        let ctx = AppContext::new();
        let out = Output { json: true };

        let err = run(Command::Round { id: None }, &client, &ctx, &out)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::SessionExpired { .. })
        ));
        assert_eq!(
            navigator.navigated_to().map(|u| u.to_string()),
            Some(format!("{}/api/auth/login?redirect=%2Fticket", server.uri()))
        );
        server.verify().await;
    }

    #[test]
    fn test_new_players_default_window() {
        match parse(&["new-players"]) {
            Command::NewPlayers { minutes } => assert_eq!(minutes, 240),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
