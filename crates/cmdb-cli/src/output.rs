//! Plain-text renderers for command results.

use cmdb_core::api::StickybanMatches;
use cmdb_core::models::{
    ConnectionHistory, GroupMembersResponse, Player, PlayerNote, Playtime, Round, RoundData,
    Stickyban, Ticket, User, VpnWhitelist, WhitelistPlayer,
};
use cmdb_core::utils::{format_date, format_minutes, truncate_string};
use serde::Serialize;
use tracing::warn;

const MESSAGE_WIDTH: usize = 80;

/// Where results go: pretty JSON with `--json`, otherwise the text renderer.
pub struct Output {
    pub json: bool,
}

impl Output {
    pub fn emit<T: Serialize + ?Sized>(&self, value: &T, render: impl FnOnce(&T)) {
        if !self.json {
            render(value);
            return;
        }
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => warn!(error = %e, "Failed to encode output"),
        }
    }
}

pub fn print_player(player: &Player) {
    println!("{} (#{})", player.ckey, player.id);
    if let Some(ref date) = player.first_join_date {
        println!("  First join:  {}", format_date(date));
    }
    if let Some(ref date) = player.last_login {
        println!("  Last login:  {}", format_date(date));
    }
    if let Some(ref ip) = player.last_known_ip {
        println!("  Last IP:     {}", ip);
    }
    if let Some(ref cid) = player.last_known_cid {
        println!("  Last CID:    {}", cid);
    }
    if let Some(id) = player.discord_id {
        println!("  Discord ID:  {}", id);
    }
    if let Some(ref age) = player.byond_account_age {
        println!("  BYOND age:   {}", age);
    }
    let whitelists = player.whitelists();
    if !whitelists.is_empty() {
        println!("  Whitelists:  {}", whitelists.join(", "));
    }

    if player.is_permabanned {
        println!(
            "  PERMABANNED by {}: {}",
            player.permaban_admin_ckey.as_deref().unwrap_or("unknown"),
            player.permaban_reason.as_deref().unwrap_or("")
        );
    } else if player.is_time_banned {
        println!(
            "  Time banned by {}: {}",
            player.time_ban_admin_ckey.as_deref().unwrap_or("unknown"),
            player.time_ban_reason.as_deref().unwrap_or("")
        );
    }

    if !player.job_bans.is_empty() {
        println!("  Job bans:");
        for ban in &player.job_bans {
            println!(
                "    {:<20} {} ({})",
                ban.role,
                truncate_string(&ban.text, MESSAGE_WIDTH),
                ban.banning_admin_ckey.as_deref().unwrap_or("unknown")
            );
        }
    }
    println!("  Notes: {}", player.notes.len());
}

pub fn print_notes(notes: &[PlayerNote], applied: bool) {
    if notes.is_empty() {
        println!("No notes.");
        return;
    }
    for note in notes {
        // Applied notes were written by the player, about someone else
        let who = if applied {
            note.noted_player_ckey.as_deref()
        } else {
            note.noting_admin_ckey.as_deref()
        };
        let mut flags = Vec::new();
        if note.is_ban {
            flags.push("ban");
        }
        if note.is_confidential {
            flags.push("confidential");
        }
        println!(
            "{}  {:<16} {}{}",
            format_date(&note.date),
            who.unwrap_or("unknown"),
            truncate_string(note.text.as_deref().unwrap_or(""), MESSAGE_WIDTH),
            if flags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", flags.join(", "))
            }
        );
    }
}

pub fn print_playtime(entries: &[Playtime]) {
    let mut sorted: Vec<&Playtime> = entries.iter().collect();
    sorted.sort_by(|a, b| b.total_minutes.cmp(&a.total_minutes));
    for entry in sorted {
        println!("{:<30} {}", entry.role_id, format_minutes(entry.total_minutes));
    }
    println!("{:<30} {}", "Total", format_minutes(Playtime::total(entries)));
}

pub fn print_vpn_whitelist(entry: &VpnWhitelist) {
    println!("{} is VPN whitelisted (added by {})", entry.ckey, entry.admin_ckey);
}

pub fn print_tickets(tickets: &[Ticket]) {
    for t in tickets {
        println!(
            "{}  #{:<5} {:<10} {} -> {}: {}{}",
            format_date(&t.time),
            t.ticket,
            t.action,
            t.sender.as_deref().unwrap_or("-"),
            t.recipient.as_deref().unwrap_or("-"),
            truncate_string(&t.message, MESSAGE_WIDTH),
            if t.urgent { " [urgent]" } else { "" }
        );
    }
}

pub fn print_round(round: &RoundData) {
    // Round duration is reported in deciseconds
    let minutes = (round.round_duration / 600.0) as i64;
    println!("Round {} on {} ({})", round.round_id, round.map_name, round.mode);
    println!("  Players:   {}", round.players);
    println!("  Admins:    {}", round.admins);
    println!("  Duration:  {}", format_minutes(minutes));
    println!("  Security:  {}", round.security_level);
    println!("  TiDi:      {:.1}%", round.time_dilation_current);
}

pub fn print_recent_rounds(rounds: &[Round]) {
    let ids: Vec<String> = rounds.iter().map(|r| r.id.to_string()).collect();
    println!("Recent rounds: {}", ids.join(", "));
}

pub fn print_connections(history: &ConnectionHistory) {
    if history.is_empty() {
        println!("No connections.");
        return;
    }
    for t in &history.triplets {
        println!(
            "{}  {:<20} {:<15} {}",
            format_date(&t.login_date),
            t.ckey,
            t.ip(),
            t.last_known_cid
        );
    }
    print_list("Ckeys", &history.all_ckeys);
    print_list("CIDs", &history.all_cids);
    print_list("IPs", &history.all_ips);
}

pub fn print_stickybans(bans: &[Stickyban]) {
    for ban in bans {
        println!(
            "#{:<6} {:<24} {}{}",
            ban.id,
            ban.identifier,
            truncate_string(&ban.reason, MESSAGE_WIDTH),
            if ban.active { "" } else { " [inactive]" }
        );
    }
}

pub fn print_stickyban_matches(matches: &StickybanMatches) {
    let ckeys: Vec<String> = matches
        .ckeys
        .iter()
        .map(|c| {
            if c.whitelisted {
                format!("{} (whitelisted)", c.ckey)
            } else {
                c.ckey.clone()
            }
        })
        .collect();
    let cids: Vec<String> = matches.cids.iter().map(|c| c.cid.clone()).collect();
    let ips: Vec<String> = matches.ips.iter().map(|i| i.ip.clone()).collect();
    print_list("Ckeys", &ckeys);
    print_list("CIDs", &cids);
    print_list("IPs", &ips);
}

pub fn print_whitelists(players: &[WhitelistPlayer]) {
    for p in players {
        println!("{:<24} {}", p.ckey, p.statuses().join(", "));
    }
}

pub fn print_new_players(players: &[Player]) {
    for p in players {
        println!(
            "{:<24} {}",
            p.ckey,
            p.first_join_date.as_deref().map(format_date).unwrap_or_default()
        );
    }
}

pub fn print_group_members(group: &GroupMembersResponse) {
    println!("{} ({} members)", group.group_name, group.members.len());
    for m in &group.members {
        println!("  {:<24} {}", m.username, m.ckey.as_deref().unwrap_or("-"));
    }
}

pub fn print_user(user: &User) {
    println!("{}", user.username);
    if let Some(ref ckey) = user.ckey {
        println!("  Ckey:   {}", ckey);
    }
    if let Some(ref email) = user.email {
        println!("  Email:  {}", email);
    }
    if !user.groups.is_empty() {
        println!("  Groups: {}", user.groups.join(", "));
    }
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

fn print_list(label: &str, items: &[String]) {
    if !items.is_empty() {
        println!("{}: {}", label, items.join(", "));
    }
}
