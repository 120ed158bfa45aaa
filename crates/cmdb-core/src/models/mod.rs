//! Wire models for cmdb backend payloads.
//!
//! - `Player`, `PlayerNote`, `PlayerJobBan`, `Playtime`: player records
//! - `LoginTriplet`, `ConnectionHistory`: ckey/IP/CID login history
//! - `Stickyban` and its matched identifiers
//! - `Ticket`, `Round`, `RoundData`: ahelp tickets and round information
//! - `WhitelistPlayer`: role whitelists
//! - Group management types and the signed-in `User`

pub mod authentik;
pub mod connection;
pub mod player;
pub mod round;
pub mod stickyban;
pub mod user;

pub use authentik::{AuthentikError, AuthentikSuccess, GroupMember, GroupMembersResponse, UserGroupRequest};
pub use connection::{ConnectionHistory, LoginTriplet};
pub use player::{NewNote, Player, PlayerJobBan, PlayerNote, Playtime, VpnWhitelist, WhitelistPlayer};
pub use round::{Round, RoundData, Ticket};
pub use stickyban::{Stickyban, StickybanMatchedCid, StickybanMatchedCkey, StickybanMatchedIp};
pub use user::User;
