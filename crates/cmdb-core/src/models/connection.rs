//! Login history: which ckey connected from which IP and CID.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

/// One recorded login of a ckey from an IP/CID pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginTriplet {
    pub id: i64,
    pub ckey: String,
    pub ip1: u8,
    pub ip2: u8,
    pub ip3: u8,
    pub ip4: u8,
    pub last_known_cid: String,
    pub login_date: String,
}

impl LoginTriplet {
    pub fn ip(&self) -> Ipv4Addr {
        Ipv4Addr::new(self.ip1, self.ip2, self.ip3, self.ip4)
    }
}

/// Result of a connection lookup; every part is optional on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionHistory {
    #[serde(default)]
    pub triplets: Vec<LoginTriplet>,
    #[serde(default)]
    pub all_ckeys: Vec<String>,
    #[serde(default)]
    pub all_cids: Vec<String>,
    #[serde(default)]
    pub all_ips: Vec<String>,
}

impl ConnectionHistory {
    pub fn is_empty(&self) -> bool {
        self.triplets.is_empty()
            && self.all_ckeys.is_empty()
            && self.all_cids.is_empty()
            && self.all_ips.is_empty()
    }
}
