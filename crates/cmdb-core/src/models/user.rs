use serde::{Deserialize, Serialize};

/// The signed-in staff member, as reported by the identity proxy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, alias = "preferred_username", alias = "preferredUsername")]
    pub username: String,
    #[serde(default)]
    pub ckey: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub groups: Vec<String>,
}

impl User {
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}
