//! Identity-provider group management payloads.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMember {
    pub pk: i64,
    pub username: String,
    pub ckey: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMembersResponse {
    pub group_name: String,
    pub members: Vec<GroupMember>,
}

/// Body of the add/remove group membership calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserGroupRequest {
    pub ckey: String,
    pub group_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthentikSuccess {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthentikError {
    pub error: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_group_request_wire_names() {
        let body = serde_json::to_value(UserGroupRequest {
            ckey: "foo".to_string(),
            group_name: "moderators".to_string(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"ckey": "foo", "group_name": "moderators"}));
    }

    #[test]
    fn test_group_members_response() {
        let json = r#"{"groupName": "moderators", "members": [
            {"pk": 1, "username": "alice", "ckey": "alice"},
            {"pk": 2, "username": "bob", "ckey": null}
        ]}"#;
        let resp: GroupMembersResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.group_name, "moderators");
        assert_eq!(resp.members.len(), 2);
        assert!(resp.members[1].ckey.is_none());
    }
}
