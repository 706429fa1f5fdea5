use axum::http::HeaderValue;
use serde::Deserialize;
use serde_json::Value;

/// A linked identity that is a member of one of the allowed groups.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkedIdentity {
    pub identity_id: String,
    pub username: String,
}

/// Details attached to a rejected group-restricted login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupAuthFailure {
    /// Linked identities that would pass the group check. Empty when the
    /// payload had none or the field could not be read.
    pub allowed_user_member_groups: Vec<LinkedIdentity>,
    pub group_join_url: Option<String>,
}

impl GroupAuthFailure {
    /// Reads the failure from the arguments the backend raised with.
    ///
    /// Returns `None` when the first argument is missing or is not a JSON
    /// object. Fields inside a recognised object that have the wrong shape are
    /// treated as absent.
    pub fn from_args(args: &[Value]) -> Option<Self> {
        let fields = args.first()?.as_object()?;

        let allowed_user_member_groups = match fields.get("allowed_user_member_groups") {
            None | Some(Value::Null) => Vec::new(),
            Some(raw) => serde_json::from_value(raw.clone()).unwrap_or_else(|e| {
                tracing::debug!("Ignoring malformed allowed_user_member_groups: {e}");
                Vec::new()
            }),
        };

        let group_join_url = fields
            .get("group_join_url")
            .and_then(Value::as_str)
            .filter(|url| is_redirect_target(url))
            .map(str::to_string);

        Some(GroupAuthFailure {
            allowed_user_member_groups,
            group_join_url,
        })
    }

    pub fn identity_ids(&self) -> Vec<&str> {
        self.allowed_user_member_groups
            .iter()
            .map(|identity| identity.identity_id.as_str())
            .collect()
    }

    pub fn usernames(&self) -> Vec<&str> {
        self.allowed_user_member_groups
            .iter()
            .map(|identity| identity.username.as_str())
            .collect()
    }
}

/// Non-empty and usable as a `Location` header value.
pub fn is_redirect_target(url: &str) -> bool {
    !url.is_empty() && HeaderValue::from_str(url).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_non_object_payloads() {
        assert_eq!(GroupAuthFailure::from_args(&[]), None);
        assert_eq!(GroupAuthFailure::from_args(&[json!("forbidden")]), None);
        assert_eq!(GroupAuthFailure::from_args(&[json!([])]), None);
        assert_eq!(GroupAuthFailure::from_args(&[json!(null)]), None);
    }

    #[test]
    fn reads_identities_and_join_url() {
        let failure = GroupAuthFailure::from_args(&[json!({
            "allowed_user_member_groups": [
                {"identity_id": "id1", "username": "alice"},
                {"identity_id": "id2", "username": "bob"},
            ],
            "group_join_url": "https://app.globus.org/join",
        })])
        .unwrap();

        assert_eq!(failure.identity_ids(), vec!["id1", "id2"]);
        assert_eq!(failure.usernames(), vec!["alice", "bob"]);
        assert_eq!(
            failure.group_join_url.as_deref(),
            Some("https://app.globus.org/join")
        );
    }

    #[test]
    fn malformed_fields_are_absent() {
        let failure = GroupAuthFailure::from_args(&[json!({
            "allowed_user_member_groups": "id1",
            "group_join_url": 42,
        })])
        .unwrap();
        assert_eq!(failure, GroupAuthFailure::default());

        let failure = GroupAuthFailure::from_args(&[json!({
            "allowed_user_member_groups": [{"username": "alice"}],
            "group_join_url": "",
        })])
        .unwrap();
        assert_eq!(failure, GroupAuthFailure::default());
    }

    #[test]
    fn join_urls_unfit_for_a_header_are_absent() {
        let failure = GroupAuthFailure::from_args(&[json!({
            "group_join_url": "https://x.org/\njoin",
        })])
        .unwrap();
        assert_eq!(failure.group_join_url, None);
        assert!(is_redirect_target("https://x.org/join"));
        assert!(!is_redirect_target("https://x.org/\r\njoin"));
    }

    #[test]
    fn extra_arguments_are_ignored() {
        let failure =
            GroupAuthFailure::from_args(&[json!({}), json!("backend detail")]).unwrap();
        assert_eq!(failure, GroupAuthFailure::default());
    }
}
