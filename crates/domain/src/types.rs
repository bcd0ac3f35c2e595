//! Front resource types as they appear on the wire
//!
//! Field names follow the API's snake_case JSON. Timestamps are Unix seconds
//! encoded as floats; use [`unix_to_datetime`] to convert them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// HATEOAS links attached to most resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    #[serde(rename = "self", default, skip_serializing_if = "String::is_empty")]
    pub self_link: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub related: HashMap<String, String>,
}

/// Cursor-based pagination; `next` is an absolute URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

/// Envelope returned by every list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct ListResponse<T> {
    #[serde(rename = "_results", default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(rename = "_pagination", default)]
    pub pagination: Pagination,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

impl<T> ListResponse<T> {
    /// Cursor for the next page, if the server reported one.
    #[must_use]
    pub fn next_page(&self) -> Option<&str> {
        self.pagination.next.as_deref().filter(|next| !next.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub assignee: Option<Teammate>,
    #[serde(default)]
    pub recipient: Option<Recipient>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub inboxes: Vec<Inbox>,
    #[serde(default)]
    pub created_at: f64,
    #[serde(default)]
    pub waiting_since: Option<f64>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub is_inbound: bool,
    #[serde(default)]
    pub created_at: f64,
    #[serde(default)]
    pub blurb: String,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub recipients: Vec<Recipient>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub id: String,
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default)]
    pub cc: Vec<String>,
    #[serde(default)]
    pub bcc: Vec<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub created_at: f64,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub highlight: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub parent_tag_id: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// Body for creating or updating a tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inbox {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub custom_fields: HashMap<String, serde_json::Value>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teammate {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// The authenticated identity returned by `/me`.
pub type Me = Teammate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_spammer: bool,
    #[serde(default)]
    pub handles: Vec<Handle>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub custom_fields: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub updated_at: Option<f64>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// Contact handle (email address, phone number, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handle {
    pub handle: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub send_as: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_valid: bool,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// Internal comment on a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub posted_at: f64,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// Body for posting a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentRequest {
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub id: Option<String>,
    pub filename: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    #[serde(default)]
    pub handle: String,
    /// `to`, `cc`, `bcc` or `from`
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
}

/// Partial update for a conversation (`PATCH /conversations/{id}`).
///
/// `assignee_id: Some(None)` serialises as `null` and unassigns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<Option<String>>,
}

/// Convert a Front Unix timestamp into a UTC datetime (`0` means unset).
#[must_use]
pub fn unix_to_datetime(ts: f64) -> Option<DateTime<Utc>> {
    if ts == 0.0 || !ts.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    DateTime::from_timestamp(ts.trunc() as i64, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_envelope_decodes_results_and_cursor() {
        let raw = r#"{
            "_results": [{"id": "tag_1", "name": "urgent"}],
            "_pagination": {"next": "https://api2.frontapp.com/tags?page_token=abc"}
        }"#;
        let page: ListResponse<Tag> = serde_json::from_str(raw).unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].name, "urgent");
        assert_eq!(page.next_page(), Some("https://api2.frontapp.com/tags?page_token=abc"));
    }

    #[test]
    fn empty_next_cursor_is_treated_as_last_page() {
        let raw = r#"{"_results": [], "_pagination": {"next": ""}}"#;
        let page: ListResponse<Tag> = serde_json::from_str(raw).unwrap();
        assert_eq!(page.next_page(), None);
    }

    #[test]
    fn unassign_serialises_null() {
        let update = ConversationUpdate { assignee_id: Some(None), ..Default::default() };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"assignee_id":null}"#);
    }

    #[test]
    fn unix_timestamps_convert() {
        assert!(unix_to_datetime(0.0).is_none());
        let dt = unix_to_datetime(1_700_000_000.5).unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
    }
}
