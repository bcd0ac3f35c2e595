//! Front resource identifiers
//!
//! Front IDs follow a `prefix_base36` convention (`cnv_abc123`,
//! `msg_9xk2`). IDs are embedded into request paths, so every caller-supplied
//! ID goes through [`sanitize_id`] first. [`validate_id_prefix`] turns a
//! mismatched-but-recognised prefix into a precise local error instead of a
//! confusing remote 404.

use serde::{Deserialize, Serialize};

use crate::errors::IdError;
use crate::impl_str_enum;

/// Resource kinds that carry a recognised ID prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Conversation,
    Message,
    Comment,
    Teammate,
    Tag,
    Inbox,
    Channel,
    Contact,
    Account,
    Rule,
    Link,
    Shift,
    Signature,
    Event,
    Draft,
    Topic,
}

impl_str_enum!(ResourceKind {
    Conversation => "conversation",
    Message => "message",
    Comment => "comment",
    Teammate => "teammate",
    Tag => "tag",
    Inbox => "inbox",
    Channel => "channel",
    Contact => "contact",
    Account => "account",
    Rule => "rule",
    Link => "link",
    Shift => "shift",
    Signature => "signature",
    Event => "event",
    Draft => "draft",
    Topic => "topic",
});

impl ResourceKind {
    /// ID prefix (including the trailing underscore) for this kind.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Conversation => "cnv_",
            Self::Message => "msg_",
            Self::Comment => "cmt_",
            Self::Teammate => "tea_",
            Self::Tag => "tag_",
            Self::Inbox => "inb_",
            Self::Channel => "chn_",
            Self::Contact => "ctc_",
            Self::Account => "acc_",
            Self::Rule => "rul_",
            Self::Link => "lnk_",
            Self::Shift => "shf_",
            Self::Signature => "sig_",
            Self::Event => "evt_",
            Self::Draft => "drf_",
            Self::Topic => "top_",
        }
    }

    /// Look up the kind owning `prefix` (e.g. `"cnv_"`).
    #[must_use]
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.prefix() == prefix)
    }
}

/// Validate that `id` is safe to embed in a URL path segment.
///
/// Surrounding whitespace is trimmed. Empty IDs, path separators, `..`
/// sequences, interior whitespace and control characters are rejected.
///
/// # Errors
/// Returns [`IdError::Invalid`] when the ID is unsafe.
pub fn sanitize_id(id: &str) -> Result<&str, IdError> {
    let trimmed = id.trim();
    let invalid = || IdError::Invalid { id: id.to_string() };

    if trimmed.is_empty() || trimmed.contains("..") {
        return Err(invalid());
    }

    let unsafe_char = trimmed
        .chars()
        .any(|c| c == '/' || c == '\\' || c <= ' ' || c == '\u{7f}' || c.is_control());
    if unsafe_char {
        return Err(invalid());
    }

    Ok(trimmed)
}

/// Return the prefix portion of an ID (`"cnv_"` for `"cnv_abc123"`).
///
/// The underscore must appear within the first five bytes; anything else is
/// treated as an unprefixed ID.
#[must_use]
pub fn extract_prefix(id: &str) -> Option<&str> {
    if id.len() < 4 {
        return None;
    }

    match id.find('_') {
        Some(idx) if idx <= 4 => Some(&id[..=idx]),
        _ => None,
    }
}

/// Resolve the resource kind of an ID from its prefix.
///
/// Unrecognised or missing prefixes resolve to `None`; that is not an error.
#[must_use]
pub fn resource_type(id: &str) -> Option<ResourceKind> {
    extract_prefix(id).and_then(ResourceKind::from_prefix)
}

/// Check that `id` does not carry a recognised prefix of another kind.
///
/// IDs without a prefix, or with a prefix Front does not document, pass
/// through so the API can make the final call.
///
/// # Errors
/// Returns [`IdError::WrongResourceType`] naming both kinds on mismatch.
pub fn validate_id_prefix(id: &str, expected: ResourceKind) -> Result<(), IdError> {
    match resource_type(id) {
        Some(actual) if actual != expected => Err(IdError::WrongResourceType {
            expected,
            actual,
            id: id.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Sanitize `id` and check its prefix against `expected` in one step.
///
/// # Errors
/// Returns [`IdError`] from either check.
pub fn validate_resource_id(id: &str, expected: ResourceKind) -> Result<&str, IdError> {
    let id = sanitize_id(id)?;
    validate_id_prefix(id, expected)?;
    Ok(id)
}
