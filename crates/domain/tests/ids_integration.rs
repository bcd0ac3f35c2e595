//! Integration tests for resource IDs and list payloads
//!
//! Exercises the public API the infra layer relies on: prefix validation
//! before path construction and decoding realistic list responses.

use frontcli_domain::{
    resource_type, validate_resource_id, Conversation, IdError, ListConversationsOptions,
    ListResponse, Message, ResourceKind,
};

// ============================================================================
// ID validation
// ============================================================================

/// Scenario: user pastes a message ID into a conversation command
#[test]
fn test_message_id_rejected_for_conversation_lookup() {
    let err = validate_resource_id("msg_abc123", ResourceKind::Conversation).unwrap_err();

    match &err {
        IdError::WrongResourceType { expected, actual, id } => {
            assert_eq!(*expected, ResourceKind::Conversation);
            assert_eq!(*actual, ResourceKind::Message);
            assert_eq!(id, "msg_abc123");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_unknown_prefix_passes_through_to_api() {
    assert_eq!(validate_resource_id(" alt_42 ", ResourceKind::Tag).unwrap(), "alt_42");
    assert_eq!(resource_type("alt_42"), None);
}

#[test]
fn test_traversal_rejected_before_prefix_check() {
    let err = validate_resource_id("cnv_../../me", ResourceKind::Conversation).unwrap_err();
    assert!(matches!(err, IdError::Invalid { .. }));
}

#[test]
fn test_every_kind_accepts_its_own_prefix() {
    for kind in ResourceKind::ALL {
        let id = format!("{}abc", kind.prefix());
        assert_eq!(validate_resource_id(&id, *kind).unwrap(), id);
        assert_eq!(resource_type(&id), Some(*kind));
        assert_eq!(kind.to_string().parse::<ResourceKind>(), Ok(*kind));
    }
}

// ============================================================================
// Payload decoding
// ============================================================================

#[test]
fn test_conversation_page_decodes() {
    let raw = r#"{
        "_pagination": {"next": "https://api2.frontapp.com/conversations?page_token=p2"},
        "_links": {"self": "https://api2.frontapp.com/conversations"},
        "_results": [{
            "id": "cnv_1",
            "subject": "Invoice",
            "status": "assigned",
            "assignee": {"id": "tea_1", "email": "a@example.com"},
            "tags": [{"id": "tag_1", "name": "billing"}],
            "created_at": 1700000000.25,
            "_links": {"self": "https://api2.frontapp.com/conversations/cnv_1",
                       "related": {"messages": "https://api2.frontapp.com/conversations/cnv_1/messages"}}
        }]
    }"#;

    let page: ListResponse<Conversation> = serde_json::from_str(raw).unwrap();
    assert_eq!(page.results.len(), 1);
    let convo = &page.results[0];
    assert_eq!(convo.assignee.as_ref().map(|t| t.id.as_str()), Some("tea_1"));
    assert_eq!(convo.tags[0].name, "billing");
    assert!(convo.links.related.contains_key("messages"));
    assert_eq!(page.links.self_link, "https://api2.frontapp.com/conversations");
    assert_eq!(page.next_page(), Some("https://api2.frontapp.com/conversations?page_token=p2"));
}

#[test]
fn test_message_type_field_maps_to_kind() {
    let msg: Message = serde_json::from_str(
        r#"{"id": "msg_1", "type": "email", "is_inbound": true, "body": "<p>hi</p>"}"#,
    )
    .unwrap();
    assert_eq!(msg.kind, "email");
    assert!(msg.is_inbound);
    assert!(msg.attachments.is_empty());
}

#[test]
fn test_page_token_round_trips_into_next_query() {
    let opts = ListConversationsOptions { page_token: Some("p2".into()), ..Default::default() };
    assert_eq!(opts.query(), "page_token=p2");
}
