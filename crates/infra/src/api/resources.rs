//! Typed Front resource operations
//!
//! Each operation validates caller-supplied IDs before building a path, so a
//! recognisably wrong ID (a `msg_` passed where a conversation is expected)
//! fails locally without a network call. Status errors from single-resource
//! calls carry the requested ID and kind.

use frontcli_domain::{
    sanitize_id, validate_resource_id, Channel, Comment, CommentRequest, Contact, Conversation,
    ConversationUpdate, Draft, Inbox, ListConversationsOptions, ListResponse, Me, Message,
    ResourceKind, Tag, TagRequest, Teammate,
};
use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::io::AsyncWrite;
use tracing::{debug, instrument};

use super::client::ApiClient;
use super::errors::ApiError;

fn with_limit(path: String, limit: Option<u32>) -> String {
    match limit.filter(|l| *l > 0) {
        Some(limit) => format!("{path}?limit={limit}"),
        None => path,
    }
}

impl ApiClient {
    /// Teammate owning the current token
    ///
    /// # Errors
    ///
    /// Returns error if the request fails
    pub async fn me(&self) -> Result<Me, ApiError> {
        self.get("/me").await
    }

    // Conversations

    /// List conversations matching `opts`
    ///
    /// # Errors
    ///
    /// Returns error if the request fails
    pub async fn list_conversations(
        &self,
        opts: &ListConversationsOptions,
    ) -> Result<ListResponse<Conversation>, ApiError> {
        let query = opts.query();
        let path = if query.is_empty() { "/conversations".to_string() } else { format!("/conversations?{query}") };
        self.get(&path).await
    }

    /// # Errors
    ///
    /// Returns error if the ID is invalid or the request fails
    pub async fn get_conversation(&self, id: &str) -> Result<Conversation, ApiError> {
        let id = validate_resource_id(id, ResourceKind::Conversation)?;
        self.get(&format!("/conversations/{id}"))
            .await
            .map_err(|e| e.with_resource(id, ResourceKind::Conversation))
    }

    /// Change status and/or assignee of a conversation
    ///
    /// # Errors
    ///
    /// Returns error if the ID is invalid or the request fails
    pub async fn update_conversation(&self, id: &str, update: &ConversationUpdate) -> Result<(), ApiError> {
        let id = validate_resource_id(id, ResourceKind::Conversation)?;
        self.patch(&format!("/conversations/{id}"), update)
            .await
            .map_err(|e| e.with_resource(id, ResourceKind::Conversation))
    }

    /// # Errors
    ///
    /// Returns error if the ID is invalid or the request fails
    pub async fn list_conversation_messages(
        &self,
        conversation_id: &str,
        limit: Option<u32>,
    ) -> Result<ListResponse<Message>, ApiError> {
        let id = validate_resource_id(conversation_id, ResourceKind::Conversation)?;
        self.get(&with_limit(format!("/conversations/{id}/messages"), limit))
            .await
            .map_err(|e| e.with_resource(id, ResourceKind::Conversation))
    }

    /// # Errors
    ///
    /// Returns error if the ID is invalid or the request fails
    pub async fn list_conversation_comments(
        &self,
        conversation_id: &str,
        limit: Option<u32>,
    ) -> Result<ListResponse<Comment>, ApiError> {
        let id = validate_resource_id(conversation_id, ResourceKind::Conversation)?;
        self.get(&with_limit(format!("/conversations/{id}/comments"), limit))
            .await
            .map_err(|e| e.with_resource(id, ResourceKind::Conversation))
    }

    /// Post an internal comment on a conversation
    ///
    /// # Errors
    ///
    /// Returns error if the ID is invalid or the request fails
    pub async fn add_comment(&self, conversation_id: &str, comment: &CommentRequest) -> Result<Comment, ApiError> {
        let id = validate_resource_id(conversation_id, ResourceKind::Conversation)?;
        self.post(&format!("/conversations/{id}/comments"), comment)
            .await
            .map_err(|e| e.with_resource(id, ResourceKind::Conversation))
    }

    // Messages

    /// # Errors
    ///
    /// Returns error if the ID is invalid or the request fails
    pub async fn get_message(&self, id: &str) -> Result<Message, ApiError> {
        let id = validate_resource_id(id, ResourceKind::Message)?;
        self.get(&format!("/messages/{id}")).await.map_err(|e| e.with_resource(id, ResourceKind::Message))
    }

    /// Fetch several messages with bounded concurrency, preserving input order.
    ///
    /// All IDs are validated before the first request. The first failure
    /// aborts the batch.
    ///
    /// # Errors
    ///
    /// Returns the first ID or request error encountered
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn fetch_messages<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<Message>, ApiError> {
        let ids = ids
            .iter()
            .map(|id| validate_resource_id(id.as_ref(), ResourceKind::Message))
            .collect::<Result<Vec<_>, _>>()?;
        let concurrency = self.config().bulk_concurrency.max(1);
        debug!(concurrency, "Fetching messages");

        stream::iter(ids).map(|id| self.get_message(id)).buffered(concurrency).try_collect().await
    }

    // Inboxes

    /// # Errors
    ///
    /// Returns error if the request fails
    pub async fn list_inboxes(&self) -> Result<ListResponse<Inbox>, ApiError> {
        self.get("/inboxes").await
    }

    /// # Errors
    ///
    /// Returns error if the ID is invalid or the request fails
    pub async fn get_inbox(&self, id: &str) -> Result<Inbox, ApiError> {
        let id = validate_resource_id(id, ResourceKind::Inbox)?;
        self.get(&format!("/inboxes/{id}")).await.map_err(|e| e.with_resource(id, ResourceKind::Inbox))
    }

    // Tags

    /// # Errors
    ///
    /// Returns error if the request fails
    pub async fn list_tags(&self) -> Result<ListResponse<Tag>, ApiError> {
        self.get("/tags").await
    }

    /// # Errors
    ///
    /// Returns error if the ID is invalid or the request fails
    pub async fn get_tag(&self, id: &str) -> Result<Tag, ApiError> {
        let id = validate_resource_id(id, ResourceKind::Tag)?;
        self.get(&format!("/tags/{id}")).await.map_err(|e| e.with_resource(id, ResourceKind::Tag))
    }

    /// # Errors
    ///
    /// Returns error if the request fails
    pub async fn create_tag(&self, tag: &TagRequest) -> Result<Tag, ApiError> {
        self.post("/tags", tag).await
    }

    /// Front answers tag updates with 204, so nothing is returned.
    ///
    /// # Errors
    ///
    /// Returns error if the ID is invalid or the request fails
    pub async fn update_tag(&self, id: &str, tag: &TagRequest) -> Result<(), ApiError> {
        let id = validate_resource_id(id, ResourceKind::Tag)?;
        self.patch(&format!("/tags/{id}"), tag).await.map_err(|e| e.with_resource(id, ResourceKind::Tag))
    }

    /// # Errors
    ///
    /// Returns error if the ID is invalid or the request fails
    pub async fn delete_tag(&self, id: &str) -> Result<(), ApiError> {
        let id = validate_resource_id(id, ResourceKind::Tag)?;
        self.delete(&format!("/tags/{id}")).await.map_err(|e| e.with_resource(id, ResourceKind::Tag))
    }

    // Teammates

    /// # Errors
    ///
    /// Returns error if the request fails
    pub async fn list_teammates(&self) -> Result<ListResponse<Teammate>, ApiError> {
        self.get("/teammates").await
    }

    /// # Errors
    ///
    /// Returns error if the ID is invalid or the request fails
    pub async fn get_teammate(&self, id: &str) -> Result<Teammate, ApiError> {
        let id = validate_resource_id(id, ResourceKind::Teammate)?;
        self.get(&format!("/teammates/{id}")).await.map_err(|e| e.with_resource(id, ResourceKind::Teammate))
    }

    // Channels

    /// # Errors
    ///
    /// Returns error if the request fails
    pub async fn list_channels(&self) -> Result<ListResponse<Channel>, ApiError> {
        self.get("/channels").await
    }

    /// # Errors
    ///
    /// Returns error if the ID is invalid or the request fails
    pub async fn get_channel(&self, id: &str) -> Result<Channel, ApiError> {
        let id = validate_resource_id(id, ResourceKind::Channel)?;
        self.get(&format!("/channels/{id}")).await.map_err(|e| e.with_resource(id, ResourceKind::Channel))
    }

    // Contacts

    /// # Errors
    ///
    /// Returns error if the request fails
    pub async fn list_contacts(&self, limit: Option<u32>) -> Result<ListResponse<Contact>, ApiError> {
        self.get(&with_limit("/contacts".to_string(), limit)).await
    }

    /// Follow a `_pagination.next` cursor from a previous contact listing.
    ///
    /// # Errors
    ///
    /// Returns error if the cursor is malformed or the request fails
    pub async fn list_contacts_page(&self, page_url: &str) -> Result<ListResponse<Contact>, ApiError> {
        self.get_page(page_url).await
    }

    /// # Errors
    ///
    /// Returns error if the ID is invalid or the request fails
    pub async fn get_contact(&self, id: &str) -> Result<Contact, ApiError> {
        let id = validate_resource_id(id, ResourceKind::Contact)?;
        self.get(&format!("/contacts/{id}")).await.map_err(|e| e.with_resource(id, ResourceKind::Contact))
    }

    /// # Errors
    ///
    /// Returns error if the ID is invalid or the request fails
    pub async fn delete_contact(&self, id: &str) -> Result<(), ApiError> {
        let id = validate_resource_id(id, ResourceKind::Contact)?;
        self.delete(&format!("/contacts/{id}")).await.map_err(|e| e.with_resource(id, ResourceKind::Contact))
    }

    // Drafts

    /// # Errors
    ///
    /// Returns error if the ID is invalid or the request fails
    pub async fn get_draft(&self, id: &str) -> Result<Draft, ApiError> {
        let id = validate_resource_id(id, ResourceKind::Draft)?;
        self.get(&format!("/drafts/{id}")).await.map_err(|e| e.with_resource(id, ResourceKind::Draft))
    }

    /// # Errors
    ///
    /// Returns error if the ID is invalid or the request fails
    pub async fn delete_draft(&self, id: &str) -> Result<(), ApiError> {
        let id = validate_resource_id(id, ResourceKind::Draft)?;
        self.delete(&format!("/drafts/{id}")).await.map_err(|e| e.with_resource(id, ResourceKind::Draft))
    }

    // Attachments

    /// Stream an attachment into `writer`; returns the number of bytes written.
    ///
    /// Attachment IDs have no documented prefix, so only path safety is checked.
    ///
    /// # Errors
    ///
    /// Returns error if the ID is invalid, the request fails or writing fails
    pub async fn download_attachment<W>(&self, id: &str, writer: &mut W) -> Result<u64, ApiError>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let id = sanitize_id(id)?;
        self.download(&format!("/download/{id}"), writer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_limit() {
        assert_eq!(with_limit("/contacts".into(), None), "/contacts");
        assert_eq!(with_limit("/contacts".into(), Some(0)), "/contacts");
        assert_eq!(with_limit("/contacts".into(), Some(25)), "/contacts?limit=25");
    }
}
