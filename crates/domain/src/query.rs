//! Query-string builders for list endpoints

use std::collections::BTreeMap;

use url::form_urlencoded;

/// Filters and paging for `GET /conversations`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListConversationsOptions {
    pub inbox_id: Option<String>,
    pub tag_id: Option<String>,
    /// `assigned`, `unassigned`, `archived`, `trashed`, `snoozed`
    pub statuses: Vec<String>,
    pub limit: Option<u32>,
    pub page_token: Option<String>,
    /// `asc` or `desc`; `-` disables explicit sorting.
    pub sort_order: Option<String>,
}

impl ListConversationsOptions {
    /// Encode the options as a URL query string (without the leading `?`).
    ///
    /// Keys are emitted in sorted order so the output is stable.
    #[must_use]
    pub fn query(&self) -> String {
        let mut params: BTreeMap<&str, Vec<String>> = BTreeMap::new();

        if let Some(inbox) = self.inbox_id.as_deref().filter(|s| !s.is_empty()) {
            params.insert("q[inbox_id]", vec![inbox.to_string()]);
        }
        if let Some(tag) = self.tag_id.as_deref().filter(|s| !s.is_empty()) {
            params.insert("q[tag_id]", vec![tag.to_string()]);
        }
        if !self.statuses.is_empty() {
            params.insert("q[statuses][]", self.statuses.clone());
        }
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            params.insert("limit", vec![limit.to_string()]);
        }
        if let Some(token) = self.page_token.as_deref().filter(|s| !s.is_empty()) {
            params.insert("page_token", vec![token.to_string()]);
        }
        if let Some(order) = self.sort_order.as_deref().filter(|s| !s.is_empty() && *s != "-") {
            params.insert("sort_by", vec!["date".to_string()]);
            params.insert("sort_order", vec![order.to_string()]);
        }

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, values) in &params {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }
}

/// Expand a user-facing status into API statuses.
///
/// `open` covers both assigned and unassigned conversations; an empty
/// string means no status filter.
#[must_use]
pub fn parse_status(status: &str) -> Vec<String> {
    match status {
        "" => Vec::new(),
        "open" => vec!["assigned".to_string(), "unassigned".to_string()],
        other => vec![other.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_expands_to_assigned_and_unassigned() {
        assert_eq!(parse_status("open"), vec!["assigned", "unassigned"]);
        assert_eq!(parse_status("archived"), vec!["archived"]);
        assert!(parse_status("").is_empty());
    }

    #[test]
    fn empty_options_encode_to_empty_query() {
        assert_eq!(ListConversationsOptions::default().query(), "");
    }

    #[test]
    fn query_encodes_filters_and_sorting() {
        let opts = ListConversationsOptions {
            inbox_id: Some("inb_1".into()),
            statuses: parse_status("open"),
            limit: Some(25),
            sort_order: Some("asc".into()),
            ..Default::default()
        };
        let query = opts.query();
        let pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("limit".into(), "25".into()),
                ("q[inbox_id]".into(), "inb_1".into()),
                ("q[statuses][]".into(), "assigned".into()),
                ("q[statuses][]".into(), "unassigned".into()),
                ("sort_by".into(), "date".into()),
                ("sort_order".into(), "asc".into()),
            ]
        );
    }

    #[test]
    fn dash_sort_order_disables_sorting() {
        let opts = ListConversationsOptions { sort_order: Some("-".into()), ..Default::default() };
        assert!(!opts.query().contains("sort_by"));
    }
}
