use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single saved edit of an article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionItem {
    pub revision_id: u64,
    pub timestamp: DateTime<Utc>,
    /// User name, or the IP address for anonymous edits
    pub user: String,
    #[serde(default)]
    pub is_anon: bool,
    /// Change in article size, in bytes
    #[serde(default)]
    pub size_delta: i64,
    /// Edit summary as rendered HTML
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_comment: Option<String>,
}

impl RevisionItem {
    /// Calendar day (UTC) the revision belongs to
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Edit summary with markup removed
    pub fn comment_text(&self) -> Option<String> {
        self.parsed_comment.as_deref().map(strip_html)
    }
}

/// Opaque continuation token handed back by the fetch service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationCursor {
    token: Option<String>,
}

impl PaginationCursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// Cursor for the very first page
    pub fn start() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_start(&self) -> bool {
        self.token.is_none()
    }
}

/// One page of revisions as returned by the fetch service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevisionBatch {
    pub items: Vec<RevisionItem>,
    pub next_cursor: PaginationCursor,
    pub is_complete: bool,
}

fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    decode_entities(&out)
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
