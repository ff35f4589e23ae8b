use serde::Serialize;

/// Number of body characters kept in a search hit preview.
pub const PREVIEW_CHARS: usize = 120;

#[derive(Debug, Clone)]
pub struct ContentItem {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub created_at: i64,
}

/// Listing row; the body is left out on purpose.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ContentSummary {
    pub id: i64,
    pub title: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SearchHit {
    pub id: i64,
    pub title: String,
    pub preview: String,
}

impl ContentItem {
    /// Literal substring match on title or body. `folded_query` is already lower-cased.
    pub fn matches(&self, folded_query: &str) -> bool {
        self.title.to_lowercase().contains(folded_query)
            || self.body.to_lowercase().contains(folded_query)
    }

    pub fn search_hit(&self) -> SearchHit {
        SearchHit {
            id: self.id,
            title: self.title.clone(),
            preview: truncate_chars(&self.body, PREVIEW_CHARS),
        }
    }
}

/// Cuts `text` to at most `max` characters without splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
