//! Ways to filter posts based on their fields. Filter semantics work just like SQL:
//! If a field is unset, its filter won't be applied.
//! If set, filter out posts that don't match the filter.

/// Filters that can be applied to queries on the datastore.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PostFilters {
    /// Whole-value match on the post's author.
    pub author: Option<String>,
    /// Whole-value match on the post's message.
    pub message: Option<String>,
    /// Maximum number of posts to let match the filter
    pub limit: u8,
}

/// No filters, capped at one board page of posts.
impl Default for PostFilters {
    fn default() -> Self {
        Self {
            author: None,
            message: None,
            limit: default_limit(),
        }
    }
}

fn default_limit() -> u8 {
    20
}
