use crate::datastore::{postfilters::PostFilters, tables::posts};
use chrono::{offset::Utc, DateTime};
use uuid::Uuid;

/// One entry on the board. `id` and `posted` come from the store, the rest from the submitter.
#[derive(Queryable, Identifiable, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Post {
    pub id: Uuid,
    /// Display name the post is credited to. May be empty when a verified profile carries no name.
    pub author: String,
    /// Verified subject id, or empty for posts that were never authenticated.
    pub user_id: String,
    pub message: String,
    pub posted: DateTime<Utc>,
}

impl Post {
    /// Does this post match all specified filters?
    pub fn matches(&self, filters: &PostFilters) -> bool {
        if let Some(author) = &filters.author {
            if author != &self.author {
                return false;
            }
        }
        if let Some(message) = &filters.message {
            if message != &self.message {
                return false;
            }
        }
        true
    }
}

/// Parameters for the database statement which inserts new posts.
#[derive(Insertable, Debug, Clone, PartialEq, Eq)]
#[table_name = "posts"]
pub struct NewPost {
    pub author: String,
    pub user_id: String,
    pub message: String,
}

#[cfg(test)]
mod post_tests {
    use super::*;

    fn example_post() -> Post {
        Post {
            id: Uuid::new_v4(),
            author: "Edna".to_owned(),
            user_id: "subj-1234".to_owned(),
            message: "example text".to_owned(),
            posted: Utc::now(),
        }
    }

    #[test]
    fn test_post_matches_filters() {
        let post = example_post();

        assert!(post.matches(&PostFilters::default()));

        assert!(post.matches(&PostFilters {
            author: Some("Edna".to_owned()),
            ..Default::default()
        }));

        assert!(post.matches(&PostFilters {
            author: Some("Edna".to_owned()),
            message: Some("example text".to_owned()),
            ..Default::default()
        }));

        // Filters match whole values, not substrings.
        assert!(!post.matches(&PostFilters {
            message: Some("example".to_owned()),
            ..Default::default()
        }));

        assert!(!post.matches(&PostFilters {
            author: Some("Somebody Else".to_owned()),
            message: Some("example text".to_owned()),
            ..Default::default()
        }));
    }

    #[test]
    fn test_empty_strings_only_match_empty_fields() {
        let mut post = example_post();
        assert!(!post.matches(&PostFilters {
            author: Some(String::new()),
            ..Default::default()
        }));

        post.author = String::new();
        assert!(post.matches(&PostFilters {
            author: Some(String::new()),
            ..Default::default()
        }));
    }
}
