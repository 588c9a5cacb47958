#[cfg(test)]
pub mod mock;
pub mod postfilters;
pub mod postgres;
pub mod structs;
pub mod tables;

use crate::datastore::structs::{NewPost, Post};
use crate::twoface::Fallible;
use async_trait::async_trait;
use postfilters::PostFilters;
use uuid::Uuid;

#[async_trait]
/// The interface for storing post data.
pub trait PostStore: Clone + Send + Sync {
    /// Store a new post. The store assigns its `id` and `posted` timestamp.
    async fn new_post(&self, new_post: NewPost) -> Fallible<Post>;
    /// Posts matching the filters, newest first, at most `filters.limit` of them.
    async fn list_posts(&self, filters: PostFilters) -> Fallible<Vec<Post>>;
    /// Remove a post outright. Ok(None) means the row was already gone.
    async fn delete_post(&self, id: Uuid) -> Fallible<Option<Post>>;
}
