use crate::datastore::{
    postfilters::PostFilters,
    structs::{NewPost, Post},
    PostStore,
};
use crate::twoface::{Describe, Fallible, TfError};
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::offset::Utc;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

type Store<T> = Arc<Mutex<Vec<T>>>;

/// A mock implementation of datastore::PostStore
#[derive(Clone, Default, Debug)]
pub struct Client {
    posts: Store<Post>,
    broken: Arc<Mutex<Broken>>,
}

/// Which operations should fail, for exercising dependency-failure paths.
#[derive(Default, Debug)]
struct Broken {
    lists: bool,
    writes: bool,
    deletes: bool,
}

impl Client {
    pub fn set_posts(&mut self, posts: Vec<Post>) {
        self.posts = Arc::new(Mutex::new(posts));
    }

    /// Everything currently stored, in insertion order.
    pub fn all_posts(&self) -> Vec<Post> {
        self.posts.lock().unwrap().clone()
    }

    pub fn break_lists(&self) {
        self.broken.lock().unwrap().lists = true;
    }

    pub fn break_writes(&self) {
        self.broken.lock().unwrap().writes = true;
    }

    pub fn break_deletes(&self) {
        self.broken.lock().unwrap().deletes = true;
    }

    fn refuse(op: &'static str) -> TfError {
        anyhow!("mock datastore was told to refuse {}", op).describe(Default::default())
    }
}

#[async_trait]
impl PostStore for Client {
    async fn new_post(&self, new_post: NewPost) -> Fallible<Post> {
        if self.broken.lock().unwrap().writes {
            return Err(Self::refuse("writes"));
        }

        // Insert the new post
        let post = Post {
            id: Uuid::new_v4(),
            posted: Utc::now(),
            author: new_post.author,
            user_id: new_post.user_id,
            message: new_post.message,
        };
        self.posts.lock().unwrap().push(post.clone());

        Ok(post)
    }

    async fn list_posts(&self, filters: PostFilters) -> Fallible<Vec<Post>> {
        if self.broken.lock().unwrap().lists {
            return Err(Self::refuse("lists"));
        }

        let all_posts = self.posts.lock().unwrap();
        let mut results: Vec<Post> = all_posts
            .iter()
            .filter(|p| p.matches(&filters))
            .cloned()
            .collect();
        results.sort_by(|a, b| b.posted.cmp(&a.posted));
        results.truncate(filters.limit as usize);
        Ok(results)
    }

    async fn delete_post(&self, id: Uuid) -> Fallible<Option<Post>> {
        if self.broken.lock().unwrap().deletes {
            return Err(Self::refuse("deletes"));
        }

        let mut posts = self.posts.lock().unwrap();
        guard!(let Some(at) = posts.iter().position(|p| p.id == id) else {
            return Ok(None)
        });
        Ok(Some(posts.remove(at)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn post(author: &str, message: &str, minutes_ago: i64) -> Post {
        Post {
            id: Uuid::new_v4(),
            author: author.to_owned(),
            user_id: String::new(),
            message: message.to_owned(),
            posted: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[actix_rt::test]
    async fn test_lists_newest_first_up_to_limit() {
        let mut ds = Client::default();
        ds.set_posts(vec![
            post("a", "oldest", 30),
            post("b", "newest", 1),
            post("c", "middle", 10),
        ]);

        let listed = ds
            .list_posts(PostFilters {
                limit: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        let messages: Vec<&str> = listed.iter().map(|p| p.message.as_str()).collect();
        assert_eq!(messages, vec!["newest", "middle"]);
    }

    #[actix_rt::test]
    async fn test_delete_removes_exactly_one_row() {
        let mut ds = Client::default();
        let victim = post("a", "hello", 5);
        ds.set_posts(vec![victim.clone(), post("b", "hello", 2)]);

        let deleted = ds.delete_post(victim.id).await.unwrap();
        assert_eq!(deleted.map(|p| p.id), Some(victim.id));
        assert_eq!(ds.all_posts().len(), 1);

        // A second delete of the same id finds nothing.
        let deleted = ds.delete_post(victim.id).await.unwrap();
        assert!(deleted.is_none());
    }

    #[actix_rt::test]
    async fn test_broken_ops_refuse() {
        let ds = Client::default();
        ds.break_lists();
        assert!(ds.list_posts(PostFilters::default()).await.is_err());
    }
}
