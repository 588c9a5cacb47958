use crate::datastore::{
    postfilters::PostFilters,
    postgres::{BlockingResp, DbPoolResult, PostgresStore},
    structs::{NewPost, Post},
    tables::posts,
    PostStore,
};
use crate::twoface::{Fallible, TfError};
use actix_web::web::block;
use async_trait::async_trait;
use diesel::{
    expression::BoxableExpression,
    pg::Pg,
    query_dsl::{QueryDsl, RunQueryDsl},
    sql_types::Bool,
    Connection, ExpressionMethods, OptionalExtension,
};
use uuid::Uuid;

#[async_trait]
impl PostStore for PostgresStore {
    async fn new_post(&self, new_post: NewPost) -> Fallible<Post> {
        let conn = self.pool.get()?;
        let post = block(move || {
            conn.transaction::<_, TfError, _>(|| {
                // Insert the new post; the table defaults fill in id and posted.
                let post: Post = diesel::insert_into(posts::table)
                    .values(&new_post)
                    .get_result(&conn)?;

                Ok(post)
            })
        })
        .await
        .to_resp()?;
        Ok(post)
    }

    async fn list_posts(&self, filters: PostFilters) -> Fallible<Vec<Post>> {
        let conn = self.pool.get()?;
        let query_result: DbPoolResult<_> = block(move || {
            // Get posts
            let mut query = posts::table.into_boxed();
            let limit = filters.limit;
            for filter in filters.as_sql_where() {
                query = query.filter(filter);
            }
            let posts = query
                .order_by(posts::posted.desc())
                .limit(limit as i64)
                .get_results(&conn)?;

            Ok(posts)
        })
        .await;
        Ok(query_result.to_resp()?)
    }

    async fn delete_post(&self, id: Uuid) -> Fallible<Option<Post>> {
        let conn = self.pool.get()?;
        let post = block(move || {
            conn.transaction::<_, anyhow::Error, _>(|| {
                // Delete the post
                let victim: Option<Post> = diesel::delete(posts::table.find(id))
                    .get_result::<Post>(&conn)
                    .optional()?;

                Ok(victim)
            })
        })
        .await
        .to_resp()?;
        Ok(post)
    }
}

impl PostFilters {
    pub fn as_sql_where(
        &self,
    ) -> Vec<Box<dyn BoxableExpression<posts::table, Pg, SqlType = Bool>>> {
        let mut wheres: Vec<Box<dyn BoxableExpression<posts::table, Pg, SqlType = Bool>>> =
            Vec::new();
        if let Some(author) = &self.author {
            wheres.push(Box::new(posts::author.eq(author.clone())))
        }
        if let Some(message) = &self.message {
            wheres.push(Box::new(posts::message.eq(message.clone())))
        }
        wheres
    }
}
