//! The board itself: one page listing the most recent posts, a form that adds one, and a
//! delete endpoint that removes a post by its author/message pair. Every other path lands
//! back on the board.

use crate::api::{observe, State};
use crate::datastore::{
    postfilters::PostFilters,
    structs::{NewPost, Post},
    PostStore,
};
use crate::identity::{Resolver, SubmitForm};
use crate::render::{self, Page};
use crate::twoface::{Cause, ExternalError, Fallible};
use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::error;

pub const NOTICE_LIST_FAILED: &str = "Couldn't get latest posts. Refresh?";
pub const NOTICE_NO_MESSAGE: &str = "No message provided";
pub const NOTICE_WRITE_FAILED: &str = "Couldn't add new post. Try again?";
pub const NOTICE_DELETE_FAILED: &str = "Couldn't delete that post. Try again?";
pub const NOTICE_NO_MATCH: &str = "Couldn't find that post. Maybe it's already gone?";

pub fn configure<DS, R>(cfg: &mut web::ServiceConfig)
where
    DS: PostStore + 'static,
    R: Resolver + 'static,
{
    cfg.service(
        web::resource("/")
            .route(web::get().to(index::<DS, R>))
            .route(web::post().to(submit::<DS, R>)),
    )
    .service(web::resource("/delete").route(web::post().to(delete::<DS, R>)));
}

/// Everywhere that isn't a board route goes back to the board.
pub async fn other_paths() -> HttpResponse {
    HttpResponse::Found()
        .header(header::LOCATION, "/")
        .finish()
}

/// Fields of the per-post delete form. A missing field reads as empty, which only matches
/// posts whose own field is empty.
#[derive(Deserialize, Debug, Default)]
pub struct DeleteForm {
    pub name: Option<String>,
    pub message: Option<String>,
}

/// The current board listing, or the error page to serve instead of one.
async fn recent_posts<DS: PostStore, R: Resolver>(
    state: &web::Data<State<DS, R>>,
) -> Result<Vec<Post>, HttpResponse> {
    match state.ds.list_posts(PostFilters::default()).await {
        Ok(posts) => Ok(posts),
        Err(err) => {
            error!("Getting posts: {:#}", err.internal);
            Err(render::respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                &Page {
                    notice: NOTICE_LIST_FAILED.to_owned(),
                    ..Default::default()
                },
            ))
        }
    }
}

async fn index<DS: PostStore, R: Resolver>(
    state: web::Data<State<DS, R>>,
) -> Fallible<HttpResponse> {
    observe("get_index", || async {
        let response = match recent_posts(&state).await {
            Ok(posts) => render::respond(StatusCode::OK, &Page::with_posts(posts)),
            Err(error_page) => error_page,
        };
        Ok(response)
    })
    .await
}

/// Add a post. The response is the board page rendered around the current listing whatever
/// happens, so the listing is fetched before anything else.
async fn submit<DS: PostStore, R: Resolver>(
    state: web::Data<State<DS, R>>,
    form: web::Form<SubmitForm>,
) -> Fallible<HttpResponse> {
    observe("post_index", || async {
        let form = form.into_inner();
        let mut posts = match recent_posts(&state).await {
            Ok(posts) => posts,
            Err(error_page) => return Ok(error_page),
        };

        let author = match state.resolver.resolve(&form).await {
            Ok(author) => author,
            Err(err) => {
                error!("Resolving author: {:#}", err.internal);
                return Ok(render::respond(
                    err.external.cause.into(),
                    &Page {
                        notice: err.external.text.into_owned(),
                        // Preserve their message so they can try again.
                        message: form.message().to_owned(),
                        posts,
                        ..Default::default()
                    },
                ));
            }
        };

        let message = form.message();
        if message.is_empty() {
            return Ok(render::respond(
                Cause::UserInvalidField.into(),
                &Page {
                    notice: NOTICE_NO_MESSAGE.to_owned(),
                    name: author.name,
                    posts,
                    ..Default::default()
                },
            ));
        }

        let name = author.name.clone();
        let new_post = NewPost {
            author: author.name,
            user_id: author.user_id,
            message: message.to_owned(),
        };
        match state.ds.new_post(new_post).await {
            // Prepend the post that was just added.
            Ok(post) => posts.insert(0, post),
            Err(err) => {
                error!("Adding post: {:#}", err.internal);
                return Ok(render::respond(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &Page {
                        notice: NOTICE_WRITE_FAILED.to_owned(),
                        name,
                        // Preserve their message so they can try again.
                        message: message.to_owned(),
                        posts,
                    },
                ));
            }
        }

        Ok(render::respond(
            StatusCode::OK,
            &Page {
                notice: format!("Thank you for your submission, {}!", name),
                name,
                message: String::new(),
                posts,
            },
        ))
    })
    .await
}

/// Remove the first post matching the form's author/message pair, then bounce back to the
/// board. A pair nothing matches renders the board with a notice instead.
async fn delete<DS: PostStore, R: Resolver>(
    state: web::Data<State<DS, R>>,
    form: web::Form<DeleteForm>,
) -> Fallible<HttpResponse> {
    observe("post_delete", || async {
        let form = form.into_inner();
        let filters = PostFilters {
            author: Some(form.name.unwrap_or_default()),
            message: Some(form.message.unwrap_or_default()),
            limit: 1,
        };
        let matches = state.ds.list_posts(filters).await.map_err(|err| {
            err.with_external(ExternalError {
                cause: Cause::ServerError,
                text: NOTICE_DELETE_FAILED.into(),
            })
        })?;

        guard!(let Some(victim) = matches.into_iter().next() else {
            let posts = match recent_posts(&state).await {
                Ok(posts) => posts,
                Err(error_page) => return Ok(error_page),
            };
            return Ok(render::respond(
                StatusCode::NOT_FOUND,
                &Page {
                    notice: NOTICE_NO_MATCH.to_owned(),
                    posts,
                    ..Default::default()
                },
            ))
        });

        if let Err(err) = state.ds.delete_post(victim.id).await {
            // The listing after the redirect will show whether it stuck.
            error!("Deleting post {}: {:#}", victim.id, err.internal);
        }

        // Give an eventually-consistent store a moment to settle before the redirect
        // triggers the next listing.
        actix_rt::time::delay_for(state.settle).await;

        Ok(HttpResponse::SeeOther()
            .header(header::LOCATION, "/")
            .finish())
    })
    .await
}
