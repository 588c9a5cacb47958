//! Renders the board page: a `Page` of parameters in, HTML out. The one template is compiled
//! in, and its placeholders are substituted with user-controlled text escaped first.

use crate::datastore::structs::Post;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

/// Everything the board page can show: an advisory notice, the submitter's name and message
/// for re-display after a failed submit, and the post list.
#[derive(Debug, Default, Clone)]
pub struct Page {
    pub notice: String,
    pub name: String,
    pub message: String,
    pub posts: Vec<Post>,
}

impl Page {
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Page {
            posts,
            ..Default::default()
        }
    }
}

/// An HTML response with the given status.
pub fn respond(status: StatusCode, page: &Page) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(html(page))
}

/// Fill the page template.
pub fn html(page: &Page) -> String {
    let notice = if page.notice.is_empty() {
        String::new()
    } else {
        format!("<p class=\"notice\">{}</p>", escape(&page.notice))
    };

    let mut posts = String::new();
    for post in &page.posts {
        posts += &post_html(post);
    }

    substitute(
        INDEX_TEMPLATE,
        &[
            ("{notice}", &notice),
            ("{name}", &escape(&page.name)),
            ("{message}", &escape(&page.message)),
            ("{posts}", &posts),
        ],
    )
}

/// One pass over the template, swapping each token for its value. Inserted values are never
/// rescanned, so user text that happens to spell a token stays literal.
fn substitute(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    'scan: while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        rest = &rest[open..];
        for (token, value) in values {
            if rest.starts_with(token) {
                out.push_str(value);
                rest = &rest[token.len()..];
                continue 'scan;
            }
        }
        // A brace that doesn't open a token, like the ones in the style block.
        out.push('{');
        rest = &rest[1..];
    }
    out.push_str(rest);
    out
}

/// One post row. Carries the store's id so readers can tell identical posts apart, and a form
/// that feeds the author/message pair back to /delete.
fn post_html(post: &Post) -> String {
    let author = escape(&post.author);
    let message = escape(&post.message);
    let subject = if post.user_id.is_empty() {
        String::new()
    } else {
        format!(" <span class=\"subject\">({})</span>", escape(&post.user_id))
    };
    format!(
        r#"<article class="post" data-post-id="{id}">
<header><strong>{author}</strong>{subject} <time datetime="{stamp}">{when}</time></header>
<p>{message}</p>
<form method="POST" action="/delete"><input type="hidden" name="name" value="{author}"><input type="hidden" name="message" value="{message}"><button>Delete</button></form>
</article>
"#,
        id = post.id,
        author = author,
        subject = subject,
        stamp = post.posted.to_rfc3339(),
        when = post.posted.format("%Y-%m-%d %H:%M"),
    )
}

/// Minimal HTML escaping, enough for both text and attribute positions.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::offset::Utc;
    use uuid::Uuid;

    fn post(author: &str, message: &str) -> Post {
        Post {
            id: Uuid::new_v4(),
            author: author.to_owned(),
            user_id: String::new(),
            message: message.to_owned(),
            posted: Utc::now(),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(
            escape(r#"<script>alert("hi")</script>"#),
            "&lt;script&gt;alert(&quot;hi&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape("it's fine"), "it&#39;s fine");
        assert_eq!(escape("plain text"), "plain text");
    }

    #[test]
    fn test_every_placeholder_is_filled() {
        let body = html(&Page::default());
        for marker in vec!["{notice}", "{name}", "{message}", "{posts}"] {
            assert!(!body.contains(marker), "{} survived rendering", marker);
        }
    }

    #[test]
    fn test_posts_appear_in_given_order() {
        let page = Page::with_posts(vec![post("a", "first message"), post("b", "second message")]);
        let body = html(&page);
        let first = body.find("first message").expect("first post is missing");
        let second = body.find("second message").expect("second post is missing");
        assert!(first < second);
    }

    #[test]
    fn test_notice_block_only_renders_when_set() {
        assert!(!html(&Page::default()).contains("class=\"notice\""));

        let page = Page {
            notice: "Thank you for your submission, Edna!".to_owned(),
            ..Default::default()
        };
        let body = html(&page);
        assert!(body.contains("class=\"notice\""));
        assert!(body.contains("Thank you for your submission, Edna!"));
    }

    #[test]
    fn test_user_content_is_escaped() {
        let page = Page {
            name: "<b>bold</b>".to_owned(),
            message: "tag <script>alert(1)</script>".to_owned(),
            posts: vec![post("<i>sneaky</i>", "\"quoted\" & 'single'")],
            ..Default::default()
        };
        let body = html(&page);
        assert!(!body.contains("<script>"));
        assert!(!body.contains("<b>"));
        assert!(!body.contains("<i>"));
        assert!(body.contains("&lt;script&gt;"));
        assert!(body.contains("&quot;quoted&quot; &amp; &#39;single&#39;"));
    }

    #[test]
    fn test_user_text_spelling_a_placeholder_stays_literal() {
        let page = Page {
            notice: "Thank you for your submission, {posts}!".to_owned(),
            name: "{posts}".to_owned(),
            message: "{name} and {message}".to_owned(),
            posts: vec![post("a", "hello")],
        };
        let body = html(&page);
        assert!(body.contains("Thank you for your submission, {posts}!"));
        assert!(body.contains("value=\"{posts}\""));
        assert!(body.contains(">{name} and {message}</textarea>"));
        // Only the row from the actual post list renders.
        assert_eq!(body.matches("<article").count(), 1);
        // The style block's own braces come through untouched.
        assert!(body.contains("article.post {"));
    }

    #[test]
    fn test_failed_submission_is_preserved_in_the_form() {
        let page = Page {
            message: "try me again".to_owned(),
            name: "Edna".to_owned(),
            ..Default::default()
        };
        let body = html(&page);
        assert!(body.contains(">try me again</textarea>"));
        assert!(body.contains("value=\"Edna\""));
    }

    #[test]
    fn test_rows_carry_the_post_id() {
        let post = post("a", "hello");
        let id = post.id;
        let body = html(&Page::with_posts(vec![post]));
        assert!(body.contains(&format!("data-post-id=\"{}\"", id)));
    }

    #[test]
    fn test_subject_shown_only_for_verified_posts() {
        let mut verified = post("Edna", "hello");
        verified.user_id = "subj-1234".to_owned();
        let body = html(&Page::with_posts(vec![verified]));
        assert!(body.contains("(subj-1234)"));

        let body = html(&Page::with_posts(vec![post("Edna", "hello")]));
        assert!(!body.contains("class=\"subject\""));
    }

    #[test]
    fn test_delete_form_round_trips_the_pair() {
        let body = html(&Page::with_posts(vec![post("Edna", "to be removed")]));
        assert!(body.contains("action=\"/delete\""));
        assert!(body.contains("name=\"name\" value=\"Edna\""));
        assert!(body.contains("name=\"message\" value=\"to be removed\""));
    }
}
