//! HTML rendering for single-post pages.
//!
//! Rendering uses maud, so every dynamic value is escaped.

use maud::{DOCTYPE, Markup, html};

use crate::models::Post;

const SITE_NAME: &str = "blogboard";

/// Render a complete page for one post, with Open Graph tags.
pub fn post_page(post: &Post) -> Markup {
    let title = if post.title.is_empty() {
        SITE_NAME
    } else {
        post.title.as_str()
    };

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " - " (SITE_NAME) }
                meta property="og:title" content=(title);
                meta property="og:url" content=(post.internal_url());
                @if !post.image.is_empty() {
                    meta property="og:image" content=(post.image);
                }
            }
            body {
                main class="post" data-post-id=(post.id) {
                    h1 { (title) }
                    @if !post.image.is_empty() {
                        img src=(post.image) alt=(title);
                    }
                    p class="likes" { (post.likes) " likes" }
                    @if !post.url.is_empty() {
                        a href=(post.url) { "Original post" }
                    }
                    p { a href="/" { "Back to " (SITE_NAME) } }
                }
            }
        }
    }
}
