// Post fetching: paginated author feed retrieval via public API.
//
// Collects an account's most recent posts for personality analysis. Feed
// order (newest first) is kept as-is; nothing downstream re-sorts it.

use anyhow::{Context, Result};
use async_trait::async_trait;
use atrium_api::app::bsky::feed::defs::FeedViewPost;
use atrium_api::app::bsky::feed::{get_author_feed, post};
use atrium_api::types::TryFromUnknown;
use tracing::{debug, info};

use super::client::{normalize_handle, PublicAtpClient};
use crate::insights::traits::TimelineSource;

/// Most posts a single timeline fetch will return.
pub const MAX_TIMELINE_POSTS: usize = 200;

/// A simplified post: just the fields analysis needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub uri: String,
    pub text: String,
    /// BCP-47 language tags the author attached to the post.
    pub langs: Vec<String>,
    pub created_at: Option<String>,
}

impl Post {
    /// The post's primary language tag, if it has one.
    pub fn language_code(&self) -> Option<&str> {
        self.langs.first().map(String::as_str)
    }

    /// Whether any of the post's tags has `language` as its primary subtag.
    ///
    /// `is_language("en")` matches "en", "en-US" and "EN-gb", but not "eng".
    pub fn is_language(&self, language: &str) -> bool {
        self.langs.iter().any(|tag| {
            let primary = tag.split('-').next().unwrap_or(tag);
            primary.eq_ignore_ascii_case(language)
        })
    }
}

/// Append a page's usable posts to `posts`, stopping once it holds `max_posts`.
///
/// Items with a `reason` are reposts (pins aren't requested) and are dropped
/// when `exclude_reshares` is set. Records that don't decode as
/// `app.bsky.feed.post` are skipped.
fn collect_page(
    feed: &[FeedViewPost],
    exclude_reshares: bool,
    max_posts: usize,
    posts: &mut Vec<Post>,
) {
    for feed_item in feed {
        if posts.len() >= max_posts {
            break;
        }

        if exclude_reshares && feed_item.reason.is_some() {
            continue;
        }

        let post_view = &feed_item.post;

        let Ok(record) = post::Record::try_from_unknown(post_view.record.clone()) else {
            debug!(uri = %post_view.uri, "Skipping post with undecodable record");
            continue;
        };

        posts.push(Post {
            uri: post_view.uri.clone(),
            text: record.data.text.clone(),
            langs: record
                .data
                .langs
                .iter()
                .flatten()
                .map(|lang| lang.as_ref().to_string())
                .collect(),
            created_at: Some(record.data.created_at.as_ref().to_string()),
        });
    }
}

/// The cursor for the next page, or `None` once the feed is exhausted.
fn next_cursor(output: &get_author_feed::Output) -> Option<String> {
    if output.feed.is_empty() {
        return None;
    }
    output.cursor.clone()
}

/// Fetch recent posts for a given account, handling pagination automatically.
///
/// `max_posts` is capped at [`MAX_TIMELINE_POSTS`]; the API returns up to 100
/// per page. With `exclude_reshares`, reposts of other accounts' posts are
/// dropped.
pub async fn fetch_recent_posts(
    client: &PublicAtpClient,
    handle: &str,
    max_posts: usize,
    exclude_reshares: bool,
) -> Result<Vec<Post>> {
    let handle = normalize_handle(handle);
    let max_posts = max_posts.min(MAX_TIMELINE_POSTS);
    let mut posts = Vec::new();
    let mut cursor: Option<String> = None;

    if max_posts == 0 {
        return Ok(posts);
    }

    let page_size = max_posts.min(100).to_string();

    loop {
        let mut params: Vec<(&str, &str)> = vec![
            ("actor", handle),
            ("filter", "posts_with_replies"),
            ("limit", &page_size),
        ];
        if let Some(ref c) = cursor {
            params.push(("cursor", c));
        }

        let output: get_author_feed::Output = client
            .xrpc_get("app.bsky.feed.getAuthorFeed", &params)
            .await
            .with_context(|| format!("Failed to fetch feed for @{}", handle))?;

        collect_page(&output.feed, exclude_reshares, max_posts, &mut posts);

        debug!(
            page_posts = output.feed.len(),
            total_collected = posts.len(),
            "Fetched page of posts for @{}",
            handle
        );

        if posts.len() >= max_posts {
            break;
        }

        cursor = next_cursor(&output);
        if cursor.is_none() {
            break;
        }
    }

    info!(
        count = posts.len(),
        handle = handle,
        "Collected posts for analysis"
    );

    Ok(posts)
}

/// Bluesky-backed [`TimelineSource`].
pub struct BlueskyTimeline {
    client: PublicAtpClient,
}

impl BlueskyTimeline {
    pub fn new(client: PublicAtpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TimelineSource for BlueskyTimeline {
    async fn fetch_recent_original_posts(
        &self,
        handle: &str,
        max_count: usize,
        exclude_reshares: bool,
    ) -> Result<Vec<Post>> {
        fetch_recent_posts(&self.client, handle, max_count, exclude_reshares).await
    }
}
