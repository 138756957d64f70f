// Collaborator traits: the two external services the comparison depends on.
//
// The pipeline only ever sees these traits. BlueskyTimeline and
// PersonalityInsightsClient are the production implementations; tests plug
// in fakes.

use anyhow::Result;
use async_trait::async_trait;

use crate::bluesky::posts::Post;
use crate::personality::extract::RawAnalysisTree;

/// Source of an account's recent posts.
#[async_trait]
pub trait TimelineSource: Send + Sync {
    /// Fetch up to `max_count` of the account's most recent posts, in the
    /// order the service returns them. With `exclude_reshares`, reposts of
    /// other accounts' content are left out.
    async fn fetch_recent_original_posts(
        &self,
        handle: &str,
        max_count: usize,
        exclude_reshares: bool,
    ) -> Result<Vec<Post>>;
}

/// A personality inference service.
#[async_trait]
pub trait PersonalityAnalyzer: Send + Sync {
    /// Submit a text blob and return the service's raw category tree.
    async fn submit_for_analysis(&self, text: &str) -> Result<RawAnalysisTree>;
}
