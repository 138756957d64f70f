// Comparison pipeline: two handles in, ranked shared traits out.
//
// For each account:
// 1. Fetch up to 200 recent original posts
// 2. Keep the ones tagged with the target language
// 3. Join their text, in feed order, into one blob
// 4. Submit the blob for personality analysis
// 5. Flatten the returned tree into a TraitMap
//
// Then compare the two TraitMaps and rank by smallest difference.
// Collaborator failures are wrapped as AffinityError::Collaborator and
// nothing is retried.

use futures::try_join;
use serde::Serialize;
use tracing::info;

use crate::bluesky::client::normalize_handle;
use crate::bluesky::posts::{Post, MAX_TIMELINE_POSTS};
use crate::error::{AffinityError, Result};
use crate::insights::traits::{PersonalityAnalyzer, TimelineSource};
use crate::personality::compare::{compare_with_policy, KeyPolicy};
use crate::personality::extract::flatten;
use crate::personality::rank::{rank, DEFAULT_TOP_N};
use crate::personality::{DifferenceMap, RankedList, TraitMap};

/// Knobs for a comparison run.
#[derive(Debug, Clone)]
pub struct CompareSettings {
    /// How many posts to request per account (capped at 200).
    pub max_posts: usize,
    /// Primary language subtag a post must carry to be analyzed.
    pub language: String,
    /// How to handle traits only one account has.
    pub key_policy: KeyPolicy,
}

impl Default for CompareSettings {
    fn default() -> Self {
        Self {
            max_posts: MAX_TIMELINE_POSTS,
            language: "en".to_string(),
            key_policy: KeyPolicy::Strict,
        }
    }
}

/// One account's analysis result.
#[derive(Debug, Clone, Serialize)]
pub struct AccountProfile {
    pub handle: String,
    /// Posts returned by the timeline, before language filtering.
    pub posts_fetched: usize,
    /// Posts whose text went into the analysis blob.
    pub posts_analyzed: usize,
    pub traits: TraitMap,
}

/// The outcome of comparing two accounts.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub first: AccountProfile,
    pub second: AccountProfile,
    pub differences: DifferenceMap,
    pub top_traits: RankedList,
}

/// Join the text of every post tagged with `language`, in the given order.
///
/// Posts are separated by a newline so words at the seams don't run
/// together. Posts with no text (image-only, say) are skipped. Returns the
/// blob and the number of posts it contains.
pub fn collect_text(posts: &[Post], language: &str) -> (String, usize) {
    let mut text = String::new();
    let mut count = 0;

    for post in posts
        .iter()
        .filter(|p| p.is_language(language) && !p.text.trim().is_empty())
    {
        if count > 0 {
            text.push('\n');
        }
        text.push_str(&post.text);
        count += 1;
    }

    (text, count)
}

/// Drives the timeline and analysis collaborators through the trait core.
pub struct AnalysisOrchestrator<'a> {
    timeline: &'a dyn TimelineSource,
    analyzer: &'a dyn PersonalityAnalyzer,
    settings: CompareSettings,
}

impl<'a> AnalysisOrchestrator<'a> {
    pub fn new(
        timeline: &'a dyn TimelineSource,
        analyzer: &'a dyn PersonalityAnalyzer,
        settings: CompareSettings,
    ) -> Self {
        Self {
            timeline,
            analyzer,
            settings,
        }
    }

    /// Fetch, analyze and flatten a single account.
    ///
    /// An account with no qualifying posts is still submitted, as an empty
    /// blob; what the service makes of that is up to the service.
    pub async fn analyze_account(&self, handle: &str) -> Result<AccountProfile> {
        let handle = normalize_handle(handle);

        let posts = self
            .timeline
            .fetch_recent_original_posts(handle, self.settings.max_posts, true)
            .await
            .map_err(AffinityError::collaborator)?;

        let (text, posts_analyzed) = collect_text(&posts, &self.settings.language);

        info!(
            handle = handle,
            fetched = posts.len(),
            analyzed = posts_analyzed,
            language = %self.settings.language,
            "Submitting posts for analysis"
        );

        let tree = self
            .analyzer
            .submit_for_analysis(&text)
            .await
            .map_err(AffinityError::collaborator)?;

        let traits = flatten(&tree)?;

        info!(handle = handle, traits = traits.len(), "Profile extracted");

        Ok(AccountProfile {
            handle: handle.to_string(),
            posts_fetched: posts.len(),
            posts_analyzed,
            traits,
        })
    }

    /// Analyze both accounts and rank the `top_n` traits they share most closely.
    ///
    /// The two analyses run concurrently; `first`/`second` in the result
    /// always follow argument order.
    pub async fn compare_accounts(
        &self,
        handle_a: &str,
        handle_b: &str,
        top_n: usize,
    ) -> Result<Comparison> {
        let (first, second) = try_join!(
            self.analyze_account(handle_a),
            self.analyze_account(handle_b)
        )?;

        compare_profiles(first, second, self.settings.key_policy, top_n)
    }

    /// [`compare_accounts`](Self::compare_accounts) with the default top five.
    pub async fn compare_accounts_default(
        &self,
        handle_a: &str,
        handle_b: &str,
    ) -> Result<Comparison> {
        self.compare_accounts(handle_a, handle_b, DEFAULT_TOP_N).await
    }
}

/// Compare two already-extracted profiles without touching the network.
pub fn compare_profiles(
    first: AccountProfile,
    second: AccountProfile,
    policy: KeyPolicy,
    top_n: usize,
) -> Result<Comparison> {
    let differences = compare_with_policy(&first.traits, &second.traits, policy)?;
    let top_traits = rank(&differences, top_n);
    Ok(Comparison {
        first,
        second,
        differences,
        top_traits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(text: &str, lang: &str) -> Post {
        Post {
            uri: String::new(),
            text: text.to_string(),
            langs: vec![lang.to_string()],
            created_at: None,
        }
    }

    #[test]
    fn test_collect_text_filters_and_keeps_order() {
        let posts = vec![
            post("third newest", "en"),
            post("nicht englisch", "de"),
            post("first", "en-US"),
        ];
        let (text, count) = collect_text(&posts, "en");
        assert_eq!(text, "third newest\nfirst");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_collect_text_empty() {
        let (text, count) = collect_text(&[post("hallo", "de")], "en");
        assert!(text.is_empty());
        assert_eq!(count, 0);
    }

    #[test]
    fn test_collect_text_multibyte() {
        let posts = vec![post("café ☕", "en"), post("日本語も", "en")];
        let (text, _) = collect_text(&posts, "en");
        assert_eq!(text, "café ☕\n日本語も");
        assert_eq!(text.chars().count(), 11);
    }

    #[test]
    fn test_collect_text_skips_textless_posts() {
        let posts = vec![
            post("before", "en"),
            post("", "en"),
            post(" \n ", "en"),
            post("after", "en"),
        ];
        let (text, count) = collect_text(&posts, "en");
        assert_eq!(text, "before\nafter");
        assert_eq!(count, 2);
    }
}
