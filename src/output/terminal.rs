// Colored terminal output for trait profiles and comparisons.

use colored::Colorize;

use crate::personality::TraitMap;
use crate::pipeline::compare::{AccountProfile, Comparison};

/// Display one account's flattened trait profile.
pub fn display_profile(profile: &AccountProfile) {
    println!(
        "\n{}",
        format!("=== Personality profile for @{} ===", profile.handle).bold()
    );
    println!(
        "  {}",
        format!(
            "{} of {} posts analyzed",
            profile.posts_analyzed, profile.posts_fetched
        )
        .dimmed()
    );
    display_traits(&profile.traits);
}

/// Display a flat trait map, one trait per line, in map order.
pub fn display_traits(traits: &TraitMap) {
    if traits.is_empty() {
        println!("  No personality traits in the analysis result.");
        return;
    }

    let width = traits.keys().map(|k| k.chars().count()).max().unwrap_or(0);

    for (trait_id, score) in traits {
        println!("  {:<width$}  {:>5.1}%  {}", trait_id, score * 100.0, bar(*score));
    }
}

/// Display the ranked list of most similar traits.
pub fn display_comparison(comparison: &Comparison) {
    let first = &comparison.first;
    let second = &comparison.second;

    println!(
        "\n{}",
        format!(
            "=== Top {} shared traits: @{} vs @{} ===",
            comparison.top_traits.len(),
            first.handle,
            second.handle
        )
        .bold()
    );

    if comparison.top_traits.is_empty() {
        println!("  No traits in common to compare.");
        return;
    }

    println!(
        "  {:>4}  {:<28} {:>8}    {:>8}    {:>6}",
        "Rank".dimmed(),
        "Trait".dimmed(),
        format!("@{}", crate::output::truncate_chars(&first.handle, 7)).dimmed(),
        format!("@{}", crate::output::truncate_chars(&second.handle, 7)).dimmed(),
        "Diff".dimmed(),
    );
    println!("  {}", "-".repeat(66).dimmed());

    for (i, entry) in comparison.top_traits.iter().enumerate() {
        let score = |traits: &TraitMap| {
            traits
                .get(&entry.trait_id)
                .map(|s| format!("{s:.4}"))
                .unwrap_or_else(|| "-".to_string())
        };

        println!(
            "  {:>4}. {:<28} {:>8} -> {:>8} -> {}",
            i + 1,
            entry.trait_id,
            score(&first.traits),
            score(&second.traits),
            colorize_difference(entry.difference),
        );
    }
    println!();
}

/// Ten-cell bar for a score in [0, 1].
fn bar(score: f64) -> String {
    let filled = (score.clamp(0.0, 1.0) * 10.0).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(10 - filled))
        .dimmed()
        .to_string()
}

/// Closer scores read greener.
fn colorize_difference(difference: f64) -> colored::ColoredString {
    let text = format!("{difference:.4}");
    if difference < 0.05 {
        text.green().bold()
    } else if difference < 0.15 {
        text.green()
    } else if difference < 0.30 {
        text.yellow()
    } else {
        text.red()
    }
}
