// Colored terminal output for suggested posts, the AI feed and outfits.
//
// main.rs delegates here unless --json is given, in which case it prints
// the same body the HTTP API would return.

use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::db::models::CandidatePost;
use crate::pipeline::feed::FeedResponse;
use crate::scoring::outfit::{OutfitResponse, OutfitSuggestion};

use super::truncate_chars;

const CAPTION_WIDTH: usize = 48;

/// Display a ranked list of posts.
pub fn display_post_list(title: &str, posts: &[CandidatePost]) {
    if posts.is_empty() {
        println!("No posts to show. Import some with `thriftfeed import <file>`.");
        return;
    }

    println!("\n{}", format!("=== {title} ({} posts) ===", posts.len()).bold());
    println!();

    println!(
        "  {:>4}  {:<12} {:<50} {:<14} {}",
        "Rank".dimmed(),
        "Category".dimmed(),
        "Caption".dimmed(),
        "Seller".dimmed(),
        "Posted".dimmed(),
    );
    println!("  {}", "-".repeat(96).dimmed());

    for (i, post) in posts.iter().enumerate() {
        let category = post.category.as_deref().unwrap_or("-");
        let caption = if post.caption.is_empty() {
            "(no caption)".dimmed().to_string()
        } else {
            truncate_chars(&post.caption, CAPTION_WIDTH)
        };

        println!(
            "  {:>4}. {:<12} {:<50} {:<14} {}",
            i + 1,
            category.cyan(),
            caption,
            truncate_chars(&post.author, 12),
            format_date(post.created_at).dimmed(),
        );

        if !post.tags.is_empty() {
            let tags: Vec<String> = post.tags.iter().map(|t| format!("#{t}")).collect();
            println!("        {}", tags.join(" ").green());
        }
    }

    println!();
}

/// Display the AI feed with the tags that drove it.
pub fn display_feed(feed: &FeedResponse) {
    if feed.top_tags.is_empty() {
        println!(
            "{}",
            "No likes or posts yet, showing the most recent public posts.".dimmed()
        );
    } else {
        let tags: Vec<String> = feed.top_tags.iter().map(|t| format!("#{t}")).collect();
        println!("{} {}", "Your top tags:".bold(), tags.join(" ").green());
    }

    display_post_list("Recommended for you", &feed.suggested_posts);
}

/// Display outfit suggestions.
pub fn display_outfit(outfit: &OutfitResponse) {
    let heading = match &outfit.context {
        Some(context) => format!("=== Outfits for \"{context}\" ==="),
        None => "=== Outfit ideas ===".to_string(),
    };
    println!("\n{}", heading.bold());

    if outfit.suggestions.is_empty() {
        println!("\nNo thrift posts available to build an outfit from.");
        return;
    }

    for (i, suggestion) in outfit.suggestions.iter().enumerate() {
        display_suggestion(i + 1, suggestion);
    }
}

fn display_suggestion(number: usize, suggestion: &OutfitSuggestion) {
    println!("\n  {}", format!("Suggestion {number}").bold().underline());
    for item in &suggestion.items {
        println!(
            "    {:<12} {}  {}",
            item.item_type.yellow(),
            truncate_chars(&item.name, CAPTION_WIDTH),
            format!("[{}]", item.post_id).dimmed(),
        );
    }
    println!("    {}", suggestion.description.italic());
}

fn format_date(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}
