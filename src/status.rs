// System status display — database size and record counts.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;

use crate::db::Database;

/// Display system status to the terminal.
pub async fn show(db: &Arc<dyn Database>, db_path: &str) -> Result<()> {
    if !Path::new(db_path).exists() {
        println!("Database: not initialized");
        println!("\nRun `thriftfeed init` to set up the database.");
        return Ok(());
    }

    let file_size = std::fs::metadata(db_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", db_path, file_size);

    let counts = db.counts().await?;
    println!(
        "Posts: {} total, {} public, {} thrift",
        counts.posts, counts.public_posts, counts.thrift_posts
    );
    println!("Likes: {}", counts.likes);
    println!("Wardrobe items: {}", counts.wardrobe_items);

    if counts.posts == 0 {
        println!(
            "\n{}",
            "No posts yet. Run `thriftfeed import <file.json>` to load some.".dimmed()
        );
    } else if counts.thrift_posts == 0 {
        println!(
            "\n{}",
            "No thrift posts, so outfit suggestions will come back empty.".yellow()
        );
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
