//! CLI `page` command — print one timeline page.

use anyhow::Result;
use keepsake::config::KeepsakeConfig;
use keepsake::service::TimelineService;

use super::preview;

/// The page after `page`, which is also `page`'s one-based number.
fn following(page: usize) -> usize {
    page.saturating_add(1)
}

/// Load and display page `page` of the timeline.
pub async fn page(config: &KeepsakeConfig, page: usize) -> Result<()> {
    let service = TimelineService::from_config(config)?;
    let response = service.timeline_page(page).await;

    if let Some(err) = service.last_load_error() {
        anyhow::bail!("failed to load memories: {err}");
    }

    let summary = service.load_metadata().await;
    println!(
        "Page {} of {} ({} memories total)",
        following(page),
        summary.page_count.max(1),
        response.total
    );
    println!("{}", "=".repeat(50));

    if response.events.is_empty() {
        println!("  (no memories on this page)");
        return Ok(());
    }

    for event in &response.events {
        let marker = if event.is_highlight { "*" } else { " " };
        let date = if event.date.is_empty() { "undated" } else { event.date.as_str() };
        println!("{marker} [{date}] {} (#{})", event.title, event.id);
        if let Some(ref category) = event.category {
            println!("    Category:  {category}");
        }
        if !event.emotions.is_empty() {
            println!("    Emotions:  {}", event.emotions.join(", "));
        }
        if !event.description.is_empty() {
            println!("    {}", preview(&event.description, 120));
        }
        println!();
    }

    if response.has_more {
        println!("More: keepsake page {}", following(page));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn following_page_saturates() {
        assert_eq!(following(0), 1);
        assert_eq!(following(4), 5);
        assert_eq!(following(usize::MAX), usize::MAX);
    }
}
