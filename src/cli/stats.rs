use anyhow::Result;
use keepsake::config::KeepsakeConfig;
use keepsake::service::TimelineService;

/// Display catalog statistics in the terminal.
pub async fn stats(config: &KeepsakeConfig) -> Result<()> {
    let service = TimelineService::from_config(config)?;

    let Some(response) = service.stats().await else {
        let reason = service
            .last_load_error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".into());
        anyhow::bail!("failed to load memories: {reason}");
    };

    println!("Memory Statistics");
    println!("{}", "=".repeat(40));
    println!("  Total memories:      {}", response.total_memories);
    println!("  Highlights:          {}", response.highlights);
    println!("  Dated:               {}", response.dated);
    println!("  Undated:             {}", response.undated);
    println!();

    println!("By Category:");
    for (category, count) in &response.by_category {
        println!("  {:<16} {}", category, count);
    }
    println!();

    if !response.emotions.is_empty() {
        println!("Emotions:");
        for (emotion, count) in &response.emotions {
            println!("  {:<16} {}", emotion, count);
        }
        println!();
    }

    if let Some(earliest) = response.earliest {
        println!("Earliest memory:       {earliest}");
    }
    if let Some(latest) = response.latest {
        println!("Latest memory:         {latest}");
    }

    Ok(())
}
