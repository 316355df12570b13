use anyhow::Result;
use keepsake::config::KeepsakeConfig;
use keepsake::service::TimelineService;

use super::{format_bytes, preview};

/// Resolve and describe the image of one memory.
pub async fn image(config: &KeepsakeConfig, memory_id: &str) -> Result<()> {
    let service = TimelineService::from_config(config)?;
    let image = service.resolve_image_by_id(memory_id).await;

    if image.is_empty() {
        println!("Memory {memory_id}: no image");
        return Ok(());
    }

    println!("Memory {memory_id}");
    println!("  Data URI:  {}", preview(&image, 48));
    println!("  Size:      {}", format_bytes(image.len()));
    Ok(())
}
