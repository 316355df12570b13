//! CLI `doctor` command — check the data documents and print a health report.

use anyhow::Result;
use keepsake::config::KeepsakeConfig;
use keepsake::error::Resource;
use keepsake::health::{check_health, ResourceStatus};
use keepsake::source::create_source;

/// Fetch every document once and print what loads and what dangles.
pub async fn doctor(config: &KeepsakeConfig) -> Result<()> {
    let source = create_source(&config.data)?;
    let report = check_health(source.as_ref()).await;

    println!("Keepsake Health Report");
    println!("======================");
    println!();
    println!("Data base:         {}", config.data.base);
    println!("Page size:         {}", config.cache.page_size);
    println!();
    println!("Documents:");
    for (resource, status) in [
        (Resource::Memories, &report.memories),
        (Resource::ImageMetadata, &report.image_metadata),
        (Resource::ImageBlobs, &report.image_blobs),
    ] {
        let location = source.describe(resource);
        match status {
            ResourceStatus::Ok { entries } => {
                println!("  {:<16} OK ({entries} entries) {location}", resource.as_str());
            }
            ResourceStatus::Failed { error } => {
                println!("  {:<16} FAILED {error}", resource.as_str());
            }
        }
    }
    println!();

    if !report.unknown_memories.is_empty() {
        println!(
            "Image references to unknown memories: {}",
            report.unknown_memories.len()
        );
        for id in &report.unknown_memories {
            println!("  memory #{id}");
        }
        println!();
    }

    if !report.missing_blobs.is_empty() {
        println!("Image references without a blob: {}", report.missing_blobs.len());
        for (memory_id, image_id) in &report.missing_blobs {
            println!("  memory #{memory_id} -> image {image_id}");
        }
        println!();
    }

    if report.is_healthy() {
        println!("Status:            HEALTHY");
    } else {
        println!("Status:            PROBLEMS FOUND");
    }

    Ok(())
}
