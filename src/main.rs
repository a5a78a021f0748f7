use std::collections::BTreeMap;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_admin::catalog::{CatalogApi, CatalogConfig, CatalogHttpClient};
use catalog_admin::models::Semester;

/// Prints a snapshot of the remote catalog: course count plus a per-term
/// instance breakdown.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "catalog_admin=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CatalogConfig::new_from_env()?;
    info!("catalog service at {}", config.base_url);

    let client = CatalogHttpClient::new(config)?;

    let courses = client.list_courses().await?;
    info!("{} courses in catalog", courses.len());

    let instances = client.list_instances().await?;
    let mut per_term: BTreeMap<(i32, Semester), usize> = BTreeMap::new();
    for instance in &instances {
        *per_term.entry((instance.year, instance.semester)).or_default() += 1;
    }
    for ((year, semester), count) in per_term {
        info!("{} {}: {} instances", semester, year, count);
    }

    Ok(())
}
