use std::sync::Arc;

use anyhow::Context;
use estate_portal::api::ApiClient;
use estate_portal::models::Section;
use estate_portal::upload::{FileSelection, UploadKind, UploadWidget};
use estate_portal::{Config, PropertyFilter, PropertyStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().context("Invalid configuration")?;
    let language = config.language;

    info!("🏠 Estate Portal");
    info!("==========================================");
    info!("API: {}  language: {} ({})", config.api_base_url, language.code(), language.direction());

    let client = Arc::new(ApiClient::from_config(&config).context("Failed to create HTTP client")?);

    match client.content_section(Section::Hero, true).await {
        Ok(blocks) => {
            for block in &blocks {
                info!("Hero: {}", block.title.resolve(language));
            }
        }
        Err(e) => warn!("Could not load hero content: {}", e),
    }

    let properties = PropertyStore::new(client.clone());
    let filter = PropertyFilter {
        featured: Some(true),
        ..Default::default()
    };

    info!("Fetching featured properties...");
    if let Err(rejected) = properties.slice().fetch_list(filter.into_query(1, 12)).await {
        anyhow::bail!("{}", rejected.message);
    }

    let state = properties.slice().snapshot();
    info!("✅ Loaded {} of {} featured properties\n", state.items.len(), state.total);

    for (i, property) in state.items.iter().enumerate() {
        println!(
            "{}. {} ({} {})",
            i + 1,
            property.title.resolve(language),
            property.price,
            property.currency
        );
        println!("   {} bd, {} ba, {} sqft", property.bedrooms, property.bathrooms, property.area);
        println!("   Location: {}", property.location.resolve(language));
        println!("   Listing: {}", property.listing.as_str());
        let features: Vec<String> = property
            .features
            .iter()
            .map(|f| f.resolve(language))
            .collect();
        if !features.is_empty() {
            println!("   Features: {}", features.join(", "));
        }
        if let Some(agent) = property.agent.as_ref().and_then(|a| a.user()) {
            println!("   Agent: {} <{}>", agent.name, agent.email);
        }
        println!();
    }

    if let Some(path) = std::env::args().nth(1) {
        let file = FileSelection::from_path(&path).await?;
        let mut widget = UploadWidget::new(UploadKind::Image);
        let url = widget
            .upload(&*client, file, |url| info!("💾 Stored at {}", url))
            .await
            .with_context(|| format!("Upload of {} failed", path))?;
        println!("{}", url);
    }

    Ok(())
}
