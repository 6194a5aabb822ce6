//! catalog-server: serves the product catalog.

use product_catalog::{app, config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("product_catalog=info,tower_http=info")),
        )
        .init();

    let settings = config::load()?;
    app::run(settings).await?;
    Ok(())
}
