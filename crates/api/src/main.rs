use anyhow::Context;

use stockroom_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockroom_infra::load_dotenv();
    stockroom_observability::init();

    let config = AppConfig::from_env();
    let bind_addr = config.bind_addr.clone();

    let app = stockroom_api::app::build_app(config)
        .await
        .context("failed to open the stock ledger")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
