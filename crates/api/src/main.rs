use anyhow::Context;

use shopwise_api::config::AppConfig;
use shopwise_observability::LogFormat;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `.env` is optional.
    let _ = dotenvy::dotenv();
    shopwise_observability::init(LogFormat::from_env_value(
        std::env::var("LOG_FORMAT").ok().as_deref(),
    ));

    let config = AppConfig::from_env().context("invalid configuration")?;
    let bind_addr = config.bind_addr;

    let app = match shopwise_api::app::build_app(config).await {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            return Err(e.into());
        }
    };

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
