//! Phishing Fusion Analyzer: binary entrypoint
//! Boots the Axum HTTP server with the configured detectors, oracle and audit sink.

use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    phishing_fusion_analyzer::init_tracing();

    let router = phishing_fusion_analyzer::app()
        .await
        .map_err(shuttle_runtime::Error::Custom)?;

    Ok(router.into())
}
