//! Worker entrypoint: initialize once, then serve `/ping` and `/invocations`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use scribed_server::{AppState, ObjectStorageClient};
use scribed_transcription::SpeechEngine;
use tracing::{error, info};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Serving knobs. Model and sampling configuration are fixed constants in
/// `scribed-core`; only where to listen and where model files live are
/// runtime decisions.
#[derive(Parser)]
#[command(name = "scribed", version, about = "Speech-to-text serving daemon")]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to bind.
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Directory holding the ONNX model files (downloaded on first start).
    #[arg(long)]
    model_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    scribed_core::logging::init_tracing("info,scribed=debug")
        .map_err(|e| anyhow::anyhow!("tracing init: {e}"))?;
    let args = Args::parse();

    let metrics = scribed_server::metrics::install_recorder();

    // Startup initialization is fatal on any failure: the worker must not
    // begin serving traffic with a missing model handle.
    let storage = ObjectStorageClient::from_env().context("object storage client construction")?;
    let model_dir = args
        .model_dir
        .unwrap_or_else(scribed_transcription::model::default_model_dir);
    let engine = match build_engine(&model_dir).await {
        Ok(engine) => engine,
        Err(e) => {
            error!(error = %e, "failed to load model");
            return Err(e.context("model initialization failed"));
        }
    };

    let state = AppState::new(engine, storage, metrics);
    let app = scribed_server::router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("invalid bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(%addr, model = scribed_core::constants::MODEL_ID, "scribed worker serving");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server loop")?;

    info!("scribed worker stopped");
    Ok(())
}

/// Construct the worker's model handle.
#[cfg(feature = "ort")]
async fn build_engine(model_dir: &std::path::Path) -> anyhow::Result<Arc<dyn SpeechEngine>> {
    scribed_transcription::model::ensure_model(model_dir)
        .await
        .context("model download")?;
    let engine = scribed_transcription::WhisperEngine::new(model_dir);
    engine.initialize().await.context("engine initialization")?;
    Ok(Arc::new(engine))
}

/// Builds without the `ort` feature have no inference backend; refusing to
/// start keeps the no-degraded-mode contract.
#[cfg(not(feature = "ort"))]
async fn build_engine(_model_dir: &std::path::Path) -> anyhow::Result<Arc<dyn SpeechEngine>> {
    anyhow::bail!("scribed was built without the `ort` feature; no inference backend available")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
}
