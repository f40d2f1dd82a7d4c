use anyhow::{Context, Result};
use clap::Parser;
use live_translate::{
    create_app, AppState, AzureSpeechEngine, Config, EventQueue, StreamOptions, TranscriptLog,
    TranslationController,
};
use std::sync::Arc;
use tracing::info;

/// Live microphone translation served to the browser over server-sent events
#[derive(Debug, Parser)]
#[command(name = "live-translate", version)]
struct Args {
    /// Config file (extension optional; missing file means defaults)
    #[arg(short, long, default_value = "config/live-translate")]
    config: String,

    /// Override the bind address
    #[arg(long)]
    bind: Option<String>,

    /// Override the HTTP port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut cfg = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;
    if let Some(bind) = args.bind {
        cfg.service.http.bind = bind;
    }
    if let Some(port) = args.port {
        cfg.service.http.port = port;
    }

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let transcript = Arc::new(TranscriptLog::for_today(&cfg.transcript.directory));
    transcript
        .reset()
        .context("Failed to create transcript file")?;

    let queue = Arc::new(EventQueue::with_capacity(cfg.stream.queue_capacity));
    let engine = Arc::new(AzureSpeechEngine::new(cfg.speech.endpoint.clone()));
    let controller = Arc::new(TranslationController::new(
        engine,
        queue,
        transcript,
        cfg.speech.clone(),
    ));

    let stream = StreamOptions {
        poll_interval: cfg.stream.poll_interval(),
        drain_on_stop: cfg.stream.drain_on_stop,
    };
    let app = create_app(AppState::new(Arc::clone(&controller), stream), &cfg.service.static_dir);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(Arc::clone(&controller)))
        .await
        .context("HTTP server failed")?;

    info!("Shut down");

    Ok(())
}

/// Resolves on Ctrl-C after stopping translation, so open streams end and the
/// server can drain its connections
async fn shutdown_signal(controller: Arc<TranslationController>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
    controller.stop().await;
}
