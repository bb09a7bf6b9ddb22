use bindoc::{init_tracing, AppConfig, DocSettings};
use demo_app::build_app;
use demo_app::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    // missing files are skipped; only unreadable ones end up here
    let config = AppConfig::load("dev").unwrap_or_else(|err| {
        tracing::warn!(error = %err, "Falling back to default configuration");
        AppConfig::default()
    });
    let settings = DocSettings::from_config(&config);
    let host: String = config.get_or("server.host", "0.0.0.0".to_string());
    let port: u16 = config.get_or("server.port", 8902);

    let markdown = settings.markdown_path.clone();
    let html = settings.html_path.clone();
    let app = build_app(settings, AppState::default());

    let addr = format!("{host}:{port}");
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%addr, error = %err, "Failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, %markdown, %html, "Serving user API");
    if let Err(err) = bindoc::axum::serve(listener, app).await {
        tracing::error!(error = %err, "Server stopped");
    }
}
