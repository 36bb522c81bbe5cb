use axum::{
    body::Body,
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use rust_embed::RustEmbed;

/// Embed demo assets (welcome page + sample upload file) at compile time
#[derive(RustEmbed)]
#[folder = "public/"]
struct PublicAssets;

mod api;
mod state;

use gdrive_demo::config;
use gdrive_demo::drivers;
use gdrive_demo::storage::DiskManager;
use state::AppState;

/// GET / - static welcome page
async fn welcome() -> impl IntoResponse {
    match PublicAssets::get("index.html") {
        Some(content) => {
            let html = String::from_utf8_lossy(&content.data)
                .replace("BUILD_TIME_PLACEHOLDER", env!("BUILD_TIME"));
            Html(html).into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

/// Handle remaining embedded asset requests (e.g. the demo logo)
async fn serve_embedded_file(uri: Uri) -> impl IntoResponse {
    let path = uri.path().trim_start_matches('/');

    if let Some(content) = PublicAssets::get(path) {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        return Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, mime.as_ref())
            .body(Body::from(content.data.into_owned()))
            .unwrap();
    }

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body(Body::from("Not Found"))
        .unwrap()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gdrive_demo=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration (creates config.json with defaults on first run)
    let app_config = config::load_config().expect("Failed to load configuration");
    tracing::info!(
        "Server will listen on {}:{}",
        app_config.server.host,
        app_config.server.port
    );

    // Build disks from config
    let disks = DiskManager::new();
    for (name, disk) in &app_config.disks {
        match drivers::create_driver(&disk.driver_type, disk.config.clone()) {
            Ok(driver) => disks.register(name, Arc::from(driver)).await,
            Err(e) => {
                tracing::error!("Failed to create disk {} ({}): {}", name, disk.driver_type, e)
            }
        }
    }
    tracing::debug!("Available driver types: {:?}", drivers::available_drivers());

    let state = Arc::new(AppState {
        disks,
        assets_dir: app_config.get_assets_dir(),
    });

    let app = Router::new()
        .route("/", get(welcome))
        .route("/put", get(api::files::put_literal))
        .route("/put-existing", get(api::files::put_existing))
        .route("/list-files", get(api::files::list_files))
        .route("/list-team-drives", get(api::files::list_team_drives))
        .route("/get", get(api::files::get_file))
        .route("/put-get-stream", get(api::files::put_get_stream))
        .route("/create-dir", get(api::files::create_dir))
        .route("/create-sub-dir", get(api::files::create_sub_dir))
        .route("/put-in-dir", get(api::files::put_in_dir))
        .route("/list-folder-contents", get(api::files::list_folder_contents))
        .route("/newest", get(api::files::newest))
        .route("/delete", get(api::files::delete_file))
        .route("/delete-dir", get(api::files::delete_dir))
        .route("/rename-dir", get(api::files::rename_dir))
        .route("/share", get(api::files::share))
        .route("/export/:filename", get(api::files::export_pdf))
        // Embedded static assets
        .fallback(serve_embedded_file)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
