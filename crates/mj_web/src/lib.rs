use axum::{
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/", get(handlers::index))
        .route("/articles/:id", get(handlers::article_page))
        .route("/api/articles", get(handlers::list_articles).post(handlers::create_article))
        .route("/api/articles/reload", post(handlers::reload_articles))
        .route(
            "/api/articles/:id",
            get(handlers::get_article)
                .patch(handlers::update_article)
                .delete(handlers::delete_article),
        )
        .route("/api/suggestions", get(handlers::suggest))
        .route("/api/selection", delete(handlers::clear_selection))
        .route("/api/selection/:id", post(handlers::toggle_selection))
        .route(
            "/api/newspaper",
            get(handlers::newspaper_status)
                .post(handlers::build_newspaper)
                .delete(handlers::reset_newspaper),
        )
        .route("/api/newspaper/print", get(handlers::print_newspaper))
        .route("/api/newspaper/download", get(handlers::download_newspaper))
        .route("/api/newspaper/share", get(handlers::share_newspaper))
        .route("/api/rubrics", get(handlers::list_rubrics).post(handlers::create_rubric))
        .route("/api/rubrics/recent", get(handlers::recent_rubrics))
        .route("/api/rubrics/stats", get(handlers::rubric_statistics))
        .route(
            "/api/rubrics/:id",
            axum::routing::patch(handlers::update_rubric).delete(handlers::delete_rubric),
        )
        .route("/api/rubric-browser", get(handlers::rubric_types).delete(handlers::close_rubric))
        .route("/api/rubric-browser/more", post(handlers::load_more_rubric))
        .route("/api/rubric-browser/:type", get(handlers::open_rubric))
        .route("/api/events", get(handlers::list_events).post(handlers::create_event))
        .route("/api/events/upcoming", get(handlers::upcoming_events))
        .route("/api/events/:id", delete(handlers::delete_event))
        .route("/api/applications", post(handlers::submit_application))
        .route("/api/panels", get(handlers::list_panels))
        .route("/api/panels/:id", delete(handlers::dismiss_panel))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Bind `0.0.0.0:{port}` and serve until the process stops.
pub async fn serve(state: AppState, port: u16) -> mj_core::Result<()> {
    let app = create_app(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌐 Serving on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, ApiError, AppState};
    pub use mj_core::{Error, Result};
}
