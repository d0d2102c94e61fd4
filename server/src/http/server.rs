use anyhow::Result;
use axum::{Extension, Router, routing::get};
use harvester_client::HarvesterApi;
use shared_types::ResourceKind;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use super::{handlers, state::AppState};

pub const API_BASE_PATH: &str = "/harvester-admin";

/// Route table: one collection and one record route per resource kind,
/// plus the step script sub-resource.
pub fn router(state: Arc<AppState>) -> Router {
    let mut app: Router<Arc<AppState>> = Router::new()
        // Health check
        .route("/health", get(handlers::health_check));

    for kind in ResourceKind::ALL {
        let collection = format!("{API_BASE_PATH}/{}", kind.segment());
        app = app
            .route(
                &collection,
                get(handlers::list_records).layer(Extension(kind)),
            )
            .route(
                &format!("{collection}/:id"),
                get(handlers::get_record)
                    .put(handlers::update_record)
                    .layer(Extension(kind)),
            );
    }

    app.route(
        &format!("{API_BASE_PATH}/{}/:id/script", ResourceKind::Step.segment()),
        get(handlers::get_script).put(handlers::put_script),
    )
    // Add state
    .with_state(state)
    // Add middleware
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http())
}

pub async fn start_server(backend: Arc<dyn HarvesterApi>, bind_address: SocketAddr) -> Result<()> {
    let app = router(Arc::new(AppState::new(backend)));

    info!("Server listening on {}", bind_address);

    // Run the server
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
