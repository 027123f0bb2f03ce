use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use reverie_api::middleware::require_admin;
use reverie_api::{AppState, AppStateInner, content, donations, sync};
use reverie_content::{ContentStore, Ledger};
use reverie_store::{MemoryStore, RemoteStore, RestStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reverie=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let host = std::env::var("REVERIE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("REVERIE_PORT")
        .unwrap_or_else(|_| "4000".into())
        .parse()?;
    let reconcile_secs: u64 = std::env::var("REVERIE_RECONCILE_SECS")
        .unwrap_or_else(|_| "300".into())
        .parse()?;

    // Remote store, or the in-memory fallback when no endpoint is
    // configured (static-data mode for local development).
    let store: Arc<dyn RemoteStore> = match std::env::var("REVERIE_STORE_URL") {
        Ok(url) => {
            let key = std::env::var("REVERIE_STORE_KEY").unwrap_or_default();
            info!("using remote store at {}", url);
            Arc::new(RestStore::new(&url, &key)?)
        }
        Err(_) => {
            warn!("REVERIE_STORE_URL not set, falling back to the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    // Shared state
    let content_store = Arc::new(ContentStore::new(store));
    let report = content_store.refresh().await;
    if !report.failed.is_empty() {
        warn!("initial refresh had partial failures: {:?}", report.failed);
    }

    let state: AppState = Arc::new(AppStateInner {
        content: content_store.clone(),
        ledger: Ledger::new(content_store),
    });

    // Background reconciler: retry donations whose balance write never
    // landed.
    let reconciler_state = state.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(reconcile_secs));
        loop {
            tick.tick().await;
            match reconciler_state.ledger.reconcile_pending().await {
                Ok(0) => {}
                Ok(n) => info!("reconciler repaired {} donation(s)", n),
                Err(e) => warn!("reconcile pass failed: {}", e),
            }
        }
    });

    // Routes
    let public_routes = Router::new()
        .route("/content/quests", get(content::list_quests))
        .route("/content/roles", get(content::list_roles))
        .route("/content/dreamers", get(content::list_dreamers))
        .route("/content/sponsors", get(content::list_sponsors))
        .route("/content/events", get(content::list_events))
        .route("/content/students", get(content::list_students))
        .route("/content/announcement", get(content::get_announcement))
        .route("/sponsorships", get(content::list_sponsorships))
        .route("/published", get(sync::published))
        .route("/donations/checkout", post(donations::confirm_checkout))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route("/admin/quests", post(content::create_quest))
        .route("/admin/quests/{id}", put(content::update_quest))
        .route("/admin/quests/{id}", delete(content::delete_quest))
        .route("/admin/roles", post(content::create_role))
        .route("/admin/roles/{id}", put(content::update_role))
        .route("/admin/roles/{id}", delete(content::delete_role))
        .route("/admin/dreamers", post(content::create_dreamer))
        .route("/admin/dreamers/{id}", put(content::update_dreamer))
        .route("/admin/dreamers/{id}", delete(content::delete_dreamer))
        .route("/admin/sponsors", post(content::create_sponsor))
        .route("/admin/sponsors/{id}", put(content::update_sponsor))
        .route("/admin/sponsors/{id}", delete(content::delete_sponsor))
        .route("/admin/events", post(content::create_event))
        .route("/admin/events/{id}", put(content::update_event))
        .route("/admin/events/{id}", delete(content::delete_event))
        .route("/admin/students", post(content::create_student))
        .route("/admin/students/{id}", delete(content::delete_student))
        .route("/admin/announcement", put(content::put_announcement))
        .route("/admin/donations", get(donations::list_donations))
        .route("/admin/donations", post(donations::record_donation))
        .route("/admin/donations/{id}", delete(donations::delete_donation))
        .route("/admin/reconcile", post(donations::reconcile))
        .route("/admin/sync", post(sync::sync))
        .route("/admin/import", post(sync::import))
        .layer(middleware::from_fn(require_admin))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Reverie server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
