use std::sync::Arc;

use axum::http::HeaderValue;
use axum::{middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::AuthGateway;
use crate::catalog::CatalogCache;
use crate::config::AppConfig;
use crate::handlers::{protected, public};
use crate::list::InstancesCache;
use crate::middleware::require_user;
use crate::options::OptionsCache;
use crate::sdk::EntityApi;

/// Everything a request handler needs, built once in `main`
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub api: Arc<dyn EntityApi>,
    pub auth: Arc<dyn AuthGateway>,
    pub catalog: CatalogCache,
    pub instances: InstancesCache,
    pub options: OptionsCache,
}

impl AppState {
    pub fn new(config: AppConfig, api: Arc<dyn EntityApi>, auth: Arc<dyn AuthGateway>) -> Self {
        let catalog = CatalogCache::new(api.clone(), config.cache.definitions_policy());
        let instances = InstancesCache::new(api.clone(), config.cache.list_policy());
        let options = OptionsCache::new(api.clone(), config.cache.options_policy(), config.list.options_limit);

        Self {
            config: Arc::new(config),
            api,
            auth,
            catalog,
            instances,
            options,
        }
    }

    /// Drop expired entries of every cache
    pub fn sweep_caches(&self) {
        self.catalog.sweep();
        self.instances.sweep();
        self.options.sweep();
    }
}

pub fn app(state: AppState) -> Router {
    let router = Router::new()
        // Public
        .route("/health", get(public::health))
        .merge(auth_public_routes())
        // Behind require_user
        .merge(page_routes())
        .merge(api_routes())
        .layer(middleware::from_fn_with_state(state.clone(), require_user))
        .with_state(state.clone());

    let cors = cors_layer(&state.config);
    if state.config.server.enable_request_logging {
        router.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
    } else {
        router.layer(cors)
    }
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/login", get(auth::login))
        .route("/logout", get(auth::logout))
        .route("/auth/callback", get(auth::callback))
        .route("/auth/reset-password", get(auth::reset_password))
}

fn page_routes() -> Router<AppState> {
    use protected::{entities, home, profile};

    Router::new()
        .route("/", get(home::index))
        .route("/profile", get(profile::show))
        .route("/entities/:slug", get(entities::list))
        .route("/entities/:slug/:instance_slug", get(entities::detail))
}

fn api_routes() -> Router<AppState> {
    use protected::api;

    Router::new()
        .route("/api/entities", get(api::definitions))
        .route("/api/entities/:slug/instances", get(api::instances))
        .route("/api/entities/:slug/options/:field", get(api::options))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    CorsLayer::new().allow_origin(origins)
}
