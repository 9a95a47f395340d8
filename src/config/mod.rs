use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::CachePolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub api: RemoteApiConfig,
    pub auth: AuthConfig,
    pub cache: CacheConfig,
    pub list: ListConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_request_logging: bool,
    pub cors_origins: Vec<String>,
}

/// Entity configuration/query service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteApiConfig {
    pub base_url: String,
    pub project_id: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Hosted auth service handling login, OAuth and password reset
    pub service_url: String,
    pub public_routes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub list_stale_secs: u64,
    pub list_gc_secs: u64,
    pub options_stale_secs: u64,
    pub options_gc_secs: u64,
    pub definitions_stale_secs: u64,
    pub retry_count: u32,
    pub retry_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    pub max_columns: usize,
    /// Cap on related records fetched to build filter options
    pub options_limit: u32,
}

pub const DEFAULT_PUBLIC_ROUTES: &[&str] = &[
    "/login",
    "/logout",
    "/signup",
    "/auth/callback",
    "/auth/reset-password",
    "/api/auth/",
    "/health",
    "/favicon.ico",
];

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Some(v) = env::var("ENTITY_BROWSER_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
        {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("SERVER_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging = v.parse().unwrap_or(self.server.enable_request_logging);
        }
        if let Ok(v) = env::var("SERVER_CORS_ORIGINS") {
            self.server.cors_origins = split_list(&v);
        }

        // Remote API overrides
        if let Ok(v) = env::var("ENTITY_API_URL") {
            self.api.base_url = v;
        }
        if let Ok(v) = env::var("PROJECT_ID") {
            self.api.project_id = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("ENTITY_API_KEY") {
            self.api.api_key = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("ENTITY_API_TIMEOUT_SECS") {
            self.api.timeout_secs = v.parse().unwrap_or(self.api.timeout_secs);
        }

        // Auth overrides
        if let Ok(v) = env::var("AUTH_SERVICE_URL") {
            self.auth.service_url = v;
        }
        if let Ok(v) = env::var("AUTH_PUBLIC_ROUTES") {
            self.auth.public_routes = split_list(&v);
        }

        // Cache overrides
        if let Ok(v) = env::var("CACHE_LIST_STALE_SECS") {
            self.cache.list_stale_secs = v.parse().unwrap_or(self.cache.list_stale_secs);
        }
        if let Ok(v) = env::var("CACHE_LIST_GC_SECS") {
            self.cache.list_gc_secs = v.parse().unwrap_or(self.cache.list_gc_secs);
        }
        if let Ok(v) = env::var("CACHE_OPTIONS_STALE_SECS") {
            self.cache.options_stale_secs = v.parse().unwrap_or(self.cache.options_stale_secs);
        }
        if let Ok(v) = env::var("CACHE_OPTIONS_GC_SECS") {
            self.cache.options_gc_secs = v.parse().unwrap_or(self.cache.options_gc_secs);
        }
        if let Ok(v) = env::var("CACHE_DEFINITIONS_STALE_SECS") {
            self.cache.definitions_stale_secs = v.parse().unwrap_or(self.cache.definitions_stale_secs);
        }
        if let Ok(v) = env::var("CACHE_RETRY_COUNT") {
            self.cache.retry_count = v.parse().unwrap_or(self.cache.retry_count);
        }
        if let Ok(v) = env::var("CACHE_RETRY_DELAY_MS") {
            self.cache.retry_delay_ms = v.parse().unwrap_or(self.cache.retry_delay_ms);
        }

        // List overrides
        if let Ok(v) = env::var("LIST_MAX_COLUMNS") {
            self.list.max_columns = v.parse().unwrap_or(self.list.max_columns);
        }
        if let Ok(v) = env::var("LIST_OPTIONS_LIMIT") {
            self.list.options_limit = v.parse().unwrap_or(self.list.options_limit);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                enable_request_logging: true,
                cors_origins: vec!["http://localhost:3000".to_string()],
            },
            api: RemoteApiConfig {
                base_url: "http://localhost:8000".to_string(),
                project_id: None,
                api_key: None,
                timeout_secs: 30,
            },
            auth: AuthConfig {
                service_url: "http://localhost:9999".to_string(),
                public_routes: default_public_routes(),
            },
            cache: CacheConfig {
                list_stale_secs: 30,
                list_gc_secs: 5 * 60,
                options_stale_secs: 5 * 60,
                options_gc_secs: 10 * 60,
                definitions_stale_secs: 60,
                retry_count: 1,
                retry_delay_ms: 1000,
            },
            list: ListConfig {
                max_columns: 5,
                options_limit: 1000,
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.server.host = "0.0.0.0".to_string();
        config.server.cors_origins = vec!["https://staging.example.com".to_string()];
        config.api.timeout_secs = 15;
        config.cache.definitions_stale_secs = 5 * 60;
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.server.host = "0.0.0.0".to_string();
        config.server.enable_request_logging = false;
        config.server.cors_origins = vec!["https://app.example.com".to_string()];
        config.api.timeout_secs = 10;
        config.cache.definitions_stale_secs = 5 * 60;
        config
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn is_public_route(&self, path: &str) -> bool {
        self.auth
            .public_routes
            .iter()
            .any(|route| path.starts_with(route.as_str()))
    }
}

impl CacheConfig {
    pub fn list_policy(&self) -> CachePolicy {
        CachePolicy {
            stale_time: Duration::from_secs(self.list_stale_secs),
            gc_time: Duration::from_secs(self.list_gc_secs),
            retry: self.retry_count,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    pub fn options_policy(&self) -> CachePolicy {
        CachePolicy {
            stale_time: Duration::from_secs(self.options_stale_secs),
            gc_time: Duration::from_secs(self.options_gc_secs),
            retry: self.retry_count,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    pub fn definitions_policy(&self) -> CachePolicy {
        CachePolicy {
            stale_time: Duration::from_secs(self.definitions_stale_secs),
            gc_time: Duration::from_secs(self.definitions_stale_secs * 2),
            retry: 0,
            retry_delay: Duration::ZERO,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}

fn default_public_routes() -> Vec<String> {
    DEFAULT_PUBLIC_ROUTES.iter().map(|s| s.to_string()).collect()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
