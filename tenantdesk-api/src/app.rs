/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tenantdesk_api::{app::{build_router, AppState}, config::Config};
/// use tenantdesk_shared::{db::pool::create_pool, service::Services, store::PgStore};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.pool_config()).await?;
/// let services = Services::new(
///     Arc::new(PgStore::new(pool)),
///     config.session_config(),
///     config.hashing_config(),
/// )?;
/// let app = build_router(AppState::new(services, config));
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, extract::client_addr, routes};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tenantdesk_shared::{auth::RequestContext, service::Services};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every service holds `Arc` handles, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Core services wired against one store
    pub services: Services,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(services: Services, config: Config) -> Self {
        Self {
            services,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /health                          # Store connectivity (public)
/// └── /api/
///     ├── POST /auth/register-tenant       # public
///     ├── POST /auth/login                 # public
///     ├── GET  /auth/me
///     ├── POST /auth/logout
///     ├── GET  /tenants                    # super_admin
///     ├── GET|PUT /tenants/:tenant_id
///     ├── GET|POST /tenants/:tenant_id/users
///     ├── PUT|DELETE /users/:user_id
///     ├── GET|POST /projects
///     ├── GET|PUT|DELETE /projects/:project_id
///     ├── GET|POST /projects/:project_id/tasks
///     ├── PUT|DELETE /tasks/:task_id
///     ├── PATCH /tasks/:task_id/status
///     └── GET  /audit-logs                 # tenant_admin
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (every `/api` route except registration and login)
pub fn build_router(state: AppState) -> Router {
    // Public auth routes
    let public_routes = Router::new()
        .route("/auth/register-tenant", post(routes::auth::register_tenant))
        .route("/auth/login", post(routes::auth::login));

    // Everything else requires a valid session token
    let protected_routes = Router::new()
        .route("/auth/me", get(routes::auth::me))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/tenants", get(routes::tenants::list_tenants))
        .route(
            "/tenants/:tenant_id",
            get(routes::tenants::get_tenant).put(routes::tenants::update_tenant),
        )
        .route(
            "/tenants/:tenant_id/users",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route(
            "/users/:user_id",
            put(routes::users::update_user).delete(routes::users::delete_user),
        )
        .route(
            "/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/projects/:project_id",
            get(routes::projects::get_project)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route(
            "/projects/:project_id/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:task_id",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .route("/tasks/:task_id/status", patch(routes::tasks::update_task_status))
        .route("/audit-logs", get(routes::audit::list_audit_logs))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_layer));

    // Configure CORS based on environment
    let cors = if state.config.allows_any_origin() {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", public_routes.merge(protected_routes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Session authentication middleware layer
///
/// Validates the bearer token through the core guard (signature, expiry,
/// revocation), then injects a [`RequestContext`] carrying the principal and
/// the source address into request extensions.
async fn auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let principal = state.services.guard.authenticate(authorization).await?;
    let source_addr = client_addr(req.headers(), req.extensions());

    req.extensions_mut()
        .insert(RequestContext::new(principal, source_addr));

    Ok(next.run(req).await)
}
