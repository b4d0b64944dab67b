use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::{self, AppConfig};
use crate::database::DatabaseManager;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Full router with every route group and the global layers.
pub fn app(state: AppState) -> Router {
    let config = config::config();

    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        .merge(protected_routes())
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes))
        .layer(cors_layer(config));

    let router = if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        // Token acquisition
        .route("/users/signup", post(public::users::signup))
        .route("/users/loginUser", post(public::users::login))
        // Catalog
        .route("/career/all", get(public::catalog::careers_all))
        .route("/career/add", post(public::catalog::career_add))
        .route("/career/:id", delete(public::catalog::career_delete))
        .route("/cursos/all", get(public::catalog::cursos_all))
        .route("/curso/AddCurso", post(public::catalog::curso_add))
        .route("/curso/delete/:id", delete(public::catalog::curso_delete))
        .route("/user/cursos/:username", get(public::catalog::cursos_by_username))
        // Payments
        .route("/payment/paginated", get(public::payments::paginated))
        .route("/payment/add", post(public::payments::add))
        .route("/payment/delete/:id", delete(public::payments::remove))
        .route("/payment/user/:username", get(public::payments::by_username))
}

/// Routes behind the bearer-token check.
fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/users/all", get(protected::users::all))
        .route("/users/paginated/filtered-async", post(protected::users::filtered))
        .route("/users/change-password", put(protected::users::change_password))
        .route("/users/:id", get(protected::users::show).delete(protected::users::remove))
        .route(
            "/users/profile/:id",
            get(protected::users::profile).put(protected::users::update_profile),
        )
        .route("/user/addcurso", post(protected::enrollment::add_curso))
        .route("/user/mi-cursada", get(protected::enrollment::mi_cursada))
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = &config.security.cors_origins;
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "Cursada API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Users, cursos, careers, enrollments and tuition payments",
        "endpoints": {
            "users": "/users/signup, /users/loginUser (public); /users/* (protected)",
            "enrollment": "/user/addcurso, /user/mi-cursada (protected); /user/cursos/:username",
            "catalog": "/career/*, /cursos/all, /curso/*",
            "payments": "/payment/*",
            "health": "/health",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            let mut body = json!({
                "status": "degraded",
                "timestamp": now,
                "database": "unavailable"
            });
            if !crate::is_production!() {
                body["database_error"] = json!(e.to_string());
            }
            (StatusCode::SERVICE_UNAVAILABLE, Json(body))
        }
    }
}

/// Binds and serves until the process is stopped.
pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Cursada API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
