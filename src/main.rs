mod core;
mod features;
mod modules;
mod shared;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware::from_fn, Router};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::agent::routes::{self as agent_routes, AgentState};
use crate::features::agent::{AssignmentService, RewardService};
use crate::features::audit::{routes as audit_routes, AuditService};
use crate::features::auth::routes as auth_routes;
use crate::features::auth::services::{AuthService, TokenService};
use crate::features::reports::{routes as reports_routes, ReportService};
use crate::features::users::{routes as users_routes, UserService};

fn main() -> anyhow::Result<()> {
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    // PDF rendering and image fetches land on the blocking pool, so
    // give it headroom beyond the async workers.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(run(worker_threads))
}

async fn run(worker_threads: usize) -> anyhow::Result<()> {
    // .env before the logger so RUST_LOG from the file takes effect
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        worker_threads,
        pid = std::process::id(),
        "Starting CheckHero API"
    );

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations applied");

    // Object storage, including bucket bootstrap on first run
    let storage = Arc::new(
        modules::storage::StorageClient::new(config.storage.clone())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize storage client: {}", e))?,
    );
    tracing::info!(bucket = %storage.bucket_name(), "Storage client ready");

    let audit_service = Arc::new(AuditService::new(pool.clone()));
    let token_service = Arc::new(TokenService::new(&config.auth));
    let auth_service = Arc::new(AuthService::new(
        pool.clone(),
        Arc::clone(&token_service),
        Arc::clone(&audit_service),
    ));
    let user_service = Arc::new(UserService::new(pool.clone(), Arc::clone(&audit_service)));
    let report_service = Arc::new(ReportService::new(
        pool.clone(),
        Arc::clone(&storage),
        Arc::clone(&audit_service),
    ));
    let agent_state = AgentState {
        assignments: Arc::new(AssignmentService::new(
            pool.clone(),
            Arc::clone(&audit_service),
        )),
        rewards: Arc::new(RewardService::new(pool.clone(), Arc::clone(&audit_service))),
    };

    let app = build_router(
        &config,
        auth_service,
        user_service,
        report_service,
        agent_state,
        audit_service,
    );

    let addr: SocketAddr = config
        .app
        .server_address()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;
    let listener = bind_listener(addr)?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(
    config: &Config,
    auth_service: Arc<AuthService>,
    user_service: Arc<UserService>,
    report_service: Arc<ReportService>,
    agent_state: AgentState,
    audit_service: Arc<AuditService>,
) -> Router {
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi);
    let swagger = match config.swagger.credentials() {
        Some(credentials) => {
            tracing::info!("Swagger UI basic auth enabled");
            Router::new()
                .merge(swagger_ui)
                .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                    credentials,
                ))))
        }
        None => Router::new().merge(swagger_ui),
    };

    // Everything behind the bearer middleware; role checks happen per
    // route via the guards.
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes(Arc::clone(&auth_service)))
        .merge(users_routes::routes(user_service))
        .merge(reports_routes::routes(report_service))
        .merge(agent_routes::routes(agent_state))
        .merge(audit_routes::routes(audit_service))
        .route_layer(axum::middleware::from_fn_with_state(
            Arc::clone(&auth_service),
            middleware::auth_middleware,
        ));

    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }

    Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(auth_routes::public_routes(auth_service))
        .route("/health", axum::routing::get(health_check))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
}

/// Bind with socket2 so listen backlog, buffer sizes, and keepalive can
/// be tuned before handing the socket to tokio.
fn bind_listener(addr: SocketAddr) -> anyhow::Result<tokio::net::TcpListener> {
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;
    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(Duration::from_secs(60))
            .with_interval(Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(65535)?;

    Ok(tokio::net::TcpListener::from_std(socket.into())?)
}
