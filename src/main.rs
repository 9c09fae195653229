use axum::{
    routing::{get, post},
    Router,
};
use exam_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    {
        let state = app_state.clone();
        tokio::spawn(async move {
            let notif = state.notification_service.clone();
            loop {
                match notif.run_once().await {
                    Ok(true) => {}
                    Ok(false) => {
                        tokio::time::sleep(Duration::from_millis(1000)).await;
                    }
                    Err(e) => {
                        tracing::error!(error = ?e, "Notification worker error");
                        tokio::time::sleep(Duration::from_secs(2)).await;
                    }
                }
            }
        });
    }

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let authoring_api = Router::new()
        .route(
            "/api/exams/:exam_id/questions",
            get(routes::question_routes::list_questions)
                .post(routes::question_routes::add_question),
        )
        .route(
            "/api/questions/:id",
            axum::routing::patch(routes::question_routes::update_question)
                .delete(routes::question_routes::delete_question),
        )
        .layer(axum::middleware::from_fn(
            exam_backend::middleware::auth::require_authoring_role,
        ));

    let attempt_api = Router::new()
        .route(
            "/api/exams/:exam_id/attempts/start",
            post(routes::attempt_routes::start_attempt),
        )
        .route(
            "/api/exams/:exam_id/attempts/submit",
            post(routes::attempt_routes::submit_attempt),
        )
        .route(
            "/api/exams/:exam_id/attempts",
            get(routes::attempt_routes::list_my_attempts),
        )
        .layer(axum::middleware::from_fn(
            exam_backend::middleware::auth::require_auth,
        ));

    let app = base_routes
        .merge(authoring_api)
        .merge(attempt_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
