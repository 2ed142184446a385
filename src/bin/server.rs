use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use linear_cut::config::ProblemFile;
use linear_cut::error::Error;
use linear_cut::optimizer::{Optimizer, Outcome};
use linear_cut::progress::CancelToken;
use linear_cut::solver::HighsSolver;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

struct CancelOnDrop(CancelToken);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

async fn optimize(Json(req): Json<ProblemFile>) -> Result<Json<Outcome>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /optimize"
    );

    if req.stock.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "stock must not be empty".to_string()));
    }

    let cancel = CancelToken::new();
    let _guard = CancelOnDrop(cancel.clone());
    let ProblemFile {
        stock,
        demands,
        config,
    } = req;
    let optimizer = Optimizer::new(HighsSolver::new(), config).with_cancel_token(cancel);

    let result = tokio::task::spawn_blocking(move || optimizer.run(&stock, &demands))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "optimization task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    match result {
        Ok(outcome) => Ok(Json(outcome)),
        Err(Error::InvalidInput(e)) => Err((StatusCode::BAD_REQUEST, e.to_string())),
        Err(e) => {
            tracing::error!(error = %e, "optimization failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

fn app() -> Router {
    Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/optimize", post(optimize))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

fn main() {
    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
        .block_on(serve());
}

async fn serve() {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app()).await.unwrap();
}
