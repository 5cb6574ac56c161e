use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use reviewcrawl::{scrape_reviews, types::*, AppState};

const ALLOWED_URL_PREFIX: &str = "https://www.booking.com";

fn parse_port_from_args() -> Option<u16> {
    let mut args = std::env::args().peekable();
    while let Some(a) = args.next() {
        if a == "--port" {
            if let Some(v) = args.next() {
                if let Ok(p) = v.parse::<u16>() {
                    return Some(p);
                }
            }
        } else if let Some(rest) = a.strip_prefix("--port=") {
            if let Ok(p) = rest.parse::<u16>() {
                return Some(p);
            }
        }
    }
    None
}

fn port_from_env() -> Option<u16> {
    for k in ["REVIEWCRAWL_PORT", "PORT"] {
        if let Ok(v) = std::env::var(k) {
            if let Ok(p) = v.trim().parse::<u16>() {
                return Some(p);
            }
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    info!("Starting reviewcrawl server");

    let state = Arc::new(AppState::new());

    let app = Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/api/parse-reviews", post(parse_reviews_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let port: u16 = parse_port_from_args()
        .or_else(port_from_env)
        .unwrap_or(5000);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            anyhow::bail!(
                "Address already in use: {}. Stop the existing process or run with --port {} (or set PORT/REVIEWCRAWL_PORT).",
                bind_addr,
                port.saturating_add(1)
            )
        }
        Err(e) => return Err(e.into()),
    };
    info!("reviewcrawl listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).ok();

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = async {
                if let Some(ref mut s) = sigterm {
                    s.recv().await;
                } else {
                    futures::future::pending::<()>().await;
                }
            } => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "reviewcrawl",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// POST /api/parse-reviews
///
/// Transport-level validation (body shape, allowed host prefix) lives here;
/// the core pipeline validates nothing further and never surfaces its own
/// scrape failures as HTTP errors — an unscrapeable page is a 200 with an
/// empty `reviews` array.
async fn parse_reviews_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScrapeRequest>,
) -> Result<Json<ReviewsResponse>, (StatusCode, Json<ErrorResponse>)> {
    if request.booking_url.trim().is_empty() {
        return Err(bad_request("booking_url is required"));
    }
    if !request.booking_url.starts_with(ALLOWED_URL_PREFIX) {
        return Err(bad_request("Invalid booking.com URL"));
    }
    if request.max_reviews == 0 {
        return Err(bad_request("max_reviews must be a positive integer"));
    }

    let hotel_id = request.hotel_id.as_deref().unwrap_or("unknown");
    info!(
        "Parsing reviews for hotel_id: {}, URL: {}",
        hotel_id, request.booking_url
    );

    // Bound concurrent browser sessions to what the host can sustain.
    let _permit = state
        .session_limit
        .acquire()
        .await
        .expect("semaphore closed");

    let reviews = scrape_reviews(&request.booking_url, request.max_reviews).await;

    Ok(Json(ReviewsResponse {
        status: "success".to_string(),
        reviews_found: reviews.len(),
        reviews,
    }))
}

fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}
