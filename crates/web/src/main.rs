mod error;
mod metrics;
mod models;
mod params;

use anyhow::Result;
use askama::Template;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Local, NaiveDate};
use error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use models::{DashboardModel, DetailModel, Sidebar};
use params::{href, ViewParams};
use std::net::SocketAddr;
use std::sync::Arc;
use structure::alerts::{AlertPreferences, AlertRouter, LogAlertSink};
use structure::config::Config;
use structure::filter::category_options;
use structure::types::Tier;
use structure::view::{DetailView, View};
use structure::{MarketDataSource, ViewState};
use tower_http::trace::TraceLayer;

pub struct AppState {
    pub source: Arc<dyn MarketDataSource + Send + Sync>,
    pub default_tier: Tier,
    /// Pinned chart end date; `None` uses today.
    pub as_of: Option<NaiveDate>,
    /// `None` when no recorder is installed; `/metrics` then answers 503.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    fn view_state(&self, params: ViewParams) -> structure::Result<ViewState> {
        params.into_state(&self.source.records(), self.default_tier)
    }

    fn as_of(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(today)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

// --- Templates ---

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    sidebar: Sidebar,
    updated_at: String,
    refresh_href: String,
    version: &'static str,
    dashboard: DashboardModel,
}

#[derive(Template)]
#[template(path = "detail.html")]
struct DetailTemplate {
    sidebar: Sidebar,
    updated_at: String,
    refresh_href: String,
    version: &'static str,
    detail: DetailModel,
}

#[derive(Template)]
#[template(path = "partials/markets.html")]
struct MarketsTemplate {
    dashboard: DashboardModel,
}

// --- Handlers ---

async fn index(
    State(app): State<Arc<AppState>>,
    Query(params): Query<ViewParams>,
) -> Result<Html<String>, AppError> {
    let state = app.view_state(params)?;
    let view = state.render(app.source.as_ref(), app.as_of())?;
    metrics::record_view(&view);

    let sidebar = Sidebar::build(&state, &category_options(&app.source.records()));
    let updated_at = Local::now().format("%H:%M:%S").to_string();
    let refresh_href = href(&state);
    let version = env!("CARGO_PKG_VERSION");

    let html = match &view {
        View::Dashboard(d) => DashboardTemplate {
            sidebar,
            updated_at,
            refresh_href,
            version,
            dashboard: DashboardModel::new(d, &state),
        }
        .render()?,
        View::Detail(d) => DetailTemplate {
            sidebar,
            updated_at,
            refresh_href,
            version,
            detail: DetailModel::new(d, &state),
        }
        .render()?,
    };
    Ok(Html(html))
}

/// Metrics, list and priority signals for the htmx poll. Ignores `market`.
async fn markets_partial(
    State(app): State<Arc<AppState>>,
    Query(params): Query<ViewParams>,
) -> Result<Html<String>, AppError> {
    let state = app.view_state(params)?.back();
    let view = state.render_dashboard(app.source.as_ref())?;
    metrics::record_dashboard(&view);
    let html = MarketsTemplate {
        dashboard: DashboardModel::new(&view, &state),
    }
    .render()?;
    Ok(Html(html))
}

async fn api_view(
    State(app): State<Arc<AppState>>,
    Query(params): Query<ViewParams>,
) -> Result<Json<View>, AppError> {
    let state = app.view_state(params)?;
    let view = state.render(app.source.as_ref(), app.as_of())?;
    metrics::record_view(&view);
    Ok(Json(view))
}

async fn api_market(
    State(app): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(params): Query<ViewParams>,
) -> Result<Json<DetailView>, AppError> {
    let state = app.view_state(params)?.select(&ticker);
    let view = state.render_detail(app.source.as_ref(), &ticker, app.as_of())?;
    metrics::record_detail(&view);
    Ok(Json(view))
}

async fn health() -> &'static str {
    "ok"
}

async fn metrics_endpoint(State(app): State<Arc<AppState>>) -> Response {
    match &app.prometheus {
        Some(handle) => {
            handle.run_upkeep();
            (
                [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
                handle.render(),
            )
                .into_response()
        }
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics recorder not installed",
        )
            .into_response(),
    }
}

// --- Router ---

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/partials/markets", get(markets_partial))
        .route("/api/view", get(api_view))
        .route("/api/markets/{ticker}", get(api_market))
        .route("/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    let (dispatch, _otel_guard) =
        structure::observability::build_dispatch("dashboard-web", &config.general.log_level);
    tracing::dispatcher::set_global_default(dispatch).map_err(anyhow::Error::msg)?;

    let prometheus = metrics::init_global()?;
    let store = structure::sample::sample_store(config.dashboard.price_generator()?)?;
    tracing::info!(
        markets = store.len(),
        default_tier = config.dashboard.default_tier.as_str(),
        "loaded market records"
    );

    let router = AlertRouter::new(
        LogAlertSink,
        config.dashboard.default_tier,
        AlertPreferences::default(),
    );
    let as_of = config.dashboard.as_of.unwrap_or_else(today);
    let delivered = router.route(&store.deadline_alerts(as_of));
    tracing::info!(delivered, "routed deadline alerts");

    let state = Arc::new(AppState {
        source: Arc::new(store),
        default_tier: config.dashboard.default_tier,
        as_of: config.dashboard.as_of,
        prometheus: Some(prometheus),
    });

    let app = create_router(state);
    let web = config.web_or_default();
    let addr: SocketAddr = format!("{}:{}", web.host, web.port).parse()?;
    tracing::info!("dashboard listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
