use crate::charts::build_charts;
use crate::errors::AppError;
use crate::loader::load_tables;
use crate::models::{DashboardResponse, DataQuery, DateRange};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::{error, info};

pub async fn index() -> Html<String> {
    Html(render_index(&DateRange::trailing_week(today())))
}

pub async fn get_data(
    State(state): State<AppState>,
    Query(query): Query<DataQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    let range = query.range(today())?;

    if query.refresh && state.cache.invalidate(&range).await {
        info!("refreshing {range}");
    }

    let config = Arc::clone(&state.config);
    let lookup = state
        .cache
        .get_or_fetch(range, move |range| async move {
            load_tables(&config.endpoints, &config.credentials, range).await
        })
        .await
        .map_err(|err| {
            error!("failed to load {range}: {err}");
            err
        })?;

    let tables = lookup.value;
    Ok(Json(DashboardResponse {
        start: range.start_str(),
        end: range.end_str(),
        cached: lookup.hit,
        charts: build_charts(&tables),
        sleep: tables.sleep.clone(),
        workout: tables.workout.clone(),
    }))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
