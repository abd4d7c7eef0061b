use crate::config::{Credentials, VendorEndpoints};
use crate::errors::DashboardError;
use crate::models::{DashboardTables, DateRange};
use crate::table::{flatten, RecordKind};
use crate::whoop::WhoopSession;
use serde_json::Value;
use tracing::info;

/// Fetches both collections in one session and flattens them.
///
/// The session is closed before flattening, on success and failure alike.
/// Nothing partial is returned: one bad collection fails the whole load.
pub async fn load_tables(
    endpoints: &VendorEndpoints,
    credentials: &Credentials,
    range: DateRange,
) -> Result<DashboardTables, DashboardError> {
    info!("loading WHOOP data for {range}");
    let session = WhoopSession::open(endpoints, credentials).await?;
    let fetched = fetch_collections(&session, &range).await;
    session.close();

    let (sleep, workouts) = fetched?;
    let tables = DashboardTables {
        sleep: flatten(&sleep, RecordKind::Sleep)?,
        workout: flatten(&workouts, RecordKind::Workout)?,
    };
    info!(
        "loaded {} sleep and {} workout rows for {range}",
        tables.sleep.len(),
        tables.workout.len()
    );
    Ok(tables)
}

async fn fetch_collections(
    session: &WhoopSession,
    range: &DateRange,
) -> Result<(Vec<Value>, Vec<Value>), DashboardError> {
    let sleep = session.sleep_collection(range).await?;
    let workouts = session.workout_collection(range).await?;
    Ok((sleep, workouts))
}
