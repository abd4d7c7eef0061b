use chrono::Local;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};
use whoop_dashboard::config::{load_credentials, load_endpoints};
use whoop_dashboard::models::DateRange;
use whoop_dashboard::table::{flatten, FlatTable, RecordKind};
use whoop_dashboard::whoop::WhoopSession;

const PREVIEW_ROWS: usize = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .init();

    dotenvy::dotenv().ok();
    let credentials = match load_credentials() {
        Ok(credentials) => credentials,
        Err(err) => {
            warn!("{err}");
            println!("Please set WHOOP_USERNAME and WHOOP_PASSWORD in the environment or .env file.");
            return Ok(());
        }
    };

    let session = WhoopSession::open(&load_endpoints(), &credentials).await?;
    let outcome = run(&session).await;
    session.close();
    outcome
}

async fn run(session: &WhoopSession) -> Result<(), Box<dyn std::error::Error>> {
    let profile = session.profile().await?;
    println!("User Profile:");
    println!("{}", serde_json::to_string_pretty(&profile)?);
    separator();

    let range = DateRange::trailing_week(Local::now().date_naive());

    let sleep = session.sleep_collection(&range).await?;
    println!("Sleep Data from {} to {}:", range.start_str(), range.end_str());
    println!("{}", serde_json::to_string_pretty(&sleep)?);
    separator();
    if sleep.is_empty() {
        println!("No sleep data returned for this period.");
    } else {
        println!("Sleep Data as Table:");
        print_preview(&flatten(&sleep, RecordKind::Sleep)?);
    }
    separator();

    let workouts = session.workout_collection(&range).await?;
    println!("Workout Data from {} to {}:", range.start_str(), range.end_str());
    println!("{}", serde_json::to_string_pretty(&workouts)?);
    if workouts.is_empty() {
        println!("No workout data returned for this period.");
    } else {
        println!("Workout Data as Table:");
        print_preview(&flatten(&workouts, RecordKind::Workout)?);
    }

    Ok(())
}

fn print_preview(table: &FlatTable) {
    let head = table.head(PREVIEW_ROWS);
    let mut preview = Table::new();
    preview
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(head.columns().to_vec());
    for row in head.rows() {
        preview.add_row(row.iter().map(ToString::to_string).collect::<Vec<_>>());
    }
    println!("{preview}");
    println!("[{} rows x {} columns]", table.len(), table.columns().len());
}

fn separator() {
    println!("{}", "-".repeat(50));
}
