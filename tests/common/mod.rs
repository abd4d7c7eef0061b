#![allow(dead_code)]

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, NaiveDate};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use whoop_dashboard::config::{Credentials, VendorEndpoints};

pub const USERNAME: &str = "athlete@example.com";
pub const PASSWORD: &str = "correct-horse";
const TOKEN: &str = "fake-access-token";

#[derive(Default)]
pub struct Counters {
    pub auth: AtomicUsize,
    pub data: AtomicUsize,
}

impl Counters {
    pub fn auth(&self) -> usize {
        self.auth.load(Ordering::SeqCst)
    }

    pub fn data(&self) -> usize {
        self.data.load(Ordering::SeqCst)
    }
}

/// Misbehaviour switches for the fake vendor.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeBehavior {
    /// Every collection page answers with the same `next_token`.
    pub repeat_token: bool,
    /// The sleep endpoint answers 500.
    pub fail_sleep: bool,
}

#[derive(Clone)]
struct FakeState {
    counters: Arc<Counters>,
    behavior: FakeBehavior,
    sleep: Arc<Vec<Value>>,
    workouts: Arc<Vec<Value>>,
}

/// In-process stand-in for the WHOOP API, served from its own thread so it
/// outlives any single test runtime.
pub struct FakeWhoop {
    pub base_url: String,
    pub counters: Arc<Counters>,
}

impl FakeWhoop {
    pub fn endpoints(&self) -> VendorEndpoints {
        VendorEndpoints {
            auth_url: format!("{}/oauth/token", self.base_url),
            api_url: format!("{}/developer", self.base_url),
        }
    }
}

pub fn credentials(password: &str) -> Credentials {
    Credentials {
        username: USERNAME.to_string(),
        password: password.to_string(),
    }
}

pub fn spawn_fake_whoop(sleep_records: Vec<Value>, workout_records: Vec<Value>) -> FakeWhoop {
    spawn_fake_whoop_with(sleep_records, workout_records, FakeBehavior::default())
}

pub fn spawn_fake_whoop_with(
    sleep_records: Vec<Value>,
    workout_records: Vec<Value>,
    behavior: FakeBehavior,
) -> FakeWhoop {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind fake whoop");
    listener.set_nonblocking(true).expect("nonblocking listener");
    let addr = listener.local_addr().unwrap();

    let counters = Arc::new(Counters::default());
    let state = FakeState {
        counters: Arc::clone(&counters),
        behavior,
        sleep: Arc::new(sleep_records),
        workouts: Arc::new(workout_records),
    };

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("fake whoop runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            let app = Router::new()
                .route("/oauth/token", post(token))
                .route("/developer/v1/user/profile/basic", get(profile))
                .route("/developer/v1/activity/sleep", get(sleep_page))
                .route("/developer/v1/activity/workout", get(workout_page))
                .with_state(state);
            axum::serve(listener, app).await.unwrap();
        });
    });

    FakeWhoop {
        base_url: format!("http://{addr}"),
        counters,
    }
}

async fn token(State(state): State<FakeState>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    state.counters.auth.fetch_add(1, Ordering::SeqCst);
    let valid = body["grant_type"] == "password"
        && body["username"] == USERNAME
        && body["password"] == PASSWORD;
    if !valid {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid_grant" })));
    }
    (
        StatusCode::OK,
        Json(json!({ "access_token": TOKEN, "user": { "id": 42 } })),
    )
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {TOKEN}"))
}

async fn profile(State(state): State<FakeState>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    state.counters.data.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(Value::Null));
    }
    (
        StatusCode::OK,
        Json(json!({ "user_id": 42, "email": USERNAME, "first_name": "Test", "last_name": "Athlete" })),
    )
}

async fn sleep_page(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if state.behavior.fail_sleep {
        state.counters.data.fetch_add(1, Ordering::SeqCst);
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "boom" })));
    }
    let records = Arc::clone(&state.sleep);
    page(&state, &headers, &params, &records)
}

async fn workout_page(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let records = Arc::clone(&state.workouts);
    page(&state, &headers, &params, &records)
}

/// Serves records whose `start` falls inside `[start, end]`, `limit` at a time,
/// with the next offset as the page token.
fn page(
    state: &FakeState,
    headers: &HeaderMap,
    params: &HashMap<String, String>,
    records: &[Value],
) -> (StatusCode, Json<Value>) {
    state.counters.data.fetch_add(1, Ordering::SeqCst);
    if !authorized(headers) {
        return (StatusCode::UNAUTHORIZED, Json(Value::Null));
    }

    let (Some(start), Some(end)) = (params.get("start"), params.get("end")) else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "start and end required" })));
    };
    let limit: usize = params
        .get("limit")
        .and_then(|value| value.parse().ok())
        .unwrap_or(10);
    let offset: usize = params
        .get("nextToken")
        .and_then(|value| value.parse().ok())
        .unwrap_or(0);

    let matching: Vec<&Value> = records
        .iter()
        .filter(|record| match record["start"].as_str() {
            Some(at) => at >= start.as_str() && at <= end.as_str(),
            None => true,
        })
        .collect();
    let chunk: Vec<Value> = matching.iter().skip(offset).take(limit).map(|record| (*record).clone()).collect();
    let next = offset + chunk.len();
    let next_token = if state.behavior.repeat_token {
        Value::String("same".to_string())
    } else if next < matching.len() {
        Value::String(next.to_string())
    } else {
        Value::Null
    };

    (
        StatusCode::OK,
        Json(json!({ "records": chunk, "next_token": next_token })),
    )
}

/// Collects formatted log output written on the current thread.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.contents().matches(needle).count()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Routes this thread's `tracing` events into a `LogCapture` until the guard drops.
pub fn capture_logs() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (capture, tracing::subscriber::set_default(subscriber))
}

fn day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// One night per day: to bed at 22:30, up at 06:30 the next morning (8h).
pub fn nightly_sleep(from: NaiveDate, days: i64) -> Vec<Value> {
    (0..days)
        .map(|offset| {
            let night = from + Duration::days(offset);
            let morning = night + Duration::days(1);
            json!({
                "id": offset + 1,
                "user_id": 42,
                "start": format!("{}T22:30:00.000Z", day(night)),
                "end": format!("{}T06:30:00.000Z", day(morning)),
                "nap": false,
                "score_state": "SCORED",
                "score": {
                    "respiratory_rate": 15.2,
                    "sleep_performance_percentage": 80 + (offset % 20),
                    "stage_summary": { "total_in_bed_time_milli": 28_800_000 }
                }
            })
        })
        .collect()
}

/// A workout every other day; every third one is still pending a score.
pub fn workouts_every_other_day(from: NaiveDate, days: i64) -> Vec<Value> {
    (0..days)
        .step_by(2)
        .map(|offset| {
            let date = from + Duration::days(offset);
            let mut record = json!({
                "id": offset + 100,
                "user_id": 42,
                "start": format!("{}T17:00:00.000Z", day(date)),
                "end": format!("{}T18:00:00.000Z", day(date)),
                "sport_id": 1,
                "score_state": "SCORED",
            });
            if offset % 3 != 0 {
                record["score"] = json!({ "strain": 10.5, "average_heart_rate": 135 });
            } else {
                record["score_state"] = json!("PENDING_SCORE");
            }
            record
        })
        .collect()
}
