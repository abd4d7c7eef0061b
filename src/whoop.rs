use crate::config::{Credentials, VendorEndpoints};
use crate::errors::DashboardError;
use crate::models::DateRange;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

const PAGE_LIMIT: u32 = 25;
const USER_AGENT: &str = concat!("whoop_dashboard/", env!("CARGO_PKG_VERSION"));

const PROFILE_ENDPOINT: &str = "v1/user/profile/basic";
const SLEEP_ENDPOINT: &str = "v1/activity/sleep";
const WORKOUT_ENDPOINT: &str = "v1/activity/workout";

#[derive(Serialize)]
struct PasswordGrant<'a> {
    grant_type: &'static str,
    #[serde(rename = "issueRefresh")]
    issue_refresh: bool,
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: Option<TokenUser>,
}

#[derive(Deserialize)]
struct TokenUser {
    id: i64,
}

/// Collection envelope; `next_token` is absent or null on the last page.
#[derive(Deserialize)]
struct Page {
    #[serde(default)]
    records: Vec<Value>,
    #[serde(default, alias = "nextToken")]
    next_token: Option<String>,
}

/// An authenticated WHOOP session.
///
/// The session is released when it is closed or dropped, whichever happens
/// first, so an early return or unwind between `open` and `close` still
/// tears it down.
pub struct WhoopSession {
    client: Option<Client>,
    api_url: String,
    token: String,
    user_id: Option<i64>,
}

impl WhoopSession {
    pub async fn open(
        endpoints: &VendorEndpoints,
        credentials: &Credentials,
    ) -> Result<Self, DashboardError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| DashboardError::Auth(format!("failed to build HTTP client: {err}")))?;

        let grant = PasswordGrant {
            grant_type: "password",
            issue_refresh: false,
            username: &credentials.username,
            password: &credentials.password,
        };
        let response = client
            .post(&endpoints.auth_url)
            .json(&grant)
            .send()
            .await
            .map_err(|err| DashboardError::Auth(format!("failed to reach auth endpoint: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!("WHOOP authentication rejected with status {status}");
            return Err(DashboardError::Auth(format!(
                "WHOOP rejected the credentials (status {status})"
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|err| {
            DashboardError::Auth(format!("failed to parse auth response: {err}"))
        })?;
        let user_id = token.user.map(|user| user.id);
        info!(?user_id, "opened WHOOP session");

        Ok(Self {
            client: Some(client),
            api_url: endpoints.api_url.trim_end_matches('/').to_string(),
            token: token.access_token,
            user_id,
        })
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    pub fn is_open(&self) -> bool {
        self.client.is_some()
    }

    pub async fn profile(&self) -> Result<Value, DashboardError> {
        self.get(PROFILE_ENDPOINT, &[]).await
    }

    pub async fn sleep_collection(&self, range: &DateRange) -> Result<Vec<Value>, DashboardError> {
        self.collection(SLEEP_ENDPOINT, range).await
    }

    pub async fn workout_collection(&self, range: &DateRange) -> Result<Vec<Value>, DashboardError> {
        self.collection(WORKOUT_ENDPOINT, range).await
    }

    pub fn close(mut self) {
        self.release();
    }

    /// Walks every page for `range`; the end date is inclusive. A page token
    /// seen twice fails the fetch instead of looping.
    async fn collection(&self, endpoint: &str, range: &DateRange) -> Result<Vec<Value>, DashboardError> {
        let start = format!("{}T00:00:00.000Z", range.start_str());
        let end = format!("{}T23:59:59.999Z", range.end_str());

        let mut records = Vec::new();
        let mut next_token: Option<String> = None;
        let mut seen_tokens: HashSet<String> = HashSet::new();
        let mut pages = 0usize;
        loop {
            let mut params = vec![
                ("start", start.clone()),
                ("end", end.clone()),
                ("limit", PAGE_LIMIT.to_string()),
            ];
            if let Some(token) = next_token.take() {
                params.push(("nextToken", token));
            }

            let page: Page = self.get(endpoint, &params).await?;
            pages += 1;
            records.extend(page.records);

            match page.next_token.filter(|token| !token.is_empty()) {
                Some(token) if !seen_tokens.insert(token.clone()) => {
                    warn!("{endpoint} repeated page token after {pages} page(s)");
                    return Err(DashboardError::Vendor(format!(
                        "{endpoint} repeated page token '{token}'"
                    )));
                }
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        debug!("{endpoint}: {} records over {pages} page(s) for {range}", records.len());
        Ok(records)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, DashboardError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| DashboardError::Vendor("session is closed".to_string()))?;
        let url = format!("{}/{endpoint}", self.api_url);
        debug!("GET {url}");

        let response = client
            .get(&url)
            .bearer_auth(&self.token)
            .query(params)
            .send()
            .await
            .map_err(|err| DashboardError::Vendor(format!("failed to send request to {endpoint}: {err}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(DashboardError::Auth(format!(
                "access token rejected by {endpoint}"
            )));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(
                "WHOOP request to {endpoint} failed - status: {status}, body_length: {} bytes",
                text.len()
            );
            return Err(DashboardError::Vendor(format!(
                "{endpoint} returned status {status}"
            )));
        }

        response.json().await.map_err(|err| {
            DashboardError::DataFormat(format!("failed to parse {endpoint} response: {err}"))
        })
    }

    fn release(&mut self) {
        if self.client.take().is_some() {
            self.token.clear();
            info!("closed WHOOP session");
        }
    }
}

impl Drop for WhoopSession {
    fn drop(&mut self) {
        self.release();
    }
}
