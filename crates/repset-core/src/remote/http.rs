//! HTTP client for the hosted workout store

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::models::RemoteWorkout;

use super::{RemoteError, RemoteResult, RemoteStore, WorkoutPayload};

/// JSON client for the workout store REST API
#[derive(Clone)]
pub struct HttpRemoteStore {
    base_url: String,
    client: reqwest::Client,
    auth_token: Option<String>,
}

impl HttpRemoteStore {
    /// Create a client for the given API base URL
    ///
    /// `timeout` bounds every request, keeping `log_workout`'s immediate
    /// submission attempt from blocking indefinitely.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> RemoteResult<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        Ok(Self {
            base_url,
            client: reqwest::Client::builder().timeout(timeout).build()?,
            auth_token: None,
        })
    }

    /// Attach a bearer token to every request
    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{path}", self.base_url))
            .header("Accept", "application/json");
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn submit(&self, user_id: &str, payload: &WorkoutPayload) -> RemoteResult<i64> {
        let path = format!("/v1/users/{}/workouts", urlencoding::encode(user_id));
        let response = self
            .request(reqwest::Method::POST, &path)
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Api(parse_api_error(status, &body)));
        }

        let accepted = response.json::<SubmitResponse>().await?;
        accepted.id.or(accepted.workout_id).ok_or_else(|| {
            RemoteError::InvalidPayload("response did not include id/workout_id".to_string())
        })
    }

    async fn recent_workouts(&self, user_id: &str) -> RemoteResult<Vec<RemoteWorkout>> {
        let path = format!("/v1/users/{}/workouts/recent", urlencoding::encode(user_id));
        let response = self.request(reqwest::Method::GET, &path).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Api(parse_api_error(status, &body)));
        }

        let listing = response.json::<RecentWorkoutsResponse>().await?;
        Ok(listing.workouts)
    }

    async fn update(&self, workout_id: i64, payload: &WorkoutPayload) -> RemoteResult<()> {
        let path = format!("/v1/workouts/{workout_id}");
        let response = self
            .request(reqwest::Method::PATCH, &path)
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Api(parse_api_error(status, &body)));
        }

        Ok(())
    }

    async fn ping(&self) -> bool {
        self.request(reqwest::Method::GET, "/health")
            .send()
            .await
            .is_ok_and(|response| response.status().is_success())
    }
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: Option<i64>,
    workout_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RecentWorkoutsResponse {
    workouts: Vec<RemoteWorkout>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn normalize_base_url(raw: String) -> RemoteResult<String> {
    let base_url = raw.trim();
    if base_url.is_empty() {
        return Err(RemoteError::InvalidPayload(
            "base URL must not be empty".to_string(),
        ));
    }
    if base_url.starts_with("http://") || base_url.starts_with("https://") {
        Ok(base_url.trim_end_matches('/').to_string())
    } else {
        Err(RemoteError::InvalidPayload(
            "base URL must include http:// or https://".to_string(),
        ))
    }
}
