//! Hevy public API client.
//!
//! ```rust,ignore
//! use ironlog::source::{fetch_all, HevyClient};
//!
//! let client = HevyClient::from_env()?;
//! let workouts = fetch_all(&client, None).await?;
//! ```

use serde::Deserialize;
use serde_json::Value;
use std::env;
use tokio::time::Duration;

use super::{WorkoutPage, WorkoutSource};
use crate::api::logs::{log_warning, LogStage};
use crate::error::SourceError;
use crate::models::{Exercise, Workout, WorkoutSet};
use crate::transform::builder::clean_text;
use crate::transform::dates::normalize_date;

const DEFAULT_BASE_URL: &str = "https://api.hevyapp.com";

/// The API caps page size at 10.
const MAX_PAGE_SIZE: u32 = 10;

/// Default number of retries
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Delay between retries in milliseconds
const RETRY_DELAY_MS: u64 = 1000;

/// Paginated client for `GET /v1/workouts`.
#[derive(Clone)]
pub struct HevyClient {
    api_key: String,
    base_url: String,
    page_size: u32,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ApiPage {
    #[serde(default)]
    page: u32,
    #[serde(default)]
    page_count: u32,
    #[serde(default)]
    workouts: Vec<ApiWorkout>,
}

#[derive(Debug, Deserialize)]
struct ApiWorkout {
    id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    start_time: String,
    #[serde(default)]
    end_time: Option<String>,
    #[serde(default)]
    exercises: Vec<ApiExercise>,
}

#[derive(Debug, Deserialize)]
struct ApiExercise {
    title: String,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default, alias = "supersets_id")]
    superset_id: Option<Value>,
    #[serde(default)]
    sets: Vec<ApiSet>,
}

#[derive(Debug, Deserialize)]
struct ApiSet {
    #[serde(default)]
    index: Option<u32>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    weight_kg: Option<f64>,
    #[serde(default)]
    reps: Option<u32>,
    #[serde(default)]
    distance_meters: Option<f64>,
    #[serde(default)]
    duration_seconds: Option<f64>,
    #[serde(default)]
    rpe: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: String,
}

impl HevyClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: MAX_PAGE_SIZE,
            http: reqwest::Client::new(),
        }
    }

    /// Create a client from `HEVY_API_KEY` (and optionally `HEVY_API_URL`).
    pub fn from_env() -> Result<Self, SourceError> {
        let _ = dotenvy::dotenv();

        let api_key = env::var("HEVY_API_KEY")
            .map_err(|_| SourceError::MissingApiKey("HEVY_API_KEY not set".to_string()))?;

        let client = Self::new(api_key);
        Ok(match env::var("HEVY_API_URL") {
            Ok(url) if !url.trim().is_empty() => client.with_base_url(&url),
            _ => client,
        })
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Clamped to the API's 1..=10 range.
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    async fn request_page(&self, page: u32) -> Result<String, SourceError> {
        let response = self
            .http
            .get(format!("{}/v1/workouts", self.base_url))
            .query(&[("page", page), ("pageSize", self.page_size)])
            .header("api-key", &self.api_key)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| SourceError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(SourceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}

impl WorkoutSource for HevyClient {
    async fn fetch_page(&self, page: u32) -> Result<WorkoutPage, SourceError> {
        let mut last_error = None;

        for attempt in 1..=DEFAULT_MAX_RETRIES {
            match self.request_page(page).await {
                Ok(body) => return parse_page(&body),
                Err(e) if is_retryable(&e) => {
                    log_warning(
                        LogStage::Fetch,
                        format!(
                            "Page {} attempt {}/{} failed: {}",
                            page, attempt, DEFAULT_MAX_RETRIES, e
                        ),
                    );
                    last_error = Some(e);
                    if attempt < DEFAULT_MAX_RETRIES {
                        tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| SourceError::RequestFailed("unknown error".to_string())))
    }
}

fn is_retryable(err: &SourceError) -> bool {
    match err {
        SourceError::RequestFailed(_) => true,
        SourceError::Api { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}

/// Decode one API page into the shared model.
fn parse_page(body: &str) -> Result<WorkoutPage, SourceError> {
    let page: ApiPage =
        serde_json::from_str(body).map_err(|e| SourceError::InvalidJson(e.to_string()))?;

    let workouts = page
        .workouts
        .into_iter()
        .map(convert_workout)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(WorkoutPage {
        page: page.page,
        page_count: page.page_count,
        workouts,
    })
}

fn convert_workout(api: ApiWorkout) -> Result<Workout, SourceError> {
    let start = normalize_date(&api.start_time)
        .into_result()
        .map_err(|e| SourceError::InvalidJson(format!("workout {}: {}", api.id, e)))?;

    let mut workout = Workout::new(api.id, api.title, start.timestamp());
    workout.end_time = api
        .end_time
        .as_deref()
        .and_then(|t| normalize_date(t).into_result().ok())
        .map(|dt| dt.timestamp());
    workout.description = api.description.as_deref().and_then(clean_text);

    for api_exercise in api.exercises {
        let exercise = workout.exercise_mut(&api_exercise.title);
        if exercise.sets.is_empty() {
            exercise.notes = api_exercise.notes.as_deref().and_then(clean_text);
            exercise.superset_id = api_exercise.superset_id.and_then(superset_label);
        }
        exercise.sets.extend(api_exercise.sets.into_iter().map(convert_set));
    }

    workout.estimated_volume_kg = workout.sets().filter_map(|(_, s)| s.volume()).sum();
    if workout.exercises.iter().any(|e: &Exercise| e.sets.is_empty()) {
        log_warning(
            LogStage::Fetch,
            format!("Workout '{}' has exercises without sets", workout.title),
        );
    }

    Ok(workout)
}

fn convert_set(api: ApiSet) -> WorkoutSet {
    WorkoutSet {
        index: api.index,
        kind: api.kind.as_deref().and_then(clean_text),
        weight_kg: api.weight_kg,
        reps: api.reps,
        distance_km: api.distance_meters.map(|m| m / 1000.0),
        duration_seconds: api.duration_seconds,
        rpe: api.rpe,
    }
}

fn superset_label(value: Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => clean_text(&s),
        _ => None,
    }
}
