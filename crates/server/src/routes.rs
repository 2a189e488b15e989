//! API route handlers

use crate::store::SearchOptions;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use tunecast_cache::{BestMethodSelector, BestSelection, CacheError, MethodCandidate};
use tunecast_jobs::Job;
use tuner_facade::{CompositeWeights, Frequency, TuningMethod};
use uuid::Uuid;

/// Error response structure.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = match self.code.as_str() {
            "BAD_REQUEST" => StatusCode::BAD_REQUEST,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> ErrorResponse {
    ErrorResponse {
        error: message.into(),
        code: "BAD_REQUEST".to_string(),
    }
}

fn not_found(message: impl Into<String>) -> ErrorResponse {
    ErrorResponse {
        error: message.into(),
        code: "NOT_FOUND".to_string(),
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchSubmission {
    /// One entry per sku to tune
    pub items: Vec<SearchItem>,
    /// Restrict to these models; omitted means the whole catalog
    #[serde(default)]
    pub model_ids: Option<Vec<String>>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub seasonal_period: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub sku: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub batch_id: String,
    pub total: usize,
    pub job_ids: Vec<String>,
}

/// Enqueue one tuning job per (sku, model) pair.
pub async fn submit_searches(
    State(state): State<AppState>,
    Json(submission): Json<SearchSubmission>,
) -> Result<impl IntoResponse, ErrorResponse> {
    if submission.items.is_empty() {
        return Err(bad_request("submission contains no items"));
    }

    let model_ids: Vec<String> = match &submission.model_ids {
        Some(ids) => {
            if ids.is_empty() {
                return Err(bad_request("model_ids must not be empty when given"));
            }
            for id in ids {
                if !state.registry.contains(id) {
                    return Err(bad_request(format!("unknown model '{id}'")));
                }
            }
            ids.clone()
        }
        None => state.registry.ids().map(String::from).collect(),
    };

    let frequency = match &submission.frequency {
        Some(raw) => Some(raw.parse::<Frequency>().map_err(bad_request)?),
        None => None,
    };

    let batch_id = Uuid::new_v4().to_string();
    state.batches.insert(
        batch_id.clone(),
        SearchOptions {
            frequency,
            seasonal_period: submission.seasonal_period,
        },
    );

    let mut job_ids = Vec::with_capacity(submission.items.len() * model_ids.len());
    for item in &submission.items {
        state
            .hashes
            .insert(item.sku.clone(), tunecast_cache::series_hash(&item.values));
        state
            .series
            .insert(item.sku.clone(), std::sync::Arc::new(item.values.clone()));
        for model_id in &model_ids {
            let job = Job::new(
                Uuid::new_v4().to_string(),
                &item.sku,
                model_id,
                TuningMethod::Grid,
                &batch_id,
            );
            job_ids.push(job.id.clone());
            state.jobs.enqueue(job).await;
        }
    }

    info!(batch = %batch_id, jobs = job_ids.len(), "queued search batch");
    Ok((
        StatusCode::ACCEPTED,
        Json(SubmissionResponse {
            batch_id,
            total: job_ids.len(),
            job_ids,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct JobsResponse {
    pub total: usize,
    pub jobs: Vec<Job>,
}

/// Job feed: every job, oldest first, in the `{ total, jobs }` envelope.
pub async fn list_jobs(State(state): State<AppState>) -> Json<JobsResponse> {
    let jobs = state.jobs.snapshot();
    Json(JobsResponse {
        total: jobs.len(),
        jobs,
    })
}

/// Cancel a queued or running job. Finished jobs are left untouched.
pub async fn cancel_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Job>, ErrorResponse> {
    match state.jobs.cancel(&id) {
        Some(job) => Ok(Json(job)),
        None => Err(not_found(format!("no job '{id}'"))),
    }
}

#[derive(Debug, Deserialize)]
pub struct BestResultsQuery {
    pub sku: String,
    /// Composite score weights; leaving all unset scores by accuracy alone
    pub accuracy: Option<f64>,
    pub mape: Option<f64>,
    pub rmse: Option<f64>,
    pub mae: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct BestResultsResponse {
    pub sku: String,
    pub best: BestSelection,
    pub results: Vec<MethodCandidate>,
}

/// Best cached record per model for a sku, scored with caller weights.
pub async fn best_results(
    State(state): State<AppState>,
    Query(query): Query<BestResultsQuery>,
) -> Result<Json<BestResultsResponse>, ErrorResponse> {
    let hash = match state.hashes.get(&query.sku) {
        Some(hash) => hash.clone(),
        None => {
            return Err(not_found(format!(
                "no series submitted for '{}'",
                query.sku
            )))
        }
    };

    let selector = match weights_from(&query) {
        Some(weights) => BestMethodSelector::with_weights(weights),
        None => BestMethodSelector::new(),
    };
    let best = selector
        .select(&state.cache, &query.sku, &hash)
        .map_err(|err| match err {
            CacheError::NoValidRecord(_) | CacheError::UnknownEntry { .. } => {
                not_found(err.to_string())
            }
        })?;
    let results = state.cache.candidates(&query.sku, &hash);

    Ok(Json(BestResultsResponse {
        sku: query.sku,
        best,
        results,
    }))
}

fn weights_from(query: &BestResultsQuery) -> Option<CompositeWeights> {
    if query.accuracy.is_none() && query.mape.is_none() && query.rmse.is_none() && query.mae.is_none()
    {
        return None;
    }
    let defaults = CompositeWeights::default();
    Some(CompositeWeights {
        accuracy: query.accuracy.unwrap_or(defaults.accuracy),
        mape: query.mape.unwrap_or(defaults.mape),
        rmse: query.rmse.unwrap_or(defaults.rmse),
        mae: query.mae.unwrap_or(defaults.mae),
    })
}
