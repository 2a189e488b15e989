//! Background worker executing queued tuning jobs.

use crate::AppState;
use std::sync::Arc;
use tracing::{info, warn};
use tunecast_cache::MethodRecord;
use tunecast_jobs::Job;
use tuner_facade::progress;
use tuner_facade::{
    GridOptimizer, Result as TuneResult, SearchRequest, SearchSummary, ValidationEngine,
    ValidationMetrics, ValidationScore,
};

pub fn spawn(state: AppState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(run(state))
}

async fn run(state: AppState) {
    info!("search worker started");
    loop {
        let job = state.jobs.next_claimed().await;
        info!(
            job = %job.id,
            sku = %job.entity_sku,
            model = %job.model_id,
            "claimed tuning job"
        );
        execute(&state, &job).await;
    }
}

async fn execute(state: &AppState, job: &Job) {
    let series = match state.series.get(&job.entity_sku) {
        Some(series) => Arc::clone(series.value()),
        None => {
            let message = format!("no series submitted for '{}'", job.entity_sku);
            state.jobs.fail(&job.id, message);
            return;
        }
    };
    let options = state
        .batches
        .get(&job.batch_id)
        .map(|options| *options.value())
        .unwrap_or_default();

    // Progress events come from a synchronous search thread; a second
    // blocking task forwards them into the job record as they arrive.
    let (progress, progress_rx) = progress::channel();
    let jobs = Arc::clone(&state.jobs);
    let progress_job = job.id.clone();
    let drain = tokio::task::spawn_blocking(move || {
        for event in progress_rx.iter() {
            jobs.set_progress(&progress_job, event.percent);
        }
    });

    let registry = Arc::clone(&state.registry);
    let model_id = job.model_id.clone();
    let search_series = Arc::clone(&series);
    let search = tokio::task::spawn_blocking(
        move || -> TuneResult<(SearchSummary, Option<ValidationScore>)> {
            let mut request = SearchRequest::new().models(vec![model_id]);
            if let Some(frequency) = options.frequency {
                request = request.frequency(frequency);
            }
            if let Some(period) = options.seasonal_period {
                request = request.seasonal_period(period);
            }
            let optimizer = GridOptimizer::new(&registry);
            let summary = optimizer.run_with_progress(&search_series, &request, Some(&progress))?;
            let score = summary.best.as_ref().map(|best| {
                ValidationEngine::default().walk_forward_score(
                    &registry,
                    &best.model_id,
                    &best.parameters,
                    &search_series,
                    summary.seasonal_period,
                )
            });
            Ok((summary, score))
        },
    );

    let outcome = search.await;
    let _ = drain.await;

    match outcome {
        Ok(Ok((summary, score))) => {
            record_best(state, job, &summary, score);
            let result = serde_json::to_value(&summary).unwrap_or(serde_json::Value::Null);
            state.jobs.complete(&job.id, result);
            info!(
                job = %job.id,
                evaluated = summary.stats.evaluated,
                best_accuracy = summary.stats.best_accuracy,
                "tuning job completed"
            );
        }
        Ok(Err(err)) => {
            warn!(job = %job.id, "tuning job failed: {err}");
            state.jobs.fail(&job.id, err.to_string());
        }
        Err(join_err) => {
            warn!(job = %job.id, "search task aborted: {join_err}");
            state.jobs.fail(&job.id, format!("search task aborted: {join_err}"));
        }
    }
}

/// Persist the winning parameters so later lookups and best-method
/// selection can reuse them without re-searching.
fn record_best(
    state: &AppState,
    job: &Job,
    summary: &SearchSummary,
    score: Option<ValidationScore>,
) {
    let best = match &summary.best {
        Some(best) => best,
        None => return,
    };
    let hash = match state.hashes.get(&job.entity_sku) {
        Some(hash) => hash.clone(),
        None => return,
    };
    let metrics = ValidationMetrics {
        accuracy: best.accuracy,
        mape: best.mape,
        rmse: best.rmse,
        mae: best.mae,
    };
    let confidence = score.map(|s| s.confidence).unwrap_or(0.0);
    let record = MethodRecord::new(best.parameters.clone(), hash, metrics, confidence)
        .with_reasoning(format!(
            "grid search over {} combinations",
            summary.stats.evaluated
        ));
    state
        .cache
        .store(&job.entity_sku, &job.model_id, job.method, record);
}
