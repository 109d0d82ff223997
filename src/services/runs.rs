//! Comparison run pipeline
//!
//! Owns the full lifecycle of one run: queued -> processing -> done/failed.
//! Submission creates the record and spawns the processing task; every
//! failure after that point is caught here, written to the record and
//! broadcast to subscribers instead of being thrown back to the caller.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::domain::run::{ComparisonRun, RunEvent, RunOutcome, RunStatus};
use crate::domain::zone::leaf_zones;
use crate::error::RunError;
use crate::services::metrics;
use crate::state::AppState;

/// Validate and submit a new comparison run
///
/// Returns the queued record immediately; processing happens in a
/// background task that this call does not await.
pub async fn submit(
    state: &Arc<AppState>,
    project_id: String,
    t1_scan_id: String,
    t2_scan_id: String,
    voxel_size: f64,
) -> Result<ComparisonRun, RunError> {
    if t1_scan_id.is_empty() || t2_scan_id.is_empty() {
        return Err(RunError::InvalidRequest(
            "t1ScanId and t2ScanId are required".to_string(),
        ));
    }
    if t1_scan_id == t2_scan_id {
        return Err(RunError::InvalidRequest(
            "t1 and t2 must be different scans".to_string(),
        ));
    }

    let run = ComparisonRun::new_queued(project_id, t1_scan_id, t2_scan_id);
    state.runs.create(run.clone()).await;

    state
        .events
        .publish(
            &run.project_id,
            RunEvent::Created {
                run_id: run.id.clone(),
                status: RunStatus::Queued,
            },
        )
        .await;

    info!(run_id = %run.id, project = %run.project_id, "Run submitted");

    // The spawned task is the single owner of this run id from here on
    let state = state.clone();
    let spawned = run.clone();
    tokio::spawn(async move {
        process(state, spawned, voxel_size).await;
    });

    Ok(run)
}

/// Drive one run to a terminal state
///
/// All processing-time failures are absorbed here: the run is marked
/// failed and a run.done event goes out, nothing propagates further.
pub async fn process(state: Arc<AppState>, run: ComparisonRun, voxel_size: f64) {
    let run_id = run.id.clone();
    let project_id = run.project_id.clone();

    match run_pipeline(&state, &run, voxel_size).await {
        Ok(()) => {
            info!(run_id = %run_id, project = %project_id, "Run completed");
        }
        Err(err) => {
            let message = err.to_string();
            warn!(run_id = %run_id, project = %project_id, error = %message, "Run failed");

            if !state.runs.finish_failed(&run_id, message.clone()).await {
                // Nothing left to record into; prior terminal state stays intact
                error!(run_id = %run_id, "Could not record run failure");
            }
            state
                .events
                .publish(
                    &project_id,
                    RunEvent::Done {
                        run_id,
                        status: RunStatus::Failed,
                        error: Some(message),
                    },
                )
                .await;
        }
    }
}

/// The happy-path transition sequence; any error aborts the run
async fn run_pipeline(
    state: &Arc<AppState>,
    run: &ComparisonRun,
    voxel_size: f64,
) -> Result<(), RunError> {
    let run_id = &run.id;
    let project_id = &run.project_id;

    if !state.runs.mark_processing(run_id).await {
        return Err(RunError::Persistence(format!(
            "run {} could not enter processing",
            run_id
        )));
    }
    publish_progress(state, project_id, run_id, 5).await;

    // Resolve both scans before touching the engine
    let t1 = state
        .scans
        .get(&run.t1_scan_id)
        .await
        .ok_or_else(|| RunError::MissingInput(format!("scan {} not found", run.t1_scan_id)))?;
    let t2 = state
        .scans
        .get(&run.t2_scan_id)
        .await
        .ok_or_else(|| RunError::MissingInput(format!("scan {} not found", run.t2_scan_id)))?;

    publish_progress(state, project_id, run_id, 20).await;

    let volumes = state
        .engine
        .compute(
            Path::new(&t1.file_path),
            Path::new(&t2.file_path),
            voxel_size,
        )
        .await
        .map_err(|e| RunError::ComputationFailed(e.reason))?;

    publish_progress(state, project_id, run_id, 75).await;

    let zones = state.zones.list(project_id).await;
    let leaves = leaf_zones(&zones);
    let dist = metrics::distribute(volumes.volume_t1_m3, volumes.volume_t2_m3, &leaves);

    // Best-effort root update; the zone may have been deleted meanwhile
    match state.zones.find_root(project_id).await {
        Some(root) => {
            if !state
                .zones
                .update_completion(&root.id, dist.overall_progress_pct)
                .await
            {
                debug!(run_id = %run_id, zone_id = %root.id, "Root zone vanished, skipping update");
            }
        }
        None => {
            debug!(run_id = %run_id, project = %project_id, "No root zone, skipping update");
        }
    }

    let outcome = RunOutcome {
        confidence: dist.confidence,
        volume_t1_m3: volumes.volume_t1_m3,
        volume_t2_m3: volumes.volume_t2_m3,
        volume_change_m3: volumes.volume_change_m3,
        overall_progress_pct: dist.overall_progress_pct,
        forecast_completion: metrics::forecast_completion(dist.overall_progress_pct),
        metrics_by_zone: dist.per_zone,
    };

    if !state.runs.finish_done(run_id, outcome).await {
        return Err(RunError::Persistence(format!(
            "run {} could not be marked done",
            run_id
        )));
    }

    state
        .events
        .publish(
            project_id,
            RunEvent::Done {
                run_id: run_id.clone(),
                status: RunStatus::Done,
                error: None,
            },
        )
        .await;

    Ok(())
}

async fn publish_progress(state: &Arc<AppState>, project_id: &str, run_id: &str, pct: u8) {
    state
        .events
        .publish(
            project_id,
            RunEvent::Progress {
                run_id: run_id.to_string(),
                status: RunStatus::Processing,
                pct,
            },
        )
        .await;
}
