use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use log::{debug, info};
use crate::core::clock::{Clock, MonotonicClock};
use crate::core::error::{RegistryError, RegistryResult};
use crate::core::job::*;
use crate::core::query::ListQuery;

struct RegistryState {
    jobs: HashMap<String, TrainingJob>,
    clock: MonotonicClock,
}

/// In-memory store of training jobs for a single account and region.
///
/// Creates hold the write lock across the name check, the clock tick and the
/// insert; describe and list read a consistent snapshot under the read lock.
pub struct TrainingJobRegistry {
    region: String,
    account_id: String,
    state: RwLock<RegistryState>,
}

impl TrainingJobRegistry {
    pub fn new(region: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self::with_clock(region, account_id, MonotonicClock::default())
    }

    pub fn with_clock_source(
        region: impl Into<String>,
        account_id: impl Into<String>,
        source: Box<dyn Clock>,
    ) -> Self {
        Self::with_clock(region, account_id, MonotonicClock::new(source))
    }

    fn with_clock(region: impl Into<String>, account_id: impl Into<String>, clock: MonotonicClock) -> Self {
        Self {
            region: region.into(),
            account_id: account_id.into(),
            state: RwLock::new(RegistryState {
                jobs: HashMap::new(),
                clock,
            }),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    fn read(&self) -> RegistryResult<RwLockReadGuard<'_, RegistryState>> {
        self.state.read().map_err(|_| RegistryError::Poisoned)
    }

    fn write(&self) -> RegistryResult<RwLockWriteGuard<'_, RegistryState>> {
        self.state.write().map_err(|_| RegistryError::Poisoned)
    }

    pub fn create(&self, spec: TrainingJobSpec) -> RegistryResult<TrainingJob> {
        let mut state = self.write()?;
        if state.jobs.contains_key(&spec.name) {
            return Err(RegistryError::AlreadyExists { name: spec.name });
        }

        let now = state.clock.tick();
        let job = TrainingJob {
            arn: training_job_arn(&self.region, &self.account_id, &spec.name),
            model_artifacts_path: model_artifacts_path(spec.output_s3_path(), &spec.name),
            status: TrainingJobStatus::Completed,
            secondary_status: TrainingJobStatus::Completed.to_string(),
            metric_definitions: vec![DEFAULT_METRIC_DEFINITION.clone()],
            secondary_status_transitions: vec![SecondaryStatusTransition {
                status: TrainingJobStatus::Completed.to_string(),
                start_time: now,
                end_time: now,
                status_message: "Training job completed".to_string(),
            }],
            final_metrics: vec![MetricData {
                metric_name: "train:progress".to_string(),
                value: 100.0,
                timestamp: now,
            }],
            creation_time: now,
            training_start_time: now,
            training_end_time: now,
            last_modified_time: now,
            spec,
        };

        info!("Created training job {} at {}", job.arn, job.creation_time);
        state.jobs.insert(job.spec.name.clone(), job.clone());
        Ok(job)
    }

    pub fn describe(&self, name: &str) -> RegistryResult<TrainingJob> {
        let state = self.read()?;
        state
            .jobs
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound { name: name.to_string() })
    }

    pub fn list(&self, query: &ListQuery) -> RegistryResult<Vec<TrainingJobSummary>> {
        let state = self.read()?;
        let mut matching: Vec<&TrainingJob> = state
            .jobs
            .values()
            .filter(|job| query.matches(job))
            .collect();
        matching.sort_by(|a, b| query.compare(a, b));
        debug!("List query {:?} matched {} of {} training jobs", query, matching.len(), state.jobs.len());
        Ok(matching.into_iter().map(TrainingJob::summary).collect())
    }

    pub fn len(&self) -> RegistryResult<usize> {
        Ok(self.read()?.jobs.len())
    }

    pub fn is_empty(&self) -> RegistryResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Drop every job. The clock keeps its high-water mark.
    pub fn reset(&self) -> RegistryResult<()> {
        let mut state = self.write()?;
        info!("Resetting registry with {} training jobs", state.jobs.len());
        state.jobs.clear();
        Ok(())
    }
}
