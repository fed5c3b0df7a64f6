use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use crate::utils::time::epoch_seconds;

pub const MODEL_ARTIFACT_SUFFIX: &str = "output/model.tar.gz";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrainingJobStatus {
    InProgress,
    Completed,
    Failed,
    Stopping,
    Stopped,
}

impl TrainingJobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "InProgress",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Stopping => "Stopping",
            Self::Stopped => "Stopped",
        }
    }
}

impl fmt::Display for TrainingJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrainingJobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "InProgress" => Ok(Self::InProgress),
            "Completed" => Ok(Self::Completed),
            "Failed" => Ok(Self::Failed),
            "Stopping" => Ok(Self::Stopping),
            "Stopped" => Ok(Self::Stopped),
            other => Err(format!("Unknown training job status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct MetricDefinition {
    pub name: String,
    pub regex: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct SecondaryStatusTransition {
    pub status: String,
    #[serde(with = "epoch_seconds")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "epoch_seconds")]
    pub end_time: DateTime<Utc>,
    pub status_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct MetricData {
    pub metric_name: String,
    pub value: f64,
    #[serde(with = "epoch_seconds")]
    pub timestamp: DateTime<Utc>,
}

pub static DEFAULT_METRIC_DEFINITION: Lazy<MetricDefinition> = Lazy::new(|| MetricDefinition {
    name: "test:dcg".to_string(),
    regex: "#quality_metric: host=\\S+, test dcg <score>=(\\S+)".to_string(),
});

/// Everything a caller supplies when creating a training job.
///
/// The structured fields are opaque to the registry and are echoed back
/// untouched on describe. `optional` carries any further request members
/// (VpcConfig, Tags, ...) keyed by their wire name.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingJobSpec {
    pub name: String,
    pub role_arn: String,
    pub algorithm_specification: Value,
    pub resource_config: Value,
    pub input_data_config: Option<Value>,
    pub output_data_config: Value,
    pub hyperparameters: Option<Value>,
    pub stopping_condition: Value,
    pub optional: Map<String, Value>,
}

impl TrainingJobSpec {
    pub fn output_s3_path(&self) -> &str {
        self.output_data_config
            .get("S3OutputPath")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingJob {
    pub spec: TrainingJobSpec,
    pub arn: String,
    pub status: TrainingJobStatus,
    pub secondary_status: String,
    pub metric_definitions: Vec<MetricDefinition>,
    pub secondary_status_transitions: Vec<SecondaryStatusTransition>,
    pub final_metrics: Vec<MetricData>,
    pub model_artifacts_path: String,
    pub creation_time: DateTime<Utc>,
    pub training_start_time: DateTime<Utc>,
    pub training_end_time: DateTime<Utc>,
    pub last_modified_time: DateTime<Utc>,
}

impl TrainingJob {
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// The submitted algorithm specification with `MetricDefinitions` filled in.
    ///
    /// Definitions supplied by the caller are kept as-is.
    pub fn described_algorithm_specification(&self) -> Value {
        let mut spec = self.spec.algorithm_specification.clone();
        if let Value::Object(fields) = &mut spec {
            if !fields.contains_key("MetricDefinitions") {
                let definitions = serde_json::to_value(&self.metric_definitions)
                    .unwrap_or_else(|_| Value::Array(Vec::new()));
                fields.insert("MetricDefinitions".to_string(), definitions);
            }
        }
        spec
    }

    pub fn summary(&self) -> TrainingJobSummary {
        TrainingJobSummary {
            training_job_name: self.spec.name.clone(),
            training_job_arn: self.arn.clone(),
            training_job_status: self.status,
            creation_time: self.creation_time,
            training_end_time: self.training_end_time,
            last_modified_time: self.last_modified_time,
        }
    }
}

/// Projection returned by list queries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct TrainingJobSummary {
    pub training_job_name: String,
    pub training_job_arn: String,
    pub training_job_status: TrainingJobStatus,
    #[serde(with = "epoch_seconds")]
    pub creation_time: DateTime<Utc>,
    #[serde(with = "epoch_seconds")]
    pub training_end_time: DateTime<Utc>,
    #[serde(with = "epoch_seconds")]
    pub last_modified_time: DateTime<Utc>,
}

pub fn training_job_arn(region: &str, account_id: &str, name: &str) -> String {
    format!("arn:aws:sagemaker:{}:{}:training-job/{}", region, account_id, name)
}

pub fn model_artifacts_path(output_s3_path: &str, name: &str) -> String {
    format!("{}{}/{}", output_s3_path, name, MODEL_ARTIFACT_SUFFIX)
}
