use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use crate::core::error::RegistryError;
use crate::core::job::*;
use crate::core::query::{ListQuery, SortBy, SortOrder};
use crate::utils::time::epoch_seconds;

/// Request members beyond the core contract that are stored and echoed verbatim.
pub const OPTIONAL_CREATE_MEMBERS: &[&str] = &[
    "VpcConfig",
    "EnableNetworkIsolation",
    "EnableInterContainerTrafficEncryption",
    "EnableManagedSpotTraining",
    "CheckpointConfig",
    "DebugHookConfig",
    "TensorBoardOutputConfig",
    "ExperimentConfig",
    "Tags",
];

const MAX_JOB_NAME_LEN: usize = 63;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    ResourceInUse(String),

    #[error("{0}")]
    ResourceNotFound(String),

    #[error("Unsupported action: {0}")]
    InvalidAction(String),

    #[error("{0}")]
    InternalFailure(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationException",
            Self::ResourceInUse(_) => "ResourceInUse",
            Self::ResourceNotFound(_) => "ResourceNotFound",
            Self::InvalidAction(_) => "InvalidAction",
            Self::InternalFailure(_) => "InternalFailure",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::InternalFailure(_) => 500,
            _ => 400,
        }
    }

    pub fn to_body(&self, request_id: String) -> ErrorBody {
        ErrorBody {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
            },
            response_metadata: ResponseMetadata {
                request_id,
                http_status_code: self.http_status(),
            },
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::AlreadyExists { .. } => Self::ResourceInUse(err.to_string()),
            RegistryError::NotFound { .. } => Self::ResourceNotFound(err.to_string()),
            RegistryError::Poisoned => Self::InternalFailure(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseMetadata {
    pub request_id: String,
    #[serde(rename = "HTTPStatusCode")]
    pub http_status_code: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorBody {
    pub error: ErrorDetail,
    pub response_metadata: ResponseMetadata,
}

/// One line of a replay script.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ApiCall {
    pub action: String,
    #[serde(default = "empty_params")]
    pub params: Value,
}

fn empty_params() -> Value {
    Value::Object(Map::new())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CreateTrainingJobRequest {
    pub training_job_name: String,
    pub role_arn: String,
    pub algorithm_specification: Value,
    pub resource_config: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_data_config: Option<Value>,
    pub output_data_config: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hyper_parameters: Option<Value>,
    pub stopping_condition: Value,
    #[serde(flatten)]
    pub optional: Map<String, Value>,
}

fn validate_job_name(name: &str) -> Result<(), ApiError> {
    let bytes = name.as_bytes();
    let well_formed = !bytes.is_empty()
        && bytes.len() <= MAX_JOB_NAME_LEN
        && bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
        && bytes[0].is_ascii_alphanumeric()
        && bytes[bytes.len() - 1].is_ascii_alphanumeric();
    if well_formed {
        Ok(())
    } else {
        Err(ApiError::Validation(format!(
            "Value '{}' at 'trainingJobName' failed to satisfy constraint: Member must satisfy regular expression pattern: ^[a-zA-Z0-9](-*[a-zA-Z0-9]){{0,62}}",
            name
        )))
    }
}

fn require_object(value: &Value, member: &str) -> Result<(), ApiError> {
    if value.is_object() {
        Ok(())
    } else {
        Err(ApiError::Validation(format!("{} must be a structure", member)))
    }
}

impl CreateTrainingJobRequest {
    pub fn into_spec(self) -> Result<TrainingJobSpec, ApiError> {
        validate_job_name(&self.training_job_name)?;
        if self.role_arn.is_empty() {
            return Err(ApiError::Validation("RoleArn must not be empty".to_string()));
        }
        require_object(&self.algorithm_specification, "AlgorithmSpecification")?;
        require_object(&self.resource_config, "ResourceConfig")?;
        require_object(&self.output_data_config, "OutputDataConfig")?;
        require_object(&self.stopping_condition, "StoppingCondition")?;
        if let Some(channels) = &self.input_data_config {
            if !channels.is_array() {
                return Err(ApiError::Validation("InputDataConfig must be a list".to_string()));
            }
        }
        if let Some(hyper_parameters) = &self.hyper_parameters {
            let all_strings = hyper_parameters
                .as_object()
                .is_some_and(|map| map.values().all(Value::is_string));
            if !all_strings {
                return Err(ApiError::Validation(
                    "HyperParameters must be a map of string to string".to_string(),
                ));
            }
        }
        match self.output_data_config.get("S3OutputPath").and_then(Value::as_str) {
            Some(path) if path.starts_with("s3://") => {},
            _ => {
                return Err(ApiError::Validation(
                    "OutputDataConfig.S3OutputPath must be an s3:// URI".to_string(),
                ))
            }
        }
        if let Some(unknown) = self.optional.keys().find(|k| !OPTIONAL_CREATE_MEMBERS.contains(&k.as_str())) {
            return Err(ApiError::Validation(format!("Unknown parameter in input: \"{}\"", unknown)));
        }

        Ok(TrainingJobSpec {
            name: self.training_job_name,
            role_arn: self.role_arn,
            algorithm_specification: self.algorithm_specification,
            resource_config: self.resource_config,
            input_data_config: self.input_data_config,
            output_data_config: self.output_data_config,
            hyperparameters: self.hyper_parameters,
            stopping_condition: self.stopping_condition,
            optional: self.optional,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CreateTrainingJobResponse {
    pub training_job_arn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeTrainingJobRequest {
    pub training_job_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ModelArtifacts {
    pub s3_model_artifacts: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeTrainingJobResponse {
    pub training_job_name: String,
    pub training_job_arn: String,
    pub model_artifacts: ModelArtifacts,
    pub training_job_status: TrainingJobStatus,
    pub secondary_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hyper_parameters: Option<Value>,
    pub algorithm_specification: Value,
    pub role_arn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_data_config: Option<Value>,
    pub output_data_config: Value,
    pub resource_config: Value,
    pub stopping_condition: Value,
    #[serde(with = "epoch_seconds")]
    pub creation_time: DateTime<Utc>,
    #[serde(with = "epoch_seconds")]
    pub training_start_time: DateTime<Utc>,
    #[serde(with = "epoch_seconds")]
    pub training_end_time: DateTime<Utc>,
    #[serde(with = "epoch_seconds")]
    pub last_modified_time: DateTime<Utc>,
    pub secondary_status_transitions: Vec<SecondaryStatusTransition>,
    pub final_metric_data_list: Vec<MetricData>,
    #[serde(flatten)]
    pub optional: Map<String, Value>,
}

impl From<TrainingJob> for DescribeTrainingJobResponse {
    fn from(job: TrainingJob) -> Self {
        let algorithm_specification = job.described_algorithm_specification();
        Self {
            training_job_name: job.spec.name,
            training_job_arn: job.arn,
            model_artifacts: ModelArtifacts { s3_model_artifacts: job.model_artifacts_path },
            training_job_status: job.status,
            secondary_status: job.secondary_status,
            hyper_parameters: job.spec.hyperparameters,
            algorithm_specification,
            role_arn: job.spec.role_arn,
            input_data_config: job.spec.input_data_config,
            output_data_config: job.spec.output_data_config,
            resource_config: job.spec.resource_config,
            stopping_condition: job.spec.stopping_condition,
            creation_time: job.creation_time,
            training_start_time: job.training_start_time,
            training_end_time: job.training_end_time,
            last_modified_time: job.last_modified_time,
            secondary_status_transitions: job.secondary_status_transitions,
            final_metric_data_list: job.final_metrics,
            optional: job.spec.optional,
        }
    }
}

/// Filters for `ListTrainingJobs`. Unknown members are rejected so a misspelled
/// filter cannot silently widen the result set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ListTrainingJobsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_contains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_equals: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "epoch_seconds::option")]
    pub creation_time_before: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "epoch_seconds::option")]
    pub creation_time_after: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "epoch_seconds::option")]
    pub last_modified_time_before: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "epoch_seconds::option")]
    pub last_modified_time_after: Option<DateTime<Utc>>,
    /// Accepted for client compatibility; results are never paginated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<Value>,
}

impl ListTrainingJobsRequest {
    pub fn into_query(self) -> Result<ListQuery, ApiError> {
        let status_equals = self
            .status_equals
            .map(|s| s.parse::<TrainingJobStatus>())
            .transpose()
            .map_err(ApiError::Validation)?;
        let sort_by = self
            .sort_by
            .map(|s| s.parse::<SortBy>())
            .transpose()
            .map_err(ApiError::Validation)?
            .unwrap_or_default();
        let sort_order = self
            .sort_order
            .map(|s| s.parse::<SortOrder>())
            .transpose()
            .map_err(ApiError::Validation)?
            .unwrap_or_default();

        Ok(ListQuery {
            name_contains: self.name_contains,
            status_equals,
            creation_time_before: self.creation_time_before,
            creation_time_after: self.creation_time_after,
            last_modified_time_before: self.last_modified_time_before,
            last_modified_time_after: self.last_modified_time_after,
            sort_by,
            sort_order,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ListTrainingJobsResponse {
    pub training_job_summaries: Vec<TrainingJobSummary>,
}
