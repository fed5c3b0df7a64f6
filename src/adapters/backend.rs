use async_trait::async_trait;
use log::{debug, error, info};
use mockall::automock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use crate::adapters::api::*;
use crate::core::registry::TrainingJobRegistry;
use crate::utils::lib::BackendConfig;

/// Client-facing SageMaker training job operations.
#[automock]
#[async_trait]
pub trait SageMakerApi: Send + Sync {
    async fn create_training_job(
        &self,
        request: CreateTrainingJobRequest,
    ) -> Result<CreateTrainingJobResponse, ApiError>;

    async fn describe_training_job(
        &self,
        request: DescribeTrainingJobRequest,
    ) -> Result<DescribeTrainingJobResponse, ApiError>;

    async fn list_training_jobs(
        &self,
        request: ListTrainingJobsRequest,
    ) -> Result<ListTrainingJobsResponse, ApiError>;
}

/// Registry-backed implementation of [`SageMakerApi`].
pub struct SageMakerBackend {
    registry: TrainingJobRegistry,
}

impl SageMakerBackend {
    pub fn new(config: &BackendConfig) -> Self {
        Self::with_registry(TrainingJobRegistry::new(config.region.clone(), config.account_id.clone()))
    }

    pub fn with_registry(registry: TrainingJobRegistry) -> Self {
        info!(
            "Starting SageMaker backend for account {} in {}",
            registry.account_id(),
            registry.region()
        );
        Self { registry }
    }

    pub fn registry(&self) -> &TrainingJobRegistry {
        &self.registry
    }
}

#[async_trait]
impl SageMakerApi for SageMakerBackend {
    async fn create_training_job(
        &self,
        request: CreateTrainingJobRequest,
    ) -> Result<CreateTrainingJobResponse, ApiError> {
        let spec = request.into_spec()?;
        let job = self.registry.create(spec)?;
        Ok(CreateTrainingJobResponse { training_job_arn: job.arn })
    }

    async fn describe_training_job(
        &self,
        request: DescribeTrainingJobRequest,
    ) -> Result<DescribeTrainingJobResponse, ApiError> {
        let job = self.registry.describe(&request.training_job_name)?;
        Ok(job.into())
    }

    async fn list_training_jobs(
        &self,
        request: ListTrainingJobsRequest,
    ) -> Result<ListTrainingJobsResponse, ApiError> {
        let query = request.into_query()?;
        let training_job_summaries = self.registry.list(&query)?;
        Ok(ListTrainingJobsResponse { training_job_summaries })
    }
}

/// Result of one dispatched call, as written to the replay output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ApiOutcome {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl ApiOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, ApiError> {
    serde_json::from_value(params).map_err(|e| ApiError::Validation(e.to_string()))
}

fn with_metadata<T: Serialize>(body: T, request_id: &str) -> Result<Value, ApiError> {
    let mut value = serde_json::to_value(body).map_err(|e| ApiError::InternalFailure(e.to_string()))?;
    let metadata = ResponseMetadata {
        request_id: request_id.to_string(),
        http_status_code: 200,
    };
    let metadata = serde_json::to_value(metadata).map_err(|e| ApiError::InternalFailure(e.to_string()))?;
    if let Value::Object(fields) = &mut value {
        fields.insert("ResponseMetadata".to_string(), metadata);
    }
    Ok(value)
}

/// Route a named action to the matching [`SageMakerApi`] operation.
///
/// Accepts both the bare action name and the `SageMaker.<Action>` target form.
pub async fn dispatch<A: SageMakerApi + ?Sized>(api: &A, call: ApiCall) -> ApiOutcome {
    let request_id = Uuid::new_v4().to_string();
    let action = call.action.strip_prefix("SageMaker.").unwrap_or(&call.action).to_string();
    debug!("Dispatching {} ({})", action, request_id);

    let result = match action.as_str() {
        "CreateTrainingJob" => match parse_params(call.params) {
            Ok(request) => api.create_training_job(request).await.and_then(|r| with_metadata(r, &request_id)),
            Err(e) => Err(e),
        },
        "DescribeTrainingJob" => match parse_params(call.params) {
            Ok(request) => api.describe_training_job(request).await.and_then(|r| with_metadata(r, &request_id)),
            Err(e) => Err(e),
        },
        "ListTrainingJobs" => match parse_params(call.params) {
            Ok(request) => api.list_training_jobs(request).await.and_then(|r| with_metadata(r, &request_id)),
            Err(e) => Err(e),
        },
        other => Err(ApiError::InvalidAction(other.to_string())),
    };

    match result {
        Ok(response) => ApiOutcome { action, response: Some(response), error: None },
        Err(e) => {
            error!("{} failed with {}: {}", action, e.code(), e);
            ApiOutcome { action, response: None, error: Some(e.to_body(request_id)) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_call(name: &str) -> ApiCall {
        ApiCall {
            action: "CreateTrainingJob".to_string(),
            params: json!({
                "TrainingJobName": name,
                "RoleArn": "arn:aws:iam::123456789012:role/FakeRole",
                "AlgorithmSpecification": {"TrainingImage": "image:1", "TrainingInputMode": "File"},
                "ResourceConfig": {"InstanceCount": 1, "InstanceType": "ml.c4.2xlarge", "VolumeSizeInGB": 10},
                "OutputDataConfig": {"S3OutputPath": "s3://my-bucket/prefix/"},
                "StoppingCondition": {"MaxRuntimeInSeconds": 3600},
            }),
        }
    }

    #[tokio::test]
    async fn create_response_carries_arn_and_metadata() {
        let backend = SageMakerBackend::new(&BackendConfig::default());
        let outcome = dispatch(&backend, create_call("MyTrainingJob")).await;
        let response = outcome.response.unwrap();
        assert_eq!(
            response["TrainingJobArn"],
            "arn:aws:sagemaker:us-east-1:123456789012:training-job/MyTrainingJob"
        );
        assert_eq!(response["ResponseMetadata"]["HTTPStatusCode"], 200);
    }

    #[tokio::test]
    async fn duplicate_create_reports_resource_in_use() {
        let backend = SageMakerBackend::new(&BackendConfig::default());
        assert!(dispatch(&backend, create_call("Dup")).await.is_success());
        let outcome = dispatch(&backend, create_call("Dup")).await;
        assert_eq!(outcome.error.unwrap().error.code, "ResourceInUse");
    }

    #[tokio::test]
    async fn target_prefix_and_unknown_actions() {
        let backend = SageMakerBackend::new(&BackendConfig::default());
        let mut call = create_call("Prefixed");
        call.action = "SageMaker.CreateTrainingJob".to_string();
        let outcome = dispatch(&backend, call).await;
        assert_eq!(outcome.action, "CreateTrainingJob");
        assert!(outcome.is_success());

        let unknown = ApiCall { action: "DeleteTrainingJob".to_string(), params: json!({}) };
        let outcome = dispatch(&backend, unknown).await;
        assert_eq!(outcome.error.unwrap().error.code, "InvalidAction");
    }

    #[tokio::test]
    async fn malformed_params_never_reach_the_api() {
        let mut api = MockSageMakerApi::new();
        api.expect_describe_training_job().never();
        let call = ApiCall { action: "DescribeTrainingJob".to_string(), params: json!({"Name": 1}) };
        let outcome = dispatch(&api, call).await;
        assert_eq!(outcome.error.unwrap().error.code, "ValidationException");
    }

    #[tokio::test]
    async fn api_errors_become_error_bodies() {
        let mut api = MockSageMakerApi::new();
        api.expect_describe_training_job()
            .times(1)
            .returning(|req| Err(ApiError::ResourceNotFound(format!("Could not find training job {}", req.training_job_name))));
        let call = ApiCall { action: "DescribeTrainingJob".to_string(), params: json!({"TrainingJobName": "Ghost"}) };
        let outcome = dispatch(&api, call).await;
        let body = outcome.error.unwrap();
        assert_eq!(body.error.code, "ResourceNotFound");
        assert_eq!(body.error.message, "Could not find training job Ghost");
        assert_eq!(body.response_metadata.http_status_code, 400);
    }
}
