use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use log::info;
use std::{
    fs::File,
    io::{BufWriter, Write},
    sync::Arc,
    path::PathBuf,
};
use tokio::sync::Mutex;
use clap::Parser;
use crate::adapters::api::ApiCall;
use crate::adapters::backend::*;
use crate::adapters::input::ReplayInputAdapter;
use crate::adapters::output::output_jsonl;
use crate::utils::lib::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayReport {
    pub total: usize,
    pub failed: usize,
}

pub async fn run_cli_interface() -> Result<()> {
    let args = Args::parse();
    let config = BackendConfig::from(&args);
    let output_path = get_output_file_path(args.output.clone())
        .context("Failed to resolve output path")?;
    let writer = create_writer(&output_path)
        .context("Failed to create writer")?;

    let calls = ReplayInputAdapter::new(args.input.clone()).fetch_calls()
        .context("Failed to read replay input")?;

    let backend = SageMakerBackend::new(&config);
    let report = replay(&backend, calls, &writer).await
        .context("Failed to replay API calls")?;

    writer.lock().await.flush()
        .context("Failed to flush output file")?;
    info!("Wrote {} responses to {:?}", report.total, output_path);
    println!("Replayed {} calls ({} failed). Output: {}", report.total, report.failed, output_path.display());
    Ok(())
}

/// Dispatch every call in order against `api`, writing one outcome line each.
///
/// Calls are never reordered: later calls observe the effects of earlier ones.
pub async fn replay<A, W>(api: &A, calls: Vec<ApiCall>, writer: &Arc<Mutex<W>>) -> Result<ReplayReport>
where
    A: SageMakerApi + ?Sized,
    W: Write,
{
    let total = calls.len();
    let progress_bar = create_progress_bar(total as u64)
        .context("Failed to create progress bar")?;

    let results: Vec<Result<bool>> = stream::iter(calls)
        .then(|call| {
            let progress_bar = progress_bar.clone();
            async move {
                let outcome = dispatch(api, call).await;
                output_jsonl(writer, &outcome)
                    .await
                    .context("Failed to write API outcome to JSONL")?;
                progress_bar.inc(1);
                Ok(outcome.is_success())
            }
        })
        .collect()
        .await;

    progress_bar.finish_with_message("Replay complete");

    let mut failed = 0;
    for result in results {
        if !result? {
            failed += 1;
        }
    }
    Ok(ReplayReport { total, failed })
}

fn create_writer(output_path: &PathBuf) -> Result<Arc<Mutex<BufWriter<File>>>> {
    let file = File::create(output_path)
        .context("Failed to create output file")?;
    let writer: Arc<Mutex<BufWriter<File>>> = Arc::new(Mutex::new(BufWriter::new(file)));
    Ok(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::api::*;
    use mockall::Sequence;
    use serde_json::json;

    #[tokio::test]
    async fn replays_in_order_and_counts_failures() {
        let mut api = MockSageMakerApi::new();
        let mut seq = Sequence::new();
        api.expect_list_training_jobs()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ListTrainingJobsResponse { training_job_summaries: Vec::new() }));
        api.expect_describe_training_job()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|req| Err(ApiError::ResourceNotFound(req.training_job_name)));

        let calls = vec![
            ApiCall { action: "ListTrainingJobs".to_string(), params: json!({}) },
            ApiCall { action: "DescribeTrainingJob".to_string(), params: json!({"TrainingJobName": "Ghost"}) },
            ApiCall { action: "StopTrainingJob".to_string(), params: json!({}) },
        ];
        let writer = Arc::new(Mutex::new(Vec::new()));
        let report = replay(&api, calls, &writer).await.unwrap();
        assert_eq!(report, ReplayReport { total: 3, failed: 2 });

        let written = String::from_utf8(writer.lock().await.clone()).unwrap();
        let outcomes: Vec<ApiOutcome> = written
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        let actions: Vec<_> = outcomes.iter().map(|o| o.action.as_str()).collect();
        assert_eq!(actions, ["ListTrainingJobs", "DescribeTrainingJob", "StopTrainingJob"]);
        assert!(outcomes[0].is_success());
        assert_eq!(outcomes[2].error.as_ref().unwrap().error.code, "InvalidAction");
    }
}
