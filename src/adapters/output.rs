use anyhow::{Context, Result};
use std::io::Write;
use std::sync::Arc;
use tokio::sync::Mutex;
use crate::adapters::backend::ApiOutcome;

pub async fn output_jsonl<W: Write>(
    writer: &Arc<Mutex<W>>,
    outcome: &ApiOutcome
) -> Result<()> {
    let json = serde_json::to_string(outcome)
        .context("Failed to serialize ApiOutcome to string")?;

    let mut writer = writer.lock().await;
    writeln!(writer, "{}", json)
        .context("Failed to write JSON line to file")?;

    Ok(())
}
