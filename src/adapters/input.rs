use std::fs;
use std::path::PathBuf;
use anyhow::{Context, Result};
use log::{info, debug};
use crate::adapters::api::ApiCall;

/// Reads replay scripts: one JSON [`ApiCall`] per line.
///
/// The input is either a single file or a folder, in which case every
/// `.jsonl` file in it is read in file-name order. Blank lines and lines
/// starting with `#` are skipped.
pub struct ReplayInputAdapter {
    input: PathBuf,
}

impl ReplayInputAdapter {
    pub fn new(input: PathBuf) -> Self {
        info!("Creating new ReplayInputAdapter with input: {:?}", input);
        Self { input }
    }

    fn script_paths(&self) -> Result<Vec<PathBuf>> {
        if self.input.is_file() {
            return Ok(vec![self.input.clone()]);
        }
        info!("Reading scripts from folder: {:?}", self.input);
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.input)
            .with_context(|| format!("Failed to read directory: {:?}", self.input))?
        {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "jsonl") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    pub fn fetch_calls(&self) -> Result<Vec<ApiCall>> {
        let mut calls = Vec::new();
        for path in self.script_paths()? {
            debug!("Reading script: {:?}", path);
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read file: {:?}", path))?;
            for (index, line) in content.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let call: ApiCall = serde_json::from_str(line)
                    .with_context(|| format!("Invalid API call at {:?}:{}", path, index + 1))?;
                calls.push(call);
            }
        }
        info!("Total calls fetched: {}", calls.len());
        Ok(calls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sagemock-input-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn reads_calls_skipping_comments() {
        let dir = scratch_dir();
        let file = dir.join("calls.jsonl");
        fs::write(
            &file,
            "# seed\n{\"Action\": \"ListTrainingJobs\"}\n\n{\"Action\": \"DescribeTrainingJob\", \"Params\": {\"TrainingJobName\": \"A\"}}\n",
        )
        .unwrap();

        let calls = ReplayInputAdapter::new(file).fetch_calls().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].action, "ListTrainingJobs");
        assert!(calls[0].params.as_object().unwrap().is_empty());
        assert_eq!(calls[1].params["TrainingJobName"], "A");
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn folders_are_read_in_name_order() {
        let dir = scratch_dir();
        fs::write(dir.join("b.jsonl"), "{\"Action\": \"Second\"}\n").unwrap();
        fs::write(dir.join("a.jsonl"), "{\"Action\": \"First\"}\n").unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let calls = ReplayInputAdapter::new(dir.clone()).fetch_calls().unwrap();
        let actions: Vec<_> = calls.iter().map(|c| c.action.as_str()).collect();
        assert_eq!(actions, ["First", "Second"]);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn malformed_lines_report_their_position() {
        let dir = scratch_dir();
        let file = dir.join("bad.jsonl");
        fs::write(&file, "{\"Action\": \"ListTrainingJobs\"}\nnot json\n").unwrap();

        let err = ReplayInputAdapter::new(file).fetch_calls().unwrap_err();
        assert!(format!("{:#}", err).contains(":2"));
        fs::remove_dir_all(dir).unwrap();
    }
}
