use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use clap::Parser;
use std::path::PathBuf;
use std::fs::create_dir_all;
use anyhow::{Context, Result};

use chrono::Local;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_ACCOUNT_ID: &str = "123456789012";

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// JSONL file of API calls, one {"Action": ..., "Params": {...}} object per line
    #[clap(short, long, value_parser)]
    pub input: PathBuf,

    #[clap(short, long, value_parser)]
    pub output: Option<PathBuf>,

    #[clap(long, env = "SAGEMOCK_REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    #[clap(long, env = "SAGEMOCK_ACCOUNT_ID", default_value = DEFAULT_ACCOUNT_ID)]
    pub account_id: String,
}

/// Scope every training job ARN is minted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub region: String,
    pub account_id: String,
}

impl BackendConfig {
    pub fn new(region: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self { region: region.into(), account_id: account_id.into() }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REGION, DEFAULT_ACCOUNT_ID)
    }
}

impl From<&Args> for BackendConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.region.clone(), args.account_id.clone())
    }
}

pub fn get_output_file_path(output_arg: Option<PathBuf>) -> Result<PathBuf> {
    let file_name = Local::now().format("%Y%m%d_%H%M%S.jsonl").to_string();
    match output_arg {
        Some(path) if path.is_dir() => Ok(path.join(file_name)),
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                create_dir_all(parent)
                    .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
            }
            Ok(path)
        },
        None => {
            let output_dir = PathBuf::from("./output");
            create_dir_all(&output_dir).context("Failed to create output directory")?;
            Ok(output_dir.join(file_name))
        }
    }
}

pub fn create_progress_bar(total: u64) -> Result<ProgressBar, io::Error> {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
            .progress_chars("#>-"),
    );
    Ok(pb)
}
