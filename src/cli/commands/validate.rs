//! Validate command implementation
//!
//! This module implements the `validate` command for checking a job
//! definition file against the validator without running it.

use crate::api::CreateJobRequest;
use crate::core::validate;
use clap::Args;
use std::fs;

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to a job definition JSON file
    #[arg(short, long)]
    pub job: String,
}

impl ValidateArgs {
    /// Execute the validate command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(job_path = %self.job, "Validating job definition");

        println!("🔍 Validating job definition: {}", self.job);
        println!();

        let text = match fs::read_to_string(&self.job) {
            Ok(text) => text,
            Err(e) => {
                println!("❌ Failed to read job definition file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let request: CreateJobRequest = match serde_json::from_str(&text) {
            Ok(request) => request,
            Err(e) => {
                println!("❌ Job definition is not valid JSON for the expected shape");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let job = request.into_job();
        let result = validate::validate(&job);
        if result.is_valid() {
            println!("✅ Job definition is valid");
            println!();
            println!("Job Summary:");
            println!("  Name: {}", job.job_name);
            println!("  Source: {}", job.source_db_config.url);
            println!("  Target: {}", job.target_db_config.url);
            println!("  Tables: {}", job.tables_to_process.join(", "));
            let rule_count: usize = job
                .table_transformation_configs
                .values()
                .map(|c| c.rules.len())
                .sum();
            println!("  Transformation rules: {rule_count}");
            println!();
            Ok(0)
        } else {
            println!("❌ Job definition is invalid");
            println!();
            for error in result.errors() {
                println!("  - {}: {}", error.path, error.message);
            }
            println!();
            Ok(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn job_json() -> serde_json::Value {
        serde_json::json!({
            "jobName": "nightly",
            "sourceDbConfig": {
                "connectionName": "src",
                "url": "db://src",
                "driver": "postgres",
                "username": "etl",
                "password": "pw"
            },
            "targetDbConfig": {
                "connectionName": "dst",
                "url": "db://dst",
                "driver": "postgres",
                "username": "etl",
                "password": "pw"
            },
            "tablesToProcess": ["orders"]
        })
    }

    #[tokio::test]
    async fn test_valid_job_exits_zero() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", job_json()).unwrap();

        let args = ValidateArgs {
            job: file.path().to_string_lossy().into_owned(),
        };
        assert_eq!(args.execute().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_job_exits_two() {
        let mut json = job_json();
        json["tablesToProcess"] = serde_json::json!([]);
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{json}").unwrap();

        let args = ValidateArgs {
            job: file.path().to_string_lossy().into_owned(),
        };
        assert_eq!(args.execute().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_missing_file_exits_two() {
        let args = ValidateArgs {
            job: "/nonexistent/job.json".to_string(),
        };
        assert_eq!(args.execute().await.unwrap(), 2);
    }
}
