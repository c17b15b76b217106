//! Job definition storage
//!
//! The store owns validated job definitions keyed by job id. Job names are
//! unique across the store; the service layer enforces that through
//! [`JobStore::find_by_name`] before inserting.

use crate::domain::ids::JobId;
use crate::domain::job::EtlJobConfig;
use crate::domain::result::Result;
use crate::domain::TrellisError;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Storage boundary for job definitions
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persists a new job definition
    ///
    /// # Errors
    ///
    /// Returns a conflict error if a definition with the same id already
    /// exists.
    async fn insert(&self, job: EtlJobConfig) -> Result<()>;

    /// Fetches one job definition by id
    ///
    /// # Errors
    ///
    /// Returns a not-found error for unknown ids.
    async fn get(&self, job_id: JobId) -> Result<EtlJobConfig>;

    /// Lists all job definitions, ordered by job name
    async fn list(&self) -> Vec<EtlJobConfig>;

    /// Removes a job definition, returning it
    ///
    /// # Errors
    ///
    /// Returns a not-found error for unknown ids.
    async fn remove(&self, job_id: JobId) -> Result<EtlJobConfig>;

    /// Looks up a job definition by its unique name
    async fn find_by_name(&self, job_name: &str) -> Option<EtlJobConfig>;
}

/// In-memory job store
///
/// Backs the service in tests and single-process deployments. Definitions
/// are immutable once stored; there is no update operation.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<JobId, EtlJobConfig>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn insert(&self, job: EtlJobConfig) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.job_id) {
            return Err(TrellisError::Conflict(format!(
                "Job '{}' already exists",
                job.job_id
            )));
        }
        jobs.insert(job.job_id, job);
        Ok(())
    }

    async fn get(&self, job_id: JobId) -> Result<EtlJobConfig> {
        self.jobs
            .read()
            .await
            .get(&job_id)
            .cloned()
            .ok_or_else(|| TrellisError::NotFound(format!("Job '{job_id}' does not exist")))
    }

    async fn list(&self) -> Vec<EtlJobConfig> {
        let mut jobs: Vec<_> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by(|a, b| a.job_name.cmp(&b.job_name));
        jobs
    }

    async fn remove(&self, job_id: JobId) -> Result<EtlJobConfig> {
        self.jobs
            .write()
            .await
            .remove(&job_id)
            .ok_or_else(|| TrellisError::NotFound(format!("Job '{job_id}' does not exist")))
    }

    async fn find_by_name(&self, job_name: &str) -> Option<EtlJobConfig> {
        self.jobs
            .read()
            .await
            .values()
            .find(|job| job.job_name == job_name)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use crate::domain::job::DatabaseConnectionConfig;
    use std::collections::BTreeMap;

    fn sample_job(name: &str) -> EtlJobConfig {
        let connection = |n: &str| DatabaseConnectionConfig {
            connection_name: n.to_string(),
            url: format!("db://{n}"),
            driver: "postgres".to_string(),
            username: "etl".to_string(),
            password: secret_string("pw".to_string()),
            additional_properties: BTreeMap::new(),
        };
        EtlJobConfig {
            job_id: JobId::generate(),
            job_name: name.to_string(),
            source_db_config: connection("src"),
            target_db_config: connection("dst"),
            tables_to_process: vec!["orders".to_string()],
            table_transformation_configs: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = MemoryJobStore::new();
        let job = sample_job("nightly");
        let job_id = job.job_id;
        store.insert(job).await.unwrap();

        let fetched = store.get(job_id).await.unwrap();
        assert_eq!(fetched.job_name, "nightly");
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let store = MemoryJobStore::new();
        let err = store.get(JobId::generate()).await.unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn test_duplicate_id_conflicts() {
        let store = MemoryJobStore::new();
        let job = sample_job("nightly");
        store.insert(job.clone()).await.unwrap();
        let err = store.insert(job).await.unwrap_err();
        assert_eq!(err.kind(), "conflict");
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_name() {
        let store = MemoryJobStore::new();
        store.insert(sample_job("zeta")).await.unwrap();
        store.insert(sample_job("alpha")).await.unwrap();

        let names: Vec<_> = store.list().await.into_iter().map(|j| j.job_name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn test_find_by_name() {
        let store = MemoryJobStore::new();
        store.insert(sample_job("nightly")).await.unwrap();

        assert!(store.find_by_name("nightly").await.is_some());
        assert!(store.find_by_name("weekly").await.is_none());
    }

    #[tokio::test]
    async fn test_remove_returns_job() {
        let store = MemoryJobStore::new();
        let job = sample_job("nightly");
        let job_id = job.job_id;
        store.insert(job).await.unwrap();

        let removed = store.remove(job_id).await.unwrap();
        assert_eq!(removed.job_name, "nightly");
        assert!(store.get(job_id).await.is_err());
    }
}
