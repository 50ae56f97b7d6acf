use super::model::JobRecord;
use chrono::Utc;
use moka::future::Cache;
use std::time::Duration;
use uuid::Uuid;

/// In-memory job statuses, evicted after a period without access
#[derive(Clone)]
pub struct JobRegistry {
    jobs: Cache<Uuid, JobRecord>,
}

impl JobRegistry {
    pub fn new(retention: Duration) -> Self {
        let jobs = Cache::builder()
            .max_capacity(10_000)
            .time_to_idle(retention) // refreshes on access
            .build();

        Self { jobs }
    }

    pub async fn insert(&self, record: JobRecord) {
        self.jobs.insert(record.job_id, record).await;
    }

    pub async fn get(&self, job_id: Uuid) -> Option<JobRecord> {
        self.jobs.get(&job_id).await
    }

    /// Apply `update` to an existing record; unknown ids are ignored
    pub async fn update<F>(&self, job_id: Uuid, update: F)
    where
        F: FnOnce(&mut JobRecord),
    {
        if let Some(mut record) = self.jobs.get(&job_id).await {
            update(&mut record);
            record.updated_at = Utc::now();
            self.jobs.insert(job_id, record).await;
        } else {
            tracing::warn!(job_id = %job_id, "Job record expired before update");
        }
    }
}
