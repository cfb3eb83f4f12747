//! Delivery job endpoints.

use madina_core::{JobId, JobStatus};

use crate::error::ApiError;
use crate::gateway::Gateway;
use crate::types::{Job, JobInput, ListQuery, Page, UpdateJobStatusRequest};

const ALL_JOBS_PATH: &str = "/job/getAllJobs";
const ASSIGNED_JOBS_PATH: &str = "/job/getAssignedJobs";
const CREATE_JOB_PATH: &str = "/job/createJob";

/// Delivery job operations.
#[derive(Clone)]
pub struct JobsApi {
    gateway: Gateway,
}

impl JobsApi {
    pub(crate) const fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// List all delivery jobs (admin dashboard).
    ///
    /// # Errors
    ///
    /// Returns an error if the caller lacks permission or the request fails.
    pub async fn list(&self, query: &ListQuery) -> Result<Page<Job>, ApiError> {
        self.gateway.get(ALL_JOBS_PATH, &query.to_pairs()).await
    }

    /// List jobs assigned to the calling rider.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not authenticated or the request
    /// fails.
    pub async fn assigned(&self, query: &ListQuery) -> Result<Page<Job>, ApiError> {
        self.gateway
            .get(ASSIGNED_JOBS_PATH, &query.to_pairs())
            .await
    }

    /// Get one job by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the job is not found or the request fails.
    pub async fn job(&self, id: &JobId) -> Result<Job, ApiError> {
        self.gateway.get(&format!("/job/getJob/{id}"), &[]).await
    }

    /// Create a delivery job for an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or input is rejected.
    pub async fn create(&self, input: &JobInput) -> Result<Job, ApiError> {
        self.gateway.post(CREATE_JOB_PATH, input).await
    }

    /// Update a job's assignment or address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or input is rejected.
    pub async fn update(&self, id: &JobId, input: &JobInput) -> Result<Job, ApiError> {
        self.gateway
            .put(&format!("/job/updateJob/{id}"), input)
            .await
    }

    /// Delete a job.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete(&self, id: &JobId) -> Result<(), ApiError> {
        self.gateway
            .delete_empty(&format!("/job/deleteJob/{id}"))
            .await
    }

    /// Update the delivery status of a job (rider flow).
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is rejected or the request fails.
    pub async fn update_status(&self, id: &JobId, status: JobStatus) -> Result<Job, ApiError> {
        self.gateway
            .put(
                &format!("/job/updateJobStatus/{id}"),
                &UpdateJobStatusRequest { status },
            )
            .await
    }
}
