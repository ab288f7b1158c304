use reqwest::Method;
use serde_json::Value;

use super::{PublerClient, Query, RequestOptions, Result};

impl PublerClient {
    /// Submit a scheduling request. The server answers with a job id that
    /// can be polled through [`job_status`](Self::job_status).
    pub async fn schedule_post(&self, body: Value) -> Result<Value> {
        self.request(
            Method::POST,
            "/posts/schedule",
            RequestOptions::new().json(body),
        )
        .await
    }

    pub async fn job_status(&self, job_id: &str) -> Result<Value> {
        self.request(
            Method::GET,
            &format!("/job_status/{job_id}"),
            RequestOptions::new(),
        )
        .await
    }

    pub async fn list_posts(&self, query: Option<Query>) -> Result<Value> {
        let mut options = RequestOptions::new();
        options.query = query;
        self.request(Method::GET, "/posts", options).await
    }
}
