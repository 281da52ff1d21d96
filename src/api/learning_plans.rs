//! Learning plan endpoints.

use serde_json::json;

use super::ApiClient;
use crate::errors::Result;
use crate::models::{CreatePlanRequest, CreateTopicRequest, LearningPlan};

impl ApiClient {
    /// GET /api/learning-plans
    pub async fn list_learning_plans(&self) -> Result<Vec<LearningPlan>> {
        self.json(self.get("/api/learning-plans")).await
    }

    /// GET /api/learning-plans/user/{userId}
    pub async fn list_user_learning_plans(&self, user_id: &str) -> Result<Vec<LearningPlan>> {
        self.json(self.get(&format!("/api/learning-plans/user/{}", user_id))).await
    }

    /// POST /api/learning-plans
    pub async fn create_learning_plan(&self, request: &CreatePlanRequest) -> Result<LearningPlan> {
        self.json(self.post("/api/learning-plans").json(request)).await
    }

    /// POST /api/learning-plans/{id}/topics - Returns the whole plan.
    pub async fn add_topic(
        &self,
        plan_id: &str,
        request: &CreateTopicRequest,
    ) -> Result<LearningPlan> {
        self.json(
            self.post(&format!("/api/learning-plans/{}/topics", plan_id))
                .json(request),
        )
        .await
    }

    /// PUT /api/learning-plans/{id}/topics/{topicId}/complete - Returns the whole plan.
    pub async fn complete_topic(&self, plan_id: &str, topic_id: &str) -> Result<LearningPlan> {
        self.json(
            self.put(&format!(
                "/api/learning-plans/{}/topics/{}/complete",
                plan_id, topic_id
            ))
            .json(&json!({})),
        )
        .await
    }
}
