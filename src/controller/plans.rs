//! Learning plans and their topics.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::{Outcome, SingleFlight};
use crate::api::ApiClient;
use crate::errors::{ClientError, Result};
use crate::models::{CreatePlanRequest, CreateTopicRequest, LearningPlan};
use crate::reconcile::EntityList;
use crate::session::SessionAccessor;

pub struct LearningPlanController {
    api: ApiClient,
    session: Arc<dyn SessionAccessor>,
    plans: RwLock<EntityList<LearningPlan>>,
    user_plans: RwLock<EntityList<LearningPlan>>,
    flights: SingleFlight,
}

impl LearningPlanController {
    pub fn new(api: ApiClient, session: Arc<dyn SessionAccessor>) -> Self {
        Self {
            api,
            session,
            plans: RwLock::new(EntityList::new()),
            user_plans: RwLock::new(EntityList::new()),
            flights: SingleFlight::new(),
        }
    }

    pub async fn load(&self) -> Result<usize> {
        let plans = self.api.list_learning_plans().await.map_err(|e| {
            tracing::warn!("Failed to fetch learning plans: {}", e);
            e
        })?;
        let mut list = self.plans.write().await;
        list.replace_all(plans);
        Ok(list.len())
    }

    /// Load another user's plans for their profile page. The caller's own
    /// plans are left as is.
    pub async fn load_for_user(&self, user_id: &str) -> Result<usize> {
        let plans = self.api.list_user_learning_plans(user_id).await?;
        let mut list = self.user_plans.write().await;
        list.replace_all(plans);
        Ok(list.len())
    }

    pub async fn user_plans(&self) -> Vec<LearningPlan> {
        self.user_plans.read().await.as_slice().to_vec()
    }

    pub async fn plans(&self) -> Vec<LearningPlan> {
        self.plans.read().await.as_slice().to_vec()
    }

    pub async fn plan(&self, plan_id: &str) -> Option<LearningPlan> {
        self.plans.read().await.get(plan_id).cloned()
    }

    pub async fn create(&self, mut request: CreatePlanRequest) -> Result<Outcome<LearningPlan>> {
        request.title = request.title.trim().to_string();
        if request.title.is_empty() {
            return Err(ClientError::Validation("Plan title is required".to_string()));
        }
        self.session.require_identity()?;
        let Some(_guard) = self.flights.try_begin("create:plan") else {
            return Ok(Outcome::Busy);
        };

        let plan = self.api.create_learning_plan(&request).await.map_err(|e| {
            tracing::warn!("Failed to create learning plan: {}", e);
            e
        })?;
        self.plans.write().await.upsert_back(plan.clone());
        Ok(Outcome::Applied(plan))
    }

    pub async fn add_topic(
        &self,
        plan_id: &str,
        request: CreateTopicRequest,
    ) -> Result<Outcome<LearningPlan>> {
        if request.title.trim().is_empty() {
            return Err(ClientError::Validation("Topic title is required".to_string()));
        }
        self.session.require_identity()?;
        let Some(_guard) = self.flights.try_begin(format!("topic:add:{}", plan_id)) else {
            return Ok(Outcome::Busy);
        };

        let plan = self.api.add_topic(plan_id, &request).await.map_err(|e| {
            tracing::warn!("Failed to add topic to {}: {}", plan_id, e);
            e
        })?;
        Ok(Outcome::Applied(self.apply(plan).await))
    }

    /// Mark a topic completed.
    ///
    /// A topic already completed locally is returned as is without a request;
    /// completion cannot be undone from the client.
    pub async fn complete_topic(
        &self,
        plan_id: &str,
        topic_id: &str,
    ) -> Result<Outcome<LearningPlan>> {
        self.session.require_identity()?;
        if let Some(plan) = self.plan(plan_id).await {
            if plan.topic(topic_id).is_some_and(|t| t.completed) {
                return Ok(Outcome::Applied(plan));
            }
        }
        let Some(_guard) = self
            .flights
            .try_begin(format!("topic:complete:{}:{}", plan_id, topic_id))
        else {
            return Ok(Outcome::Busy);
        };

        let plan = self.api.complete_topic(plan_id, topic_id).await.map_err(|e| {
            tracing::warn!("Failed to complete topic {} of {}: {}", topic_id, plan_id, e);
            e
        })?;
        Ok(Outcome::Applied(self.apply(plan).await))
    }

    /// Replace the local plan, keeping any topic completion the response
    /// lacks. Returns the plan as stored.
    async fn apply(&self, plan: LearningPlan) -> LearningPlan {
        let mut list = self.plans.write().await;
        let merged = match list.get(&plan.id) {
            Some(previous) => plan.preserve_completion(previous),
            None => plan,
        };
        if !list.replace_existing(merged.clone()) {
            tracing::debug!("Discarding update for plan {} no longer listed", merged.id);
        }
        merged
    }
}
