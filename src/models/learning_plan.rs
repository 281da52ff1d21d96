//! Learning plan and topic models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::reconcile::Entity;

/// A step of a learning plan. `completed` only ever moves from false to true.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<NaiveDateTime>,
}

/// A user's learning plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LearningPlan {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub skill_category: Option<String>,
    #[serde(default)]
    pub progress: i32,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl LearningPlan {
    pub fn topic(&self, topic_id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == topic_id)
    }

    /// Carry forward completion from `previous` so a stale response can never
    /// un-complete a topic.
    pub fn preserve_completion(mut self, previous: &LearningPlan) -> Self {
        for topic in &mut self.topics {
            if let Some(old) = previous.topic(&topic.id) {
                if old.completed && !topic.completed {
                    topic.completed = true;
                    topic.completed_at = old.completed_at;
                }
            }
        }
        self
    }
}

impl Entity for LearningPlan {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Request body for `POST /api/learning-plans`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanRequest {
    pub title: String,
    pub description: String,
    pub skill_category: String,
    pub topics: Vec<Topic>,
}

/// Request body for `POST /api/learning-plans/{id}/topics`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTopicRequest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub resources: Vec<String>,
    pub completed: bool,
}

impl CreateTopicRequest {
    /// New, not yet completed topic with a client generated id.
    pub fn new(title: &str, description: &str, resources: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: description.to_string(),
            resources: super::split_list(resources),
            completed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(completed: bool) -> LearningPlan {
        LearningPlan {
            id: "lp1".to_string(),
            user_id: None,
            title: "Rust".to_string(),
            description: None,
            skill_category: None,
            progress: 0,
            topics: vec![Topic {
                id: "t1".to_string(),
                title: "Ownership".to_string(),
                description: None,
                resources: vec![],
                completed,
                completed_at: None,
            }],
            created_at: None,
        }
    }

    #[test]
    fn test_completion_never_regresses() {
        let merged = plan(false).preserve_completion(&plan(true));
        assert!(merged.topic("t1").unwrap().completed);
    }

    #[test]
    fn test_new_topic_is_incomplete() {
        let request = CreateTopicRequest::new("Lifetimes", "", "a, b");
        assert!(!request.completed);
        assert_eq!(request.resources, vec!["a", "b"]);
        assert!(!request.id.is_empty());
    }
}
