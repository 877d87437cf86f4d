use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    object_id::{ActivityId, ResourceId, UserId},
    ActivityAction,
};

#[derive(Clone, Debug, Serialize)]
pub struct Activity {
    #[serde(rename = "id")]
    pub activity_id: ActivityId,
    pub resource_id: ResourceId,
    pub user_id: UserId,
    pub action: ActivityAction,
    pub description: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct Activities {
    by_resource: HashMap<ResourceId, Vec<Activity>>,
}

impl Activities {
    pub fn record(
        &mut self,
        resource_id: ResourceId,
        user_id: UserId,
        action: ActivityAction,
        description: impl Into<String>,
    ) -> Activity {
        let activity = Activity {
            activity_id: ActivityId::new(),
            resource_id,
            user_id,
            action,
            description: description.into(),
            created: Utc::now(),
        };

        self.by_resource
            .entry(resource_id)
            .or_default()
            .push(activity.clone());
        activity
    }

    /// Activities for a resource, newest first.
    pub fn list(&self, resource_id: ResourceId) -> Vec<Activity> {
        self.by_resource
            .get(&resource_id)
            .map(|rows| rows.iter().rev().cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn remove_all(&mut self, resource_id: ResourceId) {
        self.by_resource.remove(&resource_id);
    }
}
