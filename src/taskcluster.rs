use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::RegistryError;

/// Extra pages followed after the first one.
pub const MAX_PAGES: usize = 20;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    #[serde(default)]
    pub task_id: String,
    #[serde(default)]
    pub state: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskMetadata {
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinition {
    #[serde(default)]
    pub metadata: TaskMetadata,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskEntry {
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub task: TaskDefinition,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskGroup {
    #[serde(default)]
    pub task_group_id: String,
    #[serde(default)]
    pub tasks: Vec<TaskEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
}

pub struct Queue {
    root_url: String,
    client: reqwest::blocking::Client,
}

impl Queue {
    pub fn new(root_url: &str, timeout: Duration) -> Result<Self, RegistryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            root_url: root_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Web UI link for a task group.
    pub fn task_group_url(&self, task_group_id: &str) -> String {
        task_group_url(&self.root_url, task_group_id)
    }

    fn list_url(&self, task_group_id: &str) -> String {
        format!("{}/api/queue/v1/task-group/{task_group_id}/list", self.root_url)
    }

    fn get_page(&self, url: &str) -> Result<TaskGroup, RegistryError> {
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(RegistryError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(resp.json()?)
    }

    /// Fetch every task in a group, following continuation tokens.
    ///
    /// The first page must load. A failing continuation page ends pagination
    /// with what was collected so far.
    pub fn fetch_task_group(&self, task_group_id: &str) -> Result<TaskGroup, RegistryError> {
        let _span = tracing::info_span!("fetch_task_group", task_group_id).entered();

        let list_url = self.list_url(task_group_id);
        let mut task_group = self.get_page(&list_url)?;
        let mut token = task_group.continuation_token.take();

        for page in 0..MAX_PAGES {
            let Some(continuation) = token.take() else {
                break;
            };
            log::info!("Fetching Task Group {task_group_id} (page {})", page + 2);

            let encoded: String = url::form_urlencoded::byte_serialize(continuation.as_bytes()).collect();
            let url = format!("{list_url}?continuationToken={encoded}");
            match self.get_page(&url) {
                Ok(next) => {
                    token = next.continuation_token;
                    task_group.tasks.extend(next.tasks);
                }
                Err(e) => {
                    log::warn!("Failed to fetch a TaskGroup task continuation: {e}");
                    break;
                }
            }
        }
        if token.is_some() {
            log::warn!("task group {task_group_id} has more than {} pages, stopping", MAX_PAGES + 1);
        }

        Ok(task_group)
    }
}

pub fn task_group_url(root_url: &str, task_group_id: &str) -> String {
    format!("{}/tasks/groups/{task_group_id}", root_url.trim_end_matches('/'))
}
