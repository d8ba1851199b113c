use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const RESOURCE_OPENROUTER: &str = "openRouter";
pub const RESOURCE_COPILOT: &str = "copilot";
pub const RESOURCE_CODEX: &str = "codex";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    #[default]
    Idle,
    Loading,
    Ok,
    Error,
}

/// Last known state of one polled resource.
///
/// `data` survives a failed refresh so the view can keep showing the
/// previous payload next to the error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    pub data: Option<Value>,
    pub status: ResourceStatus,
    pub error: Option<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<String>, // rfc3339 of the last success
}

impl ResourceState {
    pub fn begin_loading(&mut self) {
        self.status = ResourceStatus::Loading;
        self.error = None;
    }

    pub fn succeed(&mut self, data: Value) {
        self.data = Some(data);
        self.status = ResourceStatus::Ok;
        self.error = None;
        self.updated_at = Some(chrono::Utc::now().to_rfc3339());
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = ResourceStatus::Error;
        self.error = Some(message.into());
    }

    pub fn is_loading(&self) -> bool {
        self.status == ResourceStatus::Loading
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub resources: BTreeMap<String, ResourceState>,
    pub is_refreshing: bool,
    pub running: bool,
    pub last_refresh_at: Option<String>,
    pub next_refresh_at: Option<String>,
}

impl DashboardSnapshot {
    /// State for `name`, or a fresh idle state when the resource is unknown.
    pub fn resource(&self, name: &str) -> ResourceState {
        self.resources.get(name).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefreshSummaryDto {
    pub skipped: bool,
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, String)>,
}
