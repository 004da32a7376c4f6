use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;

/// Counters describing drag activity over the lifetime of a coordinator.
#[derive(Debug, Default, Clone)]
pub struct InventoryMetrics {
    drags_started: u64,
    commits: u64,
    repositions: u64,
    reverts: u64,
    lost: u64,
    hover_checks: u64,
}

impl InventoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_drag_started(&mut self) {
        self.drags_started = self.drags_started.saturating_add(1);
    }

    /// A committed drop; `same_container` marks a reposition.
    pub fn record_commit(&mut self, same_container: bool) {
        self.commits = self.commits.saturating_add(1);
        if same_container {
            self.repositions = self.repositions.saturating_add(1);
        }
    }

    pub fn record_revert(&mut self) {
        self.reverts = self.reverts.saturating_add(1);
    }

    pub fn record_lost(&mut self) {
        self.lost = self.lost.saturating_add(1);
    }

    pub fn record_hover_check(&mut self) {
        self.hover_checks = self.hover_checks.saturating_add(1);
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            drags_started: self.drags_started,
            commits: self.commits,
            repositions: self.repositions,
            reverts: self.reverts,
            lost: self.lost,
            hover_checks: self.hover_checks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub drags_started: u64,
    pub commits: u64,
    pub repositions: u64,
    pub reverts: u64,
    pub lost: u64,
    pub hover_checks: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(
            LogLevel::Info,
            target.to_string(),
            "inventory_metrics".to_string(),
            self.as_fields(),
        )
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("drags_started".to_string(), json!(self.drags_started));
        map.insert("commits".to_string(), json!(self.commits));
        map.insert("repositions".to_string(), json!(self.repositions));
        map.insert("reverts".to_string(), json!(self.reverts));
        map.insert("lost".to_string(), json!(self.lost));
        map.insert("hover_checks".to_string(), json!(self.hover_checks));
        map
    }
}
