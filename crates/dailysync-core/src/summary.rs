//! Payloads returned by the DailySync internal endpoints.
//!
//! Triggers only read these for logging, so every field the trigger does not
//! print is optional or defaulted and unknown fields are ignored.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Body of `POST /internal/run-daily-check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCheckSummary {
    pub standup_date: NaiveDate,
    pub total_projects_evaluated: u32,
    pub logs_created: u32,
    #[serde(default)]
    pub entries: Vec<StandupLogEntry>,
}

/// One `DailyStandupLog` row created by the check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandupLogEntry {
    pub project_id: i64,
    pub status: StandupStatus,
    #[serde(default)]
    pub attendance_count: u32,
    #[serde(default)]
    pub duration_minutes: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StandupStatus {
    Happened,
    Missed,
    Cancelled,
    NoData,
    Error,
}

impl DailyCheckSummary {
    /// Number of entries with the given status.
    pub fn count(&self, status: StandupStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }
}

/// Body of `POST /internal/run-weekly-report`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub projects: Vec<WeeklyProjectSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyProjectSummary {
    pub project_id: i64,
    pub project_key: String,
    #[serde(default)]
    pub project_name: String,
    pub total_days: u32,
    #[serde(default)]
    pub happened_count: u32,
    #[serde(default)]
    pub missed_count: u32,
    #[serde(default)]
    pub cancelled_count: u32,
    #[serde(default)]
    pub no_data_count: u32,
    #[serde(default)]
    pub error_count: u32,
    pub compliance_pct: f64,
}

impl WeeklySummary {
    /// Mean compliance across projects that had at least one logged day.
    /// `None` when no project has data.
    pub fn mean_compliance(&self) -> Option<f64> {
        let with_data: Vec<f64> = self
            .projects
            .iter()
            .filter(|p| p.total_days > 0)
            .map(|p| p.compliance_pct)
            .collect();
        if with_data.is_empty() {
            return None;
        }
        Some(with_data.iter().sum::<f64>() / with_data.len() as f64)
    }
}
