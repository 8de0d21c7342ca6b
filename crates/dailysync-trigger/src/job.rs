use chrono::NaiveDate;
use dailysync_core::summary::{DailyCheckSummary, StandupStatus, WeeklySummary};
use tracing::{debug, info};

use crate::clock::Clock;

pub const DAILY_CHECK_PATH: &str = "/internal/run-daily-check";
pub const WEEKLY_REPORT_PATH: &str = "/internal/run-weekly-report";

/// A server-side job that a trigger starts with one POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Standup compliance check for a single business date.
    DailyCheck { standup_date: NaiveDate },
    /// Report over the service's trailing seven days. Takes no parameters.
    WeeklyReport,
}

impl Job {
    /// Daily check for today according to `clock`.
    pub fn daily_check(clock: &dyn Clock) -> Self {
        Job::DailyCheck {
            standup_date: clock.today(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Job::DailyCheck { .. } => "daily-check",
            Job::WeeklyReport => "weekly-report",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Job::DailyCheck { .. } => DAILY_CHECK_PATH,
            Job::WeeklyReport => WEEKLY_REPORT_PATH,
        }
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Job::DailyCheck { standup_date } => {
                vec![("standup_date", standup_date.format("%Y-%m-%d").to_string())]
            }
            Job::WeeklyReport => Vec::new(),
        }
    }

    /// Log what the service reported back. Best effort: an unexpected body is
    /// noted at debug level and otherwise ignored.
    pub fn log_summary(&self, body: &str) {
        if body.trim().is_empty() {
            debug!("empty response body");
            return;
        }
        match self {
            Job::DailyCheck { .. } => match serde_json::from_str::<DailyCheckSummary>(body) {
                Ok(s) => info!(
                    standup_date = %s.standup_date,
                    projects = s.total_projects_evaluated,
                    logs_created = s.logs_created,
                    happened = s.count(StandupStatus::Happened),
                    missed = s.count(StandupStatus::Missed),
                    no_data = s.count(StandupStatus::NoData),
                    "daily check finished"
                ),
                Err(e) => debug!(error = %e, "response is not a daily check summary"),
            },
            Job::WeeklyReport => match serde_json::from_str::<WeeklySummary>(body) {
                Ok(s) => {
                    info!(
                        start_date = %s.start_date,
                        end_date = %s.end_date,
                        projects = s.projects.len(),
                        mean_compliance_pct = s.mean_compliance().unwrap_or(0.0),
                        "weekly report generated"
                    );
                    for p in &s.projects {
                        debug!(
                            project = %p.project_key,
                            days = p.total_days,
                            compliance_pct = p.compliance_pct,
                            "project compliance"
                        );
                    }
                }
                Err(e) => debug!(error = %e, "response is not a weekly summary"),
            },
        }
    }
}
