//! `dailysync-trigger`: one-shot processes that start DailySync server jobs.
//!
//! Each invocation resolves configuration, sends one `POST` with the
//! `X-Internal-Api-Key` header and maps the outcome to an exit status. Retry and
//! scheduling belong to the caller (systemd timers, see `deploy/systemd`).
//!
//! | Binary                    | Endpoint                                          |
//! |---------------------------|---------------------------------------------------|
//! | `dailysync-daily-check`   | `/internal/run-daily-check?standup_date=YYYY-MM-DD` |
//! | `dailysync-weekly-report` | `/internal/run-weekly-report`                     |

pub mod cli;
pub mod client;
pub mod clock;
pub mod error;
pub mod job;

pub use client::{TriggerClient, TriggerOutcome, API_KEY_HEADER};
pub use clock::{Clock, FixedClock, LocalClock};
pub use error::{Result, TriggerError};
pub use job::Job;

use dailysync_core::TriggerConfig;
use figment::Figment;

/// Validate configuration from `figment`, then fire `job` once.
///
/// Configuration problems surface before any connection is opened.
pub async fn run(job: &Job, figment: Figment) -> Result<TriggerOutcome> {
    let config = TriggerConfig::from_figment(figment)?;
    let client = TriggerClient::new(config)?;
    client.fire(job).await
}

/// Process exit status for a finished run.
pub fn exit_code(result: &Result<TriggerOutcome>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(e) => e.exit_code(),
    }
}
