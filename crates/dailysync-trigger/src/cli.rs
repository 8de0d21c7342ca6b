use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Args, Parser};
use dailysync_core::config::{Overrides, TriggerConfig};
use figment::Figment;
use tracing::{error, info, Instrument};

use crate::clock::Clock;
use crate::client::TriggerOutcome;
use crate::error::Result;
use crate::job::Job;

/// Flags shared by both triggers.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// TOML config file (default: $DAILYSYNC_CONFIG, then /etc/dailysync/trigger.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Base URL of the DailySync service; overrides APP_BASE_URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}

impl CommonArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout_secs,
        }
    }

    /// File, environment and these flags, layered.
    pub fn figment(&self) -> dailysync_core::Result<Figment> {
        TriggerConfig::figment(self.config.as_deref(), &self.overrides())
    }
}

/// Start the DailySync standup compliance check for one day.
#[derive(Debug, Parser)]
#[command(name = "dailysync-daily-check", version)]
pub struct DailyCheckArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Business date to check instead of today (local calendar)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,
}

impl DailyCheckArgs {
    /// `--date` when given, otherwise today according to `clock`.
    pub fn job(&self, clock: &dyn Clock) -> Job {
        match self.date {
            Some(standup_date) => Job::DailyCheck { standup_date },
            None => Job::daily_check(clock),
        }
    }
}

/// Start the DailySync weekly standup report.
#[derive(Debug, Parser)]
#[command(name = "dailysync-weekly-report", version)]
pub struct WeeklyReportArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// stderr logging; journald picks it up under systemd.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dailysync_trigger=info,dailysync_core=info".into()),
        )
        .init();
}

/// Fire `job` with configuration from file, environment and `args`.
pub async fn trigger(job: &Job, args: &CommonArgs) -> Result<TriggerOutcome> {
    crate::run(job, args.figment()?).await
}

/// [`trigger`], logged inside a run span and mapped to an exit status.
pub async fn execute(job: Job, args: &CommonArgs) -> ExitCode {
    let run_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("trigger", job = job.name(), %run_id);

    async {
        let result = trigger(&job, args).await;
        match &result {
            Ok(outcome) => info!(
                status = outcome.status,
                elapsed_ms = outcome.elapsed.as_millis() as u64,
                "trigger accepted"
            ),
            Err(e) => error!(code = e.code(), "{e}"),
        }
        ExitCode::from(crate::exit_code(&result))
    }
    .instrument(span)
    .await
}
