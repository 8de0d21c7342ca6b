use std::process::ExitCode;

use clap::Parser;
use dailysync_trigger::cli::{self, WeeklyReportArgs};
use dailysync_trigger::Job;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = WeeklyReportArgs::parse();
    cli::init_tracing();
    cli::execute(Job::WeeklyReport, &args.common).await
}
