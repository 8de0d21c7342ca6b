use std::process::ExitCode;

use clap::Parser;
use dailysync_trigger::cli::{self, DailyCheckArgs};
use dailysync_trigger::LocalClock;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = DailyCheckArgs::parse();
    cli::init_tracing();
    cli::execute(args.job(&LocalClock), &args.common).await
}
