use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use shopfloor_scheduler::presentation::cli::commands::{RescheduleCommand, ScheduleAllCommand};
use shopfloor_scheduler::presentation::cli::{Cli, Commands};
use shopfloor_scheduler::web::config::WebConfig;

#[actix_web::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("shopfloor_scheduler=debug,info")
    } else {
        EnvFilter::new("shopfloor_scheduler=info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::ScheduleAll { input, output, max_jobs } => {
            ScheduleAllCommand::execute(&input, &output, max_jobs)?;
        }
        Commands::Reschedule { input, request, output } => {
            RescheduleCommand::execute(&input, &request, &output)?;
        }
        Commands::Serve { host, port, database } => {
            let config = WebConfig::new(database).with_host(host).with_port(port);
            shopfloor_scheduler::web::start_web_server(config).await?;
        }
    }

    Ok(())
}
