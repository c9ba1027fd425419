pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shopfloor-scheduler")]
#[command(author = "Shopfloor Scheduler Team")]
#[command(version = "0.1.0")]
#[command(about = "Manufacturing job scheduler: batch placement and reschedule driver", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Load a scheduling snapshot and batch-schedule every unscheduled job")]
    ScheduleAll {
        #[arg(short, long, value_name = "FILE", help = "Input JSON snapshot (jobs, machines, resources, unavailabilities)")]
        input: PathBuf,

        #[arg(short, long, value_name = "FILE", default_value = "schedule.json", help = "Output file for the resulting schedule")]
        output: PathBuf,

        #[arg(long, help = "Cap on jobs scheduled in this run (spec default 50, hard max 100)")]
        max_jobs: Option<usize>,
    },

    #[command(about = "Run the rescheduling engine against a snapshot and a posted unavailability")]
    Reschedule {
        #[arg(short, long, value_name = "FILE", help = "Input JSON snapshot")]
        input: PathBuf,

        #[arg(short, long, value_name = "FILE", help = "Unavailability request JSON (RescheduleRequest shape)")]
        request: PathBuf,

        #[arg(short, long, value_name = "FILE", default_value = "reschedule.json", help = "Output file for the reschedule result")]
        output: PathBuf,
    },

    #[command(about = "Start the HTTP/WebSocket server")]
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value_t = 8080)]
        port: u16,

        #[arg(long, value_name = "FILE", default_value = "scheduler.db")]
        database: String,
    },
}
