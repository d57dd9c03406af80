use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "patient-encounter")]
#[command(about = "Books patient appointments without double-booking doctors")]
pub struct CliArgs {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON batch with patients, doctors and appointment requests
    #[arg(short, long)]
    pub input: PathBuf,

    /// After booking, list appointments starting on this UTC date (YYYY-MM-DD)
    #[arg(long)]
    pub list_date: Option<NaiveDate>,

    /// Restrict the date listing to one doctor
    #[arg(long, requires = "list_date")]
    pub doctor_id: Option<i64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}
