use anyhow::Context;
use clap::Parser;
use patient_encounter::adapters::gateway::parse_batch;
use patient_encounter::utils::{logger, validation::Validate};
use patient_encounter::{
    AppConfig, BookingCoordinator, CliArgs, Directory, InMemoryStore, JsonGateway,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let config = match &args.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load config file '{}'", path.display()))?,
        None => AppConfig::default(),
    };

    // 初始化日誌
    let verbose = args.verbose || config.logging.verbose;
    if args.json_logs || config.logging.json {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("Starting patient-encounter");
    tracing::debug!("Booking config: {:?}", config.booking);

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let raw = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("failed to read input '{}'", args.input.display()))?;
    let batch = parse_batch(&raw)?;
    tracing::info!(
        patients = batch.patients.len(),
        doctors = batch.doctors.len(),
        appointments = batch.appointments.len(),
        "Loaded batch"
    );

    let store = Arc::new(InMemoryStore::new());
    let directory = Directory::new(Arc::clone(&store), config.booking.store_timeout());
    let coordinator = Arc::new(BookingCoordinator::new(Arc::clone(&store), config.booking.clone()));
    let gateway = JsonGateway::new(coordinator, directory);

    let report = gateway.run_batch(batch).await?;
    tracing::info!(
        booked = report.booked(),
        rejected = report.appointments.len() - report.booked(),
        "Batch processed"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(date) = args.list_date {
        let listing = gateway.list_for_date(date, args.doctor_id).await;
        println!("{}", serde_json::to_string_pretty(&listing)?);
    }

    Ok(())
}
