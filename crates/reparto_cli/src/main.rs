//! Operator CLI for the delivery depot: provision counters, register
//! deliveries against the live geocoder, print the route sheet and export
//! the record log.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::exit;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use reparto_core::geocode::{CachedGeocoder, GeocodeClient, GeocodeConfig, DEFAULT_ENDPOINT};
use reparto_core::manifest::{self, ManifestConfig};
use reparto_core::pipeline::{AssignmentRequest, DeliveryPipeline};
use reparto_core::sequence::{FileSequenceStore, SequenceAllocator, SequenceStore};
use reparto_core::store::{DeliveryRecord, DeliveryRecordStore, JsonlDeliveryStore};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "reparto",
    about = "Delivery assignment and route sheets for the distribution depot"
)]
struct Cli {
    /// Directory holding the sequence counters and the delivery log
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision a named counter (customersCounter, productsCounter, ordersCounter, ...)
    Provision {
        sequence: String,
        /// Starting value; allocation hands out values above it
        #[arg(long, default_value_t = 0)]
        initial: u64,
    },
    /// Allocate the next identifier from a provisioned counter
    Allocate { sequence: String },
    /// Register a delivery: geocode the address, then append the record
    Register {
        /// Courier taking the delivery
        #[arg(long)]
        courier: String,
        /// Free-text delivery address (the locality suffix is appended)
        #[arg(long)]
        address: String,
        /// Delivery date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Order id to link
        #[arg(long)]
        order: Option<u64>,
        /// Geocoding endpoint
        #[arg(long, default_value = DEFAULT_ENDPOINT)]
        endpoint: String,
        /// Geocoding timeout in seconds
        #[arg(long, default_value_t = 5)]
        timeout_secs: u64,
    },
    /// Print the route sheet for the registered deliveries
    RouteSheet {
        /// Rows per printed page
        #[arg(long, default_value_t = manifest::DEFAULT_ROWS_PER_PAGE)]
        rows_per_page: usize,
        /// Only deliveries assigned to this courier
        #[arg(long)]
        courier: Option<String>,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Export the delivery records as CSV
    ExportCsv {
        #[arg(long, default_value = "deliveries.csv")]
        output: PathBuf,
    },
}

// ── Entry point ────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        let mut source = err.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(&cli.data_dir)?;
    let sequences_path = cli.data_dir.join("sequences.json");
    let deliveries_path = cli.data_dir.join("repartos.jsonl");

    match cli.command {
        Commands::Provision { sequence, initial } => {
            let store = FileSequenceStore::new(&sequences_path);
            store.provision(&sequence, initial)?;
            println!("provisioned `{sequence}` at {initial}");
            Ok(())
        }
        Commands::Allocate { sequence } => {
            let store = Arc::new(FileSequenceStore::new(&sequences_path));
            let allocator = SequenceAllocator::new(store);
            let value = allocator.allocate(&sequence)?;
            println!("{value}");
            Ok(())
        }
        Commands::Register {
            courier,
            address,
            date,
            order,
            endpoint,
            timeout_secs,
        } => {
            let config = GeocodeConfig::default()
                .with_endpoint(&endpoint)
                .with_timeout(Duration::from_secs(timeout_secs));
            let geocoder = Arc::new(CachedGeocoder::with_default_capacity(GeocodeClient::new(
                config,
            )));
            let store = Arc::new(JsonlDeliveryStore::open(&deliveries_path)?);
            let pipeline = DeliveryPipeline::new(geocoder, store);

            let record = pipeline
                .assign(AssignmentRequest {
                    courier_name: courier,
                    address,
                    delivery_date: date,
                    order_id: order,
                })
                .map_err(|err| {
                    if err.is_retryable() {
                        eprintln!("transient failure, resubmitting the same delivery is safe");
                    }
                    err
                })?;

            println!(
                "registered {} — {} delivers to {} ({:.6}, {:.6}) on {}",
                record.id,
                record.courier_name,
                record.address,
                record.position.lat(),
                record.position.lon(),
                record.delivery_date
            );
            Ok(())
        }
        Commands::RouteSheet {
            rows_per_page,
            courier,
            output,
        } => {
            let store = JsonlDeliveryStore::open(&deliveries_path)?;
            let records = match courier {
                Some(name) => store.list_by_courier(&name)?,
                None => store.list_all()?,
            };

            let config = ManifestConfig::default().with_rows_per_page(rows_per_page);
            let document = manifest::generate(&records, &config);
            let text = manifest::render_text(&document);

            match output {
                Some(path) => {
                    fs::write(&path, text)?;
                    println!(
                        "wrote {} pages ({} deliveries) to {}",
                        document.page_count(),
                        document.row_count(),
                        path.display()
                    );
                }
                None => print!("{text}"),
            }
            Ok(())
        }
        Commands::ExportCsv { output } => {
            let store = JsonlDeliveryStore::open(&deliveries_path)?;
            let records = store.list_all()?;
            write_records_csv(&records, &output)?;
            println!("wrote {} records to {}", records.len(), output.display());
            Ok(())
        }
    }
}

// ── CSV export ─────────────────────────────────────────────────────

fn write_records_csv(records: &[DeliveryRecord], path: &Path) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "id",
        "courier",
        "address",
        "deliveryDate",
        "lat",
        "lon",
        "linkedOrderId",
    ])?;

    for record in records {
        wtr.write_record([
            record.id.as_str(),
            record.courier_name.as_str(),
            record.address.as_str(),
            &record.delivery_date.to_string(),
            &record.position.lat().to_string(),
            &record.position.lon().to_string(),
            &record
                .order_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
