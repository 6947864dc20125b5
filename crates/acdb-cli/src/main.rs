mod collect;

use acdb_core::btu::{HeightUnit, SizeUnit, SunExposure};
use acdb_core::{BtuRequest, Retailer};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "acdb")]
#[command(about = "Air-conditioner listings command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape retailers and reconcile their snapshots
    Collect {
        /// Only this retailer (slug, e.g. `jara`)
        #[arg(long)]
        retailer: Option<String>,
        /// Reconcile into an in-memory store instead of Postgres
        #[arg(long)]
        dry_run: bool,
    },
    /// List known retailers and their catalog entry pages
    Retailers,
    /// Compute the recommended cooling capacity for a room
    Btu(BtuArgs),
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    Ping,
    Migrate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AreaUnit {
    M2,
    Ft2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LengthUnit {
    M,
    Ft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Sun {
    Low,
    Medium,
    High,
}

#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
struct BtuArgs {
    #[arg(long)]
    room_size: f64,
    #[arg(long, value_enum, default_value_t = AreaUnit::M2)]
    size_unit: AreaUnit,
    #[arg(long, default_value_t = 2.7)]
    ceiling_height: f64,
    #[arg(long, value_enum, default_value_t = LengthUnit::M)]
    height_unit: LengthUnit,
    #[arg(long, value_enum, default_value_t = Sun::Medium)]
    sun: Sun,
    #[arg(long, default_value_t = 1)]
    people: u32,
    #[arg(long, default_value_t = 0)]
    computers: u32,
    #[arg(long, default_value_t = 0)]
    tvs: u32,
    /// Other appliances, kW
    #[arg(long, default_value_t = 0.0)]
    appliances_kw: f64,
    /// Air changes per hour; enables the ventilation surcharge
    #[arg(long)]
    air_exchange_rate: Option<f64>,
    #[arg(long)]
    guaranteed_20_degrees: bool,
    #[arg(long)]
    top_floor: bool,
    /// Glazing area in m²; marks the room as having a large window
    #[arg(long)]
    window_area: Option<f64>,
}

impl BtuArgs {
    fn to_request(&self) -> BtuRequest {
        BtuRequest {
            room_size: self.room_size,
            size_unit: match self.size_unit {
                AreaUnit::M2 => SizeUnit::SquareMeters,
                AreaUnit::Ft2 => SizeUnit::SquareFeet,
            },
            ceiling_height: self.ceiling_height,
            height_unit: match self.height_unit {
                LengthUnit::M => HeightUnit::Meters,
                LengthUnit::Ft => HeightUnit::Feet,
            },
            sun_exposure: match self.sun {
                Sun::Low => SunExposure::Low,
                Sun::Medium => SunExposure::Medium,
                Sun::High => SunExposure::High,
            },
            people_count: self.people,
            number_of_computers: self.computers,
            number_of_tvs: self.tvs,
            other_appliances_kwattage: self.appliances_kw,
            has_ventilation: self.air_exchange_rate.is_some(),
            air_exchange_rate: self.air_exchange_rate,
            guaranteed_20_degrees: self.guaranteed_20_degrees,
            is_top_floor: self.top_floor,
            has_large_window: self.window_area.is_some(),
            window_area: self.window_area,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Collect { retailer, dry_run }) => {
            let retailer = retailer.as_deref().map(str::parse::<Retailer>).transpose()?;
            let scraper = acdb_core::load_scraper_config()?;
            let store = collect::open_store(dry_run).await?;
            collect::run_collect(&scraper, store, retailer).await?;
        }
        Some(Commands::Retailers) => {
            for extractor in acdb_scraper::all_extractors() {
                println!("{:<14} {}", extractor.retailer(), extractor.entry_url());
            }
        }
        Some(Commands::Btu(args)) => {
            let result = acdb_core::calculate_btu(&args.to_request())?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Some(Commands::Db { command }) => {
            let config = acdb_core::load_app_config()?;
            let pool = acdb_db::connect_pool(
                &config.database_url,
                acdb_db::PoolConfig::from_app_config(&config),
            )
            .await?;
            match command {
                DbCommands::Ping => {
                    acdb_db::ping(&pool).await?;
                    println!("database reachable");
                }
                DbCommands::Migrate => {
                    let applied = acdb_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
            }
        }
        None => println!("acdb: pass --help for the available commands"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
