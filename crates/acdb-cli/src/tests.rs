use acdb_db::ListingStore as _;
use acdb_pipeline::{ReconcileOutcome, RetailerReport};

use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["acdb", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli = Cli::try_parse_from(["acdb", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["acdb"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn collect_defaults_to_all_retailers() {
    let cli = Cli::try_parse_from(["acdb", "collect"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Collect {
            retailer: None,
            dry_run: false
        })
    ));
}

#[test]
fn collect_with_retailer_and_dry_run() {
    let cli = Cli::try_parse_from(["acdb", "collect", "--retailer", "jara", "--dry-run"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Collect {
            retailer: Some(ref r),
            dry_run: true
        }) if r == "jara"
    ));
}

#[test]
fn btu_flags_build_a_request() {
    let cli = Cli::try_parse_from([
        "acdb",
        "btu",
        "--room-size",
        "20",
        "--ceiling-height",
        "2.5",
        "--people",
        "2",
        "--computers",
        "1",
        "--tvs",
        "1",
        "--appliances-kw",
        "0.5",
    ])
    .unwrap();
    let Some(Commands::Btu(args)) = cli.command else {
        panic!("expected btu command");
    };

    let result = acdb_core::calculate_btu(&args.to_request()).unwrap();
    assert_eq!(result.calculated_power_btu, 9000);
}

#[test]
fn btu_optional_inputs_toggle_flags() {
    let cli = Cli::try_parse_from([
        "acdb",
        "btu",
        "--room-size",
        "300",
        "--size-unit",
        "ft2",
        "--sun",
        "high",
        "--air-exchange-rate",
        "1.5",
        "--window-area",
        "4",
        "--top-floor",
    ])
    .unwrap();
    let Some(Commands::Btu(args)) = cli.command else {
        panic!("expected btu command");
    };

    let request = args.to_request();
    assert_eq!(request.size_unit, SizeUnit::SquareFeet);
    assert_eq!(request.sun_exposure, SunExposure::High);
    assert!(request.has_ventilation);
    assert!(request.has_large_window);
    assert!(request.is_top_floor);
    assert!(!request.guaranteed_20_degrees);
}

#[test]
fn btu_requires_room_size() {
    assert!(Cli::try_parse_from(["acdb", "btu"]).is_err());
}

#[test]
fn describe_formats_each_outcome() {
    let replaced = RetailerReport {
        retailer: Retailer::Gree,
        scraped: 12,
        outcome: Ok(ReconcileOutcome::Replaced {
            hash: "abc".to_string(),
            listings: 12,
            combined: 12,
        }),
    };
    let skipped = RetailerReport {
        retailer: Retailer::Jara,
        scraped: 0,
        outcome: Ok(ReconcileOutcome::SkippedEmpty),
    };

    let line = collect::describe(&replaced);
    assert!(line.starts_with("gree"));
    assert!(line.ends_with("replaced (12 listings, 12 combined)"));
    assert!(collect::describe(&skipped).ends_with("nothing scraped; snapshot kept"));
}

#[tokio::test]
async fn dry_run_store_opens_without_a_database() {
    let store = collect::open_store(true)
        .await
        .expect("dry run should not read DATABASE_URL");
    assert!(store.snapshot_hash(Retailer::Jara).await.unwrap().is_none());
}
