use uniulm_mensaparser::adapter::SimpleAdapter;
use uniulm_mensaparser::constants::{DEFAULT_MAXMANAGER_URL, MAXMANAGER_URL};
use uniulm_mensaparser::data_backend::maxmanager::Language;
use uniulm_mensaparser::data_types::Canteen;
use uniulm_mensaparser::plan_fetcher::fetch_plans;
use uniulm_mensaparser::shared_main::{default_canteens, logger_init, parse_canteen_arg};

use anyhow::Result;
use clap::Parser;
use log::log_enabled;
use std::io::Write;

/// Fetches the meal plans of the Ulm university canteens and prints them as JSON.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Canteen to fetch, repeatable{n}Default: all canteens served by MaxManager
    #[arg(short, long, value_parser = parse_canteen_arg)]
    canteen: Vec<Canteen>,
    /// Number of weeks to fetch, starting with the current one
    #[arg(short, long, default_value_t = 2)]
    weeks: u32,
    /// Language of meal names
    #[arg(long, value_enum, default_value_t = Language::De)]
    lang: Language,
    /// MaxManager endpoint
    #[arg(long, env = "MAXMANAGER_URL", default_value = DEFAULT_MAXMANAGER_URL)]
    endpoint: String,
    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
    /// Enable verbose logging (mostly performance metrics){n}[SETS env: RUST_LOG=debug]
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    MAXMANAGER_URL.get_or_init(|| args.endpoint);

    if args.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }

    logger_init("uniulm_mensaparser");
    if !(log_enabled!(log::Level::Debug) || log_enabled!(log::Level::Trace)) {
        log::info!("Enable verbose logging for performance metrics");
    }

    let canteens = if args.canteen.is_empty() {
        default_canteens()
    } else {
        args.canteen
    };

    let today = chrono::Local::now().date_naive();
    let client = reqwest::Client::new();
    let plans = fetch_plans(&client, &canteens, today, args.weeks, args.lang).await;
    log::info!("fetched {} plans", plans.len());

    let value = SimpleAdapter::convert_plans(&plans);
    let output = if args.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", output)?;

    Ok(())
}

