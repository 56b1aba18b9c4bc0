use analytics::{AggregationResult, AnalyticsEngine, Ranking, SalesReport, TimeBucket};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use configuration::Settings;
use core_types::{DateSelector, RecordSet};
use ingest::{load_csv, CsvOptions};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// The main entry point for the Tally sales analytics tool.
fn main() -> Result<()> {
    // A missing .env file is fine; it only supplies optional overrides.
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;
    let engine = AnalyticsEngine::new(&settings);
    if !cli.delimiter.is_ascii() {
        anyhow::bail!("The CSV delimiter must be a single ASCII character, got '{}'", cli.delimiter);
    }
    let options = CsvOptions {
        delimiter: cli.delimiter as u8,
    };

    match cli.command {
        Commands::Summary(args) => handle_summary(&engine, &options, args, cli.json),
        Commands::TopSelling(args) => handle_top_selling(&engine, &options, args, cli.json),
        Commands::TopProfitable(args) => handle_top_profitable(&engine, &options, args, cli.json),
        Commands::SalesPer(args) => handle_sales_per(&engine, &options, args, cli.json),
        Commands::Profit(args) => handle_profit(&engine, &options, args, cli.json),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Sales, expenditure and profit analytics over CSV exports.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file. Defaults to $TALLY_CONFIG, then ./tally.toml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    /// Field delimiter of the CSV files.
    #[arg(long, global = true, default_value_t = ',')]
    delimiter: char,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Revenue, expenditure, profit, rankings and sales per weekday and hour.
    Summary(SummaryArgs),
    /// Products ranked by quantity sold.
    TopSelling(TopSellingArgs),
    /// Products ranked by the profit they generated.
    TopProfitable(TopProfitableArgs),
    /// Sales totals and counts per time bucket.
    SalesPer(SalesPerArgs),
    /// Revenue minus expenditure.
    Profit(ProfitArgs),
}

#[derive(Args)]
struct PeriodArgs {
    /// Days to analyse: one selects that day, two form an interval, more are matched exactly.
    #[arg(long = "date", value_name = "YYYY-MM-DD")]
    dates: Vec<String>,
}

impl PeriodArgs {
    fn selector(&self) -> Result<Option<DateSelector>> {
        DateSelector::from_strs(self.dates.as_slice()).context("Invalid --date value")
    }
}

#[derive(Args)]
struct RankArgs {
    /// Number of entries to keep. Defaults to `report.top_limit`.
    #[arg(long, allow_negative_numbers = true)]
    limit: Option<i64>,

    /// Rank from the lowest value up.
    #[arg(long)]
    ascending: bool,
}

#[derive(Args)]
struct SummaryArgs {
    #[arg(long)]
    sales: PathBuf,
    #[arg(long)]
    purchases: PathBuf,
    #[arg(long)]
    products: PathBuf,
    #[command(flatten)]
    period: PeriodArgs,
}

#[derive(Args)]
struct TopSellingArgs {
    #[arg(long)]
    sales: PathBuf,
    #[command(flatten)]
    rank: RankArgs,
    #[command(flatten)]
    period: PeriodArgs,
}

#[derive(Args)]
struct TopProfitableArgs {
    #[arg(long)]
    sales: PathBuf,
    #[arg(long)]
    products: PathBuf,
    #[command(flatten)]
    rank: RankArgs,
    #[command(flatten)]
    period: PeriodArgs,
}

#[derive(Args)]
struct SalesPerArgs {
    /// One of day, hour, weekday, month, year.
    bucket: TimeBucket,
    #[arg(long)]
    sales: PathBuf,
    #[command(flatten)]
    period: PeriodArgs,
}

#[derive(Args)]
struct ProfitArgs {
    #[arg(long)]
    sales: PathBuf,
    #[arg(long)]
    purchases: PathBuf,
    #[command(flatten)]
    period: PeriodArgs,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    let from_env = std::env::var_os("TALLY_CONFIG").map(PathBuf::from);
    let settings = match explicit.map(Path::to_path_buf).or(from_env) {
        Some(path) => configuration::load_config_from(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => configuration::load_config().context("Failed to load configuration")?,
    };
    Ok(settings)
}

fn load(path: &Path, options: &CsvOptions) -> Result<RecordSet> {
    load_csv(path, options).with_context(|| format!("Failed to read {}", path.display()))
}

fn handle_summary(engine: &AnalyticsEngine, options: &CsvOptions, args: SummaryArgs, json: bool) -> Result<()> {
    let sales = load(&args.sales, options)?;
    let purchases = load(&args.purchases, options)?;
    let products = load(&args.products, options)?;

    let report = engine.calculate(&sales, &purchases, &products, args.period.selector()?)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn handle_top_selling(engine: &AnalyticsEngine, options: &CsvOptions, args: TopSellingArgs, json: bool) -> Result<()> {
    let sales = load(&args.sales, options)?;
    let ranking = engine.top_selling(&sales, args.period.selector()?, args.rank.limit, args.rank.ascending)?;
    emit_ranking(&ranking, "Product", "Quantity", json)
}

fn handle_top_profitable(engine: &AnalyticsEngine, options: &CsvOptions, args: TopProfitableArgs, json: bool) -> Result<()> {
    let sales = load(&args.sales, options)?;
    let products = load(&args.products, options)?;
    let ranking = engine.top_profitable(
        &products,
        &sales,
        args.period.selector()?,
        args.rank.limit,
        args.rank.ascending,
    )?;
    emit_ranking(&ranking, "Product", "Profit", json)
}

fn handle_sales_per(engine: &AnalyticsEngine, options: &CsvOptions, args: SalesPerArgs, json: bool) -> Result<()> {
    let sales = load(&args.sales, options)?;
    let result = engine.sales_per(&sales, args.bucket, args.period.selector()?)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", series_table(&result, args.bucket));
    }
    Ok(())
}

fn handle_profit(engine: &AnalyticsEngine, options: &CsvOptions, args: ProfitArgs, json: bool) -> Result<()> {
    let sales = load(&args.sales, options)?;
    let purchases = load(&args.purchases, options)?;
    let profit = engine.profit(&sales, &purchases, args.period.selector()?)?;
    if json {
        println!("{}", serde_json::json!({ "profit": profit }));
    } else {
        println!("Profit: {}", money(profit));
    }
    Ok(())
}

// ==============================================================================
// Presentation
// ==============================================================================

fn money(value: Decimal) -> String {
    format!("{:.2}", value)
}

fn ranking_table(ranking: &Ranking, key_header: &str, value_header: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", key_header, value_header]);
    for (position, (key, value)) in ranking.iter().enumerate() {
        table.add_row(vec![(position + 1).to_string(), key.to_string(), value.normalize().to_string()]);
    }
    table
}

fn series_table(result: &AggregationResult, bucket: TimeBucket) -> Table {
    let mut table = Table::new();
    table.set_header(vec![bucket.to_string(), "Total".to_string(), "Sales".to_string()]);
    for (label, total, count) in result.iter() {
        table.add_row(vec![label.to_string(), money(total), count.to_string()]);
    }
    table
}

fn emit_ranking(ranking: &Ranking, key_header: &str, value_header: &str, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(ranking)?);
    } else {
        println!("{}", ranking_table(ranking, key_header, value_header));
    }
    Ok(())
}

fn print_report(report: &SalesReport) {
    let mut totals = Table::new();
    totals.set_header(vec!["Revenue", "Expenditure", "Profit"]);
    totals.add_row(vec![
        money(report.total_revenue),
        money(report.expenditure),
        money(report.profit),
    ]);
    println!("{totals}");

    println!("\nTop selling products");
    println!("{}", ranking_table(&report.top_selling, "Product", "Quantity"));

    println!("\nTop profitable products");
    println!("{}", ranking_table(&report.top_profitable, "Product", "Profit"));

    println!("\nSales per weekday");
    println!("{}", series_table(&report.sales_per_weekday, TimeBucket::Weekday));

    println!("\nSales per hour");
    println!("{}", series_table(&report.sales_per_hour, TimeBucket::Hour));
}
