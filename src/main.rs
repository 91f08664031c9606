use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use pwt_growthkit::{
    accounting, AnalysisConfig, CapitalShareMode, GrowthFormula, GrowthModel, PerCapitaBasis,
    ResultTable,
};

/// Solow growth accounting over a Penn World Table CSV export.
#[derive(Parser, Debug)]
#[command(name = "growthkit", version)]
struct Cli {
    /// Panel CSV file (PWT column names: country, year, rgdpna, rkna, ...)
    data: PathBuf,

    /// Optional TOML configuration file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Countries to include (comma-separated display names)
    #[arg(long, value_delimiter = ',')]
    countries: Option<Vec<String>>,

    /// First year of the analysis window (inclusive)
    #[arg(long)]
    start_year: Option<i64>,

    /// Last year of the analysis window (inclusive)
    #[arg(long)]
    end_year: Option<i64>,

    /// How capital's income share is estimated
    #[arg(long, value_enum)]
    capital_share_mode: Option<CapitalShareMode>,

    /// Alpha for the fixed-constant capital share mode
    #[arg(long)]
    alpha: Option<f64>,

    /// Growth-rate formula
    #[arg(long, value_enum)]
    growth_formula: Option<GrowthFormula>,

    /// Per-capita denominator for output and capital
    #[arg(long, value_enum)]
    per_capita_basis: Option<PerCapitaBasis>,

    /// Write the result table to a CSV file as well
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(countries) = cli.countries {
        config.countries = countries;
    }
    if let Some(year) = cli.start_year {
        config.start_year = year;
    }
    if let Some(year) = cli.end_year {
        config.end_year = year;
    }
    if let Some(mode) = cli.capital_share_mode {
        config.capital_share_mode = mode;
    }
    if let Some(alpha) = cli.alpha {
        config.fixed_alpha = alpha;
    }
    if let Some(formula) = cli.growth_formula {
        config.growth_formula = formula;
    }
    if let Some(basis) = cli.per_capita_basis {
        config.per_capita_basis = basis;
    }
    config.validate()?;

    let filename = cli
        .data
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base = cli
        .data
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut model = GrowthModel::new(base);
    model.load_panel(&filename, None)?;

    let features = model.build_features(&config)?;
    let outcome = accounting::run(&features, &config)?;
    let table = ResultTable::from_outcome(outcome);

    for exclusion in table.excluded() {
        log::warn!("excluded {}: {}", exclusion.country, exclusion.reason);
    }

    println!(
        "Growth Accounting: {}-{} period",
        config.start_year, config.end_year
    );
    println!("{}", table.render());

    if let Some(path) = &cli.output {
        table.write_csv(path)?;
        log::info!("wrote {}", path.display());
    }

    Ok(())
}
