use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde::Deserialize;

use crate::error::GrowthError;

/// How capital's income share (alpha) is estimated for the decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CapitalShareMode {
    /// A fixed constant, `fixed_alpha` in the configuration.
    #[default]
    FixedConstant,
    /// Mean of per-observation `1 - labsh` over the full filtered window.
    PeriodAverage,
    /// Mean of the start-year and end-year `1 - labsh` only.
    EndpointAverage,
}

/// Average annual growth-rate formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GrowthFormula {
    /// 100 * (ln v_T - ln v_0) / span
    #[default]
    LogDifference,
    /// 100 * ((v_T / v_0)^(1/span) - 1)
    CompoundAnnual,
}

/// Denominator used for the per-capita output and capital series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PerCapitaBasis {
    /// Divide by persons engaged (emp).
    #[default]
    PerWorker,
    /// Divide by total hours (emp * avh).
    PerHourWorked,
}

/// One run's analysis settings. Loadable from TOML; every field has a
/// default matching the original OECD 1960-2000 study.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_countries")]
    pub countries: Vec<String>,

    #[serde(default = "default_start_year")]
    pub start_year: i64,

    #[serde(default = "default_end_year")]
    pub end_year: i64,

    #[serde(default)]
    pub capital_share_mode: CapitalShareMode,

    /// Alpha used when `capital_share_mode` is `fixed-constant`.
    #[serde(default = "default_fixed_alpha")]
    pub fixed_alpha: f64,

    #[serde(default)]
    pub growth_formula: GrowthFormula,

    #[serde(default)]
    pub per_capita_basis: PerCapitaBasis,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            countries: default_countries(),
            start_year: default_start_year(),
            end_year: default_end_year(),
            capital_share_mode: CapitalShareMode::default(),
            fixed_alpha: default_fixed_alpha(),
            growth_formula: GrowthFormula::default(),
            per_capita_basis: PerCapitaBasis::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load a TOML configuration file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GrowthError> {
        let text = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GrowthError> {
        if self.countries.is_empty() {
            return Err(GrowthError::Validation(
                "country set must not be empty".to_string(),
            ));
        }
        if self.start_year >= self.end_year {
            return Err(GrowthError::Validation(format!(
                "start_year ({}) must be before end_year ({})",
                self.start_year, self.end_year
            )));
        }
        if !(0.0..=1.0).contains(&self.fixed_alpha) {
            return Err(GrowthError::Validation(format!(
                "fixed_alpha ({}) must lie in [0, 1]",
                self.fixed_alpha
            )));
        }
        Ok(())
    }
}

fn default_countries() -> Vec<String> {
    [
        "Australia",
        "Austria",
        "Belgium",
        "Canada",
        "Denmark",
        "Finland",
        "France",
        "Germany",
        "Greece",
        "Iceland",
        "Ireland",
        "Italy",
        "Japan",
        "Netherlands",
        "New Zealand",
        "Norway",
        "Portugal",
        "Spain",
        "Sweden",
        "Switzerland",
        "United Kingdom",
        "United States",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_start_year() -> i64 {
    1960
}

fn default_end_year() -> i64 {
    2000
}

fn default_fixed_alpha() -> f64 {
    0.3
}
