use polars::prelude::*;

use crate::config::{AnalysisConfig, CapitalShareMode, GrowthFormula};
use crate::error::GrowthError;
use crate::schema::{derived, pwt};

/// One country's filtered observations, extracted out of the feature frame.
///
/// Years are looked up by exact value, never by position; the vectors are
/// parallel and carry one entry per retained (country, year) row.
#[derive(Debug, Clone)]
pub struct CountrySeries {
    pub name: String,
    pub years: Vec<i64>,
    pub y: Vec<f64>,
    pub k: Vec<f64>,
    pub alpha: Vec<f64>,
    /// Cobb-Douglas TFP level term rtfpna^(1/(1-alpha)), where defined.
    pub tfp_term: Vec<Option<f64>>,
}

/// Per-country growth decomposition.
///
/// `tfp_growth` is always the residual `growth_rate - capital_deepening`;
/// `tfp_index_growth` is the independently measured TFP index growth and is
/// reported alongside only, never substituted for the residual.
#[derive(Debug, Clone)]
pub struct Decomposition {
    pub country: String,
    pub start_year: i64,
    pub end_year: i64,
    pub growth_rate: f64,
    pub tfp_growth: f64,
    pub capital_deepening: f64,
    /// None when the total growth rate is exactly zero.
    pub tfp_share: Option<f64>,
    pub capital_share: Option<f64>,
    pub tfp_index_growth: Option<f64>,
}

/// A country dropped from the run, with the error that dropped it.
#[derive(Debug)]
pub struct Exclusion {
    pub country: String,
    pub reason: GrowthError,
}

/// Everything one run produces before aggregation.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub decompositions: Vec<Decomposition>,
    pub excluded: Vec<Exclusion>,
}

impl CountrySeries {
    /// Extract a country's series from one partition of the feature frame.
    pub fn from_partition(part: &DataFrame) -> Result<Self, GrowthError> {
        let name = partition_country_name(part);
        if part.height() == 0 {
            return Err(GrowthError::InsufficientData(name));
        }

        let years_col = part.column(pwt::YEAR)?.as_materialized_series().i64()?;
        let y_col = part.column(derived::Y)?.as_materialized_series().f64()?;
        let k_col = part.column(derived::K)?.as_materialized_series().f64()?;
        let alpha_col = part.column(derived::ALPHA)?.as_materialized_series().f64()?;
        let tfp_col = part.column(pwt::RTFPNA)?.as_materialized_series().f64()?;

        let mut years = Vec::with_capacity(part.height());
        let mut y = Vec::with_capacity(part.height());
        let mut k = Vec::with_capacity(part.height());
        let mut alpha = Vec::with_capacity(part.height());
        let mut tfp_term = Vec::with_capacity(part.height());

        for i in 0..part.height() {
            let (year, yv, kv, av, tv) = match (
                years_col.get(i),
                y_col.get(i),
                k_col.get(i),
                alpha_col.get(i),
                tfp_col.get(i),
            ) {
                (Some(year), Some(yv), Some(kv), Some(av), Some(tv)) => (year, yv, kv, av, tv),
                _ => {
                    return Err(GrowthError::Validation(format!(
                        "null value survived filtering for {name}"
                    )))
                }
            };
            years.push(year);
            y.push(yv);
            k.push(kv);
            alpha.push(av);
            // The index exponent blows up as alpha -> 1 (labsh -> 0).
            tfp_term.push(if av < 1.0 && tv > 0.0 {
                Some(tv.powf(1.0 / (1.0 - av)))
            } else {
                None
            });
        }

        Ok(Self {
            name,
            years,
            y,
            k,
            alpha,
            tfp_term,
        })
    }

    /// Resolve the endpoint pair for this country: the requested years when
    /// both are present, otherwise this country's own min/max year. The same
    /// pair is used for every series so the decomposition stays consistent.
    pub fn resolve_endpoints(
        &self,
        start_year: i64,
        end_year: i64,
    ) -> Result<(usize, usize), GrowthError> {
        if self.years.is_empty() {
            return Err(GrowthError::InsufficientData(self.name.clone()));
        }

        let position_of = |year: i64| self.years.iter().position(|&v| v == year);

        let (i0, i1) = match (position_of(start_year), position_of(end_year)) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                let mut min_idx = 0;
                let mut max_idx = 0;
                for (i, &year) in self.years.iter().enumerate() {
                    if year < self.years[min_idx] {
                        min_idx = i;
                    }
                    if year > self.years[max_idx] {
                        max_idx = i;
                    }
                }
                (min_idx, max_idx)
            }
        };

        if self.years[i0] == self.years[i1] {
            return Err(GrowthError::InvalidTimeSpan(
                self.name.clone(),
                self.years[i0],
            ));
        }
        Ok((i0, i1))
    }
}

/// Best-effort country label for a partition, for exclusion records.
fn partition_country_name(part: &DataFrame) -> String {
    part.column(pwt::COUNTRY)
        .ok()
        .and_then(|c| c.get(0).ok())
        .map(|v| match v {
            AnyValue::String(s) => s.to_string(),
            AnyValue::StringOwned(s) => s.to_string(),
            other => format!("{other}"),
        })
        .unwrap_or_else(|| "<unknown>".to_string())
}

/// Average annual growth of one series between two resolved endpoints.
fn annual_growth(
    formula: GrowthFormula,
    country: &str,
    column: &str,
    (y0, v0): (i64, f64),
    (y1, v1): (i64, f64),
) -> Result<f64, GrowthError> {
    // Non-finite endpoints arise from zero denominators upstream (emp or
    // emp * avh), so they get the same treatment as zero and negative values.
    if !v0.is_finite() || v0 <= 0.0 {
        return Err(GrowthError::InvalidSeriesValue(
            country.to_string(),
            column.to_string(),
            y0,
        ));
    }
    if !v1.is_finite() || v1 <= 0.0 {
        return Err(GrowthError::InvalidSeriesValue(
            country.to_string(),
            column.to_string(),
            y1,
        ));
    }
    let span = (y1 - y0) as f64;
    let rate = match formula {
        GrowthFormula::LogDifference => 100.0 * (v1.ln() - v0.ln()) / span,
        GrowthFormula::CompoundAnnual => 100.0 * ((v1 / v0).powf(1.0 / span) - 1.0),
    };
    Ok(rate)
}

fn capital_share(series: &CountrySeries, config: &AnalysisConfig, i0: usize, i1: usize) -> f64 {
    match config.capital_share_mode {
        CapitalShareMode::FixedConstant => config.fixed_alpha,
        CapitalShareMode::PeriodAverage => {
            series.alpha.iter().sum::<f64>() / series.alpha.len() as f64
        }
        CapitalShareMode::EndpointAverage => (series.alpha[i0] + series.alpha[i1]) / 2.0,
    }
}

/// Decompose one country's per-capita output growth into capital deepening
/// and the TFP residual. Pure: (series, config) -> result.
pub fn decompose(
    series: &CountrySeries,
    config: &AnalysisConfig,
) -> Result<Decomposition, GrowthError> {
    let (i0, i1) = series.resolve_endpoints(config.start_year, config.end_year)?;
    let (start_year, end_year) = (series.years[i0], series.years[i1]);

    let g_y = annual_growth(
        config.growth_formula,
        &series.name,
        derived::Y,
        (start_year, series.y[i0]),
        (end_year, series.y[i1]),
    )?;
    let g_k = annual_growth(
        config.growth_formula,
        &series.name,
        derived::K,
        (start_year, series.k[i0]),
        (end_year, series.k[i1]),
    )?;

    let alpha = capital_share(series, config, i0, i1);
    let capital_deepening = alpha * g_k;
    let tfp_growth = g_y - capital_deepening;

    let (tfp_share, cap_share) = if g_y != 0.0 {
        (Some(tfp_growth / g_y), Some(capital_deepening / g_y))
    } else {
        (None, None)
    };

    // Comparison figure from the observed TFP index, where the index term
    // is defined and positive at both endpoints.
    let tfp_index_growth = match (series.tfp_term[i0], series.tfp_term[i1]) {
        (Some(t0), Some(t1)) => annual_growth(
            config.growth_formula,
            &series.name,
            pwt::RTFPNA,
            (start_year, t0),
            (end_year, t1),
        )
        .ok(),
        _ => None,
    };

    Ok(Decomposition {
        country: series.name.clone(),
        start_year,
        end_year,
        growth_rate: g_y,
        tfp_growth,
        capital_deepening,
        tfp_share,
        capital_share: cap_share,
        tfp_index_growth,
    })
}

/// Run the accounting over the whole feature frame: one decomposition per
/// country, with per-country failures contained as exclusions. Configured
/// countries absent from the frame are excluded as insufficient data.
pub fn run(features: &DataFrame, config: &AnalysisConfig) -> Result<RunOutcome, GrowthError> {
    let mut outcome = RunOutcome::default();
    let mut seen: Vec<String> = Vec::new();

    let partitions = features.partition_by([pwt::COUNTRY], true)?;
    for part in &partitions {
        let series = match CountrySeries::from_partition(part) {
            Ok(series) => series,
            Err(e) if e.is_country_local() => {
                let country = partition_country_name(part);
                seen.push(country.clone());
                outcome.excluded.push(Exclusion { country, reason: e });
                continue;
            }
            Err(e) => return Err(e),
        };
        seen.push(series.name.clone());

        match decompose(&series, config) {
            Ok(d) => outcome.decompositions.push(d),
            Err(e) if e.is_country_local() => outcome.excluded.push(Exclusion {
                country: series.name,
                reason: e,
            }),
            Err(e) => return Err(e),
        }
    }

    for country in &config.countries {
        if !seen.iter().any(|s| s == country) {
            outcome.excluded.push(Exclusion {
                country: country.clone(),
                reason: GrowthError::InsufficientData(country.clone()),
            });
        }
    }

    Ok(outcome)
}
