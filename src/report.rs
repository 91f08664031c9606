use std::path::Path;

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Table};
use polars::prelude::*;

use crate::accounting::{Decomposition, Exclusion, RunOutcome};
use crate::error::GrowthError;
use crate::schema::report;

/// Marker rendered for a share that is undefined (zero total growth).
const UNDEFINED: &str = "n/a";

/// One rendered table row. Numeric fields are rounded to 2 decimals; the
/// year fields are absent on the synthetic Average row.
#[derive(Debug, Clone)]
pub struct ReportRow {
    pub country: String,
    pub start_year: Option<i64>,
    pub end_year: Option<i64>,
    pub growth_rate: f64,
    pub tfp_growth: f64,
    pub capital_deepening: f64,
    pub tfp_share: Option<f64>,
    pub capital_share: Option<f64>,
    pub tfp_index_growth: Option<f64>,
}

/// The final result table: one row per successfully processed country,
/// sorted by display name, plus the exclusions recorded along the way.
#[derive(Debug)]
pub struct ResultTable {
    rows: Vec<ReportRow>,
    excluded: Vec<Exclusion>,
}

impl ResultTable {
    pub fn from_outcome(outcome: RunOutcome) -> Self {
        let mut rows: Vec<ReportRow> = outcome
            .decompositions
            .iter()
            .map(ReportRow::from_decomposition)
            .collect();
        rows.sort_by(|a, b| a.country.cmp(&b.country));
        Self {
            rows,
            excluded: outcome.excluded,
        }
    }

    /// Country rows only, sorted, without the Average row.
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn excluded(&self) -> &[Exclusion] {
        &self.excluded
    }

    /// The unweighted cross-country mean of every numeric field. Undefined
    /// shares are left out of their field's mean; a field undefined for
    /// every country stays undefined. None when there are no rows at all.
    pub fn average(&self) -> Option<ReportRow> {
        if self.rows.is_empty() {
            return None;
        }
        let n = self.rows.len() as f64;
        let mean = |f: fn(&ReportRow) -> f64| {
            round2(self.rows.iter().map(f).sum::<f64>() / n)
        };
        Some(ReportRow {
            country: report::AVERAGE_LABEL.to_string(),
            start_year: None,
            end_year: None,
            growth_rate: mean(|r| r.growth_rate),
            tfp_growth: mean(|r| r.tfp_growth),
            capital_deepening: mean(|r| r.capital_deepening),
            tfp_share: mean_defined(self.rows.iter().map(|r| r.tfp_share)),
            capital_share: mean_defined(self.rows.iter().map(|r| r.capital_share)),
            tfp_index_growth: mean_defined(self.rows.iter().map(|r| r.tfp_index_growth)),
        })
    }

    /// Country rows plus the trailing Average row.
    pub fn rows_with_average(&self) -> Vec<ReportRow> {
        let mut rows = self.rows.clone();
        if let Some(avg) = self.average() {
            rows.push(avg);
        }
        rows
    }

    /// Assemble the table as a polars frame for downstream consumers.
    pub fn to_dataframe(&self) -> Result<DataFrame, GrowthError> {
        let rows = self.rows_with_average();

        let opt_f64 = |v: Option<f64>| match v {
            Some(x) => AnyValue::Float64(x),
            None => AnyValue::Null,
        };
        let opt_i64 = |v: Option<i64>| match v {
            Some(x) => AnyValue::Int64(x),
            None => AnyValue::Null,
        };

        let columns: Vec<(&str, Vec<AnyValue>)> = vec![
            (
                report::COUNTRY,
                rows.iter()
                    .map(|r| AnyValue::StringOwned(r.country.clone().into()))
                    .collect(),
            ),
            (
                report::START_YEAR,
                rows.iter().map(|r| opt_i64(r.start_year)).collect(),
            ),
            (
                report::END_YEAR,
                rows.iter().map(|r| opt_i64(r.end_year)).collect(),
            ),
            (
                report::GROWTH_RATE,
                rows.iter().map(|r| AnyValue::Float64(r.growth_rate)).collect(),
            ),
            (
                report::TFP_GROWTH,
                rows.iter().map(|r| AnyValue::Float64(r.tfp_growth)).collect(),
            ),
            (
                report::CAPITAL_DEEPENING,
                rows.iter()
                    .map(|r| AnyValue::Float64(r.capital_deepening))
                    .collect(),
            ),
            (
                report::TFP_SHARE,
                rows.iter().map(|r| opt_f64(r.tfp_share)).collect(),
            ),
            (
                report::CAPITAL_SHARE,
                rows.iter().map(|r| opt_f64(r.capital_share)).collect(),
            ),
            (
                report::TFP_INDEX_GROWTH,
                rows.iter().map(|r| opt_f64(r.tfp_index_growth)).collect(),
            ),
        ];

        let mut out: Vec<Column> = Vec::with_capacity(columns.len());
        for (name, values) in columns {
            let series = Series::from_any_values(name.into(), &values, true)?;
            out.push(series.into());
        }
        Ok(DataFrame::new(out)?)
    }

    /// Render the table for the console.
    pub fn render(&self) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec![
            report::COUNTRY,
            report::START_YEAR,
            report::END_YEAR,
            report::GROWTH_RATE,
            report::TFP_GROWTH,
            report::CAPITAL_DEEPENING,
            report::TFP_SHARE,
            report::CAPITAL_SHARE,
            report::TFP_INDEX_GROWTH,
        ]);

        for row in self.rows_with_average() {
            let year = |v: Option<i64>| {
                v.map(|y| y.to_string()).unwrap_or_default()
            };
            let num = |v: f64| format!("{v:.2}");
            let opt = |v: Option<f64>| match v {
                Some(x) => format!("{x:.2}"),
                None => UNDEFINED.to_string(),
            };
            table.add_row(vec![
                Cell::new(&row.country),
                Cell::new(year(row.start_year)).set_alignment(CellAlignment::Right),
                Cell::new(year(row.end_year)).set_alignment(CellAlignment::Right),
                Cell::new(num(row.growth_rate)).set_alignment(CellAlignment::Right),
                Cell::new(num(row.tfp_growth)).set_alignment(CellAlignment::Right),
                Cell::new(num(row.capital_deepening)).set_alignment(CellAlignment::Right),
                Cell::new(opt(row.tfp_share)).set_alignment(CellAlignment::Right),
                Cell::new(opt(row.capital_share)).set_alignment(CellAlignment::Right),
                Cell::new(opt(row.tfp_index_growth)).set_alignment(CellAlignment::Right),
            ]);
        }
        table.to_string()
    }

    /// Write the result table (with Average row) to a CSV file.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), GrowthError> {
        let mut df = self.to_dataframe()?;
        let mut file = std::fs::File::create(path)?;
        CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;
        Ok(())
    }
}

impl ReportRow {
    fn from_decomposition(d: &Decomposition) -> Self {
        Self {
            country: d.country.clone(),
            start_year: Some(d.start_year),
            end_year: Some(d.end_year),
            growth_rate: round2(d.growth_rate),
            tfp_growth: round2(d.tfp_growth),
            capital_deepening: round2(d.capital_deepening),
            tfp_share: d.tfp_share.map(round2),
            capital_share: d.capital_share.map(round2),
            tfp_index_growth: d.tfp_index_growth.map(round2),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn mean_defined(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let defined: Vec<f64> = values.flatten().collect();
    if defined.is_empty() {
        None
    } else {
        Some(round2(defined.iter().sum::<f64>() / defined.len() as f64))
    }
}
