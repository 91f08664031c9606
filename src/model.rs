use std::collections::HashMap;
use std::path::PathBuf;

use polars::prelude::*;

use crate::config::{AnalysisConfig, PerCapitaBasis};
use crate::error::GrowthError;
use crate::schema::{derived, pwt};

/// Panel dataset holder: loads a PWT-style CSV export and builds the
/// filtered feature frame the accounting core consumes.
pub struct GrowthModel {
    base_path: PathBuf,
    panel: Option<DataFrame>,
}

impl GrowthModel {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            panel: None,
        }
    }

    /// Wrap an already-typed panel frame (tests, embedding). The frame must
    /// carry all required panel columns.
    pub fn from_panel(panel: DataFrame) -> Result<Self, GrowthError> {
        Self::require_columns(&panel, &pwt::REQUIRED)?;
        Ok(Self {
            base_path: PathBuf::new(),
            panel: Some(panel),
        })
    }

    // ── Data loading ────────────────────────────────────────────────────────

    /// Load the panel CSV.
    ///
    /// Required columns: countrycode, country, year, rgdpna, rkna, emp,
    /// avh, labsh, rtfpna. Other columns are dropped. Use `rename` to map
    /// an archive's own column names onto the PWT names.
    ///
    /// The year column is parsed to Int64, the value columns to Float64;
    /// unparseable cells become nulls and fall out during filtering.
    pub fn load_panel(
        &mut self,
        filename: &str,
        rename: Option<HashMap<String, String>>,
    ) -> Result<&DataFrame, GrowthError> {
        let raw = self.read_csv_as_strings(filename, rename)?;
        Self::require_columns(&raw, &pwt::REQUIRED)?;

        let mut casts: Vec<Expr> = vec![col(pwt::YEAR)
            .str()
            .strip_chars(lit(" \t\r\n"))
            .cast(DataType::Int64)];
        for column in pwt::NUMERIC {
            casts.push(
                col(column)
                    .str()
                    .strip_chars(lit(" \t\r\n"))
                    .cast(DataType::Float64),
            );
        }

        let select: Vec<Expr> = pwt::REQUIRED.iter().map(|c| col(*c)).collect();
        let df = raw.lazy().with_columns(casts).select(select).collect()?;

        log::debug!("loaded panel: {} rows from {}", df.height(), filename);
        self.panel = Some(df);
        Ok(self.panel.as_ref().unwrap())
    }

    pub fn panel(&self) -> Result<&DataFrame, GrowthError> {
        self.panel
            .as_ref()
            .ok_or_else(|| GrowthError::NotLoaded("panel".into()))
    }

    // ── Filter & feature builder ────────────────────────────────────────────

    /// Restrict the panel to the configured countries and inclusive year
    /// window, drop rows with any missing required value, and derive the
    /// per-capita output/capital series and per-observation alpha.
    pub fn build_features(&self, config: &AnalysisConfig) -> Result<DataFrame, GrowthError> {
        let panel = self.panel()?;

        let countries = Series::new(
            "included_countries".into(),
            config.countries.clone(),
        );

        let filtered = panel
            .clone()
            .lazy()
            .filter(
                col(pwt::COUNTRY)
                    .is_in(lit(countries), false)
                    .and(col(pwt::YEAR).gt_eq(lit(config.start_year)))
                    .and(col(pwt::YEAR).lt_eq(lit(config.end_year))),
            )
            .collect()?;

        let complete = filtered.clone().lazy().drop_nulls(None).collect()?;
        let dropped = filtered.height() - complete.height();
        if dropped > 0 {
            log::debug!("dropped {dropped} rows with missing values");
        }

        let labor_input = match config.per_capita_basis {
            PerCapitaBasis::PerWorker => col(pwt::EMP),
            PerCapitaBasis::PerHourWorked => col(pwt::EMP) * col(pwt::AVH),
        };

        let df = complete
            .lazy()
            .with_columns([
                (col(pwt::RGDPNA) / labor_input.clone()).alias(derived::Y),
                (col(pwt::RKNA) / labor_input).alias(derived::K),
                (lit(1.0) - col(pwt::LABSH)).alias(derived::ALPHA),
            ])
            .collect()?;

        Ok(df)
    }

    // ── Private helpers ─────────────────────────────────────────────────────

    /// Read a CSV file with all columns as String dtype.
    /// Trims whitespace from column names and applies optional rename.
    fn read_csv_as_strings(
        &self,
        filename: &str,
        rename: Option<HashMap<String, String>>,
    ) -> Result<DataFrame, GrowthError> {
        let path = self.base_path.join(filename);
        let mut df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0)) // all columns as String
            .try_into_reader_with_file_path(Some(path))?
            .finish()?;

        let trimmed: Vec<String> = df
            .get_column_names_str()
            .iter()
            .map(|c| c.trim().to_string())
            .collect();
        df.set_column_names(trimmed.as_slice())?;

        if let Some(map) = rename {
            let old: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
            let new: Vec<&str> = map.values().map(|s| s.as_str()).collect();
            df = df.lazy().rename(old, new, true).collect()?;
        }

        Ok(df)
    }

    fn require_columns(df: &DataFrame, required: &[&str]) -> Result<(), GrowthError> {
        for &col_name in required {
            if df.column(col_name).is_err() {
                return Err(GrowthError::MissingColumn(col_name.to_string()));
            }
        }
        Ok(())
    }
}
