pub mod accounting;
pub mod config;
pub mod error;
pub mod model;
pub mod report;
pub mod schema;

pub use accounting::{run, CountrySeries, Decomposition, Exclusion, RunOutcome};
pub use config::{AnalysisConfig, CapitalShareMode, GrowthFormula, PerCapitaBasis};
pub use error::GrowthError;
pub use model::GrowthModel;
pub use report::{ReportRow, ResultTable};
