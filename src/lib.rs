//! Analysis engine for cloud advisor recommendation exports.
//!
//! A [`RawTable`] goes through column resolution, cleaning, aggregation,
//! estimation and scoring, and comes out as one [`AnalysisResult`]:
//!
//! ```no_run
//! use advisor_report::{analyze, loader};
//! use std::path::Path;
//!
//! let (table, _) = loader::load_table(Path::new("recommendations.csv"), None)?;
//! let result = analyze(&table)?;
//! println!("advisor score: {:.1}", result.advisor_score);
//! # Ok::<(), advisor_report::AnalysisError>(())
//! ```

mod aggregate;
mod cleaner;
mod composer;
pub mod config;
pub mod error;
mod estimator;
pub mod loader;
pub mod output;
pub mod result;
mod schema;
mod scoring;
pub mod types;
mod util;

pub use composer::{analyze, analyze_with, ENGINE_VERSION};
pub use config::AnalyzerConfig;
pub use error::{AnalysisError, InputErrorKind, Result};
pub use result::AnalysisResult;
pub use scoring::AdvisorRating;
pub use types::{RawRow, RawTable, RawValue};
