//! Cross-sectional median fill.

use crate::{
    DEFAULT_TIME_KEY, Result,
    columns::{dtype_of, ensure_columns, ensure_numeric},
    traits::{ConfigurableTransform, Transform, TransformKind, as_strs},
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fill missing values with the median of their cross-section.
///
/// For every column, the median of the non-null values among rows sharing the
/// same `time_key` value is broadcast back to that date, and substituted only
/// where the original value is null. When a whole cross-section is null the
/// median is null too, so those cells stay missing. Only null counts as
/// missing; NaN values are neither filled nor skipped by the median.
///
/// # Arguments
///
/// * `df` - Panel with the time key and value columns
/// * `columns` - Numeric columns to fill
/// * `time_key` - Column defining the cross-section
///
/// # Returns
///
/// A new frame with the same rows and row order. Integer columns come back as
/// `Float64`, the dtype of their median.
pub fn median_fill(df: &DataFrame, columns: &[&str], time_key: &str) -> Result<DataFrame> {
    ensure_columns(df, [time_key])?;
    ensure_numeric(df, columns)?;
    debug!(rows = df.height(), ?columns, time_key, "median filling");

    if columns.is_empty() {
        return Ok(df.clone());
    }

    let mut filled = Vec::with_capacity(columns.len());
    for &c in columns {
        let value = match dtype_of(df, c)? {
            // all-null column: nothing to take a median of
            DataType::Null => col(c).cast(DataType::Float64),
            _ => col(c),
        };
        filled.push(
            value
                .clone()
                .fill_null(value.median().over([col(time_key)]))
                .alias(c),
        );
    }

    Ok(df.clone().lazy().with_columns(filled).collect()?)
}

/// Configuration for [`MedianFill`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MedianFillConfig {
    /// Columns to fill.
    pub columns: Vec<String>,
    /// Column whose values define a cross-section.
    pub time_key: String,
}

impl Default for MedianFillConfig {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            time_key: DEFAULT_TIME_KEY.to_string(),
        }
    }
}

/// Cross-sectional median fill as a [`Transform`].
#[derive(Debug, Clone, Default)]
pub struct MedianFill {
    config: MedianFillConfig,
}

impl Transform for MedianFill {
    fn name(&self) -> &str {
        "median_fill"
    }

    fn description(&self) -> &str {
        "Replace missing values by the cross-sectional median on the same date"
    }

    fn kind(&self) -> TransformKind {
        TransformKind::Fill
    }

    fn required_columns(&self) -> Vec<&str> {
        let mut required = vec![self.config.time_key.as_str()];
        required.extend(as_strs(&self.config.columns));
        required
    }

    fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        median_fill(df, &as_strs(&self.config.columns), &self.config.time_key)
    }
}

impl ConfigurableTransform for MedianFill {
    type Config = MedianFillConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}
