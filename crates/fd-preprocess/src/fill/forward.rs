//! Forward fill within each entity's history.

use crate::{
    DEFAULT_ENTITY_KEY, Result,
    columns::ensure_columns,
    traits::{ConfigurableTransform, Transform, TransformKind, as_strs},
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Forward fill missing values within each entity group.
///
/// Nulls in each of `columns` are replaced by the most recent non-null value
/// that appears earlier *in the existing row order* among rows sharing the
/// same `entity_key`. Rows are not re-sorted; sort by date first if the frame
/// is not already in time order. A null with no earlier value in its group
/// stays null. Only null counts as missing; NaN values are kept and carried.
///
/// # Arguments
///
/// * `df` - Panel with the entity key and value columns
/// * `columns` - Columns to fill
/// * `entity_key` - Column whose values identify an entity
///
/// # Returns
///
/// A new frame with the same rows, row order and columns.
pub fn forward_fill(df: &DataFrame, columns: &[&str], entity_key: &str) -> Result<DataFrame> {
    ensure_columns(df, std::iter::once(entity_key).chain(columns.iter().copied()))?;
    debug!(rows = df.height(), ?columns, entity_key, "forward filling");

    if columns.is_empty() {
        return Ok(df.clone());
    }

    let filled: Vec<Expr> = columns
        .iter()
        .map(|&c| col(c).forward_fill(None).over([col(entity_key)]).alias(c))
        .collect();

    Ok(df.clone().lazy().with_columns(filled).collect()?)
}

/// Configuration for [`ForwardFill`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardFillConfig {
    /// Columns to fill.
    pub columns: Vec<String>,
    /// Column identifying the entity each row belongs to.
    pub entity_key: String,
}

impl Default for ForwardFillConfig {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            entity_key: DEFAULT_ENTITY_KEY.to_string(),
        }
    }
}

/// Forward fill as a [`Transform`].
#[derive(Debug, Clone, Default)]
pub struct ForwardFill {
    config: ForwardFillConfig,
}

impl Transform for ForwardFill {
    fn name(&self) -> &str {
        "forward_fill"
    }

    fn description(&self) -> &str {
        "Carry the last non-missing value forward within each entity"
    }

    fn kind(&self) -> TransformKind {
        TransformKind::Fill
    }

    fn required_columns(&self) -> Vec<&str> {
        let mut required = vec![self.config.entity_key.as_str()];
        required.extend(as_strs(&self.config.columns));
        required
    }

    fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        forward_fill(df, &as_strs(&self.config.columns), &self.config.entity_key)
    }
}

impl ConfigurableTransform for ForwardFill {
    type Config = ForwardFillConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}
