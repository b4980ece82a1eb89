//! Trailing-twelve-month sums of quarterly flow items.
//!
//! Quarterly income-statement items (revenue, costs, net income) are flows;
//! summing the last four quarters gives an annualized figure that is free of
//! seasonality. The window here is calendar based, `[t - 365d, t]`, rather
//! than a count of quarters, and a sum is only reported when at least
//! [`TTM_MIN_OBSERVATIONS`] non-missing quarters fall inside it.

use crate::{
    DEFAULT_ENTITY_KEY, DEFAULT_TIME_KEY, Result,
    columns::{ensure_columns, ensure_numeric, ensure_temporal},
    traits::{ConfigurableTransform, Transform, TransformKind, as_strs},
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default quarterly flow items: revenue, COGS, SG&A, net income and EBIT.
pub const DEFAULT_TTM_COLUMNS: [&str; 5] = ["revtq", "cogsq", "xsgaq", "niq", "ebitq"];

/// Length of the trailing window.
pub const TTM_WINDOW: &str = "365d";

/// Minimum non-missing observations in a window for a sum to be reported.
pub const TTM_MIN_OBSERVATIONS: u32 = 4;

fn window_options() -> RollingOptionsDynamicWindow {
    RollingOptionsDynamicWindow {
        window_size: Duration::parse(TTM_WINDOW),
        min_periods: 1,
        closed_window: ClosedWindow::Both,
        fn_params: None,
    }
}

/// Rolling TTM sum of a single column within each entity.
///
/// Nulls contribute zero to the sum and nothing to the observation count;
/// the cell is null unless the count reaches [`TTM_MIN_OBSERVATIONS`].
fn ttm_expr(column: &str, entity_key: &str, time_key: &str) -> Expr {
    let sum = col(column)
        .cast(DataType::Float64)
        .fill_null(lit(0.0))
        .rolling_sum_by(col(time_key), window_options())
        .over([col(entity_key)]);
    let observations = col(column)
        .is_not_null()
        .cast(DataType::UInt32)
        .rolling_sum_by(col(time_key), window_options())
        .over([col(entity_key)]);

    when(observations.gt_eq(lit(TTM_MIN_OBSERVATIONS)))
        .then(sum)
        .otherwise(lit(NULL).cast(DataType::Float64))
        .alias(column)
}

/// Replace quarterly flow columns by their trailing-twelve-month sums.
///
/// For each entity, every row's value in each of `columns` becomes the sum of
/// that column over the entity's rows dated within `[t - 365 days, t]`, where
/// `t` is the row's own date. Fewer than four non-missing observations in the
/// window leave the cell null. Only null counts as missing; a NaN is an
/// observation and makes the sum NaN.
///
/// The sums are computed on `(entity_key, time_key, columns...)` and then
/// inner-joined back onto the remaining columns of `df` on
/// `(entity_key, time_key)`. Summed columns come last in the output. Because
/// of the join, duplicate `(entity_key, time_key)` pairs in the input multiply
/// rows in the output.
///
/// # Arguments
///
/// * `df` - Quarterly panel
/// * `columns` - Numeric flow columns to convert
/// * `entity_key` - Column identifying the entity
/// * `time_key` - Date or datetime column
///
/// # Returns
///
/// A new frame with `columns` as `Float64` TTM sums.
pub fn ttm_aggregate(
    df: &DataFrame,
    columns: &[&str],
    entity_key: &str,
    time_key: &str,
) -> Result<DataFrame> {
    ensure_columns(df, [entity_key])?;
    ensure_temporal(df, time_key)?;
    ensure_numeric(df, columns)?;
    debug!(rows = df.height(), ?columns, entity_key, time_key, "computing TTM sums");

    let rest: Vec<Expr> = df
        .get_column_names()
        .into_iter()
        .filter(|name| !columns.contains(&name.as_str()))
        .map(|name| col(name.clone()))
        .collect();

    let mut rolling: Vec<Expr> = vec![col(entity_key), col(time_key)];
    rolling.extend(columns.iter().map(|&c| ttm_expr(c, entity_key, time_key)));

    let sums = df
        .clone()
        .lazy()
        .sort(
            [entity_key, time_key],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .select(rolling);

    let result = df
        .clone()
        .lazy()
        .select(rest)
        .join(
            sums,
            [col(entity_key), col(time_key)],
            [col(entity_key), col(time_key)],
            JoinArgs::new(JoinType::Inner),
        )
        .collect()?;

    debug!(rows = result.height(), "TTM sums joined");
    Ok(result)
}

/// Configuration for [`TtmAggregator`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtmConfig {
    /// Quarterly flow columns to convert.
    pub columns: Vec<String>,
    /// Column identifying the entity each row belongs to.
    pub entity_key: String,
    /// Date column the window is measured on.
    pub time_key: String,
}

impl Default for TtmConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_TTM_COLUMNS.iter().map(|c| c.to_string()).collect(),
            entity_key: DEFAULT_ENTITY_KEY.to_string(),
            time_key: DEFAULT_TIME_KEY.to_string(),
        }
    }
}

/// TTM conversion as a [`Transform`].
#[derive(Debug, Clone, Default)]
pub struct TtmAggregator {
    config: TtmConfig,
}

impl Transform for TtmAggregator {
    fn name(&self) -> &str {
        "ttm_aggregate"
    }

    fn description(&self) -> &str {
        "Trailing 365-day sums of quarterly flows, requiring at least four quarters"
    }

    fn kind(&self) -> TransformKind {
        TransformKind::Aggregate
    }

    fn required_columns(&self) -> Vec<&str> {
        let mut required = vec![
            self.config.entity_key.as_str(),
            self.config.time_key.as_str(),
        ];
        required.extend(as_strs(&self.config.columns));
        required
    }

    fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        ttm_aggregate(
            df,
            &as_strs(&self.config.columns),
            &self.config.entity_key,
            &self.config.time_key,
        )
    }
}

impl ConfigurableTransform for TtmAggregator {
    type Config = TtmConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}
