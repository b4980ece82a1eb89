//! Lag and lead column generation.
//!
//! Offsets follow a target/feature convention: a negative offset names a
//! *lead* (a future value, used as a prediction target) and a positive offset
//! names a *lag* (a past value, used as a feature). For a base column `revtq`
//! and offset `-2`, the generated column `revtq_2` holds the value two periods
//! ahead within the same entity; for offset `1`, `revtq_1` holds the previous
//! period's value.

use crate::{
    DEFAULT_ENTITY_KEY, DEFAULT_TIME_KEY, Result,
    columns::ensure_columns,
    traits::{ConfigurableTransform, Transform, TransformKind, as_strs},
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default offsets: five quarters of leads and one quarter of lag.
pub const DEFAULT_LAG_OFFSETS: [i64; 6] = [-5, -4, -3, -2, -1, 1];

/// Output of [`generate_lags`].
#[derive(Debug, Clone)]
pub struct LaggedFrame {
    /// Input frame sorted by time with the generated columns appended.
    pub data: DataFrame,
    /// Base columns followed by every generated lag column.
    pub features: Vec<String>,
    /// Every generated lead column.
    pub targets: Vec<String>,
}

/// Name of the column generated for `base` at `offset`.
pub fn lag_column_name(base: &str, offset: i64) -> String {
    format!("{base}_{}", offset.unsigned_abs())
}

/// Append lagged and lead copies of `columns`, shifted within each entity.
///
/// The frame is first sorted by `time_key` (stable, so ties keep their input
/// order). Then for every offset, and every base column within it, a column
/// named `<base>_<|offset|>` is added. Rows at the edge of an entity's history
/// without a predecessor or successor get null.
///
/// Offset `0` yields a plain copy and counts as a feature. Values are shifted
/// as they are; only null marks a missing value.
///
/// Two offsets of equal magnitude name the same column. The later offset in
/// `offsets` wins: its values are kept at the position of the first column,
/// and the name is listed only under the later offset's role. With the
/// default offsets this means `<base>_1` is the one-period lag.
pub fn generate_lags(
    df: &DataFrame,
    columns: &[&str],
    entity_key: &str,
    time_key: &str,
    offsets: &[i64],
) -> Result<LaggedFrame> {
    ensure_columns(
        df,
        [entity_key, time_key].into_iter().chain(columns.iter().copied()),
    )?;
    debug!(rows = df.height(), ?columns, ?offsets, entity_key, time_key, "generating lags");

    let mut generated: Vec<Generated> = Vec::with_capacity(offsets.len() * columns.len());
    for &offset in offsets {
        for &column in columns {
            let next = Generated::new(column, offset, entity_key);
            match generated.iter_mut().find(|g| g.name == next.name) {
                Some(existing) => *existing = next,
                None => generated.push(next),
            }
        }
    }

    let mut features: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
    let mut targets = Vec::new();
    let mut exprs = Vec::with_capacity(generated.len());
    for g in generated {
        if g.offset < 0 {
            targets.push(g.name);
        } else {
            features.push(g.name);
        }
        exprs.push(g.expr);
    }

    let data = df
        .clone()
        .lazy()
        .sort(
            [time_key],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .with_columns(exprs)
        .collect()?;

    Ok(LaggedFrame {
        data,
        features,
        targets,
    })
}

/// A single generated column, before it is added to the frame.
#[derive(Debug)]
struct Generated {
    name: String,
    offset: i64,
    expr: Expr,
}

impl Generated {
    fn new(column: &str, offset: i64, entity_key: &str) -> Self {
        let name = lag_column_name(column, offset);
        // polars shift(n > 0) pulls from n rows earlier, so the offset maps 1:1
        let expr = col(column)
            .shift(lit(offset))
            .over([col(entity_key)])
            .alias(&name);
        Self { name, offset, expr }
    }
}

/// Configuration for [`LagGenerator`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LagConfig {
    /// Base columns to shift.
    pub columns: Vec<String>,
    /// Column identifying the entity each row belongs to.
    pub entity_key: String,
    /// Column giving the time order.
    pub time_key: String,
    /// Signed offsets: negative for leads (targets), positive for lags (features).
    pub offsets: Vec<i64>,
}

impl Default for LagConfig {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            entity_key: DEFAULT_ENTITY_KEY.to_string(),
            time_key: DEFAULT_TIME_KEY.to_string(),
            offsets: DEFAULT_LAG_OFFSETS.to_vec(),
        }
    }
}

/// Lag generation as a [`Transform`].
///
/// [`Transform::apply`] returns only the frame; use [`LagGenerator::generate`]
/// to also get the feature and target column lists.
#[derive(Debug, Clone, Default)]
pub struct LagGenerator {
    config: LagConfig,
}

impl LagGenerator {
    /// Generate the lagged frame together with its feature and target lists.
    pub fn generate(&self, df: &DataFrame) -> Result<LaggedFrame> {
        generate_lags(
            df,
            &as_strs(&self.config.columns),
            &self.config.entity_key,
            &self.config.time_key,
            &self.config.offsets,
        )
    }
}

impl Transform for LagGenerator {
    fn name(&self) -> &str {
        "generate_lags"
    }

    fn description(&self) -> &str {
        "Add per-entity lead (target) and lag (feature) columns"
    }

    fn kind(&self) -> TransformKind {
        TransformKind::Lag
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
        Ok(self.generate(df)?.data)
    }
}

impl ConfigurableTransform for LagGenerator {
    type Config = LagConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PrepError;
    use rstest::rstest;
    use std::collections::HashSet;

    fn values(df: &DataFrame, column: &str) -> Vec<Option<f64>> {
        df.column(column).unwrap().f64().unwrap().into_iter().collect()
    }

    fn panel() -> DataFrame {
        // Deliberately out of time order
        df![
            "cusip" => ["A", "B", "A", "B", "A"],
            "datadate" => ["2020-07-01", "2020-01-01", "2020-01-01", "2020-04-01", "2020-04-01"],
            "revtq" => [3.0, 10.0, 1.0, 20.0, 2.0]
        ]
        .unwrap()
    }

    fn entity(df: DataFrame, cusip: &str) -> DataFrame {
        df.lazy().filter(col("cusip").eq(lit(cusip))).collect().unwrap()
    }

    #[test]
    fn test_lead_sign_convention() {
        let lagged = generate_lags(&panel(), &["revtq"], "cusip", "datadate", &[-1]).unwrap();
        let a = entity(lagged.data, "A");

        // Offset -1 pulls the next period's value into the current row
        assert_eq!(values(&a, "revtq"), vec![Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(values(&a, "revtq_1"), vec![Some(2.0), Some(3.0), None]);
        assert_eq!(lagged.targets, vec!["revtq_1"]);
        assert_eq!(lagged.features, vec!["revtq"]);
    }

    #[test]
    fn test_lag_sign_convention() {
        let lagged = generate_lags(&panel(), &["revtq"], "cusip", "datadate", &[1]).unwrap();
        let b = entity(lagged.data, "B");

        // Offset 1 pulls the previous period's value
        assert_eq!(values(&b, "revtq"), vec![Some(10.0), Some(20.0)]);
        assert_eq!(values(&b, "revtq_1"), vec![None, Some(10.0)]);
        assert_eq!(lagged.features, vec!["revtq", "revtq_1"]);
        assert!(lagged.targets.is_empty());
    }

    #[test]
    fn test_multi_period_lead() {
        let lagged = generate_lags(&panel(), &["revtq"], "cusip", "datadate", &[-2]).unwrap();
        let a = entity(lagged.data, "A");

        assert_eq!(values(&a, "revtq_2"), vec![Some(3.0), None, None]);
    }

    #[test]
    fn test_output_sorted_by_time() {
        let lagged = generate_lags(&panel(), &["revtq"], "cusip", "datadate", &[1]).unwrap();
        let dates: Vec<Option<&str>> = lagged
            .data
            .column("datadate")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();

        assert_eq!(
            dates,
            vec![
                Some("2020-01-01"),
                Some("2020-01-01"),
                Some("2020-04-01"),
                Some("2020-04-01"),
                Some("2020-07-01")
            ]
        );
        // Stable sort: B precedes A on 2020-01-01 as in the input
        assert_eq!(values(&lagged.data, "revtq")[..2], [Some(10.0), Some(1.0)]);
    }

    #[rstest]
    #[case(&[])]
    #[case(&[1])]
    #[case(&[-1, 1])]
    #[case(&DEFAULT_LAG_OFFSETS)]
    #[case(&[-8, 3, 12])]
    fn test_row_count_preserved(#[case] offsets: &[i64]) {
        let df = panel();
        let lagged = generate_lags(&df, &["revtq"], "cusip", "datadate", offsets).unwrap();
        let magnitudes: HashSet<u64> = offsets.iter().map(|o| o.unsigned_abs()).collect();

        assert_eq!(lagged.data.height(), df.height());
        assert_eq!(lagged.data.width(), df.width() + magnitudes.len());
    }

    #[test]
    fn test_columns_partitioned_by_sign() {
        let df = df![
            "cusip" => ["A", "A"],
            "datadate" => ["2020-01-01", "2020-04-01"],
            "revtq" => [1.0, 2.0],
            "niq" => [0.1, 0.2]
        ]
        .unwrap();

        let lagged =
            generate_lags(&df, &["revtq", "niq"], "cusip", "datadate", &[-3, -1, 2]).unwrap();

        assert_eq!(lagged.targets, vec!["revtq_3", "niq_3", "revtq_1", "niq_1"]);
        assert_eq!(lagged.features, vec!["revtq", "niq", "revtq_2", "niq_2"]);
        for target in &lagged.targets {
            assert!(!lagged.features.contains(target));
        }
    }

    #[test]
    fn test_default_offsets_later_lag_wins() {
        let lagged =
            generate_lags(&panel(), &["revtq"], "cusip", "datadate", &DEFAULT_LAG_OFFSETS).unwrap();

        assert_eq!(
            lagged.targets,
            vec!["revtq_5", "revtq_4", "revtq_3", "revtq_2"]
        );
        assert_eq!(lagged.features, vec!["revtq", "revtq_1"]);

        // revtq_1 holds the lag, not the lead
        let a = entity(lagged.data, "A");
        assert_eq!(values(&a, "revtq_1"), vec![None, Some(1.0), Some(2.0)]);
    }

    #[test]
    fn test_zero_offset_is_feature_copy() {
        let lagged = generate_lags(&panel(), &["revtq"], "cusip", "datadate", &[0]).unwrap();

        assert_eq!(lagged.features, vec!["revtq", "revtq_0"]);
        assert_eq!(
            values(&lagged.data, "revtq_0"),
            values(&lagged.data, "revtq")
        );
    }

    #[test]
    fn test_empty_frame() {
        let df = df![
            "cusip" => Vec::<String>::new(),
            "datadate" => Vec::<String>::new(),
            "revtq" => Vec::<Option<f64>>::new()
        ]
        .unwrap();

        let lagged = generate_lags(&df, &["revtq"], "cusip", "datadate", &[-1, 2]).unwrap();

        assert_eq!(lagged.data.height(), 0);
        assert_eq!(lagged.data.width(), 5);
        assert_eq!(lagged.targets, vec!["revtq_1"]);
        assert_eq!(lagged.features, vec!["revtq", "revtq_2"]);
    }

    #[test]
    fn test_missing_time_key() {
        let df = df!["cusip" => ["A"], "revtq" => [1.0]].unwrap();

        assert!(matches!(
            generate_lags(&df, &["revtq"], "cusip", "datadate", &[1]),
            Err(PrepError::MissingColumn(c)) if c == "datadate"
        ));
    }

    #[test]
    fn test_generator_default_config() {
        let generator = LagGenerator::default();
        assert_eq!(generator.config().offsets, DEFAULT_LAG_OFFSETS.to_vec());
        assert_eq!(generator.required_columns(), vec!["cusip", "datadate"]);

        // Config is owned per instance; changing one leaves the default alone
        let mut config = generator.config().clone();
        config.offsets.push(2);
        let custom = LagGenerator::with_config(config);
        assert_eq!(custom.config().offsets.len(), 7);
        assert_eq!(LagGenerator::default().config().offsets.len(), 6);
    }

    #[test]
    fn test_generator_returns_lists() {
        let generator = LagGenerator::with_config(LagConfig {
            columns: vec!["revtq".to_string()],
            offsets: vec![-1],
            ..Default::default()
        });

        let lagged = generator.generate(&panel()).unwrap();
        assert_eq!(lagged.targets, vec!["revtq_1"]);
        assert_eq!(generator.apply(&panel()).unwrap().width(), 4);
    }
}
