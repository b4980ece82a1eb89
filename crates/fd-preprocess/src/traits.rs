//! Core trait definitions for transforms.
//!
//! Every transform implements [`Transform`], which gives callers a uniform way
//! to inspect what a step needs and to apply it to a panel `DataFrame`.

use crate::Result;
use derive_more::Display;
use polars::prelude::*;

/// Broad family a transform belongs to.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    /// Replaces missing values, row count unchanged
    Fill,
    /// Adds shifted copies of columns
    Lag,
    /// Replaces values by windowed aggregates
    Aggregate,
}

/// A stateless transformation of a panel (one row per entity per date).
///
/// Implementations never mutate their input; `apply` always builds a new
/// frame.
pub trait Transform: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this transform.
    fn name(&self) -> &str;

    /// Human-readable description of what this transform does.
    fn description(&self) -> &str;

    /// Family of the transform.
    fn kind(&self) -> TransformKind;

    /// Columns that must be present in the input frame.
    ///
    /// Key columns come first, followed by the configured value columns.
    fn required_columns(&self) -> Vec<&str>;

    /// Apply the transform, returning a new frame.
    fn apply(&self, df: &DataFrame) -> Result<DataFrame>;
}

/// Marker trait for transform configuration types.
pub trait TransformConfig: Default + Clone + Send + Sync + std::fmt::Debug {}

/// A transform whose columns and keys are set by a configuration value.
pub trait ConfigurableTransform: Transform {
    /// Configuration type for this transform.
    type Config: TransformConfig;

    /// Create a new transform with the given configuration.
    fn with_config(config: Self::Config) -> Self;

    /// Returns the current configuration.
    fn config(&self) -> &Self::Config;
}

/// Blanket implementation for any type that satisfies the trait bounds.
impl<T: Default + Clone + Send + Sync + std::fmt::Debug> TransformConfig for T {}

/// Borrow a list of owned column names as `&str`.
pub(crate) fn as_strs(columns: &[String]) -> Vec<&str> {
    columns.iter().map(String::as_str).collect()
}
