#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod columns;
pub mod error;
pub mod fill;
pub mod lag;
pub mod traits;
pub mod ttm;

// Re-export core types
pub use error::{PrepError, Result};
pub use fill::{
    ForwardFill, ForwardFillConfig, MedianFill, MedianFillConfig, forward_fill, median_fill,
};
pub use lag::{DEFAULT_LAG_OFFSETS, LagConfig, LagGenerator, LaggedFrame, generate_lags};
pub use traits::{ConfigurableTransform, Transform, TransformConfig, TransformKind};
pub use ttm::{
    DEFAULT_TTM_COLUMNS, TTM_MIN_OBSERVATIONS, TTM_WINDOW, TtmAggregator, TtmConfig, ttm_aggregate,
};

/// Default entity key column (CUSIP security identifier).
pub const DEFAULT_ENTITY_KEY: &str = "cusip";

/// Default time key column (report date).
pub const DEFAULT_TIME_KEY: &str = "datadate";

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
