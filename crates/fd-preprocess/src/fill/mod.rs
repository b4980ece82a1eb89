//! Missing-value fills.
//!
//! Forward fill carries an entity's last known value through its own history;
//! median fill borrows from the cross-section of all entities on the same date.

pub mod forward;
pub mod median;

pub use forward::{ForwardFill, ForwardFillConfig, forward_fill};
pub use median::{MedianFill, MedianFillConfig, median_fill};
