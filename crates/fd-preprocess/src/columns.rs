//! Column lookup and dtype checks shared by the transforms.

use crate::{PrepError, Result};
use polars::prelude::*;

/// Look up a column's dtype, failing with [`PrepError::MissingColumn`].
pub(crate) fn dtype_of<'a>(df: &'a DataFrame, name: &str) -> Result<&'a DataType> {
    df.column(name)
        .map(|c| c.dtype())
        .map_err(|_| PrepError::MissingColumn(name.to_string()))
}

/// Ensure every named column exists in `df`.
pub(crate) fn ensure_columns<'a, I>(df: &DataFrame, names: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    for name in names {
        dtype_of(df, name)?;
    }
    Ok(())
}

/// Ensure every named column exists and holds numbers.
///
/// An all-null column of dtype `Null` passes: it is missing data, not text.
pub(crate) fn ensure_numeric(df: &DataFrame, names: &[&str]) -> Result<()> {
    for &name in names {
        let dtype = dtype_of(df, name)?;
        if !(dtype.is_primitive_numeric() || matches!(dtype, DataType::Null)) {
            return Err(PrepError::TypeMismatch {
                column: name.to_string(),
                expected: "numeric",
                found: dtype.to_string(),
            });
        }
    }
    Ok(())
}

/// Ensure the named column exists and holds dates or datetimes.
pub(crate) fn ensure_temporal(df: &DataFrame, name: &str) -> Result<()> {
    match dtype_of(df, name)? {
        DataType::Date | DataType::Datetime(_, _) => Ok(()),
        other => Err(PrepError::TypeMismatch {
            column: name.to_string(),
            expected: "date or datetime",
            found: other.to_string(),
        }),
    }
}
