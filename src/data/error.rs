use thiserror::Error;

/// Input that cannot be turned into typed rows at all.
///
/// Data-quality problems (missing values, zero population, early years) are
/// not errors; they are filtered out by [`super::filter`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input is missing required column '{0}'")]
    MissingColumn(String),

    #[error("row {row}, column '{column}': '{value}' is not a valid {expected}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
        expected: &'static str,
    },

    #[error("column '{column}' has unsupported type {data_type}")]
    UnsupportedColumnType { column: String, data_type: String },

    #[error("row {0} is not a JSON object")]
    NotAnObject(usize),

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}
