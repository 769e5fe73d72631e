//! Ошибки предобработки и визуализации

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrepError {
    /// В таблице нет обязательного столбца
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Для балансировки нужно минимум два класса
    #[error("Degenerate class distribution: {classes} class(es), nothing to balance")]
    DegenerateClass { classes: usize },

    /// Фильтр или разбиение не оставили ни одной строки
    #[error("Empty result: {0}")]
    EmptyResult(String),

    #[error("Invalid seed {0}: seed must be non-negative")]
    InvalidSeed(i64),

    #[error("Missing metric '{metric}' for '{dataset}' in evaluation history")]
    MissingMetric { dataset: String, metric: String },

    #[error("Length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PrepError>;
