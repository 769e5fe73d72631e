//! Подготовка данных и диагностические графики для предсказания возраста зданий

pub mod config;
pub mod error;
pub mod pipeline;
pub mod preprocessing;
pub mod schema;
pub mod types;
pub mod visualization;

pub use error::{PrepError, Result};
pub use types::*;
pub use preprocessing::*;

// Re-export для удобства
pub use config::{PipelineConfig, PipelineStep, SplitStrategy};
pub use visualization::{Figure, FigureCollector, FigureSink, JsonFigureWriter};
