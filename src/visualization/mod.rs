//! Диагностические графики
//!
//! Каждая функция строит [`Figure`] (данные графика без оформления) и отдаёт её в [`FigureSink`].
//! Отрисовка остаётся на стороне потребителя: фронтенда, ноутбука или другого бэкенда.

pub mod confusion;
pub mod distributions;
pub mod feature_over_time;
pub mod training;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};

pub use confusion::plot_confusion_matrix;
pub use distributions::{
    overlaid_histogram, plot_grid, plot_histogram, plot_prediction_error_histogram,
};
pub use feature_over_time::plot_feature_over_time;
pub use training::{plot_classification_error, plot_log_loss, EvalHistory};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    /// Короткое имя, используется в имени файла
    pub name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub plot: Plot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSeries {
    pub label: String,
    pub counts: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marginal {
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeries {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub band: Option<Band>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Plot {
    /// Несколько гистограмм на общих границах корзин
    Histogram {
        edges: Vec<f64>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tick_labels: Vec<String>,
        series: Vec<HistogramSeries>,
    },
    /// Совместная плотность с маргинальными гистограммами
    JointGrid {
        extent: [f64; 2],
        /// density[row][col]: строки по y, столбцы по x
        density: Vec<Vec<u64>>,
        marginal_x: Marginal,
        marginal_y: Marginal,
        reference_line: [[f64; 2]; 2],
    },
    Line {
        series: Vec<LineSeries>,
    },
    Heatmap {
        row_labels: Vec<String>,
        column_labels: Vec<String>,
        values: Vec<Vec<f64>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        annotations: Option<Vec<Vec<String>>>,
    },
}

/// Бэкенд отрисовки
pub trait FigureSink {
    fn render(&mut self, figure: Figure) -> Result<()>;
}

/// Собирает фигуры в памяти
#[derive(Debug, Default)]
pub struct FigureCollector {
    figures: Vec<Figure>,
}

impl FigureCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn figures(&self) -> &[Figure] {
        &self.figures
    }

    pub fn into_figures(self) -> Vec<Figure> {
        self.figures
    }
}

impl FigureSink for FigureCollector {
    fn render(&mut self, figure: Figure) -> Result<()> {
        self.figures.push(figure);
        Ok(())
    }
}

/// Пишет каждую фигуру в отдельный JSON-файл `NN_<name>.json`
#[derive(Debug)]
pub struct JsonFigureWriter {
    dir: PathBuf,
    written: usize,
}

impl JsonFigureWriter {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, written: 0 })
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl FigureSink for JsonFigureWriter {
    fn render(&mut self, figure: Figure) -> Result<()> {
        let path = self.dir.join(format!("{:02}_{}.json", self.written, figure.name));
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, &figure)?;
        writer.flush()?;
        self.written += 1;

        tracing::info!("Figure '{}' written to {}", figure.title, path.display());
        Ok(())
    }
}

/// Проверка, что ряды цели и предсказаний одной длины
pub(crate) fn ensure_same_len(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.len() != predicted.len() {
        return Err(PrepError::LengthMismatch {
            expected: actual.len(),
            actual: predicted.len(),
        });
    }
    Ok(())
}

/// Квантиль отсортированного ряда с линейной интерполяцией
pub(crate) fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Отсортированные значения без NaN
pub(crate) fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Равномерные границы от min до max
pub(crate) fn linspace_edges(min: f64, max: f64, bins: usize) -> Vec<f64> {
    let (min, max) = if (max - min).abs() < f64::EPSILON {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let bins = bins.max(1);
    let width = (max - min) / bins as f64;
    (0..=bins)
        .map(|i| if i == bins { max } else { min + width * i as f64 })
        .collect()
}

/// Корзина значения: [edge[i], edge[i + 1]), последняя корзина закрыта справа
pub(crate) fn bin_index(value: f64, edges: &[f64]) -> Option<usize> {
    let (first, last) = (*edges.first()?, *edges.last()?);
    if !value.is_finite() || value < first || value > last || edges.len() < 2 {
        return None;
    }
    if value == last {
        return Some(edges.len() - 2);
    }
    // partition_point: число границ <= value
    Some(edges.partition_point(|e| *e <= value) - 1)
}

pub(crate) fn histogram_counts(values: &[f64], edges: &[f64]) -> Vec<u64> {
    let mut counts = vec![0u64; edges.len().saturating_sub(1)];
    for value in values {
        if let Some(idx) = bin_index(*value, edges) {
            counts[idx] += 1;
        }
    }
    counts
}
