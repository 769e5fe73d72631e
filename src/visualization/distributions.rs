//! Распределения возраста: гистограммы, совместная сетка, ошибки предсказания

use crate::error::{PrepError, Result};
use crate::visualization::{
    ensure_same_len, histogram_counts, linspace_edges, quantile, sorted_finite, Figure, FigureSink,
    HistogramSeries, Marginal, Plot,
};

const MAX_AUTO_BINS: usize = 50;
const GRID_SIZE: usize = 30;
const MARGINAL_BINS: usize = 10;
const ERROR_BINS: usize = 40;

/// Число корзин по правилу Фридмана-Диакониса
fn freedman_diaconis_bins(sorted: &[f64]) -> usize {
    let n = sorted.len();
    if n < 2 {
        return 1;
    }
    let iqr = quantile(sorted, 0.75) - quantile(sorted, 0.25);
    let width = 2.0 * iqr / (n as f64).cbrt();
    let bins = if width > 0.0 {
        ((sorted[n - 1] - sorted[0]) / width).ceil() as usize
    } else {
        (n as f64).sqrt().ceil() as usize
    };
    bins.clamp(1, MAX_AUTO_BINS)
}

/// Общие границы для нескольких рядов
fn shared_edges(series: &[(&str, &[f64])]) -> Result<Vec<f64>> {
    let all: Vec<f64> = series.iter().flat_map(|(_, values)| values.iter().copied()).collect();
    let sorted = sorted_finite(&all);
    match (sorted.first(), sorted.last()) {
        (Some(&min), Some(&max)) => Ok(linspace_edges(min, max, freedman_diaconis_bins(&sorted))),
        _ => Err(PrepError::EmptyResult("no finite values to histogram".to_string())),
    }
}

/// Наложенные гистограммы на общих корзинах
pub fn overlaid_histogram(
    name: &str,
    title: &str,
    series: &[(&str, &[f64])],
    bins: Option<&[f64]>,
    tick_labels: &[String],
) -> Result<Figure> {
    let edges = match bins {
        Some(edges) if edges.len() >= 2 => edges.to_vec(),
        _ => shared_edges(series)?,
    };

    let series = series
        .iter()
        .map(|(label, values)| HistogramSeries {
            label: label.to_string(),
            counts: histogram_counts(values, &edges),
        })
        .collect();

    Ok(Figure {
        name: name.to_string(),
        title: title.to_string(),
        x_label: "age".to_string(),
        y_label: "count".to_string(),
        plot: Plot::Histogram {
            edges,
            tick_labels: tick_labels.to_vec(),
            series,
        },
    })
}

pub fn plot_histogram(
    sink: &mut dyn FigureSink,
    y_test: &[f64],
    y_predict: &[f64],
    bins: Option<&[f64]>,
    bin_labels: &[String],
) -> Result<()> {
    let figure = overlaid_histogram(
        "age_distributions",
        "age distributions",
        &[("y_predict", y_predict), ("y_test", y_test)],
        bins,
        bin_labels,
    )?;
    sink.render(figure)
}

/// Плотность (предсказание, цель) с диагональю идеального предсказания
pub fn plot_grid(sink: &mut dyn FigureSink, y_test: &[f64], y_predict: &[f64]) -> Result<()> {
    ensure_same_len(y_test, y_predict)?;

    let predicted = sorted_finite(y_predict);
    let (min_age, max_age) = match (predicted.first(), predicted.last()) {
        (Some(min), Some(max)) => (min.trunc(), max.trunc()),
        _ => return Err(PrepError::EmptyResult("no predictions to plot".to_string())),
    };
    let edges = linspace_edges(min_age, max_age, GRID_SIZE);

    let mut density = vec![vec![0u64; GRID_SIZE]; GRID_SIZE];
    for (target, prediction) in y_test.iter().zip(y_predict) {
        let x = super::bin_index(*prediction, &edges);
        let y = super::bin_index(*target, &edges);
        if let (Some(x), Some(y)) = (x, y) {
            density[y][x] += 1;
        }
    }

    let marginal = |values: &[f64]| -> Marginal {
        let sorted = sorted_finite(values);
        let edges = match (sorted.first(), sorted.last()) {
            (Some(&min), Some(&max)) => linspace_edges(min, max, MARGINAL_BINS),
            _ => linspace_edges(min_age, max_age, MARGINAL_BINS),
        };
        let counts = histogram_counts(values, &edges);
        Marginal { edges, counts }
    };

    sink.render(Figure {
        name: "age_joint_grid".to_string(),
        title: "predicted vs. target ages".to_string(),
        x_label: "Predicted ages in years".to_string(),
        y_label: "Target ages in years".to_string(),
        plot: Plot::JointGrid {
            extent: [min_age, max_age],
            density,
            marginal_x: marginal(y_predict),
            marginal_y: marginal(y_test),
            reference_line: [[min_age, min_age], [max_age, max_age]],
        },
    })
}

/// Гистограмма остатков (цель - предсказание)
pub fn plot_prediction_error_histogram(
    sink: &mut dyn FigureSink,
    y_test: &[f64],
    y_predict: &[f64],
) -> Result<()> {
    ensure_same_len(y_test, y_predict)?;

    let errors: Vec<f64> = y_test.iter().zip(y_predict).map(|(a, p)| a - p).collect();
    let sorted = sorted_finite(&errors);
    let edges = match (sorted.first(), sorted.last()) {
        (Some(&min), Some(&max)) => linspace_edges(min, max, ERROR_BINS),
        _ => return Err(PrepError::EmptyResult("no prediction errors to plot".to_string())),
    };

    sink.render(Figure {
        name: "prediction_errors".to_string(),
        title: "Histogram of prediction errors".to_string(),
        x_label: "error in years".to_string(),
        y_label: "count".to_string(),
        plot: Plot::Histogram {
            series: vec![HistogramSeries {
                label: "error".to_string(),
                counts: histogram_counts(&errors, &edges),
            }],
            edges,
            tick_labels: Vec::new(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualization::FigureCollector;

    fn single(sink: FigureCollector) -> Figure {
        let mut figures = sink.into_figures();
        assert_eq!(figures.len(), 1);
        figures.remove(0)
    }

    #[test]
    fn histograms_share_binning() {
        let mut sink = FigureCollector::new();
        let y_test = [1950.0, 1960.0, 1970.0, 1980.0];
        let y_predict = [1955.0, 1955.0, 1975.0, 2000.0];
        plot_histogram(&mut sink, &y_test, &y_predict, None, &[]).unwrap();

        match single(sink).plot {
            Plot::Histogram { edges, series, .. } => {
                assert_eq!(edges.first(), Some(&1950.0));
                assert_eq!(edges.last(), Some(&2000.0));
                assert_eq!(series[0].label, "y_predict");
                assert_eq!(series[0].counts.len(), edges.len() - 1);
                assert_eq!(series[1].counts.len(), edges.len() - 1);
                assert_eq!(series[0].counts.iter().sum::<u64>(), 4);
                assert_eq!(series[1].counts.iter().sum::<u64>(), 4);
            }
            other => panic!("unexpected plot {other:?}"),
        }
    }

    #[test]
    fn explicit_bins_and_labels_are_kept() {
        let mut sink = FigureCollector::new();
        let bins = [0.0, 1.0, 2.0];
        let labels = vec!["old".to_string(), "new".to_string()];
        plot_histogram(&mut sink, &[0.5, 1.5], &[1.5, 1.5], Some(&bins), &labels).unwrap();

        match single(sink).plot {
            Plot::Histogram { edges, tick_labels, series } => {
                assert_eq!(edges, bins.to_vec());
                assert_eq!(tick_labels, labels);
                assert_eq!(series[0].counts, vec![0, 2]);
                assert_eq!(series[1].counts, vec![1, 1]);
            }
            other => panic!("unexpected plot {other:?}"),
        }
    }

    #[test]
    fn joint_grid_counts_pairs_and_draws_diagonal() {
        let mut sink = FigureCollector::new();
        let y_test = [1900.0, 1950.0, 2000.0];
        let y_predict = [1900.0, 1950.0, 2000.0];
        plot_grid(&mut sink, &y_test, &y_predict).unwrap();

        match single(sink).plot {
            Plot::JointGrid { extent, density, reference_line, marginal_x, .. } => {
                assert_eq!(extent, [1900.0, 2000.0]);
                assert_eq!(reference_line, [[1900.0, 1900.0], [2000.0, 2000.0]]);
                assert_eq!(density.iter().flatten().sum::<u64>(), 3);
                assert_eq!(density[0][0], 1);
                assert_eq!(density[GRID_SIZE - 1][GRID_SIZE - 1], 1);
                assert_eq!(marginal_x.counts.iter().sum::<u64>(), 3);
            }
            other => panic!("unexpected plot {other:?}"),
        }
    }

    #[test]
    fn prediction_errors_are_actual_minus_predicted() {
        let mut sink = FigureCollector::new();
        plot_prediction_error_histogram(&mut sink, &[2000.0, 1990.0, 1950.0], &[1990.0, 1990.0, 1970.0]).unwrap();

        match single(sink).plot {
            Plot::Histogram { edges, series, .. } => {
                assert_eq!(edges.len(), ERROR_BINS + 1);
                assert_eq!(edges.first(), Some(&-20.0));
                assert_eq!(edges.last(), Some(&10.0));
                assert_eq!(series[0].counts.iter().sum::<u64>(), 3);
            }
            other => panic!("unexpected plot {other:?}"),
        }
    }

    #[test]
    fn mismatched_series_are_rejected() {
        let mut sink = FigureCollector::new();
        assert!(matches!(
            plot_grid(&mut sink, &[1.0, 2.0], &[1.0]),
            Err(PrepError::LengthMismatch { expected: 2, actual: 1 })
        ));
    }
}
