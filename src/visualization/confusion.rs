//! Нормированная матрица ошибок

use std::collections::BTreeSet;

use ndarray::{Array2, Axis};

use crate::error::{PrepError, Result};
use crate::visualization::{Figure, FigureSink, Plot};

/// Матрица ошибок: строки по истинному классу, столбцы по предсказанному. Классы по возрастанию
pub fn confusion_matrix(y_test: &[i32], y_predict: &[i32]) -> Result<(Vec<i32>, Array2<u64>)> {
    if y_test.len() != y_predict.len() {
        return Err(PrepError::LengthMismatch {
            expected: y_test.len(),
            actual: y_predict.len(),
        });
    }

    let labels: Vec<i32> = y_test
        .iter()
        .chain(y_predict)
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let position = |label: i32| labels.binary_search(&label).ok();

    let mut matrix = Array2::zeros((labels.len(), labels.len()));
    for (actual, predicted) in y_test.iter().zip(y_predict) {
        if let (Some(i), Some(j)) = (position(*actual), position(*predicted)) {
            matrix[[i, j]] += 1;
        }
    }

    Ok((labels, matrix))
}

/// Нормирует строки на единицу; строка без истинных примеров становится NaN
pub fn normalize_rows(matrix: &Array2<u64>) -> Array2<f64> {
    let totals = matrix.sum_axis(Axis(1));
    let mut normalized = matrix.mapv(|v| v as f64);
    for (mut row, total) in normalized.rows_mut().into_iter().zip(totals.iter()) {
        if *total == 0 {
            tracing::warn!("Confusion matrix row without true samples");
        }
        row.mapv_inplace(|v| v / *total as f64);
    }
    normalized
}

pub fn plot_confusion_matrix(
    sink: &mut dyn FigureSink,
    y_test: &[i32],
    y_predict: &[i32],
    class_labels: &[String],
) -> Result<()> {
    let (labels, matrix) = confusion_matrix(y_test, y_predict)?;
    let tick_labels: Vec<String> = if class_labels.is_empty() {
        labels.iter().map(i32::to_string).collect()
    } else if class_labels.len() == labels.len() {
        class_labels.to_vec()
    } else {
        return Err(PrepError::LengthMismatch {
            expected: labels.len(),
            actual: class_labels.len(),
        });
    };

    let normalized = normalize_rows(&matrix);
    let values: Vec<Vec<f64>> = normalized.rows().into_iter().map(|row| row.to_vec()).collect();
    let annotations: Vec<Vec<String>> = values
        .iter()
        .map(|row| {
            row.iter()
                .map(|v| format!("{}", (v * 100.0).round() / 100.0))
                .collect::<Vec<String>>()
        })
        .collect();

    sink.render(Figure {
        name: "confusion_matrix".to_string(),
        title: "normalized confusion matrix".to_string(),
        x_label: "predicted class".to_string(),
        y_label: "true class".to_string(),
        plot: Plot::Heatmap {
            row_labels: tick_labels.clone(),
            column_labels: tick_labels,
            values,
            annotations: Some(annotations),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualization::FigureCollector;
    use ndarray::array;

    #[test]
    fn counts_over_sorted_union_of_labels() {
        let (labels, matrix) = confusion_matrix(&[2, 0, 2, 1], &[2, 0, 1, 1]).unwrap();
        assert_eq!(labels, vec![0, 1, 2]);
        assert_eq!(matrix, array![[1u64, 0, 0], [0, 1, 0], [0, 1, 1]]);
    }

    #[test]
    fn rows_sum_to_one() {
        let mut sink = FigureCollector::new();
        let labels = vec!["<1919".to_string(), "1919-1944".to_string(), "1945-1964".to_string()];
        plot_confusion_matrix(&mut sink, &[0, 0, 0, 1, 2, 2], &[0, 1, 1, 1, 2, 0], &labels).unwrap();

        match &sink.figures()[0].plot {
            Plot::Heatmap { values, annotations, row_labels, .. } => {
                assert_eq!(row_labels, &labels);
                for row in values {
                    assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-12);
                }
                let annotations = annotations.as_ref().unwrap();
                assert_eq!(annotations[0], vec!["0.33", "0.67", "0"]);
            }
            other => panic!("unexpected plot {other:?}"),
        }
    }

    #[test]
    fn label_count_must_match_classes() {
        let result = plot_confusion_matrix(&mut FigureCollector::new(), &[0, 1], &[0, 1], &["a".to_string()]);
        assert!(matches!(result, Err(PrepError::LengthMismatch { expected: 2, actual: 1 })));
    }
}
