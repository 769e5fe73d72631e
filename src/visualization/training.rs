//! Кривые обучения внешней модели (XGBoost `evals_result()`)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};
use crate::visualization::{Figure, FigureSink, LineSeries, Plot};

const TRAIN_SET: &str = "validation_0";
const TEST_SET: &str = "validation_1";
const LOG_LOSS: &str = "mlogloss";
const CLASSIFICATION_ERROR: &str = "merror";

/// История метрик: набор данных -> метрика -> значение на каждой эпохе
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvalHistory(BTreeMap<String, BTreeMap<String, Vec<f64>>>);

impl EvalHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, dataset: &str, metric: &str, values: Vec<f64>) {
        self.0
            .entry(dataset.to_string())
            .or_default()
            .insert(metric.to_string(), values);
    }

    pub fn series(&self, dataset: &str, metric: &str) -> Result<&[f64]> {
        self.0
            .get(dataset)
            .and_then(|metrics| metrics.get(metric))
            .map(Vec::as_slice)
            .ok_or_else(|| PrepError::MissingMetric {
                dataset: dataset.to_string(),
                metric: metric.to_string(),
            })
    }

    /// Число эпох определяется по ошибке классификации на обучающем наборе
    pub fn epochs(&self) -> Result<usize> {
        Ok(self.series(TRAIN_SET, CLASSIFICATION_ERROR)?.len())
    }
}

fn plot_metric(
    sink: &mut dyn FigureSink,
    history: &EvalHistory,
    metric: &str,
    name: &str,
    y_label: &str,
) -> Result<()> {
    let epochs = history.epochs()?;
    let x: Vec<f64> = (0..epochs).map(|e| e as f64).collect();

    let curve = |dataset: &str, label: &str| -> Result<LineSeries> {
        let values = history.series(dataset, metric)?;
        if values.len() != epochs {
            return Err(PrepError::LengthMismatch {
                expected: epochs,
                actual: values.len(),
            });
        }
        Ok(LineSeries {
            label: label.to_string(),
            x: x.clone(),
            y: values.to_vec(),
            band: None,
        })
    };

    sink.render(Figure {
        name: name.to_string(),
        title: format!("XGBoost {y_label}"),
        x_label: "epoch".to_string(),
        y_label: y_label.to_string(),
        plot: Plot::Line {
            series: vec![curve(TRAIN_SET, "Train")?, curve(TEST_SET, "Test")?],
        },
    })
}

pub fn plot_log_loss(sink: &mut dyn FigureSink, history: &EvalHistory) -> Result<()> {
    plot_metric(sink, history, LOG_LOSS, "log_loss", "Log Loss")
}

pub fn plot_classification_error(sink: &mut dyn FigureSink, history: &EvalHistory) -> Result<()> {
    plot_metric(sink, history, CLASSIFICATION_ERROR, "classification_error", "Classification Error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualization::FigureCollector;

    fn history() -> EvalHistory {
        serde_json::from_str(
            r#"{
                "validation_0": {"merror": [0.5, 0.4, 0.3], "mlogloss": [1.2, 1.0, 0.9]},
                "validation_1": {"merror": [0.6, 0.5, 0.45], "mlogloss": [1.3, 1.2, 1.15]}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn log_loss_has_train_and_test_curves() {
        let mut sink = FigureCollector::new();
        plot_log_loss(&mut sink, &history()).unwrap();

        let figure = &sink.figures()[0];
        assert_eq!(figure.title, "XGBoost Log Loss");
        match &figure.plot {
            Plot::Line { series } => {
                assert_eq!(series.len(), 2);
                assert_eq!(series[0].label, "Train");
                assert_eq!(series[0].x, vec![0.0, 1.0, 2.0]);
                assert_eq!(series[1].y, vec![1.3, 1.2, 1.15]);
            }
            other => panic!("unexpected plot {other:?}"),
        }
    }

    #[test]
    fn classification_error_uses_merror() {
        let mut sink = FigureCollector::new();
        plot_classification_error(&mut sink, &history()).unwrap();

        match &sink.figures()[0].plot {
            Plot::Line { series } => assert_eq!(series[0].y, vec![0.5, 0.4, 0.3]),
            other => panic!("unexpected plot {other:?}"),
        }
    }

    #[test]
    fn missing_validation_set_is_reported() {
        let mut history = EvalHistory::new();
        history.record("validation_0", "merror", vec![0.5]);
        history.record("validation_0", "mlogloss", vec![1.0]);

        let err = plot_log_loss(&mut FigureCollector::new(), &history).unwrap_err();
        assert!(matches!(err, PrepError::MissingMetric { ref dataset, .. } if dataset == "validation_1"));
    }
}
