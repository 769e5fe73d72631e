//! Нормализация признаков (min-max)

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, Axis};

use crate::error::{PrepError, Result};
use crate::types::{BuildingTable, SplitPair};

/// Масштабирует каждый признак в [0, 1] по диапазону, выученному на обучающей выборке
#[derive(Debug, Clone, Default)]
pub struct MinMaxScaler {
    min: Option<Array1<f64>>,
    scale: Option<Array1<f64>>,
}

impl MinMaxScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        self.min.is_some() && self.scale.is_some()
    }

    pub fn fit(&mut self, X: &Array2<f64>) -> Result<()> {
        if X.nrows() == 0 {
            return Err(PrepError::EmptyResult("cannot fit scaler on an empty table".to_string()));
        }

        // Пропуски (NaN) не участвуют в вычислении диапазона
        let min = X.map_axis(Axis(0), |col| {
            col.iter().copied().filter(|v| !v.is_nan()).fold(f64::NAN, f64::min)
        });
        let max = X.map_axis(Axis(0), |col| {
            col.iter().copied().filter(|v| !v.is_nan()).fold(f64::NAN, f64::max)
        });

        // Постоянный признак: избегаем деления на ноль, значения станут 0
        let scale = (&max - &min).mapv(|range| if range.is_nan() || range < 1e-10 { 1.0 } else { range });

        self.min = Some(min);
        self.scale = Some(scale);
        Ok(())
    }

    pub fn transform(&self, X: &Array2<f64>) -> Result<Array2<f64>> {
        let (min, scale) = match (&self.min, &self.scale) {
            (Some(min), Some(scale)) => (min, scale),
            _ => return Err(PrepError::EmptyResult("scaler is not fitted".to_string())),
        };
        if X.ncols() != min.len() {
            return Err(PrepError::LengthMismatch {
                expected: min.len(),
                actual: X.ncols(),
            });
        }

        // (X - min) / (max - min); NaN остаётся NaN
        let mut scaled = X.clone();
        for mut row in scaled.rows_mut() {
            for (i, val) in row.iter_mut().enumerate() {
                *val = (*val - min[i]) / scale[i];
            }
        }

        Ok(scaled)
    }

    pub fn fit_transform(&mut self, X: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(X)?;
        self.transform(X)
    }
}

/// Обучает масштабирование на train и применяет его же к test
pub fn normalize_features(train: &BuildingTable, test: &BuildingTable) -> Result<SplitPair> {
    let train_columns = train.feature_columns();
    let test_columns = test.feature_columns();
    if let Some(missing) = train_columns.iter().find(|c| !test_columns.contains(c)) {
        return Err(PrepError::MissingColumn(missing.clone()));
    }
    if train_columns != test_columns {
        return Err(PrepError::LengthMismatch {
            expected: train_columns.len(),
            actual: test_columns.len(),
        });
    }

    let mut scaler = MinMaxScaler::new();
    let train_scaled = scaler.fit_transform(&train.feature_matrix())?;
    let test_scaled = scaler.transform(&test.feature_matrix())?;

    tracing::debug!("Normalized {} feature columns", train_columns.len());

    Ok(SplitPair {
        train: train.with_feature_matrix(&train_scaled)?,
        test: test.with_feature_matrix(&test_scaled)?,
    })
}
