//! Балансировка классов возраста случайным undersampling

#![allow(non_snake_case)]

use std::collections::BTreeMap;

use crate::error::{PrepError, Result};
use crate::preprocessing::feature_engineering::{age_bins, join_target_var, split_target_var};
use crate::schema;
use crate::types::{BuildingTable, Seed};
use crate::visualization::{self, FigureSink};

/// Индексы строк каждого класса возраста (классы по возрастанию)
fn class_indices(y: &[Option<i32>]) -> BTreeMap<i32, Vec<usize>> {
    let mut classes: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (i, age) in y.iter().enumerate() {
        if let Some(age) = age {
            classes.entry(*age).or_default().push(i);
        }
    }
    classes
}

/// Случайно удаляет строки перепредставленных классов, пока все классы не сравняются с наименьшим
pub fn undersample_skewed_distribution(
    table: &BuildingTable,
    seed: Seed,
    sink: &mut dyn FigureSink,
) -> Result<BuildingTable> {
    let (X, y) = split_target_var(table)?;

    let classes = class_indices(&y);
    if classes.len() < 2 {
        return Err(PrepError::DegenerateClass {
            classes: classes.len(),
        });
    }
    let target_count = classes.values().map(Vec::len).min().unwrap_or(0);

    let mut rng = seed.rng();
    let mut kept: Vec<usize> = Vec::with_capacity(target_count * classes.len());
    for indices in classes.values() {
        let mut chosen: Vec<usize> = rand::seq::index::sample(&mut rng, indices.len(), target_count)
            .into_iter()
            .map(|i| indices[i])
            .collect();
        chosen.sort_unstable();
        kept.extend(chosen);
    }

    let undersampled_X = X.with_records(kept.iter().map(|&i| X.records()[i].clone()).collect());
    let undersampled_y: Vec<Option<i32>> = kept.iter().map(|&i| y[i]).collect();

    let before: Vec<f64> = y.iter().flatten().map(|&a| f64::from(a)).collect();
    let after: Vec<f64> = undersampled_y.iter().flatten().map(|&a| f64::from(a)).collect();
    let after_ages: Vec<i32> = undersampled_y.iter().flatten().copied().collect();
    let edges: Vec<f64> = age_bins(&after_ages, schema::AGE_BIN_SIZE)?
        .into_iter()
        .map(f64::from)
        .collect();
    sink.render(visualization::overlaid_histogram(
        "undersampling",
        "age distributions",
        &[("undersampled", after.as_slice()), ("original", before.as_slice())],
        Some(&edges),
        &[],
    )?)?;

    let distribution: Vec<(i32, usize)> = class_indices(&undersampled_y)
        .into_iter()
        .map(|(age, rows)| (age, rows.len()))
        .collect();
    tracing::info!("Downsampling distribution results in: {:?}", distribution);

    join_target_var(&undersampled_X, &undersampled_y)
}
