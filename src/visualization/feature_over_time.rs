//! Изменение признаков во времени (по округлённому возрасту здания)

use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;
use crate::preprocessing::{remove_outliers, round_age};
use crate::types::{Attribute, BuildingTable, Column};
use crate::visualization::{quantile, sorted_finite, Band, Figure, FigureSink, LineSeries, Plot};

const WINSOR_LOWER: f64 = 0.005;
const WINSOR_UPPER: f64 = 0.995;
/// z-оценка для 99% доверительного интервала
const Z_99: f64 = 2.5758;

/// Для каждого столбца кроме id: категориальные -> тепловая карта (категория x возраст),
/// числовые -> среднее по возрасту с 99% доверительным интервалом
pub fn plot_feature_over_time(
    sink: &mut dyn FigureSink,
    table: &BuildingTable,
    feature_selection: Option<&[&str]>,
) -> Result<()> {
    table.require(Attribute::Age)?;
    let table = round_age(&remove_outliers(table)?)?;
    let ages: Vec<Option<i32>> = table.ages()?;

    for (name, column) in table.columns() {
        if feature_selection.is_some_and(|selection| !selection.contains(&name.as_str())) {
            continue;
        }

        let figure = match column {
            Column::Categorical(values) => category_heatmap(&name, &ages, &values),
            Column::Numeric(values) => match mean_over_time(&name, &ages, &values) {
                Some(figure) => figure,
                None => {
                    tracing::warn!("Feature '{}' has no values to plot", name);
                    continue;
                }
            },
        };
        sink.render(figure)?;
    }

    Ok(())
}

fn category_heatmap(name: &str, ages: &[Option<i32>], values: &[Option<String>]) -> Figure {
    let mut counts: BTreeMap<(&str, i32), u64> = BTreeMap::new();
    for (age, value) in ages.iter().zip(values) {
        if let (Some(age), Some(value)) = (age, value) {
            *counts.entry((value.as_str(), *age)).or_insert(0) += 1;
        }
    }

    let categories: Vec<&str> = counts.keys().map(|(c, _)| *c).collect::<BTreeSet<_>>().into_iter().collect();
    let buckets: Vec<i32> = counts.keys().map(|(_, a)| *a).collect::<BTreeSet<_>>().into_iter().collect();

    let grid: Vec<Vec<f64>> = categories
        .iter()
        .map(|category| {
            buckets
                .iter()
                .map(|age| counts.get(&(*category, *age)).copied().unwrap_or(0) as f64)
                .collect::<Vec<f64>>()
        })
        .collect();

    Figure {
        name: format!("feature_over_time_{name}"),
        title: format!("{name} over time"),
        x_label: "age".to_string(),
        y_label: name.to_string(),
        plot: Plot::Heatmap {
            row_labels: categories.iter().map(|c| c.to_string()).collect(),
            column_labels: buckets.iter().map(i32::to_string).collect(),
            values: grid,
            annotations: None,
        },
    }
}

/// Обрезает значения по 0.5 и 99.5 перцентилям
pub fn winsorize(values: &[f64]) -> Vec<f64> {
    let sorted = sorted_finite(values);
    if sorted.is_empty() {
        return values.to_vec();
    }
    let lower = quantile(&sorted, WINSOR_LOWER);
    let upper = quantile(&sorted, WINSOR_UPPER);
    values
        .iter()
        .map(|v| if v.is_nan() { *v } else { v.clamp(lower, upper) })
        .collect()
}

fn mean_over_time(name: &str, ages: &[Option<i32>], values: &[f64]) -> Option<Figure> {
    let clipped = winsorize(values);

    let mut by_age: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for (age, value) in ages.iter().zip(&clipped) {
        if let Some(age) = age {
            if value.is_finite() {
                by_age.entry(*age).or_default().push(*value);
            }
        }
    }
    if by_age.is_empty() {
        return None;
    }

    let mut x = Vec::with_capacity(by_age.len());
    let mut y = Vec::with_capacity(by_age.len());
    let mut lower = Vec::with_capacity(by_age.len());
    let mut upper = Vec::with_capacity(by_age.len());
    for (age, samples) in &by_age {
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let half_width = if samples.len() > 1 {
            let variance = samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            Z_99 * (variance / n).sqrt()
        } else {
            0.0
        };
        x.push(f64::from(*age));
        y.push(mean);
        lower.push(mean - half_width);
        upper.push(mean + half_width);
    }

    Some(Figure {
        name: format!("feature_over_time_{name}"),
        title: format!("{name} over time"),
        x_label: "age".to_string(),
        y_label: name.to_string(),
        plot: Plot::Line {
            series: vec![LineSeries {
                label: name.to_string(),
                x,
                y,
                band: Some(Band { lower, upper }),
            }],
        },
    })
}
