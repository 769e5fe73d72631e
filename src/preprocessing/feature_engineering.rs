//! Feature engineering: отбор атрибутов, dummy-кодирование, дискретизация возраста, шум

#![allow(non_snake_case)]

use std::collections::BTreeSet;

use rand::Rng;

use crate::error::{PrepError, Result};
use crate::schema;
use crate::types::{Attribute, BuildingRecord, BuildingTable, Schema, Seed};

/// Удаляет столбцы типа использования, этажности и высоты
pub fn remove_other_attributes(table: &BuildingTable) -> Result<BuildingTable> {
    table.drop_attributes(&schema::OTHER_ATTRIBUTES)
}

/// Оставляет только здания со всеми четырьмя переменными (возраст/тип/этажность/высота)
/// и кодирует тип использования в dummy-признаки
pub fn keep_other_attributes(table: &BuildingTable) -> Result<BuildingTable> {
    table.require(Attribute::Age)?;
    table.require_all(&schema::OTHER_ATTRIBUTES)?;

    let complete = table.filter(|r| {
        r.age.is_some()
            && r.usage_type.is_some()
            && r.floors.is_some()
            && r.height.is_some()
            && r.usage_type.as_deref() != Some(schema::UNDIFFERENTIATED_USAGE_TYPE)
    });
    if complete.is_empty() {
        return Err(PrepError::EmptyResult(
            "no building has age, usage type, floors and height".to_string(),
        ));
    }

    dummy_encoding(&complete, Attribute::UsageType)
}

/// Разворачивает категориальный атрибут в индикаторные столбцы, исходный столбец удаляется
pub fn dummy_encoding(table: &BuildingTable, attribute: Attribute) -> Result<BuildingTable> {
    table.require(attribute)?;

    let category = |r: &BuildingRecord| -> Option<String> {
        match attribute {
            Attribute::UsageType => r.usage_type.clone(),
            Attribute::City => r.city.clone(),
            Attribute::Department => r.department.clone(),
            _ => None,
        }
    };
    let prefix = format!("{}_", attribute.column_name());

    let categories: BTreeSet<String> = table.records().iter().filter_map(|r| category(r)).collect();

    let mut encoded = table.clone();
    for value in &categories {
        let indicator = table
            .records()
            .iter()
            .map(|r| Some(if category(r).as_deref() == Some(value.as_str()) { 1.0 } else { 0.0 }))
            .collect();
        encoded = encoded.add_feature(&format!("{prefix}{value}"), indicator)?;
    }

    encoded.drop_attributes(&[attribute])
}

/// Отбор признаков: выбранные + возраст + вспомогательные столбцы
pub fn drop_unimportant_features(table: &BuildingTable) -> Result<BuildingTable> {
    table.require(Attribute::Age)?;
    table.require_all(&schema::AUX_ATTRIBUTES)?;

    let selected = table.select_features(&schema::SELECTED_FEATURES)?;
    let dropped: Vec<Attribute> = schema::OTHER_ATTRIBUTES
        .iter()
        .copied()
        .filter(|a| table.schema().has(*a))
        .collect();

    selected.drop_attributes(&dropped)
}

/// Добавляет признак из N(0, 1) как отрицательный контроль для важности признаков
pub fn add_noise_feature(table: &BuildingTable, seed: Seed) -> Result<BuildingTable> {
    let mut rng = seed.rng();
    let noise = (0..table.len())
        .map(|_| Some(standard_normal(&mut rng)))
        .collect();
    table.add_feature(schema::NOISE_FEATURE, noise)
}

// Box-Muller
fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Границы корзин ширины `bin_size`, покрывающие весь наблюдаемый диапазон возрастов.
/// Интервалы закрыты справа: (edge[i], edge[i + 1]]
pub fn age_bins(ages: &[i32], bin_size: i32) -> Result<Vec<i32>> {
    let min = ages.iter().copied().min();
    let max = ages.iter().copied().max();
    let (min, max) = match (min, max) {
        (Some(min), Some(max)) => (min, max),
        _ => return Err(PrepError::EmptyResult("no ages to bin".to_string())),
    };

    let start = (min - 1).div_euclid(bin_size) * bin_size;
    let end = (max + bin_size - 1).div_euclid(bin_size) * bin_size;
    Ok((start..=end).step_by(bin_size as usize).collect())
}

/// Код корзины для значения; -1 если значение вне всех корзин
pub fn cut(value: i32, edges: &[i32]) -> i32 {
    edges
        .windows(2)
        .position(|w| w[0] < value && value <= w[1])
        .map_or(-1, |idx| idx as i32)
}

/// Округление до ближайшего кратного `unit`; половины округляются к чётному кратному
pub fn custom_round(value: i32, unit: i32) -> i32 {
    let quotient = f64::from(value) / f64::from(unit);
    quotient.round_ties_even() as i32 * unit
}

fn map_ages<F>(table: &BuildingTable, f: F) -> Result<BuildingTable>
where
    F: Fn(i32) -> i32,
{
    table.require(Attribute::Age)?;
    Ok(table.map_records(|mut r| {
        r.age = r.age.map(&f);
        r
    }))
}

/// Возраст -> код возрастной группы EHS
pub fn categorize_age_ehs(table: &BuildingTable) -> Result<BuildingTable> {
    map_ages(table, |age| cut(age, &schema::EHS_AGE_BINS))
}

/// Возраст -> код пятилетней корзины; метки корзин = левые границы
pub fn categorize_age(table: &BuildingTable) -> Result<BuildingTable> {
    let ages: Vec<i32> = table.ages()?.into_iter().flatten().collect();
    let bins = age_bins(&ages, schema::AGE_BIN_SIZE)?;
    tracing::debug!(
        "Age bins from {} to {} ({} labels)",
        bins.first().copied().unwrap_or_default(),
        bins.last().copied().unwrap_or_default(),
        bins.len().saturating_sub(1)
    );
    map_ages(table, |age| cut(age, &bins))
}

pub fn round_age(table: &BuildingTable) -> Result<BuildingTable> {
    map_ages(table, |age| custom_round(age, schema::AGE_ROUNDING_UNIT))
}

/// Разделяет таблицу на признаки X (без возраста) и цель y (возраст)
pub fn split_target_var(table: &BuildingTable) -> Result<(BuildingTable, Vec<Option<i32>>)> {
    let y = table.ages()?;
    let X = table.drop_attributes(&[Attribute::Age])?;
    Ok((X, y))
}

/// Обратная операция к `split_target_var`
pub fn join_target_var(X: &BuildingTable, y: &[Option<i32>]) -> Result<BuildingTable> {
    if X.len() != y.len() {
        return Err(PrepError::LengthMismatch {
            expected: X.len(),
            actual: y.len(),
        });
    }

    let mut schema: Schema = X.schema().clone();
    schema.attributes.insert(Attribute::Age);
    let records = X
        .records()
        .iter()
        .cloned()
        .zip(y.iter().copied())
        .map(|(mut r, age)| {
            r.age = age;
            r
        })
        .collect();

    BuildingTable::new(schema, records)
}
