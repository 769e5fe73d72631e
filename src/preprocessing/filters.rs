//! Фильтры по возрасту здания

use crate::error::{PrepError, Result};
use crate::schema;
use crate::types::{Attribute, BuildingTable};

/// Оставляет строки, возраст которых удовлетворяет условию; строки без возраста отбрасываются
fn filter_by_age<P>(table: &BuildingTable, description: &str, predicate: P) -> Result<BuildingTable>
where
    P: Fn(i32) -> bool,
{
    table.require(Attribute::Age)?;
    let filtered = table.filter(|r| r.age.is_some_and(&predicate));

    tracing::debug!("{}: {} of {} rows kept", description, filtered.len(), table.len());

    if filtered.is_empty() {
        return Err(PrepError::EmptyResult(format!("no building satisfies {description}")));
    }
    Ok(filtered)
}

pub fn remove_buildings_pre_2000(table: &BuildingTable) -> Result<BuildingTable> {
    filter_by_age(table, "age >= 2000", |age| age >= 2000)
}

pub fn remove_buildings_pre_1850(table: &BuildingTable) -> Result<BuildingTable> {
    filter_by_age(table, "age >= 1850", |age| age >= 1850)
}

pub fn remove_buildings_pre_1950(table: &BuildingTable) -> Result<BuildingTable> {
    filter_by_age(table, "age >= 1950", |age| age >= 1950)
}

pub fn remove_buildings_between_1930_1990(table: &BuildingTable) -> Result<BuildingTable> {
    filter_by_age(table, "age outside [1930, 1990]", |age| !(1930..=1990).contains(&age))
}

pub fn remove_outliers(table: &BuildingTable) -> Result<BuildingTable> {
    filter_by_age(table, "1900 < age < 2020", |age| {
        age > schema::OUTLIER_LOWER_AGE && age < schema::OUTLIER_UPPER_AGE
    })
}
