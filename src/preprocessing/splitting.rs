//! Стратегии разбиения на обучающую и тестовую выборки

use std::collections::BTreeSet;

use rand::seq::SliceRandom;

use crate::error::{PrepError, Result};
use crate::schema;
use crate::types::{Attribute, BuildingRecord, BuildingTable, Seed, SplitPair};

fn non_empty(pair: SplitPair, strategy: &str) -> Result<SplitPair> {
    if pair.train.is_empty() || pair.test.is_empty() {
        return Err(PrepError::EmptyResult(format!(
            "{strategy} produced {} train and {} test rows",
            pair.train.len(),
            pair.test.len()
        )));
    }

    tracing::info!(
        "{}: {} train rows, {} test rows",
        strategy,
        pair.train.len(),
        pair.test.len()
    );
    Ok(pair)
}

/// Случайное разбиение: размер теста = ceil(n * test_size), тест берётся из начала перестановки
pub fn split_random(table: &BuildingTable, test_size: f64, seed: Seed) -> Result<SplitPair> {
    let n_samples = table.len();
    let n_test = (n_samples as f64 * test_size).ceil() as usize;
    if n_test == 0 || n_test >= n_samples {
        return Err(PrepError::EmptyResult(format!(
            "cannot split {n_samples} rows with test size {test_size}"
        )));
    }

    let mut permutation: Vec<usize> = (0..n_samples).collect();
    permutation.shuffle(&mut seed.rng());

    let pick = |indices: &[usize]| -> Vec<BuildingRecord> {
        indices.iter().map(|&i| table.records()[i].clone()).collect()
    };
    let pair = SplitPair {
        train: table.with_records(pick(&permutation[n_test..])),
        test: table.with_records(pick(&permutation[..n_test])),
    };

    non_empty(pair, &format!("random split (test size {test_size})"))
}

pub fn split_80_20(table: &BuildingTable, seed: Seed) -> Result<SplitPair> {
    split_random(table, 0.2, seed)
}

pub fn split_50_50(table: &BuildingTable, seed: Seed) -> Result<SplitPair> {
    split_random(table, 0.5, seed)
}

/// Один департамент из пяти (seed mod 5) уходит в тест, остальное в обучение
pub fn split_by_region(table: &BuildingTable, seed: Seed) -> Result<SplitPair> {
    table.require(Attribute::Department)?;

    let test_region = schema::REGION_NAMES[seed.pick(schema::REGION_NAMES.len())];
    let in_test = |r: &BuildingRecord| r.department.as_deref() == Some(test_region);

    let pair = SplitPair {
        train: table.filter(|r| !in_test(r)),
        test: table.filter(in_test),
    };

    non_empty(pair, &format!("region holdout '{test_region}'"))
}

fn is_medium_sized_city(record: &BuildingRecord) -> bool {
    record
        .city
        .as_deref()
        .is_some_and(|city| schema::MEDIUM_SIZED_CITIES_WITH_OLD_CENTER.contains(&city))
}

/// Оставляет только восемь средних городов со старым центром
pub fn filter_french_medium_sized_cities_with_old_center(table: &BuildingTable) -> Result<BuildingTable> {
    table.require(Attribute::City)?;

    let filtered = table.filter(is_medium_sized_city);
    if filtered.is_empty() {
        return Err(PrepError::EmptyResult(
            "no building in a medium-sized city with old center".to_string(),
        ));
    }
    Ok(filtered)
}

/// Один из восьми городов (seed mod 8) уходит в тест, остальные семь в обучение
pub fn split_and_filter_by_french_medium_sized_cities_with_old_center(
    table: &BuildingTable,
    seed: Seed,
) -> Result<SplitPair> {
    table.require(Attribute::City)?;

    let cities = &schema::MEDIUM_SIZED_CITIES_WITH_OLD_CENTER;
    let test_city = cities[seed.pick(cities.len())];
    let in_test = |r: &BuildingRecord| r.city.as_deref() == Some(test_city);

    let pair = SplitPair {
        train: table.filter(|r| is_medium_sized_city(r) && !in_test(r)),
        test: table.filter(in_test),
    };

    non_empty(pair, &format!("city holdout '{test_city}'"))
}

/// Как выше, но по всем городам датасета в лексикографическом порядке
pub fn split_by_city(table: &BuildingTable, seed: Seed) -> Result<SplitPair> {
    table.require(Attribute::City)?;

    let cities: Vec<&str> = table
        .records()
        .iter()
        .filter_map(|r| r.city.as_deref())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if cities.is_empty() {
        return Err(PrepError::EmptyResult("table has no city values".to_string()));
    }

    let test_city = cities[seed.pick(cities.len())];
    let in_test = |r: &BuildingRecord| r.city.as_deref() == Some(test_city);

    let pair = SplitPair {
        train: table.filter(|r| !in_test(r)),
        test: table.filter(in_test),
    };

    non_empty(pair, &format!("city holdout '{test_city}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Schema;
    use std::collections::HashSet;

    fn building(id: usize, city: &str, department: &str) -> BuildingRecord {
        BuildingRecord {
            age: Some(1900 + id as i32),
            city: Some(city.to_string()),
            department: Some(department.to_string()),
            ..BuildingRecord::new(format!("b{id}"))
        }
    }

    fn sample() -> BuildingTable {
        let places = [
            ("Valence", "Drôme"),
            ("Vichy", "Allier"),
            ("Laon", "Aisne"),
            ("Soissons", "Aisne"),
            ("Limoges", "Haute-Vienne"),
            ("Nanterre", "Hauts-de-Seine"),
            ("Alençon", "Orne"),
            ("Perpignan", "Pyrénées-Orientales"),
            ("Aurillac", "Cantal"),
            ("Montluçon", "Allier"),
        ];
        let records = (0..30)
            .map(|i| {
                let (city, department) = places[i % places.len()];
                building(i, city, department)
            })
            .collect();
        BuildingTable::new(Schema::full(vec![]), records).unwrap()
    }

    fn assert_disjoint(pair: &SplitPair) {
        let train: HashSet<&str> = pair.train.ids().into_iter().collect();
        assert!(pair.test.ids().iter().all(|id| !train.contains(id)));
    }

    #[test]
    fn random_split_is_disjoint_exhaustive_and_deterministic() {
        let table = sample();
        let pair = split_80_20(&table, Seed::new(42)).unwrap();

        assert_eq!(pair.test.len(), 6);
        assert_eq!(pair.train.len(), 24);
        assert_disjoint(&pair);
        assert_eq!(split_80_20(&table, Seed::new(42)).unwrap(), pair);

        let half = split_50_50(&table, Seed::new(42)).unwrap();
        assert_eq!((half.train.len(), half.test.len()), (15, 15));
        assert_disjoint(&half);
    }

    #[test]
    fn random_split_of_single_row_fails() {
        let table = sample().with_records(vec![building(0, "Vichy", "Allier")]);
        assert!(matches!(split_80_20(&table, Seed::new(1)), Err(PrepError::EmptyResult(_))));
    }

    #[test]
    fn region_split_uses_seed_modulo() {
        let pair = split_by_region(&sample(), Seed::new(7)).unwrap();

        assert!(!pair.test.is_empty());
        assert!(pair.test.records().iter().all(|r| r.department.as_deref() == Some("Aisne")));
        assert!(pair.train.records().iter().all(|r| r.department.as_deref() != Some("Aisne")));
        assert_eq!(pair.train.len() + pair.test.len(), 30);
        assert_disjoint(&pair);
    }

    #[test]
    fn medium_sized_city_split_drops_other_cities() {
        // seed 9 -> 9 mod 8 = 1 -> Aurillac
        let pair = split_and_filter_by_french_medium_sized_cities_with_old_center(&sample(), Seed::new(9)).unwrap();

        assert!(pair.test.records().iter().all(|r| r.city.as_deref() == Some("Aurillac")));
        let train_cities: BTreeSet<&str> = pair.train.records().iter().filter_map(|r| r.city.as_deref()).collect();
        assert_eq!(train_cities, BTreeSet::from(["Montluçon", "Valence", "Vichy"]));
        assert_disjoint(&pair);

        let filtered = filter_french_medium_sized_cities_with_old_center(&sample()).unwrap();
        assert_eq!(filtered.len(), 12);
    }

    #[test]
    fn city_split_picks_from_sorted_cities() {
        // Alençon, Aurillac, Laon, Limoges, Montluçon, Nanterre, Perpignan, Soissons, Valence, Vichy
        let pair = split_by_city(&sample(), Seed::new(13)).unwrap();
        assert!(pair.test.records().iter().all(|r| r.city.as_deref() == Some("Limoges")));
        assert_eq!(pair.test.len(), 3);
        assert_eq!(pair.train.len(), 27);
        assert_disjoint(&pair);
    }

    #[test]
    fn split_requires_columns() {
        let table = BuildingTable::new(Schema::new([Attribute::Age], vec![]), vec![]).unwrap();
        assert!(matches!(split_by_region(&table, Seed::new(0)), Err(PrepError::MissingColumn(_))));
        assert!(matches!(split_by_city(&table, Seed::new(0)), Err(PrepError::MissingColumn(_))));
    }

    #[test]
    fn region_holdout_without_the_chosen_department_is_empty() {
        let table = BuildingTable::new(
            Schema::full(vec![]),
            (0..6).map(|i| building(i, "Valence", "Drôme")).collect(),
        )
        .unwrap();

        let result = split_by_region(&table, Seed::new(2));
        assert!(matches!(result, Err(PrepError::EmptyResult(_))));
    }

    #[test]
    fn city_holdout_on_single_city_is_empty() {
        let table = BuildingTable::new(
            Schema::full(vec![]),
            (0..6).map(|i| building(i, "Vichy", "Allier")).collect(),
        )
        .unwrap();

        for seed in 0..3 {
            let result = split_by_city(&table, Seed::new(seed));
            assert!(matches!(result, Err(PrepError::EmptyResult(_))));
        }
    }
}
