use std::collections::HashSet;

use pretty_assertions::assert_eq;

use buildage_prep::pipeline::{DatasetFile, Pipeline};
use buildage_prep::visualization::{
    plot_confusion_matrix, plot_grid, plot_histogram, plot_prediction_error_histogram, Plot,
};
use buildage_prep::*;

fn dataset() -> BuildingTable {
    let cities = [
        ("Valence", "Drôme"),
        ("Aurillac", "Cantal"),
        ("Laon", "Aisne"),
        ("Limoges", "Haute-Vienne"),
        ("Vichy", "Allier"),
    ];
    let records = (0..60)
        .map(|i: i32| {
            let (city, department) = cities[i as usize % cities.len()];
            BuildingRecord {
                age: Some(1880 + (i * 7) % 150),
                usage_type: Some(if i % 4 == 0 { "Commercial" } else { "Résidentiel" }.to_string()),
                floors: Some(f64::from(1 + i % 6)),
                height: Some(f64::from(2 + i % 9) * 3.0),
                city: Some(city.to_string()),
                department: Some(department.to_string()),
                features: vec![Some(f64::from(i) * 12.5), Some(f64::from(i % 11))],
                ..BuildingRecord::new(format!("bdg-{i:03}"))
            }
        })
        .collect();
    DatasetFile {
        features: vec!["footprint_area".to_string(), "n_neighbours".to_string()],
        records,
    }
    .into_table()
    .unwrap()
}

fn assert_disjoint(pair: &SplitPair) {
    let train: HashSet<&str> = pair.train.ids().into_iter().collect();
    let test: HashSet<&str> = pair.test.ids().into_iter().collect();
    assert!(train.is_disjoint(&test));
}

#[test]
fn every_split_is_disjoint_and_deterministic() {
    let table = dataset();
    // регион Aisne, город Vichy из восьми, Limoges из пяти городов датасета
    let seed = Seed::new(12);
    let splits: Vec<fn(&BuildingTable, Seed) -> Result<SplitPair>> = vec![
        split_80_20,
        split_50_50,
        split_by_region,
        split_by_city,
        split_and_filter_by_french_medium_sized_cities_with_old_center,
    ];

    for split in splits {
        let first = split(&table, seed).unwrap();
        assert_disjoint(&first);
        assert_eq!(split(&table, seed).unwrap(), first);
    }
}

#[test]
fn region_holdout_with_seed_seven_is_aisne() {
    let pair = split_by_region(&dataset(), Seed::new(7)).unwrap();
    assert_eq!(pair.test.len(), 12);
    assert!(pair.test.records().iter().all(|r| r.department.as_deref() == Some("Aisne")));
    assert!(pair.train.records().iter().all(|r| r.department.as_deref() != Some("Aisne")));
}

#[test]
fn undersampling_decades_keeps_one_row_per_class() {
    let records = [1920, 1920, 1920, 1990, 1990, 2010]
        .iter()
        .enumerate()
        .map(|(i, age)| BuildingRecord {
            age: Some(*age),
            ..BuildingRecord::new(i.to_string())
        })
        .collect();
    let table = BuildingTable::new(Schema::new([Attribute::Age], vec![]), records).unwrap();

    let balanced = undersample_skewed_distribution(&table, Seed::new(1), &mut FigureCollector::new()).unwrap();
    let mut ages: Vec<i32> = balanced.records().iter().filter_map(|r| r.age).collect();
    ages.sort();
    assert_eq!(ages, vec![1920, 1990, 2010]);
}

#[test]
fn full_run_writes_figures_and_normalized_tables() {
    let out = tempfile::tempdir().unwrap();
    let config = PipelineConfig::from_json(
        r#"{
            "seed": 2,
            "steps": ["remove_outliers", "keep_other_attributes", "categorize_age_ehs", "undersample", "add_noise_feature"],
            "split": "random_80_20"
        }"#,
    )
    .unwrap();

    let mut writer = JsonFigureWriter::new(out.path().join("figures")).unwrap();
    let pair = Pipeline::new(config).unwrap().run(&dataset(), &mut writer).unwrap();

    assert_eq!(writer.written(), 1);
    assert!(out.path().join("figures/00_undersampling.json").exists());

    assert_disjoint(&pair);
    let mut per_class = std::collections::BTreeMap::new();
    for record in pair.train.records().iter().chain(pair.test.records()) {
        *per_class.entry(record.age).or_insert(0usize) += 1;
    }
    let counts: HashSet<usize> = per_class.values().copied().collect();
    assert_eq!(counts.len(), 1, "classes are not balanced: {per_class:?}");
    assert!(pair.train.schema().feature_index("feature_noise").is_some());

    let matrix = pair.train.feature_matrix();
    for column in matrix.columns() {
        let min = column.iter().copied().fold(f64::INFINITY, f64::min);
        let max = column.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!(min >= 0.0 && max <= 1.0, "column not scaled: [{min}, {max}]");
    }
}

#[test]
fn diagnostics_from_predictions() {
    let y_test = [1950.0, 1960.0, 1975.0, 1990.0, 2005.0];
    let y_predict = [1955.0, 1958.0, 1980.0, 1985.0, 2001.0];
    let mut sink = FigureCollector::new();

    plot_histogram(&mut sink, &y_test, &y_predict, None, &[]).unwrap();
    plot_grid(&mut sink, &y_test, &y_predict).unwrap();
    plot_prediction_error_histogram(&mut sink, &y_test, &y_predict).unwrap();
    plot_confusion_matrix(&mut sink, &[0, 1, 1, 2], &[0, 1, 2, 2], &[]).unwrap();

    let names: Vec<&str> = sink.figures().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["age_distributions", "age_joint_grid", "prediction_errors", "confusion_matrix"]);

    match &sink.figures()[3].plot {
        Plot::Heatmap { values, row_labels, .. } => {
            assert_eq!(row_labels, &vec!["0".to_string(), "1".to_string(), "2".to_string()]);
            assert_eq!(values[1], vec![0.0, 0.5, 0.5]);
        }
        other => panic!("unexpected plot {other:?}"),
    }
}
