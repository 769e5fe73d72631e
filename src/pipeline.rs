//! Пайплайн: шаги из конфигурации -> разбиение -> нормализация

use serde::{Deserialize, Serialize};

use crate::config::{PipelineConfig, PipelineStep, SplitStrategy};
use crate::error::Result;
use crate::preprocessing::*;
use crate::types::{BuildingRecord, BuildingTable, Schema, Seed, SplitPair};
use crate::visualization::{FigureCollector, FigureSink};

/// Формат входного JSON-файла: имена числовых признаков и записи
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetFile {
    #[serde(default)]
    pub features: Vec<String>,
    pub records: Vec<BuildingRecord>,
}

impl DatasetFile {
    pub fn into_table(self) -> Result<BuildingTable> {
        BuildingTable::new(Schema::full(self.features), self.records)
    }
}

pub struct Pipeline {
    config: PipelineConfig,
    seed: Seed,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let seed = config.seed()?;
        Ok(Self { config, seed })
    }

    pub fn seed(&self) -> Seed {
        self.seed
    }

    fn apply(&self, step: PipelineStep, table: &BuildingTable, sink: &mut dyn FigureSink) -> Result<BuildingTable> {
        match step {
            PipelineStep::RemoveOtherAttributes => remove_other_attributes(table),
            PipelineStep::KeepOtherAttributes => keep_other_attributes(table),
            PipelineStep::DropUnimportantFeatures => drop_unimportant_features(table),
            PipelineStep::RemoveBuildingsPre2000 => remove_buildings_pre_2000(table),
            PipelineStep::RemoveBuildingsPre1850 => remove_buildings_pre_1850(table),
            PipelineStep::RemoveBuildingsPre1950 => remove_buildings_pre_1950(table),
            PipelineStep::RemoveBuildingsBetween1930And1990 => remove_buildings_between_1930_1990(table),
            PipelineStep::RemoveOutliers => remove_outliers(table),
            PipelineStep::FilterMediumSizedCities => filter_french_medium_sized_cities_with_old_center(table),
            PipelineStep::CategorizeAgeEhs => categorize_age_ehs(table),
            PipelineStep::CategorizeAge => categorize_age(table),
            PipelineStep::RoundAge => round_age(table),
            PipelineStep::AddNoiseFeature => add_noise_feature(table, self.seed),
            PipelineStep::Undersample => undersample_skewed_distribution(table, self.seed, sink),
        }
    }

    fn split(&self, table: &BuildingTable) -> Result<SplitPair> {
        match self.config.split {
            SplitStrategy::Random80To20 => split_80_20(table, self.seed),
            SplitStrategy::Random50To50 => split_50_50(table, self.seed),
            SplitStrategy::Region => split_by_region(table, self.seed),
            SplitStrategy::MediumSizedCities => {
                split_and_filter_by_french_medium_sized_cities_with_old_center(table, self.seed)
            }
            SplitStrategy::City => split_by_city(table, self.seed),
        }
    }

    /// Прогоняет таблицу через шаги, разбивает и (опционально) нормализует
    pub fn run(&self, table: &BuildingTable, sink: &mut dyn FigureSink) -> Result<SplitPair> {
        if self.config.figures {
            self.run_with(table, sink)
        } else {
            // Графики отключены: фигуры собираются и выбрасываются
            self.run_with(table, &mut FigureCollector::new())
        }
    }

    fn run_with(&self, table: &BuildingTable, sink: &mut dyn FigureSink) -> Result<SplitPair> {
        let mut current = table.clone();
        for step in &self.config.steps {
            current = self.apply(*step, &current, sink)?;
            tracing::info!("Step {:?}: {} rows", step, current.len());
        }

        let pair = self.split(&current)?;
        if self.config.normalize {
            normalize_features(&pair.train, &pair.test)
        } else {
            Ok(pair)
        }
    }
}
