//! Конфигурация пайплайна подготовки данных

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema;
use crate::types::Seed;

/// Шаг преобразования таблицы
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    RemoveOtherAttributes,
    KeepOtherAttributes,
    DropUnimportantFeatures,
    #[serde(rename = "remove_buildings_pre_2000")]
    RemoveBuildingsPre2000,
    #[serde(rename = "remove_buildings_pre_1850")]
    RemoveBuildingsPre1850,
    #[serde(rename = "remove_buildings_pre_1950")]
    RemoveBuildingsPre1950,
    #[serde(rename = "remove_buildings_between_1930_1990")]
    RemoveBuildingsBetween1930And1990,
    RemoveOutliers,
    FilterMediumSizedCities,
    CategorizeAgeEhs,
    CategorizeAge,
    RoundAge,
    AddNoiseFeature,
    Undersample,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitStrategy {
    #[default]
    #[serde(rename = "random_80_20")]
    Random80To20,
    #[serde(rename = "random_50_50")]
    Random50To50,
    Region,
    MediumSizedCities,
    City,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Знаковое, чтобы отрицательное значение из файла давало понятную ошибку
    #[serde(default = "default_seed")]
    pub seed: i64,
    #[serde(default = "default_steps")]
    pub steps: Vec<PipelineStep>,
    #[serde(default)]
    pub split: SplitStrategy,
    #[serde(default = "default_true")]
    pub normalize: bool,
    #[serde(default = "default_true")]
    pub figures: bool,
}

fn default_seed() -> i64 { schema::DEFAULT_SEED }
fn default_steps() -> Vec<PipelineStep> { vec![PipelineStep::RemoveOutliers, PipelineStep::KeepOtherAttributes] }
fn default_true() -> bool { true }

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            steps: default_steps(),
            split: SplitStrategy::default(),
            normalize: true,
            figures: true,
        }
    }
}

impl PipelineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn seed(&self) -> Result<Seed> {
        Seed::try_from(self.seed)
    }
}
