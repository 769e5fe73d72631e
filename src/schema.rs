//! Фиксированный словарь столбцов датасета зданий

use crate::types::Attribute;

pub const ID_COLUMN: &str = "id";
pub const AGE_COLUMN: &str = "age";
pub const USAGE_TYPE_COLUMN: &str = "usage_type";
pub const FLOORS_COLUMN: &str = "floors";
pub const HEIGHT_COLUMN: &str = "height";
pub const CITY_COLUMN: &str = "city";
pub const DEPARTMENT_COLUMN: &str = "departement";

/// Атрибуты, которые есть не у всех зданий (тип, этажность, высота)
pub const OTHER_ATTRIBUTES: [Attribute; 3] =
    [Attribute::UsageType, Attribute::Floors, Attribute::Height];

/// Вспомогательные столбцы: не признаки и не цель
pub const AUX_ATTRIBUTES: [Attribute; 2] = [Attribute::City, Attribute::Department];

/// Категория типа использования без смысла, такие здания отбрасываются
pub const UNDIFFERENTIATED_USAGE_TYPE: &str = "Indifférencié";

pub const NOISE_FEATURE: &str = "feature_noise";

/// Признаки, оставшиеся после отбора по важности
pub const SELECTED_FEATURES: [&str; 10] = [
    "footprint_area",
    "perimeter",
    "phi",
    "longest_axis_length",
    "elongation",
    "convexity",
    "n_vertices",
    "n_neighbours",
    "street_length",
    "block_total_footprint_area",
];

/// Возрастные группы English Housing Survey (правые границы включительно)
pub const EHS_AGE_BINS: [i32; 7] = [0, 1918, 1944, 1964, 1980, 1990, 2025];
pub const EHS_AGE_LABELS: [&str; 6] = [
    "<1919",
    "1919-1944",
    "1945-1964",
    "1965-1980",
    "1981-1990",
    ">1990",
];

/// Департаменты для географической кросс-валидации
pub const REGION_NAMES: [&str; 5] = [
    "Haute-Vienne",
    "Hauts-de-Seine",
    "Aisne",
    "Orne",
    "Pyrénées-Orientales",
];

/// Средние французские города со старым центром
pub const MEDIUM_SIZED_CITIES_WITH_OLD_CENTER: [&str; 8] = [
    "Valence",
    "Aurillac",
    "Oyonnax",
    "Aubenas",
    "Vichy",
    "Montluçon",
    "Montélimar",
    "Bourg-en-Bresse",
];

pub const AGE_BIN_SIZE: i32 = 5;
pub const AGE_ROUNDING_UNIT: i32 = 5;

pub const OUTLIER_LOWER_AGE: i32 = 1900;
pub const OUTLIER_UPPER_AGE: i32 = 2020;

pub const DEFAULT_SEED: i64 = 1;
