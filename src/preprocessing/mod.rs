/// Модуль предобработки данных

pub mod feature_engineering;
pub mod filters;
pub mod normalization;
pub mod resampling;
pub mod splitting;

pub use feature_engineering::{
    add_noise_feature, age_bins, categorize_age, categorize_age_ehs, custom_round, drop_unimportant_features,
    dummy_encoding, join_target_var, keep_other_attributes, remove_other_attributes, round_age,
    split_target_var,
};
pub use filters::{
    remove_buildings_between_1930_1990, remove_buildings_pre_1850, remove_buildings_pre_1950,
    remove_buildings_pre_2000, remove_outliers,
};
pub use normalization::{normalize_features, MinMaxScaler};
pub use resampling::undersample_skewed_distribution;
pub use splitting::{
    filter_french_medium_sized_cities_with_old_center, split_50_50, split_80_20,
    split_and_filter_by_french_medium_sized_cities_with_old_center, split_by_city, split_by_region,
    split_random,
};
