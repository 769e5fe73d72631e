//! Типы данных: записи зданий, таблица, схема, разбиение

use std::collections::{BTreeSet, HashMap};

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};
use crate::schema;

/// Типизированные столбцы записи (кроме идентификатора и числовых признаков)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Age,
    UsageType,
    Floors,
    Height,
    City,
    Department,
}

impl Attribute {
    pub const ALL: [Attribute; 6] = [
        Attribute::Age,
        Attribute::UsageType,
        Attribute::Floors,
        Attribute::Height,
        Attribute::City,
        Attribute::Department,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            Attribute::Age => schema::AGE_COLUMN,
            Attribute::UsageType => schema::USAGE_TYPE_COLUMN,
            Attribute::Floors => schema::FLOORS_COLUMN,
            Attribute::Height => schema::HEIGHT_COLUMN,
            Attribute::City => schema::CITY_COLUMN,
            Attribute::Department => schema::DEPARTMENT_COLUMN,
        }
    }

    /// Числовые атрибуты участвуют в нормализации наравне с признаками
    pub fn is_numeric_feature(self) -> bool {
        matches!(self, Attribute::Floors | Attribute::Height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    pub id: String,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub usage_type: Option<String>,
    #[serde(default)]
    pub floors: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default, rename = "departement")]
    pub department: Option<String>,
    /// Значения в порядке `Schema::features`
    #[serde(default)]
    pub features: Vec<Option<f64>>,
}

impl BuildingRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            age: None,
            usage_type: None,
            floors: None,
            height: None,
            city: None,
            department: None,
            features: Vec::new(),
        }
    }

    fn clear_attribute(&mut self, attribute: Attribute) {
        match attribute {
            Attribute::Age => self.age = None,
            Attribute::UsageType => self.usage_type = None,
            Attribute::Floors => self.floors = None,
            Attribute::Height => self.height = None,
            Attribute::City => self.city = None,
            Attribute::Department => self.department = None,
        }
    }

    fn copy_attribute_from(&mut self, other: &BuildingRecord, attribute: Attribute) {
        match attribute {
            Attribute::Age => self.age = other.age,
            Attribute::UsageType => self.usage_type = other.usage_type.clone(),
            Attribute::Floors => self.floors = other.floors,
            Attribute::Height => self.height = other.height,
            Attribute::City => self.city = other.city.clone(),
            Attribute::Department => self.department = other.department.clone(),
        }
    }

    fn numeric_attribute(&self, attribute: Attribute) -> Option<f64> {
        match attribute {
            Attribute::Floors => self.floors,
            Attribute::Height => self.height,
            Attribute::Age => self.age.map(f64::from),
            _ => None,
        }
    }

    fn set_numeric_attribute(&mut self, attribute: Attribute, value: Option<f64>) {
        match attribute {
            Attribute::Floors => self.floors = value,
            Attribute::Height => self.height = value,
            _ => {}
        }
    }

    fn categorical_attribute(&self, attribute: Attribute) -> Option<&str> {
        match attribute {
            Attribute::UsageType => self.usage_type.as_deref(),
            Attribute::City => self.city.as_deref(),
            Attribute::Department => self.department.as_deref(),
            _ => None,
        }
    }
}

/// Набор столбцов таблицы
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub attributes: BTreeSet<Attribute>,
    pub features: Vec<String>,
}

impl Schema {
    pub fn new(attributes: impl IntoIterator<Item = Attribute>, features: Vec<String>) -> Self {
        Self {
            attributes: attributes.into_iter().collect(),
            features,
        }
    }

    /// Все атрибуты и заданные признаки
    pub fn full(features: Vec<String>) -> Self {
        Self::new(Attribute::ALL, features)
    }

    pub fn has(&self, attribute: Attribute) -> bool {
        self.attributes.contains(&attribute)
    }

    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.features.iter().position(|f| f == name)
    }
}

/// Значения одного столбца, как их видит визуализация
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Categorical(Vec<Option<String>>),
    Numeric(Vec<f64>),
}

/// Таблица зданий; каждое преобразование возвращает новую таблицу
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct BuildingTable {
    schema: Schema,
    records: Vec<BuildingRecord>,
}

/// Таблица как она лежит в JSON, до проверки длин признаков
#[derive(Deserialize)]
struct RawTable {
    schema: Schema,
    records: Vec<BuildingRecord>,
}

impl TryFrom<RawTable> for BuildingTable {
    type Error = PrepError;

    fn try_from(raw: RawTable) -> Result<Self> {
        Self::new(raw.schema, raw.records)
    }
}

impl BuildingTable {
    pub fn new(schema: Schema, records: Vec<BuildingRecord>) -> Result<Self> {
        let expected = schema.features.len();
        if let Some(bad) = records.iter().find(|r| r.features.len() != expected) {
            return Err(PrepError::LengthMismatch {
                expected,
                actual: bad.features.len(),
            });
        }
        Ok(Self { schema, records })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[BuildingRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<BuildingRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.id.as_str()).collect()
    }

    pub fn require(&self, attribute: Attribute) -> Result<()> {
        if self.schema.has(attribute) {
            Ok(())
        } else {
            Err(PrepError::MissingColumn(attribute.column_name().to_string()))
        }
    }

    pub fn require_all(&self, attributes: &[Attribute]) -> Result<()> {
        attributes.iter().try_for_each(|a| self.require(*a))
    }

    /// Возраст каждой записи; требует столбец возраста
    pub fn ages(&self) -> Result<Vec<Option<i32>>> {
        self.require(Attribute::Age)?;
        Ok(self.records.iter().map(|r| r.age).collect())
    }

    /// Та же схема, другие строки
    pub fn with_records(&self, records: Vec<BuildingRecord>) -> Self {
        Self {
            schema: self.schema.clone(),
            records,
        }
    }

    pub fn filter<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&BuildingRecord) -> bool,
    {
        self.with_records(self.records.iter().filter(|r| keep(r)).cloned().collect())
    }

    pub fn map_records<F>(&self, f: F) -> Self
    where
        F: FnMut(BuildingRecord) -> BuildingRecord,
    {
        self.with_records(self.records.iter().cloned().map(f).collect())
    }

    pub fn drop_attributes(&self, attributes: &[Attribute]) -> Result<Self> {
        self.require_all(attributes)?;

        let mut schema = self.schema.clone();
        for attribute in attributes {
            schema.attributes.remove(attribute);
        }
        let records = self
            .records
            .iter()
            .cloned()
            .map(|mut r| {
                for attribute in attributes {
                    r.clear_attribute(*attribute);
                }
                r
            })
            .collect();

        Ok(Self { schema, records })
    }

    /// Возвращает атрибуты из исходной таблицы, сопоставляя записи по id
    pub fn restore_attributes(&self, source: &BuildingTable, attributes: &[Attribute]) -> Result<Self> {
        source.require_all(attributes)?;

        let by_id: HashMap<&str, &BuildingRecord> =
            source.records.iter().map(|r| (r.id.as_str(), r)).collect();

        let mut schema = self.schema.clone();
        schema.attributes.extend(attributes.iter().copied());
        let records = self
            .records
            .iter()
            .cloned()
            .map(|mut r| {
                if let Some(original) = by_id.get(r.id.as_str()) {
                    for attribute in attributes {
                        r.copy_attribute_from(original, *attribute);
                    }
                }
                r
            })
            .collect();

        Ok(Self { schema, records })
    }

    /// Добавляет числовой признак; длина значений должна совпадать с числом строк
    pub fn add_feature(&self, name: &str, values: Vec<Option<f64>>) -> Result<Self> {
        if values.len() != self.records.len() {
            return Err(PrepError::LengthMismatch {
                expected: self.records.len(),
                actual: values.len(),
            });
        }

        let mut schema = self.schema.clone();
        let records = match schema.feature_index(name) {
            Some(idx) => self
                .records
                .iter()
                .cloned()
                .zip(values)
                .map(|(mut r, v)| {
                    r.features[idx] = v;
                    r
                })
                .collect(),
            None => {
                schema.features.push(name.to_string());
                self.records
                    .iter()
                    .cloned()
                    .zip(values)
                    .map(|(mut r, v)| {
                        r.features.push(v);
                        r
                    })
                    .collect()
            }
        };

        Ok(Self { schema, records })
    }

    /// Оставляет только перечисленные признаки в заданном порядке
    pub fn select_features(&self, names: &[&str]) -> Result<Self> {
        let indices = names
            .iter()
            .map(|name| {
                self.schema
                    .feature_index(name)
                    .ok_or_else(|| PrepError::MissingColumn(name.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        let schema = Schema::new(
            self.schema.attributes.iter().copied(),
            names.iter().map(|n| n.to_string()).collect(),
        );
        let records = self
            .records
            .iter()
            .cloned()
            .map(|mut r| {
                r.features = indices.iter().map(|&i| r.features[i]).collect();
                r
            })
            .collect();

        Ok(Self { schema, records })
    }

    /// Имена столбцов-признаков: этажность и высота (если есть), затем числовые признаки
    pub fn feature_columns(&self) -> Vec<String> {
        self.numeric_attributes()
            .map(|a| a.column_name().to_string())
            .chain(self.schema.features.iter().cloned())
            .collect()
    }

    fn numeric_attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.schema
            .attributes
            .iter()
            .copied()
            .filter(|a| a.is_numeric_feature())
    }

    /// Матрица признаков (строки x столбцы `feature_columns`), пропуски = NaN
    pub fn feature_matrix(&self) -> Array2<f64> {
        let numeric: Vec<Attribute> = self.numeric_attributes().collect();
        let n_features = numeric.len() + self.schema.features.len();
        let mut matrix = Array2::from_elem((self.records.len(), n_features), f64::NAN);

        for (i, record) in self.records.iter().enumerate() {
            for (j, attribute) in numeric.iter().enumerate() {
                if let Some(v) = record.numeric_attribute(*attribute) {
                    matrix[[i, j]] = v;
                }
            }
            for (k, value) in record.features.iter().enumerate() {
                if let Some(v) = value {
                    matrix[[i, numeric.len() + k]] = *v;
                }
            }
        }

        matrix
    }

    /// Обратная операция к `feature_matrix`
    pub fn with_feature_matrix(&self, matrix: &Array2<f64>) -> Result<Self> {
        let numeric: Vec<Attribute> = self.numeric_attributes().collect();
        let expected = (self.records.len(), numeric.len() + self.schema.features.len());
        if matrix.dim() != expected {
            return Err(PrepError::LengthMismatch {
                expected: expected.0 * expected.1,
                actual: matrix.len(),
            });
        }

        let as_option = |v: f64| if v.is_nan() { None } else { Some(v) };
        let records = self
            .records
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, mut r)| {
                for (j, attribute) in numeric.iter().enumerate() {
                    r.set_numeric_attribute(*attribute, as_option(matrix[[i, j]]));
                }
                for (k, value) in r.features.iter_mut().enumerate() {
                    *value = as_option(matrix[[i, numeric.len() + k]]);
                }
                r
            })
            .collect();

        Ok(Self {
            schema: self.schema.clone(),
            records,
        })
    }

    /// Все столбцы кроме идентификатора в порядке схемы
    pub fn columns(&self) -> Vec<(String, Column)> {
        let mut columns = Vec::new();

        for attribute in &self.schema.attributes {
            let column = match attribute {
                Attribute::UsageType | Attribute::City | Attribute::Department => Column::Categorical(
                    self.records
                        .iter()
                        .map(|r| r.categorical_attribute(*attribute).map(str::to_string))
                        .collect(),
                ),
                _ => Column::Numeric(
                    self.records
                        .iter()
                        .map(|r| r.numeric_attribute(*attribute).unwrap_or(f64::NAN))
                        .collect(),
                ),
            };
            columns.push((attribute.column_name().to_string(), column));
        }

        for (k, name) in self.schema.features.iter().enumerate() {
            let is_indicator = self.records.iter().any(|r| r.features[k].is_some())
                && self
                    .records
                    .iter()
                    .filter_map(|r| r.features[k])
                    .all(|v| v == 0.0 || v == 1.0);

            // Индикаторы 0/1 (например, после dummy-кодирования) считаются категориальными
            let column = if is_indicator {
                Column::Categorical(
                    self.records
                        .iter()
                        .map(|r| r.features[k].map(|v| if v == 1.0 { "1" } else { "0" }.to_string()))
                        .collect(),
                )
            } else {
                Column::Numeric(
                    self.records
                        .iter()
                        .map(|r| r.features[k].unwrap_or(f64::NAN))
                        .collect(),
                )
            };
            columns.push((name.clone(), column));
        }

        columns
    }
}

/// Пара (обучающая, тестовая) таблиц
#[derive(Debug, Clone, PartialEq)]
pub struct SplitPair {
    pub train: BuildingTable,
    pub test: BuildingTable,
}

/// Зерно воспроизводимости, передаётся явно в каждую случайную операцию
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Seed(u64);

impl Seed {
    pub fn new(value: u32) -> Self {
        Self(u64::from(value))
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// Индекс в списке длины `len` (seed mod len)
    pub fn pick(self, len: usize) -> usize {
        debug_assert!(len > 0);
        (self.0 % len as u64) as usize
    }

    pub fn rng(self) -> StdRng {
        StdRng::seed_from_u64(self.0)
    }
}

impl TryFrom<i64> for Seed {
    type Error = PrepError;

    fn try_from(value: i64) -> Result<Self> {
        u64::try_from(value)
            .map(Seed)
            .map_err(|_| PrepError::InvalidSeed(value))
    }
}

impl From<Seed> for i64 {
    fn from(seed: Seed) -> i64 {
        // Seed строится только из u32 или неотрицательного i64
        seed.0 as i64
    }
}

impl Default for Seed {
    fn default() -> Self {
        Self(schema::DEFAULT_SEED as u64)
    }
}
