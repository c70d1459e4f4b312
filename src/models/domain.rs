use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::ScoringError;

/// A categorical attribute with a fixed string -> code table
///
/// Unknown strings and non-string values resolve to the code-0 variant.
pub trait Category: Sized + Copy + 'static {
    /// Accepted spellings, in code order
    const TABLE: &'static [(&'static str, Self)];
    /// Variant used when the attribute is absent
    const DEFAULT: Self;

    /// Numeric code consumed by the regression model
    fn code(self) -> f64;

    fn parse(raw: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(name, _)| *name == raw)
            .map(|(_, value)| *value)
    }

    fn fallback() -> Self {
        Self::TABLE[0].1
    }

    fn as_str(self) -> &'static str
    where
        Self: PartialEq,
    {
        Self::TABLE
            .iter()
            .find(|(_, value)| *value == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown")
    }
}

macro_rules! category {
    (
        $(#[$meta:meta])*
        $name:ident, default = $default:ident,
        { $($variant:ident => $text:literal = $code:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl Category for $name {
            const TABLE: &'static [(&'static str, Self)] = &[$(($text, $name::$variant)),+];
            const DEFAULT: Self = $name::$default;

            fn code(self) -> f64 {
                match self {
                    $($name::$variant => $code as f64),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::DEFAULT
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = Value::deserialize(deserializer)?;
                Ok(value.as_str().and_then(Self::parse).unwrap_or_else(Self::fallback))
            }
        }
    };
}

category! {
    /// Where the adopter lives
    HousingType, default = Apartment,
    { Apartment => "apartment" = 0, HouseSmall => "house_small" = 1, HouseLarge => "house_large" = 2 }
}

category! {
    /// Adopter's prior experience with animals
    Experience, default = Inexperienced,
    { Inexperienced => "none" = 0, Intermediate => "some" = 1, Expert => "expert" = 2 }
}

category! {
    Species, default = Cat,
    { Cat => "cat" = 0, Dog => "dog" = 1, Other => "other" = 2 }
}

category! {
    Size, default = Medium,
    { Small => "small" = 0, Medium => "medium" = 1, Large => "large" = 2 }
}

/// Prospective adopter profile
///
/// Every field is optional; absent fields take the documented defaults
/// when encoded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct UserProfile {
    /// Defaults to `apartment`
    pub housing_type: Option<HousingType>,
    /// Hours per day, defaults to 5
    pub available_time: Option<f64>,
    /// Defaults to `none`
    pub experience: Option<Experience>,
    /// Defaults to false
    pub has_children: Option<bool>,
    /// Defaults to false
    pub has_other_pets: Option<bool>,
}

impl UserProfile {
    pub fn housing_type(&self) -> HousingType {
        self.housing_type.unwrap_or_default()
    }

    pub fn available_time(&self) -> f64 {
        self.available_time.unwrap_or(5.0)
    }

    pub fn experience(&self) -> Experience {
        self.experience.unwrap_or_default()
    }

    pub fn has_children(&self) -> bool {
        self.has_children.unwrap_or(false)
    }

    pub fn has_other_pets(&self) -> bool {
        self.has_other_pets.unwrap_or(false)
    }
}

impl TryFrom<Value> for UserProfile {
    type Error = ScoringError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let fields = FieldReader::new("user", &value)?;
        Ok(Self {
            housing_type: fields.category("housing_type"),
            available_time: fields.real("available_time")?,
            experience: fields.category("experience"),
            has_children: fields.flag("has_children")?,
            has_other_pets: fields.flag("has_other_pets")?,
        })
    }
}

/// Adoptable animal profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct AnimalProfile {
    /// Opaque identifier echoed back in batch results
    pub id: Option<Value>,
    /// Defaults to `cat`
    pub species: Option<Species>,
    /// Years, defaults to 2
    pub age: Option<f64>,
    /// Defaults to `medium`
    pub size: Option<Size>,
    /// 0-10, defaults to 5
    pub energy_level: Option<f64>,
    /// Defaults to true
    pub good_with_children: Option<bool>,
    /// Defaults to true
    pub good_with_pets: Option<bool>,
}

impl AnimalProfile {
    pub fn species(&self) -> Species {
        self.species.unwrap_or_default()
    }

    pub fn age(&self) -> f64 {
        self.age.unwrap_or(2.0)
    }

    pub fn size(&self) -> Size {
        self.size.unwrap_or_default()
    }

    pub fn energy_level(&self) -> f64 {
        self.energy_level.unwrap_or(5.0)
    }

    pub fn good_with_children(&self) -> bool {
        self.good_with_children.unwrap_or(true)
    }

    pub fn good_with_pets(&self) -> bool {
        self.good_with_pets.unwrap_or(true)
    }
}

impl TryFrom<Value> for AnimalProfile {
    type Error = ScoringError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let fields = FieldReader::new("animal", &value)?;
        Ok(Self {
            id: fields.raw("id").cloned(),
            species: fields.category("species"),
            age: fields.real("age")?,
            size: fields.category("size"),
            energy_level: fields.real("energy_level")?,
            good_with_children: fields.flag("good_with_children")?,
            good_with_pets: fields.flag("good_with_pets")?,
        })
    }
}

/// Reads typed fields out of a JSON object, treating `null` as absent
struct FieldReader<'a> {
    entity: &'static str,
    map: &'a Map<String, Value>,
}

impl<'a> FieldReader<'a> {
    fn new(entity: &'static str, value: &'a Value) -> Result<Self, ScoringError> {
        match value {
            Value::Object(map) => Ok(Self { entity, map }),
            other => Err(ScoringError::Validation(format!(
                "{} must be a JSON object, found {}",
                entity,
                json_kind(other)
            ))),
        }
    }

    fn raw(&self, field: &str) -> Option<&'a Value> {
        self.map.get(field).filter(|v| !v.is_null())
    }

    fn category<C: Category>(&self, field: &str) -> Option<C> {
        self.raw(field).map(|v| match v {
            Value::String(s) => C::parse(s).unwrap_or_else(C::fallback),
            _ => C::fallback(),
        })
    }

    fn real(&self, field: &'static str) -> Result<Option<f64>, ScoringError> {
        let Some(value) = self.raw(field) else {
            return Ok(None);
        };

        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };

        match parsed {
            Some(x) if x.is_finite() => Ok(Some(x)),
            _ => Err(self.encoding_error(field, "a real number", value)),
        }
    }

    fn flag(&self, field: &'static str) -> Result<Option<bool>, ScoringError> {
        let Some(value) = self.raw(field) else {
            return Ok(None);
        };

        match value {
            Value::Bool(b) => Ok(Some(*b)),
            Value::Number(n) if n.as_f64() == Some(0.0) => Ok(Some(false)),
            Value::Number(n) if n.as_f64() == Some(1.0) => Ok(Some(true)),
            _ => Err(self.encoding_error(field, "a boolean", value)),
        }
    }

    fn encoding_error(&self, field: &'static str, expected: &str, found: &Value) -> ScoringError {
        ScoringError::Encoding {
            entity: self.entity,
            field,
            reason: format!("expected {}, found {}", expected, found),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Number of features fed to the regression model
pub const FEATURE_COUNT: usize = 11;

/// Feature names in vector order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "housing_type",
    "available_time",
    "experience",
    "has_children",
    "has_other_pets",
    "species",
    "age",
    "size",
    "energy_level",
    "good_with_children",
    "good_with_pets",
];

/// Fixed-order numeric encoding of a (user, animal) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub const HOUSING_TYPE: usize = 0;
    pub const AVAILABLE_TIME: usize = 1;
    pub const EXPERIENCE: usize = 2;
    pub const HAS_CHILDREN: usize = 3;
    pub const HAS_OTHER_PETS: usize = 4;
    pub const SPECIES: usize = 5;
    pub const AGE: usize = 6;
    pub const SIZE: usize = 7;
    pub const ENERGY_LEVEL: usize = 8;
    pub const GOOD_WITH_CHILDREN: usize = 9;
    pub const GOOD_WITH_PETS: usize = 10;

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[inline]
    pub fn get(&self, index: usize) -> f64 {
        self.0[index]
    }
}

/// Ordinal recommendation band derived from a compatibility score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Low,
    Moderate,
    Good,
    Excellent,
}

impl Recommendation {
    pub fn as_str(self) -> &'static str {
        match self {
            Recommendation::Low => "low",
            Recommendation::Moderate => "moderate",
            Recommendation::Good => "good",
            Recommendation::Excellent => "excellent",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score for one (user, animal) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub compatibility_score: f64,
    pub recommendation: Recommendation,
}

/// One entry of a ranked batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAnimal {
    pub animal_id: Option<Value>,
    pub compatibility_score: f64,
    pub recommendation: Recommendation,
}
