use serde_json::Value;

use crate::error::ScoringError;
use crate::models::{AnimalProfile, Category, FeatureVector, UserProfile};

/// Encode a (user, animal) pair into the model's feature vector
///
/// Vector order:
/// [housing_type, available_time, experience, has_children, has_other_pets,
///  species, age, size, energy_level, good_with_children, good_with_pets]
///
/// Absent fields take the profile defaults, so this never fails.
#[inline]
pub fn encode(user: &UserProfile, animal: &AnimalProfile) -> FeatureVector {
    FeatureVector([
        user.housing_type().code(),
        user.available_time(),
        user.experience().code(),
        flag(user.has_children()),
        flag(user.has_other_pets()),
        animal.species().code(),
        animal.age(),
        animal.size().code(),
        animal.energy_level(),
        flag(animal.good_with_children()),
        flag(animal.good_with_pets()),
    ])
}

/// Parse raw JSON profiles and encode them
///
/// Fails with `Validation` when either side is not an object and with
/// `Encoding` when a real or flag field holds the wrong kind of value.
pub fn encode_json(user: &Value, animal: &Value) -> Result<FeatureVector, ScoringError> {
    let user = UserProfile::try_from(user.clone())?;
    let animal = AnimalProfile::try_from(animal.clone())?;
    Ok(encode(&user, &animal))
}

#[inline]
fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Experience, HousingType, Size, Species};
    use serde_json::json;

    #[test]
    fn test_encode_defaults() {
        let v = encode(&UserProfile::default(), &AnimalProfile::default());
        assert_eq!(v.0, [0.0, 5.0, 0.0, 0.0, 0.0, 0.0, 2.0, 1.0, 5.0, 1.0, 1.0]);
    }

    #[test]
    fn test_encode_all_fields() {
        let user = UserProfile {
            housing_type: Some(HousingType::HouseLarge),
            available_time: Some(8.0),
            experience: Some(Experience::Expert),
            has_children: Some(false),
            has_other_pets: Some(true),
        };
        let animal = AnimalProfile {
            id: Some(json!("1")),
            species: Some(Species::Dog),
            age: Some(2.0),
            size: Some(Size::Large),
            energy_level: Some(8.0),
            good_with_children: Some(true),
            good_with_pets: Some(true),
        };

        let v = encode(&user, &animal);
        assert_eq!(v.0, [2.0, 8.0, 2.0, 0.0, 1.0, 1.0, 2.0, 2.0, 8.0, 1.0, 1.0]);
    }

    #[test]
    fn test_encode_json_unknown_housing() {
        let v = encode_json(&json!({ "housing_type": "spaceship" }), &json!({})).unwrap();
        assert_eq!(v.get(FeatureVector::HOUSING_TYPE), 0.0);
    }

    #[test]
    fn test_encode_json_rejects_non_numeric_energy() {
        let err = encode_json(&json!({}), &json!({ "energy_level": [5] })).unwrap_err();
        assert!(matches!(err, ScoringError::Encoding { field: "energy_level", .. }));
    }
}
