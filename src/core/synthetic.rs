use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::models::{Category, Experience, FeatureVector, HousingType, Size, Species};

/// Starting point of every heuristic score
pub const BASE_SCORE: f64 = 50.0;
/// Standard deviation of the label noise
pub const NOISE_STD_DEV: f64 = 5.0;
/// Noise is truncated to +/- this value
pub const NOISE_BOUND: f64 = 15.0;

/// Feature vector with its ground-truth compatibility score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    pub features: FeatureVector,
    pub compatibility_score: f64,
}

/// Heuristic compatibility score for a feature vector, without noise
///
/// Starts at `BASE_SCORE` and applies:
/// - housing vs size: large animal in a house +15, in an apartment -20;
///   small animal in an apartment +10
/// - time vs energy: `(available_time / (energy_level + 1) - 0.5) * 20`
/// - experience: expert +10; first-time owner with a dog -15
/// - children / other pets: +20 / +15 when compatible, -30 / -25 when not
/// - age: adult (> 5 years) with a non-expert +10; under one year with a
///   first-time owner -10
/// - cats +5
///
/// The result is not clamped.
pub fn heuristic_score(features: &FeatureVector) -> f64 {
    let housing = features.get(FeatureVector::HOUSING_TYPE);
    let available_time = features.get(FeatureVector::AVAILABLE_TIME);
    let experience = features.get(FeatureVector::EXPERIENCE);
    let has_children = features.get(FeatureVector::HAS_CHILDREN) >= 0.5;
    let has_other_pets = features.get(FeatureVector::HAS_OTHER_PETS) >= 0.5;
    let species = features.get(FeatureVector::SPECIES);
    let age = features.get(FeatureVector::AGE);
    let size = features.get(FeatureVector::SIZE);
    let energy_level = features.get(FeatureVector::ENERGY_LEVEL);
    let good_with_children = features.get(FeatureVector::GOOD_WITH_CHILDREN) >= 0.5;
    let good_with_pets = features.get(FeatureVector::GOOD_WITH_PETS) >= 0.5;

    let in_apartment = housing == HousingType::Apartment.code();
    let first_time_owner = experience == Experience::Inexperienced.code();

    let mut score = BASE_SCORE;

    // Housing vs size
    if size == Size::Large.code() {
        score += if in_apartment { -20.0 } else { 15.0 };
    } else if size == Size::Small.code() && in_apartment {
        score += 10.0;
    }

    // Time available vs energy level
    let time_energy_ratio = available_time / (energy_level + 1.0);
    score += (time_energy_ratio - 0.5) * 20.0;

    // Experience vs species
    if experience == Experience::Expert.code() {
        score += 10.0;
    } else if first_time_owner && species == Species::Dog.code() {
        score -= 15.0;
    }

    if has_children {
        score += if good_with_children { 20.0 } else { -30.0 };
    }

    if has_other_pets {
        score += if good_with_pets { 15.0 } else { -25.0 };
    }

    // Age banding
    if age > 5.0 && experience < Experience::Expert.code() {
        score += 10.0;
    } else if age < 1.0 && first_time_owner {
        score -= 10.0;
    }

    if species == Species::Cat.code() {
        score += 5.0;
    }

    score
}

/// Heuristic score plus bounded Gaussian noise, clamped to [0, 100]
pub fn generate_label<R: Rng + ?Sized>(features: &FeatureVector, rng: &mut R) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    let noise = (z * NOISE_STD_DEV).clamp(-NOISE_BOUND, NOISE_BOUND);
    (heuristic_score(features) + noise).clamp(0.0, 100.0)
}

/// Draw a feature vector uniformly over every attribute's domain
pub fn sample_features<R: Rng + ?Sized>(rng: &mut R) -> FeatureVector {
    FeatureVector([
        rng.gen_range(0..3) as f64,
        rng.gen_range(0.0..10.0),
        rng.gen_range(0..3) as f64,
        rng.gen_range(0..2) as f64,
        rng.gen_range(0..2) as f64,
        rng.gen_range(0..3) as f64,
        rng.gen_range(0.0..20.0),
        rng.gen_range(0..3) as f64,
        rng.gen_range(0.0..10.0),
        rng.gen_range(0..2) as f64,
        rng.gen_range(0..2) as f64,
    ])
}

/// Generate a labeled dataset; the same seed always yields the same data
pub fn generate_dataset(n_samples: usize, seed: u64) -> Vec<LabeledSample> {
    let mut rng = StdRng::seed_from_u64(seed);

    (0..n_samples)
        .map(|_| {
            let features = sample_features(&mut rng);
            let compatibility_score = generate_label(&features, &mut rng);
            LabeledSample {
                features,
                compatibility_score,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline() -> FeatureVector {
        // apartment, 5h, no experience, no kids, no pets, cat, 2y, medium, energy 5
        FeatureVector([0.0, 5.0, 0.0, 0.0, 0.0, 0.0, 2.0, 1.0, 5.0, 1.0, 1.0])
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    fn with(index: usize, value: f64) -> FeatureVector {
        let mut v = baseline();
        v.0[index] = value;
        v
    }

    #[test]
    fn test_baseline_score() {
        // 50 + (5/6 - 0.5) * 20 + 5 for a cat
        let expected = 50.0 + (5.0 / 6.0 - 0.5) * 20.0 + 5.0;
        assert_close(heuristic_score(&baseline()), expected);
    }

    #[test]
    fn test_large_animal_penalized_in_apartment() {
        let large = with(FeatureVector::SIZE, 2.0);
        assert!(heuristic_score(&large) < heuristic_score(&baseline()));

        let mut in_house = large;
        in_house.0[FeatureVector::HOUSING_TYPE] = 2.0;
        assert!(heuristic_score(&in_house) > heuristic_score(&baseline()));
    }

    #[test]
    fn test_more_time_helps() {
        let busy = with(FeatureVector::AVAILABLE_TIME, 1.0);
        let free = with(FeatureVector::AVAILABLE_TIME, 9.0);
        assert!(heuristic_score(&free) > heuristic_score(&busy));
    }

    #[test]
    fn test_higher_energy_hurts() {
        let calm = with(FeatureVector::ENERGY_LEVEL, 1.0);
        let hyper = with(FeatureVector::ENERGY_LEVEL, 9.0);
        assert!(heuristic_score(&calm) > heuristic_score(&hyper));
    }

    #[test]
    fn test_children_incompatibility_penalty() {
        let ok = with(FeatureVector::HAS_CHILDREN, 1.0);
        let mut bad = ok;
        bad.0[FeatureVector::GOOD_WITH_CHILDREN] = 0.0;
        assert_close(heuristic_score(&ok) - heuristic_score(&bad), 50.0);
        assert!(heuristic_score(&bad) < heuristic_score(&baseline()));
    }

    #[test]
    fn test_pets_incompatibility_penalty() {
        let ok = with(FeatureVector::HAS_OTHER_PETS, 1.0);
        let mut bad = ok;
        bad.0[FeatureVector::GOOD_WITH_PETS] = 0.0;
        assert_close(heuristic_score(&ok) - heuristic_score(&bad), 40.0);
    }

    #[test]
    fn test_first_time_owner_with_dog() {
        let dog = with(FeatureVector::SPECIES, 1.0);
        let mut expert_dog = dog;
        expert_dog.0[FeatureVector::EXPERIENCE] = 2.0;
        assert_close(heuristic_score(&expert_dog) - heuristic_score(&dog), 25.0);
    }

    #[test]
    fn test_age_banding() {
        let senior = with(FeatureVector::AGE, 9.0);
        let puppy = with(FeatureVector::AGE, 0.5);
        assert!(heuristic_score(&senior) > heuristic_score(&baseline()));
        assert!(heuristic_score(&puppy) < heuristic_score(&baseline()));
    }

    #[test]
    fn test_labels_are_clamped() {
        let mut rng = StdRng::seed_from_u64(7);
        // Large animal, apartment, no time, hyper dog, kids and pets it hates
        let worst = FeatureVector([0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.5, 2.0, 10.0, 0.0, 0.0]);
        for _ in 0..100 {
            let label = generate_label(&worst, &mut rng);
            assert!((0.0..=100.0).contains(&label));
        }
    }

    #[test]
    fn test_noise_is_bounded() {
        let mut rng = StdRng::seed_from_u64(11);
        let v = baseline();
        let clean = heuristic_score(&v);
        for _ in 0..1000 {
            assert!((generate_label(&v, &mut rng) - clean).abs() <= NOISE_BOUND);
        }
    }

    #[test]
    fn test_dataset_is_reproducible() {
        let a = generate_dataset(50, 42);
        let b = generate_dataset(50, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 50);
    }

    #[test]
    fn test_sampled_features_in_domain() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let v = sample_features(&mut rng);
            assert!((0.0..10.0).contains(&v.get(FeatureVector::AVAILABLE_TIME)));
            assert!((0.0..20.0).contains(&v.get(FeatureVector::AGE)));
            assert!(v.get(FeatureVector::SIZE) <= 2.0);
        }
    }
}
