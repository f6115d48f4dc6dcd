//! BAC estimation engine.
//!
//! A Widmark-derived single-compartment model applied per drink and summed:
//! - Each drink adds `grams / (body_weight_g * r) * 100`, scaled by tolerance
//! - Each drink then decays linearly at the profile's elimination rate `β`
//! - Contributions are floored at zero before summing
//!
//! The engine is a pure function of its inputs. It keeps no state between
//! calls, so callers re-invoke it with the current time whenever they want a
//! fresh reading.

use crate::{
    BacResult, DrinkEvent, Error, Gender, HangoverRiskTier, Profile, RecommendationTier, Result,
    Tolerance, VolumeUnit, WeightUnit,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kilograms per pound
pub const KG_PER_LB: f64 = 0.453592;

/// Milliliters per US fluid ounce
pub const ML_PER_FL_OZ: f64 = 29.5735;

/// Density of ethanol in g/ml
pub const ETHANOL_DENSITY_G_PER_ML: f64 = 0.789;

/// Grams of pure alcohol in one standard drink
pub const STANDARD_DRINK_GRAMS: f64 = 14.0;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Widmark constants for one metabolism bucket
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MetabolismModel {
    /// Body-water distribution factor `r`
    pub distribution_factor: f64,
    /// Elimination rate `β` in BAC percent per hour
    pub elimination_rate: f64,
}

/// Resolve the metabolism constants for a gender bucket
pub fn metabolism_model(gender: Gender) -> MetabolismModel {
    match gender {
        Gender::Male => MetabolismModel {
            distribution_factor: 0.68,
            elimination_rate: 0.015,
        },
        Gender::Female => MetabolismModel {
            distribution_factor: 0.55,
            elimination_rate: 0.017,
        },
        // Midpoint of the two
        Gender::Other | Gender::PreferNotToSay => MetabolismModel {
            distribution_factor: 0.615,
            elimination_rate: 0.016,
        },
    }
}

/// Scaling knob for self-reported tolerance.
///
/// This is a deliberate simplification, not a physiological model.
pub fn tolerance_multiplier(tolerance: Tolerance) -> f64 {
    match tolerance {
        Tolerance::High => 0.9,
        Tolerance::Low => 1.1,
        Tolerance::Medium => 1.0,
    }
}

pub fn weight_in_kg(weight: f64, unit: WeightUnit) -> f64 {
    match unit {
        WeightUnit::Kg => weight,
        WeightUnit::Lbs => weight * KG_PER_LB,
    }
}

pub fn volume_in_ml(volume: f64, unit: VolumeUnit) -> f64 {
    match unit {
        VolumeUnit::Ml => volume,
        VolumeUnit::Oz => volume * ML_PER_FL_OZ,
    }
}

/// Pure alcohol in grams: `volume_ml * abv/100 * 0.789`
pub fn alcohol_grams(drink: &DrinkEvent) -> f64 {
    volume_in_ml(drink.volume, drink.volume_unit) * (drink.abv / 100.0) * ETHANOL_DENSITY_G_PER_ML
}

/// Number of 14 g standard drinks in this drink
pub fn standard_drinks(drink: &DrinkEvent) -> f64 {
    alcohol_grams(drink) / STANDARD_DRINK_GRAMS
}

/// BAC cut-offs for the recommendation and hangover tiers.
///
/// Both tier families use strict `<` comparisons: a BAC exactly on a cut-off
/// lands in the higher tier.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Thresholds {
    /// Below this the recommendation is `good`
    #[serde(default = "default_good_below")]
    pub good_below: f64,

    /// Below this (and not good) the recommendation is `moderate`
    #[serde(default = "default_moderate_below")]
    pub moderate_below: f64,

    #[serde(default = "default_hangover_low_below")]
    pub hangover_low_below: f64,

    #[serde(default = "default_hangover_moderate_below")]
    pub hangover_moderate_below: f64,
}

fn default_good_below() -> f64 {
    0.04
}

fn default_moderate_below() -> f64 {
    0.08
}

fn default_hangover_low_below() -> f64 {
    0.05
}

fn default_hangover_moderate_below() -> f64 {
    0.10
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            good_below: default_good_below(),
            moderate_below: default_moderate_below(),
            hangover_low_below: default_hangover_low_below(),
            hangover_moderate_below: default_hangover_moderate_below(),
        }
    }
}

impl Thresholds {
    /// Check that every cut-off is finite, positive and the pairs ascend
    pub fn validate(&self) -> Result<()> {
        let all = [
            ("good_below", self.good_below),
            ("moderate_below", self.moderate_below),
            ("hangover_low_below", self.hangover_low_below),
            ("hangover_moderate_below", self.hangover_moderate_below),
        ];
        for (name, value) in all {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::Config(format!(
                    "threshold {} must be a positive number, got {}",
                    name, value
                )));
            }
        }

        if self.good_below >= self.moderate_below {
            return Err(Error::Config(format!(
                "good_below ({}) must be less than moderate_below ({})",
                self.good_below, self.moderate_below
            )));
        }
        if self.hangover_low_below >= self.hangover_moderate_below {
            return Err(Error::Config(format!(
                "hangover_low_below ({}) must be less than hangover_moderate_below ({})",
                self.hangover_low_below, self.hangover_moderate_below
            )));
        }
        Ok(())
    }
}

pub fn classify_recommendation(bac: f64, thresholds: &Thresholds) -> RecommendationTier {
    if bac < thresholds.good_below {
        RecommendationTier::Good
    } else if bac < thresholds.moderate_below {
        RecommendationTier::Moderate
    } else {
        RecommendationTier::Caution
    }
}

/// Hangover banding, independent of the recommendation cut-offs
pub fn classify_hangover_risk(bac: f64, thresholds: &Thresholds) -> HangoverRiskTier {
    if bac < thresholds.hangover_low_below {
        HangoverRiskTier::Low
    } else if bac < thresholds.hangover_moderate_below {
        HangoverRiskTier::Moderate
    } else {
        HangoverRiskTier::High
    }
}

/// Minutes until the current total reaches zero at a flat rate `β`.
///
/// This is a linear projection from the current total, not a per-drink
/// simulation of the remaining curve.
pub fn minutes_to_sober(total_bac: f64, elimination_rate: f64) -> Result<u32> {
    if total_bac <= 0.0 {
        return Ok(0);
    }

    let minutes = ((total_bac / elimination_rate) * 60.0).ceil();
    if !minutes.is_finite() || minutes > f64::from(u32::MAX) {
        return Err(Error::OutOfRange(format!(
            "sober projection of {} minutes does not fit",
            minutes
        )));
    }
    Ok(minutes as u32)
}

/// Compute the BAC curve at `now` with the default thresholds
pub fn compute_bac(profile: &Profile, drinks: &[DrinkEvent], now: DateTime<Utc>) -> Result<BacResult> {
    compute_bac_with_thresholds(profile, drinks, now, &Thresholds::default())
}

/// Compute the BAC curve at `now`
///
/// Rejects the whole calculation on the first invalid drink rather than
/// skipping it. Drinks timestamped after `now` have not been drunk yet at
/// `now` and contribute nothing.
pub fn compute_bac_with_thresholds(
    profile: &Profile,
    drinks: &[DrinkEvent],
    now: DateTime<Utc>,
    thresholds: &Thresholds,
) -> Result<BacResult> {
    check_profile(profile)?;

    let model = metabolism_model(profile.gender);
    let multiplier = tolerance_multiplier(profile.tolerance);
    let weight_grams = weight_in_kg(profile.weight, profile.weight_unit) * 1000.0;

    let mut total_bac = 0.0;
    for (index, drink) in drinks.iter().enumerate() {
        drink
            .validate()
            .map_err(|reason| Error::InvalidDrinkEvent { index, reason })?;

        let remaining = remaining_contribution(drink, weight_grams, model, multiplier, now)
            .ok_or_else(|| Error::InvalidDrinkEvent {
                index,
                reason: "alcohol content is too large for this body weight".into(),
            })?;
        total_bac += remaining;
    }
    let total_bac = total_bac.max(0.0);
    if !total_bac.is_finite() {
        return Err(Error::OutOfRange(format!(
            "combined BAC of {} drinks is not finite",
            drinks.len()
        )));
    }

    let recommendation = classify_recommendation(total_bac, thresholds);
    let result = BacResult {
        bac: total_bac,
        recommendation,
        message: recommendation.message().to_string(),
        minutes_to_sober: minutes_to_sober(total_bac, model.elimination_rate)?,
        hangover_risk: classify_hangover_risk(total_bac, thresholds),
    };

    tracing::debug!(
        "Evaluated {} drinks at {}: bac={:.5} tier={} sober_in={}m",
        drinks.len(),
        now.to_rfc3339(),
        result.bac,
        result.recommendation,
        result.minutes_to_sober
    );

    Ok(result)
}

/// The engine's own precondition: anything that would divide by zero
fn check_profile(profile: &Profile) -> Result<()> {
    if !(profile.weight.is_finite() && profile.weight > 0.0) {
        return Err(Error::InvalidProfile(format!(
            "weight must be positive, got {}",
            profile.weight
        )));
    }
    if !(profile.height.is_finite() && profile.height > 0.0) {
        return Err(Error::InvalidProfile(format!(
            "height must be positive, got {}",
            profile.height
        )));
    }
    Ok(())
}

/// One drink's BAC left at `now`, floored at zero
///
/// `None` when the peak overflows to a non-finite value.
fn remaining_contribution(
    drink: &DrinkEvent,
    weight_grams: f64,
    model: MetabolismModel,
    multiplier: f64,
    now: DateTime<Utc>,
) -> Option<f64> {
    let peak = alcohol_grams(drink) / (weight_grams * model.distribution_factor) * 100.0 * multiplier;
    if !peak.is_finite() {
        return None;
    }
    if drink.timestamp > now {
        return Some(0.0);
    }

    let elapsed_hours = (now - drink.timestamp).num_milliseconds() as f64 / MS_PER_HOUR;
    let metabolized = elapsed_hours * model.elimination_rate;

    Some((peak - metabolized).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HeightUnit, VolumeUnit};
    use chrono::{Duration, TimeZone};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 22, 0, 0).unwrap()
    }

    fn male_70kg() -> Profile {
        Profile {
            age: 30,
            height: 180.0,
            height_unit: HeightUnit::Cm,
            weight: 70.0,
            weight_unit: WeightUnit::Kg,
            gender: Gender::Male,
            tolerance: Tolerance::Medium,
        }
    }

    fn beer_at(at: DateTime<Utc>) -> DrinkEvent {
        DrinkEvent::new("Beer", 5.0, 330.0, VolumeUnit::Ml, at)
    }

    fn assert_close(a: f64, b: f64) {
        let scale = a.abs().max(b.abs()).max(1e-12);
        assert!(
            ((a - b) / scale).abs() < 1e-9,
            "expected {} to be within 1e-9 (relative) of {}",
            a,
            b
        );
    }

    #[test]
    fn test_single_beer_scenario() {
        crate::logging::init_test();
        let now = fixed_now();

        let result = compute_bac(&male_70kg(), &[beer_at(now)], now).unwrap();

        let expected = 330.0 * 0.05 * 0.789 / (70_000.0 * 0.68) * 100.0;
        assert_close(result.bac, expected);
        assert!((result.bac - 0.02735).abs() < 1e-5);
        assert_eq!(result.recommendation, RecommendationTier::Good);
        assert_eq!(result.message, "You're good to go");
        assert_eq!(result.hangover_risk, HangoverRiskTier::Low);
        assert_eq!(result.minutes_to_sober, 110);
    }

    #[test]
    fn test_no_drinks_is_sober() {
        let result = compute_bac(&male_70kg(), &[], fixed_now()).unwrap();

        assert_eq!(result.bac, 0.0);
        assert_eq!(result.minutes_to_sober, 0);
        assert_eq!(result.recommendation, RecommendationTier::Good);
        assert_eq!(result.hangover_risk, HangoverRiskTier::Low);
    }

    #[test]
    fn test_decay_is_monotonic_and_reaches_zero() {
        let start = fixed_now();
        let drinks = vec![beer_at(start)];
        let profile = male_70kg();

        let mut previous = f64::INFINITY;
        for minutes in (0..=240).step_by(10) {
            let result = compute_bac(&profile, &drinks, start + Duration::minutes(minutes)).unwrap();
            assert!(result.bac <= previous);
            previous = result.bac;
        }

        // 0.02735 / 0.015 ≈ 1.82h, so two hours later it is gone for good
        for hours in [2, 3, 12, 48] {
            let result = compute_bac(&profile, &drinks, start + Duration::hours(hours)).unwrap();
            assert_eq!(result.bac, 0.0);
            assert_eq!(result.minutes_to_sober, 0);
        }
    }

    #[test]
    fn test_bac_never_negative() {
        let start = fixed_now();
        let drinks = vec![
            beer_at(start),
            DrinkEvent::new("Whiskey", 40.0, 44.0, VolumeUnit::Ml, start + Duration::minutes(50)),
            DrinkEvent::new("Wine", 12.0, 5.0, VolumeUnit::Oz, start - Duration::hours(3)),
        ];

        for gender in [Gender::Male, Gender::Female, Gender::Other] {
            let mut profile = male_70kg();
            profile.gender = gender;
            for minutes in (-120..=24 * 60).step_by(17) {
                let result = compute_bac(&profile, &drinks, start + Duration::minutes(minutes)).unwrap();
                assert!(result.bac >= 0.0);
                assert!(result.bac.is_finite());
            }
        }
    }

    #[test]
    fn test_contributions_clamp_before_summing() {
        let now = fixed_now();
        let profile = male_70kg();

        // A long-gone drink must not eat into a fresh one
        let old = beer_at(now - Duration::hours(10));
        let fresh = beer_at(now);

        let both = compute_bac(&profile, &[old, fresh.clone()], now).unwrap();
        let only_fresh = compute_bac(&profile, &[fresh], now).unwrap();

        assert_eq!(both.bac, only_fresh.bac);
    }

    #[test]
    fn test_order_independence() {
        let now = fixed_now();
        let profile = male_70kg();
        let drinks = vec![
            beer_at(now - Duration::minutes(90)),
            DrinkEvent::new("Wine", 12.0, 150.0, VolumeUnit::Ml, now - Duration::minutes(20)),
            DrinkEvent::new("Vodka", 40.0, 1.5, VolumeUnit::Oz, now - Duration::minutes(45)),
        ];
        let mut reversed = drinks.clone();
        reversed.reverse();
        let mut rotated = drinks.clone();
        rotated.rotate_left(1);

        let a = compute_bac(&profile, &drinks, now).unwrap();
        let b = compute_bac(&profile, &reversed, now).unwrap();
        let c = compute_bac(&profile, &rotated, now).unwrap();

        assert_close(a.bac, b.bac);
        assert_close(a.bac, c.bac);
        assert_eq!(a.minutes_to_sober, b.minutes_to_sober);
    }

    #[test]
    fn test_imperial_units_match_metric() {
        let now = fixed_now();
        let at = now - Duration::minutes(30);

        let mut imperial = male_70kg();
        imperial.weight = 160.0;
        imperial.weight_unit = WeightUnit::Lbs;
        let mut metric = imperial.clone();
        metric.weight = 160.0 * KG_PER_LB;
        metric.weight_unit = WeightUnit::Kg;

        let oz = DrinkEvent::new("Beer", 5.0, 12.0, VolumeUnit::Oz, at);
        let ml = DrinkEvent::new("Beer", 5.0, 12.0 * ML_PER_FL_OZ, VolumeUnit::Ml, at);

        let a = compute_bac(&imperial, &[oz], now).unwrap();
        let b = compute_bac(&metric, &[ml], now).unwrap();

        assert_close(a.bac, b.bac);
    }

    #[test]
    fn test_recommendation_boundaries() {
        let t = Thresholds::default();

        assert_eq!(classify_recommendation(0.04 - 1e-9, &t), RecommendationTier::Good);
        assert_eq!(classify_recommendation(0.04, &t), RecommendationTier::Moderate);
        assert_eq!(classify_recommendation(0.04 + 1e-9, &t), RecommendationTier::Moderate);
        assert_eq!(classify_recommendation(0.08 - 1e-9, &t), RecommendationTier::Moderate);
        assert_eq!(classify_recommendation(0.08, &t), RecommendationTier::Caution);
    }

    #[test]
    fn test_hangover_bands_are_independent() {
        let t = Thresholds::default();

        // Moderate recommendation but still low hangover risk
        assert_eq!(classify_recommendation(0.045, &t), RecommendationTier::Moderate);
        assert_eq!(classify_hangover_risk(0.045, &t), HangoverRiskTier::Low);

        assert_eq!(classify_hangover_risk(0.05, &t), HangoverRiskTier::Moderate);
        assert_eq!(classify_hangover_risk(0.0999, &t), HangoverRiskTier::Moderate);
        assert_eq!(classify_hangover_risk(0.10, &t), HangoverRiskTier::High);
    }

    #[test]
    fn test_gender_and_tolerance_constants() {
        let now = fixed_now();
        let drinks = vec![beer_at(now)];

        let male = compute_bac(&male_70kg(), &drinks, now).unwrap();

        let mut female = male_70kg();
        female.gender = Gender::Female;
        let female = compute_bac(&female, &drinks, now).unwrap();
        assert_close(female.bac, male.bac * 0.68 / 0.55);

        let mut other = male_70kg();
        other.gender = Gender::PreferNotToSay;
        let other = compute_bac(&other, &drinks, now).unwrap();
        assert_close(other.bac, male.bac * 0.68 / 0.615);

        let mut seasoned = male_70kg();
        seasoned.tolerance = Tolerance::High;
        let seasoned = compute_bac(&seasoned, &drinks, now).unwrap();
        assert_close(seasoned.bac, male.bac * 0.9);

        let mut lightweight = male_70kg();
        lightweight.tolerance = Tolerance::Low;
        let lightweight = compute_bac(&lightweight, &drinks, now).unwrap();
        assert_close(lightweight.bac, male.bac * 1.1);
    }

    #[test]
    fn test_sober_projection_uses_profile_rate() {
        // 0.034 / 0.017 * 60 = 120 exactly for the female bucket
        assert_eq!(minutes_to_sober(0.034, 0.017).unwrap(), 120);
        assert_eq!(minutes_to_sober(0.0, 0.015).unwrap(), 0);
        assert_eq!(minutes_to_sober(0.0001, 0.015).unwrap(), 1);
    }

    #[test]
    fn test_sober_projection_out_of_range_is_error() {
        // 1e6 % BAC would take far more than u32::MAX minutes
        assert!(matches!(minutes_to_sober(1e6, 0.015), Err(Error::OutOfRange(_))));
        assert!(minutes_to_sober(f64::INFINITY, 0.015).is_err());
    }

    #[test]
    fn test_overflowing_drink_is_rejected() {
        let now = fixed_now();
        let mut featherweight = male_70kg();
        featherweight.weight = 1e-6;
        let drinks = vec![
            beer_at(now),
            DrinkEvent::new("Everclear", 100.0, 1e308, VolumeUnit::Ml, now),
        ];

        let err = compute_bac(&featherweight, &drinks, now).unwrap_err();
        assert!(matches!(err, Error::InvalidDrinkEvent { index: 1, .. }));
    }

    #[test]
    fn test_overflowing_total_is_rejected() {
        let now = fixed_now();
        let mut one_gram = male_70kg();
        one_gram.weight = 1e-3;

        // Each peak is about 1.2e308, finite on its own; the sum is not
        let drinks = vec![DrinkEvent::new("Spirit", 100.0, 1e306, VolumeUnit::Ml, now); 4];
        assert!(compute_bac(&one_gram, &drinks[..1], now).is_err());
        let err = compute_bac(&one_gram, &drinks, now).unwrap_err();
        assert!(matches!(err, Error::OutOfRange(_)));
    }

    #[test]
    fn test_future_drink_contributes_nothing() {
        let now = fixed_now();
        let later = beer_at(now + Duration::minutes(30));

        let result = compute_bac(&male_70kg(), &[later], now).unwrap();
        assert_eq!(result.bac, 0.0);
    }

    #[test]
    fn test_zero_weight_is_rejected() {
        let mut profile = male_70kg();
        profile.weight = 0.0;

        let err = compute_bac(&profile, &[beer_at(fixed_now())], fixed_now()).unwrap_err();
        assert!(matches!(err, Error::InvalidProfile(_)));

        profile.weight = f64::NAN;
        assert!(compute_bac(&profile, &[], fixed_now()).is_err());
    }

    #[test]
    fn test_invalid_drink_rejects_calculation() {
        let now = fixed_now();
        let drinks = vec![
            beer_at(now),
            DrinkEvent::new("Mystery", 5.0, 0.0, VolumeUnit::Ml, now),
        ];

        let err = compute_bac(&male_70kg(), &drinks, now).unwrap_err();
        assert!(matches!(err, Error::InvalidDrinkEvent { index: 1, .. }));
    }

    #[test]
    fn test_standard_drinks() {
        // 44ml of 40% spirit is roughly one standard drink
        let shot = DrinkEvent::new("Vodka", 40.0, 44.0, VolumeUnit::Ml, fixed_now());
        let count = standard_drinks(&shot);
        assert!((count - 0.992).abs() < 0.001);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(Thresholds::default().validate().is_ok());

        let inverted = Thresholds {
            good_below: 0.09,
            ..Thresholds::default()
        };
        assert!(matches!(inverted.validate(), Err(Error::Config(_))));

        let negative = Thresholds {
            hangover_low_below: -0.01,
            ..Thresholds::default()
        };
        assert!(negative.validate().is_err());
    }
}
