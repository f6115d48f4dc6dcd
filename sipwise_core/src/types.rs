//! Core domain types for the Sipwise BAC engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - The drinker's profile and its unit/gender/tolerance tags
//! - Drink and water events logged during a session
//! - The computed BAC result and its classification tiers

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Unit Tags
// ============================================================================

/// Unit the profile weight is expressed in
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    #[default]
    Kg,
    #[serde(alias = "lb")]
    Lbs,
}

/// Unit the profile height is expressed in
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum HeightUnit {
    #[default]
    Cm,
    Ft,
}

/// Unit a drink volume is expressed in
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VolumeUnit {
    #[default]
    Ml,
    #[serde(alias = "fl_oz")]
    Oz,
}

impl FromStr for WeightUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kgs" => Ok(WeightUnit::Kg),
            "lb" | "lbs" => Ok(WeightUnit::Lbs),
            other => Err(Error::Parse(format!("unknown weight unit: {}", other))),
        }
    }
}

impl FromStr for HeightUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cm" => Ok(HeightUnit::Cm),
            "ft" => Ok(HeightUnit::Ft),
            other => Err(Error::Parse(format!("unknown height unit: {}", other))),
        }
    }
}

impl FromStr for VolumeUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ml" => Ok(VolumeUnit::Ml),
            "oz" | "fl_oz" | "floz" => Ok(VolumeUnit::Oz),
            other => Err(Error::Parse(format!("unknown volume unit: {}", other))),
        }
    }
}

// ============================================================================
// Profile
// ============================================================================

/// Metabolism model selector.
///
/// This picks a pair of Widmark constants; it is not a biological claim.
/// `Other` and `PreferNotToSay` share the averaged constants.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
    PreferNotToSay,
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            "prefer-not-to-say" | "unspecified" => Ok(Gender::PreferNotToSay),
            other => Err(Error::Parse(format!("unknown gender: {}", other))),
        }
    }
}

/// Self-reported drinking tolerance.
///
/// Accepts either a bucket name or a numeric 1-10 scale when deserialized.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case", try_from = "ToleranceInput")]
pub enum Tolerance {
    Low,
    #[default]
    Medium,
    High,
}

impl Tolerance {
    /// Map a numeric tolerance scale onto the three buckets
    ///
    /// 3 and below is low, 8 and above is high, everything else is medium.
    pub fn from_scale(scale: f64) -> Result<Self> {
        if !scale.is_finite() {
            return Err(Error::Parse(format!("tolerance scale must be finite, got {}", scale)));
        }

        Ok(if scale <= 3.0 {
            Tolerance::Low
        } else if scale >= 8.0 {
            Tolerance::High
        } else {
            Tolerance::Medium
        })
    }
}

impl FromStr for Tolerance {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Tolerance::Low),
            "medium" => Ok(Tolerance::Medium),
            "high" => Ok(Tolerance::High),
            other => match other.parse::<f64>() {
                Ok(scale) => Tolerance::from_scale(scale),
                Err(_) => Err(Error::Parse(format!("unknown tolerance: {}", other))),
            },
        }
    }
}

/// Wire shape accepted for a tolerance value
#[derive(Deserialize)]
#[serde(untagged)]
enum ToleranceInput {
    Scale(f64),
    Name(String),
}

impl TryFrom<ToleranceInput> for Tolerance {
    type Error = Error;

    fn try_from(input: ToleranceInput) -> Result<Self> {
        match input {
            ToleranceInput::Scale(scale) => Tolerance::from_scale(scale),
            ToleranceInput::Name(name) => name.parse(),
        }
    }
}

/// The drinker's physiological profile, fixed for one calculation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub age: u32,
    pub height: f64,
    #[serde(default)]
    pub height_unit: HeightUnit,
    pub weight: f64,
    #[serde(default)]
    pub weight_unit: WeightUnit,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub tolerance: Tolerance,
}

/// Youngest age the intake form accepts
pub const MIN_AGE: u32 = 18;

impl Profile {
    /// Intake-form validation: adult, positive height and weight
    ///
    /// This is stricter than what the engine itself checks (the engine does
    /// not care about age).
    pub fn validate(&self) -> Result<()> {
        if self.age < MIN_AGE {
            return Err(Error::InvalidProfile(format!(
                "age must be at least {}, got {}",
                MIN_AGE, self.age
            )));
        }
        if !(self.weight.is_finite() && self.weight > 0.0) {
            return Err(Error::InvalidProfile(format!(
                "weight must be positive, got {}",
                self.weight
            )));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(Error::InvalidProfile(format!(
                "height must be positive, got {}",
                self.height
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Logged Events
// ============================================================================

/// A single alcoholic drink, immutable once logged
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DrinkEvent {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub kind: String,
    /// Percent alcohol by volume (5.0 means 5%)
    pub abv: f64,
    pub volume: f64,
    #[serde(default)]
    pub volume_unit: VolumeUnit,
    pub timestamp: DateTime<Utc>,
}

impl DrinkEvent {
    pub fn new(
        kind: impl Into<String>,
        abv: f64,
        volume: f64,
        volume_unit: VolumeUnit,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: kind.into(),
            abv,
            volume,
            volume_unit,
            timestamp,
        }
    }

    /// Drink-form validation: positive ABV and volume
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.abv.is_finite() && self.abv > 0.0 && self.abv <= 100.0) {
            return Err(format!("abv must be in (0, 100], got {}", self.abv));
        }
        if !(self.volume.is_finite() && self.volume > 0.0) {
            return Err(format!("volume must be positive, got {}", self.volume));
        }
        Ok(())
    }
}

/// A glass of water, tracked alongside drinks for the hydration signals
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WaterLog {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub volume_ml: f64,
    pub timestamp: DateTime<Utc>,
}

impl WaterLog {
    pub fn new(volume_ml: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            volume_ml,
            timestamp,
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.volume_ml.is_finite() && self.volume_ml > 0.0) {
            return Err(format!("volume must be positive, got {} ml", self.volume_ml));
        }
        Ok(())
    }
}

// ============================================================================
// Results
// ============================================================================

/// Drinking recommendation derived from the current BAC
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationTier {
    Good,
    Moderate,
    Caution,
}

impl RecommendationTier {
    /// Message shown next to the tier
    pub fn message(self) -> &'static str {
        match self {
            RecommendationTier::Good => "You're good to go",
            RecommendationTier::Moderate => "Go easy, friend",
            RecommendationTier::Caution => "Time to sip water",
        }
    }
}

/// Coarse hangover forecast derived from the current BAC
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HangoverRiskTier {
    Low,
    Moderate,
    High,
}

impl HangoverRiskTier {
    pub fn message(self) -> &'static str {
        match self {
            HangoverRiskTier::Low => "No risk - you're golden!",
            HangoverRiskTier::Moderate => "Mild risk - hydrate and slow down",
            HangoverRiskTier::High => "High risk - time for water and food!",
        }
    }
}

impl fmt::Display for RecommendationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecommendationTier::Good => "good",
            RecommendationTier::Moderate => "moderate",
            RecommendationTier::Caution => "caution",
        };
        f.write_str(s)
    }
}

impl fmt::Display for HangoverRiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HangoverRiskTier::Low => "low",
            HangoverRiskTier::Moderate => "moderate",
            HangoverRiskTier::High => "high",
        };
        f.write_str(s)
    }
}

/// One evaluation of the BAC curve. Recomputed on every call, never stored.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BacResult {
    /// Estimated BAC in percent (0.045 means 0.045%)
    pub bac: f64,
    pub recommendation: RecommendationTier,
    pub message: String,
    pub minutes_to_sober: u32,
    pub hangover_risk: HangoverRiskTier,
}

/// Overall drinking style for the session
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DrinkingPattern {
    Mindful,
    Balanced,
    Party,
}

impl fmt::Display for DrinkingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DrinkingPattern::Mindful => "mindful",
            DrinkingPattern::Balanced => "balanced",
            DrinkingPattern::Party => "party",
        };
        f.write_str(s)
    }
}
