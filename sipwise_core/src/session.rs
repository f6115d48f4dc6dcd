//! Drinking session state.
//!
//! The session owns everything the user logs: the profile, the drink log and
//! the water log. BAC and the hydration signals are projections over it,
//! computed on demand by the engine and never cached.

use crate::engine::{compute_bac_with_thresholds, Thresholds};
use crate::{BacResult, DrinkEvent, DrinkingPattern, Error, Profile, Result, WaterLog};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Water to aim for per alcoholic drink
pub const WATER_PER_DRINK_ML: f64 = 250.0;

/// Water needed (with a low BAC) for a session to count as mindful
pub const MINDFUL_WATER_ML: f64 = 500.0;

const MINDFUL_MAX_BAC: f64 = 0.05;
const PARTY_MIN_BAC: f64 = 0.08;

/// One drinking session: append-only logs until reset
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub profile: Profile,
    #[serde(default)]
    pub drinks: Vec<DrinkEvent>,
    #[serde(default)]
    pub water: Vec<WaterLog>,
}

impl Session {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            drinks: Vec::new(),
            water: Vec::new(),
        }
    }

    pub fn add_drink(&mut self, drink: DrinkEvent) {
        tracing::debug!(
            "Logged drink {} ({}% x {} {:?})",
            drink.id,
            drink.abv,
            drink.volume,
            drink.volume_unit
        );
        self.drinks.push(drink);
    }

    pub fn add_water(&mut self, volume_ml: f64, at: DateTime<Utc>) {
        let log = WaterLog::new(volume_ml, at);
        tracing::debug!("Logged water {} ({} ml)", log.id, volume_ml);
        self.water.push(log);
    }

    /// Discard both logs, keeping the profile
    pub fn reset(&mut self) {
        tracing::info!(
            "Resetting session ({} drinks, {} water logs)",
            self.drinks.len(),
            self.water.len()
        );
        self.drinks.clear();
        self.water.clear();
    }

    /// Check the profile and every logged event, as the intake forms would
    pub fn validate(&self) -> Result<()> {
        self.profile.validate()?;
        for (index, drink) in self.drinks.iter().enumerate() {
            drink
                .validate()
                .map_err(|reason| Error::InvalidDrinkEvent { index, reason })?;
        }
        for (index, log) in self.water.iter().enumerate() {
            log.validate()
                .map_err(|reason| Error::InvalidWaterLog { index, reason })?;
        }
        Ok(())
    }

    pub fn water_intake_ml(&self) -> f64 {
        self.water.iter().map(|w| w.volume_ml).sum()
    }

    pub fn evaluate(&self, now: DateTime<Utc>) -> Result<BacResult> {
        self.evaluate_with(now, &Thresholds::default())
    }

    pub fn evaluate_with(&self, now: DateTime<Utc>, thresholds: &Thresholds) -> Result<BacResult> {
        compute_bac_with_thresholds(&self.profile, &self.drinks, now, thresholds)
    }

    /// Water target for the drinks logged so far
    pub fn water_goal_ml(&self) -> f64 {
        self.drinks.len() as f64 * WATER_PER_DRINK_ML
    }

    /// Water intake as a fraction of the goal; 0 with no goal yet
    pub fn hydration_progress(&self) -> f64 {
        let goal = self.water_goal_ml();
        if goal <= 0.0 {
            return 0.0;
        }
        self.water_intake_ml() / goal
    }
}

/// Classify a session's style from its current BAC and water intake
pub fn drinking_pattern(bac: f64, water_ml: f64) -> DrinkingPattern {
    if bac <= MINDFUL_MAX_BAC && water_ml >= MINDFUL_WATER_ML {
        DrinkingPattern::Mindful
    } else if bac > PARTY_MIN_BAC {
        DrinkingPattern::Party
    } else {
        DrinkingPattern::Balanced
    }
}
