//! Default catalog of drink kinds offered by the drink log form.
//!
//! Each kind carries the ABV range the form suggests and a typical serving,
//! so a drink can be logged from just its kind.

use crate::{DrinkEvent, VolumeUnit};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;

/// A kind of drink with its typical strength and serving
#[derive(Clone, Debug, Serialize)]
pub struct DrinkKind {
    pub name: String,
    pub abv_min: f64,
    pub abv_max: f64,
    pub serving_ml: f64,
}

impl DrinkKind {
    /// The form pre-fills the bottom of the ABV range
    pub fn default_abv(&self) -> f64 {
        self.abv_min
    }

    /// A drink of this kind with the default ABV and serving
    pub fn preset(&self, at: DateTime<Utc>) -> DrinkEvent {
        DrinkEvent::new(
            self.name.clone(),
            self.default_abv(),
            self.serving_ml,
            VolumeUnit::Ml,
            at,
        )
    }
}

/// The list of known drink kinds
#[derive(Clone, Debug)]
pub struct DrinkCatalog {
    pub kinds: Vec<DrinkKind>,
}

impl DrinkCatalog {
    /// Case-insensitive lookup by kind name
    pub fn find(&self, name: &str) -> Option<&DrinkKind> {
        let needle = name.trim();
        self.kinds
            .iter()
            .find(|k| k.name.eq_ignore_ascii_case(needle))
    }

    /// Check that every kind has a sane ABV range and serving
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for kind in &self.kinds {
            if !(kind.abv_min > 0.0 && kind.abv_min <= kind.abv_max && kind.abv_max <= 100.0) {
                errors.push(format!(
                    "{}: ABV range {}-{} is invalid",
                    kind.name, kind.abv_min, kind.abv_max
                ));
            }
            if kind.serving_ml <= 0.0 {
                errors.push(format!("{}: serving must be positive", kind.name));
            }
        }
        errors
    }
}

/// Cached default catalog - built once and reused
static DEFAULT_CATALOG: Lazy<DrinkCatalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static DrinkCatalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog of drink kinds
pub fn build_default_catalog() -> DrinkCatalog {
    // (name, abv min, abv max, serving ml)
    let table: [(&str, f64, f64, f64); 9] = [
        ("Beer", 4.0, 8.0, 330.0),
        ("Wine", 11.0, 14.0, 150.0),
        ("Vodka", 37.5, 40.0, 44.0),
        ("Whiskey", 40.0, 46.0, 44.0),
        ("Gin", 37.5, 47.3, 44.0),
        ("Rum", 37.5, 40.0, 44.0),
        ("Tequila", 38.0, 40.0, 44.0),
        ("Brandy", 35.0, 60.0, 44.0),
        ("Cocktail", 10.0, 20.0, 200.0),
    ];

    DrinkCatalog {
        kinds: table
            .iter()
            .map(|&(name, abv_min, abv_max, serving_ml)| DrinkKind {
                name: name.into(),
                abv_min,
                abv_max,
                serving_ml,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.kinds.len(), 9);
        assert!(catalog.validate().is_empty());
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let catalog = get_default_catalog();
        let wine = catalog.find("  wINe ").unwrap();
        assert_eq!(wine.name, "Wine");
        assert!(catalog.find("mead").is_none());
    }

    #[test]
    fn test_preset_uses_range_minimum() {
        let now = Utc::now();
        let beer = get_default_catalog().find("beer").unwrap().preset(now);

        assert_eq!(beer.abv, 4.0);
        assert_eq!(beer.volume, 330.0);
        assert_eq!(beer.volume_unit, VolumeUnit::Ml);
        assert_eq!(beer.timestamp, now);
        assert!(beer.validate().is_ok());
    }

    #[test]
    fn test_validate_flags_bad_range() {
        let catalog = DrinkCatalog {
            kinds: vec![DrinkKind {
                name: "Broken".into(),
                abv_min: 12.0,
                abv_max: 5.0,
                serving_ml: 0.0,
            }],
        };
        assert_eq!(catalog.validate().len(), 2);
    }
}
