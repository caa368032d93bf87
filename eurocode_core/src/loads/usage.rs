//! Usage categories and ψ coefficients per EN 1990 Annex A1 (Table A1.1)
//!
//! Every variable action belongs to one usage category. The category fixes the
//! three reduction coefficients used when the action is combined with others:
//!
//! - ψ0: combination value (non-leading actions in ELU and ELS characteristic)
//! - ψ1: frequent value (leading action in ELS frequent)
//! - ψ2: quasi-permanent value (all other long-term contributions)

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// The three ψ coefficients of a variable action.
///
/// # Example
/// ```
/// use eurocode_core::loads::UsageCategory;
///
/// let psi = UsageCategory::A.coefficients();
/// assert_eq!((psi.psi0, psi.psi1, psi.psi2), (0.7, 0.5, 0.3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoefficientSet {
    pub psi0: f64,
    pub psi1: f64,
    pub psi2: f64,
}

impl CoefficientSet {
    pub const fn new(psi0: f64, psi1: f64, psi2: f64) -> Self {
        CoefficientSet { psi0, psi1, psi2 }
    }

    /// Read one coefficient
    pub fn get(&self, which: Psi) -> f64 {
        match which {
            Psi::Psi0 => self.psi0,
            Psi::Psi1 => self.psi1,
            Psi::Psi2 => self.psi2,
        }
    }

    /// Overwrite one coefficient
    pub fn set(&mut self, which: Psi, value: f64) {
        match which {
            Psi::Psi0 => self.psi0 = value,
            Psi::Psi1 => self.psi1 = value,
            Psi::Psi2 => self.psi2 = value,
        }
    }

    /// Coefficients lying outside [0, 1]
    pub fn out_of_range(&self) -> Vec<(Psi, f64)> {
        Psi::ALL
            .iter()
            .map(|which| (*which, self.get(*which)))
            .filter(|(_, value)| !(0.0..=1.0).contains(value))
            .collect()
    }
}

/// Selects one of ψ0, ψ1, ψ2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Psi {
    Psi0,
    Psi1,
    Psi2,
}

impl Psi {
    pub const ALL: [Psi; 3] = [Psi::Psi0, Psi::Psi1, Psi::Psi2];

    /// Symbol used in formulas and tables
    pub fn symbol(&self) -> &'static str {
        match self {
            Psi::Psi0 => "ψ0",
            Psi::Psi1 => "ψ1",
            Psi::Psi2 => "ψ2",
        }
    }
}

impl std::fmt::Display for Psi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Usage categories of variable actions per EN 1990 Table A1.1
///
/// # Example
/// ```
/// use eurocode_core::loads::UsageCategory;
///
/// let wind: UsageCategory = "wind".parse().unwrap();
/// assert_eq!(wind.coefficients().psi0, 0.6);
/// assert!("Z".parse::<UsageCategory>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UsageCategory {
    /// Domestic, residential areas
    #[default]
    A,
    /// Office areas
    B,
    /// Congregation areas
    C,
    /// Shopping areas
    D,
    /// Storage areas
    E,
    /// Traffic area, vehicle weight ≤ 30 kN
    F,
    /// Traffic area, 30 kN < vehicle weight ≤ 160 kN
    G,
    /// Roofs
    H,
    /// Snow, sites at altitude H ≤ 1000 m a.s.l.
    #[serde(rename = "snow_low")]
    SnowLowAltitude,
    /// Snow, sites at altitude H > 1000 m a.s.l.
    #[serde(rename = "snow_high")]
    SnowHighAltitude,
    /// Wind loads on buildings
    #[serde(rename = "wind")]
    Wind,
    /// Temperature (non-fire) in buildings
    #[serde(rename = "temperature")]
    Temperature,
}

impl UsageCategory {
    /// All categories in table order
    pub const ALL: [UsageCategory; 12] = [
        UsageCategory::A,
        UsageCategory::B,
        UsageCategory::C,
        UsageCategory::D,
        UsageCategory::E,
        UsageCategory::F,
        UsageCategory::G,
        UsageCategory::H,
        UsageCategory::SnowLowAltitude,
        UsageCategory::SnowHighAltitude,
        UsageCategory::Wind,
        UsageCategory::Temperature,
    ];

    /// Lookup key, identical to the serialized form
    pub fn key(&self) -> &'static str {
        match self {
            UsageCategory::A => "A",
            UsageCategory::B => "B",
            UsageCategory::C => "C",
            UsageCategory::D => "D",
            UsageCategory::E => "E",
            UsageCategory::F => "F",
            UsageCategory::G => "G",
            UsageCategory::H => "H",
            UsageCategory::SnowLowAltitude => "snow_low",
            UsageCategory::SnowHighAltitude => "snow_high",
            UsageCategory::Wind => "wind",
            UsageCategory::Temperature => "temperature",
        }
    }

    /// Label shown next to the coefficients
    pub fn description(&self) -> &'static str {
        match self {
            UsageCategory::A => "Catégorie A : habitation, zones résidentielles",
            UsageCategory::B => "Catégorie B : bureaux",
            UsageCategory::C => "Catégorie C : lieux de réunion",
            UsageCategory::D => "Catégorie D : commerces",
            UsageCategory::E => "Catégorie E : stockage",
            UsageCategory::F => "Catégorie F : circulation, véhicules ≤ 30 kN",
            UsageCategory::G => "Catégorie G : circulation, 30 kN < véhicules ≤ 160 kN",
            UsageCategory::H => "Catégorie H : toits",
            UsageCategory::SnowLowAltitude => "Neige (altitude ≤ 1000 m)",
            UsageCategory::SnowHighAltitude => "Neige (altitude > 1000 m)",
            UsageCategory::Wind => "Vent",
            UsageCategory::Temperature => "Température (hors incendie)",
        }
    }

    /// Recommended ψ0/ψ1/ψ2 for this category
    pub fn coefficients(&self) -> CoefficientSet {
        match self {
            UsageCategory::A | UsageCategory::B => CoefficientSet::new(0.7, 0.5, 0.3),
            UsageCategory::C | UsageCategory::D => CoefficientSet::new(0.7, 0.7, 0.6),
            UsageCategory::E => CoefficientSet::new(1.0, 0.9, 0.8),
            UsageCategory::F => CoefficientSet::new(0.7, 0.7, 0.6),
            UsageCategory::G => CoefficientSet::new(0.7, 0.5, 0.3),
            UsageCategory::H => CoefficientSet::new(0.0, 0.0, 0.0),
            UsageCategory::SnowLowAltitude => CoefficientSet::new(0.5, 0.2, 0.0),
            UsageCategory::SnowHighAltitude => CoefficientSet::new(0.7, 0.5, 0.2),
            UsageCategory::Wind => CoefficientSet::new(0.6, 0.2, 0.0),
            UsageCategory::Temperature => CoefficientSet::new(0.6, 0.5, 0.0),
        }
    }
}

impl std::fmt::Display for UsageCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for UsageCategory {
    type Err = CalcError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        UsageCategory::ALL
            .iter()
            .copied()
            .find(|category| category.key() == key)
            .ok_or_else(|| CalcError::unknown_usage_category(key))
    }
}

/// One row of the coefficient table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoefficientEntry {
    pub category: UsageCategory,
    pub coefficients: CoefficientSet,
    pub description: &'static str,
}

/// Look up a table row by its string key.
///
/// Unknown keys are a contract violation: the caller should only ever offer
/// keys taken from [`UsageCategory::ALL`].
pub fn lookup(key: &str) -> CalcResult<CoefficientEntry> {
    let category: UsageCategory = key.parse()?;
    Ok(CoefficientEntry {
        category,
        coefficients: category.coefficients(),
        description: category.description(),
    })
}

/// The full table in display order
pub fn coefficient_table() -> Vec<CoefficientEntry> {
    UsageCategory::ALL
        .iter()
        .map(|category| CoefficientEntry {
            category: *category,
            coefficients: category.coefficients(),
            description: category.description(),
        })
        .collect()
}
