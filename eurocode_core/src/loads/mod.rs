//! Loads and load combinations per EN 1990 (Eurocode 0)
//!
//! This module provides the types an engineer edits (the load table) and the
//! combinations generated from it.
//!
//! # Overview
//!
//! - [`Load`] - One permanent (G) or variable (Q) action with its characteristic value
//! - [`UsageCategory`] - The 12 Annex A1 categories fixing ψ0/ψ1/ψ2
//! - [`LoadRegistry`] - The editable load table with its coefficient mode
//! - [`generate`] - Builds the 3n + 1 ELU/ELS combinations
//! - [`formula`] - Renders combination formulas for display
//!
//! # Example
//!
//! ```
//! use eurocode_core::loads::{generate, Family, LoadRegistry};
//!
//! let registry = LoadRegistry::with_seed_data();
//! let set = generate(&registry.snapshot()).unwrap();
//!
//! let uls = set.governing_uls().unwrap();
//! assert_eq!(uls.family, Family::Uls);
//! assert!((uls.result - 56.25).abs() < 1e-9);
//! ```

pub mod combinations;
pub mod formula;
pub mod registry;
pub mod usage;

pub use combinations::{
    generate,
    generate_with,
    Combination,
    CombinationSet,
    Factor,
    FactorKind,
    Family,
    GenerationSettings,
    PartialFactors,
    SlsKind,
    Term,
};
pub use formula::{
    display_string,
    format_coefficient,
    format_formula,
    format_term,
    sanitize_name,
    FormulaStyle,
};
pub use registry::{
    CoefficientMode,
    CoefficientWarning,
    LoadInput,
    LoadRegistry,
    LoadSnapshot,
    LoadTable,
};
pub use usage::{coefficient_table, lookup, CoefficientEntry, CoefficientSet, Psi, UsageCategory};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CalcError, CalcResult};

/// Permanent or variable action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadCategory {
    /// G - self-weight, finishes, fixed equipment
    Permanent,
    /// Q - imposed, snow, wind, temperature
    Variable,
}

impl LoadCategory {
    /// Letter used for load symbols (G1, Q2, ...)
    pub fn code(&self) -> &'static str {
        match self {
            LoadCategory::Permanent => "G",
            LoadCategory::Variable => "Q",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            LoadCategory::Permanent => "Permanente",
            LoadCategory::Variable => "Variable",
        }
    }
}

impl std::fmt::Display for LoadCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single action in the load table
///
/// `usage` and `coefficients` are only meaningful for variable loads and are
/// `None` on permanent ones.
///
/// # Example
/// ```
/// use eurocode_core::loads::{Load, UsageCategory};
///
/// let snow = Load::variable("Neige", 8.0, UsageCategory::SnowLowAltitude);
/// assert_eq!(snow.coefficients().unwrap().psi0, 0.5);
///
/// let finishes = Load::permanent("Revêtements", 1.5);
/// assert!(finishes.usage.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Load {
    /// Stable identifier, unchanged by edits
    pub id: Uuid,

    /// Free-text label, also embedded in formulas
    pub name: String,

    /// Characteristic value (any unit, shared by every load of the table)
    pub value: f64,

    pub category: LoadCategory,

    /// Usage category (variable loads only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageCategory>,

    /// ψ0/ψ1/ψ2 (variable loads only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coefficients: Option<CoefficientSet>,
}

impl Load {
    /// Create a permanent load
    pub fn permanent(name: impl Into<String>, value: f64) -> Self {
        Load {
            id: Uuid::new_v4(),
            name: name.into(),
            value,
            category: LoadCategory::Permanent,
            usage: None,
            coefficients: None,
        }
    }

    /// Create a variable load with table coefficients for its usage category
    pub fn variable(name: impl Into<String>, value: f64, usage: UsageCategory) -> Self {
        Load {
            id: Uuid::new_v4(),
            name: name.into(),
            value,
            category: LoadCategory::Variable,
            usage: Some(usage),
            coefficients: Some(usage.coefficients()),
        }
    }

    /// Replace the ψ coefficients (builder pattern)
    pub fn with_coefficients(mut self, coefficients: CoefficientSet) -> Self {
        self.coefficients = Some(coefficients);
        self
    }

    pub fn is_variable(&self) -> bool {
        self.category == LoadCategory::Variable
    }

    /// ψ coefficients of a variable load.
    ///
    /// Fails with `MissingField` on a variable load without coefficients and
    /// with `InvalidInput` on a permanent load.
    pub fn coefficients(&self) -> CalcResult<CoefficientSet> {
        if !self.is_variable() {
            return Err(CalcError::invalid_input(
                "category",
                self.category.description(),
                format!("'{}' is permanent and has no ψ coefficients", self.name),
            ));
        }
        self.coefficients
            .ok_or_else(|| CalcError::missing_field(format!("loads[{}].coefficients", self.id)))
    }

    /// Check the fields every load must satisfy
    pub fn validate(&self) -> CalcResult<()> {
        if !self.value.is_finite() {
            return Err(CalcError::invalid_input(
                format!("loads[{}].value", self.id),
                self.value.to_string(),
                "Load value must be a finite number",
            ));
        }
        if self.is_variable() {
            if self.usage.is_none() {
                return Err(CalcError::missing_field(format!("loads[{}].usage", self.id)));
            }
            let coefficients = self.coefficients()?;
            for which in Psi::ALL {
                if !coefficients.get(which).is_finite() {
                    return Err(CalcError::invalid_input(
                        format!("loads[{}].{}", self.id, which.symbol()),
                        coefficients.get(which).to_string(),
                        "Coefficient must be a finite number",
                    ));
                }
            }
        }
        Ok(())
    }
}
