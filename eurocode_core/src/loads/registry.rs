//! Load Registry
//!
//! The editable load table. The registry owns the list of [`Load`]s in
//! insertion order together with the [`CoefficientMode`] flag deciding whether
//! ψ values follow the usage category or are set by hand.
//!
//! ## Invariants
//!
//! - The registry always holds at least one load.
//! - Every variable load carries a usage category and ψ coefficients.
//! - In [`CoefficientMode::Derived`], every variable load's ψ equal the table
//!   values of its usage category.
//! - Every successful mutation bumps [`LoadRegistry::revision`], which lets
//!   holders of a generated [`CombinationSet`] detect stale results.
//!
//! Rejected edits leave the registry exactly as it was.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use super::combinations::CombinationSet;
use super::usage::{lookup, CoefficientSet, Psi, UsageCategory};
use super::{Load, LoadCategory};
use crate::errors::{rules, CalcError, CalcResult};

/// How ψ coefficients of variable loads are obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoefficientMode {
    /// ψ always follow the usage category
    #[default]
    Derived,
    /// ψ are user overrides and survive usage-category changes
    Custom,
}

/// A ψ value outside [0, 1], reported for review
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoefficientWarning {
    pub load_id: Uuid,
    pub load_name: String,
    pub coefficient: Psi,
    pub value: f64,
}

impl std::fmt::Display for CoefficientWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} of '{}' is {} (outside [0, 1])",
            self.coefficient, self.load_name, self.value
        )
    }
}

/// Immutable copy of the registry handed to the generator.
///
/// Loads are cloned out of the registry, so later edits cannot reach a
/// generation already in progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadSnapshot {
    /// Registry revision the snapshot was taken at
    pub revision: u64,
    /// Permanent loads G1..Gm in insertion order
    pub permanent: Vec<Load>,
    /// Variable loads Q1..Qn in insertion order
    pub variable: Vec<Load>,
}

impl LoadSnapshot {
    /// Build a snapshot from a raw load list, checking every load.
    ///
    /// A variable load without usage or coefficients is a contract violation
    /// and fails the whole snapshot.
    pub fn from_loads(loads: &[Load]) -> CalcResult<Self> {
        for load in loads {
            load.validate()?;
        }
        Ok(Self::split(0, loads))
    }

    fn split(revision: u64, loads: &[Load]) -> Self {
        let (variable, permanent): (Vec<Load>, Vec<Load>) =
            loads.iter().cloned().partition(|load| load.is_variable());
        LoadSnapshot {
            revision,
            permanent,
            variable,
        }
    }
}

/// Serialized load table, as read from an input file
///
/// # JSON Format
/// ```json
/// {
///   "custom_coefficients": false,
///   "loads": [
///     { "name": "Poids propre", "value": 25.0, "category": "permanent" },
///     { "name": "Exploitation", "value": 15.0, "category": "variable", "usage": "A" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadTable {
    /// Keep ψ from the file instead of deriving them from the usage category
    #[serde(default)]
    pub custom_coefficients: bool,
    pub loads: Vec<LoadInput>,
}

/// One row of a [`LoadTable`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    pub value: f64,
    pub category: LoadCategory,
    /// Usage category key (see [`UsageCategory::key`])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psi0: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psi1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psi2: Option<f64>,
}

impl LoadInput {
    /// Resolve this row into a [`Load`].
    ///
    /// In derived mode the ψ columns are ignored; in custom mode each missing
    /// column falls back to the table value.
    pub fn into_load(self, index: usize, mode: CoefficientMode) -> CalcResult<Load> {
        let id = self.id.unwrap_or_else(Uuid::new_v4);
        let load = match self.category {
            LoadCategory::Permanent => Load {
                id,
                name: self.name,
                value: self.value,
                category: LoadCategory::Permanent,
                usage: None,
                coefficients: None,
            },
            LoadCategory::Variable => {
                let key = self
                    .usage
                    .as_deref()
                    .ok_or_else(|| CalcError::missing_field(format!("loads[{}].usage", index)))?;
                let entry = lookup(key)?;
                let defaults = entry.coefficients;
                let coefficients = match mode {
                    CoefficientMode::Derived => defaults,
                    CoefficientMode::Custom => CoefficientSet::new(
                        self.psi0.unwrap_or(defaults.psi0),
                        self.psi1.unwrap_or(defaults.psi1),
                        self.psi2.unwrap_or(defaults.psi2),
                    ),
                };
                Load {
                    id,
                    name: self.name,
                    value: self.value,
                    category: LoadCategory::Variable,
                    usage: Some(entry.category),
                    coefficients: Some(coefficients),
                }
            }
        };
        load.validate()?;
        Ok(load)
    }
}

/// The editable load table
///
/// # Example
/// ```
/// use eurocode_core::loads::{LoadCategory, LoadRegistry, UsageCategory};
///
/// let mut registry = LoadRegistry::with_seed_data();
/// let id = registry.add_load();
/// registry.set_category(id, LoadCategory::Variable).unwrap();
/// registry.set_usage_type(id, UsageCategory::Wind).unwrap();
///
/// let wind = registry.get(id).unwrap();
/// assert_eq!(wind.coefficients().unwrap().psi0, 0.6);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct LoadRegistry {
    loads: Vec<Load>,
    mode: CoefficientMode,
    revision: u64,
}

impl LoadRegistry {
    /// Create a registry from an initial load list.
    ///
    /// Fails on an empty list or on any malformed load. In derived mode the
    /// ψ of variable loads are reset from the table.
    pub fn new(loads: Vec<Load>, mode: CoefficientMode) -> CalcResult<Self> {
        if loads.is_empty() {
            return Err(CalcError::validation(
                rules::EMPTY_TABLE,
                "La table des charges doit contenir au moins une charge",
            ));
        }

        let mut seen = HashSet::new();
        for load in &loads {
            load.validate()?;
            if !seen.insert(load.id) {
                return Err(CalcError::invalid_input(
                    "id",
                    load.id.to_string(),
                    "Duplicate load id",
                ));
            }
        }

        let mut registry = LoadRegistry {
            loads,
            mode,
            revision: 0,
        };
        if mode == CoefficientMode::Derived {
            registry.rederive_all();
        }
        registry.warn_out_of_range();
        Ok(registry)
    }

    /// Default table offered at the start of a session: self-weight G = 25
    /// and a Category A imposed load Q = 15.
    pub fn with_seed_data() -> Self {
        LoadRegistry {
            loads: vec![
                Load::permanent("Poids propre", 25.0),
                Load::variable("Charge d'exploitation", 15.0, UsageCategory::A),
            ],
            mode: CoefficientMode::Derived,
            revision: 0,
        }
    }

    /// Build a registry from a deserialized [`LoadTable`]
    pub fn from_table(table: LoadTable) -> CalcResult<Self> {
        let mode = if table.custom_coefficients {
            CoefficientMode::Custom
        } else {
            CoefficientMode::Derived
        };
        let loads = table
            .loads
            .into_iter()
            .enumerate()
            .map(|(index, input)| input.into_load(index, mode))
            .collect::<CalcResult<Vec<_>>>()?;
        Self::new(loads, mode)
    }

    /// All loads in insertion order
    pub fn loads(&self) -> &[Load] {
        &self.loads
    }

    pub fn get(&self, id: Uuid) -> Option<&Load> {
        self.loads.iter().find(|load| load.id == id)
    }

    pub fn len(&self) -> usize {
        self.loads.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.loads.is_empty()
    }

    /// Number of loads in a category
    pub fn count(&self, category: LoadCategory) -> usize {
        self.loads.iter().filter(|load| load.category == category).count()
    }

    pub fn mode(&self) -> CoefficientMode {
        self.mode
    }

    /// Mutation counter, bumped by every successful edit
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether `set` was generated from the current state of this registry
    pub fn is_current(&self, set: &CombinationSet) -> bool {
        set.source_revision == self.revision
    }

    /// Copy the current loads out for generation
    pub fn snapshot(&self) -> LoadSnapshot {
        LoadSnapshot::split(self.revision, &self.loads)
    }

    /// Append a new load and return its id.
    ///
    /// The category is whichever currently has fewer members (permanent on a
    /// tie). New variable loads start in usage category A.
    pub fn add_load(&mut self) -> Uuid {
        let permanent = self.count(LoadCategory::Permanent);
        let variable = self.count(LoadCategory::Variable);
        let load = if variable < permanent {
            Load::variable(format!("Q{}", variable + 1), 0.0, UsageCategory::A)
        } else {
            Load::permanent(format!("G{}", permanent + 1), 0.0)
        };
        let id = load.id;
        debug!(%id, category = %load.category, "load added");
        self.loads.push(load);
        self.touch();
        id
    }

    /// Remove a load. Removing the last remaining load is refused.
    pub fn remove_load(&mut self, id: Uuid) -> CalcResult<Load> {
        let index = self.index_of(id)?;
        if self.loads.len() == 1 {
            warn!(%id, "refused to remove the last load");
            return Err(CalcError::validation(
                rules::LAST_LOAD,
                "Impossible de supprimer la dernière charge : au moins une charge est requise",
            ));
        }
        let removed = self.loads.remove(index);
        debug!(%id, name = %removed.name, "load removed");
        self.touch();
        Ok(removed)
    }

    /// Rename a load
    pub fn set_name(&mut self, id: Uuid, name: impl Into<String>) -> CalcResult<()> {
        let load = self.find_mut(id)?;
        load.name = name.into();
        self.touch();
        Ok(())
    }

    /// Change a load's characteristic value
    pub fn set_value(&mut self, id: Uuid, value: f64) -> CalcResult<()> {
        if !value.is_finite() {
            return Err(CalcError::invalid_input(
                "value",
                value.to_string(),
                "Load value must be a finite number",
            ));
        }
        let load = self.find_mut(id)?;
        load.value = value;
        self.touch();
        Ok(())
    }

    /// Switch a load between permanent and variable.
    ///
    /// Becoming variable assigns usage category A and table ψ. In custom mode,
    /// ψ already present on the load are kept. Becoming permanent clears usage
    /// and ψ. Re-selecting the current category changes nothing.
    pub fn set_category(&mut self, id: Uuid, category: LoadCategory) -> CalcResult<()> {
        let mode = self.mode;
        let load = self.find_mut(id)?;
        if load.category == category {
            return Ok(());
        }
        match category {
            LoadCategory::Permanent => {
                load.usage = None;
                load.coefficients = None;
            }
            LoadCategory::Variable => {
                let usage = UsageCategory::A;
                load.usage = Some(usage);
                load.coefficients = match (mode, load.coefficients) {
                    (CoefficientMode::Custom, Some(existing)) => Some(existing),
                    _ => Some(usage.coefficients()),
                };
            }
        }
        load.category = category;
        debug!(%id, %category, "load category changed");
        self.touch();
        Ok(())
    }

    /// Change the usage category of a variable load.
    ///
    /// ψ are re-derived from the table unless custom mode is active.
    pub fn set_usage_type(&mut self, id: Uuid, usage: UsageCategory) -> CalcResult<()> {
        let mode = self.mode;
        let load = self.find_mut(id)?;
        if !load.is_variable() {
            return Err(CalcError::invalid_input(
                "usage",
                usage.key(),
                format!("'{}' is permanent; only variable loads have a usage category", load.name),
            ));
        }
        load.usage = Some(usage);
        if mode == CoefficientMode::Derived {
            load.coefficients = Some(usage.coefficients());
        }
        self.touch();
        Ok(())
    }

    /// Override one ψ of a variable load.
    ///
    /// Only effective in custom mode: returns `Ok(false)` and changes nothing
    /// in derived mode. Values outside [0, 1] are accepted and reported by
    /// [`LoadRegistry::out_of_range_coefficients`].
    pub fn set_coefficient(&mut self, id: Uuid, which: Psi, value: f64) -> CalcResult<bool> {
        if !value.is_finite() {
            return Err(CalcError::invalid_input(
                which.symbol(),
                value.to_string(),
                "Coefficient must be a finite number",
            ));
        }
        let mode = self.mode;
        let load = self.find_mut(id)?;
        let mut coefficients = load.coefficients()?;
        if mode == CoefficientMode::Derived {
            debug!(%id, coefficient = %which, "coefficient edit ignored outside custom mode");
            return Ok(false);
        }
        if !(0.0..=1.0).contains(&value) {
            warn!(%id, name = %load.name, coefficient = %which, value, "coefficient outside [0, 1]");
        }
        coefficients.set(which, value);
        load.coefficients = Some(coefficients);
        self.touch();
        Ok(true)
    }

    /// Switch between derived and custom coefficients.
    ///
    /// Entering custom mode keeps the current ψ. Leaving it re-derives every
    /// variable load's ψ from its usage category.
    pub fn set_coefficient_mode(&mut self, mode: CoefficientMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        if mode == CoefficientMode::Derived {
            self.rederive_all();
        }
        debug!(?mode, "coefficient mode changed");
        self.touch();
    }

    /// ψ values outside [0, 1], in load order
    pub fn out_of_range_coefficients(&self) -> Vec<CoefficientWarning> {
        self.loads
            .iter()
            .filter_map(|load| load.coefficients.map(|psi| (load, psi)))
            .flat_map(|(load, psi)| {
                psi.out_of_range()
                    .into_iter()
                    .map(move |(coefficient, value)| CoefficientWarning {
                        load_id: load.id,
                        load_name: load.name.clone(),
                        coefficient,
                        value,
                    })
            })
            .collect()
    }

    fn rederive_all(&mut self) {
        for load in self.loads.iter_mut().filter(|load| load.is_variable()) {
            if let Some(usage) = load.usage {
                load.coefficients = Some(usage.coefficients());
            }
        }
    }

    fn warn_out_of_range(&self) {
        for warning in self.out_of_range_coefficients() {
            warn!(load_id = %warning.load_id, "{}", warning);
        }
    }

    fn index_of(&self, id: Uuid) -> CalcResult<usize> {
        self.loads
            .iter()
            .position(|load| load.id == id)
            .ok_or_else(|| CalcError::load_not_found(id))
    }

    fn find_mut(&mut self, id: Uuid) -> CalcResult<&mut Load> {
        let index = self.index_of(id)?;
        Ok(&mut self.loads[index])
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

impl Default for LoadRegistry {
    fn default() -> Self {
        LoadRegistry::with_seed_data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable_id(registry: &LoadRegistry) -> Uuid {
        registry.loads().iter().find(|l| l.is_variable()).unwrap().id
    }

    #[test]
    fn test_seed_data() {
        let registry = LoadRegistry::with_seed_data();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.count(LoadCategory::Permanent), 1);
        assert_eq!(registry.count(LoadCategory::Variable), 1);
        assert_eq!(registry.mode(), CoefficientMode::Derived);
    }

    #[test]
    fn test_empty_table_rejected() {
        let err = LoadRegistry::new(Vec::new(), CoefficientMode::Derived).unwrap_err();
        assert!(err.is_user_facing());
        assert_eq!(err.to_string(), "La table des charges doit contenir au moins une charge");
    }

    #[test]
    fn test_add_load_balances_categories() {
        let mut registry =
            LoadRegistry::new(vec![Load::permanent("G", 10.0)], CoefficientMode::Derived).unwrap();

        let first = registry.add_load();
        let first = registry.get(first).unwrap();
        assert_eq!(first.category, LoadCategory::Variable);
        assert_eq!(first.usage, Some(UsageCategory::A));
        assert_eq!(first.coefficients, Some(UsageCategory::A.coefficients()));

        // 1 G, 1 Q: tie goes to permanent
        let second = registry.add_load();
        assert_eq!(registry.get(second).unwrap().category, LoadCategory::Permanent);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_remove_last_load_rejected() {
        let load = Load::permanent("G", 10.0);
        let id = load.id;
        let mut registry = LoadRegistry::new(vec![load], CoefficientMode::Derived).unwrap();
        let revision = registry.revision();

        let err = registry.remove_load(id).unwrap_err();
        assert!(err.is_user_facing());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.revision(), revision);
    }

    #[test]
    fn test_remove_load() {
        let mut registry = LoadRegistry::with_seed_data();
        let id = variable_id(&registry);
        let removed = registry.remove_load(id).unwrap();
        assert_eq!(removed.name, "Charge d'exploitation");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_unknown_load() {
        let mut registry = LoadRegistry::with_seed_data();
        let err = registry.remove_load(Uuid::new_v4()).unwrap_err();
        assert_eq!(err.error_code(), "LOAD_NOT_FOUND");
    }

    #[test]
    fn test_set_category_to_permanent_clears_variable_fields() {
        let mut registry = LoadRegistry::with_seed_data();
        let id = variable_id(&registry);
        registry.set_category(id, LoadCategory::Permanent).unwrap();

        let load = registry.get(id).unwrap();
        assert!(load.usage.is_none());
        assert!(load.coefficients.is_none());
    }

    #[test]
    fn test_set_category_to_variable_resets_coefficients() {
        let mut registry = LoadRegistry::with_seed_data();
        let id = variable_id(&registry);
        registry.set_usage_type(id, UsageCategory::Wind).unwrap();
        registry.set_category(id, LoadCategory::Permanent).unwrap();
        registry.set_category(id, LoadCategory::Variable).unwrap();

        let load = registry.get(id).unwrap();
        assert_eq!(load.usage, Some(UsageCategory::A));
        assert_eq!(load.coefficients, Some(UsageCategory::A.coefficients()));
    }

    #[test]
    fn test_reselecting_current_category_changes_nothing() {
        let mut registry = LoadRegistry::with_seed_data();
        let id = variable_id(&registry);
        registry.set_usage_type(id, UsageCategory::Wind).unwrap();
        let revision = registry.revision();

        registry.set_category(id, LoadCategory::Variable).unwrap();
        let load = registry.get(id).unwrap();
        assert_eq!(load.usage, Some(UsageCategory::Wind));
        assert_eq!(load.coefficients, Some(UsageCategory::Wind.coefficients()));
        assert_eq!(registry.revision(), revision);
    }

    #[test]
    fn test_set_category_in_custom_mode_keeps_coefficients() {
        let mut registry = LoadRegistry::with_seed_data();
        let id = variable_id(&registry);
        registry.set_coefficient_mode(CoefficientMode::Custom);
        registry.set_coefficient(id, Psi::Psi0, 0.42).unwrap();
        registry.set_category(id, LoadCategory::Variable).unwrap();

        assert_eq!(registry.get(id).unwrap().coefficients().unwrap().psi0, 0.42);
        assert_eq!(registry.get(id).unwrap().usage, Some(UsageCategory::A));
    }

    #[test]
    fn test_usage_change_derived_mode_overwrites() {
        let mut registry = LoadRegistry::with_seed_data();
        let id = variable_id(&registry);
        registry.set_usage_type(id, UsageCategory::E).unwrap();
        assert_eq!(
            registry.get(id).unwrap().coefficients,
            Some(CoefficientSet::new(1.0, 0.9, 0.8))
        );
    }

    #[test]
    fn test_usage_change_custom_mode_preserves() {
        let mut registry = LoadRegistry::with_seed_data();
        let id = variable_id(&registry);
        registry.set_coefficient_mode(CoefficientMode::Custom);
        assert!(registry.set_coefficient(id, Psi::Psi1, 0.45).unwrap());

        registry.set_usage_type(id, UsageCategory::E).unwrap();
        let load = registry.get(id).unwrap();
        assert_eq!(load.usage, Some(UsageCategory::E));
        assert_eq!(load.coefficients, Some(CoefficientSet::new(0.7, 0.45, 0.3)));
    }

    #[test]
    fn test_usage_type_on_permanent_is_contract_error() {
        let mut registry = LoadRegistry::with_seed_data();
        let id = registry.loads()[0].id;
        let err = registry.set_usage_type(id, UsageCategory::B).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_set_coefficient_ignored_in_derived_mode() {
        let mut registry = LoadRegistry::with_seed_data();
        let id = variable_id(&registry);
        let revision = registry.revision();

        assert!(!registry.set_coefficient(id, Psi::Psi0, 0.1).unwrap());
        assert_eq!(registry.get(id).unwrap().coefficients().unwrap().psi0, 0.7);
        assert_eq!(registry.revision(), revision);
    }

    #[test]
    fn test_out_of_range_coefficient_accepted_and_flagged() {
        let mut registry = LoadRegistry::with_seed_data();
        let id = variable_id(&registry);
        registry.set_coefficient_mode(CoefficientMode::Custom);

        assert!(registry.set_coefficient(id, Psi::Psi2, 1.5).unwrap());
        assert_eq!(registry.get(id).unwrap().coefficients().unwrap().psi2, 1.5);

        let warnings = registry.out_of_range_coefficients();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].coefficient, Psi::Psi2);
        assert_eq!(warnings[0].value, 1.5);
    }

    #[test]
    fn test_non_finite_coefficient_rejected() {
        let mut registry = LoadRegistry::with_seed_data();
        let id = variable_id(&registry);
        registry.set_coefficient_mode(CoefficientMode::Custom);
        assert!(registry.set_coefficient(id, Psi::Psi0, f64::NAN).is_err());
    }

    #[test]
    fn test_leaving_custom_mode_rederives() {
        let mut registry = LoadRegistry::with_seed_data();
        let id = variable_id(&registry);
        registry.set_coefficient_mode(CoefficientMode::Custom);
        registry.set_coefficient(id, Psi::Psi0, 0.2).unwrap();

        registry.set_coefficient_mode(CoefficientMode::Derived);
        assert_eq!(registry.get(id).unwrap().coefficients, Some(UsageCategory::A.coefficients()));
    }

    #[test]
    fn test_revision_bumps_on_edit() {
        let mut registry = LoadRegistry::with_seed_data();
        let id = registry.loads()[0].id;
        let before = registry.revision();
        registry.set_value(id, 30.0).unwrap();
        registry.set_name(id, "Dalle").unwrap();
        assert_eq!(registry.revision(), before + 2);
        assert!(registry.set_value(id, f64::NAN).is_err());
        assert_eq!(registry.revision(), before + 2);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut registry = LoadRegistry::with_seed_data();
        let snapshot = registry.snapshot();
        let id = registry.loads()[0].id;
        registry.set_value(id, 99.0).unwrap();

        assert_eq!(snapshot.permanent[0].value, 25.0);
        assert_eq!(snapshot.variable.len(), 1);
        assert_ne!(snapshot.revision, registry.revision());
    }

    #[test]
    fn test_from_table_derived_ignores_psi_columns() {
        let json = r#"{
            "loads": [
                { "name": "Poids propre", "value": 25.0, "category": "permanent" },
                { "name": "Neige", "value": 6.0, "category": "variable", "usage": "snow_high", "psi0": 0.1 }
            ]
        }"#;
        let table: LoadTable = serde_json::from_str(json).unwrap();
        let registry = LoadRegistry::from_table(table).unwrap();

        assert_eq!(registry.mode(), CoefficientMode::Derived);
        let snow = &registry.loads()[1];
        assert_eq!(snow.coefficients, Some(CoefficientSet::new(0.7, 0.5, 0.2)));
    }

    #[test]
    fn test_from_table_custom_keeps_psi_columns() {
        let json = r#"{
            "custom_coefficients": true,
            "loads": [
                { "name": "Exploitation", "value": 15.0, "category": "variable", "usage": "B", "psi0": 0.8 }
            ]
        }"#;
        let table: LoadTable = serde_json::from_str(json).unwrap();
        let registry = LoadRegistry::from_table(table).unwrap();

        assert_eq!(registry.mode(), CoefficientMode::Custom);
        assert_eq!(registry.loads()[0].coefficients, Some(CoefficientSet::new(0.8, 0.5, 0.3)));
    }

    #[test]
    fn test_from_table_unknown_usage_fails_loudly() {
        let json = r#"{ "loads": [
            { "name": "Q", "value": 1.0, "category": "variable", "usage": "Z" }
        ] }"#;
        let table: LoadTable = serde_json::from_str(json).unwrap();
        let err = LoadRegistry::from_table(table).unwrap_err();
        assert_eq!(err, CalcError::unknown_usage_category("Z"));
    }

    #[test]
    fn test_from_table_variable_without_usage_fails() {
        let json = r#"{ "loads": [
            { "name": "Q", "value": 1.0, "category": "variable" }
        ] }"#;
        let table: LoadTable = serde_json::from_str(json).unwrap();
        let err = LoadRegistry::from_table(table).unwrap_err();
        assert_eq!(err, CalcError::missing_field("loads[0].usage"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let load = Load::permanent("G", 1.0);
        let copy = load.clone();
        assert!(LoadRegistry::new(vec![load, copy], CoefficientMode::Derived).is_err());
    }

    #[test]
    fn test_snapshot_from_malformed_loads_fails() {
        let mut load = Load::variable("Q", 1.0, UsageCategory::A);
        load.usage = None;
        let err = LoadSnapshot::from_loads(&[load]).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_FIELD");
    }
}
