//! EN 1990 Load Combinations
//!
//! Generates the fundamental ultimate-limit-state combinations (ELU, EN 1990
//! Eq. 6.10) and the three serviceability families (ELS, Eq. 6.14b to 6.16b)
//! from a [`LoadSnapshot`].
//!
//! ## Combination Rules
//!
//! With permanent loads G1..Gm and variable loads Q1..Qn, each of Q1..Qn takes
//! the leading role once per family:
//!
//! | Family               | Permanent | Leading Qi | Accompanying Qj (j ≠ i) |
//! |----------------------|-----------|------------|-------------------------|
//! | ELU                  | γG·Gk     | γQ·Qi      | γQ·ψ0,j·Qj              |
//! | ELS characteristic   | Gk        | Qi         | ψ0,j·Qj                 |
//! | ELS frequent         | Gk        | ψ1,i·Qi    | ψ2,j·Qj                 |
//! | ELS quasi-permanent  | Gk        | (none)     | ψ2,j·Qj for every j     |
//!
//! Accompanying loads are always reduced by their *own* ψ, never by the
//! leading load's. The output holds 3n + 1 combinations ordered ELU,
//! characteristic, frequent, quasi-permanent, each family by leading index.
//!
//! ## Formula / Result Consistency
//!
//! A combination is built as a list of [`Term`]s. Both the numeric result and
//! the formula string are computed from that one list, so the displayed
//! formula always describes the arithmetic actually performed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::formula::{format_formula, FormulaStyle};
use super::registry::LoadSnapshot;
use super::usage::{CoefficientSet, Psi};
use super::Load;
use crate::errors::{rules, CalcError, CalcResult};

/// Partial factors for the fundamental ELU combination
///
/// Defaults are the EN 1990 Table A1.2(B) recommended values for
/// unfavourable actions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialFactors {
    /// γG - permanent actions
    pub gamma_g: f64,
    /// γQ - variable actions
    pub gamma_q: f64,
}

impl PartialFactors {
    pub const GAMMA_G: f64 = 1.35;
    pub const GAMMA_Q: f64 = 1.5;
}

impl Default for PartialFactors {
    fn default() -> Self {
        PartialFactors {
            gamma_g: Self::GAMMA_G,
            gamma_q: Self::GAMMA_Q,
        }
    }
}

/// Knobs for a generation run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub partial_factors: PartialFactors,
    /// Significant digits used for coefficients in formulas
    pub significant_digits: usize,
}

impl GenerationSettings {
    pub const DEFAULT_SIGNIFICANT_DIGITS: usize = 3;
    pub const MAX_SIGNIFICANT_DIGITS: usize = 15;

    /// Check that the settings can be used for generation
    pub fn validate(&self) -> CalcResult<()> {
        if self.significant_digits == 0 || self.significant_digits > Self::MAX_SIGNIFICANT_DIGITS {
            return Err(CalcError::config(
                "significant_digits",
                format!(
                    "must be between 1 and {}, got {}",
                    Self::MAX_SIGNIFICANT_DIGITS,
                    self.significant_digits
                ),
            ));
        }
        for (setting, value) in [
            ("partial_factors.gamma_g", self.partial_factors.gamma_g),
            ("partial_factors.gamma_q", self.partial_factors.gamma_q),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CalcError::config(setting, format!("must be a positive number, got {}", value)));
            }
        }
        Ok(())
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        GenerationSettings {
            partial_factors: PartialFactors::default(),
            significant_digits: Self::DEFAULT_SIGNIFICANT_DIGITS,
        }
    }
}

/// Limit state family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Family {
    /// Ultimate limit state
    #[serde(rename = "ELU")]
    Uls,
    /// Serviceability limit state
    #[serde(rename = "ELS")]
    Sls,
}

impl Family {
    pub fn code(&self) -> &'static str {
        match self {
            Family::Uls => "ELU",
            Family::Sls => "ELS",
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Serviceability sub-family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlsKind {
    /// Rare combination (EN 1990 Eq. 6.14b)
    Characteristic,
    /// Eq. 6.15b
    Frequent,
    /// Long-term, Eq. 6.16b
    QuasiPermanent,
}

impl SlsKind {
    pub const ALL: [SlsKind; 3] = [SlsKind::Characteristic, SlsKind::Frequent, SlsKind::QuasiPermanent];

    pub fn description(&self) -> &'static str {
        match self {
            SlsKind::Characteristic => "caractéristique",
            SlsKind::Frequent => "fréquente",
            SlsKind::QuasiPermanent => "quasi-permanente",
        }
    }
}

/// What a factor in a term stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    GammaG,
    GammaQ,
    Psi(Psi),
}

impl FactorKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            FactorKind::GammaG => "γG",
            FactorKind::GammaQ => "γQ",
            FactorKind::Psi(psi) => psi.symbol(),
        }
    }
}

/// One multiplier applied to a load
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    pub kind: FactorKind,
    pub value: f64,
}

/// One additive term of a combination: factors × load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub load_id: Uuid,
    /// Positional symbol (G1, Q2, ...)
    pub symbol: String,
    /// Load name at generation time
    pub load_name: String,
    /// Characteristic value at generation time
    pub load_value: f64,
    /// Multipliers in application order; empty means a unit factor
    pub factors: Vec<Factor>,
}

impl Term {
    /// Product of all factors
    pub fn coefficient(&self) -> f64 {
        self.factors.iter().map(|factor| factor.value).product()
    }

    /// Contribution of this term to the combination result
    pub fn value(&self) -> f64 {
        self.coefficient() * self.load_value
    }
}

/// A generated load combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combination {
    /// Stable identifier within a set (e.g. "ELU-1", "ELS-QP")
    pub id: String,
    /// Display name (e.g. "ELU — Q1 dominant")
    pub name: String,
    pub family: Family,
    /// Set when `family` is ELS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub els_kind: Option<SlsKind>,
    /// Index of the leading variable load (0-based, insertion order)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leading: Option<usize>,
    pub terms: Vec<Term>,
    /// Symbolic formula, rendered from `terms`
    pub formula: String,
    /// Sum of term values
    pub result: f64,
}

/// The four combination rules, as a tagged variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Uls,
    Characteristic,
    Frequent,
    QuasiPermanent,
}

impl Rule {
    const ROTATING: [Rule; 3] = [Rule::Uls, Rule::Characteristic, Rule::Frequent];

    fn family(self) -> Family {
        match self {
            Rule::Uls => Family::Uls,
            _ => Family::Sls,
        }
    }

    fn els_kind(self) -> Option<SlsKind> {
        match self {
            Rule::Uls => None,
            Rule::Characteristic => Some(SlsKind::Characteristic),
            Rule::Frequent => Some(SlsKind::Frequent),
            Rule::QuasiPermanent => Some(SlsKind::QuasiPermanent),
        }
    }

    fn id(self, leading: Option<usize>) -> String {
        let prefix = match self {
            Rule::Uls => "ELU",
            Rule::Characteristic => "ELS-CAR",
            Rule::Frequent => "ELS-FRE",
            Rule::QuasiPermanent => "ELS-QP",
        };
        match leading {
            Some(index) => format!("{}-{}", prefix, index + 1),
            None => prefix.to_string(),
        }
    }

    fn name(self, leading: Option<usize>) -> String {
        let base = match self.els_kind() {
            None => "ELU".to_string(),
            Some(kind) => format!("ELS {}", kind.description()),
        };
        match leading {
            Some(index) => format!("{} — Q{} dominant", base, index + 1),
            None => base,
        }
    }

    fn permanent_factors(self, gamma: &PartialFactors) -> Vec<Factor> {
        match self {
            Rule::Uls => vec![Factor {
                kind: FactorKind::GammaG,
                value: gamma.gamma_g,
            }],
            _ => Vec::new(),
        }
    }

    fn leading_factors(self, psi: &CoefficientSet, gamma: &PartialFactors) -> Vec<Factor> {
        match self {
            Rule::Uls => vec![Factor {
                kind: FactorKind::GammaQ,
                value: gamma.gamma_q,
            }],
            Rule::Characteristic => Vec::new(),
            Rule::Frequent => vec![psi_factor(Psi::Psi1, psi)],
            // No leading action; every load is accompanying
            Rule::QuasiPermanent => vec![psi_factor(Psi::Psi2, psi)],
        }
    }

    fn accompanying_factors(self, psi: &CoefficientSet, gamma: &PartialFactors) -> Vec<Factor> {
        match self {
            Rule::Uls => vec![
                Factor {
                    kind: FactorKind::GammaQ,
                    value: gamma.gamma_q,
                },
                psi_factor(Psi::Psi0, psi),
            ],
            Rule::Characteristic => vec![psi_factor(Psi::Psi0, psi)],
            Rule::Frequent | Rule::QuasiPermanent => vec![psi_factor(Psi::Psi2, psi)],
        }
    }
}

fn psi_factor(which: Psi, psi: &CoefficientSet) -> Factor {
    Factor {
        kind: FactorKind::Psi(which),
        value: psi.get(which),
    }
}

/// A variable load with its resolved coefficients
struct VariableAction<'a> {
    load: &'a Load,
    symbol: String,
    psi: CoefficientSet,
}

fn term(load: &Load, symbol: &str, factors: Vec<Factor>) -> Term {
    Term {
        load_id: load.id,
        symbol: symbol.to_string(),
        load_name: load.name.clone(),
        load_value: load.value,
        factors,
    }
}

fn build(
    rule: Rule,
    leading: Option<usize>,
    permanent: &[(&Load, String)],
    variable: &[VariableAction<'_>],
    settings: &GenerationSettings,
) -> Combination {
    let gamma = &settings.partial_factors;
    let mut terms = Vec::with_capacity(permanent.len() + variable.len());

    for (load, symbol) in permanent {
        terms.push(term(load, symbol, rule.permanent_factors(gamma)));
    }
    if let Some(index) = leading {
        let action = &variable[index];
        terms.push(term(action.load, &action.symbol, rule.leading_factors(&action.psi, gamma)));
    }
    for (index, action) in variable.iter().enumerate() {
        if Some(index) == leading {
            continue;
        }
        let factors = match leading {
            Some(_) => rule.accompanying_factors(&action.psi, gamma),
            None => rule.leading_factors(&action.psi, gamma),
        };
        terms.push(term(action.load, &action.symbol, factors));
    }

    let result = terms.iter().map(Term::value).sum();
    let formula = format_formula(&terms, FormulaStyle::Symbolic, settings.significant_digits);

    Combination {
        id: rule.id(leading),
        name: rule.name(leading),
        family: rule.family(),
        els_kind: rule.els_kind(),
        leading,
        terms,
        formula,
        result,
    }
}

/// Generate all combinations with the recommended partial factors.
///
/// Fails with a validation error when the snapshot has no variable load.
///
/// # Example
/// ```
/// use eurocode_core::loads::{generate, Load, LoadSnapshot, UsageCategory};
///
/// let loads = vec![
///     Load::permanent("G", 25.0),
///     Load::variable("Q1", 15.0, UsageCategory::A),
///     Load::variable("Q2", 10.0, UsageCategory::Wind),
/// ];
/// let set = generate(&LoadSnapshot::from_loads(&loads).unwrap()).unwrap();
///
/// assert_eq!(set.len(), 7); // 3n + 1
/// assert!((set.combinations[0].result - 65.25).abs() < 1e-9);
/// assert!((set.combinations[1].result - 64.5).abs() < 1e-9);
/// ```
pub fn generate(snapshot: &LoadSnapshot) -> CalcResult<CombinationSet> {
    generate_with(snapshot, &GenerationSettings::default())
}

/// Generate all combinations with explicit settings
pub fn generate_with(snapshot: &LoadSnapshot, settings: &GenerationSettings) -> CalcResult<CombinationSet> {
    settings.validate()?;

    if snapshot.variable.is_empty() {
        warn!(permanent = snapshot.permanent.len(), "generation refused: no variable load");
        return Err(CalcError::validation(
            rules::NO_VARIABLE_LOADS,
            "Au moins une charge variable est nécessaire pour générer les combinaisons",
        ));
    }

    let permanent: Vec<(&Load, String)> = snapshot
        .permanent
        .iter()
        .enumerate()
        .map(|(index, load)| (load, format!("G{}", index + 1)))
        .collect();
    let variable = snapshot
        .variable
        .iter()
        .enumerate()
        .map(|(index, load)| {
            Ok(VariableAction {
                load,
                symbol: format!("Q{}", index + 1),
                psi: load.coefficients()?,
            })
        })
        .collect::<CalcResult<Vec<_>>>()?;

    debug!(
        permanent = permanent.len(),
        variable = variable.len(),
        revision = snapshot.revision,
        "generating combinations"
    );

    let mut combinations = Vec::with_capacity(3 * variable.len() + 1);
    for rule in Rule::ROTATING {
        for leading in 0..variable.len() {
            combinations.push(build(rule, Some(leading), &permanent, &variable, settings));
        }
    }
    combinations.push(build(Rule::QuasiPermanent, None, &permanent, &variable, settings));

    info!(
        count = combinations.len(),
        revision = snapshot.revision,
        "combinations generated"
    );

    Ok(CombinationSet {
        generated_at: Utc::now(),
        source_revision: snapshot.revision,
        settings: *settings,
        combinations,
    })
}

/// Result of one generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinationSet {
    pub generated_at: DateTime<Utc>,
    /// Registry revision the loads were taken from
    pub source_revision: u64,
    pub settings: GenerationSettings,
    /// ELU, then ELS characteristic, frequent, quasi-permanent
    pub combinations: Vec<Combination>,
}

impl CombinationSet {
    pub fn len(&self) -> usize {
        self.combinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Combination> {
        self.combinations.iter()
    }

    /// ELU combinations
    pub fn uls(&self) -> impl Iterator<Item = &Combination> {
        self.iter().filter(|c| c.family == Family::Uls)
    }

    /// ELS combinations of one kind
    pub fn sls(&self, kind: SlsKind) -> impl Iterator<Item = &Combination> {
        self.iter().filter(move |c| c.els_kind == Some(kind))
    }

    /// ELU combination with the largest result.
    ///
    /// This is the design load a member check would take as input.
    pub fn governing_uls(&self) -> Option<&Combination> {
        self.uls()
            .max_by(|a, b| a.result.partial_cmp(&b.result).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// ELS combination of one kind with the largest result
    pub fn governing_sls(&self, kind: SlsKind) -> Option<&Combination> {
        self.sls(kind)
            .max_by(|a, b| a.result.partial_cmp(&b.result).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Pretty-printed JSON for export
    pub fn to_json(&self) -> CalcResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
