//! Property tests for the combination generator.
use eurocode_core::loads::{
    display_string, format_formula, generate, generate_with, CoefficientMode, CoefficientSet, Family,
    FormulaStyle, GenerationSettings, Load, LoadCategory, LoadRegistry, LoadSnapshot, PartialFactors, Psi,
    SlsKind, UsageCategory,
};
use proptest::prelude::*;

const GAMMA_G: f64 = 1.35;
const GAMMA_Q: f64 = 1.5;

fn assert_close(label: &str, actual: f64, expected: f64) {
    let tol = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tol,
        "{label}: expected {expected} got {actual}"
    );
}

/// Evaluate a numeric formula such as `1.35×25 + 1.5×0.6×(-10)`.
fn evaluate(formula: &str) -> f64 {
    formula
        .split(" + ")
        .map(|term| {
            term.split('×')
                .map(|factor| {
                    factor
                        .trim_matches(|c| c == '(' || c == ')')
                        .parse::<f64>()
                        .unwrap_or_else(|_| panic!("unparsable factor '{factor}' in '{formula}'"))
                })
                .product::<f64>()
        })
        .sum()
}

fn usage_strategy() -> impl Strategy<Value = UsageCategory> {
    (0..UsageCategory::ALL.len()).prop_map(|i| UsageCategory::ALL[i])
}

/// Table ψ most of the time, otherwise arbitrary overrides including
/// values outside [0, 1].
fn coefficients_strategy() -> impl Strategy<Value = Option<CoefficientSet>> {
    prop::option::of((-0.5f64..1.5, -0.5f64..1.5, -0.5f64..1.5))
        .prop_map(|psi| psi.map(|(psi0, psi1, psi2)| CoefficientSet::new(psi0, psi1, psi2)))
}

fn settings_strategy() -> impl Strategy<Value = GenerationSettings> {
    (0.5f64..2.0, 0.5f64..2.0, 1usize..=GenerationSettings::MAX_SIGNIFICANT_DIGITS).prop_map(
        |(gamma_g, gamma_q, significant_digits)| GenerationSettings {
            partial_factors: PartialFactors { gamma_g, gamma_q },
            significant_digits,
        },
    )
}

fn loads_strategy(min_variable: usize) -> impl Strategy<Value = Vec<Load>> {
    (
        prop::collection::vec(0.0f64..100.0, 0..4),
        prop::collection::vec(
            (-20.0f64..100.0, usage_strategy(), coefficients_strategy()),
            min_variable..6,
        ),
    )
        .prop_map(|(permanent, variable)| {
            let mut loads: Vec<Load> = permanent
                .into_iter()
                .enumerate()
                .map(|(i, value)| Load::permanent(format!("Permanente {}", i + 1), value))
                .collect();
            loads.extend(
                variable
                    .into_iter()
                    .enumerate()
                    .map(|(i, (value, usage, custom))| {
                        let load = Load::variable(format!("Variable {}", i + 1), value, usage);
                        match custom {
                            Some(coefficients) => load.with_coefficients(coefficients),
                            None => load,
                        }
                    }),
            );
            loads
        })
}

proptest! {
    #[test]
    fn produces_three_n_plus_one(loads in loads_strategy(1)) {
        let snapshot = LoadSnapshot::from_loads(&loads).unwrap();
        let n = snapshot.variable.len();
        let set = generate(&snapshot).unwrap();

        prop_assert_eq!(set.len(), 3 * n + 1);
        prop_assert_eq!(set.uls().count(), n);
        prop_assert_eq!(set.sls(SlsKind::Characteristic).count(), n);
        prop_assert_eq!(set.sls(SlsKind::Frequent).count(), n);
        prop_assert_eq!(set.sls(SlsKind::QuasiPermanent).count(), 1);
    }

    #[test]
    fn output_is_grouped_by_family_then_leading_index(loads in loads_strategy(1)) {
        let set = generate(&LoadSnapshot::from_loads(&loads).unwrap()).unwrap();
        let n = (set.len() - 1) / 3;

        for (position, combination) in set.iter().enumerate() {
            let (family, kind, leading) = match position / n.max(1) {
                _ if position == 3 * n => (Family::Sls, Some(SlsKind::QuasiPermanent), None),
                0 => (Family::Uls, None, Some(position % n)),
                1 => (Family::Sls, Some(SlsKind::Characteristic), Some(position % n)),
                _ => (Family::Sls, Some(SlsKind::Frequent), Some(position % n)),
            };
            prop_assert_eq!(combination.family, family);
            prop_assert_eq!(combination.els_kind, kind);
            prop_assert_eq!(combination.leading, leading);
        }
    }

    #[test]
    fn zero_variable_loads_is_refused(loads in loads_strategy(0)) {
        let permanent_only: Vec<Load> = loads.into_iter().filter(|l| !l.is_variable()).collect();
        let err = generate(&LoadSnapshot::from_loads(&permanent_only).unwrap()).unwrap_err();
        prop_assert!(err.is_user_facing());
    }

    #[test]
    fn generation_is_deterministic(loads in loads_strategy(1)) {
        let snapshot = LoadSnapshot::from_loads(&loads).unwrap();
        let first = generate(&snapshot).unwrap();
        let second = generate(&snapshot).unwrap();

        for (a, b) in first.iter().zip(second.iter()) {
            prop_assert_eq!(a.result.to_bits(), b.result.to_bits());
            prop_assert_eq!(&a.formula, &b.formula);
        }
    }

    #[test]
    fn numeric_formula_evaluates_to_result(loads in loads_strategy(1)) {
        let set = generate(&LoadSnapshot::from_loads(&loads).unwrap()).unwrap();
        for combination in set.iter() {
            let numeric = format_formula(&combination.terms, FormulaStyle::Numeric, 3);
            assert_close(&combination.id, evaluate(&numeric), combination.result);

            let shown = display_string(combination, FormulaStyle::Symbolic, 3);
            prop_assert!(shown.contains(&combination.formula));
        }
    }

    #[test]
    fn numeric_formula_evaluates_to_result_with_custom_settings(
        loads in loads_strategy(1),
        settings in settings_strategy(),
    ) {
        let set = generate_with(&LoadSnapshot::from_loads(&loads).unwrap(), &settings).unwrap();
        for combination in set.iter() {
            let numeric = format_formula(&combination.terms, FormulaStyle::Numeric, settings.significant_digits);
            assert_close(&combination.id, evaluate(&numeric), combination.result);
        }
    }

    #[test]
    fn uls_matches_eurocode_expression(loads in loads_strategy(1)) {
        let snapshot = LoadSnapshot::from_loads(&loads).unwrap();
        let set = generate(&snapshot).unwrap();

        let sum_g: f64 = snapshot.permanent.iter().map(|l| l.value).sum();
        let variable: Vec<(f64, f64, f64, f64)> = snapshot
            .variable
            .iter()
            .map(|l| {
                let psi = l.coefficients().unwrap();
                (l.value, psi.psi0, psi.psi1, psi.psi2)
            })
            .collect();

        for (i, combination) in set.uls().enumerate() {
            let accompanying: f64 = variable
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, (q, psi0, _, _))| GAMMA_Q * psi0 * q)
                .sum();
            let expected = GAMMA_G * sum_g + GAMMA_Q * variable[i].0 + accompanying;
            assert_close(&combination.id, combination.result, expected);
        }

        for (i, combination) in set.sls(SlsKind::Frequent).enumerate() {
            let accompanying: f64 = variable
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, (q, _, _, psi2))| psi2 * q)
                .sum();
            let expected = sum_g + variable[i].2 * variable[i].0 + accompanying;
            assert_close(&combination.id, combination.result, expected);
        }

        let quasi = set.sls(SlsKind::QuasiPermanent).next().unwrap();
        let expected = sum_g + variable.iter().map(|(q, _, _, psi2)| psi2 * q).sum::<f64>();
        assert_close(&quasi.id, quasi.result, expected);
    }

    #[test]
    fn usage_change_follows_coefficient_mode(usage in usage_strategy(), psi0 in 0.0f64..1.0) {
        let mut registry = LoadRegistry::with_seed_data();
        let id = registry.loads().iter().find(|l| l.category == LoadCategory::Variable).unwrap().id;

        registry.set_usage_type(id, usage).unwrap();
        prop_assert_eq!(registry.get(id).unwrap().coefficients, Some(usage.coefficients()));

        registry.set_coefficient_mode(CoefficientMode::Custom);
        prop_assert!(registry.set_coefficient(id, Psi::Psi0, psi0).unwrap());
        let before = registry.get(id).unwrap().coefficients;
        registry.set_usage_type(id, UsageCategory::E).unwrap();
        prop_assert_eq!(registry.get(id).unwrap().coefficients, before);
    }
}

#[test]
fn registry_generation_is_invalidated_by_edits() {
    let mut registry = LoadRegistry::with_seed_data();
    let set = generate(&registry.snapshot()).unwrap();
    assert!(registry.is_current(&set));

    registry.add_load();
    assert!(!registry.is_current(&set));
}
