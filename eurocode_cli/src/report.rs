//! Terminal tables for loads, combinations and the ψ table.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{CellAlignment, ContentArrangement, Table};
use eurocode_core::loads::{
    coefficient_table, format_coefficient, format_formula, CombinationSet, FormulaStyle, LoadCategory, LoadRegistry,
    SlsKind,
};

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

/// The load table as entered, with positional symbols.
pub fn loads_table(registry: &LoadRegistry, significant_digits: usize) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Symbole", "Nom", "Type", "Usage", "Valeur", "ψ0", "ψ1", "ψ2"]);
    apply_table_style(&mut table);

    let (mut g, mut q) = (0, 0);
    for load in registry.loads() {
        let symbol = match load.category {
            LoadCategory::Permanent => {
                g += 1;
                format!("G{g}")
            }
            LoadCategory::Variable => {
                q += 1;
                format!("Q{q}")
            }
        };
        let usage = load.usage.map(|usage| usage.key().to_string()).unwrap_or_default();
        let psi = |value: Option<f64>| {
            value
                .map(|value| format_coefficient(value, significant_digits))
                .unwrap_or_else(|| "-".to_string())
        };
        table.add_row(vec![
            symbol,
            load.name.clone(),
            load.category.description().to_string(),
            usage,
            load.value.to_string(),
            psi(load.coefficients.map(|c| c.psi0)),
            psi(load.coefficients.map(|c| c.psi1)),
            psi(load.coefficients.map(|c| c.psi2)),
        ]);
    }
    for index in 4..8 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table
}

/// One row per combination, in generation order.
pub fn combinations_table(set: &CombinationSet, style: FormulaStyle) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Id", "Combinaison", "Formule", "Résultat"]);
    apply_table_style(&mut table);

    for combination in set.iter() {
        table.add_row(vec![
            combination.id.clone(),
            combination.name.clone(),
            format_formula(&combination.terms, style, set.settings.significant_digits),
            format!("{:.2}", combination.result),
        ]);
    }
    align_column(&mut table, 3, CellAlignment::Right);
    table
}

/// Largest result of each family, one line each.
pub fn governing_lines(set: &CombinationSet) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(uls) = set.governing_uls() {
        lines.push(format!("ELU max : {} = {:.2}", uls.id, uls.result));
    }
    for kind in SlsKind::ALL {
        if let Some(sls) = set.governing_sls(kind) {
            lines.push(format!("ELS {} max : {} = {:.2}", kind.description(), sls.id, sls.result));
        }
    }
    lines
}

pub fn categories_table() -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Clé", "Catégorie", "ψ0", "ψ1", "ψ2"]);
    apply_table_style(&mut table);

    for entry in coefficient_table() {
        table.add_row(vec![
            entry.category.key().to_string(),
            entry.description.to_string(),
            entry.coefficients.psi0.to_string(),
            entry.coefficients.psi1.to_string(),
            entry.coefficients.psi2.to_string(),
        ]);
    }
    for index in 2..5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use eurocode_core::loads::generate;

    #[test]
    fn test_loads_table_symbols() {
        let registry = LoadRegistry::with_seed_data();
        let rendered = loads_table(&registry, 3).to_string();
        assert!(rendered.contains("G1"));
        assert!(rendered.contains("Q1"));
        assert!(rendered.contains("Poids propre"));
        assert!(rendered.contains("0.7"));
    }

    #[test]
    fn test_combinations_table_rows() {
        let registry = LoadRegistry::with_seed_data();
        let set = generate(&registry.snapshot()).unwrap();
        let table = combinations_table(&set, FormulaStyle::Numeric);

        assert_eq!(table.row_iter().count(), 4);
        let rendered = table.to_string();
        assert!(rendered.contains("ELU-1"));
        assert!(rendered.contains("56.25"));
        assert!(rendered.contains("ELS-QP"));
    }

    #[test]
    fn test_governing_lines() {
        let registry = LoadRegistry::with_seed_data();
        let set = generate(&registry.snapshot()).unwrap();
        let lines = governing_lines(&set);

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "ELU max : ELU-1 = 56.25");
    }

    #[test]
    fn test_categories_table_lists_every_category() {
        assert_eq!(categories_table().row_iter().count(), 12);
    }
}
