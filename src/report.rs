//! Report generation for module formation
//!
//! Writes a human-readable summary of the registry: formation insights,
//! the modules formed so far and the components still waiting to be grouped.

use std::io::{self, Write};

use crate::registry::Registry;

/// Generate a summary report to the given writer
pub fn generate_summary<W: Write>(registry: &Registry, writer: &mut W) -> io::Result<()> {
    let insights = registry.get_formulation_insights();
    let criteria = registry.criteria();

    writeln!(writer, "Module Formation Summary")?;
    writeln!(writer, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
    writeln!(writer)?;
    writeln!(
        writer,
        "Components: {} | Mature: {} | Modules: {}",
        insights.total_components, insights.mature_components, insights.total_modules
    )?;
    writeln!(
        writer,
        "Components per module: {:.2} | Formation rate: {:.2}",
        insights.components_per_module_avg, insights.module_formation_rate
    )?;
    if !insights.categories_identified.is_empty() {
        writeln!(
            writer,
            "Categories: {}",
            insights.categories_identified.join(", ")
        )?;
    }
    writeln!(
        writer,
        "Criteria: cohesion >= {:.2}, maturity >= {:.2}, connectivity >= {:.2}, members {}..={}",
        criteria.cohesion_threshold,
        criteria.maturity_threshold,
        criteria.connectivity_threshold,
        criteria.min_members,
        criteria.max_members
    )?;
    writeln!(writer)?;

    write_module_table(registry, writer)?;
    write_ungrouped_components(registry, writer)?;

    Ok(())
}

fn write_module_table<W: Write>(registry: &Registry, writer: &mut W) -> io::Result<()> {
    if registry.modules().is_empty() {
        writeln!(writer, "No modules formed yet.")?;
        writeln!(writer)?;
        return Ok(());
    }

    writeln!(writer, "Modules:")?;
    writeln!(
        writer,
        "  {:<32} {:>7} {:>9} {:>13}",
        "Name", "Members", "Cohesion", "Encapsulation"
    )?;
    for module in registry.modules() {
        writeln!(
            writer,
            "  {:<32} {:>7} {:>9.2} {:>13.2}",
            truncate(&module.name, 32),
            module.member_count(),
            module.average_cohesion(),
            module.encapsulation_ratio()
        )?;
        for member in module
            .members
            .iter()
            .filter_map(|id| registry.component(id))
        {
            writeln!(writer, "    - {} ({})", member.name, member.category)?;
        }
    }
    writeln!(writer)?;

    Ok(())
}

fn write_ungrouped_components<W: Write>(registry: &Registry, writer: &mut W) -> io::Result<()> {
    let mut ungrouped: Vec<_> = registry
        .components()
        .filter(|c| registry.module_of(&c.id).is_none())
        .collect();
    if ungrouped.is_empty() {
        return Ok(());
    }
    ungrouped.sort_by(|a, b| (&a.category, &a.name).cmp(&(&b.category, &b.name)));

    writeln!(writer, "Ungrouped components:")?;
    for component in ungrouped {
        writeln!(
            writer,
            "  {:<32} {:<12} {:<12} maturity {:.2}",
            truncate(&component.name, 32),
            component.category,
            component.status.as_str(),
            component.maturity_score
        )?;
    }

    Ok(())
}

/// Truncate a string to `max_len` characters, marking the cut with `...`
fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
}
