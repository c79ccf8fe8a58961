use comfy_table::{presets::NOTHING, *};
use itertools::izip;

use homeshare::tabulate::Grouping;
use polars::frame::DataFrame;

fn bordered_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_style(comfy_table::TableComponent::BottomBorder, '─')
        .set_style(comfy_table::TableComponent::MiddleHeaderIntersections, '─')
        .set_style(comfy_table::TableComponent::HeaderLines, '─')
        .set_style(comfy_table::TableComponent::BottomBorderIntersections, '─')
        .set_style(comfy_table::TableComponent::TopBorder, '─')
        .set_style(comfy_table::TableComponent::TopBorderIntersections, '─');
    table
}

pub fn display_study_areas(areas: &[(i64, String)]) {
    let mut table = bordered_table();
    table.set_header(vec![
        Cell::new("PUMA").add_attribute(Attribute::Bold),
        Cell::new("PUMA Name").add_attribute(Attribute::Bold),
    ]);
    for (code, name) in areas {
        table.add_row(vec![code.to_string(), name.clone()]);
    }
    println!("\n{}", table);
}

/// Show the headline household counts of one supply table: the all-units and
/// bedroom-surplus point estimates with their margins, one row per area.
pub fn display_table_summary(grouping: &Grouping, df: &DataFrame) -> anyhow::Result<()> {
    let mut table = bordered_table();
    table.set_header(vec![
        Cell::new("PUMA").add_attribute(Attribute::Bold),
        Cell::new("PUMA Name").add_attribute(Attribute::Bold),
        Cell::new("All units").add_attribute(Attribute::Bold),
        Cell::new("1+ extra BR (±MoE)").add_attribute(Attribute::Bold),
        Cell::new("2+ extra BR (±MoE)").add_attribute(Attribute::Bold),
    ]);
    for (area, name, all_units, one_extra, one_extra_moe, two_extra, two_extra_moe) in izip!(
        df.column("PUMA")?.i64()?,
        df.column("PUMA Name")?.str()?,
        df.column("All occupied housing units")?.f64()?,
        df.column("At least one extra bedroom")?.f64()?,
        df.column("At least one extra bedroom MoE")?.f64()?,
        df.column("At least two extra bedrooms")?.f64()?,
        df.column("At least two extra bedrooms MoE")?.f64()?,
    ) {
        table.add_row(vec![
            area.map(|v| v.to_string()).unwrap_or_default(),
            name.unwrap_or_default().to_string(),
            all_units.map(|v| format!("{v:.0}")).unwrap_or_default(),
            match (one_extra, one_extra_moe) {
                (Some(est), Some(moe)) => format!("{est:.0} (±{moe:.0})"),
                _ => String::new(),
            },
            match (two_extra, two_extra_moe) {
                (Some(est), Some(moe)) => format!("{est:.0} (±{moe:.0})"),
                _ => String::new(),
            },
        ]);
    }
    println!("\n{}", grouping.file_stem());
    println!("{}", table);
    Ok(())
}
