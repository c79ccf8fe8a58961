//! Cross-product tabulation of housing-supply estimates by study area.
//!
//! One estimator run per (subset, study area) pair; results land in a single
//! map keyed by area and subset, which is only read once the full pass has
//! completed. Assembly turns that map into the six output tables, one per
//! {household kind} x {age threshold} grouping.

use std::collections::HashMap;

use anyhow::anyhow;
use log::{debug, info};
use polars::lazy::dsl::{col, lit};
use polars::prelude::*;
use strum::IntoEnumIterator;

use crate::error::HomeshareError;
use crate::estimate::{estimate_total, Estimate};
use crate::microdata::area_name;
use crate::subsets::{AgeThreshold, BedroomSurplus, CostBurden, HouseholdKind, SubsetKey};
use crate::COL;

/// One of the six output tables: a household kind at an age threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Grouping {
    pub kind: HouseholdKind,
    pub age: AgeThreshold,
}

impl Grouping {
    /// The six groupings in output order: 60+ tables first, as the original
    /// analysis published them.
    pub fn all() -> impl Iterator<Item = Grouping> {
        itertools::iproduct!(AgeThreshold::iter(), HouseholdKind::iter())
            .map(|(age, kind)| Grouping { kind, age })
    }

    /// File stem of the persisted table, e.g. `supply_single_60plus`.
    pub fn file_stem(&self) -> String {
        format!("supply_{}_{}plus", self.kind, self.age)
    }
}

/// The column stems of every table, in output order: the unconditioned count
/// first, then the bedroom bands, then their cost-burdened variants.
const COLUMN_ORDER: [(BedroomSurplus, CostBurden); 6] = [
    (BedroomSurplus::OneExtra, CostBurden::Any),
    (BedroomSurplus::TwoExtra, CostBurden::Any),
    (BedroomSurplus::OneExtra, CostBurden::ThirtyPercent),
    (BedroomSurplus::TwoExtra, CostBurden::ThirtyPercent),
    (BedroomSurplus::OneExtra, CostBurden::FiftyPercent),
    (BedroomSurplus::TwoExtra, CostBurden::FiftyPercent),
];

const ALL_UNITS_LABEL: &str = "All occupied housing units";

/// Human-readable column stem for a bedroom band and burden filter.
fn column_stem(bedrooms: BedroomSurplus, burden: CostBurden) -> String {
    let bedrooms_label = match bedrooms {
        BedroomSurplus::OneExtra => "one extra bedroom",
        BedroomSurplus::TwoExtra => "two extra bedrooms",
    };
    match burden.threshold() {
        None => format!("At least {bedrooms_label}"),
        Some(t) => format!("Cost-burdened ({t:.0}%) with at least {bedrooms_label}"),
    }
}

/// All estimates of one run, keyed by study area and subset. Populated during
/// the tabulation pass and read-only afterwards.
pub struct SupplyEstimates {
    all_units: HashMap<i64, Estimate>,
    subsets: HashMap<(i64, SubsetKey), Estimate>,
}

impl SupplyEstimates {
    fn all_units(&self, area: i64) -> Result<Estimate, HomeshareError> {
        self.all_units
            .get(&area)
            .copied()
            .ok_or_else(|| anyhow!("no all-units estimate for study area {area}").into())
    }

    fn subset(&self, area: i64, key: SubsetKey) -> Result<Estimate, HomeshareError> {
        self.subsets
            .get(&(area, key))
            .copied()
            .ok_or_else(|| anyhow!("no estimate for study area {area}, subset {}", key.name()).into())
    }
}

/// Run the estimator over every (subset, study area) pair.
pub fn compute_estimates(
    households: &DataFrame,
    study_areas: &[i64],
) -> Result<SupplyEstimates, HomeshareError> {
    let mut all_units = HashMap::new();
    let mut subsets = HashMap::new();

    for &area in study_areas {
        let in_area = households
            .clone()
            .lazy()
            .filter(col(COL::PUMA).eq(lit(area)))
            .collect()?;
        all_units.insert(area, estimate_total(&in_area)?);

        for key in SubsetKey::all() {
            let subset = in_area
                .clone()
                .lazy()
                .filter(key.to_expr())
                .collect()?;
            let estimate = estimate_total(&subset)?;
            debug!(
                "{} in {}: {} households (moe {:.1})",
                key.name(),
                area,
                estimate.point,
                estimate.moe
            );
            subsets.insert((area, key), estimate);
        }
    }
    info!(
        "Estimated {} subsets across {} study areas",
        subsets.len(),
        study_areas.len()
    );
    Ok(SupplyEstimates { all_units, subsets })
}

/// Append the five columns of an estimate series under the given stem.
fn push_estimate_columns(columns: &mut Vec<Series>, stem: &str, estimates: &[Estimate]) {
    let point: Vec<f64> = estimates.iter().map(|e| e.point).collect();
    let moe: Vec<f64> = estimates.iter().map(|e| e.moe).collect();
    let moe_pct: Vec<f64> = estimates.iter().map(|e| e.moe_pct).collect();
    let lower: Vec<f64> = estimates.iter().map(|e| e.lower).collect();
    let upper: Vec<f64> = estimates.iter().map(|e| e.upper).collect();
    columns.push(Series::new(stem, point));
    columns.push(Series::new(&format!("{stem} MoE"), moe));
    columns.push(Series::new(&format!("{stem} MoE (%)"), moe_pct));
    columns.push(Series::new(&format!("{stem} (Lower)"), lower));
    columns.push(Series::new(&format!("{stem} (Upper)"), upper));
}

/// Assemble one grouping's table: a row per study area, the fixed column set
/// described on [`COLUMN_ORDER`].
fn assemble(
    grouping: Grouping,
    study_areas: &[i64],
    area_names: &[String],
    estimates: &SupplyEstimates,
) -> Result<DataFrame, HomeshareError> {
    let mut columns: Vec<Series> = vec![
        Series::new(COL::OUT_AREA, study_areas),
        Series::new(COL::OUT_AREA_NAME, area_names),
    ];

    let all_units = study_areas
        .iter()
        .map(|&area| estimates.all_units(area))
        .collect::<Result<Vec<_>, _>>()?;
    push_estimate_columns(&mut columns, ALL_UNITS_LABEL, &all_units);

    for (bedrooms, burden) in COLUMN_ORDER {
        let key = SubsetKey {
            kind: grouping.kind,
            bedrooms,
            age: grouping.age,
            burden,
        };
        let column = study_areas
            .iter()
            .map(|&area| estimates.subset(area, key))
            .collect::<Result<Vec<_>, _>>()?;
        push_estimate_columns(&mut columns, &column_stem(bedrooms, burden), &column);
    }
    Ok(DataFrame::new(columns)?)
}

/// Compute and assemble the six supply tables.
pub fn tabulate(
    households: &DataFrame,
    areas: &DataFrame,
    study_areas: &[i64],
) -> Result<Vec<(Grouping, DataFrame)>, HomeshareError> {
    // Resolve display names up front so an unknown code aborts the run
    // before any estimation work.
    let area_names = study_areas
        .iter()
        .map(|&code| area_name(areas, code))
        .collect::<Result<Vec<_>, _>>()?;

    let estimates = compute_estimates(households, study_areas)?;

    Grouping::all()
        .map(|grouping| {
            let table = assemble(grouping, study_areas, &area_names, &estimates)?;
            Ok((grouping, table))
        })
        .collect()
}
