//! Loading of the household microdata sample and the geography lookup.
//!
//! Parsing is delegated to the polars CSV reader; this module only selects
//! the columns the tabulation needs, normalises their dtypes and validates
//! the weight fields up front so the estimator never sees a partial record.

use std::path::Path;

use log::{debug, info};
use polars::prelude::*;

use crate::error::HomeshareError;
use crate::COL;

/// Code columns compared against PUMS code values. Cast to floats so that
/// blank (not reported) entries become nulls and never satisfy a predicate.
const CODE_COLUMNS: [&str; 10] = [
    COL::PERSONS,
    COL::UNIT_TYPE,
    COL::BEDROOMS,
    COL::TENURE,
    COL::HOUSEHOLD_TYPE,
    COL::PARTNER,
    COL::SAME_SEX_COUPLE,
    COL::AGE_60_PRESENT,
    COL::AGE_65_PRESENT,
    COL::COST_TO_INCOME,
];

fn read_csv<P: AsRef<Path>>(path: P) -> Result<DataFrame, HomeshareError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// The columns the tabulation reads from the housing file.
fn household_columns() -> Vec<String> {
    let mut columns: Vec<String> = CODE_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.insert(0, COL::PUMA.to_string());
    columns.push(COL::PRIMARY_WEIGHT.to_string());
    columns.extend((1..=COL::REPLICATE_COUNT).map(COL::replicate_weight));
    columns
}

/// Check that the primary and all 80 replicate weights are present and
/// populated on every record, failing with `InvalidInput` otherwise.
pub fn validate_weights(households: &DataFrame) -> Result<(), HomeshareError> {
    let mut names: Vec<String> = vec![COL::PRIMARY_WEIGHT.to_string()];
    names.extend((1..=COL::REPLICATE_COUNT).map(COL::replicate_weight));
    for name in names {
        let series = households
            .column(&name)
            .map_err(|_| HomeshareError::InvalidInput(name.clone()))?;
        if series.null_count() > 0 {
            return Err(HomeshareError::InvalidInput(name));
        }
    }
    Ok(())
}

/// Load the household microdata sample, keeping only the columns used by the
/// tabulation and casting code and weight columns to numeric dtypes.
pub fn load_households<P: AsRef<Path>>(path: P) -> Result<DataFrame, HomeshareError> {
    info!("Loading household microdata from {:?}", path.as_ref());
    let raw = read_csv(&path)?;
    let selected = raw.select(household_columns())?;
    let mut casts: Vec<Expr> = vec![col(COL::PUMA).cast(DataType::Int64)];
    casts.extend(
        CODE_COLUMNS
            .iter()
            .map(|c| col(*c).cast(DataType::Float64)),
    );
    casts.push(col(COL::PRIMARY_WEIGHT).cast(DataType::Float64));
    casts.extend(
        (1..=COL::REPLICATE_COUNT).map(|r| col(&COL::replicate_weight(r)).cast(DataType::Float64)),
    );
    let households = selected.lazy().with_columns(casts).collect()?;
    validate_weights(&households)?;
    debug!(
        "Loaded {} household records across {} columns",
        households.height(),
        households.width()
    );
    Ok(households)
}

/// Load the geography lookup mapping study-area codes to display names.
pub fn load_areas<P: AsRef<Path>>(path: P) -> Result<DataFrame, HomeshareError> {
    info!("Loading geography lookup from {:?}", path.as_ref());
    let raw = read_csv(&path)?;
    let areas = raw
        .select([COL::AREA_CODE, COL::AREA_NAME])?
        .lazy()
        .with_columns([col(COL::AREA_CODE).cast(DataType::Int64)])
        .collect()?;
    Ok(areas)
}

/// Resolve the display name of a study-area code, failing with `LookupError`
/// when the lookup has no matching row.
pub fn area_name(areas: &DataFrame, code: i64) -> Result<String, HomeshareError> {
    let codes = areas.column(COL::AREA_CODE)?.i64()?;
    let names = areas.column(COL::AREA_NAME)?.str()?;
    for (candidate, name) in codes.into_iter().zip(names.into_iter()) {
        if candidate == Some(code) {
            if let Some(name) = name {
                return Ok(name.to_string());
            }
        }
    }
    Err(HomeshareError::LookupError(code))
}
