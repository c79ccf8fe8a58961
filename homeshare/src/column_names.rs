//! This module stores the column names of the PUMS housing file and the
//! geography lookup that the tabulation reads. Note that these must match the
//! headers of the upstream Census Bureau CSV release (2014-18 five-year file).

/// PUMA code of the household's geography.
pub const PUMA: &str = "PUMA";
/// Number of persons in the household.
pub const PERSONS: &str = "NP";
/// Type of unit: 1 = housing unit, 2/3 = institutional/noninstitutional GQ.
pub const UNIT_TYPE: &str = "TYPE";
/// Number of bedrooms; blank when not reported.
pub const BEDROOMS: &str = "BDSP";
/// Tenure: 1 = owned with mortgage, 2 = owned free and clear, 3/4 = rented.
pub const TENURE: &str = "TEN";
/// Household/family type: 1 = married couple household.
pub const HOUSEHOLD_TYPE: &str = "HHT";
/// Unmarried partner household: 2-5 = partner of householder present.
pub const PARTNER: &str = "PARTNER";
/// Same-sex married couple household: 1/2 = couple present.
pub const SAME_SEX_COUPLE: &str = "SSMC";
/// Presence of persons 60+ (unweighted): 1 = one person, 2 = two or more.
pub const AGE_60_PRESENT: &str = "R60";
/// Presence of persons 65+ (unweighted), coded as `R60`.
pub const AGE_65_PRESENT: &str = "R65";
/// Selected owner costs as a percentage of household income.
pub const COST_TO_INCOME: &str = "OCPIP";
/// Primary housing-unit weight.
pub const PRIMARY_WEIGHT: &str = "WGTP";

/// Number of replicate weight columns shipped with the housing file.
pub const REPLICATE_COUNT: usize = 80;

/// Name of the `r`-th replicate weight column, `r` in 1..=80.
pub fn replicate_weight(r: usize) -> String {
    format!("{PRIMARY_WEIGHT}{r}")
}

// Geography lookup columns.
pub const AREA_CODE: &str = "puma5";
pub const AREA_NAME: &str = "puma_name";

// Output table columns.
pub const OUT_AREA: &str = "PUMA";
pub const OUT_AREA_NAME: &str = "PUMA Name";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replicate_weight_names() {
        assert_eq!(replicate_weight(1), "WGTP1");
        assert_eq!(replicate_weight(80), "WGTP80");
    }
}
