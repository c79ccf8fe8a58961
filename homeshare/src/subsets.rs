//! Types and functions to classify household records into the named subsets
//! fed to the estimator.
//!
//! Each filter dimension is a small enum that converts to a polars expression;
//! a [`SubsetKey`] is one cell of the cross-product {household kind} x
//! {bedroom surplus} x {age threshold} x {cost burden}, and its expression is
//! the AND of the dimension predicates. Subsets are non-exclusive across keys:
//! the same household can satisfy several keys.

use polars::lazy::dsl::{col, lit, Expr};
use polars::prelude::{NamedFrom, Series};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::COL;

/// Household composition of a subset.
#[derive(
    Clone, Copy, Debug, Display, EnumIter, EnumString, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum HouseholdKind {
    /// Exactly one person.
    Single,
    /// Exactly two persons forming a couple (married, unmarried partner of
    /// any recognised partner code, or same-sex married couple).
    Couple,
    /// Union of `Single` and `Couple`. The two are disjoint by the household
    /// size predicate, so no record can be counted twice.
    Combined,
}

/// Bedrooms beyond the one the household minimally needs.
#[derive(
    Clone, Copy, Debug, Display, EnumIter, EnumString, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BedroomSurplus {
    /// More than one bedroom; excludes the not-reported blank and 1-bedroom
    /// units.
    OneExtra,
    /// More than two bedrooms; additionally excludes 2-bedroom units.
    TwoExtra,
}

/// Age threshold of the older-occupant presence indicator.
#[derive(
    Clone, Copy, Debug, Display, EnumIter, EnumString, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum AgeThreshold {
    #[strum(serialize = "60")]
    Sixty,
    #[strum(serialize = "65")]
    SixtyFive,
}

impl AgeThreshold {
    /// The presence-indicator column for this threshold.
    pub fn column(&self) -> &'static str {
        match self {
            AgeThreshold::Sixty => COL::AGE_60_PRESENT,
            AgeThreshold::SixtyFive => COL::AGE_65_PRESENT,
        }
    }
}

/// Housing-cost burden filter applied on top of a subset.
#[derive(
    Clone, Copy, Debug, Display, EnumIter, EnumString, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CostBurden {
    /// No burden filter.
    Any,
    /// Housing costs at least 30% of household income.
    ThirtyPercent,
    /// Housing costs at least 50% of household income.
    FiftyPercent,
}

impl CostBurden {
    /// Threshold on the cost-to-income ratio, if the variant filters at all.
    pub fn threshold(&self) -> Option<f64> {
        match self {
            CostBurden::Any => None,
            CostBurden::ThirtyPercent => Some(30.0),
            CostBurden::FiftyPercent => Some(50.0),
        }
    }

    /// The burden predicate, `None` for the unfiltered variant.
    pub fn to_expr(&self) -> Option<Expr> {
        self.threshold()
            .map(|t| col(COL::COST_TO_INCOME).gt_eq(lit(t)))
    }
}

/// Owned housing units: excludes group/institutional quarters and
/// rented/rent-free tenure. Every subset is conditioned on this.
pub fn owned_housing_unit() -> Expr {
    col(COL::UNIT_TYPE).eq(lit(1.0)).and(
        col(COL::TENURE).is_in(lit(Series::new(COL::TENURE, &[1.0f64, 2.0]))),
    )
}

/// One-person household with an occupant over the age threshold. The presence
/// indicator codes a single older occupant as 1.
fn single_household(age: AgeThreshold) -> Expr {
    col(COL::PERSONS)
        .eq(lit(1.0))
        .and(col(age.column()).eq(lit(1.0)))
}

/// Two-person couple household where both occupants are over the age
/// threshold (presence code 2 = two or more older occupants).
fn couple_household(age: AgeThreshold) -> Expr {
    let couple = col(COL::PARTNER)
        .is_in(lit(Series::new(COL::PARTNER, &[2.0f64, 3.0, 4.0, 5.0])))
        .or(col(COL::HOUSEHOLD_TYPE).eq(lit(1.0)))
        .or(col(COL::SAME_SEX_COUPLE).is_in(lit(Series::new(COL::SAME_SEX_COUPLE, &[1.0f64, 2.0]))));
    col(COL::PERSONS).eq(lit(2.0)).and(couple).and(
        col(age.column()).eq(lit(2.0)),
    )
}

impl From<BedroomSurplus> for Expr {
    fn from(value: BedroomSurplus) -> Self {
        // Blank (not reported) bedroom counts are null after loading and
        // never satisfy the comparison.
        match value {
            BedroomSurplus::OneExtra => col(COL::BEDROOMS).gt(lit(1.0)),
            BedroomSurplus::TwoExtra => col(COL::BEDROOMS).gt(lit(2.0)),
        }
    }
}

/// One cell of the subset cross-product.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubsetKey {
    pub kind: HouseholdKind,
    pub bedrooms: BedroomSurplus,
    pub age: AgeThreshold,
    pub burden: CostBurden,
}

impl SubsetKey {
    /// All 3 x 2 x 2 x 3 = 36 leaf subsets.
    pub fn all() -> impl Iterator<Item = SubsetKey> {
        use itertools::iproduct;
        use strum::IntoEnumIterator;
        iproduct!(
            HouseholdKind::iter(),
            BedroomSurplus::iter(),
            AgeThreshold::iter(),
            CostBurden::iter()
        )
        .map(|(kind, bedrooms, age, burden)| SubsetKey {
            kind,
            bedrooms,
            age,
            burden,
        })
    }

    /// The subset's membership predicate over household records.
    pub fn to_expr(&self) -> Expr {
        let household = match self.kind {
            HouseholdKind::Single => single_household(self.age),
            HouseholdKind::Couple => couple_household(self.age),
            // True union of the independently built single and couple
            // subsets; the original analysis reused the couple subset here,
            // which was a transcription slip, not intent.
            HouseholdKind::Combined => single_household(self.age).or(couple_household(self.age)),
        };
        let mut expr = owned_housing_unit()
            .and(household)
            .and(Expr::from(self.bedrooms));
        if let Some(burden) = self.burden.to_expr() {
            expr = expr.and(burden);
        }
        expr
    }

    /// Short name for logging, e.g. `couple_65_two_extra_thirty_percent`.
    pub fn name(&self) -> String {
        format!("{}_{}_{}_{}", self.kind, self.age, self.bedrooms, self.burden)
    }
}

#[cfg(test)]
mod tests {
    use polars::prelude::*;
    use strum::IntoEnumIterator;

    use super::*;

    /// Small synthetic household file. One row per case of interest:
    /// 0: 1-person owner, 2 bedrooms, 60+, burdened at 35%
    /// 1: 1-person owner, 3 bedrooms, 65+ only, burden 55%
    /// 2: couple (married), 3 bedrooms, both 60+, no burden
    /// 3: couple (unmarried partner), 2 bedrooms, both 65+, burden 31%
    /// 4: 2-person non-couple (roommates), 4 bedrooms, both 60+
    /// 5: renter, otherwise like row 0
    /// 6: group quarters
    /// 7: 1-person owner, bedrooms not reported, 60+
    /// 8: 1-person owner, 1 bedroom, 60+
    fn households() -> DataFrame {
        df![
            COL::UNIT_TYPE => [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 1.0, 1.0],
            COL::TENURE => [1.0, 2.0, 1.0, 2.0, 1.0, 3.0, 1.0, 1.0, 2.0],
            COL::PERSONS => [1.0, 1.0, 2.0, 2.0, 2.0, 1.0, 1.0, 1.0, 1.0],
            COL::BEDROOMS => [Some(2.0), Some(3.0), Some(3.0), Some(2.0), Some(4.0), Some(2.0), Some(1.0), None, Some(1.0)],
            COL::HOUSEHOLD_TYPE => [4.0, 6.0, 1.0, 5.0, 5.0, 4.0, 4.0, 6.0, 6.0],
            COL::PARTNER => [1.0, 1.0, 1.0, 3.0, 1.0, 1.0, 1.0, 1.0, 1.0],
            COL::SAME_SEX_COUPLE => [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            COL::AGE_60_PRESENT => [1.0, 0.0, 2.0, 2.0, 2.0, 1.0, 1.0, 1.0, 1.0],
            COL::AGE_65_PRESENT => [0.0, 1.0, 2.0, 2.0, 2.0, 0.0, 0.0, 0.0, 0.0],
            COL::COST_TO_INCOME => [35.0, 55.0, 10.0, 31.0, 12.0, 35.0, 0.0, 20.0, 20.0],
        ]
        .unwrap()
    }

    fn matching_rows(expr: Expr) -> usize {
        households()
            .lazy()
            .filter(expr)
            .collect()
            .unwrap()
            .height()
    }

    #[test]
    fn test_owned_housing_unit_excludes_renters_and_gq() {
        // Rows 5 (rented) and 6 (GQ) drop out.
        assert_eq!(matching_rows(owned_housing_unit()), 7);
    }

    #[test]
    fn test_single_sixty_one_extra() {
        let key = SubsetKey {
            kind: HouseholdKind::Single,
            bedrooms: BedroomSurplus::OneExtra,
            age: AgeThreshold::Sixty,
            burden: CostBurden::Any,
        };
        // Only row 0: row 7 has no reported bedrooms, row 8 has one bedroom,
        // row 1 has no 60+ occupant.
        assert_eq!(matching_rows(key.to_expr()), 1);
    }

    #[test]
    fn test_bedroom_bands_are_nested_at_the_bound() {
        // Every two-extra record is also a one-extra record, but a 2-bedroom
        // unit belongs to one-extra only.
        let one: Expr = BedroomSurplus::OneExtra.into();
        let two: Expr = BedroomSurplus::TwoExtra.into();
        let in_two_not_one = matching_rows(two.clone().and(one.clone().not()));
        assert_eq!(in_two_not_one, 0);
        // Rows 0, 3 and 5 have exactly two bedrooms.
        assert_eq!(matching_rows(one.and(two.not())), 3);
    }

    #[test]
    fn test_couple_requires_partnership() {
        let key = SubsetKey {
            kind: HouseholdKind::Couple,
            bedrooms: BedroomSurplus::OneExtra,
            age: AgeThreshold::Sixty,
            burden: CostBurden::Any,
        };
        // Rows 2 (married) and 3 (unmarried partner) qualify; row 4 is two
        // unpartnered people.
        assert_eq!(matching_rows(key.to_expr()), 2);
    }

    #[test]
    fn test_combined_is_union_of_single_and_couple() {
        for (bedrooms, age, burden) in itertools::iproduct!(
            BedroomSurplus::iter(),
            AgeThreshold::iter(),
            CostBurden::iter()
        ) {
            let count = |kind: HouseholdKind| {
                matching_rows(
                    SubsetKey {
                        kind,
                        bedrooms,
                        age,
                        burden,
                    }
                    .to_expr(),
                )
            };
            assert_eq!(
                count(HouseholdKind::Combined),
                count(HouseholdKind::Single) + count(HouseholdKind::Couple),
                "combined must equal single + couple for {bedrooms:?}/{age:?}/{burden:?}"
            );
        }
    }

    #[test]
    fn test_cost_burden_thresholds() {
        let single_30 = SubsetKey {
            kind: HouseholdKind::Single,
            bedrooms: BedroomSurplus::OneExtra,
            age: AgeThreshold::Sixty,
            burden: CostBurden::ThirtyPercent,
        };
        let single_50 = SubsetKey {
            burden: CostBurden::FiftyPercent,
            ..single_30
        };
        // Row 0 is burdened at 35%: in the 30% subset, not the 50% one.
        assert_eq!(matching_rows(single_30.to_expr()), 1);
        assert_eq!(matching_rows(single_50.to_expr()), 0);
    }

    #[test]
    fn test_all_yields_the_full_cross_product() {
        assert_eq!(SubsetKey::all().count(), 36);
    }

    #[test]
    fn test_key_name() {
        let key = SubsetKey {
            kind: HouseholdKind::Couple,
            bedrooms: BedroomSurplus::TwoExtra,
            age: AgeThreshold::SixtyFive,
            burden: CostBurden::ThirtyPercent,
        };
        assert_eq!(key.name(), "couple_65_two_extra_thirty_percent");
    }
}
