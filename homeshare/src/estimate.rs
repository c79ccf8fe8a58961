//! Direct replicate-weight estimation of weighted household totals.
//!
//! Uses the successive-difference replication formula published with the ACS
//! PUMS files: the variance of a weighted total is `(4/80) * sum_r (total_r -
//! total)^2` over the 80 replicate weights, and the margin of error is the
//! 90%-confidence half-width `1.645 * sqrt(variance)`.

use polars::prelude::*;

use crate::error::HomeshareError;
use crate::COL;

/// 90% confidence multiplier used by the ACS.
const MOE_MULTIPLIER: f64 = 1.645;

/// A weighted household count with its sampling uncertainty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// Sum of primary weights over the subset.
    pub point: f64,
    /// Margin of error, absolute (always >= 0).
    pub moe: f64,
    /// Margin of error as a percentage of the point estimate; NaN when the
    /// point estimate is zero.
    pub moe_pct: f64,
    /// `point - moe`; may go negative, downstream decides whether to clamp.
    pub lower: f64,
    /// `point + moe`.
    pub upper: f64,
}

impl Estimate {
    /// The estimate for an empty subset: zero count, zero spread, undefined
    /// percent margin.
    pub fn zero() -> Self {
        Estimate {
            point: 0.0,
            moe: 0.0,
            moe_pct: f64::NAN,
            lower: 0.0,
            upper: 0.0,
        }
    }

    /// Build an `Estimate` from the full-sample total and the 80 replicate
    /// totals computed over the same records.
    pub fn from_replicate_totals(point: f64, replicate_totals: &[f64]) -> Self {
        let n_reps = replicate_totals.len();
        let squared_diffs: f64 = replicate_totals
            .iter()
            .map(|total| (total - point) * (total - point))
            .sum();
        let moe = MOE_MULTIPLIER * ((4.0 / n_reps as f64) * squared_diffs).sqrt();
        let moe_pct = if point == 0.0 {
            f64::NAN
        } else {
            (moe / point) * 100.0
        };
        Estimate {
            point,
            moe,
            moe_pct,
            lower: point - moe,
            upper: point + moe,
        }
    }
}

/// Sum a weight column of the subset. Fails with `InvalidInput` if the column
/// is absent or any record is missing a value.
fn weight_total(subset: &DataFrame, name: &str) -> Result<f64, HomeshareError> {
    let series = subset
        .column(name)
        .map_err(|_| HomeshareError::InvalidInput(name.to_string()))?;
    if series.null_count() > 0 {
        return Err(HomeshareError::InvalidInput(name.to_string()));
    }
    let values = series.cast(&DataType::Float64)?;
    let values = values.f64()?;
    if values.null_count() > 0 {
        // Non-numeric values surfaced as nulls by the cast.
        return Err(HomeshareError::InvalidInput(name.to_string()));
    }
    Ok(values.sum().unwrap_or(0.0))
}

/// Estimate the weighted number of households in `subset`.
///
/// An empty subset is a defined zero, not an error; a record with a missing
/// primary or replicate weight fails fast with `InvalidInput`.
pub fn estimate_total(subset: &DataFrame) -> Result<Estimate, HomeshareError> {
    if subset.height() == 0 {
        return Ok(Estimate::zero());
    }
    let point = weight_total(subset, COL::PRIMARY_WEIGHT)?;
    let replicate_totals = (1..=COL::REPLICATE_COUNT)
        .map(|r| weight_total(subset, &COL::replicate_weight(r)))
        .collect::<Result<Vec<f64>, _>>()?;
    Ok(Estimate::from_replicate_totals(point, &replicate_totals))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A frame of `n` records with the given primary weight and a closure
    /// giving the replicate weight for (record, replicate) pairs.
    fn weights_frame<F: Fn(usize, usize) -> f64>(primary: &[f64], replicate: F) -> DataFrame {
        let mut columns = vec![Series::new(COL::PRIMARY_WEIGHT, primary)];
        for r in 1..=COL::REPLICATE_COUNT {
            let values: Vec<f64> = (0..primary.len()).map(|i| replicate(i, r)).collect();
            columns.push(Series::new(&COL::replicate_weight(r), values));
        }
        DataFrame::new(columns).unwrap()
    }

    #[test]
    fn test_point_is_sum_of_primary_weights() {
        let df = weights_frame(&[10.0, 20.0, 30.0], |_, _| 25.0);
        let est = estimate_total(&df).unwrap();
        assert_eq!(est.point, 60.0);
        assert!(est.moe >= 0.0);
    }

    #[test]
    fn test_no_variance_across_replicates() {
        // Three records, weight 100, every replicate weight 100: the count is
        // exact and the interval collapses to the point.
        let df = weights_frame(&[100.0, 100.0, 100.0], |_, _| 100.0);
        let est = estimate_total(&df).unwrap();
        assert_eq!(est.point, 300.0);
        assert_eq!(est.moe, 0.0);
        assert_eq!(est.moe_pct, 0.0);
        assert_eq!(est.lower, 300.0);
        assert_eq!(est.upper, 300.0);
    }

    #[test]
    fn test_closed_form_moe() {
        // One record of weight 1000 with replicate totals alternating +/-10:
        // each squared difference is 100, so
        // moe = 1.645 * sqrt((4/80) * 80 * 100) = 1.645 * 20.
        let df = weights_frame(&[1000.0], |_, r| if r % 2 == 0 { 1010.0 } else { 990.0 });
        let est = estimate_total(&df).unwrap();
        let expected = 1.645 * ((4.0 / 80.0) * 80.0 * 100.0_f64).sqrt();
        assert!((est.moe - expected).abs() < 1e-9);
        assert!((est.moe - 32.9).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_are_symmetric() {
        let df = weights_frame(&[50.0, 70.0], |i, r| 60.0 + (i + r) as f64);
        let est = estimate_total(&df).unwrap();
        assert!((est.upper - est.point - est.moe).abs() < 1e-12);
        assert!((est.point - est.lower - est.moe).abs() < 1e-12);
    }

    #[test]
    fn test_empty_subset_is_zero() {
        let df = weights_frame(&[], |_, _| 0.0);
        let est = estimate_total(&df).unwrap();
        assert_eq!(est.point, 0.0);
        assert_eq!(est.moe, 0.0);
        assert_eq!(est.lower, 0.0);
        assert_eq!(est.upper, 0.0);
        assert!(est.moe_pct.is_nan());
    }

    #[test]
    fn test_missing_replicate_column_fails() {
        let df = weights_frame(&[100.0], |_, _| 100.0)
            .drop(&COL::replicate_weight(41))
            .unwrap();
        let err = estimate_total(&df).unwrap_err();
        match err {
            HomeshareError::InvalidInput(field) => assert_eq!(field, "WGTP41"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_null_weight_fails() {
        let mut df = weights_frame(&[100.0, 200.0], |_, _| 150.0);
        let with_null = Series::new(COL::PRIMARY_WEIGHT, &[Some(100.0), None]);
        df.replace(COL::PRIMARY_WEIGHT, with_null).unwrap();
        let err = estimate_total(&df).unwrap_err();
        match err {
            HomeshareError::InvalidInput(field) => assert_eq!(field, COL::PRIMARY_WEIGHT),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_lower_bound_not_clamped() {
        // A tiny point estimate with wildly varying replicates goes negative.
        let df = weights_frame(&[1.0], |_, r| if r % 2 == 0 { 101.0 } else { -99.0 });
        let est = estimate_total(&df).unwrap();
        assert!(est.lower < 0.0);
        assert_eq!(est.upper, est.point + est.moe);
    }
}
