//! Modified Z-Score outlier detection (Iglewicz & Hoaglin).
//!
//! Each point's Euclidean distance from the component-wise median is scaled
//! by the median of those distances (MAD). Both center and spread are
//! medians, so a handful of extreme points cannot mask themselves by
//! inflating the dispersion estimate the way they would with mean/stddev.
//!
//! Degenerate inputs never produce NaN or infinite scores: fewer than two
//! points, or a MAD of zero, classify every point as an inlier.

use std::cmp::Ordering;

/// Default modified z-score cutoff recommended by Iglewicz & Hoaglin.
pub const DEFAULT_THRESHOLD: f64 = 3.5;

/// Scales MAD to be comparable to the standard deviation of a normal
/// distribution (0.6745 is the 0.75 quantile of N(0, 1)).
pub const MAD_SCALE: f64 = 0.6745;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OutlierError {
    #[error("{rows} rows but {values} values to classify them by")]
    LengthMismatch { rows: usize, values: usize },
    #[error("point {index} has {found} dimensions, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("point {index} has a non-finite coordinate")]
    NonFinite { index: usize },
}

pub type Result<T> = std::result::Result<T, OutlierError>;

/// Anything that can be viewed as a point in n-dimensional space.
///
/// Scalars are 1-dimensional points.
pub trait Point {
    fn dims(&self) -> usize;
    fn coord(&self, axis: usize) -> f64;
}

impl Point for f64 {
    fn dims(&self) -> usize {
        1
    }

    fn coord(&self, _axis: usize) -> f64 {
        *self
    }
}

impl<const N: usize> Point for [f64; N] {
    fn dims(&self) -> usize {
        N
    }

    fn coord(&self, axis: usize) -> f64 {
        self[axis]
    }
}

impl Point for [f64] {
    fn dims(&self) -> usize {
        self.len()
    }

    fn coord(&self, axis: usize) -> f64 {
        self[axis]
    }
}

impl Point for Vec<f64> {
    fn dims(&self) -> usize {
        self.len()
    }

    fn coord(&self, axis: usize) -> f64 {
        self[axis]
    }
}

impl<P: Point + ?Sized> Point for &P {
    fn dims(&self) -> usize {
        (**self).dims()
    }

    fn coord(&self, axis: usize) -> f64 {
        (**self).coord(axis)
    }
}

/// Modified z-score of every point, in input order.
///
/// Returns `Ok(None)` when the scores are undefined: fewer than two points,
/// or every point equally far from the median (MAD of zero).
pub fn modified_z_scores<P: Point>(values: &[P]) -> Result<Option<Vec<f64>>> {
    let dims = check_points(values)?;
    if values.len() < 2 {
        return Ok(None);
    }

    let center: Vec<f64> = (0..dims)
        .map(|axis| median(values.iter().map(|p| p.coord(axis)).collect()))
        .collect();

    let diffs: Vec<f64> = values.iter().map(|p| distance(p, &center)).collect();
    let mad = median(diffs.clone());

    if mad <= 0.0 || !mad.is_finite() {
        return Ok(None);
    }

    Ok(Some(diffs.iter().map(|d| MAD_SCALE * d / mad).collect()))
}

/// Classify each point as an outlier (`true`) or not.
///
/// A point is an outlier when its modified z-score is strictly greater than
/// `threshold`. The result has the same length and order as `values`.
pub fn classify_outliers<P: Point>(values: &[P], threshold: f64) -> Result<Vec<bool>> {
    let mask = match modified_z_scores(values)? {
        Some(scores) => scores.iter().map(|z| *z > threshold).collect(),
        None => vec![false; values.len()],
    };
    Ok(mask)
}

/// Return the rows whose aligned value is an outlier, keeping their order.
pub fn select_outliers<T: Clone, P: Point>(
    rows: &[T],
    values: &[P],
    threshold: f64,
) -> Result<Vec<T>> {
    if rows.len() != values.len() {
        return Err(OutlierError::LengthMismatch {
            rows: rows.len(),
            values: values.len(),
        });
    }

    let mask = classify_outliers(values, threshold)?;
    Ok(rows
        .iter()
        .zip(mask)
        .filter(|(_, is_outlier)| *is_outlier)
        .map(|(row, _)| row.clone())
        .collect())
}

/// Validate shape and finiteness; returns the common dimensionality.
fn check_points<P: Point>(values: &[P]) -> Result<usize> {
    let expected = match values.first() {
        Some(first) => first.dims(),
        None => return Ok(0),
    };

    for (index, point) in values.iter().enumerate() {
        let found = point.dims();
        if found != expected {
            return Err(OutlierError::DimensionMismatch {
                index,
                expected,
                found,
            });
        }
        if (0..found).any(|axis| !point.coord(axis).is_finite()) {
            return Err(OutlierError::NonFinite { index });
        }
    }

    Ok(expected)
}

fn distance<P: Point>(point: &P, center: &[f64]) -> f64 {
    center
        .iter()
        .enumerate()
        .map(|(axis, c)| (point.coord(axis) - c).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Median with the usual even-length convention (mean of the middle two).
fn median(mut xs: Vec<f64>) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mid = xs.len() / 2;
    if xs.len() % 2 == 0 {
        (xs[mid - 1] + xs[mid]) / 2.0
    } else {
        xs[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turnout_scenario_flags_low_county() {
        let turnout = vec![95.0, 90.0, 5.0];
        let mask = classify_outliers(&turnout, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(mask, vec![false, false, true]);
    }

    #[test]
    fn test_residual_scenario_flags_high_county() {
        let residual = vec![1.0, 1.5, 0.5, 50.0];
        let mask = classify_outliers(&residual, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(mask, vec![false, false, false, true]);
    }

    #[test]
    fn test_scores_use_mad_scale() {
        let scores = modified_z_scores(&[-1.0, 0.0, 1.0]).unwrap().unwrap();
        assert_eq!(scores, vec![MAD_SCALE, 0.0, MAD_SCALE]);
    }

    #[test]
    fn test_threshold_is_strict() {
        let values = vec![-1.0, 0.0, 1.0];
        assert_eq!(
            classify_outliers(&values, MAD_SCALE).unwrap(),
            vec![false, false, false]
        );
        assert_eq!(
            classify_outliers(&values, 0.67).unwrap(),
            vec![true, false, true]
        );
    }

    #[test]
    fn test_even_count_median_averages_middle_pair() {
        assert_eq!(median(vec![4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(vec![3.0, 1.0, 2.0]), 2.0);
    }

    #[test]
    fn test_fewer_than_two_points() {
        let empty: Vec<f64> = Vec::new();
        assert!(classify_outliers(&empty, DEFAULT_THRESHOLD).unwrap().is_empty());
        assert_eq!(
            classify_outliers(&[1000.0], DEFAULT_THRESHOLD).unwrap(),
            vec![false]
        );
        assert_eq!(modified_z_scores(&[1000.0]).unwrap(), None);
    }

    #[test]
    fn test_all_identical_no_outliers() {
        let values = vec![42.0; 20];
        assert_eq!(modified_z_scores(&values).unwrap(), None);
        assert!(classify_outliers(&values, DEFAULT_THRESHOLD)
            .unwrap()
            .iter()
            .all(|o| !o));
    }

    #[test]
    fn test_zero_mad_with_one_stray_point_is_not_flagged() {
        // Majority identical: MAD is 0 even though one point differs.
        let mut values = vec![10.0; 9];
        values.push(500.0);
        assert_eq!(
            classify_outliers(&values, DEFAULT_THRESHOLD).unwrap(),
            vec![false; 10]
        );
    }

    #[test]
    fn test_vector_points_use_euclidean_distance() {
        let points = vec![
            [1.0, 1.0],
            [1.2, 0.9],
            [0.9, 1.1],
            [1.1, 1.0],
            [1.0, 0.8],
            [9.0, -7.0],
        ];
        let mask = classify_outliers(&points, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(mask, vec![false, false, false, false, false, true]);
    }

    #[test]
    fn test_ragged_points_rejected() {
        let points = vec![vec![1.0, 2.0], vec![1.0], vec![3.0, 4.0]];
        assert_eq!(
            classify_outliers(&points, DEFAULT_THRESHOLD),
            Err(OutlierError::DimensionMismatch {
                index: 1,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_non_finite_rejected() {
        let values = vec![1.0, f64::NAN, 3.0];
        assert_eq!(
            classify_outliers(&values, DEFAULT_THRESHOLD),
            Err(OutlierError::NonFinite { index: 1 })
        );
    }

    #[test]
    fn test_select_preserves_order() {
        let rows = vec!["a", "b", "c", "d", "e", "f"];
        let values = vec![-80.0, 10.0, 11.0, 9.0, 10.5, 90.0];
        let selected = select_outliers(&rows, &values, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(selected, vec!["a", "f"]);
    }

    #[test]
    fn test_select_length_mismatch_fails() {
        let rows = vec!["a", "b", "c"];
        let values = vec![1.0, 2.0];
        assert_eq!(
            select_outliers(&rows, &values, DEFAULT_THRESHOLD),
            Err(OutlierError::LengthMismatch { rows: 3, values: 2 })
        );
    }
}
