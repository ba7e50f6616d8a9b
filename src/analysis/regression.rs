use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::data::model::EntitySnapshot;

// ---------------------------------------------------------------------------
// Simple linear regression: co2_per_capita ~ gdp_per_capita
// ---------------------------------------------------------------------------

/// Minimum sample size; below this the slope has no degrees of freedom left.
pub const MIN_OBSERVATIONS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Two-sided p-value of H0: slope = 0 (Student's t, n - 2 df).
    pub p_value: f64,
    pub slope_std_error: f64,
    pub n_observations: usize,
}

/// Why a fit could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateReason {
    TooFewObservations,
    ZeroPredictorVariance,
    NonFiniteInput,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RegressionResult {
    Fitted(RegressionFit),
    Undefined {
        reason: DegenerateReason,
        n_observations: usize,
    },
}

impl RegressionResult {
    pub fn fit(&self) -> Option<&RegressionFit> {
        match self {
            RegressionResult::Fitted(fit) => Some(fit),
            RegressionResult::Undefined { .. } => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, RegressionResult::Undefined { .. })
    }
}

/// Regress `co2_per_capita` on `gdp_per_capita` over the entity snapshots.
pub fn regress_co2_on_gdp(snapshots: &[EntitySnapshot]) -> RegressionResult {
    let points: Vec<(f64, f64)> = snapshots
        .iter()
        .map(|s| (s.gdp_per_capita, s.co2_per_capita))
        .collect();
    ordinary_least_squares(&points)
}

/// Closed-form OLS fit of `y = intercept + slope × x` over `(x, y)` pairs.
///
/// Undefined when there are fewer than [`MIN_OBSERVATIONS`] points, when `x`
/// is constant, or when any coordinate is NaN / infinite.
pub fn ordinary_least_squares(points: &[(f64, f64)]) -> RegressionResult {
    let n_observations = points.len();
    let undefined = |reason| RegressionResult::Undefined {
        reason,
        n_observations,
    };

    if n_observations < MIN_OBSERVATIONS {
        return undefined(DegenerateReason::TooFewObservations);
    }
    if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return undefined(DegenerateReason::NonFiniteInput);
    }

    let n = n_observations as f64;
    let x_mean = points.iter().map(|p| p.0).sum::<f64>() / n;
    let y_mean = points.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in points {
        let dx = x - x_mean;
        let dy = y - y_mean;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    // Rounding in the mean leaves sxx slightly positive for a constant x.
    if sxx == 0.0 || points.iter().all(|p| p.0 == points[0].0) {
        return undefined(DegenerateReason::ZeroPredictorVariance);
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let ss_res: f64 = points
        .iter()
        .map(|&(x, y)| (y - (intercept + slope * x)).powi(2))
        .sum();
    let df = n - 2.0;
    let slope_std_error = (ss_res / df / sxx).sqrt();

    let (r_squared, p_value) = if syy == 0.0 {
        // Constant response: nothing to explain, slope is exactly zero.
        (0.0, 1.0)
    } else {
        let r_squared = (1.0 - ss_res / syy).clamp(0.0, 1.0);
        let p_value = if slope_std_error == 0.0 {
            0.0
        } else {
            match two_sided_p_value(slope / slope_std_error, df) {
                Some(p) => p,
                None => return undefined(DegenerateReason::NonFiniteInput),
            }
        };
        (r_squared, p_value)
    };

    if !slope.is_finite() || !intercept.is_finite() || !slope_std_error.is_finite() {
        return undefined(DegenerateReason::NonFiniteInput);
    }

    RegressionResult::Fitted(RegressionFit {
        slope,
        intercept,
        r_squared,
        p_value,
        slope_std_error,
        n_observations,
    })
}

/// `P(|T| >= |t|)` for Student's t with `df` degrees of freedom.
fn two_sided_p_value(t: f64, df: f64) -> Option<f64> {
    if !t.is_finite() {
        return None;
    }
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some((2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_perfect_line_is_recovered() {
        let points: Vec<(f64, f64)> = [500.0, 1_500.0, 4_000.0, 12_000.0, 30_000.0, 65_000.0]
            .iter()
            .map(|&gdp| (gdp, 2.0 + 0.001 * gdp))
            .collect();

        let result = ordinary_least_squares(&points);
        let fit = result.fit().expect("fit should be defined");
        assert_close(fit.slope, 0.001, 1e-12);
        assert_close(fit.intercept, 2.0, 1e-9);
        assert_close(fit.r_squared, 1.0, 1e-12);
        assert!(fit.p_value < 1e-6);
        assert_eq!(fit.n_observations, 6);
        assert_close(fit.intercept + fit.slope * 10_000.0, 12.0, 1e-9);
    }

    #[test]
    fn test_noisy_fit_statistics() {
        // x = 1..5, y = 2, 4, 5, 4, 5: slope 0.6, intercept 2.2, R² 0.6.
        let points = [(1.0, 2.0), (2.0, 4.0), (3.0, 5.0), (4.0, 4.0), (5.0, 5.0)];
        let fit = ordinary_least_squares(&points).fit().cloned().unwrap();

        assert_close(fit.slope, 0.6, 1e-12);
        assert_close(fit.intercept, 2.2, 1e-12);
        assert_close(fit.r_squared, 0.6, 1e-12);
        // se = sqrt(2.4 / 3 / 10) = 0.28284..., t = 2.1213 with 3 df.
        assert_close(fit.slope_std_error, (0.08f64).sqrt(), 1e-12);
        assert_close(fit.p_value, 0.1240, 5e-4);
    }

    #[test]
    fn test_too_few_points_is_undefined() {
        for points in [vec![], vec![(1.0, 1.0)], vec![(1.0, 1.0), (2.0, 3.0)]] {
            let result = ordinary_least_squares(&points);
            assert_eq!(
                result,
                RegressionResult::Undefined {
                    reason: DegenerateReason::TooFewObservations,
                    n_observations: points.len(),
                }
            );
        }
    }

    #[test]
    fn test_constant_predictor_is_undefined() {
        let points = [(7.0, 1.0), (7.0, 2.0), (7.0, 3.0), (7.0, 9.0)];
        let result = ordinary_least_squares(&points);
        assert!(result.is_undefined());
        assert!(matches!(
            result,
            RegressionResult::Undefined {
                reason: DegenerateReason::ZeroPredictorVariance,
                ..
            }
        ));
    }

    #[test]
    fn test_inexact_constant_predictor_is_undefined() {
        // Neither 0.1 nor 3.3 averages back to itself exactly in binary.
        for x in [0.1, 3.3] {
            let points = [(x, 1.0), (x, 2.0), (x, 9.0)];
            assert!(matches!(
                ordinary_least_squares(&points),
                RegressionResult::Undefined {
                    reason: DegenerateReason::ZeroPredictorVariance,
                    n_observations: 3,
                }
            ));
        }
    }

    #[test]
    fn test_non_finite_input_is_undefined() {
        let points = [(1.0, 1.0), (2.0, f64::NAN), (3.0, 3.0)];
        assert!(matches!(
            ordinary_least_squares(&points),
            RegressionResult::Undefined {
                reason: DegenerateReason::NonFiniteInput,
                ..
            }
        ));
    }

    #[test]
    fn test_constant_response_has_zero_slope() {
        let points = [(1.0, 4.0), (2.0, 4.0), (3.0, 4.0)];
        let fit = ordinary_least_squares(&points).fit().cloned().unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.intercept, 4.0);
        assert_eq!(fit.r_squared, 0.0);
        assert_eq!(fit.p_value, 1.0);
    }

    #[test]
    fn test_undefined_serializes_with_reason() {
        let json = serde_json::to_value(ordinary_least_squares(&[])).unwrap();
        assert_eq!(json["status"], "undefined");
        assert_eq!(json["reason"], "too_few_observations");
        assert_eq!(json["n_observations"], 0);
    }
}
