//! 최소제곱 5차 다항식 피팅.
//!
//! 설계행렬 V의 각 행은 `[Q^5, Q^4, Q^3, Q^2, Q, 1]`이고 정규방정식
//! `(VᵀV) c = Vᵀ H`를 푼다. 실제 펌프 유량(수천 단위)을 그대로 거듭제곱하면
//! VᵀV가 곧바로 배정밀도 범위를 벗어나므로, 유량을 `u = (Q - m) / h`
//! (`u ∈ [-1, 1]`)로 옮겨 정규방정식을 푼 뒤 Q의 계수로 되돌린다.
//! 최소제곱 해는 변수의 아핀 변환에 대해 불변이므로 결과는 같은 다항식이다.

use nalgebra::{DMatrix, DVector};
use tracing::{debug, warn};

use super::{PolynomialCurve, COEFFICIENT_COUNT, DEGREE};
use crate::calibration::RealWorldPoint;
use crate::error::{ensure_finite, EngineError, Result};

/// 피팅에 필요한 최소 점 수.
pub const MIN_POINTS: usize = COEFFICIENT_COUNT;

/// 정규방정식 행렬의 역조건수(σmin/σmax) 하한. 이보다 작으면 특이로 본다.
pub const MIN_RECIPROCAL_CONDITION: f64 = 1e-12;

/// 곡선 점 목록에 5차 다항식을 피팅하여 `[c5..c0]` 계수를 돌려준다.
pub fn fit_polynomial(points: &[RealWorldPoint]) -> Result<[f64; COEFFICIENT_COUNT]> {
    if points.len() < MIN_POINTS {
        return Err(EngineError::InsufficientPoints {
            got: points.len(),
            required: MIN_POINTS,
        });
    }
    for (i, p) in points.iter().enumerate() {
        if !p.flow.is_finite() || !p.head.is_finite() {
            return Err(EngineError::InvalidResult(format!(
                "{}번째 곡선 점이 유한하지 않습니다 ({}, {})",
                i + 1,
                p.flow,
                p.head
            )));
        }
    }

    let distinct_flows = count_distinct(points.iter().map(|p| p.flow));
    let singular = EngineError::SingularMatrix {
        points: points.len(),
        distinct_flows,
    };
    if distinct_flows < COEFFICIENT_COUNT {
        warn!(points = points.len(), distinct_flows, "fit rejected: too few distinct flows");
        return Err(singular);
    }

    let (min_q, max_q) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.flow), hi.max(p.flow))
        });
    let center = (min_q + max_q) / 2.0;
    let half_span = (max_q - min_q) / 2.0;

    let n = points.len();
    let design = DMatrix::from_fn(n, COEFFICIENT_COUNT, |r, c| {
        let u = (points[r].flow - center) / half_span;
        u.powi((DEGREE - c) as i32)
    });
    let heads = DVector::from_iterator(n, points.iter().map(|p| p.head));

    let normal = design.transpose() * &design;
    let rhs = design.transpose() * &heads;

    let singular_values = normal.singular_values();
    let s_max = singular_values.iter().cloned().fold(0.0_f64, f64::max);
    let s_min = singular_values.iter().cloned().fold(f64::INFINITY, f64::min);
    let rcond = if s_max > 0.0 { s_min / s_max } else { 0.0 };
    debug!(rcond, points = n, "normal equations assembled");
    if !rcond.is_finite() || rcond < MIN_RECIPROCAL_CONDITION {
        warn!(rcond, "fit rejected: normal matrix is near-singular");
        return Err(singular);
    }

    let Some(chol) = normal.cholesky() else {
        warn!("fit rejected: normal matrix is not positive definite");
        return Err(singular);
    };
    let scaled = chol.solve(&rhs);

    let coefficients = unscale(scaled.as_slice(), center, half_span);
    for (i, c) in coefficients.iter().enumerate() {
        ensure_finite(&format!("계수 c{}", DEGREE - i), *c)?;
    }
    debug!(?coefficients, "polynomial fitted");
    Ok(coefficients)
}

/// 점을 피팅하여 이름과 BEP가 붙은 곡선을 만든다.
pub fn fit_curve(
    label: impl Into<String>,
    points: &[RealWorldPoint],
    bep: Option<f64>,
) -> Result<PolynomialCurve> {
    let coefficients = fit_polynomial(points)?;
    Ok(PolynomialCurve {
        label: label.into(),
        coefficients,
        bep,
    })
}

fn count_distinct(values: impl Iterator<Item = f64>) -> usize {
    let mut sorted: Vec<f64> = values.collect();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}

/// `u = (Q - center) / half_span` 기준 계수 `[d5..d0]`를 Q 기준 `[c5..c0]`로 바꾼다.
///
/// `u^k = Σ_j C(k, j) a^j b^(k-j) Q^j` (a = 1/h, b = -m/h)를 전개해 모은다.
fn unscale(scaled: &[f64], center: f64, half_span: f64) -> [f64; COEFFICIENT_COUNT] {
    let a = 1.0 / half_span;
    let b = -center / half_span;
    let mut by_power = [0.0_f64; COEFFICIENT_COUNT];
    for k in 0..=DEGREE {
        let d_k = scaled[DEGREE - k];
        for (j, slot) in by_power.iter_mut().enumerate().take(k + 1) {
            *slot += d_k * binomial(k, j) * a.powi(j as i32) * b.powi((k - j) as i32);
        }
    }
    let mut coefficients = [0.0_f64; COEFFICIENT_COUNT];
    for (j, c) in by_power.iter().enumerate() {
        coefficients[DEGREE - j] = *c;
    }
    coefficients
}

fn binomial(n: usize, k: usize) -> f64 {
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}
