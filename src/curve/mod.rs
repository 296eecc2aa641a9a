//! 5차 다항식 펌프 곡선 H(Q)와 피팅/카탈로그 모듈.
//!
//! 계수는 항상 최고차항부터 `[c5, c4, c3, c2, c1, c0]` 순서로 저장한다.
//! 카탈로그 파일 형식이 이 순서를 그대로 쓰므로 절대 바꾸지 않는다.

pub mod catalog;
pub mod fit;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use catalog::{find_curve, read_catalog, write_catalog, CatalogError};
pub use fit::{fit_curve, fit_polynomial};

/// 다항식 차수.
pub const DEGREE: usize = 5;
/// 계수 개수(차수 + 1).
pub const COEFFICIENT_COUNT: usize = DEGREE + 1;

/// 5차 다항식 펌프 곡선. 카탈로그 항목과 새로 피팅한 곡선이 같은 형태를 쓴다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialCurve {
    /// 곡선 이름(펌프 모델명). 이름 없이 피팅한 곡선은 빈 문자열.
    pub label: String,
    /// `[c5, c4, c3, c2, c1, c0]`
    pub coefficients: [f64; COEFFICIENT_COUNT],
    /// 최고효율점 유량. 차트 표시 범위에만 쓴다.
    #[serde(default)]
    pub bep: Option<f64>,
}

impl PolynomialCurve {
    pub fn new(label: impl Into<String>, coefficients: [f64; COEFFICIENT_COUNT]) -> Self {
        Self {
            label: label.into(),
            coefficients,
            bep: None,
        }
    }

    pub fn with_bep(mut self, bep: f64) -> Self {
        self.bep = Some(bep);
        self
    }

    /// 이름이 붙은 카탈로그 항목인지 여부.
    pub fn is_labeled(&self) -> bool {
        !self.label.trim().is_empty()
    }

    /// 기준 주파수(60 Hz)에서 유량 `q`의 단당 양정.
    pub fn evaluate(&self, q: f64) -> f64 {
        evaluate(&self.coefficients, q)
    }
}

/// `Σ cᵢ·Q^(5-i)`를 계산한다.
///
/// 거듭제곱을 항마다 따로 계산하여 `powi` 결과와 같은 값을 낸다.
pub fn evaluate(coefficients: &[f64; COEFFICIENT_COUNT], q: f64) -> f64 {
    coefficients
        .iter()
        .enumerate()
        .map(|(i, c)| c * q.powi((DEGREE - i) as i32))
        .sum()
}

impl fmt::Display for PolynomialCurve {
    /// `1.00000e-3x^5 + ... - 5.00000e1x^0` 형태로 출력한다.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<String> = self
            .coefficients
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{c:.5e}x^{}", DEGREE - i))
            .collect();
        write!(f, "{}", terms.join(" + ").replace("+ -", "- "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_linear_curve() {
        let curve = PolynomialCurve::new("lin", [0.0, 0.0, 0.0, 0.0, -0.001, 50.0]);
        assert!((curve.evaluate(1000.0) - 49.0).abs() < 1e-12);
        assert_eq!(curve.evaluate(0.0), 50.0);
    }

    #[test]
    fn display_collapses_negative_terms() {
        let curve = PolynomialCurve::new("x", [0.0, 0.0, 0.0, 0.0, -0.001, 50.0]);
        let text = curve.to_string();
        assert!(text.starts_with("0.00000e0x^5 + "), "{text}");
        assert!(text.contains("- 1.00000e-3x^1"), "{text}");
        assert!(text.ends_with("+ 5.00000e1x^0"), "{text}");
    }

    #[test]
    fn unlabeled_curve_is_not_catalog_entry() {
        assert!(!PolynomialCurve::new("  ", [0.0; 6]).is_labeled());
        assert!(PolynomialCurve::new("P-100", [0.0; 6]).is_labeled());
    }
}
