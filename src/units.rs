//! 펌프 사이징에 쓰는 단위 환산 상수.

/// 1 psi에 해당하는 물 기준 수두(ft).
pub const PSI_TO_FT_HEAD: f64 = 2.31;

/// 카탈로그 곡선의 기준 운전 주파수(Hz).
pub const BASE_FREQUENCY_HZ: f64 = 60.0;

/// psi 압력을 수두(ft)로 환산한다.
pub fn psi_to_head_ft(psi: f64) -> f64 {
    psi * PSI_TO_FT_HEAD
}

/// 운전 주파수와 기준 주파수의 비(f / 60).
pub fn speed_ratio(frequency_hz: f64) -> f64 {
    frequency_hz / BASE_FREQUENCY_HZ
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn psi_converts_with_fixed_factor() {
        assert!((psi_to_head_ft(100.0) - 231.0).abs() < 1e-9);
        assert_eq!(psi_to_head_ft(0.0), 0.0);
    }

    #[test]
    fn base_frequency_ratio_is_one() {
        assert_eq!(speed_ratio(60.0), 1.0);
        assert!((speed_ratio(45.0) - 0.75).abs() < 1e-12);
    }
}
