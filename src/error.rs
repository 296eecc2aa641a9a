//! 계산 엔진(보정, 곡선 피팅, 펌프 사이징)에서 공통으로 쓰는 오류 정의.

/// 엔진 계산 오류를 표현한다.
///
/// 어떤 오류도 기본값(예: 0으로 채운 계수)으로 대체하지 않는다.
/// 실패한 피팅은 `Err`로만 표현되며, 모든 계수가 0인 정상 피팅과 구별된다.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// 기준점이 부족하거나 축이 퇴화(같은 좌표)한 보정 입력
    #[error("축 보정 입력 오류: {0}")]
    InvalidCalibration(String),

    /// 곡선 피팅에 필요한 점 수 부족
    #[error("곡선 점이 부족합니다: {got}개 (최소 {required}개 필요)")]
    InsufficientPoints { got: usize, required: usize },

    /// 정규방정식 행렬이 특이(또는 거의 특이)하여 피팅 불가
    #[error("정규방정식 행렬이 특이합니다: 점 {points}개, 서로 다른 유량 {distinct_flows}개")]
    SingularMatrix { points: usize, distinct_flows: usize },

    /// 0 이하의 단당 양정 또는 유한하지 않은 계산값
    #[error("유효하지 않은 계산 결과: {0}")]
    InvalidResult(String),
}

/// 엔진 함수의 결과 타입.
pub type Result<T> = std::result::Result<T, EngineError>;

/// 값이 유한한지 확인하고, 아니면 `InvalidResult`를 돌려준다.
pub(crate) fn ensure_finite(label: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::InvalidResult(format!("{label} 값이 유한하지 않습니다 ({value})")))
    }
}
