//! 펌프 성능 곡선 디지타이즈와 ESP 사이징 계산 로직을 라이브러리로 분리하여
//! CLI 뿐 아니라 다른 화면(웹, GUI)에서도 같은 엔진을 호출할 수 있게 한다.
//!
//! 계산 엔진은 세 부분으로 이루어진다.
//! - [`calibration`]: 픽셀 좌표 → (유량, 양정) 2점 축 보정
//! - [`curve::fit`]: 5차 다항식 최소제곱 피팅
//! - [`sizing`]: 상사법칙 기반 단수 계산과 주파수별 곡선 계열
//!
//! 모든 엔진 함수는 입력만으로 결과를 만드는 순수 함수이며 공유 상태가 없다.

pub mod app;
pub mod calibration;
pub mod config;
pub mod curve;
pub mod digitizer;
pub mod error;
pub mod sizing;
pub mod ui_cli;
pub mod units;

pub use calibration::{apply_scale, derive_scale, AxisScale, PixelPoint, RealWorldPoint, RealWorldRefs};
pub use curve::{fit_polynomial, PolynomialCurve};
pub use error::EngineError;
pub use sizing::{sample_curve_family, size, CurveFamilyInput, CurveSeries, SizingResult, WellParameters};
