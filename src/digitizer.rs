//! 차트 이미지 위에서 찍은 점을 모으는 디지타이저 세션.
//!
//! 세션은 호출자가 소유하는 상태이며, 계산은 모두 [`calibration`]과
//! [`curve::fit`]의 순수 함수에 맡긴다.
//!
//! [`calibration`]: crate::calibration
//! [`curve::fit`]: crate::curve::fit

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calibration::{AxisScale, PixelPoint, RealWorldPoint, RealWorldRefs, REFERENCE_POINT_COUNT};
use crate::curve::{fit_curve, PolynomialCurve};
use crate::error::{EngineError, Result};

/// 기준점 표시 이름.
pub const REFERENCE_LABELS: [&str; REFERENCE_POINT_COUNT] = ["X1", "X2", "Y1", "Y2"];

/// 클릭한 점을 어디에 넣을지 정하는 모드.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickMode {
    /// 축 기준점(X1, X2, Y1, Y2)
    #[default]
    Axis,
    /// 곡선 위의 점
    Curve,
}

/// 디지타이저 작업 상태.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DigitizerSession {
    pub mode: PickMode,
    #[serde(default)]
    pub reference_points: Vec<PixelPoint>,
    #[serde(default)]
    pub reference_values: RealWorldRefs,
    #[serde(default)]
    pub curve_points: Vec<PixelPoint>,
    #[serde(skip)]
    scaled_points: Vec<RealWorldPoint>,
    #[serde(skip)]
    fitted: Option<PolynomialCurve>,
}

impl DigitizerSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_mode(&mut self, mode: PickMode) {
        self.mode = mode;
    }

    /// 현재 모드에 점을 추가한다. 축 모드에서 기준점이 이미 4개면 무시하고 `false`.
    pub fn add_point(&mut self, point: PixelPoint) -> bool {
        match self.mode {
            PickMode::Axis => {
                if self.reference_points.len() >= REFERENCE_POINT_COUNT {
                    return false;
                }
                self.reference_points.push(point);
            }
            PickMode::Curve => self.curve_points.push(point),
        }
        true
    }

    /// 현재 모드의 마지막 점을 지운다.
    pub fn undo_last_point(&mut self) -> Option<PixelPoint> {
        match self.mode {
            PickMode::Axis => self.reference_points.pop(),
            PickMode::Curve => self.curve_points.pop(),
        }
    }

    pub fn set_reference_values(&mut self, x1: f64, x2: f64, y1: f64, y2: f64) {
        self.reference_values = RealWorldRefs::new(x1, x2, y1, y2);
    }

    /// 기준점과 실제값을 초기화한다.
    pub fn reset_scaling(&mut self) {
        self.reference_points.clear();
        self.reference_values = RealWorldRefs::default();
    }

    /// 곡선 점, 변환된 점, 피팅 결과를 초기화한다.
    pub fn reset_curve_points(&mut self) {
        self.curve_points.clear();
        self.scaled_points.clear();
        self.fitted = None;
    }

    /// 기준점이 정확히 4개일 때 곡선 점을 실제 좌표로 변환해 저장한다.
    pub fn scale_points(&mut self) -> Result<&[RealWorldPoint]> {
        if self.reference_points.len() != REFERENCE_POINT_COUNT {
            return Err(EngineError::InvalidCalibration(format!(
                "기준점을 정확히 {REFERENCE_POINT_COUNT}개 선택해야 합니다 (현재 {}개)",
                self.reference_points.len()
            )));
        }
        let scale = AxisScale::derive(&self.reference_points, &self.reference_values)?;
        self.scaled_points = scale.apply_all(&self.curve_points);
        debug!(count = self.scaled_points.len(), "curve points scaled");
        Ok(&self.scaled_points)
    }

    pub fn scaled_points(&self) -> &[RealWorldPoint] {
        &self.scaled_points
    }

    /// 변환된 점으로 곡선을 피팅해 저장한다. 실패하면 이전 결과를 지운다.
    pub fn fit_curve(&mut self, label: &str, bep: Option<f64>) -> Result<&PolynomialCurve> {
        self.fitted = None;
        let curve = fit_curve(label, &self.scaled_points, bep)?;
        Ok(self.fitted.insert(curve))
    }

    pub fn fitted(&self) -> Option<&PolynomialCurve> {
        self.fitted.as_ref()
    }

    /// 기준점 표시 이름과 좌표 (X1, X2, Y1, Y2 순).
    pub fn labeled_reference_points(&self) -> impl Iterator<Item = (&'static str, PixelPoint)> + '_ {
        REFERENCE_LABELS.into_iter().zip(self.reference_points.iter().copied())
    }

    /// 곡선 점 표시 이름(C1, C2, ...)과 좌표.
    pub fn labeled_curve_points(&self) -> impl Iterator<Item = (String, PixelPoint)> + '_ {
        self.curve_points
            .iter()
            .enumerate()
            .map(|(i, p)| (format!("C{}", i + 1), *p))
    }
}

/// 디지타이즈 결과를 담은 TOML 파일 형식.
///
/// ```toml
/// label = "P-1000"
/// bep = 1200.0
/// reference_points = [{ x = 10, y = 0 }, { x = 110, y = 0 }, { x = 0, y = 200 }, { x = 0, y = 100 }]
/// reference_values = { x1 = 0, x2 = 100, y1 = 0, y2 = 50 }
/// curve_points = [{ x = 60, y = 150 }]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitizationFile {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub bep: Option<f64>,
    pub reference_points: Vec<PixelPoint>,
    pub reference_values: RealWorldRefs,
    pub curve_points: Vec<PixelPoint>,
}

impl DigitizationFile {
    /// 파일 내용을 세션으로 옮긴다. 기준점은 정확히 4개여야 한다.
    pub fn into_session(self) -> Result<DigitizerSession> {
        if self.reference_points.len() != REFERENCE_POINT_COUNT {
            return Err(EngineError::InvalidCalibration(format!(
                "기준점을 정확히 {REFERENCE_POINT_COUNT}개 지정해야 합니다 (파일에 {}개)",
                self.reference_points.len()
            )));
        }
        let mut session = DigitizerSession::new();
        for p in self.reference_points {
            session.add_point(p);
        }
        session.reference_values = self.reference_values;
        session.set_mode(PickMode::Curve);
        for p in self.curve_points {
            session.add_point(p);
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digitization_file_parses_integer_coordinates() {
        let text = r#"
            label = "P-1"
            reference_points = [{ x = 10, y = 0 }, { x = 110, y = 0 }, { x = 0, y = 200 }, { x = 0, y = 100 }]
            reference_values = { x1 = 0, x2 = 100, y1 = 0, y2 = 50 }
            curve_points = [{ x = 60, y = 150 }]
        "#;
        let file: DigitizationFile = toml::from_str(text).unwrap();
        assert_eq!(file.bep, None);
        let mut session = file.into_session().unwrap();
        let scaled = session.scale_points().unwrap().to_vec();
        assert_eq!(scaled, vec![RealWorldPoint::new(50.0, 25.0)]);
    }

    #[test]
    fn digitization_file_with_extra_reference_is_rejected() {
        let text = r#"
            reference_points = [{ x = 10, y = 0 }, { x = 110, y = 0 }, { x = 0, y = 200 }, { x = 0, y = 100 }, { x = 5, y = 5 }]
            reference_values = { x1 = 0, x2 = 100, y1 = 0, y2 = 50 }
            curve_points = [{ x = 60, y = 150 }]
        "#;
        let file: DigitizationFile = toml::from_str(text).unwrap();
        assert!(matches!(
            file.into_session(),
            Err(EngineError::InvalidCalibration(_))
        ));
    }

    #[test]
    fn axis_mode_caps_at_four_points() {
        let mut s = DigitizerSession::new();
        for i in 0..4 {
            assert!(s.add_point(PixelPoint::new(i as f64, 0.0)));
        }
        assert!(!s.add_point(PixelPoint::new(9.0, 9.0)));
        assert_eq!(s.reference_points.len(), 4);
    }

    #[test]
    fn undo_follows_current_mode() {
        let mut s = DigitizerSession::new();
        s.add_point(PixelPoint::new(1.0, 1.0));
        s.set_mode(PickMode::Curve);
        s.add_point(PixelPoint::new(2.0, 2.0));
        s.add_point(PixelPoint::new(3.0, 3.0));
        assert_eq!(s.undo_last_point(), Some(PixelPoint::new(3.0, 3.0)));
        assert_eq!(s.curve_points.len(), 1);
        assert_eq!(s.reference_points.len(), 1);
        s.set_mode(PickMode::Axis);
        assert_eq!(s.undo_last_point(), Some(PixelPoint::new(1.0, 1.0)));
        assert_eq!(s.undo_last_point(), None);
    }

    #[test]
    fn scaling_requires_exactly_four_references() {
        let mut s = DigitizerSession::new();
        s.add_point(PixelPoint::new(10.0, 0.0));
        s.set_reference_values(0.0, 100.0, 0.0, 50.0);
        assert!(matches!(
            s.scale_points(),
            Err(EngineError::InvalidCalibration(_))
        ));
    }

    #[test]
    fn labels_follow_pick_order() {
        let mut s = DigitizerSession::new();
        s.add_point(PixelPoint::new(1.0, 2.0));
        s.set_mode(PickMode::Curve);
        s.add_point(PixelPoint::new(3.0, 4.0));
        let refs: Vec<_> = s.labeled_reference_points().collect();
        assert_eq!(refs, vec![("X1", PixelPoint::new(1.0, 2.0))]);
        let curve: Vec<_> = s.labeled_curve_points().collect();
        assert_eq!(curve, vec![("C1".to_string(), PixelPoint::new(3.0, 4.0))]);
    }
}
