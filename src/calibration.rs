//! 이미지 픽셀 좌표를 실제 (유량, 양정) 좌표로 바꾸는 2점 선형 축 보정.
//!
//! 기준점 4개는 (X축 기준 1, X축 기준 2, Y축 기준 1, Y축 기준 2) 순서로 받는다.
//! 픽셀 Y축은 아래로 증가하지만 부호를 가정하지 않는다. 배율의 부호는
//! 오로지 두 기준점과 실제값으로부터 정해진다.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, Result};

/// 보정에 필요한 기준점 수.
pub const REFERENCE_POINT_COUNT: usize = 4;

/// 이미지 픽셀 좌표(원점 좌상단, y는 아래로 증가).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 실제 단위 좌표. flow=유량, head=양정.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RealWorldPoint {
    pub flow: f64,
    pub head: f64,
}

impl RealWorldPoint {
    pub const fn new(flow: f64, head: f64) -> Self {
        Self { flow, head }
    }
}

/// 기준점에 대응하는 실제값 (x1, x2, y1, y2).
///
/// 값이 비어 있을 수 있으므로 각 항목은 `Option`이다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RealWorldRefs {
    pub x1: Option<f64>,
    pub x2: Option<f64>,
    pub y1: Option<f64>,
    pub y2: Option<f64>,
}

impl RealWorldRefs {
    pub const fn new(x1: f64, x2: f64, y1: f64, y2: f64) -> Self {
        Self {
            x1: Some(x1),
            x2: Some(x2),
            y1: Some(y1),
            y2: Some(y2),
        }
    }
}

/// 기준점으로부터 유도된 축 변환.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisScale {
    /// X축 기준 1의 픽셀 x
    pub origin_x: f64,
    /// Y축 기준 1의 픽셀 y
    pub origin_y: f64,
    /// X축 기준 1의 실제값
    pub origin_flow: f64,
    /// Y축 기준 1의 실제값
    pub origin_head: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

fn required(name: &str, value: Option<f64>) -> Result<f64> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(EngineError::InvalidCalibration(format!(
            "{name} 값이 숫자가 아닙니다 ({v})"
        ))),
        None => Err(EngineError::InvalidCalibration(format!(
            "{name} 실제값이 입력되지 않았습니다"
        ))),
    }
}

impl AxisScale {
    /// 기준점 4개와 실제값으로 축 변환을 유도한다.
    ///
    /// `scale_x = (x2 - x1) / (p2.x - p1.x)`, `scale_y = (y2 - y1) / (p4.y - p3.y)`
    pub fn derive(points: &[PixelPoint], refs: &RealWorldRefs) -> Result<Self> {
        if points.len() < REFERENCE_POINT_COUNT {
            return Err(EngineError::InvalidCalibration(format!(
                "기준점 {REFERENCE_POINT_COUNT}개가 필요합니다 (현재 {}개)",
                points.len()
            )));
        }
        let (p1, p2, p3, p4) = (points[0], points[1], points[2], points[3]);
        if [p1, p2, p3, p4]
            .iter()
            .any(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(EngineError::InvalidCalibration(
                "기준점 좌표가 유한하지 않습니다".to_string(),
            ));
        }

        let x1 = required("X1", refs.x1)?;
        let x2 = required("X2", refs.x2)?;
        let y1 = required("Y1", refs.y1)?;
        let y2 = required("Y2", refs.y2)?;

        let dx = p2.x - p1.x;
        if dx == 0.0 {
            return Err(EngineError::InvalidCalibration(
                "X축 기준점 두 개의 픽셀 x가 같습니다".to_string(),
            ));
        }
        let dy = p4.y - p3.y;
        if dy == 0.0 {
            return Err(EngineError::InvalidCalibration(
                "Y축 기준점 두 개의 픽셀 y가 같습니다".to_string(),
            ));
        }

        let scale = Self {
            origin_x: p1.x,
            origin_y: p3.y,
            origin_flow: x1,
            origin_head: y1,
            scale_x: (x2 - x1) / dx,
            scale_y: (y2 - y1) / dy,
        };
        if !scale.scale_x.is_finite() || !scale.scale_y.is_finite() {
            return Err(EngineError::InvalidCalibration(
                "축 배율이 유한하지 않습니다".to_string(),
            ));
        }
        debug!(
            scale_x = scale.scale_x,
            scale_y = scale.scale_y,
            "axis scale derived"
        );
        Ok(scale)
    }

    /// 픽셀 좌표 하나를 실제 좌표로 변환한다.
    pub fn apply(&self, point: PixelPoint) -> RealWorldPoint {
        RealWorldPoint {
            flow: self.origin_flow + (point.x - self.origin_x) * self.scale_x,
            head: self.origin_head + (point.y - self.origin_y) * self.scale_y,
        }
    }

    /// 픽셀 좌표 목록을 순서대로 변환한다.
    pub fn apply_all(&self, points: &[PixelPoint]) -> Vec<RealWorldPoint> {
        points.iter().map(|p| self.apply(*p)).collect()
    }
}

/// [`AxisScale::derive`]의 함수형 별칭.
pub fn derive_scale(points: &[PixelPoint], refs: &RealWorldRefs) -> Result<AxisScale> {
    AxisScale::derive(points, refs)
}

/// [`AxisScale::apply`]의 함수형 별칭.
pub fn apply_scale(scale: &AxisScale, point: PixelPoint) -> RealWorldPoint {
    scale.apply(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs_points() -> [PixelPoint; 4] {
        [
            PixelPoint::new(10.0, 0.0),
            PixelPoint::new(110.0, 0.0),
            PixelPoint::new(0.0, 200.0),
            PixelPoint::new(0.0, 100.0),
        ]
    }

    #[test]
    fn missing_reference_value_is_rejected() {
        let refs = RealWorldRefs {
            x2: None,
            ..RealWorldRefs::new(0.0, 100.0, 0.0, 50.0)
        };
        let err = AxisScale::derive(&refs_points(), &refs).unwrap_err();
        assert!(matches!(err, EngineError::InvalidCalibration(_)));
    }

    #[test]
    fn nan_reference_value_is_rejected() {
        let refs = RealWorldRefs::new(0.0, f64::NAN, 0.0, 50.0);
        assert!(AxisScale::derive(&refs_points(), &refs).is_err());
    }

    #[test]
    fn extra_points_beyond_four_are_ignored() {
        let mut pts = refs_points().to_vec();
        pts.push(PixelPoint::new(999.0, 999.0));
        let refs = RealWorldRefs::new(0.0, 100.0, 0.0, 50.0);
        let a = AxisScale::derive(&pts, &refs).unwrap();
        let b = AxisScale::derive(&refs_points(), &refs).unwrap();
        assert_eq!(a, b);
    }
}
