//! 2점 축 보정 회귀 테스트.
use esp_pump_designer::calibration::{
    apply_scale, derive_scale, AxisScale, PixelPoint, RealWorldPoint, RealWorldRefs,
};
use esp_pump_designer::EngineError;

fn assert_close(label: &str, actual: f64, expected: f64, tol: f64) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tol * expected.abs().max(1.0),
        "{label} expected {expected:.9} got {actual:.9} (diff {diff:.3e})"
    );
}

fn chart_points() -> Vec<PixelPoint> {
    vec![
        PixelPoint::new(10.0, 0.0),
        PixelPoint::new(110.0, 0.0),
        PixelPoint::new(0.0, 200.0),
        PixelPoint::new(0.0, 100.0),
    ]
}

#[test]
fn reference_chart_scales_and_maps_curve_point() {
    let refs = RealWorldRefs::new(0.0, 100.0, 0.0, 50.0);
    let scale = derive_scale(&chart_points(), &refs).expect("scale");
    assert_eq!(scale.scale_x, 1.0);
    assert_eq!(scale.scale_y, -0.5);
    let p = apply_scale(&scale, PixelPoint::new(60.0, 150.0));
    assert_eq!(p, RealWorldPoint::new(50.0, 25.0));
}

#[test]
fn reference_points_map_back_to_their_values() {
    // 여러 아핀 대응에서 기준점 자신이 입력한 실제값으로 돌아와야 한다.
    let cases = [
        (
            [(37.0, 412.0), (655.0, 412.0), (52.0, 588.0), (52.0, 44.0)],
            (0.0, 5000.0, 0.0, 120.0),
        ),
        (
            [(100.0, 10.0), (20.0, 10.0), (5.0, 30.0), (5.0, 330.0)],
            (250.0, -10.0, 1.5, 9.75),
        ),
        (
            [(0.5, 0.0), (1000.25, 0.0), (0.0, 0.0), (0.0, 768.0)],
            (1e3, 1e6, 1e-3, 7.0),
        ),
    ];
    for (pts, (x1, x2, y1, y2)) in cases {
        let pixels: Vec<PixelPoint> = pts.iter().map(|(x, y)| PixelPoint::new(*x, *y)).collect();
        let scale = AxisScale::derive(&pixels, &RealWorldRefs::new(x1, x2, y1, y2)).expect("scale");
        assert_close("x1", scale.apply(pixels[0]).flow, x1, 1e-12);
        assert_close("x2", scale.apply(pixels[1]).flow, x2, 1e-12);
        assert_close("y1", scale.apply(pixels[2]).head, y1, 1e-12);
        assert_close("y2", scale.apply(pixels[3]).head, y2, 1e-12);
    }
}

#[test]
fn derivation_is_deterministic() {
    let refs = RealWorldRefs::new(0.0, 3000.0, 0.0, 80.0);
    let pts = vec![
        PixelPoint::new(41.3, 500.2),
        PixelPoint::new(812.9, 500.2),
        PixelPoint::new(41.3, 498.7),
        PixelPoint::new(41.3, 22.1),
    ];
    let a = derive_scale(&pts, &refs).expect("a");
    let b = derive_scale(&pts, &refs).expect("b");
    assert_eq!(a, b);
    let curve = [PixelPoint::new(100.0, 300.0), PixelPoint::new(400.0, 250.0)];
    assert_eq!(a.apply_all(&curve), b.apply_all(&curve));
}

#[test]
fn fewer_than_four_points_is_invalid() {
    let refs = RealWorldRefs::new(0.0, 100.0, 0.0, 50.0);
    let err = derive_scale(&chart_points()[..3], &refs).unwrap_err();
    assert!(matches!(err, EngineError::InvalidCalibration(_)));
}

#[test]
fn degenerate_axes_are_invalid() {
    let refs = RealWorldRefs::new(0.0, 100.0, 0.0, 50.0);

    let mut same_x = chart_points();
    same_x[1].x = same_x[0].x;
    assert!(matches!(
        derive_scale(&same_x, &refs),
        Err(EngineError::InvalidCalibration(_))
    ));

    let mut same_y = chart_points();
    same_y[3].y = same_y[2].y;
    assert!(matches!(
        derive_scale(&same_y, &refs),
        Err(EngineError::InvalidCalibration(_))
    ));
}

#[test]
fn missing_real_world_value_is_invalid() {
    let refs = RealWorldRefs {
        y2: None,
        ..RealWorldRefs::new(0.0, 100.0, 0.0, 50.0)
    };
    assert!(matches!(
        derive_scale(&chart_points(), &refs),
        Err(EngineError::InvalidCalibration(_))
    ));
}
