//! 전기 수중펌프(ESP) 단수 계산과 주파수별 곡선 계열 생성.
//!
//! 단당 양정은 상사법칙으로 주파수 보정한다: `H_f = H_60(Q) · (f/60)²`.
//! 이때 유량은 보정하지 않은 총 유량 Q를 그대로 쓴다. 엄밀한 상사법칙은
//! 유량도 f/60배로 옮기지만, 단수 계산은 이 관례를 따른다.
//! 반면 곡선 계열(표시용)은 유량을 f/60, 양정을 1/(60/f)²배 하여 그린다.
//! 두 관례는 의도적으로 분리해 둔다.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::curve::{PolynomialCurve, COEFFICIENT_COUNT};
use crate::error::{ensure_finite, EngineError, Result};
use crate::units::{psi_to_head_ft, speed_ratio, BASE_FREQUENCY_HZ};

/// 유정 조건 입력. 입력하지 않은 값은 0으로 둔다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WellParameters {
    /// 오일 생산량 (BOPD)
    pub oil_rate: f64,
    /// 물 생산량 (BWPD)
    pub water_rate: f64,
    /// 펌프 설치 심도 (ft)
    pub pump_depth: f64,
    /// 펌프 흡입 압력 (psi)
    pub intake_pressure: f64,
    /// 튜빙 헤드 압력 (psi)
    pub head_pressure: f64,
}

impl WellParameters {
    /// 총 유량 = 오일 + 물.
    pub fn total_flow_rate(&self) -> f64 {
        self.oil_rate + self.water_rate
    }

    /// 총 동수두(TDH, ft) = 심도 + 헤드압 환산 수두 - 흡입압 환산 수두.
    pub fn total_dynamic_head(&self) -> f64 {
        self.pump_depth + psi_to_head_ft(self.head_pressure) - psi_to_head_ft(self.intake_pressure)
    }

    fn validate(&self) -> Result<()> {
        let fields = [
            ("oil_rate", self.oil_rate),
            ("water_rate", self.water_rate),
            ("pump_depth", self.pump_depth),
            ("intake_pressure", self.intake_pressure),
            ("head_pressure", self.head_pressure),
        ];
        for (name, value) in fields {
            ensure_finite(name, value)?;
            if value < 0.0 {
                return Err(EngineError::InvalidResult(format!(
                    "{name} 값은 음수일 수 없습니다 ({value})"
                )));
            }
        }
        Ok(())
    }
}

/// 사이징 결과. 입력이 바뀌면 통째로 다시 계산한다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingResult {
    pub total_flow_rate: f64,
    pub total_dynamic_head: f64,
    /// 기준 주파수(60 Hz)에서의 단당 양정
    pub head_per_stage: f64,
    /// 운전 주파수로 보정한 단당 양정
    pub adjusted_head_per_stage: f64,
    pub number_of_stages: u32,
    pub frequency: f64,
    pub pump_curve_coefficients: [f64; COEFFICIENT_COUNT],
    pub bep: Option<f64>,
}

/// 기준 주파수에서 유량 `q`의 단당 양정.
pub fn head_per_stage(curve: &PolynomialCurve, q: f64) -> f64 {
    curve.evaluate(q)
}

/// 상사법칙으로 단당 양정을 주파수 보정한다: `H · (f/60)²`.
pub fn affinity_adjusted_head(head_at_base: f64, frequency_hz: f64) -> f64 {
    head_at_base * speed_ratio(frequency_hz).powi(2)
}

/// 곡선, 유정 조건, 운전 주파수로 필요한 펌프 단수를 계산한다.
pub fn size(curve: &PolynomialCurve, well: &WellParameters, frequency_hz: f64) -> Result<SizingResult> {
    well.validate()?;
    ensure_finite("frequency", frequency_hz)?;
    if frequency_hz <= 0.0 {
        return Err(EngineError::InvalidResult(format!(
            "운전 주파수는 0보다 커야 합니다 ({frequency_hz} Hz)"
        )));
    }
    for c in &curve.coefficients {
        ensure_finite("curve coefficient", *c)?;
    }

    let total_flow_rate = well.total_flow_rate();
    let total_dynamic_head = ensure_finite("total_dynamic_head", well.total_dynamic_head())?;
    let head_at_base = ensure_finite("head_per_stage", head_per_stage(curve, total_flow_rate))?;
    let adjusted = ensure_finite(
        "adjusted_head_per_stage",
        affinity_adjusted_head(head_at_base, frequency_hz),
    )?;
    if adjusted <= 0.0 {
        return Err(EngineError::InvalidResult(format!(
            "유량 {total_flow_rate}에서 단당 양정이 0 이하입니다 ({adjusted:.4} ft)"
        )));
    }

    // 흡입압이 심도+헤드압보다 커서 TDH가 음수이면 펌프 단이 필요 없다(0단).
    let stages = (total_dynamic_head / adjusted).ceil().max(0.0);
    ensure_finite("number_of_stages", stages)?;
    if stages > f64::from(u32::MAX) {
        return Err(EngineError::InvalidResult(format!(
            "단수가 유효 범위를 벗어났습니다 ({stages})"
        )));
    }
    let number_of_stages = stages as u32;

    debug!(
        total_flow_rate,
        total_dynamic_head, adjusted, number_of_stages, "pump sized"
    );
    Ok(SizingResult {
        total_flow_rate,
        total_dynamic_head,
        head_per_stage: head_at_base,
        adjusted_head_per_stage: adjusted,
        number_of_stages,
        frequency: frequency_hz,
        pump_curve_coefficients: curve.coefficients,
        bep: curve.bep,
    })
}

/// 곡선 계열 주파수 개수 상한.
pub const MAX_BAND_FREQUENCIES: usize = 1000;

/// 한 주파수에서의 표시용 곡선 (유량, 양정) 점열.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSeries {
    pub frequency_hz: f64,
    /// 선택된 운전 주파수 강조 계열 여부
    pub selected: bool,
    pub points: Vec<(f64, f64)>,
}

/// 곡선 계열 생성 입력.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveFamilyInput {
    /// 그릴 주파수 목록(Hz)
    pub frequencies: Vec<f64>,
    /// 강조할 운전 주파수(Hz)
    pub selected_frequency_hz: f64,
    /// 계열당 점 수 (2 이상)
    pub sample_count: usize,
    /// 양정에 곱할 단수 (보통 직전 사이징 결과)
    pub number_of_stages: u32,
    /// BEP가 없을 때 쓸 최대 기준 유량
    pub fallback_max_flow: Option<f64>,
}

/// 기준 유량 표본의 최대값: BEP가 있으면 2·BEP, 없으면 호출자가 준 값.
fn max_base_flow(curve: &PolynomialCurve, fallback: Option<f64>) -> Result<f64> {
    let max_flow = match (curve.bep, fallback) {
        (Some(bep), _) => 2.0 * bep,
        (None, Some(max)) => max,
        (None, None) => {
            return Err(EngineError::InvalidResult(
                "BEP도 최대 유량도 주어지지 않았습니다".to_string(),
            ))
        }
    };
    ensure_finite("max_flow", max_flow)?;
    if max_flow <= 0.0 {
        return Err(EngineError::InvalidResult(format!(
            "최대 유량은 0보다 커야 합니다 ({max_flow})"
        )));
    }
    Ok(max_flow)
}

fn project_series(
    base: &[(f64, f64)],
    frequency_hz: f64,
    stages: f64,
    selected: bool,
) -> Result<CurveSeries> {
    ensure_finite("frequency", frequency_hz)?;
    if frequency_hz <= 0.0 {
        return Err(EngineError::InvalidResult(format!(
            "표시 주파수는 0보다 커야 합니다 ({frequency_hz} Hz)"
        )));
    }
    let flow_ratio = speed_ratio(frequency_hz);
    let head_divisor = (BASE_FREQUENCY_HZ / frequency_hz).powi(2);
    let points = base
        .iter()
        .map(|(q, h)| (q * flow_ratio, h / head_divisor * stages))
        .collect();
    Ok(CurveSeries {
        frequency_hz,
        selected,
        points,
    })
}

/// 주파수별 표시용 곡선 계열을 만든다.
///
/// 요청한 주파수 순서대로 계열을 만들고, 선택 주파수 계열을 마지막에
/// `selected = true`로 한 번 더 붙인다. 사이징 계산에는 영향을 주지 않는다.
pub fn sample_curve_family(curve: &PolynomialCurve, input: &CurveFamilyInput) -> Result<Vec<CurveSeries>> {
    if input.sample_count < 2 {
        return Err(EngineError::InvalidResult(format!(
            "표본 수는 2 이상이어야 합니다 ({})",
            input.sample_count
        )));
    }
    let max_flow = max_base_flow(curve, input.fallback_max_flow)?;
    let last = (input.sample_count - 1) as f64;
    let base: Vec<(f64, f64)> = (0..input.sample_count)
        .map(|i| {
            let q = i as f64 / last * max_flow;
            (q, curve.evaluate(q))
        })
        .collect();
    if base.iter().any(|(_, h)| !h.is_finite()) {
        return Err(EngineError::InvalidResult(
            "곡선 양정이 유한하지 않습니다".to_string(),
        ));
    }

    let stages = f64::from(input.number_of_stages);
    let mut family = Vec::with_capacity(input.frequencies.len() + 1);
    for f in &input.frequencies {
        family.push(project_series(&base, *f, stages, false)?);
    }
    family.push(project_series(&base, input.selected_frequency_hz, stages, true)?);
    Ok(family)
}

/// 표시용 주파수 목록 `min, min+step, ... <= max`.
pub fn frequency_band(min_hz: f64, max_hz: f64, step_hz: f64) -> Result<Vec<f64>> {
    let count = frequency_band_len(min_hz, max_hz, step_hz)?;
    Ok((0..count).map(|i| min_hz + i as f64 * step_hz).collect())
}

/// 표시용 주파수 목록의 길이. 범위가 잘못되었거나
/// [`MAX_BAND_FREQUENCIES`]를 넘으면 `InvalidResult`.
pub fn frequency_band_len(min_hz: f64, max_hz: f64, step_hz: f64) -> Result<usize> {
    if !(min_hz.is_finite() && max_hz.is_finite() && step_hz.is_finite()) || step_hz <= 0.0 || min_hz > max_hz {
        return Err(EngineError::InvalidResult(format!(
            "주파수 범위가 잘못되었습니다 ({min_hz}..{max_hz}, step {step_hz})"
        )));
    }
    let steps = ((max_hz - min_hz) / step_hz + 1e-9).floor();
    if steps >= MAX_BAND_FREQUENCIES as f64 {
        return Err(EngineError::InvalidResult(format!(
            "표시 주파수가 너무 많습니다 ({min_hz}..{max_hz}, step {step_hz}; 최대 {MAX_BAND_FREQUENCIES}개)"
        )));
    }
    Ok(steps as usize + 1)
}

/// 차트 y축 상한: 모든 계열 양정 최대값 × 1.1.
pub fn display_head_limit(family: &[CurveSeries]) -> Option<f64> {
    family
        .iter()
        .flat_map(|s| s.points.iter().map(|(_, h)| *h))
        .fold(None, |acc: Option<f64>, h| Some(acc.map_or(h, |a| a.max(h))))
        .map(|m| m * 1.1)
}
