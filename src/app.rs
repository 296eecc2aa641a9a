use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::calibration::RealWorldPoint;
use crate::config::{Config, ConfigError};
use crate::curve::catalog::{self, CatalogError};
use crate::curve::PolynomialCurve;
use crate::digitizer::DigitizationFile;
use crate::error::EngineError;
use crate::sizing::{self, CurveFamilyInput, CurveSeries, SizingResult, WellParameters};
use crate::ui_cli::{self, MenuChoice};

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 파일 입출력 오류
    #[error("입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    /// 설정 저장/로드 오류
    #[error("설정 오류: {0}")]
    Config(#[from] ConfigError),
    /// 보정/피팅/사이징 계산 오류
    #[error("계산 오류: {0}")]
    Engine(#[from] EngineError),
    /// 카탈로그 읽기/쓰기 오류
    #[error("카탈로그 오류: {0}")]
    Catalog(#[from] CatalogError),
    /// 디지타이즈 파일 파싱 오류
    #[error("디지타이즈 파일 오류: {0}")]
    Digitization(#[from] toml::de::Error),
    /// 허용 범위를 벗어난 운전 주파수
    #[error("운전 주파수 {hz} Hz가 허용 범위({min}~{max} Hz)를 벗어났습니다")]
    FrequencyOutOfRange { hz: f64, min: f64, max: f64 },
    /// 곡선 이름 누락
    #[error("카탈로그로 내보내려면 곡선 이름이 필요합니다")]
    MissingLabel,
}

/// 디지타이즈 파일 처리 결과.
#[derive(Debug, Clone)]
pub struct FitOutcome {
    pub scaled_points: Vec<RealWorldPoint>,
    pub curve: PolynomialCurve,
}

/// 디지타이즈 파일을 읽어 점을 변환하고 곡선을 피팅한다.
/// `export`가 주어지면 카탈로그 CSV에 행을 추가한다.
pub fn fit_from_file(input: &Path, export: Option<&Path>) -> Result<FitOutcome, AppError> {
    let content = fs::read_to_string(input)?;
    let file: DigitizationFile = toml::from_str(&content)?;
    let label = file.label.clone();
    let bep = file.bep;
    if export.is_some() && label.trim().is_empty() {
        return Err(AppError::MissingLabel);
    }

    let mut session = file.into_session()?;
    let scaled_points = session.scale_points()?.to_vec();
    let curve = session.fit_curve(&label, bep)?.clone();
    info!(label = %curve.label, points = scaled_points.len(), "curve fitted");

    if let Some(path) = export {
        catalog::append_to_catalog(path, &curve)?;
    }
    Ok(FitOutcome {
        scaled_points,
        curve,
    })
}

/// 사이징 요청.
#[derive(Debug, Clone)]
pub struct SizingRequest {
    /// 카탈로그 곡선 이름. 없으면 첫 번째 항목.
    pub pump: Option<String>,
    pub well: WellParameters,
    pub frequency_hz: f64,
    /// 주파수별 곡선 계열도 계산할지 여부
    pub with_family: bool,
}

/// 사이징 결과 묶음.
#[derive(Debug, Clone)]
pub struct SizingReport {
    pub curve: PolynomialCurve,
    pub result: SizingResult,
    pub family: Vec<CurveSeries>,
    pub head_limit: Option<f64>,
    /// 곡선 계열을 만들지 못한 이유. 사이징 결과는 그대로 유효하다.
    pub family_error: Option<EngineError>,
}

/// 카탈로그 곡선으로 사이징한다.
pub fn size_from_catalog(
    cfg: &Config,
    curves: &[PolynomialCurve],
    request: &SizingRequest,
) -> Result<SizingReport, AppError> {
    if !cfg.frequency_allowed(request.frequency_hz) {
        return Err(AppError::FrequencyOutOfRange {
            hz: request.frequency_hz,
            min: cfg.slider.min_hz,
            max: cfg.slider.max_hz,
        });
    }
    let curve = catalog::select_curve(curves, request.pump.as_deref())?.clone();
    let result = sizing::size(&curve, &request.well, request.frequency_hz)?;
    info!(
        pump = %curve.label,
        stages = result.number_of_stages,
        frequency = result.frequency,
        "sizing complete"
    );

    let (family, family_error) = if request.with_family {
        match curve_family(cfg, &curve, &result, request.frequency_hz) {
            Ok(family) => (family, None),
            Err(err) => {
                warn!(pump = %curve.label, error = %err, "curve family skipped");
                (Vec::new(), Some(err))
            }
        }
    } else {
        (Vec::new(), None)
    };
    let head_limit = sizing::display_head_limit(&family);
    Ok(SizingReport {
        curve,
        result,
        family,
        head_limit,
        family_error,
    })
}

fn curve_family(
    cfg: &Config,
    curve: &PolynomialCurve,
    result: &SizingResult,
    frequency_hz: f64,
) -> Result<Vec<CurveSeries>, EngineError> {
    let band = cfg.frequency_band;
    let input = CurveFamilyInput {
        frequencies: sizing::frequency_band(band.min_hz, band.max_hz, band.step_hz)?,
        selected_frequency_hz: frequency_hz,
        sample_count: cfg.sample_count,
        number_of_stages: result.number_of_stages,
        fallback_max_flow: Some(cfg.fallback_max_flow),
    };
    sizing::sample_curve_family(curve, &input)
}

/// 대화형 메뉴 루프를 실행한다.
pub fn run(config: &mut Config, config_path: &Path) -> Result<(), AppError> {
    loop {
        let outcome = match ui_cli::main_menu()? {
            MenuChoice::PumpSizing => ui_cli::handle_sizing(config),
            MenuChoice::CurveFit => ui_cli::handle_curve_fit(),
            MenuChoice::Catalog => ui_cli::handle_catalog(config),
            MenuChoice::Settings => {
                ui_cli::handle_settings(config)?;
                config.save(config_path).map_err(AppError::from)
            }
            MenuChoice::Exit => {
                config.save(config_path)?;
                println!("프로그램을 종료합니다.");
                break;
            }
        };
        // 계산 오류는 메뉴로 돌아가 다시 입력받는다.
        match outcome {
            Err(AppError::Io(e)) => return Err(AppError::Io(e)),
            Err(e) => println!("오류: {e}"),
            Ok(()) => {}
        }
    }
    Ok(())
}
