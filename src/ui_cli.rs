use std::io::{self, Write};
use std::path::PathBuf;

use crate::app::{self, AppError, FitOutcome, SizingReport, SizingRequest};
use crate::config::Config;
use crate::curve::{catalog, PolynomialCurve};
use crate::sizing::WellParameters;

/// 메인 메뉴 선택지를 표현한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    PumpSizing,
    CurveFit,
    Catalog,
    Settings,
    Exit,
}

/// 메인 메뉴를 표시하고 선택값을 반환한다.
pub fn main_menu() -> Result<MenuChoice, AppError> {
    println!("\n=== ESP Pump Designer ===");
    println!("1) 펌프 사이징");
    println!("2) 펌프 곡선 피팅 (디지타이즈 파일)");
    println!("3) 카탈로그 보기");
    println!("4) 설정");
    println!("0) 종료");
    loop {
        let sel = read_line("메뉴 선택: ")?;
        match sel.trim() {
            "1" => return Ok(MenuChoice::PumpSizing),
            "2" => return Ok(MenuChoice::CurveFit),
            "3" => return Ok(MenuChoice::Catalog),
            "4" => return Ok(MenuChoice::Settings),
            "0" => return Ok(MenuChoice::Exit),
            _ => println!("잘못된 입력입니다. 다시 선택하세요."),
        }
    }
}

/// 펌프 사이징 메뉴를 처리한다.
pub fn handle_sizing(cfg: &Config) -> Result<(), AppError> {
    println!("\n-- 펌프 사이징 --");
    let curves = catalog::load_catalog(&cfg.catalog_path)?;
    print_catalog(&curves);
    let name = read_line("펌프 선택 (이름, 엔터=첫 번째): ")?;
    let name = name.trim();
    println!("빈 값은 0으로 계산합니다.");
    let well = WellParameters {
        oil_rate: read_f64_or_zero("오일 생산량 (BOPD): ")?,
        water_rate: read_f64_or_zero("물 생산량 (BWPD): ")?,
        pump_depth: read_f64_or_zero("펌프 심도 (ft): ")?,
        intake_pressure: read_f64_or_zero("펌프 흡입 압력 (psi): ")?,
        head_pressure: read_f64_or_zero("튜빙 헤드 압력 (psi): ")?,
    };
    let prompt = format!(
        "운전 주파수 [{}~{} Hz] (엔터={}): ",
        cfg.slider.min_hz, cfg.slider.max_hz, cfg.default_frequency_hz
    );
    let frequency_hz = read_optional_f64(&prompt)?.unwrap_or(cfg.default_frequency_hz);
    let request = SizingRequest {
        pump: (!name.is_empty()).then(|| name.to_string()),
        well,
        frequency_hz,
        with_family: true,
    };
    let report = app::size_from_catalog(cfg, &curves, &request)?;
    print_sizing(&report, false);
    Ok(())
}

/// 디지타이즈 파일 피팅 메뉴를 처리한다.
pub fn handle_curve_fit() -> Result<(), AppError> {
    println!("\n-- 펌프 곡선 피팅 --");
    let input = read_line("디지타이즈 파일 경로 (.toml): ")?;
    let export = read_line("내보낼 카탈로그 CSV 경로 (엔터=내보내지 않음): ")?;
    let export = export.trim();
    let export_path = (!export.is_empty()).then(|| PathBuf::from(export));
    let outcome = app::fit_from_file(&PathBuf::from(input.trim()), export_path.as_deref())?;
    print_fit(&outcome);
    if let Some(path) = export_path {
        println!("카탈로그에 추가했습니다: {}", path.display());
    }
    Ok(())
}

/// 카탈로그 보기 메뉴를 처리한다.
pub fn handle_catalog(cfg: &Config) -> Result<(), AppError> {
    println!("\n-- 카탈로그 ({}) --", cfg.catalog_path.display());
    let curves = catalog::load_catalog(&cfg.catalog_path)?;
    print_catalog(&curves);
    Ok(())
}

/// 설정 메뉴를 처리한다.
pub fn handle_settings(cfg: &mut Config) -> Result<(), AppError> {
    println!("\n-- 설정 --");
    println!("카탈로그 경로: {}", cfg.catalog_path.display());
    println!("기본 운전 주파수: {} Hz", cfg.default_frequency_hz);
    println!("1) 카탈로그 경로 변경  2) 기본 운전 주파수 변경");
    let sel = read_line("변경할 번호(취소하려면 엔터): ")?;
    match sel.trim() {
        "" => {}
        "1" => {
            let path = read_line("새 카탈로그 경로: ")?;
            cfg.catalog_path = PathBuf::from(path.trim());
        }
        "2" => {
            let hz = read_f64("새 기본 주파수 (Hz): ")?;
            if cfg.frequency_allowed(hz) {
                cfg.default_frequency_hz = hz;
            } else {
                println!("허용 범위 밖이므로 변경하지 않습니다.");
            }
        }
        _ => println!("잘못된 입력이므로 변경하지 않습니다."),
    }
    Ok(())
}

/// 카탈로그 목록을 출력한다.
pub fn print_catalog(curves: &[PolynomialCurve]) {
    if curves.is_empty() {
        println!("(카탈로그가 비어 있습니다)");
        return;
    }
    for curve in curves {
        let bep = curve
            .bep
            .map(|b| format!("{b:.0}"))
            .unwrap_or_else(|| "-".to_string());
        println!("{}  BEP={bep}", curve.label);
        println!("    H(Q) = {curve}");
    }
}

/// 피팅 결과를 출력한다.
pub fn print_fit(outcome: &FitOutcome) {
    println!("{:>14} {:>14}", "X (Flow Rate)", "Y (Head)");
    for p in &outcome.scaled_points {
        println!("{:>14.2} {:>14.2}", p.flow, p.head);
    }
    if !outcome.curve.label.is_empty() {
        println!("곡선 이름: {}", outcome.curve.label);
    }
    println!("다항식 계수: {}", outcome.curve);
}

/// 사이징 결과를 출력한다. `full_family`가 참이면 계열 점을 모두 출력한다.
pub fn print_sizing(report: &SizingReport, full_family: bool) {
    let r = &report.result;
    println!("펌프: {}", report.curve.label);
    println!("총 유량: {:.0} BOPD", r.total_flow_rate);
    println!("총 동수두(TDH): {:.2} ft", r.total_dynamic_head);
    println!("보정 단당 양정: {:.2} ft", r.adjusted_head_per_stage);
    println!("필요 단수: {}", r.number_of_stages);
    println!("운전 주파수: {} Hz", r.frequency);
    if let Some(err) = &report.family_error {
        println!("곡선 계열을 그리지 못했습니다: {err}");
    }
    if report.family.is_empty() {
        return;
    }
    if let Some(limit) = report.head_limit {
        println!("차트 양정 상한: {limit:.1} ft");
    }
    for series in &report.family {
        let tag = if series.selected { " (선택)" } else { "" };
        let (q_max, h_first) = match (series.points.last(), series.points.first()) {
            (Some(last), Some(first)) => (last.0, first.1),
            _ => continue,
        };
        println!(
            "{} Hz{tag}: 최대 유량 {q_max:.0}, 체절 양정 {h_first:.1} ft",
            series.frequency_hz
        );
        if full_family {
            for (q, h) in &series.points {
                println!("    {q:.2},{h:.2}");
            }
        }
    }
}

fn read_line(prompt: &str) -> Result<String, AppError> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().read_line(&mut buf)?;
    Ok(buf)
}

fn read_f64(prompt: &str) -> Result<f64, AppError> {
    loop {
        let s = read_line(prompt)?;
        match s.trim().parse::<f64>() {
            Ok(v) => return Ok(v),
            Err(_) => println!("숫자를 입력하세요."),
        }
    }
}

fn read_optional_f64(prompt: &str) -> Result<Option<f64>, AppError> {
    loop {
        let s = read_line(prompt)?;
        let s = s.trim();
        if s.is_empty() {
            return Ok(None);
        }
        match s.parse::<f64>() {
            Ok(v) => return Ok(Some(v)),
            Err(_) => println!("숫자를 입력하세요."),
        }
    }
}

fn read_f64_or_zero(prompt: &str) -> Result<f64, AppError> {
    Ok(read_optional_f64(prompt)?.unwrap_or(0.0))
}
