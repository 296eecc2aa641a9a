use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use esp_pump_designer::app::{self, AppError, SizingRequest};
use esp_pump_designer::config::{self, DEFAULT_CONFIG_PATH};
use esp_pump_designer::curve::catalog;
use esp_pump_designer::sizing::WellParameters;
use esp_pump_designer::ui_cli;

/// 펌프 곡선 디지타이즈와 ESP 단수 계산 도구.
#[derive(Debug, Parser)]
#[command(name = "esp_pump_designer", version, about)]
struct Cli {
    /// 설정 파일 경로
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// 로그 레벨 (RUST_LOG가 있으면 그쪽이 우선)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 디지타이즈 파일(.toml)을 보정·피팅한다
    Fit {
        /// 디지타이즈 파일
        #[arg(long)]
        input: PathBuf,
        /// 결과를 추가할 카탈로그 CSV
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// 카탈로그 곡선으로 필요 단수를 계산한다
    Size(SizeArgs),
    /// 카탈로그 곡선 목록을 출력한다
    Catalog {
        /// 카탈로그 CSV (기본: 설정값)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct SizeArgs {
    /// 펌프 이름 (기본: 카탈로그 첫 번째)
    #[arg(long)]
    pump: Option<String>,
    /// 카탈로그 CSV (기본: 설정값)
    #[arg(long)]
    catalog: Option<PathBuf>,
    #[arg(long, default_value_t = 0.0)]
    oil_rate: f64,
    #[arg(long, default_value_t = 0.0)]
    water_rate: f64,
    #[arg(long, default_value_t = 0.0)]
    pump_depth: f64,
    #[arg(long, default_value_t = 0.0)]
    intake_pressure: f64,
    #[arg(long, default_value_t = 0.0)]
    head_pressure: f64,
    /// 운전 주파수 (기본: 설정값)
    #[arg(long)]
    frequency: Option<f64>,
    /// 주파수별 곡선 계열을 계산하고 점을 모두 출력
    #[arg(long)]
    family: bool,
}

/// 프로그램의 엔트리 포인트. 설정을 로드한 뒤 하위 명령 또는 대화형 메뉴를 실행한다.
fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = try_run(cli) {
        eprintln!("오류: {err}");
        std::process::exit(1);
    }
}

fn try_run(cli: Cli) -> Result<(), AppError> {
    let mut cfg = config::load_or_default(&cli.config)?;
    match cli.command {
        None => app::run(&mut cfg, &cli.config)?,
        Some(Command::Fit { input, export }) => {
            let outcome = app::fit_from_file(&input, export.as_deref())?;
            ui_cli::print_fit(&outcome);
        }
        Some(Command::Catalog { catalog: path }) => {
            let path = path.unwrap_or_else(|| cfg.catalog_path.clone());
            let curves = catalog::load_catalog(&path)?;
            ui_cli::print_catalog(&curves);
        }
        Some(Command::Size(args)) => {
            let path = args.catalog.unwrap_or_else(|| cfg.catalog_path.clone());
            let curves = catalog::load_catalog(&path)?;
            let request = SizingRequest {
                pump: args.pump,
                well: WellParameters {
                    oil_rate: args.oil_rate,
                    water_rate: args.water_rate,
                    pump_depth: args.pump_depth,
                    intake_pressure: args.intake_pressure,
                    head_pressure: args.head_pressure,
                },
                frequency_hz: args.frequency.unwrap_or(cfg.default_frequency_hz),
                with_family: args.family,
            };
            let report = app::size_from_catalog(&cfg, &curves, &request)?;
            ui_cli::print_sizing(&report, args.family);
        }
    }
    Ok(())
}
