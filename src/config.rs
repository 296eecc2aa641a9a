use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::sizing;
use crate::units::BASE_FREQUENCY_HZ;

/// 기본 설정 파일 이름.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 주파수 범위(Hz).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRange {
    pub min_hz: f64,
    pub max_hz: f64,
}

/// 곡선 계열을 그릴 주파수 간격 설정.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBand {
    pub min_hz: f64,
    pub max_hz: f64,
    pub step_hz: f64,
}

impl Default for FrequencyBand {
    fn default() -> Self {
        Self {
            min_hz: 45.0,
            max_hz: 65.0,
            step_hz: 5.0,
        }
    }
}

/// 애플리케이션 설정을 표현한다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 펌프 곡선 카탈로그 CSV 경로
    pub catalog_path: PathBuf,
    /// 운전 주파수 기본값(Hz)
    pub default_frequency_hz: f64,
    /// 계열당 표본 수
    pub sample_count: usize,
    /// BEP가 없는 곡선의 표시용 최대 유량
    pub fallback_max_flow: f64,
    /// 운전 주파수 허용 범위
    pub slider: FrequencyRange,
    /// 곡선 계열 주파수
    pub frequency_band: FrequencyBand,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("pump_curves.csv"),
            default_frequency_hz: BASE_FREQUENCY_HZ,
            sample_count: 200,
            fallback_max_flow: 5000.0,
            slider: FrequencyRange {
                min_hz: 45.0,
                max_hz: 65.0,
            },
            frequency_band: FrequencyBand::default(),
        }
    }
}

/// 설정 로드/저장 시 발생 가능한 오류를 표현한다.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 파일 입출력 오류
    #[error("파일 입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    /// TOML 역직렬화 오류
    #[error("설정 파싱 오류: {0}")]
    Serde(#[from] toml::de::Error),
    /// TOML 직렬화 오류
    #[error("설정 직렬화 오류: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// 값 범위 오류
    #[error("설정 값 오류: {0}")]
    Invalid(String),
}

impl Config {
    /// 값 범위를 검사한다.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let band = &self.frequency_band;
        if !(band.min_hz > 0.0 && band.min_hz <= band.max_hz) {
            return Err(ConfigError::Invalid(format!(
                "frequency_band 범위가 잘못되었습니다 ({}..{})",
                band.min_hz, band.max_hz
            )));
        }
        if !(band.step_hz > 0.0) {
            return Err(ConfigError::Invalid("frequency_band.step_hz는 0보다 커야 합니다".into()));
        }
        sizing::frequency_band_len(band.min_hz, band.max_hz, band.step_hz)
            .map_err(|e| ConfigError::Invalid(format!("frequency_band: {e}")))?;
        if !(self.slider.min_hz > 0.0 && self.slider.min_hz <= self.slider.max_hz) {
            return Err(ConfigError::Invalid(format!(
                "slider 범위가 잘못되었습니다 ({}..{})",
                self.slider.min_hz, self.slider.max_hz
            )));
        }
        if !self.frequency_allowed(self.default_frequency_hz) {
            return Err(ConfigError::Invalid(format!(
                "default_frequency_hz {}가 slider 범위 밖입니다",
                self.default_frequency_hz
            )));
        }
        if self.sample_count < 2 {
            return Err(ConfigError::Invalid("sample_count는 2 이상이어야 합니다".into()));
        }
        if !(self.fallback_max_flow > 0.0) {
            return Err(ConfigError::Invalid("fallback_max_flow는 0보다 커야 합니다".into()));
        }
        Ok(())
    }

    /// 운전 주파수가 허용 범위 안인지 확인한다.
    pub fn frequency_allowed(&self, hz: f64) -> bool {
        hz >= self.slider.min_hz && hz <= self.slider.max_hz
    }

    /// 설정을 파일에 저장한다.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// 설정 파일을 로드하거나 없으면 기본 설정을 생성한다.
pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        let content = fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&content)?;
        cfg.validate()?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(cfg)
    } else {
        let cfg = Config::default();
        cfg.save(path)?;
        tracing::info!(path = %path.display(), "default config created");
        Ok(cfg)
    }
}
