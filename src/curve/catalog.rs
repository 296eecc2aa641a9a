//! 펌프 곡선 카탈로그 CSV 읽기/쓰기.
//!
//! 형식: `PumpName,Coefficient5,Coefficient4,Coefficient3,Coefficient2,Coefficient1,Coefficient0[,BEP]`
//! 헤더 행이 반드시 있어야 하며, 계수는 소수점 아래 5자리 지수 표기로 쓴다.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

use tracing::{debug, info};

use super::{PolynomialCurve, COEFFICIENT_COUNT};

pub const NAME_COLUMN: &str = "PumpName";
pub const BEP_COLUMN: &str = "BEP";
/// 계수 열 이름. 최고차항부터.
pub const COEFFICIENT_COLUMNS: [&str; COEFFICIENT_COUNT] = [
    "Coefficient5",
    "Coefficient4",
    "Coefficient3",
    "Coefficient2",
    "Coefficient1",
    "Coefficient0",
];

/// 카탈로그 처리 오류.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("카탈로그 파일 입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    #[error("카탈로그 CSV 오류: {0}")]
    Csv(#[from] csv::Error),
    #[error("카탈로그에 '{0}' 열이 없습니다")]
    MissingColumn(&'static str),
    #[error("{row}행 '{column}' 값이 숫자가 아닙니다: '{value}'")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("{0}행 펌프 이름이 비어 있습니다")]
    EmptyName(usize),
    #[error("펌프 이름이 중복됩니다: {0}")]
    DuplicateName(String),
    #[error("카탈로그에 '{0}' 펌프가 없습니다")]
    NotFound(String),
    #[error("카탈로그가 비어 있습니다")]
    Empty,
}

fn column_index(headers: &csv::StringRecord, name: &'static str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

fn parse_number(
    record: &csv::StringRecord,
    idx: usize,
    row: usize,
    column: &'static str,
) -> Result<f64, CatalogError> {
    let raw = record.get(idx).unwrap_or("").trim();
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(CatalogError::InvalidNumber {
            row,
            column,
            value: raw.to_string(),
        }),
    }
}

/// CSV 리더에서 카탈로그를 읽는다. 행 번호는 헤더를 1행으로 센다.
pub fn read_catalog<R: Read>(reader: R) -> Result<Vec<PolynomialCurve>, CatalogError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    let name_idx = column_index(&headers, NAME_COLUMN).ok_or(CatalogError::MissingColumn(NAME_COLUMN))?;
    let mut coef_idx = [0usize; COEFFICIENT_COUNT];
    for (slot, name) in coef_idx.iter_mut().zip(COEFFICIENT_COLUMNS) {
        *slot = column_index(&headers, name).ok_or(CatalogError::MissingColumn(name))?;
    }
    let bep_idx = column_index(&headers, BEP_COLUMN);

    let mut seen = HashSet::new();
    let mut curves = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 2;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let label = record.get(name_idx).unwrap_or("").trim().to_string();
        if label.is_empty() {
            return Err(CatalogError::EmptyName(row));
        }
        if !seen.insert(label.clone()) {
            return Err(CatalogError::DuplicateName(label));
        }
        let mut coefficients = [0.0; COEFFICIENT_COUNT];
        for ((c, idx), name) in coefficients.iter_mut().zip(coef_idx).zip(COEFFICIENT_COLUMNS) {
            *c = parse_number(&record, idx, row, name)?;
        }
        let bep = match bep_idx {
            Some(idx) if !record.get(idx).unwrap_or("").trim().is_empty() => {
                let bep = parse_number(&record, idx, row, BEP_COLUMN)?;
                if bep <= 0.0 {
                    return Err(CatalogError::InvalidNumber {
                        row,
                        column: BEP_COLUMN,
                        value: record.get(idx).unwrap_or("").trim().to_string(),
                    });
                }
                Some(bep)
            }
            _ => None,
        };
        curves.push(PolynomialCurve {
            label,
            coefficients,
            bep,
        });
    }
    debug!(count = curves.len(), "catalog parsed");
    Ok(curves)
}

/// 파일 경로에서 카탈로그를 읽는다.
pub fn load_catalog(path: &Path) -> Result<Vec<PolynomialCurve>, CatalogError> {
    let file = File::open(path)?;
    let curves = read_catalog(file)?;
    info!(path = %path.display(), count = curves.len(), "catalog loaded");
    Ok(curves)
}

/// 곡선 하나를 카탈로그 행으로 만든다.
pub fn export_row(curve: &PolynomialCurve) -> Vec<String> {
    let mut row = Vec::with_capacity(COEFFICIENT_COUNT + 2);
    row.push(curve.label.clone());
    row.extend(curve.coefficients.iter().map(|c| format!("{c:.5e}")));
    row.push(curve.bep.map(|b| b.to_string()).unwrap_or_default());
    row
}

fn header_row() -> Vec<&'static str> {
    let mut header = vec![NAME_COLUMN];
    header.extend(COEFFICIENT_COLUMNS);
    header.push(BEP_COLUMN);
    header
}

/// 헤더와 함께 곡선 목록을 CSV로 쓴다.
pub fn write_catalog<W: Write>(writer: W, curves: &[PolynomialCurve]) -> Result<(), CatalogError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(header_row())?;
    for curve in curves {
        wtr.write_record(export_row(curve))?;
    }
    wtr.flush()?;
    Ok(())
}

/// 카탈로그 파일 끝에 곡선을 추가한다. 파일이 없거나 비어 있으면 헤더부터 쓴다.
pub fn append_to_catalog(path: &Path, curve: &PolynomialCurve) -> Result<(), CatalogError> {
    let existing = if path.exists() {
        fs::read_to_string(path)?
    } else {
        String::new()
    };
    let needs_header = existing.trim().is_empty();
    if !needs_header {
        let curves = read_catalog(existing.as_bytes())?;
        if curves.iter().any(|c| c.label == curve.label) {
            return Err(CatalogError::DuplicateName(curve.label.clone()));
        }
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    // 마지막 행에 줄바꿈이 없는 파일(헤더+1행 내보내기)도 있다.
    if !needs_header && !existing.ends_with('\n') {
        file.write_all(b"\n")?;
    }
    let mut wtr = csv::Writer::from_writer(file);
    if needs_header {
        wtr.write_record(header_row())?;
    }
    wtr.write_record(export_row(curve))?;
    wtr.flush()?;
    info!(path = %path.display(), label = %curve.label, "curve exported");
    Ok(())
}

/// 이름이 정확히 같은 곡선을 찾는다.
pub fn find_curve<'a>(
    curves: &'a [PolynomialCurve],
    name: &str,
) -> Result<&'a PolynomialCurve, CatalogError> {
    curves
        .iter()
        .find(|c| c.label == name)
        .ok_or_else(|| CatalogError::NotFound(name.to_string()))
}

/// 이름이 주어지면 그 곡선을, 아니면 첫 번째 항목을 고른다.
pub fn select_curve<'a>(
    curves: &'a [PolynomialCurve],
    name: Option<&str>,
) -> Result<&'a PolynomialCurve, CatalogError> {
    match name {
        Some(n) => find_curve(curves, n),
        None => curves.first().ok_or(CatalogError::Empty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_row_uses_scientific_notation() {
        let curve = PolynomialCurve::new("P-1", [0.0, 0.0, 0.0, 1.5e-7, -0.001, 50.0]);
        let row = export_row(&curve);
        assert_eq!(
            row,
            vec![
                "P-1",
                "0.00000e0",
                "0.00000e0",
                "0.00000e0",
                "1.50000e-7",
                "-1.00000e-3",
                "5.00000e1",
                ""
            ]
        );
    }

    #[test]
    fn non_positive_bep_is_rejected() {
        let csv = "PumpName,Coefficient5,Coefficient4,Coefficient3,Coefficient2,Coefficient1,Coefficient0,BEP\n\
                   Z,0,0,0,0,-1e-3,5e1,0\n";
        match read_catalog(csv.as_bytes()) {
            Err(CatalogError::InvalidNumber { row, column, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(column, BEP_COLUMN);
            }
            other => panic!("expected InvalidNumber, got {other:?}"),
        }
        let negative = csv.replace(",0\n", ",-250\n");
        assert!(read_catalog(negative.as_bytes()).is_err());
    }

    #[test]
    fn select_defaults_to_first_entry() {
        let curves = vec![
            PolynomialCurve::new("A", [0.0; 6]),
            PolynomialCurve::new("B", [0.0; 6]),
        ];
        assert_eq!(select_curve(&curves, None).unwrap().label, "A");
        assert_eq!(select_curve(&curves, Some("B")).unwrap().label, "B");
        assert!(matches!(
            select_curve(&curves, Some("C")),
            Err(CatalogError::NotFound(_))
        ));
        assert!(matches!(select_curve(&[], None), Err(CatalogError::Empty)));
    }
}
