//! 펌프 곡선 카탈로그 CSV 형식 테스트.
use std::fs;

use esp_pump_designer::curve::catalog::{
    append_to_catalog, load_catalog, read_catalog, write_catalog, CatalogError,
};
use esp_pump_designer::curve::PolynomialCurve;

const CATALOG: &str = "\
PumpName,Coefficient5,Coefficient4,Coefficient3,Coefficient2,Coefficient1,Coefficient0,BEP
D1050N,-1.23456e-15,4.50000e-12,-6.70000e-9,2.10000e-6,-4.00000e-3,2.80000e1,1050
TD2200,0.00000e0,0.00000e0,1.00000e-10,-3.00000e-7,-2.50000e-3,3.50000e1,
";

#[test]
fn reads_rows_in_coefficient_order() {
    let curves = read_catalog(CATALOG.as_bytes()).expect("catalog");
    assert_eq!(curves.len(), 2);
    assert_eq!(curves[0].label, "D1050N");
    assert_eq!(
        curves[0].coefficients,
        [-1.23456e-15, 4.5e-12, -6.7e-9, 2.1e-6, -4.0e-3, 28.0]
    );
    assert_eq!(curves[0].bep, Some(1050.0));
    assert_eq!(curves[1].label, "TD2200");
    assert_eq!(curves[1].bep, None);
}

#[test]
fn reads_export_without_bep_column() {
    let text = "PumpName,Coefficient5,Coefficient4,Coefficient3,Coefficient2,Coefficient1,Coefficient0\n\
                P-1,0.00000e0,0.00000e0,0.00000e0,0.00000e0,-1.00000e-3,5.00000e1";
    let curves = read_catalog(text.as_bytes()).expect("catalog");
    assert_eq!(curves.len(), 1);
    assert_eq!(curves[0].coefficients[4], -1.0e-3);
    assert_eq!(curves[0].bep, None);
}

#[test]
fn rejects_non_numeric_coefficient() {
    let text = CATALOG.replace("2.10000e-6", "abc");
    match read_catalog(text.as_bytes()) {
        Err(CatalogError::InvalidNumber { row, column, value }) => {
            assert_eq!(row, 2);
            assert_eq!(column, "Coefficient2");
            assert_eq!(value, "abc");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn rejects_missing_column_and_duplicates() {
    let no_c0 = "PumpName,Coefficient5,Coefficient4,Coefficient3,Coefficient2,Coefficient1\nA,0,0,0,0,0";
    assert!(matches!(
        read_catalog(no_c0.as_bytes()),
        Err(CatalogError::MissingColumn("Coefficient0"))
    ));

    let dup = format!("{CATALOG}D1050N,0,0,0,0,0,1,\n");
    assert!(matches!(
        read_catalog(dup.as_bytes()),
        Err(CatalogError::DuplicateName(name)) if name == "D1050N"
    ));
}

#[test]
fn written_catalog_reads_back_to_five_fractional_digits() {
    let curves = vec![
        PolynomialCurve::new("A", [1.234567e-15, -2.0e-12, 3.0e-9, -4.0e-6, -1.987654e-3, 31.41592])
            .with_bep(900.0),
        PolynomialCurve::new("B", [0.0, 0.0, 0.0, 0.0, -0.001, 50.0]),
    ];
    let mut buf = Vec::new();
    write_catalog(&mut buf, &curves).expect("write");
    let text = String::from_utf8(buf).expect("utf8");
    assert!(text.starts_with(
        "PumpName,Coefficient5,Coefficient4,Coefficient3,Coefficient2,Coefficient1,Coefficient0,BEP\n"
    ));
    assert!(text.contains("A,1.23457e-15,"), "{text}");

    let back = read_catalog(text.as_bytes()).expect("read");
    assert_eq!(back.len(), 2);
    for (a, b) in curves.iter().zip(&back) {
        assert_eq!(a.label, b.label);
        assert_eq!(a.bep, b.bep);
        for (x, y) in a.coefficients.iter().zip(&b.coefficients) {
            assert!((x - y).abs() <= 5e-6 * x.abs(), "{x} vs {y}");
        }
    }
}

#[test]
fn append_creates_header_once_and_refuses_duplicates() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("pump_curves.csv");
    let a = PolynomialCurve::new("A", [0.0, 0.0, 0.0, 0.0, -0.001, 50.0]);
    let b = PolynomialCurve::new("B", [0.0, 0.0, 0.0, 0.0, -0.002, 40.0]).with_bep(800.0);

    append_to_catalog(&path, &a).expect("append a");
    append_to_catalog(&path, &b).expect("append b");
    let text = fs::read_to_string(&path).expect("read");
    assert_eq!(text.matches("PumpName").count(), 1);

    let curves = load_catalog(&path).expect("load");
    assert_eq!(curves.len(), 2);
    assert_eq!(curves[1].bep, Some(800.0));

    assert!(matches!(
        append_to_catalog(&path, &a),
        Err(CatalogError::DuplicateName(_))
    ));
}

#[test]
fn append_after_single_row_export_without_newline() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("pump_curves.csv");
    fs::write(
        &path,
        "PumpName,Coefficient5,Coefficient4,Coefficient3,Coefficient2,Coefficient1,Coefficient0\n\
         OLD,0.00000e0,0.00000e0,0.00000e0,0.00000e0,-1.00000e-3,5.00000e1",
    )
    .expect("seed");
    let new = PolynomialCurve::new("NEW", [0.0, 0.0, 0.0, 0.0, -0.002, 40.0]);
    append_to_catalog(&path, &new).expect("append");
    let curves = load_catalog(&path).expect("load");
    let labels: Vec<&str> = curves.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["OLD", "NEW"]);
    assert_eq!(curves[1].coefficients[5], 40.0);
}
