//! Command-line tests for the converter binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn converter() -> Command {
    Command::new(env!("CARGO_BIN_EXE_leychile-converter"))
}

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("superir")
        .join(name)
}

#[test]
fn test_convert_writes_xml_per_file() {
    let dir = tempdir().unwrap();

    converter()
        .arg("convert")
        .arg(fixture_path("resolucion_6597.txt"))
        .arg(fixture_path("instructivo_16245.txt"))
        .arg("-o")
        .arg(dir.path())
        .args(["--tipo", "instructivo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("resolucion_6597"))
        .stdout(predicate::str::contains("2 document(s) written"));

    let xml = fs::read_to_string(dir.path().join("resolucion_6597.xml")).unwrap();
    assert!(xml.contains(r#"tipo="Instructivo""#));
    assert!(xml.contains(r#"id_norma="resolucion_6597""#));
    assert!(dir.path().join("instructivo_16245.xml").exists());
}

#[test]
fn test_convert_with_catalog() {
    let dir = tempdir().unwrap();

    converter()
        .arg("convert")
        .arg(fixture_path("resolucion_6597.txt"))
        .arg("-o")
        .arg(dir.path())
        .arg("--catalog")
        .arg(fixture_path("catalogo.yaml"))
        .args(["--tipo", "ncg"])
        .assert()
        .success();

    let xml = fs::read_to_string(dir.path().join("resolucion_6597.xml")).unwrap();
    assert!(xml.contains(r#"numero="14""#));
    assert!(xml.contains("<materia>Boletín Concursal</materia>"));
}

#[test]
fn test_convert_with_publication_date() {
    let dir = tempdir().unwrap();

    converter()
        .arg("convert")
        .arg(fixture_path("resolucion_6597.txt"))
        .arg("-o")
        .arg(dir.path())
        .args(["--fecha-publicacion", "2023-08-30"])
        .assert()
        .success();

    let xml = fs::read_to_string(dir.path().join("resolucion_6597.xml")).unwrap();
    assert!(xml.contains(r#"fecha_publicacion="2023-08-30""#));
}

#[test]
fn test_convert_rejects_invalid_publication_date() {
    let dir = tempdir().unwrap();

    converter()
        .arg("convert")
        .arg(fixture_path("resolucion_6597.txt"))
        .arg("-o")
        .arg(dir.path())
        .args(["--fecha-publicacion", "30-08-2023"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date format: '30-08-2023'"));

    assert!(!dir.path().join("resolucion_6597.xml").exists());
}

#[test]
fn test_convert_missing_file_fails() {
    let dir = tempdir().unwrap();

    converter()
        .arg("convert")
        .arg(dir.path().join("no_existe.txt"))
        .arg("-o")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 1 documents failed to convert"));
}

#[test]
fn test_validate_generated_file() {
    let dir = tempdir().unwrap();

    converter()
        .arg("convert")
        .arg(fixture_path("sin_anclas.txt"))
        .arg("-o")
        .arg(dir.path())
        .args(["--tipo", "ley"])
        .assert()
        .success();

    converter()
        .arg("validate")
        .arg(dir.path().join("sin_anclas.xml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Valid:"));
}

#[test]
fn test_validate_reports_violations() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("roto.xml");
    fs::write(
        &path,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ley xmlns="https://leychile.cl/schema/ley/v1" id_norma="X" tipo="Decreto" numero="1" estado="vigente" version_esquema="1.0">
  <metadatos><titulo>X</titulo></metadatos>
</ley>
"#,
    )
    .unwrap();

    converter()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("tipo"))
        .stderr(predicate::str::contains("schema violation(s)"));
}

#[test]
fn test_validate_malformed_xml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("malformado.xml");
    fs::write(&path, "<ley><metadatos></ley>").unwrap();

    converter()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error:"));
}
