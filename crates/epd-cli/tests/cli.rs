use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const BILL: &str = "\
ЕДИНЫЙ ПЛАТЕЖНЫЙ ДОКУМЕНТ ЗА Март 2024 г.
Лицевой счет: 5501234567
ФИО: ПЕТРОВА АННА СЕРГЕЕВНА
Адрес: г. Москва, ул. Садовая, д. 10, кв. 25
650 руб. 40 коп. ИТОГО К ОПЛАТЕ ЗА ВСЕ УСЛУГИ БЕЗ УЧЕТА ДОБРОВОЛЬНОГО СТРАХОВАНИЯ
Начисления за жилищные услуги
Содержание жилого помещения 54,20 кв.м. 9,50 514,90
Взнос на капитальный ремонт 54,20 кв.м. 2,50 135,50
Всего за март 650,40
ДОБРОВОЛЬНОЕ СТРАХОВАНИЕ 150,00
";

fn epd() -> Command {
    Command::cargo_bin("epd").unwrap()
}

fn write_bill(dir: &Path, name: &str, text: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path.display().to_string()
}

#[test]
fn process_prints_json_record() {
    let dir = TempDir::new().unwrap();
    let input = write_bill(dir.path(), "march.txt", BILL);

    epd()
        .args(["process", &input])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"period\": \"Март 2024\""))
        .stdout(predicate::str::contains("\"ИТОГО\": \"800.40\""));
}

#[test]
fn process_text_report() {
    let dir = TempDir::new().unwrap();
    let input = write_bill(dir.path(), "march.txt", BILL);

    epd()
        .args(["process", &input, "-f", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Период: Март 2024"))
        .stdout(predicate::str::contains("514,90"));
}

#[test]
fn process_csv_to_file() {
    let dir = TempDir::new().unwrap();
    let input = write_bill(dir.path(), "march.txt", BILL);
    let output = dir.path().join("march.csv");

    epd()
        .args(["process", &input, "-f", "csv", "-o"])
        .arg(&output)
        .assert()
        .success();

    let csv = fs::read_to_string(&output).unwrap();
    assert!(csv.starts_with("Период,Категория,Услуга,Объем,Ед.изм.,Тариф,Сумма"));
    assert_eq!(csv.lines().count(), 3);
}

#[test]
fn process_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    let input = write_bill(dir.path(), "march.doc", BILL);

    epd()
        .args(["process", &input])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn process_validate_reports_missing_fields() {
    let dir = TempDir::new().unwrap();
    let input = write_bill(dir.path(), "note.txt", "Просто заметка");

    epd()
        .args(["process", &input, "--validate"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Missing billing period"));
}

#[test]
fn batch_continues_past_empty_document() {
    let dir = TempDir::new().unwrap();
    write_bill(dir.path(), "01-march.txt", BILL);
    write_bill(dir.path(), "02-empty.txt", "");
    write_bill(dir.path(), "03-april.txt", &BILL.replace("Март", "Апрель"));
    let out = dir.path().join("out");
    let pattern = format!("{}/*.txt", dir.path().display());

    epd()
        .args(["batch", &pattern, "--summary", "--include-insurance", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Документов: 2"))
        .stdout(predicate::str::contains("1 600,80"))
        .stdout(predicate::str::contains("02-empty.txt"));

    assert!(out.join("01-march.json").exists());
    assert!(out.join("03-april.json").exists());
    assert!(out.join("items.csv").exists());
    assert!(out.join("documents.csv").exists());
    assert!(out.join("statistics.csv").exists());
}

#[test]
fn batch_exclusions_shape_the_summary() {
    let dir = TempDir::new().unwrap();
    write_bill(dir.path(), "march.txt", BILL);
    let out = dir.path().join("out");
    let pattern = format!("{}/*.txt", dir.path().display());

    epd()
        .args(["batch", &pattern, "--summary", "--exclude", "капитальный", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("514,90"));

    let items = fs::read_to_string(out.join("items.csv")).unwrap();
    assert!(items.contains("Содержание жилого помещения"));
    assert!(!items.contains("Взнос на капитальный ремонт"));
}

#[test]
fn batch_without_matches_fails() {
    let dir = TempDir::new().unwrap();
    let pattern = format!("{}/*.pdf", dir.path().display());

    epd()
        .args(["batch", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn config_round_trip() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    let config = config.to_str().unwrap();

    epd().args(["-c", config, "config", "init"]).assert().success();

    epd()
        .args(["-c", config, "config", "get", "extraction.max_name_length"])
        .assert()
        .success()
        .stdout(predicate::str::contains("50"));

    epd()
        .args(["-c", config, "config", "set", "export.include_insurance", "true"])
        .assert()
        .success();

    epd()
        .args(["-c", config, "config", "get", "export.include_insurance"])
        .assert()
        .success()
        .stdout(predicate::str::contains("true"));

    epd()
        .args(["-c", config, "config", "set", "export.no_such_key", "1"])
        .assert()
        .failure();
}
