use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const VERIFICATION_URL: &str = "https://suf.purs.gov.rs/v/?vl=A1ZCTUhYOVNYVzZVQlBaTzCyKwEA%2FmgAAMDh5AAAAAAAAAABhXchESoAAAAP3tYiO2%2BdI6Z5y2v4eC5wJTxirHDeiB1hqaKpgb%2FGvUy6yLkMNgZNqKxLqR40mK2cAfqZmKQ3%2BuCcTbec%2BQ3%2F9YY5EhTDP5HxDNhG%2FugU849FmvrVzP0sKecosSNL10dFtlH8Wgor2A2DDs8sHlmfmpokJnVcm24b%2BCz2bSCSl3HtzGRJ1w4Sw9hhdzsQ4WuPo%2FMEGMlmV8a%2Ffc7X05cWsDCHZoA5uPNWfN%2Bre8%2By5JETDJgRwNDFipYIdh0k62TMp5P0%2FzbCueIJJjas5IxAS9iIdpoTAIIl3eKwUZUWvEwtbGz5nkz52hw5%2Bmg50Uczx1SRifYq%2FEDt79xNkcceS0llpMyNdQ12TSYyL0UjMNymgGX4WPajSzPkQuFBcGLB%2BNLOn2AKLPJXa3B8b87eESXrcIbilNXS3zyr3eg4DIqcTVLXwHwcSh1WDmWKI2TFSu%2Bc6iORB11ln1kYbsEsuCoUegxRJR3RW4%2BkQz45%2Bbm4O5qWTCkDlZ73XHATWPn%2BpPfHP2Fh0Y0QK8gGxNiqrdbob3u0l8uaxKcEDaX%2F4HXnhMezvLEEwBNgWXDMn29uWYx9SWEvPrxV%2FLsIULQbE%2FlcvPeYIla63NhCyuEuGLIlwB2p%2B9O8x7sxD53fTMC7EKKRFUV13WBJS2N5%2BLUh33joYo8Qrc%2BNV2CqrtChYTftFukoKbQvCUKOYYIW0%2FA%3D";

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../fiskal-core/tests/fixtures")
        .join(name)
}

/// The binary with its config directory pointed into `home`.
#[allow(deprecated)]
fn fiskal(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("fiskal").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"));
    cmd
}

#[test]
fn journal_prints_json() {
    let home = TempDir::new().unwrap();

    fiskal(&home)
        .arg("journal")
        .arg(fixture("normal_sale.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"number\": \"746DUV64-746DUV64-16898\""))
        .stdout(predicate::str::contains("\"receipt_type\": \"normal_sale\""));
}

#[test]
fn journal_prints_csv_row_per_item() {
    let home = TempDir::new().unwrap();

    fiskal(&home)
        .args(["journal", "--format", "csv"])
        .arg(fixture("normal_sale.txt"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("number,counter,receipt_type,date"))
        .stdout(predicate::str::contains("BANANA,1.482,KG,199.99,296.39,Е,10"));
}

#[test]
fn journal_prints_text_summary() {
    let home = TempDir::new().unwrap();

    fiskal(&home)
        .args(["journal", "-f", "text"])
        .arg(fixture("normal_sale.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Receipt: 746DUV64-746DUV64-16898 (16887/16898ПП)"))
        .stdout(predicate::str::contains("Total: 829,12"));
}

#[test]
fn journal_prints_array_for_several_files() {
    let home = TempDir::new().unwrap();

    fiskal(&home)
        .arg("journal")
        .arg(fixture("normal_sale.txt"))
        .arg(fixture("normal_refund.txt"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("["))
        .stdout(predicate::str::contains("\"receipt_type\": \"normal_refund\""));
}

#[test]
fn journal_writes_output_file() {
    let home = TempDir::new().unwrap();
    let output = home.path().join("receipt.json");

    fiskal(&home)
        .arg("journal")
        .arg(fixture("normal_sale.txt"))
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let content = fs::read_to_string(&output).unwrap();
    assert!(content.contains("746DUV64-746DUV64-16898"));
}

#[test]
fn journal_reports_missing_file() {
    let home = TempDir::new().unwrap();

    fiskal(&home)
        .args(["journal", "no-such-receipt.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn journal_reports_unknown_timezone_in_config() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("config.json");
    fs::write(&config, r#"{"journal": {"timezone": "Mars/Olympus"}}"#).unwrap();

    fiskal(&home)
        .arg("--config")
        .arg(&config)
        .arg("journal")
        .arg(fixture("normal_sale.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown timezone"));
}

#[test]
fn api_maps_response_file() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("response.json");
    let response = serde_json::json!({
        "invoiceRequest": {
            "businessName": "Mercator-S doo",
            "taxId": "101670560",
            "locationName": "1108934-Roda Megamarket 345",
            "address": "ВИЗАНТИЈСКИ БУЛЕВАР 1",
            "administrativeUnit": "Ниш-Медијана",
            "invoiceType": 0,
            "transactionType": 0
        },
        "invoiceResult": {
            "sdcTime": "2022-12-31T15:51:57.123+01:00",
            "totalAmount": 829.12,
            "invoiceNumber": "746DUV64-746DUV64-16898",
            "transactionTypeCounter": 16887,
            "totalCounter": 16898,
            "invoiceCounterExtension": "ПП"
        },
        "journal": fs::read_to_string(fixture("normal_sale.txt")).unwrap()
    });
    fs::write(&input, response.to_string()).unwrap();

    fiskal(&home)
        .arg("api")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"company_name\": \"Mercator-S doo\""));
}

#[test]
fn url_prints_decoded_payload() {
    let home = TempDir::new().unwrap();

    fiskal(&home)
        .args(["url", VERIFICATION_URL])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"receipt_number\": \"VBMHX9SX-W6UBPZO0-76722\""))
        .stdout(predicate::str::contains("\"receipt_counter\": \"26878/76722ПП\""));
}

#[test]
fn url_prints_text_summary() {
    let home = TempDir::new().unwrap();

    fiskal(&home)
        .args(["url", "--format", "text", VERIFICATION_URL])
        .assert()
        .success()
        .stdout(predicate::str::contains("Amount: 1.500,00"))
        .stdout(predicate::str::contains("Date: 03.01.2023. 11:15:33"));
}

#[test]
fn url_rejects_foreign_host() {
    let home = TempDir::new().unwrap();

    fiskal(&home)
        .args(["url", "https://www.google.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid verification URL"));
}

#[test]
fn batch_continues_past_broken_files() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("journals");
    let output = home.path().join("out");
    fs::create_dir_all(&input).unwrap();
    fs::copy(fixture("normal_sale.txt"), input.join("normal_sale.txt")).unwrap();
    fs::copy(fixture("proforma_sale.txt"), input.join("proforma_sale.txt")).unwrap();
    fs::write(input.join("broken.txt"), "not a journal").unwrap();

    fiskal(&home)
        .arg("batch")
        .arg(format!("{}/*.txt", input.display()))
        .arg("--output-dir")
        .arg(&output)
        .args(["--summary", "--continue-on-error", "-j", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 successful, 1 failed"));

    assert!(output.join("normal_sale.json").exists());
    assert!(output.join("proforma_sale.json").exists());
    assert!(!output.join("broken.json").exists());

    let summary = fs::read_to_string(output.join("summary.csv")).unwrap();
    assert!(summary.contains("normal_sale.txt,success,746DUV64-746DUV64-16898"));
    assert!(summary.contains("broken.txt,error"));
}

#[test]
fn batch_stops_on_first_error() {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join("broken.txt"), "not a journal").unwrap();

    fiskal(&home)
        .arg("batch")
        .arg(format!("{}/*.txt", home.path().display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn config_init_refuses_to_overwrite() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("fiskal.json");

    fiskal(&home)
        .args(["config", "init", "--output"])
        .arg(&config)
        .assert()
        .success();
    assert!(config.exists());

    fiskal(&home)
        .args(["config", "init", "--output"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    fiskal(&home)
        .args(["config", "init", "--force", "--output"])
        .arg(&config)
        .assert()
        .success();
}

#[test]
fn config_show_reads_given_file() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("config.json");
    fs::write(&config, r#"{"journal": {"timezone": "UTC"}}"#).unwrap();

    fiskal(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"timezone\": \"UTC\""))
        .stdout(predicate::str::contains("\"allowed_host\": \"suf.purs.gov.rs\""));
}

#[test]
fn config_path_reports_missing_file() {
    let home = TempDir::new().unwrap();

    fiskal(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not created"));
}
