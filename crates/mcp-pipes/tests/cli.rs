//! End-to-end runs of the `ocr_client` and `mcp-pipes` binaries. Providers
//! are real child processes here.

use assert_cmd::Command;
use predicates::prelude::*;

const PROVIDER: &str = env!("CARGO_BIN_EXE_mcp-pipes");

fn ocr_client() -> Command {
    let mut cmd = Command::cargo_bin("ocr_client").unwrap();
    cmd.env("MCP_PIPES_PROVIDER", PROVIDER)
        .env("TESSERACT_CMD", "/nonexistent/tesseract")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_missing_image_exits_with_not_found() {
    ocr_client()
        .arg("/nonexistent/scan.png")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("not found"));
}

#[test]
fn test_mock_result_saved_into_directory() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("receipt.png");
    std::fs::write(&image, b"pixels").unwrap();
    let out_dir = dir.path().join("texts");

    ocr_client()
        .arg(&image)
        .arg("--out")
        .arg(format!("{}/", out_dir.display()))
        .assert()
        .success()
        .stdout(predicate::str::contains("Invoice #12345"))
        .stdout(predicate::str::contains("Saved OCR text to"));

    let saved = std::fs::read_to_string(out_dir.join("receipt_ocr.txt")).unwrap();
    assert!(saved.contains("Tesseract binary not found"));
}

#[test]
fn test_out_file_path_used_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("receipt.png");
    std::fs::write(&image, b"pixels").unwrap();
    let out = dir.path().join("nested").join("result.txt");

    ocr_client().arg(&image).arg("--out").arg(&out).assert().success();
    assert!(out.exists());
}

#[test]
fn test_unlaunchable_provider_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("receipt.png");
    std::fs::write(&image, b"pixels").unwrap();

    ocr_client()
        .env("MCP_PIPES_PROVIDER", dir.path().join("no-such-provider"))
        .arg(&image)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Error processing image"));
}

#[test]
fn test_multi_server_demo() {
    Command::cargo_bin("mcp-pipes")
        .unwrap()
        .arg("multi")
        .assert()
        .success()
        .stdout(predicate::str::contains("=== Connected to 2 MCP servers ==="))
        .stdout(predicate::str::contains("[server-a] Calling prompt: greet-user-a"))
        .stdout(predicate::str::contains(
            "[A] Hello, Lavanthi! You're connected to Server A.",
        ))
        .stdout(predicate::str::contains("[B] Hi Lavanthi! Time now is"))
        .stdout(predicate::str::contains("UTC time from Server B"));
}

#[test]
fn test_prompt_and_resource_demos() {
    Command::cargo_bin("mcp-pipes")
        .unwrap()
        .arg("prompts")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Hello, Lavanthi! Welcome to the MCP world.",
        ));

    Command::cargo_bin("mcp-pipes")
        .unwrap()
        .arg("resources")
        .assert()
        .success()
        .stdout(predicate::str::contains(" - Hello Resource (resource://hello)"))
        .stdout(predicate::str::contains(
            "A simple resource that just says hello!",
        ));
}

fn logo_png() -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, 4, 2);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&[90u8; 24]).unwrap();
    }
    out
}

#[test]
fn test_report_and_certificate_demos() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(data.join("logo.png"), logo_png()).unwrap();
    std::fs::write(data.join("certificate.png"), b"\x89PNG\r\n\x1a\ntemplate").unwrap();

    let report = dir.path().join("out").join("q3.pdf");
    Command::cargo_bin("mcp-pipes")
        .unwrap()
        .current_dir(dir.path())
        .arg("report")
        .arg("--out")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("PDF report generated"));
    let pdf = std::fs::read(&report).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
    let body = String::from_utf8_lossy(&pdf);
    assert!(body.contains("/Subtype /Image /Width 4 /Height 2"));
    assert!(body.contains("/Im1 Do"));
    assert!(!dir.path().join("out").join("q3_logo.png").exists());

    Command::cargo_bin("mcp-pipes")
        .unwrap()
        .current_dir(dir.path())
        .args(["certificate", "--name", "Alice Johnson", "--course", "Rust"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alice_Johnson_certificate.svg"));
    assert!(dir
        .path()
        .join("output")
        .join("Alice_Johnson_certificate.svg")
        .exists());
}

#[test]
fn test_info_lists_capabilities() {
    Command::cargo_bin("mcp-pipes")
        .unwrap()
        .args(["info", "certificate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("certificate-server"))
        .stdout(predicate::str::contains("create_certificate"));
}
