use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const LOG: &str = "\
[cds,vtables] Copying 41 vtable entries for InstanceKlass
[cds,unshareable] restore: java.lang.Thread with class loader: boot
[cds,heap,mirror] java.lang.Thread has raw archived mirror
[cds,heap] Clearing root 17: was 0x00000007ffe7afc0
[cds,heap,mirror] Restored java.lang.Thread archived mirror 0x00000007ffe7afc0
[scc,init] Read 4 entries table at offset 1024
[scc,nmethod] 427 (L1): Reading nmethod 'java.lang.Byte::toUnsignedInt(B)I' (decomp: 0)
";

fn write_log(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("cds.log");
    std::fs::write(&path, content).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cds-report"))
        .args(args)
        .env_remove("CDS_REPORT_LOG")
        .env_remove("CDS_REPORT_TOP")
        .env_remove("CDS_REPORT_FORMAT")
        .output()
        .unwrap()
}

#[test]
fn test_text_report_on_stdout() {
    let dir = TempDir::new().unwrap();
    let path = write_log(dir.path(), LOG);

    let output = run(&[path.to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("CDS Report:"));
    assert!(stdout.contains("         1 classes loaded by 'boot'"));
    assert!(stdout.contains("         4 total entries found in the startup code cache (SCC)"));
    assert!(stdout.contains("        41 vtable entries copied for InstanceKlass"));
}

#[test]
fn test_json_report() {
    let dir = TempDir::new().unwrap();
    let path = write_log(dir.path(), LOG);

    let output = run(&["--format", "json", path.to_str().unwrap()]);
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["report"]["scc_total_entries"], 4);
    assert_eq!(value["report"]["vtables"]["InstanceKlass"], 41);
    assert_eq!(value["summary"]["unique_nmethods"], 1);
    assert_eq!(value["metadata"]["lines_read"], 7);
}

#[test]
fn test_missing_log_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.log");

    let output = run(&[path.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_malformed_line_fails_without_report() {
    let dir = TempDir::new().unwrap();
    let path = write_log(dir.path(), "[cds] fine\nno tags here\n");

    let output = run(&[path.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
