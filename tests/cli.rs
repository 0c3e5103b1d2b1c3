use assert_cmd::Command;

#[test]
fn help_lists_configuration_flags() {
    let output = Command::cargo_bin("ratgdo-exporter")
        .unwrap()
        .arg("--help")
        .output()
        .unwrap();

    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    for flag in ["--host", "--metrics-port", "--listen-address", "--json-logs"] {
        assert!(help.contains(flag), "missing {} in help", flag);
    }
}

#[test]
fn rejects_unknown_flag() {
    Command::cargo_bin("ratgdo-exporter")
        .unwrap()
        .arg("--no-such-flag")
        .assert()
        .failure();
}
