//! Integration tests for zakuro-build

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn zakuro_build() -> Command {
        let mut cmd = cargo_bin_cmd!("zakuro-build");
        cmd.env_remove("ZAKURO_BUILD_CONFIG").env("CI", "1");
        cmd
    }

    fn write_tar_gz(path: &Path, files: &[(&str, &[u8])]) {
        let file = std::fs::File::create(path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, data) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn help_displays() {
        zakuro_build()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("install"))
            .stdout(predicate::str::contains("canary"));
    }

    #[test]
    fn version_displays() {
        zakuro_build()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("zakuro-build"));
    }

    #[test]
    fn unknown_target_rejected() {
        zakuro_build()
            .args(["install", "windows_x86_64"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("windows_x86_64"));
    }

    #[test]
    fn install_without_deps_file_fails() {
        let temp = TempDir::new().unwrap();
        zakuro_build()
            .current_dir(temp.path())
            .args(["install", "ubuntu-24.04_x86_64", "--root"])
            .arg(temp.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error:"));
    }

    #[test]
    fn install_reports_missing_pin() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("DEPS"), "CMAKE_VERSION=3.31.6\n").unwrap();

        zakuro_build()
            .current_dir(temp.path())
            .args(["install", "macos_arm64", "--only", "duckdb", "--root"])
            .arg(temp.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("DUCKDB_VERSION"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn install_reports_missing_local_webrtc_checkout() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("DEPS"), "WEBRTC_BUILD_VERSION=m132\n").unwrap();

        zakuro_build()
            .current_dir(temp.path())
            .args(["install", "ubuntu-24.04_x86_64", "--only", "webrtc", "--root"])
            .arg(temp.path())
            .arg("--local-webrtc-build-dir")
            .arg(temp.path().join("webrtc-build"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Path not found"))
            .stderr(predicate::str::contains("webrtc-build"));
    }

    #[test]
    fn extract_strips_single_root() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("cli11-2.5.0.tar.gz");
        write_tar_gz(
            &archive,
            &[
                ("CLI11-2.5.0/include/CLI/CLI.hpp", b"#pragma once\n"),
                ("CLI11-2.5.0/README.md", b"CLI11"),
            ],
        );
        let out = temp.path().join("out");

        zakuro_build()
            .arg("extract")
            .arg(&archive)
            .arg(&out)
            .args(["--name", "cli11"])
            .assert()
            .success();

        assert!(out.join("cli11/include/CLI/CLI.hpp").is_file());
        assert!(!out.join("CLI11-2.5.0").exists());
    }

    #[test]
    fn extract_rejects_unknown_extension() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("blob.bin");
        std::fs::write(&archive, b"data").unwrap();

        zakuro_build()
            .arg("extract")
            .arg(&archive)
            .arg(temp.path().join("out"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("--type"));
    }

    #[test]
    fn canary_dry_run_leaves_file_untouched() {
        let temp = TempDir::new().unwrap();
        let version = temp.path().join("VERSION");
        std::fs::write(&version, "2025.1.0-canary.3").unwrap();

        zakuro_build()
            .args(["canary", "--dry-run", "--yes", "--file"])
            .arg(&version)
            .assert()
            .success()
            .stdout(predicate::str::contains("2025.1.0-canary.4"));

        assert_eq!(
            std::fs::read_to_string(&version).unwrap(),
            "2025.1.0-canary.3"
        );
    }

    #[test]
    fn canary_writes_without_newline() {
        let temp = TempDir::new().unwrap();
        let version = temp.path().join("VERSION");
        std::fs::write(&version, "2025.2.0\n").unwrap();

        zakuro_build()
            .args(["canary", "--yes", "--file"])
            .arg(&version)
            .assert()
            .success();

        assert_eq!(
            std::fs::read_to_string(&version).unwrap(),
            "2025.2.0-canary.0"
        );
    }

    #[test]
    fn canary_without_confirmation_is_cancelled() {
        let temp = TempDir::new().unwrap();
        let version = temp.path().join("VERSION");
        std::fs::write(&version, "2025.2.0").unwrap();

        zakuro_build()
            .args(["canary", "--file"])
            .arg(&version)
            .assert()
            .success();

        assert_eq!(std::fs::read_to_string(&version).unwrap(), "2025.2.0");
    }

    #[test]
    fn canary_rejects_non_year_version() {
        let temp = TempDir::new().unwrap();
        let version = temp.path().join("VERSION");
        std::fs::write(&version, "1.2.3").unwrap();

        zakuro_build()
            .args(["canary", "--yes", "--file"])
            .arg(&version)
            .assert()
            .failure();
    }

    #[test]
    fn cache_list_empty_root() {
        let temp = TempDir::new().unwrap();
        zakuro_build()
            .args(["cache", "list", "ubuntu-22.04_x86_64", "--root"])
            .arg(temp.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("No installed dependencies"));
    }

    #[test]
    fn cache_list_json() {
        let temp = TempDir::new().unwrap();
        let install = temp.path().join("_install/macos_arm64/release");
        std::fs::create_dir_all(&install).unwrap();
        std::fs::write(install.join("cmake.version"), "3.31.6").unwrap();

        zakuro_build()
            .args(["cache", "list", "macos_arm64", "--format", "json", "--root"])
            .arg(temp.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("\"name\": \"cmake\""))
            .stdout(predicate::str::contains("\"version\": \"3.31.6\""));
    }

    #[test]
    fn cache_clear_yes() {
        let temp = TempDir::new().unwrap();
        let install = temp.path().join("_install/ubuntu-24.04_x86_64/debug");
        std::fs::create_dir_all(&install).unwrap();
        std::fs::write(install.join("duckdb.version"), "1.2.1").unwrap();
        std::fs::write(install.join("cmake.version"), "3.31.6").unwrap();

        zakuro_build()
            .args([
                "cache",
                "clear",
                "ubuntu-24.04_x86_64",
                "--debug",
                "--only",
                "duckdb",
                "--yes",
                "--root",
            ])
            .arg(temp.path())
            .assert()
            .success();

        assert!(!install.join("duckdb.version").exists());
        assert!(install.join("cmake.version").exists());
    }

    #[test]
    fn config_path_honors_flag() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");
        zakuro_build()
            .args(["config", "path", "--config"])
            .arg(&path)
            .assert()
            .success()
            .stdout(predicate::str::contains("custom.toml"));
    }

    #[test]
    fn config_show_defaults() {
        let temp = TempDir::new().unwrap();
        zakuro_build()
            .current_dir(temp.path())
            .args(["config", "show", "--config"])
            .arg(temp.path().join("missing.toml"))
            .assert()
            .success()
            .stdout(predicate::str::contains("[paths]"))
            .stdout(predicate::str::contains("deps_file = \"DEPS\""));
    }

    #[test]
    fn invalid_config_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.toml");
        std::fs::write(&path, "[build\n").unwrap();

        zakuro_build()
            .args(["config", "show", "--config"])
            .arg(&path)
            .assert()
            .failure()
            .stderr(predicate::str::contains("bad.toml"));
    }

    #[test]
    fn completions_generate() {
        zakuro_build()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("zakuro-build"));
    }
}
