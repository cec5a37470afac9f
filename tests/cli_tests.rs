use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_help_command() {
    let mut cmd = Command::cargo_bin("file-reporter").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Build a CSV inventory"))
        .stdout(predicate::str::contains("--inventory-path"))
        .stdout(predicate::str::contains("--mediainfo"))
        .stdout(predicate::str::contains("--sf-batch"));
}

#[test]
fn test_version_command() {
    let mut cmd = Command::cargo_bin("file-reporter").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("file-reporter"));
}

#[test]
fn test_missing_inventory_path() {
    let mut cmd = Command::cargo_bin("file-reporter").unwrap();
    cmd.arg("-m")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--inventory-path"));
}

#[test]
fn test_invalid_root_fails_before_any_work() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("not-a-dir.txt");
    std::fs::write(&file, b"x").unwrap();
    let out = temp_dir.path().join("out");

    let mut cmd = Command::cargo_bin("file-reporter").unwrap();
    cmd.arg("-p")
        .arg(&file)
        .arg("-o")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a valid directory"));

    assert!(!out.exists());
}

#[test]
fn test_zero_jobs_rejected() {
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("file-reporter").unwrap();
    cmd.arg("-p")
        .arg(temp_dir.path())
        .args(["-j", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 1"));
}

#[cfg(unix)]
mod with_fake_tools {
    use std::{
        fs,
        os::unix::fs::PermissionsExt,
        path::{Path, PathBuf},
    };

    use super::*;

    /// Reports every file as plain text, except names containing `broken`,
    /// for which it fails the way a crashing tool would.
    const FAKE_SF: &str = r#"#!/bin/sh
for last; do :; done
case "$last" in
  *broken*) echo "garbage, not \"json\""; echo "sf: read error" >&2; exit 2 ;;
esac
printf '{"siegfried":"1.11.0","files":[{"filename":"%s","errors":"","matches":[{"ns":"pronom","id":"x-fmt/111","format":"Plain Text File","warning":""}]}]}\n' "$last"
"#;

    /// Reports `.wav` files as stereo PCM audio and everything else as a
    /// container without streams.
    const FAKE_MEDIAINFO: &str = r#"#!/bin/sh
for last; do :; done
case "$last" in
  *.wav) printf '{"media":{"@ref":"%s","track":[{"@type":"General","AudioCount":"1","Format":"Wave"},{"@type":"Audio","Format":"PCM","Channels":"2","SamplingRate_String":"48.0 kHz","BitDepth_String":"24 bits","Duration_String":"1 s"}]}}\n' "$last" ;;
  *) printf '{"media":{"@ref":"%s","track":[{"@type":"General","Format":""}]}}\n' "$last" ;;
esac
"#;

    struct Workspace {
        dir: TempDir,
    }

    impl Workspace {
        fn new(files: &[&str]) -> Self {
            let dir = TempDir::new().unwrap();
            for tool in [("sf", FAKE_SF), ("mediainfo", FAKE_MEDIAINFO)] {
                let path = dir.path().join("tools").join(tool.0);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(&path, tool.1).unwrap();
                fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            }
            for file in files {
                let path = dir.path().join("box1").join(file);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(&path, format!("contents of {file}")).unwrap();
            }
            fs::create_dir_all(dir.path().join("box1")).unwrap();
            Self { dir }
        }

        fn root(&self) -> PathBuf {
            self.dir.path().join("box1")
        }

        fn out(&self) -> PathBuf {
            self.dir.path().join("reports")
        }

        fn csv(&self) -> PathBuf {
            self.out().join("box1.csv")
        }

        fn tool(&self, name: &str) -> PathBuf {
            self.dir.path().join("tools").join(name)
        }

        fn command(&self) -> Command {
            self.command_with(&self.tool("sf"), &self.out())
        }

        fn command_with(&self, sf: &Path, out: &Path) -> Command {
            let mut cmd = Command::cargo_bin("file-reporter").unwrap();
            cmd.arg("--inventory-path")
                .arg(self.root())
                .arg("--out-path")
                .arg(out)
                .arg("--sf-path")
                .arg(sf)
                .arg("--mediainfo-path")
                .arg(self.tool("mediainfo"))
                .args(["--jobs", "4"])
                .env_remove("RUST_LOG");
            cmd
        }
    }

    fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
        let mut reader = csv::Reader::from_path(path).unwrap();
        let header = reader.headers().unwrap().iter().map(String::from).collect();
        let rows = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        (header, rows)
    }

    fn index_of(header: &[String], name: &str) -> usize {
        header
            .iter()
            .position(|h| h == name)
            .unwrap_or_else(|| panic!("missing column {name}"))
    }

    #[test]
    fn test_one_row_per_visible_file() {
        let ws = Workspace::new(&[
            "a.txt",
            "b.txt",
            "sub/c.txt",
            "sub/deeper/d.txt",
            ".DS_Store",
            ".git/config",
            "sub/.hidden.txt",
        ]);

        ws.command()
            .assert()
            .success()
            .stdout(predicate::str::contains("box1.csv"))
            .stderr(predicate::str::contains("inventorying file"));

        let (header, rows) = read_csv(&ws.csv());
        assert_eq!(rows.len(), 4);

        let name = index_of(&header, "File Name");
        let names: Vec<&str> = rows.iter().map(|r| r[name].as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt", "d.txt"]);
        assert!(names.iter().all(|n| !n.starts_with('.')));
    }

    #[test]
    fn test_media_columns_absent_without_flag() {
        let ws = Workspace::new(&["a.txt", "song.wav"]);

        ws.command().assert().success();

        let (header, rows) = read_csv(&ws.csv());
        assert_eq!(
            header,
            vec![
                "File Name",
                "File Size",
                "File Format (Siegfried)",
                "Folder",
                "Created On",
                "Last Modified On",
                "Full Siegfried Output",
                "Siegfried Error Messages",
            ]
        );
        assert!(rows.iter().all(|r| r.len() == header.len()));
    }

    #[test]
    fn test_media_columns_with_flag() {
        let ws = Workspace::new(&["notes.txt", "song.wav"]);

        ws.command().arg("--mediainfo").assert().success();

        let (header, rows) = read_csv(&ws.csv());
        assert_eq!(header.len(), 23);
        assert_eq!(header.last().unwrap(), "Full Mediainfo Output");
        assert!(rows.iter().all(|r| r.len() == header.len()));

        let first_media = index_of(&header, "File Format (MediaInfo)");
        let last_media = index_of(&header, "Audio Channels");
        let notes = &rows[0];
        assert_eq!(notes[0], "notes.txt");
        assert!(notes[first_media..=last_media].iter().all(String::is_empty));

        let song = &rows[1];
        assert_eq!(song[index_of(&header, "File Format (MediaInfo)")], "PCM");
        assert_eq!(song[index_of(&header, "Channels")], "2");
        assert_eq!(song[index_of(&header, "Sample Rate")], "48.0 kHz");
        assert_eq!(song[index_of(&header, "Bit Depth")], "24 bits");
        assert_eq!(song[index_of(&header, "Width")], "");
        assert!(song[index_of(&header, "Full Mediainfo Output")].contains("\"@type\":\"Audio\""));
    }

    #[test]
    fn test_file_facts_and_raw_output_round_trip() {
        let ws = Workspace::new(&["with, comma.txt"]);
        fs::write(ws.root().join("kilobyte.bin"), vec![0u8; 1024]).unwrap();

        ws.command().assert().success();

        let (header, rows) = read_csv(&ws.csv());
        assert_eq!(rows.len(), 2);

        let kilobyte = &rows[0];
        assert_eq!(kilobyte[index_of(&header, "File Name")], "kilobyte.bin");
        assert_eq!(kilobyte[index_of(&header, "File Size")], "1 KB");
        assert_eq!(
            kilobyte[index_of(&header, "Folder")],
            ws.root().display().to_string()
        );
        assert_eq!(kilobyte[index_of(&header, "Last Modified On")].len(), 19);

        let comma = &rows[1];
        assert_eq!(comma[0], "with, comma.txt");
        let raw = &comma[index_of(&header, "Full Siegfried Output")];
        let report: serde_json::Value = serde_json::from_str(raw).unwrap();
        assert_eq!(
            report["files"][0]["filename"],
            ws.root().join("with, comma.txt").display().to_string()
        );
    }

    #[test]
    fn test_tool_failure_is_contained_to_its_row() {
        let ws = Workspace::new(&["a.txt", "broken.txt", "c.txt"]);

        ws.command()
            .assert()
            .success()
            .stdout(predicate::str::contains("Identification failures: 1"));

        let (header, rows) = read_csv(&ws.csv());
        assert_eq!(rows.len(), 3);

        let format = index_of(&header, "File Format (Siegfried)");
        let raw = index_of(&header, "Full Siegfried Output");
        let errors = index_of(&header, "Siegfried Error Messages");

        assert_eq!(rows[0][format], "Plain Text File");
        assert_eq!(rows[2][format], "Plain Text File");

        let broken = &rows[1];
        assert_eq!(broken[0], "broken.txt");
        assert_eq!(broken[format], "");
        assert_eq!(broken[raw], "garbage, not \"json\"\n");
        assert!(broken[errors].contains("sf: read error"));
    }

    #[test]
    fn test_missing_tool_still_inventories_every_file() {
        let ws = Workspace::new(&["a.txt", "b.txt"]);

        ws.command_with(&ws.tool("not-installed"), &ws.out())
            .assert()
            .success();

        let (header, rows) = read_csv(&ws.csv());
        assert_eq!(rows.len(), 2);
        let errors = index_of(&header, "Siegfried Error Messages");
        assert!(rows.iter().all(|r| r[errors].contains("not-installed")));
    }

    #[test]
    fn test_runs_are_idempotent() {
        let ws = Workspace::new(&["a.txt", "song.wav", "sub/b.txt", "broken.txt"]);

        ws.command().arg("-m").assert().success();
        let first = fs::read(ws.csv()).unwrap();

        ws.command().arg("-m").assert().success();
        let second = fs::read(ws.csv()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_directory_writes_header_only() {
        let ws = Workspace::new(&[]);

        ws.command().assert().success();

        let (header, rows) = read_csv(&ws.csv());
        assert_eq!(header.len(), 8);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_json_summary() {
        let ws = Workspace::new(&["a.txt", "song.wav"]);

        let output = ws
            .command()
            .args(["--mediainfo", "--format", "json", "--quiet"])
            .output()
            .unwrap();
        assert!(output.status.success());
        assert!(!String::from_utf8_lossy(&output.stderr).contains("inventorying file"));

        let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(summary["files"], 2);
        assert_eq!(summary["signature_failures"], 0);
        assert_eq!(summary["track_types"]["audio"], 1);
        assert_eq!(summary["track_types"]["not_av"], 1);
        assert_eq!(summary["output"], ws.csv().display().to_string());
    }

    #[test]
    fn test_out_path_is_created() {
        let ws = Workspace::new(&["a.txt"]);
        let nested = ws.dir.path().join("deep").join("reports");

        ws.command_with(&ws.tool("sf"), &nested)
            .assert()
            .success();

        assert!(nested.join("box1.csv").is_file());
    }
}
