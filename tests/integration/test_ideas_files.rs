//! Ideas files on disk, driven through the library and the `ideamap` binary.

use crate::common::{TestProject, idea, ideas_file_json};
use anyhow::Result;
use ideamap::io::{ExitCode, load_ideas_file};
use ideamap::vector::MemoryIdeaIndex;
use std::path::Path;
use std::process::Command;

fn two_group_file(project: &TestProject) -> std::path::PathBuf {
    let ideas = vec![
        idea("Tariffs raise import prices", 1),
        idea("Quotas cap import volumes", 2),
        idea("Remote work reshapes cities", 3),
        idea("Commutes shrink with remote work", 4),
    ];
    let vectors = vec![
        vec![1.0, 0.0, 0.0],
        vec![0.9, 0.1, 0.0],
        vec![0.0, 0.0, 1.0],
        vec![0.0, 0.1, 0.9],
    ];
    project.add_file("ideas.json", &ideas_file_json(&ideas, &vectors))
}

fn run_cli(workspace: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_ideamap"))
        .args(args)
        .current_dir(workspace)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("run ideamap CLI");

    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (code, stdout, stderr)
}

#[test]
fn ideas_file_round_trips_into_an_index() -> Result<()> {
    let project = TestProject::new();
    let path = two_group_file(&project);

    let set = load_ideas_file(&path)?;
    assert_eq!(set.len(), 4);
    assert_eq!(set.ideas[2].main_point, "Remote work reshapes cities");

    let index = MemoryIdeaIndex::from_ideas(&set.ideas, &set.vectors)?;
    assert_eq!(index.dimension().get(), 3);
    Ok(())
}

#[test]
fn ideas_without_ids_get_fresh_ones() -> Result<()> {
    let project = TestProject::new();
    let path = project.add_file(
        "partial.json",
        r#"[
            {"main_point": "Explicit", "chunk_id": 7, "quotation_id": 9, "vector": [1.0]},
            {"main_point": "Implicit", "vector": [2.0]}
        ]"#,
    );

    let set = load_ideas_file(&path)?;
    assert_eq!(set.ideas[1].chunk_id.value(), 8);
    assert_eq!(set.ideas[1].quotation_id.value(), 10);
    Ok(())
}

#[test]
fn cli_cluster_json() {
    let project = TestProject::new();
    two_group_file(&project);

    let (code, stdout, stderr) = run_cli(
        project.path(),
        &["cluster", "ideas.json", "-k", "2", "--seed", "5", "--json"],
    );
    assert_eq!(code, 0, "stderr: {stderr}");

    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["data"]["k"], 2);

    let summaries = json["data"]["summaries"].as_object().unwrap();
    assert_eq!(summaries.len(), 2);
    let total: usize = summaries
        .values()
        .map(|block| block.as_str().unwrap().lines().skip(1).count())
        .sum();
    assert_eq!(total, 4);
}

#[test]
fn cli_cluster_text_prints_blocks() {
    let project = TestProject::new();
    two_group_file(&project);

    let (code, stdout, _) = run_cli(
        project.path(),
        &["cluster", "ideas.json", "-k", "2", "--seed", "1"],
    );

    assert_eq!(code, 0);
    assert!(stdout.contains("Cluster 0 (2 ideas):"));
    assert!(stdout.contains("Cluster 1 (2 ideas):"));
    assert!(stdout.contains("- Quotas cap import volumes"));
}

#[test]
fn cli_rejects_zero_clusters() {
    let project = TestProject::new();
    two_group_file(&project);

    let (code, stdout, _) = run_cli(project.path(), &["cluster", "ideas.json", "-k", "0", "--json"]);

    assert_eq!(code, ExitCode::ContractViolation as i32);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["status"], "error");
    assert_eq!(json["code"], "CLUSTER_CONTRACT_VIOLATION");
    assert!(json["message"].as_str().unwrap().contains("k must be >= 1"));
}

#[test]
fn cli_zero_clusters_from_settings_is_a_contract_violation() {
    let project = TestProject::new();
    two_group_file(&project);
    project.add_file(".ideamap/settings.toml", "[clustering]\nk = 0\n");

    let (code, _, stderr) = run_cli(project.path(), &["cluster", "ideas.json"]);

    assert_eq!(code, ExitCode::ContractViolation as i32);
    assert!(stderr.contains("k must be >= 1"), "stderr: {stderr}");
}

#[test]
fn cli_neighbors_and_saved_index() {
    let project = TestProject::new();
    two_group_file(&project);

    let (code, _, stderr) = run_cli(project.path(), &["index", "ideas.json", "out/index.json"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(project.path().join("out/index.json").exists());

    let (code, stdout, stderr) = run_cli(
        project.path(),
        &[
            "neighbors",
            "ideas.json",
            "-k",
            "2",
            "--seed",
            "3",
            "--limit",
            "1",
            "--index",
            "out/index.json",
            "--json",
        ],
    );
    assert_eq!(code, 0, "stderr: {stderr}");

    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let groups = json["data"]["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 2);
    assert!(groups.iter().all(|g| g["neighbors"].as_array().unwrap().len() == 1));
}

#[test]
fn cli_neighbors_with_zero_limit_reports_no_results() {
    let project = TestProject::new();
    two_group_file(&project);

    let (code, _, _) = run_cli(
        project.path(),
        &["neighbors", "ideas.json", "-k", "2", "--limit", "0"],
    );
    assert_eq!(code, ExitCode::NoResults as i32);

    let (code, stdout, _) = run_cli(
        project.path(),
        &["neighbors", "ideas.json", "-k", "2", "--limit", "0", "--json"],
    );
    assert_eq!(code, ExitCode::NoResults as i32);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["code"], "NO_RESULTS");
    assert_eq!(json["exit_code"], 3);
}

#[test]
fn cli_init_creates_settings_once() {
    let project = TestProject::new();

    let (code, _, _) = run_cli(project.path(), &["init"]);
    assert_eq!(code, 0);
    assert!(project.path().join(".ideamap/settings.toml").exists());

    let (code, _, _) = run_cli(project.path(), &["init"]);
    assert_eq!(code, ExitCode::ConfigError as i32);

    let (code, _, _) = run_cli(project.path(), &["init", "--force"]);
    assert_eq!(code, 0);
}

#[test]
fn cli_missing_file_is_an_io_error() {
    let project = TestProject::new();

    let (code, _, stderr) = run_cli(project.path(), &["cluster", "nope.json"]);

    assert_eq!(code, ExitCode::IoError as i32);
    assert!(stderr.contains("nope.json"));
}
