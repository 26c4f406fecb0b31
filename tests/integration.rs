use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const HEADER: &str = "\
default persistent._example_seen = False

init -990 python in mas_submod_utils:
    Submod(
        author=\"Booplicate\",
        name=\"Example Submod\",
        version=\"0.0.1\",
        description=\"An example.\",
        dependencies={},
        settings_pane=None,
        version_updates={}
    )

label example_submod_start:
    return
";

fn converter_cmd(cwd: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mas-submod-converter"));
    cmd.current_dir(cwd);
    cmd
}

fn write_submod(root: &Path, header: &str) {
    let submod = root.join("submod");
    fs::create_dir_all(submod.join("images")).unwrap();
    fs::write(submod.join("header.rpy"), header).unwrap();
    fs::write(submod.join("header.rpyc"), "compiled").unwrap();
    fs::write(submod.join("topics.rpy"), "label topic:\n    return\n").unwrap();
    fs::write(submod.join("images/icon.png"), [0_u8, 1, 2]).unwrap();
}

fn run(cwd: &Path, args: &[&str]) -> Output {
    converter_cmd(cwd).args(args).output().unwrap()
}

fn bundles(out: &Path) -> Vec<std::path::PathBuf> {
    fs::read_dir(out).unwrap().map(|e| e.unwrap().path()).collect()
}

#[test]
fn convert_writes_named_bundle() {
    let work = tempfile::tempdir().unwrap();
    write_submod(work.path(), HEADER);
    fs::create_dir(work.path().join("out")).unwrap();

    let output = run(work.path(), &["submod", "header.rpy", "--out-dir", "out"]);
    assert!(
        output.status.success(),
        "convert failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("The output is stored in"), "stdout: {stdout}");

    let created = bundles(&work.path().join("out"));
    assert_eq!(created.len(), 1);
    let bundle = &created[0];
    let folder = bundle.file_name().unwrap().to_str().unwrap();
    assert!(folder.starts_with("Example Submod-"), "bundle folder {folder}");

    let header_json = fs::read_to_string(bundle.join("header.json")).unwrap();
    assert!(header_json.starts_with("{\n    \"header_version\": 1,\n    \"modules\": ["));
    let header: serde_json::Value = serde_json::from_str(&header_json).unwrap();
    assert_eq!(
        header,
        serde_json::json!({
            "header_version": 1,
            "modules": ["header", "topics"],
            "author": "Booplicate",
            "name": "Example Submod",
            "version": "0.0.1",
            "description": "An example.",
            "dependencies": {},
            "settings_pane": null,
            "version_updates": {}
        })
    );

    let rewritten = fs::read_to_string(bundle.join("header.rpym")).unwrap();
    assert!(rewritten.starts_with("default persistent._example_seen = False\n\ninit -990 python in mas_submod_utils:\n    pass\n#     Submod(\n"));
    assert!(rewritten.ends_with("#     )\n\nlabel example_submod_start:\n    return\n"));
    assert!(!bundle.join("header.rpyc").exists());
    assert!(bundle.join("topics.rpym").exists());
    assert_eq!(fs::read(bundle.join("images/icon.png")).unwrap(), [0, 1, 2]);

    // The source submod is never modified.
    assert_eq!(fs::read_to_string(work.path().join("submod/header.rpy")).unwrap(), HEADER);
    assert!(work.path().join("submod/header.rpyc").exists());
}

#[test]
fn dry_run_changes_nothing() {
    let work = tempfile::tempdir().unwrap();
    write_submod(work.path(), HEADER);
    fs::create_dir(work.path().join("out")).unwrap();

    let output = run(work.path(), &["submod", "header.rpy", "--out-dir", "out", "--dry-run"]);
    assert!(
        output.status.success(),
        "dry run failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(bundles(&work.path().join("out")).is_empty());
    assert_eq!(fs::read_to_string(work.path().join("submod/header.rpy")).unwrap(), HEADER);
    assert!(work.path().join("submod/topics.rpy").exists());
}

#[test]
fn quiet_run_logs_nothing() {
    let work = tempfile::tempdir().unwrap();
    write_submod(work.path(), HEADER);
    fs::create_dir(work.path().join("out")).unwrap();

    let output = run(work.path(), &["submod", "header.rpy", "--out-dir", "out", "-q"]);
    assert!(output.status.success());
    assert!(output.stderr.is_empty(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn missing_declaration_fails_without_output() {
    let work = tempfile::tempdir().unwrap();
    write_submod(work.path(), "label start:\n    return\n");
    fs::create_dir(work.path().join("out")).unwrap();

    let output = run(work.path(), &["submod", "header.rpy", "--out-dir", "out"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Submod Declaration Not Found"), "stderr: {stderr}");
    assert!(bundles(&work.path().join("out")).is_empty());
}

#[test]
fn too_many_positional_arguments_fail() {
    let work = tempfile::tempdir().unwrap();
    write_submod(
        work.path(),
        "init -990 python:\n    Submod(\"me\", \"Example\", \"1.0\", \"extra\")\n",
    );
    fs::create_dir(work.path().join("out")).unwrap();

    let output = run(work.path(), &["submod", "header.rpy", "--out-dir", "out"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Too Many Positional Arguments"), "stderr: {stderr}");
}

#[test]
fn config_changes_module_extension() {
    let work = tempfile::tempdir().unwrap();
    write_submod(work.path(), HEADER);
    fs::create_dir(work.path().join("out")).unwrap();
    fs::write(work.path().join(".submod-converter.toml"), "module_ext = \"mod\"\n").unwrap();

    let output = run(work.path(), &["submod", "header.rpy", "--out-dir", "out", "-q"]);
    assert!(
        output.status.success(),
        "convert failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let created = bundles(&work.path().join("out"));
    assert!(created[0].join("topics.mod").exists());
}
