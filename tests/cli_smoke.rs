use std::path::PathBuf;

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_optiplay")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "optiplay.exe"
            } else {
                "optiplay"
            });
            p
        })
}

#[test]
fn cli_render_writes_gif() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();
    let out_path = dir.join("zdt1.gif");
    let _ = std::fs::remove_file(&out_path);

    let status = std::process::Command::new(exe())
        .args([
            "render",
            "--in",
            "tests/data/zdt1_nsga2.jsonl",
            "--out",
        ])
        .arg(&out_path)
        .args(["--duration", "2", "--fps-cap", "10", "--size", "64"])
        .status()
        .unwrap();

    assert!(status.success());
    assert!(out_path.exists());
    assert!(std::fs::metadata(&out_path).unwrap().len() > 0);
}

#[test]
fn cli_info_reports_the_plan() {
    let output = std::process::Command::new(exe())
        .args(["info", "--in", "tests/data/graphplane_hybrid.jsonl"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("graph-layout"));
    assert!(stdout.contains("snapshots:    40"));
}
