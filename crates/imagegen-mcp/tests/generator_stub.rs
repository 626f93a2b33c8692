//! End-to-end dispatcher tests against a `sh -c` stub standing in for the
//! image generator. The generated flags become the script's positional
//! parameters.
#![cfg(unix)]

use imagegen_mcp::runner::ProgressEvent;
use imagegen_mcp::{McpError, Profile, RunnerConfig, ServerConfig, ToolDispatcher};
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

fn stub(script: &str) -> RunnerConfig {
    RunnerConfig::default().with_program("sh").with_base_args(["-c", script, "stub"])
}

fn minimal(script: &str) -> ToolDispatcher {
    ToolDispatcher::new(ServerConfig::for_profile(Profile::Minimal, stub(script)))
}

#[tokio::test]
async fn successful_run_returns_stdout_and_command() {
    let dispatcher = minimal("echo OK");
    let result = dispatcher.call("generate_ai_image", &json!({"prompt": "a lighthouse"})).await.unwrap();

    assert!(result.text.contains("OK"));
    assert!(result.text.contains("sh -c"));
    assert!(result.text.contains("--prompt \"a lighthouse\" --size 1024x1024"));
    assert!(!result.text.contains("Stderr"));

    let structured = result.structured.unwrap();
    assert_eq!(structured["stdout"], "OK");
    assert_eq!(structured["exitCode"], 0);
}

#[tokio::test]
async fn stderr_is_appended_when_present() {
    let dispatcher = minimal("echo saved; echo 'using default model' >&2");
    let result = dispatcher.call("square_image", &json!({"prompt": "cat"})).await.unwrap();
    assert!(result.text.contains("saved"));
    assert!(result.text.ends_with("Stderr:\nusing default model"));
}

#[tokio::test]
async fn shortcut_overrides_caller_size() {
    let dispatcher = minimal(r#"echo "$@""#);
    for (tool, expected) in [
        ("square_image", "1024x1024"),
        ("landscape_image", "1536x1024"),
        ("portrait_image", "1024x1536"),
    ] {
        let result = dispatcher.call(tool, &json!({"prompt": "cat", "size": "256x256"})).await.unwrap();
        let stdout = result.structured.unwrap()["stdout"].as_str().unwrap().to_string();
        assert_eq!(stdout, format!("--prompt cat --size {}", expected), "{}", tool);
        assert!(!result.text.contains("256x256"));
    }
}

#[tokio::test]
async fn optional_flags_reach_the_generator() {
    let dispatcher = minimal(r#"echo "$@""#);
    let result = dispatcher
        .call(
            "generate_ai_image",
            &json!({"prompt": "cat", "size": "512x512", "model": "gpt-image-1", "output": "cat.png"}),
        )
        .await
        .unwrap();
    assert_eq!(
        result.structured.unwrap()["stdout"],
        "--prompt cat --size 512x512 --model gpt-image-1 --output cat.png"
    );
}

#[tokio::test]
async fn non_zero_exit_is_reported_with_diagnostics() {
    let dispatcher = minimal("echo partial; echo 'rate limited' >&2; exit 1");
    let err = dispatcher.call("generate_ai_image", &json!({"prompt": "cat"})).await.unwrap_err();

    match &err {
        McpError::ProcessFailed { exit_code, stdout, stderr } => {
            assert_eq!(*exit_code, Some(1));
            assert!(stdout.contains("partial"));
            assert!(stderr.contains("rate limited"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    let message = err.to_string();
    assert!(message.contains("exit code 1"));
    assert!(message.contains("rate limited"));
    assert_eq!(err.to_jsonrpc_error().code, imagegen_mcp::jsonrpc::INTERNAL_ERROR);
}

#[tokio::test]
async fn missing_executable_is_a_spawn_error() {
    let runner = RunnerConfig::default().with_program("/nonexistent/imggen-stub");
    let dispatcher = ToolDispatcher::new(ServerConfig::for_profile(Profile::Minimal, runner));
    let err = dispatcher.call("generate_ai_image", &json!({"prompt": "cat"})).await.unwrap_err();

    assert!(matches!(err, McpError::Spawn { .. }), "{:?}", err);
    assert!(err.to_string().contains("/nonexistent/imggen-stub"));
}

#[tokio::test]
async fn watchdog_kills_hung_generator() {
    let tmp = tempfile::tempdir().unwrap();
    let pid_file = tmp.path().join("pid");
    let script = format!("echo $$ > '{}'; exec sleep 30", pid_file.display());

    let config = ServerConfig::for_profile(Profile::Minimal, stub(&script))
        .with_timeout(Duration::from_secs(1));
    let dispatcher = ToolDispatcher::new(config);

    let started = Instant::now();
    let err = dispatcher.call("generate_ai_image", &json!({"prompt": "cat"})).await.unwrap_err();

    assert!(matches!(err, McpError::Timeout(d) if d == Duration::from_secs(1)), "{:?}", err);
    assert!(started.elapsed() < Duration::from_secs(10));

    let pid = std::fs::read_to_string(&pid_file).unwrap();
    let alive = std::process::Command::new("kill")
        .args(["-0", pid.trim()])
        .stderr(std::process::Stdio::null())
        .status()
        .unwrap();
    assert!(!alive.success(), "generator {} still running", pid.trim());
}

#[tokio::test]
async fn progress_is_reported_on_interval_and_output() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut runner = stub("echo first; sleep 1; echo second");
    runner.progress_interval = Duration::from_millis(200);
    let dispatcher =
        ToolDispatcher::new(ServerConfig::for_profile(Profile::Minimal, runner)).with_progress(tx);

    dispatcher.call("generate_ai_image", &json!({"prompt": "cat"})).await.unwrap();
    drop(dispatcher);

    let mut ticks = 0;
    let mut activity = 0;
    while let Some(event) = rx.recv().await {
        match event {
            ProgressEvent::Tick { .. } => ticks += 1,
            ProgressEvent::Activity { .. } => activity += 1,
        }
    }
    assert!(ticks >= 2, "expected interval ticks, got {}", ticks);
    assert!(activity >= 1, "expected output activity events");
}

#[tokio::test]
async fn full_profile_prepares_output_dir_and_forwards_key() {
    let tmp = tempfile::tempdir().unwrap();
    let out_dir = tmp.path().join("renders").join("today");
    let script = r#"prev=""; for a in "$@"; do if [ "$prev" = "--api-key" ]; then echo "key=$a"; fi; prev="$a"; done"#;
    let runner = stub(script).with_api_key(Some("sk-test".into()));
    let dispatcher = ToolDispatcher::new(ServerConfig::for_profile(Profile::Full, runner));

    let result = dispatcher
        .call(
            "portrait_image",
            &json!({"prompt": "cat", "output_dir": out_dir.to_str().unwrap()}),
        )
        .await
        .unwrap();

    assert!(out_dir.is_dir());
    assert_eq!(std::fs::read_dir(&out_dir).unwrap().count(), 0, "probe file left behind");

    let structured = result.structured.unwrap();
    assert_eq!(structured["stdout"], "key=sk-test");
    let command = structured["command"].as_str().unwrap();
    assert!(command.contains("--output-dir"));
    assert!(command.contains("--api-key ***"));
    assert!(!command.contains("sk-test"));
}

#[tokio::test]
async fn full_profile_rejects_relative_dir_without_touching_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let runner = RunnerConfig { working_dir: Some(tmp.path().to_path_buf()), ..stub("echo OK") };
    let dispatcher = ToolDispatcher::new(ServerConfig::for_profile(Profile::Full, runner));

    let err = dispatcher
        .call("generate_ai_image", &json!({"prompt": "cat", "output_dir": "relative/path"}))
        .await
        .unwrap_err();

    assert!(matches!(err, McpError::InvalidArguments(_)));
    assert!(!tmp.path().join("relative").exists());
    assert!(!std::path::Path::new("relative/path").exists());
}
