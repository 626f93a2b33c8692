//! External generator process runner
//!
//! One call spawns one child process. Its stdout and stderr are buffered
//! separately, progress is reported on a fixed interval and on every chunk of
//! output, and a watchdog kills the child once the configured timeout elapses.
//! Both timers live inside [`ProcessRunner::run`] and are dropped with it on
//! every exit path.

use crate::config::RunnerConfig;
use crate::handler::GenerateRequest;
use crate::{McpError, McpResult};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::time::{interval_at, sleep_until, timeout_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

const READ_CHUNK: usize = 8 * 1024;
const REDACTED: &str = "***";

/// Which pipe a chunk of output came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl OutputStream {
    fn as_str(self) -> &'static str {
        match self {
            OutputStream::Stdout => "stdout",
            OutputStream::Stderr => "stderr",
        }
    }
}

/// Progress signal emitted while a generation is running
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Fixed-interval heartbeat
    Tick { elapsed: Duration },
    /// The child wrote output; does not reset any timer
    Activity { stream: OutputStream, bytes: usize, elapsed: Duration },
}

impl ProgressEvent {
    pub fn elapsed(&self) -> Duration {
        match self {
            ProgressEvent::Tick { elapsed } | ProgressEvent::Activity { elapsed, .. } => *elapsed,
        }
    }
}

pub type ProgressSender = mpsc::UnboundedSender<ProgressEvent>;

/// Result of a generator run that exited with status 0
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Reconstructed command line, credential redacted
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub elapsed: Duration,
}

/// Derive the generator argument list for a validated request
pub fn build_args(config: &RunnerConfig, request: &GenerateRequest) -> Vec<String> {
    let mut args = config.base_args.clone();
    args.push("--prompt".into());
    args.push(request.prompt.clone());
    args.push("--size".into());
    args.push(request.size.clone());

    if let Some(model) = &request.model {
        args.push("--model".into());
        args.push(model.clone());
    }
    if let Some(output) = &request.output {
        args.push("--output".into());
        args.push(output.clone());
    }
    if let Some(dir) = &request.output_dir {
        args.push("--output-dir".into());
        args.push(dir.to_string_lossy().into_owned());
    }
    if let Some(key) = &config.api_key {
        args.push("--api-key".into());
        args.push(key.clone());
    }
    args
}

/// Render a command line for logs and payloads. Arguments containing
/// whitespace are double-quoted; the `--api-key` value is masked.
pub fn display_command(program: &str, args: &[String]) -> String {
    let mut parts = vec![quote(program)];
    let mut mask_next = false;
    for arg in args {
        if mask_next {
            parts.push(REDACTED.to_string());
            mask_next = false;
            continue;
        }
        mask_next = arg == "--api-key";
        parts.push(quote(arg));
    }
    parts.join(" ")
}

fn quote(arg: &str) -> String {
    if arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '"') {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        arg.to_string()
    }
}

/// State of one subprocess run
struct ProcessInvocation {
    command: String,
    started: Instant,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl ProcessInvocation {
    fn new(command: String) -> Self {
        Self { command, started: Instant::now(), stdout: Vec::new(), stderr: Vec::new() }
    }

    fn record(&mut self, stream: OutputStream, bytes: &[u8]) {
        match stream {
            OutputStream::Stdout => self.stdout.extend_from_slice(bytes),
            OutputStream::Stderr => self.stderr.extend_from_slice(bytes),
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

async fn pump<R>(mut reader: R, stream: OutputStream, tx: mpsc::UnboundedSender<(OutputStream, Vec<u8>)>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if tx.send((stream, buf[..n].to_vec())).is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!("Error reading generator {}: {}", stream.as_str(), e);
                break;
            }
        }
    }
}

/// Runs the external generator
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    config: RunnerConfig,
    progress: Option<ProgressSender>,
}

impl ProcessRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config, progress: None }
    }

    /// Also forward progress events to `sender`
    pub fn with_progress(mut self, sender: ProgressSender) -> Self {
        self.progress = Some(sender);
        self
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    fn report(&self, event: ProgressEvent) {
        match &event {
            ProgressEvent::Tick { elapsed } => {
                info!("Image generation in progress... {}s elapsed", elapsed.as_secs())
            }
            ProgressEvent::Activity { stream, bytes, elapsed } => info!(
                "Image generation in progress... {}s elapsed ({} bytes on {})",
                elapsed.as_secs(),
                bytes,
                stream.as_str()
            ),
        }
        if let Some(tx) = &self.progress {
            let _ = tx.send(event);
        }
    }

    /// Spawn the generator with `args` and wait for it to finish.
    pub async fn run(&self, args: Vec<String>) -> McpResult<ProcessOutput> {
        let mut invocation = ProcessInvocation::new(display_command(&self.config.program, &args));
        info!("Executing: {}", invocation.command);

        let mut cmd = Command::new(&self.config.program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|source| McpError::Spawn {
            program: self.config.program.clone(),
            source,
        })?;
        debug!("Generator started with pid {:?}", child.id());

        let (tx, mut rx) = mpsc::unbounded_channel();
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(pump(stdout, OutputStream::Stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(pump(stderr, OutputStream::Stderr, tx.clone()));
        }
        drop(tx);

        let deadline = invocation.started + self.config.timeout;
        let period = self.config.heartbeat_period();
        let mut ticker = interval_at(invocation.started + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut streams_open = true;

        let status = loop {
            tokio::select! {
                status = child.wait() => break status?,
                chunk = rx.recv(), if streams_open => match chunk {
                    Some((stream, bytes)) => {
                        invocation.record(stream, &bytes);
                        self.report(ProgressEvent::Activity {
                            stream,
                            bytes: bytes.len(),
                            elapsed: invocation.elapsed(),
                        });
                    }
                    None => streams_open = false,
                },
                _ = ticker.tick() => {
                    self.report(ProgressEvent::Tick { elapsed: invocation.elapsed() });
                }
                _ = sleep_until(deadline) => {
                    warn!(
                        "Generator exceeded {}s, terminating: {}",
                        self.config.timeout.as_secs(),
                        invocation.command
                    );
                    if let Err(e) = child.start_kill() {
                        warn!("Failed to signal generator: {}", e);
                    }
                    let _ = child.wait().await;
                    return Err(McpError::Timeout(self.config.timeout));
                }
            }
        };

        // Collect whatever is still buffered in the pipes
        let drain = async {
            while let Some((stream, bytes)) = rx.recv().await {
                invocation.record(stream, &bytes);
            }
        };
        if timeout_at(deadline, drain).await.is_err() {
            warn!("Generator output streams still open after exit, using partial output");
        }

        let stdout = String::from_utf8_lossy(&invocation.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&invocation.stderr).into_owned();
        let elapsed = invocation.elapsed();

        if status.success() {
            info!("Generator finished in {:.1}s", elapsed.as_secs_f64());
            Ok(ProcessOutput {
                command: invocation.command,
                stdout: stdout.trim().to_string(),
                stderr: stderr.trim().to_string(),
                exit_code: 0,
                elapsed,
            })
        } else {
            warn!("Generator exited with {}", status);
            Err(McpError::ProcessFailed { exit_code: status.code(), stdout, stderr })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn request() -> GenerateRequest {
        GenerateRequest {
            prompt: "a red fox".into(),
            size: "1536x1024".into(),
            model: None,
            output: None,
            output_dir: None,
        }
    }

    #[test]
    fn args_follow_flag_order() {
        let mut req = request();
        req.model = Some("gpt-image-1".into());
        req.output = Some("fox.png".into());
        req.output_dir = Some(PathBuf::from("/tmp/out"));
        let config = RunnerConfig::default().with_api_key(Some("sk-1".into()));

        let args = build_args(&config, &req);
        assert_eq!(
            args,
            vec![
                "generate", "--prompt", "a red fox", "--size", "1536x1024", "--model",
                "gpt-image-1", "--output", "fox.png", "--output-dir", "/tmp/out", "--api-key",
                "sk-1",
            ]
        );
    }

    #[test]
    fn optional_flags_are_omitted() {
        let args = build_args(&RunnerConfig::default(), &request());
        assert_eq!(args, vec!["generate", "--prompt", "a red fox", "--size", "1536x1024"]);
    }

    #[test]
    fn display_command_masks_key_and_quotes() {
        let args: Vec<String> =
            ["generate", "--prompt", "a red fox", "--api-key", "sk-1"].iter().map(|s| s.to_string()).collect();
        let shown = display_command("imggen", &args);
        assert_eq!(shown, "imggen generate --prompt \"a red fox\" --api-key ***");
    }

    #[test]
    fn progress_event_elapsed() {
        let ev = ProgressEvent::Activity {
            stream: OutputStream::Stderr,
            bytes: 3,
            elapsed: Duration::from_secs(4),
        };
        assert_eq!(ev.elapsed(), Duration::from_secs(4));
    }
}
