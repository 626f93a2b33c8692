//! Image generation handler: argument validation, output directory checks
//! and result formatting around the process runner

use crate::catalog::DEFAULT_SIZE;
use crate::output_dir;
use crate::runner::{build_args, ProcessOutput, ProcessRunner};
use crate::{McpError, McpResult};
use imagegen_protocol_adapter::InvokeResult;
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use tracing::info;

/// Validated arguments of a generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub prompt: String,
    pub size: String,
    pub model: Option<String>,
    pub output: Option<String>,
    pub output_dir: Option<PathBuf>,
}

fn arguments_object(args: &Value) -> McpResult<Map<String, Value>> {
    match args {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map.clone()),
        _ => Err(McpError::InvalidArguments("Arguments must be an object".to_string())),
    }
}

/// Optional string field; empty strings count as absent
fn optional_string(args: &Map<String, Value>, field: &str) -> McpResult<Option<String>> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(McpError::InvalidArguments(format!("'{}' must be a string", field))),
    }
}

impl GenerateRequest {
    /// Validate raw tool arguments. Performs no I/O.
    pub fn from_arguments(args: &Value, require_output_dir: bool) -> McpResult<Self> {
        let args = arguments_object(args)?;

        let prompt = optional_string(&args, "prompt")?.ok_or_else(|| {
            McpError::InvalidArguments("Missing or empty 'prompt' field".to_string())
        })?;
        let size = optional_string(&args, "size")?.unwrap_or_else(|| DEFAULT_SIZE.to_string());
        let model = optional_string(&args, "model")?;
        let output = optional_string(&args, "output")?;

        let output_dir = match optional_string(&args, "output_dir")? {
            Some(raw) if require_output_dir => Some(output_dir::normalize_absolute(&raw)?),
            Some(raw) => Some(PathBuf::from(raw)),
            None if require_output_dir => {
                return Err(McpError::InvalidArguments(
                    "Missing or empty 'output_dir' field (an absolute path is required)"
                        .to_string(),
                ))
            }
            None => None,
        };

        Ok(Self { prompt, size, model, output, output_dir })
    }
}

/// Merge a fixed `size` into caller arguments, replacing any caller value
pub fn with_fixed_size(args: &Value, size: &str) -> McpResult<Value> {
    let mut map = arguments_object(args)?;
    map.insert("size".to_string(), Value::String(size.to_string()));
    Ok(Value::Object(map))
}

/// Text payload returned to the caller on success
pub fn format_success(output: &ProcessOutput) -> String {
    let mut text = format!(
        "Image generation completed.\n\nCommand: {}\n\nOutput:\n{}",
        output.command, output.stdout
    );
    if !output.stderr.is_empty() {
        text.push_str("\n\nStderr:\n");
        text.push_str(&output.stderr);
    }
    text
}

/// Validate, prepare the output directory, run the generator and wrap its
/// output.
pub async fn generate_image(
    args: &Value,
    require_output_dir: bool,
    runner: &ProcessRunner,
) -> McpResult<InvokeResult> {
    let request = GenerateRequest::from_arguments(args, require_output_dir)?;

    if require_output_dir {
        if let Some(dir) = &request.output_dir {
            output_dir::ensure_writable(dir).await?;
        }
    }

    info!("Generating {} image for prompt: {}", request.size, request.prompt);
    let output = runner.run(build_args(runner.config(), &request)).await?;

    Ok(InvokeResult::text(format_success(&output)).with_structured(json!({
        "command": output.command,
        "stdout": output.stdout,
        "stderr": output.stderr,
        "exitCode": output.exit_code,
        "elapsedMs": output.elapsed.as_millis() as u64,
    })))
}
