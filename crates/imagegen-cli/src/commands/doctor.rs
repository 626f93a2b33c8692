//! Environment checks for the generator and output directory

use crate::error::{CliError, CliResult};
use crate::utils::ColoredOutput;
use imagegen_mcp::output_dir;
use imagegen_mcp::ServerConfig;

/// Outcome of a single check
#[derive(Debug)]
pub struct Check {
    pub name: String,
    pub ok: bool,
    pub detail: String,
}

pub struct DoctorCommand;

impl DoctorCommand {
    /// Locate the generator executable on `PATH` (or verify an explicit path)
    pub fn check_generator(program: &str) -> Check {
        match which::which(program) {
            Ok(path) => Check {
                name: "generator".into(),
                ok: true,
                detail: path.display().to_string(),
            },
            Err(e) => Check {
                name: "generator".into(),
                ok: false,
                detail: format!("'{}' not found: {}", program, e),
            },
        }
    }

    pub async fn check_output_dir(raw: &str) -> Check {
        let result = match output_dir::normalize_absolute(raw) {
            Ok(dir) => match output_dir::ensure_writable(&dir).await {
                Ok(()) => Ok(dir),
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };
        match result {
            Ok(dir) => Check {
                name: "output_dir".into(),
                ok: true,
                detail: format!("{} is writable", dir.display()),
            },
            Err(e) => Check { name: "output_dir".into(), ok: false, detail: e.to_string() },
        }
    }

    pub async fn collect(config: &ServerConfig, output_dir: Option<&str>) -> Vec<Check> {
        let mut checks = vec![Self::check_generator(&config.runner.program)];
        checks.push(Check {
            name: "credential".into(),
            ok: true,
            detail: if config.runner.api_key.is_some() {
                "present, forwarded as --api-key".into()
            } else {
                "not set".into()
            },
        });
        if let Some(dir) = output_dir {
            checks.push(Self::check_output_dir(dir).await);
        }
        checks
    }

    pub async fn run(config: ServerConfig, output_dir: Option<String>) -> CliResult<()> {
        let checks = Self::collect(&config, output_dir.as_deref()).await;
        let failed = checks.iter().filter(|c| !c.ok).count();

        for check in &checks {
            let mark = if check.ok {
                ColoredOutput::success("ok  ")
            } else {
                ColoredOutput::error("FAIL")
            };
            println!("{} {:<11} {}", mark, check.name, check.detail);
        }

        if failed > 0 {
            eprintln!("{}", ColoredOutput::warning("Some checks failed"));
            return Err(CliError::DoctorFailed(failed));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_generator_is_reported() {
        let check = DoctorCommand::check_generator("/nonexistent/imggen");
        assert!(!check.ok);
        assert!(check.detail.contains("/nonexistent/imggen"));
    }

    #[cfg(unix)]
    #[test]
    fn shell_is_found() {
        assert!(DoctorCommand::check_generator("sh").ok);
    }

    #[tokio::test]
    async fn output_dir_probe_runs() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("out");
        let check = DoctorCommand::check_output_dir(target.to_str().unwrap()).await;
        assert!(check.ok, "{}", check.detail);
        assert!(target.is_dir());

        let check = DoctorCommand::check_output_dir("relative/out").await;
        assert!(!check.ok);
    }
}
