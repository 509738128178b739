//! Downstream SDK generation for a freshly released version

#[cfg(test)]
use mockall::automock;

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::config::GeneratorConfig;
use crate::error::ReleaseError;
use crate::version::semver::ReleaseVersion;
use crate::version::types::Language;

/// Captured output of a successful generator run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Triggers code generation for one language version
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Generator: Send + Sync {
    /// Runs once; a failure is terminal for the language
    async fn generate(
        &self,
        language: Language,
        version: &ReleaseVersion,
        preview: bool,
    ) -> Result<GenerationOutput, ReleaseError>;
}

/// Runs an external generator command, `fern generate` by default
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
    log_level: String,
}

impl CommandGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            program: config.command.clone(),
            args: config.args.clone(),
            log_level: config.log_level.clone(),
        }
    }

    /// Full argument list passed to the program
    pub fn arguments(
        &self,
        language: Language,
        version: &ReleaseVersion,
        preview: bool,
    ) -> Vec<String> {
        let mut args = self.args.clone();
        args.extend([
            "--group".to_string(),
            language.to_string(),
            "--version".to_string(),
            version.to_string(),
            "--log-level".to_string(),
            self.log_level.clone(),
        ]);
        if preview {
            args.push("--preview".to_string());
        }
        args
    }
}

#[async_trait::async_trait]
impl Generator for CommandGenerator {
    async fn generate(
        &self,
        language: Language,
        version: &ReleaseVersion,
        preview: bool,
    ) -> Result<GenerationOutput, ReleaseError> {
        let args = self.arguments(language, version, preview);
        info!("Running {} {}", self.program, args.join(" "));

        let failed = |status: String, stdout: String, stderr: String| {
            ReleaseError::GenerationFailed {
                language,
                version: version.to_string(),
                status,
                stdout,
                stderr,
            }
        };

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                failed(
                    "failed to start".to_string(),
                    String::new(),
                    format!("{}: {}", self.program, e),
                )
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        debug!("{} stdout:\n{}", self.program, stdout);
        debug!("{} stderr:\n{}", self.program, stderr);

        if !output.status.success() {
            return Err(failed(output.status.to_string(), stdout, stderr));
        }

        info!("Generated {}@{}", language, version);
        Ok(GenerationOutput { stdout, stderr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(command: &str, args: &[&str]) -> CommandGenerator {
        CommandGenerator::new(&GeneratorConfig {
            command: command.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            log_level: "debug".to_string(),
        })
    }

    #[test]
    fn arguments_include_group_version_and_log_level() {
        let generator = CommandGenerator::new(&GeneratorConfig::default());

        assert_eq!(
            generator.arguments(Language::Python, &ReleaseVersion::new(1, 2, 4), false),
            vec![
                "generate",
                "--group",
                "python",
                "--version",
                "1.2.4",
                "--log-level",
                "info"
            ]
        );
    }

    #[test]
    fn arguments_forward_preview_flag() {
        let generator = CommandGenerator::new(&GeneratorConfig::default());
        let args = generator.arguments(Language::Go, &ReleaseVersion::new(2, 0, 0), true);

        assert_eq!(args.last().map(String::as_str), Some("--preview"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_output_of_successful_run() {
        // `sh -c script name args...`: generator arguments land in $@
        let generator = generator("sh", &["-c", "echo \"$@\"", "fern"]);

        let output = generator
            .generate(Language::TypeScript, &ReleaseVersion::new(2, 0, 0), true)
            .await
            .unwrap();

        assert_eq!(
            output.stdout.trim(),
            "--group typescript --version 2.0.0 --log-level debug --preview"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_generation_failed() {
        let generator = generator("sh", &["-c", "echo partial; echo broken >&2; exit 3", "fern"]);

        let error = generator
            .generate(Language::Java, &ReleaseVersion::new(1, 0, 0), false)
            .await
            .unwrap_err();

        match error {
            ReleaseError::GenerationFailed {
                language,
                version,
                stdout,
                stderr,
                ..
            } => {
                assert_eq!(language, Language::Java);
                assert_eq!(version, "1.0.0");
                assert_eq!(stdout.trim(), "partial");
                assert_eq!(stderr.trim(), "broken");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_program_is_generation_failed() {
        let generator = generator("autorelease-test-no-such-generator", &[]);

        let result = generator
            .generate(Language::Go, &ReleaseVersion::new(1, 0, 0), false)
            .await;

        assert!(matches!(
            result,
            Err(ReleaseError::GenerationFailed { .. })
        ));
    }
}
