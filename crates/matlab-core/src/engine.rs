//! MATLAB engine gateway.
//!
//! [`MatlabEngine`] owns the scratch directory and every invocation of the
//! MATLAB executable. Each call spawns at most one MATLAB process and waits
//! for it; nothing is pooled or kept running between calls.
//!
//! # Timeouts
//!
//! Only inline execution ([`MatlabEngine::execute_code`]) is bounded, by
//! [`EngineConfig::inline_timeout`]. Saved scripts may open figures and
//! pause, so [`MatlabEngine::execute_script`] waits for as long as MATLAB
//! runs. Children are spawned with `kill_on_drop`, so a timed-out MATLAB
//! process is killed. Processes MATLAB itself forks are not tracked.
//!
//! # Examples
//!
//! ```no_run
//! use matlab_mcp_core::{EngineConfig, MatlabEngine};
//!
//! # async fn example() -> matlab_mcp_core::Result<()> {
//! let engine = MatlabEngine::new(EngineConfig::from_env(1))?;
//!
//! let saved = engine.generate_script("wave", "plot(sin(0:0.1:6));").await?;
//! println!("saved to {}", saved.script_path.display());
//!
//! let result = engine.execute_script("wave").await?;
//! if let Some(err) = result.error {
//!     eprintln!("MATLAB reported: {err}");
//! }
//! # Ok(())
//! # }
//! ```

use crate::types::{SCRIPT_EXTENSION, is_safe_file_stem};
use crate::{
    EngineConfig, Error, ExecutionResult, GeneratedScript, Result, ScriptName, ShutdownOutcome,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Error text reported when inline execution exceeds its timeout.
pub const TIMEOUT_MESSAGE: &str = "execution timed out";

/// Output substituted when a successful inline run prints nothing.
pub const NO_OUTPUT_PLACEHOLDER: &str = "Execution completed (no output captured)";

/// Prefix of scratch files written for inline execution.
const INLINE_SCRIPT_PREFIX: &str = "temp_script_";

/// Captured streams of a MATLAB process that exited with status zero.
#[derive(Debug)]
struct ProcessOutput {
    stdout: String,
    stderr: String,
}

/// Gateway to the MATLAB command-line engine.
#[derive(Debug, Clone)]
pub struct MatlabEngine {
    config: EngineConfig,
}

impl MatlabEngine {
    /// Creates the gateway and makes sure the scratch directory exists.
    ///
    /// A relative scratch directory is resolved against the current working
    /// directory so script paths handed to MATLAB are always absolute.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the configuration is invalid, or
    /// [`Error::Io`] if the scratch directory cannot be created.
    pub fn new(mut config: EngineConfig) -> Result<Self> {
        config.validate()?;

        config.temp_dir = std::path::absolute(&config.temp_dir).map_err(|source| Error::Io {
            path: config.temp_dir.clone(),
            source,
        })?;

        std::fs::create_dir_all(&config.temp_dir).map_err(|source| Error::Io {
            path: config.temp_dir.clone(),
            source,
        })?;

        tracing::info!(
            executable = %config.executable_path.display(),
            temp_dir = %config.temp_dir.display(),
            pause_secs = config.pause_secs,
            "MATLAB engine configured"
        );

        Ok(Self { config })
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the scratch directory.
    #[must_use]
    pub fn temp_dir(&self) -> &Path {
        &self.config.temp_dir
    }

    /// Returns the path a script with this name is stored at.
    #[must_use]
    pub fn script_path(&self, name: &ScriptName) -> PathBuf {
        self.config.temp_dir.join(name.file_name())
    }

    /// Saves `code` as `<temp_dir>/<name>.m`, replacing any previous version.
    ///
    /// The text is written to a temporary file in the scratch directory and
    /// renamed over the target, so readers see either the old or the new
    /// content in full.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifier`] if `name` is not a valid MATLAB
    /// identifier (nothing is written), or [`Error::PersistenceFailure`] if
    /// the write fails.
    pub async fn generate_script(&self, name: &str, code: &str) -> Result<GeneratedScript> {
        let name = ScriptName::parse(name)?;
        let script_path = self.script_path(&name);

        let dir = self.config.temp_dir.clone();
        let target = script_path.clone();
        let contents = code.to_owned();
        tokio::task::spawn_blocking(move || write_atomically(&dir, &target, &contents))
            .await
            .map_err(|e| Error::PersistenceFailure {
                message: format!("Task join error: {e}"),
                source: None,
            })?
            .map_err(|source| Error::PersistenceFailure {
                message: source.to_string(),
                source: Some(source),
            })?;

        tracing::debug!(script = %name, path = %script_path.display(), "Saved MATLAB script");

        Ok(GeneratedScript {
            code: code.to_owned(),
            script_path,
        })
    }

    /// Runs a snippet of MATLAB code once, bounded by the inline timeout.
    ///
    /// The code is written to `temp_script_<millis>.m` in the scratch
    /// directory and run in batch mode. Two calls within the same
    /// millisecond share a file name. Failures never surface as `Err`: spawn
    /// errors, non-zero exits and timeouts all produce an
    /// [`ExecutionResult`] with an empty `output` and the message in `error`.
    pub async fn execute_code(&self, code: &str) -> ExecutionResult {
        match self.run_inline(code).await {
            Ok(out) => {
                let output = if out.stdout.is_empty() {
                    NO_OUTPUT_PLACEHOLDER.to_string()
                } else {
                    out.stdout
                };
                ExecutionResult::success(output, Some(out.stderr))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Inline MATLAB execution failed");
                ExecutionResult::failure(e.to_string())
            }
        }
    }

    async fn run_inline(&self, code: &str) -> Result<ProcessOutput> {
        let dir = &self.config.temp_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| Error::Io {
                path: dir.clone(),
                source,
            })?;

        let millis = chrono::Utc::now().timestamp_millis();
        let script_path = dir.join(format!("{INLINE_SCRIPT_PREFIX}{millis}.{SCRIPT_EXTENSION}"));
        tokio::fs::write(&script_path, code)
            .await
            .map_err(|source| Error::PersistenceFailure {
                message: source.to_string(),
                source: Some(source),
            })?;

        let batch = format!("run('{}');", matlab_path_literal(&script_path));
        self.run(
            &["-nosplash", "-batch", batch.as_str()],
            Some(self.config.inline_timeout),
        )
        .await
    }

    /// Runs a saved script, then pauses for `pause_secs` before exiting.
    ///
    /// No timeout applies. Subprocess failures are reported through the
    /// returned [`ExecutionResult`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifier`] for an invalid name and
    /// [`Error::ScriptNotFound`] when no such script exists; MATLAB is not
    /// started in either case.
    pub async fn execute_script(&self, name: &str) -> Result<ExecutionResult> {
        let name = ScriptName::parse(name)?;
        let script_path = self.script_path(&name);

        let exists = tokio::fs::metadata(&script_path)
            .await
            .is_ok_and(|m| m.is_file());
        if !exists {
            return Err(Error::ScriptNotFound {
                name: name.into_inner(),
                dir: self.config.temp_dir.clone(),
            });
        }

        let batch = format!(
            "run('{}'); pause({}); exit;",
            matlab_path_literal(&script_path),
            self.config.pause_secs
        );

        match self.run(&["-nosplash", "-batch", batch.as_str()], None).await {
            Ok(out) => Ok(ExecutionResult::success(out.stdout, Some(out.stderr))),
            Err(e) => {
                tracing::warn!(script = %name, error = %e, "Error executing MATLAB script");
                Ok(ExecutionResult::failure(e.to_string()))
            }
        }
    }

    /// Checks whether MATLAB can be started.
    ///
    /// Returns `true` iff a trivial invocation exits with status zero. The
    /// result is not cached here.
    pub async fn check_availability(&self) -> bool {
        let probe = self
            .run(
                &[
                    "-nosplash",
                    "-nodesktop",
                    "-r",
                    "disp('MATLAB is available'); exit;",
                ],
                None,
            )
            .await;

        match probe {
            Ok(_) => {
                tracing::info!("MATLAB is available");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "MATLAB is not available");
                false
            }
        }
    }

    /// Asks running MATLAB instances to quit.
    ///
    /// Best effort: only a failure that says the executable was not found
    /// (or not recognized) is reported as unsuccessful. Every other failure,
    /// including having nothing to close, counts as success.
    pub async fn close_windows(&self) -> ShutdownOutcome {
        let result = self
            .run(
                &["-nosplash", "-nodesktop", "-r", "quit force; exit;"],
                None,
            )
            .await;

        match result {
            Ok(_) => ShutdownOutcome::ok(),
            Err(e) => {
                let message = e.to_string();
                let lower = message.to_lowercase();
                if lower.contains("not found") || lower.contains("not recognized") {
                    ShutdownOutcome::failed(format!("MATLAB executable not found: {message}"))
                } else {
                    tracing::debug!(error = %message, "Ignoring close failure");
                    ShutdownOutcome::ok()
                }
            }
        }
    }

    /// Lists the stems of all `.m` files in the scratch directory, sorted.
    ///
    /// Every regular `.m` file is included whether or not its stem is a
    /// valid identifier, except stems [`read_script`](Self::read_script)
    /// would refuse. A missing scratch directory yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the directory exists but cannot be read.
    pub async fn list_scripts(&self) -> Result<Vec<String>> {
        let dir = self.config.temp_dir.clone();

        tokio::task::spawn_blocking(move || {
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
                Err(source) => return Err(Error::Io { path: dir, source }),
            };

            let mut scripts: Vec<String> = entries
                .flatten()
                .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
                .filter_map(|entry| {
                    let path = entry.path();
                    if path.extension().and_then(|e| e.to_str()) != Some(SCRIPT_EXTENSION) {
                        return None;
                    }
                    let stem = path.file_stem()?.to_str()?;
                    is_safe_file_stem(stem).then(|| stem.to_owned())
                })
                .collect();

            scripts.sort();
            Ok(scripts)
        })
        .await
        .map_err(|e| Error::Io {
            path: self.config.temp_dir.clone(),
            source: std::io::Error::other(format!("Task join error: {e}")),
        })?
    }

    /// Reads the source text of `<stem>.m` in the scratch directory.
    ///
    /// `stem` need not be a valid identifier, only a name that stays inside
    /// the scratch directory (see [`is_safe_file_stem`]).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScriptNotFound`] if the stem is unsafe or the file
    /// does not exist, and [`Error::Io`] for any other read failure.
    pub async fn read_script(&self, stem: &str) -> Result<String> {
        let not_found = || Error::ScriptNotFound {
            name: stem.to_owned(),
            dir: self.config.temp_dir.clone(),
        };

        if !is_safe_file_stem(stem) {
            return Err(not_found());
        }

        let path = self
            .config
            .temp_dir
            .join(format!("{stem}.{SCRIPT_EXTENSION}"));
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| match source.kind() {
                std::io::ErrorKind::NotFound => not_found(),
                _ => Error::Io { path, source },
            })
    }

    /// Spawns MATLAB with `args` and collects its output.
    ///
    /// Arguments are passed directly to the process, without a shell.
    async fn run(&self, args: &[&str], timeout: Option<Duration>) -> Result<ProcessOutput> {
        let program = &self.config.executable_path;
        tracing::debug!(program = %program.display(), ?args, ?timeout, "Invoking MATLAB");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_failure(program, &e))?;

        let waited = match timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| Error::SubprocessFailure {
                    message: TIMEOUT_MESSAGE.to_string(),
                })?,
            None => child.wait_with_output().await,
        };

        let output = waited.map_err(|e| Error::SubprocessFailure {
            message: format!("Failed to wait for MATLAB: {e}"),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(Error::SubprocessFailure {
                message: exit_failure(program, output.status, &stderr),
            });
        }

        Ok(ProcessOutput { stdout, stderr })
    }
}

/// Writes `contents` to a temp file in `dir` and renames it onto `target`.
fn write_atomically(dir: &Path, target: &Path, contents: &str) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(target).map_err(|e| e.error)?;
    Ok(())
}

/// Formats a path as the body of a MATLAB single-quoted string.
///
/// Backslashes become forward slashes, which MATLAB accepts on every
/// platform, and single quotes are doubled.
fn matlab_path_literal(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").replace('\'', "''")
}

fn spawn_failure(program: &Path, err: &std::io::Error) -> Error {
    let message = if err.kind() == std::io::ErrorKind::NotFound {
        format!(
            "Failed to start '{}': executable not found ({err})",
            program.display()
        )
    } else {
        format!("Failed to start '{}': {err}", program.display())
    };
    Error::SubprocessFailure { message }
}

fn exit_failure(program: &Path, status: ExitStatus, stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("Command failed: '{}' exited with {status}", program.display())
    } else {
        format!(
            "Command failed: '{}' exited with {status}\n{stderr}",
            program.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn engine_in(dir: &TempDir) -> MatlabEngine {
        let config = EngineConfig::builder()
            .executable_path(dir.path().join("no-such-matlab"))
            .temp_dir(dir.path().join("scratch"))
            .build();
        MatlabEngine::new(config).unwrap()
    }

    #[test]
    fn test_matlab_path_literal() {
        assert_eq!(
            matlab_path_literal(Path::new(r"C:\Users\me\plot1.m")),
            "C:/Users/me/plot1.m"
        );
        assert_eq!(
            matlab_path_literal(Path::new("/tmp/o'brien/x.m")),
            "/tmp/o''brien/x.m"
        );
    }

    #[test]
    fn test_new_creates_temp_dir() {
        let dir = TempDir::new().unwrap();
        let engine = engine_in(&dir);
        assert!(engine.temp_dir().is_dir());
        assert!(engine.temp_dir().is_absolute());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = EngineConfig::builder().executable_path("").build();
        let err = MatlabEngine::new(config).unwrap_err();
        assert!(err.is_config_error());
    }

    #[tokio::test]
    async fn test_generate_script_writes_file() {
        let dir = TempDir::new().unwrap();
        let engine = engine_in(&dir);

        let saved = engine.generate_script("myScript", "x = 1;").await.unwrap();

        assert_eq!(saved.code, "x = 1;");
        assert_eq!(saved.script_path, engine.temp_dir().join("myScript.m"));
        assert!(saved.script_path.is_absolute());
        let on_disk = std::fs::read_to_string(&saved.script_path).unwrap();
        assert_eq!(on_disk, "x = 1;");
    }

    #[tokio::test]
    async fn test_generate_script_overwrites() {
        let dir = TempDir::new().unwrap();
        let engine = engine_in(&dir);

        engine.generate_script("myScript", "x = 1;").await.unwrap();
        let saved = engine.generate_script("myScript", "y = 2;").await.unwrap();

        let on_disk = std::fs::read_to_string(&saved.script_path).unwrap();
        assert_eq!(on_disk, "y = 2;");
    }

    #[tokio::test]
    async fn test_generate_script_rejects_invalid_name() {
        let dir = TempDir::new().unwrap();
        let engine = engine_in(&dir);

        let err = engine.generate_script("1plot", "x = 1;").await.unwrap_err();
        assert!(err.is_invalid_identifier());

        let files = std::fs::read_dir(engine.temp_dir()).unwrap().count();
        assert_eq!(files, 0, "nothing should be written for an invalid name");
    }

    #[tokio::test]
    async fn test_generate_script_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let engine = engine_in(&dir);

        engine.generate_script("a", "disp(1)").await.unwrap();

        let names: Vec<_> = std::fs::read_dir(engine.temp_dir())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.m".to_string()]);
    }

    #[tokio::test]
    async fn test_execute_script_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let engine = engine_in(&dir);

        let err = engine.execute_script("nonexistent").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("nonexistent.m"));
    }

    #[tokio::test]
    async fn test_execute_script_invalid_name() {
        let dir = TempDir::new().unwrap();
        let engine = engine_in(&dir);

        let err = engine.execute_script("../escape").await.unwrap_err();
        assert!(err.is_invalid_identifier());
    }

    #[tokio::test]
    async fn test_execute_code_missing_executable_is_structured() {
        let dir = TempDir::new().unwrap();
        let engine = engine_in(&dir);

        let result = engine.execute_code("disp(1)").await;

        assert_eq!(result.output, "");
        let error = result.error.unwrap();
        assert!(error.contains("not found"), "unexpected error: {error}");
    }

    #[tokio::test]
    async fn test_check_availability_missing_executable() {
        let dir = TempDir::new().unwrap();
        let engine = engine_in(&dir);
        assert!(!engine.check_availability().await);
    }

    #[tokio::test]
    async fn test_close_windows_missing_executable() {
        let dir = TempDir::new().unwrap();
        let engine = engine_in(&dir);

        let outcome = engine.close_windows().await;

        assert!(!outcome.success);
        assert!(
            outcome
                .error
                .unwrap()
                .starts_with("MATLAB executable not found:")
        );
    }

    #[tokio::test]
    async fn test_list_scripts_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        let engine = engine_in(&dir);

        engine.generate_script("b", "2").await.unwrap();
        engine.generate_script("a", "1").await.unwrap();
        std::fs::write(engine.temp_dir().join("notes.txt"), "ignored").unwrap();
        std::fs::write(engine.temp_dir().join("my-plot.m"), "plot(1)").unwrap();
        std::fs::create_dir(engine.temp_dir().join("folder.m")).unwrap();

        let scripts = engine.list_scripts().await.unwrap();
        assert_eq!(scripts, vec!["a", "b", "my-plot"]);
    }

    #[tokio::test]
    async fn test_list_scripts_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let engine = engine_in(&dir);
        std::fs::remove_dir_all(engine.temp_dir()).unwrap();

        assert!(engine.list_scripts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_script() {
        let dir = TempDir::new().unwrap();
        let engine = engine_in(&dir);
        engine.generate_script("fib", "f = [1 1];").await.unwrap();

        assert_eq!(engine.read_script("fib").await.unwrap(), "f = [1 1];");
        assert!(engine.read_script("nope").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_read_script_non_identifier_stem() {
        let dir = TempDir::new().unwrap();
        let engine = engine_in(&dir);
        std::fs::write(engine.temp_dir().join("my-plot.m"), "plot(1)").unwrap();

        assert_eq!(engine.read_script("my-plot").await.unwrap(), "plot(1)");
    }

    #[tokio::test]
    async fn test_read_script_rejects_escaping_stem() {
        let dir = TempDir::new().unwrap();
        let engine = engine_in(&dir);
        std::fs::write(dir.path().join("secret.m"), "hidden").unwrap();

        let err = engine.read_script("../secret").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
