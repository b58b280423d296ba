use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::oracle::{OracleError, TypeDiagnostic, TypeOracle};

const SCRATCH_FILE: &str = "artifact.tsx";
const POLL: Duration = Duration::from_millis(10);

/// Runs an external type checker (by default `npx tsc`) over a scratch copy of the source.
#[derive(Debug, Clone)]
pub struct ProcessOracle {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    working_dir: Option<PathBuf>,
    ignored_codes: Vec<String>,
}

impl Default for ProcessOracle {
    fn default() -> Self {
        Self::new(
            "npx",
            [
                "tsc",
                "--noEmit",
                "--pretty",
                "false",
                "--jsx",
                "react-jsx",
                "--skipLibCheck",
            ],
        )
    }
}

impl ProcessOracle {
    /// Checker invoked as `program args... <scratch file>`.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            timeout: Duration::from_secs(10),
            working_dir: None,
            // Unresolvable modules and missing typings say nothing about the artifact itself.
            ignored_codes: vec!["TS2307".to_owned(), "TS7016".to_owned()],
        }
    }

    /// Kill the checker after `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the checker from `dir` (typically a project with `node_modules`); the scratch
    /// file is placed inside it.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Diagnostic codes to drop from the result.
    pub fn ignore_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    fn scratch_dir(&self) -> std::io::Result<tempfile::TempDir> {
        let builder = {
            let mut b = tempfile::Builder::new();
            b.prefix(".framewright-check-");
            b
        };
        match &self.working_dir {
            Some(dir) => builder.tempdir_in(dir),
            None => builder.tempdir(),
        }
    }
}

fn drain<R: std::io::Read + Send + 'static>(mut pipe: R) -> JoinHandle<std::io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut bytes = Vec::new();
        pipe.read_to_end(&mut bytes)?;
        Ok(bytes)
    })
}

fn join(handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>) -> Result<Vec<u8>, OracleError> {
    match handle {
        Some(h) => h
            .join()
            .map_err(|_| OracleError::Failed("output drain thread panicked".to_owned()))?
            .map_err(OracleError::Io),
        None => Ok(Vec::new()),
    }
}

impl TypeOracle for ProcessOracle {
    #[tracing::instrument(skip_all, fields(program = %self.program))]
    fn check_types(&self, source: &str) -> Result<Vec<TypeDiagnostic>, OracleError> {
        let scratch = self.scratch_dir()?;
        let file = scratch.path().join(SCRATCH_FILE);
        std::fs::write(&file, source)?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(&file)
            .current_dir(self.working_dir.as_deref().unwrap_or(scratch.path()))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| OracleError::Launch {
            program: self.program.clone(),
            source,
        })?;
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let started = Instant::now();
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if started.elapsed() >= self.timeout {
                let _ = child.kill();
                let _ = child.wait();
                tracing::warn!(timeout_ms = self.timeout.as_millis() as u64, "type check timed out");
                return Err(OracleError::Timeout(self.timeout));
            }
            std::thread::sleep(POLL);
        };

        let stdout = String::from_utf8_lossy(&join(stdout)?).into_owned();
        let stderr = String::from_utf8_lossy(&join(stderr)?).into_owned();
        let mut diagnostics = parse_diagnostics(&stdout);
        diagnostics.extend(parse_diagnostics(&stderr));

        if !status.success() && diagnostics.is_empty() {
            let detail = if stderr.trim().is_empty() {
                stdout.trim()
            } else {
                stderr.trim()
            };
            return Err(OracleError::Failed(format!(
                "`{}` exited with status {status}: {detail}",
                self.program
            )));
        }
        diagnostics.retain(|d| !self.ignored_codes.contains(&d.category));
        tracing::debug!(
            diagnostics = diagnostics.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "type check finished"
        );
        Ok(diagnostics)
    }
}

/// Parse `file(line,col): error TSnnnn: message` lines.
pub(crate) fn parse_diagnostics(output: &str) -> Vec<TypeDiagnostic> {
    output.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<TypeDiagnostic> {
    let (location, rest) = line.split_once("): error ")?;
    let open = location.rfind('(')?;
    let (l, c) = location.get(open + 1..)?.split_once(',')?;
    let (code, message) = rest.split_once(": ")?;
    Some(TypeDiagnostic {
        message: message.trim().to_owned(),
        line: l.trim().parse().ok()?,
        column: c.trim().parse().ok()?,
        category: code.trim().to_owned(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/oracle/process.rs"]
mod tests;
