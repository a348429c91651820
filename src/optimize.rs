//! The external optimizer boundary.
//!
//! Minification is not done here: an [`Optimizer`] rewrites a file in place
//! and the compiler only relies on it running once per icon, before the
//! icon is read.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::SpritzError;

/// Rewrites an icon file in place.
pub trait Optimizer {
    fn optimize(&self, path: &Path) -> Result<(), SpritzError>;
}

impl<F> Optimizer for F
where
    F: Fn(&Path) -> Result<(), SpritzError>,
{
    fn optimize(&self, path: &Path) -> Result<(), SpritzError> {
        self(path)
    }
}

/// Leaves files untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopOptimizer;

impl Optimizer for NoopOptimizer {
    fn optimize(&self, _path: &Path) -> Result<(), SpritzError> {
        Ok(())
    }
}

/// Runs svgo (or a compatible CLI) as `<program> <args..> --input <file> --output <file>`.
#[derive(Debug, Clone)]
pub struct SvgoOptimizer {
    program: PathBuf,
    args: Vec<String>,
}

impl SvgoOptimizer {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Find `program`, preferring the project's `node_modules/.bin` over `PATH`.
    pub fn locate(program: &str, project_root: &Path, args: Vec<String>) -> Result<Self, SpritzError> {
        let local = project_root.join("node_modules").join(".bin").join(program);
        if local.is_file() {
            return Ok(Self::new(local, args));
        }
        which::which(program)
            .map(|found| Self::new(found, args))
            .map_err(|_| SpritzError::OptimizerUnavailable {
                program: program.to_string(),
            })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Optimizer for SvgoOptimizer {
    fn optimize(&self, path: &Path) -> Result<(), SpritzError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("--input")
            .arg(path)
            .arg("--output")
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| SpritzError::OptimizationFailure {
                path: path.to_path_buf(),
                message: format!("cannot run {}: {}", self.program.display(), e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => format!("{} exited with {}", self.program.display(), output.status),
                msg => msg.to_string(),
            };
            return Err(SpritzError::OptimizationFailure {
                path: path.to_path_buf(),
                message,
            });
        }

        debug!(path = %path.display(), "optimized");
        Ok(())
    }
}
