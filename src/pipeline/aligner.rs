//! The alignment step, as an injected capability.
//!
//! The pipeline only needs "two FASTA files in, one PAF file out". Anything
//! implementing [`Aligner`] can provide that, including plain closures, so the
//! pipeline can be exercised without an external binary.

use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use crate::pipeline::config::AlignerConfig;
use crate::pipeline::PipelineError;

pub trait Aligner {
    /// Align `query` against `reference`, writing PAF to `output`.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Aligner` if the alignment could not be produced.
    fn align(&self, reference: &Path, query: &Path, output: &Path) -> Result<(), PipelineError>;
}

impl<F> Aligner for F
where
    F: Fn(&Path, &Path, &Path) -> Result<(), PipelineError>,
{
    fn align(&self, reference: &Path, query: &Path, output: &Path) -> Result<(), PipelineError> {
        self(reference, query, output)
    }
}

/// Runs minimap2 in assembly-to-assembly mode with base-level CIGAR output
#[derive(Debug, Clone)]
pub struct Minimap2Aligner {
    config: AlignerConfig,
}

impl Minimap2Aligner {
    #[must_use]
    pub fn new(config: AlignerConfig) -> Self {
        Self { config }
    }

    /// Arguments passed to the executable, in order
    #[must_use]
    pub fn arguments(&self, reference: &Path, query: &Path, output: &Path) -> Vec<String> {
        let mut args = vec![
            "-x".to_string(),
            self.config.preset.clone(),
            "-c".to_string(),
            "--eqx".to_string(),
            "-o".to_string(),
            output.display().to_string(),
        ];
        args.extend(self.config.extra_args.iter().cloned());
        args.push(reference.display().to_string());
        args.push(query.display().to_string());
        args
    }
}

impl Aligner for Minimap2Aligner {
    fn align(&self, reference: &Path, query: &Path, output: &Path) -> Result<(), PipelineError> {
        let args = self.arguments(reference, query, output);
        info!(
            program = %self.config.program.display(),
            reference = %reference.display(),
            query = %query.display(),
            "Running aligner"
        );
        debug!(args = ?args, "Aligner arguments");

        let result = Command::new(&self.config.program)
            .args(&args)
            .output()
            .map_err(|e| {
                PipelineError::Aligner(format!(
                    "failed to start '{}': {e}",
                    self.config.program.display()
                ))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let last_line = stderr.lines().last().unwrap_or("").trim();
            return Err(PipelineError::Aligner(format!(
                "'{}' exited with {}: {last_line}",
                self.config.program.display(),
                result.status
            )));
        }

        Ok(())
    }
}
