use crate::routines::evaluation::convergence::Status;
use crate::routines::settings::Settings;
use crate::structs::coefficients::Coefficients;
use anyhow::{Context, Result};
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fs::{create_dir_all, File, OpenOptions};
use std::path::{Path, PathBuf};

pub mod iterations;

use iterations::IterationLog;

/// Defines the result of a simplex regression solve
///
/// Holds the coefficients together with the diagnostics of the run, so callers that need a
/// convergence guarantee can inspect the final change and objective themselves.
#[derive(Debug, Clone, Serialize)]
pub struct Fit {
    coefficients: Coefficients,
    iterations: usize,
    status: Status,
    delta: f64,
    objective: f64,
    log: IterationLog,
}

impl Fit {
    pub fn new(
        coefficients: Coefficients,
        iterations: usize,
        status: Status,
        delta: f64,
        objective: f64,
        log: IterationLog,
    ) -> Self {
        Self {
            coefficients,
            iterations,
            status,
            delta,
            objective,
            log,
        }
    }

    /// The coefficient matrix `X`, `k x n`
    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    pub fn into_coefficients(self) -> Coefficients {
        self.coefficients
    }

    /// Number of outer iterations performed
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn converged(&self) -> bool {
        self.status == Status::Converged
    }

    /// Mean absolute change of `X` in the last iteration, infinite if no iteration ran
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Final reconstruction error `||AX - B||_F` of the returned coefficients
    pub fn objective(&self) -> f64 {
        self.objective
    }

    pub fn log(&self) -> &IterationLog {
        &self.log
    }

    /// Write `coefficients.csv` and `iterations.csv` to the output folder, if output is enabled
    pub fn write_outputs(&self, settings: &Settings) -> Result<()> {
        if settings.output().write {
            tracing::debug!("Writing outputs to {:?}", settings.output().path);
            settings.write()?;
            self.write_coefficients(&settings.output().path)
                .context("Failed to write coefficients")?;
            self.log
                .write(&settings.output().path)
                .context("Failed to write iteration log")?;
        }
        Ok(())
    }

    /// Write the coefficients as CSV, one row per basis vector and one column per sample
    pub fn write_coefficients(&self, folder: &str) -> Result<()> {
        tracing::debug!("Writing coefficients...");
        let outputfile = OutputFile::new(folder, "coefficients.csv")
            .context("Failed to create output file for coefficients")?;
        let mut writer = outputfile.csv_writer();

        let header: Vec<String> = (0..self.coefficients.nsamples())
            .map(|j| format!("sample_{}", j))
            .collect();
        writer.write_record(&header)?;

        let matrix = self.coefficients.matrix();
        for i in 0..matrix.nrows() {
            writer.write_record((0..matrix.ncols()).map(|j| matrix[(i, j)].to_string()))?;
        }
        writer.flush()?;
        tracing::debug!("Coefficients written to {:?}", outputfile.path());
        Ok(())
    }
}

/// A truncated output file in the output folder, with its folder created on demand
#[derive(Debug)]
pub(crate) struct OutputFile {
    file: File,
    path: PathBuf,
}

impl OutputFile {
    pub(crate) fn new(folder: impl AsRef<Path>, file_name: &str) -> Result<Self> {
        let folder = folder.as_ref();
        create_dir_all(folder)
            .with_context(|| format!("Failed to create output folder {:?}", folder))?;

        let path = folder.join(file_name);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("Failed to open output file {:?}", path))?;

        Ok(OutputFile { file, path })
    }

    /// CSV writer over the file, with a header row
    pub(crate) fn csv_writer(&self) -> Writer<&File> {
        WriterBuilder::new().has_headers(true).from_writer(&self.file)
    }

    pub(crate) fn into_file(self) -> File {
        self.file
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}
