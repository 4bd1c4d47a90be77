use anyhow::Result;
use serde::Serialize;

use super::OutputFile;

/// Summary of one outer iteration
///
/// - `iteration`: zero-based iteration index
/// - `objective`: `||AX - B||_F` at the end of the iteration
/// - `delta`: mean absolute change of `X` during the iteration
/// - `forward_steps` / `away_steps`: how many columns took each kind of step
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IterationSummary {
    iteration: usize,
    objective: f64,
    delta: f64,
    forward_steps: usize,
    away_steps: usize,
}

impl IterationSummary {
    pub fn new(
        iteration: usize,
        objective: f64,
        delta: f64,
        forward_steps: usize,
        away_steps: usize,
    ) -> Self {
        Self {
            iteration,
            objective,
            delta,
            forward_steps,
            away_steps,
        }
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }
    pub fn objective(&self) -> f64 {
        self.objective
    }
    pub fn delta(&self) -> f64 {
        self.delta
    }
    pub fn forward_steps(&self) -> usize {
        self.forward_steps
    }
    pub fn away_steps(&self) -> usize {
        self.away_steps
    }
}

/// This holds one [IterationSummary] per outer iteration
#[derive(Debug, Clone, Default, Serialize)]
pub struct IterationLog {
    iterations: Vec<IterationSummary>,
}

impl IterationLog {
    pub fn new() -> Self {
        Self {
            iterations: Vec::new(),
        }
    }

    pub fn iterations(&self) -> &[IterationSummary] {
        &self.iterations
    }

    pub fn push(&mut self, summary: IterationSummary) {
        self.iterations.push(summary);
    }

    pub fn len(&self) -> usize {
        self.iterations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.iterations.is_empty()
    }

    pub fn last(&self) -> Option<&IterationSummary> {
        self.iterations.last()
    }

    /// Objective after every iteration, in order
    pub fn objectives(&self) -> Vec<f64> {
        self.iterations.iter().map(|s| s.objective).collect()
    }

    pub fn write(&self, folder: &str) -> Result<()> {
        tracing::debug!("Writing iteration log...");
        let outputfile = OutputFile::new(folder, "iterations.csv")?;
        let mut writer = outputfile.csv_writer();

        for summary in &self.iterations {
            writer.serialize(summary)?;
        }
        writer.flush()?;
        tracing::debug!("Iteration log written to {:?}", outputfile.path());
        Ok(())
    }
}
