use crate::error::SimplexError;
use crate::routines::evaluation::step::StepPolicy;
use crate::routines::output::OutputFile;
use anyhow::{bail, Result};
use config::Config as eConfig;
use serde::{Deserialize, Serialize};

/// Contains all settings for the simplex regression solver
#[derive(Debug, Deserialize, Clone, Serialize, PartialEq, Default)]
#[serde(deny_unknown_fields, default)]
pub struct Settings {
    /// General solver configuration
    pub config: Config,
    /// Configuration for the convergence criteria
    pub convergence: Convergence,
    /// Configuration for logging
    pub log: Log,
    /// Configuration for the output files
    pub output: Output,
}

impl Settings {
    pub fn new() -> Self {
        Settings::default()
    }

    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::new()
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), SimplexError> {
        self.convergence.validate()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn convergence(&self) -> &Convergence {
        &self.convergence
    }

    pub fn log(&self) -> &Log {
        &self.log
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Write a copy of the settings as `settings.json` to the output folder
    pub fn write(&self) -> Result<()> {
        write_settings_to_file(self)
    }
}

/// What to do with a column that cannot be placed on the simplex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Fail with [SimplexError::DegenerateInput]
    #[default]
    Strict,
    /// Fall back to the uniform distribution over the basis vectors
    Uniform,
}

/// General solver configuration
#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// Step-size policy, applied to every column and every iteration
    pub step: StepPolicy,
    /// Number of worker threads for the per-column updates, 0 uses all available cores
    pub threads: usize,
    /// Handling of degenerate target columns
    pub degenerate: DegeneratePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            step: StepPolicy::Diminishing,
            threads: 0,
            degenerate: DegeneratePolicy::Strict,
        }
    }
}

/// This struct contains the convergence criteria for the solver
#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Convergence {
    /// Maximum number of outer iterations
    ///
    /// `None` uses the number of basis vectors, `k`. `Some(0)` returns the initial guess.
    pub max_iterations: Option<usize>,
    /// Mean absolute change in `X` below which the solver stops early
    pub tolerance: f64,
}

impl Default for Convergence {
    fn default() -> Self {
        Convergence {
            max_iterations: None,
            tolerance: crate::routines::evaluation::frank_wolfe::DEFAULT_TOLERANCE,
        }
    }
}

impl Convergence {
    pub fn validate(&self) -> Result<(), SimplexError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(SimplexError::InvalidSettings(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Log {
    /// The maximum log level to display
    ///
    /// The log level is defined as a string, and can be one of the following:
    /// - `trace`
    /// - `debug`
    /// - `info`
    /// - `warn`
    /// - `error`
    pub level: String,
    /// The file to write the log to, relative to the output folder
    pub file: String,
    /// Whether to write the log to file
    pub write: bool,
}

impl Default for Log {
    fn default() -> Self {
        Log {
            level: String::from("info"),
            file: String::from("log.txt"),
            write: false,
        }
    }
}

/// Configuration for the output files
#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Output {
    /// Whether to write the output files
    pub write: bool,
    /// The (relative) path to write the output files to
    pub path: String,
}

impl Default for Output {
    fn default() -> Self {
        Output {
            write: false,
            path: String::from("outputs/"),
        }
    }
}

impl Output {
    /// Parses the output folder location
    ///
    /// If a `#` symbol is found, it is replaced by the first number for which the folder does not exist yet.
    pub fn parse_output_folder(&mut self) -> Result<()> {
        if self.path.is_empty() {
            self.path = Output::default().path;
        }

        let folder = &self.path;
        match folder.matches('#').count() {
            0 => Ok(()),
            1 => {
                let mut num = 1;
                while std::path::Path::new(&folder.replace('#', &num.to_string())).exists() {
                    num += 1;
                }
                self.path = folder.replace('#', &num.to_string());
                Ok(())
            }
            _ => {
                bail!("Only one `#` symbol is allowed in the output path, got '{}'", folder)
            }
        }
    }
}

/// Builder for [Settings]
#[derive(Debug, Clone, Default)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        SettingsBuilder {
            settings: Settings::default(),
        }
    }

    pub fn set_max_iterations(mut self, max_iterations: Option<usize>) -> Self {
        self.settings.convergence.max_iterations = max_iterations;
        self
    }

    pub fn set_tolerance(mut self, tolerance: f64) -> Self {
        self.settings.convergence.tolerance = tolerance;
        self
    }

    pub fn set_step_policy(mut self, step: StepPolicy) -> Self {
        self.settings.config.step = step;
        self
    }

    pub fn set_threads(mut self, threads: usize) -> Self {
        self.settings.config.threads = threads;
        self
    }

    pub fn set_degenerate_policy(mut self, degenerate: DegeneratePolicy) -> Self {
        self.settings.config.degenerate = degenerate;
        self
    }

    pub fn set_log_level(mut self, level: impl Into<String>) -> Self {
        self.settings.log.level = level.into();
        self
    }

    pub fn set_output_path(mut self, path: impl Into<String>) -> Self {
        self.settings.output.path = path.into();
        self
    }

    pub fn set_write_outputs(mut self, write: bool) -> Self {
        self.settings.output.write = write;
        self
    }

    pub fn build(self) -> Settings {
        self.settings
    }
}

/// Parses the settings from a TOML configuration file
///
/// The settings are validated, and a copy of the settings is written to the output folder if output is enabled.
///
/// Entries in the TOML file may be overridden by environment variables. The environment variables must be prefixed with `SIMPLEXREG_`, and the TOML entry must be in uppercase. For example, the thread count may be set with `SIMPLEXREG_CONFIG_THREADS=4`. A single underscore, `_`, is used as the separator for nested entries.
pub fn read(path: impl Into<String>) -> Result<Settings> {
    let settings_path = path.into();

    let parsed = eConfig::builder()
        .add_source(config::File::with_name(&settings_path).format(config::FileFormat::Toml))
        .add_source(config::Environment::with_prefix("SIMPLEXREG").separator("_"))
        .build()?;

    let mut settings: Settings = parsed.try_deserialize()?;

    settings.validate()?;
    settings.output.parse_output_folder()?;

    if settings.output.write {
        if let Err(error) = write_settings_to_file(&settings) {
            bail!("Could not write settings to file: {}", error);
        }
    }

    Ok(settings)
}

/// Writes a copy of the parsed settings to `settings.json` in the output folder
pub fn write_settings_to_file(settings: &Settings) -> Result<()> {
    let serialized = serde_json::to_string_pretty(settings)?;

    let outputfile = OutputFile::new(&settings.output.path, "settings.json")?;
    let mut file = outputfile.into_file();
    std::io::Write::write_all(&mut file, serialized.as_bytes())?;
    Ok(())
}
