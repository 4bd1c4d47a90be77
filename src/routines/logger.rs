use std::sync::Mutex;
use std::time::Instant;

use crate::routines::output::OutputFile;
use crate::routines::settings::Settings;
use anyhow::Result;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Setup logging for the library
///
/// This function sets up logging for the library. It uses the `tracing` crate, and the `tracing-subscriber` crate for formatting.
///
/// The log level is taken from [Settings::log], and defaults to `INFO`.
/// Log messages are always written to stdout. If `log.write` is set, they are also written to `log.file` inside the output folder.
///
/// Calling this more than once returns an error, as the global subscriber can only be set once.
/// Callers embedding the solver in a larger application should install their own subscriber instead.
pub fn setup_log(settings: &Settings) -> Result<()> {
    let env_filter = EnvFilter::new(settings.log.level.as_str());

    let timestamper = CompactTimestamp {
        start: Instant::now(),
    };

    let subscriber = Registry::default().with(env_filter);

    let file_layer = if settings.log.write {
        let outputfile = OutputFile::new(&settings.output.path, &settings.log.file)?;
        Some(
            fmt::layer()
                .with_writer(Mutex::new(outputfile.into_file()))
                .with_ansi(false)
                .with_timer(timestamper.clone()),
        )
    } else {
        None
    };

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_target(false)
        .with_timer(timestamper);

    subscriber.with(file_layer).with(stdout_layer).try_init()?;

    Ok(())
}

#[derive(Clone)]
struct CompactTimestamp {
    start: Instant,
}

impl FormatTime for CompactTimestamp {
    fn format_time(
        &self,
        w: &mut tracing_subscriber::fmt::format::Writer<'_>,
    ) -> Result<(), std::fmt::Error> {
        let elapsed = self.start.elapsed();
        let hours = elapsed.as_secs() / 3600;
        let minutes = (elapsed.as_secs() % 3600) / 60;
        let seconds = elapsed.as_secs() % 60;
        let millis = elapsed.subsec_millis();

        write!(w, "{:02}h {:02}m {:02}.{:03}s", hours, minutes, seconds, millis)
    }
}
