use std::path::Path;

use color_eyre::{
    config::{HookBuilder, Theme},
    eyre::{self, Context},
};
use fern_format::{Format, Stream};

/// Installs color-eyre and a panic hook that both prints the panic to stderr and logs it,
/// so panics in worker threads end up in the log file as well.
pub fn init_eyre() -> eyre::Result<()> {
    let eyre_color = if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        Theme::dark()
    } else {
        Theme::new()
    };

    let (stderr_panic_hook, eyre_hook) =
        HookBuilder::default().theme(eyre_color).into_hooks();
    eyre_hook
        .install()
        .wrap_err("failed to install eyre hook")?;

    let (log_panic_hook, _) = HookBuilder::default().theme(Theme::new()).into_hooks();

    std::panic::set_hook(Box::new(move |info| {
        eprintln!("{}", stderr_panic_hook.panic_report(info));

        log::error!(target: "panic", "{}", log_panic_hook.panic_report(info));
    }));

    Ok(())
}

/// The log file is never less verbose than this, whatever is shown on stdout
pub const MIN_LOGFILE_LEVEL: log::LevelFilter = log::LevelFilter::Debug;

/// Logs to stdout at `level`, and to `logfile` if given at `level` or
/// [`MIN_LOGFILE_LEVEL`], whichever is more verbose. Every line carries the thread name,
/// which is how the lines of different workers are told apart.
pub fn init_logger(logfile: Option<&Path>, level: log::LevelFilter) -> eyre::Result<()> {
    let mut dispatch = fern::Dispatch::new().chain(stdout_dispatch(level));
    if let Some(logfile) = logfile {
        dispatch = dispatch.chain(logfile_dispatch(logfile, level)?);
    }

    dispatch.apply().wrap_err("failed to set the logger")?;

    if let Some(logfile) = logfile {
        log::debug!("Logging to: {}", logfile.display());
    }

    Ok(())
}

fn stdout_dispatch(level: log::LevelFilter) -> fern::Dispatch {
    fern::Dispatch::new()
        .level(level)
        .format(
            Format::new()
                .color_if_supported(Stream::Stdout)
                .uniquely_color_threads()
                .callback(),
        )
        .chain(std::io::stdout())
}

fn logfile_dispatch(logfile: &Path, level: log::LevelFilter) -> eyre::Result<fern::Dispatch> {
    let file = fern::log_file(logfile)
        .wrap_err_with(|| format!("failed to open the log file at: {logfile:?}"))?;
    Ok(fern::Dispatch::new()
        .level(level.max(MIN_LOGFILE_LEVEL))
        .format(Format::new().thread_names().callback())
        .chain(file))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn logfile_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("framedup.log");
        logfile_dispatch(&path, log::LevelFilter::Warn).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn logfile_in_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("framedup.log");
        let err = logfile_dispatch(&path, log::LevelFilter::Info).unwrap_err();
        assert!(err.to_string().contains("failed to open the log file"));
    }
}
