use std::fs::OpenOptions;
use std::path::Path;

use color_eyre::Result;
use color_eyre::eyre::WrapErr;

/// Environment variable holding the log filter, `env_logger` syntax
pub const LEVEL_VAR: &str = "WAVE_LOG";

/// Truncates `path` and sends every log record there, since the terminal
/// belongs to the game.
pub fn init(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .wrap_err_with(|| format!("failed to open log file {}", path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().filter_or(LEVEL_VAR, "info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .wrap_err("failed to install logger")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_init_writes_to_file_once() {
        let path = std::env::temp_dir().join(format!("wave_formation_{}.log", std::process::id()));
        init(&path).unwrap();
        log::error!("formation log sink ready");
        log::logger().flush();
        assert!(
            fs::read_to_string(&path)
                .unwrap()
                .contains("formation log sink ready")
        );

        // Only one global logger per process
        assert!(init(&path).is_err());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_unwritable_path_reports_context() {
        let err = init(Path::new("does/not/exist/debug.log")).unwrap_err();
        assert!(format!("{err:#}").contains("does/not/exist/debug.log"));
    }
}
