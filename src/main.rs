use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::stdout;
use std::path::{Path, PathBuf};

use wave_formation::app::App;
use wave_formation::logging;
use wave_formation::settings::{default_campaign, load_levels};

fn main() -> Result<()> {
    color_eyre::install()?;
    logging::init(Path::new("debug.log"))?;

    // Optional JSON level file as the only argument
    let levels = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => load_levels(&path)?,
        None => default_campaign(),
    };
    log::info!("Loaded {} levels", levels.len());

    let supports_keyboard_enhancement = matches!(
        crossterm::terminal::supports_keyboard_enhancement(),
        Ok(true)
    );
    log::info!(
        "Keyboard enhancement supported: {}",
        supports_keyboard_enhancement
    );

    enable_raw_mode().wrap_err("failed to enable raw mode")?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Release events are needed for held keys
    if supports_keyboard_enhancement {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).wrap_err("failed to create terminal")?;

    let result = App::new(levels).run(&mut terminal);

    // Cleanup
    disable_raw_mode()?;
    if supports_keyboard_enhancement {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    log::logger().flush();

    result
}
