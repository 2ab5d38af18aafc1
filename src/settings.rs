use std::fs;
use std::path::Path;

use color_eyre::Result;
use color_eyre::eyre::{WrapErr, bail};
use serde::{Deserialize, Serialize};

/// Per-level formation configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Number of columns
    pub formation_width: usize,
    /// Number of rows
    pub formation_height: usize,
    /// Frames between movement ticks for a full formation
    pub base_speed: u32,
    /// Milliseconds between basic shots
    pub shooting_frequency: u64,
    /// 0 for a normal wave
    #[serde(default)]
    pub boss_stage: u32,
}

impl GameSettings {
    pub fn new(
        formation_width: usize,
        formation_height: usize,
        base_speed: u32,
        shooting_frequency: u64,
    ) -> Self {
        Self {
            formation_width,
            formation_height,
            base_speed,
            shooting_frequency,
            boss_stage: 0,
        }
    }

    /// Single boss level for the given stage
    pub fn boss(stage: u32) -> Self {
        Self::new(1, 1, 60, 2000).with_boss_stage(stage)
    }

    pub fn with_boss_stage(mut self, boss_stage: u32) -> Self {
        self.boss_stage = boss_stage;
        self
    }

    pub fn is_boss_level(&self) -> bool {
        self.boss_stage != 0
    }
}

/// Logical playfield size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    pub width: i32,
    pub height: i32,
}

impl Screen {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new(448, 520)
    }
}

/// Seven classic waves, each followed by a boss of increasing stage
pub fn default_campaign() -> Vec<GameSettings> {
    let waves = [
        GameSettings::new(5, 4, 60, 2000),
        GameSettings::new(5, 5, 50, 2500),
        GameSettings::new(6, 5, 40, 1500),
        GameSettings::new(6, 6, 30, 1500),
        GameSettings::new(7, 6, 20, 1000),
        GameSettings::new(7, 7, 10, 1000),
        GameSettings::new(8, 7, 2, 500),
    ];
    waves
        .into_iter()
        .zip(1..)
        .flat_map(|(wave, stage)| [wave, GameSettings::boss(stage)])
        .collect()
}

/// Parses a JSON array of level settings
pub fn parse_levels(json: &str) -> Result<Vec<GameSettings>> {
    let levels: Vec<GameSettings> =
        serde_json::from_str(json).wrap_err("level file is not a valid settings list")?;
    if levels.is_empty() {
        bail!("level file contains no levels");
    }
    for (index, level) in levels.iter().enumerate() {
        if level.formation_width == 0 || level.formation_height == 0 {
            bail!("level {} has an empty formation grid", index + 1);
        }
    }
    Ok(levels)
}

pub fn load_levels(path: &Path) -> Result<Vec<GameSettings>> {
    let json = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read level file {}", path.display()))?;
    parse_levels(&json).wrap_err_with(|| format!("failed to load {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_campaign_alternates_waves_and_bosses() {
        let campaign = default_campaign();
        assert_eq!(campaign.len(), 14);
        assert_eq!(campaign[0], GameSettings::new(5, 4, 60, 2000));
        assert_eq!(campaign[1], GameSettings::boss(1));
        assert_eq!(campaign[13].boss_stage, 7);
        assert!(campaign.iter().step_by(2).all(|level| !level.is_boss_level()));
    }

    #[test]
    fn test_parse_levels_defaults_boss_stage() {
        let json = r#"[
            {"formation_width": 5, "formation_height": 4, "base_speed": 60, "shooting_frequency": 2000},
            {"formation_width": 1, "formation_height": 1, "base_speed": 60, "shooting_frequency": 2000, "boss_stage": 3}
        ]"#;
        let levels = parse_levels(json).unwrap();
        assert_eq!(levels[0].boss_stage, 0);
        assert_eq!(levels[1], GameSettings::boss(3));
    }

    #[test]
    fn test_parse_levels_rejects_bad_input() {
        assert!(parse_levels("[]").is_err());
        assert!(parse_levels("not json").is_err());
        let empty_grid = r#"[{"formation_width": 0, "formation_height": 4, "base_speed": 60, "shooting_frequency": 2000}]"#;
        assert!(parse_levels(empty_grid).is_err());
    }

    #[test]
    fn test_load_levels_reports_missing_file() {
        let err = load_levels(Path::new("does/not/exist.json")).unwrap_err();
        assert!(format!("{err:#}").contains("does/not/exist.json"));
    }

    #[test]
    fn test_settings_round_trip_through_json() {
        let campaign = default_campaign();
        let json = serde_json::to_string(&campaign).unwrap();
        assert_eq!(parse_levels(&json).unwrap(), campaign);
    }
}
