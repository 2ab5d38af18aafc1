use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::entities::{
    Bullet, Clock, EnemyFormation, Entity, GameState, Player, SystemClock, check_collision,
};
use crate::input::{InputAction, InputManager};
use crate::renderer::{GameRenderer, RenderView};
use crate::settings::{GameSettings, Screen, default_campaign};

/// Frames between clearing a level and starting the next one
const LEVEL_DELAY_FRAMES: u64 = 90;
/// Distance of the player ship from the bottom of the playfield
const PLAYER_BOTTOM_OFFSET: i32 = 30;
/// ~60 FPS
const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Boss mechanisms a stage cycles through each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossAttack {
    Volley,
    Beam,
    Homing,
    Spread,
}

/// Attacks used by the boss of a stage. Normal waves (stage 0) have none
/// and fall back to basic shots.
pub fn attack_schedule(boss_stage: u32) -> &'static [BossAttack] {
    match boss_stage {
        0 => &[],
        1 => &[BossAttack::Volley],
        2 => &[BossAttack::Volley, BossAttack::Beam],
        3 => &[BossAttack::Volley, BossAttack::Homing],
        4 => &[BossAttack::Volley, BossAttack::Spread],
        5 => &[BossAttack::Beam, BossAttack::Homing],
        6 => &[BossAttack::Beam, BossAttack::Spread],
        _ => &[
            BossAttack::Volley,
            BossAttack::Beam,
            BossAttack::Homing,
            BossAttack::Spread,
        ],
    }
}

/// The main application which holds the state and logic of the application.
pub struct App {
    running: bool,
    game_state: GameState,
    levels: Vec<GameSettings>,
    /// Index into `levels`
    level: usize,
    screen: Screen,
    clock: Rc<dyn Clock>,
    formation: EnemyFormation,
    player: Player,
    /// Bullets in flight, from both sides
    bullets: Vec<Bullet>,
    score: u32,
    victory: bool,
    /// Frames info
    frame_count: u64,
    level_delay_frames: u64,
    last_frame_time: Instant,
    fps: u32,
    /// Game timers
    game_start_time: Instant,
    final_time_secs: Option<u64>,
    /// internal components
    input_manager: InputManager,
    renderer: GameRenderer,
}

impl App {
    pub fn new(levels: Vec<GameSettings>) -> Self {
        Self::with_clock(levels, Rc::new(SystemClock::new()))
    }

    /// Every formation of the run shares `clock`. An empty level list falls
    /// back to the default campaign.
    pub fn with_clock(levels: Vec<GameSettings>, clock: Rc<dyn Clock>) -> Self {
        let levels = if levels.is_empty() {
            default_campaign()
        } else {
            levels
        };
        let screen = Screen::default();
        let formation = build_formation(&levels[0], screen, &clock);

        let now = Instant::now();
        Self {
            running: true,
            game_state: GameState::Playing,
            levels,
            level: 0,
            screen,
            clock,
            formation,
            player: Player::new(screen.width / 2, screen.height - PLAYER_BOTTOM_OFFSET),
            bullets: Vec::new(),
            score: 0,
            victory: false,
            frame_count: 0,
            level_delay_frames: LEVEL_DELAY_FRAMES,
            last_frame_time: now,
            fps: 0,
            game_start_time: now,
            final_time_secs: None,
            input_manager: InputManager::new(),
            renderer: GameRenderer::new(),
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
        while self.running {
            let now = Instant::now();
            let frame_time = now.duration_since(self.last_frame_time);
            self.last_frame_time = now;
            if frame_time.as_micros() > 0 {
                self.fps = (1_000_000 / frame_time.as_micros()) as u32;
            }

            terminal
                .draw(|frame| {
                    let view = self.view(frame.area());
                    self.renderer.render(frame, &view);
                })
                .wrap_err("failed to draw frame")?;

            self.input_manager.poll_events(self.game_state)?;
            let actions = self.input_manager.get_actions(self.game_state);
            self.step(&actions);

            std::thread::sleep(FRAME_DURATION);
        }
        Ok(())
    }

    fn view(&self, area: Rect) -> RenderView<'_> {
        RenderView {
            game_state: self.game_state,
            formation: &self.formation,
            player: &self.player,
            bullets: &self.bullets,
            screen: self.screen,
            score: self.score,
            level: (self.level + 1).min(self.levels.len()),
            level_count: self.levels.len(),
            victory: self.victory,
            area,
            fps: self.fps,
            elapsed_time_secs: self
                .final_time_secs
                .unwrap_or_else(|| self.game_start_time.elapsed().as_secs()),
        }
    }

    /// Applies one frame of input, then advances the game if it is running
    pub fn step(&mut self, actions: &[InputAction]) {
        self.process_actions(actions);
        if self.game_state == GameState::Playing {
            self.update_game();
        }
    }

    fn process_actions(&mut self, actions: &[InputAction]) {
        for action in actions {
            match action {
                InputAction::Quit => {
                    self.running = false;
                }
                InputAction::Pause => {
                    self.game_state = GameState::Paused;
                }
                InputAction::Resume => {
                    self.game_state = GameState::Playing;
                }
                InputAction::Restart => {
                    let levels = std::mem::take(&mut self.levels);
                    *self = Self::with_clock(levels, Rc::clone(&self.clock));
                }
                InputAction::MoveLeft => {
                    self.player.move_left(0);
                }
                InputAction::MoveRight => {
                    let max_x = self.screen.width - self.player.width();
                    self.player.move_right(max_x);
                }
                InputAction::Fire => {
                    if let Some(bullet) = self.player.try_fire(self.clock.now_ms()) {
                        self.bullets.push(bullet);
                    }
                }
            }
        }
    }

    fn update_game(&mut self) {
        self.frame_count += 1;
        let now = self.clock.now_ms();
        self.player.update(now);

        self.formation.update();
        self.enemy_fire();

        for bullet in &mut self.bullets {
            bullet.advance();
        }
        let screen = self.screen;
        let (gone, kept): (Vec<Bullet>, Vec<Bullet>) = std::mem::take(&mut self.bullets)
            .into_iter()
            .partition(|bullet| bullet.is_out_of_bounds(screen.width, screen.height));
        self.bullets = kept;
        self.formation.bullet_pool_mut().recycle(gone);

        self.check_collisions(now);

        if self.formation.is_empty() {
            if self.level_delay_frames > 0 {
                self.level_delay_frames -= 1;
            } else {
                self.advance_level();
            }
        }

        if !self.player.is_alive() {
            self.end_game(false);
        }
    }

    fn enemy_fire(&mut self) {
        let schedule = attack_schedule(self.formation.boss_stage());
        if schedule.is_empty() {
            self.formation.shoot(&mut self.bullets);
            return;
        }

        let target = self.player.position();
        for attack in schedule {
            match attack {
                BossAttack::Volley => self.formation.boss_attack_volley(&mut self.bullets),
                BossAttack::Beam => self.formation.boss_attack_beam(&mut self.bullets),
                BossAttack::Homing => {
                    self.formation.boss_attack_homing(&mut self.bullets, target)
                }
                BossAttack::Spread => {
                    self.formation.boss_attack_spread(&mut self.bullets, target)
                }
            };
        }
    }

    fn check_collisions(&mut self, now: u64) {
        let mut spent = vec![false; self.bullets.len()];
        let mut hits = Vec::new();

        for (index, bullet) in self.bullets.iter().enumerate() {
            if bullet.is_player_bullet() {
                // Player bullets hitting enemies
                if let Some(ship) = self
                    .formation
                    .live_ships()
                    .find(|ship| check_collision(bullet, *ship))
                {
                    // Points are read before the hit turns the ship into an explosion
                    hits.push((ship.id, ship.damage_per_hit, ship.get_points()));
                    spent[index] = true;
                }
            } else if !self.player.is_destroyed() && check_collision(bullet, &self.player) {
                // Enemy bullets hitting the player
                self.player.take_hit(now);
                spent[index] = true;
            }
        }

        for (id, damage, points) in hits {
            if self.formation.damage(id, damage) {
                self.score += points;
            }
        }

        let mut spent = spent.into_iter();
        let (gone, kept): (Vec<Bullet>, Vec<Bullet>) = std::mem::take(&mut self.bullets)
            .into_iter()
            .partition(|_| spent.next().unwrap_or(false));
        self.bullets = kept;
        self.formation.bullet_pool_mut().recycle(gone);
    }

    fn advance_level(&mut self) {
        self.level += 1;
        match self.levels.get(self.level).copied() {
            Some(settings) => {
                log::info!("Advancing to level {}", self.level + 1);
                self.formation = build_formation(&settings, self.screen, &self.clock);
                self.bullets.clear();
                self.level_delay_frames = LEVEL_DELAY_FRAMES;
            }
            None => self.end_game(true),
        }
    }

    fn end_game(&mut self, victory: bool) {
        if self.game_state != GameState::GameOver {
            self.final_time_secs = Some(self.game_start_time.elapsed().as_secs());
            log::info!("Game over with score {}, victory: {}", self.score, victory);
        }
        self.victory = victory;
        self.game_state = GameState::GameOver;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn game_state(&self) -> GameState {
        self.game_state
    }

    /// Zero-based index of the current level
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn victory(&self) -> bool {
        self.victory
    }

    pub fn formation(&self) -> &EnemyFormation {
        &self.formation
    }

    pub fn formation_mut(&mut self) -> &mut EnemyFormation {
        &mut self.formation
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    pub fn bullets_mut(&mut self) -> &mut Vec<Bullet> {
        &mut self.bullets
    }
}

fn build_formation(settings: &GameSettings, screen: Screen, clock: &Rc<dyn Clock>) -> EnemyFormation {
    log::info!("Starting level with {:?}", settings);
    EnemyFormation::with_clock(settings, screen, Box::new(Rc::clone(clock)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attack_schedule_by_stage() {
        assert!(attack_schedule(0).is_empty());
        assert_eq!(attack_schedule(1), &[BossAttack::Volley]);
        assert!(attack_schedule(3).contains(&BossAttack::Homing));
        assert!(attack_schedule(6).contains(&BossAttack::Spread));
        assert_eq!(attack_schedule(7).len(), 4);
        assert_eq!(attack_schedule(40), attack_schedule(7));
    }

    #[test]
    fn test_empty_level_list_uses_campaign() {
        let app = App::new(Vec::new());
        assert_eq!(app.levels.len(), default_campaign().len());
        assert_eq!(app.formation().ship_count(), 20);
    }
}
