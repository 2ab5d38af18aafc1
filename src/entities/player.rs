use super::bullet::Bullet;
use super::cooldown::Cooldown;
use super::entity::{Entity, Position, SpriteType, Tint};

const PLAYER_WIDTH: i32 = 13 * 2;
const PLAYER_HEIGHT: i32 = 8 * 2;
/// Pixels moved per frame
const SPEED: i32 = 2;
const SHOOTING_INTERVAL: u64 = 750;
const BULLET_SPEED: i32 = -6;
/// Time the ship stays wrecked after a hit
const DESTRUCTION_INTERVAL: u64 = 1000;
pub const MAX_LIVES: u32 = 3;

#[derive(Debug, Clone)]
pub struct Player {
    pub x: i32,
    pub y: i32,
    pub lives: u32,
    shooting_cooldown: Cooldown,
    destruction_cooldown: Cooldown,
    destroyed: bool,
}

impl Player {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            lives: MAX_LIVES,
            shooting_cooldown: Cooldown::new(SHOOTING_INTERVAL),
            destruction_cooldown: Cooldown::new(DESTRUCTION_INTERVAL),
            destroyed: false,
        }
    }

    pub fn move_left(&mut self, min_x: i32) {
        self.x = (self.x - SPEED).max(min_x);
    }

    pub fn move_right(&mut self, max_x: i32) {
        self.x = (self.x + SPEED).min(max_x);
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn can_fire(&mut self, now: u64) -> bool {
        !self.destroyed
            && (!self.shooting_cooldown.is_armed() || self.shooting_cooldown.check_finished(now))
    }

    /// Fires a straight bullet from the nose if the shooting cooldown allows it
    pub fn try_fire(&mut self, now: u64) -> Option<Bullet> {
        if !self.can_fire(now) {
            return None;
        }
        self.shooting_cooldown.reset(now, &mut rand::rng());
        Some(Bullet::new(self.x + PLAYER_WIDTH / 2, self.y, BULLET_SPEED))
    }

    /// Loses a life and wrecks the ship for a moment. Hits while wrecked or
    /// out of lives are ignored.
    pub fn take_hit(&mut self, now: u64) -> bool {
        if self.destroyed || self.lives == 0 {
            return false;
        }
        self.lives -= 1;
        self.destroyed = true;
        self.destruction_cooldown.reset(now, &mut rand::rng());
        log::info!("Player hit, {} lives left", self.lives);
        true
    }

    /// Repairs the ship once the destruction cooldown has run out
    pub fn update(&mut self, now: u64) {
        if self.destroyed && self.destruction_cooldown.check_finished(now) {
            self.destroyed = false;
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }
}

impl Entity for Player {
    fn position_x(&self) -> i32 {
        self.x
    }

    fn position_y(&self) -> i32 {
        self.y
    }

    fn width(&self) -> i32 {
        PLAYER_WIDTH
    }

    fn height(&self) -> i32 {
        PLAYER_HEIGHT
    }

    fn sprite_type(&self) -> SpriteType {
        if self.destroyed {
            SpriteType::ShipDestroyed
        } else {
            SpriteType::Ship
        }
    }

    fn tint(&self) -> Tint {
        Tint::Green
    }
}
