// Library exports for testing
pub use entities::{
    AttackPhase, Bullet, BulletPool, ChargeCycle, Clock, Cooldown, Direction, EnemyFormation,
    EnemyShip, Entity, GameState, ManualClock, NEVER_INTERVAL, PaceMode, Pacer, Player, Position,
    Renderer, ShipId, SpriteType, SystemClock, Tint, Turning, check_collision,
};
pub use settings::{GameSettings, Screen};

pub mod app;
pub mod entities;
pub mod input;
pub mod logging;
pub mod renderer;
pub mod settings;
