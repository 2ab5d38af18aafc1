mod bullet;
mod cooldown;
mod enemy;
mod entity;
mod formation;
mod game_state;
mod player;

// Re-export all public types
pub use bullet::{Bullet, BulletPool, Turning};
pub use cooldown::{Clock, Cooldown, ManualClock, PaceMode, Pacer, SystemClock};
pub use enemy::{BossPalette, EnemyShip, ShipId};
pub use entity::{Entity, Position, Renderer, SpriteType, Tint, check_collision};
pub use formation::{AttackPhase, ChargeCycle, Direction, EnemyFormation, NEVER_INTERVAL};
pub use game_state::GameState;
pub use player::Player;
