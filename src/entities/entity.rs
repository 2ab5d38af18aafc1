/// Sprite identifiers handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteType {
    Ship,
    ShipDestroyed,
    Bullet,
    EnemyBullet,
    EnemyShipA1,
    EnemyShipA2,
    EnemyShipB1,
    EnemyShipB2,
    EnemyShipC1,
    EnemyShipC2,
    Explosion,
    BossA,
    BossB,
    BossC,
    BossD,
    BossExplosion,
}

/// Palette applied on top of a sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tint {
    White,
    Gray,
    Green,
}

/// A point on the playfield, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Anything that occupies a rectangle on screen
pub trait Entity {
    fn position_x(&self) -> i32;
    fn position_y(&self) -> i32;
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    fn sprite_type(&self) -> SpriteType;
    fn tint(&self) -> Tint;
}

/// Drawing surface the simulation hands its entities to
pub trait Renderer {
    fn draw_entity(&mut self, entity: &dyn Entity, x: i32, y: i32);
}

/// AABB overlap between two entities
pub fn check_collision(a: &dyn Entity, b: &dyn Entity) -> bool {
    a.position_x() < b.position_x() + b.width()
        && a.position_x() + a.width() > b.position_x()
        && a.position_y() < b.position_y() + b.height()
        && a.position_y() + a.height() > b.position_y()
}
