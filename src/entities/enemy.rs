use super::entity::{Entity, SpriteType, Tint};

const SHIP_WIDTH: i32 = 12 * 2;
const SHIP_HEIGHT: i32 = 8 * 2;
const BOSS_HIT_POINTS: i32 = 10;

/// Stable handle for a ship inside its formation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShipId(pub u32);

/// Sprite, tint and size of the boss for a given stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BossPalette {
    pub sprite: SpriteType,
    pub tint: Tint,
    pub width: i32,
    pub height: i32,
}

impl BossPalette {
    /// Six stage palettes, then a default for every later stage
    pub fn for_stage(stage: u32) -> Self {
        let (sprite, tint, width, height) = match stage {
            1 => (SpriteType::BossA, Tint::White, 500, 209),
            2 => (SpriteType::BossA, Tint::Gray, 500, 209),
            3 => (SpriteType::BossB, Tint::White, 500, 142),
            4 => (SpriteType::BossB, Tint::Gray, 500, 142),
            5 => (SpriteType::BossC, Tint::White, 500, 188),
            6 => (SpriteType::BossC, Tint::Gray, 500, 188),
            _ => (SpriteType::BossD, Tint::Gray, 400, 219),
        };
        Self {
            sprite,
            tint,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnemyShip {
    pub id: ShipId,
    pub x: i32,
    pub y: i32,
    width: i32,
    height: i32,
    sprite: SpriteType,
    tint: Tint,
    destroyed: bool,
    /// Only boss ships carry hit points
    hit_points: Option<i32>,
    /// Damage one player hit inflicts on this ship
    pub damage_per_hit: i32,
    /// Set once the owning formation has counted this ship as lost
    pub(crate) tallied: bool,
}

impl EnemyShip {
    pub fn new(id: ShipId, x: i32, y: i32, sprite: SpriteType) -> Self {
        Self {
            id,
            x,
            y,
            width: SHIP_WIDTH,
            height: SHIP_HEIGHT,
            sprite,
            tint: Tint::White,
            destroyed: false,
            hit_points: None,
            damage_per_hit: 1,
            tallied: false,
        }
    }

    pub fn new_boss(
        id: ShipId,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        sprite: SpriteType,
        tint: Tint,
    ) -> Self {
        Self {
            id,
            x,
            y,
            width,
            height,
            sprite,
            tint,
            destroyed: false,
            hit_points: Some(BOSS_HIT_POINTS),
            damage_per_hit: 1,
            tallied: false,
        }
    }

    pub fn from_palette(id: ShipId, x: i32, y: i32, palette: BossPalette) -> Self {
        Self::new_boss(id, x, y, palette.width, palette.height, palette.sprite, palette.tint)
    }

    pub fn is_boss(&self) -> bool {
        self.hit_points.is_some()
    }

    pub fn hit_points(&self) -> Option<i32> {
        self.hit_points
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Applies damage. Bosses lose hit points and blow up at zero; any
    /// other ship blows up on the first hit. Destroyed ships ignore hits.
    pub fn take_damage(&mut self, damage: i32) {
        if self.destroyed {
            return;
        }
        match self.hit_points.as_mut() {
            Some(hp) => {
                *hp -= damage;
                if *hp <= 0 {
                    self.destroy();
                }
            }
            None => self.destroy(),
        }
    }

    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.sprite = if self.is_boss() {
            SpriteType::BossExplosion
        } else {
            SpriteType::Explosion
        };
    }

    pub fn move_by(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }

    /// Flips between the two animation frames of a normal ship
    pub fn animate(&mut self) {
        self.sprite = match self.sprite {
            SpriteType::EnemyShipA1 => SpriteType::EnemyShipA2,
            SpriteType::EnemyShipA2 => SpriteType::EnemyShipA1,
            SpriteType::EnemyShipB1 => SpriteType::EnemyShipB2,
            SpriteType::EnemyShipB2 => SpriteType::EnemyShipB1,
            SpriteType::EnemyShipC1 => SpriteType::EnemyShipC2,
            SpriteType::EnemyShipC2 => SpriteType::EnemyShipC1,
            other => other,
        };
    }

    pub fn get_points(&self) -> u32 {
        if self.is_boss() {
            return 500;
        }
        match self.sprite {
            SpriteType::EnemyShipA1 | SpriteType::EnemyShipA2 => 10,
            SpriteType::EnemyShipB1 | SpriteType::EnemyShipB2 => 20,
            SpriteType::EnemyShipC1 | SpriteType::EnemyShipC2 => 30,
            _ => 0,
        }
    }
}

impl Entity for EnemyShip {
    fn position_x(&self) -> i32 {
        self.x
    }

    fn position_y(&self) -> i32 {
        self.y
    }

    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn sprite_type(&self) -> SpriteType {
        self.sprite
    }

    fn tint(&self) -> Tint {
        self.tint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boss() -> EnemyShip {
        EnemyShip::new_boss(ShipId(1), 0, 0, 1, 1, SpriteType::BossA, Tint::Gray)
    }

    #[test]
    fn test_is_boss() {
        let normal = EnemyShip::new(ShipId(0), 0, 0, SpriteType::EnemyShipA1);
        assert!(!normal.is_boss());
        assert_eq!(normal.hit_points(), None);
        assert!(boss().is_boss());
    }

    #[test]
    fn test_boss_hit_points() {
        assert_eq!(boss().hit_points(), Some(10));
    }

    #[test]
    fn test_boss_take_damage() {
        let mut ship = boss();
        ship.take_damage(3);
        assert_eq!(ship.hit_points(), Some(7));
        assert!(!ship.is_destroyed());

        ship.take_damage(7);
        assert_eq!(ship.hit_points(), Some(0));
        assert!(ship.is_destroyed());
        assert_eq!(ship.sprite_type(), SpriteType::BossExplosion);

        // Further hits are ignored
        ship.take_damage(5);
        assert_eq!(ship.hit_points(), Some(0));
    }

    #[test]
    fn test_normal_ship_dies_on_first_hit() {
        let mut ship = EnemyShip::new(ShipId(0), 0, 0, SpriteType::EnemyShipB1);
        ship.take_damage(1);
        assert!(ship.is_destroyed());
        assert_eq!(ship.sprite_type(), SpriteType::Explosion);
    }

    #[test]
    fn test_move_by() {
        let mut ship = EnemyShip::new(ShipId(0), 20, 100, SpriteType::EnemyShipA1);
        ship.move_by(8, 0);
        ship.move_by(0, 4);
        assert_eq!((ship.x, ship.y), (28, 104));
    }

    #[test]
    fn test_animation_toggles_frames() {
        let mut ship = EnemyShip::new(ShipId(0), 0, 0, SpriteType::EnemyShipC1);
        ship.animate();
        assert_eq!(ship.sprite_type(), SpriteType::EnemyShipC2);
        ship.animate();
        assert_eq!(ship.sprite_type(), SpriteType::EnemyShipC1);

        let mut big = boss();
        big.animate();
        assert_eq!(big.sprite_type(), SpriteType::BossA);
    }

    #[test]
    fn test_points_by_tier() {
        let a = EnemyShip::new(ShipId(0), 0, 0, SpriteType::EnemyShipA2);
        let b = EnemyShip::new(ShipId(1), 0, 0, SpriteType::EnemyShipB1);
        let c = EnemyShip::new(ShipId(2), 0, 0, SpriteType::EnemyShipC1);
        assert_eq!(a.get_points(), 10);
        assert_eq!(b.get_points(), 20);
        assert_eq!(c.get_points(), 30);
        assert_eq!(boss().get_points(), 500);
    }

    #[test]
    fn test_boss_palette_cycles_then_defaults() {
        assert_eq!(BossPalette::for_stage(1).sprite, SpriteType::BossA);
        assert_eq!(BossPalette::for_stage(2).tint, Tint::Gray);
        assert_eq!(BossPalette::for_stage(4).height, 142);
        assert_eq!(BossPalette::for_stage(6).sprite, SpriteType::BossC);
        let late = BossPalette::for_stage(9);
        assert_eq!((late.sprite, late.width, late.height), (SpriteType::BossD, 400, 219));
    }

    // Property-based tests
    #[cfg(test)]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_boss_destroyed_iff_hp_depleted(
                damage_amounts in prop::collection::vec(0i32..4, 0..12)
            ) {
                let mut ship = boss();
                let mut total = 0;
                for damage in damage_amounts {
                    if total < 10 {
                        total += damage;
                    }
                    ship.take_damage(damage);
                }
                prop_assert_eq!(ship.is_destroyed(), total >= 10);
            }
        }
    }
}
