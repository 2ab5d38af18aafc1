use super::entity::{Entity, SpriteType, Tint};

/// Speed floor a turning bullet decelerates towards on each axis
pub const TURN_SPEED_FLOOR: i32 = -6;
/// Once latched, the horizontal speed climbs back to this and holds
pub const TURN_LEVEL_SPEED_X: i32 = 0;
/// Once latched, the vertical speed climbs back to this and holds
pub const TURN_TERMINAL_SPEED_Y: i32 = 6;

const BULLET_WIDTH: i32 = 3 * 2;
const BULLET_HEIGHT: i32 = 5 * 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turning {
    Straight,
    /// Horizontal speed is subtracted from x on each turn step
    TurningLeft,
    /// Horizontal speed is added to x on each turn step
    TurningRight,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub x: i32,
    pub y: i32,
    pub speed_x: i32,
    /// Positive is down
    pub speed_y: i32,
    pub turning: Turning,
    first_touch_x: bool,
    first_touch_y: bool,
}

impl Bullet {
    pub fn new(x: i32, y: i32, speed: i32) -> Self {
        Self {
            x,
            y,
            speed_x: speed + 2,
            speed_y: speed,
            turning: Turning::Straight,
            first_touch_x: false,
            first_touch_y: false,
        }
    }

    /// Straight vertical step
    pub fn update(&mut self) {
        self.y += self.speed_y;
    }

    /// One step of a curving trajectory. A straight bullet just updates.
    pub fn turn(&mut self) {
        match self.turning {
            Turning::Straight => {
                self.update();
                return;
            }
            Turning::TurningLeft => self.x -= self.speed_x,
            Turning::TurningRight => self.x += self.speed_x,
        }
        self.y += self.speed_y;

        self.speed_x = curve_axis(self.speed_x, &mut self.first_touch_x, TURN_LEVEL_SPEED_X);
        self.speed_y = curve_axis(self.speed_y, &mut self.first_touch_y, TURN_TERMINAL_SPEED_Y);
        log::trace!(
            "Bullet turning {:?} <X: {}, Y: {}>",
            self.turning,
            self.speed_x,
            self.speed_y
        );
    }

    /// Advances the bullet the way its mode requires
    pub fn advance(&mut self) {
        match self.turning {
            Turning::Straight => self.update(),
            Turning::TurningLeft | Turning::TurningRight => self.turn(),
        }
    }

    /// Switches the trajectory. Horizontal speed is clamped to the turning
    /// band so a fast spawn cannot curve past it.
    pub fn set_turning(&mut self, turning: Turning) {
        self.turning = turning;
        if self.is_turning() {
            self.speed_x = self.speed_x.clamp(TURN_SPEED_FLOOR, -TURN_SPEED_FLOOR);
        }
    }

    /// Curve towards `target_x`: bend left when spawned to its right
    pub fn aim_at(&mut self, target_x: i32) {
        self.set_turning(if self.x > target_x {
            Turning::TurningLeft
        } else {
            Turning::TurningRight
        });
    }

    pub fn is_turning(&self) -> bool {
        self.turning != Turning::Straight
    }

    pub fn is_player_bullet(&self) -> bool {
        self.speed_y < 0 && !self.is_turning()
    }

    pub fn is_out_of_bounds(&self, width: i32, height: i32) -> bool {
        self.y + BULLET_HEIGHT < 0 || self.y > height || self.x + BULLET_WIDTH < 0 || self.x > width
    }

    fn reinit(&mut self, x: i32, y: i32, speed: i32) {
        *self = Self::new(x, y, speed);
    }
}

/// Decelerate until the floor is touched, latch there for one step, then
/// climb back and hold at `level`.
fn curve_axis(speed: i32, touched: &mut bool, level: i32) -> i32 {
    if !*touched && speed > TURN_SPEED_FLOOR {
        speed - 1
    } else if !*touched && speed == TURN_SPEED_FLOOR {
        *touched = true;
        speed
    } else if speed < level {
        speed + 1
    } else {
        speed
    }
}

impl Entity for Bullet {
    fn position_x(&self) -> i32 {
        self.x
    }

    fn position_y(&self) -> i32 {
        self.y
    }

    fn width(&self) -> i32 {
        BULLET_WIDTH
    }

    fn height(&self) -> i32 {
        BULLET_HEIGHT
    }

    fn sprite_type(&self) -> SpriteType {
        if self.speed_y < 0 && !self.is_turning() {
            SpriteType::Bullet
        } else {
            SpriteType::EnemyBullet
        }
    }

    fn tint(&self) -> Tint {
        Tint::White
    }
}

/// Recycles bullets so steady-state firing does not allocate
#[derive(Debug, Default)]
pub struct BulletPool {
    free: Vec<Bullet>,
}

impl BulletPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// A straight bullet at the given position, reused from the pool when possible
    pub fn get_bullet(&mut self, x: i32, y: i32, speed: i32) -> Bullet {
        match self.free.pop() {
            Some(mut bullet) => {
                bullet.reinit(x, y, speed);
                bullet
            }
            None => Bullet::new(x, y, speed),
        }
    }

    pub fn recycle(&mut self, bullets: impl IntoIterator<Item = Bullet>) {
        self.free.extend(bullets);
    }

    pub fn available(&self) -> usize {
        self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullet_new() {
        let bullet = Bullet::new(10, 20, 4);
        assert_eq!(bullet.x, 10);
        assert_eq!(bullet.y, 20);
        assert_eq!(bullet.speed_x, 6);
        assert_eq!(bullet.speed_y, 4);
        assert_eq!(bullet.turning, Turning::Straight);
    }

    #[test]
    fn test_straight_bullet_moves_vertically_only() {
        let mut bullet = Bullet::new(10, 20, 4);
        bullet.update();
        bullet.update();
        assert_eq!((bullet.x, bullet.y), (10, 28));

        let mut player_bullet = Bullet::new(10, 20, -6);
        player_bullet.update();
        assert_eq!(player_bullet.y, 14);
        assert!(player_bullet.is_player_bullet());
        assert_eq!(player_bullet.sprite_type(), SpriteType::Bullet);
    }

    #[test]
    fn test_turn_left_first_steps() {
        let mut bullet = Bullet::new(100, 100, 4);
        bullet.set_turning(Turning::TurningLeft);

        bullet.turn();
        assert_eq!((bullet.x, bullet.y), (94, 104));
        assert_eq!((bullet.speed_x, bullet.speed_y), (5, 3));

        bullet.turn();
        assert_eq!((bullet.x, bullet.y), (89, 107));
        assert_eq!((bullet.speed_x, bullet.speed_y), (4, 2));
    }

    #[test]
    fn test_turn_right_mirrors_horizontal_motion() {
        let mut left = Bullet::new(100, 100, 4);
        left.set_turning(Turning::TurningLeft);
        let mut right = Bullet::new(100, 100, 4);
        right.set_turning(Turning::TurningRight);

        for _ in 0..30 {
            left.turn();
            right.turn();
            assert_eq!(100 - left.x, right.x - 100);
            assert_eq!(left.y, right.y);
            assert_eq!(left.speed_x, right.speed_x);
        }
    }

    #[test]
    fn test_turn_latches_at_floor_then_levels_off() {
        let mut bullet = Bullet::new(0, 0, 4);
        bullet.set_turning(Turning::TurningRight);

        // 6 -> -6 takes twelve steps
        for _ in 0..12 {
            bullet.turn();
        }
        assert_eq!(bullet.speed_x, TURN_SPEED_FLOOR);

        // Latch step holds the speed
        bullet.turn();
        assert_eq!(bullet.speed_x, TURN_SPEED_FLOOR);

        // Then climbs back towards level flight
        bullet.turn();
        assert_eq!(bullet.speed_x, TURN_SPEED_FLOOR + 1);

        for _ in 0..50 {
            bullet.turn();
        }
        assert_eq!(bullet.speed_x, TURN_LEVEL_SPEED_X);
        assert_eq!(bullet.speed_y, TURN_TERMINAL_SPEED_Y);
    }

    #[test]
    fn test_fast_bullet_is_clamped_when_it_starts_turning() {
        let mut bullet = Bullet::new(100, 0, 8);
        assert_eq!(bullet.speed_x, 10);
        bullet.aim_at(0);
        assert_eq!(bullet.speed_x, 6);
        assert_eq!(bullet.speed_y, 8);

        for _ in 0..40 {
            bullet.turn();
            assert!(bullet.speed_x.abs() <= 6);
        }

        // Straight bullets keep their spawn speed
        let mut straight = Bullet::new(0, 0, 8);
        straight.set_turning(Turning::Straight);
        assert_eq!(straight.speed_x, 10);
    }

    #[test]
    fn test_turn_on_straight_bullet_is_update() {
        let mut bullet = Bullet::new(10, 10, 4);
        bullet.turn();
        assert_eq!((bullet.x, bullet.y, bullet.speed_x), (10, 14, 6));
    }

    #[test]
    fn test_aim_at_picks_side() {
        let mut bullet = Bullet::new(200, 0, 4);
        bullet.aim_at(50);
        assert_eq!(bullet.turning, Turning::TurningLeft);
        bullet.aim_at(300);
        assert_eq!(bullet.turning, Turning::TurningRight);
        bullet.aim_at(200);
        assert_eq!(bullet.turning, Turning::TurningRight);
    }

    #[test]
    fn test_out_of_bounds() {
        assert!(Bullet::new(10, 530, 4).is_out_of_bounds(448, 520));
        assert!(Bullet::new(10, -20, -6).is_out_of_bounds(448, 520));
        assert!(!Bullet::new(10, 200, 4).is_out_of_bounds(448, 520));
    }

    #[test]
    fn test_pool_reuses_and_resets_bullets() {
        let mut pool = BulletPool::new();
        let mut bullet = pool.get_bullet(1, 2, 4);
        bullet.set_turning(Turning::TurningLeft);
        for _ in 0..20 {
            bullet.turn();
        }
        pool.recycle(vec![bullet]);
        assert_eq!(pool.available(), 1);

        let reused = pool.get_bullet(30, 40, 8);
        assert_eq!(pool.available(), 0);
        assert_eq!(reused, Bullet::new(30, 40, 8));
    }

    // Property-based tests
    #[cfg(test)]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_turning_speed_x_stays_bounded(
                speed in -12i32..=12,
                left in prop::bool::ANY,
                steps in 0usize..200
            ) {
                let mut bullet = Bullet::new(0, 0, speed);
                bullet.set_turning(if left { Turning::TurningLeft } else { Turning::TurningRight });
                let mut reached_floor = false;
                let mut previous = bullet.speed_x;
                for _ in 0..steps {
                    bullet.turn();
                    prop_assert!(bullet.speed_x.abs() <= 6);
                    if reached_floor {
                        // Past the floor it only rises towards level flight or holds
                        prop_assert!(bullet.speed_x >= previous);
                        prop_assert!(bullet.speed_x <= TURN_LEVEL_SPEED_X);
                    }
                    reached_floor |= bullet.speed_x == TURN_SPEED_FLOOR;
                    previous = bullet.speed_x;
                }
            }
        }
    }
}
