mod boss_attack;

pub use boss_attack::{AttackPhase, ChargeCycle, NEVER_INTERVAL};

use std::iter;

use super::bullet::{Bullet, BulletPool};
use super::cooldown::{Clock, Cooldown, PaceMode, Pacer};
use super::enemy::{BossPalette, EnemyShip, ShipId};
use super::entity::{Entity, Renderer, SpriteType};
use crate::settings::{GameSettings, Screen};

/// Initial position of the upper left corner
const INIT_POS_X: i32 = 20;
const INIT_POS_Y: i32 = 100;
/// Distance between ships
const SEPARATION_DISTANCE: i32 = 40;
/// Share of rows, from the top, given to each tier
const PROPORTION_C: f32 = 0.2;
const PROPORTION_B: f32 = 0.4;
/// Lateral step per movement tick
const X_SPEED: i32 = 8;
/// Downward step per movement tick
const Y_SPEED: i32 = 4;
/// Speed of the bullets shot by the members
pub(crate) const BULLET_SPEED: i32 = 4;
/// Shooting variance as a share of the shooting frequency
const SHOOTING_VARIANCE: f64 = 0.2;
const SIDE_MARGIN: i32 = 20;
const BOTTOM_MARGIN: i32 = 80;
/// Altitude boundary that ends a descent
const DESCENT_DISTANCE: i32 = 20;
/// Movement tick threshold floor, in frames
const MINIMUM_SPEED: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Right,
    Left,
    Down,
}

/// A grid of enemy ships that moves, shoots and shrinks as one unit.
///
/// Ships are stored column by column, top to bottom. Destroyed ships stay in
/// place as explosions until the next movement tick compacts the grid.
pub struct EnemyFormation {
    columns: Vec<Vec<EnemyShip>>,
    n_ships_wide: usize,
    n_ships_high: usize,
    screen: Screen,
    pacer: Pacer,
    pool: BulletPool,
    shooting_cooldown: Cooldown,
    boss_shooting_cooldown: Cooldown,
    beam: ChargeCycle,
    homing: ChargeCycle,
    spread: ChargeCycle,
    base_speed: u32,
    movement_speed: u32,
    /// Frames accumulated towards the next movement tick
    movement_interval: u32,
    current_direction: Direction,
    previous_direction: Direction,
    position_x: i32,
    position_y: i32,
    width: i32,
    height: i32,
    ship_width: i32,
    ship_height: i32,
    /// Bottom-most living ship of every column that still has one
    shooters: Vec<ShipId>,
    ship_count: usize,
    boss_stage: u32,
}

impl EnemyFormation {
    pub fn new(settings: &GameSettings, screen: Screen) -> Self {
        Self::with_pacer(settings, screen, Pacer::system())
    }

    pub fn with_clock(settings: &GameSettings, screen: Screen, clock: Box<dyn Clock>) -> Self {
        Self::with_pacer(settings, screen, Pacer::new(clock))
    }

    pub fn with_pacer(settings: &GameSettings, screen: Screen, mut pacer: Pacer) -> Self {
        let n_ships_wide = settings.formation_width;
        let n_ships_high = settings.formation_height;
        let boss_stage = settings.boss_stage;
        let shooting_variance = (settings.shooting_frequency as f64 * SHOOTING_VARIANCE) as u64;

        log::info!(
            "Initializing {}x{} ship formation in ({},{})",
            n_ships_wide,
            n_ships_high,
            INIT_POS_X,
            INIT_POS_Y
        );

        let mut next_id = 0;
        let columns: Vec<Vec<EnemyShip>> = (0..n_ships_wide)
            .map(|column| {
                (0..n_ships_high)
                    .map(|row| {
                        let id = ShipId(next_id);
                        next_id += 1;
                        let x = SEPARATION_DISTANCE * column as i32 + INIT_POS_X;
                        let y = SEPARATION_DISTANCE * row as i32 + INIT_POS_Y;
                        if boss_stage == 0 {
                            EnemyShip::new(id, x, y, tier_sprite(row, n_ships_high))
                        } else {
                            EnemyShip::from_palette(id, x, y, BossPalette::for_stage(boss_stage))
                        }
                    })
                    .collect()
            })
            .collect();

        let (ship_width, ship_height) = columns
            .first()
            .and_then(|column| column.first())
            .map(|ship| (ship.width(), ship.height()))
            .unwrap_or_default();

        let shooters = columns
            .iter()
            .filter_map(|column| column.last().map(|ship| ship.id))
            .collect();

        let beam = ChargeCycle::beam(pacer.roll(ship_width));
        let homing = ChargeCycle::homing(pacer.roll(ship_width));
        let spread = ChargeCycle::spread(pacer.roll(ship_width));
        let volley_interval = boss_attack::volley_interval(boss_stage);

        Self {
            columns,
            n_ships_wide,
            n_ships_high,
            screen,
            pacer,
            pool: BulletPool::new(),
            shooting_cooldown: Cooldown::with_variance(
                settings.shooting_frequency,
                shooting_variance,
            ),
            boss_shooting_cooldown: Cooldown::with_variance(volley_interval, shooting_variance),
            beam,
            homing,
            spread,
            base_speed: settings.base_speed,
            movement_speed: settings.base_speed,
            movement_interval: 0,
            current_direction: Direction::Right,
            previous_direction: Direction::Right,
            position_x: INIT_POS_X,
            position_y: INIT_POS_Y,
            width: (n_ships_wide as i32 - 1) * SEPARATION_DISTANCE + ship_width,
            height: (n_ships_high as i32 - 1) * SEPARATION_DISTANCE + ship_height,
            ship_width,
            ship_height,
            shooters,
            ship_count: n_ships_wide * n_ships_high,
            boss_stage,
        }
    }

    /// Replaces the random source with a seeded one
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.pacer.reseed(seed);
        self
    }

    /// In testing mode every cooldown gate opens and movement ticks on
    /// every update.
    pub fn set_testing(&mut self, testing: bool) {
        self.set_pace_mode(if testing {
            PaceMode::Unthrottled
        } else {
            PaceMode::Clocked
        });
    }

    pub fn set_pace_mode(&mut self, mode: PaceMode) {
        self.pacer.set_mode(mode);
    }

    pub fn set_shooting_cooldown(&mut self, cooldown: Cooldown) {
        self.shooting_cooldown = cooldown;
    }

    /// Advances the formation by one frame. Movement only happens on
    /// throttled ticks, whose rate grows as the formation is depleted.
    pub fn update(&mut self) {
        self.pacer.arm(&mut self.shooting_cooldown);
        self.pacer.arm(&mut self.boss_shooting_cooldown);

        let capacity = (self.n_ships_wide * self.n_ships_high).max(1);
        let remaining = self.ship_count as f64 / capacity as f64;
        self.movement_speed = (remaining.powi(2) * self.base_speed as f64) as u32 + MINIMUM_SPEED;

        if !self
            .pacer
            .tick_due(&mut self.movement_interval, self.movement_speed)
        {
            return;
        }

        self.clean_up();
        if self.columns.is_empty() {
            return;
        }
        self.steer();

        let (movement_x, movement_y) = match self.current_direction {
            Direction::Right => (X_SPEED, 0),
            Direction::Left => (-X_SPEED, 0),
            Direction::Down => (0, Y_SPEED),
        };
        self.position_x += movement_x;
        self.position_y += movement_y;

        for ship in self.columns.iter_mut().flatten() {
            ship.move_by(movement_x, movement_y);
            ship.animate();
        }
    }

    /// Drops destroyed ships and empty columns, then recomputes the
    /// bounding box from what survives.
    fn clean_up(&mut self) {
        // Ships destroyed behind the formation's back still need counting
        let untallied: Vec<ShipId> = self
            .iter()
            .filter(|ship| ship.is_destroyed() && !ship.tallied)
            .map(|ship| ship.id)
            .collect();
        for id in untallied {
            self.destroy(id);
        }

        for (index, column) in self.columns.iter_mut().enumerate() {
            let before = column.len();
            column.retain(|ship| !ship.is_destroyed());
            if column.len() != before {
                log::info!("Removed {} enemies from column {}", before - column.len(), index);
            }
        }

        let before = self.columns.len();
        self.columns.retain(|column| !column.is_empty());
        if self.columns.len() != before {
            log::info!("Removed {} empty columns", before - self.columns.len());
        }

        let firsts = || self.columns.iter().filter_map(|column| column.first());
        let (Some(left), Some(right)) = (firsts().next(), firsts().last()) else {
            return;
        };
        let top = firsts().map(|ship| ship.y).min().unwrap_or(self.position_y);
        let bottom = self
            .columns
            .iter()
            .filter_map(|column| column.last())
            .map(|ship| ship.y + self.ship_height)
            .max()
            .unwrap_or(top + self.ship_height);

        self.width = right.x - left.x + self.ship_width;
        self.height = bottom - top;
        self.position_x = left.x;
        self.position_y = top;
    }

    /// Evaluates the direction state machine against the screen edges
    fn steer(&mut self) {
        let is_at_bottom = self.position_y + self.height > self.screen.height - BOTTOM_MARGIN;
        let is_at_right_side = self.position_x + self.width >= self.screen.width - SIDE_MARGIN;
        let is_at_left_side = self.position_x <= SIDE_MARGIN;
        let is_at_horizontal_altitude = self.position_y.rem_euclid(DESCENT_DISTANCE) == 0;

        let next = match self.current_direction {
            Direction::Down if is_at_horizontal_altitude => {
                if self.previous_direction == Direction::Right {
                    Direction::Left
                } else {
                    Direction::Right
                }
            }
            Direction::Left if is_at_left_side => {
                if is_at_bottom {
                    Direction::Right
                } else {
                    self.previous_direction = Direction::Left;
                    Direction::Down
                }
            }
            Direction::Right if is_at_right_side => {
                if is_at_bottom {
                    Direction::Left
                } else {
                    self.previous_direction = Direction::Right;
                    Direction::Down
                }
            }
            current => current,
        };

        if next != self.current_direction {
            log::info!("Formation now moving {:?}", next);
            self.current_direction = next;
        }
    }

    /// Fires one downward bullet from a random column's shooter if the
    /// shooting cooldown allows it.
    pub fn shoot(&mut self, bullets: &mut impl Extend<Bullet>) -> bool {
        let Some(index) = self.pacer.pick(self.shooters.len()) else {
            return false;
        };
        let Some((x, y, width)) = self
            .ship(self.shooters[index])
            .map(|shooter| (shooter.x, shooter.y, shooter.width()))
        else {
            return false;
        };

        if !self.pacer.finished(&mut self.shooting_cooldown) {
            return false;
        }
        self.pacer.reset(&mut self.shooting_cooldown);
        bullets.extend(iter::once(self.pool.get_bullet(x + width / 2, y, BULLET_SPEED)));
        true
    }

    /// Marks a ship destroyed, promotes the next shooter of its column and
    /// counts the loss. Unknown or already counted ships are ignored.
    pub fn destroy(&mut self, id: ShipId) {
        let Some((column, row)) = self.locate(id) else {
            return;
        };
        let ship = &mut self.columns[column][row];
        if ship.tallied {
            return;
        }
        ship.destroy();
        ship.tallied = true;
        log::info!("Destroyed ship in ({},{})", column, row);

        if let Some(slot) = self.shooters.iter().position(|shooter| *shooter == id) {
            match self.next_shooter(column) {
                Some(next) => self.shooters[slot] = next,
                None => {
                    self.shooters.remove(slot);
                    log::info!("Shooters list reduced to {} members.", self.shooters.len());
                }
            }
        }

        self.ship_count = self.ship_count.saturating_sub(1);
    }

    /// Damages a ship and destroys it through the formation once it gives
    /// out. Returns true if this hit destroyed it.
    pub fn damage(&mut self, id: ShipId, amount: i32) -> bool {
        let Some(ship) = self.ship_mut(id) else {
            return false;
        };
        if ship.is_destroyed() {
            return false;
        }
        ship.take_damage(amount);
        if ship.is_destroyed() {
            self.destroy(id);
            true
        } else {
            false
        }
    }

    /// Bottom-most living ship of a column
    fn next_shooter(&self, column: usize) -> Option<ShipId> {
        self.columns
            .get(column)?
            .iter()
            .rev()
            .find(|ship| !ship.is_destroyed())
            .map(|ship| ship.id)
    }

    fn locate(&self, id: ShipId) -> Option<(usize, usize)> {
        self.columns.iter().enumerate().find_map(|(index, column)| {
            column
                .iter()
                .position(|ship| ship.id == id)
                .map(|row| (index, row))
        })
    }

    pub fn ship(&self, id: ShipId) -> Option<&EnemyShip> {
        self.iter().find(|ship| ship.id == id)
    }

    pub fn ship_mut(&mut self, id: ShipId) -> Option<&mut EnemyShip> {
        self.columns.iter_mut().flatten().find(|ship| ship.id == id)
    }

    /// Every member, including explosions awaiting cleanup
    pub fn iter(&self) -> impl Iterator<Item = &EnemyShip> {
        self.columns.iter().flatten()
    }

    /// Members that can still be hit
    pub fn live_ships(&self) -> impl Iterator<Item = &EnemyShip> {
        self.iter().filter(|ship| !ship.is_destroyed())
    }

    pub fn shooters(&self) -> impl Iterator<Item = &EnemyShip> {
        self.shooters.iter().filter_map(|id| self.ship(*id))
    }

    pub fn shooter_ids(&self) -> &[ShipId] {
        &self.shooters
    }

    /// Columns that still hold at least one living ship
    pub fn active_columns(&self) -> usize {
        self.columns
            .iter()
            .filter(|column| column.iter().any(|ship| !ship.is_destroyed()))
            .count()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) {
        for ship in self {
            renderer.draw_entity(ship, ship.x, ship.y);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ship_count == 0
    }

    pub fn ship_count(&self) -> usize {
        self.ship_count
    }

    pub fn boss_stage(&self) -> u32 {
        self.boss_stage
    }

    pub fn position_x(&self) -> i32 {
        self.position_x
    }

    pub fn position_y(&self) -> i32 {
        self.position_y
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn direction(&self) -> Direction {
        self.current_direction
    }

    pub fn movement_speed(&self) -> u32 {
        self.movement_speed
    }

    pub fn bullet_pool_mut(&mut self) -> &mut BulletPool {
        &mut self.pool
    }
}

impl<'a> IntoIterator for &'a EnemyFormation {
    type Item = &'a EnemyShip;
    type IntoIter = iter::Flatten<std::slice::Iter<'a, Vec<EnemyShip>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter().flatten()
    }
}

/// Top rows are the elite C tier, then B, then A at the bottom
fn tier_sprite(row: usize, rows: usize) -> SpriteType {
    let share = row as f32 / rows as f32;
    if share < PROPORTION_C {
        SpriteType::EnemyShipC1
    } else if share < PROPORTION_B + PROPORTION_C {
        SpriteType::EnemyShipB1
    } else {
        SpriteType::EnemyShipA1
    }
}
