use super::{BULLET_SPEED, EnemyFormation};
use crate::entities::bullet::Bullet;
use crate::entities::cooldown::{Cooldown, Pacer};
use crate::entities::entity::{Entity, Position};

/// Inner interval used while a mechanism is charging; long enough that it
/// never fires before the phase flips back
pub const NEVER_INTERVAL: u64 = 99_999;

/// Base volley interval, shortened by `VOLLEY_STAGE_STEP` per boss stage
const BOSS_SHOOTING_INTERVAL: u64 = 1_000;
const VOLLEY_STAGE_STEP: u64 = 50;
const VOLLEY_SIZE: usize = 7;

const BEAM_PERIOD: u64 = 10_000;
/// Share of the beam period spent firing
const BEAM_RATE: f64 = 0.3;
const BEAM_INTERVAL: u64 = 1;

const TURNING_BULLET_PERIOD: u64 = 2_000;
/// Share of the turning-bullet period spent firing
const TURNING_BULLET_RATE: f64 = 0.8;
const HOMING_INTERVAL: u64 = 100;
const SPREAD_INTERVAL: u64 = 300;

pub(super) fn volley_interval(boss_stage: u32) -> u64 {
    BOSS_SHOOTING_INTERVAL.saturating_sub(u64::from(boss_stage) * VOLLEY_STAGE_STEP)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackPhase {
    /// Emitting shots at the nominal interval
    Firing,
    /// Holding fire until the cycle restarts
    Charging,
}

/// Fire-then-charge duty cycle shared by the timed boss attacks.
///
/// The first `rate` share of every period fires a shot each time the inner
/// cooldown elapses; the rest of the period is spent charging. When the
/// period ends the aim offset is re-rolled and the cycle restarts. The inner
/// cooldown is re-armed on every phase change so no elapsed time carries
/// over between phases.
#[derive(Debug, Clone)]
pub struct ChargeCycle {
    cycle: Cooldown,
    fire_window: u64,
    shot: Cooldown,
    fire_interval: u64,
    phase: AttackPhase,
    offset: i32,
}

impl ChargeCycle {
    pub fn new(period: u64, rate: f64, fire_interval: u64, offset: i32) -> Self {
        Self {
            cycle: Cooldown::new(period),
            fire_window: (period as f64 * rate) as u64,
            shot: Cooldown::new(fire_interval),
            fire_interval,
            phase: AttackPhase::Firing,
            offset,
        }
    }

    pub fn beam(offset: i32) -> Self {
        Self::new(BEAM_PERIOD, BEAM_RATE, BEAM_INTERVAL, offset)
    }

    pub fn homing(offset: i32) -> Self {
        Self::new(TURNING_BULLET_PERIOD, TURNING_BULLET_RATE, HOMING_INTERVAL, offset)
    }

    pub fn spread(offset: i32) -> Self {
        Self::new(TURNING_BULLET_PERIOD, TURNING_BULLET_RATE, SPREAD_INTERVAL, offset)
    }

    pub fn phase(&self) -> AttackPhase {
        self.phase
    }

    /// Current inner interval: nominal while firing, [`NEVER_INTERVAL`] while charging
    pub fn interval(&self) -> u64 {
        match self.phase {
            AttackPhase::Firing => self.fire_interval,
            AttackPhase::Charging => NEVER_INTERVAL,
        }
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Advances the cycle by one poll. Returns the aim offset when a shot
    /// is due this frame.
    pub fn poll(&mut self, pacer: &mut Pacer, aim_range: i32) -> Option<i32> {
        if pacer.more_than(&mut self.cycle, self.fire_window) {
            if pacer.finished(&mut self.cycle) {
                self.offset = pacer.roll(aim_range);
                pacer.reset(&mut self.cycle);
            }
            self.enter(AttackPhase::Charging, pacer);
            return None;
        }

        self.enter(AttackPhase::Firing, pacer);
        if pacer.finished(&mut self.shot) {
            pacer.reset(&mut self.shot);
            Some(self.offset)
        } else {
            None
        }
    }

    fn enter(&mut self, phase: AttackPhase, pacer: &mut Pacer) {
        if self.phase == phase {
            return;
        }
        self.phase = phase;
        self.shot = Cooldown::new(self.interval());
        pacer.reset(&mut self.shot);
        log::debug!("Boss attack now {:?}, interval {}ms", phase, self.interval());
    }
}

/// Geometry of the ship leading a boss attack
#[derive(Debug, Clone, Copy)]
struct Lead {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl EnemyFormation {
    fn lead(&self) -> Option<Lead> {
        self.shooters().next().map(|ship| Lead {
            x: ship.x,
            y: ship.y,
            width: ship.width(),
            height: ship.height(),
        })
    }

    /// Mechanism 1: a volley of seven bullets spread across the lead
    /// ship's width.
    pub fn boss_attack_volley(&mut self, bullets: &mut impl Extend<Bullet>) -> bool {
        let Some(lead) = self.lead() else {
            return false;
        };
        if !self.pacer.finished(&mut self.boss_shooting_cooldown) {
            return false;
        }
        self.pacer.reset(&mut self.boss_shooting_cooldown);

        let volley: Vec<Bullet> = (0..VOLLEY_SIZE)
            .map(|_| {
                let offset = self.pacer.roll(lead.width);
                self.pool
                    .get_bullet(lead.x + offset, lead.y + lead.height, BULLET_SPEED)
            })
            .collect();
        bullets.extend(volley);
        true
    }

    /// Mechanism 2: a rapid double-speed beam at a fixed offset during the
    /// firing share of each cycle.
    pub fn boss_attack_beam(&mut self, bullets: &mut impl Extend<Bullet>) -> bool {
        let Some(lead) = self.lead() else {
            return false;
        };
        let Some(offset) = self.beam.poll(&mut self.pacer, lead.width) else {
            return false;
        };
        let bullet = self
            .pool
            .get_bullet(lead.x + offset, lead.y + lead.height, BULLET_SPEED * 2);
        bullets.extend(std::iter::once(bullet));
        true
    }

    /// Mechanism 3: single bullets that curve towards the player's side.
    pub fn boss_attack_homing(
        &mut self,
        bullets: &mut impl Extend<Bullet>,
        player: Position,
    ) -> bool {
        let Some(lead) = self.lead() else {
            return false;
        };
        let Some(offset) = self.homing.poll(&mut self.pacer, lead.width) else {
            return false;
        };
        let mut bullet = self
            .pool
            .get_bullet(lead.x + offset, lead.y + lead.height, BULLET_SPEED);
        bullet.aim_at(player.x);
        bullets.extend(std::iter::once(bullet));
        true
    }

    /// Mechanism 4: four curving bullets from both edges of the lead ship at
    /// a quarter and three quarters of its height.
    pub fn boss_attack_spread(
        &mut self,
        bullets: &mut impl Extend<Bullet>,
        player: Position,
    ) -> bool {
        let Some(lead) = self.lead() else {
            return false;
        };
        if self.spread.poll(&mut self.pacer, lead.width).is_none() {
            return false;
        }

        let upper = lead.y + lead.height / 4;
        let lower = lead.y + lead.height * 3 / 4;
        let right = lead.x + lead.width;
        let spread: Vec<Bullet> = [(right, upper), (right, lower), (lead.x, upper), (lead.x, lower)]
            .into_iter()
            .map(|(x, y)| {
                let mut bullet = self.pool.get_bullet(x, y, BULLET_SPEED);
                bullet.aim_at(player.x);
                bullet
            })
            .collect();
        bullets.extend(spread);
        true
    }

    pub fn laser_interval(&self) -> u64 {
        self.beam.interval()
    }

    pub fn turning_bullets_interval(&self) -> u64 {
        self.homing.interval()
    }

    pub fn spread_interval(&self) -> u64 {
        self.spread.interval()
    }

    pub fn beam_phase(&self) -> AttackPhase {
        self.beam.phase()
    }
}
