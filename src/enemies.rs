//! Enemy variants, their per-frame behavior, and the wave roster.
//!
//! Each variant keeps its own movement, attack and death rules; the only
//! shared machinery is the collision test and the dead/off-screen pruning
//! done by `Waves`. Enemies own their bullets outright: when an enemy is
//! pruned its bullets vanish with it.

use std::f32::consts::TAU;

use log::info;
use noise::{NoiseFn, Perlin};
use rand::Rng;

use crate::audio::{Cue, Mixer};
use crate::compute::has_collided;
use crate::entities::{GamePhase, Player, OFFSCREEN_MARGIN};

/// Enemies enter the field this far above the visible top edge.
pub const SPAWN_Y: f32 = -200.0;

// ── Variant tables ────────────────────────────────────────────────────────────

const ASTEROID_CONTACT_DMG: i32 = 1;

const UFO_W: f32 = 90.0;
const UFO_H: f32 = 24.0;
const UFO_SPEED: f32 = 2.0;
const UFO_CONTACT_DMG: i32 = 1;
const UFO_FIRE_PERIOD: u64 = 100;
const UFO_BULLET: BulletSpec = BulletSpec { speed: 8.0, w: 3.0, h: 40.0, dmg: 1 };

const SHIP_W: f32 = 124.0;
const SHIP_H: f32 = 108.0;
const SHIP_HHIT: f32 = 15.0;
const SHIP_SPEED: f32 = 4.0;
const SHIP_CONTACT_DMG: i32 = 3;
const SHIP_BULLET: BulletSpec = BulletSpec { speed: 8.0, w: 10.0, h: 40.0, dmg: 3 };

const BOSS_W: f32 = 461.0;
const BOSS_H: f32 = 523.0;
const BOSS_SPEED: f32 = 1.0;
const BOSS_HP: i32 = 50;
const BOSS_BAND_FAR: f32 = 250.0;
const BOSS_BAND_NEAR: f32 = 200.0;
const BOSS_BULLET: BulletSpec = BulletSpec { speed: 12.0, w: 48.0, h: 114.0, dmg: 10 };

/// How close (in either axis) a player bullet has to be to spook a ship.
const DODGE_RANGE: f32 = 100.0;

/// Noise-driven fire intervals land in [20, 80] frames.
const FIRE_PERIOD_MIN: f64 = 20.0;
const FIRE_PERIOD_MAX: f64 = 80.0;
/// The noise cursor advances only when a shot actually fires.
const NOISE_STEP: f64 = 0.03;

const ASTEROID_SPAWN_BASE: f32 = 1200.0;
const UFO_SPAWN_BASE: f32 = 1700.0;
const SHIP_SPAWN_BASE: f32 = 4000.0;
const BOSS_SPAWN_BASE: f32 = 50000.0;

/// Minimum wall-clock gap between spawns. At zero the gate still throttles
/// to at most one spawn per elapsed millisecond.
const SPAWN_INTERVAL_MS: u64 = 0;

// ── Bullets ───────────────────────────────────────────────────────────────────

struct BulletSpec {
    speed: f32,
    w: f32,
    h: f32,
    dmg: i32,
}

/// An enemy-fired projectile. `x` is fixed at launch; only `y` moves.
#[derive(Clone, Debug)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub speed: f32,
    pub dmg: i32,
    pub dead: bool,
}

impl Bullet {
    fn from_spec(x: f32, y: f32, spec: &BulletSpec) -> Self {
        Bullet {
            x,
            y,
            w: spec.w,
            h: spec.h,
            speed: spec.speed,
            dmg: spec.dmg,
            dead: false,
        }
    }

    fn update(&mut self, player: &mut Player) {
        self.y += self.speed;
        if has_collided(
            self.x, self.y, self.w, self.h, player.x, player.y, player.w, player.h,
        ) {
            player.hit(self.dmg);
            self.dead = true;
        }
    }
}

fn tick_bullets(bullets: &mut Vec<Bullet>, player: &mut Player, height: f32) {
    for bullet in bullets.iter_mut() {
        bullet.update(player);
    }
    bullets.retain(|b| !b.dead && b.y <= height + OFFSCREEN_MARGIN);
}

// ── Enemy variants ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AsteroidSize {
    Small,
    Large,
}

impl AsteroidSize {
    /// Asteroids are square; render box and hit box share this extent.
    pub fn extent(self) -> f32 {
        match self {
            AsteroidSize::Small => 60.0,
            AsteroidSize::Large => 90.0,
        }
    }
}

#[derive(Clone, Debug)]
pub enum EnemyKind {
    Asteroid {
        size: AsteroidSize,
        /// Wrapped into [0, TAU) every frame.
        rotation: f32,
        spin: f32,
        x_speed: f32,
        y_speed: f32,
    },
    Ufo {
        bullets: Vec<Bullet>,
    },
    Ship {
        bullets: Vec<Bullet>,
        noise_x: f64,
    },
    Boss {
        bullets: Vec<Bullet>,
        noise_x: f64,
        hp: i32,
    },
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    /// Monotonic: set at most once, then the next prune pass removes us.
    pub dead: bool,
    pub kind: EnemyKind,
}

/// Everything an enemy may read or touch during one frame.
pub struct TickCtx<'a> {
    pub player: &'a mut Player,
    pub mixer: &'a mut Mixer,
    pub phase: &'a mut GamePhase,
    pub perlin: &'a Perlin,
    pub frame: u64,
    pub width: f32,
    pub height: f32,
}

impl Enemy {
    // ── Constructors ──────────────────────────────────────────────────────────

    fn at_spawn(rng: &mut impl Rng, width: f32, kind: EnemyKind) -> Self {
        Enemy {
            x: rng.gen_range(0.0..width),
            y: SPAWN_Y,
            dead: false,
            kind,
        }
    }

    pub fn asteroid(rng: &mut impl Rng, width: f32) -> Self {
        let kind = EnemyKind::Asteroid {
            size: if rng.gen_bool(0.5) {
                AsteroidSize::Small
            } else {
                AsteroidSize::Large
            },
            rotation: rng.gen_range(0.0..TAU),
            spin: rng.gen_range(-0.2..0.2),
            x_speed: rng.gen_range(-1.7..1.7),
            y_speed: rng.gen_range(2.0..4.5),
        };
        Enemy::at_spawn(rng, width, kind)
    }

    pub fn ufo(rng: &mut impl Rng, width: f32) -> Self {
        Enemy::at_spawn(rng, width, EnemyKind::Ufo { bullets: Vec::new() })
    }

    pub fn ship(rng: &mut impl Rng, width: f32) -> Self {
        let kind = EnemyKind::Ship {
            bullets: Vec::new(),
            noise_x: 0.0,
        };
        Enemy::at_spawn(rng, width, kind)
    }

    pub fn boss(rng: &mut impl Rng, width: f32) -> Self {
        let kind = EnemyKind::Boss {
            bullets: Vec::new(),
            noise_x: 0.0,
            hp: BOSS_HP,
        };
        Enemy::at_spawn(rng, width, kind)
    }

    // ── Per-variant dimension and reward tables ───────────────────────────────

    pub fn w(&self) -> f32 {
        match &self.kind {
            EnemyKind::Asteroid { size, .. } => size.extent(),
            EnemyKind::Ufo { .. } => UFO_W,
            EnemyKind::Ship { .. } => SHIP_W,
            EnemyKind::Boss { .. } => BOSS_W,
        }
    }

    pub fn h(&self) -> f32 {
        match &self.kind {
            EnemyKind::Asteroid { size, .. } => size.extent(),
            EnemyKind::Ufo { .. } => UFO_H,
            EnemyKind::Ship { .. } => SHIP_H,
            EnemyKind::Boss { .. } => BOSS_H,
        }
    }

    /// Collision-box y origin. Ships carry a small upward offset that,
    /// with the short `hhit`, makes their hit box forgiving.
    pub fn yhit(&self) -> f32 {
        match &self.kind {
            EnemyKind::Ship { .. } => self.y - 6.0,
            _ => self.y,
        }
    }

    pub fn hhit(&self) -> f32 {
        match &self.kind {
            EnemyKind::Ship { .. } => SHIP_HHIT,
            _ => self.h(),
        }
    }

    /// Lives paid out (times the player's gain multiplier) on a kill.
    pub fn l_points(&self) -> i32 {
        match &self.kind {
            EnemyKind::Asteroid { .. } => 0,
            EnemyKind::Ufo { .. } => 1,
            EnemyKind::Ship { .. } => 3,
            EnemyKind::Boss { .. } => 50,
        }
    }

    // ── Per-frame behavior ────────────────────────────────────────────────────

    pub fn update(&mut self, ctx: &mut TickCtx<'_>) {
        match &mut self.kind {
            EnemyKind::Asteroid {
                rotation,
                spin,
                x_speed,
                y_speed,
                ..
            } => {
                self.x += *x_speed;
                self.y += *y_speed;
                *rotation = (*rotation + *spin).rem_euclid(TAU);
            }

            EnemyKind::Ufo { bullets } => {
                if ctx.player.x > self.x {
                    self.x += UFO_SPEED;
                } else {
                    self.x -= UFO_SPEED;
                }
                self.y += UFO_SPEED;

                if ctx.frame % UFO_FIRE_PERIOD == 0 {
                    bullets.push(Bullet::from_spec(self.x, self.y, &UFO_BULLET));
                    ctx.mixer.restart(Cue::UfoShoot);
                }
                tick_bullets(bullets, ctx.player, ctx.height);
            }

            EnemyKind::Ship { bullets, noise_x } => {
                let mut dodging = false;
                for shot in &ctx.player.bullets {
                    // Preserved quirk: the lateral check is an OR, so any
                    // shot close in y spooks the ship regardless of how far
                    // off to the side it is.
                    if shot.y - DODGE_RANGE < self.y
                        && (shot.x + DODGE_RANGE > self.x || shot.x - DODGE_RANGE < self.x)
                    {
                        if shot.x > self.x {
                            self.x -= SHIP_SPEED;
                        } else {
                            self.x += SHIP_SPEED;
                        }
                        self.y -= SHIP_SPEED;
                        dodging = true;
                        break;
                    }
                }
                if !dodging {
                    if ctx.player.x > self.x {
                        self.x += SHIP_SPEED;
                    } else {
                        self.x -= SHIP_SPEED;
                    }
                    self.y += SHIP_SPEED;

                    if ctx.frame % fire_period(ctx.perlin, *noise_x) == 0 {
                        *noise_x += NOISE_STEP;
                        bullets.push(Bullet::from_spec(self.x, self.y, &SHIP_BULLET));
                        ctx.mixer.restart(Cue::ShipShoot);
                    }
                }
                tick_bullets(bullets, ctx.player, ctx.height);
            }

            EnemyKind::Boss { bullets, noise_x, .. } => {
                if ctx.player.x > self.x {
                    self.x += BOSS_SPEED;
                } else {
                    self.x -= BOSS_SPEED;
                }
                // Hold a band above the player rather than snapping to it.
                if ctx.player.y > self.y + BOSS_BAND_FAR {
                    self.y += BOSS_SPEED;
                } else if ctx.player.y < self.y + BOSS_BAND_NEAR {
                    self.y -= BOSS_SPEED;
                }

                if ctx.frame % fire_period(ctx.perlin, *noise_x) == 0 {
                    *noise_x += NOISE_STEP;
                    bullets.push(Bullet::from_spec(self.x, self.y, &BOSS_BULLET));
                    ctx.mixer.restart(Cue::BossShoot);
                }
                tick_bullets(bullets, ctx.player, ctx.height);
            }
        }

        self.resolve_contact(ctx);
    }

    fn resolve_contact(&mut self, ctx: &mut TickCtx<'_>) {
        let touching = has_collided(
            self.x,
            self.yhit(),
            self.w(),
            self.hhit(),
            ctx.player.x,
            ctx.player.y,
            ctx.player.w,
            ctx.player.h,
        );
        if !touching {
            return;
        }
        match &self.kind {
            // Ramming the boss ends the run outright; the boss itself
            // survives and the lives counter is not touched.
            EnemyKind::Boss { .. } => {
                *ctx.phase = GamePhase::GameOver;
                info!("boss contact at frame {}", ctx.frame);
            }
            EnemyKind::Asteroid { .. } => {
                ctx.player.hit(ASTEROID_CONTACT_DMG);
                self.dead = true;
                ctx.mixer.play(Cue::AsteroidHit);
            }
            EnemyKind::Ufo { .. } => {
                ctx.player.hit(UFO_CONTACT_DMG);
                self.dead = true;
                ctx.mixer.play(Cue::UfoDie);
            }
            EnemyKind::Ship { .. } => {
                ctx.player.hit(SHIP_CONTACT_DMG);
                self.dead = true;
                ctx.mixer.play(Cue::ShipDie);
            }
        }
    }

    /// Called once per player-bullet hit. For every variant but the boss
    /// this is terminal death; the boss counts hits on its `hp` instead
    /// and only dies (and pays out) when it is exhausted.
    pub fn die(&mut self, player: &mut Player, mixer: &mut Mixer) {
        let reward = player.l_gain * self.l_points();
        match &mut self.kind {
            EnemyKind::Asteroid { .. } => {
                // l_points is 0: rocks soak up fire without paying out,
                // and they stay alive.
                player.lives += reward;
                mixer.play(Cue::AsteroidHit);
            }
            EnemyKind::Ufo { .. } => {
                player.lives += reward;
                self.dead = true;
                mixer.play(Cue::UfoDie);
            }
            EnemyKind::Ship { .. } => {
                player.lives += reward;
                self.dead = true;
                mixer.play(Cue::ShipDie);
            }
            EnemyKind::Boss { hp, .. } => {
                *hp -= 1;
                if *hp <= 0 {
                    self.dead = true;
                    player.lives += reward;
                    mixer.play(Cue::BossDie);
                    info!("boss defeated");
                } else {
                    mixer.play(Cue::BossHit);
                }
            }
        }
    }
}

/// Map a Perlin sample at `cursor` into a whole-frame fire interval in
/// [FIRE_PERIOD_MIN, FIRE_PERIOD_MAX].
fn fire_period(perlin: &Perlin, cursor: f64) -> u64 {
    // Perlin output lands in [-1, 1]; fold into [0, 1] before mapping.
    let n = ((perlin.get([cursor, 0.0]) + 1.0) / 2.0).clamp(0.0, 1.0);
    (FIRE_PERIOD_MIN + (FIRE_PERIOD_MAX - FIRE_PERIOD_MIN) * n) as u64
}

// ── Wave roster ───────────────────────────────────────────────────────────────

/// The active enemies plus the spawn timer.
#[derive(Debug)]
pub struct Waves {
    pub enemies: Vec<Enemy>,
    pub spawn_interval_ms: u64,
    pub last_spawn_ms: u64,
}

impl Waves {
    pub fn new() -> Self {
        Waves {
            enemies: Vec::new(),
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            last_spawn_ms: 0,
        }
    }

    /// One frame of the roster: update everyone, prune the dead and the
    /// escaped, then consider spawning.
    pub fn update(
        &mut self,
        ctx: &mut TickCtx<'_>,
        rng: &mut impl Rng,
        total_level: u32,
        now_ms: u64,
    ) {
        for enemy in &mut self.enemies {
            enemy.update(ctx);
        }
        self.enemies.retain(|e| !e.dead);
        let floor = ctx.height + OFFSCREEN_MARGIN;
        self.enemies.retain(|e| e.y <= floor);

        self.try_spawn(rng, total_level, now_ms, ctx.width);
    }

    /// Weighted spawn trials in fixed priority order. The first success
    /// claims the slot and resets the wall-clock timer; later trials are
    /// not evaluated that frame.
    pub fn try_spawn(
        &mut self,
        rng: &mut impl Rng,
        total_level: u32,
        now_ms: u64,
        width: f32,
    ) {
        if now_ms.saturating_sub(self.last_spawn_ms) <= self.spawn_interval_ms {
            return;
        }

        let next = if spawn_trial(rng, ASTEROID_SPAWN_BASE, total_level) {
            Some(Enemy::asteroid(rng, width))
        } else if spawn_trial(rng, UFO_SPAWN_BASE, total_level) {
            Some(Enemy::ufo(rng, width))
        } else if spawn_trial(rng, SHIP_SPAWN_BASE, total_level) {
            Some(Enemy::ship(rng, width))
        } else if spawn_trial(rng, BOSS_SPAWN_BASE, total_level) {
            info!("boss inbound");
            Some(Enemy::boss(rng, width))
        } else {
            None
        };

        if let Some(enemy) = next {
            self.enemies.push(enemy);
            self.last_spawn_ms = now_ms;
        }
    }
}

impl Default for Waves {
    fn default() -> Self {
        Waves::new()
    }
}

/// One Bernoulli spawn check: succeeds 1 time in ceil(base / level).
/// Raising the level shrinks the denominator, so everything spawns more.
fn spawn_trial(rng: &mut impl Rng, base: f32, total_level: u32) -> bool {
    let odds = (base / total_level.max(1) as f32).ceil().max(1.0) as u32;
    rng.gen_ratio(1, odds)
}
