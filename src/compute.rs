//! Collision math and the per-frame world orchestration.
//!
//! `World::tick` is the single mutation pass: player bullets advance and
//! resolve against enemies, then every enemy runs its own update (which
//! moves it, fires, advances its bullets and checks player contact), then
//! the roster is pruned and the spawner consulted. All randomness and both
//! clocks (frame counter, wall-clock millis) are injected so tests control
//! them.

use log::info;
use noise::Perlin;
use rand::Rng;

use crate::audio::Mixer;
use crate::enemies::{TickCtx, Waves};
use crate::entities::{GamePhase, Player, STARTING_LIVES};
use crate::shop::Shop;

/// Fixed playfield in world units; the renderer scales to the terminal.
pub const WORLD_W: f32 = 1920.0;
pub const WORLD_H: f32 = 1080.0;

/// How far above the bottom edge the player spawns.
const PLAYER_START_CLEARANCE: f32 = 150.0;

// ── Collision oracle ──────────────────────────────────────────────────────────

/// Center-anchored AABB overlap. Each box is given as its center point and
/// full extents. Touching edges do not count as overlap.
pub fn has_collided(
    ax: f32,
    ay: f32,
    aw: f32,
    ah: f32,
    bx: f32,
    by: f32,
    bw: f32,
    bh: f32,
) -> bool {
    (ax - bx).abs() < (aw + bw) / 2.0 && (ay - by).abs() < (ah + bh) / 2.0
}

// ── World ─────────────────────────────────────────────────────────────────────

/// The whole session: playfield, player, roster, shop, sound queue and the
/// current screen. One of these lives for the life of the process.
pub struct World {
    pub player: Player,
    pub waves: Waves,
    pub shop: Shop,
    pub mixer: Mixer,
    pub phase: GamePhase,
    pub frame: u64,
    pub width: f32,
    pub height: f32,
    pub perlin: Perlin,
}

impl World {
    pub fn new(width: f32, height: f32, noise_seed: u32) -> Self {
        World {
            player: Player::new(width / 2.0, height - PLAYER_START_CLEARANCE),
            waves: Waves::new(),
            shop: Shop::new(),
            mixer: Mixer::new(),
            phase: GamePhase::Menu,
            frame: 0,
            width,
            height,
            perlin: Perlin::new(noise_seed),
        }
    }

    /// Reset the playfield for a fresh run. Bought upgrades (and the player
    /// stats they modified) survive; the lives stake does not carry over.
    pub fn start_run(&mut self) {
        self.player.x = self.width / 2.0;
        self.player.y = self.height - PLAYER_START_CLEARANCE;
        self.player.lives = STARTING_LIVES;
        self.player.bullets.clear();
        self.player.last_shot_frame = 0;
        self.waves = Waves::new();
        self.frame = 0;
        self.phase = GamePhase::Playing;
        info!("run started at shop level {}", self.shop.total_level());
    }

    /// Advance the simulation one frame. `now_ms` is wall-clock time since
    /// the session began and gates only the spawner; motion is fixed-step.
    pub fn tick(&mut self, rng: &mut impl Rng, now_ms: u64) {
        self.frame += 1;

        self.player.tick_bullets();
        resolve_player_fire(&mut self.player, &mut self.waves, &mut self.mixer);

        let total_level = self.shop.total_level();
        let mut ctx = TickCtx {
            player: &mut self.player,
            mixer: &mut self.mixer,
            phase: &mut self.phase,
            perlin: &self.perlin,
            frame: self.frame,
            width: self.width,
            height: self.height,
        };
        self.waves.update(&mut ctx, rng, total_level, now_ms);

        // Out of lives ends the run; the boss-contact path may already
        // have flipped the phase this frame.
        if self.player.lives <= 0 && self.phase == GamePhase::Playing {
            self.phase = GamePhase::GameOver;
            info!("out of lives at frame {}", self.frame);
        }
    }

    /// Held-key movement, forwarded to the player with field bounds.
    pub fn steer(&mut self, dx: f32, dy: f32) {
        let (w, h) = (self.width, self.height);
        self.player.steer(dx, dy, w, h);
    }

    pub fn fire(&mut self) {
        self.player.try_shoot(self.frame, &mut self.mixer);
    }
}

/// Test every live player bullet against every live enemy. A hit spends
/// the bullet and lands one `die()` on the enemy; a freshly dead enemy
/// stops soaking further bullets this frame.
fn resolve_player_fire(player: &mut Player, waves: &mut Waves, mixer: &mut Mixer) {
    let mut shots = std::mem::take(&mut player.bullets);
    for enemy in waves.enemies.iter_mut() {
        if enemy.dead {
            continue;
        }
        for shot in shots.iter_mut() {
            if shot.dead {
                continue;
            }
            if has_collided(
                shot.x,
                shot.y,
                shot.w,
                shot.h,
                enemy.x,
                enemy.yhit(),
                enemy.w(),
                enemy.hhit(),
            ) {
                shot.dead = true;
                enemy.die(player, mixer);
                if enemy.dead {
                    break;
                }
            }
        }
    }
    shots.retain(|s| !s.dead);
    player.bullets = shots;
}
