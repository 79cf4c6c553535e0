//! Player-side entity types and the session phase flag.

use crate::audio::{Cue, Mixer};

/// Vertical margin past the screen edge before an entity is despawned.
pub const OFFSCREEN_MARGIN: f32 = 200.0;

/// Lives the player starts each run with. Lives are also the shop currency.
pub const STARTING_LIVES: i32 = 10;

const PLAYER_W: f32 = 60.0;
const PLAYER_H: f32 = 70.0;
const PLAYER_BASE_SPEED: f32 = 8.0;
const PLAYER_BASE_RELOAD: u64 = 20;
const PLAYER_BASE_BULLET_SPEED: f32 = 8.0;
const PLAYER_BULLET_W: f32 = 6.0;
const PLAYER_BULLET_H: f32 = 24.0;

/// Which screen the session is on. The core writes this in exactly two
/// places (boss contact and lives running out); everything else is the
/// frontend's key handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    Menu,
    Shop,
    Info,
    Playing,
    GameOver,
    Quit,
}

// ── Player ────────────────────────────────────────────────────────────────────

/// A player-fired projectile. Travels straight up at the speed it was
/// fired with; `x` never changes after spawn.
#[derive(Clone, Debug)]
pub struct PlayerBullet {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub speed: f32,
    pub dead: bool,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// Health and shop currency in one number. May go negative on a hard hit.
    pub lives: i32,
    /// Reward multiplier applied to every enemy kill payout.
    pub l_gain: i32,
    pub speed: f32,
    /// Minimum frames between shots.
    pub reload_frames: u64,
    pub bullet_speed: f32,
    pub last_shot_frame: u64,
    pub bullets: Vec<PlayerBullet>,
}

impl Player {
    pub fn new(x: f32, y: f32) -> Self {
        Player {
            x,
            y,
            w: PLAYER_W,
            h: PLAYER_H,
            lives: STARTING_LIVES,
            l_gain: 1,
            speed: PLAYER_BASE_SPEED,
            reload_frames: PLAYER_BASE_RELOAD,
            bullet_speed: PLAYER_BASE_BULLET_SPEED,
            last_shot_frame: 0,
            bullets: Vec::new(),
        }
    }

    /// Take `dmg` points of damage.
    pub fn hit(&mut self, dmg: i32) {
        self.lives -= dmg;
    }

    /// Move by one held-key step, clamped to the playfield.
    pub fn steer(&mut self, dx: f32, dy: f32, width: f32, height: f32) {
        self.x = (self.x + dx * self.speed).clamp(0.0, width);
        self.y = (self.y + dy * self.speed).clamp(0.0, height);
    }

    /// Fire one bullet if the reload window has elapsed.
    pub fn try_shoot(&mut self, frame: u64, mixer: &mut Mixer) {
        if frame.saturating_sub(self.last_shot_frame) < self.reload_frames {
            return;
        }
        self.bullets.push(PlayerBullet {
            x: self.x,
            y: self.y,
            w: PLAYER_BULLET_W,
            h: PLAYER_BULLET_H,
            speed: self.bullet_speed,
            dead: false,
        });
        self.last_shot_frame = frame;
        mixer.play(Cue::PlayerShoot);
    }

    /// Advance own bullets and drop the spent or escaped ones.
    pub fn tick_bullets(&mut self) {
        for bullet in &mut self.bullets {
            bullet.y -= bullet.speed;
        }
        self.bullets
            .retain(|b| !b.dead && b.y >= -OFFSCREEN_MARGIN);
    }
}
