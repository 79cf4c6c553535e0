use noise::Perlin;
use rand::rngs::mock::StepRng;
use rand::rngs::StdRng;
use rand::SeedableRng;

use starfall::audio::{Cue, Mixer, SfxEvent};
use starfall::compute::{WORLD_H, WORLD_W};
use starfall::enemies::{Enemy, EnemyKind, TickCtx, Waves, SPAWN_Y};
use starfall::entities::{GamePhase, Player, PlayerBullet};

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// A StepRng stuck at zero makes every spawn trial succeed; stuck at max,
/// every trial fails.
fn always_rng() -> StepRng {
    StepRng::new(0, 0)
}

fn never_rng() -> StepRng {
    StepRng::new(u64::MAX, 0)
}

/// Test fixture owning everything a TickCtx borrows.
struct Rig {
    player: Player,
    mixer: Mixer,
    phase: GamePhase,
    perlin: Perlin,
}

impl Rig {
    /// Player parked bottom-left, far from the action.
    fn new() -> Self {
        Rig {
            player: Player::new(100.0, 900.0),
            mixer: Mixer::new(),
            phase: GamePhase::Playing,
            perlin: Perlin::new(7),
        }
    }

    fn ctx(&mut self, frame: u64) -> TickCtx<'_> {
        TickCtx {
            player: &mut self.player,
            mixer: &mut self.mixer,
            phase: &mut self.phase,
            perlin: &self.perlin,
            frame,
            width: WORLD_W,
            height: WORLD_H,
        }
    }
}

fn bullet_count(enemy: &Enemy) -> usize {
    match &enemy.kind {
        EnemyKind::Ufo { bullets }
        | EnemyKind::Ship { bullets, .. }
        | EnemyKind::Boss { bullets, .. } => bullets.len(),
        EnemyKind::Asteroid { .. } => 0,
    }
}

fn shot_at(x: f32, y: f32) -> PlayerBullet {
    PlayerBullet {
        x,
        y,
        w: 6.0,
        h: 24.0,
        speed: 0.0,
        dead: false,
    }
}

// ── Ufo ───────────────────────────────────────────────────────────────────────

#[test]
fn ufo_fires_on_every_hundredth_frame_only() {
    let mut rig = Rig::new();
    let mut ufo = Enemy::ufo(&mut seeded_rng(), WORLD_W);
    ufo.x = 1800.0;

    for frame in 1..=99 {
        ufo.update(&mut rig.ctx(frame));
        assert_eq!(bullet_count(&ufo), 0, "early shot at frame {frame}");
    }
    ufo.update(&mut rig.ctx(100));
    assert_eq!(bullet_count(&ufo), 1);

    for frame in 101..=199 {
        ufo.update(&mut rig.ctx(frame));
        assert_eq!(bullet_count(&ufo), 1, "extra shot at frame {frame}");
    }
    ufo.update(&mut rig.ctx(200));
    assert_eq!(bullet_count(&ufo), 2);
}

#[test]
fn ufo_restarts_its_firing_cue() {
    let mut rig = Rig::new();
    let mut ufo = Enemy::ufo(&mut seeded_rng(), WORLD_W);
    ufo.x = 1800.0;

    for frame in 1..=99 {
        ufo.update(&mut rig.ctx(frame));
    }
    rig.mixer.drain();
    ufo.update(&mut rig.ctx(100));
    assert_eq!(
        rig.mixer.drain(),
        vec![SfxEvent::Stop(Cue::UfoShoot), SfxEvent::Play(Cue::UfoShoot)]
    );
}

#[test]
fn ufo_homes_by_one_step_toward_the_player() {
    let mut rig = Rig::new();
    let mut ufo = Enemy::ufo(&mut seeded_rng(), WORLD_W);
    ufo.x = 1000.0;
    ufo.y = 300.0;

    rig.player.x = 1500.0; // far right: step is still fixed-size
    ufo.update(&mut rig.ctx(1));
    assert_eq!(ufo.x, 1002.0);
    assert_eq!(ufo.y, 302.0);

    rig.player.x = 1003.0; // just right of the ufo: same step
    ufo.update(&mut rig.ctx(2));
    assert_eq!(ufo.x, 1004.0);

    rig.player.x = 0.0;
    ufo.update(&mut rig.ctx(3));
    assert_eq!(ufo.x, 1002.0);
}

#[test]
fn ufo_contact_hurts_the_player_and_kills_the_ufo() {
    let mut rig = Rig::new();
    let mut ufo = Enemy::ufo(&mut seeded_rng(), WORLD_W);
    ufo.x = rig.player.x;
    ufo.y = rig.player.y - 2.0; // overlapping after the descent step

    let lives_before = rig.player.lives;
    ufo.update(&mut rig.ctx(1));
    assert!(ufo.dead);
    assert_eq!(rig.player.lives, lives_before - 1);
}

// ── Asteroid ──────────────────────────────────────────────────────────────────

#[test]
fn asteroid_rotation_stays_wrapped() {
    let mut rig = Rig::new();
    let mut rock = Enemy::asteroid(&mut seeded_rng(), WORLD_W);
    rock.x = 500.0;
    rock.y = 300.0;

    for frame in 1..=500 {
        rock.update(&mut rig.ctx(frame));
        let rotation = match &rock.kind {
            EnemyKind::Asteroid { rotation, .. } => *rotation,
            _ => unreachable!(),
        };
        assert!((0.0..std::f32::consts::TAU).contains(&rotation));
    }
}

#[test]
fn asteroid_contact_damages_and_dies() {
    let mut rig = Rig::new();
    let mut rock = Enemy::asteroid(&mut seeded_rng(), WORLD_W);
    rock.x = rig.player.x;
    rock.y = rig.player.y;

    let lives_before = rig.player.lives;
    rock.update(&mut rig.ctx(1));
    assert!(rock.dead);
    assert_eq!(rig.player.lives, lives_before - 1);
}

// ── EnemyShip ─────────────────────────────────────────────────────────────────

#[test]
fn ship_dodges_a_bullet_a_thousand_units_to_the_side() {
    // The dodge predicate's lateral check is an OR, so a shot at x=1000
    // still spooks a ship at x=0 as long as it is close in y.
    let mut rig = Rig::new();
    let mut ship = Enemy::ship(&mut seeded_rng(), WORLD_W);
    ship.x = 0.0;
    ship.y = 500.0;
    rig.player.bullets.push(shot_at(1000.0, 450.0));

    ship.update(&mut rig.ctx(1));

    assert_eq!(ship.x, -4.0); // sidestepped away from the shot
    assert_eq!(ship.y, 496.0); // and climbed
    assert_eq!(bullet_count(&ship), 0); // attack skipped this frame
}

#[test]
fn ship_advances_when_nothing_to_dodge() {
    let mut rig = Rig::new();
    let mut ship = Enemy::ship(&mut seeded_rng(), WORLD_W);
    ship.x = 500.0;
    ship.y = 300.0;
    rig.player.x = 1500.0;

    ship.update(&mut rig.ctx(1));
    assert_eq!(ship.x, 504.0);
    assert_eq!(ship.y, 304.0);
}

#[test]
fn ship_fire_interval_comes_from_the_noise_field() {
    // A fresh noise cursor sits on a lattice point, where Perlin noise is
    // exactly zero: the first interval is always 20 + 60 * 0.5 = 50 frames.
    let mut rig = Rig::new();
    let mut ship = Enemy::ship(&mut seeded_rng(), WORLD_W);
    ship.x = 500.0;
    ship.y = -3000.0; // far above the field, nothing to collide with
    rig.player.x = 500.0;

    for frame in 1..=49 {
        ship.update(&mut rig.ctx(frame));
        assert_eq!(bullet_count(&ship), 0, "early shot at frame {frame}");
    }
    ship.update(&mut rig.ctx(50));
    assert_eq!(bullet_count(&ship), 1);

    let cursor = match &ship.kind {
        EnemyKind::Ship { noise_x, .. } => *noise_x,
        _ => unreachable!(),
    };
    assert!((cursor - 0.03).abs() < 1e-9); // cursor advances only on a shot
}

#[test]
fn ship_hitbox_is_offset_and_short() {
    let ship = Enemy::ship(&mut seeded_rng(), WORLD_W);
    assert_eq!(ship.yhit(), ship.y - 6.0);
    assert_eq!(ship.hhit(), 15.0);
    assert_eq!(ship.h(), 108.0);
}

// ── Boss ──────────────────────────────────────────────────────────────────────

#[test]
fn boss_dies_on_the_fiftieth_hit_and_pays_once() {
    let mut rig = Rig::new();
    rig.player.l_gain = 2;
    let mut boss = Enemy::boss(&mut seeded_rng(), WORLD_W);

    let lives_before = rig.player.lives;
    for _ in 1..=49 {
        boss.die(&mut rig.player, &mut rig.mixer);
        assert!(!boss.dead);
        assert_eq!(rig.player.lives, lives_before);
    }

    rig.mixer.drain();
    boss.die(&mut rig.player, &mut rig.mixer);
    assert!(boss.dead);
    assert_eq!(rig.player.lives, lives_before + 2 * 50);
    assert_eq!(rig.mixer.drain(), vec![SfxEvent::Play(Cue::BossDie)]);
}

#[test]
fn boss_holds_a_band_above_the_player() {
    let mut rig = Rig::new();
    let mut boss = Enemy::boss(&mut seeded_rng(), WORLD_W);
    boss.x = 1500.0; // keep the x gap wide so contact never triggers
    boss.y = 0.0;
    rig.player.x = 100.0;

    rig.player.y = 300.0; // more than 250 below: descend
    boss.update(&mut rig.ctx(1));
    assert_eq!(boss.y, 1.0);

    boss.y = 0.0;
    rig.player.y = 225.0; // inside the dead zone: hold
    boss.update(&mut rig.ctx(2));
    assert_eq!(boss.y, 0.0);

    boss.y = 0.0;
    rig.player.y = 100.0; // less than 200 below: climb
    boss.update(&mut rig.ctx(3));
    assert_eq!(boss.y, -1.0);
}

#[test]
fn bullets_vanish_with_their_owner() {
    // An enemy pruned from the roster takes its bullets with it; nothing
    // is reparented.
    let mut rig = Rig::new();
    let mut waves = Waves::new();
    let mut ufo = Enemy::ufo(&mut seeded_rng(), WORLD_W);
    ufo.x = 1800.0;
    ufo.dead = true;
    waves.enemies.push(ufo);

    waves.update(&mut rig.ctx(1), &mut never_rng(), 1, 1000);
    assert!(waves.enemies.is_empty());
}

// ── Roster pruning ────────────────────────────────────────────────────────────

#[test]
fn dead_enemies_leave_on_the_next_pass() {
    let mut rig = Rig::new();
    let mut waves = Waves::new();
    let mut rock = Enemy::asteroid(&mut seeded_rng(), WORLD_W);
    rock.x = 500.0;
    rock.y = 300.0;
    rock.dead = true;
    waves.enemies.push(rock);

    waves.update(&mut rig.ctx(1), &mut never_rng(), 1, 1000);
    assert!(waves.enemies.is_empty());

    // a second pass has nothing left to remove
    waves.update(&mut rig.ctx(2), &mut never_rng(), 1, 2000);
    assert!(waves.enemies.is_empty());
}

#[test]
fn enemies_past_the_bottom_margin_are_removed() {
    let mut rig = Rig::new();
    let mut waves = Waves::new();

    let mut escaped = Enemy::ufo(&mut seeded_rng(), WORLD_W);
    escaped.x = 1800.0;
    escaped.y = WORLD_H + 201.0;
    let mut live = Enemy::ufo(&mut seeded_rng(), WORLD_W);
    live.x = 1800.0;
    live.y = 300.0;
    waves.enemies.push(escaped);
    waves.enemies.push(live);

    waves.update(&mut rig.ctx(1), &mut never_rng(), 1, 1000);
    assert_eq!(waves.enemies.len(), 1);
    assert_eq!(waves.enemies[0].y, 302.0);
}

// ── Spawner ───────────────────────────────────────────────────────────────────

#[test]
fn spawn_priority_short_circuits_at_the_first_success() {
    // With an RNG that passes every trial, only the first-priority kind
    // (the asteroid) may spawn, and the timer resets exactly once.
    let mut waves = Waves::new();
    waves.try_spawn(&mut always_rng(), 4, 5, WORLD_W);

    assert_eq!(waves.enemies.len(), 1);
    assert!(matches!(waves.enemies[0].kind, EnemyKind::Asteroid { .. }));
    assert_eq!(waves.last_spawn_ms, 5);
}

#[test]
fn spawn_waits_for_the_wall_clock_interval() {
    let mut waves = Waves::new();
    waves.try_spawn(&mut always_rng(), 4, 5, WORLD_W);
    assert_eq!(waves.enemies.len(), 1);

    // same millisecond: the gate is still shut
    waves.try_spawn(&mut always_rng(), 4, 5, WORLD_W);
    assert_eq!(waves.enemies.len(), 1);

    waves.try_spawn(&mut always_rng(), 4, 6, WORLD_W);
    assert_eq!(waves.enemies.len(), 2);
}

#[test]
fn spawn_honors_a_longer_interval() {
    let mut waves = Waves::new();
    waves.spawn_interval_ms = 1000;

    waves.try_spawn(&mut always_rng(), 4, 900, WORLD_W);
    assert!(waves.enemies.is_empty());

    waves.try_spawn(&mut always_rng(), 4, 1001, WORLD_W);
    assert_eq!(waves.enemies.len(), 1);
}

#[test]
fn spawned_enemies_enter_above_the_field() {
    let mut waves = Waves::new();
    waves.try_spawn(&mut always_rng(), 4, 5, WORLD_W);
    let enemy = &waves.enemies[0];
    assert_eq!(enemy.y, SPAWN_Y);
    assert!((0.0..WORLD_W).contains(&enemy.x));
    assert!(!enemy.dead);
}

#[test]
fn high_level_forces_a_spawn_even_with_a_real_rng() {
    // At an absurd difficulty the asteroid odds collapse to 1-in-1.
    let mut waves = Waves::new();
    waves.try_spawn(&mut seeded_rng(), 1_000_000, 5, WORLD_W);
    assert_eq!(waves.enemies.len(), 1);
    assert!(matches!(waves.enemies[0].kind, EnemyKind::Asteroid { .. }));
}
