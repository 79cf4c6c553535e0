use starfall::audio::{Cue, Mixer, SfxEvent};
use starfall::compute::{WORLD_H, WORLD_W};
use starfall::entities::Player;

fn make_player() -> Player {
    Player::new(960.0, 930.0)
}

// ── Player ────────────────────────────────────────────────────────────────────

#[test]
fn hit_drains_lives_and_may_go_negative() {
    let mut player = make_player();
    player.lives = 2;
    player.hit(3);
    assert_eq!(player.lives, -1);
}

#[test]
fn steer_clamps_to_the_field() {
    let mut player = make_player();
    player.x = 2.0;
    player.steer(-1.0, 0.0, WORLD_W, WORLD_H);
    assert_eq!(player.x, 0.0);

    player.y = WORLD_H - 1.0;
    player.steer(0.0, 1.0, WORLD_W, WORLD_H);
    assert_eq!(player.y, WORLD_H);
}

#[test]
fn steer_moves_by_the_player_speed() {
    let mut player = make_player();
    player.speed = 8.0;
    let x0 = player.x;
    player.steer(1.0, 0.0, WORLD_W, WORLD_H);
    assert_eq!(player.x, x0 + 8.0);
}

#[test]
fn try_shoot_queues_a_cue_and_a_bullet() {
    let mut player = make_player();
    let mut mixer = Mixer::new();
    player.try_shoot(100, &mut mixer);

    assert_eq!(player.bullets.len(), 1);
    assert_eq!(player.bullets[0].x, player.x);
    assert_eq!(mixer.drain(), vec![SfxEvent::Play(Cue::PlayerShoot)]);
}

#[test]
fn try_shoot_is_reload_gated() {
    let mut player = make_player();
    let mut mixer = Mixer::new();
    player.try_shoot(100, &mut mixer);
    player.try_shoot(101, &mut mixer);
    assert_eq!(player.bullets.len(), 1);

    player.try_shoot(100 + player.reload_frames, &mut mixer);
    assert_eq!(player.bullets.len(), 2);
}

#[test]
fn bullets_fly_up_and_expire_past_the_margin() {
    let mut player = make_player();
    let mut mixer = Mixer::new();
    player.try_shoot(100, &mut mixer);
    let y0 = player.bullets[0].y;

    player.tick_bullets();
    assert_eq!(player.bullets[0].y, y0 - player.bullet_speed);

    player.bullets[0].y = -201.0;
    player.tick_bullets();
    assert!(player.bullets.is_empty());
}

// ── Mixer ─────────────────────────────────────────────────────────────────────

#[test]
fn muted_mixer_swallows_play_but_not_stop() {
    let mut mixer = Mixer::new();
    mixer.muted = true;
    mixer.play(Cue::BossShoot);
    mixer.stop(Cue::BossShoot);
    assert_eq!(mixer.drain(), vec![SfxEvent::Stop(Cue::BossShoot)]);
}

#[test]
fn restart_stops_then_plays() {
    let mut mixer = Mixer::new();
    mixer.restart(Cue::ShipShoot);
    assert_eq!(
        mixer.drain(),
        vec![SfxEvent::Stop(Cue::ShipShoot), SfxEvent::Play(Cue::ShipShoot)]
    );
}

#[test]
fn drain_empties_the_queue() {
    let mut mixer = Mixer::new();
    mixer.play(Cue::AsteroidHit);
    assert_eq!(mixer.drain().len(), 1);
    assert!(mixer.drain().is_empty());
    assert!(mixer.pending().is_empty());
}
