mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal,
    ExecutableCommand,
};
use log::{debug, info, LevelFilter};
use rand::{thread_rng, Rng};

use starfall::compute::{World, WORLD_H, WORLD_W};
use starfall::entities::GamePhase;
use starfall::shop::UPGRADES;

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 4 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 4;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

// ── Key handling per screen ───────────────────────────────────────────────────

fn handle_press(world: &mut World, code: KeyCode, modifiers: KeyModifiers) {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        world.phase = GamePhase::Quit;
        return;
    }

    match world.phase {
        GamePhase::Menu => match code {
            KeyCode::Char('p') | KeyCode::Char('P') => world.start_run(),
            KeyCode::Char('s') | KeyCode::Char('S') => world.phase = GamePhase::Shop,
            KeyCode::Char('i') | KeyCode::Char('I') => world.phase = GamePhase::Info,
            KeyCode::Char('m') | KeyCode::Char('M') => world.mixer.muted = !world.mixer.muted,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                world.phase = GamePhase::Quit
            }
            _ => {}
        },
        GamePhase::Shop => match code {
            KeyCode::Char(c @ '1'..='4') => {
                let kind = UPGRADES[c as usize - '1' as usize];
                let World { shop, player, .. } = world;
                shop.try_buy(kind, player);
            }
            KeyCode::Char('b') | KeyCode::Char('B') | KeyCode::Esc => {
                world.phase = GamePhase::Menu
            }
            _ => {}
        },
        GamePhase::Info => match code {
            KeyCode::Char('b') | KeyCode::Char('B') | KeyCode::Esc => {
                world.phase = GamePhase::Menu
            }
            _ => {}
        },
        GamePhase::Playing => {
            if let KeyCode::Char('m') | KeyCode::Char('M') = code {
                world.mixer.muted = !world.mixer.muted;
            }
        }
        GamePhase::GameOver => match code {
            KeyCode::Char('p') | KeyCode::Char('P') => world.start_run(),
            KeyCode::Char('b') | KeyCode::Char('B') => world.phase = GamePhase::Menu,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                world.phase = GamePhase::Quit
            }
            _ => {}
        },
        GamePhase::Quit => {}
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Input model: instead of acting on each key event individually, we keep a
/// `key_frame` map recording the frame number of the last press/repeat event
/// for every key, and each frame apply all keys that are still "fresh".
/// This lets Space and a direction be held at the same time on terminals
/// with and without key-release reporting.
fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<()> {
    let (mut cols, mut rows) = terminal::size()?;
    let mut world = World::new(WORLD_W, WORLD_H, thread_rng().gen());
    let mut rng = thread_rng();

    let session_start = Instant::now();
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;

    let left_keys = [KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
    let right_keys = [KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
    let up_keys = [KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
    let down_keys = [KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // Drain all pending input events (non-blocking)
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent { code, kind, modifiers, .. }) => match kind {
                    KeyEventKind::Press => {
                        key_frame.insert(code, frame);
                        handle_press(&mut world, code, modifiers);
                    }
                    KeyEventKind::Repeat => {
                        key_frame.insert(code, frame);
                    }
                    KeyEventKind::Release => {
                        key_frame.remove(&code);
                    }
                },
                Event::Resize(new_cols, new_rows) => {
                    cols = new_cols;
                    rows = new_rows;
                }
                _ => {}
            }
        }

        if world.phase == GamePhase::Quit {
            break;
        }

        if world.phase == GamePhase::Playing {
            let mut dx = 0.0;
            let mut dy = 0.0;
            if any_held(&key_frame, &left_keys, frame) {
                dx -= 1.0;
            } else if any_held(&key_frame, &right_keys, frame) {
                dx += 1.0;
            }
            if any_held(&key_frame, &up_keys, frame) {
                dy -= 1.0;
            } else if any_held(&key_frame, &down_keys, frame) {
                dy += 1.0;
            }
            if dx != 0.0 || dy != 0.0 {
                world.steer(dx, dy);
            }
            if is_held(&key_frame, &KeyCode::Char(' '), frame) {
                world.fire();
            }

            let now_ms = session_start.elapsed().as_millis() as u64;
            world.tick(&mut rng, now_ms);

            // No audio backend in a terminal; cues end up in the log.
            for sfx in world.mixer.drain() {
                debug!("sfx: {:?}", sfx);
            }
        }

        display::render(out, &world, cols, rows)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    simple_logging::log_to_file("starfall.log", LevelFilter::Info)?;
    info!("starfall starting");

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    info!("starfall exiting");
    result
}
