//! Rendering layer. All terminal I/O lives here.
//!
//! Each function receives a mutable writer and an immutable view of the
//! world. No game logic is performed; this module only scales world
//! coordinates to terminal cells and issues draw commands.

use std::f32::consts::TAU;
use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};

use starfall::compute::{World, WORLD_H, WORLD_W};
use starfall::enemies::{AsteroidSize, Bullet, Enemy, EnemyKind};
use starfall::entities::GamePhase;
use starfall::shop::UPGRADES;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_LIVES: Color = Color::Red;
const C_HUD_LEVEL: Color = Color::Yellow;
const C_PLAYER: Color = Color::White;
const C_ASTEROID: Color = Color::DarkYellow;
const C_UFO: Color = Color::Green;
const C_SHIP: Color = Color::Red;
const C_BOSS: Color = Color::Magenta;
const C_BULLET_PLAYER: Color = Color::Cyan;
const C_BULLET_ENEMY: Color = Color::Magenta;
const C_HINT: Color = Color::DarkGrey;
const C_TITLE: Color = Color::Cyan;

/// Asteroid spin rendered as a rotating glyph, one per quarter turn.
const SPIN_GLYPHS: [char; 4] = ['|', '/', '-', '\\'];

// ── World-to-terminal scaling ─────────────────────────────────────────────────

/// Play area inside the chrome: row 0 is the HUD, row 1 and row rows-2 the
/// border, the last row the controls hint.
#[derive(Clone, Copy)]
struct Viewport {
    cols: u16,
    rows: u16,
}

impl Viewport {
    fn new(cols: u16, rows: u16) -> Self {
        Viewport { cols, rows }
    }

    /// Map a world point to a terminal cell, or None when it is outside
    /// the visible play area.
    fn cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if !(0.0..WORLD_W).contains(&x) || !(0.0..WORLD_H).contains(&y) {
            return None;
        }
        let play_rows = self.rows.saturating_sub(4).max(1) as f32;
        let col = (x / WORLD_W * (self.cols.saturating_sub(2) as f32)) as u16 + 1;
        let row = (y / WORLD_H * play_rows) as u16 + 2;
        Some((col.min(self.cols.saturating_sub(2)), row))
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame for whatever screen the session is on.
pub fn render<W: Write>(out: &mut W, world: &World, cols: u16, rows: u16) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let vp = Viewport::new(cols, rows);

    match world.phase {
        GamePhase::Menu => draw_menu(out, world, vp)?,
        GamePhase::Shop => draw_shop(out, world, vp)?,
        GamePhase::Info => draw_info(out, vp)?,
        GamePhase::Playing => draw_playfield(out, world, vp)?,
        GamePhase::GameOver => {
            draw_playfield(out, world, vp)?;
            draw_game_over(out, world, vp)?;
        }
        GamePhase::Quit => {}
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Playfield ─────────────────────────────────────────────────────────────────

fn draw_playfield<W: Write>(out: &mut W, world: &World, vp: Viewport) -> std::io::Result<()> {
    draw_border(out, vp)?;
    draw_hud(out, world, vp)?;

    for enemy in &world.waves.enemies {
        draw_enemy(out, enemy, vp)?;
        let (bullets, glyph) = match &enemy.kind {
            EnemyKind::Asteroid { .. } => (None, '↓'),
            EnemyKind::Ufo { bullets } => (Some(bullets), '↓'),
            EnemyKind::Ship { bullets, .. } => (Some(bullets), '↓'),
            EnemyKind::Boss { bullets, .. } => (Some(bullets), '▼'),
        };
        if let Some(bullets) = bullets {
            draw_enemy_bullets(out, bullets, glyph, vp)?;
        }
    }

    out.queue(style::SetForegroundColor(C_BULLET_PLAYER))?;
    for bullet in &world.player.bullets {
        if let Some((col, row)) = vp.cell(bullet.x, bullet.y) {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(Print("║"))?;
        }
    }

    draw_player(out, world, vp)?;

    out.queue(cursor::MoveTo(1, vp.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → ↑ ↓ / W A S D : Move   SPACE : Shoot   M : Mute"))?;
    Ok(())
}

fn draw_border<W: Write>(out: &mut W, vp: Viewport) -> std::io::Result<()> {
    let w = vp.cols as usize;
    out.queue(style::SetForegroundColor(C_BORDER))?;
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;
    out.queue(cursor::MoveTo(0, vp.rows.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;
    for row in 2..vp.rows.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(vp.cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }
    Ok(())
}

fn draw_hud<W: Write>(out: &mut W, world: &World, vp: Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(format!("Lives:{:>4}", world.player.lives)))?;

    out.queue(style::SetForegroundColor(C_HUD_LEVEL))?;
    out.queue(Print(format!("  Lvl:{:>2}", world.shop.total_level())))?;

    // Boss health, centred, while one is on the field
    let boss_hp = world.waves.enemies.iter().find_map(|e| match &e.kind {
        EnemyKind::Boss { hp, .. } => Some(*hp),
        _ => None,
    });
    if let Some(hp) = boss_hp {
        let tag = format!("BOSS {:>2}/50", hp.max(0));
        let cx = (vp.cols / 2).saturating_sub(tag.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(cx, 0))?;
        out.queue(style::SetForegroundColor(C_BOSS))?;
        out.queue(Print(tag))?;
    }

    if world.mixer.muted {
        let tag = "[MUTED]";
        let rx = vp.cols.saturating_sub(tag.len() as u16 + 1);
        out.queue(cursor::MoveTo(rx, 0))?;
        out.queue(style::SetForegroundColor(C_HINT))?;
        out.queue(Print(tag))?;
    }
    Ok(())
}

fn draw_player<W: Write>(out: &mut W, world: &World, vp: Viewport) -> std::io::Result<()> {
    let p = &world.player;
    out.queue(style::SetForegroundColor(C_PLAYER))?;
    if let Some((col, row)) = vp.cell(p.x, p.y) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(Print("▲"))?;
        if row + 1 < vp.rows.saturating_sub(2) {
            out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), row + 1))?;
            out.queue(Print("/█\\"))?;
        }
    }
    Ok(())
}

fn draw_enemy<W: Write>(out: &mut W, enemy: &Enemy, vp: Viewport) -> std::io::Result<()> {
    let cell = match vp.cell(enemy.x, enemy.y) {
        Some(cell) => cell,
        None => return Ok(()),
    };
    let (col, row) = cell;
    let lx = col.saturating_sub(1).max(1);

    match &enemy.kind {
        EnemyKind::Asteroid { size, rotation, .. } => {
            let glyph = SPIN_GLYPHS[((rotation / TAU * 4.0) as usize).min(3)];
            out.queue(style::SetForegroundColor(C_ASTEROID))?;
            out.queue(cursor::MoveTo(col, row))?;
            match size {
                AsteroidSize::Small => {
                    out.queue(Print(glyph))?;
                }
                AsteroidSize::Large => {
                    out.queue(cursor::MoveTo(lx, row))?;
                    out.queue(Print(format!("({glyph})")))?;
                }
            }
        }
        EnemyKind::Ufo { .. } => {
            out.queue(style::SetForegroundColor(C_UFO))?;
            out.queue(cursor::MoveTo(lx, row))?;
            out.queue(Print("‹◎›"))?;
        }
        EnemyKind::Ship { .. } => {
            out.queue(style::SetForegroundColor(C_SHIP))?;
            out.queue(cursor::MoveTo(lx, row))?;
            out.queue(Print("«▼»"))?;
            if row + 1 < vp.rows.saturating_sub(2) {
                out.queue(cursor::MoveTo(lx, row + 1))?;
                out.queue(Print("╚═╝"))?;
            }
        }
        EnemyKind::Boss { .. } => {
            let sprite = ["╔══▼══╗", "║█████║", "╚═╦═╦═╝"];
            out.queue(style::SetForegroundColor(C_BOSS))?;
            let bx = col.saturating_sub(3).max(1);
            for (i, line) in sprite.iter().enumerate() {
                let r = row + i as u16;
                if r < vp.rows.saturating_sub(2) {
                    out.queue(cursor::MoveTo(bx, r))?;
                    out.queue(Print(line))?;
                }
            }
        }
    }
    Ok(())
}

fn draw_enemy_bullets<W: Write>(
    out: &mut W,
    bullets: &[Bullet],
    glyph: char,
    vp: Viewport,
) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(C_BULLET_ENEMY))?;
    for bullet in bullets {
        if let Some((col, row)) = vp.cell(bullet.x, bullet.y) {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(Print(glyph))?;
        }
    }
    Ok(())
}

// ── Menu / shop / info screens ────────────────────────────────────────────────

fn centred<W: Write>(
    out: &mut W,
    vp: Viewport,
    row: u16,
    color: Color,
    text: &str,
) -> std::io::Result<()> {
    let col = (vp.cols / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

fn draw_menu<W: Write>(out: &mut W, world: &World, vp: Viewport) -> std::io::Result<()> {
    let cy = vp.rows / 2;
    centred(out, vp, cy.saturating_sub(6), C_TITLE, "★  S T A R F A L L  ★")?;
    centred(
        out,
        vp,
        cy.saturating_sub(4),
        C_HUD_LIVES,
        &format!("Lives banked: {}", world.player.lives),
    )?;

    let options = [
        ("P", "Play"),
        ("S", "Shop"),
        ("I", "Info"),
        ("Q", "Quit"),
    ];
    for (i, (key, label)) in options.iter().enumerate() {
        let row = cy.saturating_sub(1) + i as u16;
        let col = (vp.cols / 2).saturating_sub(5);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(C_HINT))?;
        out.queue(Print(format!("[{key}] ")))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print(label))?;
    }

    centred(
        out,
        vp,
        cy + 5,
        C_HINT,
        "Survive the waves. Kills pay lives; lives buy upgrades.",
    )?;
    Ok(())
}

fn draw_shop<W: Write>(out: &mut W, world: &World, vp: Viewport) -> std::io::Result<()> {
    let cy = (vp.rows / 2).saturating_sub(4);
    centred(out, vp, cy, C_TITLE, "═══ SHOP ═══")?;
    centred(
        out,
        vp,
        cy + 1,
        C_HUD_LIVES,
        &format!("Lives to spend: {}", world.player.lives),
    )?;

    for (i, kind) in UPGRADES.iter().enumerate() {
        let row = cy + 3 + i as u16;
        let line = format!(
            "[{}] {:<13} Lv {:<2}  costs {:>3} lives",
            i + 1,
            kind.label(),
            world.shop.level(*kind),
            world.shop.price(*kind),
        );
        let col = (vp.cols / 2).saturating_sub(line.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        let affordable = world.player.lives > world.shop.price(*kind);
        out.queue(style::SetForegroundColor(if affordable {
            Color::White
        } else {
            Color::DarkGrey
        }))?;
        out.queue(Print(line))?;
    }

    centred(out, vp, cy + 8, C_HINT, "1-4 : Buy   B : Back")?;
    Ok(())
}

fn draw_info<W: Write>(out: &mut W, vp: Viewport) -> std::io::Result<()> {
    let cy = (vp.rows / 2).saturating_sub(6);
    centred(out, vp, cy, C_TITLE, "═══ INFO ═══")?;

    let lines: [(&str, Color); 8] = [
        ("Dodge or destroy whatever falls from the top.", C_HINT),
        ("", C_HINT),
        ("(|)  Asteroid  soaks shots, hurts on contact", C_ASTEROID),
        ("‹◎›  Ufo       fires on a fixed beat, pays 1", C_UFO),
        ("«▼»  Ship      dodges your fire, pays 3", C_SHIP),
        ("╔▼╗  Boss      50 hits to down, pays 50, do NOT ram it", C_BOSS),
        ("", C_HINT),
        ("W A S D / arrows move, SPACE shoots, M mutes.", C_HINT),
    ];
    for (i, (text, color)) in lines.iter().enumerate() {
        centred(out, vp, cy + 2 + i as u16, *color, text)?;
    }

    centred(out, vp, cy + 11, C_HINT, "B : Back")?;
    Ok(())
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(out: &mut W, world: &World, vp: Viewport) -> std::io::Result<()> {
    let box_lines = [
        "╔════════════════════╗",
        "║     GAME  OVER     ║",
        "╚════════════════════╝",
    ];
    let start = (vp.rows / 2).saturating_sub(3);
    for (i, line) in box_lines.iter().enumerate() {
        centred(out, vp, start + i as u16, Color::Red, line)?;
    }
    centred(
        out,
        vp,
        start + 3,
        C_HUD_LEVEL,
        &format!("Upgrade level reached: {}", world.shop.total_level()),
    )?;
    centred(
        out,
        vp,
        start + 4,
        Color::White,
        "P - Play Again   B - Menu   Q - Quit",
    )?;
    Ok(())
}
