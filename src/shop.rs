//! The upgrade shop. Purchases are paid in lives, apply to the player
//! immediately, and last for the session only. The sum of all upgrade
//! levels doubles as the difficulty scalar the spawner reads.

use log::info;

use crate::entities::Player;

/// Fastest allowed reload, in frames between shots.
const RELOAD_FLOOR: u64 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpgradeKind {
    BulletSpeed,
    Reload,
    LifeGain,
    MoveSpeed,
}

pub const UPGRADES: [UpgradeKind; 4] = [
    UpgradeKind::BulletSpeed,
    UpgradeKind::Reload,
    UpgradeKind::LifeGain,
    UpgradeKind::MoveSpeed,
];

impl UpgradeKind {
    pub fn label(self) -> &'static str {
        match self {
            UpgradeKind::BulletSpeed => "Bullet speed",
            UpgradeKind::Reload => "Reload",
            UpgradeKind::LifeGain => "Life gain",
            UpgradeKind::MoveSpeed => "Move speed",
        }
    }

    /// Price per level already owned.
    fn base_price(self) -> i32 {
        match self {
            UpgradeKind::BulletSpeed => 3,
            UpgradeKind::Reload => 4,
            UpgradeKind::LifeGain => 6,
            UpgradeKind::MoveSpeed => 3,
        }
    }
}

/// Current level of each upgrade. Levels start at 1.
#[derive(Clone, Debug)]
pub struct Shop {
    bullet_speed: u32,
    reload: u32,
    life_gain: u32,
    move_speed: u32,
}

impl Shop {
    pub fn new() -> Self {
        Shop {
            bullet_speed: 1,
            reload: 1,
            life_gain: 1,
            move_speed: 1,
        }
    }

    pub fn level(&self, kind: UpgradeKind) -> u32 {
        match kind {
            UpgradeKind::BulletSpeed => self.bullet_speed,
            UpgradeKind::Reload => self.reload,
            UpgradeKind::LifeGain => self.life_gain,
            UpgradeKind::MoveSpeed => self.move_speed,
        }
    }

    /// The difficulty scalar: every level bought makes the whole field
    /// spawn faster.
    pub fn total_level(&self) -> u32 {
        self.bullet_speed + self.reload + self.life_gain + self.move_speed
    }

    pub fn price(&self, kind: UpgradeKind) -> i32 {
        kind.base_price() * self.level(kind) as i32
    }

    /// Buy one level if the player can afford it with at least one life
    /// left over. Applies the stat change on success.
    pub fn try_buy(&mut self, kind: UpgradeKind, player: &mut Player) -> bool {
        let price = self.price(kind);
        if player.lives <= price {
            return false;
        }
        player.lives -= price;
        match kind {
            UpgradeKind::BulletSpeed => {
                self.bullet_speed += 1;
                player.bullet_speed += 2.0;
            }
            UpgradeKind::Reload => {
                self.reload += 1;
                player.reload_frames = player.reload_frames.saturating_sub(2).max(RELOAD_FLOOR);
            }
            UpgradeKind::LifeGain => {
                self.life_gain += 1;
                player.l_gain += 1;
            }
            UpgradeKind::MoveSpeed => {
                self.move_speed += 1;
                player.speed += 1.0;
            }
        }
        info!(
            "bought {:?} (level {}), {} lives left",
            kind,
            self.level(kind),
            player.lives
        );
        true
    }
}

impl Default for Shop {
    fn default() -> Self {
        Shop::new()
    }
}
