//! # Entities
//!
//! The player, the three enemy kinds, floor items, and melee resolution.

use crate::config;
use crate::Position;
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Anything that can trade blows in melee.
pub trait Combatant {
    /// Name used in combat messages ("You", "The goblin", ...).
    fn display_name(&self) -> String;
    /// Base damage before jitter.
    fn attack(&self) -> i32;
    fn hp(&self) -> i32;
    fn hp_mut(&mut self) -> &mut i32;

    fn is_alive(&self) -> bool {
        self.hp() > 0
    }
}

/// Result of a single melee exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeleeOutcome {
    /// Damage dealt after jitter
    pub damage: i32,
    /// Whether the defender dropped to 0 hp or below
    pub killed: bool,
}

/// Resolves one attack: `attack + jitter` is taken off the defender's hp.
pub fn resolve_melee<A, D, R>(attacker: &A, defender: &mut D, rng: &mut R) -> MeleeOutcome
where
    A: Combatant + ?Sized,
    D: Combatant + ?Sized,
    R: Rng + ?Sized,
{
    let jitter = rng.gen_range(-config::DAMAGE_JITTER..=config::DAMAGE_JITTER);
    let damage = attacker.attack() + jitter;
    *defender.hp_mut() -= damage;

    debug!(
        "{} rolls {} ({:+}) against {}, {} hp left",
        attacker.display_name(),
        damage,
        jitter,
        defender.display_name(),
        defender.hp()
    );

    MeleeOutcome {
        damage,
        killed: !defender.is_alive(),
    }
}

/// The player character. Survives level transitions, reset on restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub position: Position,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    /// Gold doubles as the score
    pub gold: u32,
    pub potions: u32,
}

impl Player {
    /// Creates a fresh player with starting stats.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Player, Position};
    ///
    /// let player = Player::new(Position::new(3, 4));
    /// assert_eq!(player.hp, player.max_hp);
    /// assert_eq!(player.gold, 0);
    /// ```
    pub fn new(position: Position) -> Self {
        Self {
            position,
            hp: config::PLAYER_MAX_HP,
            max_hp: config::PLAYER_MAX_HP,
            attack: config::PLAYER_ATTACK,
            gold: 0,
            potions: 0,
        }
    }

    /// Restores up to `amount` hp without exceeding max hp. Returns hp gained.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp + amount).min(self.max_hp);
        self.hp - before
    }

    /// Whether the player is below 30% health.
    pub fn is_badly_hurt(&self) -> bool {
        self.hp * 10 < self.max_hp * 3
    }
}

impl Combatant for Player {
    fn display_name(&self) -> String {
        "You".to_string()
    }

    fn attack(&self) -> i32 {
        self.attack
    }

    fn hp(&self) -> i32 {
        self.hp
    }

    fn hp_mut(&mut self) -> &mut i32 {
        &mut self.hp
    }
}

/// The fixed set of monster tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    /// Weak and common
    Goblin,
    /// Mid tier
    Orc,
    /// Strong
    Troll,
}

/// Base stats for an enemy kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyTemplate {
    pub glyph: char,
    pub hp: i32,
    pub attack: i32,
    /// Gold awarded on kill
    pub xp: u32,
    pub description: &'static str,
}

impl EnemyKind {
    pub fn template(self) -> EnemyTemplate {
        match self {
            EnemyKind::Goblin => EnemyTemplate {
                glyph: 'g',
                hp: 15,
                attack: 3,
                xp: 10,
                description: "A small, cunning goblin. Weak but numerous.",
            },
            EnemyKind::Orc => EnemyTemplate {
                glyph: 'o',
                hp: 25,
                attack: 5,
                xp: 20,
                description: "A brutal orc warrior. Strong and aggressive.",
            },
            EnemyKind::Troll => EnemyTemplate {
                glyph: 'T',
                hp: 40,
                attack: 8,
                xp: 35,
                description: "A massive troll. Very dangerous and tough to kill.",
            },
        }
    }

    /// Lowercase name, as used in messages and saves.
    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Goblin => "goblin",
            EnemyKind::Orc => "orc",
            EnemyKind::Troll => "troll",
        }
    }
}

/// A living monster on the current level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    pub position: Position,
    pub kind: EnemyKind,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub xp: u32,
}

impl Enemy {
    /// Creates an enemy at full health from its kind's template.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Enemy, EnemyKind, Position};
    ///
    /// let goblin = Enemy::new(EnemyKind::Goblin, Position::new(1, 1));
    /// assert_eq!(goblin.hp, 15);
    /// assert_eq!(goblin.xp, 10);
    /// ```
    pub fn new(kind: EnemyKind, position: Position) -> Self {
        let template = kind.template();
        Self {
            position,
            kind,
            hp: template.hp,
            max_hp: template.hp,
            attack: template.attack,
            xp: template.xp,
        }
    }
}

impl Combatant for Enemy {
    fn display_name(&self) -> String {
        format!("The {}", self.kind.name())
    }

    fn attack(&self) -> i32 {
        self.attack
    }

    fn hp(&self) -> i32 {
        self.hp
    }

    fn hp_mut(&mut self) -> &mut i32 {
        &mut self.hp
    }
}

/// Things lying on the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Potion,
    Gold,
    /// Level exit; never picked up
    Stairs,
}

impl ItemKind {
    pub fn glyph(self) -> char {
        match self {
            ItemKind::Potion => '!',
            ItemKind::Gold => '$',
            ItemKind::Stairs => '>',
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ItemKind::Potion => "A health potion. Restores 20 HP when used.",
            ItemKind::Gold => "A pile of gold coins. Valuable treasure!",
            ItemKind::Stairs => "Stairs leading deeper into the dungeon.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub position: Position,
    pub kind: ItemKind,
}

impl Item {
    pub fn new(kind: ItemKind, position: Position) -> Self {
        Self { position, kind }
    }
}
