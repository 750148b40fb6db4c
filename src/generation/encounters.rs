//! # Encounter Generation
//!
//! Monster placement. Deeper levels get more monsters and a mix weighted
//! toward the tougher tiers.

use crate::{
    DelveError, DelveResult, Enemy, EnemyKind, FreeSpacePool, GenerationConfig, Generator,
};
use log::debug;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tier thresholds for a band of levels, applied to a d100 roll.
///
/// A roll below `goblin_below` is a goblin, below `orc_below` an orc, and
/// anything else a troll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierBand {
    /// Deepest level this band covers; None covers everything deeper
    pub up_to_level: Option<u32>,
    pub goblin_below: u32,
    pub orc_below: u32,
}

/// How many monsters a level gets and of which kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterTable {
    pub base_count: u32,
    pub per_level: u32,
    /// Bands in ascending level order
    pub bands: Vec<TierBand>,
}

impl EncounterTable {
    /// Number of monsters for a level: `base + level * step`.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::EncounterTable;
    ///
    /// let table = EncounterTable::default();
    /// assert_eq!(table.enemy_count(1), 5);
    /// assert_eq!(table.enemy_count(5), 13);
    /// ```
    pub fn enemy_count(&self, level: u32) -> usize {
        (self.base_count + level * self.per_level) as usize
    }

    /// Maps a d100 roll (1..=100) to a kind for the given level.
    pub fn kind_for_roll(&self, level: u32, roll: u32) -> EnemyKind {
        let band = self
            .bands
            .iter()
            .find(|band| band.up_to_level.map_or(true, |max| level <= max));

        match band {
            Some(band) if roll < band.goblin_below => EnemyKind::Goblin,
            Some(band) if roll < band.orc_below => EnemyKind::Orc,
            Some(_) => EnemyKind::Troll,
            None => EnemyKind::Goblin,
        }
    }

    pub fn roll_kind<R: Rng + ?Sized>(&self, level: u32, rng: &mut R) -> EnemyKind {
        self.kind_for_roll(level, rng.gen_range(1..=100))
    }

    /// The roster generator for one level.
    pub fn for_level(&self, level: u32) -> LevelEncounters<'_> {
        LevelEncounters { table: self, level }
    }

    /// Rolls this level's roster, then places it one pool draw per monster.
    ///
    /// Stops early without error if the pool runs dry.
    pub fn spawn(
        &self,
        level: u32,
        config: &GenerationConfig,
        pool: &mut FreeSpacePool,
        rng: &mut StdRng,
    ) -> DelveResult<Vec<Enemy>> {
        let encounters = self.for_level(level);
        let roster = encounters.generate(config, rng)?;
        encounters.validate(&roster, config)?;

        let mut enemies = Vec::with_capacity(roster.len());
        for kind in roster {
            let Some(position) = pool.draw(rng) else {
                debug!("Free space exhausted after {} enemies", enemies.len());
                break;
            };
            enemies.push(Enemy::new(kind, position));
        }

        Ok(enemies)
    }
}

/// Monster kinds for a single level, before placement.
#[derive(Debug, Clone, Copy)]
pub struct LevelEncounters<'a> {
    pub table: &'a EncounterTable,
    pub level: u32,
}

impl Generator<Vec<EnemyKind>> for LevelEncounters<'_> {
    fn generate(&self, _config: &GenerationConfig, rng: &mut StdRng) -> DelveResult<Vec<EnemyKind>> {
        let wanted = self.table.enemy_count(self.level);
        let mut roster = Vec::with_capacity(wanted);
        for _ in 0..wanted {
            roster.push(self.table.roll_kind(self.level, rng));
        }
        Ok(roster)
    }

    fn validate(&self, roster: &Vec<EnemyKind>, _config: &GenerationConfig) -> DelveResult<()> {
        let wanted = self.table.enemy_count(self.level);
        if roster.len() != wanted {
            return Err(DelveError::GenerationFailed(format!(
                "Level {} roster has {} monsters, expected {}",
                self.level,
                roster.len(),
                wanted
            )));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "LevelEncounters"
    }
}

impl Default for EncounterTable {
    fn default() -> Self {
        Self {
            base_count: 3,
            per_level: 2,
            bands: vec![
                TierBand {
                    up_to_level: Some(2),
                    goblin_below: 80,
                    orc_below: 101,
                },
                TierBand {
                    up_to_level: Some(4),
                    goblin_below: 40,
                    orc_below: 85,
                },
                TierBand {
                    up_to_level: None,
                    goblin_below: 20,
                    orc_below: 60,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    #[test]
    fn test_shallow_levels_have_no_trolls() {
        let table = EncounterTable::default();
        assert_eq!(table.kind_for_roll(1, 1), EnemyKind::Goblin);
        assert_eq!(table.kind_for_roll(2, 79), EnemyKind::Goblin);
        assert_eq!(table.kind_for_roll(2, 80), EnemyKind::Orc);
        assert_eq!(table.kind_for_roll(1, 100), EnemyKind::Orc);
    }

    #[test]
    fn test_middle_band_thresholds() {
        let table = EncounterTable::default();
        assert_eq!(table.kind_for_roll(3, 39), EnemyKind::Goblin);
        assert_eq!(table.kind_for_roll(3, 40), EnemyKind::Orc);
        assert_eq!(table.kind_for_roll(4, 84), EnemyKind::Orc);
        assert_eq!(table.kind_for_roll(4, 85), EnemyKind::Troll);
    }

    #[test]
    fn test_deep_band_thresholds() {
        let table = EncounterTable::default();
        assert_eq!(table.kind_for_roll(5, 19), EnemyKind::Goblin);
        assert_eq!(table.kind_for_roll(5, 20), EnemyKind::Orc);
        assert_eq!(table.kind_for_roll(5, 59), EnemyKind::Orc);
        assert_eq!(table.kind_for_roll(5, 60), EnemyKind::Troll);
        assert_eq!(table.kind_for_roll(9, 100), EnemyKind::Troll);
    }

    #[test]
    fn test_spawn_uses_distinct_tiles() {
        let table = EncounterTable::default();
        let tiles: Vec<Position> = (1..40).map(|x| Position::new(x, 1)).collect();
        let mut pool = FreeSpacePool::new(tiles);
        let mut rng = StdRng::seed_from_u64(21);

        let enemies = table
            .spawn(3, &GenerationConfig::default(), &mut pool, &mut rng)
            .unwrap();
        assert_eq!(enemies.len(), 9);

        let positions: HashSet<_> = enemies.iter().map(|enemy| enemy.position).collect();
        assert_eq!(positions.len(), enemies.len());
        assert!(positions.iter().all(|pos| !pool.contains(*pos)));
    }

    #[test]
    fn test_spawn_stops_when_pool_is_exhausted() {
        let table = EncounterTable::default();
        let mut pool = FreeSpacePool::new(vec![Position::new(1, 1), Position::new(2, 1)]);
        let mut rng = StdRng::seed_from_u64(4);

        let enemies = table
            .spawn(5, &GenerationConfig::default(), &mut pool, &mut rng)
            .unwrap();
        assert_eq!(enemies.len(), 2);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_roster_generator() {
        let table = EncounterTable::default();
        let config = GenerationConfig::default();
        let mut rng = StdRng::seed_from_u64(8);

        let encounters = table.for_level(2);
        let roster = encounters.generate(&config, &mut rng).unwrap();
        assert_eq!(roster.len(), 7);
        assert!(!roster.contains(&EnemyKind::Troll));
        assert!(encounters.validate(&roster, &config).is_ok());
        assert!(encounters.validate(&roster[1..].to_vec(), &config).is_err());
        assert_eq!(encounters.generator_type(), "LevelEncounters");
    }
}
