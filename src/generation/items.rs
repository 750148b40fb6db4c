//! # Item Generation
//!
//! Potions, gold piles, and the single staircase of each level.

use crate::{
    DelveError, DelveResult, FreeSpacePool, GenerationConfig, Generator, Item, ItemKind,
};
use log::debug;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Item counts per level: `base + 0..=extra` of each kind, plus one stairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTable {
    pub potion_base: u32,
    pub potion_extra: u32,
    pub gold_base: u32,
    pub gold_extra: u32,
}

impl ItemTable {
    /// Places potions, then gold, then the stairs, one pool draw each.
    ///
    /// Placement stops quietly once the pool is empty, so on a cramped level
    /// the stairs may be missing rather than sharing a tile.
    pub fn spawn(
        &self,
        config: &GenerationConfig,
        pool: &mut FreeSpacePool,
        rng: &mut StdRng,
    ) -> DelveResult<Vec<Item>> {
        let plan = self.generate(config, rng)?;
        self.validate(&plan, config)?;

        let mut items = Vec::with_capacity(plan.len());
        for kind in plan {
            let Some(position) = pool.draw(rng) else {
                debug!("Free space exhausted after {} items", items.len());
                break;
            };
            items.push(Item::new(kind, position));
        }

        Ok(items)
    }
}

impl Generator<Vec<ItemKind>> for ItemTable {
    fn generate(&self, _config: &GenerationConfig, rng: &mut StdRng) -> DelveResult<Vec<ItemKind>> {
        let potions = self.potion_base + rng.gen_range(0..=self.potion_extra);
        let gold = self.gold_base + rng.gen_range(0..=self.gold_extra);

        Ok(std::iter::repeat(ItemKind::Potion)
            .take(potions as usize)
            .chain(std::iter::repeat(ItemKind::Gold).take(gold as usize))
            .chain(std::iter::once(ItemKind::Stairs))
            .collect())
    }

    fn validate(&self, plan: &Vec<ItemKind>, _config: &GenerationConfig) -> DelveResult<()> {
        let count = |kind| plan.iter().filter(|&&planned| planned == kind).count() as u32;

        let stairs = count(ItemKind::Stairs);
        if stairs != 1 {
            return Err(DelveError::GenerationFailed(format!(
                "Item plan has {} stairs",
                stairs
            )));
        }

        let potions = count(ItemKind::Potion);
        let gold = count(ItemKind::Gold);
        if !(self.potion_base..=self.potion_base + self.potion_extra).contains(&potions)
            || !(self.gold_base..=self.gold_base + self.gold_extra).contains(&gold)
        {
            return Err(DelveError::GenerationFailed(format!(
                "Item plan has {} potions and {} gold piles",
                potions, gold
            )));
        }

        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "ItemTable"
    }
}

impl Default for ItemTable {
    fn default() -> Self {
        Self {
            potion_base: 2,
            potion_extra: 2,
            gold_base: 3,
            gold_extra: 3,
        }
    }
}
