//! # Game State Module
//!
//! Central game state and the turn engine.
//!
//! [`GameState`] owns everything about a run: the current level's map and
//! spawns, the player, what has been seen, the message log, and the random
//! number generator. Every player operation takes `&mut self`, runs to
//! completion (including the enemy turn and any level change), and reports a
//! [`TurnOutcome`].

use crate::config;
use crate::{
    resolve_melee, Digger, DelveError, DelveResult, Direction, Dungeon, EncounterTable, Enemy,
    FreeSpacePool, GenerationConfig, Item, ItemKind, ItemTable, MessageLog, Player, Position,
    TileMap, Visibility,
};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Where the run stands. Only `Playing` accepts turns; only the other two accept restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    /// The player died
    GameOver,
    /// The player took the stairs on the last level
    Victory,
}

/// Why an action did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// Delta was not a single 8-way step
    InvalidDirection,
    /// Target tile is wall
    Blocked,
    NoPotions,
    FullHealth,
    /// The run has ended; only restart is accepted
    SessionOver,
    /// Restart asked for while the run is still going
    RunInProgress,
}

/// Result of one player action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnOutcome {
    /// Nothing happened and no turn passed
    Rejected(RejectReason),
    /// A normal turn: the player acted, then every enemy did
    Acted,
    /// The player took the stairs to a freshly generated level
    Descended,
    /// The player took the stairs on the last level
    Won,
    /// The player was killed during the enemy turn
    Died,
    /// A finished run was replaced by a new one
    Restarted,
}

impl TurnOutcome {
    /// Whether game time advanced.
    pub fn consumed_turn(&self) -> bool {
        !matches!(self, TurnOutcome::Rejected(_))
    }
}

/// A generated level waiting to replace the current one.
#[derive(Debug)]
struct LevelSetup {
    level: u32,
    map: TileMap,
    free_spaces: FreeSpacePool,
    room_count: usize,
    start: Position,
    enemies: Vec<Enemy>,
    items: Vec<Item>,
}

/// The complete simulation state for one run.
#[derive(Debug, Clone)]
pub struct GameState {
    /// Current dungeon depth, 1-based
    pub level: u32,
    pub status: GameStatus,
    pub messages: MessageLog,
    pub map: TileMap,
    /// Floor tiles left unclaimed after spawning
    pub free_spaces: FreeSpacePool,
    pub visibility: Visibility,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub items: Vec<Item>,
    pub generation: GenerationConfig,
    pub encounters: EncounterTable,
    pub item_table: ItemTable,
    pub rng: StdRng,
}

impl GameState {
    /// Starts a new run on level 1.
    ///
    /// With a seed the run is reproducible; without one it draws from entropy.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{GameState, GameStatus};
    ///
    /// let game_state = GameState::new(Some(12345)).unwrap();
    /// assert_eq!(game_state.level, 1);
    /// assert_eq!(game_state.status, GameStatus::Playing);
    /// assert!(game_state.visibility.is_visible(game_state.player.position));
    /// ```
    pub fn new(seed: Option<u64>) -> DelveResult<Self> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut state = Self::unstarted(rng);
        state.init_level()?;
        Ok(state)
    }

    /// A level-1 state with an all-wall map and nothing spawned.
    ///
    /// Used as the base for loading saves and for building fixed scenarios.
    pub fn unstarted(rng: StdRng) -> Self {
        let generation = GenerationConfig::default();
        Self {
            level: 1,
            status: GameStatus::Playing,
            messages: MessageLog::new(),
            map: TileMap::new(generation.width, generation.height),
            free_spaces: FreeSpacePool::default(),
            visibility: Visibility::new(),
            player: Player::new(Position::origin()),
            enemies: Vec::new(),
            items: Vec::new(),
            generation,
            encounters: EncounterTable::default(),
            item_table: ItemTable::default(),
            rng,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != GameStatus::Playing
    }

    pub fn is_game_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }

    pub fn is_victory(&self) -> bool {
        self.status == GameStatus::Victory
    }

    /// Index of the enemy standing on `pos`, if any.
    pub fn enemy_index_at(&self, pos: Position) -> Option<usize> {
        self.enemies.iter().position(|enemy| enemy.position == pos)
    }

    /// Index of the item lying on `pos`, if any.
    pub fn item_index_at(&self, pos: Position) -> Option<usize> {
        self.items.iter().position(|item| item.position == pos)
    }

    /// Appends a user-visible message.
    pub fn add_message(&mut self, text: impl Into<String>) {
        self.messages.push(text);
    }

    /// Recomputes the field of view from the player's tile.
    pub fn recompute_visibility(&mut self) {
        self.visibility
            .recompute(self.player.position, config::FOV_RADIUS, &self.map);
    }

    /// Builds the current level: new map, new spawns, fresh visibility.
    ///
    /// The player keeps their stats and only moves to the new start tile.
    pub fn init_level(&mut self) -> DelveResult<()> {
        let setup = self.build_level(self.level)?;
        self.enter_level(setup);
        Ok(())
    }

    /// Throws away the run and starts again on level 1 with a fresh player.
    ///
    /// Nothing changes if the new level cannot be generated.
    pub fn restart(&mut self) -> DelveResult<()> {
        info!("Restarting run");
        let setup = self.build_level(1)?;
        self.status = GameStatus::Playing;
        self.messages.clear();
        self.player = Player::new(Position::origin());
        self.enter_level(setup);
        Ok(())
    }

    /// Digs and populates a level without touching the current one.
    fn build_level(&mut self, level: u32) -> DelveResult<LevelSetup> {
        let Dungeon {
            map,
            mut free_spaces,
            rooms,
        } = Digger::new().generate_level(&self.generation, &mut self.rng)?;

        let start = free_spaces.draw(&mut self.rng).ok_or_else(|| {
            DelveError::GenerationFailed("No free space left for the player".to_string())
        })?;
        let enemies =
            self.encounters
                .spawn(level, &self.generation, &mut free_spaces, &mut self.rng)?;
        let items = self
            .item_table
            .spawn(&self.generation, &mut free_spaces, &mut self.rng)?;

        Ok(LevelSetup {
            level,
            map,
            free_spaces,
            room_count: rooms.len(),
            start,
            enemies,
            items,
        })
    }

    fn enter_level(&mut self, setup: LevelSetup) {
        self.level = setup.level;
        self.map = setup.map;
        self.free_spaces = setup.free_spaces;
        self.player.position = setup.start;
        self.enemies = setup.enemies;
        self.items = setup.items;
        self.visibility.reset();
        self.recompute_visibility();

        info!(
            "Level {} ready: {} rooms, {} enemies, {} items",
            self.level,
            setup.room_count,
            self.enemies.len(),
            self.items.len()
        );

        self.add_message(format!("=== LEVEL {} ===", self.level));
        if self.level == 1 {
            self.add_message("Escape the dungeon! Find the stairs (>)");
        }
    }

    /// Moves or attacks by a raw delta; both components must be in -1..=1.
    pub fn move_player(&mut self, dx: i32, dy: i32) -> DelveResult<TurnOutcome> {
        if self.is_terminal() {
            return Ok(TurnOutcome::Rejected(RejectReason::SessionOver));
        }
        match Direction::from_delta(Position::new(dx, dy)) {
            Some(direction) => self.step_player(direction),
            None => Ok(TurnOutcome::Rejected(RejectReason::InvalidDirection)),
        }
    }

    /// Moves the player one tile, attacking if an enemy is in the way.
    ///
    /// Walking onto an item picks it up; walking onto the stairs descends and
    /// ends the turn without an enemy phase.
    pub fn step_player(&mut self, direction: Direction) -> DelveResult<TurnOutcome> {
        if self.is_terminal() {
            return Ok(TurnOutcome::Rejected(RejectReason::SessionOver));
        }

        let target = self.player.position + direction.to_delta();
        if !self.map.is_floor(target) {
            debug!("Move to {} blocked by wall", target);
            return Ok(TurnOutcome::Rejected(RejectReason::Blocked));
        }

        if let Some(index) = self.enemy_index_at(target) {
            self.player_attacks(index);
            return Ok(self.enemy_turn());
        }

        self.player.position = target;
        self.recompute_visibility();

        if let Some(index) = self.item_index_at(target) {
            match self.items[index].kind {
                ItemKind::Potion => {
                    self.items.swap_remove(index);
                    self.player.potions += 1;
                    self.add_message("Found a health potion! Press 'h' to use.");
                }
                ItemKind::Gold => {
                    self.items.swap_remove(index);
                    let amount = self
                        .rng
                        .gen_range(config::GOLD_PILE_MIN..=config::GOLD_PILE_MAX);
                    self.player.gold += amount;
                    self.add_message(format!("Found {} gold!", amount));
                }
                ItemKind::Stairs => return self.descend_stairs(),
            }
        }

        Ok(self.enemy_turn())
    }

    /// Drinks a potion, healing up to max hp, then lets the enemies act.
    pub fn use_potion(&mut self) -> DelveResult<TurnOutcome> {
        if self.is_terminal() {
            return Ok(TurnOutcome::Rejected(RejectReason::SessionOver));
        }
        if self.player.potions == 0 {
            self.add_message("No potions to use!");
            return Ok(TurnOutcome::Rejected(RejectReason::NoPotions));
        }
        if self.player.hp >= self.player.max_hp {
            self.add_message("Already at full health!");
            return Ok(TurnOutcome::Rejected(RejectReason::FullHealth));
        }

        self.player.potions -= 1;
        let healed = self.player.heal(config::POTION_HEAL);
        self.add_message(format!("Used potion! Healed {} HP.", healed));

        Ok(self.enemy_turn())
    }

    /// Leaves the current level: next level, or victory from the last one.
    ///
    /// No enemy turn follows either way.
    pub fn descend_stairs(&mut self) -> DelveResult<TurnOutcome> {
        if self.is_terminal() {
            return Ok(TurnOutcome::Rejected(RejectReason::SessionOver));
        }

        if self.level >= config::MAX_LEVELS {
            self.status = GameStatus::Victory;
            self.add_message("=== VICTORY! ===");
            self.add_message("You escaped the dungeon!");
            info!("Victory with {} gold", self.player.gold);
            return Ok(TurnOutcome::Won);
        }

        let setup = self.build_level(self.level + 1)?;
        self.enter_level(setup);
        Ok(TurnOutcome::Descended)
    }

    /// Runs every enemy once, in collection order.
    ///
    /// Adjacent enemies attack; the rest take one greedy step toward the
    /// player if the tile is floor and not held by another enemy. Processing
    /// stops as soon as the player dies.
    pub fn enemy_turn(&mut self) -> TurnOutcome {
        for index in 0..self.enemies.len() {
            let enemy_position = self.enemies[index].position;

            if enemy_position.is_adjacent(self.player.position) {
                let outcome = resolve_melee(&self.enemies[index], &mut self.player, &mut self.rng);
                let name = self.enemies[index].kind.name();
                self.add_message(format!("The {} hits you for {} damage!", name, outcome.damage));

                if outcome.killed {
                    self.player_died(name);
                    return TurnOutcome::Died;
                }
                continue;
            }

            let step = enemy_position.step_toward(self.player.position);
            if self.map.is_floor(step) && self.enemy_index_at(step).is_none() {
                self.enemies[index].position = step;
            }
        }

        TurnOutcome::Acted
    }

    fn player_attacks(&mut self, index: usize) {
        let outcome = resolve_melee(&self.player, &mut self.enemies[index], &mut self.rng);
        let name = self.enemies[index].kind.name();
        self.add_message(format!("You hit the {} for {} damage!", name, outcome.damage));

        if outcome.killed {
            let enemy = self.enemies.swap_remove(index);
            self.player.gold += enemy.xp;
            self.add_message(format!("You killed the {}!", name));
            debug!("{} slain, +{} gold", name, enemy.xp);
        }
    }

    fn player_died(&mut self, killer: &str) {
        self.status = GameStatus::GameOver;
        self.add_message("=== GAME OVER ===");
        self.add_message("You died! Press R to restart.");
        info!(
            "Player killed by a {} on level {} with {} gold",
            killer, self.level, self.player.gold
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EnemyKind;
    use std::collections::HashSet;

    /// Open room spanning x in 1..=10, y in 1..=5, nothing spawned.
    fn arena() -> GameState {
        let mut state = GameState::unstarted(StdRng::seed_from_u64(42));
        state.map = TileMap::from_floors(
            12,
            7,
            (1..=10).flat_map(|x| (1..=5).map(move |y| Position::new(x, y))),
        )
        .unwrap();
        state.player.position = Position::new(2, 3);
        state.recompute_visibility();
        state
    }

    #[test]
    fn test_new_game_state() {
        let game_state = GameState::new(Some(12345)).unwrap();
        assert_eq!(game_state.level, 1);
        assert!(!game_state.is_terminal());
        assert_eq!(game_state.enemies.len(), 5);
        assert_eq!(
            game_state.messages.to_vec(),
            vec!["Escape the dungeon! Find the stairs (>)", "=== LEVEL 1 ==="]
        );
    }

    #[test]
    fn test_spawns_never_share_a_tile() {
        let game_state = GameState::new(Some(777)).unwrap();

        let mut occupied = HashSet::new();
        assert!(occupied.insert(game_state.player.position));
        for enemy in &game_state.enemies {
            assert!(occupied.insert(enemy.position));
        }
        for item in &game_state.items {
            assert!(occupied.insert(item.position));
        }
        assert!(occupied.iter().all(|pos| game_state.map.is_floor(*pos)));
    }

    #[test]
    fn test_move_into_wall_is_rejected() {
        let mut state = arena();
        state.player.position = Position::new(1, 1);
        let before = state.clone();

        let outcome = state.move_player(-1, 0).unwrap();
        assert_eq!(outcome, TurnOutcome::Rejected(RejectReason::Blocked));
        assert_eq!(state.player, before.player);
        assert_eq!(state.messages, before.messages);
    }

    #[test]
    fn test_invalid_delta_is_rejected() {
        let mut state = arena();
        assert_eq!(
            state.move_player(0, 0).unwrap(),
            TurnOutcome::Rejected(RejectReason::InvalidDirection)
        );
        assert_eq!(
            state.move_player(2, 0).unwrap(),
            TurnOutcome::Rejected(RejectReason::InvalidDirection)
        );
    }

    #[test]
    fn test_move_recomputes_visibility() {
        let mut state = arena();
        state.visibility.reset();

        let outcome = state.move_player(1, 0).unwrap();
        assert_eq!(outcome, TurnOutcome::Acted);
        assert_eq!(state.player.position, Position::new(3, 3));
        assert!(state.visibility.is_visible(Position::new(3, 3)));
        assert!(state.visibility.explored.is_superset(&state.visibility.visible));
    }

    #[test]
    fn test_potion_pickup() {
        let mut state = arena();
        state.items.push(Item::new(ItemKind::Potion, Position::new(3, 3)));

        state.move_player(1, 0).unwrap();
        assert_eq!(state.player.potions, 1);
        assert!(state.items.is_empty());
        assert_eq!(
            state.messages.latest(),
            Some("Found a health potion! Press 'h' to use.")
        );
    }

    #[test]
    fn test_gold_pickup_amount_in_range() {
        let mut state = arena();
        state.items.push(Item::new(ItemKind::Gold, Position::new(3, 3)));

        state.move_player(1, 0).unwrap();
        assert!((10..=30).contains(&state.player.gold));
        assert!(state.items.is_empty());
    }

    #[test]
    fn test_potion_rejections_log_messages() {
        let mut state = arena();

        assert_eq!(
            state.use_potion().unwrap(),
            TurnOutcome::Rejected(RejectReason::NoPotions)
        );
        assert_eq!(state.messages.latest(), Some("No potions to use!"));

        state.player.potions = 2;
        assert_eq!(
            state.use_potion().unwrap(),
            TurnOutcome::Rejected(RejectReason::FullHealth)
        );
        assert_eq!(state.messages.latest(), Some("Already at full health!"));
        assert_eq!(state.player.potions, 2);
    }

    #[test]
    fn test_potion_heals_and_clamps() {
        let mut state = arena();
        state.player.potions = 1;
        state.player.hp = 45;

        assert_eq!(state.use_potion().unwrap(), TurnOutcome::Acted);
        assert_eq!(state.player.hp, state.player.max_hp);
        assert_eq!(state.player.potions, 0);
        assert_eq!(state.messages.latest(), Some("Used potion! Healed 5 HP."));
    }

    #[test]
    fn test_potion_gives_enemies_a_turn() {
        let mut state = arena();
        state.player.potions = 1;
        state.player.hp = 10;
        state
            .enemies
            .push(Enemy::new(EnemyKind::Goblin, Position::new(8, 3)));

        state.use_potion().unwrap();
        assert_eq!(state.enemies[0].position, Position::new(7, 3));
    }

    #[test]
    fn test_enemy_greedy_step() {
        let mut state = arena();
        state
            .enemies
            .push(Enemy::new(EnemyKind::Orc, Position::new(6, 1)));

        state.enemy_turn();
        assert_eq!(state.enemies[0].position, Position::new(5, 2));
    }

    #[test]
    fn test_enemies_do_not_stack() {
        let mut state = arena();
        state.player.position = Position::new(1, 3);
        state
            .enemies
            .push(Enemy::new(EnemyKind::Goblin, Position::new(3, 2)));
        state
            .enemies
            .push(Enemy::new(EnemyKind::Goblin, Position::new(3, 4)));

        state.enemy_turn();
        // Both want (2, 3); the first one to act takes it
        assert_eq!(state.enemies[0].position, Position::new(2, 3));
        assert_eq!(state.enemies[1].position, Position::new(3, 4));
    }

    #[test]
    fn test_enemy_blocked_by_wall_stays_put() {
        let mut state = arena();
        state.map =
            TileMap::from_floors(12, 7, vec![Position::new(5, 1), Position::new(5, 4)]).unwrap();
        state.player.position = Position::new(5, 1);
        state
            .enemies
            .push(Enemy::new(EnemyKind::Goblin, Position::new(5, 4)));

        assert_eq!(state.enemy_turn(), TurnOutcome::Acted);
        assert_eq!(state.enemies[0].position, Position::new(5, 4));
    }

    #[test]
    fn test_adjacent_enemy_attacks() {
        let mut state = arena();
        state
            .enemies
            .push(Enemy::new(EnemyKind::Troll, Position::new(3, 4)));

        assert_eq!(state.enemy_turn(), TurnOutcome::Acted);
        assert!((6..=10).contains(&(state.player.max_hp - state.player.hp)));
        assert_eq!(state.enemies[0].position, Position::new(3, 4));
        assert!(state.messages.latest().unwrap().starts_with("The troll hits you"));
    }

    #[test]
    fn test_death_halts_enemy_turn() {
        let mut state = arena();
        state.player.hp = 1;
        state
            .enemies
            .push(Enemy::new(EnemyKind::Goblin, Position::new(3, 3)));
        state
            .enemies
            .push(Enemy::new(EnemyKind::Goblin, Position::new(9, 3)));

        assert_eq!(state.enemy_turn(), TurnOutcome::Died);
        assert!(state.is_game_over());
        // The far goblin never got to move
        assert_eq!(state.enemies[1].position, Position::new(9, 3));
        assert_eq!(state.messages.latest(), Some("You died! Press R to restart."));
    }

    #[test]
    fn test_terminal_state_rejects_actions() {
        let mut state = arena();
        state.status = GameStatus::GameOver;
        state.player.potions = 1;
        state.player.hp = 10;

        let over = TurnOutcome::Rejected(RejectReason::SessionOver);
        assert_eq!(state.move_player(1, 0).unwrap(), over);
        assert_eq!(state.use_potion().unwrap(), over);
        assert_eq!(state.descend_stairs().unwrap(), over);
        assert_eq!(state.player.position, Position::new(2, 3));
        assert_eq!(state.player.potions, 1);
    }

    #[test]
    fn test_stairs_descend_skips_enemy_turn() {
        let mut state = GameState::new(Some(5)).unwrap();
        let gold = state.player.gold;
        state.player.hp = 33;

        assert_eq!(state.descend_stairs().unwrap(), TurnOutcome::Descended);
        assert_eq!(state.level, 2);
        assert_eq!(state.enemies.len(), 7);
        assert_eq!(state.player.hp, 33);
        assert_eq!(state.player.gold, gold);
        assert_eq!(state.messages.latest(), Some("=== LEVEL 2 ==="));
        assert!(state.visibility.explored.is_superset(&state.visibility.visible));
    }

    #[test]
    fn test_restart_resets_player() {
        let mut state = GameState::new(Some(9)).unwrap();
        state.level = 4;
        state.player.gold = 500;
        state.player.hp = 3;
        state.status = GameStatus::GameOver;

        state.restart().unwrap();
        assert_eq!(state.level, 1);
        assert_eq!(state.status, GameStatus::Playing);
        assert_eq!(state.player.gold, 0);
        assert_eq!(state.player.hp, config::PLAYER_MAX_HP);
        assert_eq!(state.messages.len(), 2);
    }

    #[test]
    fn test_failed_descent_leaves_level_untouched() {
        let mut state = GameState::new(Some(17)).unwrap();
        state.level = 2;
        let player = state.player.clone();
        let floors = state.map.floor_positions();
        state.generation.max_room_width = state.generation.width;

        assert!(matches!(
            state.descend_stairs(),
            Err(DelveError::GenerationFailed(_))
        ));
        assert_eq!(state.level, 2);
        assert_eq!(state.player, player);
        assert_eq!(state.map.floor_positions(), floors);
        assert_eq!(state.status, GameStatus::Playing);

        state.status = GameStatus::GameOver;
        assert!(state.restart().is_err());
        assert_eq!(state.level, 2);
        assert_eq!(state.status, GameStatus::GameOver);
    }
}
