//! Property tests over seeds and random action sequences.

use delve::{
    compute_visible, decode, encode, Action, Digger, Direction, GameState, GenerationConfig,
    Generator, Position, TileMap,
};
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use std::collections::HashSet;

fn any_direction() -> impl Strategy<Value = Direction> {
    prop::sample::select(Direction::all())
}

fn any_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        8 => any_direction().prop_map(Action::Move),
        1 => Just(Action::UsePotion),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_generated_levels_are_connected(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let config = GenerationConfig::default();
        let dungeon = Digger::new().generate_level(&config, &mut rng).unwrap();

        prop_assert!(!dungeon.map.is_empty());
        prop_assert!(dungeon.map.is_connected());
        prop_assert!(Digger::new().validate(&dungeon, &config).is_ok());
    }

    #[test]
    fn prop_new_level_spawns_never_overlap(seed in any::<u64>()) {
        let game_state = GameState::new(Some(seed)).unwrap();

        let mut occupied = HashSet::new();
        prop_assert!(occupied.insert(game_state.player.position));
        for enemy in &game_state.enemies {
            prop_assert!(game_state.map.is_floor(enemy.position));
            prop_assert!(occupied.insert(enemy.position));
        }
        for item in &game_state.items {
            prop_assert!(game_state.map.is_floor(item.position));
            prop_assert!(occupied.insert(item.position));
        }
        for pos in &occupied {
            prop_assert!(!game_state.free_spaces.contains(*pos));
        }
    }

    #[test]
    fn prop_state_invariants_hold_while_playing(
        seed in any::<u64>(),
        actions in prop::collection::vec(any_action(), 1..60),
    ) {
        let mut game_state = GameState::new(Some(seed)).unwrap();

        for action in actions {
            let level_before = game_state.level;
            game_state.apply(action).unwrap();

            prop_assert!(game_state.player.hp <= game_state.player.max_hp);
            prop_assert!(game_state.messages.len() <= 5);
            prop_assert!(game_state.level >= level_before);
            prop_assert!(!(game_state.is_game_over() && game_state.is_victory()));
            prop_assert!(game_state.visibility.explored.is_superset(&game_state.visibility.visible));

            if game_state.is_game_over() {
                prop_assert!(game_state.player.hp <= 0);
            } else {
                prop_assert!(game_state.player.hp > 0);
                prop_assert!(game_state.visibility.is_visible(game_state.player.position));
            }

            let positions: HashSet<Position> =
                game_state.enemies.iter().map(|enemy| enemy.position).collect();
            prop_assert_eq!(positions.len(), game_state.enemies.len());
            prop_assert!(!positions.contains(&game_state.player.position));
            prop_assert!(game_state.enemies.iter().all(|enemy| enemy.hp > 0));
        }
    }

    #[test]
    fn prop_codec_round_trip(
        seed in any::<u64>(),
        actions in prop::collection::vec(any_action(), 0..20),
    ) {
        let mut game_state = GameState::new(Some(seed)).unwrap();
        for action in actions {
            game_state.apply(action).unwrap();
        }

        let blob = encode(&game_state).unwrap();
        let restored = decode(&blob).unwrap();

        prop_assert_eq!(&restored.player, &game_state.player);
        prop_assert_eq!(&restored.enemies, &game_state.enemies);
        prop_assert_eq!(&restored.items, &game_state.items);
        prop_assert_eq!(restored.status, game_state.status);
        prop_assert_eq!(encode(&restored).unwrap(), blob);
    }

    #[test]
    fn prop_visibility_is_symmetric_between_floors(
        walls in prop::collection::hash_set((1..15i32, 1..10i32), 0..40),
        a in (1..15i32, 1..10i32),
        b in (1..15i32, 1..10i32),
    ) {
        let floors = (1..15)
            .flat_map(|x| (1..10).map(move |y| (x, y)))
            .filter(|tile| !walls.contains(tile))
            .map(|(x, y)| Position::new(x, y));
        let map = TileMap::from_floors(16, 11, floors).unwrap();
        let (a, b) = (Position::new(a.0, a.1), Position::new(b.0, b.1));
        prop_assume!(map.is_floor(a) && map.is_floor(b));

        let from_a = compute_visible(a, 20, |pos| map.is_transparent(pos));
        let from_b = compute_visible(b, 20, |pos| map.is_transparent(pos));

        prop_assert!(from_a.contains(&a));
        prop_assert_eq!(from_a.contains(&b), from_b.contains(&a));
    }
}
