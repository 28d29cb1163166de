//! Death detection and reference cleanup
//!
//! Turns `health <= 0` into the terminal dead state and scrubs every
//! engagement or assist that pointed at the corpse.

use smallvec::SmallVec;

use crate::game::state::{CombatState, GameState, PlayerId, SeekState, TickEffects};

/// Players that died in one cleanup pass
pub type Deaths = SmallVec<[PlayerId; 8]>;

/// Kill every alive player at or below zero health and clear references to them
pub fn update(state: &mut GameState, effects: &mut TickEffects) -> Deaths {
    let mut deaths = Deaths::new();

    for player in state.players.iter_mut() {
        if player.alive && player.health <= 0 {
            player.alive = false;
            player.state = CombatState::Exploring;
            player.seek = SeekState::NotSeeking;
            effects.clear_player(player.id);
            deaths.push(player.id);
        }
    }

    for &dead in &deaths {
        for player in state.players.iter_mut() {
            if player.state == CombatState::Engaged(dead) {
                player.state = CombatState::Exploring;
                effects.shots.remove(&player.id);
            }
            if player.seek == SeekState::Seeking(dead) {
                player.seek = SeekState::NotSeeking;
                player.state = CombatState::Exploring;
                effects.assists.remove(&player.id);
            }
        }
    }

    deaths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::game::state::{Player, TeamId};
    use crate::game::systems::combat;
    use crate::util::vec2::Vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn create_state() -> GameState {
        GameState::new(
            0,
            vec![
                Player::new(10, TeamId::A, Vec2::new(200.0, 200.0), 0.0, 100),
                Player::new(11, TeamId::B, Vec2::new(230.0, 200.0), 0.0, 100),
                Player::new(12, TeamId::A, Vec2::new(400.0, 200.0), 0.0, 100),
            ],
        )
    }

    #[test]
    fn test_kills_player_at_zero_health() {
        let mut state = create_state();
        let mut effects = TickEffects::default();
        state.players[1].health = 0;
        state.players[1].state = CombatState::Engaged(10);
        effects.shots.insert(11, Vec2::new(200.0, 200.0));

        let deaths = update(&mut state, &mut effects);

        assert_eq!(deaths.as_slice(), &[11]);
        let dead = &state.players[1];
        assert!(!dead.alive);
        assert_eq!(dead.state, CombatState::Exploring);
        assert_eq!(dead.seek, SeekState::NotSeeking);
        assert!(effects.shot(11).is_none());
    }

    #[test]
    fn test_health_is_frozen_not_clamped() {
        let mut state = create_state();
        let mut effects = TickEffects::default();
        state.players[1].health = -4;

        update(&mut state, &mut effects);

        assert_eq!(state.players[1].health, -4);
    }

    #[test]
    fn test_clears_references_to_dead_player() {
        let mut state = create_state();
        let mut effects = TickEffects::default();
        state.players[0].state = CombatState::Engaged(11);
        effects.shots.insert(10, Vec2::new(230.0, 200.0));
        state.players[2].seek = SeekState::Seeking(11);
        effects.assists.insert(12, Vec2::new(230.0, 200.0));
        state.players[1].health = -1;

        update(&mut state, &mut effects);

        assert_eq!(state.players[0].state, CombatState::Exploring);
        assert!(effects.shot(10).is_none());
        assert_eq!(state.players[2].seek, SeekState::NotSeeking);
        assert_eq!(state.players[2].state, CombatState::Exploring);
        assert!(effects.assist(12).is_none());
    }

    #[test]
    fn test_leaves_unrelated_references() {
        let mut state = create_state();
        let mut effects = TickEffects::default();
        state.players[1].state = CombatState::Engaged(10);
        effects.shots.insert(11, Vec2::new(200.0, 200.0));

        let deaths = update(&mut state, &mut effects);

        assert!(deaths.is_empty());
        assert_eq!(state.players[1].state, CombatState::Engaged(10));
        assert!(effects.shot(11).is_some());
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let config = SimConfig {
            hit_probability: 1.0,
            hit_health_cost: 50,
            ..SimConfig::default()
        };
        let mut state = create_state();
        state.players[1].health = 50;
        let mut effects = TickEffects::default();
        let mut rng = StdRng::seed_from_u64(11);
        combat::update(&mut state, &config, &mut effects, &mut rng);

        let first = update(&mut state, &mut effects);
        let players_after_first = state.players.clone();
        let effects_after_first = effects.clone();

        let second = update(&mut state, &mut effects);

        assert_eq!(first.as_slice(), &[11]);
        assert!(second.is_empty());
        assert_eq!(state.players, players_after_first);
        assert_eq!(effects, effects_after_first);
    }

    #[test]
    fn test_death_in_same_pass_as_final_hit() {
        let config = SimConfig {
            hit_probability: 1.0,
            ..SimConfig::default()
        };
        let mut state = create_state();
        state.players[1].health = config.hit_health_cost;
        let mut effects = TickEffects::default();
        let mut rng = StdRng::seed_from_u64(11);

        combat::update(&mut state, &config, &mut effects, &mut rng);
        assert!(effects.shot(11).is_some());

        update(&mut state, &mut effects);

        let dead = &state.players[1];
        assert!(!dead.alive);
        assert_eq!(dead.state, CombatState::Exploring);
        assert!(effects.shot(11).is_none());
        // The shooter lost its target
        assert_eq!(state.players[0].state, CombatState::Exploring);
    }
}
