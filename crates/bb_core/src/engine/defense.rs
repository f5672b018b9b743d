//! Blocks, steals, turnovers and jump balls

use super::selection::{best_on_court, pick_teammate};
use crate::config::DefenseConfig;
use crate::models::{Ratings, ShotZone, TeamState, TurnoverKind};
use crate::rng::{to_basis_points, SimRng};

/// Chance that `blocker` gets a hand on a shot from `zone`.
pub fn block_probability(zone: ShotZone, blocker: &Ratings, cfg: &DefenseConfig) -> f64 {
    let guard = if zone.is_interior() {
        blocker.interior_defense
    } else {
        blocker.perimeter_defense
    };
    let p = cfg.block_rates.get(zone) * cfg.block_ladder.lookup(blocker.block)
        + (guard as f64 - cfg.rating_pivot) * cfg.block_defense_weight
        + (blocker.athleticism as f64 - cfg.rating_pivot) * cfg.block_athleticism_weight;
    p.clamp(0.0, cfg.block_max)
}

/// Matchup defender, or the best shot-blocker on the floor for rim
/// attempts when they out-rate the matchup.
pub fn choose_blocker(defense: &TeamState, matchup: usize, zone: ShotZone) -> usize {
    if zone != ShotZone::Rim {
        return matchup;
    }
    let own = defense.player(matchup).ratings().block;
    match best_on_court(defense, |r| r.block) {
        Some(help) if defense.player(help).ratings().block > own => help,
        _ => matchup,
    }
}

/// Steal range of the on-ball defender.
pub fn steal_probability(defender: &Ratings, cfg: &DefenseConfig) -> f64 {
    let p = cfg.steal_base * cfg.steal_ladder.lookup(defender.steal)
        + (defender.perimeter_defense as f64 - cfg.rating_pivot) * cfg.steal_defense_weight
        + (defender.athleticism as f64 - cfg.rating_pivot) * cfg.steal_athleticism_weight;
    p.clamp(cfg.steal_min, cfg.steal_max)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallSecurity {
    Secure,
    JumpBall,
    Turnover(TurnoverKind),
    Steal,
}

/// One roll checked in order against jump ball, unforced turnover and the
/// steal range. The turnover kind comes from the same roll.
pub fn ball_security(rng: &mut SimRng, steal_p: f64, cfg: &DefenseConfig) -> BallSecurity {
    let roll = rng.roll();
    let jump = to_basis_points(cfg.jump_ball_chance);
    let unforced = jump + to_basis_points(cfg.unforced_turnover_chance);
    let steal = unforced + to_basis_points(steal_p);
    if roll < jump {
        BallSecurity::JumpBall
    } else if roll < unforced {
        let kind = match roll % 3 {
            0 => TurnoverKind::BadPass,
            1 => TurnoverKind::Travel,
            _ => TurnoverKind::OffensiveFoul,
        };
        BallSecurity::Turnover(kind)
    } else if roll < steal {
        BallSecurity::Steal
    } else {
        BallSecurity::Secure
    }
}

/// Fast break off a steal: one draw for the break, one for who finishes,
/// and a weighted pick when a teammate does. Returns the finisher.
pub fn fast_break_finisher(
    team: &TeamState,
    stealer: usize,
    rng: &mut SimRng,
    cfg: &DefenseConfig,
) -> Option<usize> {
    if !rng.chance(cfg.fast_break_chance) {
        return None;
    }
    if rng.chance(cfg.stealer_finish_chance) {
        return Some(stealer);
    }
    Some(pick_teammate(team, stealer, |r| r.overall, rng).unwrap_or(stealer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::team::tests::balanced_roster;
    use crate::models::Position;

    #[test]
    fn test_block_ladder_scales_probability() {
        let cfg = DefenseConfig::default();
        let mut r = Ratings::uniform(70);
        r.block = 50;
        let weak = block_probability(ShotZone::Rim, &r, &cfg);
        r.block = 95;
        let elite = block_probability(ShotZone::Rim, &r, &cfg);
        assert!((weak - 0.09 * 0.7).abs() < 1e-12);
        assert!((elite - 0.09 * 2.0).abs() < 1e-12);
        assert!(block_probability(ShotZone::Three, &r, &cfg) < elite);
    }

    #[test]
    fn test_block_probability_is_capped() {
        let cfg = DefenseConfig::default();
        let r = Ratings::uniform(100);
        assert_eq!(block_probability(ShotZone::Rim, &r, &cfg), cfg.block_max);
    }

    #[test]
    fn test_help_blocker_at_the_rim() {
        let mut team = TeamState::from_roster(&balanced_roster("Pacers"), 88).unwrap();
        let pg = team.at(Position::PG).unwrap();
        let c = team.at(Position::C).unwrap();
        team.player_mut(c).profile.ratings.block = 92;
        assert_eq!(choose_blocker(&team, pg, ShotZone::Rim), c);
        assert_eq!(choose_blocker(&team, pg, ShotZone::MidRange), pg);
    }

    #[test]
    fn test_ball_security_is_one_ordered_roll() {
        let always_jump = DefenseConfig {
            jump_ball_chance: 1.0,
            ..DefenseConfig::default()
        };
        let mut rng = SimRng::new(6);
        assert_eq!(ball_security(&mut rng, 0.1, &always_jump), BallSecurity::JumpBall);
        assert_eq!(rng.draws(), 1);

        let always_turnover = DefenseConfig {
            jump_ball_chance: 0.0,
            unforced_turnover_chance: 1.0,
            ..DefenseConfig::default()
        };
        assert!(matches!(
            ball_security(&mut rng, 0.1, &always_turnover),
            BallSecurity::Turnover(_)
        ));

        let steals_only = DefenseConfig {
            jump_ball_chance: 0.0,
            unforced_turnover_chance: 0.0,
            ..DefenseConfig::default()
        };
        assert_eq!(ball_security(&mut rng, 1.0, &steals_only), BallSecurity::Steal);
        assert_eq!(ball_security(&mut rng, 0.0, &steals_only), BallSecurity::Secure);
    }

    #[test]
    fn test_steal_probability_bounds() {
        let cfg = DefenseConfig::default();
        let elite = steal_probability(&Ratings::uniform(100), &cfg);
        assert!(elite <= cfg.steal_max);
        assert_eq!(steal_probability(&Ratings::uniform(0), &cfg), cfg.steal_min);
        let avg = steal_probability(&Ratings::uniform(70), &cfg);
        assert!((avg - cfg.steal_base * 1.15).abs() < 1e-12);
        assert!(elite > avg);
        let greedy = DefenseConfig {
            steal_base: 0.5,
            ..DefenseConfig::default()
        };
        assert_eq!(steal_probability(&Ratings::uniform(100), &greedy), greedy.steal_max);
    }

    #[test]
    fn test_fast_break_finisher() {
        let team = TeamState::from_roster(&balanced_roster("Rockets"), 88).unwrap();
        let stealer = team.at(Position::SG).unwrap();
        let never = DefenseConfig {
            fast_break_chance: 0.0,
            ..DefenseConfig::default()
        };
        let mut rng = SimRng::new(2);
        assert_eq!(fast_break_finisher(&team, stealer, &mut rng, &never), None);

        let own = DefenseConfig {
            fast_break_chance: 1.0,
            stealer_finish_chance: 1.0,
            ..DefenseConfig::default()
        };
        assert_eq!(fast_break_finisher(&team, stealer, &mut rng, &own), Some(stealer));

        let teammate = DefenseConfig {
            fast_break_chance: 1.0,
            stealer_finish_chance: 0.0,
            ..DefenseConfig::default()
        };
        let finisher = fast_break_finisher(&team, stealer, &mut rng, &teammate).unwrap();
        assert_ne!(finisher, stealer);
        assert!(team.player(finisher).status.on_court);
    }
}
