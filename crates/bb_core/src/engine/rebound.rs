//! Contested rebounds
//!
//! Draw order: side draw, then the elite shortcut draw (only when someone
//! on the winning side clears the threshold), then the weighted pick when
//! the shortcut misses.

use super::selection::{active_lineup, best_on_court, pick_weighted};
use crate::config::ReboundConfig;
use crate::error::StateViolation;
use crate::models::{PlayerRef, Ratings, Rebound, TeamSide, TeamState};
use crate::rng::SimRng;

fn off_board(r: &Ratings) -> u8 {
    r.off_rebound
}

fn def_board(r: &Ratings) -> u8 {
    r.def_rebound
}

fn board_rating(offensive: bool) -> fn(&Ratings) -> u8 {
    if offensive {
        off_board
    } else {
        def_board
    }
}

fn rating_sum(team: &TeamState, rating: fn(&Ratings) -> u8) -> u32 {
    active_lineup(team)
        .into_iter()
        .map(|idx| rating(team.player(idx).ratings()) as u32)
        .sum()
}

/// Offensive rebound chance for the shooting team.
pub fn offensive_chance(offense: &TeamState, defense: &TeamState, cfg: &ReboundConfig) -> f64 {
    let off = rating_sum(offense, board_rating(true));
    let def = rating_sum(defense, board_rating(false));
    if off > def {
        cfg.offensive_bonus
    } else {
        cfg.offensive_base
    }
}

/// Resolves a missed shot or final free throw and credits the rebounder.
pub fn resolve_rebound(
    teams: &mut [TeamState; 2],
    shooting_side: TeamSide,
    after_free_throw: bool,
    rng: &mut SimRng,
    cfg: &ReboundConfig,
) -> Result<Rebound, StateViolation> {
    let p_off = offensive_chance(
        &teams[shooting_side.index()],
        &teams[shooting_side.opponent().index()],
        cfg,
    );
    let offensive = rng.chance(p_off);
    let side = if offensive {
        shooting_side
    } else {
        shooting_side.opponent()
    };
    let rating = board_rating(offensive);
    let team = &teams[side.index()];

    let elite = best_on_court(team, rating)
        .filter(|idx| rating(team.player(*idx).ratings()) >= cfg.elite_threshold);
    let shortcut = match elite {
        Some(idx) if rng.chance(cfg.elite_shortcut_chance) => Some(idx),
        _ => None,
    };

    let rebounder = match shortcut {
        Some(idx) => idx,
        None => {
            let candidates: Vec<(usize, u32)> = active_lineup(team)
                .into_iter()
                .map(|idx| (idx, rating(team.player(idx).ratings()) as u32))
                .collect();
            pick_weighted(rng, &candidates).ok_or_else(|| StateViolation::EmptyLineup {
                team: team.name.clone(),
            })?
        }
    };

    teams[side.index()].credit_rebound(rebounder, offensive);
    Ok(Rebound {
        rebounder: PlayerRef::new(side, rebounder),
        offensive,
        after_free_throw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::team::tests::balanced_roster;
    use crate::models::Position;

    fn teams() -> [TeamState; 2] {
        [
            TeamState::from_roster(&balanced_roster("Away"), 88).unwrap(),
            TeamState::from_roster(&balanced_roster("Home"), 88).unwrap(),
        ]
    }

    #[test]
    fn test_bonus_tier_goes_to_stronger_glass() {
        let mut t = teams();
        let cfg = ReboundConfig::default();
        assert_eq!(offensive_chance(&t[0], &t[1], &cfg), cfg.offensive_base);
        let c = t[0].at(Position::C).unwrap();
        t[0].player_mut(c).profile.ratings.off_rebound = 99;
        assert_eq!(offensive_chance(&t[0], &t[1], &cfg), cfg.offensive_bonus);
    }

    #[test]
    fn test_rebound_is_credited() {
        let mut t = teams();
        let cfg = ReboundConfig::default();
        let mut rng = SimRng::new(8);
        for _ in 0..100 {
            let reb = resolve_rebound(&mut t, TeamSide::Away, false, &mut rng, &cfg).unwrap();
            assert_eq!(reb.offensive, reb.rebounder.side == TeamSide::Away);
        }
        let total: u16 = t.iter().map(|team| team.totals.rebounds()).sum();
        assert_eq!(total, 100);
        assert!(t[1].totals.def_rebounds > t[0].totals.off_rebounds);
    }

    #[test]
    fn test_elite_rebounder_shortcut() {
        let mut t = teams();
        let cfg = ReboundConfig {
            offensive_base: 0.0,
            offensive_bonus: 0.0,
            elite_shortcut_chance: 1.0,
            ..ReboundConfig::default()
        };
        let c = t[1].at(Position::C).unwrap();
        t[1].player_mut(c).profile.ratings.def_rebound = 95;
        let mut rng = SimRng::new(1);
        for _ in 0..20 {
            let reb = resolve_rebound(&mut t, TeamSide::Away, true, &mut rng, &cfg).unwrap();
            assert_eq!(reb.rebounder, PlayerRef::new(TeamSide::Home, c));
            assert!(reb.after_free_throw);
        }
        // side draw + shortcut draw, no weighted pick
        assert_eq!(rng.draws(), 40);
    }
}
