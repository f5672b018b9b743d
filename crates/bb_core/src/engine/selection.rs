//! Weighted player selection and defensive matchups
//!
//! Pure helpers over a `TeamState`. Every pick is a single draw over integer
//! weights so the draw count is easy to reason about.

use crate::config::ShotConfig;
use crate::error::StateViolation;
use crate::models::{Position, Ratings, TeamSide, TeamState};
use crate::rng::SimRng;

/// Float weight → integer weight with two decimals of resolution.
#[inline]
pub fn weight(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    (value * 100.0).round().min(u32::MAX as f64) as u32
}

/// Picks one candidate with probability proportional to its weight.
///
/// One draw, none for a single candidate. All-zero weights fall back to a
/// uniform draw.
pub fn pick_weighted(rng: &mut SimRng, candidates: &[(usize, u32)]) -> Option<usize> {
    match candidates {
        [] => return None,
        [(only, _)] => return Some(*only),
        _ => {}
    }
    let total: u64 = candidates.iter().map(|(_, w)| *w as u64).sum();
    if total == 0 {
        let i = rng.next_below(candidates.len() as u32) as usize;
        return Some(candidates[i].0);
    }
    let total = total.min(u32::MAX as u64) as u32;
    let mut r = rng.next_below(total) as u64;
    for (idx, w) in candidates {
        if r < *w as u64 {
            return Some(*idx);
        }
        r -= *w as u64;
    }
    candidates.last().map(|(idx, _)| *idx)
}

/// On-court players who can still take part in play, slot order.
///
/// A player who fouls out mid-possession stays in the slot until the
/// between-possession removal, but is skipped here.
pub fn active_lineup(team: &TeamState) -> Vec<usize> {
    team.on_court
        .iter()
        .flatten()
        .copied()
        .filter(|idx| team.player(*idx).status.eligible)
        .collect()
}

/// Shot usage: `(overall - floor)^2`, stars scaled up.
pub fn usage_weight(team: &TeamState, idx: usize, cfg: &ShotConfig) -> u32 {
    let profile = &team.player(idx).profile;
    let base = profile.ratings.overall.saturating_sub(cfg.usage_floor).max(1) as f64;
    let mut w = base * base;
    if profile.is_star {
        w *= cfg.star_usage_multiplier;
    }
    weight(w)
}

/// Ball handler for the possession; they take the shot if it gets that far.
pub fn pick_ball_handler(
    team: &TeamState,
    cfg: &ShotConfig,
    rng: &mut SimRng,
) -> Result<usize, StateViolation> {
    let candidates: Vec<(usize, u32)> = active_lineup(team)
        .into_iter()
        .map(|idx| (idx, usage_weight(team, idx, cfg)))
        .collect();
    pick_weighted(rng, &candidates).ok_or_else(|| StateViolation::EmptyLineup {
        team: team.name.clone(),
    })
}

/// Positional matchup. An empty slot (partial roster) is covered by the
/// closest occupied role.
pub fn matchup_defender(defense: &TeamState, pos: Position) -> Result<usize, StateViolation> {
    std::iter::once(pos)
        .chain(pos.neighbors())
        .find_map(|p| defense.at(p))
        .ok_or_else(|| StateViolation::EmptyLineup {
            team: defense.name.clone(),
        })
}

/// Highest-rated active player; ties go to the earlier slot.
pub fn best_on_court(team: &TeamState, rating: impl Fn(&Ratings) -> u8) -> Option<usize> {
    let mut best: Option<(usize, u8)> = None;
    for idx in active_lineup(team) {
        let r = rating(team.player(idx).ratings());
        if best.map_or(true, |(_, b)| r > b) {
            best = Some((idx, r));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Rating-weighted pick among active teammates of `exclude`.
pub fn pick_teammate(
    team: &TeamState,
    exclude: usize,
    rating: impl Fn(&Ratings) -> u8,
    rng: &mut SimRng,
) -> Option<usize> {
    let candidates: Vec<(usize, u32)> = active_lineup(team)
        .into_iter()
        .filter(|idx| *idx != exclude)
        .map(|idx| (idx, rating(team.player(idx).ratings()) as u32))
        .collect();
    pick_weighted(rng, &candidates)
}

/// Active players at or above `threshold`, not counting `exclude`.
pub fn count_at_least(
    team: &TeamState,
    exclude: usize,
    threshold: u8,
    rating: impl Fn(&Ratings) -> u8,
) -> usize {
    active_lineup(team)
        .into_iter()
        .filter(|idx| *idx != exclude && rating(team.player(*idx).ratings()) >= threshold)
        .count()
}

/// Athleticism-weighted jump ball between two players. One draw.
pub fn jump_ball(
    teams: &[TeamState; 2],
    away_jumper: usize,
    home_jumper: usize,
    rng: &mut SimRng,
) -> TeamSide {
    let away = teams[TeamSide::Away.index()].player(away_jumper).ratings().athleticism;
    let home = teams[TeamSide::Home.index()].player(home_jumper).ratings().athleticism;
    let candidates = [
        (TeamSide::Away.index(), away.max(1) as u32),
        (TeamSide::Home.index(), home.max(1) as u32),
    ];
    match pick_weighted(rng, &candidates) {
        Some(0) => TeamSide::Away,
        _ => TeamSide::Home,
    }
}
