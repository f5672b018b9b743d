//! Minutes budgets, stint clocks and injuries

use super::selection::pick_weighted;
use crate::config::RotationConfig;
use crate::models::{Player, PlayerRef, RotationTier, TeamSide, TeamState};
use crate::rng::SimRng;

/// Minutes a player should end up with: durability tier for starters, a
/// flat budget for the bench, athleticism on top, floored.
pub fn target_minutes(player: &Player, close_game: bool, cfg: &RotationConfig) -> f64 {
    let r = player.ratings();
    let base = match player.profile.tier {
        RotationTier::Starter => cfg.durability_minutes.lookup(r.durability),
        RotationTier::Bench => cfg.bench_minutes,
        RotationTier::DeepBench => cfg.deep_bench_minutes,
    };
    let bonus = if close_game && player.profile.tier == RotationTier::Starter {
        cfg.close_game_minutes_bonus
    } else {
        0.0
    };
    (base + cfg.athleticism_minutes.lookup(r.athleticism) + bonus).max(cfg.min_target_minutes)
}

/// Longest stint before a breather. Close second halves stretch it.
pub fn stint_cap(player: &Player, close_late: bool, cfg: &RotationConfig) -> u32 {
    let base = match player.profile.tier {
        RotationTier::Starter => cfg.starter_stint_cap,
        _ => cfg.bench_stint_cap,
    };
    if close_late {
        base + cfg.close_game_stint_bonus
    } else {
        base
    }
}

/// Runs the stint/bench clocks and seconds played for every rostered player.
pub fn advance_clock(teams: &mut [TeamState; 2], seconds: u32) {
    for team in teams.iter_mut() {
        for player in team.roster.iter_mut() {
            if player.status.on_court {
                player.line.seconds_played += seconds;
                player.status.stint_seconds += seconds;
            } else {
                player.status.bench_seconds += seconds;
            }
        }
    }
}

/// One draw for whether anyone gets hurt; if so, a second draw picks who,
/// weighted toward fragile players. The player is flagged here and leaves
/// the floor in the forced-removal pass.
pub fn injury_check(teams: &mut [TeamState; 2], rng: &mut SimRng, cfg: &RotationConfig) -> Option<PlayerRef> {
    if !rng.chance(cfg.injury_chance) {
        return None;
    }
    let mut candidates = Vec::new();
    let mut refs = Vec::new();
    for side in [TeamSide::Away, TeamSide::Home] {
        let team = &teams[side.index()];
        for idx in team.on_court.iter().flatten().copied() {
            let p = team.player(idx);
            if !p.status.eligible || p.status.injured {
                continue;
            }
            candidates.push((refs.len(), 110u32.saturating_sub(p.ratings().durability as u32)));
            refs.push(PlayerRef::new(side, idx));
        }
    }
    let hurt = refs[pick_weighted(rng, &candidates)?];
    let player = teams[hurt.side.index()].player_mut(hurt.idx);
    player.status.injured = true;
    log::debug!("{} injured", player.profile.name);
    Some(hurt)
}
