//! Fouls, free throws and the coach's challenge
//!
//! Foul services and free-throw resolution are separate: callers decide the
//! attempt count and trip kind, then hand them to [`shoot_free_throws`].
//!
//! ## Draw order for a shot foul
//! foul draw → flagrant draw (missed shots only) → challenge-attempt draw
//! → challenge-success draw. Each later draw only happens when the earlier
//! one calls for it.

use super::rebound::resolve_rebound;
use crate::config::{FoulConfig, ReboundConfig};
use crate::error::StateViolation;
use crate::models::{
    FreeThrowSummary, PlayerProfile, PlayerRef, ShotZone, TeamSide, TeamState, TripKind,
};
use crate::rng::SimRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoulContext {
    /// Contact on a made basket.
    AndOne,
    /// Contact on a miss.
    Normal,
}

/// One draw's worth of probability that a foul is called on the shot.
pub fn foul_probability(
    context: FoulContext,
    zone: ShotZone,
    shooter: &PlayerProfile,
    defender: &PlayerProfile,
    cfg: &FoulConfig,
) -> f64 {
    let base = match context {
        FoulContext::AndOne => cfg.and_one_rates.get(zone),
        FoulContext::Normal => cfg.miss_rates.get(zone),
    };
    let regime = cfg.draw_foul_regimes.lookup(shooter.ratings.draw_foul);
    let whistle = if shooter.is_star && !defender.is_star {
        cfg.star_whistle_multiplier
    } else {
        1.0
    };
    (base * regime * whistle).clamp(0.0, 1.0)
}

/// The defense is in the bonus before the foul being called is counted.
pub fn in_bonus(defense: &TeamState, cfg: &FoulConfig) -> bool {
    defense.quarter_fouls >= cfg.bonus_threshold
}

/// Attempts and kind for a shooting trip, checked before the foul is counted.
/// A defense in the bonus always concedes two.
pub fn trip_for(defense: &TeamState, attempts: u8, kind: TripKind, cfg: &FoulConfig) -> (u8, TripKind) {
    if in_bonus(defense, cfg) {
        (2, TripKind::Bonus)
    } else {
        (attempts, kind)
    }
}

/// Attempts for a shooting foul on a miss.
pub fn shooting_attempts(zone: ShotZone) -> u8 {
    if zone == ShotZone::Three {
        3
    } else {
        2
    }
}

/// The fouling team may contest the call. The token is only spent when
/// the call is actually overturned. Returns true when the foul is wiped out.
pub fn review_call(fouling: &mut TeamState, period: u8, rng: &mut SimRng, cfg: &FoulConfig) -> bool {
    if !fouling.challenge_available || period < cfg.challenge_from_quarter {
        return false;
    }
    if !rng.chance(cfg.challenge_attempt_chance) {
        return false;
    }
    if !rng.chance(cfg.challenge_success_chance) {
        log::debug!("{} challenge failed, call stands", fouling.name);
        return false;
    }
    fouling.challenge_available = false;
    log::debug!("{} challenge successful, foul overturned", fouling.name);
    true
}

/// Foul-out or ejection, checked right after a foul is charged. The player
/// becomes ineligible at once; the slot is emptied between possessions.
pub fn enforce_limits(team: &mut TeamState, idx: usize, cfg: &FoulConfig) {
    let player = team.player_mut(idx);
    if !player.status.eligible {
        return;
    }
    if player.line.flagrant_fouls >= u16::from(cfg.flagrant_ejection_limit) {
        player.status.ejected = true;
        player.status.eligible = false;
        log::debug!("{} ejected ({} flagrants)", player.profile.name, player.line.flagrant_fouls);
    } else if player.line.fouls >= u16::from(cfg.foul_out_limit) {
        player.status.fouled_out = true;
        player.status.eligible = false;
        log::debug!("{} fouled out", player.profile.name);
    }
}

/// Personal + team foul, then limits.
pub fn commit_foul(team: &mut TeamState, idx: usize, flagrant: bool, cfg: &FoulConfig) {
    if flagrant {
        team.charge_flagrant(idx);
    } else {
        team.charge_foul(idx, true);
    }
    enforce_limits(team, idx, cfg);
}

/// Offensive foul: personal foul, never a team foul.
pub fn commit_offensive_foul(team: &mut TeamState, idx: usize, cfg: &FoulConfig) {
    team.charge_foul(idx, false);
    enforce_limits(team, idx, cfg);
}

/// Free-throw trip primitive shared by every foul flow.
///
/// One draw per attempt. A missed final attempt goes to a contested
/// rebound, except on flagrant trips where the shooting team keeps the
/// ball regardless.
pub fn shoot_free_throws(
    teams: &mut [TeamState; 2],
    shooter: PlayerRef,
    attempts: u8,
    kind: TripKind,
    rng: &mut SimRng,
    rebound_cfg: &ReboundConfig,
) -> Result<FreeThrowSummary, StateViolation> {
    let pct = teams[shooter.side.index()].player(shooter.idx).ratings().free_throw as f64 / 100.0;
    let mut made = 0;
    let mut last_made = true;
    for _ in 0..attempts {
        last_made = rng.chance(pct);
        teams[shooter.side.index()].credit_free_throw(shooter.idx, last_made);
        if last_made {
            made += 1;
        }
    }

    let retained = kind == TripKind::Flagrant;
    let rebound = if !last_made && !retained {
        Some(resolve_rebound(teams, shooter.side, true, rng, rebound_cfg)?)
    } else {
        None
    };

    Ok(FreeThrowSummary {
        shooter,
        kind,
        attempts,
        made,
        rebound,
        retained,
    })
}

/// Who has the ball after a trip.
pub fn after_trip(summary: &FreeThrowSummary) -> TeamSide {
    if summary.retained {
        return summary.shooter.side;
    }
    match &summary.rebound {
        Some(reb) => reb.rebounder.side,
        None => summary.shooter.side.opponent(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::team::tests::balanced_roster;
    use crate::models::{Position, RotationTier};

    fn teams() -> [TeamState; 2] {
        [
            TeamState::from_roster(&balanced_roster("Away"), 88).unwrap(),
            TeamState::from_roster(&balanced_roster("Home"), 88).unwrap(),
        ]
    }

    fn profile(draw_foul: u8, star: bool) -> PlayerProfile {
        let mut ratings = crate::models::Ratings::uniform(70);
        ratings.draw_foul = draw_foul;
        let mut p = PlayerProfile::new("P", "T", Position::SG, RotationTier::Starter, ratings);
        p.is_star = star;
        p
    }

    #[test]
    fn test_foul_probability_regimes() {
        let cfg = FoulConfig::default();
        let d = profile(50, false);
        let low = foul_probability(FoulContext::Normal, ShotZone::Rim, &profile(40, false), &d, &cfg);
        let mid = foul_probability(FoulContext::Normal, ShotZone::Rim, &profile(70, false), &d, &cfg);
        let high = foul_probability(FoulContext::Normal, ShotZone::Rim, &profile(90, false), &d, &cfg);
        assert!((mid - cfg.miss_rates.rim).abs() < 1e-12);
        assert!(low < mid && mid < high);

        let star = foul_probability(FoulContext::Normal, ShotZone::Rim, &profile(70, true), &d, &cfg);
        assert!((star - mid * cfg.star_whistle_multiplier).abs() < 1e-12);
        let star_vs_star =
            foul_probability(FoulContext::Normal, ShotZone::Rim, &profile(70, true), &profile(70, true), &cfg);
        assert!((star_vs_star - mid).abs() < 1e-12);
    }

    #[test]
    fn test_and_one_rates_are_lower_and_distance_tiered() {
        let cfg = FoulConfig::default();
        let s = profile(70, false);
        let d = profile(70, false);
        let rim = foul_probability(FoulContext::AndOne, ShotZone::Rim, &s, &d, &cfg);
        let three = foul_probability(FoulContext::AndOne, ShotZone::Three, &s, &d, &cfg);
        let miss_rim = foul_probability(FoulContext::Normal, ShotZone::Rim, &s, &d, &cfg);
        assert!(rim > three);
        assert!(miss_rim > rim);
    }

    #[test]
    fn test_challenge_token_only_spent_on_success() {
        let mut t = teams();
        let fail = FoulConfig {
            challenge_attempt_chance: 1.0,
            challenge_success_chance: 0.0,
            ..FoulConfig::default()
        };
        let mut rng = SimRng::new(3);
        assert!(!review_call(&mut t[1], 3, &mut rng, &fail));
        assert!(t[1].challenge_available);

        // Too early in the game: no draw at all
        let before = rng.draws();
        assert!(!review_call(&mut t[1], 2, &mut rng, &fail));
        assert_eq!(rng.draws(), before);

        let win = FoulConfig {
            challenge_attempt_chance: 1.0,
            challenge_success_chance: 1.0,
            ..FoulConfig::default()
        };
        assert!(review_call(&mut t[1], 4, &mut rng, &win));
        assert!(!t[1].challenge_available);
        assert!(!review_call(&mut t[1], 4, &mut rng, &win));
    }

    #[test]
    fn test_foul_out_and_ejection() {
        let mut t = teams();
        let cfg = FoulConfig::default();
        let pg = t[0].at(Position::PG).unwrap();
        for _ in 0..5 {
            commit_foul(&mut t[0], pg, false, &cfg);
        }
        assert!(t[0].player(pg).status.eligible);
        commit_foul(&mut t[0], pg, false, &cfg);
        assert!(t[0].player(pg).status.fouled_out);
        assert!(!t[0].player(pg).status.eligible);

        let c = t[0].at(Position::C).unwrap();
        commit_foul(&mut t[0], c, true, &cfg);
        assert!(t[0].player(c).status.eligible);
        commit_foul(&mut t[0], c, true, &cfg);
        assert!(t[0].player(c).status.ejected);
        assert!(!t[0].player(c).status.fouled_out);
    }

    #[test]
    fn test_offensive_foul_skips_team_count() {
        let mut t = teams();
        let cfg = FoulConfig::default();
        let sf = t[0].at(Position::SF).unwrap();
        commit_offensive_foul(&mut t[0], sf, &cfg);
        assert_eq!(t[0].quarter_fouls, 0);
        assert_eq!(t[0].player(sf).line.fouls, 1);
    }

    #[test]
    fn test_bonus_threshold() {
        let mut t = teams();
        let cfg = FoulConfig::default();
        let pf = t[1].at(Position::PF).unwrap();
        for _ in 0..4 {
            commit_foul(&mut t[1], pf, false, &cfg);
        }
        assert!(!in_bonus(&t[1], &cfg));
        commit_foul(&mut t[1], pf, false, &cfg);
        assert!(in_bonus(&t[1], &cfg));
        t[1].reset_quarter();
        assert!(!in_bonus(&t[1], &cfg));
    }

    #[test]
    fn test_bonus_overrides_trip_size() {
        let mut t = teams();
        let cfg = FoulConfig::default();
        assert_eq!(trip_for(&t[1], 3, TripKind::Shooting, &cfg), (3, TripKind::Shooting));
        assert_eq!(trip_for(&t[1], 1, TripKind::AndOne, &cfg), (1, TripKind::AndOne));
        t[1].quarter_fouls = cfg.bonus_threshold;
        assert_eq!(trip_for(&t[1], 3, TripKind::Shooting, &cfg), (2, TripKind::Bonus));
        assert_eq!(trip_for(&t[1], 1, TripKind::AndOne, &cfg), (2, TripKind::Bonus));
    }

    #[test]
    fn test_free_throw_trip_draws_once_per_attempt() {
        let mut t = teams();
        let shooter_idx = t[0].at(Position::SG).unwrap();
        t[0].player_mut(shooter_idx).profile.ratings.free_throw = 100;
        let shooter = PlayerRef::new(TeamSide::Away, shooter_idx);
        let mut rng = SimRng::new(10);
        let trip =
            shoot_free_throws(&mut t, shooter, 3, TripKind::Shooting, &mut rng, &ReboundConfig::default())
                .unwrap();
        assert_eq!(rng.draws(), 3);
        assert_eq!(trip.made, 3);
        assert!(trip.rebound.is_none());
        assert_eq!(after_trip(&trip), TeamSide::Home);
        assert_eq!(t[0].score, 3);
        assert_eq!(t[0].player(shooter_idx).line.fta, 3);
    }

    #[test]
    fn test_missed_final_free_throw() {
        let mut t = teams();
        let shooter_idx = t[0].at(Position::C).unwrap();
        t[0].player_mut(shooter_idx).profile.ratings.free_throw = 0;
        let shooter = PlayerRef::new(TeamSide::Away, shooter_idx);
        let mut rng = SimRng::new(10);
        let cfg = ReboundConfig::default();

        let trip = shoot_free_throws(&mut t, shooter, 2, TripKind::Bonus, &mut rng, &cfg).unwrap();
        assert_eq!(trip.missed(), 2);
        let reb = trip.rebound.unwrap();
        assert!(reb.after_free_throw);
        assert_eq!(after_trip(&trip), reb.rebounder.side);

        let rebounds_before: u16 = t.iter().map(|team| team.totals.rebounds()).sum();
        let flagrant = shoot_free_throws(&mut t, shooter, 2, TripKind::Flagrant, &mut rng, &cfg).unwrap();
        assert!(flagrant.retained);
        assert!(flagrant.rebound.is_none());
        assert_eq!(after_trip(&flagrant), TeamSide::Away);
        let rebounds_after: u16 = t.iter().map(|team| team.totals.rebounds()).sum();
        assert_eq!(rebounds_before, rebounds_after);
    }
}
