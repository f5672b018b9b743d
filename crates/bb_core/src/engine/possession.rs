//! Possession resolver
//!
//! One call resolves one possession: it picks the ball handler and the
//! matchup, runs the decision chain, mutates both teams' counters and tells
//! the caller who has the ball next.
//!
//! ## Draw order
//! 1. ball handler (weighted by usage)
//! 2. ball security roll: jump ball / unforced turnover / steal
//!    - steal: fast-break draw, finisher draw, teammate pick
//! 3. reach-in foul draw (then the bonus free throws)
//! 4. shot distance, pull-in and style draws ([`super::shot`])
//! 5. block draw, then out-of-bounds draw and rebound on a block
//! 6. density swing
//! 7. make roll
//! 8. made: assist draw, assister pick, and-one foul draw, challenge draws,
//!    one free throw
//! 9. missed: foul draw, flagrant draw, challenge draws, free throws or
//!    the rebound
//!
//! ## Who gets the ball
//! | Outcome                          | Next offense             |
//! |----------------------------------|--------------------------|
//! | made shot / turnover / steal     | defense                  |
//! | steal + fast-break score         | original offense         |
//! | miss or blocked miss             | rebounding team          |
//! | block out of bounds, side-out    | offense                  |
//! | free-throw trip                  | last make flips, last miss goes to the rebound |
//! | flagrant                         | offense                  |
//! | jump ball                        | winner                   |

use serde::{Deserialize, Serialize};

use super::defense::{
    ball_security, block_probability, choose_blocker, fast_break_finisher, steal_probability,
    BallSecurity,
};
use super::fouls::{
    after_trip, commit_foul, commit_offensive_foul, foul_probability, in_bonus, review_call,
    shoot_free_throws, shooting_attempts, trip_for, FoulContext,
};
use super::rebound::resolve_rebound;
use super::selection::{
    count_at_least, jump_ball, matchup_defender, pick_ball_handler, pick_teammate,
};
use super::shot::{density_swing, make_percentage, select_shot, ShotSituation};
use super::Situation;
use crate::config::EngineConfig;
use crate::error::StateViolation;
use crate::models::{
    BlockResult, FastBreak, PlayerRef, PossessionOutcome, ShotInfo, TeamSide, TeamState,
    TripKind, TurnoverKind,
};
use crate::rng::SimRng;

/// How long the possession took, as a clock range selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tempo {
    HalfCourt,
    /// Second chance after an offensive rebound.
    Putback,
    FastBreak,
    DeadBall,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PossessionResult {
    pub outcome: PossessionOutcome,
    pub next_offense: TeamSide,
    pub tempo: Tempo,
}

impl PossessionResult {
    fn new(outcome: PossessionOutcome, next_offense: TeamSide, tempo: Tempo) -> Self {
        Self {
            outcome,
            next_offense,
            tempo,
        }
    }

    /// The next possession starts from an offensive rebound.
    pub fn is_putback(&self) -> bool {
        match &self.outcome {
            PossessionOutcome::MissedShot { rebound, .. } => rebound.offensive,
            PossessionOutcome::Block {
                result: BlockResult::Rebound(rebound),
                ..
            } => rebound.offensive,
            PossessionOutcome::ShootingFoul { free_throws, .. }
            | PossessionOutcome::MadeShot {
                and_one: Some(free_throws),
                ..
            }
            | PossessionOutcome::NonShootingFoul {
                free_throws: Some(free_throws),
                ..
            } => free_throws.rebound.is_some_and(|r| r.offensive),
            _ => false,
        }
    }
}

/// Resolves one possession for `offense`. `putback` marks a possession
/// that began with an offensive rebound.
pub fn resolve_possession(
    teams: &mut [TeamState; 2],
    offense: TeamSide,
    situation: &Situation,
    putback: bool,
    cfg: &EngineConfig,
    rng: &mut SimRng,
) -> Result<PossessionResult, StateViolation> {
    let o = offense.index();
    let defense = offense.opponent();
    let d = defense.index();
    teams[o].require_lineup()?;
    teams[d].require_lineup()?;

    let handler = pick_ball_handler(&teams[o], &cfg.shot, rng)?;
    let handler_pos = teams[o]
        .slot_of(handler)
        .unwrap_or(teams[o].player(handler).profile.position);
    let defender = matchup_defender(&teams[d], handler_pos)?;
    let ball = PlayerRef::new(offense, handler);
    let guard = PlayerRef::new(defense, defender);
    let live_tempo = if putback { Tempo::Putback } else { Tempo::HalfCourt };

    let steal_p = steal_probability(teams[d].player(defender).ratings(), &cfg.defense);
    match ball_security(rng, steal_p, &cfg.defense) {
        BallSecurity::Secure => {}
        BallSecurity::JumpBall => {
            let winner = match offense {
                TeamSide::Away => jump_ball(teams, handler, defender, rng),
                TeamSide::Home => jump_ball(teams, defender, handler, rng),
            };
            let outcome = PossessionOutcome::JumpBall {
                offense_player: ball,
                defense_player: guard,
                winner,
            };
            return Ok(PossessionResult::new(outcome, winner, Tempo::DeadBall));
        }
        BallSecurity::Turnover(kind) => {
            teams[o].credit_turnover(handler);
            if kind == TurnoverKind::OffensiveFoul {
                commit_offensive_foul(&mut teams[o], handler, &cfg.foul);
            }
            let outcome = PossessionOutcome::Turnover { player: ball, kind };
            return Ok(PossessionResult::new(outcome, defense, Tempo::DeadBall));
        }
        BallSecurity::Steal => return Ok(steal(teams, ball, guard, live_tempo, cfg, rng)),
    }

    if rng.chance(cfg.foul.reach_in_chance) {
        return reach_in(teams, ball, guard, cfg, rng);
    }

    let mut shot = select_shot(teams[o].player(handler), rng, &cfg.shot);

    let blocker = choose_blocker(&teams[d], defender, shot.zone);
    let block_p = block_probability(shot.zone, teams[d].player(blocker).ratings(), &cfg.defense);
    if rng.chance(block_p) {
        return blocked(teams, ball, PlayerRef::new(defense, blocker), shot, cfg, rng);
    }

    let density = if situation.kind.is_postseason() {
        &cfg.shot.density_playoff
    } else {
        &cfg.shot.density_regular
    };
    let swing = density_swing(rng, density);
    let margin = teams[o].score.abs_diff(teams[d].score);
    let clutch = situation.period == cfg.clock.quarters
        && situation.clock <= cfg.shot.clutch_window_seconds
        && margin <= cfg.shot.clutch_margin;
    let shot_situation = ShotSituation {
        shooter: teams[o].player(handler),
        defender: teams[d].player(defender),
        playmakers: count_at_least(&teams[o], handler, cfg.shot.playmaker_threshold, |r| {
            r.assist
        }),
        clutch,
        density_swing: swing,
    };
    shot.make_pct = make_percentage(shot.distance, shot.zone, shot.kind, &shot_situation, &cfg.shot);

    if rng.chance(shot.make_pct / 100.0) {
        made_shot(teams, ball, guard, shot, situation, live_tempo, cfg, rng)
    } else {
        missed_shot(teams, ball, guard, shot, situation, live_tempo, cfg, rng)
    }
}

fn steal(
    teams: &mut [TeamState; 2],
    ball: PlayerRef,
    stealer: PlayerRef,
    live_tempo: Tempo,
    cfg: &EngineConfig,
    rng: &mut SimRng,
) -> PossessionResult {
    let (o, d) = (ball.side.index(), stealer.side.index());
    teams[o].credit_turnover(ball.idx);
    teams[d].credit_steal(stealer.idx);

    let fast_break = match fast_break_finisher(&teams[d], stealer.idx, rng, &cfg.defense) {
        Some(finisher) => {
            teams[d].credit_field_goal(finisher, false, true);
            let assist = if finisher != stealer.idx {
                teams[d].credit_assist(stealer.idx);
                Some(stealer)
            } else {
                None
            };
            Some(FastBreak {
                finisher: PlayerRef::new(stealer.side, finisher),
                assist,
            })
        }
        None => None,
    };

    let (next, tempo) = match fast_break {
        Some(_) => (ball.side, Tempo::FastBreak),
        None => (stealer.side, live_tempo),
    };
    let outcome = PossessionOutcome::Steal {
        ball_handler: ball,
        stealer,
        fast_break,
    };
    PossessionResult::new(outcome, next, tempo)
}

fn reach_in(
    teams: &mut [TeamState; 2],
    fouled: PlayerRef,
    fouler: PlayerRef,
    cfg: &EngineConfig,
    rng: &mut SimRng,
) -> Result<PossessionResult, StateViolation> {
    let d = fouler.side.index();
    let bonus = in_bonus(&teams[d], &cfg.foul);
    commit_foul(&mut teams[d], fouler.idx, false, &cfg.foul);

    if !bonus {
        let outcome = PossessionOutcome::NonShootingFoul {
            fouled,
            fouler,
            free_throws: None,
        };
        return Ok(PossessionResult::new(outcome, fouled.side, Tempo::DeadBall));
    }
    let trip = shoot_free_throws(teams, fouled, 2, TripKind::Bonus, rng, &cfg.rebound)?;
    let next = after_trip(&trip);
    let outcome = PossessionOutcome::NonShootingFoul {
        fouled,
        fouler,
        free_throws: Some(trip),
    };
    Ok(PossessionResult::new(outcome, next, Tempo::DeadBall))
}

fn blocked(
    teams: &mut [TeamState; 2],
    shooter: PlayerRef,
    blocker: PlayerRef,
    shot: ShotInfo,
    cfg: &EngineConfig,
    rng: &mut SimRng,
) -> Result<PossessionResult, StateViolation> {
    teams[shooter.side.index()].credit_field_goal(shooter.idx, shot.is_three(), false);
    teams[blocker.side.index()].credit_block(blocker.idx);

    if rng.chance(cfg.defense.block_out_of_bounds) {
        let outcome = PossessionOutcome::Block {
            shooter,
            blocker,
            shot,
            result: BlockResult::OutOfBounds,
        };
        return Ok(PossessionResult::new(outcome, shooter.side, Tempo::DeadBall));
    }
    let rebound = resolve_rebound(teams, shooter.side, false, rng, &cfg.rebound)?;
    let outcome = PossessionOutcome::Block {
        shooter,
        blocker,
        shot,
        result: BlockResult::Rebound(rebound),
    };
    Ok(PossessionResult::new(outcome, rebound.rebounder.side, Tempo::HalfCourt))
}

#[allow(clippy::too_many_arguments)]
fn made_shot(
    teams: &mut [TeamState; 2],
    shooter: PlayerRef,
    defender: PlayerRef,
    shot: ShotInfo,
    situation: &Situation,
    tempo: Tempo,
    cfg: &EngineConfig,
    rng: &mut SimRng,
) -> Result<PossessionResult, StateViolation> {
    let (o, d) = (shooter.side.index(), defender.side.index());
    teams[o].credit_field_goal(shooter.idx, shot.is_three(), true);

    let assist = if rng.chance(cfg.shot.assist_chance) {
        pick_teammate(&teams[o], shooter.idx, |r| r.assist, rng)
    } else {
        None
    };
    if let Some(a) = assist {
        teams[o].credit_assist(a);
    }

    let p_foul = foul_probability(
        FoulContext::AndOne,
        shot.zone,
        &teams[o].player(shooter.idx).profile,
        &teams[d].player(defender.idx).profile,
        &cfg.foul,
    );
    let and_one = if rng.chance(p_foul) && !review_call(&mut teams[d], situation.period, rng, &cfg.foul)
    {
        let (attempts, kind) = trip_for(&teams[d], 1, TripKind::AndOne, &cfg.foul);
        commit_foul(&mut teams[d], defender.idx, false, &cfg.foul);
        Some(shoot_free_throws(teams, shooter, attempts, kind, rng, &cfg.rebound)?)
    } else {
        None
    };

    let next = and_one.as_ref().map_or(defender.side, after_trip);
    let outcome = PossessionOutcome::MadeShot {
        shooter,
        defender,
        assist: assist.map(|a| PlayerRef::new(shooter.side, a)),
        shot,
        and_one,
    };
    Ok(PossessionResult::new(outcome, next, tempo))
}

#[allow(clippy::too_many_arguments)]
fn missed_shot(
    teams: &mut [TeamState; 2],
    shooter: PlayerRef,
    defender: PlayerRef,
    shot: ShotInfo,
    situation: &Situation,
    tempo: Tempo,
    cfg: &EngineConfig,
    rng: &mut SimRng,
) -> Result<PossessionResult, StateViolation> {
    let (o, d) = (shooter.side.index(), defender.side.index());
    let p_foul = foul_probability(
        FoulContext::Normal,
        shot.zone,
        &teams[o].player(shooter.idx).profile,
        &teams[d].player(defender.idx).profile,
        &cfg.foul,
    );

    if rng.chance(p_foul) {
        let flagrant = rng.chance(cfg.foul.flagrant_chance);
        if !review_call(&mut teams[d], situation.period, rng, &cfg.foul) {
            let (attempts, kind) =
                trip_for(&teams[d], shooting_attempts(shot.zone), TripKind::Shooting, &cfg.foul);
            commit_foul(&mut teams[d], defender.idx, flagrant, &cfg.foul);
            if flagrant {
                let trip = shoot_free_throws(teams, shooter, 2, TripKind::Flagrant, rng, &cfg.rebound)?;
                let outcome = PossessionOutcome::FlagrantFoul {
                    shooter,
                    fouler: defender,
                    free_throws: trip,
                };
                return Ok(PossessionResult::new(outcome, shooter.side, tempo));
            }
            let trip = shoot_free_throws(teams, shooter, attempts, kind, rng, &cfg.rebound)?;
            let next = after_trip(&trip);
            let outcome = PossessionOutcome::ShootingFoul {
                shooter,
                fouler: defender,
                shot,
                free_throws: trip,
            };
            return Ok(PossessionResult::new(outcome, next, tempo));
        }
    }

    teams[o].credit_field_goal(shooter.idx, shot.is_three(), false);
    let rebound = resolve_rebound(teams, shooter.side, false, rng, &cfg.rebound)?;
    let outcome = PossessionOutcome::MissedShot {
        shooter,
        defender,
        shot,
        rebound,
    };
    Ok(PossessionResult::new(outcome, rebound.rebounder.side, tempo))
}
