//! Substitution & fatigue policy
//!
//! Runs between possessions, once per team. Forced removals always go
//! first and may empty a slot; everything after that is voluntary and fails
//! closed when nobody suitable is on the bench.
//!
//! ## Phases
//! | Phase          | When                                         | Rule                          |
//! |----------------|----------------------------------------------|-------------------------------|
//! | `OpeningLock`  | first `opening_lock_seconds` of Q1           | nothing voluntary             |
//! | `Overtime`     | any overtime period                          | starters back on              |
//! | `Clutch`       | last quarter, late, close                    | starters back on              |
//! | `GarbageTime`  | last quarter, blowout                        | one draw, deep bench rotation |
//! | `Normal`       | otherwise                                    | one priority sub + returns    |

use serde::{Deserialize, Serialize};

use super::fatigue::{stint_cap, target_minutes};
use super::Situation;
use crate::config::{ClockConfig, EngineConfig, RotationConfig};
use crate::models::{Player, Position, RotationTier, TeamSide, TeamState};
use crate::rng::SimRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    OpeningLock,
    Normal,
    Clutch,
    GarbageTime,
    Overtime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubReason {
    FoulOut,
    Ejection,
    Injury,
    /// An empty slot filled once someone became available again.
    Vacancy,
    FoulTrouble,
    Fatigue,
    MinutesCap,
    ColdShooting,
    Clutch,
    GarbageTime,
    Overtime,
    StarterReturn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub side: TeamSide,
    pub slot: Position,
    pub outgoing: Option<usize>,
    pub incoming: Option<usize>,
    pub reason: SubReason,
}

pub fn phase(
    situation: &Situation,
    margin: u16,
    clock: &ClockConfig,
    cfg: &RotationConfig,
) -> Phase {
    let last_quarter = situation.period == clock.quarters;
    if situation.period > clock.quarters {
        Phase::Overtime
    } else if last_quarter && situation.clock <= cfg.clutch_window_seconds && margin <= cfg.clutch_margin {
        Phase::Clutch
    } else if last_quarter && margin >= cfg.garbage_margin {
        Phase::GarbageTime
    } else if situation.period == 1 && situation.elapsed(clock) < cfg.opening_lock_seconds {
        Phase::OpeningLock
    } else {
        Phase::Normal
    }
}

/// Foul count that sends a player to the bench this period.
pub fn in_foul_trouble(player: &Player, period: u8, cfg: &RotationConfig) -> bool {
    let q = (period.clamp(1, 4) - 1) as usize;
    player.line.fouls >= u16::from(cfg.foul_trouble[q])
}

fn can_enter(player: &Player) -> bool {
    player.is_available() && !player.status.injured
}

/// Replacement search for `slot`: same-position bench, then the starter,
/// then deep bench, then anyone eligible in neighbor-role order.
pub fn find_replacement(
    team: &TeamState,
    slot: Position,
    accept: impl Fn(&Player) -> bool,
) -> Option<usize> {
    let chart = &team.depth[slot.index()];
    let same_position = chart
        .bench
        .iter()
        .chain(std::iter::once(&chart.starter))
        .chain(chart.deep.iter())
        .copied();
    let others = slot.neighbors().into_iter().flat_map(|pos| {
        let c = &team.depth[pos.index()];
        c.bench
            .iter()
            .chain(std::iter::once(&c.starter))
            .chain(c.deep.iter())
            .copied()
            .collect::<Vec<_>>()
    });
    same_position.chain(others).find(|idx| {
        let p = team.player(*idx);
        can_enter(p) && accept(p)
    })
}

fn swap(team: &mut TeamState, side: TeamSide, slot: Position, incoming: Option<usize>, reason: SubReason) -> Substitution {
    let outgoing = team.set_slot(slot, incoming);
    log::debug!(
        "{} sub at {}: {:?} -> {:?} ({:?})",
        team.name,
        slot,
        outgoing.map(|i| team.player(i).name().to_string()),
        incoming.map(|i| team.player(i).name().to_string()),
        reason
    );
    Substitution {
        side,
        slot,
        outgoing,
        incoming,
        reason,
    }
}

/// Mandatory removals: foul-outs and ejections leave even without a
/// replacement; injured players only leave when someone can take over.
pub fn forced_removals(team: &mut TeamState, side: TeamSide) -> Vec<Substitution> {
    let mut subs = Vec::new();
    for slot in Position::ALL {
        let Some(idx) = team.at(slot) else {
            if let Some(fill) = find_replacement(team, slot, |_| true) {
                subs.push(swap(team, side, slot, Some(fill), SubReason::Vacancy));
            }
            continue;
        };
        let status = team.player(idx).status.clone();
        if status.ejected || status.fouled_out {
            let reason = if status.ejected {
                SubReason::Ejection
            } else {
                SubReason::FoulOut
            };
            let replacement = find_replacement(team, slot, |_| true);
            if replacement.is_none() {
                log::debug!("{} plays short at {}", team.name, slot);
            }
            subs.push(swap(team, side, slot, replacement, reason));
        } else if status.injured {
            match find_replacement(team, slot, |_| true) {
                Some(replacement) => {
                    team.player_mut(idx).status.eligible = false;
                    subs.push(swap(team, side, slot, Some(replacement), SubReason::Injury));
                }
                None => log::debug!("{} has no cover for injured {}", team.name, team.player(idx).name()),
            }
        }
    }
    subs
}

/// Voluntary policy for one team. `margin` is the absolute score gap.
pub fn apply_policy(
    team: &mut TeamState,
    side: TeamSide,
    situation: &Situation,
    margin: u16,
    cfg: &EngineConfig,
    rng: &mut SimRng,
) -> Vec<Substitution> {
    match phase(situation, margin, &cfg.clock, &cfg.rotation) {
        Phase::OpeningLock => Vec::new(),
        Phase::Overtime => force_starters(team, side, SubReason::Overtime),
        Phase::Clutch => force_starters(team, side, SubReason::Clutch),
        Phase::GarbageTime => garbage_rotation(team, side, &cfg.rotation, rng)
            .into_iter()
            .collect(),
        Phase::Normal => {
            let close = situation.period > cfg.clock.quarters / 2
                && margin <= cfg.rotation.close_game_margin;
            let mut subs: Vec<Substitution> =
                priority_check(team, side, situation.period, close, &cfg.rotation)
                    .into_iter()
                    .collect();
            subs.extend(starter_returns(team, side, situation.period, close, &cfg.rotation));
            subs
        }
    }
}

fn force_starters(team: &mut TeamState, side: TeamSide, reason: SubReason) -> Vec<Substitution> {
    let mut subs = Vec::new();
    for slot in Position::ALL {
        let starter = team.starter(slot);
        if team.at(slot) == Some(starter) || !can_enter(team.player(starter)) {
            continue;
        }
        subs.push(swap(team, side, slot, Some(starter), reason));
    }
    subs
}

fn garbage_rotation(
    team: &mut TeamState,
    side: TeamSide,
    cfg: &RotationConfig,
    rng: &mut SimRng,
) -> Option<Substitution> {
    if !rng.chance(cfg.garbage_rotation_chance) {
        return None;
    }
    for slot in Position::ALL {
        let Some(current) = team.at(slot) else {
            continue;
        };
        if team.player(current).profile.tier == RotationTier::DeepBench {
            continue;
        }
        let deep = team.depth[slot.index()]
            .deep
            .iter()
            .copied()
            .find(|idx| can_enter(team.player(*idx)));
        if let Some(incoming) = deep {
            return Some(swap(team, side, slot, Some(incoming), SubReason::GarbageTime));
        }
    }
    None
}

/// Highest-priority reason this player should sit, lowest rank first.
fn sit_reason(player: &Player, period: u8, close: bool, cfg: &RotationConfig) -> Option<SubReason> {
    if in_foul_trouble(player, period, cfg) {
        return Some(SubReason::FoulTrouble);
    }
    if player.status.stint_seconds >= stint_cap(player, close, cfg) {
        return Some(SubReason::Fatigue);
    }
    if player.line.seconds_played as f64 >= target_minutes(player, close, cfg) * 60.0 {
        return Some(SubReason::MinutesCap);
    }
    let line = &player.line;
    if line.fga >= cfg.cold_min_attempts && line.fg_pct().is_some_and(|pct| pct < cfg.cold_fg_pct) {
        return Some(SubReason::ColdShooting);
    }
    None
}

fn rank(reason: SubReason) -> u8 {
    match reason {
        SubReason::FoulTrouble => 0,
        SubReason::Fatigue => 1,
        SubReason::MinutesCap => 2,
        _ => 3,
    }
}

/// One substitution for the single highest-priority player, if anyone
/// fresh can replace them.
fn priority_check(
    team: &mut TeamState,
    side: TeamSide,
    period: u8,
    close: bool,
    cfg: &RotationConfig,
) -> Option<Substitution> {
    let (slot, reason) = Position::ALL
        .into_iter()
        .filter_map(|slot| {
            let idx = team.at(slot)?;
            sit_reason(team.player(idx), period, close, cfg).map(|r| (slot, r))
        })
        .min_by_key(|(slot, r)| (rank(*r), slot.index()))?;

    let fresh = |p: &Player| {
        !in_foul_trouble(p, period, cfg)
            && (p.line.seconds_played as f64) < target_minutes(p, close, cfg) * 60.0
    };
    let incoming = find_replacement(team, slot, fresh)?;
    Some(swap(team, side, slot, Some(incoming), reason))
}

/// Rested, foul-safe starters with minutes left go back to their slot.
fn starter_returns(
    team: &mut TeamState,
    side: TeamSide,
    period: u8,
    close: bool,
    cfg: &RotationConfig,
) -> Vec<Substitution> {
    let mut subs = Vec::new();
    for slot in Position::ALL {
        let starter = team.starter(slot);
        let p = team.player(starter);
        if !can_enter(p)
            || p.status.bench_seconds < cfg.starter_rest_seconds
            || in_foul_trouble(p, period, cfg)
            || p.line.seconds_played as f64 >= target_minutes(p, close, cfg) * 60.0
        {
            continue;
        }
        let occupant_is_starter = team
            .at(slot)
            .is_some_and(|idx| team.player(idx).profile.tier == RotationTier::Starter);
        if occupant_is_starter {
            continue;
        }
        subs.push(swap(team, side, slot, Some(starter), SubReason::StarterReturn));
    }
    subs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::team::tests::balanced_roster;
    use crate::models::GameKind;

    fn team() -> TeamState {
        TeamState::from_roster(&balanced_roster("Wolves"), 88).unwrap()
    }

    fn at(period: u8, clock: u32) -> Situation {
        Situation {
            period,
            clock,
            kind: GameKind::Regular,
        }
    }

    #[test]
    fn test_phases() {
        let cfg = EngineConfig::default();
        let p = |s: Situation, m: u16| phase(&s, m, &cfg.clock, &cfg.rotation);
        assert_eq!(p(at(1, 700), 0), Phase::OpeningLock);
        assert_eq!(p(at(1, 400), 0), Phase::Normal);
        assert_eq!(p(at(4, 200), 6), Phase::Clutch);
        assert_eq!(p(at(4, 200), 25), Phase::GarbageTime);
        assert_eq!(p(at(4, 600), 25), Phase::GarbageTime);
        assert_eq!(p(at(4, 600), 6), Phase::Normal);
        assert_eq!(p(at(5, 300), 0), Phase::Overtime);
        assert_eq!(p(at(3, 100), 30), Phase::Normal);
    }

    #[test]
    fn test_foul_out_is_removed_even_without_cover() {
        let mut t = team();
        let pg = t.at(Position::PG).unwrap();
        t.player_mut(pg).status.fouled_out = true;
        t.player_mut(pg).status.eligible = false;
        let subs = forced_removals(&mut t, TeamSide::Home);
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].reason, SubReason::FoulOut);
        assert_eq!(subs[0].incoming, Some(t.depth[0].bench[0]));
        assert!(!t.player(pg).status.on_court);

        // Everybody else gone: the slot stays empty
        for p in t.roster.iter_mut() {
            if !p.status.on_court {
                p.status.eligible = false;
            }
        }
        let sg = t.at(Position::SG).unwrap();
        t.player_mut(sg).status.ejected = true;
        t.player_mut(sg).status.eligible = false;
        let subs = forced_removals(&mut t, TeamSide::Home);
        assert_eq!(subs[0].reason, SubReason::Ejection);
        assert_eq!(t.at(Position::SG), None);
        assert_eq!(t.lineup_len(), 4);
        assert!(t.verify_court().is_ok());
    }

    #[test]
    fn test_injured_player_stays_without_cover() {
        let mut t = team();
        for p in t.roster.iter_mut() {
            if !p.status.on_court {
                p.status.eligible = false;
            }
        }
        let c = t.at(Position::C).unwrap();
        t.player_mut(c).status.injured = true;
        assert!(forced_removals(&mut t, TeamSide::Away).is_empty());
        assert_eq!(t.at(Position::C), Some(c));
        assert!(t.player(c).status.eligible);
    }

    #[test]
    fn test_injured_starter_is_replaced_for_good() {
        let mut t = team();
        let cfg = EngineConfig::default();
        let c = t.at(Position::C).unwrap();
        let bench = t.depth[Position::C.index()].bench[0];
        t.player_mut(c).status.injured = true;

        let subs = forced_removals(&mut t, TeamSide::Home);
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].reason, SubReason::Injury);
        assert_eq!(subs[0].outgoing, Some(c));
        assert_eq!(subs[0].incoming, Some(bench));
        assert_eq!(t.at(Position::C), Some(bench));
        assert!(!t.player(c).status.on_court);
        assert!(!t.player(c).status.eligible);

        // Fully rested, still never comes back
        t.player_mut(c).status.bench_seconds = 10_000;
        let returns = starter_returns(&mut t, TeamSide::Home, 2, false, &cfg.rotation);
        assert!(returns.iter().all(|s| s.incoming != Some(c)));
        let clutch = force_starters(&mut t, TeamSide::Home, SubReason::Clutch);
        assert!(clutch.iter().all(|s| s.incoming != Some(c)));
        assert!(!t.player(c).status.on_court);
        assert!(t.verify_court().is_ok());
    }

    #[test]
    fn test_replacement_chain() {
        let mut t = team();
        let slot = Position::SF;
        let bench = t.depth[slot.index()].bench[0];
        let deep = t.depth[slot.index()].deep[0];
        assert_eq!(find_replacement(&t, slot, |_| true), Some(bench));
        t.player_mut(bench).status.eligible = false;
        // starter is on the floor, so deep bench is next
        assert_eq!(find_replacement(&t, slot, |_| true), Some(deep));
        t.player_mut(deep).status.eligible = false;
        let other = find_replacement(&t, slot, |_| true).unwrap();
        assert_eq!(t.player(other).profile.position, Position::SG);
    }

    #[test]
    fn test_opening_lock_blocks_voluntary_subs() {
        let mut t = team();
        let cfg = EngineConfig::default();
        let mut rng = SimRng::new(1);
        let pg = t.at(Position::PG).unwrap();
        t.player_mut(pg).line.fouls = 3;
        assert!(apply_policy(&mut t, TeamSide::Home, &at(1, 600), 0, &cfg, &mut rng).is_empty());
        let subs = apply_policy(&mut t, TeamSide::Home, &at(1, 400), 0, &cfg, &mut rng);
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].reason, SubReason::FoulTrouble);
        assert_eq!(subs[0].outgoing, Some(pg));
    }

    #[test]
    fn test_one_priority_sub_per_check() {
        let mut t = team();
        let cfg = EngineConfig::default();
        let mut rng = SimRng::new(1);
        let sg = t.at(Position::SG).unwrap();
        let c = t.at(Position::C).unwrap();
        t.player_mut(c).status.stint_seconds = 1000;
        t.player_mut(sg).line.fouls = 3;
        let subs = apply_policy(&mut t, TeamSide::Home, &at(2, 400), 0, &cfg, &mut rng);
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].reason, SubReason::FoulTrouble);
        assert_eq!(subs[0].slot, Position::SG);
        assert_eq!(t.at(Position::C), Some(c));

        let subs = apply_policy(&mut t, TeamSide::Home, &at(2, 380), 0, &cfg, &mut rng);
        assert_eq!(subs[0].reason, SubReason::Fatigue);
        assert_eq!(subs[0].outgoing, Some(c));
    }

    #[test]
    fn test_clutch_and_overtime_force_starters() {
        let cfg = EngineConfig::default();
        let mut rng = SimRng::new(1);
        for (situation, reason) in [(at(4, 120), SubReason::Clutch), (at(5, 250), SubReason::Overtime)] {
            let mut t = team();
            let bench = t.depth[Position::PF.index()].bench[0];
            t.set_slot(Position::PF, Some(bench));
            let subs = apply_policy(&mut t, TeamSide::Away, &situation, 3, &cfg, &mut rng);
            assert_eq!(subs.len(), 1);
            assert_eq!(subs[0].reason, reason);
            assert_eq!(t.at(Position::PF), Some(t.starter(Position::PF)));
        }
    }

    #[test]
    fn test_garbage_time_rotates_deep_bench() {
        let mut cfg = EngineConfig::default();
        cfg.rotation.garbage_rotation_chance = 1.0;
        let mut t = team();
        let mut rng = SimRng::new(1);
        let subs = apply_policy(&mut t, TeamSide::Away, &at(4, 500), 30, &cfg, &mut rng);
        assert_eq!(subs.len(), 1);
        let incoming = subs[0].incoming.unwrap();
        assert_eq!(t.player(incoming).profile.tier, RotationTier::DeepBench);
        assert_eq!(rng.draws(), 1);
    }

    #[test]
    fn test_rested_starter_returns() {
        let mut t = team();
        let cfg = EngineConfig::default();
        let mut rng = SimRng::new(1);
        let starter = t.starter(Position::PG);
        let bench = t.depth[0].bench[0];
        t.set_slot(Position::PG, Some(bench));
        t.player_mut(starter).status.bench_seconds = 100;
        assert!(apply_policy(&mut t, TeamSide::Away, &at(2, 500), 0, &cfg, &mut rng).is_empty());
        t.player_mut(starter).status.bench_seconds = 200;
        let subs = apply_policy(&mut t, TeamSide::Away, &at(2, 450), 0, &cfg, &mut rng);
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].reason, SubReason::StarterReturn);
        assert_eq!(t.at(Position::PG), Some(starter));
    }
}
