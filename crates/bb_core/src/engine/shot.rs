//! Shot selection & make-percentage model
//!
//! Distance comes from the shooter's archetype, the zone and kind follow
//! from distance (plus a style roll at the rim), and the make percentage is
//! the base curve with a fixed sequence of adjustments applied on top.
//!
//! ## Draw order
//! 1. band draw (`range(1, 100)`, skipped by interior shooters)
//! 2. distance draw inside the band
//! 3. pull-in draw (balanced and mid-range shooters, long twos only),
//!    followed by the replacement distance when it hits
//! 4. style draw (rim shots only)
//!
//! The density swing and the make roll are drawn by the possession
//! resolver after the block check.

use crate::config::{DensityConfig, ShotConfig};
use crate::models::{Player, ShotArchetype, ShotInfo, ShotKind, ShotZone};
use crate::rng::SimRng;

/// Distance band of the first draw: close, mid-range or three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    Close,
    Mid,
    Three,
}

/// Cumulative band cut-offs in percent (close, mid); the rest is threes.
fn band_cutoffs(archetype: ShotArchetype) -> (i32, i32) {
    match archetype {
        ShotArchetype::Balanced => (35, 65),
        ShotArchetype::Interior => (100, 100),
        ShotArchetype::MidRange => (25, 80),
        ShotArchetype::InsideOutside => (45, 55),
        ShotArchetype::Perimeter => (20, 40),
    }
}

/// Deepest three an archetype takes, in feet past the line.
fn three_depth(archetype: ShotArchetype) -> u8 {
    match archetype {
        ShotArchetype::Perimeter => 6,
        ShotArchetype::InsideOutside => 5,
        ShotArchetype::MidRange => 3,
        _ => 4,
    }
}

pub fn draw_distance(archetype: ShotArchetype, rng: &mut SimRng, cfg: &ShotConfig) -> u8 {
    let paint = cfg.paint_distance as i32;
    let three = cfg.three_point_distance as i32;

    if archetype == ShotArchetype::Interior {
        let d = rng.range(0, paint + 4);
        return d.clamp(0, three - 1) as u8;
    }

    let (close_cut, mid_cut) = band_cutoffs(archetype);
    let roll = rng.range(1, 100);
    let band = if roll <= close_cut {
        Band::Close
    } else if roll <= mid_cut {
        Band::Mid
    } else {
        Band::Three
    };

    let mut d = match band {
        Band::Close => rng.range(0, paint),
        Band::Mid => rng.range(paint + 1, three - 1),
        Band::Three => rng.range(three, three + three_depth(archetype) as i32),
    };

    // Long twos get pulled in.
    if band == Band::Mid && d >= three - 5 {
        match archetype {
            ShotArchetype::Balanced if rng.chance(cfg.balanced_pull_in) => {
                d = rng.range(cfg.rim_distance as i32 + 1, paint);
            }
            ShotArchetype::MidRange if rng.chance(cfg.midrange_pull_in) => {
                d = rng.range(paint + 4, paint + 8);
            }
            _ => {}
        }
    }

    d.clamp(0, cfg.max_distance as i32) as u8
}

pub fn zone_for(distance: u8, cfg: &ShotConfig) -> ShotZone {
    if distance <= cfg.rim_distance {
        ShotZone::Rim
    } else if distance <= cfg.paint_distance {
        ShotZone::Paint
    } else if distance < cfg.three_point_distance {
        ShotZone::MidRange
    } else {
        ShotZone::Three
    }
}

/// Dunk or layup at the rim (one style draw), jumper everywhere else.
pub fn shot_kind(zone: ShotZone, shooter: &Player, rng: &mut SimRng, cfg: &ShotConfig) -> ShotKind {
    if zone != ShotZone::Rim {
        return ShotKind::Jumper;
    }
    let r = shooter.ratings();
    let share = cfg.dunk_share.lookup(r.standing_dunk.max(r.driving_dunk));
    if rng.chance(share) {
        ShotKind::Dunk
    } else {
        ShotKind::Layup
    }
}

/// Piecewise base curve in percent.
pub fn base_percentage(distance: u8, cfg: &ShotConfig) -> f64 {
    let d = distance as f64;
    if distance <= cfg.rim_distance {
        cfg.close_base - cfg.close_offset * d
    } else if distance < cfg.three_point_distance {
        let past_rim = d - (cfg.rim_distance as f64 + 1.0);
        cfg.linear_base - cfg.linear_slope * past_rim
    } else {
        let past_line = d - cfg.three_point_distance as f64;
        cfg.three_base - cfg.three_falloff * past_line * past_line
    }
}

/// Open (+), crowded (-) or neutral look. One `range(1, 100)` draw.
pub fn density_swing(rng: &mut SimRng, density: &DensityConfig) -> f64 {
    let roll = rng.range(1, 100);
    if roll <= density.easy_pct as i32 {
        density.swing
    } else if roll > 100 - density.hard_pct as i32 {
        -density.swing
    } else {
        0.0
    }
}

/// `max * (2 / (1 + e^(-diff / scale)) - 1)`: odd, bounded by `±max`.
pub fn athleticism_adjustment(diff: f64, cfg: &ShotConfig) -> f64 {
    let scale = cfg.athleticism_scale.max(f64::EPSILON);
    cfg.athleticism_max * (2.0 / (1.0 + (-diff / scale).exp()) - 1.0)
}

/// Everything besides the shot itself that moves the make percentage.
#[derive(Debug, Clone, Copy)]
pub struct ShotSituation<'a> {
    pub shooter: &'a Player,
    pub defender: &'a Player,
    /// Teammates on the floor at or above the playmaker threshold.
    pub playmakers: usize,
    pub clutch: bool,
    pub density_swing: f64,
}

/// Final make percentage in `[min_pct, max_pct]`.
pub fn make_percentage(
    distance: u8,
    zone: ShotZone,
    kind: ShotKind,
    situation: &ShotSituation<'_>,
    cfg: &ShotConfig,
) -> f64 {
    let off = situation.shooter.ratings();
    let def = situation.defender.ratings();
    let pivot = cfg.rating_pivot;
    let mut pct = base_percentage(distance, cfg);

    // Shot type
    if kind == ShotKind::Dunk {
        pct *= cfg.dunk_scale;
    }
    pct += match (zone, kind) {
        (ShotZone::Rim, ShotKind::Dunk) => {
            (off.standing_dunk.max(off.driving_dunk) as f64 - pivot) * cfg.dunk_rating_weight
        }
        (ShotZone::Rim, _) => (off.layup as f64 - pivot) * cfg.layup_rating_weight,
        (ShotZone::Paint, _) => (off.inside as f64 - pivot) * cfg.inside_rating_weight,
        (ShotZone::MidRange, _) => (off.mid as f64 - pivot) * cfg.mid_rating_weight,
        (ShotZone::Three, _) => (off.three as f64 - pivot) * cfg.three_rating_weight,
    };

    // Defender
    let guard = if zone.is_interior() {
        def.interior_defense
    } else {
        def.perimeter_defense
    };
    pct -= (guard as f64 - pivot) * cfg.defense_weight;

    pct += situation.density_swing;

    // Consistency, each side capped
    let cap = cfg.consistency_cap;
    pct += ((off.off_consistency as f64 - pivot) * cfg.consistency_weight).clamp(-cap, cap);
    pct -= ((def.def_consistency as f64 - pivot) * cfg.consistency_weight).clamp(-cap, cap);

    let diff = off.athleticism as f64 - def.athleticism as f64;
    pct += athleticism_adjustment(diff, cfg) * cfg.athleticism_weights.get(zone);

    if situation.clutch {
        let steadiness = off.off_consistency as f64 / 100.0;
        pct *= 1.0 - cfg.clutch_max_penalty * (1.0 - steadiness);
    }

    pct += cfg.playmaker_bonus[situation.playmakers.min(2)];

    if situation.shooter.profile.is_star {
        pct -= cfg.star_penalty;
    }

    pct.clamp(cfg.min_pct, cfg.max_pct)
}

/// Distance, zone and kind for a shot; `make_pct` is filled in later.
pub fn select_shot(shooter: &Player, rng: &mut SimRng, cfg: &ShotConfig) -> ShotInfo {
    let distance = draw_distance(shooter.profile.archetype, rng, cfg);
    let zone = zone_for(distance, cfg);
    let kind = shot_kind(zone, shooter, rng, cfg);
    ShotInfo {
        distance,
        zone,
        kind,
        make_pct: 0.0,
    }
}
