//! Soft separation between overlapping player bodies.
//!
//! Pushes are computed from a snapshot of every body before anyone moves,
//! so the result does not depend on roster order.

use crate::config::SimConfig;
use crate::math::{Fixed, Vec2Fixed};
use crate::team::Team;

/// A body as seen by the separation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Body {
    /// Centre.
    pub position: Vec2Fixed,
    /// Radius.
    pub radius: Fixed,
}

/// Accumulated push direction on `bodies[index]`, or `None` if it does not
/// overlap anyone.
///
/// Each overlapping neighbour contributes its away-direction weighted by
/// `(min_distance - distance) / min_distance`. Coincident bodies are split
/// vertically by index order.
#[must_use]
pub fn separation_push(index: usize, bodies: &[Body], margin: Fixed) -> Option<Vec2Fixed> {
    let me = bodies.get(index)?;
    let mut push = Vec2Fixed::ZERO;
    let mut overlapping = false;

    for (j, other) in bodies.iter().enumerate() {
        if j == index {
            continue;
        }
        let min_distance = me.radius + other.radius + margin;
        let offset = me.position - other.position;
        let distance = offset.length();
        if distance >= min_distance {
            continue;
        }
        overlapping = true;
        if distance == Fixed::ZERO {
            let dir = if index < j { -Fixed::ONE } else { Fixed::ONE };
            push += Vec2Fixed::new(Fixed::ZERO, dir);
        } else {
            let strength = (min_distance - distance) / min_distance;
            push += offset.scale(strength / distance);
        }
    }

    if overlapping && !push.is_zero() {
        Some(push)
    } else {
        None
    }
}

/// Push every overlapping player apart.
///
/// Each pushed player moves `speed * separation_speed_factor` along its
/// normalized push, clamped to the pitch. Stamina is untouched.
pub fn separate_players(teams: &mut [Team; 2], config: &SimConfig) {
    let bodies: Vec<Body> = teams
        .iter()
        .flat_map(|t| t.players.iter())
        .map(|p| Body {
            position: p.position(),
            radius: p.radius,
        })
        .collect();

    let margin = config.player.separation_margin;
    let factor = config.player.separation_speed_factor;
    let mut index = 0;
    for team in teams.iter_mut() {
        for player in &mut team.players {
            if let Some(push) = separation_push(index, &bodies, margin) {
                let step = push.normalize().scale(player.speed() * factor);
                let target = player.position() + step;
                player.place(target, config);
            }
            index += 1;
        }
    }
}
