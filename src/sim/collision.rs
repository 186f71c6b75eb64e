//! Collision response between the freed player and the balls
//!
//! Detection is the plain circle overlap in `model::intersects`. Once the
//! player has been knocked loose, every ball it overlaps pushes it away with
//! an exponential cushion and feeds a smoothed spin rate.

use std::f32::consts::E;

use super::model::{Model, intersects};
use super::player::Player;
use crate::consts::*;

/// Cushion factor: 1 at full overlap, decaying with distance
#[inline]
fn cushion(distance: f32, contact: f32) -> f32 {
    E.powf(-distance / contact * E)
}

/// Push the player away from one overlapping ball.
///
/// Only the player is affected. Returns false when the pair does not overlap
/// or the centers coincide, in which case nothing changes.
pub fn repel(player: &mut Player, ball: &impl Model) -> bool {
    if !intersects(&*player, ball) {
        return false;
    }
    let d = player.position() - ball.position();
    let n = d.length();
    if n == 0.0 {
        return false;
    }

    let contact = player.radius() + ball.radius();
    let cushion = cushion(n, contact);
    let e = d / n;
    player.push(e * (SPEED_LIMIT * REPULSION_SCALE * cushion));

    // Tangential part of the relative velocity drives the spin
    let v = player.velocity() - ball.velocity();
    let vh = v - d * (d.dot(v) / (n * n));
    let aw = (vh.length() / cushion).to_degrees();
    let h = d.y * vh.x - d.x * vh.y;
    let sign = if h > 0.0 { -1.0 } else { 1.0 };
    player.w = SPIN_SMOOTHING * player.w + (1.0 - SPIN_SMOOTHING) * aw * sign;
    true
}

/// Apply `repel` for every ball, in order. Returns how many pushed.
pub fn repel_all<'a, M: Model + 'a>(
    player: &mut Player,
    balls: impl IntoIterator<Item = &'a M>,
) -> usize {
    balls
        .into_iter()
        .filter(|ball| repel(player, *ball))
        .count()
}

/// Update balls in order, stopping right after the first one that lands on
/// the player. Balls behind it keep their positions for this tick.
///
/// Returns the index of the fatal ball.
pub fn update_until_hit<M: Model>(player: &Player, balls: &mut [M]) -> Option<usize> {
    for (index, ball) in balls.iter_mut().enumerate() {
        ball.update();
        if intersects(player, &*ball) {
            return Some(index);
        }
    }
    None
}
