//! Balls: the obstacles the player dodges
//!
//! Two kinds share a radius. Revolving balls ride the player's orbit at full
//! speed; bouncing balls cross the disc in straight lines and reflect off
//! the rim.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::model::{Direction, Model, step_transition};
use super::transition::Transition;
use crate::consts::*;
use crate::{angle_add, heading, polar_to_cartesian};

/// Radius of the orbit revolving balls share with the player
const ORBIT_RADIUS: f32 = 1.0 - PLAYER_RADIUS;

/// A ball orbiting at the player's rim distance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevolvingBall {
    /// Orbit angle (degrees)
    pub theta: f32,
    /// Tangential speed (signed)
    pub speed: f32,
    pos: Vec2,
    transition: Option<Transition>,
}

impl RevolvingBall {
    pub fn new(theta: f32, direction: Direction) -> Self {
        Self {
            theta,
            speed: SPEED_LIMIT * direction.rotation(),
            pos: polar_to_cartesian(ORBIT_RADIUS, theta),
            transition: None,
        }
    }
}

impl Model for RevolvingBall {
    fn radius(&self) -> f32 {
        BALL_RADIUS
    }

    fn position(&self) -> Vec2 {
        self.pos
    }

    fn velocity(&self) -> Vec2 {
        let (sin, cos) = self.theta.to_radians().sin_cos();
        Vec2::new(-self.speed * sin, self.speed * cos)
    }

    fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    fn animate_to(&mut self, target: Vec2, ticks: u32) {
        self.transition = Some(Transition::new(self.pos, target, ticks));
    }

    fn update(&mut self) {
        if step_transition(&mut self.transition, &mut self.pos) {
            return;
        }
        self.theta = angle_add(self.theta, (self.speed / ORBIT_RADIUS).to_degrees());
        self.pos = polar_to_cartesian(ORBIT_RADIUS, self.theta);
    }
}

/// A ball travelling in straight lines and reflecting off the rim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BouncingBall {
    /// Heading (degrees)
    pub vector: f32,
    pub speed: f32,
    pos: Vec2,
    transition: Option<Transition>,
}

impl BouncingBall {
    /// Ball on the rim at `theta`, heading along `vector`
    pub fn new(theta: f32, vector: f32) -> Self {
        Self::at(polar_to_cartesian(1.0 - BALL_RADIUS, theta), vector)
    }

    /// Ball at an arbitrary point
    pub fn at(pos: Vec2, vector: f32) -> Self {
        Self {
            vector,
            speed: SPEED_LIMIT,
            pos,
            transition: None,
        }
    }

    fn heading_unit(&self) -> Vec2 {
        let (sin, cos) = self.vector.to_radians().sin_cos();
        Vec2::new(cos, sin)
    }

    /// Bounce off the rim after overshooting it this tick.
    ///
    /// Rolls back along the path to where it crossed the boundary circle,
    /// reflects the heading about the normal there, then spends the rolled
    /// back distance travelling along the new heading.
    fn reflect(&mut self) {
        let limit = 1.0 - BALL_RADIUS;
        let dir = self.heading_unit();
        // |pos + t * dir|^2 = limit^2, take the crossing nearest behind us
        let b = self.pos.dot(dir);
        let c = self.pos.length_squared() - limit * limit;
        let t = -b + (b * b - c).max(0.0).sqrt();
        if t >= 0.0 {
            return;
        }
        self.pos += t * dir;

        let n = self.pos.length_squared();
        if n == 0.0 {
            return;
        }
        let reflected = dir - 2.0 * self.pos.dot(dir) / n * self.pos;
        self.pos -= t * reflected;
        self.vector = heading(reflected);
    }
}

impl Model for BouncingBall {
    fn radius(&self) -> f32 {
        BALL_RADIUS
    }

    fn position(&self) -> Vec2 {
        self.pos
    }

    fn velocity(&self) -> Vec2 {
        self.heading_unit() * self.speed
    }

    fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    fn animate_to(&mut self, target: Vec2, ticks: u32) {
        self.transition = Some(Transition::new(self.pos, target, ticks));
    }

    fn update(&mut self) {
        if step_transition(&mut self.transition, &mut self.pos) {
            return;
        }
        self.pos += self.velocity();
        if self.pos.length() > 1.0 - BALL_RADIUS {
            self.reflect();
        }
    }
}

/// Any ball in play
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Ball {
    Revolving(RevolvingBall),
    Bouncing(BouncingBall),
}

impl Ball {
    pub fn is_bouncing(&self) -> bool {
        matches!(self, Ball::Bouncing(_))
    }

    fn model(&self) -> &dyn Model {
        match self {
            Ball::Revolving(ball) => ball,
            Ball::Bouncing(ball) => ball,
        }
    }

    fn model_mut(&mut self) -> &mut dyn Model {
        match self {
            Ball::Revolving(ball) => ball,
            Ball::Bouncing(ball) => ball,
        }
    }
}

impl Model for Ball {
    fn radius(&self) -> f32 {
        self.model().radius()
    }

    fn position(&self) -> Vec2 {
        self.model().position()
    }

    fn velocity(&self) -> Vec2 {
        self.model().velocity()
    }

    fn transition(&self) -> Option<&Transition> {
        self.model().transition()
    }

    fn animate_to(&mut self, target: Vec2, ticks: u32) {
        self.model_mut().animate_to(target, ticks);
    }

    fn update(&mut self) {
        self.model_mut().update();
    }
}

impl From<RevolvingBall> for Ball {
    fn from(ball: RevolvingBall) -> Self {
        Ball::Revolving(ball)
    }
}

impl From<BouncingBall> for Ball {
    fn from(ball: BouncingBall) -> Self {
        Ball::Bouncing(ball)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f32 = 1e-3;

    #[test]
    fn test_revolving_ball_orbits_at_rim() {
        let mut ball = RevolvingBall::new(BALL_START_THETA, Direction::Clockwise);
        for _ in 0..200 {
            ball.update();
            assert!((ball.position().length() - ORBIT_RADIUS).abs() < 1e-5);
        }
        assert!(ball.theta != BALL_START_THETA);
    }

    #[test]
    fn test_stopped_revolving_ball_holds_position() {
        let mut ball = RevolvingBall::new(BALL_START_THETA, Direction::Stopped);
        ball.update();
        assert_eq!(ball.theta, BALL_START_THETA);
        let pos = ball.position();
        assert!(pos.x.abs() < 1e-6);
        assert!((pos.y + ORBIT_RADIUS).abs() < 1e-6);
    }

    #[test]
    fn test_bouncing_ball_reflects_head_on() {
        // Heading straight out along +x from just inside the rim
        let limit = 1.0 - BALL_RADIUS;
        let mut ball = BouncingBall::at(Vec2::new(limit - 0.01, 0.0), 0.0);
        ball.update();
        // Reflected straight back
        assert!((ball.vector.abs() - 180.0).abs() < 1e-3);
        assert!(ball.position().x <= limit);
        // 0.01 to the wall, the remaining 0.023 back inward
        assert!((ball.position().x - (limit - 0.023)).abs() < 1e-5);
    }

    #[test]
    fn test_bouncing_ball_reflection_is_specular() {
        let limit = 1.0 - BALL_RADIUS;
        // Heading down and to the right at 45 degrees, crossing the rim at the bottom
        let mut ball = BouncingBall::at(Vec2::new(-0.005, -limit + 0.005), -45.0);
        ball.update();
        // Normal at the bottom is vertical: the vertical component flips
        assert!((ball.vector - 45.0).abs() < 0.05, "vector = {}", ball.vector);
        assert!(ball.position().length() <= limit + EPS);
    }

    #[test]
    fn test_bouncing_ball_speed_is_constant() {
        let mut ball = BouncingBall::new(30.0, -150.0);
        for _ in 0..500 {
            ball.update();
            assert!((ball.velocity().length() - SPEED_LIMIT).abs() < 1e-6);
        }
    }

    #[test]
    fn test_ball_enum_delegates() {
        let mut ball: Ball = RevolvingBall::new(0.0, Direction::Clockwise).into();
        assert!(!ball.is_bouncing());
        assert_eq!(ball.radius(), BALL_RADIUS);
        ball.animate_to(Vec2::ZERO, 1);
        assert!(ball.is_animating());
        ball.update();
        assert_eq!(ball.position(), Vec2::ZERO);
        assert!(!ball.is_animating());
    }

    #[test]
    fn test_bouncing_ball_stays_inside_for_long_runs() {
        let limit = 1.0 - BALL_RADIUS;
        for (theta, vector) in [(0.0, 181.0), (45.0, -120.0), (-90.0, 95.0), (170.0, -12.0)] {
            let mut ball = BouncingBall::new(theta, vector);
            for tick in 0..10_000 {
                ball.update();
                let r = ball.position().length();
                assert!(r <= limit + EPS, "escaped at tick {tick}: r = {r}");
            }
        }
    }

    proptest! {
        #[test]
        fn bouncing_ball_never_escapes(theta in -180.0f32..180.0, vector in -180.0f32..180.0) {
            let limit = 1.0 - BALL_RADIUS;
            let mut ball = BouncingBall::new(theta, vector);
            for _ in 0..2_000 {
                ball.update();
                prop_assert!(ball.position().length() <= limit + EPS);
            }
        }
    }
}
