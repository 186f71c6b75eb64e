//! The player: a disc riding the rim
//!
//! While orbiting, position is derived from `theta` and `height`. After a
//! fatal hit the player is switched to free mode and moves as a plain body
//! driven by its stored velocity.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::model::{Direction, Model, step_transition};
use super::transition::Transition;
use crate::consts::*;
use crate::{angle_add, polar_to_cartesian};

/// Vertical motion state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JumpState {
    #[default]
    Landed,
    Jumping,
    Falling,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Orbit angle (degrees)
    pub theta: f32,
    /// Tangential speed along the rim (signed)
    pub speed: f32,
    pub direction: Direction,
    /// Jump button held
    pub jumping: bool,
    pub jump: JumpState,
    pub vertical_speed: f32,
    /// Radial offset inward from the rim
    pub height: f32,
    /// Render angle (degrees)
    pub angle: f32,
    /// Cosmetic spin rate in free mode (degrees per tick)
    pub w: f32,
    free: bool,
    pos: Vec2,
    vel: Vec2,
    transition: Option<Transition>,
}

impl Default for Player {
    fn default() -> Self {
        let mut player = Self {
            theta: PLAYER_START_THETA,
            speed: 0.0,
            direction: Direction::Stopped,
            jumping: false,
            jump: JumpState::Landed,
            vertical_speed: 0.0,
            height: 0.0,
            angle: PLAYER_START_THETA,
            w: 0.0,
            free: false,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            transition: None,
        };
        player.pos = player.orbit_position();
        player
    }
}

impl Player {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all motion state for a new run heading in `direction`
    pub fn initialize(&mut self, direction: Direction) {
        *self = Self {
            direction,
            ..Self::default()
        };
    }

    pub fn is_free(&self) -> bool {
        self.free
    }

    /// Switch between orbit-derived and free-body motion.
    ///
    /// Entering free mode converts the current orbital motion into a
    /// velocity so no momentum is lost at the hand-off.
    pub fn set_free(&mut self, free: bool) {
        if self.free == free {
            return;
        }
        if free {
            self.pos = self.position();
            self.vel = self.orbit_velocity();
            self.angle = self.theta;
        }
        self.free = free;
    }

    /// Flip between the two rotating directions
    pub fn turn(&mut self) {
        self.direction = self.direction.reversed();
    }

    /// Add an impulse to the free-body velocity
    pub fn push(&mut self, dv: Vec2) {
        self.vel += dv;
    }

    fn orbit_position(&self) -> Vec2 {
        polar_to_cartesian(1.0 - PLAYER_RADIUS - self.height, self.theta)
    }

    fn orbit_velocity(&self) -> Vec2 {
        let theta = self.theta.to_radians();
        let (sin, cos) = theta.sin_cos();
        Vec2::new(
            -self.speed * sin - self.vertical_speed * cos,
            self.speed * cos - self.vertical_speed * sin,
        )
    }

    fn update_orbit(&mut self) {
        self.speed = (self.speed + PLAYER_ACCEL * self.direction.rotation())
            .clamp(-SPEED_LIMIT, SPEED_LIMIT);
        self.theta = angle_add(
            self.theta,
            (self.speed / (1.0 - PLAYER_RADIUS)).to_degrees(),
        );

        match self.jump {
            JumpState::Landed => {
                if self.jumping {
                    self.jump = JumpState::Jumping;
                }
            }
            JumpState::Jumping => {
                self.vertical_speed = JUMP_SPEED;
                self.height += self.vertical_speed;
                if !self.jumping {
                    self.jump = JumpState::Falling;
                }
            }
            JumpState::Falling => {
                self.vertical_speed -= GRAVITY;
                self.height += self.vertical_speed;
            }
        }

        // Crossed to the opposite rim
        let ceiling = 1.0 - PLAYER_RADIUS;
        if self.height > ceiling {
            self.theta = angle_add(self.theta, 180.0);
            self.height = 2.0 * ceiling - self.height;
            self.vertical_speed = -self.vertical_speed;
            self.jump = JumpState::Falling;
        }
        if self.height < 0.0 {
            self.height = 0.0;
            self.vertical_speed = 0.0;
            self.jump = JumpState::Landed;
        }

        self.angle = self.theta;
    }

    fn update_free(&mut self) {
        self.pos += self.vel;
        self.angle = angle_add(self.angle, self.w);
    }
}

impl Model for Player {
    fn radius(&self) -> f32 {
        PLAYER_RADIUS
    }

    fn position(&self) -> Vec2 {
        if self.free || self.transition.is_some() {
            self.pos
        } else {
            self.orbit_position()
        }
    }

    fn velocity(&self) -> Vec2 {
        if self.free { self.vel } else { self.orbit_velocity() }
    }

    fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    fn animate_to(&mut self, target: Vec2, ticks: u32) {
        self.pos = self.position();
        self.transition = Some(Transition::new(self.pos, target, ticks));
    }

    fn update(&mut self) {
        if step_transition(&mut self.transition, &mut self.pos) {
            return;
        }
        if self.free {
            self.update_free();
        } else {
            self.update_orbit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_initial_state() {
        let player = Player::new();
        assert_eq!(player.theta, 90.0);
        assert_eq!(player.jump, JumpState::Landed);
        assert!(!player.is_free());
        let pos = player.position();
        assert!(pos.x.abs() < 1e-6);
        assert!((pos.y - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_acceleration_and_rotation_sense() {
        let mut player = Player::new();
        player.initialize(Direction::Clockwise);
        player.update();
        assert_eq!(player.speed, PLAYER_ACCEL);
        assert!(player.theta > 90.0);

        player.initialize(Direction::CounterClockwise);
        player.update();
        assert_eq!(player.speed, -PLAYER_ACCEL);
        assert!(player.theta < 90.0);
    }

    #[test]
    fn test_turn_toggles_rotating_directions() {
        let mut player = Player::new();
        player.initialize(Direction::Clockwise);
        player.turn();
        assert_eq!(player.direction, Direction::CounterClockwise);
        player.turn();
        assert_eq!(player.direction, Direction::Clockwise);

        player.initialize(Direction::Stopped);
        player.turn();
        assert_eq!(player.direction, Direction::Stopped);
    }

    #[test]
    fn test_jump_cycle() {
        let mut player = Player::new();
        player.jumping = true;
        player.update();
        assert_eq!(player.jump, JumpState::Jumping);
        assert_eq!(player.height, 0.0);

        player.update();
        assert_eq!(player.vertical_speed, JUMP_SPEED);
        assert!((player.height - JUMP_SPEED).abs() < 1e-7);

        player.jumping = false;
        player.update();
        assert_eq!(player.jump, JumpState::Falling);

        for _ in 0..100 {
            player.update();
            if player.jump == JumpState::Landed {
                break;
            }
        }
        assert_eq!(player.jump, JumpState::Landed);
        assert_eq!(player.height, 0.0);
        assert_eq!(player.vertical_speed, 0.0);
    }

    #[test]
    fn test_long_jump_flips_to_opposite_rim() {
        let mut player = Player::new();
        player.jumping = true;
        let mut flipped = false;
        for _ in 0..100 {
            player.update();
            if player.jump == JumpState::Falling {
                flipped = true;
                break;
            }
        }
        assert!(flipped);
        // Stationary player: the flip is a pure half turn
        assert_eq!(player.theta, -90.0);
        assert!(player.vertical_speed < 0.0);
        assert!(player.height <= 1.0 - PLAYER_RADIUS);
    }

    #[test]
    fn test_free_mode_conserves_momentum() {
        let mut player = Player::new();
        player.initialize(Direction::Clockwise);
        for _ in 0..10 {
            player.update();
        }
        let before = player.position();
        let orbit_vel = player.velocity();
        player.set_free(true);
        assert_eq!(player.position(), before);
        assert_eq!(player.velocity(), orbit_vel);

        player.update();
        assert_eq!(player.position(), before + orbit_vel);

        player.set_free(false);
        assert!(!player.is_free());
    }

    #[test]
    fn test_animation_overrides_orbit() {
        let mut player = Player::new();
        player.initialize(Direction::Clockwise);
        let target = Vec2::new(0.0, -0.5);
        player.animate_to(target, 2);
        player.update();
        assert_eq!(player.theta, 90.0);
        assert!(player.is_animating());
        player.update();
        assert!(!player.is_animating());
        assert_eq!(player.pos, target);
    }

    proptest! {
        #[test]
        fn speed_never_exceeds_limit(ticks in 1usize..400, clockwise in proptest::bool::ANY) {
            let dir = if clockwise { Direction::Clockwise } else { Direction::CounterClockwise };
            let mut player = Player::new();
            player.initialize(dir);
            for _ in 0..ticks {
                player.update();
                prop_assert!(player.speed.abs() <= SPEED_LIMIT);
            }
        }

        #[test]
        fn height_stays_in_range(script in proptest::collection::vec(proptest::bool::ANY, 1..300)) {
            let mut player = Player::new();
            player.initialize(Direction::Clockwise);
            for hold in script {
                player.jumping = hold;
                player.update();
                prop_assert!(player.height >= 0.0);
                prop_assert!(player.height <= 1.0 - PLAYER_RADIUS);
            }
        }
    }
}
