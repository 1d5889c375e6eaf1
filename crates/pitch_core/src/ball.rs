//! Ball physics: friction, wall bounces, dribble attraction, kicks, passes
//! and goal detection.

use serde::{Deserialize, Serialize};

use crate::config::{FieldConfig, SimConfig};
use crate::math::{fixed_serde, Fixed, Vec2Fixed};
use crate::player::{Player, Side};

/// Direction a kick takes when the ball sits exactly on the kicker.
const KICK_FALLBACK: Vec2Fixed = Vec2Fixed::new(Fixed::ZERO, Fixed::ONE);

/// One of the two goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoalLine {
    /// Goal at small `y`, defended by home.
    Top,
    /// Goal at large `y`, defended by away.
    Bottom,
}

impl GoalLine {
    /// Side credited when the ball enters this goal.
    #[must_use]
    pub const fn scorer(self) -> Side {
        match self {
            Self::Top => Side::Away,
            Self::Bottom => Side::Home,
        }
    }

    /// `y` past which the ball counts as in this goal.
    #[must_use]
    pub fn line_y(self, field: &FieldConfig) -> Fixed {
        match self {
            Self::Top => field.min_y() + field.goal_depth,
            Self::Bottom => field.max_y() - field.goal_depth,
        }
    }

    /// Centre of the goal area, where keepers stand and shots are aimed.
    #[must_use]
    pub fn center(self, field: &FieldConfig) -> Vec2Fixed {
        let half_depth = field.goal_depth / Fixed::from_num(2);
        let y = match self {
            Self::Top => field.min_y() + half_depth,
            Self::Bottom => field.max_y() - half_depth,
        };
        Vec2Fixed::new(field.center().x, y)
    }

    /// Point on the goal line a side aims at in open play.
    #[must_use]
    pub fn target(self, field: &FieldConfig) -> Vec2Fixed {
        Vec2Fixed::new(field.center().x, self.line_y(field))
    }
}

/// The match ball.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ball {
    /// Centre position.
    pub position: Vec2Fixed,
    /// Displacement per tick.
    pub velocity: Vec2Fixed,
    /// Radius.
    #[serde(with = "fixed_serde")]
    pub radius: Fixed,
}

impl Ball {
    /// A stationary ball at `position`.
    #[must_use]
    pub fn new(position: Vec2Fixed, radius: Fixed) -> Self {
        Self {
            position,
            velocity: Vec2Fixed::ZERO,
            radius,
        }
    }

    /// Place the ball at `position` and stop it.
    pub fn reset(&mut self, position: Vec2Fixed) {
        self.position = position;
        self.velocity = Vec2Fixed::ZERO;
    }

    /// Current speed.
    #[must_use]
    pub fn speed(&self) -> Fixed {
        self.velocity.length()
    }

    /// Whether both velocity components are below `epsilon`.
    #[must_use]
    pub fn is_stopped(&self, epsilon: Fixed) -> bool {
        self.velocity.x.abs() < epsilon && self.velocity.y.abs() < epsilon
    }

    /// Whether the centre has left the playable area.
    #[must_use]
    pub fn is_out(&self, field: &FieldConfig) -> bool {
        !field.contains(self.position)
    }

    /// Advance one tick.
    ///
    /// Applies friction, snaps tiny components to zero, pulls the ball
    /// toward the first player in dribble range, integrates, then bounces
    /// off the walls. The top and bottom walls are open across the goal
    /// mouth.
    pub fn update<'a, I>(&mut self, players: I, config: &SimConfig)
    where
        I: IntoIterator<Item = &'a Player>,
    {
        let ball = &config.ball;
        let field = &config.field;

        self.velocity = self.velocity.scale(ball.friction);
        if self.velocity.x.abs() < ball.stop_epsilon {
            self.velocity.x = Fixed::ZERO;
        }
        if self.velocity.y.abs() < ball.stop_epsilon {
            self.velocity.y = Fixed::ZERO;
        }

        let dribble_range = config.dribble_range();
        if let Some(player) = players
            .into_iter()
            .find(|p| p.distance_to(self.position) < dribble_range)
        {
            let toward = player.position() - self.position;
            if !toward.is_zero() {
                let strength =
                    ball.dribble_strength * player.stats.dribbling / ball.dribbling_baseline;
                self.velocity += toward.normalize().scale(strength);
            }
        }

        self.position += self.velocity;

        let r = self.radius;
        if self.position.x - r < field.min_x() {
            self.position.x = field.min_x() + r;
            self.velocity.x = -self.velocity.x * ball.restitution;
        } else if self.position.x + r > field.max_x() {
            self.position.x = field.max_x() - r;
            self.velocity.x = -self.velocity.x * ball.restitution;
        }

        if !field.in_goal_mouth(self.position.x) {
            if self.position.y - r < field.min_y() {
                self.position.y = field.min_y() + r;
                self.velocity.y = -self.velocity.y * ball.restitution;
            } else if self.position.y + r > field.max_y() {
                self.position.y = field.max_y() - r;
                self.velocity.y = -self.velocity.y * ball.restitution;
            }
        }
    }

    /// Kick away from a player at `from` with the given shooting rating.
    ///
    /// Returns `false` when the ball is out of kick range.
    pub fn kick(&mut self, from: Vec2Fixed, shooting: Fixed, config: &SimConfig) -> bool {
        let offset = self.position - from;
        if offset.length() >= config.kick_range() {
            return false;
        }
        let force = config.ball.kick_force * shooting / config.ball.shooting_baseline;
        self.velocity += offset.normalize_or(KICK_FALLBACK).scale(force);
        true
    }

    /// Send the ball toward `target` at pass speed, replacing its velocity.
    ///
    /// Returns `false` when the ball already sits on `target`.
    pub fn pass_to(&mut self, target: Vec2Fixed, config: &SimConfig) -> bool {
        let offset = target - self.position;
        if offset.is_zero() {
            return false;
        }
        self.velocity = offset.normalize().scale(config.ball.pass_speed);
        true
    }

    /// Which goal, if any, the ball is currently inside.
    #[must_use]
    pub fn check_goal(&self, field: &FieldConfig) -> Option<GoalLine> {
        if !field.in_goal_mouth(self.position.x) {
            return None;
        }
        if self.position.y - self.radius < GoalLine::Top.line_y(field) {
            Some(GoalLine::Top)
        } else if self.position.y + self.radius > GoalLine::Bottom.line_y(field) {
            Some(GoalLine::Bottom)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TeamSheet;

    fn ball_at(x: i32, y: i32) -> Ball {
        Ball::new(Vec2Fixed::from_int(x, y), Fixed::from_num(10))
    }

    fn no_players() -> std::iter::Empty<&'static Player> {
        std::iter::empty()
    }

    #[test]
    fn test_friction_slows_ball() {
        let config = SimConfig::default();
        let mut ball = ball_at(400, 300);
        ball.velocity = Vec2Fixed::from_int(10, 0);

        ball.update(no_players(), &config);

        assert_eq!(ball.velocity.x, Fixed::from_num(10) * config.ball.friction);
        assert!(ball.speed() < Fixed::from_num(10));
    }

    #[test]
    fn test_small_velocity_snaps_to_zero() {
        let config = SimConfig::default();
        let mut ball = ball_at(400, 300);
        ball.velocity = Vec2Fixed::new(Fixed::from_num(0.1), Fixed::from_num(3));

        ball.update(no_players(), &config);

        assert_eq!(ball.velocity.x, Fixed::ZERO);
        assert!(ball.velocity.y > Fixed::ZERO);
    }

    #[test]
    fn test_bounces_off_side_wall() {
        let config = SimConfig::default();
        let mut ball = ball_at(745, 300);
        ball.velocity = Vec2Fixed::from_int(10, 0);

        ball.update(no_players(), &config);

        assert_eq!(ball.position.x, Fixed::from_num(740));
        assert!(ball.velocity.x < Fixed::ZERO);
        assert!(ball.velocity.x.abs() < Fixed::from_num(10));
    }

    #[test]
    fn test_goal_mouth_is_open() {
        let config = SimConfig::default();
        let mut ball = ball_at(400, 65);
        ball.velocity = Vec2Fixed::from_int(0, -10);

        ball.update(no_players(), &config);

        assert!(ball.position.y < Fixed::from_num(60));
        assert_eq!(ball.check_goal(&config.field), Some(GoalLine::Top));
    }

    #[test]
    fn test_wall_closed_beside_goal() {
        let config = SimConfig::default();
        let mut ball = ball_at(200, 65);
        ball.velocity = Vec2Fixed::from_int(0, -10);

        ball.update(no_players(), &config);

        assert_eq!(ball.position.y, Fixed::from_num(60));
        assert!(ball.velocity.y > Fixed::ZERO);
    }

    #[test]
    fn test_kick_uses_shooting_rating() {
        let config = SimConfig::default();
        let mut ball = ball_at(400, 330);

        let kicked = ball.kick(Vec2Fixed::from_int(400, 300), Fixed::from_num(8), &config);

        assert!(kicked);
        assert_eq!(ball.velocity, Vec2Fixed::new(Fixed::ZERO, Fixed::from_num(6.5)));
    }

    #[test]
    fn test_kick_out_of_range() {
        let config = SimConfig::default();
        let mut ball = ball_at(400, 355);
        assert!(!ball.kick(Vec2Fixed::from_int(400, 300), Fixed::from_num(8), &config));
        assert!(ball.velocity.is_zero());
    }

    #[test]
    fn test_kick_from_same_point_goes_down() {
        let config = SimConfig::default();
        let mut ball = ball_at(400, 300);
        assert!(ball.kick(Vec2Fixed::from_int(400, 300), Fixed::from_num(8), &config));
        assert_eq!(ball.velocity.x, Fixed::ZERO);
        assert!(ball.velocity.y > Fixed::ZERO);
    }

    #[test]
    fn test_pass_sets_fixed_speed() {
        let config = SimConfig::default();
        let mut ball = ball_at(400, 300);
        ball.velocity = Vec2Fixed::from_int(3, 3);

        assert!(ball.pass_to(Vec2Fixed::from_int(400, 400), &config));

        assert_eq!(ball.velocity, Vec2Fixed::new(Fixed::ZERO, Fixed::from_num(10)));
    }

    #[test]
    fn test_dribble_pulls_toward_player() {
        let config = SimConfig::default();
        let sheet = &TeamSheet::blue().players[4];
        let player = Player::new(sheet, Side::Home, 4, Vec2Fixed::from_int(400, 340), &config);
        let mut ball = ball_at(400, 300);

        ball.update(std::iter::once(&player), &config);

        assert!(ball.velocity.y > Fixed::ZERO);
        assert!(ball.position.y > Fixed::from_num(300));
    }

    #[test]
    fn test_check_goal_requires_mouth() {
        let field = FieldConfig::default();
        assert_eq!(ball_at(400, 540).check_goal(&field), Some(GoalLine::Bottom));
        assert_eq!(ball_at(460, 540).check_goal(&field), None);
        assert_eq!(ball_at(400, 300).check_goal(&field), None);
    }
}
