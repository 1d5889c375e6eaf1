//! Player bodies: identity, attributes, movement and stamina.
//!
//! A [`Player`] is plain data plus the few operations that must keep its
//! invariants: position inside the playable area and stamina within
//! `[0, max_stamina]`. Decision making lives in [`crate::ai`].

use serde::{Deserialize, Serialize};

use crate::ball::GoalLine;
use crate::config::{PlayerConfig, PlayerSheet, SimConfig};
use crate::math::{decimal_serde, fixed_serde, Fixed, Vec2Fixed};

// ============================================================================
// Identity
// ============================================================================

/// One of the two teams.
///
/// Home defends the top goal and attacks downward; away mirrors it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// Team A, blue, attacks the bottom goal.
    Home,
    /// Team B, red, attacks the top goal.
    Away,
}

impl Side {
    /// Both sides in kick order.
    pub const BOTH: [Self; 2] = [Self::Home, Self::Away];

    /// Index into per-side arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Home => 0,
            Self::Away => 1,
        }
    }

    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Home => Self::Away,
            Self::Away => Self::Home,
        }
    }

    /// Goal this side shoots at.
    #[must_use]
    pub const fn attacks(self) -> GoalLine {
        match self {
            Self::Home => GoalLine::Bottom,
            Self::Away => GoalLine::Top,
        }
    }

    /// Goal this side protects.
    #[must_use]
    pub const fn defends(self) -> GoalLine {
        self.opponent().attacks()
    }

    /// `+1` when up-field is increasing `y`, `-1` otherwise.
    #[must_use]
    pub fn forward_sign(self) -> Fixed {
        match self {
            Self::Home => Fixed::ONE,
            Self::Away => -Fixed::ONE,
        }
    }

    /// Whether `a` lies further up-field than `b` for this side.
    #[must_use]
    pub fn is_ahead(self, a: Vec2Fixed, b: Vec2Fixed) -> bool {
        match self {
            Self::Home => a.y > b.y,
            Self::Away => a.y < b.y,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Home => write!(f, "home"),
            Self::Away => write!(f, "away"),
        }
    }
}

/// Tactical role, informational apart from the shootout keeper lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Shot stopper.
    Goalkeeper,
    /// Back line.
    Defender,
    /// Centre of the pitch.
    Midfielder,
    /// Striker.
    Forward,
}

/// Attribute ratings. Speed and stamina are positive, the rest non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Movement rating.
    #[serde(with = "decimal_serde")]
    pub speed: Fixed,
    /// Stamina pool size.
    #[serde(with = "decimal_serde")]
    pub stamina: Fixed,
    /// Kick strength rating.
    #[serde(with = "decimal_serde")]
    pub shooting: Fixed,
    /// Ball attraction rating.
    #[serde(with = "decimal_serde")]
    pub dribbling: Fixed,
}

impl PlayerStats {
    /// Build stats from decimal ratings.
    #[must_use]
    pub fn new(speed: f64, stamina: f64, shooting: f64, dribbling: f64) -> Self {
        Self {
            speed: Fixed::from_num(speed),
            stamina: Fixed::from_num(stamina),
            shooting: Fixed::from_num(shooting),
            dribbling: Fixed::from_num(dribbling),
        }
    }
}

/// What an AI player is currently trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AiState {
    /// Holding the home slot.
    #[default]
    Idle,
    /// Running at a free ball.
    ChaseBall,
    /// Carrying the ball toward goal.
    Attack,
    /// Pressing an opposing carrier.
    Defend,
    /// Getting ahead of a teammate carrier.
    Support,
}

impl AiState {
    /// Snake-case name used in logs and snapshots.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ChaseBall => "chase_ball",
            Self::Attack => "attack",
            Self::Defend => "defend",
            Self::Support => "support",
        }
    }
}

/// Persistent AI memory of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AiMemory {
    /// Current intent.
    pub state: AiState,
    /// Where the player is heading.
    pub target: Vec2Fixed,
    /// Ticks since the last full re-evaluation.
    pub decision_timer: u32,
}

// ============================================================================
// Player
// ============================================================================

/// A player on the pitch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Display name.
    pub name: String,
    /// Owning team.
    pub side: Side,
    /// Formation slot index within the team.
    pub slot: usize,
    /// Tactical role.
    pub role: Role,
    /// Attribute ratings.
    pub stats: PlayerStats,
    /// Body radius.
    #[serde(with = "fixed_serde")]
    pub radius: Fixed,
    /// Whether this is the team's controlled player.
    pub controllable: bool,
    /// Whether the player moved on the last movement update.
    pub moving: bool,
    /// AI memory.
    pub ai: AiMemory,
    /// Shootout pre-commit bias in `[-1, 1]`; only keepers use it.
    #[serde(with = "fixed_serde")]
    pub save_bias: Fixed,
    position: Vec2Fixed,
    #[serde(with = "fixed_serde")]
    base_speed: Fixed,
    #[serde(with = "fixed_serde")]
    speed: Fixed,
    #[serde(with = "fixed_serde")]
    stamina: Fixed,
    stamina_ticked: bool,
}

impl Player {
    /// Create a player from a roster entry at `position`.
    #[must_use]
    pub fn new(sheet: &PlayerSheet, side: Side, slot: usize, position: Vec2Fixed, config: &SimConfig) -> Self {
        let base_speed =
            config.player.base_speed * sheet.stats.speed / config.player.speed_baseline;
        Self {
            name: sheet.name.clone(),
            side,
            slot,
            role: sheet.role,
            stats: sheet.stats,
            radius: config.player.radius,
            controllable: false,
            moving: false,
            ai: AiMemory {
                target: position,
                ..AiMemory::default()
            },
            save_bias: Fixed::ZERO,
            position,
            base_speed,
            speed: base_speed,
            stamina: sheet.stats.stamina,
            stamina_ticked: false,
        }
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Vec2Fixed {
        self.position
    }

    /// Speed per tick at full stamina.
    #[must_use]
    pub fn base_speed(&self) -> Fixed {
        self.base_speed
    }

    /// Speed per tick after fatigue.
    #[must_use]
    pub fn speed(&self) -> Fixed {
        self.speed
    }

    /// Current stamina.
    #[must_use]
    pub fn stamina(&self) -> Fixed {
        self.stamina
    }

    /// Stamina cap.
    #[must_use]
    pub fn max_stamina(&self) -> Fixed {
        self.stats.stamina
    }

    /// Stamina as a fraction of the cap.
    #[must_use]
    pub fn stamina_ratio(&self) -> Fixed {
        if self.stats.stamina <= Fixed::ZERO {
            return Fixed::ZERO;
        }
        self.stamina / self.stats.stamina
    }

    /// Distance from this player to a point.
    #[must_use]
    pub fn distance_to(&self, point: Vec2Fixed) -> Fixed {
        self.position.distance(point)
    }

    /// Whether the player is a goalkeeper.
    #[must_use]
    pub fn is_goalkeeper(&self) -> bool {
        self.role == Role::Goalkeeper
    }

    /// Put the player at `position`, clamped into the playable area.
    pub fn place(&mut self, position: Vec2Fixed, config: &SimConfig) {
        self.position = config.field.clamp(position);
    }

    /// Set stamina, clamped to `[0, max_stamina]`, and refresh speed.
    pub fn set_stamina(&mut self, stamina: Fixed, config: &PlayerConfig) {
        self.stamina = stamina.clamp(Fixed::ZERO, self.stats.stamina);
        self.refresh_speed(config);
    }

    /// Displace by `delta`, then update stamina.
    ///
    /// Each axis is applied only if the result stays inside the playable
    /// area, so a player pressed against a wall can still slide along it.
    pub fn move_by(&mut self, delta: Vec2Fixed, config: &SimConfig) {
        self.moving = !delta.is_zero();
        let next = self.position + delta;
        if config.field.contains_x(next.x) {
            self.position.x = next.x;
        }
        if config.field.contains_y(next.y) {
            self.position.y = next.y;
        }
        self.update_stamina(&config.player);
    }

    /// Drain stamina when moving, regenerate otherwise, then refresh speed.
    pub fn update_stamina(&mut self, config: &PlayerConfig) {
        self.stamina = if self.moving {
            (self.stamina - config.stamina_drain).max(Fixed::ZERO)
        } else {
            (self.stamina + config.stamina_regen).min(self.stats.stamina)
        };
        self.stamina_ticked = true;
        self.refresh_speed(config);
    }

    /// Start a new tick: no stamina update has happened yet.
    pub fn begin_tick(&mut self) {
        self.stamina_ticked = false;
    }

    /// Regenerate as idle if nothing updated stamina this tick.
    pub fn settle_stamina(&mut self, config: &PlayerConfig) {
        if !self.stamina_ticked {
            self.moving = false;
            self.update_stamina(config);
        }
    }

    /// Return to `position` fresh: full stamina, base speed, idle AI.
    pub fn reset_to(&mut self, position: Vec2Fixed) {
        self.position = position;
        self.stamina = self.stats.stamina;
        self.speed = self.base_speed;
        self.moving = false;
        self.save_bias = Fixed::ZERO;
        self.ai = AiMemory {
            target: position,
            ..AiMemory::default()
        };
    }

    fn refresh_speed(&mut self, config: &PlayerConfig) {
        self.speed = if self.stamina_ratio() < config.low_stamina_ratio {
            self.base_speed * config.low_stamina_multiplier
        } else {
            self.base_speed
        };
    }
}
