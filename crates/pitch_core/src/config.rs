//! Simulation configuration.
//!
//! Every tunable the simulation reads lives in one immutable [`SimConfig`]
//! handed to [`Simulation::new`](crate::simulation::Simulation::new). The
//! defaults give the arcade tuning of the shipped rosters; alternate
//! parameter sets are loaded from RON files.
//!
//! The simulation does not validate its configuration. Callers that accept
//! configs from outside (the headless runner, the tools CLI) call
//! [`SimConfig::validate`] first.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result, SimError};
use crate::math::{decimal_serde, Fixed, Vec2Fixed};
use crate::player::{PlayerStats, Role};

/// AI difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    /// Slow, hesitant opponents.
    Easy,
    /// Baseline.
    #[default]
    Medium,
    /// Fast, quick-reacting opponents.
    Hard,
}

impl Difficulty {
    /// All levels in ascending order.
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Look up a difficulty by name, falling back to [`Difficulty::Medium`].
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "easy" => Self::Easy,
            "hard" => Self::Hard,
            _ => Self::Medium,
        }
    }

    /// Lowercase display name.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

/// Timing and speed parameters for one difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Multiplier on AI movement speed.
    #[serde(with = "decimal_serde")]
    pub speed_multiplier: Fixed,
    /// Ticks between full AI re-evaluations.
    pub decision_delay: u32,
    /// Ticks an AI waits before acting when the ball is near.
    pub reaction_time: u32,
}

impl DifficultyProfile {
    fn new(speed_multiplier: f64, decision_delay: u32, reaction_time: u32) -> Self {
        Self {
            speed_multiplier: Fixed::from_num(speed_multiplier),
            decision_delay,
            reaction_time,
        }
    }
}

/// The three difficulty profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyProfiles {
    /// Easy profile.
    pub easy: DifficultyProfile,
    /// Medium profile.
    pub medium: DifficultyProfile,
    /// Hard profile.
    pub hard: DifficultyProfile,
}

impl DifficultyProfiles {
    /// Profile for a level.
    #[must_use]
    pub const fn get(&self, difficulty: Difficulty) -> &DifficultyProfile {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }

    /// Profile by name; unknown names resolve to medium.
    #[must_use]
    pub fn by_key(&self, key: &str) -> &DifficultyProfile {
        self.get(Difficulty::from_key(key))
    }
}

impl Default for DifficultyProfiles {
    fn default() -> Self {
        Self {
            easy: DifficultyProfile::new(0.8, 15, 5),
            medium: DifficultyProfile::new(1.0, 8, 3),
            hard: DifficultyProfile::new(1.2, 5, 1),
        }
    }
}

/// Pitch geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Total width including margins.
    #[serde(with = "decimal_serde")]
    pub width: Fixed,
    /// Total height including margins.
    #[serde(with = "decimal_serde")]
    pub height: Fixed,
    /// Border between the outer frame and the playable area.
    #[serde(with = "decimal_serde")]
    pub margin: Fixed,
    /// Goal mouth width.
    #[serde(with = "decimal_serde")]
    pub goal_width: Fixed,
    /// Depth of the goal area past the boundary where goals register.
    #[serde(with = "decimal_serde")]
    pub goal_depth: Fixed,
}

impl FieldConfig {
    /// Left edge of the playable area.
    #[must_use]
    pub fn min_x(&self) -> Fixed {
        self.margin
    }

    /// Right edge of the playable area.
    #[must_use]
    pub fn max_x(&self) -> Fixed {
        self.width - self.margin
    }

    /// Top edge of the playable area.
    #[must_use]
    pub fn min_y(&self) -> Fixed {
        self.margin
    }

    /// Bottom edge of the playable area.
    #[must_use]
    pub fn max_y(&self) -> Fixed {
        self.height - self.margin
    }

    /// Centre spot.
    #[must_use]
    pub fn center(&self) -> Vec2Fixed {
        Vec2Fixed::new(self.width / Fixed::from_num(2), self.height / Fixed::from_num(2))
    }

    /// Half of the goal mouth width.
    #[must_use]
    pub fn goal_half_width(&self) -> Fixed {
        self.goal_width / Fixed::from_num(2)
    }

    /// Whether `x` lies inside the playable area (inclusive).
    #[must_use]
    pub fn contains_x(&self, x: Fixed) -> bool {
        x >= self.min_x() && x <= self.max_x()
    }

    /// Whether `y` lies inside the playable area (inclusive).
    #[must_use]
    pub fn contains_y(&self, y: Fixed) -> bool {
        y >= self.min_y() && y <= self.max_y()
    }

    /// Whether a point lies inside the playable area (inclusive).
    #[must_use]
    pub fn contains(&self, point: Vec2Fixed) -> bool {
        self.contains_x(point.x) && self.contains_y(point.y)
    }

    /// Clamp a point into the playable area.
    #[must_use]
    pub fn clamp(&self, point: Vec2Fixed) -> Vec2Fixed {
        Vec2Fixed::new(
            point.x.clamp(self.min_x(), self.max_x()),
            point.y.clamp(self.min_y(), self.max_y()),
        )
    }

    /// Whether `x` is within the goal mouth (strictly inside the posts).
    #[must_use]
    pub fn in_goal_mouth(&self, x: Fixed) -> bool {
        (x - self.center().x).abs() < self.goal_half_width()
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: Fixed::from_num(800),
            height: Fixed::from_num(600),
            margin: Fixed::from_num(50),
            goal_width: Fixed::from_num(100),
            goal_depth: Fixed::from_num(20),
        }
    }
}

/// Ball physics and ball-contact distances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallConfig {
    /// Ball radius.
    #[serde(with = "decimal_serde")]
    pub radius: Fixed,
    /// Per-tick velocity multiplier, in (0, 1).
    #[serde(with = "decimal_serde")]
    pub friction: Fixed,
    /// Velocity components below this snap to zero.
    #[serde(with = "decimal_serde")]
    pub stop_epsilon: Fixed,
    /// Fraction of speed kept after a wall bounce.
    #[serde(with = "decimal_serde")]
    pub restitution: Fixed,
    /// Gap between ball and player surfaces within which a kick connects.
    #[serde(with = "decimal_serde")]
    pub kick_distance: Fixed,
    /// Kick impulse at the shooting baseline.
    #[serde(with = "decimal_serde")]
    pub kick_force: Fixed,
    /// Shooting stat that yields exactly `kick_force`.
    #[serde(with = "decimal_serde")]
    pub shooting_baseline: Fixed,
    /// Maximum teammate distance for a pass.
    #[serde(with = "decimal_serde")]
    pub pass_distance: Fixed,
    /// Ball speed right after a pass.
    #[serde(with = "decimal_serde")]
    pub pass_speed: Fixed,
    /// Gap between ball and player surfaces within which the player dribbles.
    #[serde(with = "decimal_serde")]
    pub dribble_distance: Fixed,
    /// Attraction impulse at the dribbling baseline.
    #[serde(with = "decimal_serde")]
    pub dribble_strength: Fixed,
    /// Dribbling stat that yields exactly `dribble_strength`.
    #[serde(with = "decimal_serde")]
    pub dribbling_baseline: Fixed,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            radius: Fixed::from_num(10),
            friction: Fixed::from_num(0.97),
            stop_epsilon: Fixed::from_num(0.1),
            restitution: Fixed::from_num(0.7),
            kick_distance: Fixed::from_num(30),
            kick_force: Fixed::from_num(6.5),
            shooting_baseline: Fixed::from_num(8),
            pass_distance: Fixed::from_num(200),
            pass_speed: Fixed::from_num(10),
            dribble_distance: Fixed::from_num(25),
            dribble_strength: Fixed::from_num(0.25),
            dribbling_baseline: Fixed::from_num(0.3),
        }
    }
}

/// Player body, speed and stamina tunables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Body radius.
    #[serde(with = "decimal_serde")]
    pub radius: Fixed,
    /// Speed per tick at the speed-stat baseline.
    #[serde(with = "decimal_serde")]
    pub base_speed: Fixed,
    /// Speed stat that yields exactly `base_speed`.
    #[serde(with = "decimal_serde")]
    pub speed_baseline: Fixed,
    /// Stamina lost per moving tick.
    #[serde(with = "decimal_serde")]
    pub stamina_drain: Fixed,
    /// Stamina regained per idle tick.
    #[serde(with = "decimal_serde")]
    pub stamina_regen: Fixed,
    /// Stamina ratio below which the player slows down.
    #[serde(with = "decimal_serde")]
    pub low_stamina_ratio: Fixed,
    /// Speed multiplier applied below `low_stamina_ratio`.
    #[serde(with = "decimal_serde")]
    pub low_stamina_multiplier: Fixed,
    /// Extra clearance kept between player bodies.
    #[serde(with = "decimal_serde")]
    pub separation_margin: Fixed,
    /// Separation step as a multiple of the player's current speed.
    #[serde(with = "decimal_serde")]
    pub separation_speed_factor: Fixed,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            radius: Fixed::from_num(15),
            base_speed: Fixed::from_num(4),
            speed_baseline: Fixed::from_num(5),
            stamina_drain: Fixed::from_num(0.4),
            stamina_regen: Fixed::from_num(0.15),
            low_stamina_ratio: Fixed::from_num(0.3),
            low_stamina_multiplier: Fixed::from_num(0.5),
            separation_margin: Fixed::from_num(5),
            separation_speed_factor: Fixed::from_num(1.5),
        }
    }
}

/// Distances and horizons for the AI decision engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiConfig {
    /// Goal distance at which a ball carrier aims straight at goal.
    #[serde(with = "decimal_serde")]
    pub attack_distance: Fixed,
    /// Ball distance at which defenders press an opposing carrier.
    #[serde(with = "decimal_serde")]
    pub defend_distance: Fixed,
    /// Ball distance at which a free ball is chased and decisions speed up.
    #[serde(with = "decimal_serde")]
    pub chase_distance: Fixed,
    /// Ball distance that bypasses all decision delays.
    #[serde(with = "decimal_serde")]
    pub urgent_distance: Fixed,
    /// Targets closer than this count as reached.
    #[serde(with = "decimal_serde")]
    pub arrival_threshold: Fixed,
    /// How much closer to goal a teammate must be to receive a pass.
    #[serde(with = "decimal_serde")]
    pub pass_advantage: Fixed,
    /// Look-ahead distance while dribbling toward goal.
    #[serde(with = "decimal_serde")]
    pub dribble_lookahead: Fixed,
    /// Distance a supporting player keeps ahead of the ball.
    #[serde(with = "decimal_serde")]
    pub support_offset: Fixed,
    /// Ticks of ball travel predicted when supporting.
    #[serde(with = "decimal_serde")]
    pub support_horizon: Fixed,
    /// Ticks of ball travel predicted when intercepting.
    #[serde(with = "decimal_serde")]
    pub defend_horizon: Fixed,
    /// Ticks of ball travel predicted when chasing.
    #[serde(with = "decimal_serde")]
    pub chase_horizon: Fixed,
    /// Speed boost inside `chase_distance`.
    #[serde(with = "decimal_serde")]
    pub chase_boost: Fixed,
    /// Speed boost inside `urgent_distance`.
    #[serde(with = "decimal_serde")]
    pub urgent_boost: Fixed,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            attack_distance: Fixed::from_num(150),
            defend_distance: Fixed::from_num(200),
            chase_distance: Fixed::from_num(300),
            urgent_distance: Fixed::from_num(80),
            arrival_threshold: Fixed::from_num(3),
            pass_advantage: Fixed::from_num(30),
            dribble_lookahead: Fixed::from_num(60),
            support_offset: Fixed::from_num(80),
            support_horizon: Fixed::from_num(10),
            defend_horizon: Fixed::from_num(5),
            chase_horizon: Fixed::from_num(8),
            chase_boost: Fixed::from_num(1.15),
            urgent_boost: Fixed::from_num(1.25),
        }
    }
}

/// Match length, cooldowns and who is human.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRules {
    /// Regulation length in seconds of simulated time.
    pub duration_secs: u32,
    /// Simulation ticks per second.
    pub tick_rate: u32,
    /// Ticks after a goal during which goal detection is suppressed.
    pub goal_cooldown: u32,
    /// Difficulty at kickoff.
    pub difficulty: Difficulty,
    /// Side whose controlled player follows input intents, if any.
    pub human_side: Option<crate::player::Side>,
}

impl MatchRules {
    /// Regulation length in ticks.
    #[must_use]
    pub fn duration_ticks(&self) -> u64 {
        u64::from(self.duration_secs) * u64::from(self.tick_rate)
    }
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            duration_secs: 90,
            tick_rate: 60,
            goal_cooldown: 60,
            difficulty: Difficulty::Medium,
            human_side: Some(crate::player::Side::Home),
        }
    }
}

/// Penalty shootout tunables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShootoutConfig {
    /// Distance of the penalty spot from the goal line boundary.
    #[serde(with = "decimal_serde")]
    pub spot_distance: Fixed,
    /// Ball speed of a penalty kick.
    #[serde(with = "decimal_serde")]
    pub kick_power: Fixed,
    /// Fraction of the goal half-width reachable by full aim.
    #[serde(with = "decimal_serde")]
    pub aim_width_factor: Fixed,
    /// Aim change per aim step of input.
    #[serde(with = "decimal_serde")]
    pub aim_step: Fixed,
    /// Per-round probability that the keeper pre-commits to a side.
    #[serde(with = "decimal_serde")]
    pub keeper_commit_chance: Fixed,
    /// Largest pre-commit bias magnitude.
    #[serde(with = "decimal_serde")]
    pub keeper_bias_range: Fixed,
    /// Per-tick probability that an AI taker shoots.
    #[serde(with = "decimal_serde")]
    pub ai_shot_chance: Fixed,
    /// Largest AI aim magnitude.
    #[serde(with = "decimal_serde")]
    pub ai_aim_range: Fixed,
    /// Keeper speed multiplier while a penalty is in flight.
    #[serde(with = "decimal_serde")]
    pub keeper_speed_multiplier: Fixed,
    /// Keeper-to-ball distance within which proximity helps a save.
    #[serde(with = "decimal_serde")]
    pub save_range: Fixed,
    /// Save chance with no bonuses.
    #[serde(with = "decimal_serde")]
    pub base_save_chance: Fixed,
    /// Largest proximity bonus (keeper on the ball).
    #[serde(with = "decimal_serde")]
    pub proximity_bonus: Fixed,
    /// Bonus when the keeper guessed the right side.
    #[serde(with = "decimal_serde")]
    pub position_match_bonus: Fixed,
    /// Largest bias/offset difference still counted as a right guess.
    #[serde(with = "decimal_serde")]
    pub position_match_tolerance: Fixed,
    /// Save chance cap.
    #[serde(with = "decimal_serde")]
    pub max_save_chance: Fixed,
    /// Regular rounds before sudden death.
    pub max_rounds: u32,
    /// Ticks a penalty result stays on screen.
    pub result_hold_ticks: u32,
}

impl Default for ShootoutConfig {
    fn default() -> Self {
        Self {
            spot_distance: Fixed::from_num(150),
            kick_power: Fixed::from_num(13),
            aim_width_factor: Fixed::from_num(0.7),
            aim_step: Fixed::from_num(0.05),
            keeper_commit_chance: Fixed::from_num(0.3),
            keeper_bias_range: Fixed::from_num(0.8),
            ai_shot_chance: Fixed::from_num(0.02),
            ai_aim_range: Fixed::from_num(0.7),
            keeper_speed_multiplier: Fixed::from_num(2.5),
            save_range: Fixed::from_num(40),
            base_save_chance: Fixed::from_num(0.3),
            proximity_bonus: Fixed::from_num(0.5),
            position_match_bonus: Fixed::from_num(0.25),
            position_match_tolerance: Fixed::from_num(0.4),
            max_save_chance: Fixed::from_num(0.85),
            max_rounds: 5,
            result_hold_ticks: 120,
        }
    }
}

/// One roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSheet {
    /// Display name.
    pub name: String,
    /// Tactical role.
    pub role: Role,
    /// Attribute ratings.
    pub stats: PlayerStats,
}

impl PlayerSheet {
    fn new(name: &str, role: Role, speed: f64, stamina: f64, shooting: f64, dribbling: f64) -> Self {
        Self {
            name: name.to_string(),
            role,
            stats: PlayerStats::new(speed, stamina, shooting, dribbling),
        }
    }
}

/// A team: name, kit colour and five players in formation-slot order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSheet {
    /// Team name.
    pub name: String,
    /// Kit colour as RGB.
    pub color: [u8; 3],
    /// Players, one per formation slot.
    pub players: Vec<PlayerSheet>,
}

impl TeamSheet {
    /// Default home roster.
    #[must_use]
    pub fn blue() -> Self {
        Self {
            name: "Blue".to_string(),
            color: [50, 50, 200],
            players: vec![
                PlayerSheet::new("Neuer", Role::Goalkeeper, 3.0, 80.0, 4.0, 0.2),
                PlayerSheet::new("Ramos", Role::Defender, 4.0, 90.0, 6.0, 0.25),
                PlayerSheet::new("Modric", Role::Midfielder, 6.0, 95.0, 7.0, 0.4),
                PlayerSheet::new("De Bruyne", Role::Midfielder, 5.0, 100.0, 9.0, 0.35),
                PlayerSheet::new("Messi", Role::Forward, 7.0, 85.0, 10.0, 0.5),
            ],
        }
    }

    /// Default away roster.
    #[must_use]
    pub fn red() -> Self {
        Self {
            name: "Red".to_string(),
            color: [200, 50, 50],
            players: vec![
                PlayerSheet::new("Courtois", Role::Goalkeeper, 3.0, 80.0, 4.0, 0.2),
                PlayerSheet::new("Van Dijk", Role::Defender, 4.0, 90.0, 6.0, 0.25),
                PlayerSheet::new("Kroos", Role::Midfielder, 5.0, 100.0, 8.0, 0.3),
                PlayerSheet::new("Pogba", Role::Midfielder, 6.0, 95.0, 7.0, 0.4),
                PlayerSheet::new("Ronaldo", Role::Forward, 6.0, 90.0, 10.0, 0.35),
            ],
        }
    }
}

/// Number of players per team.
pub const ROSTER_SIZE: usize = 5;

/// Kickoff formation: per-slot offsets from the centre of the team's own
/// goal line. `x` is lateral, `y` is distance up-field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formation {
    /// Offsets in slot order.
    pub slots: [FormationSlot; ROSTER_SIZE],
}

/// One formation slot offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormationSlot {
    /// Lateral offset from the centre line.
    #[serde(with = "decimal_serde")]
    pub x: Fixed,
    /// Distance up-field from the own goal line.
    #[serde(with = "decimal_serde")]
    pub y: Fixed,
}

impl FormationSlot {
    fn new(x: i32, y: i32) -> Self {
        Self {
            x: Fixed::from_num(x),
            y: Fixed::from_num(y),
        }
    }
}

impl Default for Formation {
    fn default() -> Self {
        Self {
            slots: [
                FormationSlot::new(0, 50),
                FormationSlot::new(-80, 110),
                FormationSlot::new(-40, 150),
                FormationSlot::new(40, 150),
                FormationSlot::new(0, 190),
            ],
        }
    }
}

/// Complete, immutable simulation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Pitch geometry.
    pub field: FieldConfig,
    /// Ball physics.
    pub ball: BallConfig,
    /// Player physics and stamina.
    pub player: PlayerConfig,
    /// AI decision distances.
    pub ai: AiConfig,
    /// Difficulty profiles.
    pub difficulty: DifficultyProfiles,
    /// Match rules.
    pub match_rules: MatchRules,
    /// Penalty shootout tunables.
    pub shootout: ShootoutConfig,
    /// Kickoff formation shared by both teams.
    pub formation: Formation,
    /// Home and away team sheets.
    pub teams: [TeamSheet; 2],
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            field: FieldConfig::default(),
            ball: BallConfig::default(),
            player: PlayerConfig::default(),
            ai: AiConfig::default(),
            difficulty: DifficultyProfiles::default(),
            match_rules: MatchRules::default(),
            shootout: ShootoutConfig::default(),
            formation: Formation::default(),
            teams: [TeamSheet::blue(), TeamSheet::red()],
        }
    }
}

impl SimConfig {
    /// Distance at which `player_radius` sized bodies dribble the ball.
    #[must_use]
    pub fn dribble_range(&self) -> Fixed {
        self.ball.dribble_distance + self.ball.radius + self.player.radius
    }

    /// Distance at which a player can kick the ball.
    #[must_use]
    pub fn kick_range(&self) -> Fixed {
        self.ball.kick_distance + self.ball.radius + self.player.radius
    }

    /// Parse a config from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    /// Load a config from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| SimError::io(path, e))?;
        Self::from_ron_str(&text)
    }

    /// Render the config as pretty RON.
    pub fn to_ron(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Check every precondition the simulation relies on.
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let zero = Fixed::ZERO;
        let one = Fixed::ONE;
        let f = &self.field;

        positive("field.width", f.width)?;
        positive("field.height", f.height)?;
        non_negative("field.margin", f.margin)?;
        positive("field.goal_width", f.goal_width)?;
        positive("field.goal_depth", f.goal_depth)?;
        if f.margin * Fixed::from_num(2) >= f.width || f.margin * Fixed::from_num(2) >= f.height {
            return Err(ConfigError::new("field.margin", "leaves no playable area"));
        }
        if f.goal_width >= f.max_x() - f.min_x() {
            return Err(ConfigError::new("field.goal_width", "wider than the pitch"));
        }

        let b = &self.ball;
        positive("ball.radius", b.radius)?;
        if b.friction <= zero || b.friction >= one {
            return Err(ConfigError::new("ball.friction", "must be in (0, 1)"));
        }
        non_negative("ball.stop_epsilon", b.stop_epsilon)?;
        if b.restitution < zero || b.restitution > one {
            return Err(ConfigError::new("ball.restitution", "must be in [0, 1]"));
        }
        non_negative("ball.kick_distance", b.kick_distance)?;
        positive("ball.shooting_baseline", b.shooting_baseline)?;
        positive("ball.dribbling_baseline", b.dribbling_baseline)?;
        positive("ball.pass_speed", b.pass_speed)?;

        let p = &self.player;
        positive("player.radius", p.radius)?;
        positive("player.base_speed", p.base_speed)?;
        positive("player.speed_baseline", p.speed_baseline)?;
        non_negative("player.stamina_drain", p.stamina_drain)?;
        non_negative("player.stamina_regen", p.stamina_regen)?;

        for (key, profile) in [
            ("difficulty.easy", &self.difficulty.easy),
            ("difficulty.medium", &self.difficulty.medium),
            ("difficulty.hard", &self.difficulty.hard),
        ] {
            positive(key, profile.speed_multiplier)?;
        }

        if self.match_rules.tick_rate == 0 {
            return Err(ConfigError::new("match_rules.tick_rate", "must be non-zero"));
        }

        let s = &self.shootout;
        positive("shootout.save_range", s.save_range)?;
        positive("shootout.kick_power", s.kick_power)?;
        if s.max_rounds == 0 {
            return Err(ConfigError::new("shootout.max_rounds", "must be non-zero"));
        }
        if s.spot_distance >= (f.max_y() - f.min_y()) / Fixed::from_num(2) {
            return Err(ConfigError::new("shootout.spot_distance", "beyond the halfway line"));
        }

        for (side, sheet) in self.teams.iter().enumerate() {
            if sheet.players.len() != ROSTER_SIZE {
                return Err(ConfigError::new(
                    format!("teams[{side}].players"),
                    format!("expected {ROSTER_SIZE} players, found {}", sheet.players.len()),
                ));
            }
            for (slot, player) in sheet.players.iter().enumerate() {
                let key = format!("teams[{side}].players[{slot}].stats");
                positive(&format!("{key}.speed"), player.stats.speed)?;
                positive(&format!("{key}.stamina"), player.stats.stamina)?;
                non_negative(&format!("{key}.shooting"), player.stats.shooting)?;
                non_negative(&format!("{key}.dribbling"), player.stats.dribbling)?;
            }
        }

        Ok(())
    }
}

fn positive(field: &str, value: Fixed) -> std::result::Result<(), ConfigError> {
    if value <= Fixed::ZERO {
        return Err(ConfigError::new(field, format!("must be positive, got {value}")));
    }
    Ok(())
}

fn non_negative(field: &str, value: Fixed) -> std::result::Result<(), ConfigError> {
    if value < Fixed::ZERO {
        return Err(ConfigError::new(field, format!("must not be negative, got {value}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_difficulty_key_fallback() {
        assert_eq!(Difficulty::from_key("easy"), Difficulty::Easy);
        assert_eq!(Difficulty::from_key("HARD"), Difficulty::Hard);
        assert_eq!(Difficulty::from_key("nightmare"), Difficulty::Medium);
        assert_eq!(Difficulty::from_key(""), Difficulty::Medium);
    }

    #[test]
    fn test_difficulty_profiles_match_table() {
        let profiles = DifficultyProfiles::default();
        assert_eq!(profiles.easy.decision_delay, 15);
        assert_eq!(profiles.medium.reaction_time, 3);
        assert_eq!(profiles.hard.speed_multiplier, Fixed::from_num(1.2));
        assert_eq!(profiles.by_key("bogus"), &profiles.medium);
    }

    #[test]
    fn test_ranges_include_radii() {
        let config = SimConfig::default();
        assert_eq!(config.dribble_range(), Fixed::from_num(50));
        assert_eq!(config.kick_range(), Fixed::from_num(55));
    }

    #[test]
    fn test_field_bounds() {
        let field = FieldConfig::default();
        assert_eq!(field.min_x(), Fixed::from_num(50));
        assert_eq!(field.max_x(), Fixed::from_num(750));
        assert_eq!(field.max_y(), Fixed::from_num(550));
        assert!(field.in_goal_mouth(Fixed::from_num(449)));
        assert!(!field.in_goal_mouth(Fixed::from_num(450)));
    }

    #[test]
    fn test_validate_rejects_non_positive_goal_width() {
        let mut config = SimConfig::default();
        config.field.goal_width = Fixed::ZERO;
        let err = config.validate().unwrap_err();
        assert_eq!(err.field, "field.goal_width");
    }

    #[test]
    fn test_validate_rejects_short_roster() {
        let mut config = SimConfig::default();
        config.teams[1].players.pop();
        let err = config.validate().unwrap_err();
        assert_eq!(err.field, "teams[1].players");
    }

    #[test]
    fn test_validate_rejects_friction_of_one() {
        let mut config = SimConfig::default();
        config.ball.friction = Fixed::ONE;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ron_round_trip() {
        let config = SimConfig::default();
        let text = config.to_ron().expect("serialize");
        let back = SimConfig::from_ron_str(&text).expect("parse");
        assert_eq!(back, config);
    }

    #[test]
    fn test_duration_ticks() {
        assert_eq!(MatchRules::default().duration_ticks(), 5400);
    }
}
