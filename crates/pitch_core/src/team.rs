//! Teams: rosters, kickoff formation and the controlled-player cursor.

use serde::{Deserialize, Serialize};

use crate::config::{SimConfig, TeamSheet};
use crate::math::{Fixed, Vec2Fixed};
use crate::player::{Player, Side};

/// Kickoff position of `slot` for `side`.
///
/// Formation offsets are measured from the centre of the side's own goal
/// line, so the away formation is the home formation mirrored top to bottom.
/// Slots beyond the formation fall back to the centre spot.
#[must_use]
pub fn kickoff_position(side: Side, slot: usize, config: &SimConfig) -> Vec2Fixed {
    let field = &config.field;
    let Some(offset) = config.formation.slots.get(slot) else {
        return field.center();
    };
    let x = field.center().x + offset.x;
    let y = match side {
        Side::Home => field.min_y() + offset.y,
        Side::Away => field.max_y() - offset.y,
    };
    field.clamp(Vec2Fixed::new(x, y))
}

/// One side's roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Which side this is.
    pub side: Side,
    /// Team name.
    pub name: String,
    /// Kit colour.
    pub color: [u8; 3],
    /// Players in slot order.
    pub players: Vec<Player>,
    controlled: usize,
}

impl Team {
    /// Build a team at kickoff positions. Slot 0 starts controlled.
    #[must_use]
    pub fn from_sheet(sheet: &TeamSheet, side: Side, config: &SimConfig) -> Self {
        let players = sheet
            .players
            .iter()
            .enumerate()
            .map(|(slot, p)| Player::new(p, side, slot, kickoff_position(side, slot, config), config))
            .collect();
        let mut team = Self {
            side,
            name: sheet.name.clone(),
            color: sheet.color,
            players,
            controlled: 0,
        };
        team.set_controlled(0);
        team
    }

    /// Index of the controlled player.
    #[must_use]
    pub fn controlled_index(&self) -> usize {
        self.controlled
    }

    /// The controlled player, if the roster is not empty.
    #[must_use]
    pub fn controlled(&self) -> Option<&Player> {
        self.players.get(self.controlled)
    }

    /// Mutable access to the controlled player.
    pub fn controlled_mut(&mut self) -> Option<&mut Player> {
        self.players.get_mut(self.controlled)
    }

    /// Make `index` the controlled player, clamped to the roster.
    pub fn set_controlled(&mut self, index: usize) {
        self.controlled = index.min(self.players.len().saturating_sub(1));
        for (i, player) in self.players.iter_mut().enumerate() {
            player.controllable = i == self.controlled;
        }
    }

    /// Move control to the next slot, wrapping around. Returns the new index.
    pub fn switch_controlled(&mut self) -> usize {
        if !self.players.is_empty() {
            self.set_controlled((self.controlled + 1) % self.players.len());
        }
        self.controlled
    }

    /// Index of the first goalkeeper on the roster.
    #[must_use]
    pub fn goalkeeper_index(&self) -> Option<usize> {
        self.players.iter().position(Player::is_goalkeeper)
    }

    /// Send everyone back to kickoff positions with fresh stamina and AI.
    pub fn reset_to_kickoff(&mut self, config: &SimConfig) {
        let side = self.side;
        for player in &mut self.players {
            player.reset_to(kickoff_position(side, player.slot, config));
        }
        self.set_controlled(self.controlled);
    }

    /// Mean stamina ratio across the roster.
    #[must_use]
    pub fn average_stamina(&self) -> Fixed {
        if self.players.is_empty() {
            return Fixed::ZERO;
        }
        let total = self
            .players
            .iter()
            .fold(Fixed::ZERO, |acc, p| acc + p.stamina_ratio());
        total / Fixed::from_num(self.players.len())
    }
}

/// The nearest teammate ahead of `player` within pass distance.
///
/// "Ahead" means strictly further up-field for the player's side.
#[must_use]
pub fn find_pass_target<'a>(player: &Player, teammates: &'a [Player], config: &SimConfig) -> Option<&'a Player> {
    let origin = player.position();
    teammates
        .iter()
        .filter(|mate| mate.slot != player.slot)
        .filter(|mate| player.side.is_ahead(mate.position(), origin))
        .map(|mate| (mate, mate.distance_to(origin)))
        .filter(|(_, distance)| *distance < config.ball.pass_distance)
        .min_by_key(|(_, distance)| *distance)
        .map(|(mate, _)| mate)
}
