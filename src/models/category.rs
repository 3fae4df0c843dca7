//! Category: the draw state for one competition class, plus its configuration and errors.

use crate::models::bracket::{Bracket, BracketId, BracketMatch, BracketType, MatchId};
use crate::models::group::{Group, GroupId, GroupMatch, GroupMatchId, GroupPlayer};
use crate::models::registration::{Registration, RegistrationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a category.
pub type CategoryId = Uuid;

/// Errors that can occur during draw operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DrawError {
    /// Not enough registrations for the requested draw format.
    InsufficientPlayers { required: usize, actual: usize },
    /// The submitted score does not give the winner enough sets.
    InvalidScore { required_sets: u32 },
    /// Match not found in this category.
    MatchNotFound(MatchId),
    /// Group not found in this category.
    GroupNotFound(GroupId),
    /// Registration not found in this category.
    RegistrationNotFound(RegistrationId),
    /// The given player does not occupy a slot in the match.
    PlayerNotInMatch(RegistrationId),
    /// The match does not have both players yet.
    MatchNotReady,
    /// The match already has a result; clear it first.
    MatchAlreadyDecided,
    /// The match has no result to clear.
    MatchNotDecided,
    /// The retired player and the winner must be the two occupants of the match.
    InvalidRetirement,
    /// The swap does not reference two occupied positions in the same scope.
    InconsistentSwap,
    /// A registration with this seed already exists in the category.
    DuplicateSeed(u32),
    /// A registration with this name already exists (names are unique, case-insensitive).
    DuplicateName,
    /// Registration names must be non-empty.
    EmptyName,
    /// The draw has already been generated; remove it before editing registrations.
    DrawAlreadyGenerated,
}

impl std::fmt::Display for DrawError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawError::InsufficientPlayers { required, actual } => {
                write!(f, "Need at least {} players (have {})", required, actual)
            }
            DrawError::InvalidScore { required_sets } => {
                write!(f, "Score must give the winner at least {} sets", required_sets)
            }
            DrawError::MatchNotFound(_) => write!(f, "Match not found"),
            DrawError::GroupNotFound(_) => write!(f, "Group not found"),
            DrawError::RegistrationNotFound(_) => write!(f, "Registration not found"),
            DrawError::PlayerNotInMatch(_) => write!(f, "Player is not in this match"),
            DrawError::MatchNotReady => write!(f, "Match does not have both players yet"),
            DrawError::MatchAlreadyDecided => {
                write!(f, "Match already has a result; clear it first")
            }
            DrawError::MatchNotDecided => write!(f, "Match has no result to clear"),
            DrawError::InvalidRetirement => {
                write!(f, "Retired player and winner must be the two players of the match")
            }
            DrawError::InconsistentSwap => write!(f, "Swap must reference two occupied positions"),
            DrawError::DuplicateSeed(s) => write!(f, "Seed {} is already assigned", s),
            DrawError::DuplicateName => write!(f, "A player with this name is already registered"),
            DrawError::EmptyName => write!(f, "Player name cannot be empty"),
            DrawError::DrawAlreadyGenerated => {
                write!(f, "Draw already generated; regenerate it after editing players")
            }
        }
    }
}

/// Which kind of draw to generate for a category.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawFormat {
    /// Seeded single elimination with classification brackets.
    #[default]
    Elimination,
    /// Round-robin groups.
    Groups,
}

/// Per-category draw configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
    pub format: DrawFormat,
    pub players_per_group: usize,
    /// How many players advance from each group to the main draw (used by the
    /// surrounding application when it closes the group phase).
    pub advance_to_main: usize,
    /// Sets format for score validation (best of N).
    pub best_of: u32,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            format: DrawFormat::Elimination,
            players_per_group: 4,
            advance_to_main: 2,
            best_of: 3,
        }
    }
}

impl DrawConfig {
    /// Sets a player must win for a valid result.
    pub fn sets_to_win(&self) -> u32 {
        self.best_of / 2 + 1
    }
}

/// Full draw state for one category: registrations plus the generated
/// brackets/matches or groups, held as flat id-linked collections.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub config: DrawConfig,
    pub created_at: DateTime<Utc>,
    /// Set by the most recent draw generation; None until a draw exists.
    pub draw_generated_at: Option<DateTime<Utc>>,
    pub registrations: Vec<Registration>,
    pub brackets: Vec<Bracket>,
    pub matches: Vec<BracketMatch>,
    pub groups: Vec<Group>,
    pub group_players: Vec<GroupPlayer>,
    pub group_matches: Vec<GroupMatch>,
}

impl Category {
    /// Create an empty category with the default configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            config: DrawConfig::default(),
            created_at: Utc::now(),
            draw_generated_at: None,
            registrations: Vec::new(),
            brackets: Vec::new(),
            matches: Vec::new(),
            groups: Vec::new(),
            group_players: Vec::new(),
            group_matches: Vec::new(),
        }
    }

    /// Register a player. Names must be unique (case-insensitive); seeds must
    /// be unique when present.
    pub fn add_registration(
        &mut self,
        name: impl Into<String>,
        seed: Option<u32>,
    ) -> Result<RegistrationId, DrawError> {
        let name = name.into();
        let name_trimmed = name.trim();
        if name_trimmed.is_empty() {
            return Err(DrawError::EmptyName);
        }
        if self
            .registrations
            .iter()
            .any(|r| r.name.eq_ignore_ascii_case(name_trimmed))
        {
            return Err(DrawError::DuplicateName);
        }
        if let Some(s) = seed {
            if s > 0 && self.registrations.iter().any(|r| r.seed == Some(s)) {
                return Err(DrawError::DuplicateSeed(s));
            }
        }
        let registration = match seed {
            Some(s) if s > 0 => Registration::seeded(name_trimmed, s),
            _ => Registration::new(name_trimmed),
        };
        let id = registration.id;
        self.registrations.push(registration);
        Ok(id)
    }

    /// Remove a registration. Only valid before a draw has been generated.
    pub fn remove_registration(&mut self, id: RegistrationId) -> Result<(), DrawError> {
        if self.draw_generated_at.is_some() {
            return Err(DrawError::DrawAlreadyGenerated);
        }
        let idx = self
            .registrations
            .iter()
            .position(|r| r.id == id)
            .ok_or(DrawError::RegistrationNotFound(id))?;
        self.registrations.remove(idx);
        Ok(())
    }

    pub fn bracket_match(&self, id: MatchId) -> Option<&BracketMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn bracket_match_mut(&mut self, id: MatchId) -> Option<&mut BracketMatch> {
        self.matches.iter_mut().find(|m| m.id == id)
    }

    pub fn main_bracket(&self) -> Option<&Bracket> {
        self.brackets
            .iter()
            .find(|b| b.bracket_type == BracketType::Main)
    }

    pub fn bracket_by_range(&self, range_start: u32, range_end: u32) -> Option<&Bracket> {
        self.brackets
            .iter()
            .find(|b| b.range_start == range_start && b.range_end == range_end)
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn group_match(&self, id: GroupMatchId) -> Option<&GroupMatch> {
        self.group_matches.iter().find(|m| m.id == id)
    }

    pub fn group_match_mut(&mut self, id: GroupMatchId) -> Option<&mut GroupMatch> {
        self.group_matches.iter_mut().find(|m| m.id == id)
    }

    /// Matches of one bracket, for display: outer rounds first, then by position.
    pub fn bracket_matches(&self, bracket_id: BracketId) -> Vec<&BracketMatch> {
        let mut matches: Vec<&BracketMatch> = self
            .matches
            .iter()
            .filter(|m| m.bracket_id == bracket_id)
            .collect();
        matches.sort_by(|a, b| b.round.cmp(&a.round).then(a.position.cmp(&b.position)));
        matches
    }

    /// Destroy all brackets, matches, and groups (both draw formats).
    pub fn clear_draw(&mut self) {
        self.brackets.clear();
        self.matches.clear();
        self.groups.clear();
        self.group_players.clear();
        self.group_matches.clear();
        self.draw_generated_at = None;
    }
}
