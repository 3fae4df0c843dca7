//! Brackets and bracket matches: the elimination tree and its advancement links.

use crate::models::registration::RegistrationId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a bracket.
pub type BracketId = Uuid;

/// Unique identifier for a bracket match.
pub type MatchId = Uuid;

/// Score summary used for byes and walkovers.
pub const WALKOVER: &str = "W.O.";

/// Score summary used when a player withdraws mid-match.
pub const RETIREMENT: &str = "Ret.";

/// Kind of bracket: the main draw or a classification (placement) bracket.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketType {
    Main,
    Classification,
}

/// One elimination tree within a category. The main bracket decides 1st
/// place; classification brackets decide the placement band
/// `[range_start, range_end]` (e.g. places 5-8).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub id: BracketId,
    pub bracket_type: BracketType,
    pub name: String,
    /// 0 for the main bracket; otherwise the first placement this bracket decides.
    pub consolation_level: u32,
    pub range_start: u32,
    pub range_end: u32,
}

impl Bracket {
    /// Number of players this bracket ranks.
    pub fn size(&self) -> u32 {
        self.range_end - self.range_start + 1
    }
}

/// Which side of a match a player occupies (or a link targets).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotSide {
    One,
    Two,
}

impl SlotSide {
    pub fn other(self) -> SlotSide {
        match self {
            SlotSide::One => SlotSide::Two,
            SlotSide::Two => SlotSide::One,
        }
    }

    /// Side fed by a match at `position` in the round above: odd positions feed side one.
    pub fn from_position(position: u32) -> SlotSide {
        if position % 2 == 1 {
            SlotSide::One
        } else {
            SlotSide::Two
        }
    }
}

/// State of one side of a match.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Not yet assigned (only while the first round is being planned).
    Undetermined,
    /// Will be filled by the winner or loser of the given match.
    AwaitingFeeder(MatchId),
    /// No player will ever arrive here; the opponent advances.
    Bye,
    Occupied(RegistrationId),
}

impl Slot {
    pub fn player(&self) -> Option<RegistrationId> {
        match self {
            Slot::Occupied(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied(_))
    }
}

/// Lifecycle of a match.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    Completed,
    /// A player withdrew mid-match; terminal, advances like Completed.
    Retired,
}

/// Where a match's winner or loser goes next.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NextSlot {
    pub match_id: MatchId,
    pub side: SlotSide,
}

/// Per-set score, in slot order (`p1` belongs to side one).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SetScore {
    pub p1: u32,
    pub p2: u32,
}

/// A single match in a bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketMatch {
    pub id: MatchId,
    pub bracket_id: BracketId,
    /// Number of matches in this round; 1 is the bracket's final.
    pub round: u32,
    /// 1-based position within the round.
    pub position: u32,
    pub slot1: Slot,
    pub slot2: Slot,
    pub winner_id: Option<RegistrationId>,
    pub status: MatchStatus,
    /// Per-set tallies once a real result has been entered.
    pub score: Option<Vec<SetScore>>,
    pub score_summary: Option<String>,
    /// Static advancement links, computed once at generation time.
    pub winner_next: Option<NextSlot>,
    pub loser_next: Option<NextSlot>,
}

impl BracketMatch {
    pub fn new(bracket_id: BracketId, round: u32, position: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            bracket_id,
            round,
            position,
            slot1: Slot::Undetermined,
            slot2: Slot::Undetermined,
            winner_id: None,
            status: MatchStatus::Pending,
            score: None,
            score_summary: None,
            winner_next: None,
            loser_next: None,
        }
    }

    pub fn slot(&self, side: SlotSide) -> &Slot {
        match side {
            SlotSide::One => &self.slot1,
            SlotSide::Two => &self.slot2,
        }
    }

    pub fn slot_mut(&mut self, side: SlotSide) -> &mut Slot {
        match side {
            SlotSide::One => &mut self.slot1,
            SlotSide::Two => &mut self.slot2,
        }
    }

    pub fn player(&self, side: SlotSide) -> Option<RegistrationId> {
        self.slot(side).player()
    }

    /// Both completed and retired matches advance players.
    pub fn is_finished(&self) -> bool {
        matches!(self.status, MatchStatus::Completed | MatchStatus::Retired)
    }

    /// The non-winner occupant, if any (None for walkovers against a bye).
    pub fn loser_id(&self) -> Option<RegistrationId> {
        let winner = self.winner_id?;
        if self.slot1.player() == Some(winner) {
            self.slot2.player()
        } else {
            self.slot1.player()
        }
    }
}
