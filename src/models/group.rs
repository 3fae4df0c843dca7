//! Round-robin groups: pools, standings rows, and group matches.

use crate::models::bracket::{MatchStatus, SetScore};
use crate::models::registration::RegistrationId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a group.
pub type GroupId = Uuid;

/// Unique identifier for a group match.
pub type GroupMatchId = Uuid;

/// A round-robin pool within a category; every pair plays exactly once.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub order_num: u32,
}

/// A registration's standing row within a group. All counters are rebuilt
/// from completed matches on every update.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupPlayer {
    pub group_id: GroupId,
    pub registration_id: RegistrationId,
    /// Rank within the group, 1-based; 0 until first recomputed.
    pub position: u32,
    pub points: u32,
    pub matches_won: u32,
    pub matches_lost: u32,
    pub sets_won: u32,
    pub sets_lost: u32,
}

impl GroupPlayer {
    pub fn new(group_id: GroupId, registration_id: RegistrationId) -> Self {
        Self {
            group_id,
            registration_id,
            position: 0,
            points: 0,
            matches_won: 0,
            matches_lost: 0,
            sets_won: 0,
            sets_lost: 0,
        }
    }
}

/// One pairing within a group; no advancement links.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupMatch {
    pub id: GroupMatchId,
    pub group_id: GroupId,
    pub player1_id: RegistrationId,
    pub player2_id: RegistrationId,
    pub winner_id: Option<RegistrationId>,
    pub status: MatchStatus,
    pub score: Option<Vec<SetScore>>,
    pub score_summary: Option<String>,
}

impl GroupMatch {
    pub fn new(group_id: GroupId, player1_id: RegistrationId, player2_id: RegistrationId) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            player1_id,
            player2_id,
            winner_id: None,
            status: MatchStatus::Pending,
            score: None,
            score_summary: None,
        }
    }
}
