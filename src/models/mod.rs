//! Data structures for the club tournament engine: registrations, brackets, groups, categories.

mod bracket;
mod category;
mod group;
mod registration;

pub use bracket::{
    Bracket, BracketId, BracketMatch, BracketType, MatchId, MatchStatus, NextSlot, SetScore, Slot,
    SlotSide, RETIREMENT, WALKOVER,
};
pub use category::{Category, CategoryId, DrawConfig, DrawError, DrawFormat};
pub use group::{Group, GroupId, GroupMatch, GroupMatchId, GroupPlayer};
pub use registration::{Registration, RegistrationId};
