use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// A volunteer event. `participants` is embedded in the activity document so
/// capacity checks and membership tests operate on a single unit of mutual
/// exclusion; `version` guards read-modify-write cycles against concurrent
/// writers on the same document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub owner_id: Option<ObjectId>,
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime,
    pub location: Option<String>,
    /// 0 means unlimited capacity.
    #[serde(default)]
    pub slots: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub state: ActivityState,
    #[serde(default)]
    pub status: ActivityStatus,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub media_urls: Vec<String>,
    #[serde(default)]
    pub version: i64,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: ObjectId,
    pub joined_at: DateTime,
    /// How many people this participant brings, themselves included.
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

/// Governs visibility and joinability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivityState {
    #[default]
    Draft,
    Open,
    Closed,
    Cancelled,
}

/// Display lifecycle, derived from state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    #[default]
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

impl ActivityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityState::Draft => "draft",
            ActivityState::Open => "open",
            ActivityState::Closed => "closed",
            ActivityState::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ActivityState::Draft),
            "open" => Some(ActivityState::Open),
            "closed" => Some(ActivityState::Closed),
            "cancelled" => Some(ActivityState::Cancelled),
            _ => None,
        }
    }
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Upcoming => "upcoming",
            ActivityStatus::Ongoing => "ongoing",
            ActivityStatus::Completed => "completed",
            ActivityStatus::Cancelled => "cancelled",
        }
    }
}

impl Activity {
    pub const COLLECTION: &'static str = "activities";

    /// Sum of participant counts.
    pub fn occupancy(&self) -> u64 {
        self.participants.iter().map(|p| p.count as u64).sum()
    }

    pub fn participant(&self, user_id: ObjectId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.user_id == user_id)
    }
}
