use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// One record per (activity, user) pair; recording again overwrites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendance {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub activity_id: ObjectId,
    pub user_id: ObjectId,
    pub status: AttendanceStatus,
    pub recorded_by: Option<ObjectId>,
    pub notes: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "present" => Some(AttendanceStatus::Present),
            "absent" => Some(AttendanceStatus::Absent),
            _ => None,
        }
    }
}

impl Attendance {
    pub const COLLECTION: &'static str = "attendance";
}
