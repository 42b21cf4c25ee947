//! Leave request types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Category of a leave request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveType {
    Annual,
    Sick,
    Casual,
    /// Unpaid leave draws from an effectively unlimited balance and is
    /// never decremented on approval.
    Unpaid,
}

impl LeaveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Sick => "sick",
            Self::Casual => "casual",
            Self::Unpaid => "unpaid",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "annual" => Some(Self::Annual),
            "sick" => Some(Self::Sick),
            "casual" => Some(Self::Casual),
            "unpaid" => Some(Self::Unpaid),
            _ => None,
        }
    }

    /// Capitalized label for calendar titles
    pub fn label(&self) -> &'static str {
        match self {
            Self::Annual => "Annual",
            Self::Sick => "Sick",
            Self::Casual => "Casual",
            Self::Unpaid => "Unpaid",
        }
    }
}

/// Lifecycle status of a leave request
///
/// Transitions: `pending -> approved | rejected | cancelled`,
/// `approved -> cancelled`. Rejected and cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Calendar/UI color for this status
    pub fn color(&self) -> &'static str {
        match self {
            Self::Pending => "#F59E0B",
            Self::Approved => "#10B981",
            Self::Rejected => "#EF4444",
            Self::Cancelled => "#6B7280",
        }
    }
}

/// Which half of the day a half-day request covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HalfDayPeriod {
    Morning,
    Afternoon,
}

impl HalfDayPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "morning" => Some(Self::Morning),
            "afternoon" => Some(Self::Afternoon),
            _ => None,
        }
    }
}

/// Calendar event for a leave request, shaped for FullCalendar-style
/// consumers (camelCase keys, exclusive `end` date).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: NaiveDate,
    /// Exclusive end: the day after the last day of leave
    pub end: NaiveDate,
    pub background_color: String,
    pub border_color: String,
    pub text_color: String,
    pub extended_props: CalendarEventProps,
}

/// Full request detail carried alongside a calendar event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventProps {
    pub employee_id: String,
    pub employee_name: String,
    pub leave_type: String,
    pub status: String,
    pub reason: String,
    pub total_days: f64,
    pub review_comment: String,
}
