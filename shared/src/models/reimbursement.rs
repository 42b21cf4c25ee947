//! Reimbursement claim types

use serde::{Deserialize, Serialize};

/// Category of an expense claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    Travel,
    Food,
    OfficeSupplies,
    Internet,
    Other,
}

impl ClaimType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Travel => "travel",
            Self::Food => "food",
            Self::OfficeSupplies => "office_supplies",
            Self::Internet => "internet",
            Self::Other => "other",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "travel" => Some(Self::Travel),
            "food" => Some(Self::Food),
            "office_supplies" => Some(Self::OfficeSupplies),
            "internet" => Some(Self::Internet),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Lifecycle status of a claim; terminal once reviewed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Pending,
    Approved,
    Rejected,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_type_roundtrip() {
        for ty in [
            ClaimType::Travel,
            ClaimType::Food,
            ClaimType::OfficeSupplies,
            ClaimType::Internet,
            ClaimType::Other,
        ] {
            assert_eq!(ClaimType::from_db(ty.as_str()), Some(ty));
        }
        assert_eq!(ClaimType::from_db("equipment"), None);
    }

    #[test]
    fn test_office_supplies_serde() {
        assert_eq!(
            serde_json::to_string(&ClaimType::OfficeSupplies).unwrap(),
            "\"office_supplies\""
        );
    }

    #[test]
    fn test_claim_status_roundtrip() {
        for status in [
            ClaimStatus::Pending,
            ClaimStatus::Approved,
            ClaimStatus::Rejected,
        ] {
            assert_eq!(ClaimStatus::from_db(status.as_str()), Some(status));
        }
        assert_eq!(ClaimStatus::from_db("cancelled"), None);
    }
}
