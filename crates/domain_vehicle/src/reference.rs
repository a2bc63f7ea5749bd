//! Reference catalog: the named items a vehicle record points at

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{ReferenceId, ValidationErrors};

/// Kinds of catalog items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Who the vehicle belongs to or is handled for
    Related,
    Mark,
    /// A model of a mark; always has the mark as parent
    CarType,
    ModelYear,
    Color,
    /// Auction or acquisition channel
    Action,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 6] = [
        ReferenceKind::Related,
        ReferenceKind::Mark,
        ReferenceKind::CarType,
        ReferenceKind::ModelYear,
        ReferenceKind::Color,
        ReferenceKind::Action,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Related => "related",
            ReferenceKind::Mark => "mark",
            ReferenceKind::CarType => "car_type",
            ReferenceKind::ModelYear => "model_year",
            ReferenceKind::Color => "color",
            ReferenceKind::Action => "action",
        }
    }

    fn max_name_len(&self) -> usize {
        match self {
            ReferenceKind::ModelYear => 4,
            ReferenceKind::Color => 50,
            _ => 100,
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferenceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReferenceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown reference kind: {s}"))
    }
}

/// A catalog item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceItem {
    pub id: ReferenceId,
    pub kind: ReferenceKind,
    pub name: String,
    /// The mark of a car type
    pub parent_id: Option<ReferenceId>,
    pub created_at: DateTime<Utc>,
}

/// Request for creating or renaming a catalog item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReferenceItem {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<ReferenceId>,
}

impl ReferenceItem {
    /// Builds an item, checking the shape rules that need no lookup
    ///
    /// Whether `parent_id` points at an existing mark is checked by the
    /// ledger service.
    pub fn create(kind: ReferenceKind, request: NewReferenceItem) -> Result<Self, ValidationErrors> {
        let name = request.name.trim().to_string();
        let mut errors = ValidationErrors::new();

        if name.is_empty() {
            errors.add("name", "must not be blank");
        } else if name.chars().count() > kind.max_name_len() {
            errors.add("name", format!("must be at most {} characters", kind.max_name_len()));
        }
        if kind == ReferenceKind::ModelYear && !name.chars().all(|c| c.is_ascii_digit()) {
            errors.add("name", "model year must be digits");
        }
        match (kind, request.parent_id) {
            (ReferenceKind::CarType, None) => errors.add("parent_id", "a car type needs its mark"),
            (ReferenceKind::CarType, Some(_)) => {}
            (_, Some(_)) => errors.add("parent_id", "only car types have a parent"),
            (_, None) => {}
        }
        errors.into_result()?;

        Ok(Self {
            id: ReferenceId::new_v7(),
            kind,
            name,
            parent_id: request.parent_id,
            created_at: Utc::now(),
        })
    }
}

impl fmt::Display for ReferenceItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in ReferenceKind::ALL {
            assert_eq!(kind.as_str().parse::<ReferenceKind>().unwrap(), kind);
        }
        assert!("engine".parse::<ReferenceKind>().is_err());
    }

    #[test]
    fn test_car_type_needs_mark() {
        let errors = ReferenceItem::create(
            ReferenceKind::CarType,
            NewReferenceItem { name: "Camry".to_string(), parent_id: None },
        )
        .unwrap_err();
        assert!(errors.has_field("parent_id"));
    }

    #[test]
    fn test_model_year_shape() {
        assert!(ReferenceItem::create(
            ReferenceKind::ModelYear,
            NewReferenceItem { name: "2019".to_string(), parent_id: None },
        )
        .is_ok());

        let errors = ReferenceItem::create(
            ReferenceKind::ModelYear,
            NewReferenceItem { name: "20a9".to_string(), parent_id: None },
        )
        .unwrap_err();
        assert!(errors.has_field("name"));
    }

    #[test]
    fn test_name_is_trimmed() {
        let item = ReferenceItem::create(
            ReferenceKind::Color,
            NewReferenceItem { name: "  White ".to_string(), parent_id: None },
        )
        .unwrap();
        assert_eq!(item.name, "White");
    }
}
