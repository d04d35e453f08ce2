//! # Member Records and Roster Loading
//!
//! This module is the entry point for cohort data. A roster is a JSON array
//! of member objects; each member carries a unique identifier, an age, two
//! families of claim codes (diagnosis and procedure), and an optional known
//! outcome. Absent code lists deserialize to empty sets — a member with no
//! claims history is ordinary input, never an error.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// One health-plan member, immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRecord {
    pub member_id: String,
    pub age: f64,
    /// Diagnosis-family codes (ICD-10-CM).
    #[serde(default)]
    pub dx_codes: AHashSet<String>,
    /// Procedure-family codes (CPT).
    #[serde(default)]
    pub cpt_codes: AHashSet<String>,
    /// Known outcome, absent for members whose outcome is to be predicted.
    #[serde(default)]
    pub outcome: Option<bool>,
}

impl MemberRecord {
    pub fn new(
        member_id: &str,
        age: f64,
        dx_codes: &[&str],
        cpt_codes: &[&str],
        outcome: Option<bool>,
    ) -> Self {
        Self {
            member_id: member_id.to_string(),
            age,
            dx_codes: dx_codes.iter().map(|c| c.to_string()).collect(),
            cpt_codes: cpt_codes.iter().map(|c| c.to_string()).collect(),
            outcome,
        }
    }
}

/// Errors raised while loading or validating a member roster.
#[derive(Error, Debug)]
pub enum RosterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse member roster JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate member id '{0}' in roster")]
    DuplicateId(String),
    #[error("member '{0}' has a non-finite age")]
    NonFiniteAge(String),
}

/// Loads a roster from a JSON file and validates identifier uniqueness.
pub fn load_roster(path: &Path) -> Result<Vec<MemberRecord>, RosterError> {
    let raw = fs::read_to_string(path)?;
    let members: Vec<MemberRecord> = serde_json::from_str(&raw)?;
    let mut seen = AHashSet::with_capacity(members.len());
    for member in &members {
        if !member.age.is_finite() {
            return Err(RosterError::NonFiniteAge(member.member_id.clone()));
        }
        if !seen.insert(member.member_id.as_str()) {
            return Err(RosterError::DuplicateId(member.member_id.clone()));
        }
    }
    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_roster(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn roster_round_trip() {
        let file = write_roster(
            r#"[
                {"member_id": "M1", "age": 57, "dx_codes": ["R73.03"],
                 "cpt_codes": ["82947", "99284"], "outcome": true},
                {"member_id": "M2", "age": 45, "dx_codes": ["Z00.00"],
                 "cpt_codes": ["99396"], "outcome": false}
            ]"#,
        );
        let members = load_roster(file.path()).unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].member_id, "M1");
        assert!(members[0].dx_codes.contains("R73.03"));
        assert_eq!(members[0].outcome, Some(true));
        assert_eq!(members[1].outcome, Some(false));
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let file = write_roster(r#"[{"member_id": "M1", "age": 40.5}]"#);
        let members = load_roster(file.path()).unwrap();
        assert!(members[0].dx_codes.is_empty());
        assert!(members[0].cpt_codes.is_empty());
        assert_eq!(members[0].outcome, None);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let file = write_roster(
            r#"[{"member_id": "M1", "age": 40}, {"member_id": "M1", "age": 41}]"#,
        );
        match load_roster(file.path()) {
            Err(RosterError::DuplicateId(id)) => assert_eq!(id, "M1"),
            other => panic!("expected DuplicateId, got {:?}", other.map(|m| m.len())),
        }
    }

    #[test]
    fn malformed_json_rejected() {
        let file = write_roster("not json");
        assert!(matches!(load_roster(file.path()), Err(RosterError::Json(_))));
    }
}
