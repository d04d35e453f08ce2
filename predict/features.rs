//! # Feature Extraction
//!
//! Every feature is a named pure function `MemberRecord -> f64`, enumerated in
//! [`STANDARD_FEATURES`]. The table fixes the feature order for a run: the
//! matrix builder evaluates it top to bottom for every member, so the active
//! feature set is auditable in one place and each extractor is testable in
//! isolation.

use crate::record::MemberRecord;

/// A named feature extractor.
#[derive(Clone, Copy)]
pub struct FeatureDef {
    pub name: &'static str,
    pub extract: fn(&MemberRecord) -> f64,
}

/// CPT codes that count as emergency-department visits.
const ER_CPT_CODES: [&str; 5] = ["99281", "99282", "99283", "99284", "99285"];

fn indicator(present: bool) -> f64 {
    if present { 1.0 } else { 0.0 }
}

fn has_prediabetes(m: &MemberRecord) -> f64 {
    indicator(m.dx_codes.contains("R73.03"))
}

fn has_htn(m: &MemberRecord) -> f64 {
    indicator(m.dx_codes.contains("I10"))
}

fn has_lipid_disorder(m: &MemberRecord) -> f64 {
    indicator(m.dx_codes.contains("E78.0"))
}

fn has_depression(m: &MemberRecord) -> f64 {
    indicator(m.dx_codes.contains("F32.9"))
}

fn screened_skin_cancer(m: &MemberRecord) -> f64 {
    indicator(m.dx_codes.contains("Z12.83"))
}

fn cholesterol_tested(m: &MemberRecord) -> f64 {
    indicator(m.cpt_codes.contains("80061"))
}

fn mental_health_screen(m: &MemberRecord) -> f64 {
    indicator(m.cpt_codes.contains("96127"))
}

/// Proxy for an unmeasured adherence signal: members with a glucose test on
/// record (CPT 82947) are assigned the lower of two fixed levels.
fn medication_adherence(m: &MemberRecord) -> f64 {
    if m.cpt_codes.contains("82947") { 0.5 } else { 0.9 }
}

fn er_visits(m: &MemberRecord) -> f64 {
    ER_CPT_CODES
        .iter()
        .filter(|code| m.cpt_codes.contains(**code))
        .count() as f64
}

fn age(m: &MemberRecord) -> f64 {
    m.age
}

/// The standard feature set, in its fixed column order.
pub const STANDARD_FEATURES: &[FeatureDef] = &[
    FeatureDef { name: "has_prediabetes", extract: has_prediabetes },
    FeatureDef { name: "has_htn", extract: has_htn },
    FeatureDef { name: "has_lipid_disorder", extract: has_lipid_disorder },
    FeatureDef { name: "has_depression", extract: has_depression },
    FeatureDef { name: "screened_skin_cancer", extract: screened_skin_cancer },
    FeatureDef { name: "cholesterol_tested", extract: cholesterol_tested },
    FeatureDef { name: "mental_health_screen", extract: mental_health_screen },
    FeatureDef { name: "medication_adherence", extract: medication_adherence },
    FeatureDef { name: "er_visits", extract: er_visits },
    FeatureDef { name: "age", extract: age },
];
