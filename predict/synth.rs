//! Synthetic cohorts for grounding and demonstration. Generation takes an
//! explicit count and a caller-supplied RNG, so simulated runs are
//! reproducible and testable without any interactive input.

use crate::record::MemberRecord;
use rand::Rng;
use rand::seq::SliceRandom;

/// Diagnosis codes drawn on during simulation.
pub const DX_CODE_POOL: [&str; 8] = [
    "R73.03", "Z00.00", "E11.9", "I10", "Z13.1", "Z12.83", "E78.0", "F32.9",
];

/// Procedure codes drawn on during simulation.
pub const CPT_CODE_POOL: [&str; 10] = [
    "82947", "99284", "99396", "83036", "99281", "99283", "80050", "11102", "80061", "96127",
];

/// Five members with known diabetes outcomes, used to anchor the relevance
/// weighting of a simulated cohort.
pub fn reference_members() -> Vec<MemberRecord> {
    vec![
        MemberRecord::new("M1", 57.0, &["R73.03"], &["82947", "99284"], Some(true)),
        MemberRecord::new("M2", 45.0, &["Z00.00"], &["99396"], Some(false)),
        MemberRecord::new(
            "M3",
            62.0,
            &["R73.03"],
            &["82947", "83036", "99283"],
            Some(true),
        ),
        MemberRecord::new("M4", 60.0, &["R73.03"], &["82947", "99284"], Some(true)),
        MemberRecord::new("M5", 50.0, &["Z00.00"], &["99396", "99281"], Some(false)),
    ]
}

/// Generates `count` members with unknown outcomes: ages uniform in 30..=80,
/// one or two diagnosis codes and one to three procedure codes sampled
/// without replacement from the pools.
pub fn synthetic_members<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<MemberRecord> {
    (0..count)
        .map(|i| {
            let age = rng.gen_range(30..=80) as f64;
            let dx_count = rng.gen_range(1..=2);
            let dx: Vec<&str> = DX_CODE_POOL
                .choose_multiple(rng, dx_count)
                .copied()
                .collect();
            let cpt_count = rng.gen_range(1..=3);
            let cpt: Vec<&str> = CPT_CODE_POOL
                .choose_multiple(rng, cpt_count)
                .copied()
                .collect();
            MemberRecord::new(&format!("R{}", i + 1), age, &dx, &cpt, None)
        })
        .collect()
}
