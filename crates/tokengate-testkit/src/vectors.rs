//! Mask evaluation vectors.
//!
//! Fixed inputs with expected outputs, shared by the unit and integration
//! tests and exportable as JSON for other implementations.

use serde::{Deserialize, Serialize};

use tokengate_core::{PermissionCodec, PermissionMask};

/// Mask granting slots 2 and 4.
pub const MOCK_PERMISSIONS: u64 = 816;

/// The expected result of one query against a stored mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Expectation {
    HasPermission { slot: u16, expected: bool },
    HasPermissions { query: u64, expected: bool },
    GetPermissions { query: u64, expected: u64 },
}

/// A stored mask and the queries evaluated against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskVector {
    pub name: String,
    pub stored: u64,
    pub expectations: Vec<Expectation>,
}

/// Every vector.
pub fn all_vectors() -> Vec<MaskVector> {
    vec![
        MaskVector {
            name: "single slots of 816".to_string(),
            stored: MOCK_PERMISSIONS,
            expectations: vec![
                Expectation::HasPermission { slot: 4, expected: true },
                Expectation::HasPermission { slot: 2, expected: true },
                Expectation::HasPermission { slot: 1, expected: false },
                Expectation::HasPermission { slot: 0, expected: false },
            ],
        },
        MaskVector {
            name: "superset query 819".to_string(),
            stored: MOCK_PERMISSIONS,
            expectations: vec![
                Expectation::HasPermissions { query: 819, expected: false },
                Expectation::HasPermissions { query: 816, expected: true },
                Expectation::HasPermissions { query: 0, expected: true },
            ],
        },
        MaskVector {
            name: "intersection with 771".to_string(),
            stored: MOCK_PERMISSIONS,
            expectations: vec![
                Expectation::GetPermissions { query: 771, expected: 768 },
                Expectation::GetPermissions { query: 819, expected: 816 },
                Expectation::GetPermissions { query: 3, expected: 0 },
            ],
        },
        MaskVector {
            name: "half pair is not a grant".to_string(),
            stored: 0b0110,
            expectations: vec![
                Expectation::HasPermission { slot: 0, expected: false },
                Expectation::HasPermission { slot: 1, expected: false },
                Expectation::HasPermissions { query: 0b0110, expected: true },
            ],
        },
    ]
}

/// Evaluate one expectation against `stored`; returns whether it holds.
pub fn check(codec: &PermissionCodec, stored: &PermissionMask, expectation: &Expectation) -> bool {
    match *expectation {
        Expectation::HasPermission { slot, expected } => {
            codec.has_permission(stored, slot).ok() == Some(expected)
        }
        Expectation::HasPermissions { query, expected } => {
            codec.has_permissions(stored, &PermissionMask::from(query)) == expected
        }
        Expectation::GetPermissions { query, expected } => {
            codec.intersect(stored, &PermissionMask::from(query)) == PermissionMask::from(expected)
        }
    }
}

/// Evaluate every vector; returns `(name, all expectations held)`.
pub fn verify_all_vectors() -> Vec<(String, bool)> {
    let codec = PermissionCodec::default();
    all_vectors()
        .iter()
        .map(|v| {
            let stored = PermissionMask::from(v.stored);
            let ok = v.expectations.iter().all(|e| check(&codec, &stored, e));
            (v.name.clone(), ok)
        })
        .collect()
}

/// All vectors as pretty-printed JSON.
pub fn vectors_json() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&all_vectors())
}
