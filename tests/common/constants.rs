//! Shared constants for integration tests
//!
//! When the fixture catalog or the fake collaborators change, update only this file.

use promptify::features::FEATURE_COUNT;

// ============================================================================
// Fixture catalog
// ============================================================================

/// Very acoustic track, row 0.
pub const TRACK_1_ID: &str = "4uLU6hMCjMI75M1A2tKUQC";

/// Electronic track, row 1.
pub const TRACK_2_ID: &str = "0VjIjW4GlUZAMYd2vXMi3b";

/// Somewhere in between, row 2.
pub const TRACK_3_ID: &str = "7qiZfU4dY1lWllzX7mPBI3";

pub const TRACK_1_NAME: &str = "Blackbird";
pub const TRACK_2_NAME: &str = "Blinding Lights";
pub const TRACK_3_NAME: &str = "Shape of You";

/// Normalized feature rows of the fixture catalog, in row order.
pub const CATALOG_FEATURES: [[f32; FEATURE_COUNT]; 3] = [
    [0.95, 0.40, 0.20, 0.38, 0.35, 0.60],
    [0.10, 0.80, 0.90, 0.68, 0.55, 0.90],
    [0.50, 0.82, 0.65, 0.38, 0.93, 0.85],
];

// ============================================================================
// Fake collaborators
// ============================================================================

/// Platform ids the fake lookup hands out for known seed tracks.
pub const SEED_1_ID: &str = "seed-track-1";
pub const SEED_2_ID: &str = "seed-track-2";
pub const SEED_3_ID: &str = "seed-track-3";

/// Tracks the fake recommendation service proposes.
pub const RECOMMENDED_1_ID: &str = "recommended-1";
pub const RECOMMENDED_2_ID: &str = "recommended-2";
pub const RECOMMENDED_3_ID: &str = "recommended-3";

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for the test server to become ready
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Polling interval while waiting for the server
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

/// Request timeout for test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
