//! Global constants for rk-aag

/// Distance below which two points or offsets are considered equal
pub const LINEAR_TOLERANCE: f64 = 1e-7;

/// Angular tolerance (radians) for parallel and tangent checks
pub const ANGULAR_TOLERANCE: f64 = 1e-9;

/// Default upper bound on the radius of a recognized hole
pub const DEFAULT_HOLE_RADIUS: f64 = 5.0;

/// A slot region must contain at least this many faces
pub const MIN_SLOT_FACES: usize = 3;

/// Growth steps between two cancellation checks
pub const CANCEL_CHECK_INTERVAL: usize = 64;

/// Current version of the serialized AAG snapshot
pub const SNAPSHOT_VERSION: u32 = 1;
