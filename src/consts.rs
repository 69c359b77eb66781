//! Shared numeric constants for the editor crate.

// ── Playback ────────────────────────────────────────────────────

/// Playback tick rate in frames per second.
pub const TICKS_PER_SECOND: u32 = 30;

/// Interval between playback ticks in milliseconds, rounded down.
pub const TICK_INTERVAL_MS: u32 = 1000 / TICKS_PER_SECOND;

/// Default last frame of the timeline (inclusive).
pub const DEFAULT_MAX_FRAME: u32 = 120;

/// Upper bound accepted for a configured timeline length.
pub const MAX_TIMELINE_FRAMES: u32 = 100_000;

// ── Camera ──────────────────────────────────────────────────────

/// Default orbit distance from the origin.
pub const DEFAULT_RADIUS: f32 = 10.0;

/// Default azimuth in radians.
pub const DEFAULT_THETA: f32 = std::f32::consts::FRAC_PI_4;

/// Default polar angle in radians, measured from +Y.
pub const DEFAULT_PHI: f32 = 1.1;

/// Closest allowed orbit distance.
pub const DEFAULT_MIN_RADIUS: f32 = 2.0;

/// Farthest allowed orbit distance.
pub const DEFAULT_MAX_RADIUS: f32 = 50.0;

/// Radius change per wheel event.
pub const DEFAULT_ZOOM_STEP: f32 = 0.5;

/// Orbit radians per unit of NDC pointer travel.
pub const DEFAULT_ORBIT_SENSITIVITY: f32 = std::f32::consts::PI;

/// Polar clamp margin keeping the camera off the poles.
pub const PHI_EPSILON: f32 = 0.01;

/// Default vertical field of view in degrees.
pub const DEFAULT_FOV_Y_DEG: f32 = 60.0;

/// Near clip plane distance.
pub const Z_NEAR: f32 = 0.1;

/// Far clip plane distance.
pub const Z_FAR: f32 = 1000.0;

// ── Gizmo ───────────────────────────────────────────────────────

/// Length of each move-gizmo axis handle in world units.
pub const GIZMO_AXIS_LENGTH: f32 = 1.5;

/// Pick distance around an axis handle in world units.
pub const GIZMO_PICK_RADIUS: f32 = 0.15;

/// Radius of the rotate-gizmo ring in world units.
pub const GIZMO_RING_RADIUS: f32 = 1.2;

/// Half-width of the pickable band around the rotate ring.
pub const GIZMO_RING_TOLERANCE: f32 = 0.15;

/// Length of the move-gizmo guide lines on each side of the origin.
pub const GIZMO_GUIDE_LENGTH: f32 = 50.0;

/// Y-rotation radians per unit of horizontal NDC pointer travel.
pub const DEFAULT_ROTATE_SENSITIVITY: f32 = std::f32::consts::PI;

/// Smallest `|n·d|` for which a ray-plane intersection is considered stable.
pub const PLANE_PARALLEL_EPSILON: f32 = 1e-4;

// ── Scene ───────────────────────────────────────────────────────

/// First swatch of the host palette; hosts pass it to `add_object` for new objects.
pub const DEFAULT_COLOR: u32 = 0x00_88_CC;

/// Largest valid 24-bit RGB color.
pub const MAX_COLOR: u32 = 0x00FF_FFFF;

/// Radius of the sky backdrop sphere.
pub const SKY_RADIUS: f32 = 500.0;

/// Radius of a rig joint sphere.
pub const RIG_JOINT_RADIUS: f32 = 0.12;

/// Half-thickness of a rig bone box.
pub const RIG_BONE_HALF_WIDTH: f32 = 0.05;
