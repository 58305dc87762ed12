/// Branch circuit collector module.
/// Collects per-branch current, capacity, status and state.
///
/// Available when:
/// - `all-collectors` feature is enabled, OR
/// - `collector-branches` feature is explicitly enabled
#[cfg(feature = "collector-branches")]
pub mod branches;

/// Input cord collector module.
/// Collects cord power, apparent power, energy, frequency and imbalance.
///
/// Available when:
/// - `all-collectors` feature is enabled, OR
/// - `collector-cords` feature is explicitly enabled
#[cfg(feature = "collector-cords")]
pub mod cords;

/// Device vocabulary to numeric code conversions shared by all categories.
pub mod encoding;

/// Error types and handling utilities.
/// Common error types used across all collectors.
pub mod error;

/// Input line collector module.
/// Collects per-line current and capacity.
///
/// Available when:
/// - `all-collectors` feature is enabled, OR
/// - `collector-lines` feature is explicitly enabled
#[cfg(feature = "collector-lines")]
pub mod lines;

/// Over-current protector collector module.
/// Collects breaker and fuse ratings and trip status.
///
/// Available when:
/// - `all-collectors` feature is enabled, OR
/// - `collector-ocps` feature is explicitly enabled
#[cfg(feature = "collector-ocps")]
pub mod ocps;

/// Outlet collector module.
/// Collects per-receptacle power, current, voltage and reactance.
///
/// Available when:
/// - `all-collectors` feature is enabled, OR
/// - `collector-outlets` feature is explicitly enabled
#[cfg(feature = "collector-outlets")]
pub mod outlets;

/// Phase collector module.
/// Collects per-phase power, voltage, deviation and reactance.
///
/// Available when:
/// - `all-collectors` feature is enabled, OR
/// - `collector-phases` feature is explicitly enabled
#[cfg(feature = "collector-phases")]
pub mod phases;

/// Collector registration and runtime enable/disable state.
pub mod registry;

/// System summary collector module.
/// Collects active users, aggregate statuses and uptime.
///
/// Available when:
/// - `all-collectors` feature is enabled, OR
/// - `collector-system` feature is explicitly enabled
#[cfg(feature = "collector-system")]
pub mod system;

/// The mapper trait every category implements.
pub mod traits;

/// Shared result and outcome types.
pub mod types;

/// Unit enclosure collector module.
/// Collects display orientation, outlet sequence and unit status.
///
/// Available when:
/// - `all-collectors` feature is enabled, OR
/// - `collector-units` feature is explicitly enabled
#[cfg(feature = "collector-units")]
pub mod units;

// ----------------------------------------------------------------------------
// Re-exports for public API
// ----------------------------------------------------------------------------

#[cfg(feature = "collector-branches")]
pub use branches::{Branch, BranchesMapper};
#[cfg(feature = "collector-cords")]
pub use cords::{Cord, CordsMapper};
/// Collector error type.
pub use error::CollectorError;
#[cfg(feature = "collector-lines")]
pub use lines::{Line, LinesMapper};
#[cfg(feature = "collector-ocps")]
pub use ocps::{Ocp, OcpsMapper};
#[cfg(feature = "collector-outlets")]
pub use outlets::{Outlet, OutletsMapper};
#[cfg(feature = "collector-phases")]
pub use phases::{Phase, PhasesMapper};
/// Collector registry for managing all available collectors.
pub use registry::{CollectorRegistry, Collectors, EnabledCollector, MapperOptions};
#[cfg(feature = "collector-system")]
pub use system::{SystemInfo, SystemMapper};
/// Core trait for category mappers.
pub use traits::CategoryMapper;
/// Common result types for collector operations.
pub use types::{CollectorOutcome, CollectorResult};
#[cfg(feature = "collector-units")]
pub use units::{Unit, UnitsMapper};
