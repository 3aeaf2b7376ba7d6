/// Router Module Index
///
/// Routes are grouped by the access gate that wraps them, so a gate is applied once per
/// group (via Axum layers) instead of being remembered per handler.

/// Routes with no gate: health check, session hand-off and logout, API documentation.
pub mod public;

/// The landing page, wrapped by `auth::guest_only`.
pub mod guest;

/// Every recipe route, wrapped by `auth::require_auth`.
pub mod authenticated;
