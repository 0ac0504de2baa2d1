//! Tracing/logging initialization.
//!
//! JSON lines on stdout, filtered by `RUST_LOG` (falling back to the filter
//! passed to [`init`]). Each line carries `timestamp`, `level`, `target` and the
//! event `fields`.
//!
//! Trust-boundary events and their fields:
//!
//! | target | level | message | fields |
//! |---|---|---|---|
//! | `formgate_api::middleware` | warn | `signed identity rejected` | `reason`, `user_id`, `path` |
//! | `formgate_api::middleware` | warn | `no plan tier asserted; defaulting to lowest tier` | `user_id`, `tier` |
//! | `formgate_auth::shadow` | info | `provisioned shadow identity` | `user_id` |
//! | `formgate_auth::shadow` | warn | `shadow identity provisioning failed` | `user_id`, `error`, `retry_error` |
//! | `formgate_api::app::routes::forms` | info | `schema feature gate denied` | `user_id`, `tier`, `denial` |
//!
//! `reason` is one of the `AuthFailure::reason()` codes and never reaches the
//! client. Secrets and signatures are never logged.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let active = filter.to_string();

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(true)
        .try_init()
        .is_ok();

    if installed {
        ::tracing::debug!(filter = %active, "tracing initialized");
    }
}
