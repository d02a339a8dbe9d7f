/// Router Module Index
///
/// Routes are grouped by the role that may use them. Each handler runs its own role
/// gate, so the grouping is organisational; no route relies on a layer above it for
/// authorization.

/// Unauthenticated routes (health check).
pub mod public;

/// HTML pages for the `admin` role.
pub mod admin;

/// HTML pages for the `teacher` role.
pub mod teacher;

/// JSON endpoints for the `teacher` role.
pub mod api;
