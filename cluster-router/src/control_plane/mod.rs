//! Control-plane layer.
//!
//! Owns the per-tenant route model and its time-bounded cache. Entries are
//! resolved from the topology authority, normalized once at write time and
//! served only while fresh; a failed refresh is surfaced rather than masked
//! by stale data.

pub mod cluster_route;
pub mod route_cache;
