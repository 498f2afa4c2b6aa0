//! Data-plane layer.
//!
//! Owns pooled Foghorn clients and the tenant-wide fanout coordinator that
//! turns a resolved route into concurrent per-edge calls.

pub mod foghorn_pool;
pub mod tenant_fanout;
