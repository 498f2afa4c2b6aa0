//! Routing policy layer.
//!
//! Pure functions over a cached [`ClusterRoute`](crate::control_plane::cluster_route::ClusterRoute):
//! address precedence, legacy normalization, pool keying and fanout target
//! selection. Nothing here performs I/O.

pub mod address_resolution;
pub mod fanout_targets;
