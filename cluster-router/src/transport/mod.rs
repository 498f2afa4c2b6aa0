/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Transport boundary layer.
//!
//! Declares the two services this crate consumes, the topology authority and the
//! per-cluster Foghorn edges, as object-safe async traits, plus `tonic`-backed
//! implementations. Everything above this layer only sees the traits.

pub mod foghorn;
pub mod grpc;
pub mod proto;
pub mod quartermaster;
