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

const PROTOS: [&str; 2] = ["proto/quartermaster.proto", "proto/foghorn.proto"];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // use vendored protoc instead of relying on user provided protobuf installation
    let protoc = protoc_bin_vendored::protoc_bin_path()
        .map_err(|err| format!("vendored protoc unavailable: {err:?}"))?;
    std::env::set_var("PROTOC", protoc);

    for proto in PROTOS {
        println!("cargo:rerun-if-changed={proto}");
        tonic_build::compile_protos(proto)?;
    }

    Ok(())
}
