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

//! Value types shared by every layer.
//!
//! Endpoint descriptors identify physical connections, instruction ids and
//! logical endpoints address the logical streams multiplexed over them, and
//! [`Elements`] is the batch unit exchanged with a multiplexer.
//!
//! ```
//! use data_plane_client::{EndpointDescriptor, InstructionId, LogicalEndpoint};
//!
//! let descriptor = EndpointDescriptor::new("localhost:12345");
//! let output = LogicalEndpoint::data("instruction-1", "transform-out");
//!
//! assert_eq!(descriptor.url(), "localhost:12345");
//! assert_eq!(output.instruction_id(), &InstructionId::from("instruction-1"));
//! ```

pub(crate) mod elements;
pub(crate) mod endpoint;
pub(crate) mod instruction;
pub(crate) mod logical_endpoint;
