// Copyright (C) 2025 Dayton Fishell
// Intcode Virtual Machine
// This file is part of intcode.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version. See the LICENSE file in the project root for details.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Intcode virtual machine
//!
//! This library provides a resumable Intcode computer: sparse addressable
//! memory, a declarative instruction table, an instruction decoder and a
//! fetch-decode-execute engine that suspends on host I/O.

pub mod computer;
pub mod config;
pub mod core;
pub mod decode;
pub mod error;
pub mod io;
pub mod isa;
pub mod program;

// Re-export commonly used types
pub use computer::{Computer, Interrupt, State};
pub use config::RunConfig;
pub use crate::core::Memory;
pub use error::{TableError, VmError};
pub use io::{InputChannel, NoInput, OutputChannel};
pub use program::parse_program;
