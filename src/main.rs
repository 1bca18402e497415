// Copyright (C) 2025 Dayton Fishell
// Intcode Virtual Machine
// This file is part of intcode.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version. See the LICENSE file in the project root for details.
// SPDX-License-Identifier: GPL-3.0-or-later

// Command-line host for the Intcode computer.
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use intcode_core::{Computer, Interrupt, RunConfig};
use log::info;

#[derive(Parser, Debug)]
#[command(name = "intcode", about = "Run an Intcode program")]
struct Args {
    /// Program file containing comma-separated integers.
    program: PathBuf,

    /// Input value to queue; repeat for several.
    #[arg(short = 'i', long = "input", allow_negative_numbers = true)]
    inputs: Vec<i64>,

    /// YAML or JSON run configuration (needs the `serde-spec` feature).
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Print final memory once the program halts.
    #[arg(long)]
    dump: bool,

    /// Prompt on stdin when queued inputs run out.
    #[arg(long)]
    interactive: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RunConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RunConfig::default(),
    }
    .with_inputs(args.inputs);
    config.dump_memory |= args.dump;
    config.interactive |= args.interactive;

    let text = std::fs::read_to_string(&args.program)
        .with_context(|| format!("reading program {}", args.program.display()))?;
    let mut computer: Computer = text
        .parse()
        .with_context(|| format!("parsing program {}", args.program.display()))?;

    let mut input: VecDeque<i64> = config.inputs.iter().copied().collect();
    let mut output: VecDeque<i64> = VecDeque::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        match computer.resume(&mut input, &mut output)? {
            Interrupt::AwaitingInput => {
                if !config.interactive {
                    bail!(
                        "program wants input at address {} but no more inputs were given",
                        computer.instruction_pointer()
                    );
                }
                print!("input> ");
                io::stdout().flush()?;
                let line = match lines.next() {
                    Some(line) => line?,
                    None => bail!("stdin closed while the program was waiting for input"),
                };
                let value = line
                    .trim()
                    .parse::<i64>()
                    .with_context(|| format!("{:?} is not an integer", line.trim()))?;
                input.push_back(value);
            }
            Interrupt::OutputReady => {
                while let Some(value) = output.pop_front() {
                    println!("{value}");
                }
            }
            Interrupt::Terminated => break,
        }
    }

    info!(
        "halted after {} instructions",
        computer.instructions_executed()
    );
    if config.dump_memory {
        println!("{computer}");
    }
    Ok(())
}
