//! Intcode execution engine.
//!
//! A [`Computer`] owns its memory and registers and runs the
//! fetch-decode-execute loop inside [`Computer::resume`]. Control returns to
//! the host only at a suspension point:
//!
//! - [`Interrupt::AwaitingInput`]: the input instruction found no value. The
//!   instruction pointer still addresses that instruction, so the next resume
//!   retries it.
//! - [`Interrupt::OutputReady`]: a value was emitted and the instruction
//!   pointer has moved past the output instruction.
//! - [`Interrupt::Terminated`]: the halt instruction was reached. Any further
//!   resume fails with [`VmError::AlreadyTerminated`].

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use log::{debug, trace};

use crate::core::Memory;
use crate::decode::{self, Decoded, ParameterMode, Word};
use crate::error::VmError;
use crate::io::{InputChannel, OutputChannel};
use crate::isa::{self, Context, Effect, MAX_PARAMETERS, Role};
use crate::program::parse_program;

/// Why [`Computer::resume`] handed control back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    AwaitingInput,
    OutputReady,
    Terminated,
}

/// Execution state between resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Constructed, not yet resumed.
    Ready,
    AwaitingInput,
    OutputReady,
    Terminated,
}

impl From<Interrupt> for State {
    fn from(interrupt: Interrupt) -> Self {
        match interrupt {
            Interrupt::AwaitingInput => State::AwaitingInput,
            Interrupt::OutputReady => State::OutputReady,
            Interrupt::Terminated => State::Terminated,
        }
    }
}

/// A resumable Intcode machine.
#[derive(Debug, Clone)]
pub struct Computer {
    memory: Memory,
    ip: u64,
    relative_base: i64,
    state: State,
    instructions: u64,
}

impl Computer {
    pub fn new(program: Vec<i64>) -> Self {
        let memory = Memory::new(program);
        debug!("loaded program of {} cells", memory.len());
        Self {
            memory,
            ip: 0,
            relative_base: 0,
            state: State::Ready,
            instructions: 0,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state == State::Terminated
    }

    pub fn instruction_pointer(&self) -> u64 {
        self.ip
    }

    pub fn relative_base(&self) -> i64 {
        self.relative_base
    }

    /// Number of instructions fully executed so far.
    pub fn instructions_executed(&self) -> u64 {
        self.instructions
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Read a cell without touching machine state. `None` for negative
    /// addresses; cells never written read as `Some(0)`.
    pub fn get_memory_value(&self, address: i64) -> Option<i64> {
        self.memory.read(address).ok()
    }

    /// Patch a cell before (or between) resumes.
    pub fn set_memory_value(&mut self, address: i64, value: i64) -> Result<(), VmError> {
        self.memory.write(address, value)
    }

    /// Run until the program needs input, has produced output, or halts.
    pub fn resume(
        &mut self,
        input: &mut dyn InputChannel,
        output: &mut dyn OutputChannel,
    ) -> Result<Interrupt, VmError> {
        if self.state == State::Terminated {
            return Err(VmError::AlreadyTerminated);
        }

        loop {
            if let Some(interrupt) = self.step(input, output)? {
                debug!(
                    "interrupt {:?} at ip {} after {} instructions",
                    interrupt, self.ip, self.instructions
                );
                self.state = interrupt.into();
                return Ok(interrupt);
            }
        }
    }

    /// Feed `inputs` and run to completion, collecting every output.
    ///
    /// Fails with [`VmError::InputExhausted`] if the program asks for more
    /// input than was supplied.
    pub fn run(&mut self, inputs: impl IntoIterator<Item = i64>) -> Result<Vec<i64>, VmError> {
        let mut input: VecDeque<i64> = inputs.into_iter().collect();
        let mut outputs: Vec<i64> = Vec::new();
        loop {
            match self.resume(&mut input, &mut outputs)? {
                Interrupt::AwaitingInput => {
                    return Err(VmError::InputExhausted { address: self.ip });
                }
                Interrupt::OutputReady => {}
                Interrupt::Terminated => return Ok(outputs),
            }
        }
    }

    /// Execute one instruction. Returns the interrupt it raised, if any.
    fn step(
        &mut self,
        input: &mut dyn InputChannel,
        output: &mut dyn OutputChannel,
    ) -> Result<Option<Interrupt>, VmError> {
        let length = self.memory.len();
        if self.ip >= length {
            return Err(VmError::MemoryExhausted {
                pointer: self.ip,
                length,
            });
        }

        let word = self.memory.read_at(self.ip);
        if word == isa::HALT {
            return Ok(Some(Interrupt::Terminated));
        }
        let decoded = match decode::decode(word, self.ip)? {
            Word::Halt => return Ok(Some(Interrupt::Terminated)),
            Word::Instruction(decoded) => decoded,
        };

        let count = decoded.descriptor.parameter_count();
        let operands = self.resolve(&decoded)?;
        trace!(
            "{:>6}: {} {:?}",
            self.ip,
            decoded.descriptor.name(),
            &operands[..count]
        );

        let mut ctx = Context {
            memory: &mut self.memory,
            relative_base: &mut self.relative_base,
            input,
            output,
        };
        let effect = (decoded.descriptor.instruction.handler)(&mut ctx, &operands[..count])?;

        let next = self.ip + 1 + count as u64;
        let interrupt = match effect {
            Effect::Continue => {
                self.ip = next;
                None
            }
            Effect::Jump(target) => {
                self.ip = u64::try_from(target).map_err(|_| VmError::InvalidAddress(target))?;
                None
            }
            // the instruction is retried on the next resume
            Effect::AwaitInput => return Ok(Some(Interrupt::AwaitingInput)),
            Effect::Emitted => {
                self.ip = next;
                Some(Interrupt::OutputReady)
            }
        };
        self.instructions += 1;
        Ok(interrupt)
    }

    /// Resolve operands by role: values for reads and jump targets,
    /// addresses for writes.
    fn resolve(&self, decoded: &Decoded) -> Result<[i64; MAX_PARAMETERS], VmError> {
        let mut operands = [0; MAX_PARAMETERS];

        for (parameter, role) in decoded.descriptor.roles().iter().enumerate() {
            let raw = self.memory.read_at(self.ip + 1 + parameter as u64);
            let mode = decoded.mode(parameter, self.ip)?;

            operands[parameter] = match (role, mode) {
                (Role::Write, ParameterMode::Immediate) => {
                    return Err(VmError::InvalidWriteTarget {
                        instruction: decoded.descriptor.name(),
                        parameter,
                        address: self.ip,
                    });
                }
                (Role::Write, ParameterMode::Position) => raw,
                (Role::Write, ParameterMode::Relative) => self.relative_base.wrapping_add(raw),
                (_, ParameterMode::Position) => self.memory.read(raw)?,
                (_, ParameterMode::Immediate) => raw,
                (_, ParameterMode::Relative) => {
                    self.memory.read(self.relative_base.wrapping_add(raw))?
                }
            };
        }

        Ok(operands)
    }
}

impl FromStr for Computer {
    type Err = VmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_program(s).map(Computer::new)
    }
}

impl fmt::Display for Computer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.memory.render())
    }
}
