//! Instruction word decoding.
//!
//! An instruction word `ABCDE` splits into the opcode `DE` and one mode digit
//! per parameter, read right to left: `C` for the first parameter, `B` for the
//! second, `A` for the third. Missing digits mean position mode.

use crate::error::VmError;
use crate::isa::{self, Descriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterMode {
    /// Operand is an address.
    Position,
    /// Operand is the value itself.
    Immediate,
    /// Operand is an address offset from the relative base.
    Relative,
}

impl ParameterMode {
    fn from_digit(digit: i64) -> Option<Self> {
        match digit {
            0 => Some(ParameterMode::Position),
            1 => Some(ParameterMode::Immediate),
            2 => Some(ParameterMode::Relative),
            _ => None,
        }
    }
}

/// Mode digits of an instruction word, with the opcode stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modes(i64);

impl Modes {
    /// Mode of the `index`th parameter (zero based).
    pub fn get(&self, index: usize) -> Option<ParameterMode> {
        ParameterMode::from_digit(self.digit(index))
    }

    /// Raw mode digit, for diagnostics.
    pub fn digit(&self, index: usize) -> i64 {
        u32::try_from(index)
            .ok()
            .and_then(|i| 10i64.checked_pow(i))
            .map_or(0, |scale| (self.0 / scale) % 10)
    }
}

/// A decoded instruction word.
#[derive(Debug, Clone, Copy)]
pub enum Word {
    Halt,
    Instruction(Decoded),
}

#[derive(Debug, Clone, Copy)]
pub struct Decoded {
    pub descriptor: &'static Descriptor,
    pub modes: Modes,
}

impl Decoded {
    /// Mode of one parameter of the instruction stored at `address`.
    pub fn mode(&self, parameter: usize, address: u64) -> Result<ParameterMode, VmError> {
        self.modes
            .get(parameter)
            .ok_or(VmError::InvalidParameterMode {
                mode: self.modes.digit(parameter),
                parameter,
                address,
            })
    }
}

/// Split an instruction word into its opcode and mode digits.
pub fn split(word: i64) -> (i64, Modes) {
    (word % 100, Modes(word / 100))
}

/// Decode the word stored at `address` against the process-wide table.
pub fn decode(word: i64, address: u64) -> Result<Word, VmError> {
    if word < 0 {
        return Err(VmError::UnknownOpcode {
            opcode: word,
            address,
        });
    }

    let (opcode, modes) = split(word);
    if opcode == isa::HALT {
        return Ok(Word::Halt);
    }
    let descriptor = isa::table()
        .get(opcode)
        .ok_or(VmError::UnknownOpcode { opcode, address })?;
    Ok(Word::Instruction(Decoded { descriptor, modes }))
}
