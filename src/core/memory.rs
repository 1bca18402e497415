use std::collections::HashMap;
use std::fmt::Write as _;

use crate::error::VmError;

/// Growable, zero-defaulted Intcode memory.
///
/// The loaded program lives in a dense vector; writes past its end land in a
/// sparse map so a program can poke far-away cells without the backing store
/// being pre-sized.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    program: Vec<i64>,
    extended: HashMap<u64, i64>,
    /// One past the highest address ever written, never below the program length.
    span: u64,
}

impl Memory {
    pub fn new(program: Vec<i64>) -> Self {
        let span = program.len() as u64;
        Self {
            program,
            extended: HashMap::new(),
            span,
        }
    }

    /// Read a cell. Cells never written read as zero.
    pub fn read(&self, address: i64) -> Result<i64, VmError> {
        let a = Self::index(address)?;
        Ok(self.read_at(a))
    }

    /// Write a cell, growing the store as needed.
    pub fn write(&mut self, address: i64, value: i64) -> Result<(), VmError> {
        let a = Self::index(address)?;
        if a < self.program.len() as u64 {
            self.program[a as usize] = value;
        } else {
            self.extended.insert(a, value);
        }
        self.span = self.span.max(a.saturating_add(1));
        Ok(())
    }

    pub(crate) fn read_at(&self, address: u64) -> i64 {
        if address < self.program.len() as u64 {
            self.program[address as usize]
        } else {
            self.extended.get(&address).copied().unwrap_or(0)
        }
    }

    /// Tracked extent of memory: the loaded program length, or one past the
    /// highest cell written beyond it.
    pub fn len(&self) -> u64 {
        self.span
    }

    pub fn is_empty(&self) -> bool {
        self.span == 0
    }

    /// Debug dump of every populated cell in address order.
    pub fn render(&self) -> String {
        let mut out = self
            .program
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let mut extra: Vec<_> = self.extended.iter().collect();
        extra.sort_unstable_by_key(|(address, _)| **address);
        for (address, value) in extra {
            if !out.is_empty() {
                out.push(',');
            }
            let _ = write!(out, "[{address}]={value}");
        }
        out
    }

    fn index(address: i64) -> Result<u64, VmError> {
        u64::try_from(address).map_err(|_| VmError::InvalidAddress(address))
    }
}
