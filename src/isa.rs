//! Intcode instruction set.
//!
//! Every instruction is declared once in [`DECLARATIONS`]: its opcode, its
//! parameter roles and the handler that carries out its effect. The
//! [`InstructionTable`] is built from that list the first time it is needed
//! and shared read-only by every [`Computer`](crate::Computer) for the rest of
//! the process.
//!
//! # Parameter roles
//!
//! - [`Role::Read`]: the operand is resolved to a value through its mode.
//! - [`Role::Write`]: the operand is resolved to an address and never
//!   dereferenced. Immediate mode is rejected.
//! - [`Role::JumpTarget`]: resolved like a read; the value becomes the new
//!   instruction pointer if the handler takes the branch.

use std::fmt;
use std::sync::LazyLock;

use log::debug;

use crate::core::Memory;
use crate::error::{TableError, VmError};
use crate::io::{InputChannel, OutputChannel};

/// Instruction word that stops the machine. Carries no operands.
pub const HALT: i64 = Opcode::Halt as i64;

/// Opcodes are the two low decimal digits of an instruction word.
const OPCODE_SLOTS: usize = 100;

/// Widest parameter list an instruction may declare.
pub const MAX_PARAMETERS: usize = 3;

/// Known operation codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// c = a + b
    Add = 1,
    /// c = a * b
    Multiply = 2,
    /// a = next input
    Input = 3,
    /// emit a
    Output = 4,
    /// if a != 0, ip = b
    JumpIfTrue = 5,
    /// if a == 0, ip = b
    JumpIfFalse = 6,
    /// c = (a < b) as i64
    LessThan = 7,
    /// c = (a == b) as i64
    Equals = 8,
    /// relative_base += a
    AdjustRelativeBase = 9,
    /// stop; carries no operands
    Halt = 99,
}

impl Opcode {
    pub fn number(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Read,
    Write,
    JumpTarget,
}

/// What a handler asks the engine to do once it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Advance past the instruction.
    Continue,
    /// Set the instruction pointer to the given value.
    Jump(i64),
    /// No input was available. Nothing was committed and the instruction
    /// must be retried on the next resume.
    AwaitInput,
    /// A value was pushed to the output channel; advance, then suspend.
    Emitted,
}

/// Machine state a handler may touch.
pub struct Context<'a> {
    pub memory: &'a mut Memory,
    pub relative_base: &'a mut i64,
    pub input: &'a mut dyn InputChannel,
    pub output: &'a mut dyn OutputChannel,
}

/// Operands arrive already resolved: values for read and jump-target
/// parameters, addresses for write parameters.
pub type Handler = fn(&mut Context<'_>, &[i64]) -> Result<Effect, VmError>;

/// Declared instruction: opcode, role signature and handler.
#[derive(Clone, Copy)]
pub struct Instruction {
    pub opcode: Opcode,
    pub name: &'static str,
    pub roles: &'static [Role],
    pub handler: Handler,
}

impl Instruction {
    pub fn parameter_count(&self) -> usize {
        self.roles.len()
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("opcode", &self.opcode)
            .field("name", &self.name)
            .field("roles", &self.roles)
            .finish()
    }
}

/// Handler shape derived from the role signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Reads operands and stores into the final write parameter.
    Store,
    /// Reads operands and may jump to the final jump-target parameter.
    Branch,
    /// Reads operands only.
    Sink,
}

impl Shape {
    fn classify(instruction: &Instruction) -> Result<Self, TableError> {
        let unclassifiable = |reason| TableError::Unclassifiable {
            name: instruction.name,
            reason,
        };

        let (last, leading) = instruction
            .roles
            .split_last()
            .ok_or_else(|| unclassifiable("no parameters"))?;
        if instruction.roles.len() > MAX_PARAMETERS {
            return Err(unclassifiable("too many parameters"));
        }
        if leading.iter().any(|role| *role != Role::Read) {
            return Err(unclassifiable(
                "write and jump-target parameters must come last",
            ));
        }

        Ok(match last {
            Role::Read => Shape::Sink,
            Role::Write => Shape::Store,
            Role::JumpTarget if leading.is_empty() => {
                return Err(unclassifiable("jump target without a condition"));
            }
            Role::JumpTarget => Shape::Branch,
        })
    }
}

/// Table entry for one opcode.
#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    pub instruction: Instruction,
    pub shape: Shape,
}

impl Descriptor {
    pub fn opcode(&self) -> u8 {
        self.instruction.opcode.number()
    }

    pub fn name(&self) -> &'static str {
        self.instruction.name
    }

    pub fn roles(&self) -> &'static [Role] {
        self.instruction.roles
    }

    pub fn parameter_count(&self) -> usize {
        self.instruction.parameter_count()
    }
}

/// Opcode to descriptor mapping.
pub struct InstructionTable {
    slots: [Option<Descriptor>; OPCODE_SLOTS],
}

impl InstructionTable {
    /// Build a table from a registration list, rejecting duplicate,
    /// reserved or malformed declarations.
    pub fn build(declarations: &[Instruction]) -> Result<Self, TableError> {
        let mut slots = [None; OPCODE_SLOTS];

        for instruction in declarations {
            let opcode = instruction.opcode.number();
            if opcode == 0 || i64::from(opcode) == HALT || opcode as usize >= OPCODE_SLOTS {
                return Err(TableError::ReservedOpcode {
                    name: instruction.name,
                    opcode,
                });
            }

            let slot: &mut Option<Descriptor> = &mut slots[opcode as usize];
            if let Some(existing) = slot {
                return Err(TableError::DuplicateOpcode {
                    opcode,
                    first: existing.name(),
                    second: instruction.name,
                });
            }

            let shape = Shape::classify(instruction)?;
            debug!(
                "{} ({}) -> {:?} ({} parameters)",
                instruction.name,
                opcode,
                shape,
                instruction.parameter_count()
            );
            *slot = Some(Descriptor {
                instruction: *instruction,
                shape,
            });
        }

        Ok(Self { slots })
    }

    pub fn get(&self, opcode: i64) -> Option<&Descriptor> {
        usize::try_from(opcode)
            .ok()
            .and_then(|index| self.slots.get(index))
            .and_then(Option::as_ref)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Descriptor> {
        self.slots.iter().flatten()
    }
}

/// Process-wide instruction table.
pub fn table() -> &'static InstructionTable {
    static TABLE: LazyLock<InstructionTable> = LazyLock::new(|| {
        InstructionTable::build(DECLARATIONS)
            .unwrap_or_else(|err| panic!("instruction table is malformed: {err}"))
    });
    &TABLE
}

use Role::{JumpTarget, Read, Write};

/// Registration list for the supported instruction set.
pub const DECLARATIONS: &[Instruction] = &[
    Instruction {
        opcode: Opcode::Add,
        name: "Add",
        roles: &[Read, Read, Write],
        handler: add,
    },
    Instruction {
        opcode: Opcode::Multiply,
        name: "Multiply",
        roles: &[Read, Read, Write],
        handler: multiply,
    },
    Instruction {
        opcode: Opcode::Input,
        name: "Input",
        roles: &[Write],
        handler: input,
    },
    Instruction {
        opcode: Opcode::Output,
        name: "Output",
        roles: &[Read],
        handler: output,
    },
    Instruction {
        opcode: Opcode::JumpIfTrue,
        name: "JumpIfTrue",
        roles: &[Read, JumpTarget],
        handler: jump_if_true,
    },
    Instruction {
        opcode: Opcode::JumpIfFalse,
        name: "JumpIfFalse",
        roles: &[Read, JumpTarget],
        handler: jump_if_false,
    },
    Instruction {
        opcode: Opcode::LessThan,
        name: "LessThan",
        roles: &[Read, Read, Write],
        handler: less_than,
    },
    Instruction {
        opcode: Opcode::Equals,
        name: "Equals",
        roles: &[Read, Read, Write],
        handler: equals,
    },
    Instruction {
        opcode: Opcode::AdjustRelativeBase,
        name: "AdjustRelativeBase",
        roles: &[Read],
        handler: adjust_relative_base,
    },
];

fn add(ctx: &mut Context<'_>, ops: &[i64]) -> Result<Effect, VmError> {
    ctx.memory.write(ops[2], ops[0].wrapping_add(ops[1]))?;
    Ok(Effect::Continue)
}

fn multiply(ctx: &mut Context<'_>, ops: &[i64]) -> Result<Effect, VmError> {
    ctx.memory.write(ops[2], ops[0].wrapping_mul(ops[1]))?;
    Ok(Effect::Continue)
}

fn input(ctx: &mut Context<'_>, ops: &[i64]) -> Result<Effect, VmError> {
    if !ctx.input.has_value() {
        return Ok(Effect::AwaitInput);
    }
    match ctx.input.next() {
        Some(value) => {
            ctx.memory.write(ops[0], value)?;
            Ok(Effect::Continue)
        }
        None => Ok(Effect::AwaitInput),
    }
}

fn output(ctx: &mut Context<'_>, ops: &[i64]) -> Result<Effect, VmError> {
    ctx.output.add_output(ops[0]);
    Ok(Effect::Emitted)
}

fn jump_if_true(_: &mut Context<'_>, ops: &[i64]) -> Result<Effect, VmError> {
    Ok(if ops[0] != 0 {
        Effect::Jump(ops[1])
    } else {
        Effect::Continue
    })
}

fn jump_if_false(_: &mut Context<'_>, ops: &[i64]) -> Result<Effect, VmError> {
    Ok(if ops[0] == 0 {
        Effect::Jump(ops[1])
    } else {
        Effect::Continue
    })
}

fn less_than(ctx: &mut Context<'_>, ops: &[i64]) -> Result<Effect, VmError> {
    ctx.memory.write(ops[2], i64::from(ops[0] < ops[1]))?;
    Ok(Effect::Continue)
}

fn equals(ctx: &mut Context<'_>, ops: &[i64]) -> Result<Effect, VmError> {
    ctx.memory.write(ops[2], i64::from(ops[0] == ops[1]))?;
    Ok(Effect::Continue)
}

fn adjust_relative_base(ctx: &mut Context<'_>, ops: &[i64]) -> Result<Effect, VmError> {
    *ctx.relative_base = ctx.relative_base.wrapping_add(ops[0]);
    Ok(Effect::Continue)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    fn noop(_: &mut Context<'_>, _: &[i64]) -> Result<Effect, VmError> {
        Ok(Effect::Continue)
    }

    const fn decl(opcode: Opcode, name: &'static str, roles: &'static [Role]) -> Instruction {
        Instruction {
            opcode,
            name,
            roles,
            handler: noop,
        }
    }

    #[test]
    fn table_covers_declared_opcodes() {
        let table = table();
        for opcode in 1..=9 {
            let descriptor = table.get(opcode).expect("opcode registered");
            assert_eq!(i64::from(descriptor.opcode()), opcode);
        }
        assert!(table.get(0).is_none());
        assert!(table.get(HALT).is_none());
        assert!(table.get(-1).is_none());
        assert!(table.get(1234).is_none());
        assert_eq!(table.iter().count(), DECLARATIONS.len());
    }

    #[test]
    fn table_classifies_shapes() {
        let table = table();
        assert_eq!(table.get(1).unwrap().shape, Shape::Store);
        assert_eq!(table.get(3).unwrap().shape, Shape::Store);
        assert_eq!(table.get(4).unwrap().shape, Shape::Sink);
        assert_eq!(table.get(5).unwrap().shape, Shape::Branch);
        assert_eq!(table.get(6).unwrap().parameter_count(), 2);
        assert_eq!(table.get(8).unwrap().roles(), &[Read, Read, Write]);
    }

    #[test]
    fn build_rejects_duplicate_opcodes() {
        let decls = [
            decl(Opcode::Add, "Add", &[Read, Read, Write]),
            decl(Opcode::Add, "Plus", &[Read, Read, Write]),
        ];
        let err = InstructionTable::build(&decls).err();
        assert_eq!(
            err,
            Some(TableError::DuplicateOpcode {
                opcode: 1,
                first: "Add",
                second: "Plus",
            })
        );
    }

    #[test]
    fn build_rejects_halt_declaration() {
        let decls = [decl(Opcode::Halt, "Stop", &[Read])];
        assert!(matches!(
            InstructionTable::build(&decls),
            Err(TableError::ReservedOpcode { opcode: 99, .. })
        ));
    }

    #[test]
    fn build_rejects_unclassifiable_signatures() {
        let cases: [&'static [Role]; 5] = [
            &[],
            &[Read, Read, Read, Write],
            &[Write, Read],
            &[JumpTarget],
            &[Read, JumpTarget, Write],
        ];
        for roles in cases {
            let decls = [decl(Opcode::Add, "Odd", roles)];
            assert!(
                matches!(
                    InstructionTable::build(&decls),
                    Err(TableError::Unclassifiable { name: "Odd", .. })
                ),
                "roles {roles:?} should be rejected"
            );
        }
    }

    #[test]
    fn input_handler_waits_without_committing() {
        let mut memory = Memory::new(vec![5, 5]);
        let mut base = 0;
        let mut input: VecDeque<i64> = VecDeque::new();
        let mut output: Vec<i64> = Vec::new();

        let mut ctx = Context {
            memory: &mut memory,
            relative_base: &mut base,
            input: &mut input,
            output: &mut output,
        };
        assert_eq!(super::input(&mut ctx, &[1]), Ok(Effect::AwaitInput));
        assert_eq!(memory.read(1), Ok(5));

        input.push_back(11);
        let mut ctx = Context {
            memory: &mut memory,
            relative_base: &mut base,
            input: &mut input,
            output: &mut output,
        };
        assert_eq!(super::input(&mut ctx, &[1]), Ok(Effect::Continue));
        assert_eq!(memory.read(1), Ok(11));
        assert!(input.is_empty());
    }

    #[test]
    fn branch_handlers() {
        let mut memory = Memory::default();
        let mut base = 0;
        let mut input: VecDeque<i64> = VecDeque::new();
        let mut output: Vec<i64> = Vec::new();
        let mut ctx = Context {
            memory: &mut memory,
            relative_base: &mut base,
            input: &mut input,
            output: &mut output,
        };

        assert_eq!(jump_if_true(&mut ctx, &[3, 40]), Ok(Effect::Jump(40)));
        assert_eq!(jump_if_true(&mut ctx, &[0, 40]), Ok(Effect::Continue));
        assert_eq!(jump_if_false(&mut ctx, &[0, 12]), Ok(Effect::Jump(12)));
        assert_eq!(jump_if_false(&mut ctx, &[-1, 12]), Ok(Effect::Continue));

        adjust_relative_base(&mut ctx, &[19]).unwrap();
        adjust_relative_base(&mut ctx, &[-4]).unwrap();
        assert_eq!(*ctx.relative_base, 15);
    }
}
