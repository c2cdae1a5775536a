use super::{FieldRef, FieldType, Format, MethodRef, Opcode};
use crate::util::Width;

/// A decoded instruction
///
/// Branch offsets are kept exactly as they are encoded: relative to the address of the
/// instruction holding them, in code units. Switch payload targets are relative to the switch
/// instruction, not to the payload.
#[derive(Clone, PartialEq, Debug)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operands: Operands,
}

/// Operands of an instruction, grouped by the kind of data the instruction refers to
#[derive(Clone, PartialEq, Debug)]
pub enum Operands {
    /// No operands (eg. `nop`, `return-void`)
    None,

    /// Only registers
    Registers(Vec<u16>),

    /// Registers followed by a literal (`const*`, `add-int/lit8`, ...)
    ///
    /// `const/high16` and `const-wide/high16` literals are stored already shifted into place.
    Literal { registers: Vec<u16>, literal: i64 },

    /// Registers followed by a branch offset (`goto`, `if-*`, switches, `fill-array-data`)
    Branch { registers: Vec<u16>, offset: i32 },

    /// String constant (`const-string`)
    String { register: u16, string: String },

    /// Type reference (`const-class`, `new-instance`, `new-array`, `filled-new-array`, ...)
    Type {
        registers: Vec<u16>,
        type_descriptor: FieldType,
    },

    /// Field reference (`iget*`, `iput*`, `sget*`, `sput*`)
    Field { registers: Vec<u16>, field: FieldRef },

    /// Method reference (`invoke-*`)
    Method {
        registers: Vec<u16>,
        method: MethodRef,
    },

    /// Contents of an `array-payload`
    ArrayPayload { element_width: u16, elements: Vec<i64> },

    /// Contents of a `packed-switch-payload`
    PackedSwitchPayload { first_key: i32, targets: Vec<i32> },

    /// Contents of a `sparse-switch-payload`
    SparseSwitchPayload { keys: Vec<i32>, targets: Vec<i32> },
}

impl Operands {
    /// Registers mentioned by the instruction (empty for payloads)
    pub fn registers(&self) -> &[u16] {
        match self {
            Operands::Registers(registers)
            | Operands::Literal { registers, .. }
            | Operands::Branch { registers, .. }
            | Operands::Type { registers, .. }
            | Operands::Field { registers, .. }
            | Operands::Method { registers, .. } => registers,
            Operands::String { register, .. } => std::slice::from_ref(register),
            Operands::None
            | Operands::ArrayPayload { .. }
            | Operands::PackedSwitchPayload { .. }
            | Operands::SparseSwitchPayload { .. } => &[],
        }
    }
}

impl Instruction {
    pub fn registers(opcode: Opcode, registers: &[u16]) -> Instruction {
        let operands = if registers.is_empty() {
            Operands::None
        } else {
            Operands::Registers(registers.to_vec())
        };
        Instruction { opcode, operands }
    }

    pub fn literal(opcode: Opcode, registers: &[u16], literal: i64) -> Instruction {
        Instruction {
            opcode,
            operands: Operands::Literal {
                registers: registers.to_vec(),
                literal,
            },
        }
    }

    pub fn branch(opcode: Opcode, registers: &[u16], offset: i32) -> Instruction {
        Instruction {
            opcode,
            operands: Operands::Branch {
                registers: registers.to_vec(),
                offset,
            },
        }
    }

    pub fn string(opcode: Opcode, register: u16, string: impl Into<String>) -> Instruction {
        Instruction {
            opcode,
            operands: Operands::String {
                register,
                string: string.into(),
            },
        }
    }

    pub fn type_(opcode: Opcode, registers: &[u16], type_descriptor: FieldType) -> Instruction {
        Instruction {
            opcode,
            operands: Operands::Type {
                registers: registers.to_vec(),
                type_descriptor,
            },
        }
    }

    pub fn field(opcode: Opcode, registers: &[u16], field: FieldRef) -> Instruction {
        Instruction {
            opcode,
            operands: Operands::Field {
                registers: registers.to_vec(),
                field,
            },
        }
    }

    pub fn method(opcode: Opcode, registers: &[u16], method: MethodRef) -> Instruction {
        Instruction {
            opcode,
            operands: Operands::Method {
                registers: registers.to_vec(),
                method,
            },
        }
    }

    pub fn array_payload(element_width: u16, elements: Vec<i64>) -> Instruction {
        Instruction {
            opcode: Opcode::ArrayPayload,
            operands: Operands::ArrayPayload {
                element_width,
                elements,
            },
        }
    }

    pub fn packed_switch_payload(first_key: i32, targets: Vec<i32>) -> Instruction {
        Instruction {
            opcode: Opcode::PackedSwitchPayload,
            operands: Operands::PackedSwitchPayload { first_key, targets },
        }
    }

    pub fn sparse_switch_payload(keys: Vec<i32>, targets: Vec<i32>) -> Instruction {
        Instruction {
            opcode: Opcode::SparseSwitchPayload,
            operands: Operands::SparseSwitchPayload { keys, targets },
        }
    }
}

impl Width for Instruction {
    fn width(&self) -> usize {
        if let Some(size) = self.opcode.format().size() {
            return size;
        }

        // Payload widths depend on their contents
        match (&self.operands, self.opcode.format()) {
            (
                Operands::ArrayPayload {
                    element_width,
                    elements,
                },
                Format::ArrayPayload,
            ) => 4 + (*element_width as usize * elements.len() + 1) / 2,
            (Operands::PackedSwitchPayload { targets, .. }, Format::PackedSwitchPayload) => {
                4 + 2 * targets.len()
            }
            (Operands::SparseSwitchPayload { targets, .. }, Format::SparseSwitchPayload) => {
                2 + 4 * targets.len()
            }

            // Mismatched payload operands get rejected when the operation is created
            _ => 1,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fixed_widths() {
        assert_eq!(Instruction::registers(Opcode::Nop, &[]).width(), 1);
        assert_eq!(Instruction::literal(Opcode::Const16, &[0], 3).width(), 2);
        assert_eq!(Instruction::literal(Opcode::ConstWide, &[0], 3).width(), 5);
        assert_eq!(Instruction::branch(Opcode::PackedSwitch, &[0], 8).width(), 3);
    }

    #[test]
    fn payload_widths() {
        assert_eq!(Instruction::array_payload(4, vec![1, 2, 3]).width(), 10);
        assert_eq!(Instruction::array_payload(1, vec![1, 2, 3]).width(), 6);
        assert_eq!(Instruction::array_payload(1, vec![]).width(), 4);
        assert_eq!(
            Instruction::packed_switch_payload(0, vec![4, 6]).width(),
            8
        );
        assert_eq!(
            Instruction::sparse_switch_payload(vec![1, 10], vec![4, 6]).width(),
            10
        );
    }

    #[test]
    fn registers() {
        assert_eq!(Instruction::registers(Opcode::ReturnVoid, &[]).operands, Operands::None);
        assert_eq!(
            Instruction::string(Opcode::ConstString, 3, "hi").operands.registers(),
            &[3]
        );
        assert!(Instruction::array_payload(4, vec![1])
            .operands
            .registers()
            .is_empty());
    }
}
