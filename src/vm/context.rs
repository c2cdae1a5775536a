use super::{Error, Value};
use crate::util::CodeAddress;

/// Where to go once a payload pseudo-instruction has been executed
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PseudoReturn {
    /// Address of the instruction after the one that jumped to the payload
    pub address: CodeAddress,

    /// Register holding the array the payload fills
    pub register: u16,
}

/// Machine state at one point of the simulated execution of a method
///
/// Registers are numbered `v0` to `v{n-1}`, with the parameters in the last registers. A wide
/// value (`long` or `double`) lives in its first register and the second register of the pair
/// is left unassigned.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct MethodContext {
    registers: Vec<Option<Value>>,

    /// Number of registers (at the end of the frame) occupied by parameters
    parameter_registers: u16,

    /// Set by invocations and `filled-new-array`, consumed by `move-result*`
    result: Option<Value>,

    /// Value handed back to the caller, once a `return*` has been executed
    return_value: Option<Value>,

    pseudo_return: Option<PseudoReturn>,

    call_depth: usize,
}

impl MethodContext {
    /// Fresh state with every register unassigned
    pub fn new(registers: u16, parameter_registers: u16, call_depth: usize) -> Result<Self, Error> {
        if parameter_registers > registers {
            return Err(Error::RegisterOutOfBounds {
                register: parameter_registers - 1,
                registers,
            });
        }
        Ok(MethodContext {
            registers: vec![None; registers as usize],
            parameter_registers,
            result: None,
            return_value: None,
            pseudo_return: None,
            call_depth,
        })
    }

    pub fn register_count(&self) -> u16 {
        self.registers.len() as u16
    }

    pub fn parameter_registers(&self) -> u16 {
        self.parameter_registers
    }

    /// First register holding a parameter (`this` for instance methods)
    pub fn first_parameter_register(&self) -> u16 {
        self.register_count() - self.parameter_registers
    }

    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    fn check_bounds(&self, register: u16) -> Result<usize, Error> {
        if (register as usize) < self.registers.len() {
            Ok(register as usize)
        } else {
            Err(Error::RegisterOutOfBounds {
                register,
                registers: self.register_count(),
            })
        }
    }

    /// Contents of a register, if it has been assigned
    pub fn peek_register(&self, register: u16) -> Result<Option<&Value>, Error> {
        let idx = self.check_bounds(register)?;
        Ok(self.registers[idx].as_ref())
    }

    /// Contents of a register, which must have been assigned
    pub fn read_register(&self, register: u16) -> Result<&Value, Error> {
        self.peek_register(register)?
            .ok_or(Error::UnassignedRegister(register))
    }

    /// Write a register
    ///
    /// Wide values also claim the next register. Writing over the second half of a wide value
    /// clobbers that wide value.
    pub fn assign_register(&mut self, register: u16, value: Value) -> Result<(), Error> {
        let idx = self.check_bounds(register)?;
        if value.is_wide() {
            let upper = register
                .checked_add(1)
                .ok_or(Error::RegisterOutOfBounds {
                    register,
                    registers: self.register_count(),
                })
                .and_then(|upper| self.check_bounds(upper))?;
            self.registers[upper] = None;
        }
        if idx > 0 && self.registers[idx - 1].as_ref().map_or(false, Value::is_wide) {
            self.registers[idx - 1] = None;
        }
        self.registers[idx] = Some(value);
        Ok(())
    }

    /// Write a parameter, counting from the first parameter register
    pub fn assign_parameter(&mut self, offset: u16, value: Value) -> Result<(), Error> {
        let register = self.first_parameter_register() + offset;
        self.assign_register(register, value)
    }

    /// Replace every register (except `keep`) holding a value equal to `value` with an unknown
    /// value
    ///
    /// Without alias tracking, two registers holding equal arrays may be the same array, so
    /// modifying one means the contents of the other can no longer be trusted.
    pub fn invalidate_aliases(&mut self, value: &Value, keep: Option<u16>) {
        for (idx, slot) in self.registers.iter_mut().enumerate() {
            if Some(idx) == keep.map(usize::from) {
                continue;
            }
            let replacement = match slot {
                Some(held) if *held == *value => Some(Value::unknown(held.value_type())),
                _ => None,
            };
            if replacement.is_some() {
                *slot = replacement;
            }
        }
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn set_result(&mut self, value: Option<Value>) {
        self.result = value;
    }

    /// Remove the result, which must be present
    pub fn take_result(&mut self) -> Result<Value, Error> {
        self.result.take().ok_or(Error::MissingResult)
    }

    pub fn return_value(&self) -> Option<&Value> {
        self.return_value.as_ref()
    }

    pub fn set_return_value(&mut self, value: Option<Value>) {
        self.return_value = value;
    }

    pub fn pseudo_return(&self) -> Option<PseudoReturn> {
        self.pseudo_return
    }

    pub fn set_pseudo_return(&mut self, pseudo_return: Option<PseudoReturn>) {
        self.pseudo_return = pseudo_return;
    }

    /// Registers, along with their contents
    pub fn registers(&self) -> impl Iterator<Item = (u16, Option<&Value>)> {
        self.registers
            .iter()
            .enumerate()
            .map(|(idx, value)| (idx as u16, value.as_ref()))
    }
}
