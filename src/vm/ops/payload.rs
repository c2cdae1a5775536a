use super::{Operation, Site, Step};
use crate::dex::FieldType;
use crate::util::CodeAddress;
use crate::vm::{ArrayValue, Error, MethodContext, PseudoReturn, SideEffect, Value};

/// `packed-switch-payload`, `sparse-switch-payload`
///
/// Switches are resolved against their payload up front, so these are only data.
#[derive(Clone, Debug)]
pub struct SwitchPayload {
    pub site: Site,
}

impl Operation for SwitchPayload {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![]
    }

    fn execute(&self, _context: &MethodContext) -> Result<Step, Error> {
        Err(Error::malformed(
            self.site.address,
            self.site.opcode,
            "switch payloads cannot be executed",
        ))
    }
}

/// `fill-array-data`
///
/// Jumps to the array payload, which fills the array and then comes back to the instruction
/// after this one.
#[derive(Clone, Debug)]
pub struct FillArrayData {
    pub site: Site,
    pub array: u16,
    pub payload: CodeAddress,
}

impl Operation for FillArrayData {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![self.payload]
    }

    fn side_effect(&self) -> SideEffect {
        SideEffect::Strong
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        let side_effect = match context.read_register(self.array)? {
            Value::Array(_) => SideEffect::None,
            _ => SideEffect::Strong,
        };
        let mut context = context.clone();
        context.set_pseudo_return(Some(PseudoReturn {
            address: self.site.next,
            register: self.array,
        }));
        Ok(Step::to(self.payload, context).with_side_effect(side_effect))
    }
}

/// `array-payload`
#[derive(Clone, Debug)]
pub struct ArrayPayload {
    pub site: Site,

    /// Width of each element in bytes
    pub element_width: u16,

    /// Elements, as raw little-endian bits
    pub elements: Vec<i64>,
}

impl ArrayPayload {
    /// Contents of the array once filled, if they can be determined
    fn fill(&self, array: &ArrayValue) -> Option<ArrayValue> {
        let base_type = match &array.element_type {
            FieldType::Base(base_type) => *base_type,
            FieldType::Ref(_) => return None,
        };

        // Too many elements throws `ArrayIndexOutOfBoundsException`
        if self.elements.len() > array.elements.len() {
            return None;
        }

        let mut filled = array.clone();
        for (slot, bits) in filled.elements.iter_mut().zip(&self.elements) {
            *slot = Value::from_bits(base_type, *bits);
        }
        Some(filled)
    }
}

impl Operation for ArrayPayload {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![]
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        let pseudo_return = context
            .pseudo_return()
            .ok_or(Error::MissingPseudoReturn(self.site.address))?;
        let array = context.read_register(pseudo_return.register)?;

        let (filled, side_effect) = match array {
            Value::Array(local) => match self.fill(local) {
                Some(filled) => (Value::Array(filled), SideEffect::None),
                None => (Value::unknown(array.value_type()), SideEffect::None),
            },
            _ => (Value::unknown(array.value_type()), SideEffect::Strong),
        };

        let mut context = context.clone();
        context.set_pseudo_return(None);
        context.invalidate_aliases(array, Some(pseudo_return.register));
        context.assign_register(pseudo_return.register, filled)?;
        Ok(Step::to(pseudo_return.address, context).with_side_effect(side_effect))
    }
}
