use super::{Operation, Site, Step};
use crate::dex::{ClassName, FieldType, Opcode};
use crate::util::CodeAddress;
use crate::vm::{ArrayValue, Error, MethodContext, SideEffect, Value};

/// Arrays longer than this are not tracked element by element
pub const MAX_TRACKED_ARRAY_LENGTH: usize = 10_000;

/// Element type implied by an `aget*`/`aput*` opcode, for when the array itself is unknown
pub fn opcode_element_type(opcode: Opcode) -> FieldType {
    match opcode {
        Opcode::AgetWide | Opcode::AputWide => FieldType::long(),
        Opcode::AgetObject | Opcode::AputObject => FieldType::object(ClassName::OBJECT),
        Opcode::AgetBoolean | Opcode::AputBoolean => FieldType::boolean(),
        Opcode::AgetByte | Opcode::AputByte => FieldType::byte(),
        Opcode::AgetChar | Opcode::AputChar => FieldType::char(),
        Opcode::AgetShort | Opcode::AputShort => FieldType::short(),
        _ => FieldType::int(),
    }
}

/// Element type of the array in a register, falling back to what the opcode implies
fn element_type(array: &Value, opcode: Opcode) -> FieldType {
    array
        .value_type()
        .element_type()
        .unwrap_or_else(|| opcode_element_type(opcode))
}

/// Index into an array, if it is known and in bounds
fn checked_index(array: &ArrayValue, index: &Value) -> Option<usize> {
    let index = usize::try_from(index.as_int()?).ok()?;
    if index < array.elements.len() {
        Some(index)
    } else {
        None
    }
}

/// `new-array`
#[derive(Clone, Debug)]
pub struct NewArray {
    pub site: Site,
    pub dest: u16,
    pub size: u16,
    pub element_type: FieldType,
}

impl Operation for NewArray {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![self.site.next]
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        let size = context.read_register(self.size)?.as_int();
        let array = match size.map(usize::try_from) {
            Some(Ok(length)) if length <= MAX_TRACKED_ARRAY_LENGTH => Value::Array(ArrayValue {
                element_type: self.element_type.clone(),
                elements: vec![Value::default_for(&self.element_type); length],
            }),
            _ => Value::unknown(FieldType::array(self.element_type.clone())),
        };

        let mut context = context.clone();
        context.assign_register(self.dest, array)?;
        Ok(self.site.fall_through(context))
    }
}

/// `filled-new-array`, `filled-new-array/range`
#[derive(Clone, Debug)]
pub struct FilledNewArray {
    pub site: Site,
    pub elements: Vec<u16>,
    pub element_type: FieldType,
}

impl Operation for FilledNewArray {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![self.site.next]
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        let mut elements = Vec::with_capacity(self.elements.len());
        for register in &self.elements {
            elements.push(context.read_register(*register)?.coerce_to(&self.element_type));
        }

        let array = if elements.iter().all(Value::is_known) {
            Value::Array(ArrayValue {
                element_type: self.element_type.clone(),
                elements,
            })
        } else {
            Value::unknown(FieldType::array(self.element_type.clone()))
        };

        let mut context = context.clone();
        context.set_result(Some(array));
        Ok(self.site.fall_through(context))
    }
}

/// `array-length`
#[derive(Clone, Debug)]
pub struct ArrayLength {
    pub site: Site,
    pub dest: u16,
    pub array: u16,
}

impl Operation for ArrayLength {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![self.site.next]
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        let length = match context.read_register(self.array)? {
            Value::Array(array) => Value::Int(array.elements.len() as i32),
            _ => Value::unknown(FieldType::int()),
        };
        let mut context = context.clone();
        context.assign_register(self.dest, length)?;
        Ok(self.site.fall_through(context))
    }
}

/// `aget*`
#[derive(Clone, Debug)]
pub struct ArrayGet {
    pub site: Site,
    pub dest: u16,
    pub array: u16,
    pub index: u16,
}

impl Operation for ArrayGet {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![self.site.next]
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        let array = context.read_register(self.array)?;
        let index = context.read_register(self.index)?;
        let element = match array {
            Value::Array(local) => {
                checked_index(local, index).map(|idx| local.elements[idx].clone())
            }
            _ => None,
        };
        let element =
            element.unwrap_or_else(|| Value::unknown(element_type(array, self.site.opcode)));

        let mut context = context.clone();
        context.assign_register(self.dest, element)?;
        Ok(self.site.fall_through(context))
    }
}

/// `aput*`
///
/// Writing into an array allocated by this method is not a side effect. Any other array may be
/// shared with the caller, so writing into it is a strong side effect.
#[derive(Clone, Debug)]
pub struct ArrayPut {
    pub site: Site,
    pub value: u16,
    pub array: u16,
    pub index: u16,
}

impl Operation for ArrayPut {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![self.site.next]
    }

    fn side_effect(&self) -> SideEffect {
        SideEffect::Strong
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        let value = context.read_register(self.value)?;
        let array = context.read_register(self.array)?;
        let index = context.read_register(self.index)?;

        let (updated, side_effect) = match array {
            Value::Array(local) => {
                let updated = checked_index(local, index).map(|idx| {
                    let mut updated = local.clone();
                    updated.elements[idx] = value.coerce_to(&local.element_type);
                    Value::Array(updated)
                });
                (updated, SideEffect::None)
            }
            _ => (None, SideEffect::Strong),
        };
        let updated = updated.unwrap_or_else(|| Value::unknown(array.value_type()));

        let mut context = context.clone();
        context.invalidate_aliases(array, Some(self.array));
        context.assign_register(self.array, updated)?;
        Ok(self
            .site
            .fall_through(context)
            .with_side_effect(side_effect))
    }
}
