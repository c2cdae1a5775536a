use super::{Operation, Site, Step};
use crate::dex::FieldRef;
use crate::util::CodeAddress;
use crate::vm::{Error, MethodContext, SideEffect, Value};

/// Whether a field is read or written
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum FieldAccess {
    Get,
    Put,
}

/// `iget*`, `iput*`
///
/// Fields are not tracked, so reads are always unknown. Writing a field of an object allocated
/// by this method is only a weak side effect.
#[derive(Clone, Debug)]
pub struct InstanceField {
    pub site: Site,
    pub access: FieldAccess,

    /// Destination (for gets) or source (for puts)
    pub register: u16,

    pub object: u16,
    pub field: FieldRef,
}

impl Operation for InstanceField {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![self.site.next]
    }

    fn side_effect(&self) -> SideEffect {
        match self.access {
            FieldAccess::Get => SideEffect::None,
            FieldAccess::Put => SideEffect::Strong,
        }
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        let object = context.read_register(self.object)?;
        match self.access {
            FieldAccess::Get => {
                let mut context = context.clone();
                context.assign_register(
                    self.register,
                    Value::unknown(self.field.field_type.clone()),
                )?;
                Ok(self.site.fall_through(context))
            }
            FieldAccess::Put => {
                context.read_register(self.register)?;
                let side_effect = match object {
                    Value::Instance(_) => SideEffect::Weak,
                    _ => SideEffect::Strong,
                };
                Ok(self
                    .site
                    .fall_through(context.clone())
                    .with_side_effect(side_effect))
            }
        }
    }
}

/// `sget*`, `sput*`
///
/// Reading a static field may trigger class initialization. Writing one is always observable.
#[derive(Clone, Debug)]
pub struct StaticField {
    pub site: Site,
    pub access: FieldAccess,

    /// Destination (for gets) or source (for puts)
    pub register: u16,

    pub field: FieldRef,
}

impl Operation for StaticField {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![self.site.next]
    }

    fn side_effect(&self) -> SideEffect {
        match self.access {
            FieldAccess::Get => SideEffect::Weak,
            FieldAccess::Put => SideEffect::Strong,
        }
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        let context = match self.access {
            FieldAccess::Get => {
                let mut context = context.clone();
                context.assign_register(
                    self.register,
                    Value::unknown(self.field.field_type.clone()),
                )?;
                context
            }
            FieldAccess::Put => {
                context.read_register(self.register)?;
                context.clone()
            }
        };
        Ok(self
            .site
            .fall_through(context)
            .with_side_effect(self.side_effect()))
    }
}
