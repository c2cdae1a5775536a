use super::{is_side_effect_free_class, Operation, Site, Step};
use crate::dex::{ClassName, FieldType, RefType};
use crate::util::CodeAddress;
use crate::vm::{Error, MethodContext, SideEffect, Value};

/// Is a known, non-null value definitely an instance of the type?
fn is_instance_of(value: &Value, target: &FieldType) -> Option<bool> {
    if !value.is_non_null_reference() {
        return None;
    }
    if *target == FieldType::object(ClassName::OBJECT) || value.value_type() == *target {
        Some(true)
    } else {
        None
    }
}

/// `new-instance`
///
/// Allocating an object may run the static initializer of its class.
#[derive(Clone, Debug)]
pub struct NewInstance {
    pub site: Site,
    pub dest: u16,
    pub class: ClassName,
}

impl Operation for NewInstance {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![self.site.next]
    }

    fn side_effect(&self) -> SideEffect {
        // A bare `java/lang/Object` has nothing to initialize
        if is_side_effect_free_class(&self.class) || self.class == ClassName::OBJECT {
            SideEffect::None
        } else {
            SideEffect::Weak
        }
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        let mut context = context.clone();
        context.assign_register(self.dest, Value::Instance(self.class.clone()))?;
        Ok(self
            .site
            .fall_through(context)
            .with_side_effect(self.side_effect()))
    }
}

/// `check-cast`
///
/// A value that can't be shown to pass the cast keeps only the type it was cast to.
#[derive(Clone, Debug)]
pub struct CheckCast {
    pub site: Site,
    pub register: u16,
    pub target: RefType,
}

impl Operation for CheckCast {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![self.site.next]
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        let target = FieldType::Ref(self.target.clone());
        let value = context.read_register(self.register)?;
        let passes = matches!(value, Value::Null) || is_instance_of(value, &target) == Some(true);

        let mut context = context.clone();
        if !passes {
            context.assign_register(self.register, Value::unknown(target))?;
        }
        Ok(self.site.fall_through(context))
    }
}

/// `instance-of`
#[derive(Clone, Debug)]
pub struct InstanceOf {
    pub site: Site,
    pub dest: u16,
    pub object: u16,
    pub target: RefType,
}

impl Operation for InstanceOf {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![self.site.next]
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        let target = FieldType::Ref(self.target.clone());
        let result = match context.read_register(self.object)? {
            Value::Null => Some(false),
            value => is_instance_of(value, &target),
        };
        let result = result.map_or_else(|| Value::unknown(FieldType::boolean()), Value::Boolean);

        let mut context = context.clone();
        context.assign_register(self.dest, result)?;
        Ok(self.site.fall_through(context))
    }
}
