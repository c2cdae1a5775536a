use super::{Operation, Site, Step};
use crate::dex::{ClassName, MethodRef};
use crate::util::CodeAddress;
use crate::vm::{Error, MethodContext, SideEffect, Value};

/// Classes whose methods (and initialization) have no effect outside of their arguments
///
/// All of them are final, so a call on one of them can't end up in an override.
/// `java/lang/StringBuilder` mutates its receiver, so calls on it are only free of side effects
/// when the receiver was allocated locally.
const SIDE_EFFECT_FREE_CLASSES: [ClassName; 12] = [
    ClassName::STRING,
    ClassName::STRING_BUILDER,
    ClassName::MATH,
    ClassName::STRICT_MATH,
    ClassName::BOOLEAN,
    ClassName::BYTE,
    ClassName::CHARACTER,
    ClassName::SHORT,
    ClassName::INTEGER,
    ClassName::LONG,
    ClassName::FLOAT,
    ClassName::DOUBLE,
];

pub fn is_side_effect_free_class(class: &ClassName) -> bool {
    SIDE_EFFECT_FREE_CLASSES.contains(class)
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum InvokeKind {
    Virtual,
    Super,
    Direct,
    Static,
    Interface,
}

/// `invoke-*`, `invoke-*/range`
///
/// Calls are opaque: the result is unknown and arrays passed in may have been modified.
#[derive(Clone, Debug)]
pub struct Invoke {
    pub site: Site,
    pub kind: InvokeKind,

    /// Argument registers, including both halves of wide arguments
    pub arguments: Vec<u16>,

    pub method: MethodRef,
}

impl Invoke {
    /// Registers holding the receiver (if any) and then each parameter
    ///
    /// The second register of a wide argument is skipped.
    pub fn argument_registers(&self) -> Vec<u16> {
        let mut registers = self.arguments.iter().copied();
        let mut found = vec![];
        if self.kind != InvokeKind::Static {
            found.extend(registers.next());
        }
        for parameter in &self.method.descriptor.parameters {
            found.extend(registers.next());
            if parameter.is_wide() {
                registers.next();
            }
        }
        found
    }

    /// Does the call stay inside side-effect-free library code?
    ///
    /// Methods of `java/lang/Object` may be overridden by the receiver's class, and `wait` and
    /// `notify*` synchronise with other threads. Only calls that don't dispatch qualify.
    fn is_library_call(&self) -> bool {
        if self.method.class == ClassName::OBJECT {
            matches!(self.kind, InvokeKind::Direct | InvokeKind::Static)
        } else {
            is_side_effect_free_class(&self.method.class)
        }
    }

    fn classify(&self, receiver: Option<&Value>) -> SideEffect {
        if self.method.class == ClassName::STRING_BUILDER {
            match receiver {
                Some(Value::Instance(_)) => SideEffect::None,
                _ => SideEffect::Strong,
            }
        } else if self.is_library_call() {
            SideEffect::None
        } else {
            SideEffect::Strong
        }
    }
}

impl Operation for Invoke {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![self.site.next]
    }

    fn side_effect(&self) -> SideEffect {
        if self.is_library_call() && self.method.class != ClassName::STRING_BUILDER {
            SideEffect::None
        } else {
            SideEffect::Strong
        }
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        let mut arguments = Vec::with_capacity(self.arguments.len());
        for register in self.argument_registers() {
            arguments.push(context.read_register(register)?.clone());
        }
        let receiver = match self.kind {
            InvokeKind::Static => None,
            _ => arguments.first(),
        };
        let side_effect = self.classify(receiver);

        let mut context = context.clone();
        if side_effect == SideEffect::Strong {
            for argument in &arguments {
                if let Value::Array(_) = argument {
                    context.invalidate_aliases(argument, None);
                }
            }
        }
        let result = self
            .method
            .descriptor
            .return_type
            .clone()
            .map(Value::unknown);
        context.set_result(result);

        Ok(self.site.fall_through(context).with_side_effect(side_effect))
    }
}
