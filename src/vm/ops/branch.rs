use super::{Operation, Site, Step};
use crate::util::CodeAddress;
use crate::vm::{Error, MethodContext, Value};
use std::cmp::Ordering;

/// Condition tested by an `if-*` instruction
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Ge,
    Gt,
    Le,
}

impl Comparison {
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Comparison::Eq => ordering == Ordering::Equal,
            Comparison::Ne => ordering != Ordering::Equal,
            Comparison::Lt => ordering == Ordering::Less,
            Comparison::Ge => ordering != Ordering::Less,
            Comparison::Gt => ordering == Ordering::Greater,
            Comparison::Le => ordering != Ordering::Greater,
        }
    }

    fn is_equality(self) -> bool {
        matches!(self, Comparison::Eq | Comparison::Ne)
    }

    /// Decide the comparison, if the operands are known well enough
    ///
    /// References can only be tested for equality, and only when `null` is involved: two equal
    /// non-null references may still be different objects.
    pub fn decide(self, lhs: &Value, rhs: &Value) -> Option<bool> {
        match (lhs, rhs) {
            (Value::Null, Value::Null) if self.is_equality() => Some(self == Comparison::Eq),
            (Value::Null, other) | (other, Value::Null)
                if self.is_equality() && other.is_non_null_reference() =>
            {
                Some(self == Comparison::Ne)
            }

            // `null` is the zero of `if-eqz`
            (Value::Null, Value::Int(0)) | (Value::Int(0), Value::Null) if self.is_equality() => {
                Some(self == Comparison::Eq)
            }
            (reference, Value::Int(0))
                if self.is_equality() && reference.is_non_null_reference() =>
            {
                Some(self == Comparison::Ne)
            }

            (lhs, rhs) if lhs.is_non_null_reference() || rhs.is_non_null_reference() => None,
            (lhs, rhs) => {
                let lhs = lhs.as_int()?;
                let rhs = rhs.as_int()?;
                Some(self.holds(lhs.cmp(&rhs)))
            }
        }
    }
}

/// `if-eq`, `if-ne`, ..., `if-eqz`, `if-nez`, ...
#[derive(Clone, Debug)]
pub struct If {
    pub site: Site,
    pub comparison: Comparison,
    pub lhs: u16,

    /// Second register (`None` when comparing against zero)
    pub rhs: Option<u16>,

    pub target: CodeAddress,
}

impl Operation for If {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        if self.target == self.site.next {
            vec![self.target]
        } else {
            vec![self.site.next, self.target]
        }
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        let lhs = context.read_register(self.lhs)?;
        let zero = Value::Int(0);
        let rhs = match self.rhs {
            Some(register) => context.read_register(register)?,
            None => &zero,
        };

        Ok(match self.comparison.decide(lhs, rhs) {
            Some(true) => Step::to(self.target, context.clone()),
            Some(false) => self.site.fall_through(context.clone()),
            None => self
                .site
                .fall_through(context.clone())
                .or(self.target, context.clone()),
        })
    }
}

/// `packed-switch`, `sparse-switch`
///
/// The payload is resolved when the op is created, so the switch jumps straight to its targets.
#[derive(Clone, Debug)]
pub struct Switch {
    pub site: Site,
    pub register: u16,

    /// Keys and the addresses they jump to
    pub targets: Vec<(i32, CodeAddress)>,
}

impl Operation for Switch {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        let mut children = vec![self.site.next];
        for (_, target) in &self.targets {
            if !children.contains(target) {
                children.push(*target);
            }
        }
        children
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        let key = context.read_register(self.register)?.as_int();
        match key {
            Some(key) => {
                let target = self
                    .targets
                    .iter()
                    .find(|(candidate, _)| *candidate == key)
                    .map_or(self.site.next, |(_, target)| *target);
                Ok(Step::to(target, context.clone()))
            }
            None => {
                let mut step = self.site.fall_through(context.clone());
                for (_, target) in &self.targets {
                    step = step.or(*target, context.clone());
                }
                Ok(step)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dex::{ClassName, FieldType, Opcode};

    fn context(values: Vec<Value>) -> MethodContext {
        let mut context = MethodContext::new(values.len() as u16, 0, 0).unwrap();
        for (register, value) in values.into_iter().enumerate() {
            context.assign_register(register as u16, value).unwrap();
        }
        context
    }

    fn if_op(comparison: Comparison, rhs: Option<u16>) -> If {
        If {
            site: Site {
                address: CodeAddress(2),
                opcode: Opcode::IfEq,
                next: CodeAddress(4),
            },
            comparison,
            lhs: 0,
            rhs,
            target: CodeAddress(6),
        }
    }

    #[test]
    fn comparisons() {
        let string = Value::String(String::from("x"));
        assert_eq!(Comparison::Lt.decide(&Value::Int(1), &Value::Int(2)), Some(true));
        assert_eq!(Comparison::Ge.decide(&Value::Int(1), &Value::Int(2)), Some(false));
        assert_eq!(Comparison::Eq.decide(&Value::Boolean(true), &Value::Int(1)), Some(true));
        assert_eq!(Comparison::Eq.decide(&Value::Null, &Value::Int(0)), Some(true));
        assert_eq!(Comparison::Ne.decide(&string, &Value::Int(0)), Some(true));
        assert_eq!(Comparison::Eq.decide(&string, &Value::Null), Some(false));
        assert_eq!(Comparison::Eq.decide(&string, &string), None);
        assert_eq!(Comparison::Lt.decide(&string, &Value::Int(0)), None);
        assert_eq!(
            Comparison::Eq.decide(&Value::unknown(FieldType::int()), &Value::Int(0)),
            None
        );
        assert_eq!(
            Comparison::Eq.decide(
                &Value::unknown(FieldType::object(ClassName::STRING)),
                &Value::Null
            ),
            None
        );
    }

    #[test]
    fn known_conditions_take_one_edge() {
        let taken = if_op(Comparison::Eq, None).execute(&context(vec![Value::Int(0)]));
        assert_eq!(taken.unwrap().addresses(), vec![CodeAddress(6)]);

        let not_taken = if_op(Comparison::Eq, Some(1))
            .execute(&context(vec![Value::Int(0), Value::Int(1)]));
        assert_eq!(not_taken.unwrap().addresses(), vec![CodeAddress(4)]);
    }

    #[test]
    fn unknown_conditions_take_both_edges() {
        let op = if_op(Comparison::Gt, None);
        let step = op
            .execute(&context(vec![Value::unknown(FieldType::int())]))
            .unwrap();
        assert_eq!(step.addresses(), vec![CodeAddress(4), CodeAddress(6)]);
        assert_eq!(op.possible_children(), step.addresses());
    }

    #[test]
    fn switches() {
        let op = Switch {
            site: Site {
                address: CodeAddress(0),
                opcode: Opcode::PackedSwitch,
                next: CodeAddress(3),
            },
            register: 0,
            targets: vec![(1, CodeAddress(10)), (2, CodeAddress(12)), (3, CodeAddress(10))],
        };
        let run = |value: Value| op.execute(&context(vec![value])).unwrap().addresses();

        assert_eq!(run(Value::Int(2)), vec![CodeAddress(12)]);
        assert_eq!(run(Value::Int(9)), vec![CodeAddress(3)]);
        assert_eq!(
            run(Value::unknown(FieldType::int())),
            vec![CodeAddress(3), CodeAddress(10), CodeAddress(12)]
        );
        assert_eq!(
            op.possible_children(),
            vec![CodeAddress(3), CodeAddress(10), CodeAddress(12)]
        );
    }
}
