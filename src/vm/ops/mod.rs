//! Operation handlers
//!
//! Every instruction of a method gets turned into an [`Op`] once, when the execution graph is
//! built. Executing an op never modifies the context it is given: each successor gets its own
//! copy of the context, modified as the instruction dictates.
//!
//! Ops are grouped in families of opcodes that behave the same way (eg. all of the `if-*`
//! opcodes are an [`If`]). Whatever can be resolved statically (branch targets, payload
//! contents, literals) is resolved by the [`OpFactory`] so that execution is only concerned with
//! register contents.

mod array;
mod basic;
mod branch;
mod constant;
mod factory;
mod field;
mod invoke;
mod math;
mod object;
mod payload;

pub use array::*;
pub use basic::*;
pub use branch::*;
pub use constant::*;
pub use factory::*;
pub use field::*;
pub use invoke::*;
pub use math::*;
pub use object::*;
pub use payload::*;

use super::{Error, MethodContext, SideEffect, Value};
use crate::dex::Opcode;
use crate::util::CodeAddress;

/// Where an operation is located
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Site {
    pub address: CodeAddress,
    pub opcode: Opcode,

    /// Address of the following instruction
    pub next: CodeAddress,
}

impl Site {
    /// Continue at the next instruction
    pub fn fall_through(&self, context: MethodContext) -> Step {
        Step::to(self.next, context)
    }
}

/// One successor produced by executing an operation
#[derive(Clone, Debug)]
pub struct Branch {
    pub address: CodeAddress,
    pub context: MethodContext,
}

/// Outcome of executing an operation
#[derive(Clone, Debug)]
pub struct Step {
    /// Successors, each with their own context (empty if the method ends here)
    pub branches: Vec<Branch>,

    /// Side effect of this particular execution
    pub side_effect: SideEffect,

    /// Value the method returns, if it ends here with a `return*`
    pub returned: Option<Value>,
}

impl Step {
    /// The method ends here
    pub fn end(side_effect: SideEffect) -> Step {
        Step {
            branches: vec![],
            side_effect,
            returned: None,
        }
    }

    /// The method ends here, handing a value back to the caller
    pub fn returning(value: Value) -> Step {
        Step {
            returned: Some(value),
            ..Step::end(SideEffect::None)
        }
    }

    /// Continue at a single address
    pub fn to(address: CodeAddress, context: MethodContext) -> Step {
        Step {
            branches: vec![Branch { address, context }],
            side_effect: SideEffect::None,
            returned: None,
        }
    }

    /// Also continue at another address (unless it already is a successor)
    pub fn or(mut self, address: CodeAddress, context: MethodContext) -> Step {
        if self.branches.iter().all(|branch| branch.address != address) {
            self.branches.push(Branch { address, context });
        }
        self
    }

    pub fn with_side_effect(mut self, side_effect: SideEffect) -> Step {
        self.side_effect = side_effect;
        self
    }

    /// Addresses of the successors
    pub fn addresses(&self) -> Vec<CodeAddress> {
        self.branches.iter().map(|branch| branch.address).collect()
    }
}

/// What every operation handler can do
pub trait Operation {
    fn site(&self) -> Site;

    fn address(&self) -> CodeAddress {
        self.site().address
    }

    fn opcode(&self) -> Opcode {
        self.site().opcode
    }

    /// Addresses that execution could statically continue at
    ///
    /// Payloads return to wherever they were jumped to from, so they have no static successors.
    fn possible_children(&self) -> Vec<CodeAddress>;

    /// Strongest side effect that executing this operation could have
    ///
    /// The side effect of an actual execution (see [`Step`]) may be weaker once the operands
    /// are known.
    fn side_effect(&self) -> SideEffect {
        SideEffect::None
    }

    /// Simulate the operation
    fn execute(&self, context: &MethodContext) -> Result<Step, Error>;
}

macro_rules! ops {
    ($($variant:ident,)*) => {
        /// An operation handler, one variant per family of opcodes
        #[derive(Clone, Debug)]
        pub enum Op {
            $($variant($variant),)*
        }

        impl Operation for Op {
            fn site(&self) -> Site {
                match self {
                    $(Op::$variant(op) => op.site(),)*
                }
            }

            fn possible_children(&self) -> Vec<CodeAddress> {
                match self {
                    $(Op::$variant(op) => op.possible_children(),)*
                }
            }

            fn side_effect(&self) -> SideEffect {
                match self {
                    $(Op::$variant(op) => op.side_effect(),)*
                }
            }

            fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
                match self {
                    $(Op::$variant(op) => op.execute(context),)*
                }
            }
        }

        $(
            impl From<$variant> for Op {
                fn from(op: $variant) -> Op {
                    Op::$variant(op)
                }
            }
        )*
    };
}

ops! {
    Nop,
    Move,
    MoveResult,
    MoveException,
    Return,
    Throw,
    Monitor,
    Goto,
    Const,
    If,
    Switch,
    SwitchPayload,
    FillArrayData,
    ArrayPayload,
    NewArray,
    FilledNewArray,
    ArrayLength,
    ArrayGet,
    ArrayPut,
    NewInstance,
    CheckCast,
    InstanceOf,
    InstanceField,
    StaticField,
    Invoke,
    UnaryMath,
    BinaryMath,
    Compare,
}

#[cfg(test)]
mod test {
    use super::*;

    fn site(address: usize, next: usize) -> Site {
        Site {
            address: CodeAddress(address),
            opcode: Opcode::Nop,
            next: CodeAddress(next),
        }
    }

    #[test]
    fn steps() {
        let context = MethodContext::default();
        let step = Step::to(CodeAddress(2), context.clone())
            .or(CodeAddress(2), context.clone())
            .or(CodeAddress(6), context);
        assert_eq!(step.addresses(), vec![CodeAddress(2), CodeAddress(6)]);
        assert_eq!(step.side_effect, SideEffect::None);
    }

    #[test]
    fn dispatch() {
        let op = Op::from(Nop { site: site(0, 1) });
        assert_eq!(op.address(), CodeAddress(0));
        assert_eq!(op.opcode(), Opcode::Nop);
        assert_eq!(op.possible_children(), vec![CodeAddress(1)]);

        let mut context = MethodContext::new(1, 0, 0).unwrap();
        context.assign_register(0, Value::Int(3)).unwrap();
        let step = op.execute(&context).unwrap();
        assert_eq!(step.addresses(), vec![CodeAddress(1)]);
        assert_eq!(step.branches[0].context, context);
    }
}
