use super::{Operation, Site, Step};
use crate::dex::{ClassName, FieldType};
use crate::util::CodeAddress;
use crate::vm::{Error, MethodContext, SideEffect, Value};

/// `nop`
#[derive(Clone, Debug)]
pub struct Nop {
    pub site: Site,
}

impl Operation for Nop {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![self.site.next]
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        Ok(self.site.fall_through(context.clone()))
    }
}

/// `move`, `move-wide`, `move-object` (and their `/from16` and `/16` variants)
#[derive(Clone, Debug)]
pub struct Move {
    pub site: Site,
    pub dest: u16,
    pub source: u16,
}

impl Operation for Move {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![self.site.next]
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        let value = context.read_register(self.source)?.clone();
        let mut context = context.clone();
        context.assign_register(self.dest, value)?;
        Ok(self.site.fall_through(context))
    }
}

/// `move-result`, `move-result-wide`, `move-result-object`
#[derive(Clone, Debug)]
pub struct MoveResult {
    pub site: Site,
    pub dest: u16,
}

impl Operation for MoveResult {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![self.site.next]
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        let mut context = context.clone();
        let value = context.take_result()?;
        context.assign_register(self.dest, value)?;
        Ok(self.site.fall_through(context))
    }
}

/// `move-exception`
///
/// Exceptional control flow is not simulated, so the exception is never known.
#[derive(Clone, Debug)]
pub struct MoveException {
    pub site: Site,
    pub dest: u16,
}

impl Operation for MoveException {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![self.site.next]
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        let mut context = context.clone();
        context.assign_register(
            self.dest,
            Value::unknown(FieldType::object(ClassName::THROWABLE)),
        )?;
        Ok(self.site.fall_through(context))
    }
}

/// `return-void`, `return`, `return-wide`, `return-object`
#[derive(Clone, Debug)]
pub struct Return {
    pub site: Site,

    /// Register holding the returned value (`None` for `return-void`)
    pub register: Option<u16>,
}

impl Operation for Return {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![]
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        match self.register {
            Some(register) => Ok(Step::returning(context.read_register(register)?.clone())),
            None => Ok(Step::end(SideEffect::None)),
        }
    }
}

/// `throw`
#[derive(Clone, Debug)]
pub struct Throw {
    pub site: Site,
    pub register: u16,
}

impl Operation for Throw {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![]
    }

    fn side_effect(&self) -> SideEffect {
        SideEffect::Strong
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        context.read_register(self.register)?;
        Ok(Step::end(SideEffect::Strong))
    }
}

/// `monitor-enter`, `monitor-exit`
#[derive(Clone, Debug)]
pub struct Monitor {
    pub site: Site,
    pub register: u16,
}

impl Operation for Monitor {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![self.site.next]
    }

    fn side_effect(&self) -> SideEffect {
        SideEffect::Weak
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        context.read_register(self.register)?;
        Ok(self
            .site
            .fall_through(context.clone())
            .with_side_effect(SideEffect::Weak))
    }
}

/// `goto`, `goto/16`, `goto/32`
#[derive(Clone, Debug)]
pub struct Goto {
    pub site: Site,
    pub target: CodeAddress,
}

impl Operation for Goto {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![self.target]
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        Ok(Step::to(self.target, context.clone()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dex::Opcode;

    fn site(opcode: Opcode) -> Site {
        Site {
            address: CodeAddress(4),
            opcode,
            next: CodeAddress(5),
        }
    }

    fn context() -> MethodContext {
        let mut context = MethodContext::new(4, 0, 0).unwrap();
        context.assign_register(0, Value::Int(7)).unwrap();
        context
    }

    #[test]
    fn moves() {
        let op = Move {
            site: site(Opcode::Move),
            dest: 1,
            source: 0,
        };
        let before = context();
        let step = op.execute(&before).unwrap();
        assert_eq!(step.branches[0].context.read_register(1), Ok(&Value::Int(7)));
        assert_eq!(before.peek_register(1), Ok(None));

        let op = Move {
            site: site(Opcode::Move),
            dest: 0,
            source: 2,
        };
        assert_eq!(
            op.execute(&before).unwrap_err(),
            Error::UnassignedRegister(2)
        );
    }

    #[test]
    fn move_result() {
        let op = MoveResult {
            site: site(Opcode::MoveResult),
            dest: 3,
        };
        assert_eq!(op.execute(&context()).unwrap_err(), Error::MissingResult);

        let mut before = context();
        before.set_result(Some(Value::Int(1)));
        let after = &op.execute(&before).unwrap().branches[0].context;
        assert_eq!(after.read_register(3), Ok(&Value::Int(1)));
        assert_eq!(after.result(), None);
    }

    #[test]
    fn exits() {
        let ret = Return {
            site: site(Opcode::Return),
            register: Some(0),
        };
        let step = ret.execute(&context()).unwrap();
        assert!(step.branches.is_empty());
        assert_eq!(step.side_effect, SideEffect::None);
        assert_eq!(step.returned, Some(Value::Int(7)));
        assert!(ret.possible_children().is_empty());

        let void = Return {
            site: site(Opcode::ReturnVoid),
            register: None,
        };
        assert_eq!(void.execute(&context()).unwrap().returned, None);

        let throw = Throw {
            site: site(Opcode::Throw),
            register: 0,
        };
        assert_eq!(throw.execute(&context()).unwrap().side_effect, SideEffect::Strong);
    }

    #[test]
    fn jumps() {
        let goto = Goto {
            site: site(Opcode::Goto),
            target: CodeAddress(0),
        };
        assert_eq!(
            goto.execute(&context()).unwrap().addresses(),
            vec![CodeAddress(0)]
        );
        let monitor = Monitor {
            site: site(Opcode::MonitorEnter),
            register: 0,
        };
        let step = monitor.execute(&context()).unwrap();
        assert_eq!(step.addresses(), vec![CodeAddress(5)]);
        assert_eq!(step.side_effect, SideEffect::Weak);
    }
}
