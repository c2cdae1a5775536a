use super::{Operation, Site, Step};
use crate::util::CodeAddress;
use crate::vm::{Error, MethodContext, Value};

/// `const*`, `const-wide*`, `const-string*`, `const-class`
#[derive(Clone, Debug)]
pub struct Const {
    pub site: Site,
    pub dest: u16,
    pub value: Value,
}

impl Operation for Const {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![self.site.next]
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        let mut context = context.clone();
        context.assign_register(self.dest, self.value.clone())?;
        Ok(self.site.fall_through(context))
    }
}
