use super::{Error, ExecutionGraph, MethodContext, Settings, Value};
use crate::dex::{FieldType, Method};
use crate::util::CodeAddress;
use std::collections::{HashMap, VecDeque};

/// Registry of methods, along with the machinery to execute them
///
/// Methods are identified by their signature (eg. `Lcom/example/Foo;->bar(I)V`). The template
/// graph of a method is built the first time the method gets executed, and then reused.
pub struct VirtualMachine {
    settings: Settings,
    methods: HashMap<String, Method>,

    /// Graphs holding only template nodes, ready to be cloned for an execution
    templates: HashMap<String, ExecutionGraph>,
}

impl VirtualMachine {
    pub fn new(settings: Settings) -> VirtualMachine {
        VirtualMachine {
            settings,
            methods: HashMap::new(),
            templates: HashMap::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Register a method, returning its signature
    ///
    /// A method previously registered under the same signature is replaced.
    pub fn add_method(&mut self, method: Method) -> String {
        let signature = method.signature();
        self.templates.remove(&signature);
        self.methods.insert(signature.clone(), method);
        signature
    }

    pub fn method(&self, signature: &str) -> Result<&Method, Error> {
        self.methods
            .get(signature)
            .ok_or_else(|| Error::UnknownMethod(signature.to_owned()))
    }

    /// Graph with only the template nodes of a method
    pub fn template_graph(&mut self, signature: &str) -> Result<&ExecutionGraph, Error> {
        if self.templates.contains_key(signature) {
            log::debug!("Reusing template graph for {}", signature);
        } else {
            let graph = ExecutionGraph::build(self.method(signature)?)?;
            self.templates.insert(signature.to_owned(), graph);
        }
        self.templates
            .get(signature)
            .ok_or_else(|| Error::UnknownMethod(signature.to_owned()))
    }

    /// State at the start of a method: every parameter holds an unknown value of its type
    ///
    /// Wide parameters take up two registers, and instance methods get `this` in the first
    /// parameter register.
    pub fn spawn_root_context(
        &self,
        signature: &str,
        call_depth: usize,
    ) -> Result<MethodContext, Error> {
        if call_depth > self.settings.max_call_depth {
            return Err(Error::MaxCallDepthExceeded(call_depth));
        }

        let method = self.method(signature)?;
        let parameter_registers = u16::try_from(method.parameter_registers()).unwrap_or(u16::MAX);
        let mut context = MethodContext::new(method.registers, parameter_registers, call_depth)?;

        let mut offset = 0;
        if !method.is_static() {
            let this = Value::unknown(FieldType::object(method.class.clone()));
            context.assign_parameter(offset, this)?;
            offset += 1;
        }
        for parameter in &method.descriptor.parameters {
            context.assign_parameter(offset, Value::unknown(parameter.clone()))?;
            offset += parameter.register_width() as u16;
        }

        Ok(context)
    }

    /// Execute a method from its default root context
    pub fn execute(&mut self, signature: &str) -> Result<ExecutionGraph, Error> {
        let context = self.spawn_root_context(signature, 0)?;
        self.execute_with(signature, context)
    }

    /// Execute a method from a given root context (eg. with some parameters known)
    pub fn execute_with(
        &mut self,
        signature: &str,
        context: MethodContext,
    ) -> Result<ExecutionGraph, Error> {
        if context.call_depth() > self.settings.max_call_depth {
            return Err(Error::MaxCallDepthExceeded(context.call_depth()));
        }

        let mut graph = self.template_graph(signature)?.clone();
        graph.set_root_state(context)?;
        MethodExecutor::new(&self.settings).run(&mut graph)?;
        Ok(graph)
    }
}

/// Explores an execution graph breadth-first, from its root
pub struct MethodExecutor<'a> {
    settings: &'a Settings,
}

impl<'a> MethodExecutor<'a> {
    pub fn new(settings: &'a Settings) -> MethodExecutor<'a> {
        MethodExecutor { settings }
    }

    /// Execute nodes until no new node is reached, returning how many nodes were executed
    pub fn run(&self, graph: &mut ExecutionGraph) -> Result<usize, Error> {
        let mut worklist = VecDeque::from([graph.root()]);
        let mut address_visits: HashMap<CodeAddress, usize> = HashMap::new();
        let mut visits: usize = 0;

        while let Some(id) = worklist.pop_front() {
            visits += 1;
            if visits > self.settings.max_method_visits {
                log::warn!(
                    "Giving up on {}: more than {} instructions executed",
                    graph.method_descriptor(),
                    self.settings.max_method_visits
                );
                return Err(Error::MaxMethodVisitsExceeded(self.settings.max_method_visits));
            }

            let address_visit = address_visits.entry(id.address).or_insert(0);
            *address_visit += 1;
            if *address_visit > self.settings.max_address_visits {
                log::warn!(
                    "Giving up on {}: {:?} visited more than {} times",
                    graph.method_descriptor(),
                    id.address,
                    self.settings.max_address_visits
                );
                return Err(Error::MaxAddressVisitsExceeded {
                    address: id.address,
                    limit: self.settings.max_address_visits,
                });
            }

            worklist.extend(graph.execute_node(id)?);
        }

        log::debug!(
            "Executed {} ({} nodes visited)",
            graph.method_descriptor(),
            visits
        );
        Ok(visits)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dex::{
        ClassName, Instruction, MemberName, MethodAccessFlags, MethodDescriptor, Name, Opcode,
        ParseDescriptor,
    };

    fn method(descriptor: &str, access_flags: MethodAccessFlags, registers: u16) -> Method {
        let mut method = Method::new(
            ClassName::from_string(String::from("com/example/Foo")).unwrap(),
            MemberName::from_string(String::from("bar")).unwrap(),
            MethodDescriptor::parse(descriptor).unwrap(),
            access_flags,
            registers,
        );
        method.push(Instruction::registers(Opcode::ReturnVoid, &[]));
        method
    }

    #[test]
    fn root_contexts() {
        let mut vm = VirtualMachine::new(Settings::new());
        let signature = vm.add_method(method("(JI)V", MethodAccessFlags::PUBLIC, 6));
        let context = vm.spawn_root_context(&signature, 0).unwrap();

        assert_eq!(context.first_parameter_register(), 2);
        assert_eq!(context.peek_register(0), Ok(None));
        assert_eq!(
            context.read_register(2),
            Ok(&Value::unknown(FieldType::object(
                ClassName::from_string(String::from("com/example/Foo")).unwrap()
            )))
        );
        assert_eq!(context.read_register(3), Ok(&Value::unknown(FieldType::long())));
        assert_eq!(context.peek_register(4), Ok(None));
        assert_eq!(context.read_register(5), Ok(&Value::unknown(FieldType::int())));

        assert_eq!(
            vm.spawn_root_context(&signature, 21),
            Err(Error::MaxCallDepthExceeded(21))
        );
        assert_eq!(
            vm.spawn_root_context("Lcom/example/Foo;->baz()V", 0),
            Err(Error::UnknownMethod(String::from("Lcom/example/Foo;->baz()V")))
        );
    }

    #[test]
    fn too_few_registers() {
        let mut vm = VirtualMachine::new(Settings::new());
        let signature = vm.add_method(method("(J)V", MethodAccessFlags::STATIC, 1));
        assert!(vm.spawn_root_context(&signature, 0).is_err());
    }

    #[test]
    fn templates_are_cached() {
        let mut vm = VirtualMachine::new(Settings::new());
        let signature = vm.add_method(method("()V", MethodAccessFlags::STATIC, 0));
        let first = vm.template_graph(&signature).unwrap() as *const ExecutionGraph;
        let second = vm.template_graph(&signature).unwrap() as *const ExecutionGraph;
        assert_eq!(first, second);

        let graph = vm.execute(&signature).unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(vm.template_graph(&signature).unwrap().node_count(), 1);
    }
}
