#![allow(dead_code)]

use simplify::dex::*;
use simplify::util::CodeAddress;
use simplify::vm::{ExecutionGraph, Settings, VirtualMachine};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn class(name: &str) -> ClassName {
    ClassName::from_string(String::from(name)).unwrap()
}

pub fn member(name: &str) -> MemberName {
    MemberName::from_string(String::from(name)).unwrap()
}

pub fn field(class_name: &str, name: &str, field_type: &str) -> FieldRef {
    FieldRef {
        class: class(class_name),
        name: member(name),
        field_type: FieldType::parse(field_type).unwrap(),
    }
}

pub fn method_ref(class_name: &str, name: &str, descriptor: &str) -> MethodRef {
    MethodRef {
        class: class(class_name),
        name: member(name),
        descriptor: MethodDescriptor::parse(descriptor).unwrap(),
    }
}

/// Static method `Lcom/example/Test;->run<descriptor>` laid out by instruction width
pub fn static_method(descriptor: &str, registers: u16, code: Vec<Instruction>) -> Method {
    let mut method = Method::new(
        class("com/example/Test"),
        member("run"),
        MethodDescriptor::parse(descriptor).unwrap(),
        MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
        registers,
    );
    for insn in code {
        method.push(insn);
    }
    method
}

/// Static method whose instructions are given along with their addresses
pub fn located_method(
    descriptor: &str,
    registers: u16,
    code: Vec<(usize, Instruction)>,
) -> Method {
    Method::from_located(
        class("com/example/Test"),
        member("run"),
        MethodDescriptor::parse(descriptor).unwrap(),
        MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
        registers,
        code.into_iter()
            .map(|(address, insn)| (CodeAddress(address), insn)),
    )
    .unwrap()
}

/// Execute a method with unknown parameters
pub fn execute(method: Method) -> ExecutionGraph {
    init_logger();
    let mut vm = VirtualMachine::new(Settings::new());
    let signature = vm.add_method(method);
    vm.execute(&signature).unwrap()
}

pub fn addresses(addresses: &[usize]) -> Vec<CodeAddress> {
    addresses.iter().copied().map(CodeAddress).collect()
}
