//! Simulate Dalvik methods and record what every register holds at every address
//!
//! ### Overview
//!
//! A method is simulated by stepping through its instructions on an abstract machine whose
//! registers hold either concrete values or [`vm::UnknownValue`]s. Whenever a branch cannot be
//! decided, both successors get explored, each with its own copy of the machine state. Every
//! state reached at an address is kept in the [`vm::ExecutionGraph`], so that afterwards we can
//! ask questions such as:
//!
//!   - was this address ever reached? (dead code)
//!   - does register `v3` always hold the same value here? (constant folding)
//!   - can this method do anything observable? (see [`vm::SideEffect`])
//!
//! ### Example
//!
//! ```
//! use simplify::dex::*;
//! use simplify::vm::{Settings, Value, VirtualMachine};
//!
//! # fn simulate() -> Result<(), simplify::vm::Error> {
//! let mut method = Method::new(
//!     ClassName::from_string(String::from("com/example/Answer")).unwrap(),
//!     MemberName::from_string(String::from("get")).unwrap(),
//!     MethodDescriptor::parse("()I")?,
//!     MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
//!     1,
//! );
//! method.push(Instruction::literal(Opcode::Const16, &[0], 42));
//! let ret = method.push(Instruction::registers(Opcode::Return, &[0]));
//!
//! let mut vm = VirtualMachine::new(Settings::new());
//! let signature = vm.add_method(method);
//! let graph = vm.execute(&signature)?;
//!
//! assert_eq!(graph.register_consensus_at(ret, 0)?, Value::Int(42));
//! # Ok(())
//! # }
//! ```

pub mod dex;
pub mod util;
pub mod vm;
