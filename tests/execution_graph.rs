mod common;

use common::*;
use simplify::dex::{FieldType, Instruction, Opcode};
use simplify::util::CodeAddress;
use simplify::vm::{Error, ExecutionGraph, Settings, SideEffect, Value, VirtualMachine};

/// `v0 = v1; if (v0 == 0) return v0 (@6); else return v0 (@4)`
fn two_exits() -> simplify::dex::Method {
    located_method(
        "(I)I",
        2,
        vec![
            (0, Instruction::registers(Opcode::MoveFrom16, &[0, 1])),
            (2, Instruction::branch(Opcode::IfEqz, &[0], 4)),
            (4, Instruction::registers(Opcode::Return, &[0])),
            (5, Instruction::registers(Opcode::Nop, &[])),
            (6, Instruction::registers(Opcode::Return, &[0])),
        ],
    )
}

/// Two paths writing `v0` before meeting at address 10
fn converging(second: i64) -> simplify::dex::Method {
    located_method(
        "(I)I",
        2,
        vec![
            (0, Instruction::branch(Opcode::IfEqz, &[1], 6)),
            (2, Instruction::literal(Opcode::Const16, &[0], 5)),
            (4, Instruction::branch(Opcode::Goto, &[], 6)),
            (5, Instruction::registers(Opcode::Nop, &[])),
            (6, Instruction::literal(Opcode::Const16, &[0], second)),
            (8, Instruction::registers(Opcode::Nop, &[])),
            (9, Instruction::registers(Opcode::Nop, &[])),
            (10, Instruction::registers(Opcode::Return, &[0])),
        ],
    )
}

/// `v0` is assigned on one path and `v1` on the other before they meet at address 8
fn one_sided_writes() -> simplify::dex::Method {
    located_method(
        "(I)V",
        3,
        vec![
            (0, Instruction::branch(Opcode::IfEqz, &[2], 6)),
            (2, Instruction::literal(Opcode::Const16, &[0], 5)),
            (4, Instruction::branch(Opcode::Goto, &[], 4)),
            (5, Instruction::registers(Opcode::Nop, &[])),
            (6, Instruction::literal(Opcode::Const16, &[1], 5)),
            (8, Instruction::registers(Opcode::ReturnVoid, &[])),
        ],
    )
}

/// Returns `first` through `v0` on one path and `second` through `v1` on the other
fn returns_from_different_registers(first: i64, second: i64) -> simplify::dex::Method {
    located_method(
        "(I)I",
        3,
        vec![
            (0, Instruction::branch(Opcode::IfEqz, &[2], 5)),
            (2, Instruction::literal(Opcode::Const16, &[0], first)),
            (4, Instruction::registers(Opcode::Return, &[0])),
            (5, Instruction::literal(Opcode::Const16, &[1], second)),
            (7, Instruction::registers(Opcode::Return, &[1])),
        ],
    )
}

fn execute_with_parameter(method: simplify::dex::Method, value: Value) -> ExecutionGraph {
    init_logger();
    let mut vm = VirtualMachine::new(Settings::new());
    let signature = vm.add_method(method);
    let mut context = vm.spawn_root_context(&signature, 0).unwrap();
    context.assign_parameter(0, value).unwrap();
    vm.execute_with(&signature, context).unwrap()
}

#[test]
fn both_exits_reached() {
    let graph = execute(two_exits());
    assert_eq!(graph.terminating_addresses(), &addresses(&[4, 6])[..]);
    assert_eq!(graph.connected_terminating_addresses(), addresses(&[4, 6]));
    assert!(!graph.was_reached(CodeAddress(5)));
    assert_eq!(
        graph.terminating_register_consensus(&[0]),
        Ok(vec![Value::unknown(FieldType::int())])
    );

    let order: Vec<CodeAddress> = graph.iter().map(|(id, _)| id.address).collect();
    assert_eq!(order, addresses(&[0, 2, 4, 6]));
    assert_eq!(graph.strongest_side_effect(), SideEffect::None);
}

#[test]
fn one_exit_reached() {
    let taken = execute_with_parameter(two_exits(), Value::Int(0));
    assert_eq!(taken.connected_terminating_addresses(), addresses(&[6]));
    assert!(!taken.was_reached(CodeAddress(4)));
    assert_eq!(
        taken.terminating_register_consensus(&[0]),
        Ok(vec![Value::Int(0)])
    );

    let not_taken = execute_with_parameter(two_exits(), Value::Int(3));
    assert_eq!(not_taken.connected_terminating_addresses(), addresses(&[4]));
    assert_eq!(
        not_taken.terminating_register_consensus(&[0, 1]),
        Ok(vec![Value::Int(3), Value::Int(3)])
    );
}

#[test]
fn node_piles() {
    let graph = execute(two_exits());

    // The entry pile is the root itself, elsewhere the template is hidden
    assert_eq!(graph.node_pile(CodeAddress(0)).unwrap().len(), 1);
    assert_eq!(graph.node_pile(CodeAddress(2)).unwrap().len(), 1);
    assert_eq!(graph.node_pile(CodeAddress(5)).unwrap().len(), 0);
    assert_eq!(
        graph.node_pile(CodeAddress(3)).unwrap_err(),
        Error::MissingAddress(CodeAddress(3))
    );
    assert!(graph.was_reached(CodeAddress(0)));
    assert!(!graph.was_reached(CodeAddress(3)));
    assert_eq!(graph.node_count(), 4);

    let template = graph.template_node(CodeAddress(5)).unwrap();
    assert_eq!(template.address(), CodeAddress(5));
    assert!(template.context().registers().next().is_none());
}

#[test]
fn same_value_on_every_path() {
    let graph = execute(converging(5));
    assert_eq!(graph.node_pile(CodeAddress(10)).unwrap().len(), 2);
    assert_eq!(graph.register_consensus_at(CodeAddress(10), 0), Ok(Value::Int(5)));
    assert_eq!(
        graph.register_consensus_at(CodeAddress(10), 1),
        Ok(Value::unknown(FieldType::int()))
    );
    assert!(!graph.was_reached(CodeAddress(5)));
}

#[test]
fn different_values_on_some_paths() {
    let graph = execute(converging(7));
    assert_eq!(
        graph.register_consensus_at(CodeAddress(10), 0),
        Ok(Value::unknown(FieldType::int()))
    );
    assert_eq!(graph.register_consensus_at(CodeAddress(4), 0), Ok(Value::Int(5)));
    assert_eq!(graph.register_consensus_at(CodeAddress(8), 0), Ok(Value::Int(7)));

    let forwards = graph.register_consensus(&addresses(&[4, 8]), 0);
    let backwards = graph.register_consensus(&addresses(&[8, 4]), 0);
    assert_eq!(forwards, Ok(Value::unknown(FieldType::int())));
    assert_eq!(forwards, backwards);
}

#[test]
fn consensus_needs_nodes() {
    let graph = execute(converging(5));
    assert_eq!(
        graph.register_consensus_at(CodeAddress(5), 0),
        Err(Error::EmptyConsensus)
    );
    assert_eq!(graph.register_consensus(&[], 0), Err(Error::EmptyConsensus));

    // `v0` is only assigned after the branch
    let unassigned = graph.register_consensus_at(CodeAddress(2), 0).unwrap_err();
    assert_eq!(unassigned, Error::UnassignedRegister(0));
    assert!(unassigned.is_invariant_violation());
}

#[test]
fn clones_are_isolated() {
    let graph = execute(converging(5));
    let mut copy = graph.clone();
    let root = copy.root();
    let mut context = copy.root_context().unwrap().clone();
    context.assign_register(0, Value::Int(7)).unwrap();
    copy.add_child(root, CodeAddress(10), context).unwrap();

    assert_eq!(copy.node_pile(CodeAddress(10)).unwrap().len(), 3);
    assert_eq!(graph.node_pile(CodeAddress(10)).unwrap().len(), 2);
    assert_eq!(
        copy.register_consensus_at(CodeAddress(10), 0),
        Ok(Value::unknown(FieldType::int()))
    );
    assert_eq!(graph.register_consensus_at(CodeAddress(10), 0), Ok(Value::Int(5)));
    assert_eq!(graph.root_node().unwrap().children().len(), 2);
    assert_eq!(copy.root_node().unwrap().children().len(), 3);
}

#[test]
fn terminating_addresses() {
    let graph = ExecutionGraph::build(&static_method(
        "()V",
        1,
        vec![
            Instruction::branch(Opcode::Goto, &[], 1),
            Instruction::literal(Opcode::Const4, &[0], 0),
            Instruction::registers(Opcode::Throw, &[0]),
            Instruction::registers(Opcode::ReturnVoid, &[]),
            Instruction::array_payload(1, vec![1, 2]),
        ],
    ))
    .unwrap();

    assert_eq!(graph.terminating_addresses(), &addresses(&[2, 3])[..]);
    assert!(graph.connected_terminating_addresses().is_empty());
}

#[test]
fn malformed_methods_are_rejected() {
    let bad_target = static_method(
        "()V",
        1,
        vec![
            Instruction::branch(Opcode::Goto, &[], 5),
            Instruction::registers(Opcode::ReturnVoid, &[]),
        ],
    );
    let error = ExecutionGraph::build(&bad_target).unwrap_err();
    assert!(matches!(error, Error::MalformedInstruction { .. }));
    assert!(error.is_invariant_violation());

    let bad_register = static_method(
        "()V",
        1,
        vec![Instruction::registers(Opcode::Return, &[1])],
    );
    assert_eq!(
        ExecutionGraph::build(&bad_register).unwrap_err(),
        Error::RegisterOutOfBounds {
            register: 1,
            registers: 1
        }
    );
}

#[test]
fn registers_assigned_on_some_paths() {
    let graph = execute(one_sided_writes());
    assert_eq!(graph.node_pile(CodeAddress(8)).unwrap().len(), 2);
    for register in 0..2 {
        assert_eq!(
            graph.register_consensus_at(CodeAddress(8), register),
            Ok(Value::unknown(FieldType::int()))
        );
    }
    assert_eq!(
        graph.terminating_register_consensus(&[0, 1]),
        Ok(vec![
            Value::unknown(FieldType::int()),
            Value::unknown(FieldType::int())
        ])
    );

    // Only the path assigning `v1` is taken
    let graph = execute_with_parameter(one_sided_writes(), Value::Int(0));
    assert_eq!(graph.register_consensus_at(CodeAddress(8), 1), Ok(Value::Int(5)));
    assert_eq!(
        graph.register_consensus_at(CodeAddress(8), 0),
        Err(Error::UnassignedRegister(0))
    );
}

#[test]
fn returned_values() {
    let graph = execute(returns_from_different_registers(5, 5));
    assert_eq!(graph.connected_terminating_addresses(), addresses(&[4, 7]));
    assert_eq!(graph.return_value_consensus(), Ok(Value::Int(5)));
    assert_eq!(
        graph.terminating_register_consensus(&[0, 1]),
        Ok(vec![
            Value::unknown(FieldType::int()),
            Value::unknown(FieldType::int())
        ])
    );

    let graph = execute(returns_from_different_registers(5, 7));
    assert_eq!(
        graph.return_value_consensus(),
        Ok(Value::unknown(FieldType::int()))
    );

    let graph = execute(one_sided_writes());
    assert_eq!(graph.return_value_consensus(), Err(Error::EmptyConsensus));
}
