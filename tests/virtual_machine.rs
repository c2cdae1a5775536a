mod common;

use common::*;
use simplify::dex::{FieldType, Instruction, Method, Opcode};
use simplify::util::CodeAddress;
use simplify::vm::{Error, Settings, SideEffect, Value, VirtualMachine};

/// `for (v0 = 0; v0 < v1; v0++); return v0`
fn counting_loop(limit: Option<i64>) -> Method {
    let mut code = vec![Instruction::literal(Opcode::Const4, &[0], 0)];
    if let Some(limit) = limit {
        code.push(Instruction::literal(Opcode::Const4, &[1], limit));
    } else {
        code.push(Instruction::registers(Opcode::Nop, &[]));
    }
    code.extend(vec![
        Instruction::branch(Opcode::IfGe, &[0, 1], 5),
        Instruction::literal(Opcode::AddIntLit8, &[0, 0], 1),
        Instruction::branch(Opcode::Goto, &[], -4),
        Instruction::registers(Opcode::Return, &[0]),
    ]);
    static_method("(I)I", 2, code)
}

#[test]
fn loops_with_known_bounds_run_to_completion() {
    let graph = execute(counting_loop(Some(3)));
    assert_eq!(graph.connected_terminating_addresses(), vec![CodeAddress(7)]);
    assert_eq!(graph.register_consensus_at(CodeAddress(7), 0), Ok(Value::Int(3)));
    assert_eq!(graph.return_value_consensus(), Ok(Value::Int(3)));
    assert_eq!(graph.node_pile(CodeAddress(2)).unwrap().len(), 4);
}

#[test]
fn loops_with_unknown_bounds_are_cut_short() {
    init_logger();
    let mut vm = VirtualMachine::new(Settings {
        max_address_visits: 10,
        ..Settings::new()
    });
    let signature = vm.add_method(counting_loop(None));
    let error = vm.execute(&signature).unwrap_err();
    assert_eq!(
        error,
        Error::MaxAddressVisitsExceeded {
            address: CodeAddress(2),
            limit: 10
        }
    );
    assert!(!error.is_invariant_violation());

    let mut vm = VirtualMachine::new(Settings {
        max_method_visits: 5,
        ..Settings::new()
    });
    let signature = vm.add_method(counting_loop(Some(3)));
    assert_eq!(
        vm.execute(&signature).unwrap_err(),
        Error::MaxMethodVisitsExceeded(5)
    );
}

#[test]
fn switches() {
    let method = located_method(
        "(I)I",
        2,
        vec![
            (0, Instruction::branch(Opcode::PackedSwitch, &[1], 8)),
            (3, Instruction::literal(Opcode::Const4, &[0], 1)),
            (4, Instruction::registers(Opcode::Return, &[0])),
            (5, Instruction::literal(Opcode::Const4, &[0], 2)),
            (6, Instruction::registers(Opcode::Return, &[0])),
            (7, Instruction::registers(Opcode::Nop, &[])),
            (8, Instruction::packed_switch_payload(10, vec![5])),
        ],
    );

    let graph = execute(method.clone());
    assert_eq!(graph.connected_terminating_addresses(), vec![CodeAddress(4), CodeAddress(6)]);
    assert!(!graph.was_reached(CodeAddress(8)));
    assert_eq!(
        graph.terminating_register_consensus(&[0]),
        Ok(vec![Value::unknown(FieldType::int())])
    );

    init_logger();
    let mut vm = VirtualMachine::new(Settings::new());
    let signature = vm.add_method(method);
    let mut context = vm.spawn_root_context(&signature, 0).unwrap();
    context.assign_register(1, Value::Int(10)).unwrap();
    let graph = vm.execute_with(&signature, context).unwrap();
    assert_eq!(graph.connected_terminating_addresses(), vec![CodeAddress(6)]);
    assert_eq!(graph.terminating_register_consensus(&[0]), Ok(vec![Value::Int(2)]));
}

#[test]
fn array_data() {
    let graph = execute(static_method(
        "()I",
        2,
        vec![
            Instruction::literal(Opcode::Const4, &[1], 2),
            Instruction::type_(Opcode::NewArray, &[0, 1], FieldType::array(FieldType::int())),
            Instruction::branch(Opcode::FillArrayData, &[0], 7),
            Instruction::literal(Opcode::Const4, &[1], 1),
            Instruction::registers(Opcode::Aget, &[1, 0, 1]),
            Instruction::registers(Opcode::Return, &[1]),
            Instruction::array_payload(4, vec![10, 20]),
        ],
    ));

    // The payload is executed, but it doesn't end the method
    assert!(graph.was_reached(CodeAddress(10)));
    assert_eq!(graph.terminating_addresses(), &[CodeAddress(9)]);
    assert_eq!(graph.register_consensus_at(CodeAddress(9), 1), Ok(Value::Int(20)));
    assert_eq!(graph.strongest_side_effect(), SideEffect::None);
}

#[test]
fn pure_methods() {
    let graph = execute(static_method(
        "(I)I",
        2,
        vec![
            Instruction::literal(Opcode::AddIntLit8, &[0, 1], 1),
            Instruction::string(Opcode::ConstString, 1, "hello"),
            Instruction::method(
                Opcode::InvokeVirtual,
                &[1],
                method_ref("java/lang/String", "length", "()I"),
            ),
            Instruction::registers(Opcode::MoveResult, &[1]),
            Instruction::registers(Opcode::Return, &[0]),
        ],
    ));
    assert_eq!(graph.strongest_side_effect(), SideEffect::None);
    assert_eq!(
        graph.terminating_register_consensus(&[0, 1]),
        Ok(vec![
            Value::unknown(FieldType::int()),
            Value::unknown(FieldType::int())
        ])
    );
}

#[test]
fn local_string_builders() {
    let builder = "java/lang/StringBuilder";
    let graph = execute(static_method(
        "()Ljava/lang/String;",
        1,
        vec![
            Instruction::type_(Opcode::NewInstance, &[0], FieldType::object(class(builder))),
            Instruction::method(
                Opcode::InvokeDirect,
                &[0],
                method_ref(builder, "<init>", "()V"),
            ),
            Instruction::method(
                Opcode::InvokeVirtual,
                &[0],
                method_ref(builder, "toString", "()Ljava/lang/String;"),
            ),
            Instruction::registers(Opcode::MoveResultObject, &[0]),
            Instruction::registers(Opcode::ReturnObject, &[0]),
        ],
    ));
    assert_eq!(graph.strongest_side_effect(), SideEffect::None);
}

#[test]
fn weak_side_effects() {
    let graph = execute(static_method(
        "(Ljava/lang/Object;)V",
        1,
        vec![
            Instruction::registers(Opcode::MonitorEnter, &[0]),
            Instruction::registers(Opcode::MonitorExit, &[0]),
            Instruction::registers(Opcode::ReturnVoid, &[]),
        ],
    ));
    assert_eq!(graph.strongest_side_effect(), SideEffect::Weak);
}

#[test]
fn strong_side_effects() {
    let counter = static_method(
        "()V",
        1,
        vec![
            Instruction::literal(Opcode::Const4, &[0], 1),
            Instruction::field(Opcode::Sput, &[0], field("com/example/Test", "count", "I")),
            Instruction::registers(Opcode::ReturnVoid, &[]),
        ],
    );
    assert_eq!(execute(counter).strongest_side_effect(), SideEffect::Strong);

    let call = static_method(
        "()V",
        0,
        vec![
            Instruction::method(
                Opcode::InvokeStatic,
                &[],
                method_ref("com/example/Sink", "flush", "()V"),
            ),
            Instruction::registers(Opcode::ReturnVoid, &[]),
        ],
    );
    assert_eq!(execute(call).strongest_side_effect(), SideEffect::Strong);
}

#[test]
fn calls_on_objects_may_be_overridden() {
    let call = |name: &str, descriptor: &str| {
        static_method(
            "(Lcom/example/Logger;)V",
            1,
            vec![
                Instruction::method(
                    Opcode::InvokeVirtual,
                    &[0],
                    method_ref("java/lang/Object", name, descriptor),
                ),
                Instruction::registers(Opcode::ReturnVoid, &[]),
            ],
        )
    };
    for (name, descriptor) in [("toString", "()Ljava/lang/String;"), ("notifyAll", "()V")] {
        assert_eq!(
            execute(call(name, descriptor)).strongest_side_effect(),
            SideEffect::Strong
        );
    }

    let graph = execute(static_method(
        "()V",
        1,
        vec![
            Instruction::type_(
                Opcode::NewInstance,
                &[0],
                FieldType::object(class("java/lang/Object")),
            ),
            Instruction::method(
                Opcode::InvokeDirect,
                &[0],
                method_ref("java/lang/Object", "<init>", "()V"),
            ),
            Instruction::registers(Opcode::ReturnVoid, &[]),
        ],
    ));
    assert_eq!(graph.strongest_side_effect(), SideEffect::None);
}

#[test]
fn unknown_calls_clobber_arrays() {
    let graph = execute(static_method(
        "()I",
        2,
        vec![
            Instruction::literal(Opcode::Const4, &[1], 1),
            Instruction::type_(Opcode::NewArray, &[0, 1], FieldType::array(FieldType::int())),
            Instruction::method(
                Opcode::InvokeStatic,
                &[0],
                method_ref("com/example/Sink", "fill", "([I)V"),
            ),
            Instruction::literal(Opcode::Const4, &[1], 0),
            Instruction::registers(Opcode::Aget, &[1, 0, 1]),
            Instruction::registers(Opcode::Return, &[1]),
        ],
    ));
    assert_eq!(graph.register_consensus_at(CodeAddress(6), 1), Ok(Value::Int(1)));
    assert_eq!(
        graph.register_consensus_at(CodeAddress(9), 1),
        Ok(Value::unknown(FieldType::int()))
    );
}

#[test]
fn invariant_violations() {
    init_logger();
    let mut vm = VirtualMachine::new(Settings::new());
    let signature = vm.add_method(static_method(
        "()V",
        1,
        vec![
            Instruction::registers(Opcode::MoveResult, &[0]),
            Instruction::registers(Opcode::ReturnVoid, &[]),
        ],
    ));
    let error = vm.execute(&signature).unwrap_err();
    assert_eq!(error, Error::MissingResult);
    assert!(error.is_invariant_violation());

    let signature = vm.add_method(static_method(
        "()V",
        1,
        vec![Instruction::registers(Opcode::Return, &[0])],
    ));
    assert_eq!(
        vm.execute(&signature).unwrap_err(),
        Error::UnassignedRegister(0)
    );

    assert_eq!(
        vm.execute("Lcom/example/Test;->missing()V").unwrap_err(),
        Error::UnknownMethod(String::from("Lcom/example/Test;->missing()V"))
    );
}

#[test]
fn call_depth_is_bounded() {
    init_logger();
    let mut vm = VirtualMachine::new(Settings {
        max_call_depth: 2,
        ..Settings::new()
    });
    let signature = vm.add_method(static_method(
        "()V",
        0,
        vec![Instruction::registers(Opcode::ReturnVoid, &[])],
    ));
    assert!(vm.spawn_root_context(&signature, 2).is_ok());
    assert_eq!(
        vm.spawn_root_context(&signature, 3),
        Err(Error::MaxCallDepthExceeded(3))
    );
}
