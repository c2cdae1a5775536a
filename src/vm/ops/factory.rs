use super::*;
use crate::dex::{
    FieldRef, FieldType, Format, Instruction, Method, MethodRef, Opcode, Operands, RefType,
};
use crate::util::{CodeAddress, Width};
use crate::vm::Value;

/// Turns the instructions of a method into operation handlers
///
/// Anything that only depends on the method body (branch targets, switch tables, array payloads,
/// literals) is resolved here, so that a malformed body is rejected before anything executes.
pub struct OpFactory<'a> {
    method: &'a Method,
}

impl<'a> OpFactory<'a> {
    pub fn new(method: &'a Method) -> OpFactory<'a> {
        OpFactory { method }
    }

    /// Create the handler for the instruction at an address
    pub fn create(&self, insn: &Instruction, address: CodeAddress) -> Result<Op, Error> {
        let site = Site {
            address,
            opcode: insn.opcode,
            next: address + insn.width(),
        };
        for register in insn.operands.registers() {
            if *register >= self.method.registers {
                return Err(Error::RegisterOutOfBounds {
                    register: *register,
                    registers: self.method.registers,
                });
            }
        }

        use Opcode as O;
        let op: Op = match insn.opcode {
            O::Nop => super::Nop { site }.into(),

            O::Move | O::MoveFrom16 | O::Move16 | O::MoveWide | O::MoveWideFrom16 | O::MoveWide16
            | O::MoveObject | O::MoveObjectFrom16 | O::MoveObject16 => {
                let [dest, source] = self.registers(site, insn)?;
                super::Move { site, dest, source }.into()
            }
            O::MoveResult | O::MoveResultWide | O::MoveResultObject => {
                let [dest] = self.registers(site, insn)?;
                super::MoveResult { site, dest }.into()
            }
            O::MoveException => {
                let [dest] = self.registers(site, insn)?;
                super::MoveException { site, dest }.into()
            }

            O::ReturnVoid => {
                let [] = self.registers(site, insn)?;
                super::Return {
                    site,
                    register: None,
                }
                .into()
            }
            O::Return | O::ReturnWide | O::ReturnObject => {
                let [register] = self.registers(site, insn)?;
                super::Return {
                    site,
                    register: Some(register),
                }
                .into()
            }

            O::Const4 | O::Const16 | O::Const | O::ConstHigh16 => {
                let ([dest], literal) = self.literal(site, insn)?;
                let value = Value::Int(literal as i32);
                super::Const { site, dest, value }.into()
            }
            O::ConstWide16 | O::ConstWide32 | O::ConstWide | O::ConstWideHigh16 => {
                let ([dest], literal) = self.literal(site, insn)?;
                let value = Value::Long(literal);
                super::Const { site, dest, value }.into()
            }
            O::ConstString | O::ConstStringJumbo => match &insn.operands {
                Operands::String { register, string } => super::Const {
                    site,
                    dest: *register,
                    value: Value::String(string.clone()),
                }
                .into(),
                _ => return Err(shape(site, "expected a string constant")),
            },
            O::ConstClass => {
                let ([dest], class) = self.type_ref(site, insn)?;
                let value = Value::Class(class.clone());
                super::Const { site, dest, value }.into()
            }

            O::MonitorEnter | O::MonitorExit => {
                let [register] = self.registers(site, insn)?;
                super::Monitor { site, register }.into()
            }

            O::CheckCast => {
                let ([register], target) = self.type_ref(site, insn)?;
                let target = reference_type(site, target)?;
                super::CheckCast {
                    site,
                    register,
                    target,
                }
                .into()
            }
            O::InstanceOf => {
                let ([dest, object], target) = self.type_ref(site, insn)?;
                let target = reference_type(site, target)?;
                super::InstanceOf {
                    site,
                    dest,
                    object,
                    target,
                }
                .into()
            }
            O::NewInstance => {
                let ([dest], class) = self.type_ref(site, insn)?;
                let class = match class {
                    FieldType::Ref(RefType::Object(class)) => class.clone(),
                    _ => return Err(shape(site, "expected a class type")),
                };
                super::NewInstance { site, dest, class }.into()
            }

            O::ArrayLength => {
                let [dest, array] = self.registers(site, insn)?;
                super::ArrayLength { site, dest, array }.into()
            }
            O::NewArray => {
                let ([dest, size], array_type) = self.type_ref(site, insn)?;
                let element_type = array_element_type(site, array_type)?;
                super::NewArray {
                    site,
                    dest,
                    size,
                    element_type,
                }
                .into()
            }
            O::FilledNewArray | O::FilledNewArrayRange => match &insn.operands {
                Operands::Type {
                    registers,
                    type_descriptor,
                } => super::FilledNewArray {
                    site,
                    elements: registers.clone(),
                    element_type: array_element_type(site, type_descriptor)?,
                }
                .into(),
                _ => return Err(shape(site, "expected registers and an array type")),
            },
            O::FillArrayData => {
                let ([array], payload) = self.branch(site, insn)?;
                match self.payload(site, payload)? {
                    Operands::ArrayPayload { .. } => {}
                    _ => return Err(shape(site, "target is not an array payload")),
                }
                super::FillArrayData {
                    site,
                    array,
                    payload,
                }
                .into()
            }

            O::Throw => {
                let [register] = self.registers(site, insn)?;
                super::Throw { site, register }.into()
            }
            O::Goto | O::Goto16 | O::Goto32 => {
                let ([], target) = self.branch(site, insn)?;
                super::Goto { site, target }.into()
            }

            O::PackedSwitch | O::SparseSwitch => {
                let ([register], payload) = self.branch(site, insn)?;
                let targets = self.switch_targets(site, payload)?;
                super::Switch {
                    site,
                    register,
                    targets,
                }
                .into()
            }

            O::CmplFloat | O::CmpgFloat | O::CmplDouble | O::CmpgDouble | O::CmpLong => {
                let [dest, lhs, rhs] = self.registers(site, insn)?;
                super::Compare {
                    site,
                    dest,
                    lhs,
                    rhs,
                }
                .into()
            }

            O::IfEq | O::IfNe | O::IfLt | O::IfGe | O::IfGt | O::IfLe => {
                let ([lhs, rhs], target) = self.branch(site, insn)?;
                super::If {
                    site,
                    comparison: comparison(insn.opcode),
                    lhs,
                    rhs: Some(rhs),
                    target,
                }
                .into()
            }
            O::IfEqz | O::IfNez | O::IfLtz | O::IfGez | O::IfGtz | O::IfLez => {
                let ([lhs], target) = self.branch(site, insn)?;
                super::If {
                    site,
                    comparison: comparison(insn.opcode),
                    lhs,
                    rhs: None,
                    target,
                }
                .into()
            }

            O::Aget | O::AgetWide | O::AgetObject | O::AgetBoolean | O::AgetByte | O::AgetChar
            | O::AgetShort => {
                let [dest, array, index] = self.registers(site, insn)?;
                super::ArrayGet {
                    site,
                    dest,
                    array,
                    index,
                }
                .into()
            }
            O::Aput | O::AputWide | O::AputObject | O::AputBoolean | O::AputByte | O::AputChar
            | O::AputShort => {
                let [value, array, index] = self.registers(site, insn)?;
                super::ArrayPut {
                    site,
                    value,
                    array,
                    index,
                }
                .into()
            }

            O::Iget | O::IgetWide | O::IgetObject | O::IgetBoolean | O::IgetByte | O::IgetChar
            | O::IgetShort => {
                let ([register, object], field) = self.field_ref(site, insn)?;
                super::InstanceField {
                    site,
                    access: FieldAccess::Get,
                    register,
                    object,
                    field: field.clone(),
                }
                .into()
            }
            O::Iput | O::IputWide | O::IputObject | O::IputBoolean | O::IputByte | O::IputChar
            | O::IputShort => {
                let ([register, object], field) = self.field_ref(site, insn)?;
                super::InstanceField {
                    site,
                    access: FieldAccess::Put,
                    register,
                    object,
                    field: field.clone(),
                }
                .into()
            }
            O::Sget | O::SgetWide | O::SgetObject | O::SgetBoolean | O::SgetByte | O::SgetChar
            | O::SgetShort => {
                let ([register], field) = self.field_ref(site, insn)?;
                super::StaticField {
                    site,
                    access: FieldAccess::Get,
                    register,
                    field: field.clone(),
                }
                .into()
            }
            O::Sput | O::SputWide | O::SputObject | O::SputBoolean | O::SputByte | O::SputChar
            | O::SputShort => {
                let ([register], field) = self.field_ref(site, insn)?;
                super::StaticField {
                    site,
                    access: FieldAccess::Put,
                    register,
                    field: field.clone(),
                }
                .into()
            }

            O::InvokeVirtual | O::InvokeVirtualRange => {
                self.invoke(site, insn, InvokeKind::Virtual)?
            }
            O::InvokeSuper | O::InvokeSuperRange => self.invoke(site, insn, InvokeKind::Super)?,
            O::InvokeDirect | O::InvokeDirectRange => self.invoke(site, insn, InvokeKind::Direct)?,
            O::InvokeStatic | O::InvokeStaticRange => self.invoke(site, insn, InvokeKind::Static)?,
            O::InvokeInterface | O::InvokeInterfaceRange => {
                self.invoke(site, insn, InvokeKind::Interface)?
            }

            O::NegInt | O::NotInt | O::NegLong | O::NotLong | O::NegFloat | O::NegDouble
            | O::IntToLong | O::IntToFloat | O::IntToDouble | O::LongToInt | O::LongToFloat
            | O::LongToDouble | O::FloatToInt | O::FloatToLong | O::FloatToDouble | O::DoubleToInt
            | O::DoubleToLong | O::DoubleToFloat | O::IntToByte | O::IntToChar | O::IntToShort => {
                let [dest, source] = self.registers(site, insn)?;
                super::UnaryMath { site, dest, source }.into()
            }

            O::AddInt | O::SubInt | O::MulInt | O::DivInt | O::RemInt | O::AndInt | O::OrInt
            | O::XorInt | O::ShlInt | O::ShrInt | O::UshrInt | O::AddLong | O::SubLong | O::MulLong
            | O::DivLong | O::RemLong | O::AndLong | O::OrLong | O::XorLong | O::ShlLong
            | O::ShrLong | O::UshrLong | O::AddFloat | O::SubFloat | O::MulFloat | O::DivFloat
            | O::RemFloat | O::AddDouble | O::SubDouble | O::MulDouble | O::DivDouble | O::RemDouble
            | O::AddInt2Addr | O::SubInt2Addr | O::MulInt2Addr | O::DivInt2Addr | O::RemInt2Addr
            | O::AndInt2Addr | O::OrInt2Addr | O::XorInt2Addr | O::ShlInt2Addr | O::ShrInt2Addr
            | O::UshrInt2Addr | O::AddLong2Addr | O::SubLong2Addr | O::MulLong2Addr
            | O::DivLong2Addr | O::RemLong2Addr | O::AndLong2Addr | O::OrLong2Addr | O::XorLong2Addr
            | O::ShlLong2Addr | O::ShrLong2Addr | O::UshrLong2Addr | O::AddFloat2Addr
            | O::SubFloat2Addr | O::MulFloat2Addr | O::DivFloat2Addr | O::RemFloat2Addr
            | O::AddDouble2Addr | O::SubDouble2Addr | O::MulDouble2Addr | O::DivDouble2Addr
            | O::RemDouble2Addr | O::AddIntLit16 | O::RsubInt | O::MulIntLit16 | O::DivIntLit16
            | O::RemIntLit16 | O::AndIntLit16 | O::OrIntLit16 | O::XorIntLit16 | O::AddIntLit8
            | O::RsubIntLit8 | O::MulIntLit8 | O::DivIntLit8 | O::RemIntLit8 | O::AndIntLit8
            | O::OrIntLit8 | O::XorIntLit8 | O::ShlIntLit8 | O::ShrIntLit8 | O::UshrIntLit8 => {
                self.binary_math(site, insn)?
            }

            O::PackedSwitchPayload | O::SparseSwitchPayload => match &insn.operands {
                Operands::PackedSwitchPayload { .. } | Operands::SparseSwitchPayload { .. } => {
                    super::SwitchPayload { site }.into()
                }
                _ => return Err(shape(site, "expected switch payload contents")),
            },
            O::ArrayPayload => match &insn.operands {
                Operands::ArrayPayload {
                    element_width,
                    elements,
                } => super::ArrayPayload {
                    site,
                    element_width: *element_width,
                    elements: elements.clone(),
                }
                .into(),
                _ => return Err(shape(site, "expected array payload contents")),
            },
        };
        Ok(op)
    }

    /// Exactly `N` register operands and nothing else
    fn registers<const N: usize>(&self, site: Site, insn: &Instruction) -> Result<[u16; N], Error> {
        match &insn.operands {
            Operands::None | Operands::Registers(_) => exactly(site, insn.operands.registers()),
            _ => Err(shape(site, format!("expected {} registers", N))),
        }
    }

    fn literal<const N: usize>(
        &self,
        site: Site,
        insn: &Instruction,
    ) -> Result<([u16; N], i64), Error> {
        match &insn.operands {
            Operands::Literal { registers, literal } => Ok((exactly(site, registers)?, *literal)),
            _ => Err(shape(site, "expected a literal")),
        }
    }

    /// Registers and the resolved branch target
    fn branch<const N: usize>(
        &self,
        site: Site,
        insn: &Instruction,
    ) -> Result<([u16; N], CodeAddress), Error> {
        match &insn.operands {
            Operands::Branch { registers, offset } => {
                let target = self.target(site, site.address, *offset)?;
                Ok((exactly(site, registers)?, target))
            }
            _ => Err(shape(site, "expected a branch offset")),
        }
    }

    fn type_ref<'b, const N: usize>(
        &self,
        site: Site,
        insn: &'b Instruction,
    ) -> Result<([u16; N], &'b FieldType), Error> {
        match &insn.operands {
            Operands::Type {
                registers,
                type_descriptor,
            } => Ok((exactly(site, registers)?, type_descriptor)),
            _ => Err(shape(site, "expected a type")),
        }
    }

    fn field_ref<'b, const N: usize>(
        &self,
        site: Site,
        insn: &'b Instruction,
    ) -> Result<([u16; N], &'b FieldRef), Error> {
        match &insn.operands {
            Operands::Field { registers, field } => Ok((exactly(site, registers)?, field)),
            _ => Err(shape(site, "expected a field")),
        }
    }

    /// Address reached by an offset, which must be the start of an instruction
    fn target(&self, site: Site, base: CodeAddress, offset: i32) -> Result<CodeAddress, Error> {
        base.offset_by(offset)
            .filter(|target| self.method.instruction_at(*target).is_some())
            .ok_or_else(|| {
                shape(
                    site,
                    format!("offset {} from {:?} is not an instruction", offset, base),
                )
            })
    }

    /// Contents of the payload at an address
    fn payload(&self, site: Site, address: CodeAddress) -> Result<&'a Operands, Error> {
        match self.method.instruction_at(address) {
            Some(payload) if payload.opcode.format().is_payload() => Ok(&payload.operands),
            _ => Err(shape(site, format!("no payload at {:?}", address))),
        }
    }

    /// Keys and targets of a switch, resolved against its payload
    ///
    /// Payload targets are relative to the switch, not to the payload.
    fn switch_targets(
        &self,
        site: Site,
        payload: CodeAddress,
    ) -> Result<Vec<(i32, CodeAddress)>, Error> {
        let pairs: Vec<(i32, i32)> = match (site.opcode, self.payload(site, payload)?) {
            (Opcode::PackedSwitch, Operands::PackedSwitchPayload { first_key, targets }) => {
                (0..)
                    .map(|idx| first_key.wrapping_add(idx))
                    .zip(targets.iter().copied())
                    .collect()
            }
            (Opcode::SparseSwitch, Operands::SparseSwitchPayload { keys, targets }) => {
                if keys.len() != targets.len() {
                    return Err(shape(site, "sparse switch keys and targets differ in length"));
                }
                keys.iter().copied().zip(targets.iter().copied()).collect()
            }
            _ => return Err(shape(site, "payload does not match the switch")),
        };

        pairs
            .into_iter()
            .map(|(key, offset)| {
                self.target(site, site.address, offset)
                    .map(|target| (key, target))
            })
            .collect()
    }

    fn invoke(&self, site: Site, insn: &Instruction, kind: InvokeKind) -> Result<Op, Error> {
        let (registers, method): (&Vec<u16>, &MethodRef) = match &insn.operands {
            Operands::Method { registers, method } => (registers, method),
            _ => return Err(shape(site, "expected a method")),
        };
        let expected = method
            .descriptor
            .parameter_registers(kind != InvokeKind::Static);
        if registers.len() != expected {
            return Err(shape(
                site,
                format!(
                    "{:?} takes {} argument registers, found {}",
                    method,
                    expected,
                    registers.len()
                ),
            ));
        }
        Ok(super::Invoke {
            site,
            kind,
            arguments: registers.clone(),
            method: method.clone(),
        }
        .into())
    }

    fn binary_math(&self, site: Site, insn: &Instruction) -> Result<Op, Error> {
        let (operator, operand_type) = binary_operator(site.opcode)
            .ok_or_else(|| shape(site, "not a binary arithmetic opcode"))?;
        let (dest, lhs, rhs) = match site.opcode.format() {
            Format::Format23x => {
                let [dest, lhs, rhs] = self.registers(site, insn)?;
                (dest, lhs, Operand::Register(rhs))
            }
            Format::Format12x => {
                let [dest, rhs] = self.registers(site, insn)?;
                (dest, dest, Operand::Register(rhs))
            }
            _ => {
                let ([dest, lhs], literal) = self.literal(site, insn)?;
                (dest, lhs, Operand::Literal(literal as i32))
            }
        };
        Ok(super::BinaryMath {
            site,
            operator,
            operand_type,
            dest,
            lhs,
            rhs,
        }
        .into())
    }
}

fn shape(site: Site, message: impl Into<String>) -> Error {
    Error::malformed(site.address, site.opcode, message)
}

fn exactly<const N: usize>(site: Site, registers: &[u16]) -> Result<[u16; N], Error> {
    <[u16; N]>::try_from(registers).map_err(|_| {
        shape(
            site,
            format!("expected {} registers, found {}", N, registers.len()),
        )
    })
}

fn reference_type(site: Site, field_type: &FieldType) -> Result<RefType, Error> {
    match field_type {
        FieldType::Ref(ref_type) => Ok(ref_type.clone()),
        FieldType::Base(_) => Err(shape(site, "expected a reference type")),
    }
}

fn array_element_type(site: Site, array_type: &FieldType) -> Result<FieldType, Error> {
    array_type
        .element_type()
        .ok_or_else(|| shape(site, "expected an array type"))
}

fn comparison(opcode: Opcode) -> Comparison {
    match opcode {
        Opcode::IfEq | Opcode::IfEqz => Comparison::Eq,
        Opcode::IfNe | Opcode::IfNez => Comparison::Ne,
        Opcode::IfLt | Opcode::IfLtz => Comparison::Lt,
        Opcode::IfGe | Opcode::IfGez => Comparison::Ge,
        Opcode::IfGt | Opcode::IfGtz => Comparison::Gt,
        _ => Comparison::Le,
    }
}

fn binary_operator(opcode: Opcode) -> Option<(BinaryOperator, NumericType)> {
    use BinaryOperator::*;
    use NumericType::{Double, Float, Int, Long};
    use Opcode as O;

    Some(match opcode {
        O::AddInt | O::AddInt2Addr | O::AddIntLit16 | O::AddIntLit8 => (Add, Int),
        O::SubInt | O::SubInt2Addr => (Sub, Int),
        O::RsubInt | O::RsubIntLit8 => (Rsub, Int),
        O::MulInt | O::MulInt2Addr | O::MulIntLit16 | O::MulIntLit8 => (Mul, Int),
        O::DivInt | O::DivInt2Addr | O::DivIntLit16 | O::DivIntLit8 => (Div, Int),
        O::RemInt | O::RemInt2Addr | O::RemIntLit16 | O::RemIntLit8 => (Rem, Int),
        O::AndInt | O::AndInt2Addr | O::AndIntLit16 | O::AndIntLit8 => (And, Int),
        O::OrInt | O::OrInt2Addr | O::OrIntLit16 | O::OrIntLit8 => (Or, Int),
        O::XorInt | O::XorInt2Addr | O::XorIntLit16 | O::XorIntLit8 => (Xor, Int),
        O::ShlInt | O::ShlInt2Addr | O::ShlIntLit8 => (Shl, Int),
        O::ShrInt | O::ShrInt2Addr | O::ShrIntLit8 => (Shr, Int),
        O::UshrInt | O::UshrInt2Addr | O::UshrIntLit8 => (Ushr, Int),

        O::AddLong | O::AddLong2Addr => (Add, Long),
        O::SubLong | O::SubLong2Addr => (Sub, Long),
        O::MulLong | O::MulLong2Addr => (Mul, Long),
        O::DivLong | O::DivLong2Addr => (Div, Long),
        O::RemLong | O::RemLong2Addr => (Rem, Long),
        O::AndLong | O::AndLong2Addr => (And, Long),
        O::OrLong | O::OrLong2Addr => (Or, Long),
        O::XorLong | O::XorLong2Addr => (Xor, Long),
        O::ShlLong | O::ShlLong2Addr => (Shl, Long),
        O::ShrLong | O::ShrLong2Addr => (Shr, Long),
        O::UshrLong | O::UshrLong2Addr => (Ushr, Long),

        O::AddFloat | O::AddFloat2Addr => (Add, Float),
        O::SubFloat | O::SubFloat2Addr => (Sub, Float),
        O::MulFloat | O::MulFloat2Addr => (Mul, Float),
        O::DivFloat | O::DivFloat2Addr => (Div, Float),
        O::RemFloat | O::RemFloat2Addr => (Rem, Float),

        O::AddDouble | O::AddDouble2Addr => (Add, Double),
        O::SubDouble | O::SubDouble2Addr => (Sub, Double),
        O::MulDouble | O::MulDouble2Addr => (Mul, Double),
        O::DivDouble | O::DivDouble2Addr => (Div, Double),
        O::RemDouble | O::RemDouble2Addr => (Rem, Double),

        _ => return None,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dex::{ClassName, MemberName, MethodAccessFlags, MethodDescriptor, Name};
    use crate::dex::ParseDescriptor;

    fn method(registers: u16, instructions: Vec<Instruction>) -> Method {
        let mut method = Method::new(
            ClassName::from_string(String::from("com/example/Foo")).unwrap(),
            MemberName::from_string(String::from("bar")).unwrap(),
            MethodDescriptor::parse("()V").unwrap(),
            MethodAccessFlags::STATIC,
            registers,
        );
        for insn in instructions {
            method.push(insn);
        }
        method
    }

    fn create_all(method: &Method) -> Result<Vec<Op>, Error> {
        let factory = OpFactory::new(method);
        method
            .instructions()
            .map(|(address, insn)| factory.create(insn, address))
            .collect()
    }

    #[test]
    fn every_instruction_gets_a_handler() {
        let method = method(
            2,
            vec![
                Instruction::literal(Opcode::Const4, &[0], 1),
                Instruction::registers(Opcode::AddInt2Addr, &[0, 0]),
                Instruction::literal(Opcode::AddIntLit8, &[1, 0], 3),
                Instruction::branch(Opcode::IfEqz, &[1], -3),
                Instruction::registers(Opcode::ReturnVoid, &[]),
            ],
        );
        let ops = create_all(&method).unwrap();
        assert!(matches!(&ops[1], Op::BinaryMath(op)
            if op.dest == 0 && op.lhs == 0 && op.rhs == Operand::Register(0)));
        assert!(matches!(&ops[2], Op::BinaryMath(op)
            if op.rhs == Operand::Literal(3) && op.operator == BinaryOperator::Add));
        assert!(matches!(&ops[3], Op::If(op) if op.target == CodeAddress(1)));
        assert_eq!(
            ops[3].possible_children(),
            vec![CodeAddress(6), CodeAddress(1)]
        );
    }

    #[test]
    fn switches_resolve_their_payload() {
        let method = method(
            1,
            vec![
                Instruction::branch(Opcode::PackedSwitch, &[0], 4),
                Instruction::registers(Opcode::ReturnVoid, &[]),
                Instruction::packed_switch_payload(5, vec![3, 3]),
            ],
        );
        let ops = create_all(&method).unwrap();
        match &ops[0] {
            Op::Switch(switch) => assert_eq!(
                switch.targets,
                vec![(5, CodeAddress(3)), (6, CodeAddress(3))]
            ),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(&ops[2], Op::SwitchPayload(_)));
    }

    #[test]
    fn malformed_instructions() {
        let bad_register = method(1, vec![Instruction::literal(Opcode::Const4, &[1], 0)]);
        assert_eq!(
            create_all(&bad_register).unwrap_err(),
            Error::RegisterOutOfBounds {
                register: 1,
                registers: 1,
            }
        );

        let bad_target = method(1, vec![Instruction::branch(Opcode::Goto, &[], 7)]);
        assert!(matches!(
            create_all(&bad_target),
            Err(Error::MalformedInstruction { .. })
        ));

        let bad_shape = method(2, vec![Instruction::registers(Opcode::Const16, &[0])]);
        assert!(create_all(&bad_shape).unwrap_err().is_invariant_violation());

        let not_a_payload = method(
            1,
            vec![
                Instruction::branch(Opcode::FillArrayData, &[0], 3),
                Instruction::registers(Opcode::ReturnVoid, &[]),
            ],
        );
        assert!(matches!(
            create_all(&not_a_payload),
            Err(Error::MalformedInstruction { .. })
        ));
    }

    #[test]
    fn invocations_check_their_arguments() {
        let callee = MethodRef {
            class: ClassName::STRING,
            name: MemberName::from_string(String::from("valueOf")).unwrap(),
            descriptor: MethodDescriptor::parse("(J)Ljava/lang/String;").unwrap(),
        };
        let good = method(
            2,
            vec![Instruction::method(Opcode::InvokeStatic, &[0, 1], callee.clone())],
        );
        assert!(create_all(&good).is_ok());

        let bad = method(
            2,
            vec![Instruction::method(Opcode::InvokeStatic, &[0], callee)],
        );
        assert!(create_all(&bad).is_err());
    }
}
