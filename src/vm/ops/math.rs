use super::{Operation, Site, Step};
use crate::dex::{FieldType, Opcode};
use crate::util::CodeAddress;
use crate::vm::{Error, MethodContext, Value};
use std::cmp::Ordering;

/// Type of the operands of an arithmetic instruction
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum NumericType {
    Int,
    Long,
    Float,
    Double,
}

impl NumericType {
    pub fn field_type(self) -> FieldType {
        match self {
            NumericType::Int => FieldType::int(),
            NumericType::Long => FieldType::long(),
            NumericType::Float => FieldType::float(),
            NumericType::Double => FieldType::double(),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Ushr,

    /// Reverse subtraction (`rsub-int`): `literal - register`
    Rsub,
}

impl BinaryOperator {
    fn is_shift(self) -> bool {
        matches!(
            self,
            BinaryOperator::Shl | BinaryOperator::Shr | BinaryOperator::Ushr
        )
    }

    fn fold_int(self, a: i32, b: i32) -> Option<i32> {
        let shift = (b & 0x1f) as u32;
        Some(match self {
            BinaryOperator::Add => a.wrapping_add(b),
            BinaryOperator::Sub => a.wrapping_sub(b),
            BinaryOperator::Mul => a.wrapping_mul(b),
            BinaryOperator::Div if b == 0 => return None,
            BinaryOperator::Div => a.wrapping_div(b),
            BinaryOperator::Rem if b == 0 => return None,
            BinaryOperator::Rem => a.wrapping_rem(b),
            BinaryOperator::And => a & b,
            BinaryOperator::Or => a | b,
            BinaryOperator::Xor => a ^ b,
            BinaryOperator::Shl => a << shift,
            BinaryOperator::Shr => a >> shift,
            BinaryOperator::Ushr => ((a as u32) >> shift) as i32,
            BinaryOperator::Rsub => b.wrapping_sub(a),
        })
    }

    fn fold_long(self, a: i64, b: i64) -> Option<i64> {
        let shift = (b & 0x3f) as u32;
        Some(match self {
            BinaryOperator::Add => a.wrapping_add(b),
            BinaryOperator::Sub => a.wrapping_sub(b),
            BinaryOperator::Mul => a.wrapping_mul(b),
            BinaryOperator::Div if b == 0 => return None,
            BinaryOperator::Div => a.wrapping_div(b),
            BinaryOperator::Rem if b == 0 => return None,
            BinaryOperator::Rem => a.wrapping_rem(b),
            BinaryOperator::And => a & b,
            BinaryOperator::Or => a | b,
            BinaryOperator::Xor => a ^ b,
            BinaryOperator::Shl => a << shift,
            BinaryOperator::Shr => a >> shift,
            BinaryOperator::Ushr => ((a as u64) >> shift) as i64,
            BinaryOperator::Rsub => b.wrapping_sub(a),
        })
    }

    fn fold_float(self, a: f32, b: f32) -> Option<f32> {
        Some(match self {
            BinaryOperator::Add => a + b,
            BinaryOperator::Sub => a - b,
            BinaryOperator::Mul => a * b,
            BinaryOperator::Div => a / b,
            BinaryOperator::Rem => a % b,
            _ => return None,
        })
    }

    fn fold_double(self, a: f64, b: f64) -> Option<f64> {
        Some(match self {
            BinaryOperator::Add => a + b,
            BinaryOperator::Sub => a - b,
            BinaryOperator::Mul => a * b,
            BinaryOperator::Div => a / b,
            BinaryOperator::Rem => a % b,
            _ => return None,
        })
    }
}

/// Second operand of a binary operation
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Operand {
    Register(u16),

    /// `/lit8` and `/lit16` forms
    Literal(i32),
}

/// `add-int`, `mul-long/2addr`, `rsub-int/lit8`, ...
///
/// The `/2addr` forms use the first operand as destination.
#[derive(Clone, Debug)]
pub struct BinaryMath {
    pub site: Site,
    pub operator: BinaryOperator,
    pub operand_type: NumericType,
    pub dest: u16,
    pub lhs: u16,
    pub rhs: Operand,
}

impl BinaryMath {
    /// Compute the result, if the operands are known (and the operation doesn't throw)
    pub fn fold(&self, lhs: &Value, rhs: &Value) -> Option<Value> {
        match self.operand_type {
            NumericType::Int => self
                .operator
                .fold_int(lhs.as_int()?, rhs.as_int()?)
                .map(Value::Int),
            NumericType::Long => {
                // Shift amounts are always ints
                let rhs = if self.operator.is_shift() {
                    rhs.as_int()? as i64
                } else {
                    rhs.as_long()?
                };
                self.operator.fold_long(lhs.as_long()?, rhs).map(Value::Long)
            }
            NumericType::Float => self
                .operator
                .fold_float(lhs.as_float()?, rhs.as_float()?)
                .map(Value::Float),
            NumericType::Double => self
                .operator
                .fold_double(lhs.as_double()?, rhs.as_double()?)
                .map(Value::Double),
        }
    }
}

impl Operation for BinaryMath {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![self.site.next]
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        let lhs = context.read_register(self.lhs)?;
        let literal;
        let rhs = match self.rhs {
            Operand::Register(register) => context.read_register(register)?,
            Operand::Literal(value) => {
                literal = Value::Int(value);
                &literal
            }
        };
        let result = self
            .fold(lhs, rhs)
            .unwrap_or_else(|| Value::unknown(self.operand_type.field_type()));

        let mut context = context.clone();
        context.assign_register(self.dest, result)?;
        Ok(self.site.fall_through(context))
    }
}

/// `neg-*`, `not-*`, and primitive conversions (`int-to-long`, `double-to-float`, ...)
#[derive(Clone, Debug)]
pub struct UnaryMath {
    pub site: Site,
    pub dest: u16,
    pub source: u16,
}

impl UnaryMath {
    /// Type of the result
    pub fn result_type(&self) -> FieldType {
        use Opcode::*;
        match self.site.opcode {
            NegLong | NotLong | IntToLong | FloatToLong | DoubleToLong => FieldType::long(),
            NegFloat | IntToFloat | LongToFloat | DoubleToFloat => FieldType::float(),
            NegDouble | IntToDouble | LongToDouble | FloatToDouble => FieldType::double(),
            IntToByte => FieldType::byte(),
            IntToChar => FieldType::char(),
            IntToShort => FieldType::short(),
            _ => FieldType::int(),
        }
    }

    /// Compute the result, if the operand is known
    ///
    /// Float to integer conversions saturate and send NaN to zero, as on the JVM.
    pub fn fold(&self, value: &Value) -> Option<Value> {
        use Opcode::*;
        Some(match self.site.opcode {
            NegInt => Value::Int(value.as_int()?.wrapping_neg()),
            NotInt => Value::Int(!value.as_int()?),
            NegLong => Value::Long(value.as_long()?.wrapping_neg()),
            NotLong => Value::Long(!value.as_long()?),
            NegFloat => Value::Float(-value.as_float()?),
            NegDouble => Value::Double(-value.as_double()?),
            IntToLong => Value::Long(value.as_int()? as i64),
            IntToFloat => Value::Float(value.as_int()? as f32),
            IntToDouble => Value::Double(value.as_int()? as f64),
            LongToInt => Value::Int(value.as_long()? as i32),
            LongToFloat => Value::Float(value.as_long()? as f32),
            LongToDouble => Value::Double(value.as_long()? as f64),
            FloatToInt => Value::Int(value.as_float()? as i32),
            FloatToLong => Value::Long(value.as_float()? as i64),
            FloatToDouble => Value::Double(value.as_float()? as f64),
            DoubleToInt => Value::Int(value.as_double()? as i32),
            DoubleToLong => Value::Long(value.as_double()? as i64),
            DoubleToFloat => Value::Float(value.as_double()? as f32),
            IntToByte => Value::Byte(value.as_int()? as i8),
            IntToChar => Value::Char(value.as_int()? as u16),
            IntToShort => Value::Short(value.as_int()? as i16),
            _ => return None,
        })
    }
}

impl Operation for UnaryMath {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![self.site.next]
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        let value = context.read_register(self.source)?;
        let result = self
            .fold(value)
            .unwrap_or_else(|| Value::unknown(self.result_type()));

        let mut context = context.clone();
        context.assign_register(self.dest, result)?;
        Ok(self.site.fall_through(context))
    }
}

/// `cmpl-float`, `cmpg-float`, `cmpl-double`, `cmpg-double`, `cmp-long`
///
/// The `l`/`g` suffix decides whether a NaN operand compares as less or greater.
#[derive(Clone, Debug)]
pub struct Compare {
    pub site: Site,
    pub dest: u16,
    pub lhs: u16,
    pub rhs: u16,
}

impl Compare {
    pub fn fold(&self, lhs: &Value, rhs: &Value) -> Option<i32> {
        let nan_bias = match self.site.opcode {
            Opcode::CmpgFloat | Opcode::CmpgDouble => 1,
            _ => -1,
        };
        let ordering = match self.site.opcode {
            Opcode::CmpLong => Some(lhs.as_long()?.cmp(&rhs.as_long()?)),
            Opcode::CmplFloat | Opcode::CmpgFloat => {
                lhs.as_float()?.partial_cmp(&rhs.as_float()?)
            }
            _ => lhs.as_double()?.partial_cmp(&rhs.as_double()?),
        };
        Some(match ordering {
            Some(Ordering::Less) => -1,
            Some(Ordering::Equal) => 0,
            Some(Ordering::Greater) => 1,
            None => nan_bias,
        })
    }
}

impl Operation for Compare {
    fn site(&self) -> Site {
        self.site
    }

    fn possible_children(&self) -> Vec<CodeAddress> {
        vec![self.site.next]
    }

    fn execute(&self, context: &MethodContext) -> Result<Step, Error> {
        let lhs = context.read_register(self.lhs)?;
        let rhs = context.read_register(self.rhs)?;
        let result = self
            .fold(lhs, rhs)
            .map_or_else(|| Value::unknown(FieldType::int()), Value::Int);

        let mut context = context.clone();
        context.assign_register(self.dest, result)?;
        Ok(self.site.fall_through(context))
    }
}
