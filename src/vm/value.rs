use crate::dex::{BaseType, ClassName, FieldType};

/// Contents of a register
///
/// Dalvik registers are untyped: `const v0, 0x3f800000` followed by `add-float` treats the bits
/// of the integer as a float. The `as_*` accessors follow that convention, so an `Int` can be
/// read back as a `Float` (and a `Long` as a `Double`) by reinterpreting its bits.
#[derive(Clone, Debug)]
pub enum Value {
    Boolean(bool),
    Byte(i8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),

    /// The `null` reference
    Null,

    /// A string constant (or a string computed from constants)
    String(String),

    /// A `java.lang.Class` object for this type
    Class(FieldType),

    /// An array allocated by the method being simulated
    Array(ArrayValue),

    /// An object allocated by the method being simulated, whose fields are not tracked
    Instance(ClassName),

    /// Statically unknown value
    Unknown(UnknownValue),
}

/// Array whose contents are fully tracked
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArrayValue {
    pub element_type: FieldType,
    pub elements: Vec<Value>,
}

/// A value that could not be determined, along with the type it is known to have
///
/// This is what consensus collapses to when paths disagree, and what every opaque source (a
/// parameter, a field read, the result of a call) produces.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnknownValue {
    pub declared_type: FieldType,
}

impl UnknownValue {
    pub fn new(declared_type: FieldType) -> UnknownValue {
        UnknownValue { declared_type }
    }
}

impl Value {
    pub fn unknown(declared_type: FieldType) -> Value {
        Value::Unknown(UnknownValue::new(declared_type))
    }

    /// Zero-like value that a freshly allocated array or field of this type holds
    pub fn default_for(field_type: &FieldType) -> Value {
        match field_type {
            FieldType::Base(BaseType::Boolean) => Value::Boolean(false),
            FieldType::Base(BaseType::Byte) => Value::Byte(0),
            FieldType::Base(BaseType::Char) => Value::Char(0),
            FieldType::Base(BaseType::Short) => Value::Short(0),
            FieldType::Base(BaseType::Int) => Value::Int(0),
            FieldType::Base(BaseType::Long) => Value::Long(0),
            FieldType::Base(BaseType::Float) => Value::Float(0.0),
            FieldType::Base(BaseType::Double) => Value::Double(0.0),
            FieldType::Ref(_) => Value::Null,
        }
    }

    /// Interpret raw bits (eg. from an array payload) as a value of a primitive type
    pub fn from_bits(base_type: BaseType, bits: i64) -> Value {
        match base_type {
            BaseType::Boolean => Value::Boolean(bits != 0),
            BaseType::Byte => Value::Byte(bits as i8),
            BaseType::Char => Value::Char(bits as u16),
            BaseType::Short => Value::Short(bits as i16),
            BaseType::Int => Value::Int(bits as i32),
            BaseType::Long => Value::Long(bits),
            BaseType::Float => Value::Float(f32::from_bits(bits as u32)),
            BaseType::Double => Value::Double(f64::from_bits(bits as u64)),
        }
    }

    /// Static type of the value
    pub fn value_type(&self) -> FieldType {
        match self {
            Value::Boolean(_) => FieldType::boolean(),
            Value::Byte(_) => FieldType::byte(),
            Value::Char(_) => FieldType::char(),
            Value::Short(_) => FieldType::short(),
            Value::Int(_) => FieldType::int(),
            Value::Long(_) => FieldType::long(),
            Value::Float(_) => FieldType::float(),
            Value::Double(_) => FieldType::double(),
            Value::Null => FieldType::object(ClassName::OBJECT),
            Value::String(_) => FieldType::object(ClassName::STRING),
            Value::Class(_) => FieldType::object(ClassName::CLASS),
            Value::Array(array) => FieldType::array(array.element_type.clone()),
            Value::Instance(class) => FieldType::object(class.clone()),
            Value::Unknown(unknown) => unknown.declared_type.clone(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Value::Unknown(_))
    }

    /// Does the value occupy a register pair?
    pub fn is_wide(&self) -> bool {
        match self {
            Value::Long(_) | Value::Double(_) => true,
            Value::Unknown(unknown) => unknown.declared_type.is_wide(),
            _ => false,
        }
    }

    /// Value of a 32-bit register
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Boolean(b) => Some(*b as i32),
            Value::Byte(b) => Some(*b as i32),
            Value::Char(c) => Some(*c as i32),
            Value::Short(s) => Some(*s as i32),
            Value::Int(i) => Some(*i),
            Value::Float(f) => Some(f.to_bits() as i32),
            _ => None,
        }
    }

    /// Value of a 64-bit register pair
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(l) => Some(*l),
            Value::Double(d) => Some(d.to_bits() as i64),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(f) => Some(*f),
            other => other.as_int().map(|bits| f32::from_bits(bits as u32)),
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            other => other.as_long().map(|bits| f64::from_bits(bits as u64)),
        }
    }

    /// Is this definitely a non-null reference?
    pub fn is_non_null_reference(&self) -> bool {
        matches!(
            self,
            Value::String(_) | Value::Class(_) | Value::Array(_) | Value::Instance(_)
        )
    }

    /// Convert the contents of a register to what an array or field of the given type would
    /// store
    ///
    /// Narrowing follows the JVM: `aput-byte` of `0x1ff` stores `-1`.
    pub fn coerce_to(&self, target: &FieldType) -> Value {
        if let Value::Unknown(_) = self {
            return Value::unknown(target.clone());
        }
        let converted = match target {
            FieldType::Base(BaseType::Boolean) => self.as_int().map(|i| Value::Boolean(i & 1 != 0)),
            FieldType::Base(BaseType::Byte) => self.as_int().map(|i| Value::Byte(i as i8)),
            FieldType::Base(BaseType::Char) => self.as_int().map(|i| Value::Char(i as u16)),
            FieldType::Base(BaseType::Short) => self.as_int().map(|i| Value::Short(i as i16)),
            FieldType::Base(BaseType::Int) => self.as_int().map(Value::Int),
            FieldType::Base(BaseType::Float) => self.as_float().map(Value::Float),
            FieldType::Base(BaseType::Long) => self.as_long().map(Value::Long),
            FieldType::Base(BaseType::Double) => self.as_double().map(Value::Double),
            FieldType::Ref(_) => match self {
                Value::Int(0) => Some(Value::Null),
                Value::Null
                | Value::String(_)
                | Value::Class(_)
                | Value::Array(_)
                | Value::Instance(_) => Some(self.clone()),
                _ => None,
            },
        };
        converted.unwrap_or_else(|| Value::unknown(target.clone()))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,

            // Bitwise, so that `NaN == NaN` and `0.0 != -0.0`
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),

            (Value::Null, Value::Null) => true,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Class(a), Value::Class(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Instance(a), Value::Instance(b)) => a == b,
            (Value::Unknown(a), Value::Unknown(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl From<UnknownValue> for Value {
    fn from(unknown: UnknownValue) -> Value {
        Value::Unknown(unknown)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn float_equality_is_bitwise() {
        assert_eq!(Value::Float(f32::NAN), Value::Float(f32::NAN));
        assert_ne!(Value::Double(0.0), Value::Double(-0.0));
        assert_ne!(Value::Int(1), Value::Long(1));
    }

    #[test]
    fn untyped_registers() {
        let one = Value::Int(0x3f80_0000);
        assert_eq!(one.as_float(), Some(1.0));
        assert_eq!(Value::Boolean(true).as_int(), Some(1));
        assert_eq!(Value::Long(1).as_int(), None);
        assert_eq!(Value::Double(2.0).as_long(), Some(2.0f64.to_bits() as i64));
    }

    #[test]
    fn value_types() {
        assert_eq!(Value::Int(3).value_type(), FieldType::int());
        assert_eq!(
            Value::String(String::from("hi")).value_type(),
            FieldType::object(ClassName::STRING)
        );
        let array = Value::Array(ArrayValue {
            element_type: FieldType::int(),
            elements: vec![Value::Int(1)],
        });
        assert_eq!(array.value_type(), FieldType::array(FieldType::int()));
        assert_eq!(
            Value::unknown(FieldType::long()).value_type(),
            FieldType::long()
        );
        assert!(Value::unknown(FieldType::double()).is_wide());
        assert!(!Value::unknown(FieldType::int()).is_known());
    }

    #[test]
    fn coercions() {
        assert_eq!(Value::Int(0x1ff).coerce_to(&FieldType::byte()), Value::Byte(-1));
        assert_eq!(Value::Int(2).coerce_to(&FieldType::boolean()), Value::Boolean(false));
        assert_eq!(
            Value::Int(0).coerce_to(&FieldType::object(ClassName::STRING)),
            Value::Null
        );
        assert_eq!(
            Value::Int(7).coerce_to(&FieldType::long()),
            Value::unknown(FieldType::long())
        );
        assert_eq!(
            Value::unknown(FieldType::int()).coerce_to(&FieldType::short()),
            Value::unknown(FieldType::short())
        );
    }

    #[test]
    fn payload_bits() {
        assert_eq!(Value::from_bits(BaseType::Int, -1), Value::Int(-1));
        assert_eq!(Value::from_bits(BaseType::Char, 0x41), Value::Char('A' as u16));
        assert_eq!(
            Value::from_bits(BaseType::Double, 1.5f64.to_bits() as i64),
            Value::Double(1.5)
        );
    }
}
