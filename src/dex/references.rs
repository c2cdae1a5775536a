use super::{ClassName, FieldType, MemberName, MethodDescriptor, Name, RenderDescriptor};
use std::fmt;

/// Symbolic reference to a field, as found in `iget`/`sput`/... instructions
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub class: ClassName,
    pub name: MemberName,
    pub field_type: FieldType,
}

/// Symbolic reference to a method, as found in `invoke-*` instructions
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    pub class: ClassName,
    pub name: MemberName,
    pub descriptor: MethodDescriptor,
}

impl MethodRef {
    /// Signature in the form `Lcom/example/Foo;->bar(I)V`
    pub fn signature(&self) -> String {
        let mut signature = self.class.render();
        signature.push_str("->");
        signature.push_str(self.name.as_str());
        self.descriptor.render_to(&mut signature);
        signature
    }

    pub fn is_constructor(&self) -> bool {
        self.name == MemberName::INIT
    }
}

impl fmt::Debug for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}->{}:{}",
            self.class.render(),
            self.name.as_str(),
            self.field_type.render()
        )
    }
}

impl fmt::Debug for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}
