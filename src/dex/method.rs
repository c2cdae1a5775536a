use super::{
    ClassName, Error, Instruction, MemberName, MethodAccessFlags, MethodDescriptor, MethodRef,
};
use crate::util::{AddressVec, CodeAddress};

/// A method along with its decoded body
#[derive(Clone, Debug)]
pub struct Method {
    pub class: ClassName,
    pub name: MemberName,
    pub descriptor: MethodDescriptor,
    pub access_flags: MethodAccessFlags,

    /// Size of the register frame (parameters occupy the last registers)
    pub registers: u16,

    /// Instructions, keyed by their address
    pub code: AddressVec<Instruction>,
}

impl Method {
    /// Method with an empty body
    pub fn new(
        class: ClassName,
        name: MemberName,
        descriptor: MethodDescriptor,
        access_flags: MethodAccessFlags,
        registers: u16,
    ) -> Method {
        Method {
            class,
            name,
            descriptor,
            access_flags,
            registers,
            code: AddressVec::new(),
        }
    }

    /// Method whose instructions come with the addresses a decoder found them at
    ///
    /// The addresses must be exactly those implied by the widths of the instructions.
    pub fn from_located(
        class: ClassName,
        name: MemberName,
        descriptor: MethodDescriptor,
        access_flags: MethodAccessFlags,
        registers: u16,
        instructions: impl IntoIterator<Item = (CodeAddress, Instruction)>,
    ) -> Result<Method, Error> {
        let mut method = Method::new(class, name, descriptor, access_flags, registers);
        let mut previous: Option<CodeAddress> = None;
        for (address, instruction) in instructions {
            if let Err((expected, _)) = method.code.push_at(address, instruction) {
                return Err(if previous == Some(address) {
                    Error::DuplicateAddress(address)
                } else {
                    Error::MisalignedAddress {
                        found: address,
                        expected,
                    }
                });
            }
            previous = Some(address);
        }
        Ok(method)
    }

    /// Append an instruction, returning the address it was placed at
    pub fn push(&mut self, instruction: Instruction) -> CodeAddress {
        self.code.push(instruction)
    }

    pub fn is_static(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::STATIC)
    }

    /// Number of registers taken up by parameters (including `this`)
    pub fn parameter_registers(&self) -> usize {
        self.descriptor.parameter_registers(!self.is_static())
    }

    /// Reference through which this method could be invoked
    pub fn reference(&self) -> MethodRef {
        MethodRef {
            class: self.class.clone(),
            name: self.name.clone(),
            descriptor: self.descriptor.clone(),
        }
    }

    /// Signature in the form `Lcom/example/Foo;->bar(I)V`
    pub fn signature(&self) -> String {
        self.reference().signature()
    }

    /// Instruction at an address, if one starts there
    pub fn instruction_at(&self, address: CodeAddress) -> Option<&Instruction> {
        self.code.get_address(address).ok()
    }

    /// Address just past the last instruction
    pub fn code_length(&self) -> usize {
        self.code.next_address().0
    }

    pub fn instructions(&self) -> impl Iterator<Item = (CodeAddress, &Instruction)> {
        self.code.iter().map(|(address, _, insn)| (address, insn))
    }
}
