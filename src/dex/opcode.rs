//! Dalvik opcodes and their static properties
//!
//! Only properties that do not depend on operands live here. The simulator needs two of them
//! for every instruction of a method before anything executes: whether control can fall through
//! to the next address ([`Opcode::can_continue`]), and whether the opcode is one of the
//! exceptions to "cannot continue means the method ends here" (gotos and array payloads).
//!
//! Values, mnemonics and formats follow the [Dalvik bytecode reference][0].
//!
//! [0]: https://source.android.com/docs/core/runtime/dalvik-bytecode

use bitflags::bitflags;

bitflags! {
    /// Static properties of an opcode
    pub struct OpcodeFlags: u32 {
        /// Execution may continue at the next instruction
        const CAN_CONTINUE = 0x1;

        /// The instruction may throw an exception
        const CAN_THROW = 0x2;

        /// The instruction writes a destination register
        const SETS_REGISTER = 0x4;

        /// The destination register is a register pair
        const SETS_WIDE_REGISTER = 0x8;

        /// The instruction writes the result register (read by `move-result*`)
        const SETS_RESULT = 0x10;
    }
}

const NO: OpcodeFlags = OpcodeFlags::empty();
const CC: OpcodeFlags = OpcodeFlags::CAN_CONTINUE;
const CT: OpcodeFlags = OpcodeFlags::CAN_THROW;
const SR: OpcodeFlags = OpcodeFlags::SETS_REGISTER;
const SW: OpcodeFlags = OpcodeFlags::SETS_WIDE_REGISTER;
const RS: OpcodeFlags = OpcodeFlags::SETS_RESULT;

/// Instruction formats, named as in the Dalvik documentation
///
/// The first digit of the name is the width of the instruction in code units.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Format {
    Format10t,
    Format10x,
    Format11n,
    Format11x,
    Format12x,
    Format20t,
    Format21c,
    Format21h,
    Format21s,
    Format21t,
    Format22b,
    Format22c,
    Format22s,
    Format22t,
    Format22x,
    Format23x,
    Format30t,
    Format31c,
    Format31i,
    Format31t,
    Format32x,
    Format35c,
    Format3rc,
    Format51l,
    PackedSwitchPayload,
    SparseSwitchPayload,
    ArrayPayload,
}

impl Format {
    /// Width in code units, or `None` for payloads (whose width depends on their contents)
    pub const fn size(self) -> Option<usize> {
        use Format::*;
        match self {
            Format10t | Format10x | Format11n | Format11x | Format12x => Some(1),
            Format20t | Format21c | Format21h | Format21s | Format21t | Format22b | Format22c
            | Format22s | Format22t | Format22x | Format23x => Some(2),
            Format30t | Format31c | Format31i | Format31t | Format32x | Format35c | Format3rc => {
                Some(3)
            }
            Format51l => Some(5),
            PackedSwitchPayload | SparseSwitchPayload | ArrayPayload => None,
        }
    }

    pub const fn is_payload(self) -> bool {
        self.size().is_none()
    }
}

macro_rules! opcodes {
    ($($variant:ident = $value:literal, $name:literal, $format:ident, $flags:expr;)*) => {
        /// Dalvik opcode
        #[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
        pub enum Opcode {
            $($variant,)*
        }

        impl Opcode {
            /// Every opcode, in opcode value order
            pub const ALL: &'static [Opcode] = &[$(Opcode::$variant,)*];

            /// Opcode value (payload pseudo-instructions use their 16-bit identifier)
            pub const fn value(self) -> u16 {
                match self {
                    $(Opcode::$variant => $value,)*
                }
            }

            /// Mnemonic, as written in smali
            pub const fn name(self) -> &'static str {
                match self {
                    $(Opcode::$variant => $name,)*
                }
            }

            pub const fn format(self) -> Format {
                match self {
                    $(Opcode::$variant => Format::$format,)*
                }
            }

            pub fn flags(self) -> OpcodeFlags {
                match self {
                    $(Opcode::$variant => $flags,)*
                }
            }
        }
    };
}

opcodes! {
    Nop = 0x00, "nop", Format10x, CC;
    Move = 0x01, "move", Format12x, CC | SR;
    MoveFrom16 = 0x02, "move/from16", Format22x, CC | SR;
    Move16 = 0x03, "move/16", Format32x, CC | SR;
    MoveWide = 0x04, "move-wide", Format12x, CC | SR | SW;
    MoveWideFrom16 = 0x05, "move-wide/from16", Format22x, CC | SR | SW;
    MoveWide16 = 0x06, "move-wide/16", Format32x, CC | SR | SW;
    MoveObject = 0x07, "move-object", Format12x, CC | SR;
    MoveObjectFrom16 = 0x08, "move-object/from16", Format22x, CC | SR;
    MoveObject16 = 0x09, "move-object/16", Format32x, CC | SR;
    MoveResult = 0x0a, "move-result", Format11x, CC | SR;
    MoveResultWide = 0x0b, "move-result-wide", Format11x, CC | SR | SW;
    MoveResultObject = 0x0c, "move-result-object", Format11x, CC | SR;
    MoveException = 0x0d, "move-exception", Format11x, CC | SR;
    ReturnVoid = 0x0e, "return-void", Format10x, NO;
    Return = 0x0f, "return", Format11x, NO;
    ReturnWide = 0x10, "return-wide", Format11x, NO;
    ReturnObject = 0x11, "return-object", Format11x, NO;
    Const4 = 0x12, "const/4", Format11n, CC | SR;
    Const16 = 0x13, "const/16", Format21s, CC | SR;
    Const = 0x14, "const", Format31i, CC | SR;
    ConstHigh16 = 0x15, "const/high16", Format21h, CC | SR;
    ConstWide16 = 0x16, "const-wide/16", Format21s, CC | SR | SW;
    ConstWide32 = 0x17, "const-wide/32", Format31i, CC | SR | SW;
    ConstWide = 0x18, "const-wide", Format51l, CC | SR | SW;
    ConstWideHigh16 = 0x19, "const-wide/high16", Format21h, CC | SR | SW;
    ConstString = 0x1a, "const-string", Format21c, CC | CT | SR;
    ConstStringJumbo = 0x1b, "const-string/jumbo", Format31c, CC | CT | SR;
    ConstClass = 0x1c, "const-class", Format21c, CC | CT | SR;
    MonitorEnter = 0x1d, "monitor-enter", Format11x, CC | CT;
    MonitorExit = 0x1e, "monitor-exit", Format11x, CC | CT;
    CheckCast = 0x1f, "check-cast", Format21c, CC | CT | SR;
    InstanceOf = 0x20, "instance-of", Format22c, CC | CT | SR;
    ArrayLength = 0x21, "array-length", Format12x, CC | CT | SR;
    NewInstance = 0x22, "new-instance", Format21c, CC | CT | SR;
    NewArray = 0x23, "new-array", Format22c, CC | CT | SR;
    FilledNewArray = 0x24, "filled-new-array", Format35c, CC | CT | RS;
    FilledNewArrayRange = 0x25, "filled-new-array/range", Format3rc, CC | CT | RS;
    FillArrayData = 0x26, "fill-array-data", Format31t, CC | CT;
    Throw = 0x27, "throw", Format11x, CT;
    Goto = 0x28, "goto", Format10t, NO;
    Goto16 = 0x29, "goto/16", Format20t, NO;
    Goto32 = 0x2a, "goto/32", Format30t, NO;
    PackedSwitch = 0x2b, "packed-switch", Format31t, CC;
    SparseSwitch = 0x2c, "sparse-switch", Format31t, CC;
    CmplFloat = 0x2d, "cmpl-float", Format23x, CC | SR;
    CmpgFloat = 0x2e, "cmpg-float", Format23x, CC | SR;
    CmplDouble = 0x2f, "cmpl-double", Format23x, CC | SR;
    CmpgDouble = 0x30, "cmpg-double", Format23x, CC | SR;
    CmpLong = 0x31, "cmp-long", Format23x, CC | SR;
    IfEq = 0x32, "if-eq", Format22t, CC;
    IfNe = 0x33, "if-ne", Format22t, CC;
    IfLt = 0x34, "if-lt", Format22t, CC;
    IfGe = 0x35, "if-ge", Format22t, CC;
    IfGt = 0x36, "if-gt", Format22t, CC;
    IfLe = 0x37, "if-le", Format22t, CC;
    IfEqz = 0x38, "if-eqz", Format21t, CC;
    IfNez = 0x39, "if-nez", Format21t, CC;
    IfLtz = 0x3a, "if-ltz", Format21t, CC;
    IfGez = 0x3b, "if-gez", Format21t, CC;
    IfGtz = 0x3c, "if-gtz", Format21t, CC;
    IfLez = 0x3d, "if-lez", Format21t, CC;
    Aget = 0x44, "aget", Format23x, CC | CT | SR;
    AgetWide = 0x45, "aget-wide", Format23x, CC | CT | SR | SW;
    AgetObject = 0x46, "aget-object", Format23x, CC | CT | SR;
    AgetBoolean = 0x47, "aget-boolean", Format23x, CC | CT | SR;
    AgetByte = 0x48, "aget-byte", Format23x, CC | CT | SR;
    AgetChar = 0x49, "aget-char", Format23x, CC | CT | SR;
    AgetShort = 0x4a, "aget-short", Format23x, CC | CT | SR;
    Aput = 0x4b, "aput", Format23x, CC | CT;
    AputWide = 0x4c, "aput-wide", Format23x, CC | CT;
    AputObject = 0x4d, "aput-object", Format23x, CC | CT;
    AputBoolean = 0x4e, "aput-boolean", Format23x, CC | CT;
    AputByte = 0x4f, "aput-byte", Format23x, CC | CT;
    AputChar = 0x50, "aput-char", Format23x, CC | CT;
    AputShort = 0x51, "aput-short", Format23x, CC | CT;
    Iget = 0x52, "iget", Format22c, CC | CT | SR;
    IgetWide = 0x53, "iget-wide", Format22c, CC | CT | SR | SW;
    IgetObject = 0x54, "iget-object", Format22c, CC | CT | SR;
    IgetBoolean = 0x55, "iget-boolean", Format22c, CC | CT | SR;
    IgetByte = 0x56, "iget-byte", Format22c, CC | CT | SR;
    IgetChar = 0x57, "iget-char", Format22c, CC | CT | SR;
    IgetShort = 0x58, "iget-short", Format22c, CC | CT | SR;
    Iput = 0x59, "iput", Format22c, CC | CT;
    IputWide = 0x5a, "iput-wide", Format22c, CC | CT;
    IputObject = 0x5b, "iput-object", Format22c, CC | CT;
    IputBoolean = 0x5c, "iput-boolean", Format22c, CC | CT;
    IputByte = 0x5d, "iput-byte", Format22c, CC | CT;
    IputChar = 0x5e, "iput-char", Format22c, CC | CT;
    IputShort = 0x5f, "iput-short", Format22c, CC | CT;
    Sget = 0x60, "sget", Format21c, CC | CT | SR;
    SgetWide = 0x61, "sget-wide", Format21c, CC | CT | SR | SW;
    SgetObject = 0x62, "sget-object", Format21c, CC | CT | SR;
    SgetBoolean = 0x63, "sget-boolean", Format21c, CC | CT | SR;
    SgetByte = 0x64, "sget-byte", Format21c, CC | CT | SR;
    SgetChar = 0x65, "sget-char", Format21c, CC | CT | SR;
    SgetShort = 0x66, "sget-short", Format21c, CC | CT | SR;
    Sput = 0x67, "sput", Format21c, CC | CT;
    SputWide = 0x68, "sput-wide", Format21c, CC | CT;
    SputObject = 0x69, "sput-object", Format21c, CC | CT;
    SputBoolean = 0x6a, "sput-boolean", Format21c, CC | CT;
    SputByte = 0x6b, "sput-byte", Format21c, CC | CT;
    SputChar = 0x6c, "sput-char", Format21c, CC | CT;
    SputShort = 0x6d, "sput-short", Format21c, CC | CT;
    InvokeVirtual = 0x6e, "invoke-virtual", Format35c, CC | CT | RS;
    InvokeSuper = 0x6f, "invoke-super", Format35c, CC | CT | RS;
    InvokeDirect = 0x70, "invoke-direct", Format35c, CC | CT | RS;
    InvokeStatic = 0x71, "invoke-static", Format35c, CC | CT | RS;
    InvokeInterface = 0x72, "invoke-interface", Format35c, CC | CT | RS;
    InvokeVirtualRange = 0x74, "invoke-virtual/range", Format3rc, CC | CT | RS;
    InvokeSuperRange = 0x75, "invoke-super/range", Format3rc, CC | CT | RS;
    InvokeDirectRange = 0x76, "invoke-direct/range", Format3rc, CC | CT | RS;
    InvokeStaticRange = 0x77, "invoke-static/range", Format3rc, CC | CT | RS;
    InvokeInterfaceRange = 0x78, "invoke-interface/range", Format3rc, CC | CT | RS;
    NegInt = 0x7b, "neg-int", Format12x, CC | SR;
    NotInt = 0x7c, "not-int", Format12x, CC | SR;
    NegLong = 0x7d, "neg-long", Format12x, CC | SR | SW;
    NotLong = 0x7e, "not-long", Format12x, CC | SR | SW;
    NegFloat = 0x7f, "neg-float", Format12x, CC | SR;
    NegDouble = 0x80, "neg-double", Format12x, CC | SR | SW;
    IntToLong = 0x81, "int-to-long", Format12x, CC | SR | SW;
    IntToFloat = 0x82, "int-to-float", Format12x, CC | SR;
    IntToDouble = 0x83, "int-to-double", Format12x, CC | SR | SW;
    LongToInt = 0x84, "long-to-int", Format12x, CC | SR;
    LongToFloat = 0x85, "long-to-float", Format12x, CC | SR;
    LongToDouble = 0x86, "long-to-double", Format12x, CC | SR | SW;
    FloatToInt = 0x87, "float-to-int", Format12x, CC | SR;
    FloatToLong = 0x88, "float-to-long", Format12x, CC | SR | SW;
    FloatToDouble = 0x89, "float-to-double", Format12x, CC | SR | SW;
    DoubleToInt = 0x8a, "double-to-int", Format12x, CC | SR;
    DoubleToLong = 0x8b, "double-to-long", Format12x, CC | SR | SW;
    DoubleToFloat = 0x8c, "double-to-float", Format12x, CC | SR;
    IntToByte = 0x8d, "int-to-byte", Format12x, CC | SR;
    IntToChar = 0x8e, "int-to-char", Format12x, CC | SR;
    IntToShort = 0x8f, "int-to-short", Format12x, CC | SR;
    AddInt = 0x90, "add-int", Format23x, CC | SR;
    SubInt = 0x91, "sub-int", Format23x, CC | SR;
    MulInt = 0x92, "mul-int", Format23x, CC | SR;
    DivInt = 0x93, "div-int", Format23x, CC | CT | SR;
    RemInt = 0x94, "rem-int", Format23x, CC | CT | SR;
    AndInt = 0x95, "and-int", Format23x, CC | SR;
    OrInt = 0x96, "or-int", Format23x, CC | SR;
    XorInt = 0x97, "xor-int", Format23x, CC | SR;
    ShlInt = 0x98, "shl-int", Format23x, CC | SR;
    ShrInt = 0x99, "shr-int", Format23x, CC | SR;
    UshrInt = 0x9a, "ushr-int", Format23x, CC | SR;
    AddLong = 0x9b, "add-long", Format23x, CC | SR | SW;
    SubLong = 0x9c, "sub-long", Format23x, CC | SR | SW;
    MulLong = 0x9d, "mul-long", Format23x, CC | SR | SW;
    DivLong = 0x9e, "div-long", Format23x, CC | CT | SR | SW;
    RemLong = 0x9f, "rem-long", Format23x, CC | CT | SR | SW;
    AndLong = 0xa0, "and-long", Format23x, CC | SR | SW;
    OrLong = 0xa1, "or-long", Format23x, CC | SR | SW;
    XorLong = 0xa2, "xor-long", Format23x, CC | SR | SW;
    ShlLong = 0xa3, "shl-long", Format23x, CC | SR | SW;
    ShrLong = 0xa4, "shr-long", Format23x, CC | SR | SW;
    UshrLong = 0xa5, "ushr-long", Format23x, CC | SR | SW;
    AddFloat = 0xa6, "add-float", Format23x, CC | SR;
    SubFloat = 0xa7, "sub-float", Format23x, CC | SR;
    MulFloat = 0xa8, "mul-float", Format23x, CC | SR;
    DivFloat = 0xa9, "div-float", Format23x, CC | SR;
    RemFloat = 0xaa, "rem-float", Format23x, CC | SR;
    AddDouble = 0xab, "add-double", Format23x, CC | SR | SW;
    SubDouble = 0xac, "sub-double", Format23x, CC | SR | SW;
    MulDouble = 0xad, "mul-double", Format23x, CC | SR | SW;
    DivDouble = 0xae, "div-double", Format23x, CC | SR | SW;
    RemDouble = 0xaf, "rem-double", Format23x, CC | SR | SW;
    AddInt2Addr = 0xb0, "add-int/2addr", Format12x, CC | SR;
    SubInt2Addr = 0xb1, "sub-int/2addr", Format12x, CC | SR;
    MulInt2Addr = 0xb2, "mul-int/2addr", Format12x, CC | SR;
    DivInt2Addr = 0xb3, "div-int/2addr", Format12x, CC | CT | SR;
    RemInt2Addr = 0xb4, "rem-int/2addr", Format12x, CC | CT | SR;
    AndInt2Addr = 0xb5, "and-int/2addr", Format12x, CC | SR;
    OrInt2Addr = 0xb6, "or-int/2addr", Format12x, CC | SR;
    XorInt2Addr = 0xb7, "xor-int/2addr", Format12x, CC | SR;
    ShlInt2Addr = 0xb8, "shl-int/2addr", Format12x, CC | SR;
    ShrInt2Addr = 0xb9, "shr-int/2addr", Format12x, CC | SR;
    UshrInt2Addr = 0xba, "ushr-int/2addr", Format12x, CC | SR;
    AddLong2Addr = 0xbb, "add-long/2addr", Format12x, CC | SR | SW;
    SubLong2Addr = 0xbc, "sub-long/2addr", Format12x, CC | SR | SW;
    MulLong2Addr = 0xbd, "mul-long/2addr", Format12x, CC | SR | SW;
    DivLong2Addr = 0xbe, "div-long/2addr", Format12x, CC | CT | SR | SW;
    RemLong2Addr = 0xbf, "rem-long/2addr", Format12x, CC | CT | SR | SW;
    AndLong2Addr = 0xc0, "and-long/2addr", Format12x, CC | SR | SW;
    OrLong2Addr = 0xc1, "or-long/2addr", Format12x, CC | SR | SW;
    XorLong2Addr = 0xc2, "xor-long/2addr", Format12x, CC | SR | SW;
    ShlLong2Addr = 0xc3, "shl-long/2addr", Format12x, CC | SR | SW;
    ShrLong2Addr = 0xc4, "shr-long/2addr", Format12x, CC | SR | SW;
    UshrLong2Addr = 0xc5, "ushr-long/2addr", Format12x, CC | SR | SW;
    AddFloat2Addr = 0xc6, "add-float/2addr", Format12x, CC | SR;
    SubFloat2Addr = 0xc7, "sub-float/2addr", Format12x, CC | SR;
    MulFloat2Addr = 0xc8, "mul-float/2addr", Format12x, CC | SR;
    DivFloat2Addr = 0xc9, "div-float/2addr", Format12x, CC | SR;
    RemFloat2Addr = 0xca, "rem-float/2addr", Format12x, CC | SR;
    AddDouble2Addr = 0xcb, "add-double/2addr", Format12x, CC | SR | SW;
    SubDouble2Addr = 0xcc, "sub-double/2addr", Format12x, CC | SR | SW;
    MulDouble2Addr = 0xcd, "mul-double/2addr", Format12x, CC | SR | SW;
    DivDouble2Addr = 0xce, "div-double/2addr", Format12x, CC | SR | SW;
    RemDouble2Addr = 0xcf, "rem-double/2addr", Format12x, CC | SR | SW;
    AddIntLit16 = 0xd0, "add-int/lit16", Format22s, CC | SR;
    RsubInt = 0xd1, "rsub-int", Format22s, CC | SR;
    MulIntLit16 = 0xd2, "mul-int/lit16", Format22s, CC | SR;
    DivIntLit16 = 0xd3, "div-int/lit16", Format22s, CC | CT | SR;
    RemIntLit16 = 0xd4, "rem-int/lit16", Format22s, CC | CT | SR;
    AndIntLit16 = 0xd5, "and-int/lit16", Format22s, CC | SR;
    OrIntLit16 = 0xd6, "or-int/lit16", Format22s, CC | SR;
    XorIntLit16 = 0xd7, "xor-int/lit16", Format22s, CC | SR;
    AddIntLit8 = 0xd8, "add-int/lit8", Format22b, CC | SR;
    RsubIntLit8 = 0xd9, "rsub-int/lit8", Format22b, CC | SR;
    MulIntLit8 = 0xda, "mul-int/lit8", Format22b, CC | SR;
    DivIntLit8 = 0xdb, "div-int/lit8", Format22b, CC | CT | SR;
    RemIntLit8 = 0xdc, "rem-int/lit8", Format22b, CC | CT | SR;
    AndIntLit8 = 0xdd, "and-int/lit8", Format22b, CC | SR;
    OrIntLit8 = 0xde, "or-int/lit8", Format22b, CC | SR;
    XorIntLit8 = 0xdf, "xor-int/lit8", Format22b, CC | SR;
    ShlIntLit8 = 0xe0, "shl-int/lit8", Format22b, CC | SR;
    ShrIntLit8 = 0xe1, "shr-int/lit8", Format22b, CC | SR;
    UshrIntLit8 = 0xe2, "ushr-int/lit8", Format22b, CC | SR;
    PackedSwitchPayload = 0x100, "packed-switch-payload", PackedSwitchPayload, NO;
    SparseSwitchPayload = 0x200, "sparse-switch-payload", SparseSwitchPayload, NO;
    ArrayPayload = 0x300, "array-payload", ArrayPayload, NO;
}

impl Opcode {
    /// Can execution fall through to the next instruction?
    pub fn can_continue(self) -> bool {
        self.flags().contains(OpcodeFlags::CAN_CONTINUE)
    }

    pub fn can_throw(self) -> bool {
        self.flags().contains(OpcodeFlags::CAN_THROW)
    }

    pub fn sets_register(self) -> bool {
        self.flags().contains(OpcodeFlags::SETS_REGISTER)
    }

    pub fn sets_wide_register(self) -> bool {
        self.flags().contains(OpcodeFlags::SETS_WIDE_REGISTER)
    }

    pub fn sets_result(self) -> bool {
        self.flags().contains(OpcodeFlags::SETS_RESULT)
    }

    /// Is this `goto`, `goto/16`, or `goto/32`?
    pub fn is_goto(self) -> bool {
        matches!(self, Opcode::Goto | Opcode::Goto16 | Opcode::Goto32)
    }

    pub fn is_array_payload(self) -> bool {
        self == Opcode::ArrayPayload
    }

    pub fn is_payload(self) -> bool {
        self.format().is_payload()
    }

    /// Does reaching this opcode end the execution of the method?
    ///
    /// Gotos cannot continue either, but they always have a successor. The array payload cannot
    /// continue but is executed as a detour from `fill-array-data`, which resumes afterwards.
    pub fn is_terminating(self) -> bool {
        !(self.can_continue() || self.is_array_payload() || self.is_goto())
    }
}
