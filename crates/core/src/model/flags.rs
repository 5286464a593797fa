//! Metadata attribute flags as reported by the runtime.
//!
//! The runtime hands back raw `u32` bitmasks for types, fields, methods and
//! parameters. Access levels occupy a small enumerated sub-field, so they are
//! decoded into enums; the remaining bits are plain flags.

use bitflags::bitflags;

/// Bitmask for the visibility sub-field of type attributes.
pub const TYPE_VISIBILITY_MASK: u32 = 0x0007;
/// Bitmask for the access sub-field of field and method attributes.
pub const MEMBER_ACCESS_MASK: u32 = 0x0007;
/// `Il2CppTypeEnum` value of `System.Object`.
pub const IL2CPP_TYPE_OBJECT: u32 = 0x1c;

bitflags! {
    /// Type attribute bits other than visibility.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TypeAttributes: u32 {
        /// Type is an interface
        const INTERFACE = 0x0020;
        /// Type is abstract
        const ABSTRACT = 0x0080;
        /// Type cannot be derived from
        const SEALED = 0x0100;
        /// Type is serializable
        const SERIALIZABLE = 0x2000;
    }
}

bitflags! {
    /// Field attribute bits other than access.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FieldAttributes: u32 {
        /// Field is static
        const STATIC = 0x0010;
        /// Field can only be assigned in a constructor
        const INIT_ONLY = 0x0020;
        /// Field value is a compile time constant
        const LITERAL = 0x0040;
    }
}

bitflags! {
    /// Method attribute bits other than access.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MethodAttributes: u32 {
        /// Method is static
        const STATIC = 0x0010;
        /// Method cannot be overridden
        const FINAL = 0x0020;
        /// Method is virtual
        const VIRTUAL = 0x0040;
        /// Method hides by name and signature
        const HIDE_BY_SIG = 0x0080;
        /// Method has no implementation
        const ABSTRACT = 0x0400;
    }
}

bitflags! {
    /// Parameter attribute bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParamAttributes: u32 {
        /// Parameter is an input
        const IN = 0x0001;
        /// Parameter is an output
        const OUT = 0x0002;
        /// Parameter is optional
        const OPTIONAL = 0x0010;
    }
}

/// Visibility of a (possibly nested) type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeVisibility {
    NotPublic,
    Public,
    NestedPublic,
    NestedPrivate,
    NestedFamily,
    NestedAssembly,
    NestedFamAndAssem,
    NestedFamOrAssem,
}

impl TypeVisibility {
    /// Extract visibility from raw type attributes.
    pub fn from_flags(flags: u32) -> Self {
        match flags & TYPE_VISIBILITY_MASK {
            0 => TypeVisibility::NotPublic,
            1 => TypeVisibility::Public,
            2 => TypeVisibility::NestedPublic,
            3 => TypeVisibility::NestedPrivate,
            4 => TypeVisibility::NestedFamily,
            5 => TypeVisibility::NestedAssembly,
            6 => TypeVisibility::NestedFamAndAssem,
            _ => TypeVisibility::NestedFamOrAssem,
        }
    }

    /// Source keyword for this visibility.
    pub fn keyword(self) -> &'static str {
        match self {
            TypeVisibility::Public | TypeVisibility::NestedPublic => "public",
            TypeVisibility::NotPublic
            | TypeVisibility::NestedAssembly
            | TypeVisibility::NestedFamAndAssem => "internal",
            TypeVisibility::NestedPrivate => "private",
            TypeVisibility::NestedFamily => "protected",
            TypeVisibility::NestedFamOrAssem => "protected internal",
        }
    }
}

/// Access level shared by fields and methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberAccess {
    CompilerControlled,
    Private,
    FamAndAssem,
    Assembly,
    Family,
    FamOrAssem,
    Public,
}

impl MemberAccess {
    /// Extract the access level from raw field or method attributes.
    pub fn from_flags(flags: u32) -> Self {
        match flags & MEMBER_ACCESS_MASK {
            1 => MemberAccess::Private,
            2 => MemberAccess::FamAndAssem,
            3 => MemberAccess::Assembly,
            4 => MemberAccess::Family,
            5 => MemberAccess::FamOrAssem,
            6 => MemberAccess::Public,
            // 0 and the unused 7 have no source keyword.
            _ => MemberAccess::CompilerControlled,
        }
    }

    /// Source keyword, if the access level has one.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            MemberAccess::CompilerControlled => None,
            MemberAccess::Private => Some("private"),
            MemberAccess::FamAndAssem | MemberAccess::Assembly => Some("internal"),
            MemberAccess::Family => Some("protected"),
            MemberAccess::FamOrAssem => Some("protected internal"),
            MemberAccess::Public => Some("public"),
        }
    }
}
