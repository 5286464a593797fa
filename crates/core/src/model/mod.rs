//! Metadata snapshot (IR) for types and their members.
//!
//! Everything the renderer needs is copied out of the runtime into these plain
//! values first, so a type's declaration depends only on its snapshot.

pub mod flags;

use flags::{FieldAttributes, MemberAccess, MethodAttributes, ParamAttributes, TypeAttributes};

/// A loaded native library and where it is mapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub base: usize,
}

impl Module {
    pub fn new(name: impl Into<String>, base: usize) -> Self {
        Self { name: name.into(), base }
    }

    /// Relative address of `va` inside this module, or 0 when `va` does not lie
    /// above the base (unresolved stubs, null code pointers).
    pub fn rva(&self, va: usize) -> usize {
        if va > self.base {
            va - self.base
        } else {
            0
        }
    }
}

/// Parent type as seen from a derived type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentInfo {
    pub name: String,
    /// True when the parent is the root `System.Object`.
    pub is_object: bool,
}

/// Snapshot of a single type definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    pub name: String,
    pub namespace: String,
    /// Raw type attribute bitmask.
    pub flags: u32,
    pub is_valuetype: bool,
    pub is_enum: bool,
    pub parent: Option<ParentInfo>,
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldInfo>,
    pub properties: Vec<PropertyInfo>,
    pub methods: Vec<MethodInfo>,
}

impl TypeInfo {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, flags: u32) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            flags,
            is_valuetype: false,
            is_enum: false,
            parent: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn attributes(&self) -> TypeAttributes {
        TypeAttributes::from_bits_truncate(self.flags)
    }

    pub fn is_interface(&self) -> bool {
        self.attributes().contains(TypeAttributes::INTERFACE)
    }
}

/// Snapshot of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    pub type_name: String,
    /// Raw field attribute bitmask.
    pub flags: u32,
    pub offset: usize,
    /// Constant value, read only for literal fields of enum types.
    pub constant: Option<u64>,
}

impl FieldInfo {
    pub fn access(&self) -> MemberAccess {
        MemberAccess::from_flags(self.flags)
    }

    pub fn attributes(&self) -> FieldAttributes {
        FieldAttributes::from_bits_truncate(self.flags)
    }

    pub fn is_literal(&self) -> bool {
        self.attributes().contains(FieldAttributes::LITERAL)
    }
}

/// Modifier and type of a property, taken from one of its accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorInfo {
    /// Raw method attribute bitmask of the accessor.
    pub flags: u32,
    pub type_name: String,
}

/// Snapshot of a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyInfo {
    pub name: Option<String>,
    pub has_getter: bool,
    pub has_setter: bool,
    /// `None` when neither accessor could be resolved to a type.
    pub accessor: Option<AccessorInfo>,
}

/// Snapshot of a method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamInfo {
    pub name: String,
    pub type_name: String,
    /// Raw parameter attribute bits.
    pub attrs: u32,
}

impl ParamInfo {
    pub fn is_out(&self) -> bool {
        ParamAttributes::from_bits_truncate(self.attrs).contains(ParamAttributes::OUT)
    }
}

/// Snapshot of a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: String,
    /// Raw method attribute bitmask.
    pub flags: u32,
    pub return_type: String,
    pub params: Vec<ParamInfo>,
    pub va: usize,
    pub rva: usize,
}

impl MethodInfo {
    pub fn access(&self) -> MemberAccess {
        MemberAccess::from_flags(self.flags)
    }

    pub fn attributes(&self) -> MethodAttributes {
        MethodAttributes::from_bits_truncate(self.flags)
    }
}
