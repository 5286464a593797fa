//! Declaration text for a [`TypeInfo`] snapshot.
//!
//! Rendering is pure: the same snapshot always produces the same bytes.

use std::fmt::Write;

use crate::members::PLACEHOLDER;
use crate::model::flags::{
    FieldAttributes, MemberAccess, MethodAttributes, TypeAttributes, TypeVisibility,
};
use crate::model::{FieldInfo, MethodInfo, PropertyInfo, TypeInfo};

/// At most one of `static`, `abstract` or `sealed`.
pub fn type_modifier(ty: &TypeInfo) -> Option<&'static str> {
    let attrs = ty.attributes();
    let is_abstract = attrs.contains(TypeAttributes::ABSTRACT);
    let is_sealed = attrs.contains(TypeAttributes::SEALED);

    if is_abstract && is_sealed {
        Some("static")
    } else if is_abstract && !ty.is_interface() {
        Some("abstract")
    } else if is_sealed && !ty.is_valuetype && !ty.is_enum {
        Some("sealed")
    } else {
        None
    }
}

pub fn type_kind(ty: &TypeInfo) -> &'static str {
    if ty.is_interface() {
        "interface"
    } else if ty.is_enum {
        "enum"
    } else if ty.is_valuetype {
        "struct"
    } else {
        "class"
    }
}

/// Parent (classes only, never the root object) followed by interfaces.
pub fn inheritance(ty: &TypeInfo) -> Vec<&str> {
    let mut extends = Vec::with_capacity(ty.interfaces.len() + 1);
    if !ty.is_valuetype && !ty.is_enum {
        if let Some(parent) = ty.parent.as_ref().filter(|p| !p.is_object) {
            extends.push(parent.name.as_str());
        }
    }
    extends.extend(ty.interfaces.iter().map(String::as_str));
    extends
}

fn push_access(out: &mut String, access: MemberAccess) {
    if let Some(keyword) = access.keyword() {
        out.push_str(keyword);
        out.push(' ');
    }
}

/// Access, `static`, `abstract` and `virtual` keywords of a method, each
/// followed by a space.
pub fn method_modifiers(flags: u32) -> String {
    let mut out = String::new();
    push_access(&mut out, MemberAccess::from_flags(flags));
    let attrs = MethodAttributes::from_bits_truncate(flags);
    if attrs.contains(MethodAttributes::STATIC) {
        out.push_str("static ");
    }
    if attrs.contains(MethodAttributes::ABSTRACT) {
        out.push_str("abstract ");
    }
    if attrs.contains(MethodAttributes::VIRTUAL) {
        out.push_str("virtual ");
    }
    out
}

pub fn render_field(field: &FieldInfo) -> String {
    let mut out = String::from("\t");
    push_access(&mut out, field.access());
    if field.is_literal() {
        out.push_str("const ");
    } else {
        let attrs = field.attributes();
        if attrs.contains(FieldAttributes::STATIC) {
            out.push_str("static ");
        }
        if attrs.contains(FieldAttributes::INIT_ONLY) {
            out.push_str("readonly ");
        }
    }
    let _ = write!(out, "{} {}", field.type_name, field.name);
    if let Some(value) = field.constant.filter(|_| field.is_literal()) {
        let _ = write!(out, " = {value}");
    }
    let _ = writeln!(out, "; // 0x{:x}", field.offset);
    out
}

pub fn render_property(property: &PropertyInfo) -> String {
    let Some(accessor) = &property.accessor else {
        return match &property.name {
            Some(name) => format!("\t// unknown property {name}\n"),
            None => "\t// unknown property\n".to_string(),
        };
    };

    let mut out = String::from("\t");
    out.push_str(&method_modifiers(accessor.flags));
    let name = property.name.as_deref().unwrap_or(PLACEHOLDER);
    let _ = write!(out, "{} {} {{ ", accessor.type_name, name);
    if property.has_getter {
        out.push_str("get; ");
    }
    if property.has_setter {
        out.push_str("set; ");
    }
    out.push_str("}\n");
    out
}

pub fn render_method(method: &MethodInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\t// RVA: 0x{:x} VA: 0x{:x}", method.rva, method.va);
    out.push('\t');
    out.push_str(&method_modifiers(method.flags));
    let _ = write!(out, "{} {}(", method.return_type, method.name);
    let params: Vec<String> = method
        .params
        .iter()
        .map(|p| {
            let marker = if p.is_out() { "[Out] " } else { "" };
            format!("{marker}{} {}", p.type_name, p.name)
        })
        .collect();
    out.push_str(&params.join(", "));
    out.push_str(") { }\n");
    out
}

/// Full declaration of a type, starting with its namespace comment.
pub fn render_type(ty: &TypeInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n// Namespace: {}", ty.namespace);
    if ty.attributes().contains(TypeAttributes::SERIALIZABLE) {
        out.push_str("[Serializable]\n");
    }

    out.push_str(TypeVisibility::from_flags(ty.flags).keyword());
    out.push(' ');
    if let Some(modifier) = type_modifier(ty) {
        out.push_str(modifier);
        out.push(' ');
    }
    let _ = write!(out, "{} {}", type_kind(ty), ty.name);
    let extends = inheritance(ty);
    if !extends.is_empty() {
        let _ = write!(out, " : {}", extends.join(", "));
    }
    out.push_str("\n{");

    out.push_str("\n\t// Fields\n");
    for field in &ty.fields {
        out.push_str(&render_field(field));
    }
    out.push_str("\n\t// Properties\n");
    for property in &ty.properties {
        out.push_str(&render_property(property));
    }
    out.push_str("\n\t// Methods\n");
    for method in &ty.methods {
        out.push_str(&render_method(method));
    }
    out.push_str("}\n");
    out
}
