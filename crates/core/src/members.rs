//! Member extraction: runtime handles in, [`TypeInfo`] snapshots out.
//!
//! Members are enumerated with the runtime's `(klass, &iter)` cursor calls,
//! wrapped here in fused iterators. Type-level accessors that fail abort the
//! type; member-level ones degrade to placeholders so one bad member does not
//! cost the whole declaration.

use std::iter::FusedIterator;

use log::warn;

use crate::api::{
    type_name, ApiError, ApiResult, ClassRef, EntryPoint, FieldRef, IterToken, MethodRef,
    PropertyRef, RuntimeApi, TypeRef,
};
use crate::model::flags::{FieldAttributes, IL2CPP_TYPE_OBJECT};
use crate::model::{
    AccessorInfo, FieldInfo, MethodInfo, Module, ParamInfo, ParentInfo, PropertyInfo, TypeInfo,
};

/// Shown in place of a name or type the runtime would not give us.
pub const PLACEHOLDER: &str = "?";

type Step<A, T> = fn(&A, ClassRef, &mut IterToken) -> ApiResult<Option<T>>;

/// Lazy iterator over one kind of member of a class.
///
/// Ends at the runtime's null sentinel and stays ended. An unsupported
/// entry point or a failing step ends it early with a warning.
pub struct MemberCursor<'a, A: RuntimeApi + ?Sized, T> {
    api: &'a A,
    class: ClassRef,
    entry: EntryPoint,
    step: Step<A, T>,
    token: IterToken,
    done: bool,
}

impl<'a, A: RuntimeApi + ?Sized, T> MemberCursor<'a, A, T> {
    fn new(api: &'a A, class: ClassRef, entry: EntryPoint, step: Step<A, T>) -> Self {
        Self { api, class, entry, step, token: IterToken::new(), done: false }
    }
}

impl<'a, A: RuntimeApi + ?Sized> MemberCursor<'a, A, FieldRef> {
    pub fn fields(api: &'a A, class: ClassRef) -> Self {
        Self::new(api, class, EntryPoint::ClassGetFields, A::class_get_fields)
    }
}

impl<'a, A: RuntimeApi + ?Sized> MemberCursor<'a, A, PropertyRef> {
    pub fn properties(api: &'a A, class: ClassRef) -> Self {
        Self::new(api, class, EntryPoint::ClassGetProperties, A::class_get_properties)
    }
}

impl<'a, A: RuntimeApi + ?Sized> MemberCursor<'a, A, MethodRef> {
    pub fn methods(api: &'a A, class: ClassRef) -> Self {
        Self::new(api, class, EntryPoint::ClassGetMethods, A::class_get_methods)
    }
}

impl<'a, A: RuntimeApi + ?Sized> MemberCursor<'a, A, ClassRef> {
    pub fn interfaces(api: &'a A, class: ClassRef) -> Self {
        Self::new(api, class, EntryPoint::ClassGetInterfaces, A::class_get_interfaces)
    }
}

impl<'a, A: RuntimeApi + ?Sized, T> Iterator for MemberCursor<'a, A, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.done {
            return None;
        }
        match (self.step)(self.api, self.class, &mut self.token) {
            Ok(Some(item)) => Some(item),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(ApiError::Unsupported(entry)) => {
                warn!("{} is missing, class {:#x} lists no members", entry, self.class.addr());
                self.done = true;
                None
            }
            Err(err) => {
                warn!("{} stopped on class {:#x}: {}", self.entry, self.class.addr(), err);
                self.done = true;
                None
            }
        }
    }
}

impl<'a, A: RuntimeApi + ?Sized, T> FusedIterator for MemberCursor<'a, A, T> {}

fn or_warn<T>(result: ApiResult<T>, what: &str, fallback: T) -> T {
    result.unwrap_or_else(|err| {
        warn!("{what}: {err}");
        fallback
    })
}

fn name_or_placeholder(result: ApiResult<String>, what: &str) -> String {
    or_warn(result, what, PLACEHOLDER.to_string())
}

fn type_name_of<A: RuntimeApi + ?Sized>(api: &A, ty: ApiResult<TypeRef>) -> ApiResult<String> {
    ty.and_then(|ty| type_name(api, ty))
}

/// Snapshot a field. The constant is read only for literals of enum types.
pub fn extract_field<A: RuntimeApi + ?Sized>(
    api: &A,
    field: FieldRef,
    owner_is_enum: bool,
) -> FieldInfo {
    let name = name_or_placeholder(api.field_get_name(field), "field name");
    let flags = or_warn(api.field_get_flags(field), "field flags", 0);
    let type_name =
        name_or_placeholder(type_name_of(api, api.field_get_type(field)), "field type");
    let offset = or_warn(api.field_get_offset(field), "field offset", 0);

    let literal = FieldAttributes::from_bits_truncate(flags).contains(FieldAttributes::LITERAL);
    let constant = if literal && owner_is_enum {
        api.field_static_get_value(field)
            .map_err(|err| warn!("constant of {name}: {err}"))
            .ok()
    } else {
        None
    };

    FieldInfo { name, type_name, flags, offset, constant }
}

/// Snapshot a property. Modifier and type come from the getter, else the setter.
pub fn extract_property<A: RuntimeApi + ?Sized>(api: &A, property: PropertyRef) -> PropertyInfo {
    let name = api
        .property_get_name(property)
        .map_err(|err| warn!("property name: {err}"))
        .ok();
    let getter = or_warn(api.property_get_get_method(property), "property getter", None);
    let setter = or_warn(api.property_get_set_method(property), "property setter", None);

    let accessor = match (getter, setter) {
        (Some(get), _) => accessor_info(api, get, api.method_get_return_type(get)),
        (None, Some(set)) => accessor_info(api, set, api.method_get_param(set, 0)),
        (None, None) => None,
    };

    PropertyInfo { name, has_getter: getter.is_some(), has_setter: setter.is_some(), accessor }
}

fn accessor_info<A: RuntimeApi + ?Sized>(
    api: &A,
    method: MethodRef,
    ty: ApiResult<TypeRef>,
) -> Option<AccessorInfo> {
    let type_name = type_name_of(api, ty).map_err(|err| warn!("property type: {err}")).ok()?;
    let flags = or_warn(api.method_get_flags(method), "accessor flags", 0);
    Some(AccessorInfo { flags, type_name })
}

/// Snapshot a method, including its code address relative to `module`.
pub fn extract_method<A: RuntimeApi + ?Sized>(
    api: &A,
    method: MethodRef,
    module: &Module,
) -> MethodInfo {
    let name = name_or_placeholder(api.method_get_name(method), "method name");
    let flags = or_warn(api.method_get_flags(method), "method flags", 0);
    let return_type =
        name_or_placeholder(type_name_of(api, api.method_get_return_type(method)), "return type");

    let count = or_warn(api.method_get_param_count(method), "param count", 0);
    let params = (0..count)
        .map(|index| {
            let ty = api.method_get_param(method, index);
            let attrs = ty.clone().and_then(|ty| api.type_get_attrs(ty)).unwrap_or(0);
            ParamInfo {
                name: name_or_placeholder(api.method_get_param_name(method, index), "param name"),
                type_name: name_or_placeholder(type_name_of(api, ty), "param type"),
                attrs,
            }
        })
        .collect();

    let va = or_warn(api.method_pointer(method), "method pointer", 0);
    MethodInfo { name, flags, return_type, params, va, rva: module.rva(va) }
}

fn extract_parent<A: RuntimeApi + ?Sized>(api: &A, class: ClassRef) -> Option<ParentInfo> {
    let parent = or_warn(api.class_get_parent(class), "parent", None)?;
    let name = name_or_placeholder(api.class_get_name(parent), "parent name");
    let is_object = api
        .class_get_type(parent)
        .and_then(|ty| api.type_get_type(ty))
        .map(|kind| kind == IL2CPP_TYPE_OBJECT)
        .unwrap_or(false);
    Some(ParentInfo { name, is_object })
}

/// Snapshot a class and all of its members.
///
/// Fails only when the class name, namespace or flags cannot be read.
pub fn extract_type<A: RuntimeApi + ?Sized>(
    api: &A,
    class: ClassRef,
    module: &Module,
) -> ApiResult<TypeInfo> {
    let name = api.class_get_name(class)?;
    let namespace = api.class_get_namespace(class)?;
    let flags = api.class_get_flags(class)?;

    let mut info = TypeInfo::new(namespace, name, flags);
    info.is_valuetype = or_warn(api.class_is_valuetype(class), "valuetype check", false);
    info.is_enum = or_warn(api.class_is_enum(class), "enum check", false);
    info.parent = extract_parent(api, class);
    info.interfaces = MemberCursor::interfaces(api, class)
        .map(|itf| name_or_placeholder(api.class_get_name(itf), "interface name"))
        .collect();
    let is_enum = info.is_enum;
    info.fields =
        MemberCursor::fields(api, class).map(|field| extract_field(api, field, is_enum)).collect();
    info.properties =
        MemberCursor::properties(api, class).map(|prop| extract_property(api, prop)).collect();
    info.methods = MemberCursor::methods(api, class)
        .map(|method| extract_method(api, method, module))
        .collect();
    Ok(info)
}
