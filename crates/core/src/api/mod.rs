//! Runtime introspection surface.
//!
//! The IL2CPP runtime exports a flat C API. Which entry points exist depends on
//! the Unity version that built the player, so every capability is fallible:
//! an entry point that did not resolve yields [`ApiError::Unsupported`] and the
//! caller decides whether that is fatal or just a degraded feature.
//!
//! Handles are opaque address-sized values. They are observations of runtime
//! memory and are never written back.

pub mod native;
pub mod resolver;

use std::fmt;

use thiserror::Error;

pub use native::NativeApi;
#[cfg(unix)]
pub use resolver::{DlResolver, ProcessModules};
pub use resolver::{ModuleLocator, SymbolResolver};

macro_rules! handles {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub struct $name(pub usize);

            impl $name {
                pub fn addr(self) -> usize {
                    self.0
                }
            }
        )*
    };
}

handles!(
    /// `Il2CppDomain*`
    DomainRef,
    /// `Il2CppAssembly*`
    AssemblyRef,
    /// `Il2CppImage*`
    ImageRef,
    /// `Il2CppClass*`
    ClassRef,
    /// `Il2CppType*`
    TypeRef,
    /// `FieldInfo*`
    FieldRef,
    /// `PropertyInfo*`
    PropertyRef,
    /// `MethodInfo*`
    MethodRef,
    /// Managed object (`Il2CppObject*`, strings, reflection objects).
    ObjectRef,
);

/// Opaque iteration state advanced by the runtime's `*_get_*(klass, &iter)` calls.
#[derive(Debug, Default)]
pub struct IterToken(usize);

impl IterToken {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn get(&self) -> usize {
        self.0
    }

    pub fn set(&mut self, value: usize) {
        self.0 = value;
    }
}

macro_rules! entry_points {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Named entry points of the runtime API this crate binds.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum EntryPoint {
            $($variant),*
        }

        impl EntryPoint {
            /// The full catalogue, in binding order.
            pub const ALL: &'static [EntryPoint] = &[$(EntryPoint::$variant),*];

            /// Exported symbol name.
            pub fn name(self) -> &'static str {
                match self {
                    $(EntryPoint::$variant => $name),*
                }
            }
        }
    };
}

entry_points! {
    DomainGet => "il2cpp_domain_get",
    DomainGetAssemblies => "il2cpp_domain_get_assemblies",
    ThreadAttach => "il2cpp_thread_attach",
    IsVmThread => "il2cpp_is_vm_thread",
    AssemblyGetImage => "il2cpp_assembly_get_image",
    ImageGetName => "il2cpp_image_get_name",
    ImageGetClassCount => "il2cpp_image_get_class_count",
    ImageGetClass => "il2cpp_image_get_class",
    GetCorlib => "il2cpp_get_corlib",
    ClassFromName => "il2cpp_class_from_name",
    ClassGetMethodFromName => "il2cpp_class_get_method_from_name",
    StringNew => "il2cpp_string_new",
    ClassFromSystemType => "il2cpp_class_from_system_type",
    ClassGetType => "il2cpp_class_get_type",
    ClassFromType => "il2cpp_class_from_type",
    TypeGetType => "il2cpp_type_get_type",
    ClassGetName => "il2cpp_class_get_name",
    ClassGetNamespace => "il2cpp_class_get_namespace",
    ClassGetFlags => "il2cpp_class_get_flags",
    ClassIsValuetype => "il2cpp_class_is_valuetype",
    ClassIsEnum => "il2cpp_class_is_enum",
    ClassGetParent => "il2cpp_class_get_parent",
    ClassGetInterfaces => "il2cpp_class_get_interfaces",
    ClassGetFields => "il2cpp_class_get_fields",
    ClassGetProperties => "il2cpp_class_get_properties",
    ClassGetMethods => "il2cpp_class_get_methods",
    FieldGetName => "il2cpp_field_get_name",
    FieldGetType => "il2cpp_field_get_type",
    FieldGetFlags => "il2cpp_field_get_flags",
    FieldGetOffset => "il2cpp_field_get_offset",
    FieldStaticGetValue => "il2cpp_field_static_get_value",
    PropertyGetName => "il2cpp_property_get_name",
    PropertyGetGetMethod => "il2cpp_property_get_get_method",
    PropertyGetSetMethod => "il2cpp_property_get_set_method",
    MethodGetName => "il2cpp_method_get_name",
    MethodGetFlags => "il2cpp_method_get_flags",
    MethodGetReturnType => "il2cpp_method_get_return_type",
    MethodGetParamCount => "il2cpp_method_get_param_count",
    MethodGetParam => "il2cpp_method_get_param",
    MethodGetParamName => "il2cpp_method_get_param_name",
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("runtime entry point {0} is not available")]
    Unsupported(EntryPoint),
    #[error("{0} returned null")]
    Null(EntryPoint),
    #[error("managed call {0} failed")]
    ManagedCall(&'static str),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// One fallible accessor per runtime capability.
///
/// Names mirror the C API. Iteration-style calls take an [`IterToken`] and
/// return `Ok(None)` once the runtime reports the end of the sequence.
pub trait RuntimeApi {
    /// Whether `entry` resolved. Never calls into the runtime.
    fn supports(&self, entry: EntryPoint) -> bool;

    /// Address the entry point resolved to, if it did.
    fn address_of(&self, entry: EntryPoint) -> Option<usize>;

    fn is_vm_thread(&self) -> ApiResult<bool>;
    fn domain_get(&self) -> ApiResult<DomainRef>;
    fn thread_attach(&self, domain: DomainRef) -> ApiResult<()>;
    fn domain_get_assemblies(&self, domain: DomainRef) -> ApiResult<Vec<AssemblyRef>>;

    fn assembly_get_image(&self, assembly: AssemblyRef) -> ApiResult<ImageRef>;
    fn image_get_name(&self, image: ImageRef) -> ApiResult<String>;
    fn image_get_class_count(&self, image: ImageRef) -> ApiResult<usize>;
    fn image_get_class(&self, image: ImageRef, index: usize) -> ApiResult<ClassRef>;

    // Reflection path.
    fn get_corlib(&self) -> ApiResult<ImageRef>;
    fn class_from_name(
        &self,
        image: ImageRef,
        namespace: &str,
        name: &str,
    ) -> ApiResult<Option<ClassRef>>;
    fn class_get_method_from_name(
        &self,
        class: ClassRef,
        name: &str,
        args: u32,
    ) -> ApiResult<Option<MethodRef>>;
    fn string_new(&self, value: &str) -> ApiResult<ObjectRef>;
    /// Invokes static `Assembly.Load(string)` through its code pointer.
    fn invoke_assembly_load(&self, load: MethodRef, name: ObjectRef) -> ApiResult<ObjectRef>;
    /// Invokes `Assembly.GetTypes()` and returns the elements of the result array.
    fn invoke_assembly_get_types(
        &self,
        get_types: MethodRef,
        assembly: ObjectRef,
    ) -> ApiResult<Vec<ObjectRef>>;
    fn class_from_system_type(&self, reflection_type: ObjectRef) -> ApiResult<ClassRef>;

    // Types and classes.
    fn class_get_type(&self, class: ClassRef) -> ApiResult<TypeRef>;
    fn class_from_type(&self, ty: TypeRef) -> ApiResult<ClassRef>;
    fn type_get_type(&self, ty: TypeRef) -> ApiResult<u32>;
    /// Parameter/field attribute bits stored on the type record.
    fn type_get_attrs(&self, ty: TypeRef) -> ApiResult<u32>;
    fn class_get_name(&self, class: ClassRef) -> ApiResult<String>;
    fn class_get_namespace(&self, class: ClassRef) -> ApiResult<String>;
    fn class_get_flags(&self, class: ClassRef) -> ApiResult<u32>;
    fn class_is_valuetype(&self, class: ClassRef) -> ApiResult<bool>;
    fn class_is_enum(&self, class: ClassRef) -> ApiResult<bool>;
    fn class_get_parent(&self, class: ClassRef) -> ApiResult<Option<ClassRef>>;
    fn class_get_interfaces(
        &self,
        class: ClassRef,
        iter: &mut IterToken,
    ) -> ApiResult<Option<ClassRef>>;
    fn class_get_fields(&self, class: ClassRef, iter: &mut IterToken)
        -> ApiResult<Option<FieldRef>>;
    fn class_get_properties(
        &self,
        class: ClassRef,
        iter: &mut IterToken,
    ) -> ApiResult<Option<PropertyRef>>;
    fn class_get_methods(
        &self,
        class: ClassRef,
        iter: &mut IterToken,
    ) -> ApiResult<Option<MethodRef>>;

    // Fields.
    fn field_get_name(&self, field: FieldRef) -> ApiResult<String>;
    fn field_get_type(&self, field: FieldRef) -> ApiResult<TypeRef>;
    fn field_get_flags(&self, field: FieldRef) -> ApiResult<u32>;
    fn field_get_offset(&self, field: FieldRef) -> ApiResult<usize>;
    fn field_static_get_value(&self, field: FieldRef) -> ApiResult<u64>;

    // Properties.
    fn property_get_name(&self, property: PropertyRef) -> ApiResult<String>;
    fn property_get_get_method(&self, property: PropertyRef) -> ApiResult<Option<MethodRef>>;
    fn property_get_set_method(&self, property: PropertyRef) -> ApiResult<Option<MethodRef>>;

    // Methods.
    fn method_get_name(&self, method: MethodRef) -> ApiResult<String>;
    fn method_get_flags(&self, method: MethodRef) -> ApiResult<u32>;
    fn method_get_return_type(&self, method: MethodRef) -> ApiResult<TypeRef>;
    fn method_get_param_count(&self, method: MethodRef) -> ApiResult<u32>;
    fn method_get_param(&self, method: MethodRef, index: u32) -> ApiResult<TypeRef>;
    fn method_get_param_name(&self, method: MethodRef, index: u32) -> ApiResult<String>;
    /// Compiled code address of the method (0 when it has none).
    fn method_pointer(&self, method: MethodRef) -> ApiResult<usize>;
}

/// Name of the class behind a type reference.
pub fn type_name<A: RuntimeApi + ?Sized>(api: &A, ty: TypeRef) -> ApiResult<String> {
    let class = api.class_from_type(ty)?;
    api.class_get_name(class)
}
