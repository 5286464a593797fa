//! [`RuntimeApi`] over function pointers resolved from the loaded runtime.

use std::collections::HashMap;
use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::ptr;

use log::{debug, warn};

use super::{
    ApiError, ApiResult, AssemblyRef, ClassRef, DomainRef, EntryPoint, FieldRef, ImageRef,
    IterToken, MethodRef, ObjectRef, PropertyRef, RuntimeApi, SymbolResolver, TypeRef,
};

/// Leading words of `Il2CppType`; `attrs` is the low half of the bitfield word.
#[allow(dead_code)]
#[repr(C)]
struct RawType {
    data: *mut c_void,
    bits: u32,
}

/// `Il2CppArray` header followed by its elements.
#[allow(dead_code)]
#[repr(C)]
struct RawArray {
    klass: *mut c_void,
    monitor: *mut c_void,
    bounds: *mut c_void,
    max_length: usize,
    vector: [*mut c_void; 0],
}

type AssemblyLoadFn = unsafe extern "C" fn(*mut c_void, *mut c_void, *const c_void) -> *mut c_void;
type AssemblyGetTypesFn = unsafe extern "C" fn(*mut c_void, *const c_void) -> *mut RawArray;

/// Calls a bound entry point with the given C signature.
macro_rules! call {
    ($api:expr, $entry:ident, fn($($arg_ty:ty),*) -> $ret:ty, ($($arg:expr),*)) => {{
        let f: unsafe extern "C" fn($($arg_ty),*) -> $ret = $api.entry(EntryPoint::$entry)?;
        unsafe { f($($arg),*) }
    }};
}

/// Function pointers bound from the runtime library, keyed by entry point.
#[derive(Debug, Default)]
pub struct NativeApi {
    table: HashMap<EntryPoint, usize>,
}

impl NativeApi {
    /// Resolve every catalogue entry. Misses are logged and left unbound.
    pub fn bind<R: SymbolResolver + ?Sized>(resolver: &R) -> Self {
        let mut table = HashMap::new();
        for &entry in EntryPoint::ALL {
            match resolver.resolve(entry.name()) {
                Some(address) if address != 0 => {
                    table.insert(entry, address);
                }
                _ => warn!("missing api: {}", entry),
            }
        }
        debug!("bound {}/{} runtime entry points", table.len(), EntryPoint::ALL.len());
        Self { table }
    }

    /// Entry points that did not resolve, in catalogue order.
    pub fn missing(&self) -> Vec<EntryPoint> {
        EntryPoint::ALL.iter().copied().filter(|e| !self.table.contains_key(e)).collect()
    }

    fn entry<F: Copy>(&self, entry: EntryPoint) -> ApiResult<F> {
        let address = *self.table.get(&entry).ok_or(ApiError::Unsupported(entry))?;
        debug_assert_eq!(std::mem::size_of::<F>(), std::mem::size_of::<usize>());
        // SAFETY: callers instantiate F with the `extern "C" fn` type of `entry`.
        Ok(unsafe { std::mem::transmute_copy::<usize, F>(&address) })
    }
}

fn non_null(value: *const c_void, entry: EntryPoint) -> ApiResult<usize> {
    if value.is_null() {
        Err(ApiError::Null(entry))
    } else {
        Ok(value as usize)
    }
}

fn optional(value: *const c_void) -> Option<usize> {
    if value.is_null() {
        None
    } else {
        Some(value as usize)
    }
}

fn c_string(value: *const c_char, entry: EntryPoint) -> ApiResult<String> {
    if value.is_null() {
        return Err(ApiError::Null(entry));
    }
    Ok(unsafe { CStr::from_ptr(value) }.to_string_lossy().into_owned())
}

fn c_arg(value: &str) -> CString {
    // Interior NULs cannot be represented; truncate at the first one.
    let bytes = value.split('\0').next().unwrap_or_default();
    CString::new(bytes).unwrap_or_default()
}

fn step(
    api: &NativeApi,
    entry: EntryPoint,
    class: ClassRef,
    iter: &mut IterToken,
) -> ApiResult<Option<usize>> {
    let f: unsafe extern "C" fn(*mut c_void, *mut *mut c_void) -> *const c_void = api.entry(entry)?;
    let mut state = iter.get() as *mut c_void;
    let item = unsafe { f(class.0 as *mut c_void, &mut state) };
    iter.set(state as usize);
    Ok(optional(item))
}

impl RuntimeApi for NativeApi {
    fn supports(&self, entry: EntryPoint) -> bool {
        self.table.contains_key(&entry)
    }

    fn address_of(&self, entry: EntryPoint) -> Option<usize> {
        self.table.get(&entry).copied()
    }

    fn is_vm_thread(&self) -> ApiResult<bool> {
        Ok(call!(self, IsVmThread, fn(*mut c_void) -> bool, (ptr::null_mut())))
    }

    fn domain_get(&self) -> ApiResult<DomainRef> {
        let domain = call!(self, DomainGet, fn() -> *mut c_void, ());
        non_null(domain, EntryPoint::DomainGet).map(DomainRef)
    }

    fn thread_attach(&self, domain: DomainRef) -> ApiResult<()> {
        let thread =
            call!(self, ThreadAttach, fn(*mut c_void) -> *mut c_void, (domain.0 as *mut c_void));
        non_null(thread, EntryPoint::ThreadAttach).map(|_| ())
    }

    fn domain_get_assemblies(&self, domain: DomainRef) -> ApiResult<Vec<AssemblyRef>> {
        let mut count: usize = 0;
        let list = call!(
            self,
            DomainGetAssemblies,
            fn(*const c_void, *mut usize) -> *const *const c_void,
            (domain.0 as *const c_void, &mut count)
        );
        if list.is_null() || count == 0 {
            return Ok(Vec::new());
        }
        let items = unsafe { std::slice::from_raw_parts(list, count) };
        Ok(items.iter().map(|&a| AssemblyRef(a as usize)).collect())
    }

    fn assembly_get_image(&self, assembly: AssemblyRef) -> ApiResult<ImageRef> {
        let image = call!(
            self,
            AssemblyGetImage,
            fn(*const c_void) -> *const c_void,
            (assembly.0 as *const c_void)
        );
        non_null(image, EntryPoint::AssemblyGetImage).map(ImageRef)
    }

    fn image_get_name(&self, image: ImageRef) -> ApiResult<String> {
        let name = call!(
            self,
            ImageGetName,
            fn(*const c_void) -> *const c_char,
            (image.0 as *const c_void)
        );
        c_string(name, EntryPoint::ImageGetName)
    }

    fn image_get_class_count(&self, image: ImageRef) -> ApiResult<usize> {
        Ok(call!(self, ImageGetClassCount, fn(*const c_void) -> usize, (image.0 as *const c_void)))
    }

    fn image_get_class(&self, image: ImageRef, index: usize) -> ApiResult<ClassRef> {
        let class = call!(
            self,
            ImageGetClass,
            fn(*const c_void, usize) -> *const c_void,
            (image.0 as *const c_void, index)
        );
        non_null(class, EntryPoint::ImageGetClass).map(ClassRef)
    }

    fn get_corlib(&self) -> ApiResult<ImageRef> {
        let image = call!(self, GetCorlib, fn() -> *const c_void, ());
        non_null(image, EntryPoint::GetCorlib).map(ImageRef)
    }

    fn class_from_name(
        &self,
        image: ImageRef,
        namespace: &str,
        name: &str,
    ) -> ApiResult<Option<ClassRef>> {
        let namespace = c_arg(namespace);
        let name = c_arg(name);
        let class = call!(
            self,
            ClassFromName,
            fn(*const c_void, *const c_char, *const c_char) -> *mut c_void,
            (image.0 as *const c_void, namespace.as_ptr(), name.as_ptr())
        );
        Ok(optional(class).map(ClassRef))
    }

    fn class_get_method_from_name(
        &self,
        class: ClassRef,
        name: &str,
        args: u32,
    ) -> ApiResult<Option<MethodRef>> {
        let name = c_arg(name);
        let method = call!(
            self,
            ClassGetMethodFromName,
            fn(*mut c_void, *const c_char, c_int) -> *const c_void,
            (class.0 as *mut c_void, name.as_ptr(), args as c_int)
        );
        Ok(optional(method).map(MethodRef))
    }

    fn string_new(&self, value: &str) -> ApiResult<ObjectRef> {
        let value = c_arg(value);
        let string = call!(self, StringNew, fn(*const c_char) -> *mut c_void, (value.as_ptr()));
        non_null(string, EntryPoint::StringNew).map(ObjectRef)
    }

    fn invoke_assembly_load(&self, load: MethodRef, name: ObjectRef) -> ApiResult<ObjectRef> {
        let code = self.method_pointer(load)?;
        if code == 0 {
            return Err(ApiError::ManagedCall("Assembly::Load"));
        }
        // SAFETY: `code` is the compiled body of the static Assembly.Load(string).
        let f: AssemblyLoadFn = unsafe { std::mem::transmute::<usize, AssemblyLoadFn>(code) };
        let assembly = unsafe { f(ptr::null_mut(), name.0 as *mut c_void, ptr::null()) };
        optional(assembly).map(ObjectRef).ok_or(ApiError::ManagedCall("Assembly::Load"))
    }

    fn invoke_assembly_get_types(
        &self,
        get_types: MethodRef,
        assembly: ObjectRef,
    ) -> ApiResult<Vec<ObjectRef>> {
        let code = self.method_pointer(get_types)?;
        if code == 0 {
            return Err(ApiError::ManagedCall("Assembly::GetTypes"));
        }
        // SAFETY: `code` is the compiled body of the instance method Assembly.GetTypes().
        let f: AssemblyGetTypesFn =
            unsafe { std::mem::transmute::<usize, AssemblyGetTypesFn>(code) };
        let array = unsafe { f(assembly.0 as *mut c_void, ptr::null()) };
        if array.is_null() {
            return Err(ApiError::ManagedCall("Assembly::GetTypes"));
        }
        let items = unsafe {
            let len = (*array).max_length;
            let first = ptr::addr_of!((*array).vector) as *const *mut c_void;
            std::slice::from_raw_parts(first, len)
        };
        Ok(items.iter().map(|&t| ObjectRef(t as usize)).collect())
    }

    fn class_from_system_type(&self, reflection_type: ObjectRef) -> ApiResult<ClassRef> {
        let class = call!(
            self,
            ClassFromSystemType,
            fn(*mut c_void) -> *mut c_void,
            (reflection_type.0 as *mut c_void)
        );
        non_null(class, EntryPoint::ClassFromSystemType).map(ClassRef)
    }

    fn class_get_type(&self, class: ClassRef) -> ApiResult<TypeRef> {
        let ty = call!(
            self,
            ClassGetType,
            fn(*mut c_void) -> *const c_void,
            (class.0 as *mut c_void)
        );
        non_null(ty, EntryPoint::ClassGetType).map(TypeRef)
    }

    fn class_from_type(&self, ty: TypeRef) -> ApiResult<ClassRef> {
        let class =
            call!(self, ClassFromType, fn(*const c_void) -> *mut c_void, (ty.0 as *const c_void));
        non_null(class, EntryPoint::ClassFromType).map(ClassRef)
    }

    fn type_get_type(&self, ty: TypeRef) -> ApiResult<u32> {
        let kind = call!(self, TypeGetType, fn(*const c_void) -> c_int, (ty.0 as *const c_void));
        Ok(kind as u32)
    }

    fn type_get_attrs(&self, ty: TypeRef) -> ApiResult<u32> {
        if ty.0 == 0 {
            return Ok(0);
        }
        let raw = unsafe { &*(ty.0 as *const RawType) };
        Ok(raw.bits & 0xffff)
    }

    fn class_get_name(&self, class: ClassRef) -> ApiResult<String> {
        let name =
            call!(self, ClassGetName, fn(*mut c_void) -> *const c_char, (class.0 as *mut c_void));
        c_string(name, EntryPoint::ClassGetName)
    }

    fn class_get_namespace(&self, class: ClassRef) -> ApiResult<String> {
        let namespace = call!(
            self,
            ClassGetNamespace,
            fn(*mut c_void) -> *const c_char,
            (class.0 as *mut c_void)
        );
        c_string(namespace, EntryPoint::ClassGetNamespace)
    }

    fn class_get_flags(&self, class: ClassRef) -> ApiResult<u32> {
        let flags = call!(
            self,
            ClassGetFlags,
            fn(*const c_void) -> c_int,
            (class.0 as *const c_void)
        );
        Ok(flags as u32)
    }

    fn class_is_valuetype(&self, class: ClassRef) -> ApiResult<bool> {
        Ok(call!(self, ClassIsValuetype, fn(*const c_void) -> bool, (class.0 as *const c_void)))
    }

    fn class_is_enum(&self, class: ClassRef) -> ApiResult<bool> {
        Ok(call!(self, ClassIsEnum, fn(*const c_void) -> bool, (class.0 as *const c_void)))
    }

    fn class_get_parent(&self, class: ClassRef) -> ApiResult<Option<ClassRef>> {
        let parent =
            call!(self, ClassGetParent, fn(*mut c_void) -> *mut c_void, (class.0 as *mut c_void));
        Ok(optional(parent).map(ClassRef))
    }

    fn class_get_interfaces(
        &self,
        class: ClassRef,
        iter: &mut IterToken,
    ) -> ApiResult<Option<ClassRef>> {
        Ok(step(self, EntryPoint::ClassGetInterfaces, class, iter)?.map(ClassRef))
    }

    fn class_get_fields(
        &self,
        class: ClassRef,
        iter: &mut IterToken,
    ) -> ApiResult<Option<FieldRef>> {
        Ok(step(self, EntryPoint::ClassGetFields, class, iter)?.map(FieldRef))
    }

    fn class_get_properties(
        &self,
        class: ClassRef,
        iter: &mut IterToken,
    ) -> ApiResult<Option<PropertyRef>> {
        Ok(step(self, EntryPoint::ClassGetProperties, class, iter)?.map(PropertyRef))
    }

    fn class_get_methods(
        &self,
        class: ClassRef,
        iter: &mut IterToken,
    ) -> ApiResult<Option<MethodRef>> {
        Ok(step(self, EntryPoint::ClassGetMethods, class, iter)?.map(MethodRef))
    }

    fn field_get_name(&self, field: FieldRef) -> ApiResult<String> {
        let name =
            call!(self, FieldGetName, fn(*mut c_void) -> *const c_char, (field.0 as *mut c_void));
        c_string(name, EntryPoint::FieldGetName)
    }

    fn field_get_type(&self, field: FieldRef) -> ApiResult<TypeRef> {
        let ty = call!(
            self,
            FieldGetType,
            fn(*mut c_void) -> *const c_void,
            (field.0 as *mut c_void)
        );
        non_null(ty, EntryPoint::FieldGetType).map(TypeRef)
    }

    fn field_get_flags(&self, field: FieldRef) -> ApiResult<u32> {
        let flags = call!(self, FieldGetFlags, fn(*mut c_void) -> c_int, (field.0 as *mut c_void));
        Ok(flags as u32)
    }

    fn field_get_offset(&self, field: FieldRef) -> ApiResult<usize> {
        Ok(call!(self, FieldGetOffset, fn(*mut c_void) -> usize, (field.0 as *mut c_void)))
    }

    fn field_static_get_value(&self, field: FieldRef) -> ApiResult<u64> {
        let mut value: u64 = 0;
        call!(
            self,
            FieldStaticGetValue,
            fn(*mut c_void, *mut c_void) -> (),
            (field.0 as *mut c_void, &mut value as *mut u64 as *mut c_void)
        );
        Ok(value)
    }

    fn property_get_name(&self, property: PropertyRef) -> ApiResult<String> {
        let name = call!(
            self,
            PropertyGetName,
            fn(*mut c_void) -> *const c_char,
            (property.0 as *mut c_void)
        );
        c_string(name, EntryPoint::PropertyGetName)
    }

    fn property_get_get_method(&self, property: PropertyRef) -> ApiResult<Option<MethodRef>> {
        let method = call!(
            self,
            PropertyGetGetMethod,
            fn(*mut c_void) -> *const c_void,
            (property.0 as *mut c_void)
        );
        Ok(optional(method).map(MethodRef))
    }

    fn property_get_set_method(&self, property: PropertyRef) -> ApiResult<Option<MethodRef>> {
        let method = call!(
            self,
            PropertyGetSetMethod,
            fn(*mut c_void) -> *const c_void,
            (property.0 as *mut c_void)
        );
        Ok(optional(method).map(MethodRef))
    }

    fn method_get_name(&self, method: MethodRef) -> ApiResult<String> {
        let name = call!(
            self,
            MethodGetName,
            fn(*const c_void) -> *const c_char,
            (method.0 as *const c_void)
        );
        c_string(name, EntryPoint::MethodGetName)
    }

    fn method_get_flags(&self, method: MethodRef) -> ApiResult<u32> {
        let mut impl_flags: u32 = 0;
        Ok(call!(
            self,
            MethodGetFlags,
            fn(*const c_void, *mut u32) -> u32,
            (method.0 as *const c_void, &mut impl_flags)
        ))
    }

    fn method_get_return_type(&self, method: MethodRef) -> ApiResult<TypeRef> {
        let ty = call!(
            self,
            MethodGetReturnType,
            fn(*const c_void) -> *const c_void,
            (method.0 as *const c_void)
        );
        non_null(ty, EntryPoint::MethodGetReturnType).map(TypeRef)
    }

    fn method_get_param_count(&self, method: MethodRef) -> ApiResult<u32> {
        Ok(call!(self, MethodGetParamCount, fn(*const c_void) -> u32, (method.0 as *const c_void)))
    }

    fn method_get_param(&self, method: MethodRef, index: u32) -> ApiResult<TypeRef> {
        let ty = call!(
            self,
            MethodGetParam,
            fn(*const c_void, u32) -> *const c_void,
            (method.0 as *const c_void, index)
        );
        non_null(ty, EntryPoint::MethodGetParam).map(TypeRef)
    }

    fn method_get_param_name(&self, method: MethodRef, index: u32) -> ApiResult<String> {
        let name = call!(
            self,
            MethodGetParamName,
            fn(*const c_void, u32) -> *const c_char,
            (method.0 as *const c_void, index)
        );
        c_string(name, EntryPoint::MethodGetParamName)
    }

    fn method_pointer(&self, method: MethodRef) -> ApiResult<usize> {
        if method.0 == 0 {
            return Ok(0);
        }
        // `methodPointer` is the first member of `MethodInfo`.
        Ok(unsafe { *(method.0 as *const usize) })
    }
}
