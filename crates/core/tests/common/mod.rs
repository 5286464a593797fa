#![allow(dead_code)]

//! In-memory runtime used by the integration tests.
//!
//! Every object lives in a flat arena; handles are the arena index plus a
//! per-kind base so that a handle of the wrong kind never resolves.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use il2dump_core::api::{
    ApiError, ApiResult, AssemblyRef, ClassRef, DomainRef, EntryPoint, FieldRef, ImageRef,
    IterToken, MethodRef, ModuleLocator, ObjectRef, PropertyRef, RuntimeApi, TypeRef,
};
use il2dump_core::model::Module;

pub const LIB_BASE: usize = 0x7a10_0000;
pub const API_BASE: usize = LIB_BASE + 0x0100_0000;
pub const DOMAIN: usize = 0xd0_0000;

const CLASS: usize = 0x1_0000;
const TYPE: usize = 0x2_0000;
const FIELD: usize = 0x3_0000;
const PROPERTY: usize = 0x4_0000;
const METHOD: usize = 0x5_0000;
const IMAGE: usize = 0x6_0000;
const ASSEMBLY: usize = 0x7_0000;
const STRING: usize = 0x8_0000;
const ASSEMBLY_OBJECT: usize = 0x9_0000;
const REFLECTION_TYPE: usize = 0xa_0000;

/// `Il2CppTypeEnum::IL2CPP_TYPE_CLASS`
pub const TYPE_CLASS: u32 = 0x12;
pub const TYPE_OBJECT: u32 = 0x1c;

#[derive(Debug, Clone)]
pub struct FakeClass {
    pub name: String,
    pub namespace: String,
    pub flags: u32,
    pub is_valuetype: bool,
    pub is_enum: bool,
    pub type_kind: u32,
    pub parent: Option<usize>,
    pub interfaces: Vec<usize>,
    pub fields: Vec<usize>,
    pub properties: Vec<usize>,
    pub methods: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct FakeField {
    pub name: String,
    pub ty: usize,
    pub flags: u32,
    pub offset: usize,
    pub value: u64,
}

#[derive(Debug, Clone)]
pub struct FakeProperty {
    pub name: String,
    pub get: Option<usize>,
    pub set: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct FakeMethod {
    pub name: String,
    pub flags: u32,
    pub ret: usize,
    /// (name, type index)
    pub params: Vec<(String, usize)>,
    pub pointer: usize,
}

/// Type record: owning class plus parameter attribute bits.
#[derive(Debug, Clone, Copy)]
pub struct FakeType {
    pub class: usize,
    pub attrs: u32,
}

#[derive(Debug, Clone)]
pub struct FakeImage {
    pub name: String,
    pub classes: Vec<usize>,
}

#[derive(Default)]
pub struct FakeRuntime {
    pub classes: Vec<FakeClass>,
    pub types: Vec<FakeType>,
    pub fields: Vec<FakeField>,
    pub properties: Vec<FakeProperty>,
    pub methods: Vec<FakeMethod>,
    pub images: Vec<FakeImage>,
    pub corlib: Option<usize>,
    /// Entry points that did not resolve.
    pub missing: HashSet<EntryPoint>,
    /// Entry points that resolve but return null.
    pub failing: HashSet<EntryPoint>,
    /// Assembly names `Assembly.Load` refuses.
    pub unloadable: HashSet<String>,
    /// Assembly positions whose image cannot be read.
    pub imageless: HashSet<usize>,
    /// Readiness checks answered "not yet" before the runtime reports ready.
    pub not_ready_polls: Cell<u32>,
    pub calls: RefCell<Vec<EntryPoint>>,
    pub managed_calls: RefCell<Vec<&'static str>>,
    pub attached: Cell<bool>,
    strings: RefCell<Vec<String>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runtime without `il2cpp_image_get_class`, forcing the reflection walk.
    pub fn legacy() -> Self {
        let mut rt = Self::new();
        rt.missing.insert(EntryPoint::ImageGetClass);
        rt
    }

    pub fn add_image(&mut self, name: &str) -> usize {
        self.images.push(FakeImage { name: name.into(), classes: Vec::new() });
        self.images.len() - 1
    }

    pub fn add_class(&mut self, image: usize, namespace: &str, name: &str, flags: u32) -> usize {
        let id = self.define_class(namespace, name, flags);
        self.images[image].classes.push(id);
        id
    }

    /// Class that exists in the runtime but is not listed by any image.
    pub fn define_class(&mut self, namespace: &str, name: &str, flags: u32) -> usize {
        self.classes.push(FakeClass {
            name: name.into(),
            namespace: namespace.into(),
            flags,
            is_valuetype: false,
            is_enum: false,
            type_kind: TYPE_CLASS,
            parent: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
        });
        let id = self.classes.len() - 1;
        self.types.push(FakeType { class: id, attrs: 0 });
        id
    }

    /// The type record created together with `class`.
    pub fn type_of(&self, class: usize) -> usize {
        self.types.iter().position(|t| t.class == class && t.attrs == 0).unwrap_or(class)
    }

    /// Extra type record for `class` carrying parameter attribute bits.
    pub fn param_type(&mut self, class: usize, attrs: u32) -> usize {
        self.types.push(FakeType { class, attrs });
        self.types.len() - 1
    }

    pub fn object_class(&mut self) -> usize {
        let id = self.define_class("System", "Object", 0x1);
        self.classes[id].type_kind = TYPE_OBJECT;
        id
    }

    pub fn add_field(
        &mut self,
        class: usize,
        name: &str,
        ty: usize,
        flags: u32,
        offset: usize,
        value: u64,
    ) -> usize {
        let ty = self.type_of(ty);
        self.fields.push(FakeField { name: name.into(), ty, flags, offset, value });
        let id = self.fields.len() - 1;
        self.classes[class].fields.push(id);
        id
    }

    /// `params` are (name, type record) pairs; see [`FakeRuntime::param_type`].
    pub fn add_method(
        &mut self,
        class: usize,
        name: &str,
        flags: u32,
        ret: usize,
        params: &[(&str, usize)],
        pointer: usize,
    ) -> usize {
        let ret = self.type_of(ret);
        self.methods.push(FakeMethod {
            name: name.into(),
            flags,
            ret,
            params: params.iter().map(|(n, t)| (n.to_string(), *t)).collect(),
            pointer,
        });
        let id = self.methods.len() - 1;
        self.classes[class].methods.push(id);
        id
    }

    pub fn add_property(
        &mut self,
        class: usize,
        name: &str,
        get: Option<usize>,
        set: Option<usize>,
    ) -> usize {
        self.properties.push(FakeProperty { name: name.into(), get, set });
        let id = self.properties.len() - 1;
        self.classes[class].properties.push(id);
        id
    }

    /// Add `mscorlib.dll` with `System.Reflection.Assembly` and its
    /// `Load(string)` / `GetTypes()` methods.
    pub fn install_reflection(&mut self) -> (usize, usize) {
        let corlib = self.add_image("mscorlib.dll");
        self.corlib = Some(corlib);
        let string = self.add_class(corlib, "System", "String", 0x101);
        let assembly = self.add_class(corlib, "System.Reflection", "Assembly", 0x1);
        let string_param = self.type_of(string);
        let load = self.add_method(
            assembly,
            "Load",
            0x6 | 0x10,
            assembly,
            &[("assemblyString", string_param)],
            LIB_BASE + 0x4_0000,
        );
        let get_types =
            self.add_method(assembly, "GetTypes", 0x6 | 0x40, assembly, &[], LIB_BASE + 0x4_1000);
        (load, get_types)
    }

    pub fn class_ref(&self, class: usize) -> ClassRef {
        ClassRef(CLASS + class)
    }

    pub fn method_ref(&self, method: usize) -> MethodRef {
        MethodRef(METHOD + method)
    }

    pub fn property_ref(&self, property: usize) -> PropertyRef {
        PropertyRef(PROPERTY + property)
    }

    pub fn called(&self, entry: EntryPoint) -> bool {
        self.calls.borrow().contains(&entry)
    }

    pub fn call_count(&self, entry: EntryPoint) -> usize {
        self.calls.borrow().iter().filter(|e| **e == entry).count()
    }

    fn gate(&self, entry: EntryPoint) -> ApiResult<()> {
        if self.missing.contains(&entry) {
            return Err(ApiError::Unsupported(entry));
        }
        self.calls.borrow_mut().push(entry);
        if self.failing.contains(&entry) {
            return Err(ApiError::Null(entry));
        }
        Ok(())
    }

    fn class(&self, class: ClassRef) -> &FakeClass {
        &self.classes[class.0 - CLASS]
    }

    fn ty(&self, ty: TypeRef) -> FakeType {
        self.types[ty.0 - TYPE]
    }

    fn method(&self, method: MethodRef) -> &FakeMethod {
        &self.methods[method.0 - METHOD]
    }

    fn step<T>(
        &self,
        items: &[usize],
        iter: &mut IterToken,
        wrap: impl Fn(usize) -> T,
    ) -> Option<T> {
        let position = iter.get();
        let item = items.get(position).copied()?;
        iter.set(position + 1);
        Some(wrap(item))
    }
}

impl RuntimeApi for FakeRuntime {
    fn supports(&self, entry: EntryPoint) -> bool {
        !self.missing.contains(&entry)
    }

    fn address_of(&self, entry: EntryPoint) -> Option<usize> {
        let slot = EntryPoint::ALL.iter().position(|e| *e == entry)?;
        self.supports(entry).then_some(API_BASE + slot * 0x10)
    }

    fn is_vm_thread(&self) -> ApiResult<bool> {
        self.gate(EntryPoint::IsVmThread)?;
        let remaining = self.not_ready_polls.get();
        if remaining > 0 {
            self.not_ready_polls.set(remaining - 1);
            return Ok(false);
        }
        Ok(true)
    }

    fn domain_get(&self) -> ApiResult<DomainRef> {
        self.gate(EntryPoint::DomainGet)?;
        let remaining = self.not_ready_polls.get();
        if remaining > 0 && self.missing.contains(&EntryPoint::IsVmThread) {
            self.not_ready_polls.set(remaining - 1);
            return Err(ApiError::Null(EntryPoint::DomainGet));
        }
        Ok(DomainRef(DOMAIN))
    }

    fn thread_attach(&self, domain: DomainRef) -> ApiResult<()> {
        self.gate(EntryPoint::ThreadAttach)?;
        assert_eq!(domain.0, DOMAIN);
        self.attached.set(true);
        Ok(())
    }

    fn domain_get_assemblies(&self, domain: DomainRef) -> ApiResult<Vec<AssemblyRef>> {
        self.gate(EntryPoint::DomainGetAssemblies)?;
        assert!(self.attached.get(), "enumerated before thread_attach");
        assert_eq!(domain.0, DOMAIN);
        Ok((0..self.images.len()).map(|i| AssemblyRef(ASSEMBLY + i)).collect())
    }

    fn assembly_get_image(&self, assembly: AssemblyRef) -> ApiResult<ImageRef> {
        self.gate(EntryPoint::AssemblyGetImage)?;
        let index = assembly.0 - ASSEMBLY;
        if self.imageless.contains(&index) {
            return Err(ApiError::Null(EntryPoint::AssemblyGetImage));
        }
        Ok(ImageRef(IMAGE + index))
    }

    fn image_get_name(&self, image: ImageRef) -> ApiResult<String> {
        self.gate(EntryPoint::ImageGetName)?;
        Ok(self.images[image.0 - IMAGE].name.clone())
    }

    fn image_get_class_count(&self, image: ImageRef) -> ApiResult<usize> {
        self.gate(EntryPoint::ImageGetClassCount)?;
        Ok(self.images[image.0 - IMAGE].classes.len())
    }

    fn image_get_class(&self, image: ImageRef, index: usize) -> ApiResult<ClassRef> {
        self.gate(EntryPoint::ImageGetClass)?;
        Ok(ClassRef(CLASS + self.images[image.0 - IMAGE].classes[index]))
    }

    fn get_corlib(&self) -> ApiResult<ImageRef> {
        self.gate(EntryPoint::GetCorlib)?;
        self.corlib.map(|i| ImageRef(IMAGE + i)).ok_or(ApiError::Null(EntryPoint::GetCorlib))
    }

    fn class_from_name(
        &self,
        image: ImageRef,
        namespace: &str,
        name: &str,
    ) -> ApiResult<Option<ClassRef>> {
        self.gate(EntryPoint::ClassFromName)?;
        Ok(self.images[image.0 - IMAGE]
            .classes
            .iter()
            .copied()
            .find(|&c| self.classes[c].namespace == namespace && self.classes[c].name == name)
            .map(|c| ClassRef(CLASS + c)))
    }

    fn class_get_method_from_name(
        &self,
        class: ClassRef,
        name: &str,
        args: u32,
    ) -> ApiResult<Option<MethodRef>> {
        self.gate(EntryPoint::ClassGetMethodFromName)?;
        Ok(self
            .class(class)
            .methods
            .iter()
            .copied()
            .find(|&m| {
                self.methods[m].name == name && self.methods[m].params.len() == args as usize
            })
            .map(|m| MethodRef(METHOD + m)))
    }

    fn string_new(&self, value: &str) -> ApiResult<ObjectRef> {
        self.gate(EntryPoint::StringNew)?;
        let mut strings = self.strings.borrow_mut();
        strings.push(value.to_string());
        Ok(ObjectRef(STRING + strings.len() - 1))
    }

    fn invoke_assembly_load(&self, load: MethodRef, name: ObjectRef) -> ApiResult<ObjectRef> {
        self.managed_calls.borrow_mut().push("Assembly::Load");
        assert_eq!(self.method(load).name, "Load");
        let wanted = self.strings.borrow()[name.0 - STRING].clone();
        if self.unloadable.contains(&wanted) {
            return Err(ApiError::ManagedCall("Assembly::Load"));
        }
        self.images
            .iter()
            .position(|image| {
                image.name.rsplit_once('.').map_or(image.name.as_str(), |(stem, _)| stem) == wanted
            })
            .map(|i| ObjectRef(ASSEMBLY_OBJECT + i))
            .ok_or(ApiError::ManagedCall("Assembly::Load"))
    }

    fn invoke_assembly_get_types(
        &self,
        get_types: MethodRef,
        assembly: ObjectRef,
    ) -> ApiResult<Vec<ObjectRef>> {
        self.managed_calls.borrow_mut().push("Assembly::GetTypes");
        assert_eq!(self.method(get_types).name, "GetTypes");
        let image = &self.images[assembly.0 - ASSEMBLY_OBJECT];
        Ok(image.classes.iter().map(|c| ObjectRef(REFLECTION_TYPE + c)).collect())
    }

    fn class_from_system_type(&self, reflection_type: ObjectRef) -> ApiResult<ClassRef> {
        self.gate(EntryPoint::ClassFromSystemType)?;
        Ok(ClassRef(CLASS + (reflection_type.0 - REFLECTION_TYPE)))
    }

    fn class_get_type(&self, class: ClassRef) -> ApiResult<TypeRef> {
        self.gate(EntryPoint::ClassGetType)?;
        Ok(TypeRef(TYPE + self.type_of(class.0 - CLASS)))
    }

    fn class_from_type(&self, ty: TypeRef) -> ApiResult<ClassRef> {
        self.gate(EntryPoint::ClassFromType)?;
        Ok(ClassRef(CLASS + self.ty(ty).class))
    }

    fn type_get_type(&self, ty: TypeRef) -> ApiResult<u32> {
        self.gate(EntryPoint::TypeGetType)?;
        Ok(self.classes[self.ty(ty).class].type_kind)
    }

    fn type_get_attrs(&self, ty: TypeRef) -> ApiResult<u32> {
        Ok(self.ty(ty).attrs)
    }

    fn class_get_name(&self, class: ClassRef) -> ApiResult<String> {
        self.gate(EntryPoint::ClassGetName)?;
        Ok(self.class(class).name.clone())
    }

    fn class_get_namespace(&self, class: ClassRef) -> ApiResult<String> {
        self.gate(EntryPoint::ClassGetNamespace)?;
        Ok(self.class(class).namespace.clone())
    }

    fn class_get_flags(&self, class: ClassRef) -> ApiResult<u32> {
        self.gate(EntryPoint::ClassGetFlags)?;
        Ok(self.class(class).flags)
    }

    fn class_is_valuetype(&self, class: ClassRef) -> ApiResult<bool> {
        self.gate(EntryPoint::ClassIsValuetype)?;
        Ok(self.class(class).is_valuetype)
    }

    fn class_is_enum(&self, class: ClassRef) -> ApiResult<bool> {
        self.gate(EntryPoint::ClassIsEnum)?;
        Ok(self.class(class).is_enum)
    }

    fn class_get_parent(&self, class: ClassRef) -> ApiResult<Option<ClassRef>> {
        self.gate(EntryPoint::ClassGetParent)?;
        Ok(self.class(class).parent.map(|p| ClassRef(CLASS + p)))
    }

    fn class_get_interfaces(
        &self,
        class: ClassRef,
        iter: &mut IterToken,
    ) -> ApiResult<Option<ClassRef>> {
        self.gate(EntryPoint::ClassGetInterfaces)?;
        Ok(self.step(&self.class(class).interfaces, iter, |c| ClassRef(CLASS + c)))
    }

    fn class_get_fields(
        &self,
        class: ClassRef,
        iter: &mut IterToken,
    ) -> ApiResult<Option<FieldRef>> {
        self.gate(EntryPoint::ClassGetFields)?;
        Ok(self.step(&self.class(class).fields, iter, |f| FieldRef(FIELD + f)))
    }

    fn class_get_properties(
        &self,
        class: ClassRef,
        iter: &mut IterToken,
    ) -> ApiResult<Option<PropertyRef>> {
        self.gate(EntryPoint::ClassGetProperties)?;
        Ok(self.step(&self.class(class).properties, iter, |p| PropertyRef(PROPERTY + p)))
    }

    fn class_get_methods(
        &self,
        class: ClassRef,
        iter: &mut IterToken,
    ) -> ApiResult<Option<MethodRef>> {
        self.gate(EntryPoint::ClassGetMethods)?;
        Ok(self.step(&self.class(class).methods, iter, |m| MethodRef(METHOD + m)))
    }

    fn field_get_name(&self, field: FieldRef) -> ApiResult<String> {
        self.gate(EntryPoint::FieldGetName)?;
        Ok(self.fields[field.0 - FIELD].name.clone())
    }

    fn field_get_type(&self, field: FieldRef) -> ApiResult<TypeRef> {
        self.gate(EntryPoint::FieldGetType)?;
        Ok(TypeRef(TYPE + self.fields[field.0 - FIELD].ty))
    }

    fn field_get_flags(&self, field: FieldRef) -> ApiResult<u32> {
        self.gate(EntryPoint::FieldGetFlags)?;
        Ok(self.fields[field.0 - FIELD].flags)
    }

    fn field_get_offset(&self, field: FieldRef) -> ApiResult<usize> {
        self.gate(EntryPoint::FieldGetOffset)?;
        Ok(self.fields[field.0 - FIELD].offset)
    }

    fn field_static_get_value(&self, field: FieldRef) -> ApiResult<u64> {
        self.gate(EntryPoint::FieldStaticGetValue)?;
        Ok(self.fields[field.0 - FIELD].value)
    }

    fn property_get_name(&self, property: PropertyRef) -> ApiResult<String> {
        self.gate(EntryPoint::PropertyGetName)?;
        Ok(self.properties[property.0 - PROPERTY].name.clone())
    }

    fn property_get_get_method(&self, property: PropertyRef) -> ApiResult<Option<MethodRef>> {
        self.gate(EntryPoint::PropertyGetGetMethod)?;
        Ok(self.properties[property.0 - PROPERTY].get.map(|m| MethodRef(METHOD + m)))
    }

    fn property_get_set_method(&self, property: PropertyRef) -> ApiResult<Option<MethodRef>> {
        self.gate(EntryPoint::PropertyGetSetMethod)?;
        Ok(self.properties[property.0 - PROPERTY].set.map(|m| MethodRef(METHOD + m)))
    }

    fn method_get_name(&self, method: MethodRef) -> ApiResult<String> {
        self.gate(EntryPoint::MethodGetName)?;
        Ok(self.method(method).name.clone())
    }

    fn method_get_flags(&self, method: MethodRef) -> ApiResult<u32> {
        self.gate(EntryPoint::MethodGetFlags)?;
        Ok(self.method(method).flags)
    }

    fn method_get_return_type(&self, method: MethodRef) -> ApiResult<TypeRef> {
        self.gate(EntryPoint::MethodGetReturnType)?;
        Ok(TypeRef(TYPE + self.method(method).ret))
    }

    fn method_get_param_count(&self, method: MethodRef) -> ApiResult<u32> {
        self.gate(EntryPoint::MethodGetParamCount)?;
        Ok(self.method(method).params.len() as u32)
    }

    fn method_get_param(&self, method: MethodRef, index: u32) -> ApiResult<TypeRef> {
        self.gate(EntryPoint::MethodGetParam)?;
        let (_, ty) = &self.method(method).params[index as usize];
        Ok(TypeRef(TYPE + ty))
    }

    fn method_get_param_name(&self, method: MethodRef, index: u32) -> ApiResult<String> {
        self.gate(EntryPoint::MethodGetParamName)?;
        Ok(self.method(method).params[index as usize].0.clone())
    }

    fn method_pointer(&self, method: MethodRef) -> ApiResult<usize> {
        Ok(self.method(method).pointer)
    }
}

/// Module locator answering from fixed tables.
#[derive(Debug, Default)]
pub struct FakeLocator {
    pub owning: Option<Module>,
    pub by_name: HashMap<String, usize>,
    pub owning_queries: RefCell<Vec<usize>>,
}

impl FakeLocator {
    /// Locator that knows the runtime by address and by name.
    pub fn standard() -> Self {
        let mut by_name = HashMap::new();
        by_name.insert("libil2cpp.so".to_string(), LIB_BASE);
        Self {
            owning: Some(Module::new("/data/app/lib/arm64/libil2cpp.so", LIB_BASE)),
            by_name,
            owning_queries: RefCell::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl ModuleLocator for FakeLocator {
    fn find_module_base(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    fn find_module_owning(&self, address: usize) -> Option<Module> {
        self.owning_queries.borrow_mut().push(address);
        self.owning.clone()
    }
}

/// Small game-like runtime: an enum, an abstract class and a struct.
pub fn sample_runtime() -> FakeRuntime {
    let mut rt = FakeRuntime::new();
    let object = rt.object_class();
    let int32 = rt.define_class("System", "Int32", 0x2101);
    rt.classes[int32].is_valuetype = true;
    let string = rt.define_class("System", "String", 0x2101);
    let void = rt.define_class("System", "Void", 0x2101);
    let disposable = rt.define_class("System", "IDisposable", 0xa1);

    let image = rt.add_image("Assembly-CSharp.dll");

    let color = rt.add_class(image, "Game", "Color", 0x101);
    rt.classes[color].is_valuetype = true;
    rt.classes[color].is_enum = true;
    rt.add_field(color, "value__", int32, 0x6, 0x10, 0);
    rt.add_field(color, "Red", color, 0x6 | 0x10 | 0x40, 0x0, 0);
    rt.add_field(color, "Blue", color, 0x6 | 0x10 | 0x40, 0x0, 2);

    let actor = rt.add_class(image, "Game", "Actor", 0x1 | 0x80 | 0x2000);
    rt.classes[actor].parent = Some(object);
    rt.classes[actor].interfaces.push(disposable);
    rt.add_field(actor, "health", int32, 0x1, 0x18, 0);
    rt.add_field(actor, "Count", int32, 0x6 | 0x10, 0x0, 0);
    let get_name = rt.add_method(actor, "get_Name", 0x6 | 0x80, string, &[], LIB_BASE + 0x1000);
    let string_param = rt.type_of(string);
    let set_name = rt.add_method(
        actor,
        "set_Name",
        0x6 | 0x80,
        void,
        &[("value", string_param)],
        LIB_BASE + 0x1010,
    );
    rt.add_property(actor, "Name", Some(get_name), Some(set_name));
    let int_in = rt.type_of(int32);
    let int_out = rt.param_type(int32, 0x2);
    rt.add_method(
        actor,
        "TryHit",
        0x6 | 0x40 | 0x400,
        int32,
        &[("damage", int_in), ("left", int_out)],
        0,
    );

    let point = rt.add_class(image, "Game", "Point", 0x1 | 0x100);
    rt.classes[point].is_valuetype = true;
    rt.add_field(point, "x", int32, 0x6, 0x10, 0);

    rt
}

pub fn fast_config() -> il2dump_core::DumpConfig {
    il2dump_core::DumpConfig { poll_interval_ms: 1, ..Default::default() }
}
