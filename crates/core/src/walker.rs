//! Enumeration of assemblies and their types.
//!
//! Newer runtimes index classes directly on an image. Older ones only expose
//! types through managed reflection, so the walker falls back to calling
//! `Assembly.Load(name).GetTypes()` and converting each reflection type back
//! into a native class. The strategy is picked once per walk.

use log::{debug, error, info, warn};

use crate::api::{
    ApiError, ApiResult, ClassRef, EntryPoint, ImageRef, MethodRef, ObjectRef, RuntimeApi,
};
use crate::dump::{DumpError, DumpResult};
use crate::runtime::AttachedContext;

/// Which enumeration surface a runtime offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Direct,
    Reflection,
}

impl StrategyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Direct => "direct",
            StrategyKind::Reflection => "reflection",
        }
    }
}

/// Resolved `System.Reflection.Assembly` methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReflectionMethods {
    pub load: MethodRef,
    pub get_types: MethodRef,
}

/// A strategy ready to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Direct,
    Reflection(ReflectionMethods),
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Direct => StrategyKind::Direct,
            Strategy::Reflection(_) => StrategyKind::Reflection,
        }
    }
}

/// Strategy the runtime supports, without touching it.
pub fn preferred_strategy<A: RuntimeApi + ?Sized>(api: &A) -> StrategyKind {
    if api.supports(EntryPoint::ImageGetClass) {
        StrategyKind::Direct
    } else {
        StrategyKind::Reflection
    }
}

/// Pick the strategy and resolve whatever it needs up front.
pub fn select_strategy<A: RuntimeApi + ?Sized>(api: &A) -> DumpResult<Strategy> {
    match preferred_strategy(api) {
        StrategyKind::Direct => {
            info!("Version greater than 2018.3");
            Ok(Strategy::Direct)
        }
        StrategyKind::Reflection => {
            info!("Version less than 2018.3");
            resolve_reflection(api).map(Strategy::Reflection)
        }
    }
}

fn resolve_reflection<A: RuntimeApi + ?Sized>(api: &A) -> DumpResult<ReflectionMethods> {
    let assembly_class = api
        .get_corlib()
        .and_then(|corlib| api.class_from_name(corlib, "System.Reflection", "Assembly"))
        .ok()
        .flatten();
    let Some(assembly_class) = assembly_class else {
        error!("miss System.Reflection.Assembly");
        return Err(DumpError::ReflectionUnavailable("System.Reflection.Assembly"));
    };

    let load = compiled_method(api, assembly_class, "Load", 1);
    let Some((load, load_code)) = load else {
        error!("miss Assembly::Load");
        return Err(DumpError::ReflectionUnavailable("Assembly::Load"));
    };
    info!("Assembly::Load: {:#x}", load_code);

    let get_types = compiled_method(api, assembly_class, "GetTypes", 0);
    let Some((get_types, get_types_code)) = get_types else {
        error!("miss Assembly::GetTypes");
        return Err(DumpError::ReflectionUnavailable("Assembly::GetTypes"));
    };
    info!("Assembly::GetTypes: {:#x}", get_types_code);

    Ok(ReflectionMethods { load, get_types })
}

/// Method with a code pointer, or `None`.
fn compiled_method<A: RuntimeApi + ?Sized>(
    api: &A,
    class: ClassRef,
    name: &str,
    args: u32,
) -> Option<(MethodRef, usize)> {
    let method = api.class_get_method_from_name(class, name, args).ok().flatten()?;
    match api.method_pointer(method) {
        Ok(code) if code != 0 => Some((method, code)),
        _ => None,
    }
}

/// Name `Assembly.Load` accepts for an image: the image name without its
/// extension. Names without a dot are used as-is.
pub fn assembly_load_name(image_name: &str) -> &str {
    match image_name.rfind('.') {
        Some(dot) => &image_name[..dot],
        None => image_name,
    }
}

/// One loaded assembly image, in runtime order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Position in the domain's assembly list.
    pub index: usize,
    pub image: ImageRef,
    pub name: String,
}

/// Marks the start of an assembly's types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyEntry {
    pub index: usize,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkItem {
    Assembly(AssemblyEntry),
    Type(ClassRef),
}

enum Cursor {
    Idle,
    Direct { image: ImageRef, index: usize, count: usize },
    Listed(std::vec::IntoIter<ObjectRef>),
    Failed(ApiError),
}

/// Lazy walk over every assembly and type. Each call to [`walk`] starts fresh.
pub struct Walk<'a, A: RuntimeApi + ?Sized> {
    api: &'a A,
    strategy: Strategy,
    images: Vec<Image>,
    next_image: usize,
    cursor: Cursor,
}

impl<'a, A: RuntimeApi + ?Sized> Walk<'a, A> {
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    fn open(&self, image: &Image) -> ApiResult<Cursor> {
        match &self.strategy {
            Strategy::Direct => {
                let count = self.api.image_get_class_count(image.image)?;
                debug!("{}: {} classes", image.name, count);
                Ok(Cursor::Direct { image: image.image, index: 0, count })
            }
            Strategy::Reflection(methods) => {
                let name = self.api.string_new(assembly_load_name(&image.name))?;
                let assembly = self.api.invoke_assembly_load(methods.load, name)?;
                let types = self.api.invoke_assembly_get_types(methods.get_types, assembly)?;
                debug!("{}: {} reflection types", image.name, types.len());
                Ok(Cursor::Listed(types.into_iter()))
            }
        }
    }
}

impl<'a, A: RuntimeApi + ?Sized> Iterator for Walk<'a, A> {
    type Item = ApiResult<WalkItem>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.cursor, Cursor::Idle) {
                Cursor::Direct { image, index, count } if index < count => {
                    self.cursor = Cursor::Direct { image, index: index + 1, count };
                    return Some(self.api.image_get_class(image, index).map(WalkItem::Type));
                }
                Cursor::Listed(mut types) => {
                    if let Some(object) = types.next() {
                        self.cursor = Cursor::Listed(types);
                        return Some(self.api.class_from_system_type(object).map(WalkItem::Type));
                    }
                }
                Cursor::Failed(err) => return Some(Err(err)),
                Cursor::Direct { .. } | Cursor::Idle => {}
            }

            let image = self.images.get(self.next_image)?.clone();
            self.next_image += 1;
            self.cursor = match self.open(&image) {
                Ok(cursor) => cursor,
                Err(err) => Cursor::Failed(err),
            };
            return Some(Ok(WalkItem::Assembly(AssemblyEntry {
                index: image.index,
                name: image.name,
            })));
        }
    }
}

/// Start a walk over the attached domain.
///
/// Assemblies and their image names are read eagerly; types are produced
/// lazily. An assembly whose image cannot be read is skipped with a warning.
pub fn walk<'a, A: RuntimeApi + ?Sized>(
    api: &'a A,
    ctx: &AttachedContext,
) -> DumpResult<Walk<'a, A>> {
    let strategy = select_strategy(api)?;
    let assemblies = api.domain_get_assemblies(ctx.domain)?;

    let mut images = Vec::with_capacity(assemblies.len());
    for (index, assembly) in assemblies.into_iter().enumerate() {
        let image = match api.assembly_get_image(assembly) {
            Ok(image) => image,
            Err(err) => {
                warn!("skipping assembly {:#x}: {}", assembly.addr(), err);
                continue;
            }
        };
        let name = api.image_get_name(image).unwrap_or_else(|err| {
            warn!("image {:#x} has no name: {}", image.addr(), err);
            "?".to_string()
        });
        images.push(Image { index, image, name });
    }

    Ok(Walk { api, strategy, images, next_image: 0, cursor: Cursor::Idle })
}
