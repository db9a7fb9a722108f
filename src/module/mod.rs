//! The registry form of a test module.
//!
//! A module is an explicit table of fixtures; each fixture carries a namespace, a name, whether it is
//! exported, its metadata, a factory for fresh instances and its methods. Method bodies are stored
//! type-erased and downcast back to the fixture type at call time, so a module can mix fixtures of
//! different types.
//!
//! ```ignore
//! ModuleDefinition::new("suite")
//!     .fixture(
//!         FixtureBuilder::<Alpha>::new("Suite.Alpha", "AlphaTests")
//!             .setup("Setup", |f, _ctx, _args| { f.ready = true; Ok(()) })
//!             .test_with("DoesMath", |d| d.param::<i32>("x"), |_f, ctx, args| {
//!                 ctx.verify("x is four", args.get::<i32>("x") == Some(4));
//!                 Ok(())
//!             })
//!             .build(),
//!     )
//! ```

pub mod loader;
pub mod params;

use std::any::Any;
use std::fmt;

use testdriver_core::{CategoryMask, Metadata, MetadataChain};

use crate::errors::{BoxError, DriverError};
use crate::pipeline::context::TestContext;
use params::{Args, Param, ParamType};

/// Result of a fixture method body.
pub type MethodResult = Result<(), BoxError>;

type ErasedBody = Box<dyn Fn(&mut dyn Any, &mut TestContext<'_>, &Args) -> MethodResult + Send + Sync>;
type ErasedFactory = Box<dyn Fn() -> Result<Box<dyn Any + Send>, BoxError> + Send + Sync>;

/// Role of a method inside its fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Test,
    SetUp,
    TearDown,
    /// Ordinary method; still resolvable by name when public.
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    NonPublic,
}

/// A declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub name: String,
    pub ty: ParamType,
}

/// Declaration part of a method: parameters, metadata, visibility.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    params: Vec<ParamDecl>,
    metadata: Metadata,
    visibility: Visibility,
}

impl Default for MethodDecl {
    fn default() -> Self {
        Self {
            params: Vec::new(),
            metadata: Metadata::default(),
            visibility: Visibility::Public,
        }
    }
}

impl MethodDecl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param<T: Param>(self, name: impl Into<String>) -> Self {
        self.param_of(name, T::param_type())
    }

    pub fn param_of(mut self, name: impl Into<String>, ty: ParamType) -> Self {
        self.params.push(ParamDecl { name: name.into(), ty });
        self
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.metadata = self.metadata.with_owner(owner);
        self
    }

    pub fn category(mut self, category: CategoryMask) -> Self {
        self.metadata = self.metadata.with_category(category);
        self
    }

    pub fn config(mut self, name: impl Into<String>, default_value: impl Into<String>) -> Self {
        self.metadata = self.metadata.with_config(name, default_value);
        self
    }

    pub fn non_public(mut self) -> Self {
        self.visibility = Visibility::NonPublic;
        self
    }
}

/// A fixture method with its type-erased body.
pub struct MethodDef {
    pub name: String,
    pub kind: MethodKind,
    pub visibility: Visibility,
    pub params: Vec<ParamDecl>,
    pub metadata: Metadata,
    body: ErasedBody,
}

impl MethodDef {
    /// Wrap a typed body for fixture type `F`.
    pub fn new<F, B>(name: impl Into<String>, kind: MethodKind, decl: MethodDecl, body: B) -> Self
    where
        F: Any,
        B: Fn(&mut F, &mut TestContext<'_>, &Args) -> MethodResult + Send + Sync + 'static,
    {
        let name = name.into();
        let target = name.clone();
        let body: ErasedBody = Box::new(move |instance, ctx, args| match instance.downcast_mut::<F>() {
            Some(fixture) => body(fixture, ctx, args),
            None => Err(format!("fixture instance passed to `{target}` has the wrong type").into()),
        });
        Self {
            name,
            kind,
            visibility: decl.visibility,
            params: decl.params,
            metadata: decl.metadata,
            body,
        }
    }

    pub fn call(&self, instance: &mut dyn Any, ctx: &mut TestContext<'_>, args: &Args) -> MethodResult {
        (self.body)(instance, ctx, args)
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

impl fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDef")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("visibility", &self.visibility)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// A fixture type: a factory plus the methods callable on its instances.
pub struct FixtureDef {
    pub namespace: String,
    pub name: String,
    pub exported: bool,
    pub metadata: Metadata,
    pub methods: Vec<MethodDef>,
    factory: ErasedFactory,
}

impl FixtureDef {
    /// `namespace.name`, or just the name at the root namespace.
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Create a fresh instance through the registered factory.
    pub fn instantiate(&self) -> Result<Box<dyn Any + Send>, BoxError> {
        (self.factory)()
    }

    /// First `SetUp` method, whatever its visibility.
    pub fn setup(&self) -> Option<&MethodDef> {
        self.methods.iter().find(|m| m.kind == MethodKind::SetUp)
    }

    /// First `TearDown` method, whatever its visibility.
    pub fn teardown(&self) -> Option<&MethodDef> {
        self.methods.iter().find(|m| m.kind == MethodKind::TearDown)
    }

    pub fn tests(&self) -> impl Iterator<Item = &MethodDef> {
        self.methods.iter().filter(|m| m.kind == MethodKind::Test)
    }

    /// First public method whose name matches, case-insensitively.
    pub fn find_public(&self, method_name: &str) -> Option<&MethodDef> {
        self.methods
            .iter()
            .find(|m| m.is_public() && m.name.eq_ignore_ascii_case(method_name))
    }
}

impl fmt::Debug for FixtureDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureDef")
            .field("namespace", &self.namespace)
            .field("name", &self.name)
            .field("exported", &self.exported)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

/// Typed builder for a [`FixtureDef`] of fixture type `F`.
pub struct FixtureBuilder<F> {
    def: FixtureDef,
    _fixture: std::marker::PhantomData<fn() -> F>,
}

impl<F: Default + Send + 'static> FixtureBuilder<F> {
    /// Fixture whose instances come from `F::default()`.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_factory(namespace, name, || Ok(F::default()))
    }
}

impl<F: Send + 'static> FixtureBuilder<F> {
    /// Fixture with a fallible constructor.
    pub fn with_factory<C>(namespace: impl Into<String>, name: impl Into<String>, create: C) -> Self
    where
        C: Fn() -> Result<F, BoxError> + Send + Sync + 'static,
    {
        let factory: ErasedFactory = Box::new(move || create().map(|f| Box::new(f) as Box<dyn Any + Send>));
        Self {
            def: FixtureDef {
                namespace: namespace.into(),
                name: name.into(),
                exported: true,
                metadata: Metadata::default(),
                methods: Vec::new(),
                factory,
            },
            _fixture: std::marker::PhantomData,
        }
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.def.metadata = self.def.metadata.with_owner(owner);
        self
    }

    pub fn category(mut self, category: CategoryMask) -> Self {
        self.def.metadata = self.def.metadata.with_category(category);
        self
    }

    pub fn config(mut self, name: impl Into<String>, default_value: impl Into<String>) -> Self {
        self.def.metadata = self.def.metadata.with_config(name, default_value);
        self
    }

    /// Hide the fixture from discovery and name resolution.
    pub fn internal(mut self) -> Self {
        self.def.exported = false;
        self
    }

    pub fn method<B>(mut self, name: impl Into<String>, kind: MethodKind, decl: MethodDecl, body: B) -> Self
    where
        B: Fn(&mut F, &mut TestContext<'_>, &Args) -> MethodResult + Send + Sync + 'static,
    {
        self.def.methods.push(MethodDef::new::<F, B>(name, kind, decl, body));
        self
    }

    pub fn test<B>(self, name: impl Into<String>, body: B) -> Self
    where
        B: Fn(&mut F, &mut TestContext<'_>, &Args) -> MethodResult + Send + Sync + 'static,
    {
        self.method(name, MethodKind::Test, MethodDecl::new(), body)
    }

    pub fn test_with<D, B>(self, name: impl Into<String>, declare: D, body: B) -> Self
    where
        D: FnOnce(MethodDecl) -> MethodDecl,
        B: Fn(&mut F, &mut TestContext<'_>, &Args) -> MethodResult + Send + Sync + 'static,
    {
        self.method(name, MethodKind::Test, declare(MethodDecl::new()), body)
    }

    pub fn setup<B>(self, name: impl Into<String>, body: B) -> Self
    where
        B: Fn(&mut F, &mut TestContext<'_>, &Args) -> MethodResult + Send + Sync + 'static,
    {
        self.method(name, MethodKind::SetUp, MethodDecl::new(), body)
    }

    pub fn teardown<B>(self, name: impl Into<String>, body: B) -> Self
    where
        B: Fn(&mut F, &mut TestContext<'_>, &Args) -> MethodResult + Send + Sync + 'static,
    {
        self.method(name, MethodKind::TearDown, MethodDecl::new(), body)
    }

    pub fn build(self) -> FixtureDef {
        self.def
    }
}

/// A loaded test module.
#[derive(Debug, Default)]
pub struct ModuleDefinition {
    pub name: String,
    pub metadata: Metadata,
    pub fixtures: Vec<FixtureDef>,
}

impl ModuleDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.metadata = self.metadata.with_owner(owner);
        self
    }

    pub fn category(mut self, category: CategoryMask) -> Self {
        self.metadata = self.metadata.with_category(category);
        self
    }

    pub fn config(mut self, name: impl Into<String>, default_value: impl Into<String>) -> Self {
        self.metadata = self.metadata.with_config(name, default_value);
        self
    }

    pub fn fixture(mut self, fixture: FixtureDef) -> Self {
        self.fixtures.push(fixture);
        self
    }

    pub fn exported(&self) -> impl Iterator<Item = &FixtureDef> {
        self.fixtures.iter().filter(|f| f.exported)
    }

    /// Metadata levels for one method, most specific first.
    pub fn chain<'a>(&'a self, fixture: &'a FixtureDef, method: &'a MethodDef) -> MetadataChain<'a> {
        MetadataChain::new(&method.metadata, &fixture.metadata, &self.metadata)
    }

    /// Resolve `Namespace.MethodName` to its declaring fixture and method.
    ///
    /// The name is split at its last `.`. Only exported fixtures with a non-empty namespace and
    /// public methods qualify; both parts compare case-insensitively and the first match in
    /// declaration order wins.
    pub fn find_test(&self, full_name: &str) -> Result<(&FixtureDef, &MethodDef), DriverError> {
        let (namespace, method_name) = full_name
            .rsplit_once('.')
            .ok_or_else(|| DriverError::test_not_found(full_name))?;

        self.exported()
            .filter(|f| !f.namespace.is_empty() && f.namespace.eq_ignore_ascii_case(namespace))
            .find_map(|f| f.find_public(method_name).map(|m| (f, m)))
            .ok_or_else(|| DriverError::test_not_found(full_name))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Probe;

    fn noop(_: &mut Probe, _: &mut TestContext<'_>, _: &Args) -> MethodResult {
        Ok(())
    }

    fn module() -> ModuleDefinition {
        ModuleDefinition::new("probe")
            .fixture(
                FixtureBuilder::<Probe>::new("Suite.Alpha", "AlphaTests")
                    .test("DoesMath", noop)
                    .method("Helper", MethodKind::Plain, MethodDecl::new(), noop)
                    .method("Hidden", MethodKind::Test, MethodDecl::new().non_public(), noop)
                    .build(),
            )
            .fixture(FixtureBuilder::<Probe>::new("Suite.Alpha", "Shadow").test("DoesMath", noop).build())
            .fixture(FixtureBuilder::<Probe>::new("", "Rootless").test("Orphan", noop).build())
            .fixture(
                FixtureBuilder::<Probe>::new("Suite.Secret", "Internal")
                    .test("Run", noop)
                    .internal()
                    .build(),
            )
    }

    #[test]
    fn resolves_case_insensitively_first_match_wins() {
        let module = module();
        let (fixture, method) = module.find_test("suite.alpha.doesmath").unwrap();
        assert_eq!(fixture.name, "AlphaTests");
        assert_eq!(method.name, "DoesMath");
    }

    #[test]
    fn any_public_method_resolves() {
        let module = module();
        assert_eq!(module.find_test("Suite.Alpha.Helper").unwrap().1.name, "Helper");
    }

    #[test]
    fn unresolvable_names_are_test_not_found() {
        let module = module();
        for name in ["NoDotHere", "Suite.Alpha.Hidden", "Suite.Alpha.Missing", ".Orphan", "Suite.Secret.Run"] {
            let err = module.find_test(name).unwrap_err();
            assert!(matches!(err, DriverError::TestNotFound { .. }), "{name}: {err}");
        }
    }

    #[test]
    fn full_name_omits_empty_namespace() {
        let module = module();
        assert_eq!(module.fixtures[0].full_name(), "Suite.Alpha.AlphaTests");
        assert_eq!(module.fixtures[2].full_name(), "Rootless");
    }
}
