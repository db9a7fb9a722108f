//! Declarative metadata and its method → fixture → module fallback.
//!
//! Every level (method, declaring fixture, module) carries the same [`Metadata`] shape. Callers never
//! walk the levels themselves: they build a [`MetadataChain`] once and ask it for one attribute kind
//! at a time. How each kind combines across levels is data ([`AttributeKind::merge_rule`]), not
//! logic repeated at call sites.
//!
//! ## Merge rules
//!
//! | kind       | rule                                                             |
//! |------------|------------------------------------------------------------------|
//! | `Owner`    | first non-empty value, most specific level first                 |
//! | `Category` | bitwise OR of all levels, then the tier marker rule               |
//! | `Config`   | union, de-duplicated by name, most specific declaration wins      |

use crate::category::CategoryMask;

/// A configuration value a test expects, with the default used when the caller supplies none.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfigDecl {
    pub name: String,
    pub default_value: String,
}

impl ConfigDecl {
    pub fn new(name: impl Into<String>, default_value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_value: default_value.into(),
        }
    }
}

/// Metadata declared at one level (a method, a fixture type or a whole module).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metadata {
    pub owner: Option<String>,
    pub categories: CategoryMask,
    pub configs: Vec<ConfigDecl>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_category(mut self, category: CategoryMask) -> Self {
        self.categories |= category;
        self
    }

    pub fn with_config(mut self, name: impl Into<String>, default_value: impl Into<String>) -> Self {
        self.configs.push(ConfigDecl::new(name, default_value));
        self
    }
}

/// The attribute kinds the resolver knows how to combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Owner,
    Category,
    Config,
}

/// Which fields make two configuration declarations "the same" during a union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigIdentity {
    Name,
    NameAndDefault,
}

impl ConfigIdentity {
    fn same(self, a: &ConfigDecl, b: &ConfigDecl) -> bool {
        match self {
            ConfigIdentity::Name => a.name == b.name,
            ConfigIdentity::NameAndDefault => a.name == b.name && a.default_value == b.default_value,
        }
    }
}

/// How values of one attribute kind combine across levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeRule {
    /// Single-valued: the most specific non-empty value.
    FirstNonEmpty,
    /// Flags: OR every level together.
    BitOr,
    /// Lists: concatenate most specific first, keep the first of each identity.
    Union(ConfigIdentity),
}

impl AttributeKind {
    pub const fn merge_rule(self) -> MergeRule {
        match self {
            AttributeKind::Owner => MergeRule::FirstNonEmpty,
            AttributeKind::Category => MergeRule::BitOr,
            AttributeKind::Config => MergeRule::Union(ConfigIdentity::Name),
        }
    }
}

/// A resolved attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Owner(Option<String>),
    Category(CategoryMask),
    Configs(Vec<ConfigDecl>),
}

/// The three metadata levels for one candidate method, most specific first.
#[derive(Debug, Clone, Copy)]
pub struct MetadataChain<'a> {
    levels: [&'a Metadata; 3],
}

impl<'a> MetadataChain<'a> {
    pub fn new(method: &'a Metadata, fixture: &'a Metadata, module: &'a Metadata) -> Self {
        Self {
            levels: [method, fixture, module],
        }
    }

    /// Resolve one attribute kind using its registered merge rule.
    pub fn resolve(&self, kind: AttributeKind) -> Resolved {
        match (kind, kind.merge_rule()) {
            (AttributeKind::Owner, _) => Resolved::Owner(self.first_owner()),
            (AttributeKind::Category, _) => Resolved::Category(self.merged_categories()),
            (AttributeKind::Config, MergeRule::Union(identity)) => Resolved::Configs(self.merged_configs(identity)),
            (AttributeKind::Config, _) => Resolved::Configs(self.merged_configs(ConfigIdentity::Name)),
        }
    }

    pub fn owner(&self) -> Option<String> {
        match self.resolve(AttributeKind::Owner) {
            Resolved::Owner(owner) => owner,
            _ => None,
        }
    }

    pub fn category(&self) -> CategoryMask {
        match self.resolve(AttributeKind::Category) {
            Resolved::Category(mask) => mask,
            _ => CategoryMask::EMPTY,
        }
    }

    pub fn configs(&self) -> Vec<ConfigDecl> {
        match self.resolve(AttributeKind::Config) {
            Resolved::Configs(configs) => configs,
            _ => Vec::new(),
        }
    }

    /// Union the configuration declarations with an explicit identity rule.
    ///
    /// Flat listings de-duplicate by name *and* default value, so two levels declaring the same name
    /// with different defaults both survive there.
    pub fn configs_by(&self, identity: ConfigIdentity) -> Vec<ConfigDecl> {
        self.merged_configs(identity)
    }

    fn first_owner(&self) -> Option<String> {
        self.levels
            .iter()
            .filter_map(|level| level.owner.as_deref())
            .find(|owner| !owner.is_empty())
            .map(str::to_string)
    }

    fn merged_categories(&self) -> CategoryMask {
        self.levels
            .iter()
            .fold(CategoryMask::EMPTY, |acc, level| acc | level.categories)
            .with_tier_marker()
    }

    fn merged_configs(&self, identity: ConfigIdentity) -> Vec<ConfigDecl> {
        let mut merged: Vec<ConfigDecl> = Vec::new();
        for decl in self.levels.iter().flat_map(|level| level.configs.iter()) {
            if !merged.iter().any(|seen| identity.same(seen, decl)) {
                merged.push(decl.clone());
            }
        }
        merged
    }
}
