//! Discovery: the hierarchical test catalog and the flat listing.
//!
//! Areas mirror namespace segments and are created on first reference. Within one area a test
//! name is unique: a later test with the same name is not inserted, it disables the entry that was
//! already there and appends its fixture's full name to that entry's disabled reason.

pub mod flat;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use testdriver_core::CategoryMask;

use crate::errors::DriverError;
use crate::module::loader::{self, ModuleSource};
use crate::module::{FixtureDef, ModuleDefinition};

pub use flat::{FlatConfig, FlatParam, FlatTestEntry, flat_list};

/// One discoverable test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Namespace path of the containing area.
    pub area_path: String,
    pub name: String,
    pub owner: Option<String>,
    pub category: CategoryMask,
    /// Module path the test was discovered in.
    pub module: String,
    pub disabled: bool,
    pub disabled_reason: Option<String>,
}

impl TestCase {
    fn disable_as_duplicate(&mut self, duplicate: &FixtureDef) {
        self.disabled = true;
        self.disabled_reason
            .get_or_insert_with(String::new)
            .push_str(&format!("Duplicate test name in {}\n", duplicate.full_name()));
    }
}

/// A node of the catalog tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestArea {
    pub name: String,
    pub tests: BTreeMap<String, TestCase>,
    pub areas: BTreeMap<String, TestArea>,
}

impl TestArea {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Walk `namespace` segment by segment, creating missing areas. Empty namespace is `self`.
    pub fn area_mut(&mut self, namespace: &str) -> &mut TestArea {
        namespace
            .split('.')
            .filter(|segment| !segment.is_empty())
            .fold(self, |area, segment| {
                area.areas
                    .entry(segment.to_string())
                    .or_insert_with(|| TestArea::new(segment))
            })
    }

    pub fn area(&self, namespace: &str) -> Option<&TestArea> {
        namespace
            .split('.')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |area, segment| area.areas.get(segment))
    }

    /// Every test in this area and below, depth-first in name order.
    pub fn all_tests(&self) -> Vec<&TestCase> {
        let mut out: Vec<&TestCase> = self.tests.values().collect();
        for child in self.areas.values() {
            out.extend(child.all_tests());
        }
        out
    }
}

/// A built catalog plus the definition it was built from.
#[derive(Debug)]
pub struct TestModule {
    pub root: TestArea,
    pub definition: ModuleDefinition,
}

impl TestModule {
    #[tracing::instrument(skip_all, fields(module = %path.display()))]
    pub fn build(source: &dyn ModuleSource, path: &Path) -> Result<TestModule, DriverError> {
        let definition = loader::load_checked(source, path)?;
        let module_path = path.display().to_string();
        let root_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| module_path.clone());
        let mut root = TestArea::new(root_name);

        for fixture in definition.exported() {
            let area = root.area_mut(&fixture.namespace);
            for method in fixture.tests() {
                let chain = definition.chain(fixture, method);
                match area.tests.get_mut(&method.name) {
                    Some(existing) => {
                        tracing::warn!(test = %method.name, fixture = %fixture.full_name(), "duplicate test name");
                        existing.disable_as_duplicate(fixture);
                    }
                    None => {
                        area.tests.insert(
                            method.name.clone(),
                            TestCase {
                                area_path: fixture.namespace.clone(),
                                name: method.name.clone(),
                                owner: chain.owner(),
                                category: chain.category(),
                                module: module_path.clone(),
                                disabled: false,
                                disabled_reason: None,
                            },
                        );
                    }
                }
            }
        }

        tracing::debug!(tests = root.all_tests().len(), "catalog built");
        Ok(TestModule { root, definition })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn areas_are_created_once_and_reused() {
        let mut root = TestArea::new("m");
        root.area_mut("A.B").tests.insert(
            "t".into(),
            TestCase {
                area_path: "A.B".into(),
                name: "t".into(),
                owner: None,
                category: CategoryMask::EMPTY,
                module: "m".into(),
                disabled: false,
                disabled_reason: None,
            },
        );
        root.area_mut("A.B");
        root.area_mut("A.C");
        assert_eq!(root.areas.len(), 1);
        assert_eq!(root.area("A").unwrap().areas.len(), 2);
        assert_eq!(root.area("A.B").unwrap().tests.len(), 1);
        assert_eq!(root.area("").unwrap().name, "m");
        assert!(root.area("A.Z").is_none());
    }
}
