//! Flat listing for tooling: one entry per test-marked method with its parameters and configs.

use std::path::Path;

use serde::{Deserialize, Serialize};

use testdriver_core::ConfigIdentity;

use crate::errors::DriverError;
use crate::module::loader::{self, ModuleSource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatParam {
    pub name: String,
    pub type_tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatConfig {
    pub name: String,
    pub default_value: String,
    pub type_tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatTestEntry {
    pub test_full_name: String,
    pub parameters: Vec<FlatParam>,
    pub configs: Vec<FlatConfig>,
}

/// List every test-marked method of every exported fixture as `namespace.method`.
///
/// Configs merge method, fixture and module declarations, de-duplicated by name and default value.
#[tracing::instrument(skip_all, fields(module = %path.display()))]
pub fn flat_list(source: &dyn ModuleSource, path: &Path) -> Result<Vec<FlatTestEntry>, DriverError> {
    let definition = loader::load_checked(source, path)?;
    let mut entries = Vec::new();

    for fixture in definition.exported() {
        for method in fixture.tests() {
            let chain = definition.chain(fixture, method);
            entries.push(FlatTestEntry {
                test_full_name: format!("{}.{}", fixture.namespace, method.name),
                parameters: method
                    .params
                    .iter()
                    .map(|p| FlatParam {
                        name: p.name.clone(),
                        type_tag: p.ty.type_tag().to_string(),
                    })
                    .collect(),
                configs: chain
                    .configs_by(ConfigIdentity::NameAndDefault)
                    .into_iter()
                    .map(|c| FlatConfig {
                        name: c.name,
                        default_value: c.default_value,
                        type_tag: "string".to_string(),
                    })
                    .collect(),
            });
        }
    }
    Ok(entries)
}
