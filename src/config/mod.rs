#![allow(missing_docs)]
use std::fmt::Debug;

use dyn_clone::DynClone;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::transforms::Transform;

pub mod format;
mod loading;
mod vars;

pub use format::Format;
pub use loading::{load_from_path, load_from_str, prepare_input};
pub use vars::interpolate;

/// Generate an example configuration for a component.
pub trait GenerateConfig {
    fn generate_config() -> toml::Value;
}

/// Generalized interface for describing and building transform components.
///
/// Implementations are selected in config files by their `type` key.
#[typetag::serde(tag = "type")]
pub trait TransformConfig: DynClone + Debug + Send + Sync {
    /// Builds the transform with the given configuration.
    ///
    /// # Errors
    ///
    /// If an error occurs while building the transform, an error variant explaining the issue is
    /// returned.
    fn build(&self) -> crate::Result<Transform>;
}

dyn_clone::clone_trait_object!(TransformConfig);

/// A full configuration: the transforms to run, in the order events pass
/// through them.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub transforms: IndexMap<String, Box<dyn TransformConfig>>,
}

impl Config {
    /// Builds every configured transform, collecting all build failures.
    pub fn build(&self) -> Result<Vec<(String, Transform)>, Vec<String>> {
        if self.transforms.is_empty() {
            return Err(vec!["No transforms defined in the config.".to_owned()]);
        }

        let mut errors = Vec::new();
        let mut built = Vec::with_capacity(self.transforms.len());
        for (key, transform) in &self.transforms {
            match transform.build() {
                Ok(transform) => built.push((key.clone(), transform)),
                Err(error) => errors.push(format!("Transform {key:?}: {error}")),
            }
        }

        if errors.is_empty() {
            Ok(built)
        } else {
            Err(errors)
        }
    }
}
