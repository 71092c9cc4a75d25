use std::{collections::HashMap, fs, path::Path};

use super::{format, interpolate, Config, Format};

/// Reads environment variables and substitutes them into the raw config text.
pub fn prepare_input(content: &str) -> Result<String, Vec<String>> {
    let vars = std::env::vars().collect::<HashMap<_, _>>();
    interpolate(content, &vars)
}

/// Loads a [`Config`] from a string in the given format.
pub fn load_from_str(content: &str, format: Format) -> Result<Config, Vec<String>> {
    let with_vars = prepare_input(content)?;
    format::deserialize(&with_vars, format)
}

/// Loads a [`Config`] from a file, choosing the format from its extension.
pub fn load_from_path(path: &Path) -> Result<Config, Vec<String>> {
    let format = Format::from_path(path).map_err(|path| {
        vec![format!(
            "Config file {path:?} has an unknown extension; expected .toml, .yaml, .yml or .json."
        )]
    })?;

    let content = fs::read_to_string(path).map_err(|error| {
        if error.kind() == std::io::ErrorKind::NotFound {
            error!(message = "Config file not found in path.", ?path);
        } else {
            error!(message = "Error opening config file.", %error, ?path);
        }
        vec![format!("Could not read config file {path:?}: {error}")]
    })?;

    debug!(message = "Loading config.", ?path, %format);
    load_from_str(&content, format)
}
