use std::{collections::HashMap, sync::LazyLock};

use regex::{Captures, Regex};

// Variable names follow what a shell accepts (the `[:word:]` class), plus `.`
// which shows up in names exported from Java properties files.
static ENVIRONMENT_VARIABLE_INTERPOLATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        \$\$|
        \$([[:word:].]+)|
        \$\{([[:word:].]+)(?:(:?-|:?\?)([^}]*))?\}",
    )
    .unwrap()
});

/// Replaces `$VAR`, `${VAR}`, `${VAR:-default}`, `${VAR-default}`,
/// `${VAR:?message}` and `${VAR?message}` in `input` with values from `vars`.
/// `$$` is an escaped `$`.
///
/// Every problem is collected so a broken config reports all of them at once.
pub fn interpolate(input: &str, vars: &HashMap<String, String>) -> Result<String, Vec<String>> {
    let mut errors = Vec::new();

    let interpolated = ENVIRONMENT_VARIABLE_INTERPOLATION_REGEX
        .replace_all(input, |caps: &Captures<'_>| {
            let Some(name) = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()) else {
                return "$".to_owned();
            };
            let flags = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
            let default_or_message = caps.get(4).map(|m| m.as_str()).unwrap_or_default();

            resolve(name, vars.get(name).map(String::as_str), flags, default_or_message)
                .unwrap_or_else(|error| {
                    errors.push(error);
                    String::new()
                })
        })
        .into_owned();

    if errors.is_empty() {
        Ok(interpolated)
    } else {
        Err(errors)
    }
}

fn resolve(
    name: &str,
    value: Option<&str>,
    flags: &str,
    default_or_message: &str,
) -> Result<String, String> {
    let non_empty = value.filter(|v| !v.is_empty());
    match flags {
        ":-" => Ok(non_empty.unwrap_or(default_or_message).to_owned()),
        "-" => Ok(value.unwrap_or(default_or_message).to_owned()),
        ":?" => non_empty.map(str::to_owned).ok_or_else(|| {
            format!(
                "Non-empty environment variable required in config. name = {name:?}, error = {default_or_message:?}",
            )
        }),
        "?" => value.map(str::to_owned).ok_or_else(|| {
            format!(
                "Missing environment variable required in config. name = {name:?}, error = {default_or_message:?}",
            )
        }),
        _ => value
            .map(str::to_owned)
            .ok_or_else(|| format!("Missing environment variable in config. name = {name:?}")),
    }
}
