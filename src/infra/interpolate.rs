use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_yaml::Value;

use crate::domain::error::LoadError;

static VARIABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\$(?:(?P<escaped>\$)|\{(?P<braced>[A-Za-z_][A-Za-z0-9_]*)(?:(?P<op>:?[-?])(?P<arg>[^}]*))?\}|(?P<named>[A-Za-z_][A-Za-z0-9_]*))",
    )
    .unwrap()
});

/// Substitute variables in every string of a document tree. Mapping keys
/// are left untouched.
pub fn interpolate_value<F>(value: &mut Value, lookup: &F) -> Result<(), LoadError>
where
    F: Fn(&str) -> Option<String>,
{
    match value {
        Value::String(s) => {
            *s = interpolate(s, lookup)?;
        }
        Value::Sequence(items) => {
            for item in items {
                interpolate_value(item, lookup)?;
            }
        }
        Value::Mapping(mapping) => {
            for (_, item) in mapping.iter_mut() {
                interpolate_value(item, lookup)?;
            }
        }
        Value::Tagged(tagged) => interpolate_value(&mut tagged.value, lookup)?,
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
    Ok(())
}

/// Substitute `$VAR`, `${VAR}`, `${VAR:-default}`, `${VAR-default}`,
/// `${VAR:?message}` and `${VAR?message}` in a string. `$$` is a literal `$`.
pub fn interpolate<F>(input: &str, lookup: &F) -> Result<String, LoadError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut output = String::with_capacity(input.len());
    let mut last = 0;

    for caps in VARIABLE_RE.captures_iter(input) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        check_plain(&input[last..whole.start()], input)?;
        output.push_str(&input[last..whole.start()]);
        output.push_str(&substitute(&caps, lookup)?);
        last = whole.end();
    }
    check_plain(&input[last..], input)?;
    output.push_str(&input[last..]);

    Ok(output)
}

fn check_plain(segment: &str, input: &str) -> Result<(), LoadError> {
    if segment.contains('$') {
        return Err(LoadError::schema(format!(
            "invalid interpolation format in {input:?}"
        )));
    }
    Ok(())
}

fn substitute<F>(caps: &Captures<'_>, lookup: &F) -> Result<String, LoadError>
where
    F: Fn(&str) -> Option<String>,
{
    if caps.name("escaped").is_some() {
        return Ok("$".to_string());
    }
    if let Some(name) = caps.name("named") {
        return Ok(lookup(name.as_str()).unwrap_or_default());
    }

    let name = caps.name("braced").map(|m| m.as_str()).unwrap_or_default();
    let value = lookup(name);
    let arg = caps.name("arg").map(|m| m.as_str()).unwrap_or_default();

    match caps.name("op").map(|m| m.as_str()) {
        None => Ok(value.unwrap_or_default()),
        Some(":-") => Ok(value.filter(|v| !v.is_empty()).unwrap_or_else(|| arg.to_string())),
        Some("-") => Ok(value.unwrap_or_else(|| arg.to_string())),
        Some(":?") => value.filter(|v| !v.is_empty()).ok_or_else(|| missing(name, arg)),
        Some(_) => value.ok_or_else(|| missing(name, arg)),
    }
}

fn missing(name: &str, message: &str) -> LoadError {
    LoadError::schema(format!("required variable {name} is missing a value: {message}"))
}
