use std::collections::HashMap;
use std::path::Path;

use super::value::ConfigValue;
use super::ConfigError;

/// Read a YAML file into `values`. A missing file is not an error.
pub(crate) fn load_yaml_file(
    path: &Path,
    values: &mut HashMap<String, ConfigValue>,
) -> Result<(), ConfigError> {
    if !path.exists() {
        return Ok(());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
    load_yaml_str(&content, values)
        .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))
}

/// Parse YAML text into `values`, later keys overriding earlier ones.
pub(crate) fn load_yaml_str(
    content: &str,
    values: &mut HashMap<String, ConfigValue>,
) -> Result<(), ConfigError> {
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| ConfigError::Load(e.to_string()))?;
    flatten("", &yaml, values);
    Ok(())
}

/// Flatten nested mappings into dotted keys (`bindoc.docs.title`).
fn flatten(prefix: &str, node: &serde_yaml::Value, out: &mut HashMap<String, ConfigValue>) {
    let serde_yaml::Value::Mapping(map) = node else {
        if !prefix.is_empty() {
            out.insert(prefix.to_string(), ConfigValue::from(node));
        }
        return;
    };
    for (k, v) in map {
        let segment = match k {
            serde_yaml::Value::String(s) => s.clone(),
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            other => format!("{other:?}"),
        };
        let key = if prefix.is_empty() {
            segment
        } else {
            format!("{prefix}.{segment}")
        };
        flatten(&key, v, out);
    }
}

/// Environment variable name to config key: `BINDOC_DOCS_TITLE` ->
/// `bindoc.docs.title`.
pub(crate) fn env_key(name: &str) -> String {
    name.to_lowercase().replace('_', ".")
}
