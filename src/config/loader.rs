//! Configuration loading and environment parsing.

use super::validation::validate_config;
use super::Config;
use serde_json::{Map, Value};
use std::env;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Prefix for per-field overrides, e.g. `MRPG__HUB__MAILBOX_CAPACITY=64`.
const ENV_OVERRIDE_PREFIX: &str = "MRPG__";

/// Load configuration, merging sources from lowest to highest precedence:
/// 1) Defaults compiled into the binary
/// 2) config.json next to the executable
/// 3) config.json in the current working directory
/// 4) File pointed to by `MRPG_CONFIG_PATH`
/// 5) JSON from stdin when `MRPG_CONFIG_STDIN` is truthy
/// 6) Raw JSON in `MRPG_CONFIG_JSON`
/// 7) Per-field `MRPG__SECTION__FIELD` environment variables
///
/// Read or parse failures are reported on stderr and the source is skipped.
/// Validation errors are only reported here; `main` re-validates and fails hard.
#[must_use]
pub fn load() -> Config {
    let defaults = Config::default();
    let mut merged = serde_json::to_value(&defaults).unwrap_or_else(|_| Value::Object(Map::new()));

    if let Ok(exe_path) = env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            merge_file_source(&mut merged, &exe_dir.join("config.json"));
        }
    }

    merge_file_source(&mut merged, Path::new("config.json"));

    if let Ok(path) = env::var("MRPG_CONFIG_PATH") {
        merge_file_source(&mut merged, &PathBuf::from(path));
    }

    if env::var("MRPG_CONFIG_STDIN").is_ok_and(|val| env_var_truthy(&val)) {
        let mut buf = String::new();
        match std::io::stdin().read_to_string(&mut buf) {
            Ok(_) => {
                if let Some(value) = parse_json_document(&buf, "stdin") {
                    merge_values(&mut merged, value);
                }
            }
            Err(e) => eprintln!("Failed to read config from stdin: {e}"),
        }
    }

    if let Ok(json) = env::var("MRPG_CONFIG_JSON") {
        if let Some(value) = parse_json_document(&json, "MRPG_CONFIG_JSON") {
            merge_values(&mut merged, value);
        }
    }

    apply_env_overrides(&mut merged, env::vars());

    let config = match serde_json::from_value::<Config>(merged) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to deserialize config; using defaults: {e}");
            defaults
        }
    };

    if let Err(e) = validate_config(&config) {
        eprintln!("Configuration validation error: {e}");
    }

    config
}

fn parse_json_document(raw: &str, label: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return None;
    }

    serde_json::from_str(raw)
        .map_err(|err| eprintln!("Failed to parse config from {label}: {err}"))
        .ok()
}

fn merge_file_source(target: &mut Value, path: &Path) {
    if path.as_os_str().is_empty() || !path.exists() {
        return;
    }

    match fs::read_to_string(path) {
        Ok(contents) => {
            let label = format!("file {}", path.display());
            if let Some(value) = parse_json_document(&contents, &label) {
                merge_values(target, value);
            }
        }
        Err(err) => eprintln!("Failed to read config from {}: {err}", path.display()),
    }
}

/// Deep-merges objects; any other value in `source` replaces the target slot.
pub(crate) fn merge_values(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, value) in source_map {
                match target_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        target_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

pub(crate) fn apply_env_overrides<I>(root: &mut Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, raw_value) in vars {
        let Some(stripped) = key.strip_prefix(ENV_OVERRIDE_PREFIX) else {
            continue;
        };

        let segments: Vec<String> = stripped
            .split("__")
            .filter(|segment| !segment.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();

        if !segments.is_empty() {
            set_nested_value(root, &segments, &raw_value);
        }
    }
}

fn env_var_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

/// String and unset slots always take the raw text, so a numeric-looking
/// secret stays a string. Other slots take the value parsed as JSON when it
/// parses.
fn parse_env_value(raw: &str, existing: Option<&Value>) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() || matches!(existing, None | Some(Value::String(_) | Value::Null)) {
        return Value::String(trimmed.to_string());
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
}

fn set_nested_value(target: &mut Value, segments: &[String], raw: &str) {
    let Some((first, rest)) = segments.split_first() else {
        *target = parse_env_value(raw, Some(&*target));
        return;
    };

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    let Value::Object(map) = target else {
        return;
    };

    if rest.is_empty() {
        let value = parse_env_value(raw, map.get(first));
        map.insert(first.clone(), value);
    } else {
        let entry = map
            .entry(first.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        set_nested_value(entry, rest, raw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_keeps_untouched_siblings() {
        let mut base = json!({"hub": {"mailbox_capacity": 256, "command_buffer": 1024}});
        merge_values(&mut base, json!({"hub": {"mailbox_capacity": 8}}));
        assert_eq!(base["hub"]["mailbox_capacity"], 8);
        assert_eq!(base["hub"]["command_buffer"], 1024);
    }

    #[test]
    fn env_overrides_are_nested_and_typed() {
        let mut root = serde_json::to_value(Config::default()).unwrap();
        apply_env_overrides(
            &mut root,
            vec![
                ("MRPG__PORT".to_string(), "9001".to_string()),
                ("MRPG__HUB__ANNOUNCE_PRESENCE".to_string(), "true".to_string()),
                ("MRPG__SECURITY__JWT_SECRET".to_string(), "1234567890".to_string()),
                ("MRPG__SECURITY__CORS_ORIGINS".to_string(), "true".to_string()),
                ("UNRELATED".to_string(), "1".to_string()),
            ],
        );

        let config: Config = serde_json::from_value(root).unwrap();
        assert_eq!(config.port, 9001);
        assert!(config.hub.announce_presence);
        assert_eq!(config.security.jwt_secret.as_deref(), Some("1234567890"));
        assert_eq!(config.security.cors_origins, "true");
    }

    #[test]
    fn blank_documents_are_ignored() {
        assert!(parse_json_document("   ", "test").is_none());
        assert!(parse_json_document("{not json", "test").is_none());
        assert_eq!(parse_json_document("{\"port\":1}", "test"), Some(json!({"port": 1})));
    }

    #[test]
    fn truthy_values() {
        assert!(env_var_truthy("1"));
        assert!(env_var_truthy(" TRUE "));
        assert!(env_var_truthy("yes"));
        assert!(!env_var_truthy("0"));
        assert!(!env_var_truthy("off"));
    }
}
