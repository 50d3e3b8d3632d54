use std::env;

/// Retrieves an environment variable, falling back to a default when unset.
pub fn get_env_var_or(var: &str, default: &str) -> String {
    env::var(var).unwrap_or_else(|_| default.to_string())
}

/// Retrieves a list-valued environment variable, split on a delimiter
/// with blank entries dropped. An unset variable yields an empty list.
pub fn get_env_var_as_vec(var: &str, delimiter: char) -> Vec<String> {
    env::var(var)
        .unwrap_or_default()
        .split(delimiter)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
