use crate::config::types::OptionsFile;
use crate::{ConfigError, ConfigResult};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Duration;

/// Loads and parses an options file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML options file
///
/// # Returns
///
/// * `Ok(OptionsFile)` - Successfully loaded options
/// * `Err(ConfigError)` - Failed to read or parse the file
pub fn load_options_file(path: &Path) -> ConfigResult<OptionsFile> {
    let content = std::fs::read_to_string(path)?;
    let file: OptionsFile = toml::from_str(&content)?;
    Ok(file)
}

/// Computes a SHA-256 hash of the options file content
///
/// Logged at startup so a run can be tied back to the exact configuration used.
pub fn compute_config_hash(path: &Path) -> ConfigResult<String> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads an options file and returns both the parsed file and its hash
pub fn load_options_file_with_hash(path: &Path) -> ConfigResult<(OptionsFile, String)> {
    let file = load_options_file(path)?;
    let hash = compute_config_hash(path)?;
    Ok((file, hash))
}

/// Reads seed URLs from a file, one per line
///
/// Blank lines and lines starting with `#` are skipped. A file without any
/// URLs is an error.
pub fn load_seed_file(path: &Path) -> ConfigResult<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();

    if urls.is_empty() {
        return Err(ConfigError::NoSeeds(format!(
            "no URLs found in {}",
            path.display()
        )));
    }

    Ok(urls)
}

/// Resolves the list of seeds to crawl
///
/// A seed file takes precedence over a single URL, which takes precedence over
/// seeds listed in the options file.
pub fn gather_urls(
    single_url: Option<&str>,
    url_file: Option<&Path>,
    file_seeds: &[String],
) -> ConfigResult<Vec<String>> {
    if let Some(path) = url_file {
        return load_seed_file(path);
    }

    if let Some(url) = single_url {
        return Ok(vec![url.to_string()]);
    }

    if !file_seeds.is_empty() {
        return Ok(file_seeds.to_vec());
    }

    Err(ConfigError::NoSeeds(
        "pass --url, --url-file or list seeds in the config file".to_string(),
    ))
}

/// Parses a human duration such as `0`, `2`, `1.5s`, `500ms`, `2m` or `1h`
///
/// A bare number is interpreted as seconds.
pub fn parse_duration(input: &str) -> ConfigResult<Duration> {
    let s = input.trim();
    if s.is_empty() {
        return Err(ConfigError::InvalidDuration("empty duration".to_string()));
    }

    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);

    let value: f64 = number
        .parse()
        .map_err(|_| ConfigError::InvalidDuration(format!("'{}' has no numeric value", input)))?;

    let seconds = match unit.trim() {
        "" | "s" => value,
        "ms" => value / 1000.0,
        "m" => value * 60.0,
        "h" => value * 3600.0,
        other => {
            return Err(ConfigError::InvalidDuration(format!(
                "unknown unit '{}' in '{}'",
                other, input
            )))
        }
    };

    Duration::try_from_secs_f64(seconds)
        .map_err(|e| ConfigError::InvalidDuration(format!("'{}': {}", input, e)))
}
