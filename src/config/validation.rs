use crate::config::types::CrawlOptions;
use crate::{ConfigError, ConfigResult};

/// Upper bound on the per-request timeout, in seconds
const MAX_TIMEOUT_SECS: u64 = 600;

/// Validates crawl options before a run starts
///
/// The start URL is not checked here: a bad seed is reported per seed by the
/// scheduler as `InvalidSeedUrl`, so one bad line in a seed file does not stop
/// the others from being crawled.
pub fn validate(options: &CrawlOptions) -> ConfigResult<()> {
    validate_timeout(options.timeout_secs)?;
    validate_user_agent(&options.user_agent)?;
    validate_out_dir(options)?;
    Ok(())
}

fn validate_timeout(timeout_secs: u64) -> ConfigResult<()> {
    if timeout_secs == 0 || timeout_secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "timeout must be between 1 and {} seconds, got {}",
            MAX_TIMEOUT_SECS, timeout_secs
        )));
    }
    Ok(())
}

fn validate_user_agent(user_agent: &str) -> ConfigResult<()> {
    if user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    // Must be representable as an HTTP header value
    if user_agent.chars().any(|c| c.is_control()) {
        return Err(ConfigError::Validation(format!(
            "user_agent contains control characters: {:?}",
            user_agent
        )));
    }

    Ok(())
}

fn validate_out_dir(options: &CrawlOptions) -> ConfigResult<()> {
    if options.out_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }
    Ok(())
}
