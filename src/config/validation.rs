use crate::config::types::{Config, CrawlConfig, FilterConfig, GithubConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_github_config(&config.github)?;
    validate_crawl_config(&config.crawl)?;
    validate_filter_config(&config.filter)?;
    validate_output_config(&config.output)?;
    validate_repositories(config)?;
    Ok(())
}

/// Validates API and search configuration
fn validate_github_config(config: &GithubConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.api_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid api_url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "api_url must be http(s), got '{}'",
            config.api_url
        )));
    }

    if config.target_language.is_empty() && config.required_licenses.is_empty() {
        // A search with no language and no license qualifier would sweep the
        // whole platform; require at least one.
        return Err(ConfigError::Validation(
            "target_language and required_licenses cannot both be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawl configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_requests must be between 1 and 100, got {}",
            config.max_concurrent_requests
        )));
    }

    if config.blob_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "blob_timeout_secs must be >= 1, got {}",
            config.blob_timeout_secs
        )));
    }

    if config.max_repositories < 1 {
        return Err(ConfigError::Validation(format!(
            "max_repositories must be >= 1, got {}",
            config.max_repositories
        )));
    }

    if config.max_files_per_repo < 1 {
        return Err(ConfigError::Validation(format!(
            "max_files_per_repo must be >= 1, got {}",
            config.max_files_per_repo
        )));
    }

    Ok(())
}

/// Validates filtering configuration
fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    if config.target_extensions.is_empty() {
        return Err(ConfigError::Validation(
            "target_extensions cannot be empty".to_string(),
        ));
    }

    for ext in &config.target_extensions {
        if !ext.starts_with('.') {
            return Err(ConfigError::Validation(format!(
                "target extension '{}' must start with '.'",
                ext
            )));
        }
    }

    if config.min_file_size < 1 {
        return Err(ConfigError::Validation(format!(
            "min_file_size must be >= 1 byte, got {}",
            config.min_file_size
        )));
    }

    if config.max_file_size < config.min_file_size {
        return Err(ConfigError::Validation(format!(
            "max_file_size ({}) must be >= min_file_size ({})",
            config.max_file_size, config.min_file_size
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.raw_path.is_empty() {
        return Err(ConfigError::Validation(
            "raw_path cannot be empty".to_string(),
        ));
    }

    if config.dataset_path.is_empty() {
        return Err(ConfigError::Validation(
            "dataset_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates explicit repository targets
fn validate_repositories(config: &Config) -> Result<(), ConfigError> {
    for target in &config.repositories {
        if target.owner.is_empty() || target.name.is_empty() {
            return Err(ConfigError::Validation(
                "repository entries need both owner and name".to_string(),
            ));
        }

        for part in [&target.owner, &target.name] {
            if !part
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
            {
                return Err(ConfigError::Validation(format!(
                    "repository '{}/{}' contains invalid characters",
                    target.owner, target.name
                )));
            }
        }
    }

    Ok(())
}
