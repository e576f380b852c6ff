//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::BackupConfig;
use crate::config::secret_string;
use crate::domain::errors::BackupError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "QSBACKUP";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into BackupConfig
/// 4. Applies environment variable overrides (QSBACKUP_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use quicksight_backup::config::loader::load_config;
///
/// let config = load_config("quicksight-backup.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<BackupConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(BackupError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        BackupError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: BackupConfig = toml::from_str(&contents)
        .map_err(|e| BackupError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        BackupError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched. All missing variables are reported
/// together.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| BackupError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(BackupError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}_{key}")).ok()
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_var(key).and_then(|v| v.parse().ok())
}

/// Applies environment variable overrides using the QSBACKUP_* prefix
///
/// Environment variables follow the pattern: QSBACKUP_<SECTION>_<KEY>
/// For example: QSBACKUP_S3_BUCKET_NAME, QSBACKUP_BACKUP_MAX_ASSETS_PER_BUNDLE
fn apply_env_overrides(config: &mut BackupConfig) {
    // Application overrides
    if let Some(val) = env_var("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_parse("APPLICATION_DRY_RUN") {
        config.application.dry_run = val;
    }
    if let Some(val) = env_var("APPLICATION_OUTPUT_DIR") {
        config.application.output_dir = val;
    }

    // AWS overrides
    if let Some(val) = env_var("AWS_REGION") {
        config.aws.region = val;
    }
    if let Some(val) = env_var("AWS_ACCOUNT_ID") {
        config.aws.account_id = val;
    }
    if let Some(val) = env_var("AWS_IDENTITY_REGION") {
        config.aws.identity_region = Some(val);
    }
    if let Some(val) = env_var("AWS_ACCESS_KEY_ID") {
        config.aws.access_key_id = Some(val);
    }
    if let Some(val) = env_var("AWS_SECRET_ACCESS_KEY") {
        config.aws.secret_access_key = Some(secret_string(val));
    }
    if let Some(val) = env_var("AWS_SESSION_TOKEN") {
        config.aws.session_token = Some(secret_string(val));
    }

    // S3 overrides
    if let Some(val) = env_var("S3_BUCKET_NAME") {
        config.s3.bucket_name = val;
    }
    if let Some(val) = env_var("S3_PREFIX") {
        config.s3.prefix = val;
    }
    if let Some(val) = env_var("S3_PREFIX_FORMAT") {
        config.s3.prefix_format = val;
    }

    // Backup overrides
    if let Some(val) = env_var("BACKUP_EXPORT_FORMAT") {
        config.backup.export_format = val;
    }
    if let Some(val) = env_parse("BACKUP_MAX_ASSETS_PER_BUNDLE") {
        config.backup.max_assets_per_bundle = val;
    }
    if let Some(val) = env_parse("BACKUP_MAX_CONCURRENT_BUNDLES") {
        config.backup.max_concurrent_bundles = val;
    }
    if let Some(val) = env_parse("BACKUP_INCLUDE_PERMISSIONS") {
        config.backup.include_permissions = val;
    }
    if let Some(val) = env_parse("BACKUP_INCLUDE_TAGS") {
        config.backup.include_tags = val;
    }

    // Export overrides
    if let Some(val) = env_parse("EXPORT_RETRY_MAX_ATTEMPTS") {
        config.export.retry.max_attempts = val;
    }
    if let Some(val) = env_parse("EXPORT_POLL_MAX_WAIT_SECS") {
        config.export.poll.max_wait_secs = val;
    }

    // Transfer overrides
    if let Some(val) = env_var("TRANSFER_SPOOL_DIR") {
        config.transfer.spool_dir = Some(val.into());
    }

    // Logging overrides
    if let Some(val) = env_parse("LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env_var("LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("QSB_LOADER_TEST_VAR", "test_value");
        let input = "bucket_name = \"${QSB_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "bucket_name = \"test_value\"");
        std::env::remove_var("QSB_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("QSB_LOADER_COMMENTED");
        let input = "# account_id = \"${QSB_LOADER_COMMENTED}\"\nregion = \"us-east-1\"";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${QSB_LOADER_COMMENTED}"));
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("QSB_LOADER_MISSING_A");
        std::env::remove_var("QSB_LOADER_MISSING_B");
        let input = "a = \"${QSB_LOADER_MISSING_A}\"\nb = \"${QSB_LOADER_MISSING_B}\"";
        let err = substitute_env_vars(input).unwrap_err().to_string();
        assert!(err.contains("QSB_LOADER_MISSING_A"));
        assert!(err.contains("QSB_LOADER_MISSING_B"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[aws]
region = "us-east-1"
account_id = "123456789012"

[s3]
bucket_name = "qs-backups-test"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.aws.account_id, "123456789012");
        assert_eq!(config.s3.bucket_name, "qs-backups-test");
        assert_eq!(config.s3.prefix, "quicksight-backups");
        assert_eq!(config.backup.max_assets_per_bundle, 50);
    }
}
