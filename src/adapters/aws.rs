//! Shared AWS SDK plumbing
//!
//! Builds the SDK configuration from [`AwsConfig`] and turns SDK errors into
//! error code / message pairs for classification.

use crate::config::AwsConfig;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use secrecy::ExposeSecret;

/// Load SDK configuration for a region
///
/// Static credentials are used when both the access key id and the secret
/// are configured. Otherwise the default provider chain applies.
pub async fn load_sdk_config(config: &AwsConfig, region: &str) -> SdkConfig {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));

    if let (Some(access_key_id), Some(secret)) =
        (&config.access_key_id, &config.secret_access_key)
    {
        let session_token = config
            .session_token
            .as_ref()
            .map(|t| t.expose_secret().as_ref().to_string());
        let credentials = Credentials::new(
            access_key_id.clone(),
            secret.expose_secret().as_ref().to_string(),
            session_token,
            None,
            "quicksight-backup-config",
        );
        loader = loader.credentials_provider(credentials);
    }

    loader.load().await
}

/// Error code and message of an SDK error
///
/// Timeouts and dispatch failures carry no service code and are reported
/// as `RequestTimeout` so they classify as transient.
pub fn sdk_error_parts<E, R>(err: &SdkError<E, R>) -> (String, String)
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => (
            "RequestTimeout".to_string(),
            DisplayErrorContext(err).to_string(),
        ),
        _ => {
            let code = err.code().unwrap_or("Unknown").to_string();
            let message = err
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| DisplayErrorContext(err).to_string());
            (code, message)
        }
    }
}
