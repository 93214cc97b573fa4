//! Amazon ECR backend for [`RegistryApi`].

use async_trait::async_trait;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_ecr::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ecr::primitives::DateTime as SmithyDateTime;
use aws_sdk_ecr::types;
use aws_sdk_ecr::Client;
use chrono::{DateTime, Utc};

use crate::api::RegistryApi;
use crate::config::RegistryConfig;
use crate::error::{ConfigError, RegistryApiError};
use crate::types::{ImageDetail, Page, RepositoryRecord};

const NOT_FOUND_CODES: &[&str] = &["RepositoryNotFoundException", "RegistryNotFoundException"];

const THROTTLING_CODES: &[&str] = &[
    "ThrottlingException",
    "Throttling",
    "ThrottledException",
    "TooManyRequestsException",
    "RequestLimitExceeded",
    "LimitExceededException",
];

const SERVER_CODES: &[&str] = &["ServerException", "ServiceUnavailable", "InternalFailure"];

/// ECR API client. Cheap to clone and safe to share across scrapes.
#[derive(Debug, Clone)]
pub struct EcrApi {
    client: Client,
    registry_id: Option<String>,
    page_size: Option<i32>,
}

impl EcrApi {
    /// Wraps an already-authenticated SDK client.
    #[must_use]
    pub fn from_client(client: Client, config: &RegistryConfig) -> Self {
        Self {
            client,
            registry_id: config.registry_id.clone(),
            page_size: config.page_size,
        }
    }

    /// Loads credentials from the default AWS provider chain and builds a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid. Credential problems
    /// only surface on the first API call.
    pub async fn from_config(config: &RegistryConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let timeouts = TimeoutConfig::builder()
            .connect_timeout(config.connect_timeout)
            .operation_timeout(config.operation_timeout)
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest()).timeout_config(timeouts);
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_ecr::config::Builder::from(&sdk_config);
        if let Some(url) = &config.endpoint_url {
            builder = builder.endpoint_url(url);
        }

        tracing::info!(
            region = ?sdk_config.region(),
            endpoint_url = ?config.endpoint_url,
            registry_id = ?config.registry_id,
            "Created ECR client"
        );

        Ok(Self::from_client(Client::from_conf(builder.build()), config))
    }

    /// Issues a single one-record `DescribeRepositories` call.
    ///
    /// # Errors
    ///
    /// Returns the categorized failure of the call.
    pub async fn probe(&self) -> Result<(), RegistryApiError> {
        self.client
            .describe_repositories()
            .set_registry_id(self.registry_id.clone())
            .max_results(1)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| categorize(&e, "registry"))
    }
}

#[async_trait]
impl RegistryApi for EcrApi {
    async fn describe_repositories(
        &self,
        next_token: Option<String>,
    ) -> Result<Page<RepositoryRecord>, RegistryApiError> {
        let output = self
            .client
            .describe_repositories()
            .set_registry_id(self.registry_id.clone())
            .set_max_results(self.page_size)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| categorize(&e, "registry"))?;

        Ok(Page {
            items: output.repositories().iter().map(repository_record).collect(),
            next_token: output.next_token().map(str::to_owned),
        })
    }

    async fn describe_images(
        &self,
        repository_name: &str,
        next_token: Option<String>,
    ) -> Result<Page<ImageDetail>, RegistryApiError> {
        let output = self
            .client
            .describe_images()
            .set_registry_id(self.registry_id.clone())
            .repository_name(repository_name)
            .set_max_results(self.page_size)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| categorize(&e, repository_name))?;

        Ok(Page {
            items: output.image_details().iter().map(image_detail).collect(),
            next_token: output.next_token().map(str::to_owned),
        })
    }
}

fn repository_record(repository: &types::Repository) -> RepositoryRecord {
    RepositoryRecord {
        name: repository.repository_name().map(str::to_owned),
        uri: repository.repository_uri().map(str::to_owned),
    }
}

fn image_detail(image: &types::ImageDetail) -> ImageDetail {
    ImageDetail {
        size_bytes: image.image_size_in_bytes(),
        pushed_at: image.image_pushed_at().and_then(to_chrono),
        last_pulled_at: image.last_recorded_pull_time().and_then(to_chrono),
    }
}

fn to_chrono(timestamp: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())
}

/// Maps an SDK failure onto the registry error taxonomy.
fn categorize<E, R>(err: &SdkError<E, R>, resource: &str) -> RegistryApiError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(err).to_string();

    match err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            RegistryApiError::Transient { message }
        }
        SdkError::ServiceError(service) => match service.err().code() {
            Some(code) if NOT_FOUND_CODES.contains(&code) => RegistryApiError::NotFound {
                resource: resource.to_string(),
            },
            Some(code) if THROTTLING_CODES.contains(&code) => RegistryApiError::Throttled { message },
            Some(code) if SERVER_CODES.contains(&code) => RegistryApiError::Transient { message },
            _ => RegistryApiError::Other { message },
        },
        _ => RegistryApiError::Other { message },
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_ecr::config::http::HttpResponse;
    use aws_sdk_ecr::operation::describe_repositories::DescribeRepositoriesError;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_repository_record_conversion() {
        let repo = types::Repository::builder()
            .repository_name("payments")
            .repository_uri("123456789012.dkr.ecr.eu-west-1.amazonaws.com/payments")
            .build();
        let record = repository_record(&repo);
        assert_eq!(record.name.as_deref(), Some("payments"));
        assert_eq!(
            record.uri.as_deref(),
            Some("123456789012.dkr.ecr.eu-west-1.amazonaws.com/payments")
        );

        let bare = types::Repository::builder().build();
        assert_eq!(repository_record(&bare), RepositoryRecord::default());
    }

    #[test]
    fn test_image_detail_conversion() {
        let image = types::ImageDetail::builder()
            .image_size_in_bytes(1024)
            .image_pushed_at(SmithyDateTime::from_secs(1_700_000_000))
            .build();
        let detail = image_detail(&image);

        assert_eq!(detail.size_bytes, Some(1024));
        assert_eq!(detail.pushed_at.map(|t| t.timestamp()), Some(1_700_000_000));
        assert!(detail.last_pulled_at.is_none());
    }

    #[test]
    fn test_timeout_is_transient() {
        let err: SdkError<DescribeRepositoriesError, HttpResponse> =
            SdkError::timeout_error("deadline exceeded");
        let mapped = categorize(&err, "registry");
        assert_eq!(mapped.kind(), ErrorKind::Transient);
    }

    #[tokio::test]
    async fn test_from_config_rejects_invalid_page_size() {
        let config = RegistryConfig::new().with_page_size(5000);
        let err = EcrApi::from_config(&config).await.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPageSize { value: 5000, .. }));
    }
}
