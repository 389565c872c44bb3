//! Helpers shared by the AWS-backed stores.

use std::error::Error;

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

/// Short description of an SDK failure, safe to return to clients.
///
/// The full error chain, which includes the raw HTTP response, is logged at
/// `error` under `operation`.
pub(crate) fn error_message<E>(operation: &str, err: &SdkError<E>) -> String
where
    E: ProvideErrorMetadata + Error + 'static,
{
    tracing::error!(operation, error = %DisplayErrorContext(err), "AWS request failed");

    match err.as_service_error() {
        Some(service) => match (service.code(), service.message()) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            (Some(code), None) => code.to_string(),
            (None, _) => service.to_string(),
        },
        None => err.to_string(),
    }
}

/// Error code of a service error, if the request got that far.
pub(crate) fn error_code<E: ProvideErrorMetadata>(err: &SdkError<E>) -> Option<&str> {
    err.as_service_error().and_then(ProvideErrorMetadata::code)
}

