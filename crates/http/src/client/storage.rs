//! Object storage upload helpers

use super::{ApiClient, ApiRequest, ClientError};

impl ApiClient {
    /// Ask the backend for a presigned upload URL for `file_name`
    pub async fn presigned_url(&self, file_name: &str) -> Result<String, ClientError> {
        let request = ApiRequest::get("/minio/presignedUrl").query("name", file_name);
        self.request(request).await
    }

    /// Upload `body` to a presigned URL.
    ///
    /// The URL already carries its own authorization, so this bypasses the
    /// API interceptors and sends no bearer token.
    pub async fn upload_object(&self, url: &str, body: Vec<u8>) -> Result<(), ClientError> {
        let response = self.http().put(url).body(body).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response.text().await.unwrap_or_else(|_| status.to_string());
        Err(ClientError::Application {
            status: status.as_u16(),
            code: i64::from(status.as_u16()),
            message,
        })
    }
}
