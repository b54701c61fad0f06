//! Authentication API client methods

use super::{ApiClient, ApiRequest, ClientError};
use crate::types::{LoginRequest, LoginResponse, UserDetail};
use roombook_core::TokenPair;

impl ApiClient {
    /// Log in as an administrator and store the issued credentials
    pub async fn login(&self, username: &str, password: &str) -> Result<UserDetail, ClientError> {
        let request = ApiRequest::post("/user/admin/login").json(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })?;
        let response: LoginResponse = self.request(request).await?;

        // A login redirect left over from an expired session would wipe these
        self.navigation().cancel_pending();

        let session = self.session();
        session.store_tokens(&TokenPair {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
        })?;
        session.store_user_info(&response.user_info)?;
        tracing::info!(username = %response.user_info.username, "Logged in");

        Ok(response.user_info)
    }

    /// Cancel any pending redirect and forget stored credentials
    pub fn logout(&self) -> Result<(), ClientError> {
        self.navigation().cancel_pending();
        self.session().clear()?;
        Ok(())
    }

    /// Profile cached at login, as displayed by the navigation shell
    pub fn cached_user_info(&self) -> Result<Option<UserDetail>, ClientError> {
        Ok(self.session().user_info()?)
    }
}
