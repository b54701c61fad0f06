//! User management API client methods

use super::{ApiClient, ApiRequest, ClientError};
use crate::types::{UpdatePassword, UpdateUserInfo, UserDetail, UserListResponse, UserSearch, UserSummary};
use roombook_core::{Page, Paginated};

impl ApiClient {
    /// Search users; empty filters match everything
    pub async fn user_search(
        &self,
        search: &UserSearch,
        page: Page,
    ) -> Result<Paginated<UserSummary>, ClientError> {
        let request = ApiRequest::get("/user/list")
            .query("username", &search.username)
            .query("nickName", &search.nick_name)
            .query("email", &search.email)
            .query("pageNo", page.page_no)
            .query("pageSize", page.page_size);
        let response: UserListResponse = self.request(request).await?;
        Ok(response.into())
    }

    /// Freeze a user account
    pub async fn freeze(&self, id: i64) -> Result<(), ClientError> {
        let request = ApiRequest::get("/user/freeze").query("id", id);
        self.request_unit(request).await
    }

    /// Fetch the logged-in user's profile and refresh the cached copy
    pub async fn user_info(&self) -> Result<UserDetail, ClientError> {
        let info: UserDetail = self.request(ApiRequest::get("/user/info")).await?;
        self.session().store_user_info(&info)?;
        Ok(info)
    }

    /// Update the logged-in administrator's profile
    pub async fn update_info(&self, info: &UpdateUserInfo) -> Result<(), ClientError> {
        let request = ApiRequest::post("/user/admin/update").json(info)?;
        self.request_unit(request).await
    }

    /// Send a captcha for a profile update to the account's email address
    pub async fn update_info_captcha(&self) -> Result<String, ClientError> {
        self.request(ApiRequest::get("/user/update/captcha")).await
    }

    /// Send a password-change captcha to `email`
    pub async fn update_password_captcha(&self, email: &str) -> Result<String, ClientError> {
        let request = ApiRequest::get("/user/update_password/captcha").query("address", email);
        self.request(request).await
    }

    pub async fn update_password(&self, update: &UpdatePassword) -> Result<(), ClientError> {
        let request = ApiRequest::post("/user/admin/update_password").json(update)?;
        self.request_unit(request).await
    }
}
