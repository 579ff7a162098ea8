//! Authentication API client methods

use super::{ApiRequest, ClientResult, QroomClient};
use crate::types::{LoginRequest, LoginResponse, SignupRequest, SignupResponse};
use qroom_core::Session;
use tracing::info;

impl QroomClient {
    /// Create an account
    pub async fn signup(&self, request: &SignupRequest) -> ClientResult<SignupResponse> {
        let req = ApiRequest::post("/auth/signup").json(request)?.skip_auth();
        self.execute(req).await
    }

    /// Log in without touching the stored session
    ///
    /// A wrong password comes back as a plain 401 `ServerError`; it never
    /// triggers a token refresh.
    pub async fn login(&self, request: &LoginRequest) -> ClientResult<LoginResponse> {
        let req = ApiRequest::post("/auth/login").json(request)?.skip_auth();
        self.execute(req).await
    }

    /// Log in and store the returned tokens and user
    pub async fn login_and_persist(&self, request: &LoginRequest) -> ClientResult<LoginResponse> {
        let response = self.login(request).await?;
        self.session().save(&response.session());
        info!(user_id = response.user.id, "Logged in");
        Ok(response)
    }

    /// Forget the stored session
    pub fn logout(&self) {
        self.session().clear();
        info!("Logged out");
    }

    /// Currently stored session, if complete
    pub fn current_session(&self) -> Option<Session> {
        self.session().load()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().access_token().is_some()
    }
}
