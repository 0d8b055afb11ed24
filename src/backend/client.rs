use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::credentials::CredentialStore;
use super::transport::{HttpRequest, HttpResponse, Method, Transport};
use crate::error::{ApiError, SessionError};

pub const REFRESH_PATH: &str = "/auth/refresh/";
pub const LOGIN_PATH: &str = "/auth/login/";
pub const LOGOUT_PATH: &str = "/auth/logout/";

/// HTTP client that attaches session credentials and renews the session
/// once when a request comes back unauthorized
pub struct SessionClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialStore>,
}

impl SessionClient {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
            credentials,
        }
    }

    /// Raw transport, without credentials, for direct-to-storage writes
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Issue a request, renewing the session at most once on 401.
    ///
    /// The retried response is returned as-is, even when it is another 401.
    /// Fails with [`SessionError::Expired`] only if renewal itself fails.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse, SessionError> {
        let mut request = HttpRequest::new(method, self.url(path));
        if let Some(body) = body {
            request = request
                .header("Content-Type", "application/json")
                .body(body);
        }

        let response = self.send(request.clone()).await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        debug!("{} {} returned 401, renewing session", request.method, path);
        self.renew().await?;

        self.send(request).await
    }

    pub async fn get(&self, path: &str) -> Result<HttpResponse, SessionError> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<HttpResponse, ApiError> {
        let body = serde_json::to_vec(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        Ok(self.request(Method::POST, path, Some(body)).await?)
    }

    /// Renew the access credential using the refresh credential.
    ///
    /// Any failure clears the stored session and yields [`SessionError::Expired`].
    pub async fn renew(&self) -> Result<(), SessionError> {
        let request = HttpRequest::new(Method::POST, self.url(REFRESH_PATH));

        match self.send(request).await {
            Ok(response) if response.is_success() => {
                info!("Session renewed");
                Ok(())
            }
            Ok(response) => {
                warn!("Session renewal rejected with status {}", response.status);
                self.credentials.clear();
                Err(SessionError::Expired)
            }
            Err(e) => {
                warn!("Session renewal failed: {}", e);
                self.credentials.clear();
                Err(SessionError::Expired)
            }
        }
    }

    /// Establish a session; the backend answers with session cookies
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let request = HttpRequest::new(Method::POST, self.url(LOGIN_PATH))
            .header("Content-Type", "application/json")
            .body(body.to_string().into_bytes());

        let response = self.send(request).await?;
        if !response.is_success() {
            return Err(ApiError::Status {
                status: response.status,
                body: response.text(),
            });
        }
        if self.credentials.get().access.is_none() {
            return Err(ApiError::InvalidResponse(
                "login succeeded but no session cookie was issued".to_string(),
            ));
        }

        info!("Logged in as {}", email);
        Ok(())
    }

    /// Invalidate the session. Local credentials are dropped even if the
    /// backend call fails.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let request = HttpRequest::new(Method::POST, self.url(LOGOUT_PATH));
        let result = self.send(request).await;
        self.credentials.clear();

        let response = result?;
        if !response.is_success() {
            return Err(ApiError::Status {
                status: response.status,
                body: response.text(),
            });
        }
        info!("Logged out");
        Ok(())
    }

    /// One exchange with current credentials attached; absorbs Set-Cookie
    async fn send(&self, mut request: HttpRequest) -> Result<HttpResponse, SessionError> {
        if let Some(cookie) = self.credentials.get().cookie_header() {
            request = request.header("Cookie", cookie);
        }

        debug!("{} {}", request.method, request.url);
        let response = self.transport.send(request).await?;

        let mut credentials = self.credentials.get();
        let mut changed = false;
        for header in response.header_values("set-cookie") {
            changed |= credentials.absorb_set_cookie(header);
        }
        if changed {
            self.credentials.set(credentials);
        }

        Ok(response)
    }
}
