//! The API gateway: bearer stamping on the way out, 401/403 handling on the
//! way back.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use eligo_auth::Credential;
use eligo_session::SessionStore;

use crate::api::{AdminApi, AuthApi, PayerApi, ProviderApi};
use crate::error::{ApiError, AuthError};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Method};

/// Single path for every call to the eligibility service.
///
/// Two stages around the transport:
/// - **stamp**: attach the session's current credential, if any.
/// - **intercept**: a 401 forces a logout of the credential the request was
///   stamped with before the error is returned; a 403 is returned as-is and
///   the session is kept; every other failure passes through unmodified.
#[derive(Clone)]
pub struct ApiGateway {
    transport: Arc<dyn HttpTransport>,
    session: Arc<SessionStore>,
}

impl ApiGateway {
    pub fn new(transport: Arc<dyn HttpTransport>, session: Arc<SessionStore>) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn admin(&self) -> AdminApi<'_> {
        AdminApi::new(self)
    }

    pub fn payer(&self) -> PayerApi<'_> {
        PayerApi::new(self)
    }

    pub fn provider(&self) -> ProviderApi<'_> {
        ProviderApi::new(self)
    }

    /// Send a request and return the raw 2xx response.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let request = self.stamp(request);
        let stamped_with = request.bearer.clone();

        let response = self.transport.execute(&request).await?;
        self.intercept(stamped_with.as_ref(), response).await
    }

    pub async fn get_json<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(ApiRequest::new(Method::Get, path)).await?;
        parse_body(&response)
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.post(path, body).await?;
        parse_body(&response)
    }

    pub async fn post<B>(&self, path: &str, body: &B) -> Result<ApiResponse, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.send(ApiRequest::new(Method::Post, path).with_body(encode_body(body)?))
            .await
    }

    pub async fn put<B>(&self, path: &str, body: &B) -> Result<ApiResponse, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.send(ApiRequest::new(Method::Put, path).with_body(encode_body(body)?))
            .await
    }

    /// POST without the session credential. A 401 here leaves the session
    /// alone; used for sign-in, where it means bad credentials.
    pub async fn post_anonymous<B>(&self, path: &str, body: &B) -> Result<ApiResponse, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let request = ApiRequest::new(Method::Post, path).with_body(encode_body(body)?);
        tracing::debug!(
            method = request.method.as_str(),
            path = %request.path,
            "sending anonymous request"
        );

        let response = self.transport.execute(&request).await?;
        self.intercept(None, response).await
    }

    fn stamp(&self, mut request: ApiRequest) -> ApiRequest {
        request.bearer = self.session.current_credential();
        tracing::debug!(
            method = request.method.as_str(),
            path = %request.path,
            authenticated = request.bearer.is_some(),
            "sending request"
        );
        request
    }

    async fn intercept(
        &self,
        stamped_with: Option<&Credential>,
        response: ApiResponse,
    ) -> Result<ApiResponse, ApiError> {
        if response.is_success() {
            return Ok(response);
        }
        match response.status {
            401 => {
                if let Some(credential) = stamped_with {
                    if self.session.invalidate(credential).await {
                        tracing::warn!("service rejected the session credential; logged out");
                    }
                }
                Err(AuthError::Unauthenticated.into())
            }
            403 => Err(AuthError::Forbidden.into()),
            status => Err(ApiError::Status {
                status,
                body: response.body,
            }),
        }
    }
}

fn encode_body<B>(body: &B) -> Result<serde_json::Value, ApiError>
where
    B: Serialize + ?Sized,
{
    serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))
}

fn parse_body<T>(response: &ApiResponse) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    serde_json::from_str(&response.body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

/// `/`-joined path with every dynamic segment percent-encoded.
pub(crate) fn path(segments: &[&str]) -> String {
    segments.iter().fold(String::new(), |mut acc, segment| {
        acc.push('/');
        acc.push_str(&urlencoding::encode(segment));
        acc
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use eligo_auth::ViewSelector;
    use eligo_auth::testing::token_for_role;
    use eligo_session::MemoryStorage;

    use crate::transport::TransportError;

    /// Transport that replays canned responses and records what it was sent.
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
        sent: Mutex<Vec<ApiRequest>>,
    }

    impl ScriptedTransport {
        pub(crate) fn respond(self: &Arc<Self>, status: u16, body: &str) -> Arc<Self> {
            self.responses
                .lock()
                .unwrap()
                .push_back(Ok(ApiResponse::new(status, body)));
            self.clone()
        }

        pub(crate) fn fail(self: &Arc<Self>, err: TransportError) -> Arc<Self> {
            self.responses.lock().unwrap().push_back(Err(err));
            self.clone()
        }

        pub(crate) fn sent(&self) -> Vec<ApiRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
            self.sent.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ApiResponse::new(500, "no scripted response")))
        }
    }

    pub(crate) fn gateway_with(transport: Arc<ScriptedTransport>) -> ApiGateway {
        let session = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new())));
        ApiGateway::new(transport, session)
    }

    #[tokio::test]
    async fn unauthenticated_requests_carry_no_bearer() {
        let transport = Arc::new(ScriptedTransport::default()).respond(200, "{}");
        let gateway = gateway_with(transport.clone());

        gateway.send(ApiRequest::new(Method::Get, "/ping")).await.unwrap();

        assert_eq!(transport.sent()[0].bearer, None);
    }

    #[tokio::test]
    async fn requests_are_stamped_with_the_session_credential() {
        let transport = Arc::new(ScriptedTransport::default()).respond(200, "{}");
        let gateway = gateway_with(transport.clone());
        let token = token_for_role("PAYER_USER");
        gateway.session().login(&token).await.unwrap();

        gateway.send(ApiRequest::new(Method::Get, "/payer/plans")).await.unwrap();

        let sent = transport.sent();
        assert_eq!(sent[0].bearer.as_ref().map(|c| c.expose()), Some(token.as_str()));
    }

    #[tokio::test]
    async fn unauthorized_response_logs_out_exactly_once() {
        let transport = Arc::new(ScriptedTransport::default())
            .respond(401, "")
            .respond(401, "");
        let gateway = gateway_with(transport.clone());
        gateway.session().login(&token_for_role("PROVIDER_USER")).await.unwrap();
        let mut watch = gateway.session().subscribe();

        let err = gateway
            .send(ApiRequest::new(Method::Post, "/provider/eligibility/check"))
            .await
            .unwrap_err();
        assert!(err.is_unauthenticated());
        assert!(gateway.session().current_identity().is_none());
        assert!(watch.changed().await);
        assert_eq!(watch.view(), ViewSelector::Unauthenticated);

        // The follow-up request is unauthenticated; its 401 changes nothing.
        let err = gateway
            .send(ApiRequest::new(Method::Post, "/provider/eligibility/check"))
            .await
            .unwrap_err();
        assert!(err.is_unauthenticated());
        assert!(!watch.has_changed());
        assert_eq!(transport.sent()[1].bearer, None);
    }

    #[tokio::test]
    async fn forbidden_response_keeps_the_session() {
        let transport = Arc::new(ScriptedTransport::default()).respond(403, "nope");
        let gateway = gateway_with(transport);
        gateway.session().login(&token_for_role("PROVIDER_USER")).await.unwrap();
        let before = gateway.session().current_identity();

        let err = gateway
            .send(ApiRequest::new(Method::Post, "/admin/users"))
            .await
            .unwrap_err();

        assert_eq!(err, ApiError::Auth(AuthError::Forbidden));
        assert_eq!(gateway.session().current_identity(), before);
    }

    #[tokio::test]
    async fn domain_statuses_pass_through() {
        let transport = Arc::new(ScriptedTransport::default())
            .respond(404, "member not found")
            .respond(409, "duplicate rule");
        let gateway = gateway_with(transport);
        gateway.session().login(&token_for_role("PAYER_USER")).await.unwrap();

        let err = gateway.send(ApiRequest::new(Method::Get, "/x")).await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Status {
                status: 404,
                body: "member not found".into()
            }
        );
        let err = gateway.send(ApiRequest::new(Method::Get, "/x")).await.unwrap_err();
        assert!(err.is_conflict());
        assert!(gateway.session().is_authenticated());
    }

    #[tokio::test]
    async fn transport_failures_surface_as_typed_errors() {
        let transport = Arc::new(ScriptedTransport::default()).fail(TransportError::Timeout);
        let gateway = gateway_with(transport);
        gateway.session().login(&token_for_role("PAYER_USER")).await.unwrap();

        let err = gateway.send(ApiRequest::new(Method::Get, "/x")).await.unwrap_err();
        assert_eq!(err, ApiError::Transport(TransportError::Timeout));
        assert!(gateway.session().is_authenticated());
    }

    /// Transport that swaps the session to a new credential while the request
    /// is in flight, then answers 401 for the old one.
    struct RotatingTransport {
        session: Arc<SessionStore>,
        next_token: String,
    }

    #[async_trait]
    impl HttpTransport for RotatingTransport {
        async fn execute(&self, _request: &ApiRequest) -> Result<ApiResponse, TransportError> {
            self.session.login(&self.next_token).await.unwrap();
            Ok(ApiResponse::new(401, ""))
        }
    }

    #[tokio::test]
    async fn stale_unauthorized_response_does_not_end_a_newer_session() {
        let session = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new())));
        session.login(&token_for_role("PAYER_USER")).await.unwrap();

        let transport = Arc::new(RotatingTransport {
            session: session.clone(),
            next_token: token_for_role("SYSTEM_ADMIN"),
        });
        let gateway = ApiGateway::new(transport, session.clone());

        let err = gateway.send(ApiRequest::new(Method::Get, "/payer/plans")).await.unwrap_err();
        assert!(err.is_unauthenticated());
        assert_eq!(session.current_view(), ViewSelector::AdminView);
    }

    #[test]
    fn path_segments_are_encoded() {
        assert_eq!(
            path(&["payer", "plans", "GOLD 2025/A", "rules"]),
            "/payer/plans/GOLD%202025%2FA/rules"
        );
    }
}
