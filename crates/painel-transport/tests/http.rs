//! Integration tests for the HTTP API client.
//!
//! Each test starts a `wiremock` server that plays the dashboard API, so
//! requests actually go over a socket and through `reqwest`.

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use painel_protocol::{LoginRequest, Role};
    use painel_transport::{ApiError, HttpApi, IdentityApi, ResourceApi};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_for(server: &MockServer) -> HttpApi {
        HttpApi::new(server.uri(), Duration::from_secs(5)).expect("client should build")
    }

    #[tokio::test]
    async fn test_login_accepted_decodes_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_json(serde_json::json!({
                "username": "hiury",
                "password": "thebest"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "token": "tok-1",
                "user": "hiury",
                "role": "admin"
            })))
            .mount(&server)
            .await;

        let resp = api_for(&server)
            .login(&LoginRequest::new("hiury", "thebest"))
            .await
            .expect("login should succeed");

        assert!(resp.success);
        assert_eq!(resp.token.as_deref(), Some("tok-1"));
        assert_eq!(resp.role, Some(Role::Admin));
    }

    #[tokio::test]
    async fn test_login_rejected_returns_status_with_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "success": false,
                "message": "Usuário ou senha inválidos"
            })))
            .mount(&server)
            .await;

        let err = api_for(&server)
            .login(&LoginRequest::new("jaya", "wrong"))
            .await
            .unwrap_err();

        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message.as_deref(), Some("Usuário ou senha inválidos"));
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_current_user_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/current_user"))
            .and(header("authorization", "Bearer tok-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "logged_in": true,
                "user": "renan",
                "role": "comum"
            })))
            .mount(&server)
            .await;

        let resp = api_for(&server)
            .current_user("tok-9")
            .await
            .expect("validation should succeed");

        assert!(resp.logged_in);
        assert_eq!(resp.user.as_deref(), Some("renan"));
    }

    #[tokio::test]
    async fn test_current_user_expired_token_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/current_user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "logged_in": false,
                "message": "Token expirado"
            })))
            .mount(&server)
            .await;

        let err = api_for(&server).current_user("stale").await.unwrap_err();

        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_logout_posts_token_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/logout"))
            .and(body_json(serde_json::json!({ "token": "tok-1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        api_for(&server).logout("tok-1").await.expect("logout should succeed");
    }

    #[tokio::test]
    async fn test_request_exceeding_timeout_returns_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/current_user"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(500))
                    .set_body_json(serde_json::json!({ "logged_in": true })),
            )
            .mount(&server)
            .await;
        let api = HttpApi::new(server.uri(), Duration::from_millis(50)).unwrap();

        let err = api.current_user("tok").await.unwrap_err();

        assert!(matches!(err, ApiError::Timeout), "got {err:?}");
        assert!(err.is_unreachable());
    }

    #[tokio::test]
    async fn test_unreachable_server_returns_network_error() {
        // Port 9 (discard) on localhost is essentially never listening.
        let api = HttpApi::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();

        let err = api.current_user("tok").await.unwrap_err();

        assert!(err.is_unreachable(), "got {err:?}");
    }

    #[tokio::test]
    async fn test_resource_get_forbidden_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/notifications/count"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": "Token inválido ou expirado"
            })))
            .mount(&server)
            .await;

        let err = api_for(&server)
            .get("/notifications/count", Some("tok"))
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert!(err.to_string().contains("Token inválido ou expirado"));
    }

    #[tokio::test]
    async fn test_resource_get_returns_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/materiais"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&server)
            .await;

        let body = api_for(&server).get("materiais", None).await.unwrap();

        assert_eq!(body, b"[]");
    }
}
