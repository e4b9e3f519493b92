//! 러너 OIDC 신원 증명 요청.

use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::domain::error::RunError;

/// `ACTIONS_ID_TOKEN_REQUEST_URL` / `ACTIONS_ID_TOKEN_REQUEST_TOKEN` 값.
#[derive(Debug, Clone, Default)]
pub struct IdentityRequest {
    pub request_url: Option<String>,
    pub request_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdentityResponse {
    value: String,
}

/// audience를 붙여 OIDC 토큰을 요청한다. 어떤 실패든 `IdentityUnavailable`이다.
pub(super) async fn request_identity_token(
    client: &Client,
    identity: &IdentityRequest,
    audience: &str,
) -> Result<String> {
    let unavailable = |reason: String| RunError::IdentityUnavailable { reason };

    let (Some(request_url), Some(request_token)) = (
        non_empty(identity.request_url.as_deref()),
        non_empty(identity.request_token.as_deref()),
    ) else {
        return Err(unavailable("ACTIONS_ID_TOKEN_REQUEST_URL/TOKEN not set".to_string()).into());
    };

    let mut url = Url::parse(request_url)
        .map_err(|err| unavailable(format!("invalid request url: {err}")))?;
    url.query_pairs_mut().append_pair("audience", audience);

    let resp = client
        .get(url)
        .header("User-Agent", "commentpilot")
        .bearer_auth(request_token)
        .send()
        .await
        .map_err(|err| unavailable(format!("request failed: {err}")))?;

    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|err| unavailable(format!("failed to read response: {err}")))?;
    if !status.is_success() {
        return Err(unavailable(format!("{status}: {body}")).into());
    }

    let parsed: IdentityResponse = serde_json::from_str(&body)
        .map_err(|err| unavailable(format!("invalid response JSON: {err}")))?;
    Ok(parsed.value)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::*;

    #[tokio::test]
    async fn non_success_is_identity_unavailable() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/oidc");
            then.status(403).body("forbidden");
        });

        let err = request_identity_token(
            &Client::new(),
            &IdentityRequest {
                request_url: Some(format!("{}/oidc", server.base_url())),
                request_token: Some("t".to_string()),
            },
            "aud",
        )
        .await
        .unwrap_err();

        match err.downcast_ref::<RunError>() {
            Some(RunError::IdentityUnavailable { reason }) => assert!(reason.contains("403")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
