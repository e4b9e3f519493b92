//! OIDC 신원 증명을 범위 한정 앱 토큰으로 교환한다.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;

use crate::domain::error::RunError;

#[derive(Debug, Deserialize)]
struct ExchangeResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct ExchangeError {
    error: String,
}

pub(super) async fn exchange_token(
    client: &Client,
    exchange_url: &str,
    assertion: &str,
) -> Result<String> {
    let resp = client
        .post(exchange_url)
        .header("User-Agent", "commentpilot")
        .bearer_auth(assertion)
        .send()
        .await
        .context("token exchange: request failed")?;

    let status = resp.status();
    let body = resp
        .text()
        .await
        .context("token exchange: failed to read body")?;

    if !status.is_success() {
        // 교환 서비스가 `{error}`를 주면 그 문구를, 아니면 원문을 노출한다.
        let message = serde_json::from_str::<ExchangeError>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        return Err(RunError::TokenExchangeFailed {
            status: status.as_u16(),
            message,
        }
        .into());
    }

    let parsed: ExchangeResponse =
        serde_json::from_str(&body).context("token exchange: invalid response JSON")?;
    Ok(parsed.token)
}
