//! 설정 값(token/env/cmd)을 실제 런타임 토큰으로 해석하는 유틸리티.
//!
//! - 환경변수/프로세스 실행은 인프라 계층에서만 수행한다.
//! - 여기서 토큰이 해석되면 OIDC 교환을 건너뛴다(로컬/수동 실행용).

use std::env;
use std::process::Command;

use anyhow::{Context, Result};

use crate::application::config::AuthConfig;

/// 직접 토큰 해석 결과.
#[derive(Debug, Clone, Default)]
pub struct TokenResolution {
    pub token: Option<String>,
    pub source: Option<String>,
}

/// `token` > `token_env` > `token_command` 순으로 직접 토큰을 해석한다.
pub fn resolve_auth_token(cfg: &AuthConfig) -> TokenResolution {
    if let Some(token) = cfg.token.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        return TokenResolution {
            token: Some(token.to_string()),
            source: Some("inline".to_string()),
        };
    }

    let mut hint: Option<String> = None;

    if let Some(env_name) = cfg.token_env.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        match env::var(env_name).ok().map(|v| v.trim().to_string()) {
            Some(v) if !v.is_empty() => {
                return TokenResolution {
                    token: Some(v),
                    source: Some(format!("env:{env_name}")),
                };
            }
            _ => hint = Some(format!("env:{env_name} (missing)")),
        }
    }

    if let Some(cmd) = cfg
        .token_command
        .as_ref()
        .filter(|v| v.iter().any(|s| !s.trim().is_empty()))
    {
        let label = format!("cmd:{}", cmd.join(" "));
        match run_token_command(cmd) {
            Ok(token) if !token.trim().is_empty() => {
                return TokenResolution {
                    token: Some(token.trim().to_string()),
                    source: Some(label),
                };
            }
            Ok(_) => hint = Some(format!("{label} (empty)")),
            Err(err) => {
                tracing::debug!("token command failed: {err:#}");
                hint = Some(format!("{label} (failed)"));
            }
        }
    }

    TokenResolution {
        token: None,
        source: hint,
    }
}

fn run_token_command(cmd: &[String]) -> Result<String> {
    let program = cmd
        .first()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .context("token_command is empty")?;

    let output = Command::new(&program)
        .args(&cmd[1..])
        .output()
        .with_context(|| format!("failed to run token command: {program}"))?;

    if !output.status.success() {
        anyhow::bail!("token command failed: {program} ({})", output.status);
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_token_wins() {
        let cfg = AuthConfig {
            token: Some(" ghp_inline ".to_string()),
            token_env: Some("COMMENTPILOT_TEST_UNUSED".to_string()),
            ..Default::default()
        };
        let resolved = resolve_auth_token(&cfg);
        assert_eq!(resolved.token.as_deref(), Some("ghp_inline"));
        assert_eq!(resolved.source.as_deref(), Some("inline"));
    }

    #[test]
    fn missing_env_is_reported_as_hint() {
        let cfg = AuthConfig {
            token_env: Some("COMMENTPILOT_TEST_TOKEN_THAT_IS_NOT_SET".to_string()),
            ..Default::default()
        };
        let resolved = resolve_auth_token(&cfg);
        assert_eq!(resolved.token, None);
        assert_eq!(
            resolved.source.as_deref(),
            Some("env:COMMENTPILOT_TEST_TOKEN_THAT_IS_NOT_SET (missing)")
        );
    }

    #[test]
    fn nothing_configured_resolves_nothing() {
        let resolved = resolve_auth_token(&AuthConfig::default());
        assert!(resolved.token.is_none());
        assert!(resolved.source.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn token_command_stdout_is_used() {
        let cfg = AuthConfig {
            token_command: Some(vec!["echo".to_string(), "ghp_from_cmd".to_string()]),
            ..Default::default()
        };
        let resolved = resolve_auth_token(&cfg);
        assert_eq!(resolved.token.as_deref(), Some("ghp_from_cmd"));
        assert_eq!(resolved.source.as_deref(), Some("cmd:echo ghp_from_cmd"));
    }
}
