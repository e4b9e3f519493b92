//! 적용 설정 진단(inspection) 뷰 모델.

use serde::Serialize;

use super::loader::LoadedConfig;
use super::resolve::resolve_auth_token;
use super::utils::command_exists;
use crate::application::config::{AgentConfig, Config, GitHubEndpoints, GitSettings};

#[derive(Debug, Clone, Serialize)]
pub struct ConfigInspection {
    pub searched_paths: Vec<String>,
    pub loaded_paths: Vec<String>,
    pub agent_config: AgentConfig,
    pub agent: AgentInspection,
    pub auth: AuthInspection,
    pub github: EndpointInspection,
    pub git: GitInspection,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentInspection {
    pub command: String,
    pub args: Vec<String>,
    pub model: Option<String>,
    pub use_stdin: bool,
    pub print_logs: bool,
    pub share: bool,
    pub continue_flag: String,
    pub command_available: bool,
}

/// 토큰 값 자체는 노출하지 않는다.
#[derive(Debug, Clone, Serialize)]
pub struct AuthInspection {
    pub exchange_url: String,
    pub audience: String,
    pub token_source: Option<String>,
    pub token_resolved: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointInspection {
    pub api_base: String,
    pub graphql_url: String,
    pub server_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GitInspection {
    pub user_name: String,
    pub user_email: String,
    pub remote: String,
}

impl ConfigInspection {
    pub(crate) fn from_loaded(loaded: LoadedConfig) -> Self {
        let config = &loaded.config;
        Self {
            searched_paths: display_paths(&loaded.searched_paths),
            loaded_paths: display_paths(&loaded.loaded_paths),
            agent_config: config.agent.clone(),
            agent: AgentInspection::from_config(config),
            auth: AuthInspection::from_config(config),
            github: config.github_endpoints().into(),
            git: config.git_settings().into(),
        }
    }
}

impl AgentInspection {
    fn from_config(config: &Config) -> Self {
        let spec = config.agent_spec();
        let command_available = command_exists(&spec.command);
        Self {
            command: spec.command,
            args: spec.args,
            model: spec.model,
            use_stdin: spec.use_stdin,
            print_logs: spec.print_logs,
            share: spec.share,
            continue_flag: spec.continue_flag,
            command_available,
        }
    }
}

impl AuthInspection {
    fn from_config(config: &Config) -> Self {
        let resolution = resolve_auth_token(&config.auth);
        let token_resolved = resolution.token.is_some();
        // 직접 토큰이 없으면 실행 시 OIDC 교환을 사용한다.
        let token_source = resolution
            .source
            .or_else(|| Some("oidc-exchange".to_string()));
        Self {
            exchange_url: config.auth.exchange_url().to_string(),
            audience: config.auth.audience().to_string(),
            token_source,
            token_resolved,
        }
    }
}

impl From<GitHubEndpoints> for EndpointInspection {
    fn from(endpoints: GitHubEndpoints) -> Self {
        Self {
            api_base: endpoints.api_base,
            graphql_url: endpoints.graphql_url,
            server_url: endpoints.server_url,
        }
    }
}

impl From<GitSettings> for GitInspection {
    fn from(settings: GitSettings) -> Self {
        Self {
            user_name: settings.user_name,
            user_email: settings.user_email,
            remote: settings.remote,
        }
    }
}

fn display_paths(paths: &[std::path::PathBuf]) -> Vec<String> {
    paths.iter().map(|p| p.display().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_token_is_reported_without_value() {
        let mut config = Config::default();
        config.auth.token = Some("ghp_secret".to_string());
        let inspection = ConfigInspection::from_loaded(LoadedConfig {
            config,
            searched_paths: vec!["/tmp/a.json".into()],
            loaded_paths: Vec::new(),
        });

        assert!(inspection.auth.token_resolved);
        assert_eq!(inspection.auth.token_source.as_deref(), Some("inline"));
        let json = serde_json::to_string(&inspection).unwrap();
        assert!(!json.contains("ghp_secret"));
        assert_eq!(inspection.searched_paths, vec!["/tmp/a.json".to_string()]);
    }

    #[test]
    fn missing_token_falls_back_to_exchange() {
        let inspection = ConfigInspection::from_loaded(LoadedConfig {
            config: Config::default(),
            searched_paths: Vec::new(),
            loaded_paths: Vec::new(),
        });
        assert!(!inspection.auth.token_resolved);
        assert_eq!(inspection.auth.token_source.as_deref(), Some("oidc-exchange"));
        assert_eq!(inspection.auth.audience, "opencode-github-action");
        assert_eq!(inspection.agent.command, "opencode");
        assert_eq!(inspection.github.server_url, "https://github.com");
    }
}
