//! 애플리케이션이 사용하는 설정 스키마(순수 데이터).
//!
//! 주의: 파일/환경변수/프로세스 접근은 `infrastructure`에서만 수행한다.

use serde::{Deserialize, Serialize};

pub const DEFAULT_AGENT_COMMAND: &str = "opencode";
pub const DEFAULT_CONTINUE_FLAG: &str = "--continue";
pub const DEFAULT_EXCHANGE_URL: &str = "https://api.frank.dev.opencode.ai/exchange_github_app_token";
pub const DEFAULT_OIDC_AUDIENCE: &str = "opencode-github-action";
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_SERVER_URL: &str = "https://github.com";
pub const DEFAULT_GIT_USER_NAME: &str = "opencode";
pub const DEFAULT_GIT_USER_EMAIL: &str = "runner@opencode.ai";
pub const DEFAULT_GIT_REMOTE: &str = "origin";

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// 코드 생성 에이전트 실행 설정
    #[serde(default)]
    pub agent: AgentConfig,
    /// 토큰 교환/직접 토큰 설정
    #[serde(default)]
    pub auth: AuthConfig,
    /// GitHub 엔드포인트 설정
    #[serde(default)]
    pub github: GitHubConfig,
    /// 커밋 작성자/원격 설정
    #[serde(default)]
    pub git: GitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AgentConfig {
    /// 실행할 로컬 명령(기본 opencode)
    pub command: Option<String>,
    /// 명령 인자(기본 ["run"]). `{prompt}` 치환 지원
    pub args: Option<Vec<String>>,
    /// 모델 식별자. 환경변수 MODEL/INPUT_MODEL이 우선한다
    pub model: Option<String>,
    /// 프롬프트를 stdin으로 전달할지 여부(기본 true)
    pub use_stdin: Option<bool>,
    /// `--print-logs` 전달 여부(기본 true)
    pub print_logs: Option<bool>,
    /// `--share` 전달 및 공유 링크 추출 여부(기본 false)
    pub share: Option<bool>,
    /// 세션 이어가기 플래그(기본 --continue)
    pub continue_flag: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AuthConfig {
    /// OIDC 토큰 교환 엔드포인트
    pub exchange_url: Option<String>,
    /// OIDC audience
    pub audience: Option<String>,
    /// 고정 토큰(민감정보: 권장하지 않음). 설정되면 교환을 건너뛴다
    pub token: Option<String>,
    /// 토큰을 읽을 환경변수 이름
    pub token_env: Option<String>,
    /// 토큰을 stdout으로 출력하는 커맨드(예: ["gh","auth","token"])
    pub token_command: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct GitHubConfig {
    /// REST API base URL (GITHUB_API_URL)
    pub api_base: Option<String>,
    /// GraphQL endpoint (GITHUB_GRAPHQL_URL)
    pub graphql_url: Option<String>,
    /// 웹 서버 URL, 실행 링크 생성용 (GITHUB_SERVER_URL)
    pub server_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct GitConfig {
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub remote: Option<String>,
}

/// 정규화된 에이전트 실행 사양.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentCommandSpec {
    pub command: String,
    pub args: Vec<String>,
    pub model: Option<String>,
    pub use_stdin: bool,
    pub print_logs: bool,
    pub share: bool,
    pub continue_flag: String,
}

/// 정규화된 GitHub 엔드포인트.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubEndpoints {
    pub api_base: String,
    pub graphql_url: String,
    pub server_url: String,
}

/// 정규화된 git 작업 설정.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitSettings {
    pub user_name: String,
    pub user_email: String,
    pub remote: String,
}

impl Config {
    pub fn agent_spec(&self) -> AgentCommandSpec {
        let agent = &self.agent;
        AgentCommandSpec {
            command: agent
                .command
                .clone()
                .unwrap_or_else(|| DEFAULT_AGENT_COMMAND.to_string()),
            args: agent
                .args
                .clone()
                .unwrap_or_else(|| vec!["run".to_string()]),
            model: agent
                .model
                .clone()
                .filter(|m| !m.trim().is_empty()),
            use_stdin: agent.use_stdin.unwrap_or(true),
            print_logs: agent.print_logs.unwrap_or(true),
            share: agent.share.unwrap_or(false),
            continue_flag: agent
                .continue_flag
                .clone()
                .unwrap_or_else(|| DEFAULT_CONTINUE_FLAG.to_string()),
        }
    }

    pub fn github_endpoints(&self) -> GitHubEndpoints {
        let api_base = self
            .github
            .api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
            .to_string();
        let graphql_url = self
            .github
            .graphql_url
            .clone()
            .unwrap_or_else(|| default_graphql_url(&api_base));
        let server_url = self
            .github
            .server_url
            .as_deref()
            .unwrap_or(DEFAULT_SERVER_URL)
            .trim_end_matches('/')
            .to_string();

        GitHubEndpoints {
            api_base,
            graphql_url,
            server_url,
        }
    }

    pub fn git_settings(&self) -> GitSettings {
        GitSettings {
            user_name: self
                .git
                .user_name
                .clone()
                .unwrap_or_else(|| DEFAULT_GIT_USER_NAME.to_string()),
            user_email: self
                .git
                .user_email
                .clone()
                .unwrap_or_else(|| DEFAULT_GIT_USER_EMAIL.to_string()),
            remote: self
                .git
                .remote
                .clone()
                .unwrap_or_else(|| DEFAULT_GIT_REMOTE.to_string()),
        }
    }

    /// 후순위(나중 파일) 값으로 덮어쓰는 병합 규칙.
    pub fn merge_from(&mut self, other: Config) {
        self.agent.merge_from(other.agent);
        self.auth.merge_from(other.auth);
        self.github.merge_from(other.github);
        self.git.merge_from(other.git);
    }
}

impl AuthConfig {
    pub fn exchange_url(&self) -> &str {
        self.exchange_url.as_deref().unwrap_or(DEFAULT_EXCHANGE_URL)
    }

    pub fn audience(&self) -> &str {
        self.audience.as_deref().unwrap_or(DEFAULT_OIDC_AUDIENCE)
    }

    pub fn merge_from(&mut self, other: AuthConfig) {
        merge_opt(&mut self.exchange_url, other.exchange_url);
        merge_opt(&mut self.audience, other.audience);
        merge_opt(&mut self.token, other.token);
        merge_opt(&mut self.token_env, other.token_env);
        merge_opt(&mut self.token_command, other.token_command);
    }
}

impl AgentConfig {
    pub fn merge_from(&mut self, other: AgentConfig) {
        merge_opt(&mut self.command, other.command);
        merge_opt(&mut self.args, other.args);
        merge_opt(&mut self.model, other.model);
        merge_opt(&mut self.use_stdin, other.use_stdin);
        merge_opt(&mut self.print_logs, other.print_logs);
        merge_opt(&mut self.share, other.share);
        merge_opt(&mut self.continue_flag, other.continue_flag);
    }
}

impl GitHubConfig {
    pub fn merge_from(&mut self, other: GitHubConfig) {
        merge_opt(&mut self.api_base, other.api_base);
        merge_opt(&mut self.graphql_url, other.graphql_url);
        merge_opt(&mut self.server_url, other.server_url);
    }
}

impl GitConfig {
    pub fn merge_from(&mut self, other: GitConfig) {
        merge_opt(&mut self.user_name, other.user_name);
        merge_opt(&mut self.user_email, other.user_email);
        merge_opt(&mut self.remote, other.remote);
    }
}

/// GitHub Enterprise Server는 REST가 `/api/v3`, GraphQL이 `/api/graphql`이다.
fn default_graphql_url(api_base: &str) -> String {
    match api_base.strip_suffix("/api/v3") {
        Some(host) => format!("{host}/api/graphql"),
        None => format!("{api_base}/graphql"),
    }
}

fn merge_opt<T>(target: &mut Option<T>, incoming: Option<T>) {
    if incoming.is_some() {
        *target = incoming;
    }
}
