//! 애플리케이션 계층이 의존하는 포트(추상 인터페이스) 모음.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::application::config::{
    AgentCommandSpec, AuthConfig, Config, GitHubEndpoints, GitSettings,
};
use crate::domain::context::{IssueSnapshot, PullRequestSnapshot};
use crate::domain::run::{
    AgentResponse, Credential, NewPullRequest, RemoteComment, RunEnvironment, RunOptions,
    SessionMode,
};
use crate::domain::trigger::RepoRef;

/// 설정 로딩/점검을 담당하는 저장소 포트.
pub trait ConfigRepository: Send + Sync {
    fn load(&self) -> Result<Config>;
    fn inspect_pretty_json(&self) -> Result<String>;
}

/// 트리거 이벤트(웹훅 페이로드 + 실행 환경)를 읽어오는 포트.
pub trait EventSource: Send + Sync {
    fn load(&self, options: &RunOptions) -> Result<RunEnvironment>;
}

/// 플랫폼 신원 증명을 범위 한정 접근 토큰으로 바꾸는 포트.
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    async fn issue(&self, auth: &AuthConfig) -> Result<Credential>;
}

/// 이슈 트래커/호스팅 API 추상화 포트. 하나의 이슈/PR 번호에 묶인다.
#[async_trait]
pub trait HostingGateway: Send + Sync {
    /// 협업자 권한 수준(admin/write/read/none ...)
    async fn collaborator_permission(&self, actor: &str) -> Result<String>;
    async fn create_comment(&self, body: &str) -> Result<RemoteComment>;
    /// 본문 전체를 교체한다.
    async fn update_comment(&self, comment_id: u64, body: &str) -> Result<RemoteComment>;
    /// 대상이 더 이상 존재하지 않으면 `None`.
    async fn fetch_issue(&self) -> Result<Option<IssueSnapshot>>;
    /// 대상이 더 이상 존재하지 않으면 `None`.
    async fn fetch_pull_request(&self) -> Result<Option<PullRequestSnapshot>>;
    async fn default_branch(&self) -> Result<String>;
    /// 생성된 PR 번호를 돌려준다.
    async fn create_pull_request(&self, request: &NewPullRequest) -> Result<u64>;
}

/// 저장소/대상/자격증명에 맞는 호스팅 게이트웨이를 생성하는 팩토리 포트.
pub trait HostingFactory: Send + Sync {
    fn build(
        &self,
        repo: &RepoRef,
        number: u64,
        endpoints: &GitHubEndpoints,
        credential: &Credential,
    ) -> Box<dyn HostingGateway>;
}

/// 외부 코드 생성 에이전트 실행 포트.
#[async_trait]
pub trait GenerationAgent: Send + Sync {
    async fn invoke(&self, prompt: &str, mode: SessionMode) -> Result<AgentResponse>;
}

/// 실행 사양으로 에이전트를 구성하는 팩토리 포트.
pub trait AgentFactory: Send + Sync {
    fn build(&self, spec: &AgentCommandSpec) -> Result<Box<dyn GenerationAgent>>;
}

/// 체크아웃된 작업 트리(git) 추상화 포트.
#[async_trait]
pub trait WorkingTree: Send + Sync {
    /// `status --porcelain` 결과가 비어 있지 않으면 true.
    async fn is_dirty(&self) -> Result<bool>;
    /// 원격 브랜치를 가져와 체크아웃한다(PR head).
    async fn checkout_existing(&self, branch: &str) -> Result<()>;
    /// 현재 HEAD에서 새 브랜치를 만들고 체크아웃한다.
    async fn create_branch(&self, branch: &str) -> Result<()>;
    /// 모든 변경을 스테이징하고 커밋한다.
    async fn commit_all(&self, message: &str) -> Result<()>;
    /// 브랜치를 원격으로 푸시한다. 새 브랜치는 upstream을 설정한다.
    async fn push(&self, branch: &str, set_upstream: bool) -> Result<()>;
}

pub trait WorkingTreeFactory: Send + Sync {
    fn build(&self, settings: &GitSettings) -> Box<dyn WorkingTree>;
}

/// 상태 코멘트 Markdown 렌더링 포트.
pub trait StatusRenderer: Send + Sync {
    fn render_status(&self, text: &str, run_url: &str, share_url: Option<&str>) -> String;
}

/// 브랜치 타임스탬프용 시계.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

/// 콘솔/로그 출력 추상화 포트.
pub trait Reporter: Send + Sync {
    fn section(&self, name: &str);
    fn kv(&self, key: &str, value: &str);
    fn status(&self, scope: &str, message: &str);
    /// 플랫폼 실패 보고 채널로 최종 실패를 알린다.
    fn failure(&self, message: &str);
}
