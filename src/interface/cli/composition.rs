//! 애플리케이션 조립(composition root) 모듈.

use crate::application::usecases::inspect_config::InspectConfigUseCase;
use crate::application::usecases::run_agent::RunAgentUseCase;
use crate::infrastructure::adapters::{
    CommandAgentFactory, ConsoleReporter, GitHubHostingFactory, GitWorkingTreeFactory,
    JsonConfigRepository, MarkdownRendererAdapter, SystemClock,
};
use crate::infrastructure::auth::OidcCredentialIssuer;
use crate::infrastructure::event::GitHubEventSource;

/// 실행 시점 의존성을 한 곳에서 조립하는 컨테이너.
pub struct AppComposition {
    config_repo: JsonConfigRepository,
    event_source: GitHubEventSource,
    credential_issuer: OidcCredentialIssuer,
    hosting_factory: GitHubHostingFactory,
    agent_factory: CommandAgentFactory,
    working_tree_factory: GitWorkingTreeFactory,
    renderer: MarkdownRendererAdapter,
    reporter: ConsoleReporter,
    clock: SystemClock,
}

impl Default for AppComposition {
    fn default() -> Self {
        Self {
            config_repo: JsonConfigRepository,
            event_source: GitHubEventSource,
            credential_issuer: OidcCredentialIssuer::from_env(),
            hosting_factory: GitHubHostingFactory,
            agent_factory: CommandAgentFactory,
            working_tree_factory: GitWorkingTreeFactory,
            renderer: MarkdownRendererAdapter,
            reporter: ConsoleReporter::new(),
            clock: SystemClock,
        }
    }
}

impl AppComposition {
    /// 설정 점검 유스케이스를 생성한다.
    pub fn inspect_config_usecase(&self) -> InspectConfigUseCase<'_> {
        InspectConfigUseCase {
            config_repo: &self.config_repo,
        }
    }

    /// 코멘트 트리거 실행 유스케이스를 생성한다.
    pub fn run_agent_usecase(&self) -> RunAgentUseCase<'_> {
        RunAgentUseCase {
            config_repo: &self.config_repo,
            event_source: &self.event_source,
            credential_issuer: &self.credential_issuer,
            hosting_factory: &self.hosting_factory,
            agent_factory: &self.agent_factory,
            working_tree_factory: &self.working_tree_factory,
            renderer: &self.renderer,
            reporter: &self.reporter,
            clock: &self.clock,
        }
    }
}
