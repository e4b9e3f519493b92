//! 호스팅 게이트웨이 포트 구현 어댑터.

use crate::application::config::GitHubEndpoints;
use crate::application::ports::{HostingFactory, HostingGateway};
use crate::domain::run::Credential;
use crate::domain::trigger::RepoRef;
use crate::infrastructure::hosting::GitHubClient;

/// 실행 대상 이슈/PR에 묶인 GitHub 클라이언트를 만든다.
pub struct GitHubHostingFactory;

impl HostingFactory for GitHubHostingFactory {
    fn build(
        &self,
        repo: &RepoRef,
        number: u64,
        endpoints: &GitHubEndpoints,
        credential: &Credential,
    ) -> Box<dyn HostingGateway> {
        tracing::debug!(
            repo = %repo.slug(),
            number,
            token_source = credential.source(),
            "building github client"
        );
        Box::new(GitHubClient::new(
            repo.clone(),
            number,
            endpoints.clone(),
            credential.secret().to_string(),
        ))
    }
}
