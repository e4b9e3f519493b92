//! 상태 코멘트(Status Reporter) 관리.
//! 실행당 하나의 코멘트를 만들고, 모든 갱신은 본문 전체 교체로 수행한다.

use anyhow::Result;

use crate::application::ports::{HostingGateway, StatusRenderer};
use crate::domain::run::StatusComment;

pub(super) struct StatusReporter<'a> {
    pub hosting: &'a dyn HostingGateway,
    pub renderer: &'a dyn StatusRenderer,
    pub run_url: String,
}

impl StatusReporter<'_> {
    /// 상태 코멘트를 생성한다. 권한 확인 이후 실행당 한 번만 호출된다.
    pub async fn open(&self, initial_text: &str) -> Result<StatusComment> {
        let body = self
            .renderer
            .render_status(initial_text, &self.run_url, None);
        let created = self.hosting.create_comment(&body).await?;
        Ok(StatusComment { id: created.id })
    }

    /// 본문 전체를 최신 텍스트로 교체한다. 여러 번 호출해도 누적되지 않는다.
    pub async fn close(
        &self,
        status: &StatusComment,
        final_text: &str,
        share_url: Option<&str>,
    ) -> Result<()> {
        let body = self
            .renderer
            .render_status(final_text, &self.run_url, share_url);
        self.hosting.update_comment(status.id, &body).await?;
        Ok(())
    }
}
