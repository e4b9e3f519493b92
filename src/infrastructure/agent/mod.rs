//! 로컬 코드 생성 에이전트(opencode CLI) 실행.

mod command_runner;

use anyhow::Result;
use async_trait::async_trait;

use crate::application::config::AgentCommandSpec;
use crate::application::ports::GenerationAgent;
use crate::domain::run::{AgentResponse, SessionMode};

pub use command_runner::{extract_share_url, invocation_args};

/// 실행 사양에 따라 에이전트 명령을 호출하는 구현체.
pub struct CommandAgent {
    spec: AgentCommandSpec,
}

impl CommandAgent {
    pub fn new(spec: AgentCommandSpec) -> Self {
        Self { spec }
    }
}

#[async_trait]
impl GenerationAgent for CommandAgent {
    async fn invoke(&self, prompt: &str, mode: SessionMode) -> Result<AgentResponse> {
        tracing::debug!(
            command = %self.spec.command,
            ?mode,
            prompt_chars = prompt.chars().count(),
            "invoking agent"
        );
        command_runner::run_agent_command(&self.spec, prompt, mode).await
    }
}
