//! 에이전트 포트 구현 어댑터.

use anyhow::Result;

use crate::application::config::AgentCommandSpec;
use crate::application::ports::{AgentFactory, GenerationAgent};
use crate::domain::error::RunError;
use crate::infrastructure::agent::CommandAgent;
use crate::infrastructure::config::command_exists;

/// 명령이 실제로 존재할 때만 에이전트를 구성한다.
pub struct CommandAgentFactory;

impl AgentFactory for CommandAgentFactory {
    fn build(&self, spec: &AgentCommandSpec) -> Result<Box<dyn GenerationAgent>> {
        if !command_exists(&spec.command) {
            return Err(RunError::DelegationFailed {
                message: format!("agent command not found in PATH: '{}'", spec.command),
            }
            .into());
        }
        Ok(Box::new(CommandAgent::new(spec.clone())))
    }
}
