//! 적용 중인 설정(탐색 경로, 병합 결과, 토큰 출처)을 확인하는 유스케이스.

use anyhow::{Context, Result};

use crate::application::ports::ConfigRepository;

pub struct InspectConfigUseCase<'a> {
    pub config_repo: &'a dyn ConfigRepository,
}

impl<'a> InspectConfigUseCase<'a> {
    /// 진단 JSON을 만든다. 토큰 값은 포함되지 않는다.
    pub fn execute(&self) -> Result<String> {
        self.config_repo
            .inspect_pretty_json()
            .context("failed to inspect commentpilot config")
    }
}

#[cfg(test)]
mod tests {
    use anyhow::bail;

    use super::*;
    use crate::application::config::Config;

    struct BrokenRepo;

    impl ConfigRepository for BrokenRepo {
        fn load(&self) -> Result<Config> {
            bail!("unused")
        }

        fn inspect_pretty_json(&self) -> Result<String> {
            bail!("failed to parse JSON in /etc/commentpilot/config.json")
        }
    }

    #[test]
    fn repository_error_keeps_its_cause() {
        let err = InspectConfigUseCase {
            config_repo: &BrokenRepo,
        }
        .execute()
        .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.starts_with("failed to inspect commentpilot config"));
        assert!(msg.contains("/etc/commentpilot/config.json"));
    }
}
