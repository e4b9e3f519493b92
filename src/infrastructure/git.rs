//! 체크아웃된 작업 트리를 `git` CLI로 조작한다.

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use tokio::process::Command;

use crate::application::config::GitSettings;
use crate::application::ports::WorkingTree;

pub struct GitCli {
    settings: GitSettings,
    workdir: Option<PathBuf>,
}

impl GitCli {
    /// 현재 작업 디렉터리(체크아웃 루트)를 대상으로 한다.
    pub fn new(settings: GitSettings) -> Self {
        Self {
            settings,
            workdir: None,
        }
    }

    pub fn with_workdir(settings: GitSettings, workdir: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            workdir: Some(workdir.into()),
        }
    }

    async fn git(&self, args: &[&str]) -> Result<String> {
        tracing::debug!("git {}", args.join(" "));
        let mut cmd = Command::new("git");
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .await
            .with_context(|| format!("failed to run git {}", args.join(" ")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "git {} failed ({}): {}",
                args.join(" "),
                output.status,
                stderr.trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// 커밋 작성자를 저장소 로컬 설정으로 지정한다.
    async fn configure_identity(&self) -> Result<()> {
        self.git(&["config", "user.name", self.settings.user_name.as_str()])
            .await?;
        self.git(&["config", "user.email", self.settings.user_email.as_str()])
            .await?;
        Ok(())
    }
}

#[async_trait]
impl WorkingTree for GitCli {
    async fn is_dirty(&self) -> Result<bool> {
        let porcelain = self.git(&["status", "--porcelain"]).await?;
        Ok(porcelain_is_dirty(&porcelain))
    }

    async fn checkout_existing(&self, branch: &str) -> Result<()> {
        self.git(&["fetch", self.settings.remote.as_str(), "--depth=1", branch])
            .await?;
        self.git(&["checkout", branch]).await?;
        Ok(())
    }

    async fn create_branch(&self, branch: &str) -> Result<()> {
        self.git(&["checkout", "-b", branch]).await?;
        Ok(())
    }

    async fn commit_all(&self, message: &str) -> Result<()> {
        self.configure_identity().await?;
        self.git(&["add", "."]).await?;
        self.git(&["commit", "-m", message]).await?;
        Ok(())
    }

    async fn push(&self, branch: &str, set_upstream: bool) -> Result<()> {
        let remote = self.settings.remote.as_str();
        if set_upstream {
            self.git(&["push", "-u", remote, branch]).await?;
        } else {
            self.git(&["push", remote, branch]).await?;
        }
        Ok(())
    }
}

/// `status --porcelain` 출력에 항목이 하나라도 있으면 변경된 것으로 본다.
pub fn porcelain_is_dirty(porcelain: &str) -> bool {
    porcelain.lines().any(|line| !line.trim().is_empty())
}
