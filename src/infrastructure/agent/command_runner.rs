//! 에이전트 CLI 실행기.

use std::io::ErrorKind;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::application::config::AgentCommandSpec;
use crate::domain::error::RunError;
use crate::domain::run::{AgentResponse, SessionMode};

/// 실패 메시지에 남길 stderr 최대 줄 수.
const STDERR_TAIL_LINES: usize = 40;

/// 최종 실행 인자를 구성한다.
/// 순서: 설정 args -> `-m model` -> `--print-logs` -> `--share` -> 이어가기 플래그 -> (stdin 미사용 시) 프롬프트.
pub fn invocation_args(spec: &AgentCommandSpec, prompt: &str, mode: SessionMode) -> Vec<String> {
    let mut args = Vec::new();
    let mut prompt_in_args = false;
    for arg in &spec.args {
        if arg.contains("{prompt}") {
            prompt_in_args = true;
            args.push(arg.replace("{prompt}", prompt));
        } else {
            args.push(arg.clone());
        }
    }

    if let Some(model) = &spec.model {
        args.push("-m".to_string());
        args.push(model.clone());
    }
    if spec.print_logs {
        args.push("--print-logs".to_string());
    }
    if spec.share {
        args.push("--share".to_string());
    }
    if mode == SessionMode::Continue && !spec.continue_flag.trim().is_empty() {
        args.push(spec.continue_flag.clone());
    }

    if !spec.use_stdin && !prompt_in_args {
        args.push(prompt.to_string());
    }
    args
}

/// 에이전트를 한 번 실행한다. 내부 타임아웃은 없다.
pub(super) async fn run_agent_command(
    spec: &AgentCommandSpec,
    prompt: &str,
    mode: SessionMode,
) -> Result<AgentResponse> {
    let args = invocation_args(spec, prompt, mode);

    let mut cmd = Command::new(&spec.command);
    cmd.args(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if spec.use_stdin {
        cmd.stdin(Stdio::piped());
    } else {
        cmd.stdin(Stdio::null());
    }

    let mut child = cmd.spawn().map_err(|err| RunError::DelegationFailed {
        message: format!("failed to spawn agent command '{}': {err}", spec.command),
    })?;

    // 프롬프트 쓰기는 출력 수집과 동시에 진행한다.
    let writer = if spec.use_stdin {
        let mut stdin = child
            .stdin
            .take()
            .context("failed to open agent command stdin")?;
        let payload = prompt.as_bytes().to_vec();
        Some(tokio::spawn(async move {
            let result = stdin.write_all(&payload).await;
            drop(stdin);
            result
        }))
    } else {
        None
    };

    let output = child
        .wait_with_output()
        .await
        .context("agent command execution failed")?;

    if let Some(writer) = writer {
        match writer.await.context("agent stdin writer task failed")? {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::BrokenPipe => {
                debug!("agent command closed stdin before reading the whole prompt");
            }
            Err(err) => {
                return Err(err).context("failed to write prompt to agent command stdin");
            }
        }
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    if !output.status.success() {
        let message = if stderr.is_empty() {
            format!("{} exited with {}", spec.command, output.status)
        } else {
            tail_lines(&stderr, STDERR_TAIL_LINES)
        };
        return Err(RunError::DelegationFailed { message }.into());
    }

    // 공유 링크는 로그(stderr)에서만 찾는다. stdout은 응답 본문이다.
    let share_url = if spec.share {
        extract_share_url(&stderr)
    } else {
        None
    };

    Ok(AgentResponse {
        text: stdout,
        share_url,
    })
}

/// "share"를 언급하는 줄에서 첫 `https://` 링크를 찾는다.
pub fn extract_share_url(output: &str) -> Option<String> {
    output
        .lines()
        .filter(|line| line.to_lowercase().contains("share"))
        .find_map(|line| {
            let start = line.find("https://")?;
            let url: String = line[start..]
                .chars()
                .take_while(|c| !c.is_whitespace() && !matches!(c, ')' | ']' | '"' | '\'' | '>'))
                .collect();
            Some(url)
        })
}

fn tail_lines(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(command: &str, args: &[&str]) -> AgentCommandSpec {
        AgentCommandSpec {
            command: command.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            model: None,
            use_stdin: true,
            print_logs: false,
            share: false,
            continue_flag: "--continue".to_string(),
        }
    }

    #[test]
    fn args_follow_flag_order() {
        let mut s = spec("opencode", &["run"]);
        s.model = Some("anthropic/claude-sonnet".to_string());
        s.print_logs = true;
        s.share = true;

        assert_eq!(
            invocation_args(&s, "fix it", SessionMode::Continue),
            vec![
                "run",
                "-m",
                "anthropic/claude-sonnet",
                "--print-logs",
                "--share",
                "--continue"
            ]
        );
        assert_eq!(
            invocation_args(&s, "fix it", SessionMode::Fresh),
            vec!["run", "-m", "anthropic/claude-sonnet", "--print-logs", "--share"]
        );
    }

    #[test]
    fn prompt_goes_to_args_when_stdin_is_off() {
        let mut s = spec("opencode", &["run"]);
        s.use_stdin = false;
        assert_eq!(
            invocation_args(&s, "fix it", SessionMode::Fresh),
            vec!["run", "fix it"]
        );

        let placeholder = spec("opencode", &["run", "--message={prompt}"]);
        assert_eq!(
            invocation_args(&placeholder, "fix it", SessionMode::Fresh),
            vec!["run", "--message=fix it"]
        );
    }

    #[test]
    fn share_url_is_taken_from_share_line_only() {
        let out = "see https://docs.example.com\nShared session: https://opencode.ai/s/abc123).\n";
        assert_eq!(
            extract_share_url(out).as_deref(),
            Some("https://opencode.ai/s/abc123")
        );
        assert_eq!(extract_share_url("nothing here https://x.dev"), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stdin_prompt_is_echoed_back() {
        let response = run_agent_command(&spec("cat", &[]), "  hello agent  ", SessionMode::Fresh)
            .await
            .unwrap();
        assert_eq!(response.text, "hello agent");
        assert_eq!(response.share_url, None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_delegation_failure_with_stderr() {
        let s = spec("sh", &["-c", "echo boom >&2; exit 3"]);
        let err = run_agent_command(&s, "", SessionMode::Fresh)
            .await
            .unwrap_err();
        match err.downcast_ref::<RunError>() {
            Some(RunError::DelegationFailed { message }) => assert_eq!(message, "boom"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn silent_failure_reports_exit_status() {
        let s = spec("sh", &["-c", "exit 4"]);
        let err = run_agent_command(&s, "", SessionMode::Fresh)
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("sh exited with"), "{msg}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn share_url_is_extracted_when_enabled() {
        let mut s = spec(
            "sh",
            &["-c", "echo 'done'; echo 'share: https://opencode.ai/s/xyz' >&2"],
        );
        s.share = true;
        // sh -c 뒤 추가 인자는 $0이 되므로 출력에 영향이 없다.
        let response = run_agent_command(&s, "", SessionMode::Fresh).await.unwrap();
        assert_eq!(response.text, "done");
        assert_eq!(response.share_url.as_deref(), Some("https://opencode.ai/s/xyz"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn share_mention_in_response_is_not_a_session_link() {
        let mut s = spec(
            "sh",
            &["-c", "echo 'I fixed the share button, see https://example.com/docs'"],
        );
        s.share = true;
        let response = run_agent_command(&s, "", SessionMode::Fresh).await.unwrap();
        assert_eq!(
            response.text,
            "I fixed the share button, see https://example.com/docs"
        );
        assert_eq!(response.share_url, None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn large_prompt_does_not_block_on_noisy_stderr() {
        let s = spec(
            "sh",
            &[
                "-c",
                "head -c 200000 /dev/zero | tr '\\0' x >&2; cat >/dev/null; echo ok",
            ],
        );
        let prompt = "p".repeat(200_000);
        let response = tokio::time::timeout(
            std::time::Duration::from_secs(10),
            run_agent_command(&s, &prompt, SessionMode::Fresh),
        )
        .await
        .expect("agent invocation deadlocked")
        .unwrap();
        assert_eq!(response.text, "ok");
    }
}
