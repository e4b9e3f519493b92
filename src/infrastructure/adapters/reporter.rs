//! 콘솔 리포터 포트 구현 어댑터.

use std::env;
use std::io::{self, IsTerminal};

use crate::application::ports::Reporter;

/// 콘솔 전용 리포터 어댑터.
pub struct ConsoleReporter {
    interactive: bool,
    github_actions: bool,
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleReporter {
    /// stderr가 TTY이면 색상을, Actions 러너이면 워크플로 명령을 사용한다.
    pub fn new() -> Self {
        Self {
            interactive: io::stderr().is_terminal(),
            github_actions: env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true"),
        }
    }
}

impl Reporter for ConsoleReporter {
    fn section(&self, name: &str) {
        println!();
        println!("==================== {} ====================", name);
    }

    fn kv(&self, key: &str, value: &str) {
        println!("{:<12}: {}", key, value);
    }

    fn status(&self, scope: &str, message: &str) {
        println!("[{:<12}] {}", scope, message);
    }

    fn failure(&self, message: &str) {
        if self.github_actions {
            // 러너가 어노테이션으로 표시한다.
            println!("::error::{}", escape_workflow_data(message));
        } else if self.interactive {
            eprintln!("\x1b[31merror\x1b[0m: {message}");
        } else {
            eprintln!("error: {message}");
        }
    }
}

/// 워크플로 명령 데이터 규칙(`%`, CR, LF 인코딩).
fn escape_workflow_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_data_is_escaped() {
        assert_eq!(
            escape_workflow_data("100% broken\nline two"),
            "100%25 broken%0Aline two"
        );
    }
}
