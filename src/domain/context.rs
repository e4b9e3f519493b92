//! 이슈/PR 메타데이터 스냅샷과 컨텍스트 블록 렌더링 규칙.

/// 고정 페이지 상한. 전체 페이지네이션은 하지 않는다.
pub const PAGE_LIMIT: usize = 100;

const GHOST_LOGIN: &str = "ghost";

#[derive(Debug, Clone, Default)]
pub struct CommentSnapshot {
    pub database_id: Option<u64>,
    pub author: Option<String>,
    pub created_at: String,
    pub body: String,
}

#[derive(Debug, Clone, Default)]
pub struct IssueSnapshot {
    pub title: String,
    pub body: String,
    pub author: Option<String>,
    pub created_at: String,
    pub state: String,
    pub comments: Vec<CommentSnapshot>,
}

#[derive(Debug, Clone, Default)]
pub struct CommitSnapshot {
    pub oid: String,
    pub message: String,
    pub author_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FileChange {
    pub path: String,
    pub change_type: String,
    pub additions: u64,
    pub deletions: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewCommentSnapshot {
    pub path: String,
    pub line: Option<u64>,
    pub body: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewSnapshot {
    pub author: Option<String>,
    pub submitted_at: Option<String>,
    pub body: String,
    pub comments: Vec<ReviewCommentSnapshot>,
}

#[derive(Debug, Clone, Default)]
pub struct PullRequestSnapshot {
    pub title: String,
    pub body: String,
    pub author: Option<String>,
    pub created_at: String,
    pub state: String,
    pub base_ref: String,
    pub head_ref: String,
    pub head_oid: String,
    pub additions: u64,
    pub deletions: u64,
    pub total_commits: u64,
    pub commits: Vec<CommitSnapshot>,
    pub files: Vec<FileChange>,
    pub comments: Vec<CommentSnapshot>,
    pub reviews: Vec<ReviewSnapshot>,
}

/// 에이전트에게 넘길 렌더링된 컨텍스트. 실행당 한 번 만들어지고 한 번 소비된다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBundle {
    pub text: String,
    /// 요약 실패 시 기본 커밋 메시지에 쓰인다.
    pub title: String,
    /// PR인 경우에만 채워지는 기존 head 브랜치.
    pub head_ref: Option<String>,
}

/// 이슈 컨텍스트를 고정 순서의 라벨 블록으로 렌더링한다.
/// `excluded_ids`에 포함된 코멘트(상태 코멘트/트리거 코멘트)는 제외한다.
pub fn render_issue_context(issue: &IssueSnapshot, excluded_ids: &[u64]) -> ContextBundle {
    let mut lines = vec![
        "Here is the context for the issue:".to_string(),
        format!("- Title: {}", issue.title),
        format!("- Body: {}", issue.body),
        format!("- Author: {}", login(&issue.author)),
        format!("- Created At: {}", issue.created_at),
        format!("- State: {}", issue.state),
    ];
    push_comments(&mut lines, &issue.comments, excluded_ids);

    ContextBundle {
        text: lines.join("\n"),
        title: issue.title.clone(),
        head_ref: None,
    }
}

/// PR 컨텍스트 렌더링. 선택 섹션(코멘트/커밋/파일/리뷰)은 비어 있으면 생략한다.
pub fn render_pull_request_context(
    pr: &PullRequestSnapshot,
    excluded_ids: &[u64],
) -> ContextBundle {
    let mut lines = vec![
        "Here is the context for the pull request:".to_string(),
        format!("- Title: {}", pr.title),
        format!("- Body: {}", pr.body),
        format!("- Author: {}", login(&pr.author)),
        format!("- Created At: {}", pr.created_at),
        format!("- Base Branch: {}", pr.base_ref),
        format!("- Head Branch: {}", pr.head_ref),
        format!("- Head Commit: {}", pr.head_oid),
        format!("- State: {}", pr.state),
        format!("- Additions: {}", pr.additions),
        format!("- Deletions: {}", pr.deletions),
        format!("- Total Commits: {}", pr.total_commits),
        format!("- Changed Files: {} files", pr.files.len()),
    ];

    push_comments(&mut lines, &pr.comments, excluded_ids);

    if !pr.commits.is_empty() {
        lines.push("- Commits:".to_string());
        for commit in &pr.commits {
            let headline = commit.message.lines().next().unwrap_or_default();
            let author = commit.author_name.as_deref().unwrap_or(GHOST_LOGIN);
            lines.push(format!(
                "  - {} {} ({})",
                short_oid(&commit.oid),
                headline,
                author
            ));
        }
    }

    if !pr.files.is_empty() {
        lines.push("- Changed files:".to_string());
        for file in &pr.files {
            lines.push(format!(
                "  - {} ({}) +{}/-{}",
                file.path, file.change_type, file.additions, file.deletions
            ));
        }
    }

    if !pr.reviews.is_empty() {
        lines.push("- Reviews:".to_string());
        for review in &pr.reviews {
            lines.push(format!(
                "  - {} at {}:",
                login(&review.author),
                review.submitted_at.as_deref().unwrap_or("?")
            ));
            lines.push(format!("    - Review body: {}", review.body));
            if !review.comments.is_empty() {
                lines.push("    - Comments:".to_string());
                for comment in &review.comments {
                    let line = comment
                        .line
                        .map(|l| l.to_string())
                        .unwrap_or_else(|| "?".to_string());
                    lines.push(format!("      - {}:{}: {}", comment.path, line, comment.body));
                }
            }
        }
    }

    ContextBundle {
        text: lines.join("\n"),
        title: pr.title.clone(),
        head_ref: Some(pr.head_ref.clone()),
    }
}

fn push_comments(lines: &mut Vec<String>, comments: &[CommentSnapshot], excluded_ids: &[u64]) {
    let rendered: Vec<String> = comments
        .iter()
        .filter(|c| !is_excluded(c, excluded_ids))
        .map(|c| format!("  - {} at {}: {}", login(&c.author), c.created_at, c.body))
        .collect();

    if !rendered.is_empty() {
        lines.push("- Comments:".to_string());
        lines.extend(rendered);
    }
}

fn is_excluded(comment: &CommentSnapshot, excluded_ids: &[u64]) -> bool {
    comment
        .database_id
        .is_some_and(|id| excluded_ids.contains(&id))
}

fn login(author: &Option<String>) -> &str {
    author.as_deref().unwrap_or(GHOST_LOGIN)
}

fn short_oid(oid: &str) -> &str {
    oid.get(..7).unwrap_or(oid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: u64, author: &str, body: &str) -> CommentSnapshot {
        CommentSnapshot {
            database_id: Some(id),
            author: Some(author.to_string()),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            body: body.to_string(),
        }
    }

    fn issue(comments: Vec<CommentSnapshot>) -> IssueSnapshot {
        IssueSnapshot {
            title: "Typo in README".to_string(),
            body: "The word 'teh' appears twice.".to_string(),
            author: Some("bob".to_string()),
            created_at: "2023-12-31T10:00:00Z".to_string(),
            state: "OPEN".to_string(),
            comments,
        }
    }

    #[test]
    fn issue_context_renders_fixed_order() {
        let bundle = render_issue_context(&issue(vec![comment(5, "carol", "+1")]), &[]);
        assert_eq!(
            bundle.text,
            [
                "Here is the context for the issue:",
                "- Title: Typo in README",
                "- Body: The word 'teh' appears twice.",
                "- Author: bob",
                "- Created At: 2023-12-31T10:00:00Z",
                "- State: OPEN",
                "- Comments:",
                "  - carol at 2024-01-01T00:00:00Z: +1",
            ]
            .join("\n")
        );
        assert_eq!(bundle.title, "Typo in README");
        assert_eq!(bundle.head_ref, None);
    }

    #[test]
    fn issue_context_excludes_own_comments_and_omits_empty_section() {
        let comments = vec![
            comment(10, "opencode-agent", "opencode started..."),
            comment(11, "alice", "hey opencode, fix it"),
        ];
        let bundle = render_issue_context(&issue(comments), &[10, 11]);
        assert!(!bundle.text.contains("- Comments:"));
        assert!(!bundle.text.contains("opencode started"));
        assert!(!bundle.text.contains("hey opencode"));
    }

    #[test]
    fn missing_author_renders_as_ghost() {
        let mut snapshot = issue(Vec::new());
        snapshot.author = None;
        let bundle = render_issue_context(&snapshot, &[]);
        assert!(bundle.text.contains("- Author: ghost"));
    }

    #[test]
    fn pull_request_context_excludes_own_comments() {
        let pr = PullRequestSnapshot {
            title: "Add widget".to_string(),
            head_ref: "feature/widget".to_string(),
            comments: vec![
                comment(20, "opencode-agent", "opencode started..."),
                comment(21, "alice", "hey opencode, address review"),
                comment(22, "dave", "looks close"),
            ],
            ..Default::default()
        };
        let bundle = render_pull_request_context(&pr, &[20, 21]);
        assert!(bundle.text.contains("- Comments:\n  - dave at 2024-01-01T00:00:00Z: looks close"));
        assert!(!bundle.text.contains("opencode started"));
        assert!(!bundle.text.contains("address review"));
        assert_eq!(bundle.head_ref.as_deref(), Some("feature/widget"));
    }

    #[test]
    fn pull_request_context_renders_optional_sections() {
        let pr = PullRequestSnapshot {
            title: "Add widget".to_string(),
            body: "Adds the widget.".to_string(),
            author: Some("erin".to_string()),
            created_at: "2024-02-01T00:00:00Z".to_string(),
            state: "OPEN".to_string(),
            base_ref: "main".to_string(),
            head_ref: "feature/widget".to_string(),
            head_oid: "0123456789abcdef".to_string(),
            additions: 12,
            deletions: 3,
            total_commits: 1,
            commits: vec![CommitSnapshot {
                oid: "0123456789abcdef".to_string(),
                message: "Add widget\n\nLonger description".to_string(),
                author_name: Some("Erin".to_string()),
            }],
            files: vec![FileChange {
                path: "src/widget.rs".to_string(),
                change_type: "ADDED".to_string(),
                additions: 12,
                deletions: 3,
            }],
            comments: Vec::new(),
            reviews: vec![ReviewSnapshot {
                author: Some("frank".to_string()),
                submitted_at: Some("2024-02-02T00:00:00Z".to_string()),
                body: "A couple of nits".to_string(),
                comments: vec![
                    ReviewCommentSnapshot {
                        path: "src/widget.rs".to_string(),
                        line: Some(4),
                        body: "rename this".to_string(),
                    },
                    ReviewCommentSnapshot {
                        path: "src/widget.rs".to_string(),
                        line: None,
                        body: "outdated".to_string(),
                    },
                ],
            }],
        };

        let text = render_pull_request_context(&pr, &[]).text;
        assert!(text.starts_with("Here is the context for the pull request:\n- Title: Add widget"));
        assert!(text.contains("- Base Branch: main\n- Head Branch: feature/widget"));
        assert!(text.contains("- Changed Files: 1 files"));
        assert!(text.contains("- Commits:\n  - 0123456 Add widget (Erin)"));
        assert!(text.contains("- Changed files:\n  - src/widget.rs (ADDED) +12/-3"));
        assert!(text.contains("  - frank at 2024-02-02T00:00:00Z:\n    - Review body: A couple of nits"));
        assert!(text.contains("      - src/widget.rs:4: rename this"));
        assert!(text.contains("      - src/widget.rs:?: outdated"));
        assert!(!text.contains("- Comments:\n  -"));
    }

    #[test]
    fn pull_request_context_omits_empty_sections() {
        let text = render_pull_request_context(&PullRequestSnapshot::default(), &[]).text;
        for section in ["- Comments:", "- Commits:", "- Changed files:", "- Reviews:"] {
            assert!(!text.contains(section), "unexpected section {section}");
        }
    }
}
