//! 상태 코멘트 렌더링 포트 구현 어댑터.

use crate::application::ports::StatusRenderer;
use crate::infrastructure::render;

/// 마크다운 렌더링 어댑터.
pub struct MarkdownRendererAdapter;

impl StatusRenderer for MarkdownRendererAdapter {
    fn render_status(&self, text: &str, run_url: &str, share_url: Option<&str>) -> String {
        render::render_status_markdown(text, run_url, share_url)
    }
}
