//! 상태 코멘트용 Markdown 렌더링 모듈.

/// 상태 텍스트 아래에 공유 세션/실행 링크 푸터를 붙인다.
pub fn render_status_markdown(text: &str, run_url: &str, share_url: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str(text.trim_end());
    out.push_str("\n\n");
    out.push_str(&render_footer(run_url, share_url));
    out
}

/// `[shared session](..) | [view run](..)` 형태의 푸터. 공유 링크는 있을 때만.
pub fn render_footer(run_url: &str, share_url: Option<&str>) -> String {
    let mut footer = String::new();
    if let Some(share) = share_url.map(str::trim).filter(|s| !s.is_empty()) {
        footer.push_str(&format!("[shared session]({share}) | "));
    }
    footer.push_str(&format!("[view run]({run_url})"));
    footer
}
