//! 작업 트리 포트 구현 어댑터.

use crate::application::config::GitSettings;
use crate::application::ports::{WorkingTree, WorkingTreeFactory};
use crate::infrastructure::git::GitCli;

/// 현재 디렉터리의 체크아웃을 다루는 git 작업 트리를 만든다.
pub struct GitWorkingTreeFactory;

impl WorkingTreeFactory for GitWorkingTreeFactory {
    fn build(&self, settings: &GitSettings) -> Box<dyn WorkingTree> {
        Box::new(GitCli::new(settings.clone()))
    }
}
