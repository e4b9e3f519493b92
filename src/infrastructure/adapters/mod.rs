//! 애플리케이션 포트를 실제 인프라 구현체로 연결하는 어댑터 계층.

mod agent_factory;
mod clock;
mod config_repository;
mod hosting_factory;
mod markdown_renderer;
mod reporter;
mod working_tree_factory;

pub use agent_factory::CommandAgentFactory;
pub use clock::SystemClock;
pub use config_repository::JsonConfigRepository;
pub use hosting_factory::GitHubHostingFactory;
pub use markdown_renderer::MarkdownRendererAdapter;
pub use reporter::ConsoleReporter;
pub use working_tree_factory::GitWorkingTreeFactory;
