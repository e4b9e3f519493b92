//! 이슈 트래커 호스팅(GitHub REST + GraphQL) 연동.

mod github;
mod graphql;

pub use github::GitHubClient;
