//! Infrastructure layer
//! 외부 시스템(API/CLI/파일시스템)과 직접 통신하는 구현체 집합.

pub mod adapters;
pub mod agent;
pub mod auth;
pub mod config;
pub mod event;
pub mod git;
pub mod hosting;
pub mod render;
