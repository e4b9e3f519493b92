//! Domain layer
//! 트리거 해석, 컨텍스트 렌더링, 브랜치/요약 규칙을 외부 시스템 없이 표현한다.

pub mod context;
pub mod error;
pub mod policy;
pub mod run;
pub mod trigger;
