//! Interface layer
//! 프로세스 입력(CLI 인자)을 유스케이스 호출로 연결한다.

pub mod cli;
