//! 실행 실패 분류 체계.
//!
//! 포트는 `anyhow::Result`를 반환하고, 분류가 필요한 실패는 `RunError`로 만들어
//! `anyhow::Error` 안에 실어 보낸다. 최상위 실패 처리기가 downcast로 분류한다.

use thiserror::Error;

use crate::domain::trigger::EntityKind;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Unsupported event type: {kind}")]
    UnsupportedEvent { kind: String },

    #[error("Command must start with `hey opencode` followed by an instruction")]
    MalformedCommand,

    #[error(
        "Could not fetch an OIDC token. Make sure to add `id-token: write` to your workflow permissions. ({reason})"
    )]
    IdentityUnavailable { reason: String },

    #[error("App token exchange failed: {status} - {message}")]
    TokenExchangeFailed { status: u16, message: String },

    #[error("Failed to check permissions for user {actor}: {reason}")]
    PermissionCheckFailed { actor: String, reason: String },

    #[error("User {actor} does not have write permissions (permission: {permission})")]
    InsufficientPermission { actor: String, permission: String },

    #[error("{kind} #{number} not found")]
    EntityNotFound { kind: EntityKind, number: u64 },

    #[error("{message}")]
    DelegationFailed { message: String },
}

/// 실패 분류 결과. 로그/종료 보고에 사용한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    UnsupportedEvent,
    MalformedCommand,
    IdentityUnavailable,
    TokenExchangeFailed,
    PermissionCheckFailed,
    InsufficientPermission,
    EntityNotFound,
    DelegationFailed,
    Unexpected,
}

impl ErrorClass {
    pub fn code(self) -> &'static str {
        match self {
            Self::UnsupportedEvent => "unsupported_event",
            Self::MalformedCommand => "malformed_command",
            Self::IdentityUnavailable => "identity_unavailable",
            Self::TokenExchangeFailed => "token_exchange_failed",
            Self::PermissionCheckFailed => "permission_check_failed",
            Self::InsufficientPermission => "insufficient_permission",
            Self::EntityNotFound => "entity_not_found",
            Self::DelegationFailed => "delegation_failed",
            Self::Unexpected => "unexpected_error",
        }
    }
}

impl RunError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::UnsupportedEvent { .. } => ErrorClass::UnsupportedEvent,
            Self::MalformedCommand => ErrorClass::MalformedCommand,
            Self::IdentityUnavailable { .. } => ErrorClass::IdentityUnavailable,
            Self::TokenExchangeFailed { .. } => ErrorClass::TokenExchangeFailed,
            Self::PermissionCheckFailed { .. } => ErrorClass::PermissionCheckFailed,
            Self::InsufficientPermission { .. } => ErrorClass::InsufficientPermission,
            Self::EntityNotFound { .. } => ErrorClass::EntityNotFound,
            Self::DelegationFailed { .. } => ErrorClass::DelegationFailed,
        }
    }
}

/// anyhow 체인에서 `RunError`를 찾아 분류한다. 없으면 `Unexpected`.
pub fn classify(err: &anyhow::Error) -> ErrorClass {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<RunError>())
        .map(RunError::class)
        .unwrap_or(ErrorClass::Unexpected)
}

/// 사용자에게 보여줄 실패 메시지.
/// 분류된 실패는 자체 메시지만, 그 외에는 context 체인 전체를 보여준다.
pub fn failure_message(err: &anyhow::Error) -> String {
    match err.chain().find_map(|cause| cause.downcast_ref::<RunError>()) {
        Some(run_error) => run_error.to_string(),
        None => format!("{err:#}"),
    }
}
