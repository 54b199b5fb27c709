//! 토큰 발급/검증 전역 에러 시스템
//!
//! 서명 및 검증 파이프라인의 모든 실패를 하나의 열거형으로 표현합니다.
//! `thiserror`를 사용하여 타입 안전한 에러를 제공하며, 모든 실패는
//! 재시도 없이 호출자에게 그대로 반환됩니다.
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use oauth2_token::errors::TokenError;
//!
//! match parse_token(raw, key.as_ref()) {
//!     Ok(token) => println!("grant: {}", token.grant_id),
//!     Err(TokenError::Expired) => println!("만료된 토큰"),
//!     Err(e) => println!("{} ({})", e, e.oauth2_error_code()),
//! }
//! ```

use thiserror::Error;

/// 토큰 처리 에러 타입
///
/// 검증 상태 머신의 각 단계는 정확히 하나의 변형에 대응합니다.
/// 부분적인 결과는 절대 반환되지 않습니다.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// 세그먼트 분리 또는 디코딩 실패
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// 헤더의 알고리즘이 검증 키의 알고리즘과 다름
    #[error("Unexpected signing algorithm: expected {expected}, found {found}")]
    AlgorithmMismatch { expected: String, found: String },

    /// 서명 불일치
    #[error("Invalid token signature")]
    InvalidSignature,

    /// `exp` 경과
    #[error("Token has expired")]
    Expired,

    /// `nbf` 미도래
    #[error("Token is not valid yet")]
    NotYetValid,

    /// 서명은 유효하지만 클레임 형태가 기대와 다름
    #[error("Invalid token claims: {0}")]
    InvalidClaims(String),

    /// 서명 생성 실패
    #[error("Failed to sign token: {0}")]
    SigningFailure(String),

    /// 키 로딩/생성 실패 또는 키와 알고리즘 불일치
    #[error("Signing key error: {0}")]
    KeyError(String),

    /// 액세스 토큰 자리에 리프레시 토큰이 온 경우 등
    #[error("Unexpected token kind: expected {expected}, found {found}")]
    UnexpectedTokenKind { expected: String, found: String },

    /// 회전 카운터가 그랜트의 현재 값과 다름 (이미 사용된 리프레시 토큰)
    #[error("Refresh token was already used")]
    RefreshTokenReused,

    /// 설정 값 오류
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TokenError {
    /// 호출자가 응답할 OAuth2 에러 코드를 반환합니다.
    ///
    /// | TokenError | OAuth2 error |
    /// |------------|--------------|
    /// | `MalformedToken` | `invalid_request` |
    /// | 검증/클레임 실패 | `invalid_grant` |
    /// | `SigningFailure`, `KeyError`, `Config` | `server_error` |
    pub fn oauth2_error_code(&self) -> &'static str {
        match self {
            TokenError::MalformedToken(_) => "invalid_request",
            TokenError::AlgorithmMismatch { .. }
            | TokenError::InvalidSignature
            | TokenError::Expired
            | TokenError::NotYetValid
            | TokenError::InvalidClaims(_)
            | TokenError::UnexpectedTokenKind { .. }
            | TokenError::RefreshTokenReused => "invalid_grant",
            TokenError::SigningFailure(_) | TokenError::KeyError(_) | TokenError::Config(_) => {
                "server_error"
            }
        }
    }
}

/// 편의성을 위한 Result 타입 별칭
pub type TokenResult<T> = Result<T, TokenError>;

/// 외부 라이브러리 에러를 `TokenError::KeyError`로 변환하는 확장 trait
pub trait ErrorContext<T> {
    /// 컨텍스트 정보와 함께 에러를 변환합니다.
    fn context(self, msg: &str) -> TokenResult<T>;

    /// 클로저를 사용하여 지연 평가된 컨텍스트를 제공합니다.
    fn with_context<F>(self, f: F) -> TokenResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> TokenResult<T> {
        self.map_err(|e| TokenError::KeyError(format!("{}: {}", msg, e)))
    }

    fn with_context<F>(self, f: F) -> TokenResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| TokenError::KeyError(format!("{}: {}", f(), e)))
    }
}
