//! 토큰 서명 및 검증 서비스 모듈
//!
//! 서명 키 기능, JWT 서명/검증 프로토콜, 그리고 그 위의 발급/검증 서비스를
//! 제공합니다.
//!
//! # Features
//!
//! - 액세스/리프레시 토큰 및 OpenID Connect id_token 서명
//! - 알고리즘 고정 검증 (algorithm confusion 방지)
//! - HMAC / RSA 서명 키, JWKS 생성
//! - 토큰 종류별 수명 정책, 리프레시 토큰 회전 카운터 비교
//!
//! # Examples
//!
//! ```rust,ignore
//! use oauth2_token::config::OAuth2Config;
//! use oauth2_token::domain::models::token::TokenKind;
//! use oauth2_token::services::auth::TokenService;
//!
//! let service = TokenService::from_config(OAuth2Config::from_env())?;
//! let pair = service.issue_token_pair(grant_id, grant_counter, None)?;
//! let token = service.verify_token(&pair.access_token, TokenKind::AccessToken)?;
//! ```

pub mod signing_key;
pub mod jwt_service;
pub mod token_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use signing_key::*;
pub use jwt_service::*;
pub use token_service::*;
