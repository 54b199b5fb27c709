//! OAuth2 / OpenID Connect 토큰 발급 및 검증
//!
//! OAuth2 인가 서버가 발급하는 액세스 토큰, 리프레시 토큰, OpenID Connect
//! id_token의 클레임 구조와, 이를 서명된 자체 포함 토큰(JWT)으로 만들고
//! 검증하는 프로토콜을 제공합니다. 매 요청마다 서버 측 조회 없이
//! 사용자의 인증 세션을 증명하거나 확인할 수 있습니다.
//!
//! # Features
//!
//! - **토큰 모델**: 그랜트 참조, 토큰 종류, 회전 카운터를 담은 베어러 토큰
//! - **id_token**: 스코프별 프로필/이메일/그룹 클레임
//! - **서명/검증**: 알고리즘 고정, 서명, 시간, 형태 검증을 순서대로 수행
//! - **서명 키**: HMAC, RSA(RS*/PS*) 키와 JWKS 생성
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  TokenService   │ ← 수명 정책, 종류/카운터 확인
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   jwt_service   │ ← sign_token / parse_token
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  JwtSigningKey  │ ← 알고리즘, 서명/검증 재료, kid 헤더
//! └─────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use oauth2_token::domain::models::token::Token;
//! use oauth2_token::services::auth::{HmacSigningKey, parse_token, sign_token};
//! use jsonwebtoken::Algorithm;
//!
//! let key = HmacSigningKey::new(Algorithm::HS256, b"secret")?;
//! let mut token = Token::access(42);
//! let signed = sign_token(&mut token, &key)?;
//! assert_eq!(parse_token(&signed, &key)?.grant_id, 42);
//! ```

pub mod config;
pub mod domain;
pub mod errors;
pub mod services;
