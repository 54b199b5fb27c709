//! 서비스 계층 모듈
//!
//! 토큰 서명/검증과 발급 정책을 담당합니다.

pub mod auth;
