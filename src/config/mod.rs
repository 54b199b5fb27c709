//! # Configuration Module
//!
//! 환경 변수 기반의 토큰 발급 설정을 중앙집중식으로 관리합니다.
//!
//! - [`auth_config`] - 토큰 수명, 서명 알고리즘, 서명 키 관련 설정

pub mod auth_config;

pub use auth_config::*;
