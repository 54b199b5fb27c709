//! 도메인 계층
//!
//! 토큰 클레임 모델을 제공합니다.

pub mod models;

pub use models::*;
