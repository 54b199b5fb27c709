//! 토큰 클레임 모델
//!
//! - [`claims`] - 표준 등록 클레임과 [`Claims`] trait
//! - [`token`] - 액세스/리프레시 토큰 클레임
//! - [`oidc_token`] - OpenID Connect id_token 클레임

pub mod claims;
pub mod token;
pub mod oidc_token;

pub use claims::*;
pub use token::*;
pub use oidc_token::*;
