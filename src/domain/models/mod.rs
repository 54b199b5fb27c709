//! # Domain Models Module
//!
//! 토큰 발급 흐름에서 생성되고 한 번 직렬화된 뒤 버려지는 값 객체들을 정의합니다.
//! 서명된 문자열 외에는 어떤 상태도 영속화하지 않으며, 검증 시마다
//! 문자열로부터 다시 구성됩니다.
//!
//! ```text
//! models/
//! └── token/
//!     ├── claims.rs      ← 표준 등록 클레임 (iss, sub, aud, exp, nbf, iat, jti)
//!     ├── token.rs       ← 액세스/리프레시 토큰 (gnt, tt, cnt)
//!     └── oidc_token.rs  ← id_token (nonce, profile, email, groups)
//! ```

pub mod token;

pub use token::*;
