//! RFC 7519 등록 클레임
//!
//! 액세스/리프레시 토큰과 id_token이 공통으로 포함하는 표준 클레임을 정의합니다.
//! 두 토큰 구조체는 이 값을 `#[serde(flatten)]`으로 합성하며,
//! 서명/검증 프로토콜은 [`Claims`] trait을 통해 이 값에 접근합니다.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};

/// 표준 등록 클레임 집합
///
/// 모든 필드는 선택사항이며, 값이 없으면 직렬화에서 생략됩니다.
/// 시간 값은 Unix timestamp (초) 입니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredClaims {
    /// `iss` - 토큰 발급자
    #[serde(rename = "iss", default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    /// `sub` - 토큰 주체
    #[serde(rename = "sub", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// `aud` - 토큰 대상
    #[serde(rename = "aud", default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<Audience>,
    /// `exp` - 만료 시간
    #[serde(rename = "exp", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    /// `nbf` - 유효 시작 시간
    #[serde(rename = "nbf", default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<i64>,
    /// `iat` - 발급 시간 (서명 시 덮어씀)
    #[serde(rename = "iat", default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,
    /// `jti` - 토큰 고유 식별자
    #[serde(rename = "jti", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// `aud` 클레임
///
/// 대상이 하나면 문자열로, 여럿이면 배열로 직렬화합니다.
/// 역직렬화 시에는 두 형태를 모두 허용합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "AudienceRepr")]
pub struct Audience(pub Vec<String>);

impl Serialize for Audience {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.as_slice() {
            [single] => serializer.serialize_str(single),
            many => many.serialize(serializer),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AudienceRepr {
    One(String),
    Many(Vec<String>),
}

impl From<AudienceRepr> for Audience {
    fn from(repr: AudienceRepr) -> Self {
        match repr {
            AudienceRepr::One(aud) => Audience(vec![aud]),
            AudienceRepr::Many(auds) => Audience(auds),
        }
    }
}

impl Audience {
    /// 단일 대상으로 구성합니다.
    pub fn single(aud: impl Into<String>) -> Self {
        Audience(vec![aud.into()])
    }

    /// `aud`가 대상 목록에 포함되어 있는지 확인합니다.
    pub fn contains(&self, aud: &str) -> bool {
        self.0.iter().any(|a| a == aud)
    }
}

/// 등록 클레임을 노출하는 클레임 구조체
///
/// 서명 시 `iat` 스탬핑과 검증 시 형태 바인딩에 사용됩니다.
pub trait Claims: Serialize + DeserializeOwned {
    fn registered_claims(&self) -> &RegisteredClaims;

    fn registered_claims_mut(&mut self) -> &mut RegisteredClaims;
}
