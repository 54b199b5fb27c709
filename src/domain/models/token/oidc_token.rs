//! OpenID Connect id_token 클레임
//!
//! 스코프에 따라 채워지는 프로필/이메일/그룹 클레임을 정의합니다.
//! 스코프가 허용되지 않은 필드는 빈 값으로 남고 직렬화에서 생략됩니다.

use serde::{Deserialize, Serialize};

use crate::domain::models::token::claims::{Audience, Claims, RegisteredClaims};

/// `profile` 스코프 클레임 묶음
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub name: String,
    pub preferred_username: String,
    pub profile: String,
    pub picture: String,
    pub website: String,
    pub locale: String,
    /// 마지막 프로필 변경 시간 (Unix timestamp)
    pub updated_at: i64,
}

/// OpenID Connect id_token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OIDCToken {
    #[serde(flatten)]
    pub registered: RegisteredClaims,
    /// 인가 요청의 nonce (비교는 호출자 책임)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub nonce: String,

    // profile 스코프
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub preferred_username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub profile: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub picture: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub website: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub locale: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub updated_at: i64,

    // email 스코프
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub email_verified: bool,

    /// 조직 및 팀 이름에서 생성된 그룹
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl OIDCToken {
    /// 주체와 클라이언트(대상)만 채운 id_token을 만듭니다.
    pub fn new(subject: impl Into<String>, client_id: impl Into<String>, nonce: impl Into<String>) -> Self {
        Self {
            registered: RegisteredClaims {
                subject: Some(subject.into()),
                audience: Some(Audience::single(client_id)),
                ..Default::default()
            },
            nonce: nonce.into(),
            ..Default::default()
        }
    }

    /// `profile` 스코프가 허용된 경우에만 호출합니다.
    pub fn with_profile(mut self, profile: &UserProfile) -> Self {
        self.name = profile.name.clone();
        self.preferred_username = profile.preferred_username.clone();
        self.profile = profile.profile.clone();
        self.picture = profile.picture.clone();
        self.website = profile.website.clone();
        self.locale = profile.locale.clone();
        self.updated_at = profile.updated_at;
        self
    }

    /// `email` 스코프가 허용된 경우에만 호출합니다.
    pub fn with_email(mut self, email: impl Into<String>, verified: bool) -> Self {
        self.email = email.into();
        self.email_verified = verified;
        self
    }

    /// 그룹 클레임이 요청된 경우에만 호출합니다. 순서는 유지됩니다.
    pub fn with_groups(mut self, groups: Vec<String>) -> Self {
        self.groups = groups;
        self
    }
}

impl Claims for OIDCToken {
    fn registered_claims(&self) -> &RegisteredClaims {
        &self.registered
    }

    fn registered_claims_mut(&mut self) -> &mut RegisteredClaims {
        &mut self.registered
    }
}
