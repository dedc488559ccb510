//! Standard claim names and the scope-to-claims table (OIDC Core §5.1, §5.4).

/// Standard claim names.
pub struct StandardClaims;

impl StandardClaims {
    // Registered claims, always present in an ID token
    pub const SUB: &'static str = "sub";
    pub const AUD: &'static str = "aud";
    pub const ISS: &'static str = "iss";
    pub const IAT: &'static str = "iat";
    pub const EXP: &'static str = "exp";
    pub const NONCE: &'static str = "nonce";

    // profile
    pub const NAME: &'static str = "name";
    pub const FAMILY_NAME: &'static str = "family_name";
    pub const GIVEN_NAME: &'static str = "given_name";
    pub const MIDDLE_NAME: &'static str = "middle_name";
    pub const NICKNAME: &'static str = "nickname";
    pub const PREFERRED_USERNAME: &'static str = "preferred_username";
    pub const PROFILE: &'static str = "profile";
    pub const PICTURE: &'static str = "picture";
    pub const WEBSITE: &'static str = "website";
    pub const GENDER: &'static str = "gender";
    pub const BIRTHDATE: &'static str = "birthdate";
    pub const ZONEINFO: &'static str = "zoneinfo";
    pub const LOCALE: &'static str = "locale";
    pub const UPDATED_AT: &'static str = "updated_at";

    // email
    pub const EMAIL: &'static str = "email";
    pub const EMAIL_VERIFIED: &'static str = "email_verified";

    // address
    pub const ADDRESS: &'static str = "address";

    // phone
    pub const PHONE_NUMBER: &'static str = "phone_number";
    pub const PHONE_NUMBER_VERIFIED: &'static str = "phone_number_verified";

    /// Claims set by the issuer itself. Profile data never overrides them.
    #[must_use]
    pub const fn reserved() -> &'static [&'static str] {
        &[
            Self::SUB,
            Self::AUD,
            Self::ISS,
            Self::IAT,
            Self::EXP,
            Self::NONCE,
        ]
    }

    /// Returns `true` if `claim` is set by the issuer rather than copied from a profile.
    #[must_use]
    pub fn is_reserved(claim: &str) -> bool {
        Self::reserved().contains(&claim)
    }
}

/// Standard OpenID Connect scope values.
pub struct Scope;

impl Scope {
    pub const OPENID: &'static str = "openid";
    pub const PROFILE: &'static str = "profile";
    pub const EMAIL: &'static str = "email";
    pub const ADDRESS: &'static str = "address";
    pub const PHONE: &'static str = "phone";
}

/// Standard claims authorized by each scope. `openid` adds nothing beyond
/// the registered claims and is therefore absent.
pub const SCOPE_CLAIMS: &[(&str, &[&str])] = &[
    (
        Scope::PROFILE,
        &[
            StandardClaims::NAME,
            StandardClaims::FAMILY_NAME,
            StandardClaims::GIVEN_NAME,
            StandardClaims::MIDDLE_NAME,
            StandardClaims::NICKNAME,
            StandardClaims::PREFERRED_USERNAME,
            StandardClaims::PROFILE,
            StandardClaims::PICTURE,
            StandardClaims::WEBSITE,
            StandardClaims::GENDER,
            StandardClaims::BIRTHDATE,
            StandardClaims::ZONEINFO,
            StandardClaims::LOCALE,
            StandardClaims::UPDATED_AT,
        ],
    ),
    (
        Scope::EMAIL,
        &[StandardClaims::EMAIL, StandardClaims::EMAIL_VERIFIED],
    ),
    (Scope::ADDRESS, &[StandardClaims::ADDRESS]),
    (
        Scope::PHONE,
        &[
            StandardClaims::PHONE_NUMBER,
            StandardClaims::PHONE_NUMBER_VERIFIED,
        ],
    ),
];

/// Claims authorized by `scope`; empty for `openid` and non-standard scopes.
#[must_use]
pub fn scope_claims(scope: &str) -> &'static [&'static str] {
    SCOPE_CLAIMS
        .iter()
        .find(|(name, _)| *name == scope)
        .map(|(_, claims)| *claims)
        .unwrap_or_default()
}
