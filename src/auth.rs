use crate::error::AuthError;
use crate::models::{Claims, User};
use actix_web::{dev::ServiceRequest, web, Error, HttpMessage};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

/// Mints and checks HS256 session tokens. Holds no per-user state, so a
/// token stays valid until `exp` even after logout.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            name: user.name.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("token encoding failed: {e}")))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            })
    }
}

/// Bearer middleware hook: verified claims are stored in the request
/// extensions for `web::ReqData<Claims>`. A missing or non-Bearer
/// `Authorization` header is treated like a bad token.
pub async fn validator(
    req: ServiceRequest,
    credentials: Option<BearerAuth>,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let verified = match (req.app_data::<web::Data<TokenIssuer>>(), credentials) {
        (Some(issuer), Some(credentials)) => issuer.verify(credentials.token()),
        (Some(_), None) => Err(AuthError::InvalidToken),
        (None, _) => Err(AuthError::Internal("token issuer not registered".into())),
    };

    match verified {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(req)
        }
        Err(e) => {
            tracing::debug!(error = %e, path = req.path(), "rejected bearer token");
            Err((e.into(), req))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn ana() -> User {
        User {
            id: 42,
            name: "Ana".into(),
            email: "ana@x.com".into(),
            password_hash: String::new(),
            role: Role::Admin,
        }
    }

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(b"test-secret", Duration::minutes(15))
    }

    #[test]
    fn issued_token_verifies_to_user_claims() {
        let issuer = issuer();
        let token = issuer.issue(&ana()).unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "ana@x.com");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.name, "Ana");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tampered_signature_is_invalid() {
        let issuer = issuer();
        let token = issuer.issue(&ana()).unwrap();

        let sig_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        bytes[sig_start] = if bytes[sig_start] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(matches!(
            issuer.verify(&tampered),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let stale = TokenIssuer::new(b"test-secret", Duration::seconds(-30));
        let token = stale.issue(&ana()).unwrap();

        assert!(matches!(
            issuer().verify(&token),
            Err(AuthError::ExpiredToken)
        ));
    }

    #[test]
    fn token_from_another_secret_is_invalid() {
        let other = TokenIssuer::new(b"rotated-secret", Duration::minutes(15));
        let token = other.issue(&ana()).unwrap();

        assert!(matches!(issuer().verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn malformed_token_is_invalid() {
        let issuer = issuer();
        for garbage in ["", "not-a-jwt", "a.b.c"] {
            assert!(matches!(
                issuer.verify(garbage),
                Err(AuthError::InvalidToken)
            ));
        }
    }
}
