use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

const ACCESS: &str = "access";
const REFRESH: &str = "refresh";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub role_id: i64,
    pub exp: i64,
    pub iat: i64,
    pub token_type: String, // "access" or "refresh"
}

impl Claims {
    pub fn user_id(&self) -> AppResult<i64> {
        self.sub
            .parse()
            .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires_in: i64,
    refresh_token_expires_in: i64,
}

impl JwtService {
    pub fn new(secret: &str, access_expires_in: i64, refresh_expires_in: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expires_in: access_expires_in,
            refresh_token_expires_in: refresh_expires_in,
        }
    }

    fn issue(&self, user_id: i64, role_id: i64, token_type: &str, ttl: i64) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role_id,
            exp: (now + Duration::seconds(ttl)).timestamp(),
            iat: now.timestamp(),
            token_type: token_type.to_string(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    pub fn generate_access_token(&self, user_id: i64, role_id: i64) -> AppResult<String> {
        self.issue(user_id, role_id, ACCESS, self.access_token_expires_in)
    }

    pub fn generate_refresh_token(&self, user_id: i64, role_id: i64) -> AppResult<String> {
        self.issue(user_id, role_id, REFRESH, self.refresh_token_expires_in)
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        Ok(decode::<Claims>(token, &self.decoding_key, &validation)?.claims)
    }

    pub fn verify_access_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.verify_token(token)?;

        if claims.token_type != ACCESS {
            return Err(AppError::AuthError("Invalid access token type".to_string()));
        }

        Ok(claims)
    }

    pub fn verify_refresh_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.verify_token(token)?;

        if claims.token_type != REFRESH {
            return Err(AppError::AuthError("Invalid refresh token type".to_string()));
        }

        Ok(claims)
    }

    pub fn get_access_token_expires_in(&self) -> i64 {
        self.access_token_expires_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_roundtrip_carries_role() {
        let svc = JwtService::new("secret", 60, 120);
        let token = svc.generate_access_token(42, 3).unwrap();
        let claims = svc.verify_access_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.role_id, 3);
    }

    #[test]
    fn test_token_types_are_not_interchangeable() {
        let svc = JwtService::new("secret", 60, 120);
        let refresh = svc.generate_refresh_token(1, 3).unwrap();
        let access = svc.generate_access_token(1, 3).unwrap();
        assert!(svc.verify_access_token(&refresh).is_err());
        assert!(svc.verify_refresh_token(&access).is_err());
        assert!(svc.verify_refresh_token(&refresh).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let a = JwtService::new("secret-a", 60, 120);
        let b = JwtService::new("secret-b", 60, 120);
        let token = a.generate_access_token(1, 1).unwrap();
        assert!(b.verify_access_token(&token).is_err());
    }
}
