// Claims extraction and access-control filters for search requests

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::approaches::FilterBuilder;
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{AuthClaims, Overrides};

pub struct AuthHelper {
    use_authentication: bool,
    require_access_control: bool,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthHelper {
    /// Tokens are accepted for any audience until one is set with `with_audience`.
    pub fn new(use_authentication: bool, require_access_control: bool, jwt_secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;

        Self {
            use_authentication,
            require_access_control,
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            validation,
        }
    }

    pub fn with_audience(mut self, audience: Option<&str>) -> Self {
        if let Some(audience) = audience {
            self.validation.set_audience(&[audience]);
            self.validation.validate_aud = true;
        }
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.use_authentication,
            config.enforce_access_control,
            &config.jwt_secret,
        )
        .with_audience(config.server_app_id.as_deref())
    }

    /// Returns the `oid` and `groups` claims from a bearer token, or an empty map
    /// when authentication is off. A missing or invalid token is only an error
    /// when access control is enforced.
    pub fn get_auth_claims_if_enabled(&self, authorization: Option<&str>) -> Result<AuthClaims> {
        if !self.use_authentication {
            return Ok(AuthClaims::new());
        }

        match self.decode_claims(authorization) {
            Ok(claims) => Ok(claims),
            Err(e) if self.require_access_control => {
                warn!(error = %e, "Rejecting request without valid credentials");
                Err(ApiError::AuthenticationError)
            }
            Err(e) => {
                debug!(error = %e, "No usable token, continuing without claims");
                Ok(AuthClaims::new())
            }
        }
    }

    fn decode_claims(&self, authorization: Option<&str>) -> Result<AuthClaims> {
        let header = authorization.ok_or(ApiError::AuthenticationError)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::AuthenticationError)?;

        let data = decode::<Map<String, Value>>(token, &self.decoding_key, &self.validation)
            .map_err(|_| ApiError::AuthenticationError)?;

        let mut claims = AuthClaims::new();
        if let Some(oid) = data.claims.get("oid") {
            claims.insert("oid".to_string(), oid.clone());
        }
        claims.insert(
            "groups".to_string(),
            data.claims
                .get("groups")
                .cloned()
                .unwrap_or_else(|| Value::Array(vec![])),
        );
        Ok(claims)
    }

    pub fn build_security_filters(
        &self,
        overrides: &Overrides,
        auth_claims: &AuthClaims,
    ) -> Result<Option<String>> {
        let use_oid = self.require_access_control || truthy(overrides.get("use_oid_security_filter"));
        let use_groups =
            self.require_access_control || truthy(overrides.get("use_groups_security_filter"));

        if (use_oid || use_groups) && !self.use_authentication {
            return Err(ApiError::AccessControl(
                "oids and groups must be included in the token to use security filters".to_string(),
            ));
        }

        let oid_filter = use_oid.then(|| {
            let oid = auth_claims.get("oid").and_then(Value::as_str).unwrap_or("");
            format!("oids/any(g:search.in(g, '{}'))", escape(oid))
        });
        let groups_filter = use_groups.then(|| {
            let groups: Vec<String> = auth_claims
                .get("groups")
                .and_then(Value::as_array)
                .map(|gs| gs.iter().filter_map(Value::as_str).map(escape).collect())
                .unwrap_or_default();
            format!("groups/any(g:search.in(g, '{}'))", groups.join(", "))
        });

        // Either filter passing is enough.
        Ok(match (oid_filter, groups_filter) {
            (Some(oid), Some(groups)) => Some(format!("({} or {})", oid, groups)),
            (Some(only), None) | (None, Some(only)) => Some(only),
            (None, None) => None,
        })
    }
}

impl FilterBuilder for AuthHelper {
    fn build_filter(&self, overrides: &Overrides, auth_claims: &AuthClaims) -> Result<Option<String>> {
        let mut filters = Vec::new();

        if let Some(category) = overrides.get("exclude_category").and_then(Value::as_str) {
            if !category.is_empty() {
                filters.push(format!("category ne '{}'", escape(category)));
            }
        }
        if let Some(security) = self.build_security_filters(overrides, auth_claims)? {
            filters.push(security);
        }

        Ok(if filters.is_empty() {
            None
        } else {
            Some(filters.join(" and "))
        })
    }
}

fn escape(value: &str) -> String {
    value.replace('\'', "''")
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "test-secret";

    fn token(claims: Value) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn overrides(value: Value) -> Overrides {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn no_filter_by_default() {
        let helper = AuthHelper::new(false, false, SECRET);
        let filter = helper.build_filter(&Overrides::new(), &AuthClaims::new()).unwrap();
        assert_eq!(filter, None);
    }

    #[test]
    fn exclude_category_is_escaped() {
        let helper = AuthHelper::new(false, false, SECRET);
        let filter = helper
            .build_filter(&overrides(json!({ "exclude_category": "kid's" })), &AuthClaims::new())
            .unwrap();
        assert_eq!(filter.as_deref(), Some("category ne 'kid''s'"));
    }

    #[test]
    fn enforced_access_control_combines_oid_and_groups() {
        let helper = AuthHelper::new(true, true, SECRET);
        let claims = overrides(json!({ "oid": "user-1", "groups": ["g1", "g2"] }));

        let filter = helper
            .build_filter(&overrides(json!({ "exclude_category": "hr" })), &claims)
            .unwrap();

        assert_eq!(
            filter.as_deref(),
            Some(
                "category ne 'hr' and (oids/any(g:search.in(g, 'user-1')) \
                 or groups/any(g:search.in(g, 'g1, g2')))"
            )
        );
    }

    #[test]
    fn single_security_filter_from_overrides() {
        let helper = AuthHelper::new(true, false, SECRET);
        let claims = overrides(json!({ "oid": "user-1", "groups": [] }));

        let filter = helper
            .build_filter(&overrides(json!({ "use_oid_security_filter": true })), &claims)
            .unwrap();

        assert_eq!(filter.as_deref(), Some("oids/any(g:search.in(g, 'user-1'))"));
    }

    #[test]
    fn security_filter_without_auth_setup_fails() {
        let helper = AuthHelper::new(false, false, SECRET);
        let err = helper
            .build_filter(&overrides(json!({ "use_groups_security_filter": true })), &AuthClaims::new())
            .unwrap_err();
        assert!(matches!(err, ApiError::AccessControl(_)));
    }

    #[test]
    fn claims_are_empty_when_authentication_disabled() {
        let helper = AuthHelper::new(false, false, SECRET);
        let claims = helper.get_auth_claims_if_enabled(Some("Bearer whatever")).unwrap();
        assert!(claims.is_empty());
    }

    #[test]
    fn claims_are_read_from_bearer_token() {
        let helper = AuthHelper::new(true, false, SECRET);
        let jwt = token(json!({ "oid": "user-1", "groups": ["g1"], "exp": 4_000_000_000u64 }));

        let claims = helper
            .get_auth_claims_if_enabled(Some(&format!("Bearer {}", jwt)))
            .unwrap();

        assert_eq!(claims.get("oid"), Some(&json!("user-1")));
        assert_eq!(claims.get("groups"), Some(&json!(["g1"])));
    }

    #[test]
    fn token_with_audience_is_accepted_without_configured_audience() {
        let jwt = token(json!({
            "oid": "user-1",
            "groups": ["g1"],
            "aud": "api://search",
            "exp": 4_000_000_000u64
        }));
        let bearer = format!("Bearer {}", jwt);

        let lenient = AuthHelper::new(true, false, SECRET);
        let claims = lenient.get_auth_claims_if_enabled(Some(&bearer)).unwrap();
        assert_eq!(claims.get("oid"), Some(&json!("user-1")));

        let strict = AuthHelper::new(true, true, SECRET);
        let claims = strict.get_auth_claims_if_enabled(Some(&bearer)).unwrap();
        assert_eq!(claims.get("groups"), Some(&json!(["g1"])));
    }

    #[test]
    fn configured_audience_must_match() {
        let bearer = |aud: &str| {
            format!(
                "Bearer {}",
                token(json!({ "oid": "user-1", "aud": aud, "exp": 4_000_000_000u64 }))
            )
        };
        let helper = AuthHelper::new(true, true, SECRET).with_audience(Some("api://search"));

        let claims = helper
            .get_auth_claims_if_enabled(Some(&bearer("api://search")))
            .unwrap();
        assert_eq!(claims.get("oid"), Some(&json!("user-1")));

        let err = helper
            .get_auth_claims_if_enabled(Some(&bearer("api://other")))
            .unwrap_err();
        assert!(matches!(err, ApiError::AuthenticationError));
    }

    #[test]
    fn invalid_token_is_tolerated_unless_enforced() {
        let lenient = AuthHelper::new(true, false, SECRET);
        assert!(lenient
            .get_auth_claims_if_enabled(Some("Bearer not-a-jwt"))
            .unwrap()
            .is_empty());

        let strict = AuthHelper::new(true, true, SECRET);
        let err = strict.get_auth_claims_if_enabled(None).unwrap_err();
        assert!(matches!(err, ApiError::AuthenticationError));
    }
}
