use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token pair issued by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// `{ "data": { "accessToken": ..., "refreshToken": ... } }`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub data: TokenPair,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_parses() {
        let json = r#"{"data":{"accessToken":"at","refreshToken":"rt","expiresIn":900}}"#;
        let parsed: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.data.access_token, "at");
        assert_eq!(parsed.data.refresh_token, "rt");
    }

    #[test]
    fn test_login_response_requires_data() {
        let json = r#"{"accessToken":"at","refreshToken":"rt"}"#;
        assert!(serde_json::from_str::<LoginResponse>(json).is_err());
    }

    #[test]
    fn test_signup_request_omits_missing_fields() {
        let req = SignupRequest {
            email: "a@b.io".into(),
            phone_number: None,
            comment: Some("hi".into()),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, serde_json::json!({"email": "a@b.io", "comment": "hi"}));
    }

    #[test]
    fn test_signup_request_camel_case() {
        let req = SignupRequest {
            email: "a@b.io".into(),
            phone_number: Some("010-1234-5678".into()),
            comment: None,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["phoneNumber"], "010-1234-5678");
    }
}
