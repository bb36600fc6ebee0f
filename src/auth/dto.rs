use serde::{Deserialize, Serialize};

/// Request body for signup; `name` is an optional display string.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Request body for signin.
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Outcome of a signup attempt; `success` is false on a username conflict.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub success: bool,
    pub message: String,
}

/// Returned after a successful signin; `token` carries the "JWT " scheme
/// prefix clients send back verbatim.
#[derive(Debug, Serialize)]
pub struct SigninResponse {
    pub success: bool,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signin_response_keeps_the_scheme_prefix() {
        let response = SigninResponse {
            success: true,
            token: "JWT abc.def.ghi".into(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""token":"JWT abc.def.ghi""#));
        assert!(json.contains(r#""success":true"#));
    }

    #[test]
    fn signup_request_tolerates_missing_fields() {
        let payload: SignupRequest = serde_json::from_str("{}").unwrap();
        assert!(payload.name.is_none());
        assert!(payload.username.is_none());
        assert!(payload.password.is_none());
    }
}
