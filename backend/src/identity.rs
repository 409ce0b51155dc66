//! Trusted identity headers.
//!
//! The session layer in front of this service reports who is calling via
//! `X-User-*` headers. Nothing here verifies them.

use actix_web::HttpRequest;
use jobboard_core::{CurrentUser, Role};
use thiserror::Error;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_NAME_HEADER: &str = "X-User-Name";
pub const USER_EMAIL_HEADER: &str = "X-User-Email";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

#[derive(Error, Debug, PartialEq)]
pub enum IdentityError {
    #[error("Missing {0} header")]
    MissingHeader(&'static str),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("This action requires the {0:?} role")]
    WrongRole(Role),
}

fn header(req: &HttpRequest, name: &'static str) -> Result<String, IdentityError> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(IdentityError::MissingHeader(name))
}

pub fn current_user(req: &HttpRequest) -> Result<CurrentUser, IdentityError> {
    let role_raw = header(req, USER_ROLE_HEADER)?;
    let role = Role::parse(&role_raw).ok_or(IdentityError::UnknownRole(role_raw))?;

    Ok(CurrentUser {
        id: header(req, USER_ID_HEADER)?,
        name: header(req, USER_NAME_HEADER).unwrap_or_default(),
        email: header(req, USER_EMAIL_HEADER).unwrap_or_default(),
        role,
    })
}

pub fn require_role(req: &HttpRequest, role: Role) -> Result<CurrentUser, IdentityError> {
    let user = current_user(req)?;
    if user.role != role {
        return Err(IdentityError::WrongRole(role));
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_reads_headers() {
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "emp1"))
            .insert_header((USER_NAME_HEADER, "TechCorp Inc."))
            .insert_header((USER_ROLE_HEADER, "employer"))
            .to_http_request();

        let user = current_user(&req).unwrap();
        assert_eq!(user.id, "emp1");
        assert_eq!(user.name, "TechCorp Inc.");
        assert_eq!(user.email, "");
        assert_eq!(user.role, Role::Employer);
    }

    #[test]
    fn test_missing_and_wrong_role() {
        let anonymous = TestRequest::default().to_http_request();
        assert_eq!(
            current_user(&anonymous),
            Err(IdentityError::MissingHeader(USER_ROLE_HEADER))
        );

        let seeker = TestRequest::default()
            .insert_header((USER_ID_HEADER, "s1"))
            .insert_header((USER_ROLE_HEADER, "jobseeker"))
            .to_http_request();
        assert_eq!(
            require_role(&seeker, Role::Employer),
            Err(IdentityError::WrongRole(Role::Employer))
        );
    }
}
