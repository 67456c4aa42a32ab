//! The logged-in user's own account, and registering new users.

use pronovet_protocol::{Codec, JsonCodec, RequestDescriptor, TokenPair};
use pronovet_session::Session;
use pronovet_transport::HttpTransport;
use serde::{Deserialize, Serialize};

use crate::{ApiClient, PronovetError};

/// The current user as the API describes them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub date_joined: Option<String>,
    #[serde(default)]
    pub user_type: Option<UserType>,
}

impl Profile {
    /// "First Last", or the username when both names are blank.
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        if name.is_empty() {
            self.username.clone()
        } else {
            name.to_string()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserType {
    pub id: u64,
    pub description: String,
}

/// Fields to change on the profile. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// An entry in the current user's activity log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLog {
    pub id: u64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// A new staff or manager account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub confirm_password: String,
}

impl Registration {
    fn validate(&self) -> Result<(), PronovetError> {
        if self.username.trim().is_empty() {
            return Err(PronovetError::Validation(
                "username is required".to_string(),
            ));
        }
        check_passwords(&self.password, &self.confirm_password)
    }
}

fn check_passwords(password: &str, confirm: &str) -> Result<(), PronovetError> {
    if password.is_empty() {
        return Err(PronovetError::Validation("password is required".to_string()));
    }
    if password != confirm {
        return Err(PronovetError::Validation(
            "Passwords do not match".to_string(),
        ));
    }
    Ok(())
}

#[derive(Serialize)]
struct NewPassword<'a> {
    new_password: &'a str,
}

/// Registration answers: staff registration returns a token pair,
/// manager registration usually just the created user.
#[derive(Deserialize)]
struct MaybeTokens {
    #[serde(default)]
    access: Option<String>,
    #[serde(default)]
    refresh: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

impl MaybeTokens {
    fn into_pair(self) -> Option<TokenPair> {
        match (self.access, self.refresh) {
            (Some(access), Some(refresh))
                if !access.is_empty() && !refresh.is_empty() =>
            {
                Some(TokenPair { access, refresh })
            }
            _ => None,
        }
    }
}

impl<T: HttpTransport> ApiClient<T> {
    pub async fn profile(&self) -> Result<Profile, PronovetError> {
        self.fetch_json(&RequestDescriptor::get("users/me")).await
    }

    pub async fn update_profile(
        &self,
        update: &ProfileUpdate,
    ) -> Result<Profile, PronovetError> {
        let descriptor = RequestDescriptor::patch("users/me").json(update)?;
        self.fetch_json(&descriptor).await
    }

    /// Sets a new password. `confirm` must match; a mismatch is rejected
    /// before anything is sent.
    pub async fn change_password(
        &self,
        new_password: &str,
        confirm: &str,
    ) -> Result<(), PronovetError> {
        check_passwords(new_password, confirm)?;
        let descriptor = RequestDescriptor::post("users/me/change_password")
            .json(&NewPassword { new_password })?;
        self.fetch(&descriptor).await?;
        tracing::info!("password changed");
        Ok(())
    }

    /// The current user's activity log, newest first.
    pub async fn profile_logs(&self) -> Result<Vec<UserLog>, PronovetError> {
        self.fetch_json(&RequestDescriptor::get("users/me/logs")).await
    }

    /// Registers a staff account and signs in as it.
    pub async fn register_staff(
        &self,
        registration: &Registration,
    ) -> Result<(), PronovetError> {
        registration.validate()?;
        let descriptor =
            RequestDescriptor::post("register/staff").json(registration)?;
        let response = self.fetch(&descriptor).await?;
        let tokens: MaybeTokens = JsonCodec.decode(response.body())?;
        let pair = tokens.into_pair().ok_or_else(|| {
            PronovetError::Api {
                status: response.status(),
                detail: "registration response carried no tokens".to_string(),
            }
        })?;
        Session::establish(self.store(), &pair, &registration.username, false)?;
        Ok(())
    }

    /// Registers a manager account. If the server answers with tokens,
    /// they become the stored session, under the username the server
    /// returned (falling back to the one submitted).
    pub async fn register_manager(
        &self,
        registration: &Registration,
    ) -> Result<(), PronovetError> {
        registration.validate()?;
        let descriptor =
            RequestDescriptor::post("register/manager").json(registration)?;
        let response = self.fetch(&descriptor).await?;
        let tokens = JsonCodec.decode::<MaybeTokens>(response.body()).ok();
        let username = tokens
            .as_ref()
            .and_then(|t| t.username.as_deref())
            .filter(|name| !name.is_empty())
            .unwrap_or(&registration.username)
            .to_string();
        match tokens.and_then(MaybeTokens::into_pair) {
            Some(pair) => {
                Session::establish(self.store(), &pair, &username, false)?;
            }
            None => {
                tracing::info!(
                    username = %registration.username,
                    "manager registered"
                );
            }
        }
        Ok(())
    }
}
