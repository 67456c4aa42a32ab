//! Exchanging the stored refresh token for a new access token.
//!
//! The refresher returns either a new access token or `None`. Every
//! failure on the way is logged here and then collapsed into `None`:
//! a missing refresh token, a network error, a 400 from the server, or
//! an unreadable body all end the session the same way.

use pronovet_protocol::{
    ApiBase, Codec, JsonCodec, ProtocolError, REFRESH_PATH, RefreshRequest,
    RefreshResponse, RequestDescriptor, Url,
};
use pronovet_transport::HttpTransport;

use crate::{SessionKey, SessionStore};

/// Calls `POST token/refresh/` and persists the result.
#[derive(Debug, Clone)]
pub struct TokenRefresher {
    base: ApiBase,
    codec: JsonCodec,
}

impl TokenRefresher {
    pub fn new(base: ApiBase) -> Self {
        Self {
            base,
            codec: JsonCodec,
        }
    }

    /// The absolute refresh endpoint.
    ///
    /// # Errors
    /// Only if the base can't take the refresh path, which a valid
    /// [`ApiBase`] always can.
    pub fn endpoint(&self) -> Result<Url, ProtocolError> {
        self.base.join(REFRESH_PATH)
    }

    /// Refreshes the access token.
    ///
    /// - No refresh token stored → `None`, and no request is sent.
    /// - 2xx with an `access` field → the new token is written to the
    ///   store (before returning) and returned. A rotated `refresh` in the
    ///   same body replaces the stored refresh token.
    /// - Anything else → `None`. The store is left untouched.
    ///
    /// Never returns an error; see the module docs.
    pub async fn refresh<T: HttpTransport>(
        &self,
        transport: &T,
        store: &dyn SessionStore,
    ) -> Option<String> {
        let refresh = match store.get(SessionKey::RefreshToken) {
            Ok(Some(token)) if !token.is_empty() => token,
            Ok(_) => {
                tracing::debug!("no refresh token stored, skipping refresh");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not read refresh token");
                return None;
            }
        };

        let request = match RequestDescriptor::post(REFRESH_PATH)
            .json(&RefreshRequest { refresh })
        {
            Ok(descriptor) => match descriptor.resolve(&self.base) {
                Ok(request) => request,
                Err(e) => {
                    tracing::warn!(error = %e, "could not address refresh request");
                    return None;
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "could not encode refresh request");
                return None;
            }
        };

        let response = match transport.send(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "refresh request failed");
                return None;
            }
        };
        if !response.is_success() {
            tracing::warn!(
                status = response.status(),
                "refresh token rejected"
            );
            return None;
        }

        let body: RefreshResponse = match self.codec.decode(response.body()) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "malformed refresh response");
                return None;
            }
        };
        if body.access.is_empty() {
            tracing::warn!("refresh response carried an empty access token");
            return None;
        }

        // The new token must be in the store before anyone retries with it.
        if let Err(e) = store.set(SessionKey::AccessToken, &body.access) {
            tracing::warn!(error = %e, "could not persist refreshed token");
            return None;
        }
        if let Some(rotated) = body.refresh.as_deref().filter(|r| !r.is_empty())
        {
            if let Err(e) = store.set(SessionKey::RefreshToken, rotated) {
                tracing::warn!(error = %e, "could not persist rotated refresh token");
            }
        }

        tracing::info!("access token refreshed");
        Some(body.access)
    }
}
