//! Access token injection for outbound requests.

// crates.io
use http::{HeaderValue, header::AUTHORIZATION};
// self
use crate::{error::TransportError, store::CredentialStore, transport::OutboundRequest};

/// Attaches `Authorization: Bearer <token>` when the store holds a non-empty access token.
///
/// The bearer replaces any `Authorization` value already on the request; without a token the
/// request passes through unmodified. A store failure aborts the send.
pub async fn attach_bearer(
	store: &dyn CredentialStore,
	mut request: OutboundRequest,
) -> Result<OutboundRequest, TransportError> {
	let token = store.access_token().await.map_err(TransportError::CredentialLookup)?;

	if let Some(token) = token.filter(|token| !token.is_empty()) {
		let mut value =
			HeaderValue::try_from(token.bearer()).map_err(|_| TransportError::InvalidBearer)?;

		value.set_sensitive(true);
		request.headers.insert(AUTHORIZATION, value);
	}

	Ok(request)
}
