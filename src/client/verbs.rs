//! Verb helpers that wrap [`AuthClient::execute`] in the response envelope.

// crates.io
use http::Method;
// self
use crate::{
	_prelude::*,
	client::AuthClient,
	request::{ApiRequest, ResponseKind},
	response::ApiResponse,
	transport::HttpTransport,
};

impl<T> AuthClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Sends `request` and decodes a JSON body into `R`.
	pub async fn send<R>(&self, request: ApiRequest) -> ApiResponse<R>
	where
		R: DeserializeOwned,
	{
		match self.execute(request).await {
			Ok(raw) => ApiResponse::from_json(raw),
			Err(e) => ApiResponse::from_error(&e),
		}
	}

	/// Sends `request` and returns the body as text.
	pub async fn send_text(&self, request: ApiRequest) -> ApiResponse<String> {
		match self.execute(request.accepting(ResponseKind::Text)).await {
			Ok(raw) => ApiResponse::from_text(raw),
			Err(e) => ApiResponse::from_error(&e),
		}
	}

	/// Sends `request` and returns the body as bytes.
	pub async fn send_bytes(&self, request: ApiRequest) -> ApiResponse<Vec<u8>> {
		match self.execute(request.accepting(ResponseKind::Bytes)).await {
			Ok(raw) => ApiResponse::from_bytes(raw),
			Err(e) => ApiResponse::from_error(&e),
		}
	}

	/// `GET path`, decoding JSON.
	pub async fn get<R>(&self, path: &str) -> ApiResponse<R>
	where
		R: DeserializeOwned,
	{
		self.send(ApiRequest::get(path)).await
	}

	/// `DELETE path`, decoding JSON.
	pub async fn delete<R>(&self, path: &str) -> ApiResponse<R>
	where
		R: DeserializeOwned,
	{
		self.send(ApiRequest::new(Method::DELETE, path)).await
	}

	/// `POST path` with a JSON body.
	pub async fn post<B, R>(&self, path: &str, body: &B) -> ApiResponse<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		self.send_json(Method::POST, path, body).await
	}

	/// `PUT path` with a JSON body.
	pub async fn put<B, R>(&self, path: &str, body: &B) -> ApiResponse<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		self.send_json(Method::PUT, path, body).await
	}

	/// `PATCH path` with a JSON body.
	pub async fn patch<B, R>(&self, path: &str, body: &B) -> ApiResponse<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		self.send_json(Method::PATCH, path, body).await
	}

	async fn send_json<B, R>(&self, method: Method, path: &str, body: &B) -> ApiResponse<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		match ApiRequest::new(method, path).json(body) {
			Ok(request) => self.send(request).await,
			Err(e) => ApiResponse::from_error(&e),
		}
	}
}
