//! Simple file-backed [`CredentialStore`] for desktop apps and CLIs.

// std
use std::{
	fs::{self, File},
	io::{Error as IoError, ErrorKind, Write},
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{Credentials, TokenSecret},
	store::{CredentialStore, StoreError, StoreFuture},
};

/// Persists the token pair to a JSON file after each mutation.
///
/// Logging out removes the file entirely.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<Option<Credentials>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<Option<Credentials>, StoreError> {
		let bytes = match fs::read(path) {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
			Err(e) => return Err(io_failure("read", path, e)),
		};

		if bytes.is_empty() {
			return Ok(None);
		}

		serde_json::from_slice(&bytes).map(Some).map_err(|e| StoreError::Serialization {
			message: format!("Credential file {} is not valid JSON: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		match path.parent() {
			Some(dir) if !dir.as_os_str().is_empty() =>
				fs::create_dir_all(dir).map_err(|e| io_failure("create directory", dir, e)),
			_ => Ok(()),
		}
	}

	/// Writes `credentials` next to the target and renames over it, so readers never see a
	/// half-written file.
	fn persist(&self, credentials: &Credentials) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let json = serde_json::to_vec_pretty(credentials).map_err(|e| {
			StoreError::Serialization { message: format!("Credentials did not encode: {e}") }
		})?;
		let staging = self.path.with_extension("tmp");
		let mut file = File::create(&staging).map_err(|e| io_failure("create", &staging, e))?;

		file.write_all(&json).map_err(|e| io_failure("write", &staging, e))?;
		file.sync_all().map_err(|e| io_failure("sync", &staging, e))?;
		drop(file);

		fs::rename(&staging, &self.path).map_err(|e| io_failure("replace", &self.path, e))
	}

	fn remove(&self) -> Result<(), StoreError> {
		match fs::remove_file(&self.path) {
			Err(e) if e.kind() != ErrorKind::NotFound => Err(io_failure("remove", &self.path, e)),
			_ => Ok(()),
		}
	}
}
impl CredentialStore for FileStore {
	fn access_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		Box::pin(async move {
			Ok(self.inner.read().as_ref().map(|credentials| credentials.access_token.clone()))
		})
	}

	fn refresh_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		Box::pin(async move {
			Ok(self.inner.read().as_ref().map(|credentials| credentials.refresh_token.clone()))
		})
	}

	fn save_tokens(&self, credentials: Credentials) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			self.persist(&credentials)?;
			*guard = Some(credentials);

			Ok(())
		})
	}

	fn clear_on_logout(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			self.remove()?;
			guard.take();

			Ok(())
		})
	}
}

fn io_failure(action: &str, path: &Path, e: IoError) -> StoreError {
	StoreError::Backend { message: format!("Could not {action} {}: {e}", path.display()) }
}
