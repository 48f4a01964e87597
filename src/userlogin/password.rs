//! Password hashing capability, argon2id with PHC format digests.

use crate::error::{Error, Result};
use argon2::{
	password_hash::{
		rand_core, PasswordHash, PasswordHasher, PasswordVerifier,
		SaltString,
	},
	Argon2,
};

/// # Errors
/// fails when the hasher rejects its parameters
pub fn hash(password: &str) -> Result<String> {
	let salt = SaltString::generate(&mut rand_core::OsRng);

	Argon2::default()
		.hash_password(password.as_bytes(), &salt)
		.map(|digest| digest.to_string())
		.map_err(|err| Error::Hash(err.to_string()))
}

/// a digest that fails to parse verifies as false rather than erroring
#[must_use]
pub fn verify(password: &str, digest: &str) -> bool {
	PasswordHash::new(digest).map_or(false, |parsed| {
		Argon2::default()
			.verify_password(password.as_bytes(), &parsed)
			.is_ok()
	})
}

#[cfg(test)]
mod tests {
	#![allow(clippy::unwrap_used)]

	use super::{hash, verify};

	#[test]
	fn test_hash_and_verify() {
		let digest = hash("hunter22").unwrap();

		assert!(verify("hunter22", &digest));
		assert!(!verify("hunter23", &digest));
	}

	#[test]
	fn test_digests_are_salted() {
		let first = hash("hunter22").unwrap();
		let second = hash("hunter22").unwrap();

		assert_ne!(first, second);
		assert!(verify("hunter22", &first));
		assert!(verify("hunter22", &second));
	}

	#[test]
	fn test_malformed_digest_verifies_false() {
		assert!(!verify("hunter22", "not-a-digest"));
		assert!(!verify("hunter22", ""));
	}
}
