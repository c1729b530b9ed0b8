use async_trait::async_trait;

use crate::domain::authentication::ports::CredentialVerifier;

/// Argon2 verification on the blocking pool so a login never stalls the
/// async workers.
#[async_trait]
impl CredentialVerifier for auth::PasswordHasher {
    async fn verify(&self, password: &str, password_hash: &str) -> bool {
        let hasher = self.clone();
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();

        let outcome =
            tokio::task::spawn_blocking(move || hasher.verify(&password, &password_hash)).await;

        match outcome {
            Ok(Ok(matches)) => matches,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Stored password hash is unreadable");
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "Password verification task failed");
                false
            }
        }
    }

    async fn verify_decoy(&self, password: &str) {
        let hasher = self.clone();
        let password = password.to_owned();

        match tokio::task::spawn_blocking(move || hasher.verify_decoy(&password)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::error!(error = %e, "Decoy password check failed"),
            Err(e) => tracing::error!(error = %e, "Password verification task failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> auth::PasswordHasher {
        auth::PasswordHasher::with_params(auth::HashingParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_verify_matches_stored_hash() {
        let hasher = hasher();
        let hash = hasher.hash("Secret1").unwrap();

        assert!(CredentialVerifier::verify(&hasher, "Secret1", &hash).await);
        assert!(!CredentialVerifier::verify(&hasher, "Wrong99", &hash).await);
    }

    #[tokio::test]
    async fn test_verify_unreadable_hash_is_mismatch() {
        assert!(!CredentialVerifier::verify(&hasher(), "Secret1", "not-a-phc-string").await);
    }

    #[tokio::test]
    async fn test_verify_decoy_completes() {
        let hasher = hasher();
        CredentialVerifier::verify_decoy(&hasher, "Secret1").await;
        CredentialVerifier::verify_decoy(&hasher, "Secret1").await;
    }
}
