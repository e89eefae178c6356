use crate::error::{CoreError, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies payment captures with the server-held gateway secret.
///
/// The signature is HMAC-SHA256 over `order_id|payment_id`, hex-encoded.
/// Verification recomputes the MAC and compares in constant time
/// (`Mac::verify_slice`); it is never skipped or trusted from client input.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Vec<u8>,
}

impl SignatureVerifier {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    fn mac(&self, order_id: &str, payment_id: &str) -> HmacSha256 {
        // HMAC accepts keys of any length.
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC key of any length is accepted");
        mac.update(order_id.as_bytes());
        mac.update(b"|");
        mac.update(payment_id.as_bytes());
        mac
    }

    /// Produces the expected signature. Used by the simulated gateway; a real
    /// gateway computes this on its side with the shared secret.
    pub fn sign(&self, order_id: &str, payment_id: &str) -> String {
        hex::encode(self.mac(order_id, payment_id).finalize().into_bytes())
    }

    /// Fails with [`CoreError::InvalidSignature`] on any mismatch, including
    /// signatures that are not valid hex.
    pub fn verify(&self, order_id: &str, payment_id: &str, signature: &str) -> Result<()> {
        let claimed = hex::decode(signature).map_err(|_| CoreError::InvalidSignature)?;
        self.mac(order_id, payment_id)
            .verify_slice(&claimed)
            .map_err(|_| CoreError::InvalidSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let verifier = SignatureVerifier::new("secret");
        let signature = verifier.sign("order_1", "pay_1");
        assert!(verifier.verify("order_1", "pay_1", &signature).is_ok());
    }

    #[test]
    fn test_tampered_ids_rejected() {
        let verifier = SignatureVerifier::new("secret");
        let signature = verifier.sign("order_1", "pay_1");
        assert!(matches!(
            verifier.verify("order_1", "pay_2", &signature),
            Err(CoreError::InvalidSignature)
        ));
        assert!(matches!(
            verifier.verify("order_2", "pay_1", &signature),
            Err(CoreError::InvalidSignature)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signature = SignatureVerifier::new("secret-a").sign("order_1", "pay_1");
        assert!(
            SignatureVerifier::new("secret-b")
                .verify("order_1", "pay_1", &signature)
                .is_err()
        );
    }

    #[test]
    fn test_non_hex_signature_rejected() {
        let verifier = SignatureVerifier::new("secret");
        assert!(matches!(
            verifier.verify("order_1", "pay_1", "not hex at all"),
            Err(CoreError::InvalidSignature)
        ));
    }
}
