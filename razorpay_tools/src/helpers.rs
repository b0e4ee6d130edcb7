use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Calculates the checkout signature the way Razorpay does: hex-encoded
/// HMAC-SHA256 over `"<gateway_order_id>|<payment_id>"` keyed with the API
/// secret.
pub fn payment_signature(key_secret: &str, gateway_order_id: &str, payment_id: &str) -> String {
    let payload = format!("{gateway_order_id}|{payment_id}");
    calculate_hmac(key_secret, payload.as_bytes())
}

pub fn calculate_hmac(secret: &str, data: &[u8]) -> String {
    // HMAC can take a key of any size, so new_from_slice cannot fail
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any size");
    mac.update(data);
    let digest = mac.finalize().into_bytes();
    digest.iter().fold(String::with_capacity(digest.len() * 2), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

/// Compares a supplied signature against the expected one for the given
/// order/payment pair.
pub fn verify_payment_signature(
    key_secret: &str,
    gateway_order_id: &str,
    payment_id: &str,
    signature: &str,
) -> bool {
    let expected = payment_signature(key_secret, gateway_order_id, payment_id);
    // Signatures are fixed-length hex strings, so a plain comparison does not leak length
    expected == signature.trim().to_ascii_lowercase()
}
