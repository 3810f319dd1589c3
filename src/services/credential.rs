//! Credential issuing.
//!
//! A paid purchase carries exactly one credential for its lifetime: an
//! opaque token derived from the purchase id plus a random high-entropy
//! suffix. It embeds no signature; its authority comes from matching it
//! against the purchase ledger. The `purchases.credential` UNIQUE
//! constraint backs system-wide uniqueness.

use uuid::Uuid;

const PREFIX: &str = "EVT";

pub fn issue(purchase_id: Uuid) -> String {
    format!(
        "{}-{}-{}",
        PREFIX,
        purchase_id.simple(),
        Uuid::new_v4().simple()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_credential_is_non_empty_and_prefixed() {
        let credential = issue(Uuid::new_v4());
        assert!(credential.starts_with("EVT-"));
        assert!(!credential.is_empty());
    }

    #[test]
    fn test_credential_embeds_purchase_id() {
        let purchase_id = Uuid::new_v4();
        let credential = issue(purchase_id);
        assert!(credential.contains(&purchase_id.simple().to_string()));
    }

    #[test]
    fn test_credentials_never_collide() {
        // Same purchase id issued repeatedly still yields distinct tokens;
        // the random suffix carries the entropy.
        let purchase_id = Uuid::new_v4();
        let tokens: HashSet<String> = (0..1000).map(|_| issue(purchase_id)).collect();
        assert_eq!(tokens.len(), 1000);
    }
}
