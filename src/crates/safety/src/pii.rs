//! PII detection and masking.
//!
//! Free-form text parameters are scanned for credit card numbers, social
//! security numbers, email addresses, and phone numbers, and each match is
//! masked in place. Masking is idempotent: the mask tokens match none of
//! the patterns.

use regex::Regex;
use std::sync::LazyLock;

static CREDIT_CARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{4}[- ]?\d{4}[- ]?\d{4}[- ]?\d{4}\b").expect("credit card pattern")
});

static SSN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("ssn pattern"));

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").expect("email pattern")
});

static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+?\d{1,2}[-. ]?\(?\d{3}\)?[-. ]?\d{3}[-. ]?\d{4}\b").expect("phone pattern")
});

/// Mask all recognized PII in `text`.
///
/// Returns the masked text and the list of categories that matched, in a
/// fixed order. Longer numeric patterns run first so a card number is not
/// half-consumed by the phone pattern.
pub fn mask_pii(text: &str) -> (String, Vec<&'static str>) {
    let mut masked = text.to_string();
    let mut categories = Vec::new();

    for (pattern, mask, category) in [
        (&*CREDIT_CARD, "[CARD]", "credit_card"),
        (&*SSN, "[SSN]", "ssn"),
        (&*EMAIL, "[EMAIL]", "email"),
        (&*PHONE, "[PHONE]", "phone"),
    ] {
        if pattern.is_match(&masked) {
            masked = pattern.replace_all(&masked, mask).into_owned();
            categories.push(category);
        }
    }

    (masked, categories)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_credit_card_numbers() {
        let (masked, categories) = mask_pii("pay with 4111 1111 1111 1111 please");
        assert_eq!(masked, "pay with [CARD] please");
        assert_eq!(categories, vec!["credit_card"]);
    }

    #[test]
    fn masks_ssn() {
        let (masked, categories) = mask_pii("my ssn is 123-45-6789");
        assert!(masked.contains("[SSN]"));
        assert_eq!(categories, vec!["ssn"]);
    }

    #[test]
    fn masks_email_addresses() {
        let (masked, categories) = mask_pii("write to alice@example.com now");
        assert_eq!(masked, "write to [EMAIL] now");
        assert_eq!(categories, vec!["email"]);
    }

    #[test]
    fn masks_phone_numbers() {
        let (masked, categories) = mask_pii("call 555-123-4567 tonight");
        assert!(masked.contains("[PHONE]"));
        assert_eq!(categories, vec!["phone"]);
    }

    #[test]
    fn reports_multiple_categories() {
        let (_, categories) = mask_pii("mail bob@x.io or call 555-123-4567");
        assert_eq!(categories, vec!["email", "phone"]);
    }

    #[test]
    fn clean_text_passes_unchanged() {
        let (masked, categories) = mask_pii("what's the weather in Paris?");
        assert_eq!(masked, "what's the weather in Paris?");
        assert!(categories.is_empty());
    }

    #[test]
    fn masking_is_idempotent() {
        let (once, _) = mask_pii("card 4111-1111-1111-1111, ssn 123-45-6789, a@b.co");
        let (twice, categories) = mask_pii(&once);
        assert_eq!(once, twice);
        assert!(categories.is_empty());
    }
}
