//! Checkout draft state.
//!
//! The draft holds the card and address form fragments a shopper has entered
//! but not yet submitted. It changes only through [`CheckoutDraft::apply`], a
//! pure transition from `(state, command)` to the next state:
//!
//! - each fragment is replaced wholesale on update (never merged)
//! - clearing resets both fragments together in a single transition
//!
//! ```
//! use acme_core::{CardFields, CheckoutCommand, CheckoutDraft};
//!
//! let draft = CheckoutDraft::default().apply(CheckoutCommand::SetCardFields(CardFields {
//!     card_number: "4242".to_string(),
//!     ..CardFields::default()
//! }));
//! assert!(!draft.card_fields.is_empty());
//!
//! let draft = draft.apply(CheckoutCommand::ClearCheckoutFields);
//! assert_eq!(draft, CheckoutDraft::default());
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};

/// Payment card form fragment.
///
/// Values are kept exactly as entered; validation belongs to the commerce
/// backend. `Debug` output masks the card number and CVC.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardFields {
    pub card_holder: String,
    pub card_number: String,
    pub card_expire_date: String,
    pub card_cvc: String,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub street_number: String,
    pub zip_code: String,
    pub city: String,
    pub country: String,
}

impl CardFields {
    /// Returns `true` when every field is blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Card number reduced to its last four digits, e.g. `•••• 4242`.
    #[must_use]
    pub fn masked_number(&self) -> String {
        let digits: Vec<char> = self
            .card_number
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        if digits.is_empty() {
            return String::new();
        }
        let tail: String = digits.iter().skip(digits.len().saturating_sub(4)).collect();
        format!("•••• {tail}")
    }
}

impl fmt::Debug for CardFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardFields")
            .field("card_holder", &self.card_holder)
            .field("card_number", &self.masked_number())
            .field("card_expire_date", &self.card_expire_date)
            .field("card_cvc", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("company", &self.company)
            .field("street_number", &self.street_number)
            .field("zip_code", &self.zip_code)
            .field("city", &self.city)
            .field("country", &self.country)
            .finish()
    }
}

/// Shipping address form fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressFields {
    #[serde(rename = "type")]
    pub address_type: String,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub street_number: String,
    pub apartments: String,
    pub zip_code: String,
    pub city: String,
    pub country: String,
}

impl AddressFields {
    /// Returns `true` when every field is blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// In-progress checkout form data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutDraft {
    pub card_fields: CardFields,
    pub address_fields: AddressFields,
}

/// A state transition on [`CheckoutDraft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutCommand {
    /// Replace the card fragment.
    SetCardFields(CardFields),
    /// Replace the address fragment.
    SetAddressFields(AddressFields),
    /// Reset both fragments to empty.
    ClearCheckoutFields,
}

impl CheckoutDraft {
    /// Apply a command and return the next state.
    #[must_use]
    pub fn apply(self, command: CheckoutCommand) -> Self {
        match command {
            CheckoutCommand::SetCardFields(card_fields) => Self {
                card_fields,
                ..self
            },
            CheckoutCommand::SetAddressFields(address_fields) => Self {
                address_fields,
                ..self
            },
            CheckoutCommand::ClearCheckoutFields => Self::default(),
        }
    }

    /// Returns `true` when neither fragment holds any data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.card_fields.is_empty() && self.address_fields.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn card(number: &str) -> CardFields {
        CardFields {
            card_number: number.to_string(),
            ..CardFields::default()
        }
    }

    fn address(city: &str) -> AddressFields {
        AddressFields {
            city: city.to_string(),
            ..AddressFields::default()
        }
    }

    #[test]
    fn test_default_is_empty() {
        let draft = CheckoutDraft::default();
        assert!(draft.is_empty());
        assert!(draft.card_fields.is_empty());
        assert!(draft.address_fields.is_empty());
    }

    #[test]
    fn test_set_card_replaces_wholesale() {
        let first = CardFields {
            card_holder: "Ada Lovelace".to_string(),
            card_number: "4242".to_string(),
            ..CardFields::default()
        };
        let draft = CheckoutDraft::default()
            .apply(CheckoutCommand::SetCardFields(first))
            .apply(CheckoutCommand::SetCardFields(card("5555")));

        // No merge: the holder from the first write is gone.
        assert_eq!(draft.card_fields, card("5555"));
        assert!(draft.card_fields.card_holder.is_empty());
    }

    #[test]
    fn test_setters_leave_other_fragment_alone() {
        let draft = CheckoutDraft::default()
            .apply(CheckoutCommand::SetAddressFields(address("Lisbon")))
            .apply(CheckoutCommand::SetCardFields(card("4242")));

        assert_eq!(draft.address_fields, address("Lisbon"));
        assert_eq!(draft.card_fields, card("4242"));
    }

    #[test]
    fn test_last_write_wins_over_interleaved_sequence() {
        let commands = vec![
            CheckoutCommand::SetCardFields(card("1111")),
            CheckoutCommand::SetAddressFields(address("Oslo")),
            CheckoutCommand::SetCardFields(card("2222")),
            CheckoutCommand::SetAddressFields(address("Rome")),
            CheckoutCommand::SetAddressFields(address("Kyoto")),
            CheckoutCommand::SetCardFields(card("3333")),
        ];

        let draft = commands
            .into_iter()
            .fold(CheckoutDraft::default(), CheckoutDraft::apply);

        assert_eq!(draft.card_fields, card("3333"));
        assert_eq!(draft.address_fields, address("Kyoto"));
    }

    #[test]
    fn test_clear_resets_both_fragments() {
        let draft = CheckoutDraft::default()
            .apply(CheckoutCommand::SetCardFields(card("4242")))
            .apply(CheckoutCommand::ClearCheckoutFields);
        assert_eq!(draft, CheckoutDraft::default());

        let draft = CheckoutDraft::default()
            .apply(CheckoutCommand::SetCardFields(card("4242")))
            .apply(CheckoutCommand::SetAddressFields(address("Paris")))
            .apply(CheckoutCommand::ClearCheckoutFields);
        assert!(draft.card_fields.is_empty());
        assert!(draft.address_fields.is_empty());
    }

    #[test]
    fn test_clear_on_empty_is_noop() {
        let draft = CheckoutDraft::default().apply(CheckoutCommand::ClearCheckoutFields);
        assert!(draft.is_empty());
    }

    #[test]
    fn test_debug_masks_card_secrets() {
        let fields = CardFields {
            card_number: "4242 4242 4242 4242".to_string(),
            card_cvc: "987".to_string(),
            ..CardFields::default()
        };
        let debug = format!("{fields:?}");
        assert!(debug.contains("•••• 4242"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("4242 4242"));
        assert!(!debug.contains("987"));
    }

    #[test]
    fn test_masked_number_short_input() {
        assert_eq!(card("42").masked_number(), "•••• 42");
        assert_eq!(card("").masked_number(), "");
    }

    #[test]
    fn test_serde_uses_camel_case_and_defaults() {
        let draft: CheckoutDraft =
            serde_json::from_str(r#"{"cardFields":{"cardNumber":"4242"}}"#).unwrap();
        assert_eq!(draft.card_fields, card("4242"));
        assert!(draft.address_fields.is_empty());

        let json = serde_json::to_value(address("Berlin")).unwrap();
        assert_eq!(json["city"], "Berlin");
        assert_eq!(json["type"], "");
    }
}
