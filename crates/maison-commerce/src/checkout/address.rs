//! Address types.

use crate::error::CommerceError;
use serde::{Deserialize, Serialize};

/// A shipping address as captured at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Address {
    /// Recipient name.
    pub full_name: String,
    /// Contact phone number.
    pub phone: String,
    /// Address line 1.
    pub line1: String,
    /// Address line 2 (apartment, landmark).
    pub line2: Option<String>,
    /// City.
    pub city: String,
    /// State or province.
    pub state: String,
    /// Postal/PIN code.
    pub postal_code: String,
    /// Country name or code.
    pub country: String,
}

impl Address {
    /// Trim whitespace from every field.
    pub fn normalized(mut self) -> Self {
        fn trim(s: &mut String) {
            *s = s.trim().to_string();
        }
        trim(&mut self.full_name);
        trim(&mut self.phone);
        trim(&mut self.line1);
        trim(&mut self.city);
        trim(&mut self.state);
        trim(&mut self.postal_code);
        trim(&mut self.country);
        self.line2 = self
            .line2
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        self
    }

    /// Check required fields, postal code and phone format.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let required = [
            ("full_name", &self.full_name),
            ("phone", &self.phone),
            ("line1", &self.line1),
            ("city", &self.city),
            ("state", &self.state),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(CommerceError::validation(format!("{field} is required")));
            }
            if value.chars().count() > 200 {
                return Err(CommerceError::validation(format!("{field} is too long")));
            }
        }

        let postal = self.postal_code.trim();
        let postal_ok = (4..=10).contains(&postal.len())
            && postal
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-');
        if !postal_ok {
            return Err(CommerceError::validation(
                "postal_code must be 4-10 letters or digits",
            ));
        }

        let phone = self.phone.trim();
        let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
        let phone_chars_ok = phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'));
        if !phone_chars_ok || !(7..=15).contains(&digits) {
            return Err(CommerceError::validation("phone must contain 7-15 digits"));
        }

        Ok(())
    }

    /// Format as single line.
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.line1.as_str()];
        if let Some(ref line2) = self.line2 {
            parts.push(line2);
        }
        parts.push(&self.city);
        parts.push(&self.state);
        parts.push(&self.postal_code);
        parts.push(&self.country);
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Address {
        Address {
            full_name: "Asha Rao".into(),
            phone: "+91 98765 43210".into(),
            line1: "12 MG Road".into(),
            line2: None,
            city: "Bengaluru".into(),
            state: "Karnataka".into(),
            postal_code: "560001".into(),
            country: "India".into(),
        }
    }

    #[test]
    fn test_valid_address() {
        let addr = sample();
        assert!(addr.validate().is_ok());
        assert_eq!(
            addr.one_line(),
            "12 MG Road, Bengaluru, Karnataka, 560001, India"
        );
    }

    #[test]
    fn test_missing_field() {
        let mut addr = sample();
        addr.city = "  ".into();
        assert!(addr.validate().is_err());
    }

    #[test]
    fn test_postal_code_and_phone() {
        let mut addr = sample();
        addr.postal_code = "123".into();
        assert!(addr.validate().is_err());

        let mut addr = sample();
        addr.phone = "12345".into();
        assert!(addr.validate().is_err());

        let mut addr = sample();
        addr.phone = "call me".into();
        assert!(addr.validate().is_err());
    }

    #[test]
    fn test_normalized_drops_blank_line2() {
        let mut addr = sample();
        addr.line2 = Some("   ".into());
        addr.city = " Bengaluru ".into();
        let addr = addr.normalized();
        assert!(addr.line2.is_none());
        assert_eq!(addr.city, "Bengaluru");
    }
}
