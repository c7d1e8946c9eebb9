//! Shipping address form.

use std::fmt;

use crate::models::{Address, ProfileUpdate, ShippingAddress, User};

/// A field the customer must fill before paying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressField {
    Street,
    City,
    Pincode,
    Phone,
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Street => "street",
            Self::City => "city",
            Self::Pincode => "pincode",
            Self::Phone => "phone",
        })
    }
}

/// Checkout address form, prefilled from the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

impl AddressForm {
    /// Prefill from the user's profile, leaving unknown fields blank.
    #[must_use]
    pub fn prefill(user: Option<&User>) -> Self {
        let Some(user) = user else {
            return Self::default();
        };
        let address = user.address.clone().unwrap_or_default();
        Self {
            name: user.name.clone(),
            phone: user.phone.clone().unwrap_or_default(),
            email: user.email.clone(),
            street: address.street,
            city: address.city,
            state: address.state,
            pincode: address.pincode,
        }
    }

    /// Required fields that are blank, in form order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<AddressField> {
        [
            (AddressField::Street, &self.street),
            (AddressField::City, &self.city),
            (AddressField::Pincode, &self.pincode),
            (AddressField::Phone, &self.phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }

    /// Profile payload mirroring the form.
    #[must_use]
    pub fn profile_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            name: self.name.clone(),
            phone: self.phone.clone(),
            address: Address {
                street: self.street.clone(),
                city: self.city.clone(),
                state: self.state.clone(),
                pincode: self.pincode.clone(),
            },
        }
    }

    /// Shipping address for the order.
    #[must_use]
    pub fn shipping_address(&self) -> ShippingAddress {
        ShippingAddress {
            address: self.street.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            pincode: self.pincode.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::session::tests::user;

    #[test]
    fn test_prefill_from_user() {
        let mut user = user();
        user.address = Some(Address {
            street: "12 Ring Rd".to_string(),
            city: "Surat".to_string(),
            state: "Gujarat".to_string(),
            pincode: "395002".to_string(),
        });

        let form = AddressForm::prefill(Some(&user));
        assert_eq!(form.name, "Meera Shah");
        assert_eq!(form.phone, "9876543210");
        assert_eq!(form.city, "Surat");
        assert!(form.missing_fields().is_empty());
    }

    #[test]
    fn test_missing_fields_in_form_order() {
        let form = AddressForm {
            street: "12 Ring Rd".to_string(),
            city: "  ".to_string(),
            ..AddressForm::default()
        };
        assert_eq!(
            form.missing_fields(),
            vec![AddressField::City, AddressField::Pincode, AddressField::Phone]
        );
    }

    #[test]
    fn test_state_is_optional() {
        let form = AddressForm {
            phone: "9876543210".to_string(),
            street: "12 Ring Rd".to_string(),
            city: "Surat".to_string(),
            pincode: "395002".to_string(),
            ..AddressForm::default()
        };
        assert!(form.missing_fields().is_empty());
        assert_eq!(form.shipping_address().address, "12 Ring Rd");
        assert_eq!(form.profile_update().address.pincode, "395002");
    }
}
