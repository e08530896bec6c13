//! # Validation Module
//!
//! Order form validation for Plateful.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Order form (TypeScript)                                      │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate feedback                                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Order service (Rust)                                         │
//! │  ├── THIS MODULE: customer, address, item names, limits                │
//! │  └── pricing::price: amounts, discount, tip, fee schedule              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── CHECK constraints on status and totals                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Monetary rules live in the pricing engine. This module only covers what
//! the engine does not look at.
//!
//! ## Usage
//! ```rust
//! use plateful_core::validation::{validate_phone, validate_quantity};
//!
//! validate_phone("(555) 010-4477").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::types::{Cart, Customer, DeliveryAddress, FulfillmentType};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_MODIFIERS_PER_ITEM, MAX_NOTES_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_ADDRESS_FIELD_LEN: usize = 200;
const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

// =============================================================================
// String Validators
// =============================================================================

fn required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a menu item name.
///
/// ## Example
/// ```rust
/// use plateful_core::validation::validate_item_name;
///
/// assert!(validate_item_name("Pad Thai").is_ok());
/// assert!(validate_item_name("  ").is_err());
/// ```
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    required_text("item name", name, MAX_NAME_LEN)
}

/// Validates the customer's display name.
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    required_text("customer name", name, MAX_NAME_LEN)
}

/// Validates a phone number.
///
/// ## Rules
/// - Digits plus the separators `+ - . ( )` and spaces
/// - `+` only as the first character
/// - 7 to 15 digits (E.164 maximum)
///
/// ## Example
/// ```rust
/// use plateful_core::validation::validate_phone;
///
/// assert!(validate_phone("+1 555 010 4477").is_ok());
/// assert!(validate_phone("555-CALL-NOW").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "phone".to_string(),
        reason: reason.to_string(),
    };

    let body = phone.strip_prefix('+').unwrap_or(phone);
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '.' | '(' | ')'))
    {
        return Err(invalid("may contain only digits, spaces, and - . ( )"));
    }

    let digits = body.chars().filter(char::is_ascii_digit).count();
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits) {
        return Err(invalid("must have between 7 and 15 digits"));
    }

    Ok(())
}

/// Validates free-text notes (order or item level).
///
/// Notes are optional; only the length is checked.
pub fn validate_notes(field: &str, notes: Option<&str>) -> ValidationResult<()> {
    match notes {
        Some(text) if text.chars().count() > MAX_NOTES_LEN => Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NOTES_LEN,
        }),
        _ => Ok(()),
    }
}

/// Validates a delivery address.
///
/// ## Rules
/// - line1, city, state, postal code required
/// - postal code: 5 digits, optionally followed by `-` and 4 digits
pub fn validate_delivery_address(address: &DeliveryAddress) -> ValidationResult<()> {
    required_text("address line 1", &address.line1, MAX_ADDRESS_FIELD_LEN)?;
    if let Some(line2) = &address.line2 {
        if line2.chars().count() > MAX_ADDRESS_FIELD_LEN {
            return Err(ValidationError::TooLong {
                field: "address line 2".to_string(),
                max: MAX_ADDRESS_FIELD_LEN,
            });
        }
    }
    required_text("city", &address.city, MAX_ADDRESS_FIELD_LEN)?;
    required_text("state", &address.state, MAX_ADDRESS_FIELD_LEN)?;

    let postal = address.postal_code.trim();
    if postal.is_empty() {
        return Err(ValidationError::Required {
            field: "postal code".to_string(),
        });
    }

    let (zip, plus4) = match postal.split_once('-') {
        Some((zip, plus4)) => (zip, Some(plus4)),
        None => (postal, None),
    };
    let all_digits = |s: &str, len: usize| s.len() == len && s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(zip, 5) || plus4.is_some_and(|p| !all_digits(p, 4)) {
        return Err(ValidationError::InvalidFormat {
            field: "postal code".to_string(),
            reason: "must be 5 digits or ZIP+4".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must not be negative (zero lines are kept on the receipt)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Order form: quantity field                                             │
/// │                                                                         │
/// │  Staff enters quantity: 1000                                           │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(1000) ← THIS FUNCTION                               │
/// │       │                                                                 │
/// │       ├── qty < 0?   → Error: "quantity must be between 0 and 999"     │
/// │       │                                                                 │
/// │       ├── qty > 999? → Error: "quantity must be between 0 and 999"     │
/// │       │                                                                 │
/// │       └── OK → price the cart                                          │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if !(0..=MAX_ITEM_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates cart size (number of lines).
pub fn validate_cart_size(lines: usize) -> ValidationResult<()> {
    if lines > MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

/// Validates the number of modifiers on one item.
pub fn validate_modifier_count(count: usize) -> ValidationResult<()> {
    if count > MAX_MODIFIERS_PER_ITEM {
        return Err(ValidationError::OutOfRange {
            field: "modifiers".to_string(),
            min: 0,
            max: MAX_MODIFIERS_PER_ITEM as i64,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format (order ids).
///
/// ## Example
/// ```rust
/// use plateful_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Composite
// =============================================================================

/// Validates everything on an order form that the pricing engine ignores.
///
/// Runs before pricing, so an order with a blank customer name never reaches
/// the checkout provider.
pub fn validate_order_details(
    customer: &Customer,
    fulfillment: FulfillmentType,
    notes: Option<&str>,
    cart: &Cart,
) -> ValidationResult<()> {
    validate_customer_name(&customer.name)?;
    validate_phone(&customer.phone)?;

    if fulfillment == FulfillmentType::Delivery {
        let address = customer.address.as_ref().ok_or_else(|| ValidationError::Required {
            field: "delivery address".to_string(),
        })?;
        validate_delivery_address(address)?;
    }

    validate_notes("order notes", notes)?;
    validate_cart_size(cart.items.len())?;

    for item in &cart.items {
        validate_item_name(&item.name)?;
        validate_quantity(item.quantity)?;
        validate_modifier_count(item.modifiers.len())?;
        validate_notes("item notes", item.notes.as_deref())?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
