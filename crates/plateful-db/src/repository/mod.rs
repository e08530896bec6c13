//! # Repository Module
//!
//! Database repository implementations for Plateful.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  OrderService                                                          │
//! │       │                                                                 │
//! │       │  db.orders().insert(new_order)                                 │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── insert / get_by_id / get_by_checkout_link                         │
//! │  ├── list_recent / list_by_status                                      │
//! │  └── attach_checkout_link / update_payment_status / set_visibility     │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod order;
