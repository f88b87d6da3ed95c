//! Business logic services.
//!
//! Services contain the business rules separated from HTTP handlers: fee
//! arithmetic, refund/payout/settlement validation, KYC submission and the
//! CSV report builder. Rules are plain functions where possible so they are
//! testable without a database; the database-touching paths follow the
//! lock-update-commit pattern.

pub mod auth_service;
pub mod fees;
pub mod kyc_service;
pub mod payout_service;
pub mod refund_service;
pub mod report_service;
pub mod settlement_service;
pub mod transaction_service;
