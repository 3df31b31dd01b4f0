pub mod error;
pub mod ledger_service;
pub mod ranking;
pub mod referral;
