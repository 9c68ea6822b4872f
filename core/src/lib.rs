//! # lanscope core
//!
//! The two engines behind the tool: address-resolution host discovery
//! ([`scanner`]) and live traffic capture ([`capture`]) feeding the
//! protocol classifier ([`classify`]) and the session result store
//! ([`results`]). The static vendor and service lookup tables live in
//! [`vendors`] and [`services`].

pub mod capture;
pub mod classify;
pub mod results;
pub mod scanner;
pub mod services;
pub mod vendors;
