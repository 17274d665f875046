//! Construction plans.
//!
//! A plan arrives as an untrusted document from an external generator. It is
//! located inside whatever envelope the generator wrapped it in
//! ([`extract::find_plan`]), then checked against the target region and the
//! allowed vocabulary ([`validator::validate_plan`]) before anything trusts it.

pub mod entities;
pub mod extract;
pub mod request;
pub mod tree;
pub mod validator;
