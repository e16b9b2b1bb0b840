//! Accounts, opaque tokens and role policy.
//!
//! - `POST /register` creates an account with a salted password hash
//! - `POST /login` returns the account's token
//! - [`crate::core::middleware::auth_middleware`] resolves `Authorization: Bearer <token>`
//!   (or the legacy `Token <token>` scheme) into a [`model::Caller`]
//! - [`policy`] holds the role predicates every resource binds to

pub mod dtos;
pub mod handlers;
pub mod model;
pub mod policy;
pub mod routes;
pub mod services;

pub use services::{AuthService, TokenService};
