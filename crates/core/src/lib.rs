//! Domain types, validation and pure business rules for the barbershop
//! client. This crate has no internal dependencies so the client, cache
//! and hooks layers can all share it.

pub mod appointment;
pub mod auth;
pub mod caixa;
pub mod calendar;
pub mod catalog;
pub mod comanda;
pub mod commission;
pub mod customer;
pub mod dashboard;
pub mod error;
pub mod finance;
pub mod goal;
pub mod pricing;
pub mod professional;
pub mod resource;
pub mod stock;
pub mod subscription;
pub mod tenancy;
pub mod types;
pub mod validation;

pub use error::{CoreError, ErrorCategory};
pub use resource::Resource;
