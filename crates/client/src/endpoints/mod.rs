//! Endpoints beyond plain CRUD, grouped by backend area.

mod appointments;
mod auth;
mod caixa;
mod comanda;
mod commissions;
mod dashboard;
mod finance;
mod pricing;
mod stock;
mod subscriptions;
mod units;
