//! Read and write operations for each page of the dashboard.

mod appointments;
mod caixa;
mod comanda;
mod finance;
mod reports;
mod resource;
mod stock;

pub use appointments::{AppointmentHooks, CalendarView};
pub use caixa::CaixaHooks;
pub use comanda::ComandaHooks;
pub use finance::FinanceHooks;
pub use reports::ReportHooks;
pub use resource::ResourceHooks;
pub use stock::StockHooks;

use barbearia_cache::{Mutation, QueryKey};
use barbearia_core::error::CoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Views derived from a resource that go stale when it changes.
fn dependents(resource: &str) -> &'static [&'static str] {
    match resource {
        "appointments" => &["dashboard", "commissions", "calendar"],
        "comandas" => &["dashboard", "caixa", "commissions", "stock"],
        "stock" => &["products"],
        "products" => &["stock"],
        "professionals" => &["calendar"],
        "accounts-payable" | "accounts-receivable" => &["financial"],
        _ => &[],
    }
}

/// Add the dependents of `resource` to a mutation's invalidations.
fn invalidate_dependents(mut mutation: Mutation, resource: &str) -> Mutation {
    for dependent in dependents(resource) {
        mutation = mutation.invalidate(QueryKey::new(*dependent));
    }
    mutation
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, CoreError> {
    serde_json::to_value(value).map_err(|e| CoreError::Internal(format!("encode: {e}")))
}

/// Edit a cached JSON record through its typed form. Values that do not
/// decode as `T` are left unchanged.
fn patch_typed<T: Serialize + DeserializeOwned>(value: &mut Value, f: impl Fn(&mut T)) {
    if let Ok(mut typed) = serde_json::from_value::<T>(value.clone()) {
        f(&mut typed);
        if let Ok(patched) = serde_json::to_value(&typed) {
            *value = patched;
        }
    }
}
