//! Customer (CRM) records. Customers are shared by every unit of a tenant.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::resource::{set_if, set_opt_if, Resource};
use crate::types::{EntityId, PageParams, Timestamp};
use crate::validation::{validate_cpf, validate_not_blank, validate_phone};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: EntityId,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub cpf: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCustomer {
    #[validate(
        length(min = 2, max = 100, message = "nome deve ter entre 2 e 100 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(email(message = "e-mail inválido"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_cpf"))]
    pub cpf: Option<String>,
    pub birth_date: Option<NaiveDate>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCustomer {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(
        length(min = 2, max = 100, message = "nome deve ter entre 2 e 100 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "e-mail inválido"))]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_cpf"))]
    pub cpf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerFilter {
    #[serde(flatten)]
    pub page: PageParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl Resource for Customer {
    const PATH: &'static str = "customers";
    const ENTITY: &'static str = "customer";
    const UNIT_SCOPED: bool = false;

    type Create = CreateCustomer;
    type Update = UpdateCustomer;
    type Filter = CustomerFilter;

    fn id(&self) -> EntityId {
        self.id
    }

    fn apply_update(&mut self, update: &UpdateCustomer) {
        set_if(&mut self.name, &update.name);
        set_if(&mut self.phone, &update.phone);
        set_opt_if(&mut self.email, &update.email);
        set_opt_if(&mut self.cpf, &update.cpf);
        set_opt_if(&mut self.birth_date, &update.birth_date);
        set_opt_if(&mut self.notes, &update.notes);
        set_if(&mut self.tags, &update.tags);
    }

    fn placeholder(id: EntityId, create: &CreateCustomer, now: Timestamp) -> Self {
        Self {
            id,
            name: create.name.clone(),
            phone: create.phone.clone(),
            email: create.email.clone(),
            cpf: create.cpf.clone(),
            birth_date: create.birth_date,
            notes: create.notes.clone(),
            tags: create.tags.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}
