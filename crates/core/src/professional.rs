use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::resource::{set_if, set_opt_if, Resource};
use crate::types::{EntityId, PageParams, Timestamp, UnitId};
use crate::validation::{validate_not_blank, validate_phone};

/// A barber or other professional working at a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Professional {
    pub id: EntityId,
    pub unit_id: UnitId,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    /// Share of service revenue paid as commission, 0..=100.
    pub commission_percent: u8,
    /// Calendar color, `#RRGGBB`.
    pub color: Option<String>,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProfessional {
    #[validate(length(min = 2, max = 100), custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[validate(range(max = 100, message = "comissão deve estar entre 0 e 100%"))]
    pub commission_percent: u8,
    #[validate(length(equal = 7))]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfessional {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, max = 100), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialties: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(max = 100, message = "comissão deve estar entre 0 e 100%"))]
    pub commission_percent: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(equal = 7))]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfessionalFilter {
    #[serde(flatten)]
    pub page: PageParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl Resource for Professional {
    const PATH: &'static str = "professionals";
    const ENTITY: &'static str = "professional";
    const UNIT_SCOPED: bool = true;

    type Create = CreateProfessional;
    type Update = UpdateProfessional;
    type Filter = ProfessionalFilter;

    fn id(&self) -> EntityId {
        self.id
    }

    fn apply_update(&mut self, update: &UpdateProfessional) {
        set_if(&mut self.name, &update.name);
        set_opt_if(&mut self.phone, &update.phone);
        set_opt_if(&mut self.email, &update.email);
        set_if(&mut self.specialties, &update.specialties);
        set_if(&mut self.commission_percent, &update.commission_percent);
        set_opt_if(&mut self.color, &update.color);
        set_if(&mut self.active, &update.active);
    }

    fn placeholder(id: EntityId, create: &CreateProfessional, now: Timestamp) -> Self {
        Self {
            id,
            unit_id: UnitId::nil(),
            name: create.name.clone(),
            phone: create.phone.clone(),
            email: create.email.clone(),
            specialties: create.specialties.clone(),
            commission_percent: create.commission_percent,
            color: create.color.clone(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commission_above_one_hundred_is_rejected() {
        let form = CreateProfessional {
            name: "Carlos".into(),
            phone: None,
            email: None,
            specialties: vec![],
            commission_percent: 120,
            color: None,
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("commission_percent"));
    }

    #[test]
    fn deactivation_is_applied_optimistically() {
        let form = CreateProfessional {
            name: "Carlos".into(),
            phone: Some("11987654321".into()),
            email: None,
            specialties: vec!["barba".into()],
            commission_percent: 40,
            color: Some("#aa3300".into()),
        };
        let mut pro = Professional::placeholder(EntityId::new_v4(), &form, chrono::Utc::now());
        assert!(pro.active);
        pro.apply_update(&UpdateProfessional {
            active: Some(false),
            ..Default::default()
        });
        assert!(!pro.active);
        assert_eq!(pro.commission_percent, 40);
    }
}
