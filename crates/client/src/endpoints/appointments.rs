use barbearia_core::appointment::{Appointment, Reschedule, StatusChange};
use barbearia_core::error::CoreError;
use barbearia_core::types::EntityId;
use barbearia_core::validation::validate_form;

use crate::api::ApiClient;

impl ApiClient {
    /// Submit a status change as-is. Legality is checked by the caller and
    /// authoritatively by the backend.
    pub async fn change_appointment_status(
        &self,
        id: EntityId,
        change: &StatusChange,
    ) -> Result<Appointment, CoreError> {
        validate_form(change)?;
        self.session().require_unit().await?;
        self.patch(&format!("appointments/{id}/status"), change)
            .await
            .map_err(|e| e.into_core_for("appointment", Some(id)))
    }

    pub async fn reschedule_appointment(
        &self,
        id: EntityId,
        reschedule: &Reschedule,
    ) -> Result<Appointment, CoreError> {
        if reschedule.end_time <= reschedule.start_time {
            return Err(CoreError::Validation(
                "horário final deve ser posterior ao inicial".into(),
            ));
        }
        self.session().require_unit().await?;
        self.patch(&format!("appointments/{id}/reschedule"), reschedule)
            .await
            .map_err(|e| e.into_core_for("appointment", Some(id)))
    }
}
