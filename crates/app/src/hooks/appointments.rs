use barbearia_cache::mutation::patches;
use barbearia_cache::{Mutation, QueryKey};
use barbearia_core::appointment::{
    state_machine, Appointment, AppointmentFilter, AppointmentStatus, CreateAppointment,
    StatusAction, StatusChange,
};
use barbearia_core::calendar::{self, CalendarEvent, CalendarResource, EventDrop};
use barbearia_core::error::CoreError;
use barbearia_core::professional::{Professional, ProfessionalFilter};
use barbearia_core::types::{EntityId, Page};
use chrono::NaiveDate;
use serde_json::json;

use super::{invalidate_dependents, to_value, ResourceHooks};
use crate::context::AppContext;

const STATUS_SOURCE: &str = "appointment.status";
const RESCHEDULE_SOURCE: &str = "appointment.reschedule";

/// Everything the day calendar renders.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarView {
    pub resources: Vec<CalendarResource>,
    pub events: Vec<CalendarEvent>,
}

/// Agenda operations: day lists, the actions menu, status changes and
/// drag-and-drop rescheduling.
#[derive(Clone)]
pub struct AppointmentHooks {
    ctx: AppContext,
    appointments: ResourceHooks<Appointment>,
    professionals: ResourceHooks<Professional>,
}

impl AppointmentHooks {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            appointments: ResourceHooks::new(ctx.clone()),
            professionals: ResourceHooks::new(ctx.clone()),
            ctx,
        }
    }

    /// Plain CRUD, e.g. to book a new appointment.
    pub fn crud(&self) -> &ResourceHooks<Appointment> {
        &self.appointments
    }

    pub async fn book(&self, form: CreateAppointment) -> Result<Appointment, CoreError> {
        self.appointments.create(form).await
    }

    pub async fn day(&self, date: NaiveDate) -> Result<Page<Appointment>, CoreError> {
        self.appointments.list(AppointmentFilter::day(date)).await
    }

    pub async fn get(&self, id: EntityId) -> Result<Appointment, CoreError> {
        self.appointments.get(id).await
    }

    /// Entries of the actions menu. Illegal transitions are never offered.
    pub fn actions(appointment: &Appointment) -> Vec<StatusAction> {
        appointment.available_actions()
    }

    /// Move `appointment` to `target` through the normal path.
    ///
    /// Transitions not allowed from the appointment's current status are
    /// refused locally without contacting the backend.
    pub async fn change_status(
        &self,
        appointment: &Appointment,
        target: AppointmentStatus,
        reason: Option<String>,
    ) -> Result<Appointment, CoreError> {
        if let Err(err) = state_machine::validate_transition(appointment.status, target) {
            return self.ctx.report(STATUS_SOURCE, Err(err)).await;
        }
        self.force_status_change(appointment.id, target, reason).await
    }

    /// Submit a status change without the local transition check. The
    /// backend is the authority; a rejection rolls the cached views back.
    pub async fn force_status_change(
        &self,
        id: EntityId,
        target: AppointmentStatus,
        reason: Option<String>,
    ) -> Result<Appointment, CoreError> {
        let this = self.clone();
        self.ctx
            .settle(STATUS_SOURCE, async move {
                let root = this.appointments.root().await?;
                let fields = json!({ "status": target });
                let mutation = patch_everywhere(Mutation::new(STATUS_SOURCE), &root, id, fields);

                let change = StatusChange {
                    status: target,
                    reason,
                };
                let updated = this
                    .ctx
                    .cache
                    .mutate(mutation, this.ctx.api.change_appointment_status(id, &change))
                    .await?;
                this.ctx
                    .cache
                    .set_query_data(root.detail(id), to_value(&updated)?)
                    .await;
                tracing::info!(appointment_id = %id, status = %target, "Appointment status changed");
                Ok(updated)
            })
            .await
    }

    /// Apply a calendar drag-and-drop.
    pub async fn reschedule(
        &self,
        appointment: &Appointment,
        drop: &EventDrop,
    ) -> Result<Appointment, CoreError> {
        let reschedule = match calendar::reschedule_from_drop(appointment, drop) {
            Ok(reschedule) => reschedule,
            Err(err) => return self.ctx.report(RESCHEDULE_SOURCE, Err(err)).await,
        };
        let id = appointment.id;
        let this = self.clone();
        self.ctx
            .settle(RESCHEDULE_SOURCE, async move {
                let root = this.appointments.root().await?;
                let fields = json!({
                    "start_time": reschedule.start_time,
                    "end_time": reschedule.end_time,
                    "professional_id": reschedule.professional_id,
                });
                let mutation =
                    patch_everywhere(Mutation::new(RESCHEDULE_SOURCE), &root, id, fields);

                let updated = this
                    .ctx
                    .cache
                    .mutate(mutation, this.ctx.api.reschedule_appointment(id, &reschedule))
                    .await?;
                this.ctx
                    .cache
                    .set_query_data(root.detail(id), to_value(&updated)?)
                    .await;
                Ok(updated)
            })
            .await
    }

    /// Professionals as calendar columns and the day's appointments as
    /// events.
    pub async fn calendar(&self, date: NaiveDate) -> Result<CalendarView, CoreError> {
        let professionals = self
            .professionals
            .list(ProfessionalFilter {
                active: Some(true),
                ..Default::default()
            })
            .await?;
        let appointments = self.day(date).await?;
        Ok(CalendarView {
            resources: calendar::to_resources(&professionals.data),
            events: calendar::to_events(&appointments.data),
        })
    }
}

/// Merge `fields` into the cached detail and every cached list row of
/// appointment `id`, and stale the dependent views on success.
fn patch_everywhere(
    mutation: Mutation,
    root: &QueryKey,
    id: EntityId,
    fields: serde_json::Value,
) -> Mutation {
    let id_str = id.to_string();
    let list_fields = fields.clone();
    let list_id = id_str.clone();
    let mutation = mutation
        .patch(root.clone().detail(id), move |v| {
            patches::merge_fields(v, &id_str, &fields)
        })
        .patch_all(root.clone().lists(), move |v| {
            patches::merge_fields(v, &list_id, &list_fields)
        })
        .invalidate(root.clone().lists());
    invalidate_dependents(mutation, "appointments")
}
