//! Mapping between appointments and the calendar widget's generic
//! event/resource model.
//!
//! Professionals become calendar resources (columns), appointments become
//! events. A drag/drop on the widget is mapped back to a [`Reschedule`]
//! request that keeps the appointment's duration.

use serde::{Deserialize, Serialize};

use crate::appointment::{Appointment, AppointmentStatus, Reschedule};
use crate::error::CoreError;
use crate::professional::Professional;
use crate::types::{EntityId, Timestamp};

/// Fallback color for professionals without one.
pub const DEFAULT_RESOURCE_COLOR: &str = "#64748b";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarResource {
    pub id: EntityId,
    pub title: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: EntityId,
    pub resource_id: EntityId,
    pub start: Timestamp,
    pub end: Timestamp,
    pub title: String,
    pub color: String,
    /// Whether the widget allows dragging or resizing the event.
    pub editable: bool,
}

/// A drop reported by the widget after the user drags an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDrop {
    pub event_id: EntityId,
    pub new_start: Timestamp,
    /// Column the event was dropped on, when it changed.
    pub new_resource_id: Option<EntityId>,
}

/// Only appointments that have not started can be moved.
pub fn is_draggable(status: AppointmentStatus) -> bool {
    matches!(
        status,
        AppointmentStatus::Created | AppointmentStatus::Confirmed
    )
}

pub fn status_color(status: AppointmentStatus) -> &'static str {
    match status {
        AppointmentStatus::Created => "#94a3b8",
        AppointmentStatus::Confirmed => "#3b82f6",
        AppointmentStatus::CheckedIn => "#8b5cf6",
        AppointmentStatus::InService => "#f59e0b",
        AppointmentStatus::AwaitingPayment => "#f97316",
        AppointmentStatus::Done => "#22c55e",
        AppointmentStatus::Cancelled => "#ef4444",
        AppointmentStatus::NoShow => "#6b7280",
    }
}

pub fn to_resource(professional: &Professional) -> CalendarResource {
    CalendarResource {
        id: professional.id,
        title: professional.name.clone(),
        color: professional
            .color
            .clone()
            .unwrap_or_else(|| DEFAULT_RESOURCE_COLOR.to_string()),
    }
}

/// Resources for active professionals, in the given order.
pub fn to_resources(professionals: &[Professional]) -> Vec<CalendarResource> {
    professionals
        .iter()
        .filter(|p| p.active)
        .map(to_resource)
        .collect()
}

pub fn to_event(appointment: &Appointment) -> CalendarEvent {
    let title = if appointment.customer_name.is_empty() {
        appointment.status.label().to_string()
    } else {
        format!("{} · {}", appointment.customer_name, appointment.status.label())
    };
    CalendarEvent {
        id: appointment.id,
        resource_id: appointment.professional_id,
        start: appointment.start_time,
        end: appointment.end_time,
        title,
        color: status_color(appointment.status).to_string(),
        editable: is_draggable(appointment.status),
    }
}

/// Events for the calendar; cancelled appointments are hidden.
pub fn to_events(appointments: &[Appointment]) -> Vec<CalendarEvent> {
    appointments
        .iter()
        .filter(|a| a.status != AppointmentStatus::Cancelled)
        .map(to_event)
        .collect()
}

/// Map a drop back to a reschedule request for `appointment`.
pub fn reschedule_from_drop(
    appointment: &Appointment,
    drop: &EventDrop,
) -> Result<Reschedule, CoreError> {
    if drop.event_id != appointment.id {
        return Err(CoreError::Internal(format!(
            "Drop for event {} applied to appointment {}",
            drop.event_id, appointment.id
        )));
    }
    if !is_draggable(appointment.status) {
        return Err(CoreError::Validation(format!(
            "Appointment in status {} cannot be moved",
            appointment.status
        )));
    }
    Ok(Reschedule {
        start_time: drop.new_start,
        end_time: drop.new_start + appointment.duration(),
        professional_id: drop.new_resource_id.unwrap_or(appointment.professional_id),
    })
}

/// Apply a reschedule to a cached copy.
pub fn apply_reschedule(appointment: &mut Appointment, reschedule: &Reschedule) {
    appointment.start_time = reschedule.start_time;
    appointment.end_time = reschedule.end_time;
    appointment.professional_id = reschedule.professional_id;
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};

    fn appointment(status: AppointmentStatus) -> Appointment {
        let start = Utc.with_ymd_and_hms(2026, 10, 16, 14, 0, 0).unwrap();
        Appointment {
            id: EntityId::new_v4(),
            tenant_id: EntityId::new_v4(),
            unit_id: EntityId::new_v4(),
            customer_id: EntityId::new_v4(),
            customer_name: "Rafael".into(),
            professional_id: EntityId::new_v4(),
            professional_name: "Bruno".into(),
            service_ids: vec![],
            start_time: start,
            end_time: start + Duration::minutes(40),
            status,
            total_cents: 6000,
            notes: None,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn event_mirrors_appointment() {
        let appt = appointment(AppointmentStatus::Confirmed);
        let event = to_event(&appt);
        assert_eq!(event.id, appt.id);
        assert_eq!(event.resource_id, appt.professional_id);
        assert_eq!(event.title, "Rafael · Confirmado");
        assert!(event.editable);
    }

    #[test]
    fn in_service_events_are_locked() {
        assert!(!to_event(&appointment(AppointmentStatus::InService)).editable);
    }

    #[test]
    fn cancelled_events_are_hidden() {
        let events = to_events(&[
            appointment(AppointmentStatus::Cancelled),
            appointment(AppointmentStatus::Created),
        ]);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn drop_preserves_duration_and_moves_column() {
        let appt = appointment(AppointmentStatus::Created);
        let new_start = appt.start_time + Duration::hours(2);
        let other = EntityId::new_v4();
        let reschedule = reschedule_from_drop(
            &appt,
            &EventDrop {
                event_id: appt.id,
                new_start,
                new_resource_id: Some(other),
            },
        )
        .unwrap();
        assert_eq!(reschedule.start_time, new_start);
        assert_eq!(reschedule.end_time, new_start + Duration::minutes(40));
        assert_eq!(reschedule.professional_id, other);

        let mut moved = appt.clone();
        apply_reschedule(&mut moved, &reschedule);
        assert_eq!(moved.duration(), appt.duration());
    }

    #[test]
    fn dropping_a_done_appointment_is_rejected() {
        let appt = appointment(AppointmentStatus::Done);
        let drop = EventDrop {
            event_id: appt.id,
            new_start: appt.start_time,
            new_resource_id: None,
        };
        assert_matches!(reschedule_from_drop(&appt, &drop), Err(CoreError::Validation(_)));
    }

    #[test]
    fn inactive_professionals_are_not_resources() {
        let now = Utc::now();
        let pro = |active| Professional {
            id: EntityId::new_v4(),
            unit_id: EntityId::new_v4(),
            name: "Bruno".into(),
            phone: None,
            email: None,
            specialties: vec![],
            commission_percent: 40,
            color: None,
            active,
            created_at: now,
            updated_at: now,
        };
        let resources = to_resources(&[pro(true), pro(false)]);
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].color, DEFAULT_RESOURCE_COLOR);
    }
}
