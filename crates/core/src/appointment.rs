//! Appointment model, forms and the status state machine.
//!
//! The state machine is a client-side pre-check: it filters the actions
//! menu and refuses illegal transitions before a request is made. The
//! backend remains authoritative and may still reject a transition.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::resource::{set_if, set_opt_if, Resource};
use crate::types::{Cents, EntityId, PageParams, Timestamp, UnitId};

/// Slot length assumed for optimistic placeholders until the backend
/// computes the real end time from the booked services.
pub const DEFAULT_SLOT_MINUTES: i64 = 30;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Created,
    Confirmed,
    CheckedIn,
    InService,
    AwaitingPayment,
    Done,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 8] = [
        AppointmentStatus::Created,
        AppointmentStatus::Confirmed,
        AppointmentStatus::CheckedIn,
        AppointmentStatus::InService,
        AppointmentStatus::AwaitingPayment,
        AppointmentStatus::Done,
        AppointmentStatus::Cancelled,
        AppointmentStatus::NoShow,
    ];

    /// Wire name, e.g. `CHECKED_IN`.
    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Created => "CREATED",
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::CheckedIn => "CHECKED_IN",
            AppointmentStatus::InService => "IN_SERVICE",
            AppointmentStatus::AwaitingPayment => "AWAITING_PAYMENT",
            AppointmentStatus::Done => "DONE",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::NoShow => "NO_SHOW",
        }
    }

    /// Status label shown in badges.
    pub fn label(self) -> &'static str {
        match self {
            AppointmentStatus::Created => "Agendado",
            AppointmentStatus::Confirmed => "Confirmado",
            AppointmentStatus::CheckedIn => "Cliente chegou",
            AppointmentStatus::InService => "Em atendimento",
            AppointmentStatus::AwaitingPayment => "Aguardando pagamento",
            AppointmentStatus::Done => "Concluído",
            AppointmentStatus::Cancelled => "Cancelado",
            AppointmentStatus::NoShow => "Não compareceu",
        }
    }

    /// Menu text for the action that moves an appointment into this status.
    pub fn action_label(self) -> &'static str {
        match self {
            AppointmentStatus::Created => "Reabrir",
            AppointmentStatus::Confirmed => "Confirmar",
            AppointmentStatus::CheckedIn => "Fazer check-in",
            AppointmentStatus::InService => "Iniciar atendimento",
            AppointmentStatus::AwaitingPayment => "Finalizar atendimento",
            AppointmentStatus::Done => "Concluir",
            AppointmentStatus::Cancelled => "Cancelar",
            AppointmentStatus::NoShow => "Marcar não comparecimento",
        }
    }

    pub fn is_terminal(self) -> bool {
        state_machine::valid_transitions(self).is_empty()
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = crate::error::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace('-', "_");
        AppointmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| {
                crate::error::CoreError::Validation(format!("Unknown appointment status '{s}'"))
            })
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

pub mod state_machine {
    use super::AppointmentStatus::{self, *};
    use crate::error::CoreError;

    /// Statuses reachable from `from` by a single user action, in menu order.
    ///
    /// `DONE` and `CANCELLED` are terminal and return an empty slice.
    pub fn valid_transitions(from: AppointmentStatus) -> &'static [AppointmentStatus] {
        match from {
            Created => &[Confirmed, Cancelled],
            Confirmed => &[CheckedIn, NoShow, Cancelled],
            CheckedIn => &[InService, NoShow, Cancelled],
            InService => &[AwaitingPayment, Cancelled],
            AwaitingPayment => &[Done, Cancelled],
            NoShow => &[Cancelled],
            Done | Cancelled => &[],
        }
    }

    pub fn can_transition(from: AppointmentStatus, to: AppointmentStatus) -> bool {
        valid_transitions(from).contains(&to)
    }

    pub fn validate_transition(
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Result<(), CoreError> {
        if can_transition(from, to) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "Invalid transition: {} ({from}) -> {} ({to})",
                from.label(),
                to.label()
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// Model and forms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: EntityId,
    pub tenant_id: EntityId,
    pub unit_id: UnitId,
    pub customer_id: EntityId,
    #[serde(default)]
    pub customer_name: String,
    pub professional_id: EntityId,
    #[serde(default)]
    pub professional_name: String,
    #[serde(default)]
    pub service_ids: Vec<EntityId>,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub total_cents: Cents,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An entry of the actions menu for one appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusAction {
    pub target: AppointmentStatus,
    pub label: &'static str,
    /// Destructive actions are rendered with a confirmation step.
    pub destructive: bool,
}

impl Appointment {
    /// Actions offered in the menu; illegal transitions are never listed.
    pub fn available_actions(&self) -> Vec<StatusAction> {
        state_machine::valid_transitions(self.status)
            .iter()
            .map(|&target| StatusAction {
                target,
                label: target.action_label(),
                destructive: matches!(
                    target,
                    AppointmentStatus::Cancelled | AppointmentStatus::NoShow
                ),
            })
            .collect()
    }

    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// Whether `[start, end)` intersects this appointment's interval.
    pub fn overlaps(&self, start: Timestamp, end: Timestamp) -> bool {
        self.start_time < end && start < self.end_time
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAppointment {
    pub customer_id: EntityId,
    pub professional_id: EntityId,
    #[validate(length(min = 1, message = "selecione ao menos um serviço"))]
    pub service_ids: Vec<EntityId>,
    pub start_time: Timestamp,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateAppointment {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "selecione ao menos um serviço"))]
    pub service_ids: Option<Vec<EntityId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Body of `PATCH /appointments/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StatusChange {
    pub status: AppointmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 300))]
    pub reason: Option<String>,
}

/// Body of `PATCH /appointments/{id}/reschedule`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reschedule {
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub professional_id: EntityId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentFilter {
    #[serde(flatten)]
    pub page: PageParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<chrono::NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<chrono::NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professional_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
}

impl AppointmentFilter {
    /// Appointments of a single calendar day.
    pub fn day(date: chrono::NaiveDate) -> Self {
        Self {
            date_from: Some(date),
            date_to: Some(date),
            ..Default::default()
        }
    }
}

impl Resource for Appointment {
    const PATH: &'static str = "appointments";
    const ENTITY: &'static str = "appointment";
    const UNIT_SCOPED: bool = true;

    type Create = CreateAppointment;
    type Update = UpdateAppointment;
    type Filter = AppointmentFilter;

    fn id(&self) -> EntityId {
        self.id
    }

    fn apply_update(&mut self, update: &UpdateAppointment) {
        set_if(&mut self.service_ids, &update.service_ids);
        set_opt_if(&mut self.notes, &update.notes);
    }

    fn placeholder(id: EntityId, create: &CreateAppointment, now: Timestamp) -> Self {
        Self {
            id,
            tenant_id: EntityId::nil(),
            unit_id: UnitId::nil(),
            customer_id: create.customer_id,
            customer_name: String::new(),
            professional_id: create.professional_id,
            professional_name: String::new(),
            service_ids: create.service_ids.clone(),
            start_time: create.start_time,
            end_time: create.start_time + Duration::minutes(DEFAULT_SLOT_MINUTES),
            status: AppointmentStatus::Created,
            total_cents: 0,
            notes: create.notes.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::state_machine::*;
    use super::AppointmentStatus::*;
    use super::*;

    // -----------------------------------------------------------------------
    // Transition table
    // -----------------------------------------------------------------------

    #[test]
    fn created_allows_confirm_and_cancel() {
        assert_eq!(valid_transitions(Created), &[Confirmed, Cancelled]);
    }

    #[test]
    fn confirmed_allows_check_in_no_show_and_cancel() {
        assert_eq!(valid_transitions(Confirmed), &[CheckedIn, NoShow, Cancelled]);
    }

    #[test]
    fn checked_in_allows_service_no_show_and_cancel() {
        assert_eq!(valid_transitions(CheckedIn), &[InService, NoShow, Cancelled]);
    }

    #[test]
    fn in_service_moves_to_awaiting_payment() {
        assert_eq!(valid_transitions(InService), &[AwaitingPayment, Cancelled]);
    }

    #[test]
    fn awaiting_payment_can_finish_or_cancel() {
        assert_eq!(valid_transitions(AwaitingPayment), &[Done, Cancelled]);
    }

    #[test]
    fn no_show_can_only_be_cancelled() {
        assert_eq!(valid_transitions(NoShow), &[Cancelled]);
    }

    #[test]
    fn terminal_states_have_no_transitions() {
        assert!(valid_transitions(Done).is_empty());
        assert!(valid_transitions(Cancelled).is_empty());
        assert!(Done.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!NoShow.is_terminal());
    }

    #[test]
    fn cancel_reachable_from_every_non_terminal_state() {
        for status in AppointmentStatus::ALL {
            if !status.is_terminal() {
                assert!(can_transition(status, Cancelled), "{status} -> CANCELLED");
            }
        }
    }

    #[test]
    fn linear_chain_is_legal() {
        let chain = [Created, Confirmed, CheckedIn, InService, AwaitingPayment, Done];
        for pair in chain.windows(2) {
            assert!(validate_transition(pair[0], pair[1]).is_ok());
        }
    }

    #[test]
    fn skipping_to_done_is_rejected() {
        let err = validate_transition(Created, Done).unwrap_err();
        assert!(err.to_string().contains("CREATED"));
        assert!(err.to_string().contains("DONE"));
    }

    #[test]
    fn no_self_transitions() {
        for status in AppointmentStatus::ALL {
            assert!(!can_transition(status, status));
        }
    }

    // -----------------------------------------------------------------------
    // Serialization and parsing
    // -----------------------------------------------------------------------

    #[test]
    fn status_uses_screaming_snake_case_on_the_wire() {
        let json = serde_json::to_string(&AwaitingPayment).unwrap();
        assert_eq!(json, "\"AWAITING_PAYMENT\"");
        let parsed: AppointmentStatus = serde_json::from_str("\"NO_SHOW\"").unwrap();
        assert_eq!(parsed, NoShow);
    }

    #[test]
    fn status_parses_loosely_from_cli_input() {
        assert_eq!("checked-in".parse::<AppointmentStatus>().unwrap(), CheckedIn);
        assert_eq!(" done ".parse::<AppointmentStatus>().unwrap(), Done);
        assert!("finished".parse::<AppointmentStatus>().is_err());
    }

    // -----------------------------------------------------------------------
    // Actions menu
    // -----------------------------------------------------------------------

    fn appointment(status: AppointmentStatus) -> Appointment {
        let start = chrono::Utc::now();
        Appointment {
            id: EntityId::new_v4(),
            tenant_id: EntityId::new_v4(),
            unit_id: UnitId::new_v4(),
            customer_id: EntityId::new_v4(),
            customer_name: "João".into(),
            professional_id: EntityId::new_v4(),
            professional_name: "Carlos".into(),
            service_ids: vec![EntityId::new_v4()],
            start_time: start,
            end_time: start + Duration::minutes(45),
            status,
            total_cents: 5000,
            notes: None,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn actions_follow_transition_order() {
        let actions = appointment(Confirmed).available_actions();
        let targets: Vec<_> = actions.iter().map(|a| a.target).collect();
        assert_eq!(targets, vec![CheckedIn, NoShow, Cancelled]);
        assert!(!actions[0].destructive);
        assert!(actions[2].destructive);
    }

    #[test]
    fn done_is_not_offered_from_created() {
        let actions = appointment(Created).available_actions();
        assert!(actions.iter().all(|a| a.target != Done));
    }

    #[test]
    fn overlap_uses_half_open_intervals() {
        let appt = appointment(Created);
        assert!(!appt.overlaps(appt.end_time, appt.end_time + Duration::minutes(30)));
        assert!(appt.overlaps(
            appt.start_time + Duration::minutes(10),
            appt.end_time + Duration::minutes(10)
        ));
        assert_eq!(appt.duration(), Duration::minutes(45));
    }

    #[test]
    fn create_requires_a_service() {
        let form = CreateAppointment {
            customer_id: EntityId::new_v4(),
            professional_id: EntityId::new_v4(),
            service_ids: vec![],
            start_time: chrono::Utc::now(),
            notes: None,
        };
        assert!(form.validate().is_err());
    }
}
