use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::resource::{set_if, Resource};
use crate::types::{EntityId, PageParams, Timestamp, UnitId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    /// Target in centavos of revenue.
    Revenue,
    /// Target in number of services performed.
    Services,
    /// Target in number of products sold.
    Products,
}

/// Monthly goal for a unit or, when `professional_id` is set, for one professional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: EntityId,
    pub unit_id: UnitId,
    pub professional_id: Option<EntityId>,
    pub kind: GoalKind,
    pub target: i64,
    #[serde(default)]
    pub achieved: i64,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub created_at: Timestamp,
}

impl Goal {
    /// Achievement in percent, capped at 100.
    pub fn progress_percent(&self) -> u8 {
        if self.target <= 0 {
            return 100;
        }
        let pct = (self.achieved.max(0) * 100) / self.target;
        pct.min(100) as u8
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_goal_period"))]
pub struct CreateGoal {
    pub professional_id: Option<EntityId>,
    pub kind: GoalKind,
    #[validate(range(min = 1, message = "meta deve ser maior que zero"))]
    pub target: i64,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

fn validate_goal_period(goal: &CreateGoal) -> Result<(), ValidationError> {
    if goal.period_start > goal.period_end {
        return Err(ValidationError::new("period"));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateGoal {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "meta deve ser maior que zero"))]
    pub target: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalFilter {
    #[serde(flatten)]
    pub page: PageParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professional_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<NaiveDate>,
}

impl Resource for Goal {
    const PATH: &'static str = "goals";
    const ENTITY: &'static str = "goal";
    const UNIT_SCOPED: bool = true;

    type Create = CreateGoal;
    type Update = UpdateGoal;
    type Filter = GoalFilter;

    fn id(&self) -> EntityId {
        self.id
    }

    fn apply_update(&mut self, update: &UpdateGoal) {
        set_if(&mut self.target, &update.target);
    }

    fn placeholder(id: EntityId, create: &CreateGoal, now: Timestamp) -> Self {
        Self {
            id,
            unit_id: UnitId::nil(),
            professional_id: create.professional_id,
            kind: create.kind,
            target: create.target,
            achieved: 0,
            period_start: create.period_start,
            period_end: create.period_end,
            created_at: now,
        }
    }
}
