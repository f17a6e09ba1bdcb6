//! Shift trades between professionals and their review by an administrator.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::directory::Directory;
use crate::error::TradeError;
use crate::models::{required, Shift};
use crate::store::ShiftStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeStatus {
    Pending,
    Approved,
    Rejected,
}

impl TradeStatus {
    pub fn name(&self) -> &'static str {
        match self {
            TradeStatus::Pending => "PENDING",
            TradeStatus::Approved => "APPROVED",
            TradeStatus::Rejected => "REJECTED",
        }
    }
}

/// Administrator decision on a pending trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeDecision {
    Approve,
    Reject,
}

/// A professional's request to hand a shift over to a colleague.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRequest {
    pub id: String,
    pub shift_id: String,
    pub requester_id: String,
    pub target_user_id: String,
    pub status: TradeStatus,
    pub admin_notes: Option<String>,
}

impl TradeRequest {
    /// Create a pending trade. Ids are trimmed and must not be blank.
    pub fn new(
        shift_id: String,
        requester_id: String,
        target_user_id: String,
    ) -> Result<Self, TradeError> {
        let shift_id = required("shiftId", Some(shift_id))?;
        let requester_id = required("requesterId", Some(requester_id))?;
        let target_user_id = required("targetUserId", Some(target_user_id))?;
        if requester_id == target_user_id {
            return Err(TradeError::SameProfessional);
        }

        Ok(TradeRequest {
            id: Uuid::new_v4().to_string(),
            shift_id,
            requester_id,
            target_user_id,
            status: TradeStatus::Pending,
            admin_notes: None,
        })
    }

    /// Apply an administrator decision.
    ///
    /// Approval hands the shift to the target professional, provided the
    /// shift still belongs to the requester, the target is an active member
    /// of the shift's group and is free for that window. On any error the
    /// trade stays pending and the store is left unchanged.
    pub fn review<S: ShiftStore + ?Sized>(
        &mut self,
        decision: TradeDecision,
        admin_notes: Option<String>,
        directory: &Directory,
        store: &mut S,
    ) -> Result<Option<Shift>, TradeError> {
        if self.status != TradeStatus::Pending {
            return Err(TradeError::AlreadyReviewed(self.id.clone()));
        }

        let admin_notes = admin_notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        if decision == TradeDecision::Reject {
            self.status = TradeStatus::Rejected;
            self.admin_notes = admin_notes;
            info!(trade_id = %self.id, "Trade rejected");
            return Ok(None);
        }

        let mut shift = store
            .get_shift(&self.shift_id)?
            .ok_or_else(|| TradeError::ShiftNotFound(self.shift_id.clone()))?;

        if shift.user_id != self.requester_id {
            return Err(TradeError::NotShiftOwner {
                shift_id: shift.id,
                requester_id: self.requester_id.clone(),
            });
        }
        if !shift.status.blocks_time() {
            return Err(TradeError::ShiftCancelled(shift.id));
        }
        directory.check_assignment(&shift.hospital_id, &shift.group_id, &self.target_user_id)?;
        if let Some(existing) =
            store.find_overlapping_shift(&self.target_user_id, shift.start, shift.end)?
        {
            warn!(trade_id = %self.id, existing_id = %existing.id, "Trade target is busy");
            return Err(TradeError::Conflict {
                user_id: self.target_user_id.clone(),
                existing_id: existing.id,
            });
        }

        shift.user_id = self.target_user_id.clone();
        store.update_shift(shift.clone())?;

        self.status = TradeStatus::Approved;
        self.admin_notes = admin_notes;
        info!(trade_id = %self.id, shift_id = %shift.id, to = %shift.user_id, "Trade approved");
        Ok(Some(shift))
    }
}
