//! Status notification port
//!
//! Defines the interface for delivering user-visible status messages.

use crate::use_cases::acquire_plan::AcquisitionError;
use crate::use_cases::build_executor::BuildAbort;
use crate::use_cases::coordinator::StartBuildError;
use blueprint_domain::{ActorId, CornerSlot, Point3, RequestId, SelectionKind, Size3};
use std::fmt;

/// A user-visible status message.
///
/// `Display` renders the exact text shown to the actor.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    CornerSet {
        kind: SelectionKind,
        slot: CornerSlot,
        position: Point3,
    },
    SelectionCleared(SelectionKind),
    Drafting { prompt: String },
    /// Effective build size after the flat-footprint adjustment.
    Footprint(Size3),
    ContextAttached,
    FetchingPlan,
    PlanValidated { operations: usize },
    Warnings(Vec<String>),
    BuildStarted { operations: usize },
    Progress { applied: usize, total: usize },
    BuildComplete { applied: usize },
    Rejected(StartBuildError),
    AcquisitionFailed {
        request_id: RequestId,
        error: AcquisitionError,
    },
    BuildAborted(BuildAbort),
}

impl StatusEvent {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            StatusEvent::Rejected(_)
                | StatusEvent::AcquisitionFailed { .. }
                | StatusEvent::BuildAborted(_)
        )
    }
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEvent::CornerSet {
                kind,
                slot,
                position,
            } => write!(f, "{} {} set: {}", kind, slot, position),
            StatusEvent::SelectionCleared(kind) => write!(f, "{} selection cleared.", kind),
            StatusEvent::Drafting { prompt } => write!(f, "Drafting: \"{}\"", prompt),
            StatusEvent::Footprint(size) => write!(
                f,
                "Selection footprint: {}x{} (height {})",
                size.w, size.l, size.h
            ),
            StatusEvent::ContextAttached => f.write_str("Context attached (context selection)."),
            StatusEvent::FetchingPlan => f.write_str("Fetching plan..."),
            StatusEvent::PlanValidated { operations } => {
                write!(f, "Plan validated: {} ops.", operations)
            }
            StatusEvent::Warnings(warnings) => write!(f, "Warnings: {}", warnings.join("; ")),
            StatusEvent::BuildStarted { operations } => {
                write!(f, "Build started ({} ops).", operations)
            }
            StatusEvent::Progress { applied, total } => {
                write!(f, "Progress: {}/{} blocks", applied, total)
            }
            StatusEvent::BuildComplete { applied } => {
                write!(f, "Build complete: {} blocks.", applied)
            }
            StatusEvent::Rejected(err) => write!(f, "Error: {}", err),
            StatusEvent::AcquisitionFailed { request_id, error } => {
                write!(f, "Error: {} (request {}).", error, request_id)
            }
            StatusEvent::BuildAborted(abort) => write!(f, "Error: {}", abort),
        }
    }
}

/// Callback for user-visible status during acquisition and builds
///
/// Implementations live in the presentation layer.
pub trait StatusNotifier: Send + Sync {
    fn notify(&self, actor: &ActorId, event: &StatusEvent);

    /// Called when a generation request goes out; the actor should see an
    /// indeterminate "working" indicator until [`drafting_stopped`](Self::drafting_stopped).
    fn drafting_started(&self, _actor: &ActorId, _request_id: &RequestId) {}

    fn drafting_stopped(&self, _actor: &ActorId) {}
}

/// No-op notifier for when status reporting is not needed
pub struct NoStatus;

impl StatusNotifier for NoStatus {
    fn notify(&self, _actor: &ActorId, _event: &StatusEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corner_message() {
        let event = StatusEvent::CornerSet {
            kind: SelectionKind::Build,
            slot: CornerSlot::First,
            position: Point3::new(10, 64, -3),
        };
        assert_eq!(event.to_string(), "Build Corner 1 set: 10 64 -3");
        assert!(!event.is_error());
    }

    #[test]
    fn test_footprint_shows_width_by_length() {
        let event = StatusEvent::Footprint(Size3::new(4, 12, 6));
        assert_eq!(event.to_string(), "Selection footprint: 4x6 (height 12)");
    }

    #[test]
    fn test_acquisition_failure_carries_request_id() {
        let event = StatusEvent::AcquisitionFailed {
            request_id: RequestId::new("req-1-abcdefgh"),
            error: AcquisitionError::UpstreamStatus(502),
        };
        assert_eq!(
            event.to_string(),
            "Error: generator returned status 502 (request req-1-abcdefgh)."
        );
        assert!(event.is_error());
    }

    #[test]
    fn test_warnings_joined() {
        let event = StatusEvent::Warnings(vec!["a".into(), "b".into()]);
        assert_eq!(event.to_string(), "Warnings: a; b");
    }
}
