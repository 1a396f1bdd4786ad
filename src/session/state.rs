use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Why a session ended in `Failed`. Terminal; the UI decides whether to
/// start a brand-new session, nothing here retries.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FailReason {
    /// Network unreachable or timed out.
    Transport,
    /// Backend 5xx.
    Server,
    /// Inference succeeded but recognized nothing usable.
    Unrecognized,
}

/// Workflow phases. Forward-only: a session advances
/// Tare -> Measuring -> Capturing -> Analyzing -> Complete, or drops into
/// `Cancelled`/`Failed` from any non-terminal phase. It never regresses.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "phase", content = "reason")]
pub enum ScanPhase {
    Tare,
    Measuring,
    Capturing,
    Analyzing,
    Complete,
    Cancelled,
    Failed(FailReason),
}

impl ScanPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScanPhase::Complete | ScanPhase::Cancelled | ScanPhase::Failed(_)
        )
    }

    /// Position along the forward path. Cancelled/Failed sit outside it.
    fn rank(&self) -> Option<u8> {
        match self {
            ScanPhase::Tare => Some(0),
            ScanPhase::Measuring => Some(1),
            ScanPhase::Capturing => Some(2),
            ScanPhase::Analyzing => Some(3),
            ScanPhase::Complete => Some(4),
            ScanPhase::Cancelled | ScanPhase::Failed(_) => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanPhase::Tare => "Tare",
            ScanPhase::Measuring => "Measuring",
            ScanPhase::Capturing => "Capturing",
            ScanPhase::Analyzing => "Analyzing",
            ScanPhase::Complete => "Complete",
            ScanPhase::Cancelled => "Cancelled",
            ScanPhase::Failed(_) => "Failed",
        }
    }
}

/// One run of the tare -> measure -> capture -> analyze workflow. Cloned
/// snapshots of this struct are what observers receive on every phase
/// change.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanSession {
    pub id: Uuid,
    #[serde(flatten)]
    pub phase: ScanPhase,
    pub started_at: DateTime<Utc>,
    pub plate_id: Option<i64>,
    pub profile_id: i64,
    /// Raw scale reading taken in Measuring, in grams. Net-of-tare
    /// arithmetic is the backend's job.
    pub weight_at_capture: Option<f64>,
    pub cancelled: bool,
}

impl ScanSession {
    pub(crate) fn new(profile_id: i64, plate_id: Option<i64>) -> Self {
        Self {
            id: Uuid::new_v4(),
            // With a plate already chosen there is nothing to tare.
            phase: if plate_id.is_some() {
                ScanPhase::Measuring
            } else {
                ScanPhase::Tare
            },
            started_at: Utc::now(),
            plate_id,
            profile_id,
            weight_at_capture: None,
            cancelled: false,
        }
    }

    /// Apply a transition if it is legal. Terminal phases absorb
    /// everything; the forward path moves one step at a time, so Analyzing
    /// is unreachable without Capturing and Complete without Analyzing.
    pub(crate) fn advance(&mut self, next: ScanPhase) -> bool {
        if self.phase.is_terminal() {
            return false;
        }

        match next {
            ScanPhase::Cancelled => {
                self.cancelled = true;
                self.phase = next;
                true
            }
            ScanPhase::Failed(_) => {
                self.phase = next;
                true
            }
            _ => {
                let (Some(current), Some(target)) = (self.phase.rank(), next.rank()) else {
                    return false;
                };
                if target == current + 1 {
                    self.phase = next;
                    true
                } else {
                    false
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_path_advances_in_order() {
        let mut session = ScanSession::new(1, None);
        assert_eq!(session.phase, ScanPhase::Tare);
        assert!(session.advance(ScanPhase::Measuring));
        assert!(session.advance(ScanPhase::Capturing));
        assert!(session.advance(ScanPhase::Analyzing));
        assert!(session.advance(ScanPhase::Complete));
        assert!(session.phase.is_terminal());
    }

    #[test]
    fn preselected_plate_skips_tare() {
        let session = ScanSession::new(1, Some(3));
        assert_eq!(session.phase, ScanPhase::Measuring);
        assert_eq!(session.plate_id, Some(3));
    }

    #[test]
    fn phases_never_regress() {
        let mut session = ScanSession::new(1, None);
        assert!(session.advance(ScanPhase::Measuring));
        assert!(session.advance(ScanPhase::Capturing));
        assert!(!session.advance(ScanPhase::Measuring));
        assert!(!session.advance(ScanPhase::Tare));
        assert_eq!(session.phase, ScanPhase::Capturing);
    }

    #[test]
    fn forward_path_cannot_skip_a_phase() {
        let mut session = ScanSession::new(1, None);
        assert!(!session.advance(ScanPhase::Capturing));
        assert!(!session.advance(ScanPhase::Analyzing));
        assert!(!session.advance(ScanPhase::Complete));
        assert_eq!(session.phase, ScanPhase::Tare);
    }

    #[test]
    fn complete_is_only_reachable_from_analyzing() {
        let mut session = ScanSession::new(1, Some(2));
        assert!(!session.advance(ScanPhase::Complete));
        assert!(session.advance(ScanPhase::Capturing));
        assert!(!session.advance(ScanPhase::Complete));
        assert!(session.advance(ScanPhase::Analyzing));
        assert!(session.advance(ScanPhase::Complete));
        assert!(!session.advance(ScanPhase::Analyzing));
    }

    #[test]
    fn cancel_reachable_from_any_non_terminal_phase() {
        let setups: [&[ScanPhase]; 3] = [
            &[],
            &[ScanPhase::Measuring],
            &[ScanPhase::Measuring, ScanPhase::Capturing],
        ];
        for path in setups {
            let mut session = ScanSession::new(1, None);
            for phase in path {
                assert!(session.advance(*phase));
            }
            assert!(session.advance(ScanPhase::Cancelled));
            assert!(session.cancelled);
        }
    }

    #[test]
    fn terminal_phases_absorb_all_transitions() {
        let mut session = ScanSession::new(1, Some(1));
        assert!(session.advance(ScanPhase::Failed(FailReason::Transport)));
        assert!(!session.advance(ScanPhase::Complete));
        assert!(!session.advance(ScanPhase::Cancelled));
        assert_eq!(session.phase, ScanPhase::Failed(FailReason::Transport));
    }
}
