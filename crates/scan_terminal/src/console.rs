use std::time::Duration;

use scan_client::{CameraHandle, FeedbackSink, FeedbackTone, ScanOutcome, SessionPhase};

/// Stdin stands in for the camera and stdout for the display, so the
/// camera hooks only log.
pub struct Console;

impl CameraHandle for Console {
    fn activate(&self) {
        log::debug!("camera on");
    }

    fn suspend(&self) {
        log::debug!("camera paused");
    }

    fn resume(&self) {
        log::debug!("camera resumed");
    }

    fn release(&self) {
        log::debug!("camera off");
    }
}

fn prefix(tone: FeedbackTone) -> &'static str {
    match tone {
        FeedbackTone::Success => "✅",
        FeedbackTone::Warning => "⚠️",
        FeedbackTone::Rejected => "⛔",
        FeedbackTone::Error => "❌",
    }
}

impl FeedbackSink for Console {
    fn on_outcome(&self, outcome: &ScanOutcome, _display_for: Duration) {
        let tone = outcome.tone();
        // Terminal bell for anything the operator must not miss.
        let bell = if matches!(tone, FeedbackTone::Rejected | FeedbackTone::Error) {
            "\x07"
        } else {
            ""
        };
        println!("{}{} {}", bell, prefix(tone), outcome);
    }

    fn on_phase_changed(&self, phase: SessionPhase) {
        match phase {
            SessionPhase::Listening => println!("📷 Ready to scan"),
            SessionPhase::Idle => println!("💤 Scanner stopped"),
            SessionPhase::Resolving => {}
        }
    }
}
