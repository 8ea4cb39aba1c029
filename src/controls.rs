//! Keyboard control surface for the live bloom knobs and track selection.
//!
//! Key presses are queued as edits and applied together at the next frame
//! boundary, so a frame never observes a half-applied change.

use std::ops::RangeInclusive;

use winit::keyboard::KeyCode;

use crate::params::{clamp_to, BloomParameters};

/// A live-editable bloom parameter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Knob {
    Threshold,
    Strength,
    Radius,
    Exposure,
}

impl Knob {
    /// Change per key press
    pub fn step(self) -> f32 {
        match self {
            Knob::Threshold => 0.5,
            Knob::Strength => 0.05,
            Knob::Radius => 0.01,
            Knob::Exposure => 0.05,
        }
    }

    pub fn range(self) -> RangeInclusive<f32> {
        match self {
            Knob::Threshold => BloomParameters::THRESHOLD_RANGE,
            Knob::Strength => BloomParameters::STRENGTH_RANGE,
            Knob::Radius => BloomParameters::RADIUS_RANGE,
            Knob::Exposure => BloomParameters::EXPOSURE_RANGE,
        }
    }

    fn field(self, params: &mut BloomParameters) -> &mut f32 {
        match self {
            Knob::Threshold => &mut params.threshold,
            Knob::Strength => &mut params.strength,
            Knob::Radius => &mut params.radius,
            Knob::Exposure => &mut params.exposure,
        }
    }
}

/// What a key press asks for
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlAction {
    /// Move a knob by `steps` increments (negative = down)
    Nudge { knob: Knob, steps: f32 },
    NextTrack,
    SelectTrack(usize),
    Quit,
}

/// Track change requested from the control surface
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackRequest {
    Next,
    Index(usize),
}

/// Key bindings
pub fn action_for_key(key: KeyCode) -> Option<ControlAction> {
    let nudge = |knob, steps| Some(ControlAction::Nudge { knob, steps });

    match key {
        KeyCode::KeyQ => nudge(Knob::Threshold, 1.0),
        KeyCode::KeyA => nudge(Knob::Threshold, -1.0),
        KeyCode::KeyW => nudge(Knob::Strength, 1.0),
        KeyCode::KeyS => nudge(Knob::Strength, -1.0),
        KeyCode::KeyE => nudge(Knob::Radius, 1.0),
        KeyCode::KeyD => nudge(Knob::Radius, -1.0),
        KeyCode::KeyR => nudge(Knob::Exposure, 1.0),
        KeyCode::KeyF => nudge(Knob::Exposure, -1.0),
        KeyCode::Tab => Some(ControlAction::NextTrack),
        KeyCode::Digit1 => Some(ControlAction::SelectTrack(0)),
        KeyCode::Digit2 => Some(ControlAction::SelectTrack(1)),
        KeyCode::Digit3 => Some(ControlAction::SelectTrack(2)),
        KeyCode::Digit4 => Some(ControlAction::SelectTrack(3)),
        KeyCode::Digit5 => Some(ControlAction::SelectTrack(4)),
        KeyCode::Digit6 => Some(ControlAction::SelectTrack(5)),
        KeyCode::Digit7 => Some(ControlAction::SelectTrack(6)),
        KeyCode::Digit8 => Some(ControlAction::SelectTrack(7)),
        KeyCode::Digit9 => Some(ControlAction::SelectTrack(8)),
        KeyCode::Escape => Some(ControlAction::Quit),
        _ => None,
    }
}

/// Pending edits plus the status line shown to the user
#[derive(Debug, Default)]
pub struct ControlSurface {
    pending: Vec<(Knob, f32)>,
    track_request: Option<TrackRequest>,
    status: Option<String>,
}

impl ControlSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an action; returns false for `Quit`, which the host handles
    pub fn push(&mut self, action: ControlAction) -> bool {
        match action {
            ControlAction::Nudge { knob, steps } => self.pending.push((knob, steps)),
            ControlAction::NextTrack => self.track_request = Some(TrackRequest::Next),
            ControlAction::SelectTrack(i) => self.track_request = Some(TrackRequest::Index(i)),
            ControlAction::Quit => return false,
        }
        true
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Apply all queued knob edits at once, clamped to each knob's range.
    ///
    /// Returns true if any parameter changed.
    pub fn apply_pending(&mut self, params: &mut BloomParameters) -> bool {
        let before = *params;

        for (knob, steps) in self.pending.drain(..) {
            let range = knob.range();
            let value = knob.field(params);
            *value = clamp_to(*value + steps * knob.step(), &range);
        }

        if *params != before {
            log::debug!(
                "Bloom params: threshold {:.2}, strength {:.3}, radius {:.2}, exposure {:.2}",
                params.threshold,
                params.strength,
                params.radius,
                params.exposure
            );
            return true;
        }
        false
    }

    /// Take the latest track request, if any
    pub fn take_track_request(&mut self) -> Option<TrackRequest> {
        self.track_request.take()
    }

    /// Surface a failure (e.g. a track that would not load)
    pub fn report_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.status = Some(message);
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// One-line summary for the window title
    pub fn title(&self, params: &BloomParameters, track: Option<&str>) -> String {
        let mut title = format!(
            "cubefall | {} | threshold {:.1} strength {:.2} radius {:.2} exposure {:.2}",
            track.unwrap_or("no track"),
            params.threshold,
            params.strength,
            params.radius,
            params.exposure
        );
        if let Some(status) = &self.status {
            title.push_str(" | ");
            title.push_str(status);
        }
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edits_wait_for_frame_boundary() {
        let mut controls = ControlSurface::new();
        let mut params = BloomParameters::default();

        controls.push(action_for_key(KeyCode::KeyQ).unwrap());
        controls.push(action_for_key(KeyCode::KeyQ).unwrap());
        assert_eq!(params, BloomParameters::default());
        assert!(controls.has_pending());

        assert!(controls.apply_pending(&mut params));
        assert_eq!(params.threshold, 4.0);
        assert!(!controls.has_pending());
    }

    #[test]
    fn test_knobs_are_clamped() {
        let mut controls = ControlSurface::new();
        let mut params = BloomParameters::default();

        for _ in 0..200 {
            controls.push(ControlAction::Nudge {
                knob: Knob::Radius,
                steps: 1.0,
            });
            controls.push(ControlAction::Nudge {
                knob: Knob::Exposure,
                steps: -1.0,
            });
        }
        controls.apply_pending(&mut params);

        assert_eq!(params.radius, 1.0);
        assert_eq!(params.exposure, 0.1);
    }

    #[test]
    fn test_no_change_reports_false() {
        let mut controls = ControlSurface::new();
        let mut params = BloomParameters {
            strength: 0.0,
            ..Default::default()
        };

        controls.push(action_for_key(KeyCode::KeyS).unwrap());
        assert!(!controls.apply_pending(&mut params));
    }

    #[test]
    fn test_track_requests() {
        let mut controls = ControlSurface::new();

        controls.push(action_for_key(KeyCode::Tab).unwrap());
        controls.push(action_for_key(KeyCode::Digit2).unwrap());
        assert_eq!(controls.take_track_request(), Some(TrackRequest::Index(1)));
        assert_eq!(controls.take_track_request(), None);
    }

    #[test]
    fn test_quit_is_left_to_host() {
        let mut controls = ControlSurface::new();
        assert!(!controls.push(action_for_key(KeyCode::Escape).unwrap()));
        assert!(action_for_key(KeyCode::KeyZ).is_none());
    }

    #[test]
    fn test_errors_show_in_title() {
        let mut controls = ControlSurface::new();
        controls.report_error("failed to open track");

        let title = controls.title(&BloomParameters::default(), Some("TakeOnMe"));
        assert!(title.contains("TakeOnMe"));
        assert!(title.ends_with("failed to open track"));

        controls.clear_status();
        assert!(controls.status().is_none());
    }
}
