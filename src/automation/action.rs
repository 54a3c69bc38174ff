use crate::foundation::core::Rgb8;
use crate::foundation::error::{LedError, LedResult};

/// Edge a transform moves toward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Along x: reverses columns, bounces left/right.
    #[default]
    Horizontal,
    /// Along y: reverses rows, bounces up/down.
    Vertical,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    #[default]
    Clockwise90,
    CounterClockwise90,
    Half,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleMode {
    /// `(r, g, b) -> (g, b, r)`
    #[default]
    Rgb,
    /// `(r, g, b) -> (b, r, g)`
    Ryb,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadialStyle {
    #[default]
    Pulse,
    Spiral,
}

/// Short name used in generated track names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Scroll,
    Rotate,
    Mirror,
    Flip,
    Invert,
    Wipe,
    Reveal,
    Bounce,
    ColourCycle,
    Radial,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scroll => "scroll",
            Self::Rotate => "rotate",
            Self::Mirror => "mirror",
            Self::Flip => "flip",
            Self::Invert => "invert",
            Self::Wipe => "wipe",
            Self::Reveal => "reveal",
            Self::Bounce => "bounce",
            Self::ColourCycle => "colour_cycle",
            Self::Radial => "radial",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable, parametric automation step.
///
/// Distances and amplitudes are whole pixels.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DesignAction {
    /// Toroidal shift by `distance + step * position_in_selection` pixels.
    Scroll {
        direction: Direction,
        distance: i64,
        #[serde(default)]
        step: i64,
    },
    Rotate {
        #[serde(default)]
        rotation: Rotation,
    },
    Mirror {
        #[serde(default)]
        axis: Axis,
    },
    Flip {
        #[serde(default = "vertical")]
        axis: Axis,
    },
    Invert,
    /// Keep the leading `progress` fraction along `direction`, paint the rest with `fill`.
    ///
    /// `progress = None` ramps from 0 to 1 across the committed frames.
    Wipe {
        direction: Direction,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        progress: Option<f64>,
        #[serde(default)]
        fill: Rgb8,
    },
    /// Hide the leading `progress` fraction along `direction`, show the rest.
    Reveal {
        direction: Direction,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        progress: Option<f64>,
    },
    /// Scroll by `round(amplitude * sin(2*pi*frame/period))` along `axis`.
    Bounce {
        axis: Axis,
        amplitude: i64,
        period: u64,
    },
    ColourCycle {
        #[serde(default)]
        mode: CycleMode,
    },
    Radial {
        #[serde(default)]
        style: RadialStyle,
    },
}

fn vertical() -> Axis {
    Axis::Vertical
}

impl DesignAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Scroll { .. } => ActionKind::Scroll,
            Self::Rotate { .. } => ActionKind::Rotate,
            Self::Mirror { .. } => ActionKind::Mirror,
            Self::Flip { .. } => ActionKind::Flip,
            Self::Invert => ActionKind::Invert,
            Self::Wipe { .. } => ActionKind::Wipe,
            Self::Reveal { .. } => ActionKind::Reveal,
            Self::Bounce { .. } => ActionKind::Bounce,
            Self::ColourCycle { .. } => ActionKind::ColourCycle,
            Self::Radial { .. } => ActionKind::Radial,
        }
    }

    /// Whether the output may have different dimensions than the input.
    pub fn changes_dimensions(&self) -> bool {
        matches!(
            self,
            Self::Rotate {
                rotation: Rotation::Clockwise90 | Rotation::CounterClockwise90
            }
        )
    }

    /// Reject parameters outside their valid range.
    pub fn validate(&self) -> LedResult<()> {
        match self {
            Self::Scroll { distance, step, .. } => {
                if *distance < 0 {
                    return Err(LedError::transform(format!(
                        "scroll distance must be >= 0, got {distance}"
                    )));
                }
                if *step < 0 {
                    return Err(LedError::transform(format!(
                        "scroll step must be >= 0, got {step}"
                    )));
                }
            }
            Self::Wipe { progress, .. } | Self::Reveal { progress, .. } => {
                if let Some(p) = progress
                    && !(p.is_finite() && (0.0..=1.0).contains(p))
                {
                    return Err(LedError::transform(format!(
                        "{} progress must be in [0, 1], got {p}",
                        self.kind()
                    )));
                }
            }
            Self::Bounce {
                amplitude, period, ..
            } => {
                if *amplitude < 0 {
                    return Err(LedError::transform(format!(
                        "bounce amplitude must be >= 0, got {amplitude}"
                    )));
                }
                if *period == 0 {
                    return Err(LedError::transform("bounce period must be > 0"));
                }
            }
            Self::Rotate { .. }
            | Self::Mirror { .. }
            | Self::Flip { .. }
            | Self::Invert
            | Self::ColourCycle { .. }
            | Self::Radial { .. } => {}
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/automation/action.rs"]
mod tests;
