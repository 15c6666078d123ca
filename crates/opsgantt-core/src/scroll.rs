//! Synchronized scroll axes
//!
//! One `ScrollSync` per axis holds the shared offset and the surfaces that
//! display it. A surface publishes an offset when it scrolls; every other
//! surface receives a `ScrollWrite`. Writing a native scroll container makes
//! it fire its own scroll event later, so each write to such a surface
//! leaves a pending echo. When that echo comes back through `publish` it is
//! absorbed instead of propagated, which is what keeps two mirrored
//! containers from feeding each other forever.

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Offsets closer than this are the same position (DOM rounds to sub-pixels)
pub const ECHO_TOLERANCE: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    /// Time-axis header row
    Header,
    /// Row label panel
    LeftPanel,
    /// Bar canvas
    RightPanel,
    /// Fixed horizontal scrollbar under the board
    BottomScrollbar,
}

impl Surface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Surface::Header => "header",
            Surface::LeftPanel => "left_panel",
            Surface::RightPanel => "right_panel",
            Surface::BottomScrollbar => "bottom_scrollbar",
        }
    }
}

impl std::fmt::Display for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a surface takes part in an axis
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceRole {
    /// Native scroll container the user can scroll
    Scroll,
    /// Native scroll container only ever positioned programmatically
    Mirror,
    /// Not a scroll container; the offset is applied as a translation
    Transform,
}

/// An offset to apply to a surface
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScrollWrite {
    pub surface: Surface,
    pub axis: Axis,
    pub offset: f64,
}

#[derive(Clone, Debug)]
struct Participant {
    surface: Surface,
    role: SurfaceRole,
    position: f64,
    pending_echo: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct ScrollSync {
    axis: Axis,
    participants: Vec<Participant>,
    offset: f64,
    max_offset: f64,
}

impl ScrollSync {
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            participants: Vec::new(),
            offset: 0.0,
            max_offset: f64::INFINITY,
        }
    }

    pub fn with_surface(mut self, surface: Surface, role: SurfaceRole) -> Self {
        self.participants.retain(|p| p.surface != surface);
        self.participants.push(Participant {
            surface,
            role,
            position: 0.0,
            pending_echo: None,
        });
        self
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// The shared offset
    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn max_offset(&self) -> f64 {
        self.max_offset
    }

    pub fn surfaces(&self) -> impl Iterator<Item = (Surface, SurfaceRole)> + '_ {
        self.participants.iter().map(|p| (p.surface, p.role))
    }

    pub fn role_of(&self, surface: Surface) -> Option<SurfaceRole> {
        self.participants
            .iter()
            .find(|p| p.surface == surface)
            .map(|p| p.role)
    }

    /// Last known position of a surface
    pub fn position_of(&self, surface: Surface) -> Option<f64> {
        self.participants
            .iter()
            .find(|p| p.surface == surface)
            .map(|p| p.position)
    }

    pub fn pending_echoes(&self) -> usize {
        self.participants
            .iter()
            .filter(|p| p.pending_echo.is_some())
            .count()
    }

    /// A surface reports that it scrolled to `requested`.
    ///
    /// Returns the writes that bring every other surface to the new offset.
    /// Echoes of earlier writes, unknown surfaces and transform surfaces
    /// produce nothing. A mirror surface scrolled by the user is put back.
    pub fn publish(&mut self, source: Surface, requested: f64) -> Vec<ScrollWrite> {
        if !requested.is_finite() {
            return Vec::new();
        }
        let Some(idx) = self.participants.iter().position(|p| p.surface == source) else {
            trace!(axis = ?self.axis, %source, "scroll from surface outside axis ignored");
            return Vec::new();
        };

        let current = self.offset;
        let participant = &mut self.participants[idx];
        if let Some(expected) = participant.pending_echo.take() {
            if (expected - requested).abs() <= ECHO_TOLERANCE {
                participant.position = requested;
                trace!(axis = ?self.axis, %source, offset = requested, "echo absorbed");
                return Vec::new();
            }
        }

        match participant.role {
            SurfaceRole::Transform => return Vec::new(),
            SurfaceRole::Mirror => {
                if (requested - current).abs() <= ECHO_TOLERANCE {
                    participant.position = requested;
                    return Vec::new();
                }
                participant.position = current;
                participant.pending_echo = Some(current);
                return vec![ScrollWrite {
                    surface: source,
                    axis: self.axis,
                    offset: current,
                }];
            }
            SurfaceRole::Scroll => participant.position = requested,
        }

        self.offset = requested.clamp(0.0, self.max_offset);
        trace!(axis = ?self.axis, %source, offset = self.offset, "scroll published");
        self.propagate(Some(source))
    }

    /// Set the scrollable extent; the offset is clamped into the new range
    pub fn set_extent(&mut self, content: f64, viewport: f64) -> Vec<ScrollWrite> {
        self.max_offset = (content - viewport).max(0.0);
        if self.offset > self.max_offset {
            self.offset = self.max_offset;
            return self.propagate(None);
        }
        Vec::new()
    }

    /// Jump every surface back to the origin
    pub fn reset(&mut self) -> Vec<ScrollWrite> {
        self.offset = 0.0;
        self.propagate(None)
    }

    fn propagate(&mut self, source: Option<Surface>) -> Vec<ScrollWrite> {
        let offset = self.offset;
        let axis = self.axis;
        self.participants
            .iter_mut()
            .filter(|p| Some(p.surface) != source)
            .filter_map(|p| {
                if (p.position - offset).abs() <= ECHO_TOLERANCE {
                    // Already there; a native container would not fire an event
                    return None;
                }
                p.position = offset;
                if p.role != SurfaceRole::Transform {
                    p.pending_echo = Some(offset);
                }
                Some(ScrollWrite {
                    surface: p.surface,
                    axis,
                    offset,
                })
            })
            .collect()
    }
}
