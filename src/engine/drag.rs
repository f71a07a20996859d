//! Drag-and-drop target resolution.
//!
//! The UI layer reports plain ids through [`DragEvent`]s. Geometry, when the
//! UI has it, goes through [`detect_collision`] first to turn a pointer
//! position into an `over` id. [`resolve_drop_target`] then maps that id to
//! the column the dragged feature should land in.

use crate::model::project::Project;

use super::visibility::ColumnVisibility;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    fn distance(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Axis-aligned rectangle in screen units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Bounds {
            x,
            y,
            width,
            height,
        }
    }

    /// Half-open containment: the right and bottom edges belong to the
    /// neighbouring rectangle.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Top-left, top-right, bottom-left, bottom-right
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y),
            Point::new(self.x, self.y + self.height),
            Point::new(self.x + self.width, self.y + self.height),
        ]
    }

    /// Same size, moved so its top-left sits at `p`
    pub fn at(&self, p: Point) -> Bounds {
        Bounds::new(p.x, p.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneKind {
    Column,
    Feature,
}

/// Something on screen a feature can be dropped onto
#[derive(Debug, Clone, PartialEq)]
pub struct DropZone {
    pub id: String,
    pub kind: ZoneKind,
    pub bounds: Bounds,
}

impl DropZone {
    pub fn column(id: impl Into<String>, bounds: Bounds) -> Self {
        DropZone {
            id: id.into(),
            kind: ZoneKind::Column,
            bounds,
        }
    }

    pub fn feature(id: impl Into<String>, bounds: Bounds) -> Self {
        DropZone {
            id: id.into(),
            kind: ZoneKind::Feature,
            bounds,
        }
    }
}

/// Tier 1: zones under the pointer. Feature zones sit inside column zones,
/// so the more specific (feature, then smaller) zone wins.
pub fn pointer_within<'a>(pointer: Point, zones: &'a [DropZone], skip_id: &str) -> Option<&'a DropZone> {
    zones
        .iter()
        .filter(|z| z.id != skip_id && z.bounds.contains(pointer))
        .min_by(|a, b| {
            let rank = |z: &DropZone| match z.kind {
                ZoneKind::Feature => 0,
                ZoneKind::Column => 1,
            };
            rank(a)
                .cmp(&rank(b))
                .then(a.bounds.area().total_cmp(&b.bounds.area()))
        })
}

/// Tier 2: the zone whose corners are nearest, on average, to the corners
/// of the dragged rectangle.
pub fn closest_corners<'a>(dragged: Bounds, zones: &'a [DropZone], skip_id: &str) -> Option<&'a DropZone> {
    let drag_corners = dragged.corners();
    zones
        .iter()
        .filter(|z| z.id != skip_id)
        .map(|z| {
            let total: f64 = z
                .bounds
                .corners()
                .iter()
                .zip(drag_corners.iter())
                .map(|(a, b)| a.distance(*b))
                .sum();
            (z, total / 4.0)
        })
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(z, _)| z)
}

/// Layered collision test: pointer containment first, nearest corners as
/// the fallback when the pointer is between zones.
///
/// `dragged` is the on-screen size of the item being dragged; without it the
/// fallback measures from the pointer itself.
pub fn detect_collision(
    pointer: Point,
    dragged: Option<Bounds>,
    zones: &[DropZone],
    active_id: &str,
) -> Option<String> {
    if let Some(hit) = pointer_within(pointer, zones, active_id) {
        return Some(hit.id.clone());
    }
    let rect = dragged
        .map(|b| b.at(pointer))
        .unwrap_or_else(|| Bounds::new(pointer.x, pointer.y, 0.0, 0.0));
    closest_corners(rect, zones, active_id).map(|z| z.id.clone())
}

// ---------------------------------------------------------------------------
// Event protocol
// ---------------------------------------------------------------------------

/// Drag events as delivered by the UI layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEvent {
    Start {
        active_id: String,
    },
    /// Advisory: updates the highlighted target, never mutates the board
    Over {
        active_id: String,
        over_id: Option<String>,
    },
    /// Authoritative: triggers target resolution
    End {
        active_id: String,
        over_id: Option<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        active_id: String,
        over_id: Option<String>,
    },
}

/// A drop waiting to be resolved against the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDrop {
    pub active_id: String,
    pub over_id: Option<String>,
}

/// Tracks one drag gesture from start to end
#[derive(Debug, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    pub fn new() -> Self {
        DragSession::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn active_id(&self) -> Option<&str> {
        match &self.state {
            DragState::Dragging { active_id, .. } => Some(active_id),
            DragState::Idle => None,
        }
    }

    pub fn over_id(&self) -> Option<&str> {
        match &self.state {
            DragState::Dragging { over_id, .. } => over_id.as_deref(),
            DragState::Idle => None,
        }
    }

    /// Feed one event. Only `End` yields a drop to resolve.
    pub fn handle(&mut self, event: DragEvent) -> Option<PendingDrop> {
        match event {
            DragEvent::Start { active_id } => {
                self.state = DragState::Dragging {
                    active_id,
                    over_id: None,
                };
                None
            }
            DragEvent::Over { active_id, over_id } => {
                if let DragState::Dragging {
                    active_id: current,
                    over_id: slot,
                } = &mut self.state
                    && *current == active_id
                {
                    *slot = over_id;
                }
                None
            }
            DragEvent::End { active_id, over_id } => {
                if self.active_id().is_some_and(|a| a != active_id) {
                    tracing::debug!(%active_id, "drag end for a different item than the one started");
                }
                self.state = DragState::Idle;
                Some(PendingDrop { active_id, over_id })
            }
        }
    }

    /// Abandon the gesture without a drop
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// The column the current `over` id would resolve to, for highlighting
    pub fn highlighted_column(&self, project: &Project, visibility: &ColumnVisibility) -> Option<String> {
        resolve_drop_target(project, visibility, self.over_id()).ok()
    }
}

// ---------------------------------------------------------------------------
// Target resolution
// ---------------------------------------------------------------------------

/// Why a drop did not produce a move
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DropRejection {
    #[error("invalid drop: no target")]
    NoTarget,
    #[error("invalid drop: unknown target {0}")]
    UnknownTarget(String),
    #[error("invalid drop: column {0} is hidden")]
    HiddenColumn(String),
    #[error("invalid drop: unknown feature {0}")]
    UnknownFeature(String),
}

/// Map an `over` id to a target column:
/// 1. no target → rejected
/// 2. a column id → that column
/// 3. a feature id → the column that feature sits in
/// 4. anything else → rejected as stale
///
/// Hidden columns are never valid targets.
pub fn resolve_drop_target(
    project: &Project,
    visibility: &ColumnVisibility,
    over_id: Option<&str>,
) -> Result<String, DropRejection> {
    let over = over_id.ok_or(DropRejection::NoTarget)?;
    let column_id = if project.has_column(over) {
        over.to_string()
    } else if let Some(feature) = project.feature(over) {
        feature.status.clone()
    } else {
        return Err(DropRejection::UnknownTarget(over.to_string()));
    };
    if !visibility.is_visible(&column_id) {
        return Err(DropRejection::HiddenColumn(column_id));
    }
    Ok(column_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::feature::Feature;
    use pretty_assertions::assert_eq;

    fn project() -> Project {
        let mut p = Project::new("p1", "Board", "u1");
        p.features.push(Feature::new("f1", "Login", "ideas"));
        p.features.push(Feature::new("f2", "Search", "working"));
        p
    }

    /// Two columns side by side, each with one card near the top
    fn zones() -> Vec<DropZone> {
        vec![
            DropZone::column("ideas", Bounds::new(0.0, 0.0, 100.0, 400.0)),
            DropZone::column("working", Bounds::new(120.0, 0.0, 100.0, 400.0)),
            DropZone::feature("f1", Bounds::new(10.0, 40.0, 80.0, 30.0)),
            DropZone::feature("f2", Bounds::new(130.0, 40.0, 80.0, 30.0)),
        ]
    }

    #[test]
    fn resolve_column_id() {
        let p = project();
        let v = ColumnVisibility::all_visible();
        assert_eq!(resolve_drop_target(&p, &v, Some("working")), Ok("working".into()));
    }

    #[test]
    fn resolve_feature_id_inherits_its_column() {
        let p = project();
        let v = ColumnVisibility::all_visible();
        assert_eq!(resolve_drop_target(&p, &v, Some("f2")), Ok("working".into()));
    }

    #[test]
    fn resolve_rejects_missing_and_stale() {
        let p = project();
        let v = ColumnVisibility::all_visible();
        assert_eq!(resolve_drop_target(&p, &v, None), Err(DropRejection::NoTarget));
        assert_eq!(
            resolve_drop_target(&p, &v, Some("ghost")),
            Err(DropRejection::UnknownTarget("ghost".into()))
        );
    }

    #[test]
    fn resolve_rejects_hidden_columns() {
        let p = project();
        let mut v = ColumnVisibility::all_visible();
        v.hide(&p, "working").unwrap();
        assert_eq!(
            resolve_drop_target(&p, &v, Some("f2")),
            Err(DropRejection::HiddenColumn("working".into()))
        );
    }

    #[test]
    fn pointer_on_card_prefers_card_over_column() {
        let z = zones();
        let hit = detect_collision(Point::new(150.0, 50.0), None, &z, "f1");
        assert_eq!(hit.as_deref(), Some("f2"));
    }

    #[test]
    fn pointer_in_empty_column_space_hits_column() {
        let z = zones();
        let hit = detect_collision(Point::new(150.0, 300.0), None, &z, "f1");
        assert_eq!(hit.as_deref(), Some("working"));
    }

    #[test]
    fn dragged_item_never_collides_with_itself() {
        let z = zones();
        let hit = detect_collision(Point::new(20.0, 50.0), None, &z, "f1");
        assert_eq!(hit.as_deref(), Some("ideas"));
    }

    #[test]
    fn gap_between_columns_falls_back_to_closest_corners() {
        let z = zones();
        // In the gutter, much nearer the working column's cards than anything in ideas
        let dragged = Bounds::new(0.0, 0.0, 80.0, 30.0);
        let hit = detect_collision(Point::new(118.0, 41.0), Some(dragged), &z, "f1");
        assert_eq!(hit.as_deref(), Some("f2"));
    }

    #[test]
    fn session_tracks_over_and_yields_drop_on_end() {
        let mut s = DragSession::new();
        assert!(s.handle(DragEvent::Start { active_id: "f1".into() }).is_none());
        assert!(s.is_dragging());
        s.handle(DragEvent::Over {
            active_id: "f1".into(),
            over_id: Some("f2".into()),
        });
        assert_eq!(s.over_id(), Some("f2"));
        assert_eq!(
            s.highlighted_column(&project(), &ColumnVisibility::all_visible()),
            Some("working".into())
        );
        let drop = s
            .handle(DragEvent::End {
                active_id: "f1".into(),
                over_id: Some("working".into()),
            })
            .unwrap();
        assert_eq!(drop.over_id.as_deref(), Some("working"));
        assert!(!s.is_dragging());
    }

    #[test]
    fn over_for_other_item_is_ignored() {
        let mut s = DragSession::new();
        s.handle(DragEvent::Start { active_id: "f1".into() });
        s.handle(DragEvent::Over {
            active_id: "f9".into(),
            over_id: Some("done".into()),
        });
        assert_eq!(s.over_id(), None);
    }
}
