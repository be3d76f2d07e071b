//! The canvas store: ordered elements, selection, viewport and dirty flag.
//!
//! Every mutation runs to completion synchronously. Missing ids are reported
//! as [`CanvasError::ElementNotFound`] and leave the store untouched, so a
//! caller holding a stale id can notice without anything being thrown at the
//! UI.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::element::{CanvasElement, ElementId, ElementKind, Point, Size};
use crate::error::{CanvasError, CanvasResult};

/// Smallest zoom level, in percent.
pub const MIN_ZOOM: u16 = 50;
/// Largest zoom level, in percent.
pub const MAX_ZOOM: u16 = 200;
/// Zoom change per toolbar click.
pub const ZOOM_STEP: u16 = 10;

/// Zoom and pan applied when rendering the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    /// Zoom level in percent, always within [`MIN_ZOOM`]..=[`MAX_ZOOM`].
    pub zoom_percent: u16,
    /// Pan offset X in screen pixels.
    pub pan_x: f64,
    /// Pan offset Y in screen pixels.
    pub pan_y: f64,
}

impl ViewTransform {
    /// Zoom as a scale factor (1.0 = 100%).
    #[must_use]
    pub fn scale(&self) -> f64 {
        f64::from(self.zoom_percent) / 100.0
    }

    /// Convert a screen point to unscaled canvas coordinates.
    #[must_use]
    pub fn screen_to_canvas(&self, x: f64, y: f64) -> Point {
        let scale = self.scale();
        Point::new((x - self.pan_x) / scale, (y - self.pan_y) / scale)
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom_percent: 100,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

/// In-memory state of one canvas editing session.
#[derive(Debug, Clone, Default)]
pub struct CanvasStore {
    /// Elements in z-order; later entries draw on top.
    elements: Vec<CanvasElement>,
    selected: Option<ElementId>,
    transform: ViewTransform,
    dirty: bool,
    revision: u64,
}

impl CanvasStore {
    /// Create an empty, clean store at 100% zoom.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clean store from a previously persisted element list.
    #[must_use]
    pub fn with_elements(elements: Vec<CanvasElement>) -> Self {
        let mut store = Self::new();
        store.replace_elements(elements);
        store.revision = 0;
        store
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// All elements in z-order.
    #[must_use]
    pub fn elements(&self) -> &[CanvasElement] {
        &self.elements
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&CanvasElement> {
        self.elements.iter().find(|e| &e.id == id)
    }

    /// Number of elements on the canvas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the canvas is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Currently selected element ID.
    #[must_use]
    pub fn selected_id(&self) -> Option<&ElementId> {
        self.selected.as_ref()
    }

    /// Currently selected element.
    #[must_use]
    pub fn selected_element(&self) -> Option<&CanvasElement> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    /// Current zoom and pan.
    #[must_use]
    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    /// Whether elements changed since the last successful save.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Counter bumped on every observable change, selection and viewport
    /// included. Views compare it against the value they last rendered.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Find the topmost element under a screen point.
    #[must_use]
    pub fn element_at(&self, screen_x: f64, screen_y: f64) -> Option<&ElementId> {
        let p = self.transform.screen_to_canvas(screen_x, screen_y);
        self.elements
            .iter()
            .rev()
            .find(|e| e.contains_point(p.x, p.y))
            .map(|e| &e.id)
    }

    // -----------------------------------------------------------------------
    // Element mutations
    // -----------------------------------------------------------------------

    /// Drop a new element of `kind` at `position`, select it and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::NonFinitePosition`] if either coordinate is NaN
    /// or infinite. Nothing is added in that case.
    pub fn add_element(&mut self, kind: ElementKind, position: Point) -> CanvasResult<ElementId> {
        if !position.is_finite() {
            tracing::debug!(x = position.x, y = position.y, "Rejected element position");
            return Err(CanvasError::NonFinitePosition {
                x: position.x,
                y: position.y,
            });
        }
        let mut element = CanvasElement::new(kind, position);
        // Freshly generated ids are UUIDs; this only loops if a loaded list
        // happened to use the same text.
        while self.get(&element.id).is_some() {
            element.id = ElementId::new();
        }
        let id = element.id.clone();
        tracing::debug!(%id, kind = %element.kind, "Element added");
        self.elements.push(element);
        self.selected = Some(id.clone());
        self.touch_elements();
        Ok(id)
    }

    /// Move an element by a delta already converted to canvas units.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ElementNotFound`] if the id is unknown, and
    /// [`CanvasError::NonFinitePosition`] if the delta is not finite or the
    /// move would overflow. The store is unchanged in both cases.
    pub fn move_element(&mut self, id: &ElementId, dx: f64, dy: f64) -> CanvasResult<()> {
        let element = self.element_mut(id)?;
        let moved = Point::new(element.position.x + dx, element.position.y + dy);
        if !moved.is_finite() {
            tracing::debug!(%id, dx, dy, "Rejected move");
            return Err(CanvasError::NonFinitePosition {
                x: moved.x,
                y: moved.y,
            });
        }
        element.position = moved;
        self.touch_elements();
        Ok(())
    }

    /// Resize an element.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidSize`] if either dimension is not a
    /// positive finite number, and [`CanvasError::ElementNotFound`] if the id
    /// is unknown. The store is unchanged in both cases.
    pub fn resize_element(&mut self, id: &ElementId, width: f64, height: f64) -> CanvasResult<()> {
        let size = Size::new(width, height);
        if !size.is_valid() {
            tracing::debug!(%id, width, height, "Rejected resize");
            return Err(CanvasError::InvalidSize { width, height });
        }
        self.element_mut(id)?.size = size;
        self.touch_elements();
        Ok(())
    }

    /// Set a single style property on an element.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ElementNotFound`] if the id is unknown.
    pub fn restyle_element(
        &mut self,
        id: &ElementId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> CanvasResult<()> {
        self.element_mut(id)?.style.insert(key.into(), value.into());
        self.touch_elements();
        Ok(())
    }

    /// Replace an element's display text.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ElementNotFound`] if the id is unknown.
    pub fn set_content(&mut self, id: &ElementId, content: impl Into<String>) -> CanvasResult<()> {
        self.element_mut(id)?.content = Some(content.into());
        self.touch_elements();
        Ok(())
    }

    /// Remove an element, clearing the selection if it pointed at it.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ElementNotFound`] if the id is unknown, which
    /// includes a second delete of the same id.
    pub fn delete_element(&mut self, id: &ElementId) -> CanvasResult<CanvasElement> {
        let Some(index) = self.elements.iter().position(|e| &e.id == id) else {
            tracing::debug!(%id, "Delete of unknown element");
            return Err(CanvasError::ElementNotFound(id.clone()));
        };
        let removed = self.elements.remove(index);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        self.touch_elements();
        Ok(removed)
    }

    /// Drop every element.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.selected = None;
        self.touch_elements();
    }

    /// Swap in a persisted element list.
    ///
    /// Entries that repeat an earlier id, sit at a non-finite position or carry
    /// an invalid size are dropped.
    /// Selection is cleared and the store is considered saved.
    pub fn replace_elements(&mut self, elements: Vec<CanvasElement>) {
        let mut seen = HashSet::new();
        self.elements = elements
            .into_iter()
            .filter(|e| {
                if !e.position.is_finite() {
                    tracing::warn!(id = %e.id, "Dropping element with non-finite position");
                    return false;
                }
                if !e.size.is_valid() {
                    tracing::warn!(id = %e.id, "Dropping element with invalid size");
                    return false;
                }
                if !seen.insert(e.id.clone()) {
                    tracing::warn!(id = %e.id, "Dropping element with duplicate id");
                    return false;
                }
                true
            })
            .collect();
        self.selected = None;
        self.dirty = false;
        self.revision += 1;
    }

    // -----------------------------------------------------------------------
    // Selection and viewport
    // -----------------------------------------------------------------------

    /// Select an element, or clear the selection with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ElementNotFound`] if the id is unknown; the
    /// previous selection is kept.
    pub fn select(&mut self, id: Option<&ElementId>) -> CanvasResult<()> {
        match id {
            Some(id) if self.get(id).is_none() => {
                tracing::debug!(%id, "Select of unknown element");
                Err(CanvasError::ElementNotFound(id.clone()))
            }
            _ => {
                self.selected = id.cloned();
                self.revision += 1;
                Ok(())
            }
        }
    }

    /// Set the zoom level, clamped into the supported range.
    /// Returns the level actually applied.
    pub fn set_zoom(&mut self, percent: i32) -> u16 {
        let clamped = percent.clamp(i32::from(MIN_ZOOM), i32::from(MAX_ZOOM));
        // Clamped into 50..=200 above, so the conversion cannot fail.
        self.transform.zoom_percent = u16::try_from(clamped).unwrap_or(MAX_ZOOM);
        self.revision += 1;
        self.transform.zoom_percent
    }

    /// Zoom in by one step.
    pub fn zoom_in(&mut self) -> u16 {
        self.set_zoom(i32::from(self.transform.zoom_percent) + i32::from(ZOOM_STEP))
    }

    /// Zoom out by one step.
    pub fn zoom_out(&mut self) -> u16 {
        self.set_zoom(i32::from(self.transform.zoom_percent) - i32::from(ZOOM_STEP))
    }

    /// Pan the viewport.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.transform.pan_x += dx;
        self.transform.pan_y += dy;
        self.revision += 1;
    }

    // -----------------------------------------------------------------------
    // Persistence bookkeeping
    // -----------------------------------------------------------------------

    /// Record that the current elements have been written out.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    fn element_mut(&mut self, id: &ElementId) -> CanvasResult<&mut CanvasElement> {
        match self.elements.iter_mut().find(|e| &e.id == id) {
            Some(element) => Ok(element),
            None => {
                tracing::debug!(%id, "Mutation of unknown element");
                Err(CanvasError::ElementNotFound(id.clone()))
            }
        }
    }

    fn touch_elements(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::defaults_for;

    fn store_with_button() -> (CanvasStore, ElementId) {
        let mut store = CanvasStore::new();
        let id = store.add_element(ElementKind::Button, Point::new(10.0, 20.0)).expect("add");
        (store, id)
    }

    #[test]
    fn add_selects_and_dirties() {
        let (store, id) = store_with_button();
        assert_eq!(store.len(), 1);
        assert_eq!(store.selected_id(), Some(&id));
        assert!(store.is_dirty());
    }

    #[test]
    fn add_uses_kind_defaults_for_every_palette_kind() {
        let mut store = CanvasStore::new();
        for kind in ElementKind::PALETTE {
            let id = store.add_element(kind.clone(), Point::default()).expect("add");
            let element = store.get(&id).expect("added");
            assert_eq!(element.size, defaults_for(&kind).size);
        }
        let ids: HashSet<_> = store.elements().iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids.len(), ElementKind::PALETTE.len());
    }

    #[test]
    fn move_adds_delta() {
        let (mut store, id) = store_with_button();
        store.move_element(&id, 5.0, 5.0).expect("move");
        assert_eq!(store.get(&id).expect("exists").position, Point::new(15.0, 25.0));
    }

    #[test]
    fn move_unknown_is_not_found_no_op() {
        let (mut store, _) = store_with_button();
        store.mark_saved();
        let before = store.elements().to_vec();

        let missing = ElementId::from("missing");
        let err = store.move_element(&missing, 1.0, 1.0).unwrap_err();

        assert_eq!(err, CanvasError::ElementNotFound(missing));
        assert_eq!(store.elements(), before.as_slice());
        assert!(!store.is_dirty());
    }

    #[test]
    fn add_rejects_non_finite_position() {
        let mut store = CanvasStore::new();
        for position in [Point::new(f64::NAN, 0.0), Point::new(0.0, f64::NEG_INFINITY)] {
            let err = store.add_element(ElementKind::Card, position).unwrap_err();
            assert!(matches!(err, CanvasError::NonFinitePosition { .. }));
        }
        assert!(store.is_empty());
        assert!(!store.is_dirty());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn overflowing_move_leaves_store_unchanged() {
        let (mut store, id) = store_with_button();
        store.move_element(&id, f64::MAX, 0.0).expect("finite");
        store.mark_saved();
        let before = store.elements().to_vec();

        let err = store.move_element(&id, f64::MAX, 0.0).unwrap_err();

        assert!(matches!(err, CanvasError::NonFinitePosition { x, .. } if x.is_infinite()));
        assert_eq!(store.elements(), before.as_slice());
        assert!(!store.is_dirty());
        assert!(store.move_element(&id, 0.0, f64::NAN).is_err());
    }

    #[test]
    fn replace_drops_non_finite_positions() {
        let mut store = CanvasStore::new();
        let good = CanvasElement::new(ElementKind::Button, Point::new(1.0, 2.0));
        let bad = CanvasElement::new(ElementKind::Input, Point::new(f64::INFINITY, 0.0));
        store.replace_elements(vec![good.clone(), bad]);
        assert_eq!(store.elements(), [good].as_slice());
    }

    #[test]
    fn resize_rejects_non_positive() {
        let (mut store, id) = store_with_button();
        let before = store.elements().to_vec();

        assert!(matches!(
            store.resize_element(&id, 0.0, 10.0),
            Err(CanvasError::InvalidSize { .. })
        ));
        assert!(matches!(
            store.resize_element(&id, 10.0, -1.0),
            Err(CanvasError::InvalidSize { .. })
        ));
        assert!(matches!(
            store.resize_element(&id, f64::NAN, 10.0),
            Err(CanvasError::InvalidSize { .. })
        ));
        assert_eq!(store.elements(), before.as_slice());
    }

    #[test]
    fn resize_applies_valid_size() {
        let (mut store, id) = store_with_button();
        store.resize_element(&id, 120.0, 48.0).expect("resize");
        assert_eq!(store.get(&id).expect("exists").size, Size::new(120.0, 48.0));
    }

    #[test]
    fn restyle_merges_property() {
        let (mut store, id) = store_with_button();
        store
            .restyle_element(&id, "backgroundColor", "#ff0000")
            .expect("restyle");
        store.restyle_element(&id, "opacity", "0.5").expect("restyle");

        let style = &store.get(&id).expect("exists").style;
        assert_eq!(style["backgroundColor"], "#ff0000");
        assert_eq!(style["opacity"], "0.5");
        assert_eq!(style["color"], "#ffffff");
    }

    #[test]
    fn restyle_creates_style_on_bare_kind() {
        let mut store = CanvasStore::new();
        let id = store.add_element(ElementKind::Grid, Point::default()).expect("add");
        store.restyle_element(&id, "gap", "8px").expect("restyle");
        assert_eq!(store.get(&id).expect("exists").style.len(), 1);
    }

    #[test]
    fn set_content_on_unknown_is_not_found() {
        let mut store = CanvasStore::new();
        assert!(matches!(
            store.set_content(&ElementId::from("nope"), "hi"),
            Err(CanvasError::ElementNotFound(_))
        ));
    }

    #[test]
    fn delete_is_idempotent_and_reported() {
        let (mut store, id) = store_with_button();
        store.delete_element(&id).expect("first delete");
        assert!(store.is_empty());
        assert!(store.selected_id().is_none());

        let err = store.delete_element(&id).unwrap_err();
        assert_eq!(err, CanvasError::ElementNotFound(id));
        assert!(store.is_empty());
    }

    #[test]
    fn delete_keeps_unrelated_selection() {
        let mut store = CanvasStore::new();
        let a = store.add_element(ElementKind::Card, Point::default()).expect("add");
        let b = store.add_element(ElementKind::Card, Point::default()).expect("add");
        store.select(Some(&a)).expect("select");

        store.delete_element(&b).expect("delete");
        assert_eq!(store.selected_id(), Some(&a));
    }

    #[test]
    fn select_does_not_dirty() {
        let (mut store, id) = store_with_button();
        store.mark_saved();

        store.select(None).expect("deselect");
        assert!(store.selected_id().is_none());
        store.select(Some(&id)).expect("select");
        assert_eq!(store.selected_id(), Some(&id));
        assert!(!store.is_dirty());
    }

    #[test]
    fn select_unknown_keeps_selection() {
        let (mut store, id) = store_with_button();
        assert!(store.select(Some(&ElementId::from("ghost"))).is_err());
        assert_eq!(store.selected_id(), Some(&id));
    }

    #[test]
    fn zoom_clamps() {
        let mut store = CanvasStore::new();
        assert_eq!(store.set_zoom(500), MAX_ZOOM);
        assert_eq!(store.set_zoom(-10), MIN_ZOOM);
        assert_eq!(store.set_zoom(130), 130);
    }

    #[test]
    fn zoom_steps_stop_at_bounds() {
        let mut store = CanvasStore::new();
        for _ in 0..20 {
            store.zoom_in();
        }
        assert_eq!(store.transform().zoom_percent, MAX_ZOOM);
        for _ in 0..20 {
            store.zoom_out();
        }
        assert_eq!(store.transform().zoom_percent, MIN_ZOOM);
        assert!(!store.is_dirty());
    }

    #[test]
    fn pan_accumulates() {
        let mut store = CanvasStore::new();
        store.pan(10.0, -5.0);
        store.pan(2.5, 2.5);
        let t = store.transform();
        assert!((t.pan_x - 12.5).abs() < f64::EPSILON);
        assert!((t.pan_y + 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn element_at_accounts_for_zoom_and_pan() {
        let mut store = CanvasStore::new();
        let under = store.add_element(ElementKind::Card, Point::new(0.0, 0.0)).expect("add");
        let top = store.add_element(ElementKind::Button, Point::new(50.0, 50.0)).expect("add");

        assert_eq!(store.element_at(60.0, 60.0), Some(&top));
        assert_eq!(store.element_at(10.0, 10.0), Some(&under));

        store.set_zoom(200);
        store.pan(100.0, 0.0);
        // Screen (120, 20) -> canvas (10, 10)
        assert_eq!(store.element_at(120.0, 20.0), Some(&under));
        assert!(store.element_at(50.0, 20.0).is_none());
    }

    #[test]
    fn revision_tracks_every_change() {
        let (mut store, id) = store_with_button();
        let r0 = store.revision();
        store.select(None).expect("deselect");
        store.pan(1.0, 1.0);
        store.move_element(&id, 1.0, 0.0).expect("move");
        assert_eq!(store.revision(), r0 + 3);
    }

    #[test]
    fn with_elements_drops_duplicates_and_bad_sizes() {
        let good = CanvasElement::new(ElementKind::Card, Point::default());
        let mut dup = CanvasElement::new(ElementKind::Button, Point::default());
        dup.id = good.id.clone();
        let mut flat = CanvasElement::new(ElementKind::Text, Point::default());
        flat.size.height = 0.0;

        let store = CanvasStore::with_elements(vec![good.clone(), dup, flat]);
        assert_eq!(store.elements(), &[good]);
        assert!(!store.is_dirty());
        assert!(store.selected_id().is_none());
    }

    #[test]
    fn scenario_add_move_delete() {
        let mut store = CanvasStore::new();
        let a = store.add_element(ElementKind::parse("Button"), Point::new(10.0, 20.0)).expect("add");
        assert_eq!(store.len(), 1);
        assert_eq!(store.selected_id(), Some(&a));

        store.move_element(&a, 5.0, 5.0).expect("move");
        assert_eq!(store.get(&a).expect("exists").position, Point::new(15.0, 25.0));

        store.delete_element(&a).expect("delete");
        assert_eq!(store.len(), 0);
        assert!(store.selected_id().is_none());
    }
}
