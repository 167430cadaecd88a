//! Elements: a shape plus the fields every kind shares.

use crate::layer::LayerId;
use crate::shapes::{HitParams, Shape};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements. Time-ordered, so creation order is recoverable.
pub type ElementId = Uuid;

/// Generate a fresh element id.
pub fn new_element_id() -> ElementId {
    Uuid::now_v7()
}

fn default_opacity() -> f64 {
    1.0
}

/// A drawable primitive owned by exactly one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    pub layer_id: LayerId,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(flatten)]
    pub shape: Shape,
}

impl Element {
    /// Wrap a shape as a new element on `layer_id`.
    pub fn new(layer_id: LayerId, shape: Shape) -> Self {
        Self {
            id: new_element_id(),
            layer_id,
            opacity: 1.0,
            shape,
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn bounds(&self) -> Rect {
        self.shape.bounds()
    }

    pub fn hit_test(&self, point: Point, params: &HitParams) -> bool {
        self.shape.hit_test(point, params)
    }

    pub fn intersects_rect(&self, rect: Rect) -> bool {
        self.shape.intersects_rect(rect)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.shape.translate(delta);
    }

    pub fn rescale(&mut self, sx: f64, sy: f64) {
        self.shape.rescale(sx, sy);
    }

    /// Copy with a fresh id.
    pub fn duplicate(&self) -> Self {
        Self {
            id: new_element_id(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Rectangle, Stroke};

    #[test]
    fn test_ids_are_time_ordered() {
        let a = new_element_id();
        let b = new_element_id();
        assert!(a < b);
    }

    #[test]
    fn test_serialized_element_is_flat() {
        let layer = Uuid::new_v4();
        let element = Element::new(
            layer,
            Shape::Rectangle(Rectangle::new(Point::new(1.0, 2.0), 3.0, 4.0)),
        );
        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(json["type"], "rectangle");
        assert_eq!(json["layerId"], layer.to_string());
        assert_eq!(json["width"], 3.0);

        let back: Element = serde_json::from_value(json).unwrap();
        assert_eq!(back, element);
    }

    #[test]
    fn test_missing_opacity_defaults_to_one() {
        let layer = Uuid::new_v4();
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "layerId": layer,
            "type": "line",
            "points": [0, 0, 10, 10],
            "stroke": "#ff0000",
            "strokeWidth": 3
        });
        let element: Element = serde_json::from_value(json).unwrap();
        assert!((element.opacity - 1.0).abs() < f64::EPSILON);
        assert_eq!(element.shape.as_stroke().map(Stroke::len), Some(2));
    }

    #[test]
    fn test_duplicate_gets_new_id() {
        let element = Element::new(
            Uuid::new_v4(),
            Shape::Line(Stroke::new(vec![0.0, 0.0, 5.0, 5.0])),
        );
        let copy = element.duplicate();
        assert_ne!(copy.id, element.id);
        assert_eq!(copy.shape, element.shape);
    }
}
