use std::collections::HashMap;

use crate::{Approximation, Point};

/// Points sharing one approximation, referenced by id.
#[derive(Clone, Debug)]
pub struct PointBox {
    key: Approximation,
    members: Vec<usize>,
}

impl PointBox {
    pub fn key(&self) -> Approximation {
        self.key
    }

    /// Ids of the points in this box, in load order.
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// All loaded points grouped by approximation. Boxes are kept in order of
/// first appearance during the load, and every box is non-empty.
#[derive(Clone, Debug, Default)]
pub struct BoxIndex {
    points: Vec<Point>,
    boxes: Vec<PointBox>,
    slots: HashMap<Approximation, usize>,
}

impl BoxIndex {
    /// `keys[i]` is the approximation of `points[i]`.
    pub(crate) fn assemble(points: Vec<Point>, keys: Vec<Approximation>) -> Self {
        debug_assert_eq!(points.len(), keys.len());
        let mut boxes: Vec<PointBox> = Vec::new();
        let mut slots = HashMap::new();
        for (id, key) in keys.into_iter().enumerate() {
            let slot = *slots.entry(key).or_insert_with(|| {
                boxes.push(PointBox {
                    key,
                    members: Vec::new(),
                });
                boxes.len() - 1
            });
            boxes[slot].members.push(id);
        }
        Self {
            points,
            boxes,
            slots,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    pub fn boxes(&self) -> &[PointBox] {
        &self.boxes
    }

    pub fn get(&self, key: &Approximation) -> Option<&PointBox> {
        self.slots.get(key).map(|slot| &self.boxes[*slot])
    }

    pub fn point(&self, id: usize) -> Option<&Point> {
        self.points.get(id)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Points of the box keyed by `key`, in load order.
    pub fn box_points(&self, key: &Approximation) -> impl Iterator<Item = &Point> + '_ {
        self.get(key)
            .into_iter()
            .flat_map(|point_box| point_box.members.iter().map(|id| &self.points[*id]))
    }
}
