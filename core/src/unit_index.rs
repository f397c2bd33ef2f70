//! Persists the segmentation of each text into lines and phrases and
//! serves units by `(text, unit-type)` in ordinal order.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::text::TextId;
use crate::unit::{Unit, UnitType};

#[derive(Default)]
pub struct UnitIndex {
    units: RwLock<HashMap<(TextId, UnitType), Vec<Unit>>>,
}

impl UnitIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replaces the units of `(text_id, unit_type)`. Units
    /// must already be in ordinal order.
    pub fn put_text_units(&self, text_id: TextId, unit_type: UnitType, units: Vec<Unit>) {
        self.units.write().unwrap().insert((text_id, unit_type), units);
    }

    pub fn units_of(&self, text_id: TextId, unit_type: UnitType) -> Vec<Unit> {
        self.units.read().unwrap().get(&(text_id, unit_type)).cloned().unwrap_or_default()
    }

    pub fn delete_text(&self, text_id: TextId) {
        let mut units = self.units.write().unwrap();
        units.retain(|(id, _), _| *id != text_id);
    }
}
