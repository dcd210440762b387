//! Class colours and stacking order, derived from the element list on every render.

use std::collections::HashMap;

use crate::config::DEFAULT_PALETTE;
use crate::models::{Color, Detection};

/// Element indices sorted by storage-space area, largest first.
///
/// Larger elements (room perimeters) end up underneath smaller ones (fixtures).
/// The sort is stable, so equal areas keep insertion order.
pub fn render_order(elements: &[Detection]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..elements.len()).collect();
    order.sort_by(|&a, &b| elements[b].bbox.area().total_cmp(&elements[a].bbox.area()));
    order
}

/// Colours and z-positions for one render of a scene
#[derive(Debug, Clone)]
pub struct LayerAssignment {
    order: Vec<usize>,
    z_index: Vec<usize>,
    colors: HashMap<String, Color>,
    legend: Vec<(String, Color)>,
}

impl LayerAssignment {
    pub fn compute(elements: &[Detection], palette: &[Color]) -> Self {
        let palette = if palette.is_empty() { &DEFAULT_PALETTE[..] } else { palette };
        let order = render_order(elements);

        let mut z_index = vec![0; elements.len()];
        let mut colors = HashMap::new();
        let mut legend = Vec::new();

        for (position, &idx) in order.iter().enumerate() {
            z_index[idx] = position;
            let label = &elements[idx].class_label;
            if !colors.contains_key(label) {
                let color = palette[legend.len() % palette.len()];
                colors.insert(label.clone(), color);
                legend.push((label.clone(), color));
            }
        }

        Self {
            order,
            z_index,
            colors,
            legend,
        }
    }

    /// Element indices in drawing order
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Position of an element (by insertion index) in the drawing order
    pub fn z_index(&self, element_index: usize) -> Option<usize> {
        self.z_index.get(element_index).copied()
    }

    pub fn color_of(&self, class_label: &str) -> Option<Color> {
        self.colors.get(class_label).copied()
    }

    /// Classes with their colours, in order of first appearance
    pub fn legend(&self) -> &[(String, Color)] {
        &self.legend
    }
}
