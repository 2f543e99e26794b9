use std::sync::Arc;

use hashbrown::HashMap;
use isoterra_geom::LatticePos;

/// Lattice footprint of a sculpting tool, centred on the edit point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BrushShape {
    /// Ball of lattice points within `radius`; weight falls off linearly.
    Sphere { radius: u32 },
    /// Axis-aligned box `[-half_extent, half_extent]^3`, full weight.
    Cube { half_extent: u32 },
}

impl BrushShape {
    /// Inclusive offset bounds of the footprint.
    pub fn extent(self) -> i32 {
        match self {
            BrushShape::Sphere { radius } => radius as i32,
            BrushShape::Cube { half_extent } => half_extent as i32,
        }
    }

    fn enumerate(self) -> Vec<BrushSample> {
        let e = self.extent();
        let mut out = Vec::new();
        for z in -e..=e {
            for y in -e..=e {
                for x in -e..=e {
                    let offset = LatticePos::new(x, y, z);
                    let weight = match self {
                        BrushShape::Sphere { radius } => {
                            let d = ((x * x + y * y + z * z) as f32).sqrt();
                            let r = radius as f32 + 0.5;
                            if d > r {
                                continue;
                            }
                            1.0 - d / r
                        }
                        BrushShape::Cube { .. } => 1.0,
                    };
                    out.push(BrushSample { offset, weight });
                }
            }
        }
        out
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrushSample {
    pub offset: LatticePos,
    /// Strength multiplier in `(0, 1]`.
    pub weight: f32,
}

/// Memoised brush footprints, owned by whoever applies edits.
#[derive(Default, Debug)]
pub struct ShapeCache {
    shapes: HashMap<BrushShape, Arc<[BrushSample]>>,
}

impl ShapeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&mut self, shape: BrushShape) -> Arc<[BrushSample]> {
        self.shapes
            .entry(shape)
            .or_insert_with(|| {
                log::debug!(target: "edit", "caching brush footprint {:?}", shape);
                shape.enumerate().into()
            })
            .clone()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }
}
