use crate::accessor::FlatPointBuffer;
use crate::config::NeighborhoodConfig;
use crate::error::QueryStatus;
use crate::geometry::Point;
use crate::neighborhood::Neighborhood;
use crate::query::NeighborQuery;
use js_sys::Array;
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_rayon::init_thread_pool;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init_threads(n: usize) -> js_sys::Promise {
    init_thread_pool(n)
}

pub fn parse_js_point(val: &JsValue) -> Option<Point> {
    let arr = val.dyn_ref::<Array>()?;
    if arr.length() < 3 {
        return None;
    }
    let mut point = [0.0; 3];
    for (i, c) in point.iter_mut().enumerate() {
        *c = arr.get(i as u32).as_f64()?;
    }
    Some(point)
}

// usize is 32 bits on wasm32, so indices convert losslessly there.
fn to_js_indices(indices: Vec<usize>) -> Vec<u32> {
    indices.into_iter().map(|i| i as u32).collect()
}

/// Result of a k-nearest-neighbor query.
///
/// `underfull` is set when fewer than `requested` points were indexed; `indices`
/// then holds all of them.
#[wasm_bindgen(js_name = KNeighbors)]
#[derive(Clone, Debug)]
pub struct KNeighborsWASM {
    indices: Vec<u32>,
    requested: usize,
    underfull: bool,
}

#[wasm_bindgen(js_class = KNeighbors)]
impl KNeighborsWASM {
    #[wasm_bindgen(getter)]
    pub fn indices(&self) -> Vec<u32> {
        self.indices.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn requested(&self) -> usize {
        self.requested
    }

    #[wasm_bindgen(getter)]
    pub fn underfull(&self) -> bool {
        self.underfull
    }
}

impl KNeighborsWASM {
    fn new(k: usize, (indices, status): (Vec<usize>, QueryStatus)) -> Self {
        KNeighborsWASM {
            indices: to_js_indices(indices),
            requested: k,
            underfull: !status.is_complete(),
        }
    }
}

/// Neighborhood over a flat coordinate buffer `[x, y, z, x, y, z, ...]`.
///
/// The buffer is copied into WASM memory on construction and owned by the
/// neighborhood. Returned indices refer to positions in that buffer.
#[wasm_bindgen(js_name = PointSetNeighborhood)]
pub struct PointSetNeighborhoodWASM {
    inner: Neighborhood<FlatPointBuffer>,
}

#[wasm_bindgen(js_class = PointSetNeighborhood)]
impl PointSetNeighborhoodWASM {
    /// Builds the neighborhood.
    ///
    /// # Arguments
    /// * `coords` - Interleaved point coordinates.
    /// * `voxel_size` - When given, the points are simplified on a voxel grid of this cell size first.
    /// * `leaf_bucket_size` - Maximum number of points per kd-tree leaf.
    #[wasm_bindgen(constructor)]
    pub fn new(
        coords: Vec<f64>,
        voxel_size: Option<f64>,
        leaf_bucket_size: Option<usize>,
    ) -> Result<PointSetNeighborhoodWASM, JsError> {
        let mut config = NeighborhoodConfig::default();
        if let Some(s) = voxel_size {
            config = config.with_voxel_size(s);
        }
        if let Some(b) = leaf_bucket_size {
            config = config.with_leaf_bucket_size(b);
        }
        let inner = Neighborhood::with_config(FlatPointBuffer::new(coords), config)?;
        Ok(PointSetNeighborhoodWASM { inner })
    }

    #[wasm_bindgen(getter)]
    pub fn count_points(&self) -> usize {
        self.inner.accessor().coords().len() / 3
    }

    #[wasm_bindgen(getter)]
    pub fn count_indexed(&self) -> usize {
        self.inner.len()
    }

    #[wasm_bindgen(getter)]
    pub fn indices(&self) -> Vec<u32> {
        to_js_indices(self.inner.indices().to_vec())
    }

    /// The `k` nearest indexed points to `point` (an `[x, y, z]` array), closest first.
    #[wasm_bindgen(js_name = kNeighbors)]
    pub fn k_neighbors(&self, point: JsValue, k: usize) -> Result<KNeighborsWASM, JsError> {
        let query = parse_js_point(&point).ok_or_else(|| JsError::new("expected an [x, y, z] array"))?;
        Ok(KNeighborsWASM::new(k, self.inner.k_neighbor_query(k)?.neighbors(query)))
    }

    /// All indexed points within `radius` of `point` (an `[x, y, z]` array).
    #[wasm_bindgen(js_name = rangeNeighbors)]
    pub fn range_neighbors(&self, point: JsValue, radius: f64) -> Result<Vec<u32>, JsError> {
        let query = parse_js_point(&point).ok_or_else(|| JsError::new("expected an [x, y, z] array"))?;
        let (neighbors, _) = self.inner.range_neighbor_query(radius)?.neighbors(query);
        Ok(to_js_indices(neighbors))
    }

    /// The `k` nearest neighbors of every input point, as an array of `KNeighbors`.
    ///
    /// Runs on the rayon thread pool; call `init_threads` first to use more than one worker.
    #[wasm_bindgen(js_name = allKNeighbors)]
    pub fn all_k_neighbors(&self, k: usize) -> Result<Array, JsError> {
        let query = self.inner.k_neighbor_query(k)?;
        let result = Array::new();
        for neighbors in self.inner.par_input_neighborhoods(&query) {
            result.push(&JsValue::from(KNeighborsWASM::new(k, neighbors)));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_k_neighbors_carries_status() {
        let full = KNeighborsWASM::new(2, (vec![3, 1], QueryStatus::Complete));
        assert_eq!(full.indices(), vec![3, 1]);
        assert!(!full.underfull());

        let partial = KNeighborsWASM::new(5, (vec![0, 1], QueryStatus::Underfull { found: 2, requested: 5 }));
        assert_eq!(partial.requested(), 5);
        assert!(partial.underfull());
    }
}
