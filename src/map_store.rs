use parking_lot::RwLock;
use std::sync::Arc;

use fleetnav_navigation::map::{MapLayers, OccupancyGrid};

/// The current map, replaced wholesale on every rebuild.
///
/// Readers clone the inner `Arc` and release the lock immediately, so a
/// rebuild never blocks behind a long planning call and a reader never sees
/// a half-written grid.
#[derive(Debug, Clone)]
pub struct MapStore {
    current: Arc<RwLock<Arc<MapLayers>>>,
}

impl MapStore {
    pub fn new(initial: MapLayers) -> Self {
        MapStore {
            current: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    /// An all-free map of the given environment size.
    pub fn empty(width: usize, height: usize) -> anyhow::Result<Self> {
        let grid = OccupancyGrid::for_environment(width, height)?;
        Ok(Self::new(MapLayers {
            raw: grid.clone(),
            opened: grid,
        }))
    }

    pub fn snapshot(&self) -> Arc<MapLayers> {
        Arc::clone(&self.current.read())
    }

    /// Install `layers` and return the map it replaced.
    pub fn swap(&self, layers: Arc<MapLayers>) -> Arc<MapLayers> {
        std::mem::replace(&mut *self.current.write(), layers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetnav_navigation::map::GridPoint;

    #[test]
    fn test_readers_keep_old_snapshot_across_swap() {
        let store = MapStore::empty(4, 4).unwrap();
        let before = store.snapshot();

        let mut grid = OccupancyGrid::for_environment(4, 4).unwrap();
        grid.mark_occupied(GridPoint::new(1, 1)).unwrap();
        let replaced = store.swap(Arc::new(MapLayers {
            raw: grid.clone(),
            opened: grid,
        }));

        assert!(Arc::ptr_eq(&before, &replaced));
        assert_eq!(before.opened.occupied_count(), 0);
        assert_eq!(store.snapshot().opened.occupied_count(), 1);
    }
}
