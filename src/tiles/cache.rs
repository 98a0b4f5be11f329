use crate::core::geo::TileCoord;
use lru::LruCache;
use std::{
    num::NonZeroUsize,
    sync::{Arc, Mutex},
};

/// A tile of a specific layer. Layers share coordinates, so the layer id is
/// part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileKey {
    pub layer_id: String,
    pub coord: TileCoord,
}

impl TileKey {
    pub fn new(layer_id: impl Into<String>, coord: TileCoord) -> Self {
        Self {
            layer_id: layer_id.into(),
            coord,
        }
    }
}

/// In-memory LRU of tile payloads (raw bytes or decoded textures)
pub struct TileCache<V> {
    cache: Arc<Mutex<LruCache<TileKey, V>>>,
}

impl<V: Clone> TileCache<V> {
    /// `capacity` of zero falls back to one entry
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Looks up a tile and marks it recently used
    pub fn get(&self, key: &TileKey) -> Option<V> {
        self.cache.lock().ok()?.get(key).cloned()
    }

    pub fn insert(&self, key: TileKey, value: V) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, value);
        }
    }

    pub fn contains(&self, key: &TileKey) -> bool {
        self.cache
            .lock()
            .map(|cache| cache.contains(key))
            .unwrap_or(false)
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.cache.lock().map(|cache| cache.cap().get()).unwrap_or(0)
    }
}

impl<V> Clone for TileCache<V> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(layer: &str, x: u32) -> TileKey {
        TileKey::new(layer, TileCoord::new(x, 0, 3))
    }

    #[test]
    fn test_basic_operations() {
        let cache: TileCache<Arc<Vec<u8>>> = TileCache::new(4);
        assert!(cache.is_empty());

        cache.insert(key("street", 1), Arc::new(vec![1, 2, 3]));
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&key("street", 1)));
        assert!(!cache.contains(&key("satellite", 1)));
        assert_eq!(*cache.get(&key("street", 1)).unwrap(), vec![1, 2, 3]);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_lru_eviction() {
        let cache: TileCache<u8> = TileCache::new(2);
        cache.insert(key("street", 1), 1);
        cache.insert(key("street", 2), 2);

        // Touch 1 so 2 becomes the eviction candidate
        assert_eq!(cache.get(&key("street", 1)), Some(1));
        cache.insert(key("street", 3), 3);

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&key("street", 1)));
        assert!(!cache.contains(&key("street", 2)));
        assert!(cache.contains(&key("street", 3)));
    }

    #[test]
    fn test_zero_capacity() {
        let cache: TileCache<u8> = TileCache::new(0);
        assert_eq!(cache.capacity(), 1);
    }

    #[test]
    fn test_clones_share_storage() {
        let cache: TileCache<u8> = TileCache::new(8);
        let other = cache.clone();
        other.insert(key("street", 7), 7);
        assert_eq!(cache.get(&key("street", 7)), Some(7));
    }
}
