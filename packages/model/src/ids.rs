use crc32fast::Hasher;

/// Derive a stable id seed from a flow id using CRC32
pub fn flow_seed(flow_id: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(flow_id.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential id generator for objects within one flow document
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String, // Flow id digest (CRC32)
    count: u32,   // Sequential counter
}

impl IdGenerator {
    pub fn new(flow_id: &str) -> Self {
        Self {
            seed: flow_seed(flow_id),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate next sequential id
    pub fn next_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    /// Get the seed shared by all ids from this generator
    pub fn seed(&self) -> &str {
        &self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_seed_is_stable() {
        let id1 = flow_seed("flow-a");
        let id2 = flow_seed("flow-a");

        // Same flow id always generates same seed
        assert_eq!(id1, id2);

        // Different flow ids generate different seeds
        let id3 = flow_seed("flow-b");
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_sequential_ids() {
        let mut gen = IdGenerator::new("flow-a");

        let id1 = gen.next_id();
        let id2 = gen.next_id();
        let id3 = gen.next_id();

        // Ids are sequential
        assert!(id1.ends_with("-1"));
        assert!(id2.ends_with("-2"));
        assert!(id3.ends_with("-3"));

        // All share same seed
        let seed = gen.seed();
        assert!(id1.starts_with(seed));
        assert!(id2.starts_with(seed));
        assert!(id3.starts_with(seed));
    }
}
