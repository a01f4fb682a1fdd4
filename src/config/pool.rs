//! Worker pool sizing

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of OS threads doing training / inference
    pub workers: usize,
    /// Jobs allowed to wait for a free worker before submissions are rejected
    pub queue_capacity: usize,
}

pub const POOL: PoolConfig = PoolConfig {
    workers: 4,
    queue_capacity: 64,
};

impl Default for PoolConfig {
    fn default() -> Self {
        POOL
    }
}
