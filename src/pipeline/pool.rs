// Bounded pool of pipeline workers with scoped checkout.
//
// Concurrent requests draw workers from a fixed-size pool; checkout blocks
// when every worker is busy. The guard returns its worker on drop, on every
// exit path — early return, error, panic during a request — so the pool
// can never leak capacity.

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

use crate::language::LinguisticResources;

use super::Pipeline;

pub struct PipelinePool {
    idle: Mutex<Vec<Pipeline>>,
    available: Condvar,
}

impl PipelinePool {
    /// Build a pool of `size` workers sharing one resource bundle.
    pub fn new(size: usize, resources: Arc<LinguisticResources>) -> Self {
        let idle = (0..size.max(1))
            .map(|_| Pipeline::new(Arc::clone(&resources)))
            .collect();
        Self {
            idle: Mutex::new(idle),
            available: Condvar::new(),
        }
    }

    /// Take a worker, blocking until one is idle.
    pub fn checkout(&self) -> PooledPipeline<'_> {
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(worker) = idle.pop() {
                return PooledPipeline {
                    pool: self,
                    worker: Some(worker),
                };
            }
            idle = self
                .available
                .wait(idle)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Take a worker only if one is idle right now.
    pub fn try_checkout(&self) -> Option<PooledPipeline<'_>> {
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        idle.pop().map(|worker| PooledPipeline {
            pool: self,
            worker: Some(worker),
        })
    }

    fn put_back(&self, worker: Pipeline) {
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        idle.push(worker);
        self.available.notify_one();
    }
}

/// RAII checkout guard; dereferences to the pipeline worker.
pub struct PooledPipeline<'a> {
    pool: &'a PipelinePool,
    worker: Option<Pipeline>,
}

impl Deref for PooledPipeline<'_> {
    type Target = Pipeline;

    fn deref(&self) -> &Pipeline {
        self.worker.as_ref().expect("worker present until drop")
    }
}

impl DerefMut for PooledPipeline<'_> {
    fn deref_mut(&mut self) -> &mut Pipeline {
        self.worker.as_mut().expect("worker present until drop")
    }
}

impl Drop for PooledPipeline<'_> {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.pool.put_back(worker);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClusteringConfig;
    use crate::document::Document;

    fn pool(size: usize) -> PipelinePool {
        let resources = Arc::new(LinguisticResources::for_language("en").unwrap());
        PipelinePool::new(size, resources)
    }

    #[test]
    fn test_checkout_and_return() {
        let pool = pool(1);
        {
            let _worker = pool.checkout();
            assert!(pool.try_checkout().is_none());
        }
        // Dropped guard returned the worker.
        assert!(pool.try_checkout().is_some());
    }

    #[test]
    fn test_zero_size_pool_still_has_one_worker() {
        let pool = pool(0);
        assert!(pool.try_checkout().is_some());
    }

    #[test]
    fn test_concurrent_requests_share_the_pool() {
        let pool = Arc::new(pool(2));
        let config = ClusteringConfig::default().validate().unwrap();
        let documents: Vec<Document> = (0..6)
            .map(|i| {
                Document::from_title_snippet(
                    i.to_string(),
                    "rust compiler tooling",
                    "borrow checker and cargo",
                )
            })
            .collect();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pool = Arc::clone(&pool);
                let config = config.clone();
                let documents = documents.clone();
                std::thread::spawn(move || {
                    let worker = pool.checkout();
                    worker.run(&documents, &config).unwrap()
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        // Identical inputs from any worker produce identical output.
        for result in &results[1..] {
            assert_eq!(result, &results[0]);
        }
    }
}
