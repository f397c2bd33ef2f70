//! A bounded job queue served by a fixed-size worker pool, per §5.
//! Workers dequeue one job at a time and run it to completion; the
//! queue is drained and workers joined on shutdown.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::thread::JoinHandle;

pub type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct WorkerPool {
    sender: Option<Sender<Job>>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(name: &str, workers: usize, queue_capacity: usize) -> Self {
        let (sender, receiver): (Sender<Job>, Receiver<Job>) = bounded(queue_capacity);
        let mut handles = Vec::with_capacity(workers);
        for idx in 0..workers {
            let receiver = receiver.clone();
            let thread_name = format!("{name}-{idx}");
            let handle = std::thread::Builder::new()
                .name(thread_name.clone())
                .spawn(move || {
                    while let Ok(job) = receiver.recv() {
                        job();
                    }
                    log::debug!("{thread_name} shutting down: queue closed");
                })
                .expect("failed to spawn worker thread");
            handles.push(handle);
        }
        Self { sender: Some(sender), handles }
    }

    /// Submits a job to the queue. Blocks if the queue is at capacity.
    pub fn submit(&self, job: Job) {
        if let Some(sender) = &self.sender {
            if sender.send(job).is_err() {
                log::error!("worker pool queue closed, dropping job");
            }
        }
    }

    /// Closes the queue and joins every worker thread.
    pub fn shutdown(mut self) {
        self.sender.take();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.sender.take();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn jobs_run_to_completion() {
        let pool = WorkerPool::new("test-worker", 2, 8);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..10 {
            let counter = counter.clone();
            pool.submit(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }
        pool.shutdown();
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }
}
