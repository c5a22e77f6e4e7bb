//! Local task spawning
//!
//! The engine is single threaded. Work that must outlive the call that started
//! it (route resolution, scroll-edge continuations) is handed to a
//! [`TaskSpawner`], which the host implements on top of its executor.

use std::future::Future;
use std::pin::Pin;

/// A non-`Send` unit of background work
pub type LocalTask = Pin<Box<dyn Future<Output = ()>>>;

/// Runs [`LocalTask`]s on the host's single-threaded executor
///
/// Any `Fn(LocalTask)` closure is a spawner:
///
/// ```ignore
/// let spawner = |task| {
///     tokio::task::spawn_local(task);
/// };
/// ```
pub trait TaskSpawner {
    /// Start `task`; it must be polled to completion
    fn spawn_local(&self, task: LocalTask);
}

impl<F> TaskSpawner for F
where
    F: Fn(LocalTask),
{
    fn spawn_local(&self, task: LocalTask) {
        self(task);
    }
}

/// Box a future into a [`LocalTask`]
pub fn local_task(future: impl Future<Output = ()> + 'static) -> LocalTask {
    Box::pin(future)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_closure_spawner() {
        let queue: Rc<RefCell<Vec<LocalTask>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = queue.clone();
        let spawner = move |task: LocalTask| sink.borrow_mut().push(task);

        let ran = Rc::new(RefCell::new(false));
        let flag = ran.clone();
        spawner.spawn_local(local_task(async move {
            *flag.borrow_mut() = true;
        }));

        assert!(!*ran.borrow());
        let tasks: Vec<LocalTask> = queue.borrow_mut().drain(..).collect();
        for task in tasks {
            pollster::block_on(task);
        }
        assert!(*ran.borrow());
    }
}
