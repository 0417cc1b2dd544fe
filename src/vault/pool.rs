//! Bounded worker pool for file-by-file vault I/O.
//!
//! Large vaults are read and flushed one file per task, with at most
//! `workers` threads alive so file-descriptor use stays bounded.

use std::sync::Mutex;
use std::thread;

/// Apply `task` to every item using at most `workers` threads.
///
/// Results come back in item order.  With one worker (or one item) the
/// work runs on the calling thread.
pub fn run_bounded<T, R, F>(items: &mut [T], workers: usize, task: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(&mut T) -> R + Sync,
{
    let workers = workers.max(1).min(items.len());
    if workers <= 1 {
        return items.iter_mut().map(task).collect();
    }

    let total = items.len();
    let queue = Mutex::new(items.iter_mut().enumerate());
    let task = &task;
    let queue = &queue;

    let mut indexed: Vec<(usize, R)> = thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                s.spawn(move || {
                    let mut done = Vec::new();
                    loop {
                        // Only the hand-off is locked; the task runs unlocked.
                        let next = queue.lock().unwrap_or_else(|p| p.into_inner()).next();
                        match next {
                            Some((index, item)) => done.push((index, task(item))),
                            None => break,
                        }
                    }
                    done
                })
            })
            .collect();

        let mut all = Vec::with_capacity(total);
        for handle in handles {
            match handle.join() {
                Ok(done) => all.extend(done),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
        all
    });

    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, result)| result).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_keep_item_order() {
        let mut items: Vec<u32> = (0..100).collect();
        let out = run_bounded(&mut items, 4, |n| *n * 2);
        assert_eq!(out, (0..100).map(|n| n * 2).collect::<Vec<_>>());
    }

    #[test]
    fn tasks_can_mutate_items() {
        let mut items = vec![1, 2, 3];
        run_bounded(&mut items, 3, |n| *n += 10);
        assert_eq!(items, vec![11, 12, 13]);
    }

    #[test]
    fn zero_workers_runs_inline() {
        let mut items = vec!["a", "b"];
        let out = run_bounded(&mut items, 0, |s| s.len());
        assert_eq!(out, vec![1, 1]);
    }

    #[test]
    fn empty_input() {
        let mut items: Vec<u8> = Vec::new();
        assert!(run_bounded(&mut items, 8, |b| *b).is_empty());
    }
}
