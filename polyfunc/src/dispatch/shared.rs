//! A dispatch table shared between threads.
//!
//! Resolution runs against a point-in-time snapshot of the table, taken
//! under a short read lock. Updates copy the table if any snapshot is still
//! alive (read-copy-update), so an in-flight resolution never observes a
//! half-applied registration and handlers never run while a lock is held.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::value::Value;

use super::result::Resolution;
use super::table::DispatchTable;

/// A [`DispatchTable`] that can be resolved and extended concurrently.
#[derive(Debug, Default)]
pub struct SharedDispatchTable {
    current: RwLock<Arc<DispatchTable>>,
}

impl SharedDispatchTable {
    pub fn new(table: DispatchTable) -> Self {
        Self {
            current: RwLock::new(Arc::new(table)),
        }
    }

    /// The table as of now. Later updates do not affect the snapshot.
    pub fn snapshot(&self) -> Arc<DispatchTable> {
        Arc::clone(&self.current.read())
    }

    /// Mutates the table. Resolutions that already took a snapshot keep
    /// seeing the old bindings.
    pub fn update<R>(&self, f: impl FnOnce(&mut DispatchTable) -> R) -> R {
        let mut current = self.current.write();
        f(Arc::make_mut(&mut current))
    }

    pub fn resolve(&self, args: &[Value]) -> Resolution {
        self.snapshot().resolve(args)
    }

    pub fn evaluate(&self, args: &[Value]) -> Option<Value> {
        self.snapshot().evaluate(args)
    }
}

impl From<DispatchTable> for SharedDispatchTable {
    fn from(table: DispatchTable) -> Self {
        Self::new(table)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::error::PolyResult;

    #[test]
    fn test_snapshot_unaffected_by_update() -> PolyResult<()> {
        let shared = SharedDispatchTable::default();
        let before = shared.snapshot();

        shared.update(|table| {
            table.rule(["number"]).set(|_| Value::from("number"))?;
            Ok::<_, crate::PolyError>(())
        })?;

        assert!(before.resolve(&[Value::from(1)]).is_no_match());
        assert_eq!(shared.evaluate(&[Value::from(1)]), Some(Value::from("number")));
        assert_eq!(shared.snapshot().len(), 1);
        Ok(())
    }

    #[test]
    fn test_concurrent_resolution() -> PolyResult<()> {
        let mut table = DispatchTable::new();
        table
            .rule(["number"])
            .set(|args| Value::from(args[0].as_f64().unwrap_or(0.0) * 2.0))?;
        let shared = Arc::new(SharedDispatchTable::new(table));

        let workers: Vec<_> = (0..4)
            .map(|i| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    (0..100)
                        .map(|n| shared.evaluate(&[Value::from(i * 100 + n)]))
                        .filter(Option::is_some)
                        .count()
                })
            })
            .collect();

        shared.update(|table| {
            table.fallback(|| Value::from("fallback"));
        });

        for worker in workers {
            assert_eq!(worker.join().unwrap(), 100);
        }
        assert_eq!(shared.evaluate(&[Value::from("x")]), Some(Value::from("fallback")));
        Ok(())
    }
}
