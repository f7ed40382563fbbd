use alloc::collections::BTreeMap;

/// Kind of an asynchronous editor operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperationKind {
    /// Loading row data into the editor.
    Bind,
    /// Writing editor values back.
    Save,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationId(pub u64);

#[derive(Clone, Copy, Debug)]
struct Pending {
    kind: OperationKind,
    row: usize,
    started_ms: u64,
    warned: bool,
}

/// Warns about editor operations that take longer than their budget.
///
/// Slow operations are still awaited; the watchdog never cancels or retries them.
#[derive(Clone, Debug)]
pub struct OperationWatchdog {
    budget_ms: u64,
    next_id: u64,
    pending: BTreeMap<OperationId, Pending>,
}

impl OperationWatchdog {
    pub fn new(budget_ms: u64) -> Self {
        Self {
            budget_ms,
            next_id: 0,
            pending: BTreeMap::new(),
        }
    }

    pub fn budget_ms(&self) -> u64 {
        self.budget_ms
    }

    pub fn begin(&mut self, kind: OperationKind, row: usize, now_ms: u64) -> OperationId {
        let id = OperationId(self.next_id);
        self.next_id += 1;
        self.pending.insert(
            id,
            Pending {
                kind,
                row,
                started_ms: now_ms,
                warned: false,
            },
        );
        id
    }

    /// Marks an operation done. Returns `false` for unknown or already completed ids.
    pub fn complete(&mut self, id: OperationId) -> bool {
        self.pending.remove(&id).is_some()
    }

    /// Logs a warning for every operation past its budget. Each operation warns once; returns
    /// how many new warnings were raised.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn check(&mut self, now_ms: u64) -> usize {
        let budget = self.budget_ms;
        let mut raised = 0;
        for (id, op) in self.pending.iter_mut() {
            let elapsed = now_ms.saturating_sub(op.started_ms);
            if !op.warned && elapsed > budget {
                op.warned = true;
                raised += 1;
                vwarn!(
                    id = id.0,
                    kind = ?op.kind,
                    row = op.row,
                    elapsed_ms = elapsed,
                    "editor operation is taking longer than expected"
                );
            }
        }
        raised
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Pending operations with their kind and row, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = (OperationId, OperationKind, usize)> + '_ {
        self.pending.iter().map(|(id, op)| (*id, op.kind, op.row))
    }

    pub fn is_pending(&self, id: OperationId) -> bool {
        self.pending.contains_key(&id)
    }
}
