//! Pluggable metric collectors.
//!
//! A collector declares the metrics it produces, saves an opaque record
//! when an operation starts and turns that record into one value per
//! declared metric when the operation ends.

use std::marker::PhantomData;

/// Produces metric values for every traced invocation.
///
/// `A` is the argument bundle carried by start/end events.
pub trait MetricCollector<A: ?Sized> {
    /// Whatever the collector needs to remember between start and end
    type Record;

    /// Human-readable collector name, used in diagnostics
    fn name(&self) -> &str;

    /// Names of the metrics this collector produces, in output order
    fn metrics(&self) -> Vec<String>;

    fn save_on_start(&mut self, args: &A) -> Self::Record;

    /// Must return exactly one value per name in [`MetricCollector::metrics`]
    fn finish_on_end(&mut self, record: Self::Record, args: &A) -> Vec<f64>;
}

/// Object-safe view of a collector together with its record stack
pub(crate) trait CollectorStack<A: ?Sized> {
    fn name(&self) -> &str;

    fn metrics(&self) -> Vec<String>;

    fn push_start(&mut self, args: &A);

    /// `None` when no record is open
    fn pop_end(&mut self, args: &A) -> Option<Vec<f64>>;

    fn open_records(&self) -> usize;
}

/// A collector and the records it saved for operations still in flight
pub(crate) struct StackedCollector<A: ?Sized, C: MetricCollector<A>> {
    collector: C,
    records: Vec<C::Record>,
    _args: PhantomData<fn(&A)>,
}

impl<A: ?Sized, C: MetricCollector<A>> StackedCollector<A, C> {
    pub(crate) fn new(collector: C) -> Self {
        Self {
            collector,
            records: Vec::new(),
            _args: PhantomData,
        }
    }
}

impl<A: ?Sized, C: MetricCollector<A>> CollectorStack<A> for StackedCollector<A, C> {
    fn name(&self) -> &str {
        self.collector.name()
    }

    fn metrics(&self) -> Vec<String> {
        self.collector.metrics()
    }

    fn push_start(&mut self, args: &A) {
        let record = self.collector.save_on_start(args);
        self.records.push(record);
    }

    fn pop_end(&mut self, args: &A) -> Option<Vec<f64>> {
        let record = self.records.pop()?;
        Some(self.collector.finish_on_end(record, args))
    }

    fn open_records(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts how many calls were made below each invocation
    struct NestedCalls {
        started: u64,
    }

    impl MetricCollector<()> for NestedCalls {
        type Record = u64;

        fn name(&self) -> &str {
            "Nested Calls"
        }

        fn metrics(&self) -> Vec<String> {
            vec!["NestedCalls".to_string()]
        }

        fn save_on_start(&mut self, _args: &()) -> u64 {
            let record = self.started;
            self.started += 1;
            record
        }

        fn finish_on_end(&mut self, record: u64, _args: &()) -> Vec<f64> {
            vec![(self.started - record - 1) as f64]
        }
    }

    #[test]
    fn test_records_pop_in_reverse_order() {
        let mut stack = StackedCollector::new(NestedCalls { started: 0 });

        stack.push_start(&());
        stack.push_start(&());
        assert_eq!(stack.open_records(), 2);

        assert_eq!(stack.pop_end(&()), Some(vec![0.0]));
        assert_eq!(stack.pop_end(&()), Some(vec![1.0]));
        assert_eq!(stack.pop_end(&()), None);
    }
}
