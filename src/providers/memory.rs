//! In-memory sources and sinks.
//!
//! [`ActivityStore`] serves a fixed batch of transactions and time sheets,
//! which is what the HTTP service and the tests run the engine over.
//! [`MemorySink`] collects computed records.

use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::EngineResult;
use crate::models::{EfficiencyRecord, TimeRange, TimeSheetPunch, Transaction};

use super::{RecordSink, TimeSheetSource, TransactionSource};

/// A batch of transactions and time sheets held in memory.
///
/// Items are returned in the order they were supplied. Out-of-order input is
/// not corrected here; the engine rejects it.
#[derive(Debug, Clone, Default)]
pub struct ActivityStore {
    transactions: Vec<Transaction>,
    time_sheets: Vec<TimeSheetPunch>,
}

impl ActivityStore {
    /// Creates a store over the given batch.
    pub fn new(transactions: Vec<Transaction>, time_sheets: Vec<TimeSheetPunch>) -> Self {
        Self {
            transactions,
            time_sheets,
        }
    }

    /// Returns every stored transaction.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Returns every stored time sheet.
    pub fn time_sheets(&self) -> &[TimeSheetPunch] {
        &self.time_sheets
    }
}

impl TransactionSource for ActivityStore {
    fn find_transactions(
        &self,
        site_code: &str,
        site_employee_codes: &[String],
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> EngineResult<Vec<Transaction>> {
        Ok(self
            .transactions
            .iter()
            .filter(|t| t.site_code.eq_ignore_ascii_case(site_code))
            .filter(|t| {
                site_employee_codes
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(&t.site_employee_code))
            })
            .filter(|t| start <= t.transaction_date && t.transaction_date <= end)
            .cloned()
            .collect())
    }

    fn site_employee_codes(&self, site_code: &str) -> EngineResult<Vec<String>> {
        let mut codes: Vec<String> = Vec::new();
        for transaction in self
            .transactions
            .iter()
            .filter(|t| t.site_code.eq_ignore_ascii_case(site_code))
        {
            if !codes
                .iter()
                .any(|c| c.eq_ignore_ascii_case(&transaction.site_employee_code))
            {
                codes.push(transaction.site_employee_code.clone());
            }
        }
        Ok(codes)
    }
}

impl TimeSheetSource for ActivityStore {
    fn time_sheets(
        &self,
        site_code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> EngineResult<Vec<TimeSheetPunch>> {
        Ok(self
            .time_sheets
            .iter()
            .filter(|s| s.site_code.eq_ignore_ascii_case(site_code))
            .filter(|s| start_date <= s.operational_date && s.operational_date <= end_date)
            .cloned()
            .collect())
    }
}

/// A sink that keeps every stored batch.
#[derive(Debug, Default)]
pub struct MemorySink {
    batches: Mutex<Vec<(String, Vec<EfficiencyRecord>)>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns the stored batches, in the order they arrived.
    pub fn take(&self) -> Vec<(String, Vec<EfficiencyRecord>)> {
        let mut batches = self
            .batches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(&mut *batches)
    }
}

impl RecordSink for MemorySink {
    fn store(
        &self,
        site_code: &str,
        _window: &TimeRange,
        records: &[EfficiencyRecord],
    ) -> EngineResult<()> {
        self.batches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((site_code.to_string(), records.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_datetime(time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("2026-03-02 {}", time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    fn create_store() -> ActivityStore {
        ActivityStore::new(
            vec![
                Transaction::new("DC01", "E100", "PICK", make_datetime("09:00:00")),
                Transaction::new("DC01", "E200", "PICK", make_datetime("09:30:00")),
                Transaction::new("DC01", "e100", "LOAD", make_datetime("10:00:00")),
                Transaction::new("DC02", "E100", "PICK", make_datetime("10:30:00")),
            ],
            vec![],
        )
    }

    #[test]
    fn test_find_transactions_filters_site_codes_and_bounds() {
        let store = create_store();
        let found = store
            .find_transactions(
                "DC01",
                &["E100".to_string()],
                make_datetime("09:00:00"),
                make_datetime("10:00:00"),
            )
            .unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].transaction_date, make_datetime("09:00:00"));
        assert_eq!(found[1].transaction_date, make_datetime("10:00:00"));
    }

    #[test]
    fn test_site_employee_codes_are_distinct() {
        let store = create_store();
        assert_eq!(
            store.site_employee_codes("dc01").unwrap(),
            vec!["E100".to_string(), "E200".to_string()]
        );
    }

    #[test]
    fn test_memory_sink_collects_batches() {
        let sink = MemorySink::new();
        let window = TimeRange::new(make_datetime("00:00:00"), make_datetime("23:59:59")).unwrap();
        sink.store("DC01", &window, &[]).unwrap();

        let batches = sink.take();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].0, "DC01");
        assert!(sink.take().is_empty());
    }
}
