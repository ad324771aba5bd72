/// Process-wide counters for schema migration activity.
pub mod migration_counters {
    use std::sync::atomic::{AtomicUsize, Ordering};

    static SCHEMA_CHECKS_TOTAL: AtomicUsize = AtomicUsize::new(0);
    static TABLES_CREATED_TOTAL: AtomicUsize = AtomicUsize::new(0);
    static COLUMNS_ADDED_TOTAL: AtomicUsize = AtomicUsize::new(0);
    static MIGRATOR_RAN_TOTAL: AtomicUsize = AtomicUsize::new(0);
    static MIGRATION_FAILED_TOTAL: AtomicUsize = AtomicUsize::new(0);

    pub fn schema_check() {
        SCHEMA_CHECKS_TOTAL.fetch_add(1, Ordering::Relaxed);
    }

    pub fn table_created() {
        TABLES_CREATED_TOTAL.fetch_add(1, Ordering::Relaxed);
    }

    pub fn column_added() {
        COLUMNS_ADDED_TOTAL.fetch_add(1, Ordering::Relaxed);
    }

    pub fn migrator_ran() {
        MIGRATOR_RAN_TOTAL.fetch_add(1, Ordering::Relaxed);
    }

    pub fn migration_failed() {
        MIGRATION_FAILED_TOTAL.fetch_add(1, Ordering::Relaxed);
    }

    #[derive(Debug, Clone, Copy)]
    pub struct Snapshot {
        pub schema_checks_total: usize,
        pub tables_created_total: usize,
        pub columns_added_total: usize,
        pub migrator_ran_total: usize,
        pub migration_failed_total: usize,
    }

    pub fn snapshot() -> Snapshot {
        Snapshot {
            schema_checks_total: SCHEMA_CHECKS_TOTAL.load(Ordering::Relaxed),
            tables_created_total: TABLES_CREATED_TOTAL.load(Ordering::Relaxed),
            columns_added_total: COLUMNS_ADDED_TOTAL.load(Ordering::Relaxed),
            migrator_ran_total: MIGRATOR_RAN_TOTAL.load(Ordering::Relaxed),
            migration_failed_total: MIGRATION_FAILED_TOTAL.load(Ordering::Relaxed),
        }
    }

    pub fn log_snapshot(context: &str) {
        let s = snapshot();
        tracing::info!(
            context = context,
            schema_checks_total = s.schema_checks_total,
            tables_created_total = s.tables_created_total,
            columns_added_total = s.columns_added_total,
            migrator_ran_total = s.migrator_ran_total,
            migration_failed_total = s.migration_failed_total,
            "orm_migration_counters_snapshot"
        );
    }
}
