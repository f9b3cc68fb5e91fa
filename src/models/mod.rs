pub mod attendance;
pub mod page;
pub mod progress;
pub mod project;
pub mod safety_record;
pub mod schedule;
pub mod weather;
pub mod worker;

#[cfg(test)]
pub(crate) fn test_db() -> (tempfile::TempDir, crate::database::Database) {
    let dir = tempfile::tempdir().expect("temp dir");
    let db = crate::database::Database::open(dir.path());
    (dir, db)
}
