use gatherly_migrate::migrations::user_contacts;
use std::path::Path;

fn migrations_dir() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/migrations"))
}

#[test]
fn test_shipped_file_loads() {
    let migration = user_contacts::load(migrations_dir()).unwrap();

    assert_eq!(migration.name, "user_contacts");
    assert_eq!(migration.table, "user_contacts");
    assert!(migration.path.ends_with("20241225_user_contacts.sql"));
}

#[test]
fn test_shipped_file_creates_user_contacts() {
    let migration = user_contacts::load(migrations_dir()).unwrap();

    assert!(migration
        .sql
        .contains("CREATE TABLE IF NOT EXISTS user_contacts"));
}

#[test]
fn test_missing_dir_reports_path() {
    let err = user_contacts::load(Path::new("/nonexistent/gatherly/migrations")).unwrap_err();

    assert!(err
        .to_string()
        .contains("/nonexistent/gatherly/migrations/20241225_user_contacts.sql"));
}
