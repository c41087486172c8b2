//! Creates `user_contacts` from its SQL file.

use std::path::{Path, PathBuf};

use super::SqlMigration;
use crate::error::Result;

pub const NAME: &str = "user_contacts";
pub const TABLE: &str = "user_contacts";
pub const FILE_NAME: &str = "20241225_user_contacts.sql";

pub fn path(migrations_dir: &Path) -> PathBuf {
    migrations_dir.join(FILE_NAME)
}

pub fn load(migrations_dir: &Path) -> Result<SqlMigration> {
    SqlMigration::load(path(migrations_dir), NAME, TABLE)
}
