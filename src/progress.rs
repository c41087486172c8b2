use crate::database::models::ColumnInfo;

/// Milestones a migration run reports to its operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Connected,
    ColumnAdded { column: String },
    RowsBackfilled { table: String, rows: u64 },
    ColumnVerified { table: String, column: ColumnInfo },
    BatchStarted { name: String },
    BatchCompleted { name: String },
    TableColumns { columns: Vec<ColumnInfo> },
    Completed,
}

impl ProgressEvent {
    /// Human readable console form.
    pub fn render(&self) -> String {
        match self {
            ProgressEvent::Connected => "✓ Connected to database".to_string(),
            ProgressEvent::ColumnAdded { column } => format!("✓ Added {} column", column),
            ProgressEvent::RowsBackfilled { table, rows } => {
                format!("✓ Updated {} existing {}", rows, table)
            }
            ProgressEvent::ColumnVerified { table, column } => {
                let default = column
                    .column_default
                    .as_deref()
                    .map(|d| format!("default {}", d))
                    .unwrap_or_else(|| "no default".to_string());
                format!(
                    "✓ {}.{}: {} ({})",
                    table, column.column_name, column.data_type, default
                )
            }
            ProgressEvent::BatchStarted { name } => format!("Running {} migration...", name),
            ProgressEvent::BatchCompleted { name } => {
                format!("✅ {} migration completed successfully!", name)
            }
            ProgressEvent::TableColumns { columns } => {
                let mut out = String::from("\n📋 Created table columns:");
                for column in columns {
                    out.push_str(&format!("\n  - {}: {}", column.column_name, column.data_type));
                }
                out
            }
            ProgressEvent::Completed => "\n✅ Migration completed successfully!".to_string(),
        }
    }
}

pub trait Progress: Send {
    fn report(&mut self, event: ProgressEvent);
}

/// Prints every event to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn report(&mut self, event: ProgressEvent) {
        println!("{}", event.render());
    }
}
