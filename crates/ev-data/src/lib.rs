mod decode;
mod lint;
mod loader;
mod params;

pub use decode::{decode_command, decode_table, decode_table_json};
pub use lint::{lint_table, LintDiagnostic, LintKind};
pub use loader::{load_database_from_json_map, map_id_from_file_name};
