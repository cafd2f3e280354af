// Shared constants used by both backup tools

/// Object store defaults
pub const DEFAULT_PATH_PREFIX: &str = "mysql-backup";
pub const DEFAULT_REGION: &str = "auto";
pub const PREFIX_SEPARATOR: char = '/';

/// Backup artifacts
pub const BACKUP_SUFFIX: &str = ".stream";
pub const FALLBACK_BACKUP_NAME: &str = "backup.stream";

/// Placeholder for unknown sizes and timestamps
pub const UNKNOWN_PLACEHOLDER: &str = "—";

/// Number of entries shown at once in selection lists
pub const SELECTION_PAGE_SIZE: usize = 15;

/// Connection defaults
pub const DEFAULT_MYSQL_PORT: &str = "3306";
pub const DEFAULT_MYSQL_USER: &str = "root";

/// Isolated restore execution
pub const DEFAULT_CONTAINER_RUNTIME: &str = "docker";
pub const DEFAULT_RESTORE_IMAGE: &str = "mydumper/mydumper:latest";
pub const CONTAINER_DUMP_DIR: &str = "/dump";
pub const RESTORE_TOOL: &str = "myloader";

/// Logging
pub const LOG_DIR: &str = "./logs";
