pub mod device;
pub mod scanner;

pub use device::{
    parse_df_output, probe_filesystem, FilesystemInfo, FsStyle, DEFAULT_PROBE_TIMEOUT,
    WINDOWS_FS_KINDS,
};
pub use scanner::{scan_empty_directories, EmptyDirectoryReport, MAX_EMPTY_DIRS};
