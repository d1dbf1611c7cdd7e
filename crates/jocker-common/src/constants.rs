//! System-wide constants and default paths.

/// Directory, under the users root, that holds one overlay work directory per user.
pub const WORKDIRS_DIR: &str = ".workdirs";

/// Mode of freshly created overlay work directories (owner execute only).
pub const WORKDIR_MODE: u32 = 0o100;

/// Host device directory bind-mounted at `<upperdir>/dev`.
pub const HOST_DEV_DIR: &str = "/dev";

/// Host proc filesystem bind-mounted at `<upperdir>/proc`.
pub const HOST_PROC_DIR: &str = "/proc";

/// Lower layer shared by every user overlay.
pub const OVERLAY_LOWER_DIR: &str = "/";

/// Executable bits (owner, group, other) of a file mode.
pub const EXECUTE_BITS: u32 = 0o111;

/// File name of the privilege-dropping helper binary.
pub const HELPER_BIN_NAME: &str = "chroot-spawn";

/// CLI exit code when the command gate rejects the entry point.
pub const REJECTED_EXIT_CODE: i32 = 126;

/// Default configuration file consulted by the CLI.
pub const DEFAULT_CONFIG_FILE: &str = "/etc/jocker/config.json";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "jocker";
