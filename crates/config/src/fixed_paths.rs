//! Centralized, non-configurable paths inside the build containers
//!
//! These paths are deliberately not exposed via TOML configuration: bundled
//! pipelines and the packaging manifest are written against them.

/// Where build steps place the package contents (`${{targets.contextdir}}`)
pub const OUTPUT_DIR: &str = "/pkg";

/// Mount point of the caller-supplied source tree
pub const SOURCE_DIR: &str = "/src";

/// Read-only mount of the build output during packaging
pub const INPUT_DIR: &str = "/input";

/// abuild working directory holding the APKBUILD
pub const WORK_DIR: &str = "/work";

/// Directory whose contents become the final result
pub const RESULT_DIR: &str = "/out";

/// apk repository list appended to by the environment stage
pub const APK_REPOSITORIES: &str = "/etc/apk/repositories";

/// Trusted apk public keys
pub const APK_KEYS_DIR: &str = "/etc/apk/keys";
