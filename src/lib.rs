mod error;
pub mod keys;
pub mod logging;
mod output;
pub mod process;
pub mod prompt;
mod settings;
mod shell;
pub mod sshconfig;
mod wizard;

pub use error::{Error, Result};
pub use output::{help_table, host_table, settings_table};
pub use process::{CommandOutput, SystemToolchain, Toolchain};
pub use prompt::{Input, LineSource, Repl};
pub use settings::{SettingKey, Settings, SettingsStore, CRATE_NAME};
pub use shell::{Command, Shell, State};
pub use sshconfig::HostRecord;
pub use wizard::Wizard;
