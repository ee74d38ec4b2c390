mod archive;
mod echo;
mod exec;
mod file;
mod package;
mod supervisor;

pub use archive::{cmd_archive, cmd_download, cmd_extract, cmd_gunzip, cmd_gzip};
pub use echo::{LevelArg, cmd_echo};
pub use exec::{cmd_exec, cmd_run};
pub use file::{
  cmd_chmod, cmd_chown, cmd_cp, cmd_find, cmd_grep, cmd_mkdir, cmd_mv, cmd_read, cmd_replace, cmd_rm, cmd_tail,
  cmd_write,
};
pub use package::{cmd_detect, cmd_install, cmd_purge};
pub use supervisor::{SupervisorAction, cmd_supervisor};
