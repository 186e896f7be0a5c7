mod animation_cmds;
mod collection_cmds;
mod import_cmds;

pub use animation_cmds::cmd_animation;
pub use collection_cmds::{cmd_clear, cmd_list, cmd_stats};
pub use import_cmds::cmd_import;
