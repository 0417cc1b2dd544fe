//! One module per subcommand.

pub mod add;
pub mod completions;
pub mod decrypt;
pub mod encrypt;
pub mod find;
pub mod info;
pub mod list;
pub mod set;
pub mod show;
pub mod version;
