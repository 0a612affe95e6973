pub mod dispatcher;
pub mod loader;
pub mod schema;

pub use dispatcher::{Action, KeybindingDispatcher};
pub use loader::{LoadError, default_config, load_keybindings, user_config_path};
pub use schema::KeybindingConfig;
