mod load;
mod types;

pub use load::{get_dossier_data_dir, load_default, load_env_files, load_from_path};
pub use types::*;
