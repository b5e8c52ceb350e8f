pub mod json;
pub mod outfit_handlers;
pub mod settings_handlers;
pub mod share_handlers;
pub mod upload_handlers;

pub use outfit_handlers::{
    create_outfit, delete_outfit, get_outfit, list_outfits, my_items, my_outfits, save_outfit,
    share_outfit, update_outfit,
};
pub use settings_handlers::{check_password_handler, set_password_handler};
pub use share_handlers::{get_shared_outfit, shared_outfit_page};
pub use upload_handlers::{upload_handler, UPLOAD_BODY_LIMIT};
