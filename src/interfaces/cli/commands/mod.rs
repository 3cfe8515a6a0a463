//! One-shot CLI commands

mod config_gen;
mod link_management;
mod token;

pub use config_gen::config_generate;
pub use link_management::{
    create_link, delete_link, go_link, link_info, print_record, reclaim_expired, set_limit,
};
pub use token::{save_token, save_token_in};
