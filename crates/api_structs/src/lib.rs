mod device_token;
mod notification;
mod status;

pub mod dtos {
    pub use crate::notification::dtos::*;
}

pub use crate::device_token::api::*;
pub use crate::notification::api::*;
pub use crate::status::api::*;
