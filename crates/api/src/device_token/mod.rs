mod register_device_token;

use actix_web::web;
use register_device_token::register_device_token_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/register-token",
        web::post().to(register_device_token_controller),
    );
}
