mod create_notification;
mod delete_notification;
mod get_notifications;
mod update_notification;

use actix_web::web;
use create_notification::create_notification_controller;
use delete_notification::delete_notification_controller;
use get_notifications::get_notifications_controller;
use update_notification::update_notification_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/reminders", web::post().to(create_notification_controller));
    cfg.route("/reminders", web::get().to(get_notifications_controller));
    cfg.route(
        "/reminders/{notification_id}",
        web::patch().to(update_notification_controller),
    );
    cfg.route(
        "/reminders/{notification_id}",
        web::delete().to(delete_notification_controller),
    );
}
