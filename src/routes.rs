use crate::pages;
use crate::user_handlers::{dashboard, login, signup};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(pages::root)
        .service(pages::signup_page)
        .service(signup)
        .service(pages::login_page)
        .service(login)
        .service(dashboard)
        .service(pages::dashboard_page)
        .service(pages::logout);
}
