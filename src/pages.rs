use actix_web::{get, http::header, HttpResponse};

const SIGNUP_HTML: &str = include_str!("../templates/auth/signup.html");
const LOGIN_HTML: &str = include_str!("../templates/auth/login.html");
const DASHBOARD_HTML: &str = include_str!("../templates/admin/dashboard.html");

fn html(body: &'static str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

fn redirect_to_login() -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, "/login"))
        .finish()
}

#[get("/")]
pub async fn root() -> HttpResponse {
    redirect_to_login()
}

#[get("/signup")]
pub async fn signup_page() -> HttpResponse {
    html(SIGNUP_HTML)
}

#[get("/login")]
pub async fn login_page() -> HttpResponse {
    html(LOGIN_HTML)
}

/// The page itself is public; its script calls `/dashboard` with the stored token.
#[get("/dashboard-page")]
pub async fn dashboard_page() -> HttpResponse {
    html(DASHBOARD_HTML)
}

/// Tokens are stateless, so there is nothing to clear server-side.
#[get("/logout")]
pub async fn logout() -> HttpResponse {
    redirect_to_login()
}
