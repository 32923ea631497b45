use crate::auth::{validator, TokenIssuer};
use crate::db::CredentialStore;
use crate::error::AuthError;
use crate::models::{
    AuthResponse, Claims, DashboardResponse, DashboardUser, LoginRequest, SignupRequest,
    UserSummary,
};
use actix_web::web::{Either, Form, Json};
use actix_web::{get, post, web, Error, HttpResponse};
use actix_web_httpauth::middleware::HttpAuthentication;
use serde::de::DeserializeOwned;

/// Accepts both JSON and URL-encoded bodies. Extraction errors are handed to
/// the handler instead of short-circuiting with actix's plain-text 400.
type Payload<T> = Result<Either<Json<T>, Form<T>>, Error>;

/// An unreadable body counts as an empty one, so it fails field validation.
fn body<T: DeserializeOwned + Default>(payload: Payload<T>) -> T {
    match payload {
        Ok(Either::Left(json)) => json.into_inner(),
        Ok(Either::Right(form)) => form.into_inner(),
        Err(e) => {
            tracing::debug!(error = %e, "unreadable request body");
            T::default()
        }
    }
}

#[post("/signup")]
pub async fn signup(
    store: web::Data<CredentialStore>,
    issuer: web::Data<TokenIssuer>,
    payload: Payload<SignupRequest>,
) -> Result<HttpResponse, AuthError> {
    let SignupRequest {
        name,
        email,
        password,
    } = body(payload);

    let (Some(name), Some(email), Some(password)) = (name, email, password) else {
        return Err(AuthError::validation(
            "name, email and password are required",
        ));
    };

    let user = web::block(move || store.register(&name, &email, &password)).await??;
    let token = issuer.issue(&user)?;
    tracing::info!(user_id = user.id, "signup successful");

    Ok(HttpResponse::Created().json(AuthResponse {
        success: true,
        message: "Signup successful",
        token,
        data: UserSummary::from(&user),
    }))
}

#[post("/login")]
pub async fn login(
    store: web::Data<CredentialStore>,
    issuer: web::Data<TokenIssuer>,
    payload: Payload<LoginRequest>,
) -> Result<HttpResponse, AuthError> {
    let LoginRequest { email, password } = body(payload);

    let (Some(email), Some(password)) = (email, password) else {
        return Err(AuthError::validation("Email and password are required"));
    };

    let user = match web::block(move || store.authenticate(&email, &password)).await? {
        Ok(user) => user,
        Err(e) => {
            tracing::debug!(error = %e, "login rejected");
            return Err(e);
        }
    };
    let token = issuer.issue(&user)?;
    tracing::info!(user_id = user.id, "login successful");

    Ok(HttpResponse::Ok().json(AuthResponse {
        success: true,
        message: "Login successful",
        token,
        data: UserSummary::from(&user),
    }))
}

/// Reads identity from the token alone; no database round-trip.
#[get("/dashboard", wrap = "HttpAuthentication::with_fn(validator)")]
pub async fn dashboard(claims: web::ReqData<Claims>) -> HttpResponse {
    let claims = claims.into_inner();

    HttpResponse::Ok().json(DashboardResponse {
        success: true,
        message: "Welcome to admin dashboard",
        user: DashboardUser {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
            role: claims.role,
        },
    })
}
