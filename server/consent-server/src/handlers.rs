use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::{web, HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use consent_types::{Authenticator, ConsentRequest, Credentials};

use crate::config::ConsentConfig;
use crate::gateway::GatewayClient;
use crate::session::{SessionHandle, SessionStore};
use crate::views::{self, ConsentView, HomeView, LoginView};

/// Shared state for the consent flow handlers, constructed once at startup.
#[derive(Clone)]
pub struct ConsentFlowState {
    pub config: Arc<ConsentConfig>,
    pub sessions: Arc<SessionStore>,
    pub gateway: Arc<GatewayClient>,
    pub authenticator: Arc<dyn Authenticator>,
}

impl ConsentFlowState {
    /// Resolve the request's session from its cookie, creating a fresh
    /// anonymous session when the cookie is absent, unknown or expired.
    async fn session(&self, req: &HttpRequest) -> Arc<SessionHandle> {
        let token = req
            .cookie(&self.config.cookie_name)
            .map(|cookie| cookie.value().to_string());
        self.sessions.start(token.as_deref()).await
    }

    fn session_cookie(&self, session: &SessionHandle) -> Cookie<'static> {
        Cookie::build(self.config.cookie_name.clone(), session.token().to_string())
            .path("/")
            .http_only(true)
            .finish()
    }
}

/// Register the consent flow routes.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(get_index))
        .route("/consent", web::get().to(get_consent))
        .route("/consent", web::post().to(post_consent))
        .route("/login", web::get().to(get_login))
        .route("/login", web::post().to(post_login))
        .route("/logout", web::get().to(get_logout))
        .route("/health", web::get().to(health_check));
}

/// Home page carrying a demonstration consent entry-point URI.
/// GET /
pub async fn get_index(state: web::Data<ConsentFlowState>) -> ActixResult<HttpResponse> {
    let consent_uri = format!(
        "/consent?client_id={}&response_type=code&scopes=email%2Cphone%2Caddress",
        state.config.demo_client_id
    );
    Ok(HttpResponse::Ok()
        .content_type("text/html")
        .body(views::render_home(&HomeView { consent_uri })))
}

/// Entry point of the consent flow.
/// GET /consent
///
/// An unauthenticated user has the request parameters stashed in the
/// session and is redirected to login; the parameters survive the round
/// trip and the flow resumes here. An authenticated user is shown the
/// consent view for the client application named by the provider.
pub async fn get_consent(
    req: HttpRequest,
    query: web::Query<ConsentRequest>,
    state: web::Data<ConsentFlowState>,
) -> ActixResult<HttpResponse> {
    let consent = query.into_inner();
    if let Err(e) = consent.validate() {
        return Ok(HttpResponse::BadRequest().body(e.to_string()));
    }

    let session = state.session(&req).await;
    let cookie = state.session_cookie(&session);

    {
        let mut data = session.lock().await;
        if !data.authenticated {
            data.pending = Some(consent);
            return Ok(HttpResponse::TemporaryRedirect()
                .append_header(("Location", "/login"))
                .cookie(cookie)
                .finish());
        }
    }

    match state
        .gateway
        .resolve_application_name(&consent.client_id)
        .await
    {
        Ok(application_name) => {
            let view = ConsentView {
                application_name,
                requested_scopes: consent.scope_list(),
                client_id: consent.client_id,
                response_type: consent.response_type,
                scopes: consent.scopes,
            };
            Ok(HttpResponse::Ok()
                .content_type("text/html")
                .cookie(cookie)
                .body(views::render_consent(&view)))
        }
        Err(e) => {
            warn!(
                "Application name lookup failed for client_id '{}': {}",
                consent.client_id, e
            );
            Ok(HttpResponse::InternalServerError()
                .cookie(cookie)
                .body(e.to_string()))
        }
    }
}

/// The user authorized the client application.
/// POST /consent
///
/// The provider answers the authorize call with either a granted code or a
/// protocol-level denial, both encoded inside the returned redirect URI.
/// The URI is relayed to the caller unchanged in both cases; the provider,
/// not this application, is the authority on the consent parameters.
pub async fn post_consent(
    req: HttpRequest,
    form: web::Form<ConsentRequest>,
    state: web::Data<ConsentFlowState>,
) -> ActixResult<HttpResponse> {
    let consent = form.into_inner();
    if let Err(e) = consent.validate() {
        return Ok(HttpResponse::BadRequest().body(e.to_string()));
    }

    let session = state.session(&req).await;
    let cookie = state.session_cookie(&session);

    let authenticated_userid = {
        let mut data = session.lock().await;
        match data.authenticated_userid.clone() {
            Some(userid) if data.authenticated => userid,
            _ => {
                // An unauthenticated grant restarts the flow at login.
                data.pending = Some(consent);
                return Ok(HttpResponse::TemporaryRedirect()
                    .append_header(("Location", "/login"))
                    .cookie(cookie)
                    .finish());
            }
        }
    };

    match state
        .gateway
        .issue_authorization_code(&consent, &authenticated_userid)
        .await
    {
        Ok(redirect_uri) => {
            info!(
                "Authorization redirect issued for client_id '{}'",
                consent.client_id
            );
            Ok(HttpResponse::Ok()
                .cookie(cookie)
                .body(format!("redirect_uri: {}", redirect_uri)))
        }
        Err(e) => {
            warn!(
                "Authorize call failed for client_id '{}': {}",
                consent.client_id, e
            );
            Ok(HttpResponse::InternalServerError()
                .cookie(cookie)
                .body(e.to_string()))
        }
    }
}

/// Present the login form. Stateless.
/// GET /login
pub async fn get_login() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok()
        .content_type("text/html")
        .body(views::render_login(&LoginView { failed: false })))
}

/// Authenticate the user.
/// POST /login
///
/// On success the session is marked authenticated and the user is sent
/// back to the consent entry point rebuilt from the stashed session
/// parameters, not from anything client-supplied. On failure the form is
/// presented again and the session is left untouched.
pub async fn post_login(
    req: HttpRequest,
    form: web::Form<Credentials>,
    state: web::Data<ConsentFlowState>,
) -> ActixResult<HttpResponse> {
    let credentials = form.into_inner();

    let authenticated_userid = match state.authenticator.verify(&credentials).await {
        Some(userid) => userid,
        None => {
            info!("Login failed for username '{}'", credentials.username);
            return Ok(HttpResponse::Ok()
                .content_type("text/html")
                .body(views::render_login(&LoginView { failed: true })));
        }
    };

    let session = state.session(&req).await;
    let cookie = state.session_cookie(&session);

    let consent_uri = {
        let mut data = session.lock().await;
        data.login(authenticated_userid);
        // Consume the consent request stashed before the login round trip.
        data.take_pending().unwrap_or_default().consent_uri()
    };

    Ok(HttpResponse::SeeOther()
        .append_header(("Location", consent_uri))
        .cookie(cookie)
        .finish())
}

/// Clear the session and return to the home page.
/// GET /logout
pub async fn get_logout(
    req: HttpRequest,
    state: web::Data<ConsentFlowState>,
) -> ActixResult<HttpResponse> {
    let session = state.session(&req).await;
    let cookie = state.session_cookie(&session);
    session.lock().await.clear();

    Ok(HttpResponse::TemporaryRedirect()
        .append_header(("Location", "/"))
        .cookie(cookie)
        .finish())
}

/// Health check for the consent server.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().body("Consent server OK")
}
