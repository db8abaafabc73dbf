//! Inline HTML rendering for the three user-facing views.
//!
//! Each view takes a well-defined view model; nothing here touches session
//! or protocol state.

/// View model for the home page.
pub struct HomeView {
    pub consent_uri: String,
}

/// View model for the consent page, combining the provider-resolved
/// application name with the request being authorized.
pub struct ConsentView {
    pub application_name: String,
    pub client_id: String,
    pub response_type: String,
    pub scopes: String,
    pub requested_scopes: Vec<String>,
}

/// View model for the login form.
pub struct LoginView {
    pub failed: bool,
}

pub fn render_home(view: &HomeView) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>OAuth2 Consent Application</title></head>
<body>
    <h1>OAuth2 Consent Application</h1>
    <p>To begin the authorization code grant flow the client application
    redirects the user to the consent endpoint. For demonstration purposes
    the URI is constructed here:</p>
    <p><a href="{uri}">{uri}</a></p>
</body>
</html>"#,
        uri = view.consent_uri
    )
}

pub fn render_consent(view: &ConsentView) -> String {
    let scope_items: String = view
        .requested_scopes
        .iter()
        .map(|scope| format!("        <li>{}</li>\n", scope))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Authorize {name}</title></head>
<body>
    <h1>Authorize {name}</h1>
    <p><strong>{name}</strong> is requesting access to the following scopes:</p>
    <ul>
{scopes}    </ul>
    <form action="/consent" method="post">
        <input type="hidden" name="client_id" value="{client_id}">
        <input type="hidden" name="response_type" value="{response_type}">
        <input type="hidden" name="scopes" value="{raw_scopes}">
        <button type="submit">Authorize</button>
    </form>
</body>
</html>"#,
        name = view.application_name,
        scopes = scope_items,
        client_id = view.client_id,
        response_type = view.response_type,
        raw_scopes = view.scopes,
    )
}

pub fn render_login(view: &LoginView) -> String {
    let notice = if view.failed {
        "    <p>Login failed. Please try again.</p>\n"
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Login</title></head>
<body>
    <h1>Login</h1>
{notice}    <form action="/login" method="post">
        <label>Username <input type="text" name="username"></label>
        <label>Password <input type="password" name="password"></label>
        <button type="submit">Login</button>
    </form>
</body>
</html>"#,
        notice = notice
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consent_view_lists_every_requested_scope() {
        let view = ConsentView {
            application_name: "Demo App".to_string(),
            client_id: "abc".to_string(),
            response_type: "code".to_string(),
            scopes: "email,phone,address".to_string(),
            requested_scopes: vec![
                "email".to_string(),
                "phone".to_string(),
                "address".to_string(),
            ],
        };

        let html = render_consent(&view);
        assert!(html.contains("Demo App"));
        for scope in &view.requested_scopes {
            assert!(html.contains(&format!("<li>{}</li>", scope)));
        }
        assert!(html.contains(r#"value="email,phone,address""#));
    }

    #[test]
    fn login_view_only_shows_the_notice_after_a_failure() {
        assert!(!render_login(&LoginView { failed: false }).contains("Login failed"));
        assert!(render_login(&LoginView { failed: true }).contains("Login failed"));
    }

    #[test]
    fn home_view_links_the_demo_consent_uri() {
        let view = HomeView {
            consent_uri: "/consent?client_id=abc".to_string(),
        };
        assert!(render_home(&view).contains(r#"href="/consent?client_id=abc""#));
    }
}
