use url::form_urlencoded;

use super::{document, escape, layout, Chrome, APP_NAME};
use crate::auth::ServerUser;
use crate::display::EMPTY_MARKER;

pub const AUTH_FAILED_TEXT: &str = "Authentication failed. Please try again.";
pub const PASSWORD_UPDATED_TEXT: &str = "Password updated successfully! Please sign in with your new password.";
pub const INVALID_TOKEN_TEXT: &str = "This password reset link is invalid or has expired.";
pub const USER_NOT_FOUND_TEXT: &str = "User not found";

/// Link into the hosted auth service that returns through `/auth/callback`
fn service_link(service_url: &str, action: &str, next: &str) -> String {
    let callback: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("redirect_to", &format!("/auth/callback?{}", callback))
        .finish();
    format!("{}/{}?{}", service_url.trim_end_matches('/'), action, query)
}

pub fn login_page(service_url: &str, redirect: &str, error: Option<&str>, password_updated: bool) -> String {
    let mut body = format!("<main class=\"card\"><h1>Sign in to {}</h1>", APP_NAME);
    if password_updated {
        body.push_str(&format!("<p class=\"success\">{}</p>", PASSWORD_UPDATED_TEXT));
    }
    if error == Some("auth_failed") {
        body.push_str(&format!("<p class=\"error\">{}</p>", AUTH_FAILED_TEXT));
    }
    body.push_str(&format!(
        "<p><a href=\"{}\">Continue to sign in</a></p><p class=\"muted\"><a href=\"{}\">Forgot your password?</a></p></main>",
        escape(&service_link(service_url, "login", redirect)),
        escape(&service_link(service_url, "recover", "/auth/reset-password")),
    ));
    document("Sign in", &body)
}

pub fn reset_password_page(service_url: &str, error: Option<&str>) -> String {
    let mut body = String::from("<main class=\"card\"><h1>Reset password</h1>");
    if error == Some("invalid_token") {
        body.push_str(&format!("<p class=\"error\">{}</p>", INVALID_TOKEN_TEXT));
    }
    body.push_str(&format!(
        "<p><a href=\"{}\">Choose a new password</a></p><p class=\"muted\"><a href=\"/login\">Back to sign in</a></p></main>",
        escape(&service_link(service_url, "update-password", "/login?passwordUpdated=true")),
    ));
    document("Reset password", &body)
}

pub fn profile_page(chrome: Chrome<'_>) -> String {
    let mut content = String::from("<section class=\"card\"><h1>Profile</h1>");
    match chrome.user {
        None => content.push_str(&format!("<p class=\"muted\">{}</p>", USER_NOT_FOUND_TEXT)),
        Some(user) => content.push_str(&profile_fields(user)),
    }
    content.push_str("</section>");
    layout("Profile", chrome, &content)
}

fn profile_fields(user: &ServerUser) -> String {
    let mut html = profile_row("Email", user.email.as_deref().unwrap_or(EMPTY_MARKER));
    if let Some(first) = user.first_name.as_deref() {
        html.push_str(&profile_row("First Name", first));
    }
    if let Some(last) = user.last_name.as_deref() {
        html.push_str(&profile_row("Last Name", last));
    }
    html
}

fn profile_row(label: &str, value: &str) -> String {
    format!("<div class=\"field\"><label>{}</label><div>{}</div></div>", label, escape(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DefinitionCatalog;

    #[test]
    fn login_page_shows_flags_and_hands_off() {
        let html = login_page("https://auth.test/", "/entities/products", Some("auth_failed"), true);

        assert!(html.contains(AUTH_FAILED_TEXT));
        assert!(html.contains(PASSWORD_UPDATED_TEXT));
        assert!(html.contains(
            "https://auth.test/login?redirect_to=%2Fauth%2Fcallback%3Fnext%3D%252Fentities%252Fproducts"
        ));

        let plain = login_page("https://auth.test", "/", Some("other"), false);
        assert!(!plain.contains("class=\"error\""));
    }

    #[test]
    fn profile_lists_present_names_only() {
        let catalog = DefinitionCatalog::default();
        let user = ServerUser {
            id: "u1".into(),
            first_name: Some("Ada".into()),
            ..Default::default()
        };

        let html = profile_page(Chrome {
            catalog: &catalog,
            user: Some(&user),
            active_slug: None,
        });
        assert!(html.contains("<label>Email</label><div>—</div>"));
        assert!(html.contains("First Name"));
        assert!(!html.contains("Last Name"));

        let anonymous = profile_page(Chrome {
            catalog: &catalog,
            user: None,
            active_slug: None,
        });
        assert!(anonymous.contains(USER_NOT_FOUND_TEXT));
    }
}
