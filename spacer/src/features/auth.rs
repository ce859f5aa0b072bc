//! Login and registration.
//!
//! A successful login yields a [`SessionGrant`] (token plus role label);
//! the handler turns it into cookies. Registration never logs the user in,
//! it switches the page back to the login form with a notice.

use super::{is_blank, looks_like_email};
use crate::environment::SpacerEnvironment;
use serde::Deserialize;
use spacer_api::ApiError;
use spacer_api::models::{LoginRequest, LoginResponse, RegisterRequest};
use spacer_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use std::fmt;

/// Shown on any failed login
pub const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
/// Shown when registration fails without a server message
pub const SIGNUP_FAILED: &str = "Signup failed. Please try again.";
/// Shown after a successful registration
pub const ACCOUNT_CREATED: &str = "Account created. Please log in.";

/// Login form fields.
#[derive(Clone, Default, Deserialize)]
pub struct LoginForm {
    /// Account email
    #[serde(default)]
    pub email: String,
    /// Account password
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if is_blank(&self.email) {
            errors.push("Email is required".to_string());
        } else if !looks_like_email(&self.email) {
            errors.push("Please enter a valid email address".to_string());
        }
        if self.password.is_empty() {
            errors.push("Password is required".to_string());
        }
        errors
    }
}

/// Registration form fields.
#[derive(Clone, Default, Deserialize)]
pub struct RegisterForm {
    /// Username
    #[serde(default)]
    pub name: String,
    /// Account email
    #[serde(default)]
    pub email: String,
    /// Account password
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl RegisterForm {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if is_blank(&self.name) {
            errors.push("Name is required".to_string());
        }
        errors.extend(
            LoginForm {
                email: self.email.clone(),
                password: self.password.clone(),
            }
            .validate(),
        );
        errors
    }
}

impl fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Which form the auth page shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthMode {
    /// "Welcome back"
    #[default]
    Login,
    /// "Join us"
    Register,
}

/// Token and role label to persist in the session cookies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionGrant {
    /// Opaque bearer token
    pub token: String,
    /// Role label as reported by the API
    pub role: String,
}

/// State of the auth page.
#[derive(Clone, Debug, Default)]
pub struct AuthState {
    /// Form on display
    pub mode: AuthMode,
    /// Email echoed back into the form
    pub email: String,
    /// Name echoed back into the register form
    pub name: String,
    /// Field validation errors
    pub errors: Vec<String>,
    /// Inline error alert
    pub alert: Option<String>,
    /// Inline success notice
    pub notice: Option<String>,
    /// Set once a login succeeds
    pub granted: Option<SessionGrant>,
    /// A call is in flight
    pub submitting: bool,
}

impl AuthState {
    /// State for a freshly opened page in the given mode
    #[must_use]
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

/// Auth page actions.
#[derive(Clone, Debug)]
pub enum AuthAction {
    /// User submitted the login form
    SubmitLogin(LoginForm),
    /// User submitted the register form
    SubmitRegister(RegisterForm),
    /// `POST /auth/login` succeeded
    LoggedIn(LoginResponse),
    /// `POST /auth/login` failed
    LoginFailed(ApiError),
    /// `POST /auth/register` succeeded
    Registered,
    /// `POST /auth/register` failed
    RegisterFailed(ApiError),
}

/// Reducer for the auth page
#[derive(Clone, Debug, Default)]
pub struct AuthReducer;

impl Reducer for AuthReducer {
    type State = AuthState;
    type Action = AuthAction;
    type Environment = SpacerEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AuthAction::SubmitLogin(form) => {
                state.mode = AuthMode::Login;
                state.email = form.email.trim().to_string();
                state.alert = None;
                state.notice = None;
                state.errors = form.validate();
                if !state.errors.is_empty() || state.submitting {
                    return SmallVec::new();
                }

                state.submitting = true;
                let api = env.api.clone();
                let request = LoginRequest {
                    email: form.email.trim().to_string(),
                    password: form.password,
                };
                smallvec![Effect::future(async move {
                    Some(match api.login(&request).await {
                        Ok(response) => AuthAction::LoggedIn(response),
                        Err(error) => AuthAction::LoginFailed(error),
                    })
                })]
            },

            AuthAction::SubmitRegister(form) => {
                state.mode = AuthMode::Register;
                state.email = form.email.trim().to_string();
                state.name = form.name.trim().to_string();
                state.alert = None;
                state.notice = None;
                state.errors = form.validate();
                if !state.errors.is_empty() || state.submitting {
                    return SmallVec::new();
                }

                state.submitting = true;
                let api = env.api.clone();
                let request = RegisterRequest {
                    name: form.name.trim().to_string(),
                    email: form.email.trim().to_string(),
                    password: form.password,
                    role_id: RegisterRequest::USER_ROLE_ID,
                };
                smallvec![Effect::future(async move {
                    Some(match api.register(&request).await {
                        Ok(_) => AuthAction::Registered,
                        Err(error) => AuthAction::RegisterFailed(error),
                    })
                })]
            },

            AuthAction::LoggedIn(response) => {
                state.submitting = false;
                tracing::info!(user_id = %response.user.user_id, role = %response.user.role, "User logged in");
                state.granted = Some(SessionGrant {
                    token: response.token,
                    role: response.user.role,
                });
                SmallVec::new()
            },

            AuthAction::LoginFailed(error) => {
                state.submitting = false;
                tracing::warn!(%error, "Login failed");
                state.alert = Some(match error.server_message() {
                    Some(message) if !message.trim().is_empty() => {
                        format!("{LOGIN_FAILED} ({message})")
                    },
                    _ => LOGIN_FAILED.to_string(),
                });
                SmallVec::new()
            },

            AuthAction::Registered => {
                state.submitting = false;
                state.mode = AuthMode::Login;
                state.name.clear();
                state.notice = Some(ACCOUNT_CREATED.to_string());
                SmallVec::new()
            },

            AuthAction::RegisterFailed(error) => {
                state.submitting = false;
                tracing::warn!(%error, "Registration failed");
                state.alert = Some(
                    error
                        .server_message()
                        .filter(|message| !message.trim().is_empty())
                        .map_or_else(|| SIGNUP_FAILED.to_string(), str::to_string),
                );
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::features::test_support::{WAIT, api_env};
    use spacer_runtime::Store;
    use spacer_testing::{MockSpacerApi, ReducerTest, assertions, fixtures};

    fn login_form(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_login_requires_fields() {
        ReducerTest::new(AuthReducer)
            .with_env(api_env(&MockSpacerApi::new()))
            .given_state(AuthState::default())
            .when_action(AuthAction::SubmitLogin(login_form("  ", "")))
            .then_state(|state| {
                assert_eq!(state.errors, vec!["Email is required", "Password is required"]);
                assert!(!state.submitting);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_register_requires_name_and_valid_email() {
        ReducerTest::new(AuthReducer)
            .with_env(api_env(&MockSpacerApi::new()))
            .given_state(AuthState::new(AuthMode::Register))
            .when_action(AuthAction::SubmitRegister(RegisterForm {
                name: String::new(),
                email: "amina.example.com".to_string(),
                password: "secret".to_string(),
            }))
            .then_state(|state| {
                assert_eq!(
                    state.errors,
                    vec!["Name is required", "Please enter a valid email address"]
                );
                assert_eq!(state.mode, AuthMode::Register);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_form_debug_hides_password() {
        let debug = format!("{:?}", login_form("amina@example.com", "hunter2"));
        assert!(debug.contains("amina@example.com"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_valid_login_starts_call() {
        ReducerTest::new(AuthReducer)
            .with_env(api_env(&MockSpacerApi::new()))
            .given_state(AuthState::default())
            .when_action(AuthAction::SubmitLogin(login_form("amina@example.com", "pw")))
            .then_state(|state| assert!(state.submitting))
            .then_clean()
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[tokio::test]
    async fn test_login_grants_session() {
        let api = MockSpacerApi::new().with_login(fixtures::login("admin"));
        let store = Store::new(AuthState::default(), AuthReducer, api_env(&api));

        store
            .send_and_wait(
                AuthAction::SubmitLogin(login_form("amina@example.com", "pw")),
                WAIT,
            )
            .await
            .unwrap();

        let granted = store.state(|s| s.granted.clone()).await.unwrap();
        assert_eq!(granted.token, "admin-token");
        assert_eq!(granted.role, "admin");
    }

    #[tokio::test]
    async fn test_login_failure_shows_fixed_text_and_server_message() {
        let api = MockSpacerApi::new().with_login(fixtures::login("user"));
        let store = Store::new(AuthState::default(), AuthReducer, api_env(&api));

        store
            .send_and_wait(
                AuthAction::SubmitLogin(login_form("someone@example.com", "pw")),
                WAIT,
            )
            .await
            .unwrap();

        let state = store.state(Clone::clone).await;
        assert!(state.granted.is_none());
        assert_eq!(
            state.alert.as_deref(),
            Some("Login failed. Please check your credentials. (Invalid credentials)")
        );
    }

    #[tokio::test]
    async fn test_register_switches_to_login_with_notice() {
        let api = MockSpacerApi::new();
        let store = Store::new(AuthState::new(AuthMode::Register), AuthReducer, api_env(&api));

        store
            .send_and_wait(
                AuthAction::SubmitRegister(RegisterForm {
                    name: "amina".to_string(),
                    email: "amina@example.com".to_string(),
                    password: "pw".to_string(),
                }),
                WAIT,
            )
            .await
            .unwrap();

        let state = store.state(Clone::clone).await;
        assert_eq!(state.mode, AuthMode::Login);
        assert_eq!(state.notice.as_deref(), Some(ACCOUNT_CREATED));
        assert!(state.granted.is_none());
    }

    #[tokio::test]
    async fn test_register_transport_failure_uses_generic_text() {
        let api = MockSpacerApi::new()
            .failing("register", ApiError::RequestFailed("connection refused".to_string()));
        let store = Store::new(AuthState::new(AuthMode::Register), AuthReducer, api_env(&api));

        store
            .send_and_wait(
                AuthAction::SubmitRegister(RegisterForm {
                    name: "amina".to_string(),
                    email: "amina@example.com".to_string(),
                    password: "pw".to_string(),
                }),
                WAIT,
            )
            .await
            .unwrap();

        let state = store.state(Clone::clone).await;
        assert_eq!(state.alert.as_deref(), Some(SIGNUP_FAILED));
        assert_eq!(state.mode, AuthMode::Register);
    }
}
