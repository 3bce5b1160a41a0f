//! Register and login forms.

use crate::api::{ApiError, AuthResponse, FaceApi, UserLogin, UserRegister};
use crate::dashboard::{Feedback, Status};

pub const MISSING_FIELDS: &str = "Please fill in all fields.";
pub const PASSWORD_MISMATCH: &str = "Passwords do not match";
pub const REGISTER_SUCCESS: &str = "Account created successfully! You can now sign in.";
pub const REGISTER_FAILED: &str = "Registration failed. Please try again.";
pub const LOGIN_FAILED: &str = "Login failed. Please try again.";

#[derive(Debug, Clone)]
pub enum RegisterMessage {
    UsernameChanged(String),
    EmailChanged(String),
    PasswordChanged(String),
    ConfirmChanged(String),
    Submit,
    Resolved(Result<AuthResponse, ApiError>),
}

#[derive(Debug, Clone)]
pub struct RegisterForm {
    username: String,
    email: String,
    password: String,
    confirm: String,
    status: Status<Feedback>,
}

impl Default for RegisterForm {
    fn default() -> Self {
        Self {
            username: String::new(),
            email: String::new(),
            password: String::new(),
            confirm: String::new(),
            status: Status::Idle,
        }
    }
}

impl RegisterForm {
    pub fn status(&self) -> &Status<Feedback> {
        &self.status
    }

    /// Returns the request to send, if the submit passed validation.
    pub fn handle(&mut self, msg: RegisterMessage) -> Option<UserRegister> {
        match msg {
            RegisterMessage::UsernameChanged(v) => self.username = v,
            RegisterMessage::EmailChanged(v) => self.email = v,
            RegisterMessage::PasswordChanged(v) => self.password = v,
            RegisterMessage::ConfirmChanged(v) => self.confirm = v,
            RegisterMessage::Submit => {
                if self.status.is_loading() {
                    return None;
                }
                if self.username.is_empty() || self.email.is_empty() || self.password.is_empty() {
                    self.status = Status::Done(Feedback::Error(MISSING_FIELDS.into()));
                    return None;
                }
                if self.password != self.confirm {
                    self.status = Status::Done(Feedback::Error(PASSWORD_MISMATCH.into()));
                    return None;
                }
                self.status = Status::Loading;
                return Some(UserRegister {
                    username: self.username.clone(),
                    email: self.email.clone(),
                    password: self.password.clone(),
                });
            }
            RegisterMessage::Resolved(result) => {
                if self.status.is_loading() {
                    self.status = Status::Done(match result {
                        Ok(_) => Feedback::Success(REGISTER_SUCCESS.into()),
                        Err(e) => Feedback::Error(e.user_message(REGISTER_FAILED)),
                    });
                }
            }
        }
        None
    }

    pub async fn submit<A: FaceApi>(&mut self, api: &A) {
        if let Some(request) = self.handle(RegisterMessage::Submit) {
            tracing::info!(email = %request.email, "registering account");
            let result = api.register(&request).await;
            self.handle(RegisterMessage::Resolved(result));
        }
    }
}

#[derive(Debug, Clone)]
pub enum LoginMessage {
    EmailChanged(String),
    PasswordChanged(String),
    Submit,
    Resolved(Result<AuthResponse, ApiError>),
}

#[derive(Debug, Clone)]
pub struct LoginForm {
    email: String,
    password: String,
    status: Status<Feedback>,
    user: Option<serde_json::Value>,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            status: Status::Idle,
            user: None,
        }
    }
}

impl LoginForm {
    pub fn status(&self) -> &Status<Feedback> {
        &self.status
    }

    /// The user record returned by a successful login.
    pub fn user(&self) -> Option<&serde_json::Value> {
        self.user.as_ref()
    }

    pub fn handle(&mut self, msg: LoginMessage) -> Option<UserLogin> {
        match msg {
            LoginMessage::EmailChanged(v) => self.email = v,
            LoginMessage::PasswordChanged(v) => self.password = v,
            LoginMessage::Submit => {
                if self.status.is_loading() {
                    return None;
                }
                if self.email.is_empty() || self.password.is_empty() {
                    self.status = Status::Done(Feedback::Error(MISSING_FIELDS.into()));
                    return None;
                }
                self.status = Status::Loading;
                self.user = None;
                return Some(UserLogin {
                    email: self.email.clone(),
                    password: self.password.clone(),
                });
            }
            LoginMessage::Resolved(result) => {
                if self.status.is_loading() {
                    self.status = Status::Done(match result {
                        Ok(resp) => {
                            self.user = resp.user;
                            Feedback::Success(resp.message)
                        }
                        Err(e) => Feedback::Error(e.user_message(LOGIN_FAILED)),
                    });
                }
            }
        }
        None
    }

    pub async fn submit<A: FaceApi>(&mut self, api: &A) {
        if let Some(request) = self.handle(LoginMessage::Submit) {
            tracing::info!(email = %request.email, "logging in");
            let result = api.login(&request).await;
            self.handle(LoginMessage::Resolved(result));
        }
    }
}
