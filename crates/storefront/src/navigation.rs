//! Routes and transient notices.
//!
//! Flows that end by sending the user somewhere return a [`Navigation`]:
//! the destination plus an optional toast-style [`Notice`]. The front end
//! (or CLI) decides how to render both.

use std::fmt;

/// A page the user can be sent to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login {
        /// Page to return to after signing in.
        redirect: Option<String>,
    },
    Cart,
    Checkout,
    Products,
    Profile,
    OrderSuccess(String),
    OrderFailed(String),
}

impl Route {
    /// Login page that returns to checkout.
    #[must_use]
    pub fn login_for_checkout() -> Self {
        Self::Login {
            redirect: Some("checkout".to_string()),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str("/"),
            Self::Login { redirect: None } => f.write_str("/login"),
            Self::Login {
                redirect: Some(target),
            } => write!(f, "/login?redirect={target}"),
            Self::Cart => f.write_str("/cart"),
            Self::Checkout => f.write_str("/checkout"),
            Self::Products => f.write_str("/products"),
            Self::Profile => f.write_str("/profile"),
            Self::OrderSuccess(id) => write!(f, "/order-success/{id}"),
            Self::OrderFailed(id) => write!(f, "/order-failed/{id}"),
        }
    }
}

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// A short message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Where to go next, and what to tell the user on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub route: Route,
    pub notice: Option<Notice>,
}

impl Navigation {
    /// Navigate without a notice.
    #[must_use]
    pub const fn to(route: Route) -> Self {
        Self {
            route,
            notice: None,
        }
    }

    /// Attach a notice.
    #[must_use]
    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }
}
