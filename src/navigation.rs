// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! Client routes and the navigator seam.

use std::sync::Mutex;

/// Pages of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Register,
    ForgotPassword,
    Dashboard,
    Gallery,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::ForgotPassword => "/forgot-password",
            Route::Dashboard => "/dashboard",
            Route::Gallery => "/gallery-page",
        }
    }

    /// Whether the page requires an authenticated session.
    pub fn requires_auth(&self) -> bool {
        matches!(self, Route::Dashboard)
    }
}

/// Performs navigation requested by page flows and the session store.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator that records every navigation; the last entry is the current page.
#[derive(Debug)]
pub struct HistoryNavigator {
    history: Mutex<Vec<Route>>,
}

impl HistoryNavigator {
    pub fn new(start: Route) -> Self {
        Self {
            history: Mutex::new(vec![start]),
        }
    }

    pub fn current(&self) -> Route {
        self.history
            .lock()
            .map(|h| h.last().copied().unwrap_or(Route::Home))
            .unwrap_or(Route::Home)
    }

    pub fn history(&self) -> Vec<Route> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }
}

impl Default for HistoryNavigator {
    fn default() -> Self {
        Self::new(Route::Home)
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, route: Route) {
        tracing::debug!(path = route.path(), "Navigating");
        if let Ok(mut history) = self.history.lock() {
            history.push(route);
        }
    }
}
