// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! Landing page and dashboard shell.

use crate::navigation::Route;
use crate::AppContext;

pub struct HomePage;

impl HomePage {
    /// "Get started": straight to the dashboard when logged in.
    pub fn get_started(ctx: &AppContext) -> Route {
        let route = if ctx.session.is_authenticated() {
            Route::Dashboard
        } else {
            Route::Register
        };
        ctx.navigator.navigate(route);
        route
    }
}

pub struct DashboardPage;

impl DashboardPage {
    /// Redirect to login once the session is settled and unauthenticated.
    pub fn guard(ctx: &AppContext) -> Option<Route> {
        let session = ctx.session.current();
        if session.is_loading || session.is_authenticated() {
            return None;
        }
        ctx.navigator.navigate(Route::Login);
        Some(Route::Login)
    }

    /// Greeting line for the header, if someone is logged in.
    pub fn greeting(ctx: &AppContext) -> Option<String> {
        ctx.session
            .user()
            .map(|user| format!("Welcome, {}", user.greeting_name()))
    }

    pub async fn logout(ctx: &AppContext) -> Route {
        ctx.session.logout().await;
        ctx.notifier.success("Signed out successfully");
        ctx.navigator.navigate(Route::Login);
        Route::Login
    }
}
