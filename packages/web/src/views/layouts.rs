use dioxus::prelude::*;
use ui::Navbar;

use crate::Route;

#[component]
pub fn AdminLayout() -> Element {
    rsx! {
        Navbar {
            Link { to: Route::AdminDashboard {}, class: "navbar-link", "Overview" }
            Link { to: Route::AdminRounds {}, class: "navbar-link", "Rounds" }
            Link { to: Route::AdminTasks {}, class: "navbar-link", "Tasks" }
            Link { to: Route::AdminUsers {}, class: "navbar-link", "Users" }
        }
        main { class: "page", Outlet::<Route> {} }
    }
}

#[component]
pub fn StaffLayout() -> Element {
    rsx! {
        Navbar {
            Link { to: Route::StaffDashboard {}, class: "navbar-link", "My night" }
        }
        main { class: "page", Outlet::<Route> {} }
    }
}
