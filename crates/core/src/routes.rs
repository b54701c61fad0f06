//! Views of the admin shell and their side-menu keys

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    MeetingRoomManage,
    BookingManage,
    UserManage,
    Statistics,
    InfoModify,
    PasswordModify,
}

/// Routes reachable from the side menu, in menu order
pub const MENU_ROUTES: [Route; 4] = [
    Route::MeetingRoomManage,
    Route::BookingManage,
    Route::UserManage,
    Route::Statistics,
];

impl Route {
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::MeetingRoomManage => "/meeting_room_manage",
            Self::BookingManage => "/booking_manage",
            Self::UserManage => "/user_manage",
            Self::Statistics => "/statistics",
            Self::InfoModify => "/user/info_modify",
            Self::PasswordModify => "/user/password_modify",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        [
            Self::Login,
            Self::MeetingRoomManage,
            Self::BookingManage,
            Self::UserManage,
            Self::Statistics,
            Self::InfoModify,
            Self::PasswordModify,
        ]
        .into_iter()
        .find(|route| route.path() == path)
    }

    /// Side-menu key, for routes that appear in the menu
    pub const fn menu_key(self) -> Option<&'static str> {
        match self {
            Self::MeetingRoomManage => Some("1"),
            Self::BookingManage => Some("2"),
            Self::UserManage => Some("3"),
            Self::Statistics => Some("4"),
            _ => None,
        }
    }

    pub fn from_menu_key(key: &str) -> Option<Self> {
        MENU_ROUTES
            .into_iter()
            .find(|route| route.menu_key() == Some(key))
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::MeetingRoomManage => "Meeting rooms",
            Self::BookingManage => "Bookings",
            Self::UserManage => "Users",
            Self::Statistics => "Statistics",
            Self::InfoModify => "Profile",
            Self::PasswordModify => "Password",
        }
    }
}

/// Menu key highlighted for `path`; paths outside the menu select the first entry
pub fn selected_menu_key(path: &str) -> &'static str {
    Route::from_path(path)
        .and_then(Route::menu_key)
        .unwrap_or("1")
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_keys_round_trip() {
        for route in MENU_ROUTES {
            let key = route.menu_key().unwrap();
            assert_eq!(Route::from_menu_key(key), Some(route));
        }
        assert_eq!(Route::from_menu_key("9"), None);
    }

    #[test]
    fn unknown_paths_select_first_menu_entry() {
        assert_eq!(selected_menu_key("/booking_manage"), "2");
        assert_eq!(selected_menu_key("/"), "1");
        assert_eq!(selected_menu_key("/login"), "1");
    }

    #[test]
    fn paths_resolve_back_to_routes() {
        assert_eq!(Route::from_path("/login"), Some(Route::Login));
        assert_eq!(Route::from_path("/nope"), None);
    }
}
