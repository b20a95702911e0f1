//! Platform-conditional application menu template.
//!
//! Only macOS gets a populated menu: the app submenu with About and Quit.
//! Every other platform uses the empty template.

/// Action role of a menu item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuRole {
    /// Show the standard About panel.
    About,
    /// Quit the application.
    Quit,
}

/// A single entry in a submenu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    /// Display label.
    pub label: String,
    /// What the item does when activated.
    pub role: MenuRole,
    /// Keyboard accelerator (e.g. `"Command+Q"`).
    pub accelerator: Option<String>,
}

/// A labeled group of menu items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submenu {
    /// Submenu label (the app name for the macOS app menu).
    pub label: String,
    /// Items in display order.
    pub items: Vec<MenuItem>,
}

/// Build the menu template for the given platform identifier.
pub fn build_menu(os: &str, app_name: &str) -> Vec<Submenu> {
    if os != "macos" {
        return Vec::new();
    }

    vec![Submenu {
        label: app_name.to_owned(),
        items: vec![
            MenuItem {
                label: format!("About {app_name}"),
                role: MenuRole::About,
                accelerator: None,
            },
            MenuItem {
                label: "Quit".to_owned(),
                role: MenuRole::Quit,
                accelerator: Some("Command+Q".to_owned()),
            },
        ],
    }]
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn macos_menu_has_about_and_quit() {
        let menu = build_menu("macos", "Wisp");
        assert_eq!(menu.len(), 1);

        let app_menu = &menu[0];
        assert_eq!(app_menu.label, "Wisp");
        assert_eq!(app_menu.items.len(), 2);
        assert_eq!(app_menu.items[0].label, "About Wisp");
        assert_eq!(app_menu.items[0].role, MenuRole::About);
        assert_eq!(app_menu.items[1].role, MenuRole::Quit);
        assert_eq!(app_menu.items[1].accelerator.as_deref(), Some("Command+Q"));
    }

    #[test]
    fn other_platforms_use_empty_template() {
        assert!(build_menu("linux", "Wisp").is_empty());
        assert!(build_menu("windows", "Wisp").is_empty());
        assert!(build_menu("freebsd", "Wisp").is_empty());
    }
}
