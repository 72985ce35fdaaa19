//! Collapsible navigation menu.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NavMenu {
    expanded: bool,
}

impl NavMenu {
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Value for the toggle button's `aria-expanded` attribute.
    pub fn aria_expanded(&self) -> &'static str {
        if self.expanded { "true" } else { "false" }
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    /// In-page links close the menu; links leaving the page don't need to.
    pub fn link_clicked(&mut self, href: Option<&str>) {
        if href.is_some_and(|href| href.starts_with('#')) {
            self.expanded = false;
        }
    }

    pub fn key_pressed(&mut self, key: &str) {
        if key == "Escape" {
            self.expanded = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_state() {
        let mut menu = NavMenu::default();
        menu.toggle();
        assert!(menu.is_expanded());
        assert_eq!(menu.aria_expanded(), "true");
        menu.toggle();
        assert_eq!(menu.aria_expanded(), "false");
    }

    #[test]
    fn anchor_links_close_menu() {
        let mut menu = NavMenu::default();
        menu.toggle();
        menu.link_clicked(Some("https://maps.example.com"));
        assert!(menu.is_expanded());
        menu.link_clicked(None);
        assert!(menu.is_expanded());
        menu.link_clicked(Some("#rsvp"));
        assert!(!menu.is_expanded());
    }

    #[test]
    fn escape_closes_menu() {
        let mut menu = NavMenu::default();
        menu.toggle();
        menu.key_pressed("Enter");
        assert!(menu.is_expanded());
        menu.key_pressed("Escape");
        assert!(!menu.is_expanded());
    }
}
