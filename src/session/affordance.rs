/// CSS display values the guard toggles between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDisplay {
    None,
    InlineBlock,
}

pub trait ClickEvent {
    fn prevent_default(&self);
}

pub type ClickHandler = Box<dyn Fn(&dyn ClickEvent) + Send + Sync>;

/// A header link the guard shows, hides, or listens to.
pub trait Affordance: Send + Sync {
    fn set_display(&self, display: LinkDisplay);

    fn on_click(&self, handler: ClickHandler);
}

/// Visibility of the header links for a given session presence.
/// Exactly one of the two is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderAffordanceState {
    pub login: LinkDisplay,
    pub logout: LinkDisplay,
}

impl HeaderAffordanceState {
    #[must_use]
    pub fn for_session(present: bool) -> Self {
        if present {
            Self {
                login: LinkDisplay::None,
                logout: LinkDisplay::InlineBlock,
            }
        } else {
            Self {
                login: LinkDisplay::InlineBlock,
                logout: LinkDisplay::None,
            }
        }
    }

    pub(crate) fn apply(self, login: Option<&dyn Affordance>, logout: Option<&dyn Affordance>) {
        if let Some(login) = login {
            login.set_display(self.login);
        }
        if let Some(logout) = logout {
            logout.set_display(self.logout);
        }
    }
}
