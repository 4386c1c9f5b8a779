//! Connectivity and install-prompt state.
//!
//! Pure state tracking: the browser module turns platform events into
//! [`ShellEvent`]s and the UI renders from [`ShellState`].

/// How the user answered the install prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Accepted,
    Dismissed,
}

impl InstallOutcome {
    pub fn from_platform(outcome: &str) -> Self {
        if outcome == "accepted" {
            Self::Accepted
        } else {
            Self::Dismissed
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellEvent {
    Online,
    Offline,
    /// The platform offered an install prompt and it was deferred.
    InstallPromptAvailable,
    InstallPromptResolved(InstallOutcome),
    AppInstalled,
    InstallBannerDismissed,
    OfflineBannerDismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellState {
    pub online: bool,
    pub installable: bool,
    pub installed: bool,
    pub offline_banner: bool,
}

impl ShellState {
    /// State at startup, from what the platform reports.
    pub fn new(online: bool, installed: bool) -> Self {
        Self {
            online,
            installable: false,
            installed,
            offline_banner: !online,
        }
    }

    pub fn show_install_banner(&self) -> bool {
        self.installable && !self.installed
    }

    #[must_use]
    pub fn apply(self, event: ShellEvent) -> Self {
        let next = match event {
            ShellEvent::Online => Self {
                online: true,
                offline_banner: false,
                ..self
            },
            ShellEvent::Offline => Self {
                online: false,
                offline_banner: true,
                ..self
            },
            ShellEvent::InstallPromptAvailable => Self {
                installable: true,
                ..self
            },
            // the deferred prompt can only be used once either way
            ShellEvent::InstallPromptResolved(_) | ShellEvent::InstallBannerDismissed => Self {
                installable: false,
                ..self
            },
            ShellEvent::AppInstalled => Self {
                installable: false,
                installed: true,
                ..self
            },
            ShellEvent::OfflineBannerDismissed => Self {
                offline_banner: false,
                ..self
            },
        };
        tracing::debug!(?event, ?next, "shell state changed");
        next
    }
}

impl Default for ShellState {
    fn default() -> Self {
        Self::new(true, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_offline_shows_banner() {
        let state = ShellState::new(false, false);
        assert!(!state.online);
        assert!(state.offline_banner);
        assert!(!state.show_install_banner());
    }

    #[test]
    fn test_connectivity_transitions() {
        let state = ShellState::default().apply(ShellEvent::Offline);
        assert!(!state.online);
        assert!(state.offline_banner);

        let state = state.apply(ShellEvent::OfflineBannerDismissed);
        assert!(!state.online);
        assert!(!state.offline_banner);

        let state = state.apply(ShellEvent::Online);
        assert!(state.online);
        assert!(!state.offline_banner);
    }

    #[test]
    fn test_install_lifecycle() {
        let state = ShellState::default().apply(ShellEvent::InstallPromptAvailable);
        assert!(state.show_install_banner());

        let state = state.apply(ShellEvent::InstallPromptResolved(InstallOutcome::Accepted));
        assert!(!state.installable);

        let state = state.apply(ShellEvent::AppInstalled);
        assert!(state.installed);
        assert!(!state.show_install_banner());
    }

    #[test]
    fn test_installed_app_never_shows_banner() {
        let state = ShellState::new(true, true).apply(ShellEvent::InstallPromptAvailable);
        assert!(state.installable);
        assert!(!state.show_install_banner());
    }

    #[test]
    fn test_dismissing_banner_clears_installable() {
        let state = ShellState::default()
            .apply(ShellEvent::InstallPromptAvailable)
            .apply(ShellEvent::InstallBannerDismissed);
        assert!(!state.show_install_banner());
        assert!(!state.installed);
    }

    #[test]
    fn test_install_outcome_from_platform() {
        assert_eq!(InstallOutcome::from_platform("accepted"), InstallOutcome::Accepted);
        assert_eq!(InstallOutcome::from_platform("dismissed"), InstallOutcome::Dismissed);
    }
}
