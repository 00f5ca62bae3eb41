//! Structured event names for tracing

/// Single-flight and progress command events
pub mod command {
    pub const EXECUTION_STARTED: &str = "execution.started";
    pub const EXECUTION_COMPLETED: &str = "execution.completed";
    pub const EXECUTION_CANCELLED: &str = "execution.cancelled";
    pub const EXECUTION_FAILED: &str = "execution.failed";
    pub const EXECUTION_REJECTED: &str = "execution.rejected";
    pub const CANCELLATION_REQUESTED: &str = "cancellation.requested";
    pub const PROGRESS_REPORTED: &str = "progress.reported";
    pub const FILE_PICKED: &str = "file.picked";
    pub const FILE_DISMISSED: &str = "file.dismissed";
}

/// Composite command events
pub mod composite {
    pub const MEMBER_REGISTERED: &str = "member.registered";
    pub const REGISTRATION_REJECTED: &str = "registration.rejected";
    pub const MEMBER_UNREGISTERED: &str = "member.unregistered";
    pub const MEMBERS_PRUNED: &str = "members.pruned";
    pub const EXECUTION_TRIGGERED: &str = "execution.triggered";
    pub const MEMBER_REFUSED: &str = "member.refused";
}

/// Navigation service events
pub mod navigation {
    pub const ROUTE_CONFIGURED: &str = "route.configured";
    pub const VIEW_CONFIGURED: &str = "view.configured";
    pub const FRAME_ATTACHED: &str = "frame.attached";
    pub const NAVIGATED: &str = "navigation.completed";
    pub const NAVIGATION_FAILED: &str = "navigation.failed";
    pub const WENT_BACK: &str = "navigation.back";
}

/// Localization events
pub mod localization {
    pub const TRANSLATIONS_LOADED: &str = "translations.loaded";
    pub const TRANSLATIONS_INVALID: &str = "translations.invalid";
    pub const CULTURE_CHANGED: &str = "culture.changed";
}

/// Configuration events
pub mod config {
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_SAVED: &str = "config.saved";
    pub const DIRS_INITIALIZED: &str = "dirs.initialized";
}
