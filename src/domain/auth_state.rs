/// Login progress as reported by the session engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationState {
    Unauthenticated,
    AwaitingPhone,
    AwaitingCode,
    AwaitingPassword,
    AwaitingRegistration,
    AwaitingEmail,
    AwaitingDeviceConfirmation,
    Ready,
    LoggingOut,
    LoggedOut,
}

impl AuthorizationState {
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::AwaitingPhone => "awaiting-phone",
            Self::AwaitingCode => "awaiting-code",
            Self::AwaitingPassword => "awaiting-password",
            Self::AwaitingRegistration => "awaiting-registration",
            Self::AwaitingEmail => "awaiting-email",
            Self::AwaitingDeviceConfirmation => "awaiting-device-confirmation",
            Self::Ready => "ready",
            Self::LoggingOut => "logging-out",
            Self::LoggedOut => "logged-out",
        }
    }

    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl std::fmt::Display for AuthorizationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}
