//! Engine-initiated requests for terminal input.

/// What the engine is asking for. Matching on the wire name is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputRequestKind {
    AuthorizationType,
    AuthorizationValue,
    FirstName,
    AuthorizationCode,
    AuthorizationCodeIncorrect,
    AuthorizationPassword,
    AuthorizationPasswordIncorrect,
    Other(String),
}

impl InputRequestKind {
    pub fn parse(name: &str) -> Self {
        match name {
            "authorization-type" => Self::AuthorizationType,
            "authorization-value" => Self::AuthorizationValue,
            "first-name" => Self::FirstName,
            "authorization-code" => Self::AuthorizationCode,
            "authorization-code-incorrect" => Self::AuthorizationCodeIncorrect,
            "authorization-password" => Self::AuthorizationPassword,
            "authorization-password-incorrect" => Self::AuthorizationPasswordIncorrect,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::AuthorizationType => "authorization-type",
            Self::AuthorizationValue => "authorization-value",
            Self::FirstName => "first-name",
            Self::AuthorizationCode => "authorization-code",
            Self::AuthorizationCodeIncorrect => "authorization-code-incorrect",
            Self::AuthorizationPassword => "authorization-password",
            Self::AuthorizationPasswordIncorrect => "authorization-password-incorrect",
            Self::Other(name) => name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputExtras {
    pub hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRequest {
    pub kind: InputRequestKind,
    pub extras: InputExtras,
}

impl InputRequest {
    pub fn new(kind: InputRequestKind) -> Self {
        Self {
            kind,
            extras: InputExtras::default(),
        }
    }

    /// Attaches a password hint; blank hints are dropped.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        let hint = hint.into();
        self.extras.hint = (!hint.trim().is_empty()).then_some(hint);
        self
    }
}
