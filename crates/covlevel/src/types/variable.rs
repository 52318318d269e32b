use std::fmt::{self, Display, Formatter};

/// The locale attribute set a `${...}` placeholder is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Language,
    Scripts,
    Territories,
    TimeZones,
    Currencies,
    Plurals,
    Calendars,
}

impl VariableKind {
    /// Every kind, in declaration order.
    pub const ALL: [VariableKind; 7] = [
        VariableKind::Language,
        VariableKind::Scripts,
        VariableKind::Territories,
        VariableKind::TimeZones,
        VariableKind::Currencies,
        VariableKind::Plurals,
        VariableKind::Calendars,
    ];

    /// The placeholder name as written between `${` and `}`.
    pub fn placeholder_name(self) -> &'static str {
        match self {
            VariableKind::Language => "Target-Language",
            VariableKind::Scripts => "Target-Scripts",
            VariableKind::Territories => "Target-Territories",
            VariableKind::TimeZones => "Target-TimeZones",
            VariableKind::Currencies => "Target-Currencies",
            VariableKind::Plurals => "Target-Plurals",
            VariableKind::Calendars => "Calendar-List",
        }
    }

    /// Resolve a placeholder name (without `${` and `}`).
    pub fn from_placeholder(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.placeholder_name() == name)
    }
}

impl Display for VariableKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "${{{}}}", self.placeholder_name())
    }
}
