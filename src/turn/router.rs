//! Pure branch decision for an incoming turn.

/// The two branches a turn can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Welcome,
    Conversation,
}

/// Maps a turn's declared intent to a branch.
///
/// Total function: only the literal token `"start"` selects the welcome
/// branch; every other value, absent or unrecognized, degrades gracefully to
/// conversation. There is no error state for unknown intents.
pub fn decide(intent: Option<&str>) -> Branch {
    match intent {
        Some("start") => Branch::Welcome,
        _ => Branch::Conversation,
    }
}
