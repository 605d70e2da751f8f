//! Built-in selection rules, in pipeline order.

pub mod majority;
pub mod pair;
pub mod shortcut;
pub mod suspect;

pub use majority::MajorityRule;
pub use pair::PairTiebreakRule;
pub use shortcut::UniformShortcutRule;
pub use suspect::IdenticalSuspectRule;
