/// How observable the effects of executing some code are outside of the method
///
/// Ordered from weakest to strongest, so that combining two classifications is just `max`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub enum SideEffect {
    /// Only registers of the current frame (and objects allocated in it) are touched
    #[default]
    None,

    /// State outside of the frame may be touched, but not in a way that can be relied upon
    /// (eg. class initialization, monitors)
    Weak,

    /// State outside of the frame is modified (static fields, calls to unknown code, throwing)
    Strong,
}

impl SideEffect {
    pub fn merge(self, other: SideEffect) -> SideEffect {
        self.max(other)
    }

    /// Strongest classification in a sequence, stopping as soon as `Strong` is seen
    pub fn strongest(effects: impl IntoIterator<Item = SideEffect>) -> SideEffect {
        let mut strongest = SideEffect::None;
        for effect in effects {
            strongest = strongest.merge(effect);
            if strongest == SideEffect::Strong {
                break;
            }
        }
        strongest
    }
}
