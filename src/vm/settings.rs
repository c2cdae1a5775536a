/// Limits on how far the virtual machine explores a method
#[derive(Clone, Debug)]
pub struct Settings {
    /// How many times a single address may be executed before exploration is aborted
    ///
    /// Loops with an unknown exit condition never converge, since every iteration produces a
    /// fresh node.
    pub max_address_visits: usize,

    /// How many instructions may be executed in total for one method
    pub max_method_visits: usize,

    /// How deep a context may be nested in calls
    pub max_call_depth: usize,
}

impl Settings {
    pub fn new() -> Settings {
        Settings {
            max_address_visits: 500,
            max_method_visits: 1_000_000,
            max_call_depth: 20,
        }
    }
}

impl Default for Settings {
    fn default() -> Settings {
        Settings::new()
    }
}
