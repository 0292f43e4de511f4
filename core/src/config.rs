/// Runtime options for an [`Interpreter`](crate::Interpreter)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Stop running when two consecutive instructions are the same `1nnn`
    /// jump (the usual `end: jp end` idle spin).
    pub halt_on_idle_loop: bool,
    /// Pace the instruction loop. `None` runs at full host speed; the timers
    /// keep their own 60Hz schedule either way.
    pub instructions_per_second: Option<u32>,
    /// Seed for `Cxkk`; entropy seeded when unset
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            halt_on_idle_loop: true,
            instructions_per_second: None,
            seed: None,
        }
    }
}
