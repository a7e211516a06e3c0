use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::error::EngineError;

pub type Stimulus = char;

pub const DEFAULT_ALPHABET: [Stimulus; 4] = ['A', 'O', 'P', 'F'];

/// Ordered set of symbols stimuli are drawn from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<Stimulus>,
}

impl Alphabet {
    pub fn new(symbols: Vec<Stimulus>) -> Result<Self, EngineError> {
        if symbols.is_empty() {
            return Err(EngineError::InvalidConfig(
                "alphabet must contain at least one symbol".to_string(),
            ));
        }
        for (idx, s) in symbols.iter().enumerate() {
            if symbols[..idx].contains(s) {
                return Err(EngineError::InvalidConfig(format!(
                    "alphabet symbol '{s}' appears more than once"
                )));
            }
        }
        Ok(Self { symbols })
    }

    /// Every non-whitespace character of `s` becomes one symbol
    pub fn parse(s: &str) -> Result<Self, EngineError> {
        Self::new(s.chars().filter(|c| !c.is_whitespace()).collect())
    }

    pub fn symbols(&self) -> &[Stimulus] {
        &self.symbols
    }

    pub fn contains(&self, s: Stimulus) -> bool {
        self.symbols.contains(&s)
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_ALPHABET.to_vec(),
        }
    }
}

impl std::fmt::Display for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.symbols.iter().try_for_each(|s| write!(f, "{s}"))
    }
}

/// Where the engine draws its next stimulus from
pub trait StimulusSource: Send + std::fmt::Debug {
    fn next(&mut self, alphabet: &Alphabet) -> Stimulus;
}

/// Uniform draws with replacement
#[derive(Debug)]
pub struct RandomStimuli {
    rng: StdRng,
}

impl RandomStimuli {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomStimuli {
    fn default() -> Self {
        Self::new()
    }
}

impl StimulusSource for RandomStimuli {
    fn next(&mut self, alphabet: &Alphabet) -> Stimulus {
        let symbols = alphabet.symbols();
        symbols[self.rng.gen_range(0..symbols.len())]
    }
}

/// Replays a fixed sequence, wrapping around when exhausted.
/// Ignores the alphabet, so a run can be reproduced exactly.
#[derive(Debug, Clone)]
pub struct ScriptedStimuli {
    sequence: Vec<Stimulus>,
    pos: usize,
}

impl ScriptedStimuli {
    pub fn new(sequence: impl IntoIterator<Item = Stimulus>) -> Self {
        Self {
            sequence: sequence.into_iter().collect(),
            pos: 0,
        }
    }
}

impl StimulusSource for ScriptedStimuli {
    fn next(&mut self, alphabet: &Alphabet) -> Stimulus {
        if self.sequence.is_empty() {
            return alphabet.symbols()[0];
        }
        let s = self.sequence[self.pos % self.sequence.len()];
        self.pos += 1;
        s
    }
}
