//! Short code generation.
//!
//! New links get a word code: three dictionary words joined by hyphens,
//! drawn uniformly and independently with replacement (about 8.9 million
//! combinations). When word draws keep colliding, a single 8-hex-digit code
//! from the OS random source is used instead.

use rand::seq::IndexedRandom;

use crate::error::AppError;

/// Word list used for new codes. Every entry is 3-8 lowercase ASCII letters.
pub const WORDS: &[&str] = &[
    "acorn", "alpine", "amber", "anchor", "apple", "arbor", "arctic", "aspen",
    "atlas", "aurora", "autumn", "azure", "badge", "bamboo", "banjo", "basil",
    "bay", "beacon", "beech", "berry", "birch", "bison", "blaze", "bloom",
    "bluff", "bolt", "bonsai", "boulder", "brave", "breeze", "bright", "brook",
    "cabin", "cactus", "calm", "camel", "canyon", "caper", "cedar", "chalk",
    "cherry", "cider", "citrus", "clear", "clover", "cobalt", "comet", "copper",
    "coral", "cosmos", "cotton", "crane", "crest", "cricket", "crystal", "cypress",
    "dahlia", "daisy", "dawn", "delta", "desert", "dune", "eagle", "ember",
    "falcon", "fern", "fjord", "flint", "forest", "fossil", "fox", "frost",
    "galaxy", "garnet", "gecko", "gentle", "geyser", "ginger", "glacier", "glade",
    "golden", "granite", "grove", "gull", "happy", "harbor", "hazel", "heron",
    "hickory", "honey", "horizon", "iris", "island", "ivory", "jade", "jasper",
    "juniper", "kelp", "kestrel", "kiwi", "koala", "lagoon", "lake", "lantern",
    "larch", "lark", "laurel", "lemon", "lilac", "lily", "linen", "lotus",
    "lucky", "lunar", "lynx", "magnet", "mango", "maple", "marble", "meadow",
    "mellow", "mesa", "meteor", "mint", "mist", "moss", "nebula", "nectar",
    "north", "nova", "oak", "oasis", "ocean", "olive", "onyx", "opal",
    "orbit", "orchid", "otter", "owl", "palm", "panda", "pebble", "pepper",
    "pine", "planet", "plum", "polar", "poppy", "prairie", "prism", "quartz",
    "quiet", "quill", "rain", "rapid", "raven", "reef", "ridge", "river",
    "robin", "ruby", "saffron", "sage", "salmon", "sand", "sequoia", "shadow",
    "shore", "sierra", "silver", "slate", "snow", "solar", "sparrow", "spruce",
    "star", "stone", "storm", "summit", "sun", "sunny", "swift", "thistle",
    "thunder", "tide", "tidy", "tiger", "timber", "topaz", "trail", "tulip",
    "tundra", "valley", "velvet", "violet", "vivid", "walnut", "warm", "wave",
    "wild", "willow", "winter", "wren", "yarrow", "zephyr", "zinnia",
];

/// Number of words in a word code.
pub const WORDS_PER_CODE: usize = 3;

/// Source of candidate codes.
///
/// Uniqueness is not the source's concern: the link service probes the store
/// for every candidate before accepting it.
pub trait CodeSource: Send + Sync {
    /// Draws a fresh word code, e.g. `amber-coral-nova`.
    fn word_code(&self) -> String;

    /// Draws an 8-hex-digit fallback code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the OS random source fails.
    fn fallback_code(&self) -> Result<String, AppError>;
}

/// Production [`CodeSource`] backed by the thread-local CSPRNG and `getrandom`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodes;

impl CodeSource for RandomCodes {
    fn word_code(&self) -> String {
        let mut rng = rand::rng();
        let words: Vec<&str> = (0..WORDS_PER_CODE)
            .filter_map(|_| WORDS.choose(&mut rng).copied())
            .collect();
        words.join("-")
    }

    fn fallback_code(&self) -> Result<String, AppError> {
        let mut buffer = [0u8; 4];
        getrandom::fill(&mut buffer)
            .map_err(|e| AppError::internal(format!("random source failed: {e}")))?;
        Ok(hex::encode(buffer))
    }
}
